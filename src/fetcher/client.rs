use crate::config::{HttpSettings, ReaderSettings};
use crate::fetcher::{
    errors::FetchError,
    pipeline::process_response,
    reader,
    types::{ContentKind, PageResponse},
};
use reqwest::{Client, ClientBuilder, header};
use std::time::Duration;
use tracing::{debug, instrument};

const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB

/// Build the HTTP client shared by every network collaborator.
pub fn build_http_client(settings: &HttpSettings) -> Result<Client, reqwest::Error> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT_LANGUAGE,
        header::HeaderValue::from_static("en-US,en;q=0.9,zh-CN;q=0.8"),
    );

    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .timeout(Duration::from_secs(settings.timeout_secs))
        .user_agent(settings.user_agent.as_str())
        .redirect(reqwest::redirect::Policy::limited(10))
        .default_headers(headers)
        .build()
}

/// Fetches detail pages, either raw or through a reader service.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
    reader_base: Option<String>,
}

impl PageFetcher {
    pub fn new(client: Client, reader: &ReaderSettings) -> Self {
        let base = reader.base_url.trim();
        Self {
            client,
            reader_base: (!base.is_empty()).then(|| base.to_string()),
        }
    }

    /// Fetch a page as HTML.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Result<PageResponse, FetchError> {
        self.get(url, ContentKind::Html).await
    }

    /// Fetch a simplified text rendering of a page, suitable for a language
    /// model. Uses the reader service when one is configured, otherwise
    /// renders the raw page locally.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_reader_formatted(&self, url: &str) -> Result<String, FetchError> {
        match &self.reader_base {
            Some(base) => {
                let reader_url = format!("{base}{url}");
                debug!(%reader_url, "fetching reader rendering");
                let response = self.get(&reader_url, ContentKind::Text).await?;
                Ok(response.body_utf8)
            }
            None => {
                let page = self.get(url, ContentKind::Html).await?;
                Ok(reader::render(&page))
            }
        }
    }

    async fn get(&self, url: &str, kind: ContentKind) -> Result<PageResponse, FetchError> {
        let parsed_url = url::Url::parse(url)?;

        let response = self
            .client
            .get(parsed_url)
            .header(
                header::ACCEPT,
                match kind {
                    ContentKind::Html => {
                        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                    }
                    ContentKind::Text => "text/plain,text/markdown,text/*;q=0.9,*/*;q=0.5",
                },
            )
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        // Check content length before downloading
        if let Some(content_length) = response.content_length()
            && content_length > MAX_BODY_SIZE
        {
            return Err(FetchError::BodyTooLarge(content_length));
        }

        let final_url = response.url().clone();
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Http { status });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or(match kind {
                ContentKind::Html => "text/html",
                ContentKind::Text => "text/plain",
            })
            .to_string();

        if !kind.accepts(&content_type) {
            return Err(FetchError::UnsupportedContentType(content_type));
        }

        let body_bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Io(e.to_string()))?;

        // Check body size after download (in case Content-Length was missing)
        if body_bytes.len() as u64 > MAX_BODY_SIZE {
            return Err(FetchError::BodyTooLarge(body_bytes.len() as u64));
        }

        Ok(process_response(final_url, body_bytes, &content_type))
    }
}
