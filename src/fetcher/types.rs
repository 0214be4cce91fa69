use url::Url;

/// What a fetch is willing to accept as a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// A rendered detail page.
    Html,
    /// Any textual body, e.g. a reader service's plain-text rendering.
    Text,
}

impl ContentKind {
    pub fn accepts(&self, content_type: &str) -> bool {
        let content_type = content_type.to_ascii_lowercase();
        match self {
            Self::Html => {
                content_type.contains("text/html") || content_type.contains("application/xhtml")
            }
            Self::Text => {
                content_type.starts_with("text/")
                    || content_type.contains("json")
                    || content_type.contains("markdown")
                    || content_type.contains("application/xhtml")
            }
        }
    }
}

#[derive(Debug)]
pub struct PageResponse {
    pub url_final: Url,
    pub body_utf8: String,
    /// WHATWG name of the encoding the body was decoded from.
    pub charset: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_kind_rejects_plain_text() {
        assert!(ContentKind::Html.accepts("text/html; charset=utf-8"));
        assert!(ContentKind::Html.accepts("application/xhtml+xml"));
        assert!(!ContentKind::Html.accepts("text/plain"));
        assert!(!ContentKind::Html.accepts("image/png"));
    }

    #[test]
    fn text_kind_accepts_reader_output() {
        assert!(ContentKind::Text.accepts("text/plain; charset=utf-8"));
        assert!(ContentKind::Text.accepts("text/markdown"));
        assert!(ContentKind::Text.accepts("TEXT/HTML"));
        assert!(!ContentKind::Text.accepts("image/jpeg"));
    }
}
