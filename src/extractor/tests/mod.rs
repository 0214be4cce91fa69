use reqwest::Client;
use serde_json::json;
use std::fs;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

use crate::catalog::CatalogClient;
use crate::config::{CatalogSettings, ReaderSettings};
use crate::error::ErrorKind;
use crate::extractor::model::{NO_COVER, UNKNOWN, UNRATED};
use crate::extractor::{DetailExtractor, ExtractionMethod, Strategy, heuristic, slug_from_ref};
use crate::fetcher::PageFetcher;
use crate::llm::{LanguageModel, LlmError, MockLanguageModel};

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{name}"))
        .expect("Failed to read test fixture")
}

fn create_extractor(
    server: &MockServer,
    assistant: Option<Box<dyn LanguageModel>>,
    method: ExtractionMethod,
) -> DetailExtractor {
    let http = Client::new();
    let catalog = CatalogClient::new(
        http.clone(),
        &CatalogSettings {
            api_url: format!("{}/graphql", server.uri()),
            site_url: server.uri(),
        },
    );
    let fetcher = PageFetcher::new(
        http,
        &ReaderSettings {
            base_url: String::new(),
        },
    );
    DetailExtractor::new(catalog, fetcher, assistant, method)
}

async fn mount_page(server: &MockServer, html: String) {
    Mock::given(method("GET"))
        .and(path("/games/titanfall-2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(html.into_bytes())
                .insert_header("Content-Type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

async fn mount_slug_lookup(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/graphql"))
        .and(query_param("operationName", "GetObjectBySlug"))
        .respond_with(response)
        .mount(server)
        .await;
}

fn detail_ref(server: &MockServer) -> String {
    format!("{}/games/titanfall-2", server.uri())
}

#[test]
fn test_heuristic_modern_layout() {
    let record = heuristic::extract(&fixture("modern.html")).into_record("ref");

    assert_eq!(record.english_name, "Titanfall 2");
    assert_eq!(
        record.cover_image,
        "https://assets-prd.ignimgs.com/2022/01/titanfall-2-cover.jpg"
    );
    assert_eq!(record.platforms.as_slice(), ["PC", "PlayStation 4", "Xbox One"]);
    assert_eq!(record.release_date, "2016-10-28");
    assert_eq!(record.score, "10");
}

#[test]
fn test_heuristic_legacy_layout() {
    let record = heuristic::extract(&fixture("legacy.html")).into_record("ref");

    assert_eq!(record.english_name, "Celeste");
    assert_eq!(record.cover_image, "https://assets1.ignimgs.com/celeste-grid.jpg");
    assert_eq!(record.platforms.as_slice(), ["Nintendo Switch", "PC"]);
    assert_eq!(record.release_date, "January 25, 2018");
    assert_eq!(record.score, "10");
}

#[test]
fn test_heuristic_sparse_page_uses_sentinels() {
    let record = heuristic::extract(&fixture("sparse.html")).into_record("ref");

    assert_eq!(record.english_name, "Hollow Knight: Silksong");
    assert_eq!(record.cover_image, NO_COVER);
    assert!(record.platforms.is_empty());
    assert_eq!(record.release_date, "September 4, 2025");
    assert_eq!(record.score, UNRATED);

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["score"], "unrated");
    assert_eq!(value["platforms"], "unknown");
}

#[test]
fn test_heuristic_dates_in_text() {
    let record = heuristic::extract(&fixture("dates-in-text.html")).into_record("ref");

    assert_eq!(record.english_name, "Hades II");
    assert_eq!(record.release_date, "Sep 25, 2025");
    assert_eq!(record.score, "9");
}

#[test]
fn test_slug_from_ref() {
    assert_eq!(
        slug_from_ref("https://www.ign.com/games/titanfall-2"),
        Some("titanfall-2")
    );
    assert_eq!(
        slug_from_ref("https://www.ign.com/games/titanfall-2/reviews?x=1"),
        Some("titanfall-2")
    );
    assert_eq!(slug_from_ref("https://www.ign.com/articles/titanfall"), None);
}

#[test]
fn test_extraction_method_orders() {
    assert_eq!(
        ExtractionMethod::default().strategies(),
        [Strategy::Structured, Strategy::Assisted, Strategy::Heuristic]
    );
    assert_eq!(
        "Heuristic".parse::<ExtractionMethod>().unwrap().strategies()[0],
        Strategy::Heuristic
    );
    assert!("fastest".parse::<ExtractionMethod>().is_err());

    let method: ExtractionMethod = serde_json::from_value(json!("assisted")).unwrap();
    assert_eq!(method, ExtractionMethod::Assisted);
}

#[tokio::test]
async fn test_structured_strategy_wins() {
    let server = MockServer::start().await;
    mount_slug_lookup(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "data": {"getObjectBySlug": {
                "slug": "titanfall-2",
                "metadata": {"names": {"name": "Titanfall 2"}, "imageUrl": "https://assets.example/tf2.jpg"},
                "objectRegions": [{"releases": [
                    {"date": "2016-10-28", "platformAttributes": [{"name": "PC"}]}
                ]}],
                "reviewObject": {"score": 10}
            }}
        })),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/games/titanfall-2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let extractor = create_extractor(&server, None, ExtractionMethod::Standard);
    let record = extractor.extract(&detail_ref(&server)).await.unwrap();

    assert_eq!(record.english_name, "Titanfall 2");
    assert_eq!(record.cover_image, "https://assets.example/tf2.jpg");
    assert_eq!(record.score, "10");
    assert_eq!(record.detail_url, detail_ref(&server));
}

#[tokio::test]
async fn test_missing_object_falls_back_to_heuristic() {
    let server = MockServer::start().await;
    mount_slug_lookup(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"data": {"getObjectBySlug": null}})),
    )
    .await;
    mount_page(&server, fixture("modern.html")).await;

    let extractor = create_extractor(&server, None, ExtractionMethod::Standard);
    let record = extractor.extract(&detail_ref(&server)).await.unwrap();

    assert_eq!(record.english_name, "Titanfall 2");
    assert_eq!(record.platforms.as_slice(), ["PC", "PlayStation 4", "Xbox One"]);
    assert_eq!(record.release_date, "2016-10-28");
    assert_eq!(record.score, "10");
    assert_eq!(record.detail_url, detail_ref(&server));
}

#[tokio::test]
async fn test_catalog_failure_falls_back_to_assisted() {
    let server = MockServer::start().await;
    mount_slug_lookup(&server, ResponseTemplate::new(503)).await;
    mount_page(&server, fixture("modern.html")).await;

    let mut model = MockLanguageModel::new();
    model
        .expect_complete()
        .withf(|system, user| system.contains("english_name") && user.contains("URL Source:"))
        .times(1)
        .returning(|_, _| {
            Ok(r#"```json
{"english_name": "Titanfall 2", "platforms": ["PC"], "release_date": "2016-10-28", "url": "ignored"}
```"#
                .to_string())
        });

    let extractor = create_extractor(&server, Some(Box::new(model)), ExtractionMethod::Standard);
    let record = extractor.extract(&detail_ref(&server)).await.unwrap();

    assert_eq!(record.english_name, "Titanfall 2");
    assert_eq!(record.platforms.as_slice(), ["PC"]);
    assert_eq!(record.cover_image, NO_COVER);
    assert_eq!(record.score, UNRATED);
    assert_eq!(record.detail_url, detail_ref(&server));
}

#[tokio::test]
async fn test_assisted_failure_falls_back_to_heuristic() {
    let server = MockServer::start().await;
    mount_page(&server, fixture("sparse.html")).await;

    let mut model = MockLanguageModel::new();
    model
        .expect_complete()
        .times(1)
        .returning(|_, _| Err(LlmError::NoChoices));

    let extractor = create_extractor(&server, Some(Box::new(model)), ExtractionMethod::Assisted);
    let record = extractor.extract(&detail_ref(&server)).await.unwrap();

    assert_eq!(record.english_name, "Hollow Knight: Silksong");
    assert_eq!(record.score, UNRATED);
}

#[tokio::test]
async fn test_every_strategy_failing_returns_last_error() {
    let server = MockServer::start().await;
    mount_slug_lookup(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"data": {"getObjectBySlug": null}})),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/games/titanfall-2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let extractor = create_extractor(&server, None, ExtractionMethod::Heuristic);
    let err = extractor.extract(&detail_ref(&server)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_record_is_always_complete() {
    let server = MockServer::start().await;
    mount_page(&server, "<html><body></body></html>".to_string()).await;

    let extractor = create_extractor(&server, None, ExtractionMethod::Heuristic);
    let record = extractor.extract(&detail_ref(&server)).await.unwrap();

    assert_eq!(record.english_name, UNKNOWN);
    assert_eq!(record.release_date, UNKNOWN);
    assert_eq!(record.score, UNRATED);

    let value = serde_json::to_value(&record).unwrap();
    for key in ["english_name", "cover_image", "platforms", "release_date", "score", "url"] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
}

#[tokio::test]
async fn test_invalid_byte_does_not_sink_the_page() {
    let server = MockServer::start().await;
    let mut body = b"<html><body><nav><a>Video Game Release Dates</a></nav>\
        <h1>Titanfall 2</h1><p>Caf"
        .to_vec();
    body.push(0xE9);
    body.extend_from_slice(b" edition, out on October 28, 2016</p></body></html>");
    Mock::given(method("GET"))
        .and(path("/games/titanfall-2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body)
                .insert_header("Content-Type", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let extractor = create_extractor(&server, None, ExtractionMethod::Assisted);
    let record = extractor.extract(&detail_ref(&server)).await.unwrap();

    assert_eq!(record.english_name, "Titanfall 2");
    assert_eq!(record.release_date, "October 28, 2016");
}
