use readability::extractor;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

use crate::fetcher::types::PageResponse;

static SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n+").unwrap());

/// Local stand-in for a reader service: the page's title followed by its
/// readable text.
pub fn render(page: &PageResponse) -> String {
    if let Ok(article) = extractor::extract(&mut page.body_utf8.as_bytes(), &page.url_final) {
        let text = normalize_whitespace(&article.text);
        if !text.is_empty() {
            return format!("Title: {}\nURL Source: {}\n\n{}", article.title.trim(), page.url_final, text);
        }
    }

    // Readability found nothing worth keeping; flatten the whole body.
    let document = Html::parse_document(&page.body_utf8);
    let title = Selector::parse("title")
        .ok()
        .and_then(|s| document.select(&s).next())
        .map(|t| t.text().collect::<String>())
        .unwrap_or_default();
    let body = Selector::parse("body")
        .ok()
        .and_then(|s| document.select(&s).next())
        .map(|b| b.text().collect::<Vec<_>>().join("\n"))
        .unwrap_or_default();

    format!(
        "Title: {}\nURL Source: {}\n\n{}",
        title.trim(),
        page.url_final,
        normalize_whitespace(&body)
    )
}

pub fn normalize_whitespace(text: &str) -> String {
    let spaced = SPACE_RUN.replace_all(text.trim(), " ");
    BLANK_LINES.replace_all(&spaced, "\n\n").to_string()
}
