//! Last-resort extraction from the raw detail page.
//!
//! Each field has an ordered list of attempts over the parsed document; the
//! first one that yields something wins. Pages drift, so every attempt is
//! allowed to come up empty.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use crate::extractor::model::{PartialRecord, Platforms};

type Attempt<T> = fn(&Html) -> Option<T>;

const TITLE_SUFFIXES: &[&str] = &[" - IGN", " | IGN"];

const NAME_ATTEMPTS: &[Attempt<String>] = &[heading, title_without_suffix];
const COVER_ATTEMPTS: &[Attempt<String>] = &[social_preview_image, header_image, grid_image];
const PLATFORM_ATTEMPTS: &[Attempt<Platforms>] =
    &[keyword_platforms, testid_platforms, legacy_platforms];
const RELEASE_DATE_ATTEMPTS: &[Attempt<String>] = &[
    release_time_element,
    testid_release_date,
    legacy_release_date,
    labelled_release_date,
    date_in_text,
    date_in_description,
];
const SCORE_ATTEMPTS: &[Attempt<String>] = &[testid_score, legacy_score_box, score_like_class];

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

static H1: Lazy<Selector> = Lazy::new(|| selector("h1"));
static TITLE: Lazy<Selector> = Lazy::new(|| selector("title"));
static OG_IMAGE: Lazy<Selector> = Lazy::new(|| selector(r#"meta[property="og:image"]"#));
static HEADER_IMAGE: Lazy<Selector> = Lazy::new(|| selector(".article-header img"));
static GRID_IMAGE: Lazy<Selector> = Lazy::new(|| selector(".grid-image-container img"));
static KEYWORDS: Lazy<Selector> = Lazy::new(|| selector(r#"meta[name="cXenseParse:keywords"]"#));
static PLATFORMS_TESTID: Lazy<Selector> = Lazy::new(|| selector(r#"[data-testid="platforms"]"#));
static SPAN: Lazy<Selector> = Lazy::new(|| selector("span"));
static PLATFORMS_LEGACY: Lazy<Selector> = Lazy::new(|| selector(".platformsText span"));
static RELEASE_TIME: Lazy<Selector> = Lazy::new(|| {
    selector(
        r#"time[data-testid="release-date"], [data-testid="release-date"] time, time[itemprop="releaseDate"]"#,
    )
});
static RELEASE_TESTID: Lazy<Selector> = Lazy::new(|| selector(r#"[data-testid="release-date"]"#));
static RELEASE_LEGACY: Lazy<Selector> = Lazy::new(|| selector(".releaseDate"));
static DESCRIPTION: Lazy<Selector> = Lazy::new(|| {
    selector(r#"meta[name="description"], meta[property="og:description"]"#)
});
static SCORE_TESTID: Lazy<Selector> = Lazy::new(|| selector(r#"[data-testid="score"]"#));
static SCORE_LEGACY: Lazy<Selector> = Lazy::new(|| selector(".scoreBox-score"));
static DIV_OR_SPAN: Lazy<Selector> = Lazy::new(|| selector("div[class], span[class]"));

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|June?|July?|Aug(?:ust)?|Sep(?:t(?:ember)?)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)\.?\s+\d{1,2},\s*\d{4}\b|\b\d{4}-\d{1,2}-\d{1,2}\b",
    )
    .unwrap()
});

/// Whole-word "Release Date" label; "Release Dates" is a heading, not a label.
static RELEASE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\brelease\s+date\b\s*:?").unwrap());

static RELEASE_LABEL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*release\s+date\s*:?\s*").unwrap());

/// Run every field's attempt list over the page.
pub fn extract(html: &str) -> PartialRecord {
    let document = Html::parse_document(html);

    PartialRecord {
        english_name: first_match(&document, NAME_ATTEMPTS),
        cover_image: first_match(&document, COVER_ATTEMPTS),
        platforms: first_match(&document, PLATFORM_ATTEMPTS).unwrap_or_default(),
        release_date: first_match(&document, RELEASE_DATE_ATTEMPTS),
        score: first_match(&document, SCORE_ATTEMPTS),
    }
}

fn first_match<T>(document: &Html, attempts: &[Attempt<T>]) -> Option<T> {
    attempts.iter().find_map(|attempt| attempt(document))
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(element: ElementRef) -> String {
    collapse(&element.text().collect::<String>())
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

/// Text of the first matching element that has any.
fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .find_map(|e| non_empty(element_text(e)))
}

fn first_attr(document: &Html, selector: &Selector, attr: &str) -> Option<String> {
    document.select(selector).find_map(|e| {
        e.value()
            .attr(attr)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    })
}

fn is_hidden(parent: Option<ElementRef>) -> bool {
    parent.is_some_and(|p| {
        matches!(
            p.value().name(),
            "script" | "style" | "noscript" | "template"
        )
    })
}

// name

fn heading(document: &Html) -> Option<String> {
    first_text(document, &H1)
}

fn title_without_suffix(document: &Html) -> Option<String> {
    let title = first_text(document, &TITLE)?;
    let stripped = TITLE_SUFFIXES
        .iter()
        .find_map(|suffix| title.strip_suffix(suffix))
        .unwrap_or(&title);
    non_empty(stripped.trim().to_string())
}

// cover image

fn social_preview_image(document: &Html) -> Option<String> {
    first_attr(document, &OG_IMAGE, "content")
}

fn header_image(document: &Html) -> Option<String> {
    first_attr(document, &HEADER_IMAGE, "src")
}

fn grid_image(document: &Html) -> Option<String> {
    first_attr(document, &GRID_IMAGE, "src")
}

// platforms

fn non_empty_platforms(platforms: Platforms) -> Option<Platforms> {
    (!platforms.is_empty()).then_some(platforms)
}

/// Keyword meta is `",<game name>,<platform>,<platform>..."`.
fn keyword_platforms(document: &Html) -> Option<Platforms> {
    let keywords = first_attr(document, &KEYWORDS, "content")?;
    let platforms = keywords
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .skip(1)
        .collect();
    non_empty_platforms(platforms)
}

fn testid_platforms(document: &Html) -> Option<Platforms> {
    let container = document.select(&PLATFORMS_TESTID).next()?;
    non_empty_platforms(container.select(&SPAN).map(element_text).collect())
}

fn legacy_platforms(document: &Html) -> Option<Platforms> {
    non_empty_platforms(document.select(&PLATFORMS_LEGACY).map(element_text).collect())
}

// release date

fn without_label(text: String) -> Option<String> {
    non_empty(RELEASE_LABEL_PREFIX.replace(&text, "").trim().to_string())
}

fn release_time_element(document: &Html) -> Option<String> {
    document.select(&RELEASE_TIME).find_map(|time| {
        time.value()
            .attr("datetime")
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .or_else(|| non_empty(element_text(time)))
    })
}

fn testid_release_date(document: &Html) -> Option<String> {
    without_label(first_text(document, &RELEASE_TESTID)?)
}

fn legacy_release_date(document: &Html) -> Option<String> {
    without_label(first_text(document, &RELEASE_LEGACY)?)
}

fn find_date(text: &str) -> Option<String> {
    DATE_PATTERN.find(text).map(|m| m.as_str().to_string())
}

/// A "Release Date:" label followed by a date, either in the rest of its own
/// text or in the first text after it (or after its parent element). Labels
/// without a recognizable date are passed over.
fn labelled_release_date(document: &Html) -> Option<String> {
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let text: &str = text;
        let Some(label) = RELEASE_LABEL.find(text) else {
            continue;
        };
        if is_hidden(node.parent().and_then(ElementRef::wrap)) {
            continue;
        }

        let rest = text[label.end()..].trim();
        if !rest.is_empty() {
            if let Some(date) = find_date(rest) {
                return Some(date);
            }
            continue;
        }

        let following = node
            .next_siblings()
            .chain(node.parent().into_iter().flat_map(|p| p.next_siblings()))
            .find_map(|sibling| {
                let text = match ElementRef::wrap(sibling) {
                    Some(element) => element_text(element),
                    None => sibling.value().as_text().map(|t| collapse(t)).unwrap_or_default(),
                };
                non_empty(text.trim_start_matches(':').trim().to_string())
            });
        if let Some(date) = following.as_deref().and_then(find_date) {
            return Some(date);
        }
    }
    None
}

fn date_in_text(document: &Html) -> Option<String> {
    document.root_element().descendants().find_map(|node| {
        let text = node.value().as_text()?;
        if is_hidden(node.parent().and_then(ElementRef::wrap)) {
            return None;
        }
        find_date(text)
    })
}

fn date_in_description(document: &Html) -> Option<String> {
    document
        .select(&DESCRIPTION)
        .find_map(|meta| find_date(meta.value().attr("content")?))
}

// score

fn looks_numeric(text: &str) -> bool {
    let digits = text.replace('.', "");
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn testid_score(document: &Html) -> Option<String> {
    first_text(document, &SCORE_TESTID)
}

fn legacy_score_box(document: &Html) -> Option<String> {
    first_text(document, &SCORE_LEGACY)
}

fn score_like_class(document: &Html) -> Option<String> {
    document.select(&DIV_OR_SPAN).find_map(|element| {
        let scored = element.value().classes().any(|class| {
            let class = class.to_lowercase();
            class.contains("score") || class.contains("rating")
        });
        let text = element_text(element);
        (scored && looks_numeric(&text)).then_some(text)
    })
}
