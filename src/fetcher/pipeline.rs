use crate::fetcher::types::PageResponse;
use bytes::Bytes;
use encoding_rs::Encoding;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;
use url::Url;

/// Bytes of the body scanned for an in-document charset declaration.
const SNIFF_LEN: usize = 4096;

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

static META_HTTP_EQUIV_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+[^>]*?http-equiv\s*=\s*["']?content-type["']?[^>]*?content\s*=\s*["']?[^"'>]*?charset\s*=\s*([^"'\s;/>]+)"#).unwrap()
});

pub fn process_response(url_final: Url, body_bytes: Bytes, content_type: &str) -> PageResponse {
    let encoding = detect_encoding(content_type, &body_bytes);
    let body_utf8 = decode(&body_bytes, encoding);

    PageResponse {
        url_final,
        body_utf8,
        charset: encoding.name(),
    }
}

/// Header charset, then `<meta charset>`, then `<meta http-equiv>`, then a
/// statistical guess over the first few kilobytes.
fn detect_encoding(content_type: &str, body_bytes: &[u8]) -> &'static Encoding {
    if let Some(encoding) = label_from(&CHARSET_REGEX, content_type) {
        return encoding;
    }

    let sniff = &body_bytes[..body_bytes.len().min(SNIFF_LEN)];
    let head = String::from_utf8_lossy(sniff);

    for regex in [&*META_CHARSET_REGEX, &*META_HTTP_EQUIV_REGEX] {
        if let Some(encoding) = label_from(regex, &head) {
            return encoding;
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(sniff, false);
    detector.guess(None, true)
}

fn label_from(regex: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let label = regex.captures(haystack)?.get(1)?.as_str().to_lowercase();
    Encoding::for_label(label.as_bytes())
}

/// Malformed sequences become U+FFFD; one stray byte must not cost the page.
fn decode(body_bytes: &[u8], encoding: &'static Encoding) -> String {
    let (decoded, _encoding, had_errors) = encoding.decode(body_bytes);

    if had_errors {
        warn!(
            encoding = encoding.name(),
            "body contained bytes invalid for its encoding, replaced"
        );
    }

    decoded.into_owned()
}
