//! Detail extraction by a language model reading a reader-rendered page.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::PipelineError;
use crate::extractor::model::{PartialRecord, Platforms};

/// Upper bound on page characters handed to the model.
pub const MAX_PAGE_CHARS: usize = 60_000;

pub const SYSTEM_PROMPT: &str = r#"You are a game information extraction assistant. Extract the game's details from the web page content below and return them as a single JSON object with exactly these keys:
- "english_name": the game's English title
- "cover_image": URL of the cover image, without query parameters
- "platforms": list of platform names
- "release_date": release date formatted as YYYY-MM-DD
- "score": the review score
- "url": URL of the game's detail page
If a value cannot be found, use "unknown" (or "unrated" for the score). Respond with the JSON object only."#;

pub fn user_prompt(page: &str) -> String {
    let page = match page.char_indices().nth(MAX_PAGE_CHARS) {
        Some((cut, _)) => &page[..cut],
        None => page,
    };
    format!("Extract the game information from the following web page content:\n\n{page}")
}

#[derive(Debug, Default, Deserialize)]
struct AssistedAnswer {
    #[serde(default, deserialize_with = "lenient_string")]
    english_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    cover_image: Option<String>,
    #[serde(default)]
    platforms: Platforms,
    #[serde(default, deserialize_with = "lenient_string")]
    release_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    score: Option<String>,
}

/// Strings as-is, numbers rendered, anything else treated as absent.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Remove a surrounding markdown code fence, with or without a language tag.
pub fn strip_code_fence(answer: &str) -> &str {
    let mut text = answer.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest
            .split_once('\n')
            .map_or(rest.trim_start_matches("json"), |(_, body)| body);
    }
    text.strip_suffix("```").unwrap_or(text).trim()
}

/// Parse the model's JSON answer. The answer may be fenced or wrapped in
/// prose; the outermost `{...}` is tried when the whole text isn't JSON.
pub fn parse_answer(answer: &str) -> Result<PartialRecord, PipelineError> {
    let body = strip_code_fence(answer);
    let parsed = serde_json::from_str::<AssistedAnswer>(body).or_else(|err| {
        match (body.find('{'), body.rfind('}')) {
            (Some(start), Some(end)) if start < end => serde_json::from_str(&body[start..=end]),
            _ => Err(err),
        }
    });

    let answer = parsed.map_err(|err| {
        PipelineError::Parse(format!("language model returned malformed details: {err}"))
    })?;

    Ok(PartialRecord {
        english_name: answer.english_name,
        cover_image: answer.cover_image,
        platforms: answer.platforms,
        release_date: answer.release_date,
        score: answer.score,
    })
}
