//! Localized title → canonical English title, via a language model.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::{debug, info, instrument};

use crate::error::PipelineError;
use crate::llm::LanguageModel;

const SYSTEM_PROMPT: &str = "You are a video game expert. Your task is to find the official English name of video games. Use your knowledge and search capabilities to find the most accurate English title. If there are multiple possible English names, list the most likely ones in order of probability. If you're uncertain, indicate this clearly.";

/// Openers a model uses before getting to the answer.
const INTRODUCTORY_PREFIXES: &[&str] = &[
    "根据",
    "这是",
    "以下",
    "based on",
    "here is",
    "here are",
    "here's",
    "sure",
    "certainly",
    "the official english",
];

static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+(.+)$").unwrap());

/// Best-guess canonical English title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalNameGuess {
    pub text: String,
}

pub struct NameResolver<M> {
    model: M,
}

impl<M: LanguageModel> NameResolver<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Ask the model for ranked English titles and keep the most likely one.
    #[instrument(skip(self))]
    pub async fn resolve(&self, query: &str) -> Result<CanonicalNameGuess, PipelineError> {
        let answer = self
            .model
            .complete(SYSTEM_PROMPT, &user_prompt(query))
            .await?;
        debug!(%answer, "name resolution answer");

        let text = parse_guess(&answer).ok_or_else(|| {
            PipelineError::Parse(format!("language model returned no name for '{query}'"))
        })?;
        info!(%text, "resolved english title");
        Ok(CanonicalNameGuess { text })
    }
}

pub fn user_prompt(query: &str) -> String {
    format!(
        "Find the official English title of the game 《{query}》. Do not translate the title literally; give the name the game is actually released under. If there are several possibilities, list the most likely ones. Format: 1. most likely English title 2. next most likely English title (if any)"
    )
}

/// Pick the guess out of a model answer.
///
/// First numbered line (`"1. Title"`) with emphasis stripped; else the first
/// line that isn't an introduction; else the first non-empty line; else the
/// whole answer. `None` only when the answer is blank.
pub fn parse_guess(answer: &str) -> Option<String> {
    let lines: Vec<&str> = answer
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let numbered = lines.iter().find_map(|line| {
        let caps = NUMBERED_LINE.captures(line)?;
        let name = strip_emphasis(&caps[1]);
        (!name.is_empty()).then_some(name)
    });

    numbered
        .or_else(|| {
            lines
                .iter()
                .find(|line| line.chars().count() > 1 && !is_introductory(line))
                .map(|line| line.to_string())
        })
        .or_else(|| lines.first().map(|line| line.to_string()))
        .or_else(|| Some(answer.trim().to_string()).filter(|a| !a.is_empty()))
}

fn strip_emphasis(text: &str) -> String {
    text.replace(['*', '`'], "").trim().to_string()
}

fn is_introductory(line: &str) -> bool {
    let lower = line.to_lowercase();
    INTRODUCTORY_PREFIXES.iter().any(|p| lower.starts_with(p))
}
