use anyhow::{Context, Result};
use regex::Regex;

use crate::util::collapse_whitespace;

pub const KNOWN_REASON_PHRASES: [&str; 5] = [
    "bank side issue",
    "signature missing",
    "signature mismatch",
    "customer request",
    "system error",
];

const SEPARATOR_CHARACTERS: [char; 14] = [
    '|', '-', '–', '—', '"', '\'', '‘', '’', '“', '”', ':', ',', ';', '_',
];

pub struct ReasonNormalizer {
    number_prefix: Regex,
    column_bleed: Regex,
}

impl ReasonNormalizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            number_prefix: Regex::new(r"^Number\b")
                .context("failed to compile reason number-prefix regex")?,
            column_bleed: Regex::new(r"^\d+\s*([A-Z])")
                .context("failed to compile reason column-bleed regex")?,
        })
    }

    /// Cleans raw reason text. `None` means the text carries no usable reason.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let mut reason = trim_separators(&collapse_whitespace(raw)).to_string();

        if self.number_prefix.is_match(&reason) {
            reason = trim_separators(&reason["Number".len()..]).to_string();
        }

        reason = trim_separators(&self.column_bleed.replace(&reason, "$1")).to_string();

        if reason.chars().count() < 3 || !reason.chars().any(char::is_alphabetic) {
            return None;
        }

        Some(reason)
    }
}

fn trim_separators(input: &str) -> &str {
    input.trim_matches(|character: char| {
        character.is_whitespace() || SEPARATOR_CHARACTERS.contains(&character)
    })
}

/// Looks for a known reason phrase anywhere in the row text.
pub fn detect_known_reason(row_text: &str) -> Option<String> {
    let lower = row_text.to_lowercase();
    KNOWN_REASON_PHRASES
        .iter()
        .find(|phrase| lower.contains(*phrase))
        .map(|phrase| title_case(phrase))
}

fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut characters = word.chars();
            match characters.next() {
                Some(first) => first.to_uppercase().chain(characters).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
