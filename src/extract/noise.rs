use anyhow::{Context, Result};
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Noise,
    /// Closing salutation. Nothing after it belongs to the table.
    SignOff,
    Content,
}

pub struct NoiseFilter {
    noise: Vec<Regex>,
    sign_off: Regex,
}

impl NoiseFilter {
    pub fn new() -> Result<Self> {
        let noise_patterns = [
            // pagination artifacts
            r"(?i)^page\s*\d+\s*(?:(?:/|of)\s*\d+)?$",
            r"^\d+\s*(?:/|of)\s*\d+$",
            r"^-\s*\d{1,3}\s*-$",
            // browser print headers: "3/5/24, 9:41 AM"
            r"(?i)^\d{1,2}/\d{1,2}/\d{2,4},?\s+\d{1,2}:\d{2}(?:\s*[AP]M)?",
            // mail client chrome
            r"(?i)^(?:mail\s*-|outlook\b|inbox\b|reply\b|forward\b|sent from\b|from:|sent:|date:|to:|cc:|bcc:|subject:)",
            // standalone links
            r"(?i)^(?:https?://|www\.)\S+$",
            r"(?i)^(?:dear|hi|hello|good (?:morning|afternoon|evening))\b",
            // repeated table header after a page break
            r"(?i)^(?:sr\.?\s*no\.?\s+)?agreement\s+(?:number|no\.?)\b.*\b(?:penal|bounce|reason)\b",
        ];

        let noise = noise_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern)
                    .with_context(|| format!("failed to compile noise regex: {pattern}"))
            })
            .collect::<Result<Vec<Regex>>>()?;
        let sign_off = Regex::new(
            r"(?i)^(?:regards|best regards|warm regards|kind regards|thanks|thank you|thanks and regards|thanks & regards|sincerely)\b",
        )
        .context("failed to compile sign-off regex")?;

        Ok(Self { noise, sign_off })
    }

    pub fn classify(&self, line: &str) -> LineKind {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return LineKind::Blank;
        }
        if self.sign_off.is_match(trimmed) {
            return LineKind::SignOff;
        }
        if self.noise.iter().any(|pattern| pattern.is_match(trimmed)) {
            return LineKind::Noise;
        }
        LineKind::Content
    }

    pub fn is_skippable(&self, line: &str) -> bool {
        self.classify(line) != LineKind::Content
    }
}
