use anyhow::{Context, Result};
use regex::Regex;

/// Agreement number: eight upper-case letters or digits.
pub const IDENTIFIER_PATTERN: &str = r"\b[A-Z0-9]{8}\b";
/// Charge amount with optional thousands (or lakh) grouping and decimals.
pub const AMOUNT_PATTERN: &str = r"\b\d+(?:,\d{2,3})*(?:\.\d+)?\b";
pub const TIMESTAMP_PATTERN: &str = r"\d{4}-\d{2}-\d{2}\s+\d{1,2}:\d{2}";
pub const EMAIL_PATTERN: &str = r"[\w.+-]+@[\w-]+(?:\.[\w-]+)*\.[A-Za-z]{2,}";
/// Loan account reference used by the lightweight intake path.
pub const REFERENCE_PATTERN: &str = r"(?i)\b[A-Z][0-9][A-Z][0-9A-Z]{9,12}\b";
pub const FROM_LABEL_PATTERN: &str = r"(?im)\bFrom\b[ \t]*:?[ \t]*([^\r\n]*)";
pub const DATE_LABEL_PATTERN: &str = r"(?im)\bDate\b[ \t]*:?[ \t]*([^\r\n]*)";
pub const TABLE_KEYWORD_PATTERN: &str = r"Reason|Total Amount";

pub struct Patterns {
    pub identifier: Regex,
    pub amount: Regex,
    pub amount_exact: Regex,
    pub timestamp: Regex,
    pub email: Regex,
    pub email_exact: Regex,
    pub reference: Regex,
    pub from_label: Regex,
    pub date_label: Regex,
    pub table_keyword: Regex,
}

impl Patterns {
    pub fn new() -> Result<Self> {
        Ok(Self {
            identifier: compile(IDENTIFIER_PATTERN, "identifier")?,
            amount: compile(AMOUNT_PATTERN, "amount")?,
            amount_exact: compile(&format!("^{AMOUNT_PATTERN}$"), "exact amount")?,
            timestamp: compile(TIMESTAMP_PATTERN, "timestamp")?,
            email: compile(EMAIL_PATTERN, "email")?,
            email_exact: compile(&format!("^{EMAIL_PATTERN}$"), "exact email")?,
            reference: compile(REFERENCE_PATTERN, "reference")?,
            from_label: compile(FROM_LABEL_PATTERN, "from label")?,
            date_label: compile(DATE_LABEL_PATTERN, "date label")?,
            table_keyword: compile(TABLE_KEYWORD_PATTERN, "table keyword")?,
        })
    }

    pub fn is_identifier(&self, token: &str) -> bool {
        token.len() == 8
            && self
                .identifier
                .find(token)
                .is_some_and(|found| found.as_str() == token)
            && token.chars().any(|character| character.is_ascii_digit())
    }

    /// First identifier occurrence in `text`, as a byte range.
    pub fn find_identifier(&self, text: &str) -> Option<(usize, usize)> {
        self.identifier_spans(text).into_iter().next()
    }

    pub fn identifier_spans(&self, text: &str) -> Vec<(usize, usize)> {
        self.identifier
            .find_iter(text)
            .filter(|found| {
                found
                    .as_str()
                    .chars()
                    .any(|character| character.is_ascii_digit())
            })
            .map(|found| (found.start(), found.end()))
            .collect()
    }

    pub fn is_amount(&self, token: &str) -> bool {
        self.amount_exact.is_match(token)
    }
}

fn compile(pattern: &str, label: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("failed to compile {label} regex"))
}

/// Parses an extracted amount, dropping grouping separators.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

pub fn format_amount(value: f64) -> String {
    format!("{value:.2}")
}
