use anyhow::Result;
use tracing::debug;

use crate::model::{DocumentMetadata, ReferenceSummary, Token};
use crate::patterns::Patterns;

mod dedup;
mod metadata;
mod noise;
mod reason;
mod row_grouper;
mod row_parser;
mod strategy;
mod table;
#[cfg(test)]
mod tests;

pub use dedup::dedup_records;
pub use metadata::DEFAULT_APPROVER_DOMAIN;
pub use row_grouper::DEFAULT_ROW_THRESHOLD;
pub use table::DEFAULT_LOOKAHEAD_LINES;

use noise::NoiseFilter;
use row_grouper::{group_rows, rows_to_text};
use row_parser::RowParser;
use strategy::{ChainOutcome, StrategyChain};
use table::TableScanner;

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub row_threshold: f64,
    pub lookahead_lines: usize,
    pub approver_domain: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            row_threshold: DEFAULT_ROW_THRESHOLD,
            lookahead_lines: DEFAULT_LOOKAHEAD_LINES,
            approver_domain: DEFAULT_APPROVER_DOMAIN.to_string(),
        }
    }
}

/// What the text/token source handed over for one document.
#[derive(Debug, Clone)]
pub enum ExtractionInput {
    /// Linear text, one entry per page.
    Text(Vec<String>),
    /// Positioned OCR tokens, one collection per page.
    Tokens(Vec<Vec<Token>>),
}

impl ExtractionInput {
    pub fn page_count(&self) -> usize {
        match self {
            Self::Text(pages) => pages.len(),
            Self::Tokens(pages) => pages.len(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PreparedDocument {
    /// All pages flattened into one line sequence.
    pub text: String,
    pub token_rows: Option<Vec<Vec<Token>>>,
}

pub struct Extractor {
    parser: RowParser,
    noise: NoiseFilter,
    chain: StrategyChain,
    config: ExtractionConfig,
}

impl Extractor {
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        Ok(Self {
            parser: RowParser::new()?,
            noise: NoiseFilter::new()?,
            chain: StrategyChain::standard(),
            config,
        })
    }

    pub fn patterns(&self) -> &Patterns {
        &self.parser.patterns
    }

    pub fn prepare(&self, input: ExtractionInput) -> PreparedDocument {
        match input {
            ExtractionInput::Text(pages) => PreparedDocument {
                text: pages.join("\n"),
                token_rows: None,
            },
            ExtractionInput::Tokens(pages) => {
                let mut rows = Vec::<Vec<Token>>::new();
                for page in &pages {
                    rows.extend(group_rows(page, self.config.row_threshold));
                }
                PreparedDocument {
                    text: rows_to_text(&rows),
                    token_rows: Some(rows),
                }
            }
        }
    }

    /// Runs the strategy chain and deduplicates whatever it kept.
    pub fn extract_records(&self, document: &PreparedDocument) -> ChainOutcome {
        let scanner = TableScanner {
            parser: &self.parser,
            noise: &self.noise,
            lookahead_lines: self.config.lookahead_lines,
        };

        let mut outcome = self.chain.run(&scanner, document);
        let parsed = outcome.records.len();
        outcome.records = dedup_records(std::mem::take(&mut outcome.records));
        debug!(
            strategy = outcome.strategy.unwrap_or("none"),
            parsed,
            unique = outcome.records.len(),
            "row extraction finished"
        );

        outcome
    }

    pub fn extract_metadata(&self, document: &PreparedDocument) -> DocumentMetadata {
        metadata::extract_metadata(
            self.patterns(),
            &document.text,
            &self.config.approver_domain,
        )
    }

    pub fn extract_references(&self, document: &PreparedDocument) -> ReferenceSummary {
        metadata::extract_references(self.patterns(), &document.text)
    }
}
