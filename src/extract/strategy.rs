use tracing::debug;

use super::PreparedDocument;
use super::row_grouper::row_texts;
use super::table::TableScanner;
use crate::model::WaiverRecord;

/// One way of producing candidate rows from a prepared document.
pub trait RowStrategy {
    fn name(&self) -> &'static str;

    fn applies_to(&self, _document: &PreparedDocument) -> bool {
        true
    }

    fn produce(&self, scanner: &TableScanner<'_>, document: &PreparedDocument)
    -> Vec<WaiverRecord>;
}

pub struct TokenRows;

impl RowStrategy for TokenRows {
    fn name(&self) -> &'static str {
        "token_rows"
    }

    fn applies_to(&self, document: &PreparedDocument) -> bool {
        document.token_rows.is_some()
    }

    fn produce(
        &self,
        scanner: &TableScanner<'_>,
        document: &PreparedDocument,
    ) -> Vec<WaiverRecord> {
        document
            .token_rows
            .iter()
            .flatten()
            .filter_map(|row| scanner.parser.parse_tokens(&row_texts(row)))
            .collect()
    }
}

pub struct LineScan;

impl RowStrategy for LineScan {
    fn name(&self) -> &'static str {
        "line_scan"
    }

    fn produce(
        &self,
        scanner: &TableScanner<'_>,
        document: &PreparedDocument,
    ) -> Vec<WaiverRecord> {
        scanner.line_scan(&document.text)
    }
}

pub struct SegmentScan;

impl RowStrategy for SegmentScan {
    fn name(&self) -> &'static str {
        "segment_scan"
    }

    fn produce(
        &self,
        scanner: &TableScanner<'_>,
        document: &PreparedDocument,
    ) -> Vec<WaiverRecord> {
        scanner.segment_scan(&document.text)
    }
}

/// Rows kept from a chain run, plus which strategies were tried.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainOutcome {
    pub records: Vec<WaiverRecord>,
    /// Strategy whose output was kept; the last one tried when all were empty.
    pub strategy: Option<&'static str>,
    pub attempted: Vec<&'static str>,
}

/// Ordered strategies; the first one to yield rows wins.
pub struct StrategyChain {
    strategies: Vec<Box<dyn RowStrategy>>,
}

impl StrategyChain {
    pub fn new(strategies: Vec<Box<dyn RowStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(TokenRows),
            Box::new(LineScan),
            Box::new(SegmentScan),
        ])
    }

    pub fn run(&self, scanner: &TableScanner<'_>, document: &PreparedDocument) -> ChainOutcome {
        let mut outcome = ChainOutcome::default();

        for strategy in &self.strategies {
            if !strategy.applies_to(document) {
                continue;
            }

            let records = strategy.produce(scanner, document);
            outcome.attempted.push(strategy.name());
            outcome.strategy = Some(strategy.name());
            if !records.is_empty() {
                outcome.records = records;
                return outcome;
            }
            debug!(strategy = strategy.name(), "strategy produced no rows, falling back");
        }

        outcome
    }
}
