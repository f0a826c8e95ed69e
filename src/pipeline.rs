use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::extract::Extractor;
use crate::model::{Category, DocumentResult, SourceInfo, ValidationStatus, WaiverDetails};
use crate::router::route;
use crate::source::{SourceConfig, TextLayer, TokenLayer, load_document};
use crate::util::{now_utc_string, sha256_file};
use crate::validate::{OverdueStore, remaining_overdue, validate_records, validate_references};

/// Per-document wiring from source to decision report. Every collaborator is
/// injected and only read.
pub struct Pipeline<'a> {
    pub extractor: &'a Extractor,
    pub source_config: &'a SourceConfig,
    pub text_layer: &'a dyn TextLayer,
    pub token_layer: &'a dyn TokenLayer,
    /// Without a store the report carries the extracted records unvalidated.
    pub store: Option<&'a dyn OverdueStore>,
}

impl Pipeline<'_> {
    pub fn process(&self, path: &Path, category: Option<Category>) -> Result<DocumentResult> {
        let sha256 = sha256_file(path)?;
        let loaded = load_document(path, self.source_config, self.text_layer, self.token_layer)
            .with_context(|| format!("text source unavailable for {}", path.display()))?;

        let page_count = loaded.input.page_count();
        let document = self.extractor.prepare(loaded.input);
        let category = category.unwrap_or_else(|| route(&document.text));
        let metadata = self.extractor.extract_metadata(&document);

        let (waiver_details, references, row_strategy) = match category {
            Category::Dms => {
                let extraction = self.extractor.extract_records(&document);
                let details = match self.store {
                    Some(store) => {
                        WaiverDetails::Outcomes(validate_records(&extraction.records, store))
                    }
                    None => WaiverDetails::Records(extraction.records),
                };
                (details, None, extraction.strategy.map(str::to_string))
            }
            Category::NonDms => {
                let summary = self.extractor.extract_references(&document);
                let details = match self.store {
                    Some(store) => WaiverDetails::Outcomes(validate_references(
                        &summary.fin_reference_no,
                        store,
                    )),
                    None => WaiverDetails::Records(Vec::new()),
                };
                (details, Some(summary), None)
            }
        };

        log_decisions(path, category, &waiver_details);

        Ok(DocumentResult {
            source: SourceInfo {
                path: path.display().to_string(),
                sha256,
                page_count,
                processed_at: now_utc_string(),
            },
            category,
            metadata,
            references,
            waiver_details,
            extraction_method: loaded.method,
            row_strategy,
            warnings: loaded.warnings,
        })
    }
}

fn log_decisions(path: &Path, category: Category, details: &WaiverDetails) {
    let WaiverDetails::Outcomes(outcomes) = details else {
        info!(
            path = %path.display(),
            category = category.as_str(),
            records = details.len(),
            "extracted document"
        );
        return;
    };

    let count = |status: ValidationStatus| {
        outcomes
            .iter()
            .filter(|outcome| outcome.validation_status == status)
            .count()
    };
    let remaining = outcomes.iter().filter_map(remaining_overdue).sum::<f64>();

    info!(
        path = %path.display(),
        category = category.as_str(),
        passed = count(ValidationStatus::Passed),
        partial = count(ValidationStatus::PartialApproval),
        flagged = count(ValidationStatus::Flagged),
        errors = count(ValidationStatus::Error),
        remaining_overdue = remaining,
        "validated document"
    );
}
