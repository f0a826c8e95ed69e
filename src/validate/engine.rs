use tracing::debug;

use super::store::OverdueStore;
use crate::model::{OutcomeSubject, ValidationOutcome, ValidationStatus, WaiverRecord};
use crate::patterns::{format_amount, parse_amount};

/// Compares one extracted waiver against the stored overdue amount.
pub fn validate_record(record: &WaiverRecord, store: &dyn OverdueStore) -> ValidationOutcome {
    let stored = store.total_overdue(&record.agreement_id);
    let subject = OutcomeSubject::Record(record.clone());

    let Some(overdue) = stored else {
        debug!(agreement_id = %record.agreement_id, "no overdue entry");
        return outcome(
            subject,
            None,
            ValidationStatus::Error,
            format!("Error: SOA record for {} not found", record.agreement_id),
        );
    };

    let Some(waived) = parse_amount(&record.total_waived) else {
        return outcome(
            subject,
            Some(overdue),
            ValidationStatus::Error,
            format!(
                "Error: waived amount '{}' for {} is not numeric",
                record.total_waived, record.agreement_id
            ),
        );
    };

    if waived >= overdue {
        outcome(
            subject,
            Some(overdue),
            ValidationStatus::Passed,
            "Waiver is approved".to_string(),
        )
    } else {
        let remaining = round_cents(overdue - waived);
        outcome(
            subject,
            Some(overdue),
            ValidationStatus::PartialApproval,
            format!(
                "Waiver is approved only for {} amount and the left overdue amount is {}",
                format_amount(waived),
                format_amount(remaining)
            ),
        )
    }
}

/// Checks a bare reference identifier from the intake path.
pub fn validate_reference(reference: &str, store: &dyn OverdueStore) -> ValidationOutcome {
    let reference_id = reference.trim().to_ascii_uppercase();
    let stored = store.total_overdue(&reference_id);
    let subject = OutcomeSubject::Reference {
        reference_id: reference_id.clone(),
    };

    match stored {
        None => outcome(
            subject,
            None,
            ValidationStatus::Error,
            format!("Error: SOA record for {reference_id} not found"),
        ),
        Some(overdue) if overdue > 0.0 => outcome(
            subject,
            Some(overdue),
            ValidationStatus::Passed,
            "Waiver is approved".to_string(),
        ),
        Some(overdue) => outcome(
            subject,
            Some(overdue),
            ValidationStatus::Flagged,
            "Reference found but no overdue amount exists".to_string(),
        ),
    }
}

pub fn remaining_overdue(outcome: &ValidationOutcome) -> Option<f64> {
    let OutcomeSubject::Record(record) = &outcome.subject else {
        return None;
    };
    let overdue = outcome.database_total_overdue?;
    let waived = parse_amount(&record.total_waived)?;
    Some(round_cents((overdue - waived).max(0.0)))
}

fn outcome(
    subject: OutcomeSubject,
    database_total_overdue: Option<f64>,
    validation_status: ValidationStatus,
    recommendation: String,
) -> ValidationOutcome {
    ValidationOutcome {
        subject,
        database_total_overdue,
        validation_status,
        recommendation,
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
