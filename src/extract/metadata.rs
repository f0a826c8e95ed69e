use std::collections::HashSet;

use crate::model::{ApprovalStatus, DocumentMetadata, ReferenceSummary};
use crate::patterns::Patterns;
use crate::util::collapse_whitespace;

pub const DEFAULT_APPROVER_DOMAIN: &str = "outlook.com";

pub fn extract_metadata(
    patterns: &Patterns,
    text: &str,
    approver_domain: &str,
) -> DocumentMetadata {
    DocumentMetadata {
        approver_email: approver_email(patterns, text, approver_domain),
        approval_timestamp: patterns
            .timestamp
            .find(text)
            .map(|found| collapse_whitespace(found.as_str())),
        status: approval_status(text),
    }
}

fn approver_email(patterns: &Patterns, text: &str, approver_domain: &str) -> Option<String> {
    for captures in patterns.from_label.captures_iter(text) {
        let Some(value) = captures.get(1).map(|value| value.as_str().trim()) else {
            continue;
        };
        if patterns.email_exact.is_match(value) {
            return Some(value.to_string());
        }
        if let Some(found) = patterns.email.find(value) {
            return Some(found.as_str().to_string());
        }
    }

    let domain = approver_domain.trim().trim_start_matches('@').to_ascii_lowercase();
    if domain.is_empty() {
        return None;
    }
    patterns
        .email
        .find_iter(text)
        .map(|found| found.as_str())
        .find(|address| {
            let lower = address.to_ascii_lowercase();
            lower.ends_with(&format!("@{domain}")) || lower.ends_with(&format!(".{domain}"))
        })
        .map(ToOwned::to_owned)
}

/// Any mention of "approved" counts, negated or not.
fn approval_status(text: &str) -> ApprovalStatus {
    if text.to_lowercase().contains("approved") {
        ApprovalStatus::Approved
    } else {
        ApprovalStatus::Pending
    }
}

pub fn extract_references(patterns: &Patterns, text: &str) -> ReferenceSummary {
    let mut seen = HashSet::<String>::new();
    let mut references = Vec::<String>::new();
    for found in patterns.reference.find_iter(text) {
        let normalized = found.as_str().to_ascii_uppercase();
        if seen.insert(normalized.clone()) {
            references.push(normalized);
        }
    }

    let date_time = patterns
        .date_label
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|value| collapse_whitespace(value.as_str()))
        .filter(|value| !value.is_empty());

    ReferenceSummary {
        fin_reference_no: references,
        date_time,
        is_waiver_request: text.to_lowercase().contains("waiver"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> Patterns {
        Patterns::new().expect("patterns compile")
    }

    #[test]
    fn approver_prefers_from_label() {
        let text = "cc: audit@outlook.com\nFrom: Ops Desk <ops.desk@corp.example.in>\nSent: 2024-03-05 10:15";
        let metadata = extract_metadata(&patterns(), text, DEFAULT_APPROVER_DOMAIN);
        assert_eq!(
            metadata.approver_email.as_deref(),
            Some("ops.desk@corp.example.in")
        );
        assert_eq!(metadata.approval_timestamp.as_deref(), Some("2024-03-05 10:15"));
    }

    #[test]
    fn approver_accepts_bare_address_after_label() {
        let text = "From approver@outlook.com\nApproved";
        let metadata = extract_metadata(&patterns(), text, DEFAULT_APPROVER_DOMAIN);
        assert_eq!(metadata.approver_email.as_deref(), Some("approver@outlook.com"));
        assert_eq!(metadata.status, ApprovalStatus::Approved);
    }

    #[test]
    fn from_label_value_stays_on_its_own_line() {
        let text = "Request forwarded from\nteam.lead@gmail.com\nFrom: Head Ops <head.ops@outlook.com>";
        let metadata = extract_metadata(&patterns(), text, DEFAULT_APPROVER_DOMAIN);
        assert_eq!(metadata.approver_email.as_deref(), Some("head.ops@outlook.com"));
    }

    #[test]
    fn approver_falls_back_to_organisation_domain() {
        let text = "Forwarded by someone@gmail.com\nreviewed by head.ops@outlook.com";
        let metadata = extract_metadata(&patterns(), text, DEFAULT_APPROVER_DOMAIN);
        assert_eq!(metadata.approver_email.as_deref(), Some("head.ops@outlook.com"));
        assert_eq!(metadata.approval_timestamp, None);
        assert_eq!(metadata.status, ApprovalStatus::Pending);
    }

    #[test]
    fn approver_is_absent_without_matching_domain() {
        let text = "someone@gmail.com wrote";
        let metadata = extract_metadata(&patterns(), text, DEFAULT_APPROVER_DOMAIN);
        assert_eq!(metadata.approver_email, None);
    }

    #[test]
    fn negated_approval_still_reads_as_approved() {
        let metadata = extract_metadata(&patterns(), "This is NOT APPROVED yet", "");
        assert_eq!(metadata.status, ApprovalStatus::Approved);
    }

    #[test]
    fn references_are_uppercased_and_deduplicated_in_order() {
        let text = "LAN p2w1234567890 and P2W1234567890, also X9Y000111222\nDate: 5 March 2024 10:15\nwaiver requested";
        let summary = extract_references(&patterns(), text);
        assert_eq!(
            summary.fin_reference_no,
            vec!["P2W1234567890".to_string(), "X9Y000111222".to_string()]
        );
        assert_eq!(summary.date_time.as_deref(), Some("5 March 2024 10:15"));
        assert!(summary.is_waiver_request);
    }
}
