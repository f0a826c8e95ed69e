use std::fs;
use std::path::PathBuf;

use rusqlite::{Connection, params};
use serde_json::json;

use super::store::InMemoryStore;
use super::*;
use crate::model::{OutcomeSubject, ValidationStatus};

fn record(id: &str, waived: &str) -> WaiverRecord {
    WaiverRecord {
        agreement_id: id.to_string(),
        penal_charge: "0".to_string(),
        bounce_charge: "0".to_string(),
        total_waived: waived.to_string(),
        reason: "Bank side issue".to_string(),
    }
}

fn scratch_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "waiver_recon_{}_{}_{}",
        label,
        std::process::id(),
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));
    fs::create_dir_all(&dir).expect("scratch dir");
    dir
}

fn statement(overdue: serde_json::Value) -> serde_json::Value {
    json!({
        "statementOfAccount": {
            "soa_summary_report": [
                { "component": "principal_outstanding", "overdue": 90000 },
                { "component": "total_overdue", "overdue": overdue }
            ]
        }
    })
}

#[test]
fn waived_equal_to_overdue_passes() {
    let store = InMemoryStore::default().with_entry("AB123456", Some(5000.0));
    let outcome = validate_record(&record("AB123456", "5,000"), &store);

    assert_eq!(outcome.validation_status, ValidationStatus::Passed);
    assert_eq!(outcome.database_total_overdue, Some(5000.0));
    assert_eq!(outcome.recommendation, "Waiver is approved");
}

#[test]
fn waived_below_overdue_is_partial_with_remaining_amount() {
    let store = InMemoryStore::default().with_entry("AB123456", Some(5000.0));
    let outcome = validate_record(&record("AB123456", "3000"), &store);

    assert_eq!(outcome.validation_status, ValidationStatus::PartialApproval);
    assert_eq!(remaining_overdue(&outcome), Some(2000.0));
    assert!(outcome.recommendation.contains("3000.00"));
    assert!(outcome.recommendation.contains("2000.00"));
}

#[test]
fn missing_entry_is_an_error_regardless_of_amount() {
    let store = InMemoryStore::default();
    for waived in ["0", "3000", "999999"] {
        let outcome = validate_record(&record("ZZ000000", waived), &store);
        assert_eq!(outcome.validation_status, ValidationStatus::Error);
        assert_eq!(outcome.database_total_overdue, None);
    }
}

#[test]
fn entry_without_overdue_value_is_absent_not_zero() {
    let store = InMemoryStore::default().with_entry("AB123456", None);
    let outcome = validate_record(&record("AB123456", "0"), &store);
    assert_eq!(outcome.validation_status, ValidationStatus::Error);

    let outcome = validate_reference("AB123456", &store);
    assert_eq!(outcome.validation_status, ValidationStatus::Error);
}

#[test]
fn stored_zero_is_a_real_comparison() {
    let store = InMemoryStore::default().with_entry("AB123456", Some(0.0));
    let outcome = validate_record(&record("AB123456", "0"), &store);
    assert_eq!(outcome.validation_status, ValidationStatus::Passed);
    assert_eq!(outcome.database_total_overdue, Some(0.0));
}

#[test]
fn reference_tiers_follow_stored_overdue() {
    let store = InMemoryStore::default()
        .with_entry("P2W1234567890", Some(1250.0))
        .with_entry("P2W0000000000", Some(0.0));

    let passed = validate_reference("p2w1234567890", &store);
    assert_eq!(passed.validation_status, ValidationStatus::Passed);
    assert_eq!(
        passed.subject,
        OutcomeSubject::Reference {
            reference_id: "P2W1234567890".to_string()
        }
    );

    let flagged = validate_reference("P2W0000000000", &store);
    assert_eq!(flagged.validation_status, ValidationStatus::Flagged);
    assert_eq!(
        flagged.recommendation,
        "Reference found but no overdue amount exists"
    );

    let missing = validate_reference("P2W9999999999", &store);
    assert_eq!(missing.validation_status, ValidationStatus::Error);
}

#[test]
fn json_directory_store_reads_summary_component() {
    let dir = scratch_dir("json_store");
    fs::write(dir.join("AB123456.json"), statement(json!(5000)).to_string()).expect("write");
    fs::write(dir.join("CD654321.json"), statement(json!("1,250.50")).to_string()).expect("write");
    fs::write(
        dir.join("EF112233.json"),
        json!({"statementOfAccount": {"soa_summary_report": []}}).to_string(),
    )
    .expect("write");
    fs::write(dir.join("GH445566.json"), "{ not json").expect("write");

    let store = JsonDirectoryStore::new(&dir);
    assert_eq!(store.total_overdue("AB123456"), Some(5000.0));
    assert_eq!(store.total_overdue("CD654321"), Some(1250.5));
    assert_eq!(store.total_overdue("EF112233"), None);
    assert_eq!(store.total_overdue("GH445566"), None);
    assert_eq!(store.total_overdue("ZZ000000"), None);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn sqlite_store_distinguishes_null_from_zero() {
    let connection = Connection::open_in_memory().expect("in-memory db");
    ensure_store_schema(&connection).expect("schema");
    for (identifier, overdue) in [("AB123456", Some(0.0)), ("CD654321", None::<f64>)] {
        connection
            .execute(
                "INSERT INTO overdue(identifier, total_overdue, source_sha256, imported_at) VALUES(?1, ?2, 'x', 'now')",
                params![identifier, overdue],
            )
            .expect("insert");
    }

    let store = SqliteStore::from_connection(connection);
    assert_eq!(store.total_overdue("AB123456"), Some(0.0));
    assert_eq!(store.total_overdue("CD654321"), None);
    assert_eq!(store.total_overdue("EF112233"), None);
}

#[test]
fn validation_does_not_touch_the_store() {
    let store = InMemoryStore::default().with_entry("AB123456", Some(5000.0));
    let records = vec![record("AB123456", "3000"), record("AB123456", "6000")];

    let first = validate_records(&records, &store);
    let second = validate_records(&records, &store);
    assert_eq!(first, second);
    assert_eq!(store.total_overdue("AB123456"), Some(5000.0));
}
