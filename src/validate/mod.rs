mod engine;
mod store;
#[cfg(test)]
mod tests;

pub use engine::{remaining_overdue, validate_record, validate_reference};
#[cfg(test)]
pub use store::InMemoryStore;
pub use store::{
    JsonDirectoryStore, OverdueStore, SqliteStore, ensure_store_schema, read_statement_overdue,
};

use crate::model::{ValidationOutcome, WaiverRecord};

pub fn validate_records(
    records: &[WaiverRecord],
    store: &dyn OverdueStore,
) -> Vec<ValidationOutcome> {
    records
        .iter()
        .map(|record| validate_record(record, store))
        .collect()
}

pub fn validate_references(
    references: &[String],
    store: &dyn OverdueStore,
) -> Vec<ValidationOutcome> {
    references
        .iter()
        .map(|reference| validate_reference(reference, store))
        .collect()
}
