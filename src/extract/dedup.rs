use indexmap::IndexMap;

use crate::model::WaiverRecord;

/// Collapses records sharing `(agreement_id, penal, bounce, total)`.
///
/// Survivors keep the position of the first occurrence of their key while the
/// record itself is the last one seen for that key.
pub fn dedup_records(records: Vec<WaiverRecord>) -> Vec<WaiverRecord> {
    let mut unique = IndexMap::<(String, String, String, String), WaiverRecord>::new();
    for record in records {
        unique.insert(record.dedup_key(), record);
    }
    unique.into_values().collect()
}
