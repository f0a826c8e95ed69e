use crate::model::Category;

/// Keyword routing: table headers mark a DMS export, anything else goes to
/// the reference-only intake path.
pub fn route(text: &str) -> Category {
    if text.contains("Agreement") && (text.contains("Penal") || text.contains("Bounce")) {
        Category::Dms
    } else {
        Category::NonDms
    }
}
