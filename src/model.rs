use serde::{Deserialize, Serialize};

pub const REASON_NOT_SPECIFIED: &str = "Not Specified";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

impl Token {
    pub fn new(x: f64, y: f64, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaiverRecord {
    #[serde(rename = "Agreement Number")]
    pub agreement_id: String,
    #[serde(rename = "Penal Charge")]
    pub penal_charge: String,
    #[serde(rename = "Bounce Charge")]
    pub bounce_charge: String,
    #[serde(rename = "Total Amount to be Waived off")]
    pub total_waived: String,
    #[serde(rename = "Reason")]
    pub reason: String,
}

impl WaiverRecord {
    pub fn dedup_key(&self) -> (String, String, String, String) {
        (
            self.agreement_id.clone(),
            self.penal_charge.clone(),
            self.bounce_charge.clone(),
            self.total_waived.clone(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalStatus {
    Approved,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMetadata {
    pub approver_email: Option<String>,
    pub approval_timestamp: Option<String>,
    pub status: ApprovalStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    #[serde(rename = "DMS")]
    Dms,
    #[serde(rename = "Non-DMS")]
    NonDms,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dms => "DMS",
            Self::NonDms => "Non-DMS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    TextLayer,
    OcrLayout,
}

impl ExtractionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TextLayer => "text_layer",
            Self::OcrLayout => "ocr_layout",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValidationStatus {
    Passed,
    #[serde(rename = "Partial Approval")]
    PartialApproval,
    Flagged,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutcomeSubject {
    Record(WaiverRecord),
    Reference { reference_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationOutcome {
    #[serde(flatten)]
    pub subject: OutcomeSubject,
    pub database_total_overdue: Option<f64>,
    pub validation_status: ValidationStatus,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WaiverDetails {
    Records(Vec<WaiverRecord>),
    Outcomes(Vec<ValidationOutcome>),
}

impl WaiverDetails {
    pub fn len(&self) -> usize {
        match self {
            Self::Records(records) => records.len(),
            Self::Outcomes(outcomes) => outcomes.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub path: String,
    pub sha256: String,
    pub page_count: usize,
    pub processed_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferenceSummary {
    pub fin_reference_no: Vec<String>,
    pub date_time: Option<String>,
    pub is_waiver_request: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentResult {
    pub source: SourceInfo,
    pub category: Category,
    pub metadata: DocumentMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<ReferenceSummary>,
    pub waiver_details: WaiverDetails,
    pub extraction_method: ExtractionMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_strategy: Option<String>,
    pub warnings: Vec<String>,
}
