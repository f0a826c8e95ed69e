use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::extract::{
    DEFAULT_APPROVER_DOMAIN, DEFAULT_LOOKAHEAD_LINES, DEFAULT_ROW_THRESHOLD, ExtractionConfig,
};
use crate::model::Category;
use crate::source::{DEFAULT_OCR_DPI, DEFAULT_OCR_LANG, SourceConfig};

#[derive(Parser, Debug)]
#[command(
    name = "waiver-recon",
    version,
    about = "Loan-waiver document extraction and overdue reconciliation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract, validate and write a decision report per document.
    Process(ProcessArgs),
    /// Extract records and metadata without consulting the store.
    Extract(ExtractArgs),
    /// Show the stored overdue amount for one identifier.
    Lookup(LookupArgs),
    /// Load a statement-of-account directory into an SQLite store.
    ImportStore(ImportStoreArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OcrMode {
    Off,
    Auto,
    Force,
}

impl OcrMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Auto => "auto",
            Self::Force => "force",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CategoryArg {
    Auto,
    Dms,
    NonDms,
}

impl CategoryArg {
    pub fn category(self) -> Option<Category> {
        match self {
            Self::Auto => None,
            Self::Dms => Some(Category::Dms),
            Self::NonDms => Some(Category::NonDms),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExtractionArgs {
    /// Vertical distance that still joins an OCR token to the current row.
    #[arg(long, default_value_t = DEFAULT_ROW_THRESHOLD)]
    pub row_threshold: f64,

    /// Continuation lines that may be stitched onto one table row.
    #[arg(long, default_value_t = DEFAULT_LOOKAHEAD_LINES)]
    pub lookahead_lines: usize,

    #[arg(long, default_value = DEFAULT_APPROVER_DOMAIN)]
    pub approver_domain: String,

    #[arg(long, value_enum, default_value_t = OcrMode::Auto)]
    pub ocr_mode: OcrMode,

    #[arg(long, default_value = DEFAULT_OCR_LANG)]
    pub ocr_lang: String,

    #[arg(long, default_value_t = DEFAULT_OCR_DPI)]
    pub ocr_dpi: u32,

    /// Non-whitespace characters the text layer needs before OCR is skipped.
    #[arg(long, default_value_t = 20)]
    pub min_text_chars: usize,
}

impl ExtractionArgs {
    pub fn extraction_config(&self) -> ExtractionConfig {
        ExtractionConfig {
            row_threshold: self.row_threshold,
            lookahead_lines: self.lookahead_lines,
            approver_domain: self.approver_domain.clone(),
        }
    }

    pub fn source_config(&self) -> SourceConfig {
        SourceConfig {
            ocr_mode: self.ocr_mode,
            min_text_chars: self.min_text_chars,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    #[arg(long, default_value = "soa-data-server/soa_database")]
    pub store_dir: PathBuf,

    /// SQLite store built by `import-store`; used instead of --store-dir.
    #[arg(long)]
    pub store_db: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ProcessArgs {
    /// Document file (.pdf, .txt, .json tokens) or a directory of them.
    #[arg(long = "input", required = true)]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub extraction: ExtractionArgs,

    #[command(flatten)]
    pub store: StoreArgs,

    #[arg(long, value_enum, default_value_t = CategoryArg::Auto)]
    pub category: CategoryArg,

    #[arg(long, default_value = "data/decoded_output")]
    pub output_dir: PathBuf,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[command(flatten)]
    pub extraction: ExtractionArgs,

    #[arg(long, value_enum, default_value_t = CategoryArg::Auto)]
    pub category: CategoryArg,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LookupArgs {
    #[arg(long)]
    pub id: String,

    #[command(flatten)]
    pub store: StoreArgs,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ImportStoreArgs {
    #[arg(long, default_value = "soa-data-server/soa_database")]
    pub store_dir: PathBuf,

    #[arg(long)]
    pub db_path: PathBuf,
}
