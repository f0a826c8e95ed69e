use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::cli::OcrMode;
use crate::extract::ExtractionInput;
use crate::model::{ExtractionMethod, Token};
use crate::util::non_whitespace_char_count;

mod files;
mod poppler;
mod tesseract;

pub use files::{read_text_file, read_token_file};
pub use poppler::PdfToText;
pub use tesseract::{DEFAULT_OCR_DPI, DEFAULT_OCR_LANG, TesseractLayout};

/// Failure of an external text/token collaborator. Nothing at this layer can
/// recover from it.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{tool} is unavailable: {reason}")]
    Unavailable { tool: &'static str, reason: String },

    #[error("{tool} failed on {}: {reason}", path.display())]
    ToolFailed {
        tool: &'static str,
        path: PathBuf,
        reason: String,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed input {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

/// Digital text layer of a PDF, one string per page.
pub trait TextLayer {
    fn extract_pages(&self, pdf_path: &Path) -> Result<Vec<String>, SourceError>;
}

/// Positioned OCR tokens of a PDF, one collection per page.
pub trait TokenLayer {
    fn extract_tokens(&self, pdf_path: &Path) -> Result<Vec<Vec<Token>>, SourceError>;
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub ocr_mode: OcrMode,
    pub min_text_chars: usize,
}

pub struct LoadedDocument {
    pub input: ExtractionInput,
    pub method: ExtractionMethod,
    pub warnings: Vec<String>,
}

pub fn load_document(
    path: &Path,
    config: &SourceConfig,
    text_layer: &dyn TextLayer,
    token_layer: &dyn TokenLayer,
) -> Result<LoadedDocument, SourceError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => load_pdf(path, config, text_layer, token_layer),
        "txt" | "text" => Ok(LoadedDocument {
            input: ExtractionInput::Text(read_text_file(path)?),
            method: ExtractionMethod::TextLayer,
            warnings: Vec::new(),
        }),
        "json" => Ok(LoadedDocument {
            input: ExtractionInput::Tokens(read_token_file(path)?),
            method: ExtractionMethod::OcrLayout,
            warnings: Vec::new(),
        }),
        _ => Err(SourceError::Malformed {
            path: path.to_path_buf(),
            reason: format!("unsupported input type '{extension}'"),
        }),
    }
}

fn load_pdf(
    path: &Path,
    config: &SourceConfig,
    text_layer: &dyn TextLayer,
    token_layer: &dyn TokenLayer,
) -> Result<LoadedDocument, SourceError> {
    if matches!(config.ocr_mode, OcrMode::Force) {
        let pages = token_layer.extract_tokens(path)?;
        info!(path = %path.display(), pages = pages.len(), "using OCR layout (forced)");
        return Ok(LoadedDocument {
            input: ExtractionInput::Tokens(pages),
            method: ExtractionMethod::OcrLayout,
            warnings: Vec::new(),
        });
    }

    let pages = text_layer.extract_pages(path)?;
    let text_chars = pages
        .iter()
        .map(|page| non_whitespace_char_count(page))
        .sum::<usize>();

    if text_chars >= config.min_text_chars || matches!(config.ocr_mode, OcrMode::Off) {
        info!(path = %path.display(), pages = pages.len(), text_chars, "using text layer");
        return Ok(LoadedDocument {
            input: ExtractionInput::Text(pages),
            method: ExtractionMethod::TextLayer,
            warnings: Vec::new(),
        });
    }

    match token_layer.extract_tokens(path) {
        Ok(token_pages) => {
            info!(
                path = %path.display(),
                pages = token_pages.len(),
                text_chars,
                "text layer too sparse, using OCR layout"
            );
            Ok(LoadedDocument {
                input: ExtractionInput::Tokens(token_pages),
                method: ExtractionMethod::OcrLayout,
                warnings: Vec::new(),
            })
        }
        Err(error) => {
            let message = format!(
                "OCR fallback failed for {}: {}; continuing with sparse text layer",
                path.display(),
                error
            );
            warn!(path = %path.display(), error = %error, "OCR fallback failed");
            Ok(LoadedDocument {
                input: ExtractionInput::Text(pages),
                method: ExtractionMethod::TextLayer,
                warnings: vec![message],
            })
        }
    }
}
