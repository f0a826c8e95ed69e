use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use chrono::Utc;
use tracing::debug;

use super::poppler::{command_available, pdf_page_count, run_tool};
use super::{SourceError, TokenLayer};
use crate::model::Token;

pub const DEFAULT_OCR_LANG: &str = "eng";
pub const DEFAULT_OCR_DPI: u32 = 300;

const TSV_COLUMNS: usize = 12;
const WORD_LEVEL: &str = "5";

/// Renders pages with `pdftoppm` and reads word boxes from `tesseract` TSV
/// output. Tool availability is probed once per handle.
pub struct TesseractLayout {
    lang: String,
    dpi: u32,
    tools_available: OnceLock<Option<&'static str>>,
}

impl TesseractLayout {
    pub fn new(lang: impl Into<String>, dpi: u32) -> Self {
        Self {
            lang: lang.into(),
            dpi,
            tools_available: OnceLock::new(),
        }
    }

    fn ensure_tools(&self) -> Result<(), SourceError> {
        let missing = self.tools_available.get_or_init(|| {
            ["pdfinfo", "pdftoppm", "tesseract"]
                .into_iter()
                .find(|tool| !command_available(tool))
        });

        match *missing {
            Some(tool) => Err(SourceError::Unavailable {
                tool,
                reason: "not found on PATH".to_string(),
            }),
            None => Ok(()),
        }
    }

    fn ocr_page(&self, pdf_path: &Path, page_number: usize) -> Result<Vec<Token>, SourceError> {
        let output_root = scratch_image_root(pdf_path, page_number);
        let png_path = PathBuf::from(format!("{}.png", output_root.display()));

        run_tool(
            "pdftoppm",
            Command::new("pdftoppm")
                .arg("-f")
                .arg(page_number.to_string())
                .arg("-l")
                .arg(page_number.to_string())
                .arg("-r")
                .arg(self.dpi.to_string())
                .arg("-singlefile")
                .arg("-png")
                .arg(pdf_path)
                .arg(&output_root),
            pdf_path,
        )?;

        if !png_path.exists() {
            return Err(SourceError::ToolFailed {
                tool: "pdftoppm",
                path: pdf_path.to_path_buf(),
                reason: format!("no image produced for page {page_number}"),
            });
        }

        let result = run_tool(
            "tesseract",
            Command::new("tesseract")
                .arg(&png_path)
                .arg("stdout")
                .arg("-l")
                .arg(&self.lang)
                .arg("tsv"),
            pdf_path,
        );
        let _ = fs::remove_file(&png_path);
        let output = result?;

        let tokens = parse_tesseract_tsv(&String::from_utf8_lossy(&output.stdout));
        debug!(page = page_number, tokens = tokens.len(), "ocr page tokens");
        Ok(tokens)
    }
}

impl TokenLayer for TesseractLayout {
    fn extract_tokens(&self, pdf_path: &Path) -> Result<Vec<Vec<Token>>, SourceError> {
        self.ensure_tools()?;

        let page_count = pdf_page_count(pdf_path)?;
        (1..=page_count)
            .map(|page_number| self.ocr_page(pdf_path, page_number))
            .collect()
    }
}

fn scratch_image_root(pdf_path: &Path, page_number: usize) -> PathBuf {
    let pdf_stem = pdf_path
        .file_stem()
        .and_then(|value| value.to_str())
        .unwrap_or("pdf");
    let safe_stem = pdf_stem
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() {
                character
            } else {
                '_'
            }
        })
        .collect::<String>();

    let stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    std::env::temp_dir().join(format!(
        "waiver_ocr_{}_{}_{}_{}",
        safe_stem,
        std::process::id(),
        page_number,
        stamp
    ))
}

/// Converts word rows of `tesseract ... tsv` into tokens at the box centre.
pub(super) fn parse_tesseract_tsv(tsv: &str) -> Vec<Token> {
    tsv.lines()
        .skip(1)
        .filter_map(|line| {
            let columns = line.split('\t').collect::<Vec<&str>>();
            if columns.len() < TSV_COLUMNS || columns[0] != WORD_LEVEL {
                return None;
            }

            let confidence = columns[10].trim().parse::<f64>().ok()?;
            let text = columns[11].trim();
            if confidence < 0.0 || text.is_empty() {
                return None;
            }

            let left = columns[6].trim().parse::<f64>().ok()?;
            let top = columns[7].trim().parse::<f64>().ok()?;
            let width = columns[8].trim().parse::<f64>().ok()?;
            let height = columns[9].trim().parse::<f64>().ok()?;

            Some(Token::new(left + width / 2.0, top + height / 2.0, text))
        })
        .collect()
}
