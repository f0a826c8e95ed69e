use std::path::Path;
use std::process::{Command, Output};

use super::files::split_pages;
use super::{SourceError, TextLayer};

/// `pdftotext` text layer, laid out to keep table columns on one line.
#[derive(Debug, Default)]
pub struct PdfToText;

impl TextLayer for PdfToText {
    fn extract_pages(&self, pdf_path: &Path) -> Result<Vec<String>, SourceError> {
        let output = run_tool(
            "pdftotext",
            Command::new("pdftotext")
                .arg("-layout")
                .arg("-enc")
                .arg("UTF-8")
                .arg(pdf_path)
                .arg("-"),
            pdf_path,
        )?;

        let raw = String::from_utf8_lossy(&output.stdout);
        Ok(split_pages(&raw))
    }
}

pub(super) fn pdf_page_count(pdf_path: &Path) -> Result<usize, SourceError> {
    let output = run_tool(
        "pdfinfo",
        Command::new("pdfinfo").arg(pdf_path),
        pdf_path,
    )?;

    let info = String::from_utf8_lossy(&output.stdout);
    parse_page_count(&info).ok_or_else(|| SourceError::ToolFailed {
        tool: "pdfinfo",
        path: pdf_path.to_path_buf(),
        reason: "no page count reported".to_string(),
    })
}

pub(super) fn parse_page_count(info: &str) -> Option<usize> {
    info.lines().find_map(|line| {
        let value = line.strip_prefix("Pages:")?;
        value.trim().parse::<usize>().ok()
    })
}

pub(super) fn run_tool(
    tool: &'static str,
    command: &mut Command,
    pdf_path: &Path,
) -> Result<Output, SourceError> {
    let output = command.output().map_err(|error| SourceError::Unavailable {
        tool,
        reason: error.to_string(),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SourceError::ToolFailed {
            tool,
            path: pdf_path.to_path_buf(),
            reason: format!("non-zero exit status: {}", stderr.trim()),
        });
    }

    Ok(output)
}

pub(super) fn command_available(program: &str) -> bool {
    Command::new(program).arg("-v").output().is_ok()
}
