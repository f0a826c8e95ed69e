use std::fs;
use std::path::Path;

use super::SourceError;
use crate::model::Token;

/// Plain text, with form feeds separating pages as `pdftotext` writes them.
pub fn read_text_file(path: &Path) -> Result<Vec<String>, SourceError> {
    let raw = fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(split_pages(&raw))
}

/// JSON array of pages, each an array of `{x, y, text}` tokens.
pub fn read_token_file(path: &Path) -> Result<Vec<Vec<Token>>, SourceError> {
    let raw = fs::read(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&raw).map_err(|error| SourceError::Malformed {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })
}

pub(super) fn split_pages(raw: &str) -> Vec<String> {
    let mut pages: Vec<String> = raw
        .split('\u{000C}')
        .map(|chunk| chunk.replace('\u{0000}', ""))
        .collect();

    while let Some(last_page) = pages.last() {
        if last_page.trim().is_empty() && pages.len() > 1 {
            pages.pop();
            continue;
        }
        break;
    }

    pages
}
