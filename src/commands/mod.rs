pub mod extract;
pub mod import_store;
pub mod lookup;
pub mod process;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::info;

use crate::cli::StoreArgs;
use crate::validate::{JsonDirectoryStore, OverdueStore, SqliteStore};

const DOCUMENT_EXTENSIONS: [&str; 4] = ["pdf", "txt", "text", "json"];

pub(crate) fn open_store(args: &StoreArgs) -> Result<Box<dyn OverdueStore>> {
    if let Some(db_path) = &args.store_db {
        info!(path = %db_path.display(), "using sqlite overdue store");
        return Ok(Box::new(SqliteStore::open(db_path)?));
    }

    if !args.store_dir.is_dir() {
        bail!(
            "overdue store directory not found: {}",
            args.store_dir.display()
        );
    }
    info!(path = %args.store_dir.display(), "using statement directory store");
    Ok(Box::new(JsonDirectoryStore::new(&args.store_dir)))
}

/// Expands directories into their supported documents, sorted by path.
/// Explicit file arguments are kept as given.
pub(crate) fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found = discover_documents(input)?;
            found.sort();
            if found.is_empty() {
                bail!("no documents found in {}", input.display());
            }
            documents.extend(found);
        } else if input.is_file() {
            documents.push(input.clone());
        } else {
            bail!("input not found: {}", input.display());
        }
    }

    Ok(documents)
}

fn discover_documents(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();

    let entries = fs::read_dir(directory)
        .with_context(|| format!("failed to read {}", directory.display()))?;

    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", directory.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        if is_supported_document(&path) {
            documents.push(path);
        }
    }

    Ok(documents)
}

fn is_supported_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            DOCUMENT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

pub(crate) fn write_json_stdout<T: Serialize>(value: &T) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, value).context("failed to serialize json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}
