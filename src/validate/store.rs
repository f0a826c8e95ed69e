use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use serde_json::Value;
use tracing::{debug, warn};

pub const TOTAL_OVERDUE_COMPONENT: &str = "total_overdue";

/// Read-only lookup of the authoritative overdue amount.
///
/// `None` means the identifier has no usable entry: either nothing is stored
/// for it or the stored entry carries no `total_overdue` value. A stored zero
/// is returned as `Some(0.0)`.
pub trait OverdueStore {
    fn total_overdue(&self, identifier: &str) -> Option<f64>;
}

/// One `<identifier>.json` statement-of-account file per agreement.
pub struct JsonDirectoryStore {
    root: PathBuf,
}

impl JsonDirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn entry_path(&self, identifier: &str) -> PathBuf {
        self.root.join(format!("{identifier}.json"))
    }
}

impl OverdueStore for JsonDirectoryStore {
    fn total_overdue(&self, identifier: &str) -> Option<f64> {
        let path = self.entry_path(identifier);
        if !path.is_file() {
            debug!(path = %path.display(), "no statement of account on file");
            return None;
        }

        match read_statement_overdue(&path) {
            Ok(overdue) => overdue,
            Err(error) => {
                warn!(path = %path.display(), error = %error, "unreadable statement of account");
                None
            }
        }
    }
}

pub fn read_statement_overdue(path: &Path) -> Result<Option<f64>> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let statement: Value = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(overdue_from_statement(&statement))
}

/// Pulls the `total_overdue` component out of
/// `statementOfAccount.soa_summary_report[]`.
pub fn overdue_from_statement(statement: &Value) -> Option<f64> {
    statement
        .get("statementOfAccount")?
        .get("soa_summary_report")?
        .as_array()?
        .iter()
        .find(|component| {
            component.get("component").and_then(Value::as_str) == Some(TOTAL_OVERDUE_COMPONENT)
        })?
        .get("overdue")
        .and_then(numeric_value)
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => crate::patterns::parse_amount(text),
        _ => None,
    }
}

/// SQLite copy of the statement directory built by `import-store`.
pub struct SqliteStore {
    connection: Connection,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        let connection = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to open overdue store {}", db_path.display()))?;
        Ok(Self { connection })
    }

    #[cfg(test)]
    pub fn from_connection(connection: Connection) -> Self {
        Self { connection }
    }

    fn query(&self, identifier: &str) -> Result<Option<f64>> {
        let stored: Option<Option<f64>> = self
            .connection
            .query_row(
                "SELECT total_overdue FROM overdue WHERE identifier = ?1",
                params![identifier],
                |row| row.get(0),
            )
            .optional()?;
        Ok(stored.flatten())
    }
}

impl OverdueStore for SqliteStore {
    fn total_overdue(&self, identifier: &str) -> Option<f64> {
        match self.query(identifier) {
            Ok(overdue) => overdue,
            Err(error) => {
                warn!(identifier, error = %error, "overdue store query failed");
                None
            }
        }
    }
}

pub fn ensure_store_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS overdue (
              identifier TEXT PRIMARY KEY,
              total_overdue REAL,
              source_sha256 TEXT NOT NULL,
              imported_at TEXT NOT NULL
            );
            ",
        )
        .context("failed to create overdue table")
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: HashMap<String, Option<f64>>,
}

#[cfg(test)]
impl InMemoryStore {
    pub fn with_entry(mut self, identifier: &str, total_overdue: Option<f64>) -> Self {
        self.entries.insert(identifier.to_string(), total_overdue);
        self
    }
}

#[cfg(test)]
impl OverdueStore for InMemoryStore {
    fn total_overdue(&self, identifier: &str) -> Option<f64> {
        self.entries.get(identifier).copied().flatten()
    }
}
