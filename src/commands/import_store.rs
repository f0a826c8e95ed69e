use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, params};
use tracing::{info, warn};

use crate::cli::ImportStoreArgs;
use crate::util::{ensure_directory, now_utc_string, sha256_file};
use crate::validate::{ensure_store_schema, read_statement_overdue};

#[derive(Debug, Default, PartialEq)]
struct ImportCounts {
    imported: usize,
    without_overdue: usize,
    skipped: usize,
}

pub fn run(args: ImportStoreArgs) -> Result<()> {
    let mut statements = discover_statements(&args.store_dir)?;
    statements.sort();
    if statements.is_empty() {
        bail!("no statement files found in {}", args.store_dir.display());
    }

    if let Some(parent) = args.db_path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        ensure_directory(parent)?;
    }

    let mut connection = Connection::open(&args.db_path)
        .with_context(|| format!("failed to open {}", args.db_path.display()))?;
    configure_connection(&connection)?;
    ensure_store_schema(&connection)?;

    info!(
        store_dir = %args.store_dir.display(),
        statements = statements.len(),
        "starting store import"
    );
    let counts = import_statements(&mut connection, &statements)?;

    info!(
        db_path = %args.db_path.display(),
        imported = counts.imported,
        without_overdue = counts.without_overdue,
        skipped = counts.skipped,
        "store import completed"
    );
    Ok(())
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

fn import_statements(connection: &mut Connection, statements: &[PathBuf]) -> Result<ImportCounts> {
    let imported_at = now_utc_string();
    let mut counts = ImportCounts::default();
    let tx = connection.transaction()?;

    {
        let mut statement = tx.prepare(
            "
            INSERT INTO overdue(identifier, total_overdue, source_sha256, imported_at)
            VALUES(?1, ?2, ?3, ?4)
            ON CONFLICT(identifier) DO UPDATE SET
              total_overdue=excluded.total_overdue,
              source_sha256=excluded.source_sha256,
              imported_at=excluded.imported_at
            ",
        )?;

        for path in statements {
            let Some(identifier) = statement_identifier(path) else {
                warn!(path = %path.display(), "skipping statement with non UTF-8 name");
                counts.skipped += 1;
                continue;
            };

            let total_overdue = match read_statement_overdue(path) {
                Ok(overdue) => overdue,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable statement");
                    counts.skipped += 1;
                    continue;
                }
            };
            let sha256 = sha256_file(path)?;

            statement
                .execute(params![identifier, total_overdue, sha256, imported_at])
                .with_context(|| format!("failed to import {}", path.display()))?;

            if total_overdue.is_none() {
                counts.without_overdue += 1;
            }
            counts.imported += 1;
        }
    }

    tx.commit()?;
    Ok(counts)
}

fn statement_identifier(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(ToOwned::to_owned)
}

fn discover_statements(store_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut statements = Vec::new();

    let entries = fs::read_dir(store_dir)
        .with_context(|| format!("failed to read {}", store_dir.display()))?;

    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", store_dir.display()))?;
        let path = entry.path();

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json && path.is_file() {
            statements.push(path);
        }
    }

    Ok(statements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{OverdueStore, SqliteStore};

    fn scratch_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "waiver-recon-import-{label}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        ensure_directory(&dir).expect("scratch dir");
        dir
    }

    fn statement(overdue: &str) -> String {
        format!(
            r#"{{"statementOfAccount": {{"soa_summary_report": [
                {{"component": "principal_outstanding", "overdue": 90000}},
                {{"component": "total_overdue", "overdue": {overdue}}}
            ]}}}}"#
        )
    }

    #[test]
    fn import_keeps_missing_overdue_distinct_from_zero() {
        let dir = scratch_dir("distinct");
        fs::write(dir.join("AB123456.json"), statement("5000")).expect("write");
        fs::write(dir.join("CD654321.json"), statement("0")).expect("write");
        fs::write(
            dir.join("EF112233.json"),
            r#"{"statementOfAccount": {"soa_summary_report": []}}"#,
        )
        .expect("write");
        fs::write(dir.join("GH445566.json"), "{not json").expect("write");

        let mut statements = discover_statements(&dir).expect("discover");
        statements.sort();

        let mut connection = Connection::open_in_memory().expect("in-memory db");
        ensure_store_schema(&connection).expect("schema");
        let counts = import_statements(&mut connection, &statements).expect("import");

        assert_eq!(
            counts,
            ImportCounts {
                imported: 3,
                without_overdue: 1,
                skipped: 1,
            }
        );

        let store = SqliteStore::from_connection(connection);
        assert_eq!(store.total_overdue("AB123456"), Some(5000.0));
        assert_eq!(store.total_overdue("CD654321"), Some(0.0));
        assert_eq!(store.total_overdue("EF112233"), None);
        assert_eq!(store.total_overdue("GH445566"), None);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn reimport_replaces_previous_values() {
        let dir = scratch_dir("replace");
        let path = dir.join("AB123456.json");
        let mut connection = Connection::open_in_memory().expect("in-memory db");
        ensure_store_schema(&connection).expect("schema");

        fs::write(&path, statement("5000")).expect("write");
        import_statements(&mut connection, std::slice::from_ref(&path)).expect("first import");
        fs::write(&path, statement("1200.50")).expect("rewrite");
        import_statements(&mut connection, std::slice::from_ref(&path)).expect("second import");

        let store = SqliteStore::from_connection(connection);
        assert_eq!(store.total_overdue("AB123456"), Some(1200.5));

        let _ = fs::remove_dir_all(&dir);
    }
}
