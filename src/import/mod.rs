mod csv_import;

pub(crate) use csv_import::{ingest, ImportOutcome};

use anyhow::{Context, Result};
use std::path::Path;

use crate::db::Database;
use crate::notify::{Notification, Notifier};

/// File-level entry point: read the source, run the pipeline, report.
/// A success notification goes out when anything was imported; a failure
/// anywhere (unreadable source included) produces the failure notification
/// and propagates the error.
pub(crate) fn import_file(
    db: &Database,
    path: &Path,
    notifier: &dyn Notifier,
) -> Result<ImportOutcome> {
    let outcome = read_source(path).and_then(|content| ingest(db, &content));
    match &outcome {
        Ok(result) if result.imported > 0 => {
            notifier.notify(&Notification::new(
                "CSV import complete",
                format!("{} expenses were imported.", result.imported),
            ));
        }
        Ok(_) => {}
        Err(_) => {
            notifier.notify(&Notification::new(
                "CSV import failed",
                "Something went wrong during the import. Check the file format.",
            ));
        }
    }
    outcome
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read CSV file: {}", path.display()))
}
