use anyhow::Result;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

use crate::db::Database;
use crate::models::Expense;

/// Aggregate result of one ingestion run. `items` holds the inserted
/// expenses in row order; `imported` always equals `items.len()`.
#[derive(Debug, Default)]
pub(crate) struct ImportOutcome {
    pub(crate) imported: usize,
    pub(crate) items: Vec<Expense>,
}

/// Runs the ingestion pipeline over raw CSV text.
///
/// The first non-blank line is a discarded header. Each data row is
/// processed independently: a malformed row is logged and skipped, never
/// aborting the batch. Category names are reconciled against existing
/// records or created on first sight; the name-to-id map is scoped to this
/// run so repeated names cost one lookup and resolve to one category.
///
/// Rows inserted here are not budget-evaluated and not deduplicated:
/// re-importing the same file duplicates expenses while creating zero new
/// categories.
pub(crate) fn ingest(db: &Database, content: &str) -> Result<ImportOutcome> {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    // Header only, or nothing at all: an empty result, not an error.
    if lines.len() < 2 {
        return Ok(ImportOutcome::default());
    }

    let mut resolved: HashMap<String, i64> = HashMap::new();
    let mut items: Vec<Expense> = Vec::new();
    let mut skipped = 0usize;

    for &line in &lines[1..] {
        let Some(row) = parse_row(line) else {
            tracing::warn!(row = line, "skipping malformed row");
            skipped += 1;
            continue;
        };

        let category_id = match resolved.get(&row.category_name) {
            Some(&id) => id,
            None => match db.get_or_create_category(&row.category_name) {
                Ok(id) => {
                    resolved.insert(row.category_name.clone(), id);
                    id
                }
                Err(err) => {
                    tracing::warn!(row = line, %err, "skipping row, category unresolvable");
                    skipped += 1;
                    continue;
                }
            },
        };

        let expense = Expense::new(row.label, row.amount, row.date, category_id);
        match db.insert_expense(&expense) {
            Ok(id) => {
                let mut inserted = expense;
                inserted.id = Some(id);
                items.push(inserted);
            }
            Err(err) => {
                tracing::warn!(row = line, %err, "skipping row, insert failed");
                skipped += 1;
            }
        }
    }

    tracing::info!(imported = items.len(), skipped, "CSV ingestion finished");
    Ok(ImportOutcome {
        imported: items.len(),
        items,
    })
}

struct ParsedRow {
    label: String,
    amount: Decimal,
    date: String,
    category_name: String,
}

/// Separator detection is row-local: semicolon if the row contains one,
/// comma otherwise. No quoting or escaping; a field containing the
/// separator character will mis-parse.
fn parse_row(line: &str) -> Option<ParsedRow> {
    let sep = if line.contains(';') { ';' } else { ',' };
    let fields: Vec<&str> = line.split(sep).collect();
    if fields.len() < 4 {
        return None;
    }

    let label = fields[0].trim();
    let amount = parse_amount(fields[1])?;
    let date = fields[2].trim();
    let category_name = fields[3].trim();

    if label.is_empty() || date.is_empty() || category_name.is_empty() {
        return None;
    }

    Some(ParsedRow {
        label: label.to_string(),
        amount,
        date: date.to_string(),
        category_name: category_name.to_string(),
    })
}

/// Accepts either `.` or `,` as the decimal separator.
fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(&raw.trim().replace(',', ".")).ok()
}

#[cfg(test)]
#[path = "csv_import_tests.rs"]
mod tests;
