mod schema;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::error::DomainError;
use crate::models::*;

/// Result of a guarded category delete. Refusal to delete a category that
/// still has expenses is an outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DeleteCategoryOutcome {
    Deleted,
    NotFound,
    HasExpenses { expense_count: i64 },
}

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        // Check if schema_version table exists
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        // Existing database - check version and apply migrations
        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    // ── Categories ────────────────────────────────────────────

    pub(crate) fn get_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color, monthly_limit FROM categories ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            let limit: Option<String> = row.get(3)?;
            Ok(Category {
                id: Some(row.get(0)?),
                name: row.get(1)?,
                color: row.get(2)?,
                monthly_limit: limit.and_then(|s| Decimal::from_str(&s).ok()),
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_category_by_id(&self, id: i64) -> Result<Option<Category>> {
        let result = self.conn.query_row(
            "SELECT id, name, color, monthly_limit FROM categories WHERE id = ?1",
            params![id],
            |row| {
                let limit: Option<String> = row.get(3)?;
                Ok(Category {
                    id: Some(row.get(0)?),
                    name: row.get(1)?,
                    color: row.get(2)?,
                    monthly_limit: limit.and_then(|s| Decimal::from_str(&s).ok()),
                })
            },
        );
        match result {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Exact, case-sensitive name lookup. The name column's BINARY
    /// collation means "Food" and "food" are different categories.
    pub(crate) fn find_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        let result = self.conn.query_row(
            "SELECT id, name, color, monthly_limit FROM categories WHERE name = ?1",
            params![name],
            |row| {
                let limit: Option<String> = row.get(3)?;
                Ok(Category {
                    id: Some(row.get(0)?),
                    name: row.get(1)?,
                    color: row.get(2)?,
                    monthly_limit: limit.and_then(|s| Decimal::from_str(&s).ok()),
                })
            },
        );
        match result {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn insert_category(&self, cat: &Category) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO categories (name, color, monthly_limit) VALUES (?1, ?2, ?3)",
            params![
                cat.name,
                cat.color,
                cat.monthly_limit.map(|d| d.to_string()),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert-if-absent keyed by name, then resolve the id. The UNIQUE
    /// constraint makes the upsert atomic, so repeated names (within one
    /// import or across concurrent submissions) resolve to a single row.
    pub(crate) fn get_or_create_category(&self, name: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO categories (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
            params![name],
        )?;
        let id: i64 = self.conn.query_row(
            "SELECT id FROM categories WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Full replace of name/color/limit by id.
    pub(crate) fn update_category(&self, cat: &Category) -> Result<()> {
        let id = cat
            .id
            .ok_or_else(|| DomainError::Validation("category has no id".into()))?;
        let changes = self.conn.execute(
            "UPDATE categories SET name = ?1, color = ?2, monthly_limit = ?3 WHERE id = ?4",
            params![
                cat.name,
                cat.color,
                cat.monthly_limit.map(|d| d.to_string()),
                id,
            ],
        )?;
        if changes == 0 {
            return Err(DomainError::CategoryNotFound(id).into());
        }
        Ok(())
    }

    /// Guarded delete. The expense count and the delete run in one
    /// transaction so a concurrent insert cannot slip past a stale count.
    pub(crate) fn delete_category(&mut self, id: i64) -> Result<DeleteCategoryOutcome> {
        let tx = self.conn.transaction()?;
        let expense_count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM expenses WHERE category_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        if expense_count > 0 {
            return Ok(DeleteCategoryOutcome::HasExpenses { expense_count });
        }
        let changes = tx.execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(if changes > 0 {
            DeleteCategoryOutcome::Deleted
        } else {
            DeleteCategoryOutcome::NotFound
        })
    }

    // ── Expenses ──────────────────────────────────────────────

    pub(crate) fn get_expenses(
        &self,
        category_id: Option<i64>,
        month: Option<&str>,
    ) -> Result<Vec<Expense>> {
        let mut sql = String::from(
            "SELECT id, label, amount, date, category_id FROM expenses WHERE 1=1",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(cid) = category_id {
            sql.push_str(&format!(" AND category_id = ?{}", param_values.len() + 1));
            param_values.push(Box::new(cid));
        }
        if let Some(m) = month {
            sql.push_str(&format!(" AND date LIKE ?{}", param_values.len() + 1));
            param_values.push(Box::new(format!("{m}%")));
        }

        sql.push_str(" ORDER BY date DESC, id DESC");

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), |row| {
            let amount_str: String = row.get(2)?;
            Ok(Expense {
                id: Some(row.get(0)?),
                label: row.get(1)?,
                amount: Decimal::from_str(&amount_str).unwrap_or_default(),
                date: row.get(3)?,
                category_id: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn insert_expense(&self, expense: &Expense) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO expenses (label, amount, date, category_id) VALUES (?1, ?2, ?3, ?4)",
            params![
                expense.label,
                expense.amount.to_string(),
                expense.date,
                expense.category_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn update_expense(&self, expense: &Expense) -> Result<()> {
        let id = expense
            .id
            .ok_or_else(|| DomainError::Validation("expense has no id".into()))?;
        let changes = self.conn.execute(
            "UPDATE expenses SET label = ?1, amount = ?2, date = ?3, category_id = ?4 WHERE id = ?5",
            params![
                expense.label,
                expense.amount.to_string(),
                expense.date,
                expense.category_id,
                id,
            ],
        )?;
        if changes == 0 {
            return Err(DomainError::ExpenseNotFound(id).into());
        }
        Ok(())
    }

    /// Idempotent: deleting an absent id reports `false` rather than erroring.
    pub(crate) fn delete_expense(&self, id: i64) -> Result<bool> {
        let changes = self
            .conn
            .execute("DELETE FROM expenses WHERE id = ?1", params![id])?;
        Ok(changes > 0)
    }

    /// Month-to-date total for one category. The month filter is a string
    /// prefix on the date column; an empty match set sums to zero.
    pub(crate) fn sum_for_category_and_month(
        &self,
        category_id: i64,
        month: &str,
    ) -> Result<Decimal> {
        let total: String = self.conn.query_row(
            "SELECT CAST(COALESCE(SUM(amount), 0) AS TEXT) FROM expenses
             WHERE category_id = ?1 AND date LIKE ?2",
            params![category_id, format!("{month}%")],
            |row| row.get(0),
        )?;
        Ok(Decimal::from_str(&total).unwrap_or_default())
    }

    // ── Export ────────────────────────────────────────────────

    pub(crate) fn export_to_csv(&self, path: &str, month: Option<&str>) -> Result<usize> {
        let expenses = self.get_expenses(None, month)?;
        let categories = self.get_categories()?;

        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create export file: {path}"))?;
        wtr.write_record(["label", "amount", "date", "category"])?;
        for expense in &expenses {
            let category = Category::find_by_id(&categories, expense.category_id)
                .map(|c| c.name.as_str())
                .unwrap_or("");
            let amount = expense.amount.to_string();
            wtr.write_record([
                expense.label.as_str(),
                amount.as_str(),
                expense.date.as_str(),
                category,
            ])?;
        }
        wtr.flush()?;
        Ok(expenses.len())
    }
}
