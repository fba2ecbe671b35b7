use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::db::Database;
use crate::error::DomainError;
use crate::models::Expense;
use crate::notify::Notification;

/// Advisory signal raised when a category's month-to-date total passes its
/// limit. Purely observational: it never affects the write that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LimitBreach {
    pub(crate) category_name: String,
    pub(crate) limit: Decimal,
    pub(crate) month: String,
}

impl LimitBreach {
    pub(crate) fn to_notification(&self) -> Notification {
        Notification::new(
            "Budget limit exceeded",
            format!(
                "Category \"{}\" is over its limit of {} for {}.",
                self.category_name, self.limit, self.month
            ),
        )
    }
}

/// Direct-entry path: validate, persist, then evaluate the monthly limit.
/// The persisted expense and the optional breach signal travel side by
/// side so notification concerns stay out of the store contract.
pub(crate) fn record_expense(
    db: &Database,
    mut expense: Expense,
) -> Result<(Expense, Option<LimitBreach>)> {
    validate(&expense)?;
    let id = db.insert_expense(&expense)?;
    expense.id = Some(id);

    // The write already succeeded; an evaluator failure must not undo it.
    let breach = match check_monthly_limit(db, &expense) {
        Ok(breach) => breach,
        Err(err) => {
            tracing::warn!(%err, "limit check failed after insert, skipping");
            None
        }
    };
    Ok((expense, breach))
}

/// Month-to-date check for a freshly persisted expense. The sum includes
/// the new row. No limit, or no resolvable category, means no signal.
/// Landing exactly on the limit is not a breach.
pub(crate) fn check_monthly_limit(
    db: &Database,
    expense: &Expense,
) -> Result<Option<LimitBreach>> {
    let Some(category) = db.get_category_by_id(expense.category_id)? else {
        return Ok(None);
    };
    let Some(limit) = category.monthly_limit else {
        return Ok(None);
    };

    let month = expense.month_key();
    let total = db.sum_for_category_and_month(expense.category_id, month)?;
    if total > limit {
        tracing::warn!(
            category = %category.name,
            %total,
            %limit,
            month,
            "monthly limit exceeded"
        );
        return Ok(Some(LimitBreach {
            category_name: category.name,
            limit,
            month: month.to_string(),
        }));
    }
    Ok(None)
}

fn validate(expense: &Expense) -> Result<()> {
    if expense.label.trim().is_empty() {
        return Err(DomainError::Validation("label must not be empty".into()).into());
    }
    if NaiveDate::parse_from_str(&expense.date, "%Y-%m-%d").is_err() {
        return Err(DomainError::Validation(format!(
            "date must be YYYY-MM-DD, got '{}'",
            expense.date
        ))
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests;
