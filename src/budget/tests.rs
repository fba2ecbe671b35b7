#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;
use crate::db::Database;
use crate::models::Category;

fn db_with_limited_category(limit: Decimal) -> (Database, i64) {
    let db = Database::open_in_memory().unwrap();
    let mut cat = Category::new("Food".into());
    cat.monthly_limit = Some(limit);
    let id = db.insert_category(&cat).unwrap();
    (db, id)
}

fn make_expense(amount: Decimal, date: &str, category_id: i64) -> Expense {
    Expense::new("Test".into(), amount, date.into(), category_id)
}

// ── check_monthly_limit ───────────────────────────────────────

#[test]
fn test_no_breach_under_limit() {
    let (db, cat_id) = db_with_limited_category(dec!(100));
    let (expense, breach) =
        record_expense(&db, make_expense(dec!(40), "2024-01-05", cat_id)).unwrap();
    assert!(expense.id.is_some());
    assert!(breach.is_none());
}

#[test]
fn test_breach_when_strictly_over() {
    let (db, cat_id) = db_with_limited_category(dec!(100));
    record_expense(&db, make_expense(dec!(60), "2024-01-05", cat_id)).unwrap();
    let (_, breach) =
        record_expense(&db, make_expense(dec!(50), "2024-01-20", cat_id)).unwrap();

    let breach = breach.unwrap();
    assert_eq!(breach.category_name, "Food");
    assert_eq!(breach.limit, dec!(100));
    assert_eq!(breach.month, "2024-01");
}

#[test]
fn test_equal_to_limit_is_not_a_breach() {
    let (db, cat_id) = db_with_limited_category(dec!(100));
    record_expense(&db, make_expense(dec!(60), "2024-01-05", cat_id)).unwrap();
    let (_, breach) =
        record_expense(&db, make_expense(dec!(40), "2024-01-20", cat_id)).unwrap();
    assert!(breach.is_none());
}

#[test]
fn test_no_limit_never_breaches() {
    let db = Database::open_in_memory().unwrap();
    let cat_id = db.insert_category(&Category::new("Food".into())).unwrap();
    let (_, breach) =
        record_expense(&db, make_expense(dec!(100000), "2024-01-05", cat_id)).unwrap();
    assert!(breach.is_none());
}

#[test]
fn test_single_expense_over_limit_breaches() {
    let (db, cat_id) = db_with_limited_category(dec!(100));
    let (_, breach) =
        record_expense(&db, make_expense(dec!(100.01), "2024-01-05", cat_id)).unwrap();
    assert!(breach.is_some());
}

#[test]
fn test_other_months_not_counted() {
    let (db, cat_id) = db_with_limited_category(dec!(100));
    record_expense(&db, make_expense(dec!(90), "2024-01-05", cat_id)).unwrap();
    // January's 90 does not spill into February
    let (_, breach) =
        record_expense(&db, make_expense(dec!(90), "2024-02-05", cat_id)).unwrap();
    assert!(breach.is_none());
}

#[test]
fn test_missing_category_is_a_noop() {
    let db = Database::open_in_memory().unwrap();
    // Not persisted; evaluated directly against an id that does not exist
    let orphan = make_expense(dec!(50), "2024-01-05", 99999);
    assert!(check_monthly_limit(&db, &orphan).unwrap().is_none());
}

// ── record_expense ────────────────────────────────────────────

#[test]
fn test_record_expense_persists() {
    let (db, cat_id) = db_with_limited_category(dec!(100));
    let (expense, _) =
        record_expense(&db, make_expense(dec!(40), "2024-01-05", cat_id)).unwrap();

    let stored = db.get_expenses(None, None).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, expense.id);
    assert_eq!(stored[0].amount, dec!(40));
}

#[test]
fn test_breach_does_not_block_the_write() {
    let (db, cat_id) = db_with_limited_category(dec!(10));
    let (expense, breach) =
        record_expense(&db, make_expense(dec!(50), "2024-01-05", cat_id)).unwrap();

    assert!(breach.is_some());
    // The expense is persisted regardless of the breach
    let stored = db.get_expenses(None, None).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, expense.id);
}

#[test]
fn test_empty_label_rejected_before_insert() {
    let (db, cat_id) = db_with_limited_category(dec!(100));
    let mut expense = make_expense(dec!(40), "2024-01-05", cat_id);
    expense.label = "".into();
    let err = record_expense(&db, expense).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DomainError>(),
        Some(DomainError::Validation(_))
    ));
    // Nothing was written
    assert!(db.get_expenses(None, None).unwrap().is_empty());
}

#[test]
fn test_bad_date_rejected_before_insert() {
    let (db, cat_id) = db_with_limited_category(dec!(100));
    let err =
        record_expense(&db, make_expense(dec!(40), "05/01/2024", cat_id)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DomainError>(),
        Some(DomainError::Validation(_))
    ));
    assert!(db.get_expenses(None, None).unwrap().is_empty());
}

// ── LimitBreach ───────────────────────────────────────────────

#[test]
fn test_breach_notification_contents() {
    let breach = LimitBreach {
        category_name: "Food".into(),
        limit: dec!(100),
        month: "2024-01".into(),
    };
    let note = breach.to_notification();
    assert_eq!(note.title, "Budget limit exceeded");
    assert!(note.body.contains("Food"));
    assert!(note.body.contains("100"));
    assert!(note.body.contains("2024-01"));
}
