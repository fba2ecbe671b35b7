#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;

fn make_expense(category_id: i64) -> Expense {
    Expense::new("Test".into(), dec!(10.00), "2024-01-15".into(), category_id)
}

// ── Expense ───────────────────────────────────────────────────

#[test]
fn test_month_key_is_date_prefix() {
    let expense = make_expense(1);
    assert_eq!(expense.month_key(), "2024-01");
}

#[test]
fn test_month_key_ignores_day() {
    let mut first = make_expense(1);
    first.date = "2024-01-01".into();
    let mut last = make_expense(1);
    last.date = "2024-01-31".into();
    assert_eq!(first.month_key(), last.month_key());
}

#[test]
fn test_month_key_short_date() {
    // Not a valid date, but month_key must not panic on it
    let mut expense = make_expense(1);
    expense.date = "2024".into();
    assert_eq!(expense.month_key(), "2024");
}

#[test]
fn test_expense_new_has_no_id() {
    let expense = make_expense(7);
    assert!(expense.id.is_none());
    assert_eq!(expense.category_id, 7);
    assert_eq!(expense.amount, dec!(10.00));
}

// ── Category ──────────────────────────────────────────────────

#[test]
fn test_category_new_defaults() {
    let cat = Category::new("Food".into());
    assert!(cat.id.is_none());
    assert_eq!(cat.name, "Food");
    assert!(cat.color.is_none());
    assert!(cat.monthly_limit.is_none());
}

#[test]
fn test_category_display() {
    let cat = Category::new("Groceries".into());
    assert_eq!(format!("{cat}"), "Groceries");
}

#[test]
fn test_find_by_name_exact_match() {
    let cats = vec![Category::new("Food".into()), Category::new("Transport".into())];
    assert!(Category::find_by_name(&cats, "Food").is_some());
    assert!(Category::find_by_name(&cats, "Rent").is_none());
}

#[test]
fn test_find_by_name_case_sensitive() {
    let cats = vec![Category::new("Food".into())];
    assert!(Category::find_by_name(&cats, "food").is_none());
    assert!(Category::find_by_name(&cats, "FOOD").is_none());
}

#[test]
fn test_find_by_id() {
    let mut cat = Category::new("Food".into());
    cat.id = Some(3);
    let cats = vec![cat];
    assert!(Category::find_by_id(&cats, 3).is_some());
    assert!(Category::find_by_id(&cats, 4).is_none());
}

// ── Deletion guard ────────────────────────────────────────────

#[test]
fn test_can_delete_with_no_expenses() {
    assert!(Category::can_delete(1, &[]));
}

#[test]
fn test_can_delete_unreferenced_category() {
    let expenses = vec![make_expense(2), make_expense(3)];
    assert!(Category::can_delete(1, &expenses));
}

#[test]
fn test_cannot_delete_referenced_category() {
    let expenses = vec![make_expense(2), make_expense(1)];
    assert!(!Category::can_delete(1, &expenses));
}
