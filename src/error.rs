use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum DomainError {
    #[error("Category not found: {0}")]
    CategoryNotFound(i64),
    #[error("Expense not found: {0}")]
    ExpenseNotFound(i64),
    #[error("Validation failed: {0}")]
    Validation(String),
}
