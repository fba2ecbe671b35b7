use rust_decimal::Decimal;

use super::Expense;

#[derive(Debug, Clone)]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
    pub color: Option<String>,
    /// `None` means the category has no spending ceiling.
    pub monthly_limit: Option<Decimal>,
}

impl Category {
    pub fn new(name: String) -> Self {
        Self {
            id: None,
            name,
            color: None,
            monthly_limit: None,
        }
    }

    /// Find a category by name in a slice. Exact, case-sensitive match —
    /// "Food" and "food" are distinct categories.
    pub fn find_by_name<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
        categories.iter().find(|c| c.name == name)
    }

    /// Find a category by ID in a slice.
    pub fn find_by_id(categories: &[Category], id: i64) -> Option<&Category> {
        categories.iter().find(|c| c.id == Some(id))
    }

    /// Deletion guard: a category can only be removed while no expense in
    /// the given collection references it. Callers use this for early
    /// feedback; the store re-checks before actually deleting.
    pub fn can_delete(category_id: i64, expenses: &[Expense]) -> bool {
        !expenses.iter().any(|e| e.category_id == category_id)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
