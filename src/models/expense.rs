use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct Expense {
    pub id: Option<i64>,
    pub label: String,
    pub amount: Decimal,
    /// Format: "YYYY-MM-DD"
    pub date: String,
    pub category_id: i64,
}

impl Expense {
    pub fn new(label: String, amount: Decimal, date: String, category_id: i64) -> Self {
        Self {
            id: None,
            label,
            amount,
            date,
            category_id,
        }
    }

    /// The "YYYY-MM" grouping key for budget evaluation: the first 7
    /// characters of the date string, never a calendar computation.
    pub fn month_key(&self) -> &str {
        self.date.get(..7).unwrap_or(&self.date)
    }
}
