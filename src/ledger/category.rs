use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Grouping label for budgets. Budgets may remain uncategorized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BudgetCategory {
    pub id: Uuid,
    pub name: String,
}

impl BudgetCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}
