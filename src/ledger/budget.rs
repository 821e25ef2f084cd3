use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named envelope that money is assigned into and spent out of.
///
/// Exactly one budget per ledger carries `is_to_be_budgeted`: the special
/// Inflow envelope that accumulates unassigned income and funds assignments
/// to every other budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Budget {
    pub id: Uuid,
    pub name: String,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub is_to_be_budgeted: bool,
}

impl Budget {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category_id: None,
            is_to_be_budgeted: false,
        }
    }

    /// Creates the Inflow ("To Be Budgeted") envelope.
    pub fn inflow(name: impl Into<String>) -> Self {
        Self {
            is_to_be_budgeted: true,
            ..Self::new(name)
        }
    }

    /// Links the budget to a category identifier.
    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }
}
