use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A counterparty referenced by transactions and recurring templates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payee {
    pub id: Uuid,
    pub name: String,
}

impl Payee {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}
