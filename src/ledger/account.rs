use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a financial account whose balance is derived from its activity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub kind: AccountKind,
    #[serde(default)]
    pub archived: bool,
}

impl Account {
    /// Creates a new, unarchived account of the provided kind.
    pub fn new(name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            archived: false,
        }
    }

    /// Marks the account as archived.
    pub fn archived(mut self) -> Self {
        self.archived = true;
        self
    }

    /// Whether activity on this account participates in budget math.
    pub fn is_on_budget(&self) -> bool {
        matches!(self.kind, AccountKind::Budget)
    }
}

/// Enumerates the supported account classifications.
///
/// `Tracking` accounts (investments, assets) are excluded from envelope
/// availability but still count towards net worth.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Budget,
    Tracking,
}
