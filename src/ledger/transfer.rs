use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dates;
use super::transaction::TransactionStatus;

/// Money moved between two accounts.
///
/// The amount is a magnitude; sign is contextual (outflow at `from_account_id`,
/// inflow at `to_account_id`). Transfers never touch budget envelopes except
/// for the cross-type effect on the Inflow budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transfer {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount_cents: i64,
    pub from_status: TransactionStatus,
    pub to_status: TransactionStatus,
    #[serde(default)]
    pub note: String,
    pub budget_id: Option<Uuid>,
}

impl Transfer {
    pub fn new(
        from_account_id: Uuid,
        to_account_id: Uuid,
        amount_cents: i64,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            from_account_id,
            to_account_id,
            amount_cents,
            from_status: TransactionStatus::Open,
            to_status: TransactionStatus::Open,
            note: String::new(),
            budget_id: None,
        }
    }

    pub fn day(&self) -> NaiveDate {
        dates::day_of(self.date)
    }
}
