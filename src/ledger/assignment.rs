use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dates;

/// An allocation of money from the Inflow envelope into a budget for a month
/// (negative amounts move money back to Inflow).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assignment {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub budget_id: Uuid,
    pub amount_cents: i64,
}

impl Assignment {
    pub fn new(budget_id: Uuid, amount_cents: i64, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            budget_id,
            amount_cents,
        }
    }

    pub fn day(&self) -> NaiveDate {
        dates::day_of(self.date)
    }
}
