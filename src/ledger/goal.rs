use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A savings or assignment target attached to a budget.
///
/// Progress is always derived from ledger state, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Goal {
    pub id: Uuid,
    pub kind: GoalKind,
    pub target_cents: i64,
    pub budget_id: Uuid,
    #[serde(default)]
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(kind: GoalKind, target_cents: i64, budget_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            target_cents,
            budget_id,
            is_archived: false,
            created_at: Utc::now(),
        }
    }
}

/// How a goal measures its current value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    /// Target against the amount assigned to the budget this month.
    MonthlyAssignment,
    /// Target against the budget's cumulative available balance.
    Available,
}

/// Derived completion state for a goal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalProgress {
    pub current_cents: i64,
    pub target_cents: i64,
    /// Display percentage, clamped to `0..=100`.
    pub percent: f64,
    /// Completion uses the unclamped current value, so a deeply negative
    /// balance never reads as complete even when the percentage floors at 0.
    pub is_complete: bool,
}

impl GoalProgress {
    pub fn from_parts(current_cents: i64, target_cents: i64) -> Self {
        let percent = if target_cents > 0 {
            let ratio = current_cents.max(0) as f64 / target_cents as f64;
            (ratio * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self {
            current_cents,
            target_cents,
            percent,
            is_complete: current_cents >= target_cents,
        }
    }
}
