//! Goal completion derived from ledger state.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::ledger::{Goal, GoalKind, GoalProgress, Ledger};

use super::BudgetService;

/// Stateless goal-progress queries over [`Ledger`] snapshots.
pub struct GoalService;

impl GoalService {
    /// Current progress of a goal as of `today`.
    pub fn progress(ledger: &Ledger, goal: &Goal, today: NaiveDate) -> GoalProgress {
        let current = match goal.kind {
            GoalKind::Available => {
                BudgetService::available_for_month(ledger, goal.budget_id, today)
            }
            GoalKind::MonthlyAssignment => {
                BudgetService::assigned_for_month(ledger, goal.budget_id, today)
            }
        };
        GoalProgress::from_parts(current, goal.target_cents)
    }

    /// Progress for the budget's active goal, when it has one.
    pub fn progress_for_budget(
        ledger: &Ledger,
        budget_id: Uuid,
        today: NaiveDate,
    ) -> Option<GoalProgress> {
        ledger
            .goal_for_budget(budget_id)
            .map(|goal| Self::progress(ledger, goal, today))
    }
}
