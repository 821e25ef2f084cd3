//! Envelope availability and month-by-month budget math.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::ledger::{dates, AccountKind, Ledger};

/// Stateless budgeting queries over [`Ledger`] snapshots.
///
/// All queries compare dates at day granularity and treat the `month`
/// argument as "the calendar month containing this day".
pub struct BudgetService;

impl BudgetService {
    /// Cumulative available balance for a budget through the end of the month
    /// containing `month`.
    ///
    /// For a normal budget this is everything assigned to it plus all posting
    /// activity against it, both through month end. For the Inflow budget it
    /// is income not yet assigned elsewhere: posting activity against Inflow,
    /// minus every other budget's assignments, shifted by transfers that move
    /// money across the budget/tracking boundary.
    pub fn available_for_month(ledger: &Ledger, budget_id: Uuid, month: NaiveDate) -> i64 {
        let end = dates::month_end_exclusive(month);
        let is_inflow = ledger
            .budget(budget_id)
            .map(|budget| budget.is_to_be_budgeted)
            .unwrap_or(false);

        if is_inflow {
            let assigned: i64 = ledger
                .assignments
                .iter()
                .filter(|a| a.budget_id != budget_id && a.day() < end)
                .map(|a| a.amount_cents)
                .sum();
            let activity = Self::posting_activity(ledger, budget_id, None, end)
                + Self::cross_type_transfer_activity(ledger, end);
            activity - assigned
        } else {
            let assigned: i64 = ledger
                .assignments
                .iter()
                .filter(|a| a.budget_id == budget_id && a.day() < end)
                .map(|a| a.amount_cents)
                .sum();
            assigned + Self::posting_activity(ledger, budget_id, None, end)
        }
    }

    /// Posting activity against a budget within the calendar month only.
    pub fn activity_for_month(ledger: &Ledger, budget_id: Uuid, month: NaiveDate) -> i64 {
        let start = dates::month_start(month);
        let end = dates::month_end_exclusive(month);
        Self::posting_activity(ledger, budget_id, Some(start), end)
    }

    /// Assignments to a budget dated within the calendar month.
    pub fn assigned_for_month(ledger: &Ledger, budget_id: Uuid, month: NaiveDate) -> i64 {
        ledger
            .assignments
            .iter()
            .filter(|a| a.budget_id == budget_id && dates::in_month(a.day(), month))
            .map(|a| a.amount_cents)
            .sum()
    }

    /// All assignments dated within the calendar month, any budget.
    pub fn total_assigned_for_month(ledger: &Ledger, month: NaiveDate) -> i64 {
        ledger
            .assignments
            .iter()
            .filter(|a| dates::in_month(a.day(), month))
            .map(|a| a.amount_cents)
            .sum()
    }

    /// Sum of posting amounts against `budget_id` for transactions dated in
    /// `[start, end)` (`start = None` means "from the beginning of time").
    /// Transactions on tracking accounts stay out of budget math.
    fn posting_activity(
        ledger: &Ledger,
        budget_id: Uuid,
        start: Option<NaiveDate>,
        end: NaiveDate,
    ) -> i64 {
        ledger
            .transactions
            .iter()
            .filter(|txn| {
                let day = txn.day();
                day < end
                    && start.map(|s| day >= s).unwrap_or(true)
                    && !Self::is_tracking(ledger, txn.account_id)
            })
            .flat_map(|txn| txn.postings().iter())
            .filter(|posting| posting.budget_id == Some(budget_id))
            .map(|posting| posting.amount_cents)
            .sum()
    }

    /// Net Inflow effect of transfers crossing the budget/tracking boundary
    /// through `end` (exclusive).
    ///
    /// A transfer into a budget-type account brings money into the budgeting
    /// system (+); one into a tracking-type account takes it out (−).
    /// Same-type transfers and transfers with an unresolvable endpoint have
    /// no effect.
    fn cross_type_transfer_activity(ledger: &Ledger, end: NaiveDate) -> i64 {
        ledger
            .transfers
            .iter()
            .filter(|transfer| transfer.day() < end)
            .filter_map(|transfer| {
                let from = ledger.account(transfer.from_account_id)?;
                let to = ledger.account(transfer.to_account_id)?;
                if from.kind == to.kind {
                    return None;
                }
                match to.kind {
                    AccountKind::Budget => Some(transfer.amount_cents),
                    AccountKind::Tracking => Some(-transfer.amount_cents),
                }
            })
            .sum()
    }

    fn is_tracking(ledger: &Ledger, account_id: Uuid) -> bool {
        ledger
            .account(account_id)
            .map(|account| matches!(account.kind, AccountKind::Tracking))
            .unwrap_or(false)
    }
}
