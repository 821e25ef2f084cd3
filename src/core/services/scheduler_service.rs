//! Host-facing entry points for the recurring-transaction pass.

use crate::core::clock::Clock;
use crate::ledger::{DailyTrigger, Ledger};

/// Drives [`Ledger::run_scheduler_pass`] off a [`Clock`], so hosts wire the
/// same code path at startup and on their periodic timer.
pub struct SchedulerService;

impl SchedulerService {
    /// Runs one pass dated at the clock's current day.
    pub fn run_now(ledger: &mut Ledger, clock: &dyn Clock) -> usize {
        ledger.run_scheduler_pass(clock.today())
    }

    /// Runs a pass only when the wall-clock date advanced past the trigger's
    /// last run; repeated calls within the same day are free.
    pub fn run_if_due(ledger: &mut Ledger, trigger: &mut DailyTrigger, clock: &dyn Clock) -> usize {
        if trigger.due(clock.today()) {
            Self::run_now(ledger, clock)
        } else {
            0
        }
    }
}
