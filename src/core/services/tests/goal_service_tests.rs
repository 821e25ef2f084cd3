use chrono::NaiveDate;

use crate::core::services::GoalService;
use crate::ledger::{
    dates, Account, AccountKind, Assignment, Budget, Goal, GoalKind, Ledger, Posting, Transaction,
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn available_goal_tracks_cumulative_availability() {
    let mut ledger = Ledger::new("Goals");
    ledger.add_account(Account::new("Checking", AccountKind::Budget));
    let vacation = ledger.add_budget(Budget::new("Vacation"));
    ledger.add_assignment(Assignment::new(
        vacation,
        30_000,
        dates::start_of_day_utc(day(2024, 1, 10)),
    ));
    ledger.add_goal(Goal::new(GoalKind::Available, 60_000, vacation));

    let progress = GoalService::progress_for_budget(&ledger, vacation, day(2024, 2, 1)).unwrap();
    assert_eq!(progress.current_cents, 30_000);
    assert_eq!(progress.percent, 50.0);
    assert!(!progress.is_complete);
}

#[test]
fn monthly_assignment_goal_ignores_other_months() {
    let mut ledger = Ledger::new("Goals");
    let vacation = ledger.add_budget(Budget::new("Vacation"));
    ledger.add_assignment(Assignment::new(
        vacation,
        10_000,
        dates::start_of_day_utc(day(2024, 1, 10)),
    ));
    let goal = Goal::new(GoalKind::MonthlyAssignment, 10_000, vacation);

    let in_january = GoalService::progress(&ledger, &goal, day(2024, 1, 20));
    assert!(in_january.is_complete);
    assert_eq!(in_january.percent, 100.0);

    let in_february = GoalService::progress(&ledger, &goal, day(2024, 2, 20));
    assert_eq!(in_february.current_cents, 0);
    assert!(!in_february.is_complete);
}

#[test]
fn negative_current_floors_percentage_but_not_completion_check() {
    let mut ledger = Ledger::new("Goals");
    let account = ledger.add_account(Account::new("Checking", AccountKind::Budget));
    let vacation = ledger.add_budget(Budget::new("Vacation"));
    ledger.add_transaction(Transaction::new(
        account,
        dates::start_of_day_utc(day(2024, 1, 5)),
        Posting::new(-25_000, Some(vacation)),
    ));
    let goal = Goal::new(GoalKind::Available, 10_000, vacation);

    let progress = GoalService::progress(&ledger, &goal, day(2024, 1, 31));
    assert_eq!(progress.current_cents, -25_000);
    assert_eq!(progress.percent, 0.0);
    assert!(!progress.is_complete);
}

#[test]
fn overshoot_clamps_percent_at_one_hundred() {
    let mut ledger = Ledger::new("Goals");
    let vacation = ledger.add_budget(Budget::new("Vacation"));
    ledger.add_assignment(Assignment::new(
        vacation,
        25_000,
        dates::start_of_day_utc(day(2024, 1, 10)),
    ));
    let goal = Goal::new(GoalKind::MonthlyAssignment, 10_000, vacation);

    let progress = GoalService::progress(&ledger, &goal, day(2024, 1, 20));
    assert_eq!(progress.percent, 100.0);
    assert!(progress.is_complete);
}

#[test]
fn archived_goals_are_not_resolved_for_budgets() {
    let mut ledger = Ledger::new("Goals");
    let vacation = ledger.add_budget(Budget::new("Vacation"));
    let mut goal = Goal::new(GoalKind::Available, 10_000, vacation);
    goal.is_archived = true;
    ledger.add_goal(goal);

    assert!(GoalService::progress_for_budget(&ledger, vacation, day(2024, 1, 1)).is_none());
}
