use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use envelope_core::ledger::{RecurrenceRule, RecurringTemplate};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn monthly_rule_lands_on_the_requested_day() {
    let rule = RecurrenceRule::parse("FREQ=MONTHLY;BYMONTHDAY=15").unwrap();
    let anchor = day(2024, 1, 1);

    assert_eq!(rule.next_after(day(2024, 1, 15), anchor), Some(day(2024, 2, 15)));
    // From mid-cycle the current month's occurrence is still ahead.
    assert_eq!(rule.next_after(day(2024, 1, 10), anchor), Some(day(2024, 1, 15)));
}

#[test]
fn last_day_of_month_follows_month_lengths() {
    let rule = RecurrenceRule::parse("FREQ=MONTHLY;BYMONTHDAY=-1").unwrap();
    let anchor = day(2024, 1, 31);

    assert_eq!(rule.next_after(day(2024, 1, 31), anchor), Some(day(2024, 2, 29)));
    assert_eq!(rule.next_after(day(2024, 2, 29), anchor), Some(day(2024, 3, 31)));
    // Non-leap February.
    assert_eq!(rule.next_after(day(2025, 1, 31), anchor), Some(day(2025, 2, 28)));
}

#[test]
fn biweekly_alignment_depends_on_the_anchor() {
    let rule = RecurrenceRule::parse("FREQ=WEEKLY;INTERVAL=2;BYDAY=MO").unwrap();

    assert_eq!(
        rule.next_after(day(2024, 1, 1), day(2024, 1, 1)),
        Some(day(2024, 1, 15))
    );
    assert_eq!(
        rule.next_after(day(2024, 1, 8), day(2024, 1, 8)),
        Some(day(2024, 1, 22))
    );
}

#[test]
fn weekly_rule_without_byday_keeps_the_anchor_weekday() {
    let rule = RecurrenceRule::parse("FREQ=WEEKLY").unwrap();
    let anchor = day(2024, 1, 3); // a Wednesday

    assert_eq!(rule.next_after(day(2024, 1, 3), anchor), Some(day(2024, 1, 10)));
    assert_eq!(rule.next_after(day(2024, 1, 8), anchor), Some(day(2024, 1, 10)));
}

#[test]
fn leap_day_yearly_skips_non_leap_years() {
    let rule = RecurrenceRule::parse("FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=29").unwrap();
    let anchor = day(2024, 2, 29);

    assert_eq!(rule.next_after(day(2024, 2, 29), anchor), Some(day(2028, 2, 29)));
    assert_eq!(rule.next_after(day(2028, 2, 29), anchor), Some(day(2032, 2, 29)));
}

#[test]
fn yearly_rule_reuses_anchor_month_and_day_by_default() {
    let rule = RecurrenceRule::parse("FREQ=YEARLY").unwrap();
    let anchor = day(2024, 6, 15);

    assert_eq!(rule.next_after(day(2024, 6, 15), anchor), Some(day(2025, 6, 15)));
}

#[test]
fn far_future_queries_stay_anchored() {
    // A long-dormant biweekly rule must stay aligned to the original epoch.
    let rule = RecurrenceRule::parse("FREQ=WEEKLY;INTERVAL=2;BYDAY=MO").unwrap();
    let anchor = day(2024, 1, 1);

    let next = rule.next_after(day(2031, 3, 14), anchor).unwrap();
    assert_eq!(next.weekday(), chrono::Weekday::Mon);
    assert_eq!((next - anchor).num_days() % 14, 0);
}

#[test]
fn template_falls_back_to_monthly_default_on_malformed_rule() {
    let start = day(2024, 1, 1);
    let template =
        RecurringTemplate::new("every second tuesday", start, Uuid::new_v4(), -1000);

    // The default rule is monthly on the 1st, anchored at the start date.
    assert_eq!(template.next_occurrence_after(start), day(2024, 2, 1));
    assert_eq!(template.next_occurrence_after(day(2024, 3, 10)), day(2024, 4, 1));
}

#[test]
fn exhausted_template_returns_the_input_day() {
    let start = day(2024, 1, 1);
    let template = RecurringTemplate::new(
        "FREQ=MONTHLY;BYMONTHDAY=1;UNTIL=20240301",
        start,
        Uuid::new_v4(),
        -1000,
    );

    assert_eq!(template.next_occurrence_after(day(2024, 2, 1)), day(2024, 3, 1));
    // Past UNTIL the rule is exhausted: the safety valve hands the input back.
    assert_eq!(template.next_occurrence_after(day(2024, 3, 1)), day(2024, 3, 1));
}

#[test]
fn count_limited_rule_stops_after_the_quota() {
    let rule = RecurrenceRule::parse("FREQ=WEEKLY;COUNT=2;BYDAY=FR").unwrap();
    let anchor = day(2024, 1, 5); // a Friday

    assert_eq!(rule.next_after(day(2024, 1, 5), anchor), Some(day(2024, 1, 12)));
    assert_eq!(rule.next_after(day(2024, 1, 12), anchor), None);
}
