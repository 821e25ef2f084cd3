//! Recurring templates and the materialization pass that turns due templates
//! into concrete transactions, exactly once per occurrence.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dates;
use super::ledger::Ledger;
use super::rrule::RecurrenceRule;
use super::transaction::{Posting, Transaction};

/// A recurrence rule plus the prototype fields for the transactions it
/// produces. `next_scheduled` is the scheduler cursor; it only ever moves
/// forward, one occurrence per pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecurringTemplate {
    pub id: Uuid,
    /// Raw rule string, kept verbatim for round-tripping; parsed on use.
    pub rrule: String,
    pub start_date: NaiveDate,
    pub next_scheduled: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub account_id: Uuid,
    pub payee_id: Option<Uuid>,
    pub budget_id: Option<Uuid>,
    pub amount_cents: i64,
    #[serde(default)]
    pub note: String,
}

impl RecurringTemplate {
    pub fn new(
        rrule: impl Into<String>,
        start_date: NaiveDate,
        account_id: Uuid,
        amount_cents: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            rrule: rrule.into(),
            start_date,
            next_scheduled: start_date,
            end_date: None,
            account_id,
            payee_id: None,
            budget_id: None,
            amount_cents,
            note: String::new(),
        }
    }

    pub fn with_budget(mut self, budget_id: Uuid) -> Self {
        self.budget_id = Some(budget_id);
        self
    }

    pub fn with_payee(mut self, payee_id: Uuid) -> Self {
        self.payee_id = Some(payee_id);
        self
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Parses the rule string, recovering malformed rules to the monthly
    /// default.
    pub fn rule(&self) -> RecurrenceRule {
        RecurrenceRule::parse_or_default(&self.rrule)
    }

    /// First occurrence strictly after `from`, anchored at the template's
    /// start date.
    ///
    /// An exhausted rule returns `from` unchanged, with a warning. Callers
    /// that need to distinguish exhaustion use [`RecurrenceRule::next_after`]
    /// directly.
    pub fn next_occurrence_after(&self, from: NaiveDate) -> NaiveDate {
        match self.rule().next_after(from, self.start_date) {
            Some(next) => next,
            None => {
                tracing::warn!(
                    template = %self.id,
                    rule = self.rrule,
                    %from,
                    "recurrence rule exhausted, keeping cursor in place"
                );
                from
            }
        }
    }

    /// Builds the concrete transaction for an occurrence on `day`.
    pub fn materialize(&self, day: NaiveDate) -> Transaction {
        let posting =
            Posting::new(self.amount_cents, self.budget_id).with_note(self.note.clone());
        let mut txn = Transaction::new(self.account_id, dates::start_of_day_utc(day), posting)
            .with_template(self.id);
        txn.payee_id = self.payee_id;
        txn
    }
}

/// Runs one materialization pass against the ledger, creating at most one
/// transaction per template, and returns how many were created.
///
/// Each template is handled independently; a template that produces nothing
/// (not yet due, past its end date, or already materialized) never blocks the
/// others. Requiring `&mut Ledger` makes the pass the single writer for its
/// duration.
pub fn run_scheduler_pass(ledger: &mut Ledger, today: NaiveDate) -> usize {
    let mut created = 0usize;
    for index in 0..ledger.recurring_templates.len() {
        let (template_id, cursor, end_date) = {
            let template = &ledger.recurring_templates[index];
            (template.id, template.next_scheduled, template.end_date)
        };

        // A transaction tagged with this template on/after the cursor means
        // the occurrence already exists, even if the cursor was not advanced
        // before the state was reloaded.
        let already_materialized = ledger
            .transactions
            .iter()
            .any(|txn| txn.recurring_template_id == Some(template_id) && txn.day() >= cursor);
        if already_materialized {
            continue;
        }
        if end_date.is_some_and(|end| cursor > end) {
            // Permanently dormant; cursor stays where the rule left it.
            continue;
        }
        if cursor > today {
            continue;
        }

        let (txn, next) = {
            let template = &ledger.recurring_templates[index];
            (template.materialize(cursor), template.next_occurrence_after(cursor))
        };
        ledger.add_transaction(txn);
        ledger.recurring_templates[index].next_scheduled = next;
        ledger.touch();
        created += 1;
    }
    if created > 0 {
        tracing::info!(created, %today, "scheduler pass materialized transactions");
    }
    created
}

/// Tracks the last day a scheduler pass ran so hosts can poll a coarse timer
/// and only pay for a pass when the wall-clock date advances.
#[derive(Debug, Clone, Copy, Default)]
pub struct DailyTrigger {
    last_run: Option<NaiveDate>,
}

impl DailyTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true (and records the day) when no pass has run on `today` yet.
    pub fn due(&mut self, today: NaiveDate) -> bool {
        match self.last_run {
            Some(last) if last >= today => false,
            _ => {
                self.last_run = Some(today);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_fires_once_per_day() {
        let mut trigger = DailyTrigger::new();
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert!(trigger.due(day));
        assert!(!trigger.due(day));
        assert!(trigger.due(day.succ_opt().unwrap()));
    }

    #[test]
    fn materialized_transaction_carries_template_fields() {
        let account = Uuid::new_v4();
        let budget = Uuid::new_v4();
        let payee = Uuid::new_v4();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let template = RecurringTemplate::new("FREQ=MONTHLY;BYMONTHDAY=1", start, account, -4500)
            .with_budget(budget)
            .with_payee(payee)
            .with_note("rent");

        let txn = template.materialize(start);
        assert_eq!(txn.account_id, account);
        assert_eq!(txn.payee_id, Some(payee));
        assert_eq!(txn.recurring_template_id, Some(template.id));
        assert_eq!(txn.day(), start);
        assert_eq!(txn.postings().len(), 1);
        assert_eq!(txn.postings()[0].amount_cents, -4500);
        assert_eq!(txn.postings()[0].budget_id, Some(budget));
        assert_eq!(txn.postings()[0].note, "rent");
    }

    #[test]
    fn exhausted_rule_returns_input_day() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let template =
            RecurringTemplate::new("FREQ=DAILY;COUNT=1", start, Uuid::new_v4(), -100);
        assert_eq!(template.next_occurrence_after(start), start);
    }
}
