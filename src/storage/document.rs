//! The persisted JSON document shape and its mapping onto the in-memory model.
//!
//! On disk, postings live in a flat `transaction_postings` array joined to
//! transactions by `transaction_posting_ids`. In memory a posting has exactly
//! one owner; the flat array exists only at this boundary. Loading also
//! applies the one-way migration for documents that still store the payee on
//! postings instead of transactions.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{BudgetError, Result};
use crate::ledger::{
    Account, AccountKind, Assignment, Budget, BudgetCategory, Goal, GoalKind, Ledger, Payee,
    Posting, RecurringTemplate, Transaction, TransactionStatus, Transfer,
};

pub const DOCUMENT_SCHEMA_VERSION: u8 = 2;

fn schema_version_default() -> u8 {
    // Documents written before versioning are the legacy (v1) shape.
    1
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LedgerDocument {
    pub name: String,
    pub accounts: Vec<AccountRecord>,
    pub budget_categories: Vec<CategoryRecord>,
    pub budgets: Vec<BudgetRecord>,
    pub payees: Vec<PayeeRecord>,
    pub transactions: Vec<TransactionRecord>,
    pub transaction_postings: Vec<PostingRecord>,
    pub recurring_templates: Vec<TemplateRecord>,
    pub assignments: Vec<AssignmentRecord>,
    pub transfers: Vec<TransferRecord>,
    #[serde(default)]
    pub goals: Vec<GoalRecord>,
    #[serde(default = "schema_version_default")]
    pub schema_version: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountKind,
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BudgetRecord {
    pub id: Uuid,
    pub name: String,
    pub budget_category_id: Option<Uuid>,
    #[serde(default)]
    pub is_to_be_budgeted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PayeeRecord {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub account_id: Uuid,
    #[serde(default)]
    pub payee_id: Option<Uuid>,
    pub transaction_posting_ids: Vec<Uuid>,
    pub status: TransactionStatus,
    #[serde(with = "iso_instant")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub recurring_template_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostingRecord {
    pub id: Uuid,
    pub budget_id: Option<Uuid>,
    pub amount: i64,
    #[serde(default)]
    pub note: String,
    /// Legacy location of the payee; migrated up to the transaction on load
    /// and never written back.
    #[serde(default, skip_serializing)]
    pub payee_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub id: Uuid,
    pub rrule_string: String,
    #[serde(with = "iso_day")]
    pub next_scheduled_date: NaiveDate,
    #[serde(with = "iso_day")]
    pub start_date: NaiveDate,
    #[serde(default, with = "iso_day_opt")]
    pub end_date: Option<NaiveDate>,
    pub account_id: Uuid,
    pub amount: i64,
    pub budget_id: Option<Uuid>,
    pub payee_id: Option<Uuid>,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub id: Uuid,
    #[serde(with = "iso_instant")]
    pub date: DateTime<Utc>,
    pub budget_id: Uuid,
    pub amount: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferRecord {
    pub id: Uuid,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount: i64,
    pub from_status: TransactionStatus,
    pub to_status: TransactionStatus,
    #[serde(with = "iso_instant")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub note: String,
    pub budget_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GoalRecord {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: GoalKind,
    pub target_amount: i64,
    pub budget_id: Uuid,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(with = "iso_instant")]
    pub created_at: DateTime<Utc>,
}

/// Parses document JSON. Missing required top-level arrays fail here with a
/// descriptive error instead of partially loading.
pub fn parse_document(data: &str) -> Result<LedgerDocument> {
    let document: LedgerDocument =
        serde_json::from_str(data).map_err(|err| BudgetError::InvalidDocument(err.to_string()))?;
    if document.schema_version > DOCUMENT_SCHEMA_VERSION {
        return Err(BudgetError::InvalidDocument(format!(
            "document schema version {} is newer than supported version {}",
            document.schema_version, DOCUMENT_SCHEMA_VERSION
        )));
    }
    Ok(document)
}

impl LedgerDocument {
    pub fn from_ledger(ledger: &Ledger) -> Self {
        Self {
            name: ledger.name.clone(),
            accounts: ledger
                .accounts
                .iter()
                .map(|a| AccountRecord {
                    id: a.id,
                    name: a.name.clone(),
                    kind: a.kind,
                    archived: a.archived,
                })
                .collect(),
            budget_categories: ledger
                .budget_categories
                .iter()
                .map(|c| CategoryRecord {
                    id: c.id,
                    name: c.name.clone(),
                })
                .collect(),
            budgets: ledger
                .budgets
                .iter()
                .map(|b| BudgetRecord {
                    id: b.id,
                    name: b.name.clone(),
                    budget_category_id: b.category_id,
                    is_to_be_budgeted: b.is_to_be_budgeted,
                })
                .collect(),
            payees: ledger
                .payees
                .iter()
                .map(|p| PayeeRecord {
                    id: p.id,
                    name: p.name.clone(),
                })
                .collect(),
            transactions: ledger
                .transactions
                .iter()
                .map(|txn| TransactionRecord {
                    id: txn.id,
                    account_id: txn.account_id,
                    payee_id: txn.payee_id,
                    transaction_posting_ids: txn.postings().iter().map(|p| p.id).collect(),
                    status: txn.status,
                    date: txn.date,
                    recurring_template_id: txn.recurring_template_id,
                })
                .collect(),
            transaction_postings: ledger
                .transactions
                .iter()
                .flat_map(|txn| txn.postings().iter())
                .map(|posting| PostingRecord {
                    id: posting.id,
                    budget_id: posting.budget_id,
                    amount: posting.amount_cents,
                    note: posting.note.clone(),
                    payee_id: None,
                })
                .collect(),
            recurring_templates: ledger
                .recurring_templates
                .iter()
                .map(|t| TemplateRecord {
                    id: t.id,
                    rrule_string: t.rrule.clone(),
                    next_scheduled_date: t.next_scheduled,
                    start_date: t.start_date,
                    end_date: t.end_date,
                    account_id: t.account_id,
                    amount: t.amount_cents,
                    budget_id: t.budget_id,
                    payee_id: t.payee_id,
                    note: t.note.clone(),
                })
                .collect(),
            assignments: ledger
                .assignments
                .iter()
                .map(|a| AssignmentRecord {
                    id: a.id,
                    date: a.date,
                    budget_id: a.budget_id,
                    amount: a.amount_cents,
                })
                .collect(),
            transfers: ledger
                .transfers
                .iter()
                .map(|t| TransferRecord {
                    id: t.id,
                    from_account_id: t.from_account_id,
                    to_account_id: t.to_account_id,
                    amount: t.amount_cents,
                    from_status: t.from_status,
                    to_status: t.to_status,
                    date: t.date,
                    note: t.note.clone(),
                    budget_id: t.budget_id,
                })
                .collect(),
            goals: ledger
                .goals
                .iter()
                .map(|g| GoalRecord {
                    id: g.id,
                    kind: g.kind,
                    target_amount: g.target_cents,
                    budget_id: g.budget_id,
                    is_archived: g.is_archived,
                    created_at: g.created_at,
                })
                .collect(),
            schema_version: DOCUMENT_SCHEMA_VERSION,
        }
    }

    /// Builds the in-memory ledger, applying the legacy payee migration and
    /// re-nesting postings under their owning transactions.
    pub fn into_ledger(mut self) -> Result<Ledger> {
        self.migrate_posting_payees();

        let mut postings: HashMap<Uuid, PostingRecord> = self
            .transaction_postings
            .into_iter()
            .map(|record| (record.id, record))
            .collect();

        let mut ledger = Ledger::new(self.name);
        ledger.accounts = self
            .accounts
            .into_iter()
            .map(|record| Account {
                id: record.id,
                name: record.name,
                kind: record.kind,
                archived: record.archived,
            })
            .collect();
        ledger.budget_categories = self
            .budget_categories
            .into_iter()
            .map(|record| BudgetCategory {
                id: record.id,
                name: record.name,
            })
            .collect();
        ledger.budgets = self
            .budgets
            .into_iter()
            .map(|record| Budget {
                id: record.id,
                name: record.name,
                category_id: record.budget_category_id,
                is_to_be_budgeted: record.is_to_be_budgeted,
            })
            .collect();
        ledger.payees = self
            .payees
            .into_iter()
            .map(|record| Payee {
                id: record.id,
                name: record.name,
            })
            .collect();

        let mut transactions = Vec::with_capacity(self.transactions.len());
        for record in self.transactions {
            let mut owned = Vec::with_capacity(record.transaction_posting_ids.len());
            for posting_id in &record.transaction_posting_ids {
                match postings.remove(posting_id) {
                    Some(posting) => owned.push(Posting {
                        id: posting.id,
                        amount_cents: posting.amount,
                        budget_id: posting.budget_id,
                        note: posting.note,
                    }),
                    None => {
                        tracing::warn!(
                            transaction = %record.id,
                            posting = %posting_id,
                            "transaction references a missing posting, skipping it"
                        );
                    }
                }
            }
            let transaction = Transaction::from_parts(
                record.id,
                record.date,
                record.account_id,
                record.payee_id,
                record.status,
                owned,
                record.recurring_template_id,
            )
            .map_err(|_| {
                BudgetError::InvalidDocument(format!(
                    "transaction {} resolves to zero postings",
                    record.id
                ))
            })?;
            transactions.push(transaction);
        }
        ledger.transactions = transactions;

        for orphan in postings.keys() {
            tracing::warn!(posting = %orphan, "dropping posting not owned by any transaction");
        }

        ledger.recurring_templates = self
            .recurring_templates
            .into_iter()
            .map(|record| RecurringTemplate {
                id: record.id,
                rrule: record.rrule_string,
                start_date: record.start_date,
                next_scheduled: record.next_scheduled_date,
                end_date: record.end_date,
                account_id: record.account_id,
                payee_id: record.payee_id,
                budget_id: record.budget_id,
                amount_cents: record.amount,
                note: record.note,
            })
            .collect();
        ledger.assignments = self
            .assignments
            .into_iter()
            .map(|record| Assignment {
                id: record.id,
                date: record.date,
                budget_id: record.budget_id,
                amount_cents: record.amount,
            })
            .collect();
        ledger.transfers = self
            .transfers
            .into_iter()
            .map(|record| Transfer {
                id: record.id,
                date: record.date,
                from_account_id: record.from_account_id,
                to_account_id: record.to_account_id,
                amount_cents: record.amount,
                from_status: record.from_status,
                to_status: record.to_status,
                note: record.note,
                budget_id: record.budget_id,
            })
            .collect();
        ledger.goals = self
            .goals
            .into_iter()
            .map(|record| Goal {
                id: record.id,
                kind: record.kind,
                target_cents: record.target_amount,
                budget_id: record.budget_id,
                is_archived: record.is_archived,
                created_at: record.created_at,
            })
            .collect();

        Ok(ledger)
    }

    /// One-way migration for the pre-v2 shape that stored `payee_id` on the
    /// first posting of each transaction. The first posting's payee moves up
    /// to the transaction; disagreeing split payees warn and keep the first.
    fn migrate_posting_payees(&mut self) {
        if self.transaction_postings.iter().all(|p| p.payee_id.is_none()) {
            return;
        }
        let payees_by_posting: HashMap<Uuid, Uuid> = self
            .transaction_postings
            .iter()
            .filter_map(|posting| posting.payee_id.map(|payee| (posting.id, payee)))
            .collect();

        for transaction in &mut self.transactions {
            let posting_payees: Vec<Option<Uuid>> = transaction
                .transaction_posting_ids
                .iter()
                .map(|id| payees_by_posting.get(id).copied())
                .collect();
            let first = posting_payees.first().copied().flatten();
            if posting_payees.iter().any(|payee| *payee != first) {
                tracing::warn!(
                    transaction = %transaction.id,
                    "split postings disagree on payee, keeping the first posting's payee"
                );
            }
            if transaction.payee_id.is_none() {
                transaction.payee_id = first;
            }
        }
        for posting in &mut self.transaction_postings {
            posting.payee_id = None;
        }
    }
}

/// Serde helpers for ISO-8601 instants. Day-only strings are accepted and
/// read as UTC start-of-day.
mod iso_instant {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| Error::custom(format!("invalid ISO-8601 instant `{raw}`")))
    }

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
            return Some(instant.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .map(crate::ledger::dates::start_of_day_utc)
    }
}

/// Serde helpers for scheduling dates: time-of-day is discarded on read, and
/// the calendar day is taken exactly as written so a host-timezone offset can
/// never shift it.
mod iso_day {
    use chrono::NaiveDate;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| Error::custom(format!("invalid ISO-8601 date `{raw}`")))
    }

    pub(super) fn parse(raw: &str) -> Option<NaiveDate> {
        let date_part = raw.split('T').next().unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }
}

mod iso_day_opt {
    use chrono::NaiveDate;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => super::iso_day::serialize(date, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(raw) => super::iso_day::parse(&raw)
                .map(Some)
                .ok_or_else(|| Error::custom(format!("invalid ISO-8601 date `{raw}`"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_parse_takes_the_calendar_day_as_written() {
        // An instant with a negative offset keeps its written day.
        assert_eq!(
            iso_day::parse("2024-03-01T23:30:00-05:00"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(iso_day::parse("2024-03-01"), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(iso_day::parse("not-a-date"), None);
    }

    #[test]
    fn instant_parse_accepts_day_only_strings() {
        let parsed = iso_instant::parse("2024-03-01").unwrap();
        assert_eq!(parsed.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn missing_top_level_array_is_a_fatal_descriptive_error() {
        let err = parse_document(r#"{ "name": "x", "accounts": [] }"#).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Invalid ledger document"), "{message}");
    }

    #[test]
    fn newer_schema_versions_are_rejected() {
        let raw = format!(
            r#"{{ "name": "x", "accounts": [], "budget_categories": [], "budgets": [],
                 "payees": [], "transactions": [], "transaction_postings": [],
                 "recurring_templates": [], "assignments": [], "transfers": [],
                 "schema_version": {} }}"#,
            DOCUMENT_SCHEMA_VERSION + 1
        );
        assert!(parse_document(&raw).is_err());
    }
}
