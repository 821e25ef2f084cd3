use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{BudgetError, Result};

use super::dates;

/// A recorded money movement on a single account, owning one or more postings.
///
/// A transaction always has at least one posting; the constructor takes the
/// first and [`Transaction::remove_posting`] refuses to drop the last.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub account_id: Uuid,
    pub payee_id: Option<Uuid>,
    pub status: TransactionStatus,
    postings: Vec<Posting>,
    #[serde(default)]
    pub recurring_template_id: Option<Uuid>,
}

impl Transaction {
    pub fn new(account_id: Uuid, date: DateTime<Utc>, first_posting: Posting) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            account_id,
            payee_id: None,
            status: TransactionStatus::Open,
            postings: vec![first_posting],
            recurring_template_id: None,
        }
    }

    /// Links the transaction to a payee.
    pub fn with_payee(mut self, payee_id: Uuid) -> Self {
        self.payee_id = Some(payee_id);
        self
    }

    /// Tags the transaction as materialized from a recurring template.
    pub fn with_template(mut self, template_id: Uuid) -> Self {
        self.recurring_template_id = Some(template_id);
        self
    }

    /// Rebuilds a transaction from stored parts. Fails rather than admit a
    /// transaction with no postings.
    pub(crate) fn from_parts(
        id: Uuid,
        date: DateTime<Utc>,
        account_id: Uuid,
        payee_id: Option<Uuid>,
        status: TransactionStatus,
        postings: Vec<Posting>,
        recurring_template_id: Option<Uuid>,
    ) -> Result<Self> {
        if postings.is_empty() {
            return Err(BudgetError::EmptyTransaction);
        }
        Ok(Self {
            id,
            date,
            account_id,
            payee_id,
            status,
            postings,
            recurring_template_id,
        })
    }

    /// The calendar day the engine compares this transaction at.
    pub fn day(&self) -> NaiveDate {
        dates::day_of(self.date)
    }

    /// The owned postings, always at least one.
    pub fn postings(&self) -> &[Posting] {
        &self.postings
    }

    /// Whether the transaction carries more than one posting.
    pub fn is_split(&self) -> bool {
        self.postings.len() > 1
    }

    /// Headline amount: the first posting unless split, the posting total
    /// otherwise.
    pub fn amount_cents(&self) -> i64 {
        if self.is_split() {
            self.total_cents()
        } else {
            self.postings[0].amount_cents
        }
    }

    /// Sum of all posting amounts; the value balance math aggregates.
    pub fn total_cents(&self) -> i64 {
        self.postings.iter().map(|p| p.amount_cents).sum()
    }

    pub fn add_posting(&mut self, posting: Posting) -> Uuid {
        let id = posting.id;
        self.postings.push(posting);
        id
    }

    /// Removes a posting, keeping the at-least-one invariant.
    pub fn remove_posting(&mut self, posting_id: Uuid) -> Result<Posting> {
        let index = self
            .postings
            .iter()
            .position(|p| p.id == posting_id)
            .ok_or_else(|| BudgetError::InvalidInput(format!("posting {posting_id} not found")))?;
        if self.postings.len() == 1 {
            return Err(BudgetError::EmptyTransaction);
        }
        Ok(self.postings.remove(index))
    }

    pub fn posting(&self, posting_id: Uuid) -> Option<&Posting> {
        self.postings.iter().find(|p| p.id == posting_id)
    }
}

/// Settlement state of a transaction (or one side of a transfer).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Open,
    Cleared,
}

/// One line item within a transaction: a signed amount against an optional
/// budget envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Posting {
    pub id: Uuid,
    pub amount_cents: i64,
    pub budget_id: Option<Uuid>,
    #[serde(default)]
    pub note: String,
}

impl Posting {
    pub fn new(amount_cents: i64, budget_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount_cents,
            budget_id,
            note: String::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}
