use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::{
    account::Account,
    assignment::Assignment,
    budget::Budget,
    category::BudgetCategory,
    goal::Goal,
    payee::Payee,
    recurring::{self, RecurringTemplate},
    transaction::{Posting, Transaction},
    transfer::Transfer,
};

/// The aggregate root owning every budgeting collection.
///
/// All mutation goes through methods that call [`Ledger::touch`] after the
/// change lands, so observers polling [`Ledger::version`] never see a
/// half-applied mutation. Foreign references are looked up lazily and resolve
/// to `None` when the target was deleted; the core never faults on a dangling
/// id.
#[derive(Debug, Clone)]
pub struct Ledger {
    pub id: Uuid,
    pub name: String,
    pub accounts: Vec<Account>,
    pub payees: Vec<Payee>,
    pub budget_categories: Vec<BudgetCategory>,
    pub budgets: Vec<Budget>,
    pub transactions: Vec<Transaction>,
    pub transfers: Vec<Transfer>,
    pub assignments: Vec<Assignment>,
    pub recurring_templates: Vec<RecurringTemplate>,
    pub goals: Vec<Goal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    version: u64,
}

impl Ledger {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            accounts: Vec::new(),
            payees: Vec::new(),
            budget_categories: Vec::new(),
            budgets: Vec::new(),
            transactions: Vec::new(),
            transfers: Vec::new(),
            assignments: Vec::new(),
            recurring_templates: Vec::new(),
            goals: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Monotonic mutation counter for dirty tracking. Bumped after every
    /// committed mutation, never mid-mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }

    pub fn add_account(&mut self, account: Account) -> Uuid {
        let id = account.id;
        self.accounts.push(account);
        self.touch();
        id
    }

    pub fn add_payee(&mut self, payee: Payee) -> Uuid {
        let id = payee.id;
        self.payees.push(payee);
        self.touch();
        id
    }

    pub fn add_category(&mut self, category: BudgetCategory) -> Uuid {
        let id = category.id;
        self.budget_categories.push(category);
        self.touch();
        id
    }

    pub fn add_budget(&mut self, budget: Budget) -> Uuid {
        let id = budget.id;
        self.budgets.push(budget);
        self.touch();
        id
    }

    pub fn add_transaction(&mut self, transaction: Transaction) -> Uuid {
        let id = transaction.id;
        self.transactions.push(transaction);
        self.touch();
        id
    }

    pub fn add_transfer(&mut self, transfer: Transfer) -> Uuid {
        let id = transfer.id;
        self.transfers.push(transfer);
        self.touch();
        id
    }

    pub fn add_assignment(&mut self, assignment: Assignment) -> Uuid {
        let id = assignment.id;
        self.assignments.push(assignment);
        self.touch();
        id
    }

    pub fn add_template(&mut self, template: RecurringTemplate) -> Uuid {
        let id = template.id;
        self.recurring_templates.push(template);
        self.touch();
        id
    }

    pub fn add_goal(&mut self, goal: Goal) -> Uuid {
        let id = goal.id;
        self.goals.push(goal);
        self.touch();
        id
    }

    /// Removes a transaction together with its owned postings.
    ///
    /// Postings live only inside their transaction, so removal can never
    /// leave an orphan behind.
    pub fn delete_transaction(&mut self, transaction_id: Uuid) -> Option<Transaction> {
        let index = self
            .transactions
            .iter()
            .position(|txn| txn.id == transaction_id)?;
        let removed = self.transactions.remove(index);
        self.touch();
        Some(removed)
    }

    pub fn delete_transfer(&mut self, transfer_id: Uuid) -> Option<Transfer> {
        let index = self
            .transfers
            .iter()
            .position(|transfer| transfer.id == transfer_id)?;
        let removed = self.transfers.remove(index);
        self.touch();
        Some(removed)
    }

    pub fn account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn payee(&self, id: Uuid) -> Option<&Payee> {
        self.payees.iter().find(|payee| payee.id == id)
    }

    pub fn category(&self, id: Uuid) -> Option<&BudgetCategory> {
        self.budget_categories.iter().find(|cat| cat.id == id)
    }

    pub fn budget(&self, id: Uuid) -> Option<&Budget> {
        self.budgets.iter().find(|budget| budget.id == id)
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn transaction_mut(&mut self, id: Uuid) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|txn| txn.id == id)
    }

    pub fn template(&self, id: Uuid) -> Option<&RecurringTemplate> {
        self.recurring_templates.iter().find(|t| t.id == id)
    }

    pub fn template_mut(&mut self, id: Uuid) -> Option<&mut RecurringTemplate> {
        self.recurring_templates.iter_mut().find(|t| t.id == id)
    }

    /// The special "To Be Budgeted" envelope, when the ledger has one.
    pub fn inflow_budget(&self) -> Option<&Budget> {
        self.budgets.iter().find(|budget| budget.is_to_be_budgeted)
    }

    /// The active (unarchived) goal attached to a budget, if any.
    pub fn goal_for_budget(&self, budget_id: Uuid) -> Option<&Goal> {
        self.goals
            .iter()
            .find(|goal| goal.budget_id == budget_id && !goal.is_archived)
    }

    /// Derived posting lookup across all transactions. Postings have a single
    /// owner; this scan replaces the old flat postings collection.
    pub fn find_posting(&self, posting_id: Uuid) -> Option<(&Transaction, &Posting)> {
        self.transactions.iter().find_map(|txn| {
            txn.posting(posting_id).map(|posting| (txn, posting))
        })
    }

    /// Runs one recurring-transaction materialization pass for `today`.
    pub fn run_scheduler_pass(&mut self, today: NaiveDate) -> usize {
        recurring::run_scheduler_pass(self, today)
    }
}
