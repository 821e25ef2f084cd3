//! Derived account balances. Balances are never stored; they are sums over
//! the account's transactions and transfer endpoints.

use uuid::Uuid;

use crate::ledger::{Ledger, TransactionStatus};

/// Stateless balance queries over [`Ledger`] snapshots.
pub struct AccountService;

impl AccountService {
    /// Sum of all activity on the account, regardless of status.
    pub fn current_balance(ledger: &Ledger, account_id: Uuid) -> i64 {
        Self::balance_where(ledger, account_id, |_| true)
    }

    /// Sum of cleared activity only.
    pub fn cleared_balance(ledger: &Ledger, account_id: Uuid) -> i64 {
        Self::balance_where(ledger, account_id, |status| {
            status == TransactionStatus::Cleared
        })
    }

    /// Sum of open (not yet cleared) activity only.
    pub fn uncleared_balance(ledger: &Ledger, account_id: Uuid) -> i64 {
        Self::balance_where(ledger, account_id, |status| {
            status == TransactionStatus::Open
        })
    }

    /// Net worth across every account, tracking accounts included.
    pub fn net_worth(ledger: &Ledger) -> i64 {
        ledger
            .accounts
            .iter()
            .map(|account| Self::current_balance(ledger, account.id))
            .sum()
    }

    fn balance_where(
        ledger: &Ledger,
        account_id: Uuid,
        include: impl Fn(TransactionStatus) -> bool,
    ) -> i64 {
        let transactions: i64 = ledger
            .transactions
            .iter()
            .filter(|txn| txn.account_id == account_id && include(txn.status))
            .map(|txn| txn.total_cents())
            .sum();

        // Transfers hit both endpoints: an outflow at the source under
        // `from_status`, an inflow at the destination under `to_status`.
        let transfers: i64 = ledger
            .transfers
            .iter()
            .map(|transfer| {
                let mut amount = 0i64;
                if transfer.from_account_id == account_id && include(transfer.from_status) {
                    amount -= transfer.amount_cents;
                }
                if transfer.to_account_id == account_id && include(transfer.to_status) {
                    amount += transfer.amount_cents;
                }
                amount
            })
            .sum();

        transactions + transfers
    }
}
