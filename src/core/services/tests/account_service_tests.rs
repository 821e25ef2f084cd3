use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::services::AccountService;
use crate::ledger::{
    dates, Account, AccountKind, Ledger, Posting, Transaction, TransactionStatus, Transfer,
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn txn(account: Uuid, amount: i64, status: TransactionStatus, on: NaiveDate) -> Transaction {
    let mut txn = Transaction::new(
        account,
        dates::start_of_day_utc(on),
        Posting::new(amount, None),
    );
    txn.status = status;
    txn
}

#[test]
fn balances_split_by_status() {
    let mut ledger = Ledger::new("Balances");
    let checking = ledger.add_account(Account::new("Checking", AccountKind::Budget));
    ledger.add_transaction(txn(checking, 10_000, TransactionStatus::Cleared, day(2024, 1, 2)));
    ledger.add_transaction(txn(checking, -3_000, TransactionStatus::Cleared, day(2024, 1, 5)));
    ledger.add_transaction(txn(checking, -1_000, TransactionStatus::Open, day(2024, 1, 9)));

    assert_eq!(AccountService::current_balance(&ledger, checking), 6_000);
    assert_eq!(AccountService::cleared_balance(&ledger, checking), 7_000);
    assert_eq!(AccountService::uncleared_balance(&ledger, checking), -1_000);
}

#[test]
fn split_transaction_counts_all_postings() {
    let mut ledger = Ledger::new("Splits");
    let checking = ledger.add_account(Account::new("Checking", AccountKind::Budget));
    let mut split = txn(checking, -500, TransactionStatus::Open, day(2024, 1, 2));
    split.add_posting(Posting::new(-250, None));
    ledger.add_transaction(split);

    assert_eq!(AccountService::current_balance(&ledger, checking), -750);
}

#[test]
fn transfers_hit_both_endpoints_with_their_own_statuses() {
    let mut ledger = Ledger::new("Transfers");
    let checking = ledger.add_account(Account::new("Checking", AccountKind::Budget));
    let savings = ledger.add_account(Account::new("Savings", AccountKind::Budget));
    let mut transfer = Transfer::new(
        checking,
        savings,
        2_500,
        dates::start_of_day_utc(day(2024, 1, 3)),
    );
    transfer.from_status = TransactionStatus::Cleared;
    transfer.to_status = TransactionStatus::Open;
    ledger.add_transfer(transfer);

    assert_eq!(AccountService::current_balance(&ledger, checking), -2_500);
    assert_eq!(AccountService::current_balance(&ledger, savings), 2_500);
    assert_eq!(AccountService::cleared_balance(&ledger, checking), -2_500);
    assert_eq!(AccountService::cleared_balance(&ledger, savings), 0);
    assert_eq!(AccountService::uncleared_balance(&ledger, savings), 2_500);
}

#[test]
fn net_worth_includes_tracking_accounts() {
    let mut ledger = Ledger::new("NetWorth");
    let checking = ledger.add_account(Account::new("Checking", AccountKind::Budget));
    let brokerage = ledger.add_account(Account::new("Brokerage", AccountKind::Tracking));
    ledger.add_transaction(txn(checking, 10_000, TransactionStatus::Cleared, day(2024, 1, 2)));
    ledger.add_transaction(txn(brokerage, 50_000, TransactionStatus::Cleared, day(2024, 1, 2)));

    assert_eq!(AccountService::net_worth(&ledger), 60_000);
}
