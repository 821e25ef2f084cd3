use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tempfile::tempdir;

use envelope_core::core::services::BudgetService;
use envelope_core::ledger::{dates, Account, AccountKind, Assignment, Budget, Ledger, Posting, Transaction};
use envelope_core::storage::json_backend::{load_ledger_from_path, save_ledger_to_path};

fn build_sample_ledger(txn_count: usize) -> Ledger {
    let mut ledger = Ledger::new("Benchmark");
    let checking = ledger.add_account(Account::new("Checking", AccountKind::Budget));
    ledger.add_account(Account::new("Brokerage", AccountKind::Tracking));
    let inflow = ledger.add_budget(Budget::inflow("Inflow"));
    let groceries = ledger.add_budget(Budget::new("Groceries"));

    let start_date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    ledger.add_assignment(Assignment::new(
        groceries,
        500_000,
        dates::start_of_day_utc(start_date),
    ));

    for idx in 0..txn_count {
        let scheduled = start_date + Duration::days((idx % 365) as i64);
        let budget = if idx % 10 == 0 { inflow } else { groceries };
        let amount = if idx % 10 == 0 { 250_000 } else { -(50 + (idx % 100) as i64) };
        let txn = Transaction::new(
            checking,
            dates::start_of_day_utc(scheduled),
            Posting::new(amount, Some(budget)),
        );
        ledger.add_transaction(txn);
    }
    ledger
}

fn bench_ledger_io(c: &mut Criterion) {
    let ledger = build_sample_ledger(black_box(10_000));
    let dir = tempdir().expect("tempdir");
    let file_path = dir.path().join("ledger.json");

    c.bench_function("ledger_save_10k", |b| {
        b.iter(|| {
            save_ledger_to_path(&ledger, &file_path).expect("save ledger");
        })
    });

    save_ledger_to_path(&ledger, &file_path).expect("seed");

    c.bench_function("ledger_load_10k", |b| {
        b.iter(|| {
            let loaded = load_ledger_from_path(&file_path).expect("load ledger");
            black_box(loaded);
        })
    });
}

fn bench_availability_query(c: &mut Criterion) {
    let ledger = build_sample_ledger(black_box(10_000));
    let inflow = ledger.inflow_budget().expect("inflow budget").id;
    let month = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

    c.bench_function("available_for_month_10k", |b| {
        b.iter(|| {
            black_box(BudgetService::available_for_month(&ledger, inflow, month));
        })
    });
}

criterion_group!(benches, bench_ledger_io, bench_availability_query);
criterion_main!(benches);
