#![doc(test(attr(deny(warnings))))]

//! Envelope Core offers the ledger computation and recurrence-scheduling
//! primitives behind an envelope-budgeting application: derived balances,
//! monthly envelope availability, goal progress, and idempotent
//! materialization of recurring transactions.

pub mod core;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Envelope Core tracing initialized.");
    });
}
