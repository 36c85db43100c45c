#![doc(test(attr(deny(warnings))))]

//! Finanz Core keeps a weekly Monday to Friday ledger of income and expenses and
//! produces an end-of-week report once the Friday afternoon gate opens.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod time;
pub mod utils;

use std::sync::Once;

pub use errors::BudgetError;

pub type Result<T> = std::result::Result<T, BudgetError>;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Finanz Core tracing initialized.");
    });
}
