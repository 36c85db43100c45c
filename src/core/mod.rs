//! Services over the ledger and the [`WeekManager`] command facade.

pub mod services;
pub mod week_manager;

pub use week_manager::WeekManager;
