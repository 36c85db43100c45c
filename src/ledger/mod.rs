//! Week-keyed ledger: entries, week records, report snapshots and the root store.

pub mod entry;
pub mod report;
pub mod store;
pub mod week;

pub use entry::{Entry, EntryDraft, EntryKind, INCOME_PLACEHOLDER};
pub use report::ReportRecord;
pub use store::Store;
pub use week::WeekRecord;
