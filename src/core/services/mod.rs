pub mod report_service;
pub mod transaction_service;

pub use report_service::{Countdown, ReportService, ReportStatus, GATE_HOUR, GATE_WEEKDAY};
pub use transaction_service::{TransactionService, WeekTotals};
