use chrono::NaiveDateTime;
use thiserror::Error;

use crate::time::WeekKey;

/// Error type covering ledger validation, the weekly report gate, and persistence.
#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Week {0} has already been finalized")]
    AlreadyFinalized(WeekKey),
    #[error("Weekly report is locked until {opens_at}")]
    GateClosed { opens_at: NaiveDateTime },
    #[error("Week {0} is finalized and can no longer be modified")]
    WeekFinalized(WeekKey),
    #[error("Invalid week key: {0}")]
    InvalidWeekKey(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl BudgetError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// True for failures of the underlying store read/write.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::Io(_) | Self::Serde(_))
    }
}
