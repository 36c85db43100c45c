use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{errors::BudgetError, time::WeekKey};

/// Description given to income entries submitted without one.
pub const INCOME_PLACEHOLDER: &str = "Income without description";

/// Which of a week's two lists an entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn label(self) -> &'static str {
        match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntryKind {
    type Err = BudgetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" | "ingreso" | "ingresos" => Ok(EntryKind::Income),
            "expense" | "gasto" | "gastos" => Ok(EntryKind::Expense),
            other => Err(BudgetError::validation(format!(
                "unknown entry kind `{other}` (expected income or expense)"
            ))),
        }
    }
}

/// A single recorded income or expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: i64,
    #[serde(alias = "cantidad")]
    pub amount: f64,
    #[serde(alias = "descripcion")]
    pub description: String,
    #[serde(alias = "fecha")]
    pub date: NaiveDate,
    #[serde(alias = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Unvalidated input for a new entry, as submitted by a front end.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub amount: f64,
    pub description: String,
    pub date: Option<NaiveDate>,
}

impl EntryDraft {
    pub fn new(amount: f64, date: NaiveDate) -> Self {
        Self {
            amount,
            description: String::new(),
            date: Some(date),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Checks the draft against the rules for `kind` within `week` and returns the
    /// normalized `(amount, description, date)`.
    pub(crate) fn validate(
        &self,
        kind: EntryKind,
        week: WeekKey,
    ) -> Result<(f64, String, NaiveDate), BudgetError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(BudgetError::validation("amount must be a positive number"));
        }
        let date = self
            .date
            .ok_or_else(|| BudgetError::validation("date is required"))?;
        if !week.contains(date) {
            return Err(BudgetError::validation(format!(
                "{date} is not a weekday of the week starting {week}"
            )));
        }
        let description = self.description.trim();
        let description = match (kind, description.is_empty()) {
            (EntryKind::Expense, true) => {
                return Err(BudgetError::validation(
                    "description is required for expenses",
                ))
            }
            (EntryKind::Income, true) => INCOME_PLACEHOLDER.to_string(),
            (_, false) => description.to_string(),
        };
        Ok((self.amount, description, date))
    }
}

/// Sum of the amounts of `entries`.
pub fn total(entries: &[Entry]) -> f64 {
    entries.iter().map(|entry| entry.amount).sum()
}
