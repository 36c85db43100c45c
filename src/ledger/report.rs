use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::WeekKey;

use super::{
    entry::{total, Entry},
    week::WeekRecord,
};

/// Immutable summary of a week, appended to the history when the week is finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    #[serde(alias = "semana")]
    week_key: WeekKey,
    #[serde(alias = "fecha")]
    finalized_at: DateTime<Utc>,
    #[serde(alias = "ingresos")]
    total_income: f64,
    #[serde(alias = "gastos")]
    total_expense: f64,
    #[serde(default, alias = "comentario")]
    comment: String,
    #[serde(default)]
    income_snapshot: Vec<Entry>,
    #[serde(default)]
    expense_snapshot: Vec<Entry>,
    #[serde(default, rename = "transacciones", skip_serializing)]
    legacy_snapshot: Option<LegacySnapshot>,
}

/// Nested entry lists as written by the original application.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
struct LegacySnapshot {
    #[serde(default)]
    ingresos: Vec<Entry>,
    #[serde(default)]
    gastos: Vec<Entry>,
}

impl ReportRecord {
    /// Copies the week's entries and computes totals from the copies.
    pub(crate) fn snapshot(
        week_key: WeekKey,
        week: &WeekRecord,
        comment: Option<&str>,
        finalized_at: DateTime<Utc>,
    ) -> Self {
        let income_snapshot = week.income_entries().to_vec();
        let expense_snapshot = week.expense_entries().to_vec();
        Self {
            week_key,
            finalized_at,
            total_income: total(&income_snapshot),
            total_expense: total(&expense_snapshot),
            comment: comment.map(str::trim).unwrap_or_default().to_string(),
            income_snapshot,
            expense_snapshot,
            legacy_snapshot: None,
        }
    }

    pub fn week_key(&self) -> WeekKey {
        self.week_key
    }

    pub fn finalized_at(&self) -> DateTime<Utc> {
        self.finalized_at
    }

    pub fn total_income(&self) -> f64 {
        self.total_income
    }

    pub fn total_expense(&self) -> f64 {
        self.total_expense
    }

    pub fn balance(&self) -> f64 {
        self.total_income - self.total_expense
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn income_snapshot(&self) -> &[Entry] {
        &self.income_snapshot
    }

    pub fn expense_snapshot(&self) -> &[Entry] {
        &self.expense_snapshot
    }

    /// Moves entry lists loaded from the legacy `transacciones` field into the snapshots.
    pub(crate) fn absorb_legacy_snapshot(&mut self) {
        if let Some(legacy) = self.legacy_snapshot.take() {
            if self.income_snapshot.is_empty() && self.expense_snapshot.is_empty() {
                self.income_snapshot = legacy.ingresos;
                self.expense_snapshot = legacy.gastos;
            }
        }
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.income_snapshot.iter().chain(self.expense_snapshot.iter())
    }
}
