use serde::{Deserialize, Serialize};

use super::entry::{Entry, EntryKind};

/// Entry lists and finalize flag for one week key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRecord {
    #[serde(default, alias = "ingresos")]
    income_entries: Vec<Entry>,
    #[serde(default, alias = "gastos")]
    expense_entries: Vec<Entry>,
    #[serde(default, alias = "reportGenerated")]
    finalized: bool,
}

impl WeekRecord {
    pub fn income_entries(&self) -> &[Entry] {
        &self.income_entries
    }

    pub fn expense_entries(&self) -> &[Entry] {
        &self.expense_entries
    }

    pub fn entries(&self, kind: EntryKind) -> &[Entry] {
        match kind {
            EntryKind::Income => &self.income_entries,
            EntryKind::Expense => &self.expense_entries,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn is_empty(&self) -> bool {
        self.income_entries.is_empty() && self.expense_entries.is_empty()
    }

    pub(crate) fn entries_mut(&mut self, kind: EntryKind) -> &mut Vec<Entry> {
        match kind {
            EntryKind::Income => &mut self.income_entries,
            EntryKind::Expense => &mut self.expense_entries,
        }
    }

    /// One-way transition; there is no way back to open.
    pub(crate) fn mark_finalized(&mut self) {
        self.finalized = true;
    }
}
