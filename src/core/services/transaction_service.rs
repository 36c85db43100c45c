use chrono::{DateTime, Utc};

use crate::{
    errors::BudgetError,
    ledger::{entry::total, Entry, EntryDraft, EntryKind, Store, WeekRecord},
    time::WeekKey,
};

/// Aggregates for one week, recomputed on every call.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeekTotals {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

/// Entry mutations and week aggregates.
pub struct TransactionService;

impl TransactionService {
    pub fn add(
        store: &mut Store,
        key: WeekKey,
        kind: EntryKind,
        draft: &EntryDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Entry, BudgetError> {
        store.add_entry(key, kind, draft, created_at)
    }

    pub fn remove(
        store: &mut Store,
        key: WeekKey,
        kind: EntryKind,
        id: i64,
    ) -> Result<bool, BudgetError> {
        store.delete_entry(key, kind, id)
    }

    pub fn totals(week: &WeekRecord) -> WeekTotals {
        let income = total(week.income_entries());
        let expense = total(week.expense_entries());
        WeekTotals {
            income,
            expense,
            balance: income - expense,
        }
    }

    /// Most recently created first; entries created at the same instant keep insertion order.
    pub fn sorted_entries(entries: &[Entry]) -> Vec<&Entry> {
        let mut sorted: Vec<&Entry> = entries.iter().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted
    }
}
