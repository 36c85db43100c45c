use std::cmp::Reverse;

use chrono::NaiveDateTime;

use crate::{
    errors::BudgetError,
    ledger::{Entry, EntryDraft, EntryKind, ReportRecord, Store, WeekRecord},
    storage::StoreBackend,
    time::{current_week, Clock, WeekWindow},
};

use super::services::{Countdown, ReportService, ReportStatus, TransactionService, WeekTotals};

/// Owns the store, its persistence backend and the clock, and exposes the commands a
/// front end issues against the current week.
///
/// The active week is recomputed from the clock on every call. Each mutation is staged on a
/// copy of the store, written through the backend, and only then committed in memory.
pub struct WeekManager {
    store: Store,
    storage: Box<dyn StoreBackend>,
    clock: Box<dyn Clock>,
}

impl WeekManager {
    /// Loads the persisted store. Read failures and corrupt data start an empty store.
    pub fn open(storage: Box<dyn StoreBackend>, clock: Box<dyn Clock>) -> Self {
        let blob = match storage.load_blob() {
            Ok(blob) => blob,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    location = %storage.location(),
                    "failed to read stored data, starting with an empty store"
                );
                None
            }
        };
        let store = Store::from_blob(blob.as_deref());
        Self {
            store,
            storage,
            clock,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn storage(&self) -> &dyn StoreBackend {
        self.storage.as_ref()
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.local_now()
    }

    pub fn current_week(&self) -> WeekWindow {
        current_week(self.now())
    }

    /// Record for the current week, registered on first view.
    pub fn week(&mut self) -> &WeekRecord {
        let key = self.current_week().key;
        self.store.get_or_create_week(key)
    }

    pub fn totals(&self) -> WeekTotals {
        self.store
            .week(self.current_week().key)
            .map(TransactionService::totals)
            .unwrap_or_default()
    }

    /// Current week's entries of `kind`, most recent first.
    pub fn entries(&self, kind: EntryKind) -> Vec<&Entry> {
        self.store
            .week(self.current_week().key)
            .map(|week| TransactionService::sorted_entries(week.entries(kind)))
            .unwrap_or_default()
    }

    pub fn income_entries(&self) -> Vec<&Entry> {
        self.entries(EntryKind::Income)
    }

    pub fn expense_entries(&self) -> Vec<&Entry> {
        self.entries(EntryKind::Expense)
    }

    /// Finalized reports, most recent first.
    pub fn history(&self) -> Vec<&ReportRecord> {
        let mut reports: Vec<&ReportRecord> = self.store.report_history().iter().collect();
        reports.sort_by_key(|report| Reverse(report.finalized_at()));
        reports
    }

    pub fn can_finalize(&self) -> bool {
        ReportService::can_finalize(self.now())
    }

    pub fn next_gate_open_time(&self) -> NaiveDateTime {
        ReportService::next_gate_open_time(self.now())
    }

    pub fn countdown(&self) -> Countdown {
        let now = self.now();
        ReportService::countdown(now, ReportService::next_gate_open_time(now))
    }

    pub fn report_status(&self) -> ReportStatus {
        ReportService::status(self.store.week(self.current_week().key), self.now())
    }

    pub fn add_income(&mut self, draft: &EntryDraft) -> Result<Entry, BudgetError> {
        self.add_entry(EntryKind::Income, draft)
    }

    pub fn add_expense(&mut self, draft: &EntryDraft) -> Result<Entry, BudgetError> {
        self.add_entry(EntryKind::Expense, draft)
    }

    pub fn add_entry(&mut self, kind: EntryKind, draft: &EntryDraft) -> Result<Entry, BudgetError> {
        let key = self.current_week().key;
        let created_at = self.clock.utc_now();
        self.commit(|store| TransactionService::add(store, key, kind, draft, created_at))
    }

    /// Removes an entry from the current week. Unknown ids are not an error.
    pub fn delete_entry(&mut self, kind: EntryKind, id: i64) -> Result<bool, BudgetError> {
        let key = self.current_week().key;
        self.commit(|store| TransactionService::remove(store, key, kind, id))
    }

    /// Closes the current week and records its report.
    pub fn finalize(&mut self, comment: Option<&str>) -> Result<ReportRecord, BudgetError> {
        let now = self.now();
        let key = current_week(now).key;
        let finalized_at = self.clock.utc_now();
        self.commit(|store| ReportService::finalize(store, key, comment, now, finalized_at))
    }

    /// Writes the whole store through the backend.
    pub fn save(&self) -> Result<(), BudgetError> {
        self.storage.save_blob(&self.store.to_blob()?)
    }

    fn commit<T>(
        &mut self,
        operation: impl FnOnce(&mut Store) -> Result<T, BudgetError>,
    ) -> Result<T, BudgetError> {
        let mut staged = self.store.clone();
        let outcome = operation(&mut staged)?;
        if staged != self.store {
            self.storage.save_blob(&staged.to_blob()?)?;
            tracing::debug!(location = %self.storage.location(), "store persisted");
            self.store = staged;
        }
        Ok(outcome)
    }
}
