use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{errors::BudgetError, time::WeekKey};

use super::{
    entry::{Entry, EntryDraft, EntryKind},
    report::ReportRecord,
    week::WeekRecord,
};

/// Root aggregate: every week ever touched plus the finalized report history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    #[serde(default)]
    weeks: BTreeMap<WeekKey, WeekRecord>,
    #[serde(default)]
    report_history: Vec<ReportRecord>,
    /// Highest id ever issued, deleted entries included.
    #[serde(default)]
    last_entry_id: i64,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a persisted blob. Missing or unreadable data yields an empty store.
    pub fn from_blob(blob: Option<&str>) -> Self {
        let Some(raw) = blob else {
            tracing::debug!("no stored data found, starting with an empty store");
            return Self::new();
        };
        match serde_json::from_str::<Store>(raw) {
            Ok(mut store) => {
                store.normalize();
                tracing::debug!(
                    weeks = store.weeks.len(),
                    reports = store.report_history.len(),
                    "loaded store"
                );
                store
            }
            Err(err) => {
                tracing::warn!(error = %err, "stored data is corrupt, starting with an empty store");
                Self::new()
            }
        }
    }

    pub fn to_blob(&self) -> Result<String, BudgetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn week(&self, key: WeekKey) -> Option<&WeekRecord> {
        self.weeks.get(&key)
    }

    /// Returns the record for `key`, registering an empty open week if there is none.
    pub fn get_or_create_week(&mut self, key: WeekKey) -> &WeekRecord {
        self.weeks.entry(key).or_default()
    }

    pub fn weeks(&self) -> impl Iterator<Item = (WeekKey, &WeekRecord)> {
        self.weeks.iter().map(|(key, week)| (*key, week))
    }

    pub fn report_history(&self) -> &[ReportRecord] {
        &self.report_history
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty() && self.report_history.is_empty()
    }

    /// Validates `draft` and appends it to the `kind` list of week `key`.
    pub fn add_entry(
        &mut self,
        key: WeekKey,
        kind: EntryKind,
        draft: &EntryDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Entry, BudgetError> {
        let (amount, description, date) = draft.validate(kind, key)?;
        if self.week(key).is_some_and(WeekRecord::is_finalized) {
            return Err(BudgetError::WeekFinalized(key));
        }
        let entry = Entry {
            id: self.next_entry_id(created_at),
            amount,
            description,
            date,
            created_at,
        };
        self.weeks
            .entry(key)
            .or_default()
            .entries_mut(kind)
            .push(entry.clone());
        tracing::info!(week = %key, %kind, id = entry.id, amount, "entry added");
        Ok(entry)
    }

    /// Removes entry `id` from the `kind` list of week `key`. Returns whether anything was removed.
    pub fn delete_entry(
        &mut self,
        key: WeekKey,
        kind: EntryKind,
        id: i64,
    ) -> Result<bool, BudgetError> {
        let Some(week) = self.weeks.get_mut(&key) else {
            return Ok(false);
        };
        if week.is_finalized() {
            return Err(BudgetError::WeekFinalized(key));
        }
        let entries = week.entries_mut(kind);
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        let removed = entries.len() != before;
        if removed {
            tracing::info!(week = %key, %kind, id, "entry deleted");
        }
        Ok(removed)
    }

    /// Closes week `key` and appends its report. The time gate is checked by the caller.
    pub(crate) fn finalize_week(
        &mut self,
        key: WeekKey,
        comment: Option<&str>,
        finalized_at: DateTime<Utc>,
    ) -> Result<ReportRecord, BudgetError> {
        let week = self.weeks.entry(key).or_default();
        if week.is_finalized() {
            return Err(BudgetError::AlreadyFinalized(key));
        }
        let report = ReportRecord::snapshot(key, week, comment, finalized_at);
        week.mark_finalized();
        self.report_history.push(report.clone());
        tracing::info!(
            week = %key,
            income = report.total_income(),
            expense = report.total_expense(),
            "week finalized"
        );
        Ok(report)
    }

    /// Millisecond creation time, bumped past the last issued id when the clock has not moved.
    fn next_entry_id(&mut self, created_at: DateTime<Utc>) -> i64 {
        let id = created_at
            .timestamp_millis()
            .max(self.last_entry_id.saturating_add(1));
        self.last_entry_id = id;
        id
    }

    fn normalize(&mut self) {
        for report in &mut self.report_history {
            report.absorb_legacy_snapshot();
        }
        let live = self.weeks.values().flat_map(|week| {
            week.income_entries()
                .iter()
                .chain(week.expense_entries().iter())
        });
        let archived = self.report_history.iter().flat_map(ReportRecord::entries);
        let highest = live.chain(archived).map(|entry| entry.id).max().unwrap_or(0);
        self.last_entry_id = self.last_entry_id.max(highest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn key() -> WeekKey {
        "2024-01-01".parse().unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn get_or_create_week_is_idempotent() {
        let mut store = Store::new();
        assert!(store.week(key()).is_none());
        assert!(!store.get_or_create_week(key()).is_finalized());
        store.get_or_create_week(key());
        assert_eq!(store.weeks().count(), 1);
    }

    #[test]
    fn ids_stay_unique_within_one_millisecond() {
        let mut store = Store::new();
        let draft = EntryDraft::new(5.0, monday());
        let first = store
            .add_entry(key(), EntryKind::Income, &draft, created())
            .unwrap();
        let second = store
            .add_entry(key(), EntryKind::Expense, &draft.clone().with_description("Bus"), created())
            .unwrap();
        assert_eq!(first.id, created().timestamp_millis());
        assert_eq!(second.id, first.id + 1);
    }

    #[test]
    fn add_then_delete_restores_previous_lists() {
        let mut store = Store::new();
        let draft = EntryDraft::new(20.0, monday()).with_description("Gift");
        store
            .add_entry(key(), EntryKind::Income, &draft, created())
            .unwrap();
        let before = store.week(key()).cloned().unwrap();

        let later = created() + chrono::Duration::seconds(5);
        let entry = store
            .add_entry(key(), EntryKind::Income, &draft, later)
            .unwrap();
        assert!(store.delete_entry(key(), EntryKind::Income, entry.id).unwrap());
        assert_eq!(store.week(key()), Some(&before));
    }

    #[test]
    fn deleting_unknown_entries_is_a_no_op() {
        let mut store = Store::new();
        assert!(!store.delete_entry(key(), EntryKind::Expense, 42).unwrap());
        store.get_or_create_week(key());
        assert!(!store.delete_entry(key(), EntryKind::Expense, 42).unwrap());
    }

    #[test]
    fn finalized_weeks_reject_mutation() {
        let mut store = Store::new();
        let draft = EntryDraft::new(20.0, monday()).with_description("Gift");
        let entry = store
            .add_entry(key(), EntryKind::Income, &draft, created())
            .unwrap();
        store.finalize_week(key(), None, created()).unwrap();

        assert!(matches!(
            store.add_entry(key(), EntryKind::Income, &draft, created()),
            Err(BudgetError::WeekFinalized(_))
        ));
        assert!(matches!(
            store.delete_entry(key(), EntryKind::Income, entry.id),
            Err(BudgetError::WeekFinalized(_))
        ));
        assert!(matches!(
            store.finalize_week(key(), None, created()),
            Err(BudgetError::AlreadyFinalized(_))
        ));
        assert_eq!(store.report_history().len(), 1);
    }

    #[test]
    fn report_totals_match_their_snapshots() {
        let mut store = Store::new();
        for (amount, kind) in [(10.0, EntryKind::Income), (2.5, EntryKind::Expense), (7.5, EntryKind::Expense)] {
            let draft = EntryDraft::new(amount, monday()).with_description("item");
            store.add_entry(key(), kind, &draft, created()).unwrap();
        }
        let report = store.finalize_week(key(), Some("  ok "), created()).unwrap();
        assert_eq!(report.total_income(), 10.0);
        assert_eq!(report.total_expense(), 10.0);
        assert_eq!(report.expense_snapshot().len(), 2);
        assert_eq!(report.comment(), "ok");
    }

    #[test]
    fn missing_or_corrupt_blobs_yield_an_empty_store() {
        assert!(Store::from_blob(None).is_empty());
        assert!(Store::from_blob(Some("{not json")).is_empty());
        assert!(Store::from_blob(Some("null")).is_empty());
        assert!(Store::from_blob(Some(r#"{"weeks":{"2024-01-03":{}}}"#)).is_empty());
    }

    #[test]
    fn blob_uses_the_canonical_field_names() {
        let mut store = Store::new();
        let draft = EntryDraft::new(100.0, monday()).with_description("Salary");
        store
            .add_entry(key(), EntryKind::Income, &draft, created())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&store.to_blob().unwrap()).unwrap();
        let week = &value["weeks"]["2024-01-01"];
        assert_eq!(week["finalized"], false);
        assert_eq!(week["incomeEntries"][0]["amount"], 100.0);
        assert_eq!(week["incomeEntries"][0]["date"], "2024-01-01");
        assert!(week["expenseEntries"].as_array().unwrap().is_empty());
        assert!(value["reportHistory"].as_array().unwrap().is_empty());
        assert_eq!(value["lastEntryId"], created().timestamp_millis());
    }

    #[test]
    fn reload_continues_ids_after_the_highest_stored_one() {
        let mut store = Store::new();
        let draft = EntryDraft::new(1.0, monday());
        let entry = store
            .add_entry(key(), EntryKind::Income, &draft, created())
            .unwrap();
        let mut reloaded = Store::from_blob(Some(&store.to_blob().unwrap()));
        let next = reloaded
            .add_entry(key(), EntryKind::Income, &draft, created() - chrono::Duration::days(1))
            .unwrap();
        assert_eq!(next.id, entry.id + 1);
    }

    #[test]
    fn ids_of_deleted_entries_are_not_reissued_after_reload() {
        let mut store = Store::new();
        let draft = EntryDraft::new(4.0, monday()).with_description("Snack");
        let deleted = store
            .add_entry(key(), EntryKind::Expense, &draft, created())
            .unwrap();
        assert!(store.delete_entry(key(), EntryKind::Expense, deleted.id).unwrap());

        let mut reloaded = Store::from_blob(Some(&store.to_blob().unwrap()));
        let next = reloaded
            .add_entry(key(), EntryKind::Expense, &draft, created())
            .unwrap();
        assert_ne!(next.id, deleted.id);
        assert_eq!(next.id, deleted.id + 1);
    }

    #[test]
    fn blobs_without_a_counter_fall_back_to_stored_ids() {
        let blob = r#"{"weeks":{"2024-01-01":{"incomeEntries":[
            {"id":90,"amount":1,"description":"a","date":"2024-01-01","createdAt":"2024-01-01T00:00:00Z"}
        ]}},"reportHistory":[]}"#;
        let mut store = Store::from_blob(Some(blob));
        let entry = store
            .add_entry(key(), EntryKind::Income, &EntryDraft::new(1.0, monday()), Utc.timestamp_opt(0, 0).unwrap())
            .unwrap();
        assert_eq!(entry.id, 91);
    }
}
