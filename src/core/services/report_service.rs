use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, NaiveTime, Timelike, Utc, Weekday};

use crate::{
    errors::BudgetError,
    ledger::{ReportRecord, Store, WeekRecord},
    time::WeekKey,
};

/// Day on which the weekly report unlocks.
pub const GATE_WEEKDAY: Weekday = Weekday::Fri;
/// Local hour from which the report is available on [`GATE_WEEKDAY`].
pub const GATE_HOUR: u32 = 13;

/// Where a week stands with respect to its end-of-week report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    /// The gate is open and the week can be finalized now.
    Available,
    /// The week already has a report in the history.
    Finalized,
    /// The gate is closed until `opens_at` (local time).
    Locked { opens_at: NaiveDateTime },
}

/// Time remaining until a target instant, for advisory display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: Duration,
}

impl Countdown {
    pub fn is_elapsed(&self) -> bool {
        self.remaining <= Duration::zero()
    }

    pub fn days(&self) -> i64 {
        self.remaining.num_days().max(0)
    }

    pub fn hours(&self) -> i64 {
        (self.remaining.num_hours() % 24).max(0)
    }

    pub fn minutes(&self) -> i64 {
        (self.remaining.num_minutes() % 60).max(0)
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_elapsed() {
            f.write_str("available now")
        } else if self.days() > 0 {
            write!(f, "{}d {}h", self.days(), self.hours())
        } else if self.hours() > 0 {
            write!(f, "{}h {}m", self.hours(), self.minutes())
        } else {
            write!(f, "{}m", self.minutes())
        }
    }
}

/// Report gate and week finalization.
pub struct ReportService;

impl ReportService {
    /// True on Friday from 13:00 local time until midnight.
    pub fn can_finalize(now: NaiveDateTime) -> bool {
        now.weekday() == GATE_WEEKDAY && now.hour() >= GATE_HOUR
    }

    /// Next Friday 13:00 strictly after `now`.
    pub fn next_gate_open_time(now: NaiveDateTime) -> NaiveDateTime {
        let day = now.weekday().num_days_from_sunday() as i64;
        let days_ahead = if day <= 5 { 5 - day } else { 6 };
        let opens = NaiveTime::MIN + Duration::hours(GATE_HOUR as i64);
        let target = (now.date() + Duration::days(days_ahead)).and_time(opens);
        if target > now {
            target
        } else {
            target + Duration::weeks(1)
        }
    }

    pub fn countdown(now: NaiveDateTime, target: NaiveDateTime) -> Countdown {
        Countdown {
            remaining: target - now,
        }
    }

    pub fn status(week: Option<&WeekRecord>, now: NaiveDateTime) -> ReportStatus {
        if week.is_some_and(WeekRecord::is_finalized) {
            ReportStatus::Finalized
        } else if Self::can_finalize(now) {
            ReportStatus::Available
        } else {
            ReportStatus::Locked {
                opens_at: Self::next_gate_open_time(now),
            }
        }
    }

    /// Closes week `key`, appending its report to the history.
    ///
    /// Fails with [`BudgetError::AlreadyFinalized`] before looking at the gate, then with
    /// [`BudgetError::GateClosed`] when `now` is outside Friday afternoon. Neither failure
    /// touches the store.
    pub fn finalize(
        store: &mut Store,
        key: WeekKey,
        comment: Option<&str>,
        now: NaiveDateTime,
        finalized_at: DateTime<Utc>,
    ) -> Result<ReportRecord, BudgetError> {
        if store.week(key).is_some_and(WeekRecord::is_finalized) {
            return Err(BudgetError::AlreadyFinalized(key));
        }
        if !Self::can_finalize(now) {
            return Err(BudgetError::GateClosed {
                opens_at: Self::next_gate_open_time(now),
            });
        }
        store.finalize_week(key, comment, finalized_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{EntryDraft, EntryKind};
    use chrono::{NaiveDate, TimeZone};

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        // January 2024 starts on a Monday.
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn gate_opens_only_on_friday_afternoon() {
        for day in 1..=7 {
            for hour in 0..24 {
                let now = at(day, hour, 30);
                let expected = now.weekday() == Weekday::Fri && hour >= 13;
                assert_eq!(
                    ReportService::can_finalize(now),
                    expected,
                    "{} {hour}:30",
                    now.weekday()
                );
            }
        }
    }

    #[test]
    fn next_gate_open_time_targets_friday_one_pm() {
        let friday_gate = at(5, 13, 0);
        assert_eq!(ReportService::next_gate_open_time(at(1, 9, 0)), friday_gate);
        assert_eq!(ReportService::next_gate_open_time(at(5, 12, 59)), friday_gate);
        // Sunday the 7th looks ahead to Friday the 12th.
        assert_eq!(ReportService::next_gate_open_time(at(7, 10, 0)), at(12, 13, 0));
        // Saturday adds six days.
        assert_eq!(ReportService::next_gate_open_time(at(6, 10, 0)), at(12, 13, 0));
    }

    #[test]
    fn next_gate_open_time_is_always_in_the_future() {
        for day in 1..=7 {
            for hour in 0..24 {
                let now = at(day, hour, 0);
                let next = ReportService::next_gate_open_time(now);
                assert!(next > now);
                assert_eq!(next.weekday(), Weekday::Fri);
                assert!(next - now <= Duration::weeks(1));
            }
        }
    }

    #[test]
    fn countdown_formats_like_the_status_line() {
        let now = at(1, 10, 0);
        assert_eq!(ReportService::countdown(now, at(5, 13, 0)).to_string(), "4d 3h");
        assert_eq!(ReportService::countdown(now, at(1, 12, 15)).to_string(), "2h 15m");
        assert_eq!(ReportService::countdown(now, at(1, 10, 42)).to_string(), "42m");
        assert_eq!(ReportService::countdown(now, now).to_string(), "available now");
    }

    #[test]
    fn status_reflects_flag_then_gate() {
        let mut week = WeekRecord::default();
        assert_eq!(
            ReportService::status(Some(&week), at(2, 10, 0)),
            ReportStatus::Locked {
                opens_at: at(5, 13, 0)
            }
        );
        assert_eq!(
            ReportService::status(None, at(5, 14, 0)),
            ReportStatus::Available
        );
        week.mark_finalized();
        assert_eq!(
            ReportService::status(Some(&week), at(5, 14, 0)),
            ReportStatus::Finalized
        );
    }

    #[test]
    fn finalize_outside_the_gate_leaves_the_store_alone() {
        let key: WeekKey = "2024-01-01".parse().unwrap();
        let mut store = Store::new();
        let draft = EntryDraft::new(9.0, at(1, 0, 0).date()).with_description("Taxi");
        store
            .add_entry(key, EntryKind::Expense, &draft, Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap())
            .unwrap();
        let before = store.clone();

        let result = ReportService::finalize(&mut store, key, None, at(4, 16, 0), Utc::now());
        assert!(matches!(result, Err(BudgetError::GateClosed { .. })));
        assert_eq!(store, before);
    }

    #[test]
    fn already_finalized_wins_over_a_closed_gate() {
        let key: WeekKey = "2024-01-01".parse().unwrap();
        let mut store = Store::new();
        ReportService::finalize(&mut store, key, Some("done"), at(5, 13, 0), Utc::now())
            .expect("gate open");
        let result = ReportService::finalize(&mut store, key, None, at(6, 9, 0), Utc::now());
        assert!(matches!(result, Err(BudgetError::AlreadyFinalized(k)) if k == key));
        assert_eq!(store.report_history().len(), 1);
    }
}
