use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::errors::BudgetError;

/// Days that make up one accounting period.
pub const WORK_WEEK: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

const KEY_FORMAT: &str = "%Y-%m-%d";

/// Identifies a week window by its Monday, rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekKey(NaiveDate);

impl WeekKey {
    /// Builds a key from a date that must be a Monday.
    pub fn from_monday(date: NaiveDate) -> Result<Self, BudgetError> {
        if date.weekday() != Weekday::Mon {
            return Err(BudgetError::InvalidWeekKey(format!(
                "{} is a {}, expected a Monday",
                date.format(KEY_FORMAT),
                date.weekday()
            )));
        }
        Ok(Self(date))
    }

    /// Key of the week that `date` belongs to. Weekends map to the preceding Monday.
    pub fn containing(date: NaiveDate) -> Self {
        let offset = date.weekday().num_days_from_monday() as i64;
        Self(date - Duration::days(offset))
    }

    pub fn monday(self) -> NaiveDate {
        self.0
    }

    pub fn friday(self) -> NaiveDate {
        self.0 + Duration::days(4)
    }

    /// True when `date` is one of the five weekdays of this week.
    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.monday() && date <= self.friday()
    }

    /// Monday through Friday of this week.
    pub fn weekdays(self) -> [NaiveDate; 5] {
        let monday = self.monday();
        [0, 1, 2, 3, 4].map(|offset| monday + Duration::days(offset))
    }

    /// Date of `weekday` within this week, if it is a working day.
    pub fn date_of(self, weekday: Weekday) -> Option<NaiveDate> {
        WORK_WEEK
            .iter()
            .position(|day| *day == weekday)
            .map(|index| self.monday() + Duration::days(index as i64))
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(KEY_FORMAT))
    }
}

impl FromStr for WeekKey {
    type Err = BudgetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(value.trim(), KEY_FORMAT)
            .map_err(|_| BudgetError::InvalidWeekKey(value.to_string()))?;
        Self::from_monday(date)
    }
}

impl TryFrom<String> for WeekKey {
    type Error = BudgetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WeekKey> for String {
    fn from(key: WeekKey) -> Self {
        key.to_string()
    }
}

/// Monday 00:00:00.000 through Friday 23:59:59.999 in local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub key: WeekKey,
}

impl WeekWindow {
    pub fn for_key(key: WeekKey) -> Self {
        let start = key.monday().and_time(NaiveTime::MIN);
        let end = start + Duration::days(5) - Duration::milliseconds(1);
        Self { start, end, key }
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Window for the week `now` falls in. On Saturday and Sunday this is the week just ended.
pub fn current_week(now: NaiveDateTime) -> WeekWindow {
    WeekWindow::for_key(WeekKey::containing(now.date()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn window_spans_monday_midnight_to_friday_last_millisecond() {
        // 2024-01-01 is a Monday.
        for day in 1..=14 {
            let now = at(2024, 1, day, 9, 15);
            let window = current_week(now);
            assert_eq!(
                window.end - window.start,
                Duration::days(4)
                    + Duration::hours(23)
                    + Duration::minutes(59)
                    + Duration::seconds(59)
                    + Duration::milliseconds(999)
            );
            assert_eq!(window.start.weekday(), Weekday::Mon);
            assert_eq!(window.end.weekday(), Weekday::Fri);
        }
    }

    #[test]
    fn sunday_belongs_to_the_week_that_just_ended() {
        let sunday = at(2024, 1, 7, 18, 0);
        let window = current_week(sunday);
        assert_eq!(window.key.to_string(), "2024-01-01");
        assert!(!window.contains(sunday));

        let saturday = at(2024, 1, 6, 10, 0);
        assert_eq!(current_week(saturday).key.to_string(), "2024-01-01");

        let monday = at(2024, 1, 8, 0, 0);
        assert_eq!(current_week(monday).key.to_string(), "2024-01-08");
    }

    #[test]
    fn week_key_crosses_month_and_year_boundaries() {
        let thursday = at(2025, 1, 2, 12, 0);
        assert_eq!(current_week(thursday).key.to_string(), "2024-12-30");
    }

    #[test]
    fn week_key_parsing_requires_a_monday() {
        let key: WeekKey = "2024-01-01".parse().expect("monday parses");
        assert_eq!(key.friday(), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert!(matches!(
            "2024-01-02".parse::<WeekKey>(),
            Err(BudgetError::InvalidWeekKey(_))
        ));
        assert!("not-a-date".parse::<WeekKey>().is_err());
    }

    #[test]
    fn week_key_serializes_as_plain_string() {
        let key: WeekKey = "2024-01-01".parse().unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2024-01-01\"");
        let back: WeekKey = serde_json::from_str("\"2024-01-01\"").unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn weekday_dates_stay_inside_the_week() {
        let key: WeekKey = "2024-01-01".parse().unwrap();
        let days = key.weekdays();
        assert!(days.iter().all(|day| key.contains(*day)));
        assert_eq!(key.date_of(Weekday::Wed), Some(days[2]));
        assert_eq!(key.date_of(Weekday::Sat), None);
        assert!(!key.contains(NaiveDate::from_ymd_opt(2024, 1, 6).unwrap()));
    }
}
