//! Wall-clock access and the Monday–Friday week window.

pub mod week;

use std::sync::{Arc, Mutex};

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Utc};

pub use week::{current_week, WeekKey, WeekWindow, WORK_WEEK};

/// Clock abstracts access to the current timestamp so services remain deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current local time together with its UTC offset.
    fn now(&self) -> DateTime<FixedOffset>;

    /// Local wall-clock time, used for week windows and the report gate.
    fn local_now(&self) -> NaiveDateTime {
        self.now().naive_local()
    }

    /// Current instant in UTC, used for persisted timestamps.
    fn utc_now(&self) -> DateTime<Utc> {
        self.now().with_timezone(&Utc)
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<FixedOffset> {
        (**self).now()
    }
}

/// Real-time clock backed by the system local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock pinned to an instant until explicitly moved.
#[derive(Debug)]
pub struct FixedClock {
    instant: Mutex<DateTime<FixedOffset>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<FixedOffset>) -> Self {
        Self {
            instant: Mutex::new(instant),
        }
    }

    /// Pins the clock to a local wall-clock time at UTC+0.
    pub fn at_local(naive: NaiveDateTime) -> Self {
        Self::new(naive.and_utc().fixed_offset())
    }

    pub fn set(&self, instant: DateTime<FixedOffset>) {
        match self.instant.lock() {
            Ok(mut guard) => *guard = instant,
            Err(poisoned) => *poisoned.into_inner() = instant,
        }
    }

    pub fn set_local(&self, naive: NaiveDateTime) {
        self.set(naive.and_utc().fixed_offset());
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        match self.instant.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
