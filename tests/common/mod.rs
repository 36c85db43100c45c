#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use chrono::{NaiveDate, NaiveDateTime};
use finanz_core::{
    core::WeekManager,
    storage::{JsonFileStorage, MemoryStorage},
    time::FixedClock,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Fresh directory that outlives the calling test.
pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// Local wall-clock time in January 2024, whose first day is a Monday.
pub fn jan(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .expect("valid date")
        .and_hms_opt(hour, minute, 0)
        .expect("valid time")
}

pub fn memory_manager(now: NaiveDateTime) -> (WeekManager, Arc<MemoryStorage>, Arc<FixedClock>) {
    let storage = Arc::new(MemoryStorage::new());
    let clock = Arc::new(FixedClock::at_local(now));
    let manager = WeekManager::open(Box::new(Arc::clone(&storage)), Box::new(Arc::clone(&clock)));
    (manager, storage, clock)
}

/// Manager writing to a data file inside `dir`.
pub fn file_manager(dir: &Path, now: NaiveDateTime) -> (WeekManager, Arc<FixedClock>) {
    let storage = JsonFileStorage::new(dir).expect("create json storage");
    let clock = Arc::new(FixedClock::at_local(now));
    let manager = WeekManager::open(Box::new(storage), Box::new(Arc::clone(&clock)));
    (manager, clock)
}
