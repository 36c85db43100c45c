use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use crate::errors::BudgetError;

use super::StoreBackend;

/// Keeps the blob in memory. Saves can be made to fail for exercising error paths.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blob: Mutex<Option<String>>,
    fail_saves: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Last saved blob.
    pub fn blob(&self) -> Option<String> {
        match self.blob.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl StoreBackend for MemoryStorage {
    fn load_blob(&self) -> Result<Option<String>, BudgetError> {
        Ok(self.blob())
    }

    fn save_blob(&self, blob: &str) -> Result<(), BudgetError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(BudgetError::Persistence(
                "in-memory storage is rejecting writes".into(),
            ));
        }
        let mut guard = self
            .blob
            .lock()
            .map_err(|_| BudgetError::Persistence("in-memory storage lock poisoned".into()))?;
        *guard = Some(blob.to_string());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".into()
    }
}
