pub mod json_backend;
pub mod memory;

use std::sync::Arc;

use crate::errors::BudgetError;

pub use json_backend::{JsonFileStorage, DATA_FILE_NAME};
pub use memory::MemoryStorage;

/// Persistence collaborator holding the serialized store as a single blob.
pub trait StoreBackend: Send + Sync {
    /// Returns the stored blob, or `None` when nothing has been saved yet.
    fn load_blob(&self) -> Result<Option<String>, BudgetError>;

    /// Replaces the stored blob as a whole.
    fn save_blob(&self, blob: &str) -> Result<(), BudgetError>;

    /// Human-readable description of where the data lives.
    fn location(&self) -> String;
}

impl<B: StoreBackend + ?Sized> StoreBackend for Arc<B> {
    fn load_blob(&self) -> Result<Option<String>, BudgetError> {
        (**self).load_blob()
    }

    fn save_blob(&self, blob: &str) -> Result<(), BudgetError> {
        (**self).save_blob(blob)
    }

    fn location(&self) -> String {
        (**self).location()
    }
}
