use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::errors::BudgetError;

use super::StoreBackend;

pub const DATA_FILE_NAME: &str = "finanzapp-data.json";
const TMP_SUFFIX: &str = "tmp";
const BACKUP_SUFFIX: &str = "bak";

/// Stores the blob in one JSON file, replaced atomically on every save.
///
/// The file being replaced is first copied to `<file>.bak`.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Storage for [`DATA_FILE_NAME`] inside `data_dir`, creating the directory if needed.
    pub fn new(data_dir: &Path) -> Result<Self, BudgetError> {
        fs::create_dir_all(data_dir)?;
        Ok(Self {
            path: data_dir.join(DATA_FILE_NAME),
        })
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        with_suffix(&self.path, BACKUP_SUFFIX)
    }

    fn backup_existing_file(&self) -> Result<(), BudgetError> {
        if self.path.exists() {
            fs::copy(&self.path, self.backup_path())?;
        }
        Ok(())
    }
}

impl StoreBackend for JsonFileStorage {
    fn load_blob(&self) -> Result<Option<String>, BudgetError> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&self.path)?))
    }

    fn save_blob(&self, blob: &str) -> Result<(), BudgetError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.backup_existing_file()?;
        let tmp = with_suffix(&self.path, TMP_SUFFIX);
        write_atomic(&tmp, blob)?;
        fs::rename(&tmp, &self.path).map_err(|err| {
            BudgetError::Persistence(format!(
                "unable to replace `{}`: {err}",
                self.path.display()
            ))
        })?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut target = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, suffix),
        None => suffix.to_string(),
    };
    target.set_extension(ext);
    target
}

fn write_atomic(path: &Path, data: &str) -> Result<(), BudgetError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}
