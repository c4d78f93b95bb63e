use std::{fs, path::{Path, PathBuf}};

use serde::Serialize;
use tracing::info;

use crate::error::{ScanError, ScanResult};
use crate::utils::watchlist_line;

/// Writes scan results under one output directory.
pub struct DataManager {
    pub base_path: PathBuf,
}

impl DataManager {
    pub fn new<P: AsRef<Path>>(base_path: P) -> ScanResult<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).map_err(|e| {
            ScanError::Output(format!("Failed to create {}: {}", base_path.display(), e))
        })?;

        Ok(Self { base_path })
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.base_path.join(file_name)
    }

    /// Save symbols as a comma-joined TradingView watch-list.
    pub fn save_watchlist(&self, file_name: &str, symbols: &[String]) -> ScanResult<PathBuf> {
        let file_path = self.path_for(file_name);
        fs::write(&file_path, watchlist_line(symbols))?;

        info!("Saved {} symbols to {}", symbols.len(), file_path.display());
        Ok(file_path)
    }

    pub fn save_json<T: Serialize>(&self, file_name: &str, records: &[T]) -> ScanResult<PathBuf> {
        let file_path = self.path_for(file_name);
        let content = serde_json::to_string_pretty(records)?;
        fs::write(&file_path, content)?;

        info!("Saved {} records to {}", records.len(), file_path.display());
        Ok(file_path)
    }
}
