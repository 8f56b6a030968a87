//! Single-file JSON backend. Saves go to a temporary sibling file that is renamed over
//! the target, so a failed save never leaves a half-written document behind.

use super::{RecordMap, RecordStorage};
use crate::error::StorageError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_FILE: &str = "students.json";

pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_DATA_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

impl RecordStorage for JsonFileStorage {
    fn load(&self) -> Result<RecordMap, StorageError> {
        if !self.path.exists() {
            tracing::info!(
                target: "roster::storage",
                path = %self.path.display(),
                "No historical data, starting empty"
            );
            return Ok(RecordMap::new());
        }
        let bytes = fs::read(&self.path)?;
        let records: RecordMap = serde_json::from_slice(&bytes)?;
        tracing::info!(
            target: "roster::storage",
            path = %self.path.display(),
            count = records.len(),
            "Loaded {} records from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }

    fn save(&self, records: &RecordMap) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(records)?;
        let tmp = self.temp_path();
        if let Err(e) = write_synced(&tmp, &bytes).and_then(|()| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        tracing::info!(
            target: "roster::storage",
            path = %self.path.display(),
            count = records.len(),
            "Saved {} records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}
