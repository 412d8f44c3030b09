//! Survey storage configuration

use serde::Deserialize;
use std::path::PathBuf;

/// Where survey data lives
///
/// With no `data_dir` surveys are kept in memory for the life of the process.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Directory for YAML survey files
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn is_persistent(&self) -> bool {
        self.data_dir.is_some()
    }
}
