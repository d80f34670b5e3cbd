//! Storage Config

use std::path::PathBuf;

use clap::Args;

/// Local store settings.
#[derive(Debug, Clone, Args)]
pub struct StorageConfig {
    /// JSON file holding the local store
    #[arg(long, env = "BARISTA_DATA_FILE", default_value = "barista-store.json")]
    pub data_file: PathBuf,
}
