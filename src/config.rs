//! Configuration for the `wallet` binary.
//!
//! Settings come from an optional JSON file. Every field has a default, so a
//! missing file or a partial one is valid. Command-line flags take precedence
//! over the file.

use crate::error::Result;
use clap::ValueEnum;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const DEFAULT_DATA_DIR: &str = "wallet-data";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Directory holding the `*.dump` files.
    pub data_dir: PathBuf,
    /// Worker count for aggregate queries when none is given on the command line.
    pub workers: usize,
    /// Output format for payment listings.
    pub format: OutputFormat,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            workers: 0,
            format: OutputFormat::Csv,
        }
    }
}

impl WalletConfig {
    /// Loads the config file at `path`, or the defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}
