// src/config.rs

use anyhow::{Context, Result};
use std::path::PathBuf;
use url::Url;

/// UCI Machine Learning Repository, "Automobile" (imports-85).
static UCI_AUTOMOBILE_URL: &str =
    "https://archive.ics.uci.edu/ml/machine-learning-databases/autos/imports-85.data";

pub const DATA_DIR: &str = "data";
pub const UCI_FILE_NAME: &str = "uci_automobile.csv";

/// Where the automobile table comes from and where it lands.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub source_url: Url,
    pub data_dir: PathBuf,
    pub file_name: String,
}

impl FetchConfig {
    pub fn new(source_url: &str, data_dir: impl Into<PathBuf>) -> Result<Self> {
        let source_url = Url::parse(source_url)
            .with_context(|| format!("parsing source URL {}", source_url))?;
        Ok(Self {
            source_url,
            data_dir: data_dir.into(),
            file_name: UCI_FILE_NAME.to_string(),
        })
    }

    pub fn output_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            source_url: Url::parse(UCI_AUTOMOBILE_URL).expect("built-in source URL should parse"),
            data_dir: PathBuf::from(DATA_DIR),
            file_name: UCI_FILE_NAME.to_string(),
        }
    }
}
