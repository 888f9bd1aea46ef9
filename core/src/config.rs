use crate::{
    filter::FilterMode,
    types::{DEFAULT_PRODUCTS, DEFAULT_REGIONS},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "hub_config.json";
pub const RECORD_FILE_NAME: &str = "clients.csv";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Master seed for every RNG stream.
    pub seed: u64,
    /// Records to synthesize when no usable record file exists.
    pub record_count: usize,
    /// Relative paths resolve against the data directory.
    pub data_file: PathBuf,
    pub export_dir: PathBuf,
    pub regions: Vec<String>,
    pub products: Vec<String>,
    pub forecast_limit: usize,
    pub filter_mode: FilterMode,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            record_count: 100,
            data_file: PathBuf::from(RECORD_FILE_NAME),
            export_dir: PathBuf::from("."),
            regions: DEFAULT_REGIONS.iter().map(|r| r.to_string()).collect(),
            products: DEFAULT_PRODUCTS.iter().map(|p| p.to_string()).collect(),
            forecast_limit: 10,
            filter_mode: FilterMode::Exclusive,
        }
    }
}

impl HubConfig {
    /// Load from `<data_dir>/hub_config.json`, falling back to defaults
    /// when the file is absent.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = Path::new(data_dir).join(CONFIG_FILE_NAME);
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
            serde_json::from_str::<HubConfig>(&content)
                .map_err(|e| anyhow::anyhow!("Cannot parse {}: {e}", path.display()))?
        } else {
            log::info!("no {CONFIG_FILE_NAME} in {data_dir}, using defaults");
            Self::default()
        };
        if config.data_file.is_relative() {
            config.data_file = Path::new(data_dir).join(&config.data_file);
        }
        Ok(config)
    }

    /// Config with hardcoded defaults rooted in a scratch directory,
    /// for use in tests.
    pub fn default_test(dir: &Path) -> Self {
        Self {
            data_file: dir.join(RECORD_FILE_NAME),
            export_dir: dir.to_path_buf(),
            ..Self::default()
        }
    }
}
