//! Console configuration: `newsdesk.ron` plus environment overrides.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use desk_logging::{desk_info, LogDestination};
use log::LevelFilter;
use newsdesk_engine::{system_clock, DataRoot, EngineConfig, FetchSettings};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILENAME: &str = "newsdesk.ron";
pub const ENV_DATA_ROOT: &str = "NEWSDESK_DATA_ROOT";
pub const ENV_FINNHUB_KEY: &str = "FINNHUB_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
    Off,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub target: LogTarget,
    pub file: PathBuf,
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            target: LogTarget::File,
            file: PathBuf::from("./newsdesk.log"),
            level: "info".to_string(),
        }
    }
}

impl LogSettings {
    pub fn destination(&self) -> LogDestination {
        match self.target {
            LogTarget::File => LogDestination::File(self.file.clone()),
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both(self.file.clone()),
            LogTarget::Off => LogDestination::Off,
        }
    }

    /// Unknown level names fall back to `Info`.
    pub fn level(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::Info)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Directory or `http(s)://` site root holding `data/`.
    pub data_root: String,
    pub finnhub_api_key: Option<String>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_response_bytes: u64,
    pub log: LogSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            data_root: "docs".to_string(),
            finnhub_api_key: None,
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            max_response_bytes: fetch.max_bytes,
            log: LogSettings::default(),
        }
    }
}

impl AppConfig {
    /// Read an explicit config file, or `newsdesk.ron` in the working
    /// directory when present, or fall back to defaults. Environment
    /// overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(CONFIG_FILENAME).exists() => Self::from_file(Path::new(CONFIG_FILENAME))?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_ron(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_ron(text: &str) -> anyhow::Result<Self> {
        Ok(ron::from_str(text)?)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(root) = lookup(ENV_DATA_ROOT).filter(|v| !v.trim().is_empty()) {
            self.data_root = root;
        }
        if let Some(key) = lookup(ENV_FINNHUB_KEY).filter(|v| !v.trim().is_empty()) {
            self.finnhub_api_key = Some(key);
        }
    }

    pub fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be positive");
        }
        let data_root = DataRoot::parse(&self.data_root)
            .with_context(|| format!("invalid data_root {:?}", self.data_root))?;
        let fetch = FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_response_bytes,
            ..FetchSettings::default()
        };
        desk_info!(
            "Data root {:?}, finnhub key {}",
            data_root,
            if self.finnhub_api_key.is_some() { "set" } else { "not set" }
        );
        Ok(EngineConfig {
            data_root,
            fetch,
            finnhub_api_key: self.finnhub_api_key.clone(),
            clock: system_clock(),
            ..EngineConfig::default()
        })
    }
}
