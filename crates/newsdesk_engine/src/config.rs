use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::data::DataRoot;
use crate::fetch::FetchSettings;

/// Source of "now" for date-sensitive commands.
pub type Clock = Arc<dyn Fn() -> DateTime<Local> + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Local::now)
}

#[derive(Clone)]
pub struct EngineConfig {
    pub data_root: DataRoot,
    pub fetch: FetchSettings,
    /// Without a key the Finnhub stage is skipped.
    pub finnhub_api_key: Option<String>,
    pub finnhub_base: String,
    pub yahoo_hosts: Vec<String>,
    pub clock: Clock,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_root: DataRoot::Dir(".".into()),
            fetch: FetchSettings::default(),
            finnhub_api_key: None,
            finnhub_base: "https://finnhub.io".to_string(),
            yahoo_hosts: vec![
                "https://query1.finance.yahoo.com".to_string(),
                "https://query2.finance.yahoo.com".to_string(),
            ],
            clock: system_clock(),
        }
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("data_root", &self.data_root)
            .field("fetch", &self.fetch)
            .field("finnhub_api_key", &self.finnhub_api_key.as_ref().map(|_| "<set>"))
            .field("finnhub_base", &self.finnhub_base)
            .field("yahoo_hosts", &self.yahoo_hosts)
            .finish_non_exhaustive()
    }
}
