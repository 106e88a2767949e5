use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::model::{FilterCriteria, Strategy, TopicId, YearRange, YEAR_MAX, YEAR_MIN};
use crate::data::scale::ScaleMode;

/// Line colours for topics 0..=5 (matplotlib "tab10").
pub const DEFAULT_TOPIC_COLORS: [&str; 6] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b",
];

pub const DEFAULT_DATA_PATH: &str = "master_database_detailed.csv";

// ---------------------------------------------------------------------------
// Dashboard configuration (TOML)
// ---------------------------------------------------------------------------

/// Startup settings. Every key is optional in the file.
///
/// ```toml
/// data_path = "master_database_detailed.csv"
/// default_topics = [0, 2]
/// default_strategies = ["TS", "KW"]
/// year_start = 1990
/// year_end = 2024
/// scale = "log"
/// topic_colors = ["#1f77b4", "#ff7f0e"]
/// top_n = 8
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub default_topics: Vec<TopicId>,
    pub default_strategies: Vec<Strategy>,
    pub year_start: u16,
    pub year_end: u16,
    pub scale: ScaleMode,
    /// `#rrggbb` per topic id; missing entries use the default palette.
    pub topic_colors: Vec<String>,
    /// Rows shown in the top-combinations table.
    pub top_n: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            default_topics: TopicId::new(0).into_iter().collect(),
            default_strategies: vec![Strategy::TS],
            year_start: YEAR_MIN,
            year_end: YEAR_MAX,
            scale: ScaleMode::Linear,
            topic_colors: DEFAULT_TOPIC_COLORS.iter().map(|c| c.to_string()).collect(),
            top_n: 8,
        }
    }
}

impl DashboardConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: DashboardConfig = toml::from_str(text).context("parsing config TOML")?;
        config
            .year_range()
            .context("config year_start/year_end")?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_toml_str(&text)
            .with_context(|| format!("in config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Defaults when `path` is `None`, otherwise the parsed file.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn year_range(&self) -> Result<YearRange, crate::data::error::InvalidYearRange> {
        YearRange::new(self.year_start, self.year_end)
    }

    /// Selection the dashboard opens with.
    pub fn initial_criteria(&self) -> FilterCriteria {
        FilterCriteria::new(
            self.default_topics.iter().copied(),
            self.default_strategies.iter().copied(),
            self.year_range().unwrap_or(YearRange::FULL),
        )
    }

    /// Configured colour string for `topic`, if any.
    pub fn topic_color(&self, topic: TopicId) -> Option<&str> {
        self.topic_colors
            .get(usize::from(topic.get()))
            .map(String::as_str)
    }
}
