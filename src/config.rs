use crate::gateway::{DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT};
use crate::sources::coingecko::DEFAULT_BASE_URL;
use crate::types::TimeRange;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

const MAX_PAGE_SIZE: u32 = 250;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub base_url: String,
    pub page_size: u32,
    /// Estimated number of listing pages; the API does not report a total.
    pub total_pages: u32,
    pub search_limit: u32,
    pub search_debounce_ms: u64,
    pub min_query_len: usize,
    pub initial_range: TimeRange,
    pub dark_mode: bool,
    pub request_timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: 50,
            total_pages: 10,
            search_limit: DEFAULT_SEARCH_LIMIT,
            search_debounce_ms: 500,
            min_query_len: 2,
            initial_range: TimeRange::Week,
            dark_mode: false,
            request_timeout_secs: 30,
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::from_yaml(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: DashboardConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            anyhow::bail!("base_url '{}' must be an http(s) URL", self.base_url);
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            anyhow::bail!(
                "page_size must be within 1..={}, got {}",
                MAX_PAGE_SIZE,
                self.page_size
            );
        }
        if self.total_pages == 0 {
            anyhow::bail!("total_pages must be at least 1");
        }
        if self.search_limit == 0 || self.search_limit > MAX_SEARCH_LIMIT {
            anyhow::bail!(
                "search_limit must be within 1..={}, got {}",
                MAX_SEARCH_LIMIT,
                self.search_limit
            );
        }
        if self.min_query_len == 0 {
            anyhow::bail!("min_query_len must be at least 1");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be at least 1");
        }
        Ok(())
    }
}
