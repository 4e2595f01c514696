use crate::error::TransportError;
use crate::sources::MarketDataSource;
use crate::types::{Asset, AssetPage, TimeRange, TimeSeries};
use std::sync::Arc;
use tracing::{info, warn};

pub const DEFAULT_SEARCH_LIMIT: u32 = 10;
pub const MAX_SEARCH_LIMIT: u32 = 50;

/// Typed accessor over a [`MarketDataSource`] that enforces argument
/// contracts and normalizes failures.
#[derive(Clone)]
pub struct Gateway {
    source: Arc<dyn MarketDataSource>,
}

impl Gateway {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub async fn list_assets(&self, page: u32, page_size: u32) -> Result<AssetPage, TransportError> {
        if page == 0 || page_size == 0 {
            return Err(TransportError::InvalidRequest(format!(
                "page and page size must be positive (page={}, page_size={})",
                page, page_size
            )));
        }

        info!("Fetching page {} ({} per page) from {}", page, page_size, self.source_name());
        let assets = self.source.markets_page(page, page_size).await?;
        info!("Fetched {} asset(s) for page {}", assets.len(), page);

        Ok(AssetPage {
            page,
            page_size,
            assets,
        })
    }

    pub async fn time_series(&self, asset_id: &str, range: TimeRange) -> Result<TimeSeries, TransportError> {
        if asset_id.trim().is_empty() {
            return Err(TransportError::InvalidRequest(
                "asset id must not be empty".to_string(),
            ));
        }

        let series = self.source.market_chart(asset_id, range).await?;
        info!(
            "Fetched {} price point(s) for {} over {}",
            series.prices.len(),
            asset_id,
            range
        );
        Ok(series)
    }

    /// Two-stage search: resolve ids, then fetch full rows for at most
    /// `limit` of them in one call. Any failure yields no results.
    pub async fn search(&self, query: &str, limit: u32) -> Vec<Asset> {
        match self.try_search(query, limit).await {
            Ok(assets) => assets,
            Err(e) => {
                warn!("search for '{}' failed: {}", query, e);
                Vec::new()
            }
        }
    }

    async fn try_search(&self, query: &str, limit: u32) -> Result<Vec<Asset>, TransportError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(TransportError::InvalidRequest(
                "search query must not be empty".to_string(),
            ));
        }
        if limit == 0 || limit > MAX_SEARCH_LIMIT {
            return Err(TransportError::InvalidRequest(format!(
                "search limit must be within 1..={}, got {}",
                MAX_SEARCH_LIMIT, limit
            )));
        }

        let mut ids = self.source.search_ids(query).await?;
        ids.truncate(limit as usize);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let assets = self.source.markets_by_ids(&ids).await?;
        info!("Search '{}' matched {} asset(s)", query, assets.len());
        Ok(assets)
    }
}
