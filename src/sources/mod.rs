pub mod coingecko;

use crate::error::TransportError;
use crate::types::{Asset, TimeRange, TimeSeries};
use async_trait::async_trait;

/// Raw read-only calls against a market-data API. Argument checks and
/// degrade-to-empty policies live in [`crate::gateway::Gateway`].
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    fn name(&self) -> &str;

    /// One page of assets ordered by market cap descending.
    async fn markets_page(&self, page: u32, per_page: u32) -> Result<Vec<Asset>, TransportError>;

    /// Full market rows for the given ids, ordered by market cap descending.
    async fn markets_by_ids(&self, ids: &[String]) -> Result<Vec<Asset>, TransportError>;

    async fn market_chart(
        &self,
        asset_id: &str,
        range: TimeRange,
    ) -> Result<TimeSeries, TransportError>;

    /// Asset ids matching free text, in the API's relevance order.
    async fn search_ids(&self, query: &str) -> Result<Vec<String>, TransportError>;
}
