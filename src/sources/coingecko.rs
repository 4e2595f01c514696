use super::MarketDataSource;
use crate::error::TransportError;
use crate::types::{Asset, TimeRange, TimeSeries};
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// The single base currency every price is quoted in.
const VS_CURRENCY: &str = "usd";

pub struct CoinGecko {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    coins: Vec<SearchCoin>,
}

#[derive(Debug, Deserialize)]
struct SearchCoin {
    id: String,
}

impl CoinGecko {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// Base URL with `segments` appended, each one percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            TransportError::InvalidRequest(format!("bad base url '{}': {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                TransportError::InvalidRequest(format!("base url '{}' cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T, TransportError> {
        let url = self.endpoint(segments)?;
        let path = url.path().to_string();
        let mut request = self
            .client
            .get(url)
            .query(query)
            .header("accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("x-cg-demo-api-key", key);
        }

        let resp = request.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                source_name: self.name().to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| TransportError::Decode {
            source_name: self.name().to_string(),
            reason: format!("{} ({})", e, path),
        })
    }
}

#[async_trait]
impl MarketDataSource for CoinGecko {
    fn name(&self) -> &str {
        "coingecko"
    }

    async fn markets_page(&self, page: u32, per_page: u32) -> Result<Vec<Asset>, TransportError> {
        let page = page.to_string();
        let per_page = per_page.to_string();
        self.get_json(
            &["coins", "markets"],
            &[
                ("vs_currency", VS_CURRENCY),
                ("order", "market_cap_desc"),
                ("per_page", per_page.as_str()),
                ("page", page.as_str()),
                ("sparkline", "false"),
                ("price_change_percentage", "24h"),
            ],
        )
        .await
    }

    async fn markets_by_ids(&self, ids: &[String]) -> Result<Vec<Asset>, TransportError> {
        let ids = ids.join(",");
        self.get_json(
            &["coins", "markets"],
            &[
                ("vs_currency", VS_CURRENCY),
                ("ids", ids.as_str()),
                ("order", "market_cap_desc"),
                ("sparkline", "false"),
                ("price_change_percentage", "24h"),
            ],
        )
        .await
    }

    async fn market_chart(
        &self,
        asset_id: &str,
        range: TimeRange,
    ) -> Result<TimeSeries, TransportError> {
        self.get_json(
            &["coins", asset_id, "market_chart"],
            &[("vs_currency", VS_CURRENCY), ("days", range.days())],
        )
        .await
    }

    async fn search_ids(&self, query: &str) -> Result<Vec<String>, TransportError> {
        let resp: SearchResponse = self.get_json(&["search"], &[("query", query)]).await?;
        Ok(resp.coins.into_iter().map(|c| c.id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answers exactly one request with `status_line` and `body`, then hands
    /// back the raw request head it received.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8(head).unwrap()
        });
        (base_url, handle)
    }

    fn local_client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    #[tokio::test]
    async fn markets_page_sends_listing_query_and_demo_key() {
        let (base_url, server) = serve_once("200 OK", "[]").await;
        let source = CoinGecko::new(local_client(), base_url, Some("k".to_string()));

        let assets = source.markets_page(2, 50).await.unwrap();
        assert!(assets.is_empty());

        let head = server.await.unwrap();
        let request_line = head.lines().next().unwrap();
        assert_eq!(
            request_line,
            "GET /coins/markets?vs_currency=usd&order=market_cap_desc&per_page=50&page=2&sparkline=false&price_change_percentage=24h HTTP/1.1"
        );
        assert!(head.to_ascii_lowercase().contains("\r\nx-cg-demo-api-key: k\r\n"), "{}", head);
    }

    #[tokio::test]
    async fn omits_demo_key_header_without_a_key() {
        let (base_url, server) = serve_once("200 OK", r#"{"coins":[]}"#).await;
        let source = CoinGecko::new(local_client(), base_url, None);

        assert!(source.search_ids("bit").await.unwrap().is_empty());

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /search?query=bit HTTP/1.1\r\n"), "{}", head);
        assert!(!head.to_ascii_lowercase().contains("x-cg-demo-api-key"));
    }

    #[tokio::test]
    async fn rate_limit_maps_to_status_error_with_body() {
        let (base_url, server) = serve_once("429 Too Many Requests", "slow down").await;
        let source = CoinGecko::new(local_client(), base_url, None);

        let err = source.markets_page(1, 50).await.unwrap_err();
        match err {
            TransportError::Status { status, body, .. } => {
                assert_eq!(status, 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("expected status error, got {:?}", other),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn malformed_body_maps_to_decode_error() {
        let (base_url, server) = serve_once("200 OK", "{not json").await;
        let source = CoinGecko::new(local_client(), base_url, None);

        let err = source.market_chart("bitcoin", TimeRange::Week).await.unwrap_err();
        assert!(matches!(err, TransportError::Decode { .. }), "{:?}", err);

        let head = server.await.unwrap();
        assert!(
            head.starts_with("GET /coins/bitcoin/market_chart?vs_currency=usd&days=7 HTTP/1.1\r\n"),
            "{}",
            head
        );
    }

    #[tokio::test]
    async fn asset_id_is_encoded_as_one_path_segment() {
        let (base_url, server) = serve_once("200 OK", r#"{"prices":[]}"#).await;
        let source = CoinGecko::new(local_client(), base_url, None);

        let series = source.market_chart("odd?id#x", TimeRange::Max).await.unwrap();
        assert!(series.is_empty());

        let head = server.await.unwrap();
        assert!(
            head.starts_with("GET /coins/odd%3Fid%23x/market_chart?vs_currency=usd&days=max HTTP/1.1\r\n"),
            "{}",
            head
        );
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let source = CoinGecko::new(reqwest::Client::new(), "https://example.test/api/v3/", None);
        let url = source.endpoint(&["coins", "markets"]).unwrap();
        assert_eq!(url.as_str(), "https://example.test/api/v3/coins/markets");
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let source = CoinGecko::new(reqwest::Client::new(), "https://example.test/api/v3/", None);
        assert_eq!(source.base_url, "https://example.test/api/v3");
    }

    #[test]
    fn decodes_market_chart_payload() {
        let body = r#"{
            "prices": [[1711843200000, 69702.3], [1711929600000, 71246.9]],
            "market_caps": [[1711843200000, 1370247487960.1]],
            "total_volumes": []
        }"#;
        let series: TimeSeries = serde_json::from_str(body).unwrap();
        assert_eq!(series.prices.len(), 2);
        assert_eq!(series.prices[1], (1711929600000, 71246.9));
        assert!(series.total_volumes.is_empty());
    }

    #[test]
    fn decodes_search_ids_in_order() {
        let body = r#"{"coins":[{"id":"bitcoin","name":"Bitcoin"},{"id":"bitcoin-cash","name":"Bitcoin Cash"}],"exchanges":[]}"#;
        let resp: SearchResponse = serde_json::from_str(body).unwrap();
        let ids: Vec<_> = resp.coins.into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["bitcoin", "bitcoin-cash"]);
    }
}
