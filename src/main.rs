mod output;

use anyhow::{Context, Result};
use clap::Parser;
use cryptodash::sort::SortField;
use cryptodash::sources::coingecko::CoinGecko;
use cryptodash::types::TimeRange;
use cryptodash::{Dashboard, DashboardConfig, Gateway, Intent};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "cryptodash",
    about = "Headless CoinGecko market dashboard: listing, sorting, search and price charts"
)]
struct Args {
    /// Path to config YAML file (defaults apply when missing)
    #[arg(short, long, default_value = "cryptodash.yaml")]
    config: PathBuf,

    /// Listing page to show
    #[arg(short, long, default_value_t = 1)]
    page: u32,

    /// Chart range: 1d, 7d, 30d, 90d, 1y or max
    #[arg(short, long)]
    range: Option<TimeRange>,

    /// Sort column: rank, price, change_24h, market_cap or volume
    #[arg(short, long)]
    sort: Option<SortField>,

    /// Sort descending instead of ascending
    #[arg(long, requires = "sort")]
    desc: bool,

    /// Search text; the first match becomes the charted asset
    #[arg(long)]
    search: Option<String>,

    /// Output format: "table" (default) or "json"
    #[arg(short, long, default_value = "table")]
    output: String,

    #[arg(long, env = "COINGECKO_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let cfg = if args.config.exists() {
        DashboardConfig::load(&args.config)
            .with_context(|| format!("loading config from {}", args.config.display()))?
    } else {
        info!("{} not found, using default settings", args.config.display());
        DashboardConfig::default()
    };

    let client = reqwest::Client::builder()
        .user_agent(concat!("cryptodash/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(cfg.request_timeout_secs))
        .build()
        .context("building HTTP client")?;

    let source = CoinGecko::new(client, cfg.base_url.clone(), args.api_key.clone());
    let gateway = Gateway::new(Arc::new(source));
    let mut dashboard = Dashboard::new(gateway, &cfg);

    dashboard.dispatch(Intent::PageRequested(args.page));
    if let Some(range) = args.range {
        dashboard.dispatch(Intent::RangeChanged(range));
    }
    dashboard.settle().await;

    if let Some(field) = args.sort {
        if dashboard.state().sort().field != field {
            dashboard.dispatch(Intent::SortChanged(field));
        }
        if args.desc {
            dashboard.dispatch(Intent::SortChanged(field));
        }
    }

    if let Some(query) = args.search.as_deref() {
        dashboard.dispatch(Intent::SearchQueryChanged(query.to_string()));
        dashboard.settle().await;

        let first = dashboard.state().search().visible_results().first().cloned();
        match first {
            Some(asset) => {
                info!("Search '{}' selected {} ({})", query, asset.name, asset.id);
                dashboard.dispatch(Intent::SearchResultSelected(asset));
                dashboard.settle().await;
            }
            None => {
                tracing::warn!("Search '{}' returned no results", query);
                dashboard.dispatch(Intent::SearchDismissed);
            }
        }
    }

    match args.output.as_str() {
        "json" => output::print_json(dashboard.state())?,
        _ => output::print_dashboard(dashboard.state()),
    }

    Ok(())
}
