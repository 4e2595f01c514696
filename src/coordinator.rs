//! Dashboard state as a reducer over discrete intents.
//!
//! `DashboardState::apply` is the only mutation path. It returns the effects
//! the runtime has to execute; their completions come back as intents. Page,
//! chart and search completions carry the sequence number they were issued
//! with and are dropped unless that number is still the latest.

use crate::chart::{self, ChartState, ChartStatus};
use crate::config::DashboardConfig;
use crate::pagination::Pager;
use crate::search::{SearchCommand, SearchSession};
use crate::sort::{sort_assets, SortField, SortSpec};
use crate::types::{Asset, AssetPage, TimeRange, TimeSeries, Theme, Trend};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const LISTING_ERROR_MESSAGE: &str =
    "Failed to fetch cryptocurrency data. Please try again later.";

#[derive(Debug, Clone)]
pub enum Intent {
    PageRequested(u32),
    PageLoaded { seq: u64, page: AssetPage },
    PageFailed { seq: u64, error: String },
    AssetSelected(Asset),
    SortChanged(SortField),
    SearchQueryChanged(String),
    SearchTimerElapsed { generation: u64 },
    SearchResultsReceived { seq: u64, query: String, results: Vec<Asset> },
    SearchDismissed,
    SearchResultSelected(Asset),
    RangeChanged(TimeRange),
    ChartLoaded { seq: u64, series: TimeSeries },
    ThemeToggled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchPage { seq: u64, page: u32, page_size: u32 },
    ArmSearchTimer { generation: u64, delay: Duration },
    CancelSearchTimer,
    Search { seq: u64, query: String, limit: u32 },
    FetchChart { seq: u64, asset_id: String, range: TimeRange },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum LoadStatus {
    Loading,
    Error(String),
    Ready,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardState {
    page: u32,
    total_pages: u32,
    page_size: u32,
    search_limit: u32,
    status: LoadStatus,
    assets: Vec<Asset>,
    selected: Option<Asset>,
    sort: SortSpec,
    range: TimeRange,
    theme: Theme,
    search: SearchSession,
    chart: ChartState,
    #[serde(skip)]
    page_seq: u64,
    #[serde(skip)]
    chart_seq: u64,
}

impl DashboardState {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            page: 1,
            total_pages: config.total_pages.max(1),
            page_size: config.page_size,
            search_limit: config.search_limit,
            status: LoadStatus::Loading,
            assets: Vec::new(),
            selected: None,
            sort: SortSpec::default(),
            range: config.initial_range,
            theme: if config.dark_mode { Theme::Dark } else { Theme::Light },
            search: SearchSession::new(
                Duration::from_millis(config.search_debounce_ms),
                config.min_query_len,
            ),
            chart: ChartState::new(config.initial_range),
            page_seq: 0,
            chart_seq: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            LoadStatus::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Table rows in the current sort order.
    pub fn rows(&self) -> Vec<Asset> {
        sort_assets(&self.assets, self.sort)
    }

    pub fn selected(&self) -> Option<&Asset> {
        self.selected.as_ref()
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn search(&self) -> &SearchSession {
        &self.search
    }

    pub fn chart(&self) -> &ChartState {
        &self.chart
    }

    pub fn pager(&self) -> Pager {
        Pager::new(self.page, self.total_pages)
    }

    pub fn trend(&self) -> Option<Trend> {
        self.selected.as_ref().map(Trend::of)
    }

    pub fn apply(&mut self, intent: Intent) -> Vec<Effect> {
        match intent {
            Intent::PageRequested(page) => self.request_page(page),
            Intent::PageLoaded { seq, page } => self.page_loaded(seq, page),
            Intent::PageFailed { seq, error } => {
                if seq != self.page_seq {
                    debug!("dropping stale page failure #{}: {}", seq, error);
                    return Vec::new();
                }
                warn!("listing page {} failed: {}", self.page, error);
                self.status = LoadStatus::Error(LISTING_ERROR_MESSAGE.to_string());
                self.assets.clear();
                Vec::new()
            }
            Intent::AssetSelected(asset) => self.select(asset),
            Intent::SortChanged(field) => {
                self.sort = self.sort.clicked(field);
                Vec::new()
            }
            Intent::SearchQueryChanged(text) => {
                let command = self.search.query_changed(text);
                vec![self.search_effect(command)]
            }
            Intent::SearchTimerElapsed { generation } => self
                .search
                .timer_elapsed(generation)
                .map(|command| vec![self.search_effect(command)])
                .unwrap_or_default(),
            Intent::SearchResultsReceived { seq, query, results } => {
                self.search.results_received(seq, &query, results);
                Vec::new()
            }
            Intent::SearchDismissed => {
                let command = self.search.reset();
                vec![self.search_effect(command)]
            }
            Intent::SearchResultSelected(asset) => {
                let command = self.search.reset();
                let mut effects = vec![self.search_effect(command)];
                effects.extend(self.select(asset));
                effects
            }
            Intent::RangeChanged(range) => {
                self.range = range;
                self.refresh_chart()
            }
            Intent::ChartLoaded { seq, series } => {
                if seq != self.chart_seq {
                    debug!("dropping stale chart #{}", seq);
                    return Vec::new();
                }
                self.chart.points = chart::build(&series, self.chart.range);
                self.chart.status = ChartStatus::Ready;
                Vec::new()
            }
            Intent::ThemeToggled => {
                self.theme = self.theme.toggled();
                Vec::new()
            }
        }
    }

    fn request_page(&mut self, page: u32) -> Vec<Effect> {
        self.page = self.pager().clamp(page);
        self.status = LoadStatus::Loading;
        self.page_seq += 1;
        vec![Effect::FetchPage {
            seq: self.page_seq,
            page: self.page,
            page_size: self.page_size,
        }]
    }

    fn page_loaded(&mut self, seq: u64, page: AssetPage) -> Vec<Effect> {
        if seq != self.page_seq {
            debug!("dropping stale page {} (#{}, latest #{})", page.page, seq, self.page_seq);
            return Vec::new();
        }

        info!("page {} ready with {} asset(s)", page.page, page.len());
        self.status = LoadStatus::Ready;
        self.assets = page.assets;

        if self.selected.is_none() {
            if let Some(first) = self.assets.first().cloned() {
                return self.select(first);
            }
        }
        Vec::new()
    }

    fn select(&mut self, asset: Asset) -> Vec<Effect> {
        self.selected = Some(asset);
        self.refresh_chart()
    }

    /// Starts a chart fetch when the (asset, range) key differs from the
    /// chart being shown.
    fn refresh_chart(&mut self) -> Vec<Effect> {
        let Some(asset) = &self.selected else {
            return Vec::new();
        };
        if self.chart.is_for(&asset.id, self.range) && self.chart.status != ChartStatus::Idle {
            return Vec::new();
        }

        self.chart_seq += 1;
        self.chart.asset_id = Some(asset.id.clone());
        self.chart.range = self.range;
        self.chart.status = ChartStatus::Loading;
        self.chart.points.clear();
        vec![Effect::FetchChart {
            seq: self.chart_seq,
            asset_id: asset.id.clone(),
            range: self.range,
        }]
    }

    fn search_effect(&self, command: SearchCommand) -> Effect {
        match command {
            SearchCommand::ArmTimer { generation, delay } => Effect::ArmSearchTimer { generation, delay },
            SearchCommand::CancelTimer => Effect::CancelSearchTimer,
            SearchCommand::Dispatch { seq, query } => Effect::Search {
                seq,
                query,
                limit: self.search_limit,
            },
        }
    }
}
