use crate::config::DashboardConfig;
use crate::coordinator::{DashboardState, Effect, Intent};
use crate::gateway::Gateway;
use crate::types::TimeSeries;
use tokio::task::{AbortHandle, JoinSet};
use tracing::{debug, warn};

/// Event loop around [`DashboardState`]: user intents go in through
/// [`Dashboard::dispatch`], effects run as tasks whose completions are fed
/// back one at a time.
pub struct Dashboard {
    state: DashboardState,
    gateway: Gateway,
    tasks: JoinSet<Intent>,
    search_timer: Option<AbortHandle>,
}

impl Dashboard {
    pub fn new(gateway: Gateway, config: &DashboardConfig) -> Self {
        Self {
            state: DashboardState::new(config),
            gateway,
            tasks: JoinSet::new(),
            search_timer: None,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Tasks still outstanding, the search timer included.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Initial load of the first listing page.
    pub fn mount(&mut self) {
        self.dispatch(Intent::PageRequested(1));
    }

    pub fn dispatch(&mut self, intent: Intent) {
        for effect in self.state.apply(intent) {
            self.execute(effect);
        }
    }

    /// Waits for the next task to finish and applies its intent. Returns
    /// `false` once nothing is outstanding.
    pub async fn next_completion(&mut self) -> bool {
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(intent) => {
                    self.dispatch(intent);
                    return true;
                }
                Err(e) if e.is_cancelled() => continue,
                Err(e) => warn!("dashboard task failed: {}", e),
            }
        }
        false
    }

    /// Drives the loop until every outstanding fetch and timer is done.
    pub async fn settle(&mut self) {
        while self.next_completion().await {}
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::FetchPage {
                seq,
                page,
                page_size,
            } => {
                let gateway = self.gateway.clone();
                self.tasks.spawn(async move {
                    match gateway.list_assets(page, page_size).await {
                        Ok(page) => Intent::PageLoaded { seq, page },
                        Err(e) => Intent::PageFailed {
                            seq,
                            error: e.to_string(),
                        },
                    }
                });
            }
            Effect::ArmSearchTimer { generation, delay } => {
                self.cancel_search_timer();
                let handle = self.tasks.spawn(async move {
                    tokio::time::sleep(delay).await;
                    Intent::SearchTimerElapsed { generation }
                });
                self.search_timer = Some(handle);
            }
            Effect::CancelSearchTimer => self.cancel_search_timer(),
            Effect::Search { seq, query, limit } => {
                let gateway = self.gateway.clone();
                self.tasks.spawn(async move {
                    let results = gateway.search(&query, limit).await;
                    Intent::SearchResultsReceived {
                        seq,
                        query,
                        results,
                    }
                });
            }
            Effect::FetchChart {
                seq,
                asset_id,
                range,
            } => {
                let gateway = self.gateway.clone();
                self.tasks.spawn(async move {
                    let series = match gateway.time_series(&asset_id, range).await {
                        Ok(series) => series,
                        Err(e) => {
                            warn!("chart for {} ({}) unavailable: {}", asset_id, range, e);
                            TimeSeries::default()
                        }
                    };
                    Intent::ChartLoaded { seq, series }
                });
            }
        }
    }

    fn cancel_search_timer(&mut self) {
        if let Some(handle) = self.search_timer.take() {
            debug!("cancelling search timer");
            handle.abort();
        }
    }
}
