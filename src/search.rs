//! Search-as-you-type state machine.
//!
//! Keystrokes arm a debounce timer identified by a generation number; only
//! the current generation may dispatch. Each dispatch gets a sequence number
//! and a response is applied only when it answers the latest dispatch and
//! still matches the query text on screen.

use crate::types::Asset;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    Idle,
    Pending,
    InFlight,
    Settled,
}

/// What the caller must do after feeding the session an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCommand {
    ArmTimer { generation: u64, delay: Duration },
    CancelTimer,
    Dispatch { seq: u64, query: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dispatched {
    pub seq: u64,
    pub query: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchSession {
    query: String,
    phase: SearchPhase,
    results: Vec<Asset>,
    visible: bool,
    last_dispatched: Option<Dispatched>,
    #[serde(skip)]
    generation: u64,
    #[serde(skip)]
    next_seq: u64,
    #[serde(skip)]
    debounce: Duration,
    #[serde(skip)]
    min_query_len: usize,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE, DEFAULT_MIN_QUERY_LEN)
    }
}

impl SearchSession {
    pub fn new(debounce: Duration, min_query_len: usize) -> Self {
        Self {
            query: String::new(),
            phase: SearchPhase::Idle,
            results: Vec::new(),
            visible: false,
            last_dispatched: None,
            generation: 0,
            next_seq: 0,
            debounce,
            min_query_len: min_query_len.max(1),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn results(&self) -> &[Asset] {
        &self.results
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_in_flight(&self) -> bool {
        self.phase == SearchPhase::InFlight
    }

    pub fn last_dispatched(&self) -> Option<&Dispatched> {
        self.last_dispatched.as_ref()
    }

    /// Results a renderer should show right now.
    pub fn visible_results(&self) -> &[Asset] {
        if self.visible {
            &self.results
        } else {
            &[]
        }
    }

    pub fn query_changed(&mut self, text: impl Into<String>) -> SearchCommand {
        self.query = text.into();
        self.generation += 1;

        if self.query.chars().count() < self.min_query_len {
            self.phase = SearchPhase::Idle;
            self.results.clear();
            self.visible = false;
            return SearchCommand::CancelTimer;
        }

        self.phase = SearchPhase::Pending;
        SearchCommand::ArmTimer {
            generation: self.generation,
            delay: self.debounce,
        }
    }

    /// Debounce expiry. Superseded generations and non-pending sessions
    /// produce nothing.
    pub fn timer_elapsed(&mut self, generation: u64) -> Option<SearchCommand> {
        if generation != self.generation || self.phase != SearchPhase::Pending {
            debug!("ignoring stale search timer (generation {})", generation);
            return None;
        }

        self.next_seq += 1;
        let dispatched = Dispatched {
            seq: self.next_seq,
            query: self.query.clone(),
        };
        self.last_dispatched = Some(dispatched.clone());
        self.phase = SearchPhase::InFlight;
        Some(SearchCommand::Dispatch {
            seq: dispatched.seq,
            query: dispatched.query,
        })
    }

    /// Returns whether the response was applied.
    pub fn results_received(&mut self, seq: u64, query: &str, results: Vec<Asset>) -> bool {
        let is_latest = self
            .last_dispatched
            .as_ref()
            .is_some_and(|d| d.seq == seq && d.query == query);
        if !is_latest || query != self.query {
            debug!("dropping stale search response #{} for '{}'", seq, query);
            return false;
        }

        self.visible = !results.is_empty();
        self.results = results;
        if self.phase == SearchPhase::InFlight {
            self.phase = SearchPhase::Settled;
        }
        true
    }

    /// Click outside the search surface or pick a result: back to Idle with
    /// nothing shown, whatever is still in flight.
    pub fn reset(&mut self) -> SearchCommand {
        self.query.clear();
        self.results.clear();
        self.visible = false;
        self.phase = SearchPhase::Idle;
        self.last_dispatched = None;
        self.generation += 1;
        SearchCommand::CancelTimer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(id: &str) -> Asset {
        Asset {
            id: id.to_string(),
            name: id.to_string(),
            symbol: id.to_string(),
            image: String::new(),
            current_price: 1.0,
            market_cap: None,
            market_cap_rank: None,
            total_volume: 0.0,
            price_change_percentage_24h: None,
        }
    }

    fn dispatch(session: &mut SearchSession, text: &str) -> (u64, String) {
        let SearchCommand::ArmTimer { generation, .. } = session.query_changed(text) else {
            panic!("expected a timer for '{}'", text);
        };
        match session.timer_elapsed(generation) {
            Some(SearchCommand::Dispatch { seq, query }) => (seq, query),
            other => panic!("expected a dispatch, got {:?}", other),
        }
    }

    #[test]
    fn short_queries_never_dispatch() {
        let mut session = SearchSession::default();
        for text in ["", "b", "é", " "] {
            assert_eq!(session.query_changed(text), SearchCommand::CancelTimer);
            assert_eq!(session.phase(), SearchPhase::Idle);
            assert!(session.results().is_empty());
            assert!(session.timer_elapsed(session.generation).is_none());
        }
        assert!(session.last_dispatched().is_none());
    }

    #[test]
    fn shrinking_below_minimum_clears_visible_results() {
        let mut session = SearchSession::default();
        let (seq, query) = dispatch(&mut session, "eth");
        assert!(session.results_received(seq, &query, vec![coin("ethereum")]));
        assert!(session.is_visible());

        session.query_changed("e");
        assert!(!session.is_visible());
        assert!(session.visible_results().is_empty());
        assert_eq!(session.phase(), SearchPhase::Idle);
    }

    #[test]
    fn rearming_supersedes_earlier_timer() {
        let mut session = SearchSession::default();
        let SearchCommand::ArmTimer { generation: first, delay } = session.query_changed("bi") else {
            panic!("expected timer");
        };
        assert_eq!(delay, Duration::from_millis(500));
        let SearchCommand::ArmTimer { generation: second, .. } = session.query_changed("bit") else {
            panic!("expected timer");
        };

        assert!(session.timer_elapsed(first).is_none());
        assert_eq!(
            session.timer_elapsed(second),
            Some(SearchCommand::Dispatch {
                seq: 1,
                query: "bit".to_string()
            })
        );
        assert!(session.is_in_flight());
    }

    #[test]
    fn older_response_arriving_last_is_discarded() {
        let mut session = SearchSession::default();
        let (bit_seq, bit_query) = dispatch(&mut session, "bit");
        let (bitc_seq, bitc_query) = dispatch(&mut session, "bitc");

        assert!(session.results_received(bitc_seq, &bitc_query, vec![coin("bitcoin")]));
        assert!(!session.results_received(bit_seq, &bit_query, vec![coin("bitget-token"), coin("bittensor")]));

        assert_eq!(session.phase(), SearchPhase::Settled);
        assert_eq!(session.visible_results().len(), 1);
        assert_eq!(session.visible_results()[0].id, "bitcoin");
    }

    #[test]
    fn response_for_outdated_text_is_discarded_while_retyping() {
        let mut session = SearchSession::default();
        let (seq, query) = dispatch(&mut session, "sol");
        session.query_changed("sola");

        assert!(!session.results_received(seq, &query, vec![coin("solana")]));
        assert_eq!(session.phase(), SearchPhase::Pending);
        assert!(session.results().is_empty());
    }

    #[test]
    fn empty_response_settles_hidden() {
        let mut session = SearchSession::default();
        let (seq, query) = dispatch(&mut session, "zzzz");
        assert!(session.results_received(seq, &query, Vec::new()));
        assert_eq!(session.phase(), SearchPhase::Settled);
        assert!(!session.is_visible());
    }

    #[test]
    fn reset_discards_in_flight_response() {
        let mut session = SearchSession::default();
        let (seq, query) = dispatch(&mut session, "doge");
        assert_eq!(session.reset(), SearchCommand::CancelTimer);

        assert_eq!(session.query(), "");
        assert_eq!(session.phase(), SearchPhase::Idle);
        assert!(!session.results_received(seq, &query, vec![coin("dogecoin")]));
        assert!(session.results().is_empty());
    }
}
