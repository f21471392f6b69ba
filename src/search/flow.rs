//! Search flow state machine.
//!
//! One explicit state value (Idle / Searching / Error) instead of scattered
//! booleans. Each accepted submission gets a strictly increasing generation
//! id; a completion is rendered only when its generation is still the most
//! recently submitted one, which gives last-submission-wins semantics no
//! matter in which order responses arrive.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

use crate::remote::RemoteError;
use crate::search::types::{SearchItem, SearchResponse};

/// How long a validation error stays on screen before auto-clearing.
pub const ERROR_CLEAR_DELAY: Duration = Duration::from_millis(2500);

/// Submission validation errors, surfaced inline under the search field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// Empty or all-whitespace query.
    #[error("Fill the search field")]
    EmptyQuery,
    /// Submission attempted while offline.
    #[error("Device is offline")]
    Offline,
}

/// State of the search flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchState {
    /// Nothing in progress.
    Idle,
    /// A search was dispatched and its completion is awaited.
    Searching {
        /// Generation id of the awaited search.
        generation: u64,
    },
    /// A validation error is showing; auto-clears after `ERROR_CLEAR_DELAY`.
    Error {
        /// User-visible message.
        message: String,
        /// When the error was raised.
        since: Instant,
    },
}

/// What the UI should do with an accepted completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Render these items in the order received.
    Results(Vec<SearchItem>),
    /// Render the empty-state view.
    Empty,
    /// Show a generic connectivity notice and return to idle.
    Failed(String),
}

/// Search flow controller.
///
/// All access happens on the UI thread; completions are marshalled back
/// before `accept` is called, so no locking is needed.
#[derive(Debug)]
pub struct SearchFlow {
    /// Current display state.
    state: SearchState,
    /// Next generation id to hand out.
    next_generation: u64,
    /// Most recently submitted generation, still eligible to render.
    /// Survives a later rejected submission; cleared by cancel and accept.
    latest: Option<u64>,
    /// Generations dispatched but not yet completed.
    in_flight: HashSet<u64>,
}

impl SearchFlow {
    /// Creates an idle search flow.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SearchState::Idle,
            next_generation: 0,
            latest: None,
            in_flight: HashSet::new(),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Returns true while a completion is awaited.
    #[must_use]
    pub fn is_searching(&self) -> bool {
        matches!(self.state, SearchState::Searching { .. })
    }

    /// Returns the inline error message, if one is showing.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            SearchState::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Validates and registers a submission.
    ///
    /// On success returns the generation id to tag the outbound call with.
    /// On failure the flow moves to the Error state and no call must be made.
    pub fn submit(&mut self, query: &str, online: bool) -> Result<u64, SearchError> {
        if query.trim().is_empty() {
            return Err(self.reject(SearchError::EmptyQuery));
        }
        if !online {
            return Err(self.reject(SearchError::Offline));
        }

        let generation = self.next_generation;
        self.next_generation += 1;
        self.in_flight.insert(generation);
        self.latest = Some(generation);
        self.state = SearchState::Searching { generation };

        info!("[SEARCH] Submitted generation {}", generation);
        Ok(generation)
    }

    /// Cancels the search in progress.
    ///
    /// Advisory only: the outbound call keeps running and its result is
    /// discarded at acceptance time.
    pub fn cancel(&mut self) {
        if let Some(generation) = self.latest.take() {
            info!("[SEARCH] Cancelled generation {}", generation);
        }
        if matches!(self.state, SearchState::Searching { .. }) {
            self.state = SearchState::Idle;
        }
    }

    /// Accepts a completion for a generation.
    ///
    /// Returns `None` when the result is stale (cancelled, or superseded by
    /// a newer submission); stale results are discarded silently. A later
    /// rejected submission does not supersede: the most recent accepted
    /// generation still renders when its response arrives.
    pub fn accept(
        &mut self,
        generation: u64,
        outcome: Result<SearchResponse, RemoteError>,
    ) -> Option<SearchOutcome> {
        self.in_flight.remove(&generation);

        if self.latest != Some(generation) {
            debug!("[SEARCH] Discarding stale result (generation {})", generation);
            return None;
        }

        self.latest = None;
        if matches!(self.state, SearchState::Searching { .. }) {
            self.state = SearchState::Idle;
        }

        match outcome {
            Ok(page) if page.is_empty() => {
                info!("[SEARCH] Generation {} returned no results", generation);
                Some(SearchOutcome::Empty)
            }
            Ok(page) => {
                info!(
                    "[SEARCH] Generation {} returned {} item(s)",
                    generation,
                    page.items.len()
                );
                Some(SearchOutcome::Results(page.items))
            }
            Err(e) => {
                info!("[SEARCH] Generation {} failed: {}", generation, e);
                Some(SearchOutcome::Failed(e.to_string()))
            }
        }
    }

    /// Clears the inline error immediately (e.g. when connectivity returns).
    pub fn clear_error(&mut self) {
        if matches!(self.state, SearchState::Error { .. }) {
            self.state = SearchState::Idle;
        }
    }

    /// Clears an expired inline error. Returns true if the error cleared.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let SearchState::Error { since, .. } = self.state {
            if now.duration_since(since) >= ERROR_CLEAR_DELAY {
                self.state = SearchState::Idle;
                return true;
            }
        }
        false
    }

    /// Number of dispatched-but-uncompleted searches.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Moves to the Error state and returns the error for propagation.
    fn reject(&mut self, error: SearchError) -> SearchError {
        debug!("[SEARCH] Rejected submission: {}", error);
        self.state = SearchState::Error {
            message: error.to_string(),
            since: Instant::now(),
        };
        error
    }
}

impl Default for SearchFlow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::types::{PageInfo, Snippet};

    fn page(titles: &[&str]) -> SearchResponse {
        SearchResponse {
            page_info: PageInfo {
                total_results: titles.len() as u64,
                results_per_page: titles.len() as u64,
            },
            items: titles
                .iter()
                .map(|t| SearchItem {
                    snippet: Snippet {
                        title: (*t).to_string(),
                        ..Snippet::default()
                    },
                    ..SearchItem::default()
                })
                .collect(),
        }
    }

    #[test]
    fn test_blank_query_rejected() {
        let mut flow = SearchFlow::new();

        assert_eq!(flow.submit("", true), Err(SearchError::EmptyQuery));
        assert_eq!(flow.submit("   \t ", true), Err(SearchError::EmptyQuery));
        assert_eq!(flow.in_flight_count(), 0);
        assert!(flow.error_message().is_some());
    }

    #[test]
    fn test_offline_rejected() {
        let mut flow = SearchFlow::new();

        assert_eq!(flow.submit("lofi", false), Err(SearchError::Offline));
        assert_eq!(flow.in_flight_count(), 0);
        assert_eq!(flow.error_message(), Some("Device is offline"));
    }

    #[test]
    fn test_generations_strictly_increase() {
        let mut flow = SearchFlow::new();

        let g1 = flow.submit("a", true).expect("submit");
        let g2 = flow.submit("b", true).expect("submit");
        let g3 = flow.submit("c", true).expect("submit");
        assert!(g1 < g2 && g2 < g3);
    }

    #[test]
    fn test_results_rendered_in_order() {
        let mut flow = SearchFlow::new();

        let generation = flow.submit("lofi beats", true).expect("submit");
        let outcome = flow.accept(generation, Ok(page(&["A", "B"])));

        match outcome {
            Some(SearchOutcome::Results(items)) => {
                let titles: Vec<&str> = items.iter().map(SearchItem::title).collect();
                assert_eq!(titles, ["A", "B"]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(flow.state(), &SearchState::Idle);
    }

    #[test]
    fn test_zero_results_render_empty_state() {
        let mut flow = SearchFlow::new();

        let generation = flow.submit("nothing", true).expect("submit");
        assert_eq!(
            flow.accept(generation, Ok(page(&[]))),
            Some(SearchOutcome::Empty)
        );
    }

    #[test]
    fn test_stale_result_discarded() {
        let mut flow = SearchFlow::new();

        let g1 = flow.submit("first", true).expect("submit");
        let g2 = flow.submit("second", true).expect("submit");

        // Old response arrives after the newer submission: discarded.
        assert_eq!(flow.accept(g1, Ok(page(&["old"]))), None);
        assert!(flow.is_searching());

        // The newest response renders.
        assert!(matches!(
            flow.accept(g2, Ok(page(&["new"]))),
            Some(SearchOutcome::Results(_))
        ));
    }

    #[test]
    fn test_stale_suppression_is_order_independent() {
        let mut flow = SearchFlow::new();

        let g1 = flow.submit("first", true).expect("submit");
        let g2 = flow.submit("second", true).expect("submit");

        // Newer response arrives first and renders.
        assert!(flow.accept(g2, Ok(page(&["new"]))).is_some());
        // Older response afterwards is still discarded.
        assert_eq!(flow.accept(g1, Ok(page(&["old"]))), None);
        assert_eq!(flow.in_flight_count(), 0);
    }

    #[test]
    fn test_rejected_submission_keeps_pending_result() {
        let mut flow = SearchFlow::new();

        let generation = flow.submit("lofi beats", true).expect("submit");

        // A blank re-submission while the search is in flight shows the
        // inline error but neither cancels nor supersedes the search.
        assert_eq!(flow.submit("", true), Err(SearchError::EmptyQuery));
        assert!(flow.error_message().is_some());

        let outcome = flow.accept(generation, Ok(page(&["A", "B"])));
        match outcome {
            Some(SearchOutcome::Results(items)) => assert_eq!(items.len(), 2),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_offline_rejection_keeps_pending_result() {
        let mut flow = SearchFlow::new();

        let generation = flow.submit("song", true).expect("submit");
        assert_eq!(flow.submit("other", false), Err(SearchError::Offline));

        assert!(flow.accept(generation, Ok(page(&["A"]))).is_some());
    }

    #[test]
    fn test_cancel_suppresses_result() {
        let mut flow = SearchFlow::new();

        let generation = flow.submit("song", true).expect("submit");
        flow.cancel();
        assert_eq!(flow.state(), &SearchState::Idle);

        assert_eq!(flow.accept(generation, Ok(page(&["late"]))), None);
    }

    #[test]
    fn test_network_failure_returns_to_idle() {
        let mut flow = SearchFlow::new();

        let generation = flow.submit("song", true).expect("submit");
        let outcome = flow.accept(
            generation,
            Err(RemoteError::Network("timed out".to_string())),
        );

        assert!(matches!(outcome, Some(SearchOutcome::Failed(_))));
        assert_eq!(flow.state(), &SearchState::Idle);
    }

    #[test]
    fn test_error_auto_clears_after_delay() {
        let mut flow = SearchFlow::new();
        let _ = flow.submit("", true);

        let raised = match flow.state() {
            SearchState::Error { since, .. } => *since,
            other => panic!("expected error state, got {:?}", other),
        };

        assert!(!flow.tick(raised + Duration::from_millis(100)));
        assert!(flow.error_message().is_some());

        assert!(flow.tick(raised + ERROR_CLEAR_DELAY));
        assert_eq!(flow.state(), &SearchState::Idle);
    }

    #[test]
    fn test_resubmit_after_failure() {
        let mut flow = SearchFlow::new();

        let g1 = flow.submit("song", true).expect("submit");
        let _ = flow.accept(g1, Err(RemoteError::Network("down".to_string())));

        // The flow is re-submittable: a new search proceeds normally.
        let g2 = flow.submit("song", true).expect("submit");
        assert!(g2 > g1);
        assert!(flow.accept(g2, Ok(page(&["A"]))).is_some());
    }
}
