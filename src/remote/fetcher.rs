//! Background fetcher for non-blocking catalog calls.
//!
//! Runs the search and update-check HTTP requests in a separate thread so
//! the UI loop never blocks. Search requests carry the submitting
//! generation id; the id travels with the result so the search flow can
//! discard stale completions.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use super::client::CatalogClient;
use super::RemoteError;
use crate::search::types::SearchResponse;
use crate::update::types::UpdateDescriptor;

/// Request for a background fetch operation.
#[derive(Debug, Clone)]
pub enum FetchRequest {
    /// Search the catalog.
    Search {
        /// Generation id of the submitting search.
        generation: u64,
        /// Raw query text.
        query: String,
    },
    /// Fetch the update descriptor.
    UpdateCheck,
}

/// Result of a background fetch operation.
#[derive(Debug)]
pub enum FetchResult {
    /// A search call completed, successfully or not.
    Search {
        /// Generation id the request was tagged with.
        generation: u64,
        /// Decoded page, or the failure.
        outcome: Result<SearchResponse, RemoteError>,
    },
    /// An update-check call completed, successfully or not.
    UpdateCheck(Result<UpdateDescriptor, RemoteError>),
}

/// Status of the background fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetcherStatus {
    /// No operation in progress.
    Idle,
    /// Currently running a search call.
    Searching,
    /// Currently running an update check.
    CheckingUpdate,
}

/// Background fetcher for catalog calls.
///
/// Requests go in over an mpsc channel; results come back on another and
/// are polled from the UI loop. The transport call is never aborted;
/// cancellation is resolved by the flow at acceptance time.
pub struct BackgroundFetcher {
    /// Sender for requests to the background thread.
    request_tx: Sender<FetchRequest>,
    /// Receiver for results from the background thread.
    result_rx: Receiver<FetchResult>,
    /// Current status.
    status: Arc<Mutex<FetcherStatus>>,
    /// Handle to the background thread.
    _thread_handle: JoinHandle<()>,
}

impl BackgroundFetcher {
    /// Creates a new background fetcher owning the given client.
    #[must_use]
    pub fn new(client: CatalogClient) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<FetchRequest>();
        let (result_tx, result_rx) = mpsc::channel::<FetchResult>();
        let status = Arc::new(Mutex::new(FetcherStatus::Idle));
        let status_clone = Arc::clone(&status);

        let thread_handle = thread::spawn(move || {
            info!("[FETCHER] Background thread started");
            Self::run_fetch_loop(request_rx, result_tx, status_clone, client);
            info!("[FETCHER] Background thread exiting");
        });

        Self {
            request_tx,
            result_rx,
            status,
            _thread_handle: thread_handle,
        }
    }

    /// Runs the fetch loop in the background thread.
    fn run_fetch_loop(
        request_rx: Receiver<FetchRequest>,
        result_tx: Sender<FetchResult>,
        status: Arc<Mutex<FetcherStatus>>,
        client: CatalogClient,
    ) {
        // Process requests until the channel is closed
        while let Ok(request) = request_rx.recv() {
            debug!("[FETCHER] Received request: {:?}", request);

            let result = match request {
                FetchRequest::Search { generation, query } => {
                    if let Ok(mut s) = status.lock() {
                        *s = FetcherStatus::Searching;
                    }

                    info!("[FETCHER] Searching (generation {})", generation);
                    let outcome = client.fetch_search(&query);
                    if let Err(ref e) = outcome {
                        warn!("[FETCHER] Search failed: {}", e);
                    }

                    FetchResult::Search { generation, outcome }
                }
                FetchRequest::UpdateCheck => {
                    if let Ok(mut s) = status.lock() {
                        *s = FetcherStatus::CheckingUpdate;
                    }

                    info!("[FETCHER] Checking for updates");
                    let outcome = client.fetch_update();
                    if let Err(ref e) = outcome {
                        warn!("[FETCHER] Update check failed: {}", e);
                    }

                    FetchResult::UpdateCheck(outcome)
                }
            };

            if let Ok(mut s) = status.lock() {
                *s = FetcherStatus::Idle;
            }

            if result_tx.send(result).is_err() {
                warn!("[FETCHER] Result channel closed, exiting");
                break;
            }
        }
    }

    /// Requests a search tagged with a generation id.
    ///
    /// Non-blocking. Call `poll_result()` to check for completion.
    pub fn request_search(&self, generation: u64, query: &str) {
        info!("[FETCHER] Requesting search (generation {})", generation);

        let request = FetchRequest::Search {
            generation,
            query: query.to_string(),
        };
        if let Err(e) = self.request_tx.send(request) {
            warn!("[FETCHER] Failed to send search request: {}", e);
        }
    }

    /// Requests an update check.
    ///
    /// Non-blocking. Call `poll_result()` to check for completion.
    pub fn request_update_check(&self) {
        info!("[FETCHER] Requesting update check");

        if let Err(e) = self.request_tx.send(FetchRequest::UpdateCheck) {
            warn!("[FETCHER] Failed to send update-check request: {}", e);
        }
    }

    /// Polls for a result from the background thread.
    ///
    /// Returns `Some(result)` if a result is available, `None` otherwise.
    /// Non-blocking.
    pub fn poll_result(&self) -> Option<FetchResult> {
        match self.result_rx.try_recv() {
            Ok(result) => {
                debug!("[FETCHER] Received result");
                Some(result)
            }
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                warn!("[FETCHER] Result channel disconnected");
                None
            }
        }
    }

    /// Returns the current status of the fetcher.
    #[must_use]
    pub fn status(&self) -> FetcherStatus {
        self.status.lock().map(|s| *s).unwrap_or(FetcherStatus::Idle)
    }

    /// Returns true if a call is currently in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.status() != FetcherStatus::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_status() {
        assert_eq!(FetcherStatus::Idle, FetcherStatus::Idle);
        assert_ne!(FetcherStatus::Idle, FetcherStatus::Searching);
    }

    #[test]
    fn test_fetch_request_debug() {
        let req = FetchRequest::Search {
            generation: 3,
            query: "lofi".to_string(),
        };
        let debug_str = format!("{:?}", req);
        assert!(debug_str.contains("Search"));
        assert!(debug_str.contains("lofi"));
    }
}
