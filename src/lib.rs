//! Tunegrab
//!
//! A TUI client for searching and downloading music/video from a remote
//! catalog, with an in-app update checker.
//!
//! # Architecture
//!
//! - **Remote Module**: request builders, blocking HTTP client, and a
//!   background fetcher thread polled from the UI loop
//! - **Search Module**: search response models and the search flow state
//!   machine (generation counter, stale-result suppression)
//! - **Update Module**: update descriptor models and the update decision flow
//! - **Download Module**: background download collaborator with out-of-band
//!   completion events
//! - **Net Module**: connectivity watcher emitting online/offline transitions

// Clippy configuration - allow common patterns
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]

pub mod app;
pub mod config;
pub mod download;
pub mod logging;
pub mod net;
pub mod prefs;
pub mod remote;
pub mod search;
pub mod ui;
pub mod update;

// Re-export main types
pub use app::App;
pub use config::Config;
pub use download::DownloadManager;
pub use prefs::PrefStore;
pub use search::SearchFlow;
pub use update::UpdateFlow;
