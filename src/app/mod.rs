//! Main application state and event handling.
//!
//! Orchestrates the search flow, the update flow, the background fetcher,
//! the download manager and the connectivity watcher. All completions are
//! polled here, on the UI thread, before they touch any state.

mod input;
mod render;

pub use input::{intent_for_key, InputContext, Intent};

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::KeyEvent;
use tracing::{info, warn};

use crate::config::Config;
use crate::download::{self, DownloadEvent, DownloadManager, DownloadRequest};
use crate::net::{ConnectivityEvent, ConnectivityWatcher};
use crate::prefs::PrefStore;
use crate::remote::{BackgroundFetcher, CatalogClient, FetchResult};
use crate::search::{SearchFlow, SearchItem, SearchOutcome};
use crate::ui::AlertKind;
use crate::update::{
    once_out_of, PromptChoice, UpdateAction, UpdateDecision, UpdateFlow, UPDATE_CHECK_ODDS,
};

/// How long success notices stay on screen.
const NOTICE_SUCCESS_SECS: u64 = 4;

/// How long error notices stay on screen.
const NOTICE_ERROR_SECS: u64 = 7;

/// A transient alert banner.
#[derive(Debug, Clone)]
pub struct Notice {
    /// Banner headline.
    pub title: String,
    /// Supporting text.
    pub text: String,
    /// Visual category.
    pub kind: AlertKind,
    /// When the banner expires.
    until: Instant,
}

/// Application state.
pub struct App {
    /// Running flag.
    running: bool,
    /// Current connectivity state.
    online: bool,
    /// Whether the device has been offline since startup.
    was_offline: bool,
    /// Query text under the cursor.
    query: String,
    /// Cursor position in the query (char index).
    cursor: usize,
    /// Search flow state machine.
    search: SearchFlow,
    /// Update flow controller.
    update: UpdateFlow,
    /// Rendered result items, in submission order.
    results: Vec<SearchItem>,
    /// Selected result index.
    selected: usize,
    /// Whether the empty-state view is showing.
    show_empty_state: bool,
    /// State of the prompt's ignore checkbox.
    prompt_ignore_checked: bool,
    /// Background HTTP fetcher.
    fetcher: BackgroundFetcher,
    /// Download collaborator.
    downloads: DownloadManager,
    /// Connectivity watcher.
    connectivity: ConnectivityWatcher,
    /// Preference flag store.
    prefs: PrefStore,
    /// Transient alert banner.
    notice: Option<Notice>,
    /// Status bar message.
    status: String,
    /// Configuration.
    config: Config,
}

impl App {
    /// Creates the application from the on-disk configuration.
    ///
    /// # Errors
    /// Returns error if the configuration cannot be read or created.
    pub fn new() -> io::Result<Self> {
        let config = Config::load()?;
        Ok(Self::with_config(config))
    }

    /// Creates the application from an explicit configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        let client = CatalogClient::new(
            &config.search_endpoint,
            &config.update_endpoint,
            &config.api_key,
            config.max_results,
        );

        Self {
            running: true,
            online: true,
            was_offline: false,
            query: String::new(),
            cursor: 0,
            search: SearchFlow::new(),
            update: UpdateFlow::new(),
            results: Vec::new(),
            selected: 0,
            show_empty_state: false,
            prompt_ignore_checked: false,
            fetcher: BackgroundFetcher::new(client),
            downloads: DownloadManager::new(config.download_dir()),
            connectivity: ConnectivityWatcher::new(),
            prefs: PrefStore::new(),
            notice: None,
            status: "Ready".to_string(),
            config,
        }
    }

    /// Returns true while the app should keep running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Requests the app to quit.
    pub fn request_quit(&mut self) {
        self.running = false;
    }

    /// Kicks off the probabilistic startup update check.
    pub fn maybe_check_updates(&mut self) {
        if !self.config.update_check {
            return;
        }
        if once_out_of(UPDATE_CHECK_ODDS) {
            self.fetcher.request_update_check();
        } else {
            info!("[UPDATE] Skipping startup check this launch");
        }
    }

    /// Handles a key event.
    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctx = InputContext {
            prompt_open: self.update.prompt().is_some(),
            searching: self.search.is_searching(),
        };

        if let Some(intent) = intent_for_key(key, ctx) {
            self.apply(intent);
        }
    }

    /// Applies an intent to the app state.
    pub fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::Quit => self.request_quit(),
            Intent::InsertChar(c) => {
                let byte = char_to_byte(&self.query, self.cursor);
                self.query.insert(byte, c);
                self.cursor += 1;
                // Touching the field clears a lingering inline error.
                self.search.clear_error();
            }
            Intent::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let byte = char_to_byte(&self.query, self.cursor);
                    self.query.remove(byte);
                }
            }
            Intent::CursorLeft => self.cursor = self.cursor.saturating_sub(1),
            Intent::CursorRight => {
                self.cursor = (self.cursor + 1).min(self.query.chars().count());
            }
            Intent::ClearQuery => {
                self.query.clear();
                self.cursor = 0;
                self.search.clear_error();
            }
            Intent::SubmitSearch => self.submit_search(),
            Intent::CancelSearch => {
                self.search.cancel();
                self.status = "Search cancelled".to_string();
            }
            Intent::SelectNext => {
                if !self.results.is_empty() {
                    self.selected = (self.selected + 1).min(self.results.len() - 1);
                }
            }
            Intent::SelectPrev => self.selected = self.selected.saturating_sub(1),
            Intent::PromptConfirm => self.resolve_prompt(PromptChoice::Confirm),
            Intent::PromptDismiss => self.resolve_prompt(PromptChoice::Dismiss {
                ignore: self.prompt_ignore_checked,
            }),
            Intent::PromptToggleIgnore => {
                self.prompt_ignore_checked = !self.prompt_ignore_checked;
            }
        }
    }

    /// Validates and dispatches the current query.
    fn submit_search(&mut self) {
        match self.search.submit(&self.query, self.online) {
            Ok(generation) => {
                self.fetcher.request_search(generation, &self.query);
                self.status = "Searching".to_string();
            }
            Err(e) => {
                // The inline error renders from the flow state.
                info!("[APP] Search rejected: {}", e);
            }
        }
    }

    /// Resolves the update prompt and carries out the resulting action.
    fn resolve_prompt(&mut self, choice: PromptChoice) {
        let action = self.update.choose(choice, &mut self.prefs);
        self.prompt_ignore_checked = false;

        match action {
            UpdateAction::Install(package) => {
                if let Err(e) = download::open_installer(&package) {
                    warn!("[APP] Failed to open installer: {}", e);
                    self.set_notice(
                        "Cannot open installer",
                        &format!("{}", e),
                        AlertKind::Error,
                    );
                }
            }
            UpdateAction::Download {
                url,
                version_name,
                title,
                description,
            } => {
                let destination = self.downloads.package_path(&version_name);
                let request = DownloadRequest {
                    url,
                    title: title.clone(),
                    description: description.clone(),
                    destination: destination.clone(),
                };
                match self.downloads.enqueue(request) {
                    Ok(id) => {
                        self.update.note_enqueued(id, destination);
                        self.set_notice(&description, &title, AlertKind::Success);
                    }
                    Err(e) => {
                        warn!("[APP] Failed to enqueue update download: {}", e);
                        self.set_notice(
                            "Cannot write download directory",
                            "Check download_dir in the tunegrab configuration",
                            AlertKind::Error,
                        );
                    }
                }
            }
            UpdateAction::RemoveStalePackage(package) => {
                download::clear_stale_package(&package);
            }
            UpdateAction::None => {}
        }
    }

    /// Drains background completions and expires timers.
    ///
    /// Called once per UI loop iteration, before rendering.
    pub fn poll_background(&mut self) {
        while let Some(result) = self.fetcher.poll_result() {
            match result {
                FetchResult::Search { generation, outcome } => {
                    self.on_search_result(generation, outcome);
                }
                FetchResult::UpdateCheck(outcome) => match outcome {
                    Ok(descriptor) => self.on_update_descriptor(descriptor),
                    Err(e) => warn!("[APP] Update check failed: {}", e),
                },
            }
        }

        while let Some(event) = self.connectivity.poll_event() {
            self.on_connectivity(event);
        }

        while let Some(event) = self.downloads.poll_event() {
            self.on_download_event(event);
        }

        self.tick(Instant::now());
    }

    /// Handles a completed search call.
    fn on_search_result(
        &mut self,
        generation: u64,
        outcome: Result<crate::search::SearchResponse, crate::remote::RemoteError>,
    ) {
        let Some(outcome) = self.search.accept(generation, outcome) else {
            return; // stale or cancelled, discarded silently
        };

        match outcome {
            SearchOutcome::Results(items) => {
                self.status = format!("{} result(s)", items.len());
                self.results = items;
                self.selected = 0;
                self.show_empty_state = false;
            }
            SearchOutcome::Empty => {
                self.results.clear();
                self.selected = 0;
                self.show_empty_state = true;
                self.status = "No results".to_string();
            }
            SearchOutcome::Failed(_) => {
                self.status = "Ready".to_string();
                self.set_notice(
                    "No internet connection",
                    "Cannot reach the catalog servers, please check your connection",
                    AlertKind::Error,
                );
            }
        }
    }

    /// Handles a fetched update descriptor.
    fn on_update_descriptor(&mut self, descriptor: crate::update::UpdateDescriptor) {
        let local = self.downloads.local_package(&descriptor.version_name);
        match self.update.evaluate(descriptor, &self.prefs, local) {
            Ok(UpdateDecision::Prompt(_)) => {
                self.prompt_ignore_checked = false;
            }
            Ok(UpdateDecision::UpToDate | UpdateDecision::Ignored) => {}
            Err(e) => {
                // Malformed descriptor: the flow aborts, nothing is shown.
                warn!("[APP] Update flow aborted: {}", e);
            }
        }
    }

    /// Handles a connectivity transition.
    fn on_connectivity(&mut self, event: ConnectivityEvent) {
        match event {
            ConnectivityEvent::Online => {
                if self.was_offline {
                    self.set_notice("Here we go!", "Device is back online", AlertKind::Success);
                    self.search.clear_error();
                }
                self.online = true;
            }
            ConnectivityEvent::Offline => {
                self.set_notice(
                    "Device offline",
                    "You need an active internet connection to use this app",
                    AlertKind::Error,
                );
                self.online = false;
                self.was_offline = true;
            }
        }
    }

    /// Handles a download completion signal.
    fn on_download_event(&mut self, event: DownloadEvent) {
        match event {
            DownloadEvent::Completed { id, .. } => {
                // No-op when the update flow already cleared its state.
                if let Some(package) = self.update.complete_download(id) {
                    self.notice = None;
                    if let Err(e) = download::open_installer(&package) {
                        warn!("[APP] Failed to open installer: {}", e);
                    }
                }
            }
            DownloadEvent::Failed { id, error } => {
                let _ = self.update.complete_download(id);
                self.set_notice("Download failed", &error, AlertKind::Error);
            }
        }
    }

    /// Expires the inline error and the alert banner.
    fn tick(&mut self, now: Instant) {
        self.search.tick(now);

        if let Some(notice) = &self.notice {
            if now >= notice.until {
                self.notice = None;
            }
        }
    }

    /// Shows a transient alert banner.
    fn set_notice(&mut self, title: &str, text: &str, kind: AlertKind) {
        let secs = match kind {
            AlertKind::Error => NOTICE_ERROR_SECS,
            _ => NOTICE_SUCCESS_SECS,
        };
        self.notice = Some(Notice {
            title: title.to_string(),
            text: text.to_string(),
            kind,
            until: Instant::now() + Duration::from_secs(secs),
        });
    }
}

/// Converts a char index into a byte offset of `s`.
fn char_to_byte(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map_or(s.len(), |(byte, _)| byte)
}
