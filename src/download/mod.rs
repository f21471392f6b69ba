//! Background download collaborator.
//!
//! Enqueues downloads onto a worker thread and signals completion
//! out-of-band over a channel polled from the UI loop. Also owns the
//! local update-package conventions: where packages land, whether one is
//! already present for a version, and handing a package to the platform
//! opener.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

/// Connect timeout for download requests. The transfer itself has no
/// deadline.
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Identifier of an enqueued download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DownloadId(pub u64);

/// A download to enqueue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Source URL.
    pub url: String,
    /// Notification title.
    pub title: String,
    /// Notification description.
    pub description: String,
    /// Destination file path.
    pub destination: PathBuf,
}

/// Completion signal for an enqueued download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadEvent {
    /// The file was downloaded and moved into place.
    Completed {
        /// Identifier of the download.
        id: DownloadId,
        /// Final file path.
        path: PathBuf,
    },
    /// The download failed; the destination is untouched.
    Failed {
        /// Identifier of the download.
        id: DownloadId,
        /// Failure description.
        error: String,
    },
}

/// Download errors surfaced at enqueue time.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Destination directory cannot be created or written.
    #[error("Cannot write download directory: {0}")]
    Destination(#[from] io::Error),

    /// The worker thread is gone.
    #[error("Download worker unavailable")]
    WorkerGone,
}

/// Background download manager.
pub struct DownloadManager {
    /// Directory downloads land in.
    dir: PathBuf,
    /// Next download id to hand out.
    next_id: u64,
    /// Sender for jobs to the worker thread.
    job_tx: Sender<(DownloadId, DownloadRequest)>,
    /// Receiver for completion events.
    event_rx: Receiver<DownloadEvent>,
    /// Handle to the worker thread.
    _thread_handle: JoinHandle<()>,
}

impl DownloadManager {
    /// Creates a manager downloading into `dir`.
    #[must_use]
    pub fn new(dir: PathBuf) -> Self {
        assert!(!dir.as_os_str().is_empty(), "download dir must not be empty");

        let (job_tx, job_rx) = mpsc::channel::<(DownloadId, DownloadRequest)>();
        let (event_tx, event_rx) = mpsc::channel::<DownloadEvent>();

        let thread_handle = thread::spawn(move || {
            info!("[DOWNLOAD] Worker thread started");
            Self::run_worker(job_rx, event_tx);
            info!("[DOWNLOAD] Worker thread exiting");
        });

        Self {
            dir,
            next_id: 0,
            job_tx,
            event_rx,
            _thread_handle: thread_handle,
        }
    }

    /// Returns the download directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Enqueues a download and returns its id.
    ///
    /// # Errors
    /// Fails when the destination directory cannot be created.
    pub fn enqueue(&mut self, request: DownloadRequest) -> Result<DownloadId, DownloadError> {
        assert!(!request.url.is_empty(), "url must not be empty");

        if let Some(parent) = request.destination.parent() {
            fs::create_dir_all(parent)?;
        }

        let id = DownloadId(self.next_id);
        self.next_id += 1;

        info!(
            "[DOWNLOAD] Enqueued {:?}: {} -> {}",
            id,
            request.url,
            request.destination.display()
        );
        self.job_tx
            .send((id, request))
            .map_err(|_| DownloadError::WorkerGone)?;

        Ok(id)
    }

    /// Polls for a completion event. Non-blocking.
    pub fn poll_event(&self) -> Option<DownloadEvent> {
        match self.event_rx.try_recv() {
            Ok(event) => Some(event),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                warn!("[DOWNLOAD] Event channel disconnected");
                None
            }
        }
    }

    /// Returns the conventional package filename for a version.
    #[must_use]
    pub fn package_filename(version_name: &str) -> String {
        format!("tunegrab-{}.tar.gz", version_name)
    }

    /// Returns the package path for a version in this manager's directory.
    #[must_use]
    pub fn package_path(&self, version_name: &str) -> PathBuf {
        self.dir.join(Self::package_filename(version_name))
    }

    /// Returns the package path if one was already downloaded.
    #[must_use]
    pub fn local_package(&self, version_name: &str) -> Option<PathBuf> {
        let path = self.package_path(version_name);
        path.is_file().then_some(path)
    }

    /// Runs the worker loop: one blocking download at a time.
    fn run_worker(
        job_rx: Receiver<(DownloadId, DownloadRequest)>,
        event_tx: Sender<DownloadEvent>,
    ) {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("tunegrab/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(None)
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());

        while let Ok((id, request)) = job_rx.recv() {
            debug!("[DOWNLOAD] Starting {:?}: {}", id, request.url);

            let event = match Self::download_one(&client, &request) {
                Ok(()) => {
                    info!("[DOWNLOAD] Completed {:?}", id);
                    DownloadEvent::Completed {
                        id,
                        path: request.destination,
                    }
                }
                Err(error) => {
                    warn!("[DOWNLOAD] Failed {:?}: {}", id, error);
                    DownloadEvent::Failed { id, error }
                }
            };

            if event_tx.send(event).is_err() {
                warn!("[DOWNLOAD] Event channel closed, exiting");
                break;
            }
        }
    }

    /// Downloads one file to a temp path, then renames into place.
    fn download_one(
        client: &reqwest::blocking::Client,
        request: &DownloadRequest,
    ) -> Result<(), String> {
        let mut response = client
            .get(&request.url)
            .send()
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("server answered HTTP {}", status));
        }

        let temp_path = request.destination.with_extension("part");
        let mut file =
            fs::File::create(&temp_path).map_err(|e| format!("cannot create file: {}", e))?;

        let bytes = match response.copy_to(&mut file) {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = fs::remove_file(&temp_path);
                return Err(format!("transfer failed: {}", e));
            }
        };

        fs::rename(&temp_path, &request.destination)
            .map_err(|e| format!("cannot move file into place: {}", e))?;

        debug!(
            "[DOWNLOAD] Wrote {} byte(s) to {}",
            bytes,
            request.destination.display()
        );
        Ok(())
    }
}

/// Removes a stale duplicate package. Missing files are not an error.
pub fn clear_stale_package(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => info!("[DOWNLOAD] Removed stale package {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("[DOWNLOAD] Failed to remove {}: {}", path.display(), e),
    }
}

/// Hands a downloaded package to the platform opener.
///
/// # Errors
/// Returns error if the opener cannot be spawned.
pub fn open_installer(path: &Path) -> io::Result<()> {
    info!("[DOWNLOAD] Opening installer for {}", path.display());

    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]).arg(path);
        c
    };
    #[cfg(target_os = "macos")]
    let mut command = {
        let mut c = Command::new("open");
        c.arg(path);
        c
    };
    #[cfg(all(not(target_os = "windows"), not(target_os = "macos")))]
    let mut command = {
        let mut c = Command::new("xdg-open");
        c.arg(path);
        c
    };

    command.spawn().map(|_| ())
}
