//! Connectivity watcher.
//!
//! Probes well-known endpoints from a background thread and emits
//! Online/Offline transition events over a channel, consumed via polling
//! from the UI loop. Only transitions are reported, never steady state.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpStream};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

/// Seconds between connectivity probes.
const PROBE_INTERVAL_SECS: u64 = 5;

/// Per-probe connect timeout.
const PROBE_TIMEOUT_SECS: u64 = 3;

/// Public resolvers probed for reachability.
const PROBE_ADDRS: [SocketAddr; 2] = [
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)), 53),
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 53),
];

/// A connectivity state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    /// The device regained connectivity.
    Online,
    /// The device lost connectivity.
    Offline,
}

/// Returns the event to emit for a fresh probe result, if any.
///
/// The first probe always emits; afterwards only changes do.
#[must_use]
pub fn transition(previous: Option<bool>, online: bool) -> Option<ConnectivityEvent> {
    match previous {
        Some(prev) if prev == online => None,
        _ if online => Some(ConnectivityEvent::Online),
        _ => Some(ConnectivityEvent::Offline),
    }
}

/// Background connectivity watcher.
pub struct ConnectivityWatcher {
    /// Receiver for transition events.
    event_rx: Receiver<ConnectivityEvent>,
    /// Handle to the probe thread.
    _thread_handle: JoinHandle<()>,
}

impl ConnectivityWatcher {
    /// Starts the watcher thread.
    #[must_use]
    pub fn new() -> Self {
        let (event_tx, event_rx) = mpsc::channel::<ConnectivityEvent>();

        let thread_handle = thread::spawn(move || {
            info!("[NET] Connectivity watcher started");
            Self::run_probe_loop(&event_tx);
            info!("[NET] Connectivity watcher exiting");
        });

        Self {
            event_rx,
            _thread_handle: thread_handle,
        }
    }

    /// Polls for a transition event. Non-blocking.
    pub fn poll_event(&self) -> Option<ConnectivityEvent> {
        match self.event_rx.try_recv() {
            Ok(event) => Some(event),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                warn!("[NET] Event channel disconnected");
                None
            }
        }
    }

    /// Runs the probe loop until the receiver side is dropped.
    fn run_probe_loop(event_tx: &Sender<ConnectivityEvent>) {
        let mut previous: Option<bool> = None;

        loop {
            let online = Self::probe();
            debug!("[NET] Probe result: online={}", online);

            if let Some(event) = transition(previous, online) {
                info!("[NET] Connectivity changed: {:?}", event);
                if event_tx.send(event).is_err() {
                    break;
                }
            }
            previous = Some(online);

            thread::sleep(Duration::from_secs(PROBE_INTERVAL_SECS));
        }
    }

    /// Returns true if any probe endpoint accepts a connection.
    fn probe() -> bool {
        let timeout = Duration::from_secs(PROBE_TIMEOUT_SECS);
        PROBE_ADDRS
            .iter()
            .any(|addr| TcpStream::connect_timeout(addr, timeout).is_ok())
    }
}

impl Default for ConnectivityWatcher {
    fn default() -> Self {
        Self::new()
    }
}
