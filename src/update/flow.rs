//! Update flow controller.
//!
//! Evaluates a fetched update descriptor against the running version and the
//! persisted ignore flags, then drives the three prompt resolutions:
//! install a previously downloaded package, download the offered one, or
//! dismiss (optionally ignoring the version for good).

use std::path::PathBuf;

use rand::Rng;
use tracing::{info, warn};

use super::types::{UpdateDescriptor, UpdateError};
use crate::download::DownloadId;
use crate::prefs::PrefStore;

/// Running version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Startup update checks run once out of this many cold starts.
pub const UPDATE_CHECK_ODDS: u32 = 4;

/// Returns true roughly once out of `n` calls.
///
/// Rate-limits the startup update check so the endpoint is not hit on every
/// launch.
#[must_use]
pub fn once_out_of(n: u32) -> bool {
    assert!(n > 0, "odds must be positive");
    rand::thread_rng().gen_range(0..n) == 0
}

/// Parses a version string into comparable parts.
fn parse_version(version: &str) -> (u32, u32, u32) {
    let parts: Vec<u32> = version
        .trim_start_matches('v')
        .split('.')
        .filter_map(|s| s.parse().ok())
        .collect();

    (
        parts.first().copied().unwrap_or(0),
        parts.get(1).copied().unwrap_or(0),
        parts.get(2).copied().unwrap_or(0),
    )
}

/// Maps a version string onto the monotonic code the update endpoint uses.
#[must_use]
pub fn version_code(version: &str) -> u32 {
    let (major, minor, patch) = parse_version(version);
    major * 10_000 + minor * 100 + patch
}

/// Version code of the running build.
#[must_use]
pub fn running_version_code() -> u32 {
    version_code(VERSION)
}

/// An update the user should decide on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePrompt {
    /// The offered update.
    pub descriptor: UpdateDescriptor,
    /// Resolved and validated download URL.
    pub download_url: String,
    /// Path of an already-downloaded package for this version, if any.
    pub local_package: Option<PathBuf>,
}

impl UpdatePrompt {
    /// Returns the prompt title.
    #[must_use]
    pub fn title(&self) -> String {
        format!("Version {} found!", self.descriptor.version_name)
    }

    /// Returns the positive-button label.
    #[must_use]
    pub fn confirm_label(&self) -> &'static str {
        if self.local_package.is_some() {
            "INSTALL UPDATE"
        } else {
            "DOWNLOAD UPDATE"
        }
    }
}

/// Outcome of evaluating a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateDecision {
    /// Running version is current (or newer). No action.
    UpToDate,
    /// The user opted to ignore this version. No action.
    Ignored,
    /// Present the prompt to the user.
    Prompt(UpdatePrompt),
}

/// User resolution of the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptChoice {
    /// Positive button: install or download.
    Confirm,
    /// Negative button, with the state of the "ignore this update" checkbox.
    Dismiss {
        /// Persist the ignore flag for this version code.
        ignore: bool,
    },
}

/// Side effect the app must carry out after a prompt resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateAction {
    /// Open the platform installer on the local package.
    Install(PathBuf),
    /// Enqueue a background download.
    Download {
        /// Resolved package URL.
        url: String,
        /// Version name, used to derive the destination filename.
        version_name: String,
        /// Notification title.
        title: String,
        /// Notification description.
        description: String,
    },
    /// Remove a stale duplicate package left from an earlier download.
    RemoveStalePackage(PathBuf),
    /// Nothing to do.
    None,
}

/// Update flow controller.
#[derive(Debug)]
pub struct UpdateFlow {
    /// Version code of the running build.
    running_code: u32,
    /// Prompt awaiting a user resolution.
    prompt: Option<UpdatePrompt>,
    /// Enqueued update download awaiting completion.
    pending_install: Option<(DownloadId, PathBuf)>,
}

impl UpdateFlow {
    /// Creates a flow for the running build.
    #[must_use]
    pub fn new() -> Self {
        Self::with_running_code(running_version_code())
    }

    /// Creates a flow pinned to an explicit running version code.
    #[must_use]
    pub fn with_running_code(running_code: u32) -> Self {
        Self {
            running_code,
            prompt: None,
            pending_install: None,
        }
    }

    /// Returns the open prompt, if any.
    #[must_use]
    pub fn prompt(&self) -> Option<&UpdatePrompt> {
        self.prompt.as_ref()
    }

    /// Evaluates a fetched descriptor.
    ///
    /// Decides, in order: up to date, ignored, or prompt. A malformed
    /// descriptor (no usable download link) aborts the flow with a
    /// validation error and never reaches the user.
    pub fn evaluate(
        &mut self,
        descriptor: UpdateDescriptor,
        prefs: &PrefStore,
        local_package: Option<PathBuf>,
    ) -> Result<UpdateDecision, UpdateError> {
        if descriptor.version_code <= self.running_code {
            info!(
                "[UPDATE] Up to date (offered {} <= running {})",
                descriptor.version_code, self.running_code
            );
            return Ok(UpdateDecision::UpToDate);
        }

        if prefs.is_ignoring(descriptor.version_code) {
            info!(
                "[UPDATE] Version code {} is ignored by the user",
                descriptor.version_code
            );
            return Ok(UpdateDecision::Ignored);
        }

        // Validate the link before anything is shown; a malformed
        // descriptor aborts here.
        let download_url = descriptor.resolve_download_url().inspect_err(|e| {
            warn!("[UPDATE] Aborting: {}", e);
        })?;

        let prompt = UpdatePrompt {
            descriptor,
            download_url,
            local_package,
        };
        info!(
            "[UPDATE] Offering version {} ({})",
            prompt.descriptor.version_name,
            prompt.confirm_label()
        );
        self.prompt = Some(prompt.clone());
        Ok(UpdateDecision::Prompt(prompt))
    }

    /// Resolves the open prompt with the user's choice.
    ///
    /// No-op (returns `UpdateAction::None`) when no prompt is open.
    pub fn choose(&mut self, choice: PromptChoice, prefs: &mut PrefStore) -> UpdateAction {
        let Some(prompt) = self.prompt.take() else {
            return UpdateAction::None;
        };

        match choice {
            PromptChoice::Confirm => {
                if let Some(package) = prompt.local_package {
                    info!("[UPDATE] Installing local package {}", package.display());
                    UpdateAction::Install(package)
                } else {
                    info!("[UPDATE] Downloading from {}", prompt.download_url);
                    UpdateAction::Download {
                        url: prompt.download_url,
                        title: format!("tunegrab {}", prompt.descriptor.version_name),
                        description: "Downloading application update".to_string(),
                        version_name: prompt.descriptor.version_name,
                    }
                }
            }
            PromptChoice::Dismiss { ignore } => {
                if ignore {
                    let code = prompt.descriptor.version_code;
                    if let Err(e) = prefs.set_ignoring(code, true) {
                        warn!("[UPDATE] Failed to persist ignore flag: {}", e);
                    }
                    // A previously downloaded package for the ignored
                    // version is now a stale duplicate.
                    if let Some(package) = prompt.local_package {
                        return UpdateAction::RemoveStalePackage(package);
                    }
                }
                UpdateAction::None
            }
        }
    }

    /// Records an enqueued update download so its completion can be matched.
    pub fn note_enqueued(&mut self, id: DownloadId, destination: PathBuf) {
        self.pending_install = Some((id, destination));
    }

    /// Handles a download-completion signal.
    ///
    /// Returns the package to hand to the installer when the completed id
    /// matches the pending update download. Idempotent: a signal arriving
    /// when no update download is pending is a no-op.
    pub fn complete_download(&mut self, id: DownloadId) -> Option<PathBuf> {
        match self.pending_install.take() {
            Some((pending, destination)) if pending == id => Some(destination),
            other => {
                self.pending_install = other;
                None
            }
        }
    }
}

impl Default for UpdateFlow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::types::DownloadInfo;
    use tempfile::TempDir;

    fn descriptor(code: u32, bundled: bool, link: Option<&str>) -> UpdateDescriptor {
        UpdateDescriptor {
            version_code: code,
            version_name: format!("0.0.{}", code),
            changelog: "Fixes".to_string(),
            download_info: DownloadInfo {
                use_bundled_update_link: bundled,
                update_link: link.map(str::to_string),
            },
        }
    }

    fn temp_prefs() -> (TempDir, PrefStore) {
        let dir = TempDir::new().expect("tempdir");
        let store = PrefStore::with_path(dir.path().join("prefs.toml"));
        (dir, store)
    }

    #[test]
    fn test_version_code_mapping() {
        assert_eq!(version_code("1.2.3"), 10_203);
        assert_eq!(version_code("v0.1.0"), 100);
        assert!(version_code("1.0.0") > version_code("0.99.99"));
    }

    #[test]
    fn test_same_version_no_action() {
        let (_dir, prefs) = temp_prefs();
        let mut flow = UpdateFlow::with_running_code(5);

        let decision = flow
            .evaluate(descriptor(5, true, None), &prefs, None)
            .expect("evaluate");
        assert_eq!(decision, UpdateDecision::UpToDate);
        assert!(flow.prompt().is_none());
    }

    #[test]
    fn test_older_version_no_action() {
        let (_dir, prefs) = temp_prefs();
        let mut flow = UpdateFlow::with_running_code(5);

        let decision = flow
            .evaluate(descriptor(4, true, None), &prefs, None)
            .expect("evaluate");
        assert_eq!(decision, UpdateDecision::UpToDate);
    }

    #[test]
    fn test_ignored_version_no_action() {
        let (_dir, mut prefs) = temp_prefs();
        prefs.set_ignoring(6, true).expect("set");

        let mut flow = UpdateFlow::with_running_code(5);
        let decision = flow
            .evaluate(descriptor(6, true, None), &prefs, None)
            .expect("evaluate");
        assert_eq!(decision, UpdateDecision::Ignored);
        assert!(flow.prompt().is_none());
    }

    #[test]
    fn test_malformed_descriptor_aborts() {
        let (_dir, prefs) = temp_prefs();
        let mut flow = UpdateFlow::with_running_code(5);

        let result = flow.evaluate(descriptor(6, false, None), &prefs, None);
        assert_eq!(result, Err(UpdateError::MalformedDescriptor));
        assert!(flow.prompt().is_none());
    }

    #[test]
    fn test_newer_version_prompts() {
        let (_dir, prefs) = temp_prefs();
        let mut flow = UpdateFlow::with_running_code(5);

        let decision = flow
            .evaluate(
                descriptor(6, false, Some("https://example.com/p.tar.gz")),
                &prefs,
                None,
            )
            .expect("evaluate");

        match decision {
            UpdateDecision::Prompt(prompt) => {
                assert_eq!(prompt.download_url, "https://example.com/p.tar.gz");
                assert_eq!(prompt.confirm_label(), "DOWNLOAD UPDATE");
                assert_eq!(prompt.title(), "Version 0.0.6 found!");
            }
            other => panic!("expected prompt, got {:?}", other),
        }
        assert!(flow.prompt().is_some());
    }

    #[test]
    fn test_confirm_with_local_package_installs() {
        let (_dir, mut prefs) = temp_prefs();
        let mut flow = UpdateFlow::with_running_code(5);

        let package = PathBuf::from("/tmp/tunegrab-0.0.6.tar.gz");
        let _ = flow
            .evaluate(descriptor(6, true, None), &prefs, Some(package.clone()))
            .expect("evaluate");
        assert_eq!(
            flow.prompt().expect("prompt").confirm_label(),
            "INSTALL UPDATE"
        );

        let action = flow.choose(PromptChoice::Confirm, &mut prefs);
        assert_eq!(action, UpdateAction::Install(package));
        assert!(flow.prompt().is_none());
    }

    #[test]
    fn test_confirm_without_package_downloads() {
        let (_dir, mut prefs) = temp_prefs();
        let mut flow = UpdateFlow::with_running_code(5);

        let _ = flow
            .evaluate(
                descriptor(6, false, Some("https://example.com/p.tar.gz")),
                &prefs,
                None,
            )
            .expect("evaluate");

        match flow.choose(PromptChoice::Confirm, &mut prefs) {
            UpdateAction::Download { url, title, .. } => {
                assert_eq!(url, "https://example.com/p.tar.gz");
                assert!(title.contains("0.0.6"));
            }
            other => panic!("expected download, got {:?}", other),
        }
    }

    #[test]
    fn test_dismiss_with_ignore_persists_flag() {
        let (_dir, mut prefs) = temp_prefs();
        let mut flow = UpdateFlow::with_running_code(5);

        let _ = flow
            .evaluate(descriptor(6, true, None), &prefs, None)
            .expect("evaluate");
        let action = flow.choose(PromptChoice::Dismiss { ignore: true }, &mut prefs);

        assert_eq!(action, UpdateAction::None);
        assert!(prefs.is_ignoring(6));

        // The next evaluation of the same version is silent.
        let decision = flow
            .evaluate(descriptor(6, true, None), &prefs, None)
            .expect("evaluate");
        assert_eq!(decision, UpdateDecision::Ignored);
    }

    #[test]
    fn test_dismiss_ignore_clears_stale_package() {
        let (_dir, mut prefs) = temp_prefs();
        let mut flow = UpdateFlow::with_running_code(5);

        let package = PathBuf::from("/tmp/tunegrab-0.0.6.tar.gz");
        let _ = flow
            .evaluate(descriptor(6, true, None), &prefs, Some(package.clone()))
            .expect("evaluate");
        let action = flow.choose(PromptChoice::Dismiss { ignore: true }, &mut prefs);

        assert_eq!(action, UpdateAction::RemoveStalePackage(package));
    }

    #[test]
    fn test_dismiss_without_ignore_keeps_version_eligible() {
        let (_dir, mut prefs) = temp_prefs();
        let mut flow = UpdateFlow::with_running_code(5);

        let _ = flow
            .evaluate(descriptor(6, true, None), &prefs, None)
            .expect("evaluate");
        let action = flow.choose(PromptChoice::Dismiss { ignore: false }, &mut prefs);

        assert_eq!(action, UpdateAction::None);
        assert!(!prefs.is_ignoring(6));
    }

    #[test]
    fn test_choice_without_prompt_is_noop() {
        let (_dir, mut prefs) = temp_prefs();
        let mut flow = UpdateFlow::with_running_code(5);

        assert_eq!(
            flow.choose(PromptChoice::Confirm, &mut prefs),
            UpdateAction::None
        );
    }

    #[test]
    fn test_completion_signal_is_idempotent() {
        let mut flow = UpdateFlow::with_running_code(5);
        let id = DownloadId(7);
        let destination = PathBuf::from("/tmp/tunegrab-0.0.6.tar.gz");

        // Signal with nothing pending: no-op.
        assert_eq!(flow.complete_download(id), None);

        flow.note_enqueued(id, destination.clone());
        // Unrelated download completing: still pending.
        assert_eq!(flow.complete_download(DownloadId(99)), None);

        assert_eq!(flow.complete_download(id), Some(destination));
        // Second signal for the same id: already cleared.
        assert_eq!(flow.complete_download(id), None);
    }

    #[test]
    fn test_once_out_of_bounds() {
        // 1-in-1 is always true; higher odds at least never panic.
        assert!(once_out_of(1));
        for _ in 0..16 {
            let _ = once_out_of(UPDATE_CHECK_ODDS);
        }
    }
}
