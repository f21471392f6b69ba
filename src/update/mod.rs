//! In-app update checking: descriptor models and the decision flow.

pub mod flow;
pub mod types;

pub use flow::{
    once_out_of, running_version_code, version_code, PromptChoice, UpdateAction, UpdateDecision,
    UpdateFlow, UpdatePrompt, UPDATE_CHECK_ODDS, VERSION,
};
pub use types::{DownloadInfo, UpdateDescriptor, UpdateError, BUNDLED_PACKAGE_URL};
