//! Catalog search: response models and the search flow state machine.

pub mod flow;
pub mod types;

pub use flow::{SearchError, SearchFlow, SearchOutcome, SearchState, ERROR_CLEAR_DELAY};
pub use types::{ItemId, PageInfo, SearchItem, SearchResponse, Snippet};
