//! Progress perceiver: locates progress-indicator objects in the host tree
//! and normalizes their values into displayable percentages.

pub mod extractor;
pub mod locator;
pub mod model;

pub use extractor::{extract, message_for, parse_numeric};
pub use locator::{find_progress_indicators, PROGRESS_HOST_WINDOW_CLASS};
pub use model::{ProgressCandidate, ProgressReading, StatusSuffix};
