//! Session layer: pins located progress objects, drives the periodic
//! refresh, and pushes joined readings to the display surface.

pub mod errors;
pub mod model;
pub mod ports;
pub mod session;
pub mod snapshot;

pub use errors::SessionError;
pub use model::SessionConfig;
pub use ports::DisplaySink;
pub use session::{
    ProgressSession, SessionCommand, LOADING_PLACEHOLDER, NO_PROGRESS_MESSAGE,
};
pub use snapshot::PinnedSet;
