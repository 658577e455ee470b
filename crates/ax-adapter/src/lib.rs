//! Host accessibility platform port.
//!
//! The host exposes a tree of inspectable UI objects. Everything here is
//! read-only: per-field probes that never panic, optional backend handles
//! for the two legacy inspection surfaces, and a fixture tree used by tests
//! and the CLI demo mode in place of a live host.

pub mod errors;
pub mod fixture;
pub mod ports;
pub mod probe;

pub use errors::AdapterError;
pub use fixture::{FixtureField, FixtureMsaa, FixtureNode, FixtureTree, FixtureUia};
pub use ports::{AccessTree, AttrValue, AxNodeHandle, MsaaBackend, UiaBackend, UiNode};
pub use probe::Probe;
