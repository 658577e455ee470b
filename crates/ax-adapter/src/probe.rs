//! Capability-checked attribute reads.
//!
//! Host objects may or may not expose a given field, and reading one may
//! fail outright when the underlying object has been destroyed. Both cases
//! mean "unknown" to callers; `Failed` additionally carries a reason for
//! logs. A probe never panics and a failed probe never aborts a traversal.

/// Outcome of reading one optional field from a host object.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Probe<T> {
    /// The field exists and was read.
    Found(T),
    /// The object does not expose this field.
    Absent,
    /// The read itself failed (dead handle, backend error).
    Failed(String),
}

impl<T> Probe<T> {
    pub fn failed(reason: impl Into<String>) -> Self {
        Probe::Failed(reason.into())
    }

    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(value) => Probe::Found(value),
            None => Probe::Absent,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Probe::Found(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Probe::Failed(_))
    }

    /// Collapse to `Option`, treating `Absent` and `Failed` alike.
    pub fn found(self) -> Option<T> {
        match self {
            Probe::Found(value) => Some(value),
            Probe::Absent | Probe::Failed(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Probe<U> {
        match self {
            Probe::Found(value) => Probe::Found(f(value)),
            Probe::Absent => Probe::Absent,
            Probe::Failed(reason) => Probe::Failed(reason),
        }
    }

    /// Fall back to another probe when this one found nothing.
    pub fn or_else(self, f: impl FnOnce() -> Probe<T>) -> Probe<T> {
        match self {
            Probe::Found(value) => Probe::Found(value),
            Probe::Absent | Probe::Failed(_) => f(),
        }
    }
}
