use ax_adapter::AxNodeHandle;

/// A located progress indicator, optionally carrying text that is already
/// human-readable and needs no numeric extraction.
#[derive(Clone)]
pub struct ProgressCandidate {
    pub node: AxNodeHandle,
    pub preformatted: Option<String>,
}

impl ProgressCandidate {
    pub fn preformatted(node: AxNodeHandle, text: impl Into<String>) -> Self {
        Self {
            node,
            preformatted: Some(text.into()),
        }
    }

    pub fn unparsed(node: AxNodeHandle) -> Self {
        Self {
            node,
            preformatted: None,
        }
    }
}

/// Activity suffix appended to a measured percentage.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusSuffix {
    None,
    Busy,
    Unavailable,
}

impl StatusSuffix {
    pub fn label(self) -> &'static str {
        match self {
            StatusSuffix::None => "",
            StatusSuffix::Busy => " (busy)",
            StatusSuffix::Unavailable => " (unavailable)",
        }
    }
}

/// Normalized reading for one progress indicator.
#[derive(Clone, Debug, PartialEq)]
pub enum ProgressReading {
    /// The object already carried display-ready text; used verbatim.
    Verbatim(String),
    /// Percentage computed from value/maximum, clamped to [0, 100].
    Measured { percent: f64, status: StatusSuffix },
}

impl ProgressReading {
    pub fn message(&self) -> String {
        match self {
            ProgressReading::Verbatim(text) => text.clone(),
            ProgressReading::Measured { percent, status } => {
                format!("{percent:.1}% complete{}", status.label())
            }
        }
    }
}
