//! Value normalization.
//!
//! Turns one candidate object into a displayable reading. Every step is
//! best-effort: unreadable fields fall back through the legacy backend to
//! fixed defaults, unparsable text reads as zero, and nothing here can
//! fail the caller.

use once_cell::sync::Lazy;
use regex::Regex;

use ax_adapter::{AttrValue, AxNodeHandle, MsaaBackend, Probe, UiNode};
use axprogress_core_types::StateFlag;

use crate::model::{ProgressCandidate, ProgressReading, StatusSuffix};

static NUMERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.?\d*").unwrap());

/// First integer-or-decimal numeral in the text, comma decimal separator
/// normalized to a period. Anything unparsable reads as `0.0`.
pub fn parse_numeric(raw: &str) -> f64 {
    let normalized = raw.replace(',', ".");
    NUMERAL
        .find(&normalized)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

pub(crate) fn attr_number(value: &AttrValue) -> f64 {
    match value {
        AttrValue::Number(n) => *n,
        AttrValue::Text(text) => parse_numeric(text),
    }
}

/// Normalize one object into a percentage reading.
///
/// A name that already carries a percent marker bypasses the numeric path
/// entirely and is reported verbatim.
pub fn extract(node: &AxNodeHandle) -> ProgressReading {
    if let Some(name) = node.name().found() {
        if !name.is_empty() && name.contains('%') {
            return ProgressReading::Verbatim(name);
        }
    }

    let msaa = node.msaa();

    let current = node
        .value()
        .map(|value| attr_number(&value))
        .or_else(|| match msaa.as_ref() {
            Some(backend) => backend.acc_value().map(|raw| parse_numeric(&raw)),
            None => Probe::Absent,
        })
        .found()
        .unwrap_or(0.0);

    let max = node
        .max_value()
        .map(|value| attr_number(&value))
        .or_else(|| match msaa.as_ref() {
            Some(backend) => backend.acc_maximum().map(|raw| parse_numeric(&raw)),
            None => Probe::Absent,
        })
        .found()
        .unwrap_or(100.0);

    let max = if max <= 0.0 { 100.0 } else { max };
    let current = if current < 0.0 { 0.0 } else { current };

    let percent = ((current / max) * 100.0).clamp(0.0, 100.0);
    let percent = (percent * 10.0).round() / 10.0;

    let status = match node.states().found() {
        Some(states) if states.contains(StateFlag::Busy) => StatusSuffix::Busy,
        Some(states) if states.contains(StateFlag::Unavailable) => StatusSuffix::Unavailable,
        _ => StatusSuffix::None,
    };

    ProgressReading::Measured { percent, status }
}

/// Display text for a located candidate: preformatted text wins, everything
/// else goes through extraction.
pub fn message_for(candidate: &ProgressCandidate) -> String {
    match &candidate.preformatted {
        Some(text) => text.clone(),
        None => extract(&candidate.node).message(),
    }
}
