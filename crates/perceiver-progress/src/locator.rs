//! Tree search for progress-indicator objects.
//!
//! Breadth-first walk of the foreground hierarchy with an explicit
//! worklist. Detection rules are applied independently per object — one
//! object can yield several candidates — and any probe failure skips that
//! rule for that object, never the walk itself.

use std::collections::VecDeque;

use tracing::debug;

use ax_adapter::{AxNodeHandle, MsaaBackend, Probe, UiNode, UiaBackend};

use crate::extractor::attr_number;
use crate::model::ProgressCandidate;

/// Window class of the shell container known to host file-operation
/// progress indicators.
pub const PROGRESS_HOST_WINDOW_CLASS: &str = "OperationStatusWindow";

/// Locate progress-indicator candidates under `root`, parent before child.
///
/// Returns an empty sequence when nothing matches; two walks over an
/// unchanged tree yield the same candidates in the same order.
pub fn find_progress_indicators(root: AxNodeHandle) -> Vec<ProgressCandidate> {
    let mut worklist = VecDeque::new();
    worklist.push_back(root);
    let mut candidates = Vec::new();

    while let Some(node) = worklist.pop_front() {
        detect_host_container(&node, &mut candidates);
        if let Some(candidate) = detect_uia(&node) {
            candidates.push(candidate);
        }
        if let Some(candidate) = detect_msaa(&node) {
            candidates.push(candidate);
        }
        if let Some(candidate) = detect_role(&node) {
            candidates.push(candidate);
        }
        if let Some(candidate) = detect_numeric_bounds(&node) {
            candidates.push(candidate);
        }

        match node.children() {
            Probe::Found(children) => worklist.extend(children),
            Probe::Failed(reason) => debug!(%reason, "children unreadable, subtree skipped"),
            Probe::Absent => {}
        }
    }

    candidates
}

/// Rule 1: a known progress-hosting container whose name already carries a
/// percent marker is itself a candidate; its immediate children are also
/// checked for nested progress-typed elements through the backend rules.
fn detect_host_container(node: &AxNodeHandle, out: &mut Vec<ProgressCandidate>) {
    let Some(class) = node.window_class().found() else {
        return;
    };
    if class != PROGRESS_HOST_WINDOW_CLASS {
        return;
    }

    if let Some(name) = node.name().found() {
        if !name.is_empty() && name.contains('%') {
            out.push(ProgressCandidate::preformatted(node.clone(), name));
        }
    }

    if let Some(children) = node.children().found() {
        for child in &children {
            if let Some(candidate) = detect_uia(child) {
                out.push(candidate);
            }
            if let Some(candidate) = detect_msaa(child) {
                out.push(candidate);
            }
        }
    }
}

/// Rule 2: UI-Automation backend reports a progress-bar control type and
/// the object carries a non-empty value. The value still needs parsing, so
/// the candidate is recorded unparsed.
fn detect_uia(node: &AxNodeHandle) -> Option<ProgressCandidate> {
    let backend = node.uia()?;
    let control_type = backend.control_type().found()?;
    if !control_type.is_progress_bar() {
        return None;
    }
    let value = node.value().found()?;
    if value.is_empty() {
        return None;
    }
    Some(ProgressCandidate::unparsed(node.clone()))
}

/// Rule 3: legacy backend reports a progress-bar role and its value query
/// already returns percent-marked text.
fn detect_msaa(node: &AxNodeHandle) -> Option<ProgressCandidate> {
    let backend = node.msaa()?;
    let role = backend.acc_role().found()?;
    if !role.is_progress_bar() {
        return None;
    }
    let value = backend.acc_value().found()?;
    if value.is_empty() || !value.contains('%') {
        return None;
    }
    Some(ProgressCandidate::preformatted(node.clone(), value))
}

/// Rule 4: the object's own role field says progress bar and a non-empty
/// value is present.
fn detect_role(node: &AxNodeHandle) -> Option<ProgressCandidate> {
    let role = node.role().found()?;
    if !role.is_progress_bar() {
        return None;
    }
    let value = node.value().found()?;
    if value.is_empty() {
        return None;
    }
    Some(ProgressCandidate::unparsed(node.clone()))
}

/// Rule 5: last-resort heuristic for indicators that declare no role but
/// expose numeric bounds. Deliberately broad — sliders and scrollbars with
/// a positive value match too; callers accept the over-match.
fn detect_numeric_bounds(node: &AxNodeHandle) -> Option<ProgressCandidate> {
    let value = node.value().found()?;
    node.max_value().found()?;
    if attr_number(&value) <= 0.0 {
        return None;
    }
    Some(ProgressCandidate::unparsed(node.clone()))
}
