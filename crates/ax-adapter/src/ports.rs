use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use axprogress_core_types::{ControlTypeId, NodeKey, Role, StateSet};

use crate::errors::AdapterError;
use crate::probe::Probe;

/// Shared handle to one object in the host tree.
pub type AxNodeHandle = Arc<dyn UiNode>;

/// A host attribute value, which may arrive textual or numeric.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Number(f64),
    Text(String),
}

impl AttrValue {
    /// An empty text value counts as "no value" for detection purposes.
    pub fn is_empty(&self) -> bool {
        match self {
            AttrValue::Number(_) => false,
            AttrValue::Text(text) => text.is_empty(),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Number(n) => write!(f, "{n}"),
            AttrValue::Text(text) => write!(f, "{text}"),
        }
    }
}

/// One inspectable object in the host accessibility tree.
///
/// Every accessor is a capability-checked probe: absence of a field is a
/// normal answer, never an error, and a read failure is reported in-band.
pub trait UiNode: Send + Sync {
    fn name(&self) -> Probe<String>;
    fn role(&self) -> Probe<Role>;
    fn value(&self) -> Probe<AttrValue>;
    fn max_value(&self) -> Probe<AttrValue>;
    fn states(&self) -> Probe<StateSet>;
    fn window_class(&self) -> Probe<String>;

    /// Immediate children in host order.
    fn children(&self) -> Probe<Vec<AxNodeHandle>>;

    /// UI-Automation-style backend handle, when the host exposes one.
    fn uia(&self) -> Option<Arc<dyn UiaBackend>> {
        None
    }

    /// IAccessible-style backend handle, when the host exposes one.
    fn msaa(&self) -> Option<Arc<dyn MsaaBackend>> {
        None
    }

    /// Cheap liveness check: a dead handle fails its role read.
    fn is_alive(&self) -> bool {
        !self.role().is_failed()
    }

    /// Composite identity key; unreadable fields contribute `None`.
    fn key(&self) -> NodeKey {
        NodeKey::new(
            self.name().found(),
            self.role().found(),
            self.window_class().found(),
        )
    }
}

/// UI-Automation-style backend surface.
pub trait UiaBackend: Send + Sync {
    fn control_type(&self) -> Probe<ControlTypeId>;
}

/// IAccessible-style backend surface.
pub trait MsaaBackend: Send + Sync {
    fn acc_role(&self) -> Probe<Role>;
    fn acc_value(&self) -> Probe<String>;
    fn acc_maximum(&self) -> Probe<String>;
}

/// Read-only view of the host tree.
pub trait AccessTree: Send + Sync {
    /// Root of the currently foregrounded hierarchy.
    fn foreground(&self) -> Result<AxNodeHandle, AdapterError>;

    /// Human-readable platform name (e.g. "fixture", "windows-uia").
    fn platform_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_attr_is_never_empty() {
        assert!(!AttrValue::Number(0.0).is_empty());
        assert!(AttrValue::Text(String::new()).is_empty());
        assert!(!AttrValue::Text("55%".into()).is_empty());
    }

    #[test]
    fn attr_display_stringifies_both_shapes() {
        assert_eq!(AttrValue::Number(42.0).to_string(), "42");
        assert_eq!(AttrValue::Text("42%".into()).to_string(), "42%");
    }
}
