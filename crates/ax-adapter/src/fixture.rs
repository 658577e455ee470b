//! In-memory fixture tree.
//!
//! Stands in for a live host platform in tests and in the CLI demo mode.
//! Nodes can be killed to simulate destroyed host objects and individual
//! field reads can be made to fail, which is how the traversal's
//! skip-and-continue behavior is exercised.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use axprogress_core_types::{ControlTypeId, Role, StateFlag, StateSet};

use crate::errors::AdapterError;
use crate::ports::{AccessTree, AttrValue, AxNodeHandle, MsaaBackend, UiaBackend, UiNode};
use crate::probe::Probe;

/// Field selector for injected read failures.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FixtureField {
    Name,
    Role,
    Value,
    MaxValue,
    States,
    WindowClass,
    Children,
}

/// UI-Automation-style backend of a fixture node.
#[derive(Clone, Debug)]
pub struct FixtureUia {
    control_type: ControlTypeId,
}

impl FixtureUia {
    pub fn new(control_type: ControlTypeId) -> Self {
        Self { control_type }
    }
}

impl UiaBackend for FixtureUia {
    fn control_type(&self) -> Probe<ControlTypeId> {
        Probe::Found(self.control_type)
    }
}

/// IAccessible-style backend of a fixture node.
#[derive(Clone, Debug, Default)]
pub struct FixtureMsaa {
    role: Option<Role>,
    value: Option<String>,
    maximum: Option<String>,
}

impl FixtureMsaa {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_maximum(mut self, maximum: impl Into<String>) -> Self {
        self.maximum = Some(maximum.into());
        self
    }
}

impl MsaaBackend for FixtureMsaa {
    fn acc_role(&self) -> Probe<Role> {
        Probe::from_option(self.role.clone())
    }

    fn acc_value(&self) -> Probe<String> {
        Probe::from_option(self.value.clone())
    }

    fn acc_maximum(&self) -> Probe<String> {
        Probe::from_option(self.maximum.clone())
    }
}

/// One object in the fixture tree.
#[derive(Debug)]
pub struct FixtureNode {
    name: Option<String>,
    role: Option<Role>,
    value: Option<AttrValue>,
    max_value: Option<AttrValue>,
    states: Option<StateSet>,
    window_class: Option<String>,
    uia: Option<Arc<FixtureUia>>,
    msaa: Option<Arc<FixtureMsaa>>,
    children: Vec<Arc<FixtureNode>>,
    failing: Vec<FixtureField>,
    alive: AtomicBool,
}

impl FixtureNode {
    pub fn new() -> Self {
        Self {
            name: None,
            role: None,
            value: None,
            max_value: None,
            states: None,
            window_class: None,
            uia: None,
            msaa: None,
            children: Vec::new(),
            failing: Vec::new(),
            alive: AtomicBool::new(true),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_value(mut self, value: AttrValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_max_value(mut self, max_value: AttrValue) -> Self {
        self.max_value = Some(max_value);
        self
    }

    pub fn with_state(mut self, flag: StateFlag) -> Self {
        self.states.get_or_insert_with(StateSet::new).insert(flag);
        self
    }

    pub fn with_window_class(mut self, window_class: impl Into<String>) -> Self {
        self.window_class = Some(window_class.into());
        self
    }

    pub fn with_uia_control_type(mut self, control_type: ControlTypeId) -> Self {
        self.uia = Some(Arc::new(FixtureUia::new(control_type)));
        self
    }

    pub fn with_msaa(mut self, msaa: FixtureMsaa) -> Self {
        self.msaa = Some(Arc::new(msaa));
        self
    }

    pub fn with_child(mut self, child: impl Into<Arc<FixtureNode>>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Make the given field read fail, leaving the rest readable.
    pub fn with_failing(mut self, field: FixtureField) -> Self {
        if !self.failing.contains(&field) {
            self.failing.push(field);
        }
        self
    }

    /// Simulate destruction of the underlying host object: every
    /// subsequent probe fails and the backends become unreachable.
    pub fn kill(&self) {
        self.alive.store(false, Ordering::Relaxed);
    }

    pub fn revive(&self) {
        self.alive.store(true, Ordering::Relaxed);
    }

    fn probe_field<T: Clone>(&self, field: FixtureField, value: &Option<T>) -> Probe<T> {
        if !self.alive.load(Ordering::Relaxed) {
            return Probe::failed("object handle is dead");
        }
        if self.failing.contains(&field) {
            return Probe::failed(format!("simulated read failure: {field:?}"));
        }
        Probe::from_option(value.clone())
    }
}

impl Default for FixtureNode {
    fn default() -> Self {
        Self::new()
    }
}

impl UiNode for FixtureNode {
    fn name(&self) -> Probe<String> {
        self.probe_field(FixtureField::Name, &self.name)
    }

    fn role(&self) -> Probe<Role> {
        self.probe_field(FixtureField::Role, &self.role)
    }

    fn value(&self) -> Probe<AttrValue> {
        self.probe_field(FixtureField::Value, &self.value)
    }

    fn max_value(&self) -> Probe<AttrValue> {
        self.probe_field(FixtureField::MaxValue, &self.max_value)
    }

    fn states(&self) -> Probe<StateSet> {
        self.probe_field(FixtureField::States, &self.states)
    }

    fn window_class(&self) -> Probe<String> {
        self.probe_field(FixtureField::WindowClass, &self.window_class)
    }

    fn children(&self) -> Probe<Vec<AxNodeHandle>> {
        if !self.alive.load(Ordering::Relaxed) {
            return Probe::failed("object handle is dead");
        }
        if self.failing.contains(&FixtureField::Children) {
            return Probe::failed("simulated read failure: Children");
        }
        Probe::Found(
            self.children
                .iter()
                .map(|child| Arc::clone(child) as AxNodeHandle)
                .collect(),
        )
    }

    fn uia(&self) -> Option<Arc<dyn UiaBackend>> {
        if !self.alive.load(Ordering::Relaxed) {
            return None;
        }
        self.uia
            .as_ref()
            .map(|backend| Arc::clone(backend) as Arc<dyn UiaBackend>)
    }

    fn msaa(&self) -> Option<Arc<dyn MsaaBackend>> {
        if !self.alive.load(Ordering::Relaxed) {
            return None;
        }
        self.msaa
            .as_ref()
            .map(|backend| Arc::clone(backend) as Arc<dyn MsaaBackend>)
    }
}

/// A fixture-backed host tree.
#[derive(Debug)]
pub struct FixtureTree {
    root: Arc<FixtureNode>,
}

impl FixtureTree {
    pub fn new(root: impl Into<Arc<FixtureNode>>) -> Self {
        Self { root: root.into() }
    }

    /// Root handle, kept concrete so tests can kill individual nodes.
    pub fn root(&self) -> Arc<FixtureNode> {
        Arc::clone(&self.root)
    }

    /// Decode a tree from its JSON document form.
    pub fn from_json(document: &str) -> Result<Self, AdapterError> {
        let spec: NodeSpec =
            serde_json::from_str(document).map_err(|err| AdapterError::Decode(err.to_string()))?;
        let root = build_node(spec);
        debug!(nodes = count_nodes(&root), "fixture tree decoded");
        Ok(Self { root })
    }
}

impl AccessTree for FixtureTree {
    fn foreground(&self) -> Result<AxNodeHandle, AdapterError> {
        Ok(Arc::clone(&self.root) as AxNodeHandle)
    }

    fn platform_name(&self) -> &str {
        "fixture"
    }
}

#[derive(Deserialize)]
struct NodeSpec {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    role: Option<Role>,
    #[serde(default)]
    value: Option<AttrValue>,
    #[serde(default)]
    max_value: Option<AttrValue>,
    #[serde(default)]
    states: Option<Vec<StateFlag>>,
    #[serde(default)]
    window_class: Option<String>,
    #[serde(default)]
    uia: Option<UiaSpec>,
    #[serde(default)]
    msaa: Option<MsaaSpec>,
    #[serde(default)]
    children: Vec<NodeSpec>,
}

#[derive(Deserialize)]
struct UiaSpec {
    control_type: ControlTypeId,
}

#[derive(Deserialize)]
struct MsaaSpec {
    #[serde(default)]
    role: Option<Role>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    maximum: Option<String>,
}

fn build_node(spec: NodeSpec) -> Arc<FixtureNode> {
    let mut node = FixtureNode::new();
    node.name = spec.name;
    node.role = spec.role;
    node.value = spec.value;
    node.max_value = spec.max_value;
    node.states = spec.states.map(|flags| flags.into_iter().collect());
    node.window_class = spec.window_class;
    node.uia = spec
        .uia
        .map(|uia| Arc::new(FixtureUia::new(uia.control_type)));
    node.msaa = spec.msaa.map(|msaa| {
        Arc::new(FixtureMsaa {
            role: msaa.role,
            value: msaa.value,
            maximum: msaa.maximum,
        })
    });
    node.children = spec.children.into_iter().map(build_node).collect();
    Arc::new(node)
}

fn count_nodes(node: &Arc<FixtureNode>) -> usize {
    1 + node.children.iter().map(count_nodes).sum::<usize>()
}
