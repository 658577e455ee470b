use std::fmt;

/// Role reported for a node in the host accessibility tree.
///
/// Hosts disagree on role vocabularies; everything this crate does not
/// recognize lands in `Custom` (named) or `Unknown` (unnamed).
#[cfg_attr(
    feature = "serde-full",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Role {
    Window,
    Pane,
    Dialog,
    Group,
    Button,
    CheckBox,
    RadioButton,
    StaticText,
    Link,
    List,
    ListItem,
    ScrollBar,
    Slider,
    SpinButton,
    ProgressBar,
    Custom(String),
    Unknown,
}

impl Role {
    pub fn is_progress_bar(&self) -> bool {
        matches!(self, Role::ProgressBar)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Window => write!(f, "window"),
            Role::Pane => write!(f, "pane"),
            Role::Dialog => write!(f, "dialog"),
            Role::Group => write!(f, "group"),
            Role::Button => write!(f, "button"),
            Role::CheckBox => write!(f, "check_box"),
            Role::RadioButton => write!(f, "radio_button"),
            Role::StaticText => write!(f, "static_text"),
            Role::Link => write!(f, "link"),
            Role::List => write!(f, "list"),
            Role::ListItem => write!(f, "list_item"),
            Role::ScrollBar => write!(f, "scroll_bar"),
            Role::Slider => write!(f, "slider"),
            Role::SpinButton => write!(f, "spin_button"),
            Role::ProgressBar => write!(f, "progress_bar"),
            Role::Custom(name) => write!(f, "custom:{name}"),
            Role::Unknown => write!(f, "unknown"),
        }
    }
}

/// A single state bit a host object may carry.
#[cfg_attr(
    feature = "serde-full",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum StateFlag {
    Busy,
    Unavailable,
    Focused,
    Selected,
    ReadOnly,
    Invisible,
    Offscreen,
}

/// The state set reported for one object.
///
/// Hosts report states as an unordered bag; membership is all that matters.
#[cfg_attr(
    feature = "serde-full",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StateSet(Vec<StateFlag>);

impl StateSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, flag: StateFlag) {
        if !self.0.contains(&flag) {
            self.0.push(flag);
        }
    }

    pub fn contains(&self, flag: StateFlag) -> bool {
        self.0.contains(&flag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<StateFlag> for StateSet {
    fn from_iter<I: IntoIterator<Item = StateFlag>>(iter: I) -> Self {
        let mut set = StateSet::new();
        for flag in iter {
            set.insert(flag);
        }
        set
    }
}

/// Numeric control-type identifier reported by a UI-Automation-style backend.
#[cfg_attr(
    feature = "serde-full",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ControlTypeId(pub i32);

impl ControlTypeId {
    pub const SCROLL_BAR: ControlTypeId = ControlTypeId(50014);
    pub const SLIDER: ControlTypeId = ControlTypeId(50015);
    pub const PROGRESS_BAR: ControlTypeId = ControlTypeId(50012);

    pub fn is_progress_bar(self) -> bool {
        self == Self::PROGRESS_BAR
    }
}

impl fmt::Display for ControlTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "control-type:{}", self.0)
    }
}

/// Composite identity key used to deduplicate candidate objects.
///
/// Each component is read through a probe; unreadable fields contribute
/// `None`, so two fully unreadable objects compare equal.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeKey {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub window_class: Option<String>,
}

impl NodeKey {
    pub fn new(name: Option<String>, role: Option<Role>, window_class: Option<String>) -> Self {
        Self {
            name,
            role,
            window_class,
        }
    }
}
