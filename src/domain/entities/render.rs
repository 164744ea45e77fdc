//! Rendered output of the host's message content component.

use serde::Serialize;
use serde_json::{Map, Value};

/// One child of a rendered node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Child {
    Text(String),
    Node(RenderNode),
}

/// Children of a rendered node.
///
/// Mirrors the three shapes a component tree allows: nothing, a lone child,
/// or an ordered sequence.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Children {
    #[default]
    Empty,
    Single(Box<Child>),
    Many(Vec<Child>),
}

impl Children {
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Single(_) => 1,
            Self::Many(children) => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append without touching existing children.
    pub fn push(&mut self, child: Child) {
        *self = match std::mem::take(self) {
            Self::Empty => Self::Many(vec![child]),
            Self::Single(existing) => Self::Many(vec![*existing, child]),
            Self::Many(mut children) => {
                children.push(child);
                Self::Many(children)
            }
        };
    }
}

/// A rendered element.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RenderNode {
    /// Element kind, e.g. `"span"` or a component name
    pub kind: String,

    pub props: Map<String, Value>,

    pub children: Children,
}

impl RenderNode {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn with_prop(mut self, key: &str, value: Value) -> Self {
        self.props.insert(key.to_string(), value);
        self
    }

    pub fn with_child(mut self, child: Child) -> Self {
        self.children.push(child);
        self
    }
}

/// A completed render: the arguments the component was called with and the
/// node it produced. Render interceptors may only decorate `output`.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCall {
    pub args: Vec<Value>,
    pub output: RenderNode,
}
