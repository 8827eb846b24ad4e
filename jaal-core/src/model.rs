use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

pub const DEFAULT_COLOR: &str = "#97C2FC";
pub const DEFAULT_NODE_SIZE: f64 = 7.0;
pub const DEFAULT_EDGE_SIZE: f64 = 1.0;

/// A single cell of the source tables.
///
/// Equality and hashing are structural so values can key a colour mapping:
/// numbers compare by bit pattern with `-0.0` folded into `0.0` and every NaN
/// treated as the same value. Query comparisons use their own, looser rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl AttrValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Null => "null",
            AttrValue::Bool(_) => "boolean",
            AttrValue::Number(_) => "number",
            AttrValue::Text(_) => "text",
        }
    }

    fn number_bits(n: f64) -> u64 {
        if n == 0.0 {
            0.0f64.to_bits()
        } else if n.is_nan() {
            f64::NAN.to_bits()
        } else {
            n.to_bits()
        }
    }
}

impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttrValue::Null, AttrValue::Null) => true,
            (AttrValue::Bool(a), AttrValue::Bool(b)) => a == b,
            (AttrValue::Number(a), AttrValue::Number(b)) => {
                Self::number_bits(*a) == Self::number_bits(*b)
            }
            (AttrValue::Text(a), AttrValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for AttrValue {}

impl Hash for AttrValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            AttrValue::Null => {}
            AttrValue::Bool(b) => b.hash(state),
            AttrValue::Number(n) => Self::number_bits(*n).hash(state),
            AttrValue::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Null => write!(f, "null"),
            AttrValue::Bool(b) => write!(f, "{}", b),
            AttrValue::Number(n) => write!(f, "{}", n),
            AttrValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Node,
    Edge,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Node => "node",
            ElementKind::Edge => "edge",
        }
    }
}

/// Anything a query can be evaluated against.
pub trait Record {
    fn id(&self) -> &str;

    /// Looks up a built-in field or a source-table attribute by name.
    /// `None` means the name is unknown for this record.
    fn attribute(&self, name: &str) -> Option<AttrValue>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub title: String,
    pub size: f64,
    pub color: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(flatten)]
    pub attributes: IndexMap<String, AttrValue>,
}

impl Node {
    pub const BUILTIN_FIELDS: [&'static str; 6] = ["id", "label", "title", "size", "color", "hidden"];

    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            title: id.clone(),
            id,
            size: DEFAULT_NODE_SIZE,
            color: DEFAULT_COLOR.to_string(),
            hidden: false,
            attributes: IndexMap::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self.title = self.label.clone();
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

impl Record for Node {
    fn id(&self) -> &str {
        &self.id
    }

    fn attribute(&self, name: &str) -> Option<AttrValue> {
        match name {
            "id" => Some(AttrValue::Text(self.id.clone())),
            "label" => Some(AttrValue::Text(self.label.clone())),
            "title" => Some(AttrValue::Text(self.title.clone())),
            "size" => Some(AttrValue::Number(self.size)),
            "color" => Some(AttrValue::Text(self.color.clone())),
            "hidden" => Some(AttrValue::Bool(self.hidden)),
            _ => self.attributes.get(name).cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeColor {
    pub color: String,
}

impl Default for EdgeColor {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub from: String,
    pub to: String,
    pub width: f64,
    pub color: EdgeColor,
    #[serde(flatten)]
    pub attributes: IndexMap<String, AttrValue>,
}

impl Edge {
    pub const BUILTIN_FIELDS: [&'static str; 5] = ["id", "from", "to", "width", "color"];

    pub fn new(id: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            width: DEFAULT_EDGE_SIZE,
            color: EdgeColor::default(),
            attributes: IndexMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

impl Record for Edge {
    fn id(&self) -> &str {
        &self.id
    }

    fn attribute(&self, name: &str) -> Option<AttrValue> {
        match name {
            "id" => Some(AttrValue::Text(self.id.clone())),
            "from" => Some(AttrValue::Text(self.from.clone())),
            "to" => Some(AttrValue::Text(self.to.clone())),
            "width" => Some(AttrValue::Number(self.width)),
            "color" => Some(AttrValue::Text(self.color.color.clone())),
            _ => self.attributes.get(name).cloned(),
        }
    }
}

/// Nodes and edges intended for display, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphData {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn node_ids(&self) -> HashSet<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    pub fn edge_ids(&self) -> HashSet<&str> {
        self.edges.iter().map(|e| e.id.as_str()).collect()
    }

    pub fn visible_node_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.hidden).count()
    }
}

/// Observed range of one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    /// Min/max over the finite values, or `None` when there are none.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<Bounds>, v| match acc {
                None => Some(Bounds { min: v, max: v }),
                Some(b) => Some(Bounds {
                    min: b.min.min(v),
                    max: b.max.max(v),
                }),
            })
    }

    /// Linearly maps `value` from `[min, max]` onto `[0, range]`.
    /// A degenerate range (`min == max`) scales everything to 0.
    pub fn scale(&self, value: f64, range: f64) -> f64 {
        let span = self.max - self.min;
        if span == 0.0 || !span.is_finite() {
            return 0.0;
        }
        range * (value - self.min) / span
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalingBounds {
    pub node: IndexMap<String, Bounds>,
    pub edge: IndexMap<String, Bounds>,
}

impl ScalingBounds {
    pub fn get(&self, kind: ElementKind, attribute: &str) -> Option<Bounds> {
        match kind {
            ElementKind::Node => self.node.get(attribute).copied(),
            ElementKind::Edge => self.edge.get(attribute).copied(),
        }
    }
}
