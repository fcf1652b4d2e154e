//! Input data model for the traffic graph handed to us by the graph-building
//! collaborator.  Nodes and edges carry a metadata bag of telemetry and
//! classification attributes; the bag is a tagged union per key rather than a
//! dynamically-typed map so that a value of an unexpected shape degrades to
//! "absent" instead of failing the whole transformation.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Sentinel app name for traffic whose workload could not be resolved to an
/// app.  Nodes carrying it are never grouped.
pub const UNKNOWN_APP: &str = "unknown";

/// The traffic graph: logical node id -> node.  Iteration order is
/// insignificant; the cytoscape sorter imposes a deterministic order on
/// everything derived from it.
pub type TrafficMap = HashMap<String, Node>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum NodeType {
    #[serde(rename = "app")]
    App,
    #[serde(rename = "service")]
    Service,
    #[serde(rename = "workload")]
    Workload,
    #[serde(rename = "unknown")]
    Unknown,
}

impl NodeType {
    pub fn name(&self) -> &'static str {
        match self {
            NodeType::App => "app",
            NodeType::Service => "service",
            NodeType::Workload => "workload",
            NodeType::Unknown => "unknown",
        }
    }
}

impl Default for NodeType {
    fn default() -> NodeType {
        NodeType::Unknown
    }
}

/// One attribute value in a node/edge metadata bag.  The untagged rep lets
/// JSON fixtures read naturally (`"http": 10.0`, `"isDead": true`).  `Flag`
/// must precede `Rate` so booleans are not coerced to numbers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Flag(bool),
    Rate(f64),
    Text(String),
    /// Destination service names for a node, mirroring the collaborator's
    /// set-of-strings shape (name -> true).
    Services(BTreeMap<String, bool>),
}

/// Metadata bag.  All accessors are lossy on purpose: an absent key and a
/// value of the wrong shape are indistinguishable to callers, both yielding
/// the "omit this field" default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(HashMap<String, MetaValue>);

impl Metadata {
    pub fn set(&mut self, key: &str, value: MetaValue) {
        self.0.insert(key.to_string(), value);
    }

    /// Rate accessor; 0.0 on absence or shape mismatch.
    pub fn rate(&self, key: &str) -> f64 {
        self.maybe_rate(key).unwrap_or(0.0)
    }

    /// Rate accessor distinguishing presence, for attributes (like response
    /// time) that are emitted whenever the key exists, zero included.
    pub fn maybe_rate(&self, key: &str) -> Option<f64> {
        match self.0.get(key) {
            Some(MetaValue::Rate(rate)) => Some(*rate),
            _ => None,
        }
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.0.get(key) {
            Some(MetaValue::Flag(flag)) => Some(*flag),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(MetaValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn services(&self, key: &str) -> Option<&BTreeMap<String, bool>> {
        match self.0.get(key) {
            Some(MetaValue::Services(services)) => Some(services),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "nodeType", default)]
    pub node_type: NodeType,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub workload: String,
    #[serde(default)]
    pub app: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Node {
    pub fn new(id: &str, node_type: NodeType, namespace: &str) -> Node {
        Node {
            id: id.to_string(),
            node_type,
            namespace: namespace.to_string(),
            workload: String::new(),
            app: String::new(),
            version: String::new(),
            service: String::new(),
            metadata: Metadata::default(),
            edges: Vec::new(),
        }
    }
}

/// An observed edge from its owning node to `dest`.  The source is implied by
/// ownership; we deliberately store the destination as an id rather than a
/// reference so the output passes can own their collections outright.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Edge {
    #[serde(rename = "dest")]
    pub dest_id: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Edge {
    pub fn to(dest_id: &str) -> Edge {
        Edge {
            dest_id: dest_id.to_string(),
            metadata: Metadata::default(),
        }
    }
}
