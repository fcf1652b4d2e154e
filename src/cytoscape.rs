//! Conversion from the traffic graph to the CytoscapeJS elements-json model.
//!
//! Algorithm: walk the graph once, emitting one decorated node record per
//! graph node and one decorated edge record per graph edge.  An optional
//! second pass synthesizes compound (group) nodes boxing siblings that share
//! a namespace+app key.  A final sort makes the document reproducible and
//! guarantees group nodes precede the children that reference them, which
//! some consumers require when resolving `parent` lazily.
//!
//! The engine never computes telemetry; it only formats and conditionally
//! includes metrics already present in the graph's metadata bags.

use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;
use serde::Serialize;

use crate::errors::{GraphError, Result};
use crate::graph::{Edge, Metadata, Node, NodeType, TrafficMap, UNKNOWN_APP};
use crate::ident;
use crate::options::{GraphOptions, GraphType, GroupBy};

fn is_false(value: &bool) -> bool {
    !*value
}

/// One node record.  Rates are pre-formatted strings because the consuming
/// layer renders them verbatim; empty/false/absent fields are omitted from
/// the serialized document entirely.
#[derive(Clone, Debug, Default, Serialize)]
pub struct NodeData {
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parent: String,

    #[serde(rename = "nodeType")]
    pub node_type: NodeType,
    pub namespace: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub workload: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub app: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub service: String,
    #[serde(rename = "destServices", skip_serializing_if = "BTreeMap::is_empty")]
    pub dest_services: BTreeMap<String, bool>,
    #[serde(rename = "httpIn", skip_serializing_if = "String::is_empty")]
    pub http_in: String,
    #[serde(rename = "httpIn3XX", skip_serializing_if = "String::is_empty")]
    pub http_in_3xx: String,
    #[serde(rename = "httpIn4XX", skip_serializing_if = "String::is_empty")]
    pub http_in_4xx: String,
    #[serde(rename = "httpIn5XX", skip_serializing_if = "String::is_empty")]
    pub http_in_5xx: String,
    #[serde(rename = "httpOut", skip_serializing_if = "String::is_empty")]
    pub http_out: String,
    #[serde(rename = "tcpIn", skip_serializing_if = "String::is_empty")]
    pub tcp_in: String,
    #[serde(rename = "tcpOut", skip_serializing_if = "String::is_empty")]
    pub tcp_out: String,
    #[serde(rename = "hasCB", skip_serializing_if = "is_false")]
    pub has_cb: bool,
    #[serde(rename = "hasMissingSC", skip_serializing_if = "is_false")]
    pub has_missing_sc: bool,
    #[serde(rename = "hasVS", skip_serializing_if = "is_false")]
    pub has_vs: bool,
    #[serde(rename = "isDead", skip_serializing_if = "is_false")]
    pub is_dead: bool,
    #[serde(rename = "isGroup", skip_serializing_if = "String::is_empty")]
    pub is_group: String,
    #[serde(rename = "isInaccessible", skip_serializing_if = "is_false")]
    pub is_inaccessible: bool,
    #[serde(rename = "isMisconfigured", skip_serializing_if = "String::is_empty")]
    pub is_misconfigured: String,
    #[serde(rename = "isOutside", skip_serializing_if = "is_false")]
    pub is_outside: bool,
    #[serde(rename = "isRoot", skip_serializing_if = "is_false")]
    pub is_root: bool,
    #[serde(rename = "isServiceEntry", skip_serializing_if = "String::is_empty")]
    pub is_service_entry: String,
    #[serde(rename = "isUnused", skip_serializing_if = "is_false")]
    pub is_unused: bool,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct EdgeData {
    pub id: String,
    pub source: String,
    pub target: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub http: String,
    #[serde(rename = "http3XX", skip_serializing_if = "String::is_empty")]
    pub http_3xx: String,
    #[serde(rename = "http4XX", skip_serializing_if = "String::is_empty")]
    pub http_4xx: String,
    #[serde(rename = "http5XX", skip_serializing_if = "String::is_empty")]
    pub http_5xx: String,
    #[serde(rename = "httpPercentErr", skip_serializing_if = "String::is_empty")]
    pub http_percent_err: String,
    #[serde(rename = "httpPercentReq", skip_serializing_if = "String::is_empty")]
    pub http_percent_req: String,
    #[serde(rename = "responseTime", skip_serializing_if = "String::is_empty")]
    pub response_time: String,
    #[serde(rename = "isMTLS", skip_serializing_if = "is_false")]
    pub is_mtls: bool,
    #[serde(rename = "isUnused", skip_serializing_if = "is_false")]
    pub is_unused: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tcp: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct NodeWrapper {
    pub data: NodeData,
}

#[derive(Clone, Debug, Serialize)]
pub struct EdgeWrapper {
    pub data: EdgeData,
}

#[derive(Clone, Debug, Serialize)]
pub struct Elements {
    pub nodes: Vec<NodeWrapper>,
    pub edges: Vec<EdgeWrapper>,
}

/// The assembled presentation document.
#[derive(Clone, Debug, Serialize)]
pub struct CytoscapeDocument {
    pub timestamp: i64,
    pub duration: i64,
    #[serde(rename = "graphType")]
    pub graph_type: String,
    pub elements: Elements,
}

/// Transform a traffic graph into a presentation document.  The graph is
/// read-only throughout; output collections are created fresh per call, so
/// concurrent invocations over independent graphs are safe.
pub fn transform(traffic: &TrafficMap, options: &GraphOptions) -> Result<CytoscapeDocument> {
    let (mut nodes, mut edges) = build_elements(traffic)?;

    // Compound nodes, gated on a graph type where the grouping is meaningful.
    match options.group_by {
        GroupBy::App if options.graph_type != GraphType::Service => {
            group_by_app(&mut nodes);
        }
        GroupBy::Version if options.graph_type == GraphType::VersionedApp => {
            group_by_version(&mut nodes);
        }
        _ => {}
    }

    sort_elements(&mut nodes, &mut edges);

    trace!(
        nodes = nodes.len(),
        edges = edges.len(),
        "assembled cytoscape document"
    );

    Ok(CytoscapeDocument {
        timestamp: options.query_time,
        duration: options.duration_secs,
        graph_type: options.graph_type.name().to_string(),
        elements: Elements { nodes, edges },
    })
}

fn build_elements(traffic: &TrafficMap) -> Result<(Vec<NodeWrapper>, Vec<EdgeWrapper>)> {
    let mut nodes = Vec::with_capacity(traffic.len());
    let mut edges = Vec::new();

    for (id, node) in traffic {
        let mut data = NodeData {
            id: ident::node_id(id),
            node_type: node.node_type,
            namespace: node.namespace.clone(),
            workload: node.workload.clone(),
            app: node.app.clone(),
            version: node.version.clone(),
            service: node.service.clone(),
            ..NodeData::default()
        };

        decorate_node(node, &mut data);

        nodes.push(NodeWrapper { data });

        let source_hash = ident::node_id(&node.id);
        for edge in &node.edges {
            if !traffic.contains_key(&edge.dest_id) {
                return Err(GraphError::malformed(format!(
                    "edge from '{}' references unknown destination '{}'",
                    node.id, edge.dest_id
                )));
            }

            let target_hash = ident::node_id(&edge.dest_id);
            let protocol = edge.metadata.text("protocol").unwrap_or("");
            let mut data = EdgeData {
                id: ident::edge_id(&source_hash, &target_hash, protocol),
                source: source_hash.clone(),
                target: target_hash,
                ..EdgeData::default()
            };

            decorate_edge(edge, &node.metadata, &mut data);

            edges.push(EdgeWrapper { data });
        }
    }

    Ok((nodes, edges))
}

/// Apply node telemetry and classification attributes.  Rates are emitted
/// only when strictly positive; the per-status-class inbound rates only make
/// sense under a positive inbound total.
fn decorate_node(node: &Node, data: &mut NodeData) {
    let http_in = node.metadata.rate("httpIn");
    if http_in > 0.0 {
        data.http_in = format!("{:.2}", http_in);

        let http_in_3xx = node.metadata.rate("httpIn3xx");
        let http_in_4xx = node.metadata.rate("httpIn4xx");
        let http_in_5xx = node.metadata.rate("httpIn5xx");

        if http_in_3xx > 0.0 {
            data.http_in_3xx = format!("{:.2}", http_in_3xx);
        }
        if http_in_4xx > 0.0 {
            data.http_in_4xx = format!("{:.2}", http_in_4xx);
        }
        if http_in_5xx > 0.0 {
            data.http_in_5xx = format!("{:.2}", http_in_5xx);
        }
    }

    let http_out = node.metadata.rate("httpOut");
    if http_out > 0.0 {
        data.http_out = format!("{:.2}", http_out);
    }

    let tcp_in = node.metadata.rate("tcpIn");
    if tcp_in > 0.0 {
        data.tcp_in = format!("{:.2}", tcp_in);
    }
    let tcp_out = node.metadata.rate("tcpOut");
    if tcp_out > 0.0 {
        data.tcp_out = format!("{:.2}", tcp_out);
    }

    if let Some(dead) = node.metadata.flag("isDead") {
        data.is_dead = dead;
    }
    if let Some(root) = node.metadata.flag("isRoot") {
        data.is_root = root;
    }
    if let Some(unused) = node.metadata.flag("isUnused") {
        data.is_unused = unused;
    }
    if let Some(inaccessible) = node.metadata.flag("isInaccessible") {
        data.is_inaccessible = inaccessible;
    }
    if let Some(has_cb) = node.metadata.flag("hasCB") {
        data.has_cb = has_cb;
    }
    if let Some(has_vs) = node.metadata.flag("hasVS") {
        data.has_vs = has_vs;
    }
    if let Some(missing_sc) = node.metadata.flag("hasMissingSC") {
        data.has_missing_sc = missing_sc;
    }
    if let Some(misconfigured) = node.metadata.text("isMisconfigured") {
        data.is_misconfigured = misconfigured.to_string();
    }
    if let Some(outside) = node.metadata.flag("isOutside") {
        data.is_outside = outside;
    }
    if let Some(services) = node.metadata.services("destServices") {
        data.dest_services = services.clone();
    }
    if let Some(location) = node.metadata.text("isServiceEntry") {
        data.is_service_entry = location.to_string();
    }
}

/// Apply edge telemetry.  `source_metadata` is the owning node's bag; it
/// supplies the outbound total for the percent-of-requests annotation and the
/// unused flag for statically-declared but never-exercised routes.
fn decorate_edge(edge: &Edge, source_metadata: &Metadata, data: &mut EdgeData) {
    let http = edge.metadata.rate("http");
    if http > 0.0 {
        let http_3xx = edge.metadata.rate("http3xx");
        let http_4xx = edge.metadata.rate("http4xx");
        let http_5xx = edge.metadata.rate("http5xx");
        let percent_err = (http_4xx + http_5xx) / http * 100.0;

        data.http = format!("{:.2}", http);
        if http_3xx > 0.0 {
            data.http_3xx = format!("{:.2}", http_3xx);
        }
        if http_4xx > 0.0 {
            data.http_4xx = format!("{:.2}", http_4xx);
        }
        if http_5xx > 0.0 {
            data.http_5xx = format!("{:.2}", http_5xx);
        }
        if percent_err > 0.0 {
            data.http_percent_err = format!("{:.1}", percent_err);
        }

        if let Some(response_time) = edge.metadata.maybe_rate("responseTime") {
            data.response_time = format!("{:.0}", response_time);
        }

        // An edge carrying all of its source's outbound traffic is not
        // annotated; the proportion is implicitly 100%.  A zero/absent
        // outbound total yields +inf here, which the comparison also drops.
        let percent_req = http / source_metadata.rate("httpOut") * 100.0;
        if percent_req < 100.0 {
            data.http_percent_req = format!("{:.1}", percent_req);
        }
    } else if let Some(unused) = source_metadata.flag("isUnused") {
        data.is_unused = unused;
    }

    if let Some(mtls) = edge.metadata.flag("isMTLS") {
        data.is_mtls = mtls;
    }

    let tcp = edge.metadata.rate("tcp");
    if tcp > 0.0 {
        data.tcp = format!("{:.2}", tcp);
    }
}

/// Group all nodes of an app, whatever their type, under one compound node.
fn group_by_app(nodes: &mut Vec<NodeWrapper>) {
    let boxes = nodes
        .iter()
        .enumerate()
        .filter(|(_, nw)| !nw.data.app.is_empty() && nw.data.app != UNKNOWN_APP)
        .map(|(idx, nw)| (box_key(&nw.data), idx))
        .into_group_map();

    materialize_groups(boxes, nodes, GroupBy::App);
}

/// Group the per-version app nodes of an app under one compound node.
fn group_by_version(nodes: &mut Vec<NodeWrapper>) {
    let boxes = nodes
        .iter()
        .enumerate()
        .filter(|(_, nw)| nw.data.node_type == NodeType::App)
        .map(|(idx, nw)| (box_key(&nw.data), idx))
        .into_group_map();

    materialize_groups(boxes, nodes, GroupBy::Version);
}

fn box_key(data: &NodeData) -> String {
    format!("box_{}_{}", data.namespace, data.app)
}

/// Materialize one compound node per key with at least two members, pointing
/// each member's `parent` at it.  Singleton keys are never boxed.  Members by
/// construction share namespace and app, which the compound node inherits;
/// its flags are the OR over the members so the box surfaces their problems.
fn materialize_groups(
    boxes: HashMap<String, Vec<usize>>,
    nodes: &mut Vec<NodeWrapper>,
    group_by: GroupBy,
) {
    for (key, members) in boxes {
        if members.len() < 2 {
            continue;
        }

        let group_id = ident::node_id(&key);
        let mut group = NodeData {
            id: group_id.clone(),
            node_type: NodeType::App,
            namespace: nodes[members[0]].data.namespace.clone(),
            app: nodes[members[0]].data.app.clone(),
            is_group: group_by.name().to_string(),
            ..NodeData::default()
        };

        for idx in members {
            let member = &mut nodes[idx].data;
            member.parent = group_id.clone();

            group.has_missing_sc |= member.has_missing_sc;
            group.is_inaccessible |= member.is_inaccessible;
            group.is_outside |= member.is_outside;
        }

        nodes.push(NodeWrapper { data: group });
    }
}

/// Total order for reproducible documents.  Group nodes must precede their
/// children, hence the descending `isGroup` tie-break within a namespace.
fn sort_elements(nodes: &mut Vec<NodeWrapper>, edges: &mut Vec<EdgeWrapper>) {
    nodes.sort_by(|a, b| {
        a.data
            .namespace
            .cmp(&b.data.namespace)
            .then_with(|| b.data.is_group.cmp(&a.data.is_group))
            .then_with(|| a.data.app.cmp(&b.data.app))
            .then_with(|| a.data.version.cmp(&b.data.version))
            .then_with(|| a.data.service.cmp(&b.data.service))
            .then_with(|| a.data.workload.cmp(&b.data.workload))
    });

    edges.sort_by(|a, b| {
        a.data
            .source
            .cmp(&b.data.source)
            .then_with(|| a.data.target.cmp(&b.data.target))
    });
}
