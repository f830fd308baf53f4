//! Flow graph model and its Mermaid serialization.
//!
//! A [`FlowGraph`] is rebuilt from an ordered list of match results on every
//! call; it keeps no state between invocations. Each result contributes up
//! to two edges from its binding key: a `next` edge to the success routing
//! key and an `error` edge to the failure routing key. Edges keep the order
//! of the results they came from, and duplicates are kept.
//!
//! Node identity is the sanitized identifier (see
//! [`bindflow_core::identifier::node_id`]). Every edge endpoint also carries
//! the original string as its label, so two keys that sanitize to the same
//! identifier still print their own labels.
//!
//! # Serialized form
//!
//! ```text
//! graph LR
//!   proc_v1_0["proc.v1.0"] -->|next| next_v1_0["next.v1.0"]
//! ```
//!
//! Labels are written verbatim between double quotes and are not escaped.

use std::fmt;

use indexmap::IndexMap;

use bindflow_core::{identifier::node_id, record::MatchResult};

/// Header line declaring a left-to-right flowchart.
const HEADER: &str = "graph LR";

/// Indentation for each edge line.
const INDENT: &str = "  ";

/// Which routing path an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Success path (`OkRoutingKey`).
    Next,
    /// Failure path (`ErrorRoutingKey`).
    Error,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next => f.write_str("next"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// A graph endpoint: sanitized identifier plus original label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    id: String,
    label: String,
}

impl GraphNode {
    /// Creates a node for `label`, deriving its identifier.
    pub fn new(label: &str) -> Self {
        Self {
            id: node_id(label),
            label: label.to_string(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[\"{}\"]", self.id, self.label)
    }
}

/// A directed edge between two nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    from: GraphNode,
    to: GraphNode,
    kind: EdgeKind,
}

impl GraphEdge {
    pub fn new(from: GraphNode, to: GraphNode, kind: EdgeKind) -> Self {
        Self { from, to, kind }
    }

    pub fn from(&self) -> &GraphNode {
        &self.from
    }

    pub fn to(&self) -> &GraphNode {
        &self.to
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }
}

impl fmt::Display for GraphEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -->|{}| {}", self.from, self.kind, self.to)
    }
}

/// A directed multigraph of routing flows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowGraph {
    edges: Vec<GraphEdge>,
}

impl FlowGraph {
    /// Builds the graph from results, in the order given.
    ///
    /// Missing or empty keys contribute no edges.
    pub fn from_results(results: &[MatchResult]) -> Self {
        let mut edges = Vec::new();

        for result in results {
            let Some(key) = non_empty(result.binding_key()) else {
                continue;
            };

            let targets = [
                (result.next_key(), EdgeKind::Next),
                (result.error_key(), EdgeKind::Error),
            ];
            edges.extend(
                targets
                    .into_iter()
                    .filter_map(|(target, kind)| non_empty(target).map(|target| (target, kind)))
                    .map(|(target, kind)| {
                        GraphEdge::new(GraphNode::new(key), GraphNode::new(target), kind)
                    }),
            );
        }

        Self { edges }
    }

    /// Returns the edges in emission order.
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Returns the distinct node identifiers in first-appearance order,
    /// each with the label it first appeared under.
    pub fn nodes(&self) -> IndexMap<&str, &str> {
        let mut nodes = IndexMap::new();
        for edge in &self.edges {
            for node in [&edge.from, &edge.to] {
                nodes.entry(node.id()).or_insert(node.label());
            }
        }
        nodes
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Serializes the graph to Mermaid flowchart text.
    pub fn to_mermaid(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FlowGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{HEADER}")?;
        for edge in &self.edges {
            writeln!(f, "{INDENT}{edge}")?;
        }
        Ok(())
    }
}

fn non_empty(key: Option<&str>) -> Option<&str> {
    key.filter(|key| !key.is_empty())
}

/// Builds Mermaid flowchart text for `results`.
///
/// The output depends only on the results and their order.
pub fn build_graph_text(results: &[MatchResult]) -> String {
    FlowGraph::from_results(results).to_mermaid()
}
