//! Material network arena.
//!
//! Nodes and relationships live in two slotmap tables. Each relationship is
//! indexed by `(node, port)` on both of its endpoints, so a port can be
//! queried for the edge feeding it (its source) or for the edge it feeds.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use hydra_core::{Diagnostic, DiagnosticKind};

new_key_type! {
    pub struct NodeHandle;
    pub struct RelationshipHandle;
}

/// A literal parameter value of a shading node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f32),
    Vector(Vec<f32>),
    String(String),
    /// Any other JSON shape (`null`, objects, nested arrays). Kept as sent.
    Other(serde_json::Value),
}

impl ParamValue {
    /// Whether the value counts as "populated".
    ///
    /// Zero, `false` and the empty string are unpopulated; vectors always
    /// count, even when empty.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0 && !f.is_nan(),
            Self::Vector(_) => true,
            Self::String(s) => !s.is_empty(),
            Self::Other(value) => !value.is_null(),
        }
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Self::Int(i) => Some(*i as f32),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_vector(&self) -> Option<&[f32]> {
        match self {
            Self::Vector(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<[f32; 3]> for ParamValue {
    fn from(value: [f32; 3]) -> Self {
        Self::Vector(value.to_vec())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// Parameters of one shading node, by name.
pub type ParameterBag = FxHashMap<String, ParamValue>;

/// A connection as sent by the host.
///
/// `input_id`/`input_name` name the upstream node and its output port
/// (for a texture node, the channel such as `rgb` or `a`);
/// `output_id`/`output_name` name the downstream node and the parameter
/// it drives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub input_id: String,
    pub input_name: String,
    pub output_id: String,
    pub output_name: String,
}

impl Relationship {
    pub fn new(
        input_id: impl Into<String>,
        input_name: impl Into<String>,
        output_id: impl Into<String>,
        output_name: impl Into<String>,
    ) -> Self {
        Self {
            input_id: input_id.into(),
            input_name: input_name.into(),
            output_id: output_id.into(),
            output_name: output_name.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub path: String,
    pub parameters: ParameterBag,
}

/// A linked relationship with both endpoints resolved to handles.
#[derive(Debug, Clone)]
pub struct Edge {
    /// Upstream node.
    pub input: NodeHandle,
    pub input_name: String,
    /// Downstream node.
    pub output: NodeHandle,
    pub output_name: String,
}

#[derive(Debug, Default)]
pub struct MaterialGraph {
    nodes: SlotMap<NodeHandle, Node>,
    order: Vec<NodeHandle>,
    by_path: FxHashMap<String, NodeHandle>,

    edges: SlotMap<RelationshipHandle, Edge>,
    // (downstream node, parameter) -> edge feeding it
    sources: FxHashMap<(NodeHandle, String), RelationshipHandle>,
    // (upstream node, output port) -> edge leaving it
    consumers: FxHashMap<(NodeHandle, String), RelationshipHandle>,
}

impl MaterialGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the parameters of `path`; the last write wins.
    ///
    /// A node keeps its handle and its place in iteration order when it is
    /// overwritten.
    pub fn update_node(&mut self, path: &str, parameters: ParameterBag) -> NodeHandle {
        if let Some(&handle) = self.by_path.get(path) {
            self.nodes[handle].parameters = parameters;
            return handle;
        }
        let handle = self.nodes.insert(Node {
            path: path.to_string(),
            parameters,
        });
        self.order.push(handle);
        self.by_path.insert(path.to_string(), handle);
        handle
    }

    pub fn clear_relationships(&mut self) {
        self.edges.clear();
        self.sources.clear();
        self.consumers.clear();
    }

    /// Links a relationship into both endpoint nodes.
    pub fn link(&mut self, relationship: &Relationship) -> Result<RelationshipHandle, Diagnostic> {
        let input = self.lookup(&relationship.input_id)?;
        let output = self.lookup(&relationship.output_id)?;

        let handle = self.edges.insert(Edge {
            input,
            input_name: relationship.input_name.clone(),
            output,
            output_name: relationship.output_name.clone(),
        });
        self.sources
            .insert((output, relationship.output_name.clone()), handle);
        self.consumers
            .insert((input, relationship.input_name.clone()), handle);
        Ok(handle)
    }

    fn lookup(&self, path: &str) -> Result<NodeHandle, Diagnostic> {
        self.by_path.get(path).copied().ok_or_else(|| {
            Diagnostic::new(
                DiagnosticKind::UnknownNode,
                format!("relationship references unknown node '{path}'"),
            )
        })
    }

    #[must_use]
    pub fn handle_of(&self, path: &str) -> Option<NodeHandle> {
        self.by_path.get(path).copied()
    }

    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    /// Nodes in first-insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.order.iter().map(|&handle| (handle, &self.nodes[handle]))
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn relationship_count(&self) -> usize {
        self.edges.len()
    }

    /// The edge driving parameter `port` of `node`.
    #[must_use]
    pub fn source_of(&self, node: NodeHandle, port: &str) -> Option<&Edge> {
        let handle = self.sources.get(&(node, port.to_string()))?;
        self.edges.get(*handle)
    }

    /// The edge leaving output `port` of `node`.
    #[must_use]
    pub fn consumer_of(&self, node: NodeHandle, port: &str) -> Option<&Edge> {
        let handle = self.consumers.get(&(node, port.to_string()))?;
        self.edges.get(*handle)
    }

    #[must_use]
    pub fn is_wired(&self, node: NodeHandle, port: &str) -> bool {
        self.source_of(node, port).is_some() || self.consumer_of(node, port).is_some()
    }

    /// The literal value of `port`, if it is set and not wired.
    #[must_use]
    pub fn literal(&self, node: NodeHandle, port: &str) -> Option<&ParamValue> {
        if self.is_wired(node, port) {
            return None;
        }
        self.nodes.get(node)?.parameters.get(port)
    }

    /// Whether `port` is populated, either by a truthy literal or by an edge.
    #[must_use]
    pub fn has_field(&self, node: NodeHandle, port: &str) -> bool {
        self.is_wired(node, port)
            || self
                .nodes
                .get(node)
                .and_then(|n| n.parameters.get(port))
                .is_some_and(ParamValue::is_truthy)
    }

    /// First node, in iteration order, that populates `port`.
    #[must_use]
    pub fn first_with_field(&self, port: &str) -> Option<NodeHandle> {
        self.order
            .iter()
            .copied()
            .find(|&handle| self.has_field(handle, port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(entries: &[(&str, ParamValue)]) -> ParameterBag {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn unrecognized_json_values_do_not_reject_the_bag() {
        let bag: ParameterBag = serde_json::from_str(
            r#"{ "roughness": 0.25, "diffuseColor": null, "extra": { "k": 1 }, "nested": [[1, 2]] }"#,
        )
        .unwrap();

        assert_eq!(bag.len(), 4);
        assert_eq!(bag.get("roughness"), Some(&ParamValue::Float(0.25)));
        assert_eq!(bag.get("diffuseColor"), Some(&ParamValue::Other(serde_json::Value::Null)));
        assert!(!bag["diffuseColor"].is_truthy());
        assert!(bag["extra"].is_truthy());
        assert!(bag["nested"].as_vector().is_none());
    }

    #[test]
    fn overwrite_keeps_handle_and_order() {
        let mut graph = MaterialGraph::new();
        let a = graph.update_node("/a", bag(&[]));
        let b = graph.update_node("/b", bag(&[]));
        let a2 = graph.update_node("/a", bag(&[("roughness", ParamValue::Float(0.5))]));

        assert_eq!(a, a2);
        let order: Vec<_> = graph.nodes().map(|(h, _)| h).collect();
        assert_eq!(order, [a, b]);
        assert_eq!(
            graph.node(a).unwrap().parameters.get("roughness"),
            Some(&ParamValue::Float(0.5))
        );
    }

    #[test]
    fn link_indexes_both_endpoints() {
        let mut graph = MaterialGraph::new();
        let tex = graph.update_node("/tex", bag(&[("file", "wood.png".into())]));
        let surface = graph.update_node("/surface", bag(&[]));
        graph
            .link(&Relationship::new("/tex", "rgb", "/surface", "diffuseColor"))
            .unwrap();

        let edge = graph.source_of(surface, "diffuseColor").unwrap();
        assert_eq!(edge.input, tex);
        assert_eq!(edge.input_name, "rgb");
        let edge = graph.consumer_of(tex, "rgb").unwrap();
        assert_eq!(edge.output, surface);
        assert!(graph.has_field(surface, "diffuseColor"));
    }

    #[test]
    fn link_to_unknown_node_is_diagnosed() {
        let mut graph = MaterialGraph::new();
        graph.update_node("/surface", bag(&[]));
        let err = graph
            .link(&Relationship::new("/missing", "rgb", "/surface", "diffuseColor"))
            .unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::UnknownNode);
        assert_eq!(graph.relationship_count(), 0);
    }

    #[test]
    fn wired_port_hides_literal() {
        let mut graph = MaterialGraph::new();
        graph.update_node("/tex", bag(&[]));
        let surface = graph.update_node("/surface", bag(&[("roughness", ParamValue::Float(0.3))]));
        assert_eq!(graph.literal(surface, "roughness"), Some(&ParamValue::Float(0.3)));

        graph
            .link(&Relationship::new("/tex", "r", "/surface", "roughness"))
            .unwrap();
        assert_eq!(graph.literal(surface, "roughness"), None);

        graph.clear_relationships();
        assert_eq!(graph.literal(surface, "roughness"), Some(&ParamValue::Float(0.3)));
    }

    #[test]
    fn truthiness() {
        assert!(!ParamValue::Float(0.0).is_truthy());
        assert!(!ParamValue::Int(0).is_truthy());
        assert!(!ParamValue::String(String::new()).is_truthy());
        assert!(ParamValue::Vector(vec![0.0, 0.0, 0.0]).is_truthy());
        assert!(ParamValue::Float(0.1).is_truthy());
    }

    #[test]
    fn relationship_deserializes_from_camel_case() {
        let rel: Relationship = serde_json::from_str(
            r#"{"inputId":"/tex","inputName":"rgb","outputId":"/pbr","outputName":"diffuseColor"}"#,
        )
        .unwrap();
        assert_eq!(rel, Relationship::new("/tex", "rgb", "/pbr", "diffuseColor"));
    }
}
