use crate::foundation::error::{LayerflowError, LayerflowResult};
use crate::foundation::ids::{EdgeId, NodeId};
use crate::graph::model::{Edge, Node, WorkflowDoc};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable view of the graph at one point in time.
///
/// Cloning is cheap (`Arc` bumps). A snapshot never changes after it is built; the
/// store publishes a new one for every mutation.
#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
    nodes: Arc<Vec<Node>>,
    edges: Arc<Vec<Edge>>,
    node_index: Arc<HashMap<NodeId, usize>>,
    incoming: Arc<HashMap<NodeId, Vec<usize>>>,
    outgoing: Arc<HashMap<NodeId, Vec<usize>>>,
}

impl GraphSnapshot {
    /// Build a snapshot and its lookup indices. Duplicate node ids resolve to the
    /// first occurrence.
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let nodes = Arc::new(nodes);
        let node_index = Arc::new(index_nodes(&nodes));
        let edges = Arc::new(edges);
        let (incoming, outgoing) = index_edges(&edges);
        Self {
            nodes,
            edges,
            node_index,
            incoming: Arc::new(incoming),
            outgoing: Arc::new(outgoing),
        }
    }

    /// Same edges, new node vector.
    pub fn with_nodes(&self, nodes: Vec<Node>) -> Self {
        Self {
            node_index: Arc::new(index_nodes(&nodes)),
            nodes: Arc::new(nodes),
            edges: Arc::clone(&self.edges),
            incoming: Arc::clone(&self.incoming),
            outgoing: Arc::clone(&self.outgoing),
        }
    }

    /// Same nodes, new edge vector.
    pub fn with_edges(&self, edges: Vec<Edge>) -> Self {
        let (incoming, outgoing) = index_edges(&edges);
        Self {
            nodes: Arc::clone(&self.nodes),
            node_index: Arc::clone(&self.node_index),
            edges: Arc::new(edges),
            incoming: Arc::new(incoming),
            outgoing: Arc::new(outgoing),
        }
    }

    /// All nodes, in document order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges, in document order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    /// Position of a node in [`GraphSnapshot::nodes`].
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    /// Edges whose target is `id`, in edge-array order.
    pub fn incoming<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Edge> + use<'a> {
        self.edge_list(&self.incoming, id)
    }

    /// Edges whose source is `id`, in edge-array order.
    pub fn outgoing<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Edge> + use<'a> {
        self.edge_list(&self.outgoing, id)
    }

    fn edge_list<'a>(
        &'a self,
        index: &'a HashMap<NodeId, Vec<usize>>,
        id: &str,
    ) -> impl Iterator<Item = &'a Edge> + use<'a> {
        index
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|&i| &self.edges[i])
    }

    /// Copy out a workflow document.
    pub fn to_doc(&self) -> WorkflowDoc {
        WorkflowDoc {
            nodes: self.nodes.as_ref().clone(),
            edges: self.edges.as_ref().clone(),
            ..WorkflowDoc::default()
        }
    }
}

fn index_nodes(nodes: &[Node]) -> HashMap<NodeId, usize> {
    let mut index = HashMap::with_capacity(nodes.len());
    for (i, n) in nodes.iter().enumerate() {
        index.entry(n.id.clone()).or_insert(i);
    }
    index
}

type EdgeIndex = HashMap<NodeId, Vec<usize>>;

fn index_edges(edges: &[Edge]) -> (EdgeIndex, EdgeIndex) {
    let mut incoming: EdgeIndex = HashMap::new();
    let mut outgoing: EdgeIndex = HashMap::new();
    for (i, e) in edges.iter().enumerate() {
        incoming.entry(e.target.clone()).or_default().push(i);
        outgoing.entry(e.source.clone()).or_default().push(i);
    }
    (incoming, outgoing)
}

/// Owner of the current graph. Every mutation publishes a fresh snapshot and bumps
/// the version.
#[derive(Debug, Default)]
pub struct GraphStore {
    current: GraphSnapshot,
    version: u64,
    extra: Map<String, Value>,
}

impl GraphStore {
    /// Store seeded from a document.
    pub fn from_doc(doc: WorkflowDoc) -> Self {
        Self {
            current: GraphSnapshot::new(doc.nodes, doc.edges),
            version: 0,
            extra: doc.extra,
        }
    }

    /// Current graph as a document, with the top-level fields it was loaded with.
    pub fn to_doc(&self) -> WorkflowDoc {
        WorkflowDoc {
            extra: self.extra.clone(),
            ..self.current.to_doc()
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> GraphSnapshot {
        self.current.clone()
    }

    /// Borrow the current snapshot.
    pub fn current(&self) -> &GraphSnapshot {
        &self.current
    }

    /// Number of published mutations.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Publish a new snapshot wholesale.
    pub fn publish(&mut self, next: GraphSnapshot) {
        self.current = next;
        self.version += 1;
    }

    /// Apply `f` to a copy of node `id` and publish. The node's cached fingerprint
    /// is dropped.
    pub fn update_node<R>(
        &mut self,
        id: &str,
        f: impl FnOnce(&mut Node) -> R,
    ) -> LayerflowResult<R> {
        let pos = self
            .current
            .position_of(id)
            .ok_or_else(|| LayerflowError::validation(format!("unknown node '{id}'")))?;
        let mut nodes = self.current.nodes().to_vec();
        let node = &mut nodes[pos];
        let out = f(node);
        node.touch();
        self.publish(self.current.with_nodes(nodes));
        Ok(out)
    }

    /// Append a node. Ids must be unique.
    pub fn add_node(&mut self, node: Node) -> LayerflowResult<()> {
        if self.current.node(node.id.as_str()).is_some() {
            return Err(LayerflowError::validation(format!(
                "node '{}' already exists",
                node.id
            )));
        }
        let mut nodes = self.current.nodes().to_vec();
        nodes.push(node);
        self.publish(self.current.with_nodes(nodes));
        Ok(())
    }

    /// Remove a node and every edge touching it.
    pub fn remove_node(&mut self, id: &str) -> LayerflowResult<Node> {
        let pos = self
            .current
            .position_of(id)
            .ok_or_else(|| LayerflowError::validation(format!("unknown node '{id}'")))?;
        let mut nodes = self.current.nodes().to_vec();
        let removed = nodes.remove(pos);
        let edges: Vec<Edge> = self
            .current
            .edges()
            .iter()
            .filter(|e| e.source.as_str() != id && e.target.as_str() != id)
            .cloned()
            .collect();
        self.publish(GraphSnapshot::new(nodes, edges));
        Ok(removed)
    }

    /// Append an edge. Endpoints may be dangling; traversal treats them as dead ends.
    pub fn add_edge(&mut self, edge: Edge) -> LayerflowResult<()> {
        if self.current.edges().iter().any(|e| e.id == edge.id) {
            return Err(LayerflowError::validation(format!(
                "edge '{}' already exists",
                edge.id
            )));
        }
        let mut edges = self.current.edges().to_vec();
        edges.push(edge);
        self.publish(self.current.with_edges(edges));
        Ok(())
    }

    /// Remove an edge by id.
    pub fn remove_edge(&mut self, id: &EdgeId) -> LayerflowResult<Edge> {
        let pos = self
            .current
            .edges()
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| LayerflowError::validation(format!("unknown edge '{id}'")))?;
        let mut edges = self.current.edges().to_vec();
        let removed = edges.remove(pos);
        self.publish(self.current.with_edges(edges));
        Ok(removed)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/store.rs"]
mod tests;
