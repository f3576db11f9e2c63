use crate::{CoreError, ElementId, ElementKind, NetworkId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: ElementId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: ElementId,
    #[serde(rename = "s")]
    pub source: ElementId,
    #[serde(rename = "t")]
    pub target: ElementId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NetworkData {
    id: NetworkId,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

/// Network topology. Element order is insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "NetworkData", into = "NetworkData")]
pub struct Network {
    pub id: NetworkId,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    kinds: HashMap<ElementId, ElementKind>,
}

/// Elements removed by [`Network::remove_elements`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovedElements {
    pub nodes: Vec<ElementId>,
    pub edges: Vec<ElementId>,
}

impl RemovedElements {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn all(&self) -> impl Iterator<Item = &ElementId> {
        self.nodes.iter().chain(self.edges.iter())
    }
}

impl Network {
    pub fn new(id: impl Into<NetworkId>) -> Self {
        Self {
            id: id.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            kinds: HashMap::new(),
        }
    }

    pub fn add_node(&mut self, id: impl Into<ElementId>) -> Result<(), CoreError> {
        let id = id.into();
        if self.kinds.contains_key(&id) {
            return Err(CoreError::DuplicateElement(id));
        }
        self.kinds.insert(id.clone(), ElementKind::Node);
        self.nodes.push(Node { id });
        Ok(())
    }

    pub fn add_edge(
        &mut self,
        id: impl Into<ElementId>,
        source: impl Into<ElementId>,
        target: impl Into<ElementId>,
    ) -> Result<(), CoreError> {
        let id = id.into();
        let source = source.into();
        let target = target.into();
        if self.kinds.contains_key(&id) {
            return Err(CoreError::DuplicateElement(id));
        }
        for endpoint in [&source, &target] {
            if !self.contains_node(endpoint) {
                return Err(CoreError::DanglingEdge {
                    edge: id,
                    node: endpoint.clone(),
                });
            }
        }
        self.kinds.insert(id.clone(), ElementKind::Edge);
        self.edges.push(Edge { id, source, target });
        Ok(())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind_of(&self, id: &ElementId) -> Option<ElementKind> {
        self.kinds.get(id).copied()
    }

    pub fn contains_node(&self, id: &ElementId) -> bool {
        self.kind_of(id) == Some(ElementKind::Node)
    }

    pub fn contains_edge(&self, id: &ElementId) -> bool {
        self.kind_of(id) == Some(ElementKind::Edge)
    }

    /// Remove nodes and edges by id. Edges incident to a removed node are
    /// removed as well. Unknown ids are ignored.
    pub fn remove_elements<'a>(
        &mut self,
        ids: impl IntoIterator<Item = &'a ElementId>,
    ) -> RemovedElements {
        let targets: HashSet<&ElementId> = ids.into_iter().collect();
        let mut removed = RemovedElements::default();

        self.nodes.retain(|node| {
            if targets.contains(&node.id) {
                removed.nodes.push(node.id.clone());
                false
            } else {
                true
            }
        });

        let removed_nodes: HashSet<&ElementId> = removed.nodes.iter().collect();
        self.edges.retain(|edge| {
            let drop = targets.contains(&edge.id)
                || removed_nodes.contains(&edge.source)
                || removed_nodes.contains(&edge.target);
            if drop {
                removed.edges.push(edge.id.clone());
            }
            !drop
        });

        for id in removed.all() {
            self.kinds.remove(id);
        }
        if !removed.is_empty() {
            tracing::debug!(
                "Removed {} nodes and {} edges from network {}",
                removed.nodes.len(),
                removed.edges.len(),
                self.id
            );
        }
        removed
    }
}

impl TryFrom<NetworkData> for Network {
    type Error = CoreError;

    fn try_from(data: NetworkData) -> Result<Self, Self::Error> {
        let mut network = Network::new(data.id);
        for node in data.nodes {
            network.add_node(node.id)?;
        }
        for edge in data.edges {
            network.add_edge(edge.id, edge.source, edge.target)?;
        }
        Ok(network)
    }
}

impl From<Network> for NetworkData {
    fn from(network: Network) -> Self {
        Self {
            id: network.id,
            nodes: network.nodes,
            edges: network.edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Network {
        let mut network = Network::new("net");
        network.add_node("a").unwrap();
        network.add_node("b").unwrap();
        network.add_node("c").unwrap();
        network.add_edge("e1", "a", "b").unwrap();
        network.add_edge("e2", "b", "c").unwrap();
        network
    }

    #[test]
    fn test_add_edge_rejects_dangling_endpoint() {
        let mut network = sample();
        let err = network.add_edge("e3", "a", "missing").unwrap_err();
        assert_eq!(
            err,
            CoreError::DanglingEdge {
                edge: "e3".into(),
                node: "missing".into()
            }
        );
    }

    #[test]
    fn test_duplicate_ids_share_one_namespace() {
        let mut network = sample();
        assert!(network.add_node("e1").is_err());
        assert!(network.add_edge("a", "b", "c").is_err());
    }

    #[test]
    fn test_removing_node_removes_incident_edges() {
        let mut network = sample();
        let removed = network.remove_elements(&[ElementId::from("b")]);

        assert_eq!(removed.nodes, vec![ElementId::from("b")]);
        assert_eq!(removed.edges.len(), 2);
        assert_eq!(network.node_count(), 2);
        assert_eq!(network.edge_count(), 0);
        assert_eq!(network.kind_of(&"e1".into()), None);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut network = sample();
        let removed = network.remove_elements(&[ElementId::from("nope")]);
        assert!(removed.is_empty());
        assert_eq!(network.node_count(), 3);
    }

    #[test]
    fn test_deserialize_validates_topology() {
        let json = r#"{"id":"n","nodes":[{"id":"a"}],"edges":[{"id":"e","s":"a","t":"zz"}]}"#;
        assert!(serde_json::from_str::<Network>(json).is_err());

        let ok = r#"{"id":"n","nodes":[{"id":"a"},{"id":"b"}],"edges":[{"id":"e","s":"a","t":"b"}]}"#;
        let network: Network = serde_json::from_str(ok).unwrap();
        assert!(network.contains_edge(&"e".into()));
    }
}
