//! Renderer-facing view models.
//!
//! A [`NetworkView`] is the snapshot a renderer draws from: computed visual
//! values per element, node positions and the current selection. Values are
//! shared ([`ElementValues`]) so rebuilding a view after a style change does
//! not copy unchanged value maps.

use netview_core::{ElementId, Network, NetworkId};
use netview_style::{ComputedValues, ElementValues, VisualPropertyName, VisualValue};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::IdMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn with_z(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeView {
    pub id: ElementId,
    pub values: ElementValues,
    pub position: Position,
}

impl NodeView {
    pub fn value(&self, property: VisualPropertyName) -> Option<&VisualValue> {
        self.values.get(&property)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeView {
    pub id: ElementId,
    pub values: ElementValues,
}

impl EdgeView {
    pub fn value(&self, property: VisualPropertyName) -> Option<&VisualValue> {
        self.values.get(&property)
    }
}

/// Which collection an id belongs to within one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Member {
    Node,
    Edge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkView {
    id: NetworkId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    view_type: Option<String>,
    node_views: HashMap<ElementId, NodeView>,
    edge_views: HashMap<ElementId, EdgeView>,
    selected_nodes: Vec<ElementId>,
    selected_edges: Vec<ElementId>,
    network_values: ElementValues,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id_map: Option<IdMap>,
}

impl NetworkView {
    /// Build the primary view of `network` from freshly computed values.
    ///
    /// Node positions and the selection carry over from `previous` for every
    /// element that still exists; new nodes start at the origin.
    pub fn from_computed(
        network: &Network,
        computed: &ComputedValues,
        previous: Option<&NetworkView>,
    ) -> Self {
        let node_views: HashMap<ElementId, NodeView> = network
            .nodes()
            .iter()
            .map(|node| {
                let position = previous
                    .and_then(|p| p.node_views.get(&node.id))
                    .map(|v| v.position)
                    .unwrap_or_default();
                let values = computed.nodes.get(&node.id).cloned().unwrap_or_default();
                (
                    node.id.clone(),
                    NodeView {
                        id: node.id.clone(),
                        values,
                        position,
                    },
                )
            })
            .collect();

        let edge_views: HashMap<ElementId, EdgeView> = network
            .edges()
            .iter()
            .map(|edge| {
                let values = computed.edges.get(&edge.id).cloned().unwrap_or_default();
                (
                    edge.id.clone(),
                    EdgeView {
                        id: edge.id.clone(),
                        values,
                    },
                )
            })
            .collect();

        let (selected_nodes, selected_edges) = match previous {
            Some(p) => (
                p.selected_nodes
                    .iter()
                    .filter(|id| node_views.contains_key(*id))
                    .cloned()
                    .collect(),
                p.selected_edges
                    .iter()
                    .filter(|id| edge_views.contains_key(*id))
                    .cloned()
                    .collect(),
            ),
            None => (Vec::new(), Vec::new()),
        };

        Self {
            id: network.id.clone(),
            view_type: None,
            node_views,
            edge_views,
            selected_nodes,
            selected_edges,
            network_values: computed.network.clone(),
            id_map: None,
        }
    }

    /// An empty secondary view of `network`, populated by a builder.
    pub fn secondary(id: NetworkId, view_type: impl Into<String>, network_values: ElementValues) -> Self {
        Self {
            id,
            view_type: Some(view_type.into()),
            node_views: HashMap::new(),
            edge_views: HashMap::new(),
            selected_nodes: Vec::new(),
            selected_edges: Vec::new(),
            network_values,
            id_map: Some(IdMap::new()),
        }
    }

    pub fn id(&self) -> &NetworkId {
        &self.id
    }

    /// `None` for the primary view.
    pub fn view_type(&self) -> Option<&str> {
        self.view_type.as_deref()
    }

    pub fn is_primary(&self) -> bool {
        self.view_type.is_none()
    }

    pub fn node_view(&self, id: &ElementId) -> Option<&NodeView> {
        self.node_views.get(id)
    }

    pub fn edge_view(&self, id: &ElementId) -> Option<&EdgeView> {
        self.edge_views.get(id)
    }

    pub fn node_views(&self) -> impl Iterator<Item = &NodeView> {
        self.node_views.values()
    }

    pub fn edge_views(&self) -> impl Iterator<Item = &EdgeView> {
        self.edge_views.values()
    }

    pub fn node_count(&self) -> usize {
        self.node_views.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_views.len()
    }

    pub fn network_values(&self) -> &ElementValues {
        &self.network_values
    }

    pub fn id_map(&self) -> Option<&IdMap> {
        self.id_map.as_ref()
    }

    pub fn selected_nodes(&self) -> &[ElementId] {
        &self.selected_nodes
    }

    pub fn selected_edges(&self) -> &[ElementId] {
        &self.selected_edges
    }

    pub fn is_selected(&self, id: &ElementId) -> bool {
        self.selected_nodes.contains(id) || self.selected_edges.contains(id)
    }

    pub fn position(&self, id: &ElementId) -> Option<Position> {
        self.node_views.get(id).map(|v| v.position)
    }

    pub(crate) fn member(&self, id: &ElementId) -> Option<Member> {
        if self.node_views.contains_key(id) {
            Some(Member::Node)
        } else if self.edge_views.contains_key(id) {
            Some(Member::Edge)
        } else {
            None
        }
    }

    /// Ids in this view that stand for the primary element `id`. A view with
    /// an id map resolves through the map only, so synthetic circles never
    /// answer to a primary id that happens to share their name.
    pub(crate) fn local_ids(&self, id: &ElementId) -> Vec<ElementId> {
        match &self.id_map {
            Some(map) => map.synthetics_of(id).to_vec(),
            None if self.member(id).is_some() => vec![id.clone()],
            None => Vec::new(),
        }
    }

    /// Primary id behind `id`, if `id` is one of this view's synthetic ids.
    pub(crate) fn original_of(&self, id: &ElementId) -> Option<&ElementId> {
        self.id_map.as_ref().and_then(|map| map.original_of(id))
    }

    pub(crate) fn insert_node(&mut self, view: NodeView) {
        self.node_views.insert(view.id.clone(), view);
    }

    pub(crate) fn insert_edge(&mut self, view: EdgeView) {
        self.edge_views.insert(view.id.clone(), view);
    }

    pub(crate) fn link(&mut self, synthetic: ElementId, original: ElementId) {
        self.id_map
            .get_or_insert_with(IdMap::new)
            .insert(synthetic, original);
    }

    pub(crate) fn node_view_mut(&mut self, id: &ElementId) -> Option<&mut NodeView> {
        self.node_views.get_mut(id)
    }

    pub(crate) fn node_views_mut(&mut self) -> impl Iterator<Item = &mut NodeView> {
        self.node_views.values_mut()
    }

    pub(crate) fn set_selection(&mut self, nodes: Vec<ElementId>, edges: Vec<ElementId>) {
        self.selected_nodes = dedup(nodes);
        self.selected_edges = dedup(edges);
    }

    pub(crate) fn select(&mut self, member: Member, id: &ElementId) {
        let list = self.selection_mut(member);
        if !list.contains(id) {
            list.push(id.clone());
        }
    }

    pub(crate) fn unselect(&mut self, member: Member, id: &ElementId) {
        self.selection_mut(member).retain(|s| s != id);
    }

    fn selection_mut(&mut self, member: Member) -> &mut Vec<ElementId> {
        match member {
            Member::Node => &mut self.selected_nodes,
            Member::Edge => &mut self.selected_edges,
        }
    }

    /// Drop elements from the view, its selection and its id map. Ids are
    /// primary ids; synthetic stand-ins are removed along with them.
    pub(crate) fn remove_elements(&mut self, ids: &[ElementId]) -> usize {
        let mut doomed: HashSet<ElementId> = HashSet::new();
        for id in ids {
            match self.id_map.as_mut() {
                Some(map) => doomed.extend(map.remove_original(id)),
                None => {
                    doomed.insert(id.clone());
                }
            }
        }

        let before = self.node_views.len() + self.edge_views.len();
        self.node_views.retain(|id, _| !doomed.contains(id));
        self.edge_views.retain(|id, _| !doomed.contains(id));
        self.selected_nodes.retain(|id| !doomed.contains(id));
        self.selected_edges.retain(|id| !doomed.contains(id));
        before - (self.node_views.len() + self.edge_views.len())
    }
}

fn dedup(ids: Vec<ElementId>) -> Vec<ElementId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
