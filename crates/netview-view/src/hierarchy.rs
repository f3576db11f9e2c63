//! Circle-packing secondary view.
//!
//! A hierarchy of primary nodes is drawn as nested circles. Every circle is a
//! synthetic node; leaves map back to the primary node they stand for and
//! inherit its visual values, with the circle diameter written into
//! `nodeWidth` and `nodeHeight`.

use netview_core::ElementId;
use netview_style::{VisualPropertyName, VisualValue};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::f64::consts::TAU;
use std::sync::Arc;

use crate::view_model::{NetworkView, NodeView, Position};

pub const CIRCLE_PACKING: &str = "circlePacking";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    /// Synthetic id, unique within the hierarchy.
    pub id: ElementId,
    /// Primary node this circle stands for, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<ElementId>,
    #[serde(default)]
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    pub fn leaf(id: impl Into<ElementId>, original: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            original: Some(original.into()),
            children: Vec::new(),
        }
    }

    pub fn group(id: impl Into<ElementId>, children: Vec<HierarchyNode>) -> Self {
        Self {
            id: id.into(),
            original: None,
            children,
        }
    }

    /// Two-level hierarchy: a root containing one circle per cluster, each
    /// containing its members. A node listed in several clusters gets one
    /// synthetic leaf per cluster, id `"<cluster>/<member>"`.
    pub fn from_clusters(root: &str, clusters: &[(String, Vec<ElementId>)]) -> Self {
        let children = clusters
            .iter()
            .map(|(name, members)| {
                let leaves = members
                    .iter()
                    .map(|member| HierarchyNode::leaf(format!("{name}/{member}"), member.clone()))
                    .collect();
                HierarchyNode::group(name.as_str(), leaves)
            })
            .collect();
        HierarchyNode::group(root, children)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Drop leaves standing for any of `removed`, and groups left empty by
    /// that. The root itself is kept. Returns how many leaves were dropped.
    pub fn prune(&mut self, removed: &HashSet<ElementId>) -> usize {
        let mut dropped = 0;
        self.children.retain_mut(|child| {
            if child.is_leaf() {
                let gone = child.original.as_ref().is_some_and(|id| removed.contains(id));
                dropped += usize::from(gone);
                return !gone;
            }
            dropped += child.prune(removed);
            !child.is_leaf()
        });
        dropped
    }
}

#[derive(Debug, Clone)]
pub struct CirclePackingBuilder {
    pub leaf_radius: f64,
    pub padding: f64,
}

impl Default for CirclePackingBuilder {
    fn default() -> Self {
        Self {
            leaf_radius: 10.0,
            padding: 4.0,
        }
    }
}

/// Radius of every circle in a subtree, parent before children.
struct Packed {
    radius: f64,
    /// Offsets of the children's centers from this circle's center.
    offsets: Vec<(f64, f64)>,
    children: Vec<Packed>,
}

impl CirclePackingBuilder {
    pub fn new(leaf_radius: f64, padding: f64) -> Self {
        Self {
            leaf_radius,
            padding,
        }
    }

    /// Children are placed on a ring, each taking an arc proportional to its
    /// diameter. A ring radius of a quarter of the summed arc lengths keeps
    /// neighbouring circles from overlapping.
    fn pack(&self, node: &HierarchyNode) -> Packed {
        if node.is_leaf() {
            return Packed {
                radius: self.leaf_radius,
                offsets: Vec::new(),
                children: Vec::new(),
            };
        }

        let children: Vec<Packed> = node.children.iter().map(|c| self.pack(c)).collect();
        if let [only] = children.as_slice() {
            return Packed {
                radius: only.radius + self.padding,
                offsets: vec![(0.0, 0.0)],
                children,
            };
        }

        let spans: Vec<f64> = children
            .iter()
            .map(|c| 2.0 * c.radius + self.padding)
            .collect();
        let total: f64 = spans.iter().sum();
        let ring = total / 4.0;

        let mut offsets = Vec::with_capacity(children.len());
        let mut angle = 0.0;
        for span in &spans {
            let arc = TAU * span / total;
            let mid = angle + arc / 2.0;
            offsets.push((ring * mid.cos(), ring * mid.sin()));
            angle += arc;
        }

        let widest = children.iter().map(|c| c.radius).fold(0.0, f64::max);
        Packed {
            radius: ring + widest + self.padding,
            offsets,
            children,
        }
    }

    /// Build the circle-packing view of `primary`. The selection is seeded
    /// from the primary view.
    pub fn build(&self, primary: &NetworkView, root: &HierarchyNode) -> NetworkView {
        let packed = self.pack(root);
        let mut view = NetworkView::secondary(
            primary.id().clone(),
            CIRCLE_PACKING,
            primary.network_values().clone(),
        );
        self.place(primary, root, &packed, Position::default(), &mut view);

        let selected: Vec<ElementId> = primary
            .selected_nodes()
            .iter()
            .flat_map(|id| view.local_ids(id))
            .collect();
        view.set_selection(selected, Vec::new());

        tracing::debug!(
            "Built {} view of {} with {} circles",
            CIRCLE_PACKING,
            primary.id(),
            view.node_count()
        );
        view
    }

    fn place(
        &self,
        primary: &NetworkView,
        node: &HierarchyNode,
        packed: &Packed,
        center: Position,
        view: &mut NetworkView,
    ) {
        if let Some(original) = &node.original
            && primary.node_view(original).is_none()
        {
            tracing::trace!("Skipping circle {} for missing node {}", node.id, original);
            return;
        }

        let mut values = node
            .original
            .as_ref()
            .and_then(|id| primary.node_view(id))
            .map(|v| (*v.values).clone())
            .unwrap_or_else(BTreeMap::new);
        let diameter = VisualValue::Number(packed.radius * 2.0);
        values.insert(VisualPropertyName::NodeWidth, diameter.clone());
        values.insert(VisualPropertyName::NodeHeight, diameter);

        view.insert_node(NodeView {
            id: node.id.clone(),
            values: Arc::new(values),
            position: center,
        });
        if let Some(original) = &node.original {
            view.link(node.id.clone(), original.clone());
        }

        for ((child, child_packed), (dx, dy)) in node
            .children
            .iter()
            .zip(&packed.children)
            .zip(&packed.offsets)
        {
            let child_center = Position::new(center.x + dx, center.y + dy);
            self.place(primary, child, child_packed, child_center, view);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netview_core::{Network, NetworkTables};
    use netview_style::{MapperSet, VisualStyle, compute_network_values};

    fn primary() -> NetworkView {
        let mut network = Network::new("net");
        for id in ["a", "b", "c", "d"] {
            network.add_node(id).unwrap();
        }
        let mut style = VisualStyle::new();
        style
            .set_default(VisualPropertyName::NodeLabelFontSize, VisualValue::Number(20.0))
            .unwrap();
        let computed =
            compute_network_values(&style, &MapperSet::default(), &network, &NetworkTables::new());
        NetworkView::from_computed(&network, &computed, None)
    }

    fn clusters() -> HierarchyNode {
        HierarchyNode::from_clusters(
            "root",
            &[
                ("left".to_string(), vec!["a".into(), "b".into()]),
                ("right".to_string(), vec!["c".into(), "d".into(), "a".into()]),
            ],
        )
    }

    fn radius(view: &NetworkView, id: &str) -> f64 {
        let node = view.node_view(&id.into()).unwrap();
        node.value(VisualPropertyName::NodeWidth)
            .and_then(VisualValue::as_number)
            .unwrap()
            / 2.0
    }

    fn distance(a: Position, b: Position) -> f64 {
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
    }

    #[test]
    fn test_view_has_synthetic_ids_and_id_map() {
        let view = CirclePackingBuilder::default().build(&primary(), &clusters());

        assert_eq!(view.view_type(), Some(CIRCLE_PACKING));
        // root + 2 clusters + 5 leaves
        assert_eq!(view.node_count(), 8);
        let map = view.id_map().unwrap();
        assert_eq!(map.synthetics_of(&"a".into()).len(), 2);
        assert_eq!(map.original_of(&"right/c".into()), Some(&ElementId::from("c")));
        assert_eq!(map.original_of(&"left".into()), None);
    }

    #[test]
    fn test_leaves_inherit_primary_values() {
        let view = CirclePackingBuilder::default().build(&primary(), &clusters());
        let leaf = view.node_view(&"left/b".into()).unwrap();
        assert_eq!(
            leaf.value(VisualPropertyName::NodeLabelFontSize),
            Some(&VisualValue::Number(20.0))
        );
        assert_eq!(
            leaf.value(VisualPropertyName::NodeWidth),
            Some(&VisualValue::Number(20.0))
        );
    }

    #[test]
    fn test_children_fit_inside_parent_without_overlap() {
        let builder = CirclePackingBuilder::new(10.0, 4.0);
        let view = builder.build(&primary(), &clusters());

        let leaves = ["right/c", "right/d", "right/a"];
        let parent = view.position(&"right".into()).unwrap();
        let parent_radius = radius(&view, "right");
        for (i, a) in leaves.iter().enumerate() {
            let pa = view.position(&(*a).into()).unwrap();
            assert!(distance(pa, parent) + radius(&view, a) <= parent_radius + 1e-9);
            for b in &leaves[i + 1..] {
                let pb = view.position(&(*b).into()).unwrap();
                assert!(distance(pa, pb) >= radius(&view, a) + radius(&view, b) - 1e-9);
            }
        }
    }

    #[test]
    fn test_prune_drops_leaves_and_emptied_groups() {
        let mut root = clusters();
        let removed: HashSet<ElementId> = ["a", "b"].into_iter().map(ElementId::from).collect();
        assert_eq!(root.prune(&removed), 3);

        assert_eq!(root.children.len(), 1);
        let right = &root.children[0];
        assert_eq!(right.id, ElementId::from("right"));
        let leaves: Vec<_> = right.children.iter().map(|c| c.id.0.as_str()).collect();
        assert_eq!(leaves, vec!["right/c", "right/d"]);
    }

    #[test]
    fn test_leaves_of_missing_primary_nodes_are_skipped() {
        let root = HierarchyNode::from_clusters(
            "root",
            &[("only".to_string(), vec!["a".into(), "gone".into()])],
        );
        let view = CirclePackingBuilder::default().build(&primary(), &root);

        assert!(view.node_view(&"only/a".into()).is_some());
        assert!(view.node_view(&"only/gone".into()).is_none());
        assert!(view.id_map().unwrap().synthetics_of(&"gone".into()).is_empty());
    }

    #[test]
    fn test_selection_is_seeded_from_primary() {
        let mut primary = primary();
        primary.set_selection(vec!["a".into()], Vec::new());
        let view = CirclePackingBuilder::default().build(&primary, &clusters());

        let mut selected: Vec<_> = view.selected_nodes().to_vec();
        selected.sort();
        assert_eq!(selected, vec![ElementId::from("left/a"), ElementId::from("right/a")]);
    }
}
