//! View-model store: the only mutation path for selection, positions and
//! element removal across every view of a network.
//!
//! Each network has an ordered list of views; index 0 is the primary view.
//! Unknown networks, views and ids are ignored.

use netview_core::{ElementId, NetworkId};
use netview_style::VisualStyleStore;
use std::collections::{HashMap, HashSet};

use crate::view_model::{Member, NetworkView, Position};

/// Notified after elements are deleted so dependents can drop their
/// per-element state.
pub trait ElementRemovalObserver {
    fn elements_removed(&mut self, network: &NetworkId, ids: &[ElementId]);
}

impl ElementRemovalObserver for VisualStyleStore {
    fn elements_removed(&mut self, network: &NetworkId, ids: &[ElementId]) {
        if let Some(style) = self.get_mut(network) {
            let pruned = style.prune_bypasses(ids);
            if pruned > 0 {
                tracing::debug!("Pruned {} bypass entries in network {}", pruned, network);
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct ViewModelStore {
    views: HashMap<NetworkId, Vec<NetworkView>>,
}

impl ViewModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a view. A primary view replaces the current primary; a secondary
    /// view replaces any view of the same type.
    pub fn add_view(&mut self, view: NetworkView) {
        let views = self.views.entry(view.id().clone()).or_default();
        if view.is_primary() {
            match views.first() {
                Some(first) if first.is_primary() => views[0] = view,
                _ => views.insert(0, view),
            }
            return;
        }
        match views
            .iter()
            .position(|v| v.view_type() == view.view_type())
        {
            Some(index) => views[index] = view,
            None => views.push(view),
        }
    }

    pub fn views(&self, network: &NetworkId) -> &[NetworkView] {
        self.views.get(network).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn primary(&self, network: &NetworkId) -> Option<&NetworkView> {
        self.views
            .get(network)
            .and_then(|views| views.first())
            .filter(|view| view.is_primary())
    }

    /// `view_type == None` addresses the primary view.
    pub fn view(&self, network: &NetworkId, view_type: Option<&str>) -> Option<&NetworkView> {
        self.views
            .get(network)?
            .iter()
            .find(|view| view.view_type() == view_type)
    }

    fn view_mut(&mut self, network: &NetworkId, view_type: Option<&str>) -> Option<&mut NetworkView> {
        self.views
            .get_mut(network)?
            .iter_mut()
            .find(|view| view.view_type() == view_type)
    }

    pub fn remove_view(&mut self, network: &NetworkId, view_type: &str) -> Option<NetworkView> {
        let views = self.views.get_mut(network)?;
        let index = views
            .iter()
            .position(|view| view.view_type() == Some(view_type))?;
        Some(views.remove(index))
    }

    pub fn remove_network(&mut self, network: &NetworkId) -> Option<Vec<NetworkView>> {
        self.views.remove(network)
    }

    pub fn contains(&self, network: &NetworkId) -> bool {
        self.views.contains_key(network)
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Translate synthetic ids of any secondary view to the primary ids they
    /// stand for. Primary ids and unknown ids pass through unchanged.
    fn to_primary(&self, network: &NetworkId, ids: &[ElementId]) -> Vec<ElementId> {
        let views = self.views(network);
        let primary = views.first().filter(|view| view.is_primary());
        ids.iter()
            .map(|id| {
                if primary.is_some_and(|view| view.member(id).is_some()) {
                    return id.clone();
                }
                views
                    .iter()
                    .find_map(|view| view.original_of(id))
                    .unwrap_or(id)
                    .clone()
            })
            .collect()
    }

    /// Replace the selection of every view of `network`. Ids may be primary
    /// ids or synthetic ids of a secondary view; every view selects the
    /// elements standing for the same primary element.
    pub fn exclusive_select(
        &mut self,
        network: &NetworkId,
        node_ids: &[ElementId],
        edge_ids: &[ElementId],
    ) {
        let node_ids = self.to_primary(network, node_ids);
        let edge_ids = self.to_primary(network, edge_ids);
        let Some(views) = self.views.get_mut(network) else {
            tracing::trace!("exclusive_select on unknown network {}", network);
            return;
        };
        for view in views.iter_mut() {
            let (mut nodes, mut edges) = (Vec::new(), Vec::new());
            for id in node_ids.iter().chain(&edge_ids) {
                for local in view.local_ids(id) {
                    match view.member(&local) {
                        Some(Member::Node) => nodes.push(local),
                        Some(Member::Edge) => edges.push(local),
                        None => {}
                    }
                }
            }
            view.set_selection(nodes, edges);
        }
    }

    /// Add `ids` to the selection. Whether an id is a node or an edge is
    /// decided by the view it is found in.
    pub fn additive_select(&mut self, network: &NetworkId, ids: &[ElementId]) {
        self.for_each_local(network, ids, |view, member, local| view.select(member, local));
    }

    pub fn additive_unselect(&mut self, network: &NetworkId, ids: &[ElementId]) {
        self.for_each_local(network, ids, |view, member, local| view.unselect(member, local));
    }

    /// Flip the membership of each distinct primary element.
    pub fn toggle_selected(&mut self, network: &NetworkId, ids: &[ElementId]) {
        let mut seen = HashSet::new();
        let distinct: Vec<ElementId> = self
            .to_primary(network, ids)
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();
        self.for_each_local(network, &distinct, |view, member, local| {
            if view.is_selected(local) {
                view.unselect(member, local);
            } else {
                view.select(member, local);
            }
        });
    }

    fn for_each_local(
        &mut self,
        network: &NetworkId,
        ids: &[ElementId],
        mut apply: impl FnMut(&mut NetworkView, Member, &ElementId),
    ) {
        let ids = self.to_primary(network, ids);
        let Some(views) = self.views.get_mut(network) else {
            tracing::trace!("Selection change on unknown network {}", network);
            return;
        };
        for view in views.iter_mut() {
            for id in &ids {
                let locals = view.local_ids(id);
                if locals.is_empty() {
                    tracing::trace!("Id {} not present in view {:?}", id, view.view_type());
                }
                for local in locals {
                    if let Some(member) = view.member(&local) {
                        apply(view, member, &local);
                    }
                }
            }
        }
    }

    /// Exclusive selection expressed in a secondary view's ids. The ids are
    /// translated to primary ids and propagated to every view.
    pub fn exclusive_select_in_view(
        &mut self,
        network: &NetworkId,
        view_type: &str,
        node_ids: &[ElementId],
        edge_ids: &[ElementId],
    ) {
        let Some(view) = self.view(network, Some(view_type)) else {
            tracing::trace!("No {} view for network {}", view_type, network);
            return;
        };
        let translate = |ids: &[ElementId]| -> Vec<ElementId> {
            ids.iter()
                .filter_map(|id| match view.id_map() {
                    Some(map) => map.original_of(id).cloned(),
                    None => Some(id.clone()),
                })
                .collect()
        };
        let nodes = translate(node_ids);
        let edges = translate(edge_ids);
        self.exclusive_select(network, &nodes, &edges);
    }

    // ========================================================================
    // Positions
    // ========================================================================

    /// Returns false when the view or node does not exist.
    pub fn set_node_position(
        &mut self,
        network: &NetworkId,
        view_type: Option<&str>,
        id: &ElementId,
        position: Position,
    ) -> bool {
        match self
            .view_mut(network, view_type)
            .and_then(|view| view.node_view_mut(id))
        {
            Some(node) => {
                node.position = position;
                true
            }
            None => {
                tracing::trace!("Ignoring position for unknown node {}", id);
                false
            }
        }
    }

    /// Batch form of [`set_node_position`](Self::set_node_position); returns
    /// how many positions were applied.
    pub fn update_node_positions(
        &mut self,
        network: &NetworkId,
        view_type: Option<&str>,
        positions: impl IntoIterator<Item = (ElementId, Position)>,
    ) -> usize {
        let Some(view) = self.view_mut(network, view_type) else {
            tracing::trace!("Ignoring positions for unknown view of {}", network);
            return 0;
        };
        let mut applied = 0;
        for (id, position) in positions {
            if let Some(node) = view.node_view_mut(&id) {
                node.position = position;
                applied += 1;
            }
        }
        applied
    }

    /// Scale node positions about their centroid. With `selected_only`, only
    /// selected nodes move and the centroid is theirs.
    pub fn scale_positions(
        &mut self,
        network: &NetworkId,
        view_type: Option<&str>,
        scale_x: f64,
        scale_y: f64,
        selected_only: bool,
    ) {
        let Some(view) = self.view_mut(network, view_type) else {
            return;
        };
        let selected: HashSet<ElementId> = view.selected_nodes().iter().cloned().collect();
        let mut targets: Vec<_> = view
            .node_views_mut()
            .filter(|node| !selected_only || selected.contains(&node.id))
            .collect();
        if targets.is_empty() {
            return;
        }

        let count = targets.len() as f64;
        let cx = targets.iter().map(|n| n.position.x).sum::<f64>() / count;
        let cy = targets.iter().map(|n| n.position.y).sum::<f64>() / count;
        for node in targets.iter_mut() {
            node.position.x = cx + (node.position.x - cx) * scale_x;
            node.position.y = cy + (node.position.y - cy) * scale_y;
        }
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Remove elements from every view of `network`, then notify `observer`.
    /// Returns the number of view entries removed across all views.
    pub fn delete_objects(
        &mut self,
        network: &NetworkId,
        ids: &[ElementId],
        observer: &mut dyn ElementRemovalObserver,
    ) -> usize {
        let Some(views) = self.views.get_mut(network) else {
            return 0;
        };
        let removed: usize = views.iter_mut().map(|view| view.remove_elements(ids)).sum();
        observer.elements_removed(network, ids);
        removed
    }
}
