//! Headless workbench tying networks, styles, view models and layout together.
//!
//! Every mutation goes through [`Workbench`], which keeps the primary view of
//! each network in sync with its style and tables and publishes an [`Event`]
//! for each observable change.

use netview_core::{
    AttributeValue, CoreError, ElementId, ElementKind, Network, NetworkId, NetworkTables,
    RemovedElements,
};
use netview_events::telemetry::{
    CMD_ADD_NETWORK, CMD_DELETE_OBJECTS, CMD_IMPORT_STYLE, CMD_RUN_LAYOUT, CMD_SET_MAPPING,
    CommandSpan,
};
use netview_events::{Event, EventBus, RecomputeCause};
use netview_style::{
    MapperSet, MappingFunction, StyleError, StyleSnapshot, VisualPropertyGroup, VisualPropertyName,
    VisualStyle, VisualStyleStore, VisualValue, compute_network_values,
};
use netview_view::{
    HierarchyNode, LayoutAlgorithm, LayoutInput, LayoutOutcome, LayoutRunner, LayoutStart,
    NetworkView, Position, ViewModelStore,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

pub mod settings;

pub use settings::{LayoutKind, WorkbenchSettings};

#[derive(Debug, Error)]
pub enum WorkbenchError {
    #[error("unknown network: {0}")]
    UnknownNetwork(NetworkId),
    #[error("network already exists: {0}")]
    DuplicateNetwork(NetworkId),
    #[error("network {network} has no {view_type} view")]
    UnknownView {
        network: NetworkId,
        view_type: String,
    },
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Style(#[from] StyleError),
    #[error("invalid style document: {0}")]
    StyleDocument(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WorkbenchError>;

/// Install a `fmt` subscriber at `level` (e.g. `"debug"`). Unparseable levels
/// fall back to `info`; a subscriber that is already installed is kept.
pub fn init_tracing(level: &str) {
    let level = level.parse().unwrap_or(tracing::Level::INFO);
    let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
}

struct NetworkEntry {
    network: Network,
    tables: NetworkTables,
    /// Source of the circle-packing view, rebuilt on every recompute.
    hierarchy: Option<HierarchyNode>,
}

#[derive(Default)]
struct WorkbenchState {
    networks: HashMap<NetworkId, NetworkEntry>,
    styles: VisualStyleStore,
    mappers: HashMap<NetworkId, MapperSet>,
    views: ViewModelStore,
    layouts: LayoutRunner,
}

impl WorkbenchState {
    fn entry(&self, network: &NetworkId) -> Result<&NetworkEntry> {
        self.networks
            .get(network)
            .ok_or_else(|| WorkbenchError::UnknownNetwork(network.clone()))
    }

    fn entry_mut(&mut self, network: &NetworkId) -> Result<&mut NetworkEntry> {
        self.networks
            .get_mut(network)
            .ok_or_else(|| WorkbenchError::UnknownNetwork(network.clone()))
    }

    fn recompile(&mut self, network: &NetworkId) {
        if let Some(style) = self.styles.get(network) {
            self.mappers
                .insert(network.clone(), MapperSet::compile(style));
        }
    }

    /// Rebuild the primary view (and the circle-packing view, if any) from
    /// the current style and tables.
    fn recompute(&mut self, network: &NetworkId, settings: &WorkbenchSettings) -> Result<()> {
        let entry = self
            .networks
            .get(network)
            .ok_or_else(|| WorkbenchError::UnknownNetwork(network.clone()))?;
        let style = self
            .styles
            .get(network)
            .ok_or_else(|| WorkbenchError::UnknownNetwork(network.clone()))?;
        let mappers = self
            .mappers
            .entry(network.clone())
            .or_insert_with(|| MapperSet::compile(style));

        let computed = compute_network_values(style, mappers, &entry.network, &entry.tables);
        let view = NetworkView::from_computed(
            &entry.network,
            &computed,
            self.views.primary(network),
        );
        self.views.add_view(view);

        if let Some(root) = &entry.hierarchy
            && let Some(primary) = self.views.primary(network)
        {
            let packed = settings.circle_packing_builder().build(primary, root);
            self.views.add_view(packed);
        }
        Ok(())
    }
}

/// GUI-agnostic orchestrator. Cloning shares the same state.
#[derive(Clone)]
pub struct Workbench {
    state: Arc<Mutex<WorkbenchState>>,
    bus: EventBus,
    settings: Arc<WorkbenchSettings>,
}

impl Default for Workbench {
    fn default() -> Self {
        Self::new(WorkbenchSettings::default())
    }
}

impl Workbench {
    pub fn new(settings: WorkbenchSettings) -> Self {
        Self {
            state: Arc::new(Mutex::new(WorkbenchState::default())),
            bus: EventBus::new(),
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &WorkbenchSettings {
        &self.settings
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    fn recomputed(
        &self,
        state: &mut WorkbenchState,
        network: &NetworkId,
        cause: RecomputeCause,
    ) -> Result<()> {
        state.recompute(network, &self.settings)?;
        self.bus.publish(Event::ViewRecomputed {
            network: network.clone(),
            cause,
        });
        Ok(())
    }

    // ========================================================================
    // Networks
    // ========================================================================

    pub fn add_network(&self, network: Network, tables: NetworkTables) -> Result<()> {
        self.add_network_with_style(network, tables, VisualStyle::new())
    }

    pub fn add_network_with_style(
        &self,
        network: Network,
        tables: NetworkTables,
        style: VisualStyle,
    ) -> Result<()> {
        let span = CommandSpan::start(CMD_ADD_NETWORK);
        let result = (|| -> Result<()> {
            let mut state = self.state.lock();
            let id = network.id.clone();
            if state.networks.contains_key(&id) {
                return Err(WorkbenchError::DuplicateNetwork(id));
            }
            let (nodes, edges) = (network.node_count(), network.edge_count());
            state.styles.insert(id.clone(), style);
            state.networks.insert(
                id.clone(),
                NetworkEntry {
                    network,
                    tables,
                    hierarchy: None,
                },
            );
            state.recompile(&id);
            self.bus.publish(Event::NetworkAdded {
                network: id.clone(),
                nodes,
                edges,
            });
            self.recomputed(&mut state, &id, RecomputeCause::NetworkAdded)
        })();
        span.finish(result)
    }

    /// Drop a network with its style, views and pending layouts.
    pub fn remove_network(&self, network: &NetworkId) -> Result<()> {
        let mut state = self.state.lock();
        if state.networks.remove(network).is_none() {
            return Err(WorkbenchError::UnknownNetwork(network.clone()));
        }
        state.styles.remove(network);
        state.mappers.remove(network);
        state.views.remove_network(network);
        let cancelled = state.layouts.cancel_network(network);
        if cancelled > 0 {
            tracing::debug!("Cancelled {} layouts of removed network {}", cancelled, network);
        }
        self.bus.publish(Event::NetworkRemoved {
            network: network.clone(),
        });
        Ok(())
    }

    pub fn network_ids(&self) -> Vec<NetworkId> {
        let mut ids: Vec<NetworkId> = self.state.lock().networks.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn contains_network(&self, network: &NetworkId) -> bool {
        self.state.lock().networks.contains_key(network)
    }

    // ========================================================================
    // Style
    // ========================================================================

    fn edit_style(
        &self,
        network: &NetworkId,
        property: VisualPropertyName,
        recompile: bool,
        edit: impl FnOnce(&mut VisualStyle, &Network) -> Result<()>,
    ) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let entry = state
            .networks
            .get(network)
            .ok_or_else(|| WorkbenchError::UnknownNetwork(network.clone()))?;
        let style = state
            .styles
            .get_mut(network)
            .ok_or_else(|| WorkbenchError::UnknownNetwork(network.clone()))?;
        edit(style, &entry.network)?;
        if recompile {
            state.recompile(network);
        }
        self.bus.publish(Event::StyleChanged {
            network: network.clone(),
            property: property.to_string(),
        });
        self.recomputed(state, network, RecomputeCause::StyleChanged)
    }

    pub fn set_default(
        &self,
        network: &NetworkId,
        property: VisualPropertyName,
        value: VisualValue,
    ) -> Result<()> {
        self.edit_style(network, property, false, |style, _| {
            Ok(style.set_default(property, value)?)
        })
    }

    pub fn set_mapping(
        &self,
        network: &NetworkId,
        property: VisualPropertyName,
        mapping: MappingFunction,
    ) -> Result<()> {
        let span = CommandSpan::start(CMD_SET_MAPPING);
        let result = self.edit_style(network, property, true, |style, _| {
            Ok(style.set_mapping(property, mapping)?)
        });
        span.finish(result)
    }

    pub fn remove_mapping(&self, network: &NetworkId, property: VisualPropertyName) -> Result<()> {
        self.edit_style(network, property, true, |style, _| {
            style.remove_mapping(property);
            Ok(())
        })
    }

    pub fn set_bypass(
        &self,
        network: &NetworkId,
        property: VisualPropertyName,
        ids: &[ElementId],
        value: VisualValue,
    ) -> Result<()> {
        self.edit_style(network, property, false, |style, topology| {
            let known: Vec<&ElementId> = ids
                .iter()
                .filter(|id| {
                    let exists = match property.group() {
                        VisualPropertyGroup::Node => topology.contains_node(id),
                        VisualPropertyGroup::Edge => topology.contains_edge(id),
                        VisualPropertyGroup::Network => **id == ElementId(topology.id.0.clone()),
                    };
                    if !exists {
                        tracing::trace!("Ignoring {} bypass for unknown element {}", property, id);
                    }
                    exists
                })
                .collect();
            Ok(style.set_bypass(property, known, value)?)
        })
    }

    /// Returns how many bypass entries were removed.
    pub fn delete_bypass(
        &self,
        network: &NetworkId,
        property: VisualPropertyName,
        ids: &[ElementId],
    ) -> Result<usize> {
        let mut removed = 0;
        self.edit_style(network, property, false, |style, _| {
            removed = style.delete_bypass(property, ids);
            Ok(())
        })?;
        Ok(removed)
    }

    /// Replace the whole style of `network` from a snapshot.
    pub fn import_style(&self, network: &NetworkId, snapshot: &StyleSnapshot) -> Result<()> {
        let span = CommandSpan::start(CMD_IMPORT_STYLE);
        let result = (|| -> Result<()> {
            let style = VisualStyle::from_snapshot(snapshot)?;
            let mut state = self.state.lock();
            state.entry(network)?;
            state.styles.insert(network.clone(), style);
            state.recompile(network);
            self.bus.publish(Event::StyleImported {
                network: network.clone(),
            });
            self.recomputed(&mut state, network, RecomputeCause::StyleChanged)
        })();
        span.finish(result)
    }

    pub fn import_style_json(&self, network: &NetworkId, json: &str) -> Result<()> {
        let snapshot: StyleSnapshot = serde_json::from_str(json)?;
        self.import_style(network, &snapshot)
    }

    pub fn export_style(&self, network: &NetworkId) -> Result<StyleSnapshot> {
        let state = self.state.lock();
        state
            .styles
            .get(network)
            .map(VisualStyle::snapshot)
            .ok_or_else(|| WorkbenchError::UnknownNetwork(network.clone()))
    }

    pub fn export_style_json(&self, network: &NetworkId) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export_style(network)?)?)
    }

    // ========================================================================
    // Tables
    // ========================================================================

    pub fn set_attribute(
        &self,
        network: &NetworkId,
        kind: ElementKind,
        id: &ElementId,
        column: &str,
        value: AttributeValue,
    ) -> Result<()> {
        let mut state = self.state.lock();
        let tables = &mut state.entry_mut(network)?.tables;
        match kind {
            ElementKind::Node => tables.nodes.set_value(id, column, value)?,
            ElementKind::Edge => tables.edges.set_value(id, column, value)?,
        }
        self.bus.publish(Event::TableChanged {
            network: network.clone(),
            column: Some(column.to_string()),
        });
        self.recomputed(&mut state, network, RecomputeCause::TableChanged)
    }

    pub fn set_network_attribute(
        &self,
        network: &NetworkId,
        column: &str,
        value: AttributeValue,
    ) -> Result<()> {
        let mut state = self.state.lock();
        let row_id = ElementId(network.0.clone());
        state
            .entry_mut(network)?
            .tables
            .network
            .set_value(&row_id, column, value)?;
        self.bus.publish(Event::TableChanged {
            network: network.clone(),
            column: Some(column.to_string()),
        });
        self.recomputed(&mut state, network, RecomputeCause::TableChanged)
    }

    pub fn replace_tables(&self, network: &NetworkId, tables: NetworkTables) -> Result<()> {
        let mut state = self.state.lock();
        state.entry_mut(network)?.tables = tables;
        self.bus.publish(Event::TableChanged {
            network: network.clone(),
            column: None,
        });
        self.recomputed(&mut state, network, RecomputeCause::TableChanged)
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Copy of a view; `view_type == None` is the primary view.
    pub fn view(&self, network: &NetworkId, view_type: Option<&str>) -> Option<NetworkView> {
        self.state.lock().views.view(network, view_type).cloned()
    }

    pub fn primary_view(&self, network: &NetworkId) -> Option<NetworkView> {
        self.view(network, None)
    }

    pub fn with_view<R>(
        &self,
        network: &NetworkId,
        view_type: Option<&str>,
        read: impl FnOnce(&NetworkView) -> R,
    ) -> Option<R> {
        self.state.lock().views.view(network, view_type).map(read)
    }

    /// Computed value of one node in the primary view.
    pub fn node_value(
        &self,
        network: &NetworkId,
        id: &ElementId,
        property: VisualPropertyName,
    ) -> Option<VisualValue> {
        self.with_view(network, None, |view| {
            view.node_view(id).and_then(|n| n.value(property).cloned())
        })
        .flatten()
    }

    pub fn edge_value(
        &self,
        network: &NetworkId,
        id: &ElementId,
        property: VisualPropertyName,
    ) -> Option<VisualValue> {
        self.with_view(network, None, |view| {
            view.edge_view(id).and_then(|e| e.value(property).cloned())
        })
        .flatten()
    }

    /// Build (or rebuild) the circle-packing view from named clusters of
    /// primary nodes.
    pub fn build_hierarchy_view(
        &self,
        network: &NetworkId,
        clusters: &[(String, Vec<ElementId>)],
    ) -> Result<()> {
        let mut state = self.state.lock();
        let root = HierarchyNode::from_clusters(&network.0, clusters);
        state.entry_mut(network)?.hierarchy = Some(root);
        state.recompute(network, &self.settings)?;
        self.bus.publish(Event::SecondaryViewBuilt {
            network: network.clone(),
            view_type: netview_view::CIRCLE_PACKING.to_string(),
        });
        Ok(())
    }

    pub fn remove_hierarchy_view(&self, network: &NetworkId) -> Result<()> {
        let mut state = self.state.lock();
        state.entry_mut(network)?.hierarchy = None;
        state
            .views
            .remove_view(network, netview_view::CIRCLE_PACKING)
            .map(|_| ())
            .ok_or_else(|| WorkbenchError::UnknownView {
                network: network.clone(),
                view_type: netview_view::CIRCLE_PACKING.to_string(),
            })
    }

    // ========================================================================
    // Selection
    // ========================================================================

    fn selection_changed(&self, state: &WorkbenchState, network: &NetworkId) {
        if let Some(primary) = state.views.primary(network) {
            self.bus.publish(Event::SelectionChanged {
                network: network.clone(),
                selected_nodes: primary.selected_nodes().to_vec(),
                selected_edges: primary.selected_edges().to_vec(),
            });
        }
    }

    pub fn exclusive_select(
        &self,
        network: &NetworkId,
        node_ids: &[ElementId],
        edge_ids: &[ElementId],
    ) {
        let mut state = self.state.lock();
        state.views.exclusive_select(network, node_ids, edge_ids);
        self.selection_changed(&state, network);
    }

    pub fn exclusive_select_in_view(
        &self,
        network: &NetworkId,
        view_type: &str,
        node_ids: &[ElementId],
        edge_ids: &[ElementId],
    ) {
        let mut state = self.state.lock();
        state
            .views
            .exclusive_select_in_view(network, view_type, node_ids, edge_ids);
        self.selection_changed(&state, network);
    }

    pub fn additive_select(&self, network: &NetworkId, ids: &[ElementId]) {
        let mut state = self.state.lock();
        state.views.additive_select(network, ids);
        self.selection_changed(&state, network);
    }

    pub fn additive_unselect(&self, network: &NetworkId, ids: &[ElementId]) {
        let mut state = self.state.lock();
        state.views.additive_unselect(network, ids);
        self.selection_changed(&state, network);
    }

    pub fn toggle_selected(&self, network: &NetworkId, ids: &[ElementId]) {
        let mut state = self.state.lock();
        state.views.toggle_selected(network, ids);
        self.selection_changed(&state, network);
    }

    // ========================================================================
    // Positions
    // ========================================================================

    pub fn set_node_position(
        &self,
        network: &NetworkId,
        view_type: Option<&str>,
        id: &ElementId,
        position: Position,
    ) -> bool {
        let applied = self
            .state
            .lock()
            .views
            .set_node_position(network, view_type, id, position);
        if applied {
            self.positions_updated(network, view_type, 1);
        }
        applied
    }

    pub fn update_node_positions(
        &self,
        network: &NetworkId,
        view_type: Option<&str>,
        positions: impl IntoIterator<Item = (ElementId, Position)>,
    ) -> usize {
        let applied = self
            .state
            .lock()
            .views
            .update_node_positions(network, view_type, positions);
        if applied > 0 {
            self.positions_updated(network, view_type, applied);
        }
        applied
    }

    pub fn scale_positions(
        &self,
        network: &NetworkId,
        view_type: Option<&str>,
        scale_x: f64,
        scale_y: f64,
        selected_only: bool,
    ) {
        let count = {
            let mut state = self.state.lock();
            state
                .views
                .scale_positions(network, view_type, scale_x, scale_y, selected_only);
            state
                .views
                .view(network, view_type)
                .map(|view| view.node_count())
                .unwrap_or(0)
        };
        if count > 0 {
            self.positions_updated(network, view_type, count);
        }
    }

    fn positions_updated(&self, network: &NetworkId, view_type: Option<&str>, count: usize) {
        self.bus.publish(Event::PositionsUpdated {
            network: network.clone(),
            view_type: view_type.map(str::to_string),
            count,
        });
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    /// Delete nodes and edges. Edges incident to deleted nodes go too; their
    /// table rows, view entries, selection and bypasses are dropped.
    pub fn delete_objects(&self, network: &NetworkId, ids: &[ElementId]) -> Result<RemovedElements> {
        let span = CommandSpan::start(CMD_DELETE_OBJECTS);
        let result = (|| -> Result<RemovedElements> {
            let mut state = self.state.lock();
            let state = &mut *state;
            let entry = state.entry_mut(network)?;
            let removed = entry.network.remove_elements(ids);
            entry.tables.nodes.remove_rows(&removed.nodes);
            entry.tables.edges.remove_rows(&removed.edges);
            if let Some(root) = entry.hierarchy.as_mut() {
                let gone: HashSet<ElementId> = removed.nodes.iter().cloned().collect();
                let dropped = root.prune(&gone);
                tracing::debug!("Dropped {} circles from the hierarchy of {}", dropped, network);
            }

            let all: Vec<ElementId> = removed.all().cloned().collect();
            state.views.delete_objects(network, &all, &mut state.styles);
            self.bus.publish(Event::ObjectsDeleted {
                network: network.clone(),
                ids: all,
            });
            self.selection_changed(state, network);
            Ok(removed)
        })();
        span.finish(result)
    }

    // ========================================================================
    // Layout
    // ========================================================================

    pub fn run_layout(&self, network: &NetworkId, view_type: Option<&str>) -> LayoutStart {
        let algorithm = self.settings.layout_algorithm(self.settings.default_layout);
        self.run_layout_with(network, view_type, algorithm.as_ref())
    }

    /// Start `algorithm` on a view. Results are applied by
    /// [`process_layout_results`](Self::process_layout_results).
    ///
    /// An absent network or view counts as empty: a warning is published and
    /// the algorithm is not invoked.
    pub fn run_layout_with(
        &self,
        network: &NetworkId,
        view_type: Option<&str>,
        algorithm: &dyn LayoutAlgorithm,
    ) -> LayoutStart {
        let span = CommandSpan::start(CMD_RUN_LAYOUT);
        let mut state = self.state.lock();
        let input = match (state.networks.get(network), state.views.view(network, view_type)) {
            (Some(entry), Some(view)) if view.is_primary() => {
                LayoutInput::from_network(&entry.network, Some(view))
            }
            (Some(_), Some(view)) => LayoutInput::from_view(view),
            _ => LayoutInput::default(),
        };

        let start = state.layouts.start(algorithm, network, view_type, input);
        match &start {
            LayoutStart::Started(ticket) => self.bus.publish(Event::LayoutStarted {
                network: network.clone(),
                algorithm: ticket.algorithm.to_string(),
                ticket: ticket.id.to_string(),
            }),
            LayoutStart::EmptyNetwork => self.bus.publish(Event::ShowWarning {
                message: format!("Network {network} has no nodes to lay out"),
            }),
        }
        span.succeed();
        start
    }

    fn apply_layout(&self, state: &mut WorkbenchState, outcome: LayoutOutcome) -> bool {
        let ticket = &outcome.ticket;
        let target = ticket.view_type.as_deref();
        if !state.networks.contains_key(&ticket.network)
            || state.views.view(&ticket.network, target).is_none()
        {
            tracing::debug!("Discarding layout {} for missing view", ticket.id);
            self.bus.publish(Event::LayoutDiscarded {
                network: ticket.network.clone(),
                ticket: ticket.id.to_string(),
            });
            return false;
        }

        let count = state
            .views
            .update_node_positions(&ticket.network, target, outcome.positions);
        self.bus.publish(Event::LayoutApplied {
            network: ticket.network.clone(),
            ticket: ticket.id.to_string(),
            count,
        });
        self.positions_updated(&ticket.network, target, count);
        true
    }

    /// Apply every layout result that has arrived; returns how many were
    /// applied.
    pub fn process_layout_results(&self) -> usize {
        let mut state = self.state.lock();
        let outcomes = state.layouts.drain();
        outcomes
            .into_iter()
            .map(|outcome| self.apply_layout(&mut state, outcome))
            .filter(|applied| *applied)
            .count()
    }

    /// Block until no layout is in flight or `timeout` passes, applying
    /// results as they arrive. Returns how many were applied.
    ///
    /// The state lock is only held to apply a result, never while waiting.
    pub fn wait_for_layouts(&self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut applied = self.process_layout_results();
        loop {
            let results = {
                let state = self.state.lock();
                if state.layouts.in_flight() == 0 {
                    return applied;
                }
                state.layouts.results()
            };
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                return applied;
            };
            let slice = remaining.min(Duration::from_millis(50));
            let Ok(outcome) = results.recv_timeout(slice) else {
                continue;
            };
            let mut state = self.state.lock();
            if let Some(outcome) = state.layouts.settle(outcome)
                && self.apply_layout(&mut state, outcome)
            {
                applied += 1;
            }
        }
    }

    pub fn layouts_in_flight(&self) -> usize {
        self.state.lock().layouts.in_flight()
    }
}
