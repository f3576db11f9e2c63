//! View computation engine.
//!
//! Resolves every visual property of every element, in precedence order
//! bypass > mapping > default. Resolution is pure, so node and edge batches are
//! computed in parallel.

use netview_core::{AttributeRow, ElementId, Network, NetworkTables};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::mapper::{Mapper, MapperSet};
use crate::{VisualProperty, VisualPropertyGroup, VisualPropertyName, VisualStyle, VisualValue};

/// Resolved values of one element. Shared, never mutated after computation.
pub type ElementValues = Arc<BTreeMap<VisualPropertyName, VisualValue>>;

#[derive(Debug, Clone, Default)]
pub struct ComputedValues {
    pub nodes: HashMap<ElementId, ElementValues>,
    pub edges: HashMap<ElementId, ElementValues>,
    pub network: ElementValues,
}

fn resolve(
    property: &VisualProperty,
    element_id: &ElementId,
    mappers: &MapperSet,
    row: Option<&AttributeRow>,
) -> VisualValue {
    if let Some(bypass) = property.bypass(element_id) {
        return bypass.clone();
    }

    let Some(mapping) = property.mapping() else {
        return property.default_value().clone();
    };

    let lookup = |mapper: &Mapper| match row.and_then(|r| r.get(mapper.attribute())) {
        Some(value) => mapper.map(Some(value)),
        // A missing attribute falls back to the property default, not the
        // mapping's own default.
        None => property.default_value().clone(),
    };

    match mappers.get(property.name()) {
        Some(mapper) => lookup(mapper),
        None => {
            tracing::trace!(
                "No compiled mapper for {}, compiling on demand",
                property.name()
            );
            lookup(&Mapper::compile(mapping))
        }
    }
}

pub fn compute_element_values<'a>(
    element_id: &ElementId,
    properties: impl IntoIterator<Item = &'a VisualProperty>,
    mappers: &MapperSet,
    row: Option<&AttributeRow>,
) -> BTreeMap<VisualPropertyName, VisualValue> {
    properties
        .into_iter()
        .map(|property| (property.name(), resolve(property, element_id, mappers, row)))
        .collect()
}

/// Recompute every node, edge and network value of `network`.
pub fn compute_network_values(
    style: &VisualStyle,
    mappers: &MapperSet,
    network: &Network,
    tables: &NetworkTables,
) -> ComputedValues {
    let node_props: Vec<&VisualProperty> = style.properties(VisualPropertyGroup::Node).collect();
    let edge_props: Vec<&VisualProperty> = style.properties(VisualPropertyGroup::Edge).collect();

    let nodes: HashMap<ElementId, ElementValues> = network
        .nodes()
        .par_iter()
        .map(|node| {
            let values = compute_element_values(
                &node.id,
                node_props.iter().copied(),
                mappers,
                tables.nodes.row(&node.id),
            );
            (node.id.clone(), Arc::new(values))
        })
        .collect();

    let edges: HashMap<ElementId, ElementValues> = network
        .edges()
        .par_iter()
        .map(|edge| {
            let values = compute_element_values(
                &edge.id,
                edge_props.iter().copied(),
                mappers,
                tables.edges.row(&edge.id),
            );
            (edge.id.clone(), Arc::new(values))
        })
        .collect();

    let network_element = ElementId(network.id.0.clone());
    let network_values = compute_element_values(
        &network_element,
        style.properties(VisualPropertyGroup::Network),
        mappers,
        tables.network_row(&network.id),
    );

    tracing::debug!(
        "Computed visual values for {} nodes and {} edges in network {}",
        nodes.len(),
        edges.len(),
        network.id
    );

    ComputedValues {
        nodes,
        edges,
        network: Arc::new(network_values),
    }
}
