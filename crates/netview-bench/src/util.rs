use netview_core::{AttributeValue, ElementId, Network, NetworkTables};
use netview_style::{
    Color, ContinuousMapping, DiscreteMapping, MappingFunction, NodeShape, PassthroughMapping,
    ValueDomain, VisualPropertyName, VisualStyle, VisualValue,
};

/// Ring of `node_count` nodes plus a chord every 7th node, with `size`,
/// `kind` and `name` node columns and a `weight` edge column.
pub fn synthetic_network(node_count: usize) -> (Network, NetworkTables) {
    let mut network = Network::new(format!("synthetic-{node_count}"));
    let mut tables = NetworkTables::new();

    for i in 0..node_count {
        let id = ElementId::from(format!("n{i}"));
        network.add_node(id.clone()).unwrap();
        tables
            .nodes
            .set_value(&id, "size", AttributeValue::Double((i % 100) as f64))
            .unwrap();
        let kind = if i % 3 == 0 { "hub" } else { "leaf" };
        tables
            .nodes
            .set_value(&id, "kind", AttributeValue::from(kind))
            .unwrap();
        tables
            .nodes
            .set_value(&id, "name", AttributeValue::from(format!("Node {i}")))
            .unwrap();
    }

    let mut edge = 0;
    let mut connect = |network: &mut Network, tables: &mut NetworkTables, a: usize, b: usize| {
        let id = ElementId::from(format!("e{edge}"));
        edge += 1;
        network
            .add_edge(id.clone(), format!("n{a}"), format!("n{b}"))
            .unwrap();
        tables
            .edges
            .set_value(&id, "weight", AttributeValue::Integer((a % 10) as i32))
            .unwrap();
    };
    for i in 0..node_count {
        connect(&mut network, &mut tables, i, (i + 1) % node_count);
        if i % 7 == 0 {
            connect(&mut network, &mut tables, i, (i + node_count / 2) % node_count);
        }
    }

    (network, tables)
}

/// One mapping of each kind on node properties, one on edge width.
pub fn mapped_style() -> VisualStyle {
    let mut style = VisualStyle::new();
    style
        .set_mapping(
            VisualPropertyName::NodeWidth,
            MappingFunction::Continuous(ContinuousMapping::linear(
                "size",
                (0.0, VisualValue::Number(10.0)),
                (100.0, VisualValue::Number(80.0)),
                VisualValue::Number(20.0),
            )),
        )
        .unwrap();
    style
        .set_mapping(
            VisualPropertyName::NodeBackgroundColor,
            MappingFunction::Continuous(ContinuousMapping::linear(
                "size",
                (0.0, VisualValue::Color(Color::rgb(0, 0, 255))),
                (100.0, VisualValue::Color(Color::rgb(255, 0, 0))),
                VisualValue::Color(Color::WHITE),
            )),
        )
        .unwrap();
    style
        .set_mapping(
            VisualPropertyName::NodeShape,
            MappingFunction::Discrete(DiscreteMapping {
                attribute: "kind".to_string(),
                vp_value_map: vec![(
                    AttributeValue::from("hub"),
                    VisualValue::NodeShape(NodeShape::Diamond),
                )],
                default_value: VisualValue::NodeShape(NodeShape::Ellipse),
            }),
        )
        .unwrap();
    style
        .set_mapping(
            VisualPropertyName::NodeLabel,
            MappingFunction::Passthrough(PassthroughMapping {
                attribute: "name".to_string(),
                visual_property_type: ValueDomain::String,
                default_value: VisualValue::from(""),
            }),
        )
        .unwrap();
    style
        .set_mapping(
            VisualPropertyName::EdgeWidth,
            MappingFunction::Continuous(ContinuousMapping::linear(
                "weight",
                (0.0, VisualValue::Number(1.0)),
                (9.0, VisualValue::Number(6.0)),
                VisualValue::Number(2.0),
            )),
        )
        .unwrap();
    style
}

pub fn node_ids(node_count: usize) -> Vec<ElementId> {
    (0..node_count).map(|i| ElementId::from(format!("n{i}"))).collect()
}
