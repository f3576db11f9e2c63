//! Exchange shape of a visual style: `{defaults, mappings, bypasses}` per group.
//!
//! Exporters for network-exchange documents build on this; it round-trips
//! losslessly through any serde format.

use netview_core::ElementId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::mapping::MappingFunction;
use crate::{StyleError, VisualPropertyGroup, VisualPropertyName, VisualStyle, VisualValue};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSnapshot {
    #[serde(default)]
    pub defaults: BTreeMap<VisualPropertyName, VisualValue>,
    #[serde(default)]
    pub mappings: BTreeMap<VisualPropertyName, MappingFunction>,
    #[serde(default)]
    pub bypasses: BTreeMap<VisualPropertyName, BTreeMap<ElementId, VisualValue>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleSnapshot {
    #[serde(default)]
    pub node: GroupSnapshot,
    #[serde(default)]
    pub edge: GroupSnapshot,
    #[serde(default)]
    pub network: GroupSnapshot,
}

impl StyleSnapshot {
    fn group(&self, group: VisualPropertyGroup) -> &GroupSnapshot {
        match group {
            VisualPropertyGroup::Node => &self.node,
            VisualPropertyGroup::Edge => &self.edge,
            VisualPropertyGroup::Network => &self.network,
        }
    }

    fn group_mut(&mut self, group: VisualPropertyGroup) -> &mut GroupSnapshot {
        match group {
            VisualPropertyGroup::Node => &mut self.node,
            VisualPropertyGroup::Edge => &mut self.edge,
            VisualPropertyGroup::Network => &mut self.network,
        }
    }
}

fn check_group(
    property: VisualPropertyName,
    expected: VisualPropertyGroup,
) -> Result<(), StyleError> {
    if property.group() == expected {
        Ok(())
    } else {
        Err(StyleError::GroupMismatch {
            property,
            expected,
            actual: property.group(),
        })
    }
}

impl VisualStyle {
    pub fn snapshot(&self) -> StyleSnapshot {
        let mut snapshot = StyleSnapshot::default();
        for property in self.all_properties() {
            let group = snapshot.group_mut(property.group());
            group
                .defaults
                .insert(property.name(), property.default_value().clone());
            if let Some(mapping) = property.mapping() {
                group.mappings.insert(property.name(), mapping.clone());
            }
            if !property.bypass_map().is_empty() {
                let bypasses = property
                    .bypass_map()
                    .iter()
                    .map(|(id, value)| (id.clone(), value.clone()))
                    .collect();
                group.bypasses.insert(property.name(), bypasses);
            }
        }
        snapshot
    }

    /// Rebuild a style from a snapshot. Properties the snapshot does not
    /// mention keep their built-in defaults.
    pub fn from_snapshot(snapshot: &StyleSnapshot) -> Result<Self, StyleError> {
        let mut style = VisualStyle::new();
        for group in [
            VisualPropertyGroup::Node,
            VisualPropertyGroup::Edge,
            VisualPropertyGroup::Network,
        ] {
            let section = snapshot.group(group);
            for (&name, value) in &section.defaults {
                check_group(name, group)?;
                style.set_default(name, value.clone())?;
            }
            for (&name, mapping) in &section.mappings {
                check_group(name, group)?;
                style.set_mapping(name, mapping.clone())?;
            }
            for (&name, bypasses) in &section.bypasses {
                check_group(name, group)?;
                for (id, value) in bypasses {
                    style.set_bypass(name, [id], value.clone())?;
                }
            }
        }
        Ok(style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{DiscreteMapping, PassthroughMapping};
    use crate::{Color, EdgeLineStyle, ValueDomain};
    use netview_core::AttributeValue;

    fn styled() -> VisualStyle {
        let mut style = VisualStyle::new();
        style
            .set_default(VisualPropertyName::NodeBackgroundColor, Color::rgb(1, 2, 3).into())
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
                VisualPropertyName::EdgeLineStyle,
                MappingFunction::Discrete(DiscreteMapping {
                    attribute: "interaction".to_string(),
                    vp_value_map: vec![(
                        AttributeValue::from("pp"),
                        VisualValue::LineStyle(EdgeLineStyle::Dashed),
                    )],
                    default_value: VisualValue::LineStyle(EdgeLineStyle::Solid),
                }),
            )
            .unwrap();
        style
            .set_bypass(
                VisualPropertyName::NodeWidth,
                [&ElementId::from("n1")],
                VisualValue::Number(99.0),
            )
            .unwrap();
        style
    }

    #[test]
    fn test_snapshot_partitions_by_group() {
        let snapshot = styled().snapshot();
        assert!(snapshot.node.mappings.contains_key(&VisualPropertyName::NodeLabel));
        assert!(snapshot.edge.mappings.contains_key(&VisualPropertyName::EdgeLineStyle));
        assert_eq!(snapshot.network.defaults.len(), 1);
        assert_eq!(
            snapshot.node.bypasses[&VisualPropertyName::NodeWidth][&ElementId::from("n1")],
            VisualValue::Number(99.0)
        );
    }

    #[test]
    fn test_snapshot_json_round_trip_is_lossless() {
        let style = styled();
        let json = serde_json::to_string(&style.snapshot()).unwrap();
        let parsed: StyleSnapshot = serde_json::from_str(&json).unwrap();
        let rebuilt = VisualStyle::from_snapshot(&parsed).unwrap();
        assert_eq!(rebuilt, style);
    }

    #[test]
    fn test_from_snapshot_rejects_misplaced_property() {
        let mut snapshot = StyleSnapshot::default();
        snapshot
            .edge
            .defaults
            .insert(VisualPropertyName::NodeWidth, VisualValue::Number(3.0));
        let err = VisualStyle::from_snapshot(&snapshot).unwrap_err();
        assert!(matches!(err, StyleError::GroupMismatch { .. }));
    }

    #[test]
    fn test_partial_snapshot_keeps_builtin_defaults() {
        let snapshot: StyleSnapshot =
            serde_json::from_str(r#"{"node":{"defaults":{"nodeWidth":{"type":"number","value":12.0}}}}"#)
                .unwrap();
        let style = VisualStyle::from_snapshot(&snapshot).unwrap();
        assert_eq!(
            style.property(VisualPropertyName::NodeWidth).default_value(),
            &VisualValue::Number(12.0)
        );
        assert_eq!(
            style.property(VisualPropertyName::NodeHeight).default_value(),
            &VisualPropertyName::NodeHeight.default_value()
        );
    }
}
