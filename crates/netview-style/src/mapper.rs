//! Mapper factory.
//!
//! Compiles a [`MappingFunction`] into a [`Mapper`], a pure function from an
//! attribute value to a visual value. Mappers never fail: anything they cannot
//! interpret resolves to the mapping's own default value.

use netview_core::{AttributeValue, DiscreteKey};
use std::collections::HashMap;

use crate::mapping::{ControlPoint, MappingFunction};
use crate::{ValueDomain, Visibility, VisualPropertyName, VisualStyle, VisualValue};

#[derive(Debug, Clone)]
enum Compiled {
    Discrete {
        lookup: HashMap<DiscreteKey, VisualValue>,
    },
    Continuous {
        min: ControlPoint,
        max: ControlPoint,
        points: Vec<ControlPoint>,
    },
    Passthrough {
        domain: ValueDomain,
    },
}

#[derive(Debug, Clone)]
pub struct Mapper {
    attribute: String,
    default_value: VisualValue,
    compiled: Compiled,
}

impl Mapper {
    pub fn compile(mapping: &MappingFunction) -> Self {
        let compiled = match mapping {
            MappingFunction::Discrete(m) => {
                let mut lookup = HashMap::with_capacity(m.vp_value_map.len());
                for (key, value) in &m.vp_value_map {
                    lookup.insert(key.discrete_key(), value.clone());
                }
                Compiled::Discrete { lookup }
            }
            MappingFunction::Continuous(m) => {
                let mut points = m.control_points.clone();
                points.retain(|cp| !cp.value.is_nan());
                points.sort_by(|a, b| a.value.total_cmp(&b.value));
                Compiled::Continuous {
                    min: m.min.clone(),
                    max: m.max.clone(),
                    points,
                }
            }
            MappingFunction::Passthrough(m) => Compiled::Passthrough {
                domain: m.visual_property_type,
            },
        };

        Self {
            attribute: mapping.attribute().to_string(),
            default_value: mapping.default_value().clone(),
            compiled,
        }
    }

    /// Attribute column the mapper reads.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn map(&self, value: Option<&AttributeValue>) -> VisualValue {
        let Some(value) = value else {
            return self.default_value.clone();
        };

        let mapped = match &self.compiled {
            Compiled::Discrete { lookup } => lookup.get(&value.discrete_key()).cloned(),
            Compiled::Continuous { min, max, points } => map_continuous(min, max, points, value),
            Compiled::Passthrough { domain } => map_passthrough(*domain, value),
        };

        mapped.unwrap_or_else(|| {
            tracing::trace!(
                "Mapping on '{}' could not resolve {:?}, using mapping default",
                self.attribute,
                value
            );
            self.default_value.clone()
        })
    }
}

fn map_continuous(
    min: &ControlPoint,
    max: &ControlPoint,
    points: &[ControlPoint],
    value: &AttributeValue,
) -> Option<VisualValue> {
    let v = value.as_f64().filter(|v| !v.is_nan())?;

    // An exact boundary value only short-circuits to the anchor when the
    // anchor is inclusive; otherwise it is interpolated like any other point.
    let below_min = if min.inclusive {
        v <= min.value
    } else {
        v < min.value
    };
    if below_min {
        return Some(min.vp_value.clone());
    }

    let above_max = if max.inclusive {
        v >= max.value
    } else {
        v > max.value
    };
    if above_max {
        return Some(max.vp_value.clone());
    }

    interpolate(points, v)
}

/// Piecewise-linear interpolation over points sorted by value, clamped to the
/// first and last point.
fn interpolate(points: &[ControlPoint], v: f64) -> Option<VisualValue> {
    let first = points.first()?;
    let last = points.last()?;
    if v <= first.value {
        return Some(first.vp_value.clone());
    }
    if v >= last.value {
        return Some(last.vp_value.clone());
    }

    let upper_idx = points.iter().position(|cp| cp.value >= v)?;
    let upper = &points[upper_idx];
    let lower = &points[upper_idx.saturating_sub(1)];
    if upper.value == v || upper.value == lower.value {
        return Some(upper.vp_value.clone());
    }

    let t = (v - lower.value) / (upper.value - lower.value);
    match (&lower.vp_value, &upper.vp_value) {
        (VisualValue::Number(a), VisualValue::Number(b)) => Some(VisualValue::Number(a + (b - a) * t)),
        (VisualValue::Color(a), VisualValue::Color(b)) => Some(VisualValue::Color(a.lerp(b, t))),
        (a, b) if a.domain() == b.domain() => Some(a.clone()),
        _ => None,
    }
}

fn map_passthrough(domain: ValueDomain, value: &AttributeValue) -> Option<VisualValue> {
    match domain {
        ValueDomain::Visibility => value
            .as_bool_like()
            .map(|b| VisualValue::Visibility(Visibility::from(b)))
            .or_else(|| value.as_str().and_then(|s| domain.parse(s).ok())),
        d if d.is_enumerated() => value.as_str().and_then(|s| domain.parse(s).ok()),
        ValueDomain::Number => value
            .as_f64()
            .map(VisualValue::Number)
            .or_else(|| value.as_str().and_then(|s| domain.parse(s).ok())),
        ValueDomain::String => Some(VisualValue::String(value.to_string())),
        ValueDomain::Boolean => value.as_bool_like().map(VisualValue::Boolean),
        ValueDomain::Color => value.as_str().and_then(|s| domain.parse(s).ok()),
        _ => None,
    }
}

/// Compiled mappers of one visual style, keyed by property.
#[derive(Debug, Clone, Default)]
pub struct MapperSet {
    mappers: HashMap<VisualPropertyName, Mapper>,
}

impl MapperSet {
    pub fn compile(style: &VisualStyle) -> Self {
        let mappers = style
            .all_properties()
            .filter_map(|vp| vp.mapping.as_ref().map(|m| (vp.name, Mapper::compile(m))))
            .collect();
        Self { mappers }
    }

    pub fn get(&self, property: VisualPropertyName) -> Option<&Mapper> {
        self.mappers.get(&property)
    }

    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{ContinuousMapping, DiscreteMapping, PassthroughMapping};
    use crate::{Color, NodeShape};
    use proptest::prelude::*;

    fn boundary_mapping() -> MappingFunction {
        MappingFunction::Continuous(ContinuousMapping {
            attribute: "score".to_string(),
            min: ControlPoint::new(0.0, 1.0).inclusive(true),
            max: ControlPoint::new(10.0, 100.0),
            control_points: vec![ControlPoint::new(0.0, 10.0), ControlPoint::new(10.0, 50.0)],
            default_value: VisualValue::Number(-1.0),
        })
    }

    fn shape_mapping() -> MappingFunction {
        MappingFunction::Discrete(DiscreteMapping {
            attribute: "type".to_string(),
            vp_value_map: vec![
                (AttributeValue::from("protein"), VisualValue::NodeShape(NodeShape::Ellipse)),
                (AttributeValue::Long(7), VisualValue::NodeShape(NodeShape::Diamond)),
            ],
            default_value: VisualValue::NodeShape(NodeShape::Hexagon),
        })
    }

    fn passthrough(domain: ValueDomain, default_value: VisualValue) -> Mapper {
        Mapper::compile(&MappingFunction::Passthrough(PassthroughMapping {
            attribute: "raw".to_string(),
            visual_property_type: domain,
            default_value,
        }))
    }

    #[test]
    fn test_discrete_exact_match() {
        let mapper = Mapper::compile(&shape_mapping());
        assert_eq!(
            mapper.map(Some(&AttributeValue::from("protein"))),
            VisualValue::NodeShape(NodeShape::Ellipse)
        );
        // Numeric keys match regardless of column width.
        assert_eq!(
            mapper.map(Some(&AttributeValue::Double(7.0))),
            VisualValue::NodeShape(NodeShape::Diamond)
        );
    }

    #[test]
    fn test_discrete_miss_returns_mapping_default() {
        let mapper = Mapper::compile(&shape_mapping());
        assert_eq!(
            mapper.map(Some(&AttributeValue::from("Protein"))),
            VisualValue::NodeShape(NodeShape::Hexagon)
        );
        assert_eq!(mapper.map(None), VisualValue::NodeShape(NodeShape::Hexagon));
    }

    #[test]
    fn test_continuous_inclusive_min_short_circuits() {
        let mapper = Mapper::compile(&boundary_mapping());
        assert_eq!(
            mapper.map(Some(&AttributeValue::Double(0.0))),
            VisualValue::Number(1.0)
        );
        assert_eq!(
            mapper.map(Some(&AttributeValue::Double(-5.0))),
            VisualValue::Number(1.0)
        );
    }

    #[test]
    fn test_continuous_exclusive_max_is_interpolated() {
        let mapper = Mapper::compile(&boundary_mapping());
        assert_eq!(
            mapper.map(Some(&AttributeValue::Double(10.0))),
            VisualValue::Number(50.0)
        );
        assert_eq!(
            mapper.map(Some(&AttributeValue::Double(10.0001))),
            VisualValue::Number(100.0)
        );
    }

    #[test]
    fn test_continuous_interpolates_between_points() {
        let mapper = Mapper::compile(&boundary_mapping());
        assert_eq!(
            mapper.map(Some(&AttributeValue::Integer(5))),
            VisualValue::Number(30.0)
        );
        assert_eq!(
            mapper.map(Some(&AttributeValue::Double(2.5))),
            VisualValue::Number(20.0)
        );
    }

    #[test]
    fn test_continuous_non_numeric_degrades_to_default() {
        let mapper = Mapper::compile(&boundary_mapping());
        assert_eq!(
            mapper.map(Some(&AttributeValue::from("5"))),
            VisualValue::Number(-1.0)
        );
        assert_eq!(
            mapper.map(Some(&AttributeValue::Double(f64::NAN))),
            VisualValue::Number(-1.0)
        );
        assert_eq!(mapper.map(None), VisualValue::Number(-1.0));
    }

    #[test]
    fn test_continuous_unsorted_points_are_ordered() {
        let mapper = Mapper::compile(&MappingFunction::Continuous(ContinuousMapping {
            attribute: "x".to_string(),
            min: ControlPoint::new(0.0, 0.0),
            max: ControlPoint::new(100.0, 0.0),
            control_points: vec![
                ControlPoint::new(100.0, 200.0),
                ControlPoint::new(0.0, 0.0),
                ControlPoint::new(50.0, 100.0),
            ],
            default_value: VisualValue::Number(0.0),
        }));
        assert_eq!(
            mapper.map(Some(&AttributeValue::Double(75.0))),
            VisualValue::Number(150.0)
        );
    }

    #[test]
    fn test_continuous_color_interpolation() {
        let mapper = Mapper::compile(&MappingFunction::Continuous(ContinuousMapping::linear(
            "expr",
            (0.0, Color::rgb(0, 0, 0).into()),
            (10.0, Color::rgb(200, 100, 50).into()),
            Color::WHITE.into(),
        )));
        assert_eq!(
            mapper.map(Some(&AttributeValue::Double(5.0))),
            VisualValue::Color(Color::rgb(100, 50, 25))
        );
    }

    #[test]
    fn test_continuous_steps_non_interpolable_values() {
        let mapper = Mapper::compile(&MappingFunction::Continuous(ContinuousMapping::linear(
            "degree",
            (0.0, VisualValue::NodeShape(NodeShape::Ellipse)),
            (10.0, VisualValue::NodeShape(NodeShape::Rectangle)),
            VisualValue::NodeShape(NodeShape::Vee),
        )));
        assert_eq!(
            mapper.map(Some(&AttributeValue::Double(9.0))),
            VisualValue::NodeShape(NodeShape::Ellipse)
        );
        assert_eq!(
            mapper.map(Some(&AttributeValue::Double(10.0))),
            VisualValue::NodeShape(NodeShape::Rectangle)
        );
    }

    #[test]
    fn test_continuous_mixed_domains_degrade() {
        let mapper = Mapper::compile(&MappingFunction::Continuous(ContinuousMapping {
            attribute: "x".to_string(),
            min: ControlPoint::new(0.0, 0.0),
            max: ControlPoint::new(10.0, 0.0),
            control_points: vec![
                ControlPoint::new(0.0, 0.0),
                ControlPoint::new(10.0, Color::BLACK),
            ],
            default_value: VisualValue::Number(7.0),
        }));
        assert_eq!(
            mapper.map(Some(&AttributeValue::Double(5.0))),
            VisualValue::Number(7.0)
        );
    }

    #[test]
    fn test_continuous_without_points_uses_default() {
        let mapper = Mapper::compile(&MappingFunction::Continuous(ContinuousMapping {
            attribute: "x".to_string(),
            min: ControlPoint::new(0.0, 1.0),
            max: ControlPoint::new(10.0, 2.0),
            control_points: Vec::new(),
            default_value: VisualValue::Number(3.0),
        }));
        assert_eq!(
            mapper.map(Some(&AttributeValue::Double(5.0))),
            VisualValue::Number(3.0)
        );
    }

    #[test]
    fn test_passthrough_visibility_normalizes_booleans() {
        let mapper = passthrough(
            ValueDomain::Visibility,
            VisualValue::Visibility(Visibility::Element),
        );
        assert_eq!(
            mapper.map(Some(&AttributeValue::Boolean(false))),
            VisualValue::Visibility(Visibility::None)
        );
        assert_eq!(
            mapper.map(Some(&AttributeValue::from("TRUE"))),
            VisualValue::Visibility(Visibility::Element)
        );
        assert_eq!(
            mapper.map(Some(&AttributeValue::from("none"))),
            VisualValue::Visibility(Visibility::None)
        );
    }

    #[test]
    fn test_passthrough_enumerated_parses_raw_string() {
        let mapper = passthrough(
            ValueDomain::NodeShape,
            VisualValue::NodeShape(NodeShape::Ellipse),
        );
        assert_eq!(
            mapper.map(Some(&AttributeValue::from("diamond"))),
            VisualValue::NodeShape(NodeShape::Diamond)
        );
        assert_eq!(
            mapper.map(Some(&AttributeValue::from("blob"))),
            VisualValue::NodeShape(NodeShape::Ellipse)
        );
    }

    #[test]
    fn test_passthrough_free_form_domains() {
        let label = passthrough(ValueDomain::String, VisualValue::from(""));
        assert_eq!(
            label.map(Some(&AttributeValue::Long(42))),
            VisualValue::from("42")
        );
        assert_eq!(label.map(None), VisualValue::from(""));

        let width = passthrough(ValueDomain::Number, VisualValue::Number(1.0));
        assert_eq!(
            width.map(Some(&AttributeValue::Integer(9))),
            VisualValue::Number(9.0)
        );

        let fill = passthrough(ValueDomain::Color, VisualValue::Color(Color::WHITE));
        assert_eq!(
            fill.map(Some(&AttributeValue::from("#FF0000"))),
            VisualValue::Color(Color::rgb(255, 0, 0))
        );
        assert_eq!(
            fill.map(Some(&AttributeValue::from("red-ish"))),
            VisualValue::Color(Color::WHITE)
        );
    }

    proptest! {
        #[test]
        fn prop_discrete_miss_returns_mapping_default(key in "[a-z]{1,8}") {
            prop_assume!(key != "protein");
            let mapper = Mapper::compile(&shape_mapping());
            prop_assert_eq!(
                mapper.map(Some(&AttributeValue::String(key))),
                VisualValue::NodeShape(NodeShape::Hexagon)
            );
        }

        #[test]
        fn prop_continuous_output_within_ramp(v in 0.0f64..10.0) {
            let mapper = Mapper::compile(&boundary_mapping());
            let out = mapper.map(Some(&AttributeValue::Double(v)));
            match out {
                VisualValue::Number(n) if v == 0.0 => prop_assert_eq!(n, 1.0),
                VisualValue::Number(n) => prop_assert!((10.0..=50.0).contains(&n)),
                other => prop_assert!(false, "unexpected {:?}", other),
            }
        }
    }
}
