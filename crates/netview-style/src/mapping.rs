//! Data-driven mapping functions.

use netview_core::AttributeValue;
use serde::{Deserialize, Serialize};

use crate::{ValueDomain, VisualValue};

/// Anchor of a continuous mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPoint {
    pub value: f64,
    pub vp_value: VisualValue,
    #[serde(default)]
    pub inclusive: bool,
}

impl ControlPoint {
    pub fn new(value: f64, vp_value: impl Into<VisualValue>) -> Self {
        Self {
            value,
            vp_value: vp_value.into(),
            inclusive: false,
        }
    }

    pub fn inclusive(mut self, inclusive: bool) -> Self {
        self.inclusive = inclusive;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscreteMapping {
    pub attribute: String,
    pub vp_value_map: Vec<(AttributeValue, VisualValue)>,
    pub default_value: VisualValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuousMapping {
    pub attribute: String,
    pub min: ControlPoint,
    pub max: ControlPoint,
    /// Sorted ascending by `value` on compile.
    pub control_points: Vec<ControlPoint>,
    pub default_value: VisualValue,
}

impl ContinuousMapping {
    /// Two-point ramp from `(lo, lo_vp)` to `(hi, hi_vp)`. Values outside the
    /// range take the nearest endpoint's visual value.
    pub fn linear(
        attribute: impl Into<String>,
        lo: (f64, VisualValue),
        hi: (f64, VisualValue),
        default_value: VisualValue,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            min: ControlPoint::new(lo.0, lo.1.clone()),
            max: ControlPoint::new(hi.0, hi.1.clone()),
            control_points: vec![ControlPoint::new(lo.0, lo.1), ControlPoint::new(hi.0, hi.1)],
            default_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassthroughMapping {
    pub attribute: String,
    pub visual_property_type: ValueDomain,
    pub default_value: VisualValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MappingFunction {
    Discrete(DiscreteMapping),
    Continuous(ContinuousMapping),
    Passthrough(PassthroughMapping),
}

impl MappingFunction {
    pub fn attribute(&self) -> &str {
        match self {
            Self::Discrete(m) => &m.attribute,
            Self::Continuous(m) => &m.attribute,
            Self::Passthrough(m) => &m.attribute,
        }
    }

    pub fn default_value(&self) -> &VisualValue {
        match self {
            Self::Discrete(m) => &m.default_value,
            Self::Continuous(m) => &m.default_value,
            Self::Passthrough(m) => &m.default_value,
        }
    }

    /// Every visual value the mapping can emit.
    pub fn visual_values(&self) -> Vec<&VisualValue> {
        let mut values = vec![self.default_value()];
        match self {
            Self::Discrete(m) => values.extend(m.vp_value_map.iter().map(|(_, v)| v)),
            Self::Continuous(m) => {
                values.push(&m.min.vp_value);
                values.push(&m.max.vp_value);
                values.extend(m.control_points.iter().map(|cp| &cp.vp_value));
            }
            Self::Passthrough(_) => {}
        }
        values
    }
}
