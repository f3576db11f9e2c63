//! Visual style resolution.
//!
//! A [`VisualStyle`] declares, per visual property, a default value, an
//! optional data-driven [`MappingFunction`] and per-element bypasses. The
//! [`compute`] module turns a style plus attribute tables into concrete values
//! for every element of a network.

pub mod color;
pub mod compute;
pub mod error;
pub mod mapper;
pub mod mapping;
pub mod property;
pub mod snapshot;
pub mod value;
pub mod visual_style;

pub use color::Color;
pub use compute::{ComputedValues, ElementValues, compute_element_values, compute_network_values};
pub use error::StyleError;
pub use mapper::{Mapper, MapperSet};
pub use mapping::{
    ContinuousMapping, ControlPoint, DiscreteMapping, MappingFunction, PassthroughMapping,
};
pub use property::{VisualPropertyGroup, VisualPropertyName};
pub use snapshot::{GroupSnapshot, StyleSnapshot};
pub use value::{
    EdgeArrowShape, EdgeLineStyle, FontFamily, HorizontalAlign, NodeShape, ValueDomain,
    VerticalAlign, Visibility, VisualValue,
};
pub use visual_style::{VisualProperty, VisualStyle, VisualStyleStore};
