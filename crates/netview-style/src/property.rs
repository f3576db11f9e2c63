//! Registry of visual properties.
//!
//! Each property belongs to one group, takes values from one domain and has a
//! built-in default that is valid for that domain.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::value::{
    EdgeArrowShape, EdgeLineStyle, FontFamily, HorizontalAlign, NodeShape, ValueDomain,
    VerticalAlign, Visibility, VisualValue,
};
use crate::{Color, StyleError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualPropertyGroup {
    Node,
    Edge,
    Network,
}

impl fmt::Display for VisualPropertyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node => write!(f, "node"),
            Self::Edge => write!(f, "edge"),
            Self::Network => write!(f, "network"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VisualPropertyName {
    // Node
    NodeShape,
    NodeBackgroundColor,
    NodeBackgroundOpacity,
    NodeWidth,
    NodeHeight,
    NodeBorderColor,
    NodeBorderWidth,
    NodeBorderLineStyle,
    NodeBorderOpacity,
    NodeLabel,
    NodeLabelColor,
    NodeLabelFontSize,
    NodeLabelFont,
    NodeLabelHorizontalAlign,
    NodeLabelVerticalAlign,
    NodeLabelOpacity,
    NodeVisibility,
    NodeSelectedPaint,

    // Edge
    EdgeLineColor,
    EdgeWidth,
    EdgeLineStyle,
    EdgeOpacity,
    EdgeSourceArrowShape,
    EdgeSourceArrowColor,
    EdgeTargetArrowShape,
    EdgeTargetArrowColor,
    EdgeLabel,
    EdgeLabelColor,
    EdgeLabelFontSize,
    EdgeLabelFont,
    EdgeVisibility,
    EdgeSelectedPaint,

    // Network
    NetworkBackgroundColor,
}

impl VisualPropertyName {
    pub const ALL: &'static [VisualPropertyName] = &[
        Self::NodeShape,
        Self::NodeBackgroundColor,
        Self::NodeBackgroundOpacity,
        Self::NodeWidth,
        Self::NodeHeight,
        Self::NodeBorderColor,
        Self::NodeBorderWidth,
        Self::NodeBorderLineStyle,
        Self::NodeBorderOpacity,
        Self::NodeLabel,
        Self::NodeLabelColor,
        Self::NodeLabelFontSize,
        Self::NodeLabelFont,
        Self::NodeLabelHorizontalAlign,
        Self::NodeLabelVerticalAlign,
        Self::NodeLabelOpacity,
        Self::NodeVisibility,
        Self::NodeSelectedPaint,
        Self::EdgeLineColor,
        Self::EdgeWidth,
        Self::EdgeLineStyle,
        Self::EdgeOpacity,
        Self::EdgeSourceArrowShape,
        Self::EdgeSourceArrowColor,
        Self::EdgeTargetArrowShape,
        Self::EdgeTargetArrowColor,
        Self::EdgeLabel,
        Self::EdgeLabelColor,
        Self::EdgeLabelFontSize,
        Self::EdgeLabelFont,
        Self::EdgeVisibility,
        Self::EdgeSelectedPaint,
        Self::NetworkBackgroundColor,
    ];

    /// Position in [`Self::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn group(&self) -> VisualPropertyGroup {
        match self {
            Self::NodeShape
            | Self::NodeBackgroundColor
            | Self::NodeBackgroundOpacity
            | Self::NodeWidth
            | Self::NodeHeight
            | Self::NodeBorderColor
            | Self::NodeBorderWidth
            | Self::NodeBorderLineStyle
            | Self::NodeBorderOpacity
            | Self::NodeLabel
            | Self::NodeLabelColor
            | Self::NodeLabelFontSize
            | Self::NodeLabelFont
            | Self::NodeLabelHorizontalAlign
            | Self::NodeLabelVerticalAlign
            | Self::NodeLabelOpacity
            | Self::NodeVisibility
            | Self::NodeSelectedPaint => VisualPropertyGroup::Node,

            Self::EdgeLineColor
            | Self::EdgeWidth
            | Self::EdgeLineStyle
            | Self::EdgeOpacity
            | Self::EdgeSourceArrowShape
            | Self::EdgeSourceArrowColor
            | Self::EdgeTargetArrowShape
            | Self::EdgeTargetArrowColor
            | Self::EdgeLabel
            | Self::EdgeLabelColor
            | Self::EdgeLabelFontSize
            | Self::EdgeLabelFont
            | Self::EdgeVisibility
            | Self::EdgeSelectedPaint => VisualPropertyGroup::Edge,

            Self::NetworkBackgroundColor => VisualPropertyGroup::Network,
        }
    }

    pub fn domain(&self) -> ValueDomain {
        match self {
            Self::NodeBackgroundColor
            | Self::NodeBorderColor
            | Self::NodeLabelColor
            | Self::NodeSelectedPaint
            | Self::EdgeLineColor
            | Self::EdgeSourceArrowColor
            | Self::EdgeTargetArrowColor
            | Self::EdgeLabelColor
            | Self::EdgeSelectedPaint
            | Self::NetworkBackgroundColor => ValueDomain::Color,

            Self::NodeBackgroundOpacity
            | Self::NodeWidth
            | Self::NodeHeight
            | Self::NodeBorderWidth
            | Self::NodeBorderOpacity
            | Self::NodeLabelFontSize
            | Self::NodeLabelOpacity
            | Self::EdgeWidth
            | Self::EdgeOpacity
            | Self::EdgeLabelFontSize => ValueDomain::Number,

            Self::NodeLabel | Self::EdgeLabel => ValueDomain::String,

            Self::NodeShape => ValueDomain::NodeShape,
            Self::NodeBorderLineStyle | Self::EdgeLineStyle => ValueDomain::LineStyle,
            Self::EdgeSourceArrowShape | Self::EdgeTargetArrowShape => ValueDomain::ArrowShape,
            Self::NodeLabelFont | Self::EdgeLabelFont => ValueDomain::Font,
            Self::NodeLabelHorizontalAlign => ValueDomain::HorizontalAlign,
            Self::NodeLabelVerticalAlign => ValueDomain::VerticalAlign,
            Self::NodeVisibility | Self::EdgeVisibility => ValueDomain::Visibility,
        }
    }

    /// Built-in default, always within [`Self::domain`].
    pub fn default_value(&self) -> VisualValue {
        match self {
            Self::NodeShape => VisualValue::NodeShape(NodeShape::Ellipse),
            Self::NodeBackgroundColor => VisualValue::Color(Color::rgb(0x8D, 0xA0, 0xCB)),
            Self::NodeBackgroundOpacity => VisualValue::Number(1.0),
            Self::NodeWidth => VisualValue::Number(40.0),
            Self::NodeHeight => VisualValue::Number(40.0),
            Self::NodeBorderColor => VisualValue::Color(Color::rgb(0x66, 0x66, 0x66)),
            Self::NodeBorderWidth => VisualValue::Number(1.0),
            Self::NodeBorderLineStyle => VisualValue::LineStyle(EdgeLineStyle::Solid),
            Self::NodeBorderOpacity => VisualValue::Number(1.0),
            Self::NodeLabel => VisualValue::String(String::new()),
            Self::NodeLabelColor => VisualValue::Color(Color::BLACK),
            Self::NodeLabelFontSize => VisualValue::Number(12.0),
            Self::NodeLabelFont => VisualValue::Font(FontFamily::SansSerif),
            Self::NodeLabelHorizontalAlign => VisualValue::HorizontalAlign(HorizontalAlign::Center),
            Self::NodeLabelVerticalAlign => VisualValue::VerticalAlign(VerticalAlign::Center),
            Self::NodeLabelOpacity => VisualValue::Number(1.0),
            Self::NodeVisibility => VisualValue::Visibility(Visibility::Element),
            Self::NodeSelectedPaint => VisualValue::Color(Color::rgb(0xFF, 0xFF, 0x00)),

            Self::EdgeLineColor => VisualValue::Color(Color::rgb(0x84, 0x84, 0x84)),
            Self::EdgeWidth => VisualValue::Number(2.0),
            Self::EdgeLineStyle => VisualValue::LineStyle(EdgeLineStyle::Solid),
            Self::EdgeOpacity => VisualValue::Number(1.0),
            Self::EdgeSourceArrowShape => VisualValue::ArrowShape(EdgeArrowShape::None),
            Self::EdgeSourceArrowColor => VisualValue::Color(Color::BLACK),
            Self::EdgeTargetArrowShape => VisualValue::ArrowShape(EdgeArrowShape::None),
            Self::EdgeTargetArrowColor => VisualValue::Color(Color::BLACK),
            Self::EdgeLabel => VisualValue::String(String::new()),
            Self::EdgeLabelColor => VisualValue::Color(Color::BLACK),
            Self::EdgeLabelFontSize => VisualValue::Number(10.0),
            Self::EdgeLabelFont => VisualValue::Font(FontFamily::SansSerif),
            Self::EdgeVisibility => VisualValue::Visibility(Visibility::Element),
            Self::EdgeSelectedPaint => VisualValue::Color(Color::rgb(0xFF, 0x00, 0x00)),

            Self::NetworkBackgroundColor => VisualValue::Color(Color::WHITE),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NodeShape => "nodeShape",
            Self::NodeBackgroundColor => "nodeBackgroundColor",
            Self::NodeBackgroundOpacity => "nodeBackgroundOpacity",
            Self::NodeWidth => "nodeWidth",
            Self::NodeHeight => "nodeHeight",
            Self::NodeBorderColor => "nodeBorderColor",
            Self::NodeBorderWidth => "nodeBorderWidth",
            Self::NodeBorderLineStyle => "nodeBorderLineStyle",
            Self::NodeBorderOpacity => "nodeBorderOpacity",
            Self::NodeLabel => "nodeLabel",
            Self::NodeLabelColor => "nodeLabelColor",
            Self::NodeLabelFontSize => "nodeLabelFontSize",
            Self::NodeLabelFont => "nodeLabelFont",
            Self::NodeLabelHorizontalAlign => "nodeLabelHorizontalAlign",
            Self::NodeLabelVerticalAlign => "nodeLabelVerticalAlign",
            Self::NodeLabelOpacity => "nodeLabelOpacity",
            Self::NodeVisibility => "nodeVisibility",
            Self::NodeSelectedPaint => "nodeSelectedPaint",
            Self::EdgeLineColor => "edgeLineColor",
            Self::EdgeWidth => "edgeWidth",
            Self::EdgeLineStyle => "edgeLineStyle",
            Self::EdgeOpacity => "edgeOpacity",
            Self::EdgeSourceArrowShape => "edgeSourceArrowShape",
            Self::EdgeSourceArrowColor => "edgeSourceArrowColor",
            Self::EdgeTargetArrowShape => "edgeTargetArrowShape",
            Self::EdgeTargetArrowColor => "edgeTargetArrowColor",
            Self::EdgeLabel => "edgeLabel",
            Self::EdgeLabelColor => "edgeLabelColor",
            Self::EdgeLabelFontSize => "edgeLabelFontSize",
            Self::EdgeLabelFont => "edgeLabelFont",
            Self::EdgeVisibility => "edgeVisibility",
            Self::EdgeSelectedPaint => "edgeSelectedPaint",
            Self::NetworkBackgroundColor => "networkBackgroundColor",
        }
    }

    /// Properties of one group, in registry order.
    pub fn in_group(group: VisualPropertyGroup) -> impl Iterator<Item = VisualPropertyName> {
        Self::ALL.iter().copied().filter(move |p| p.group() == group)
    }
}

impl fmt::Display for VisualPropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisualPropertyName {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| StyleError::UnknownProperty(s.to_string()))
    }
}
