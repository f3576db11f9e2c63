//! Visual property value model.
//!
//! Every visual property draws its values from one [`ValueDomain`]: either an
//! enumerated set (shapes, line styles, fonts, ...) or a free-form color,
//! number, string or boolean.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Color, StyleError};

/// Declares a closed, string-named enumeration with `FromStr` and `Display`.
macro_rules! named_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = StyleError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(StyleError::UnknownEnumValue {
                        domain: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

named_enum!(NodeShape {
    Ellipse => "ellipse",
    Rectangle => "rectangle",
    RoundRectangle => "round-rectangle",
    Triangle => "triangle",
    Diamond => "diamond",
    Hexagon => "hexagon",
    Octagon => "octagon",
    Parallelogram => "parallelogram",
    Vee => "vee",
});

named_enum!(EdgeLineStyle {
    Solid => "solid",
    Dotted => "dotted",
    Dashed => "dashed",
});

named_enum!(EdgeArrowShape {
    None => "none",
    Triangle => "triangle",
    Circle => "circle",
    Square => "square",
    Diamond => "diamond",
    Tee => "tee",
    Vee => "vee",
});

named_enum!(FontFamily {
    Serif => "serif",
    SansSerif => "sans-serif",
    Monospace => "monospace",
});

named_enum!(HorizontalAlign {
    Left => "left",
    Center => "center",
    Right => "right",
});

named_enum!(VerticalAlign {
    Top => "top",
    Center => "center",
    Bottom => "bottom",
});

named_enum!(
    /// Two-valued display state: rendered (`element`) or hidden (`none`).
    Visibility {
        Element => "element",
        None => "none",
    }
);

impl From<bool> for Visibility {
    fn from(visible: bool) -> Self {
        if visible {
            Visibility::Element
        } else {
            Visibility::None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueDomain {
    Color,
    Number,
    String,
    Boolean,
    NodeShape,
    LineStyle,
    ArrowShape,
    Font,
    HorizontalAlign,
    VerticalAlign,
    Visibility,
}

impl ValueDomain {
    /// Enumerated domains have a fixed, finite set of values.
    pub fn is_enumerated(&self) -> bool {
        matches!(
            self,
            Self::NodeShape
                | Self::LineStyle
                | Self::ArrowShape
                | Self::Font
                | Self::HorizontalAlign
                | Self::VerticalAlign
                | Self::Visibility
        )
    }

    /// Parse the textual form of a value in this domain.
    pub fn parse(&self, raw: &str) -> Result<VisualValue, StyleError> {
        Ok(match self {
            Self::Color => VisualValue::Color(raw.parse()?),
            Self::Number => VisualValue::Number(
                raw.trim()
                    .parse()
                    .map_err(|_| StyleError::InvalidNumber(raw.to_string()))?,
            ),
            Self::String => VisualValue::String(raw.to_string()),
            Self::Boolean => VisualValue::Boolean(
                raw.trim()
                    .parse()
                    .map_err(|_| StyleError::InvalidBoolean(raw.to_string()))?,
            ),
            Self::NodeShape => VisualValue::NodeShape(raw.parse()?),
            Self::LineStyle => VisualValue::LineStyle(raw.parse()?),
            Self::ArrowShape => VisualValue::ArrowShape(raw.parse()?),
            Self::Font => VisualValue::Font(raw.parse()?),
            Self::HorizontalAlign => VisualValue::HorizontalAlign(raw.parse()?),
            Self::VerticalAlign => VisualValue::VerticalAlign(raw.parse()?),
            Self::Visibility => VisualValue::Visibility(raw.parse()?),
        })
    }
}

impl fmt::Display for ValueDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Color => "color",
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::NodeShape => "node_shape",
            Self::LineStyle => "line_style",
            Self::ArrowShape => "arrow_shape",
            Self::Font => "font",
            Self::HorizontalAlign => "horizontal_align",
            Self::VerticalAlign => "vertical_align",
            Self::Visibility => "visibility",
        };
        f.write_str(name)
    }
}

/// A concrete visual property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum VisualValue {
    Color(Color),
    Number(f64),
    String(String),
    Boolean(bool),
    NodeShape(NodeShape),
    LineStyle(EdgeLineStyle),
    ArrowShape(EdgeArrowShape),
    Font(FontFamily),
    HorizontalAlign(HorizontalAlign),
    VerticalAlign(VerticalAlign),
    Visibility(Visibility),
}

impl VisualValue {
    pub fn domain(&self) -> ValueDomain {
        match self {
            Self::Color(_) => ValueDomain::Color,
            Self::Number(_) => ValueDomain::Number,
            Self::String(_) => ValueDomain::String,
            Self::Boolean(_) => ValueDomain::Boolean,
            Self::NodeShape(_) => ValueDomain::NodeShape,
            Self::LineStyle(_) => ValueDomain::LineStyle,
            Self::ArrowShape(_) => ValueDomain::ArrowShape,
            Self::Font(_) => ValueDomain::Font,
            Self::HorizontalAlign(_) => ValueDomain::HorizontalAlign,
            Self::VerticalAlign(_) => ValueDomain::VerticalAlign,
            Self::Visibility(_) => ValueDomain::Visibility,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }
}

impl fmt::Display for VisualValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Color(c) => write!(f, "{c}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::NodeShape(v) => write!(f, "{v}"),
            Self::LineStyle(v) => write!(f, "{v}"),
            Self::ArrowShape(v) => write!(f, "{v}"),
            Self::Font(v) => write!(f, "{v}"),
            Self::HorizontalAlign(v) => write!(f, "{v}"),
            Self::VerticalAlign(v) => write!(f, "{v}"),
            Self::Visibility(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for VisualValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Color> for VisualValue {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

impl From<&str> for VisualValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumerated_domains() {
        assert!(ValueDomain::NodeShape.is_enumerated());
        assert!(ValueDomain::Visibility.is_enumerated());
        assert!(ValueDomain::Font.is_enumerated());
        assert!(!ValueDomain::Color.is_enumerated());
        assert!(!ValueDomain::Number.is_enumerated());
        assert!(!ValueDomain::String.is_enumerated());
    }

    #[test]
    fn test_named_enum_parse_is_case_insensitive() {
        assert_eq!(
            "Round-Rectangle".parse::<NodeShape>().unwrap(),
            NodeShape::RoundRectangle
        );
        assert_eq!("none".parse::<EdgeArrowShape>().unwrap(), EdgeArrowShape::None);
        assert!("blob".parse::<NodeShape>().is_err());
    }

    #[test]
    fn test_domain_parse_checks_value() {
        assert_eq!(
            ValueDomain::Color.parse("#000000").unwrap(),
            VisualValue::Color(Color::BLACK)
        );
        assert_eq!(
            ValueDomain::Number.parse(" 2.5 ").unwrap(),
            VisualValue::Number(2.5)
        );
        assert!(ValueDomain::Number.parse("wide").is_err());
        assert_eq!(
            ValueDomain::Visibility.parse("element").unwrap(),
            VisualValue::Visibility(Visibility::Element)
        );
    }

    #[test]
    fn test_visual_value_serde_shape() {
        let json = serde_json::to_string(&VisualValue::NodeShape(NodeShape::RoundRectangle)).unwrap();
        assert_eq!(json, r#"{"type":"node_shape","value":"round-rectangle"}"#);
        let back: VisualValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back.domain(), ValueDomain::NodeShape);
    }
}
