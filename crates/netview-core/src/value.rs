//! Attribute value model.
//!
//! Attribute tables hold scalar values of five primitive types, or homogeneous
//! lists of them.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueTypeName {
    String,
    Long,
    Integer,
    Double,
    Boolean,
    ListOfString,
    ListOfLong,
    ListOfInteger,
    ListOfDouble,
    ListOfBoolean,
}

impl ValueTypeName {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Long | Self::Integer | Self::Double)
    }

    pub fn is_list(&self) -> bool {
        matches!(
            self,
            Self::ListOfString
                | Self::ListOfLong
                | Self::ListOfInteger
                | Self::ListOfDouble
                | Self::ListOfBoolean
        )
    }

    /// The list type whose elements have this scalar type.
    pub fn list_of(&self) -> Option<Self> {
        match self {
            Self::String => Some(Self::ListOfString),
            Self::Long => Some(Self::ListOfLong),
            Self::Integer => Some(Self::ListOfInteger),
            Self::Double => Some(Self::ListOfDouble),
            Self::Boolean => Some(Self::ListOfBoolean),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Long => "long",
            Self::Integer => "integer",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::ListOfString => "list_of_string",
            Self::ListOfLong => "list_of_long",
            Self::ListOfInteger => "list_of_integer",
            Self::ListOfDouble => "list_of_double",
            Self::ListOfBoolean => "list_of_boolean",
        }
    }
}

impl fmt::Display for ValueTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    String(String),
    Long(i64),
    Integer(i32),
    Double(f64),
    Boolean(bool),
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    /// Type of the value. Empty lists report `list_of_string`.
    pub fn value_type(&self) -> ValueTypeName {
        match self {
            Self::String(_) => ValueTypeName::String,
            Self::Long(_) => ValueTypeName::Long,
            Self::Integer(_) => ValueTypeName::Integer,
            Self::Double(_) => ValueTypeName::Double,
            Self::Boolean(_) => ValueTypeName::Boolean,
            Self::List(items) => items
                .first()
                .and_then(|first| first.value_type().list_of())
                .unwrap_or(ValueTypeName::ListOfString),
        }
    }

    /// Numeric view of a scalar. Strings are not coerced.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Long(v) => Some(*v as f64),
            Self::Integer(v) => Some(*v as f64),
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Booleans, plus the strings `"true"`/`"false"` in any case.
    pub fn as_bool_like(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            Self::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Self::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    /// Hashable key for exact-match lookup.
    pub fn discrete_key(&self) -> DiscreteKey {
        match self {
            Self::String(s) => DiscreteKey::Text(s.clone()),
            Self::Long(v) => DiscreteKey::Int(*v),
            Self::Integer(v) => DiscreteKey::Int(i64::from(*v)),
            Self::Double(v) => DiscreteKey::from_f64(*v),
            Self::Boolean(b) => DiscreteKey::Bool(*b),
            Self::List(items) => DiscreteKey::List(items.iter().map(Self::discrete_key).collect()),
        }
    }

    /// Whether this value may be stored in a column of type `ty`.
    pub fn fits(&self, ty: ValueTypeName) -> bool {
        match (self, ty) {
            (Self::List(items), list_ty) if list_ty.is_list() => items
                .iter()
                .all(|item| item.value_type().list_of() == Some(list_ty)),
            (Self::Integer(_), ValueTypeName::Long | ValueTypeName::Double) => true,
            (Self::Long(_), ValueTypeName::Double) => true,
            (value, ty) => value.value_type() == ty,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Long(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// Normalized form of an attribute value used as a discrete lookup key.
///
/// All numbers share one key space, so `Long(5)`, `Integer(5)` and
/// `Double(5.0)` are the same key. Strings never compare equal to numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DiscreteKey {
    Text(String),
    Int(i64),
    Float(u64),
    Bool(bool),
    List(Vec<DiscreteKey>),
}

impl DiscreteKey {
    fn from_f64(v: f64) -> Self {
        if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
            Self::Int(v as i64)
        } else if v.is_nan() {
            Self::Float(f64::NAN.to_bits())
        } else {
            Self::Float(v.to_bits())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_keys_unify_across_widths() {
        assert_eq!(
            AttributeValue::Long(5).discrete_key(),
            AttributeValue::Double(5.0).discrete_key()
        );
        assert_eq!(
            AttributeValue::Integer(-3).discrete_key(),
            AttributeValue::Long(-3).discrete_key()
        );
        assert_ne!(
            AttributeValue::Double(5.5).discrete_key(),
            AttributeValue::Long(5).discrete_key()
        );
        assert_ne!(
            AttributeValue::from("5").discrete_key(),
            AttributeValue::Long(5).discrete_key()
        );
    }

    #[test]
    fn test_bool_like_strings() {
        assert_eq!(AttributeValue::from("TRUE").as_bool_like(), Some(true));
        assert_eq!(AttributeValue::from("False").as_bool_like(), Some(false));
        assert_eq!(AttributeValue::Boolean(true).as_bool_like(), Some(true));
        assert_eq!(AttributeValue::from("yes").as_bool_like(), None);
        assert_eq!(AttributeValue::Long(1).as_bool_like(), None);
    }

    #[test]
    fn test_as_f64_only_for_numbers() {
        assert_eq!(AttributeValue::Integer(4).as_f64(), Some(4.0));
        assert_eq!(AttributeValue::from("4").as_f64(), None);
        assert_eq!(AttributeValue::List(vec![]).as_f64(), None);
    }

    #[test]
    fn test_list_value_type_and_fit() {
        let list = AttributeValue::List(vec![AttributeValue::Long(1), AttributeValue::Long(2)]);
        assert_eq!(list.value_type(), ValueTypeName::ListOfLong);
        assert!(list.fits(ValueTypeName::ListOfLong));
        assert!(!list.fits(ValueTypeName::ListOfString));
        assert!(AttributeValue::Integer(1).fits(ValueTypeName::Double));
        assert!(!AttributeValue::Double(1.0).fits(ValueTypeName::Integer));
    }

    #[test]
    fn test_serde_uses_type_tag() {
        let json = serde_json::to_string(&AttributeValue::Double(2.5)).unwrap();
        assert_eq!(json, r#"{"type":"double","value":2.5}"#);
        let back: AttributeValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AttributeValue::Double(2.5));
    }
}
