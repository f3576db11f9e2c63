use crate::{ValueDomain, VisualPropertyGroup, VisualPropertyName};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Invalid boolean: {0}")]
    InvalidBoolean(String),
    #[error("Unknown {domain} value: {value}")]
    UnknownEnumValue { domain: &'static str, value: String },
    #[error("Unknown visual property: {0}")]
    UnknownProperty(String),
    #[error("{property} takes {expected} values, got {actual}")]
    DomainMismatch {
        property: VisualPropertyName,
        expected: ValueDomain,
        actual: ValueDomain,
    },
    #[error("{property} belongs to the {actual} group, not {expected}")]
    GroupMismatch {
        property: VisualPropertyName,
        expected: VisualPropertyGroup,
        actual: VisualPropertyGroup,
    },
    #[error("Invalid mapping for {property}: {reason}")]
    InvalidMapping {
        property: VisualPropertyName,
        reason: String,
    },
}
