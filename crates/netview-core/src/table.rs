use crate::{AttributeValue, CoreError, ElementId, NetworkId, ValueTypeName};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type AttributeRow = HashMap<String, AttributeValue>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub value_type: ValueTypeName,
}

/// Attribute table for one element collection (nodes, edges or the network).
///
/// The style engine only reads rows; writes happen through the workbench.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributeTable {
    columns: Vec<Column>,
    rows: HashMap<ElementId, AttributeRow>,
}

impl AttributeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Declare a column. Re-declaring with the same type is a no-op.
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        value_type: ValueTypeName,
    ) -> Result<(), CoreError> {
        let name = name.into();
        match self.column(&name) {
            Some(existing) if existing.value_type == value_type => Ok(()),
            Some(existing) => Err(CoreError::ColumnTypeMismatch {
                column: name,
                expected: existing.value_type.to_string(),
                actual: value_type.to_string(),
            }),
            None => {
                self.columns.push(Column { name, value_type });
                Ok(())
            }
        }
    }

    /// Store a value, declaring the column from the value's type if needed.
    pub fn set_value(
        &mut self,
        id: &ElementId,
        column: &str,
        value: AttributeValue,
    ) -> Result<(), CoreError> {
        match self.column(column) {
            Some(existing) if !value.fits(existing.value_type) => {
                return Err(CoreError::ColumnTypeMismatch {
                    column: column.to_string(),
                    expected: existing.value_type.to_string(),
                    actual: value.value_type().to_string(),
                });
            }
            Some(_) => {}
            None => self.columns.push(Column {
                name: column.to_string(),
                value_type: value.value_type(),
            }),
        }
        self.rows
            .entry(id.clone())
            .or_default()
            .insert(column.to_string(), value);
        Ok(())
    }

    pub fn value(&self, id: &ElementId, column: &str) -> Option<&AttributeValue> {
        self.rows.get(id).and_then(|row| row.get(column))
    }

    pub fn row(&self, id: &ElementId) -> Option<&AttributeRow> {
        self.rows.get(id)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn remove_rows<'a>(&mut self, ids: impl IntoIterator<Item = &'a ElementId>) -> usize {
        ids.into_iter()
            .filter(|id| self.rows.remove(*id).is_some())
            .count()
    }

    /// Smallest and largest numeric value of a column, ignoring non-numeric cells.
    pub fn column_range(&self, column: &str) -> Option<(f64, f64)> {
        self.rows
            .values()
            .filter_map(|row| row.get(column).and_then(AttributeValue::as_f64))
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// The node, edge and network tables of one network.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkTables {
    pub nodes: AttributeTable,
    pub edges: AttributeTable,
    /// Single-row table keyed by the network id.
    pub network: AttributeTable,
}

impl NetworkTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn network_row(&self, id: &NetworkId) -> Option<&AttributeRow> {
        self.network.row(&ElementId(id.0.clone()))
    }
}
