use netview_core::{ElementId, NetworkId};
use std::collections::HashMap;

use crate::mapping::MappingFunction;
use crate::{StyleError, VisualPropertyGroup, VisualPropertyName, VisualValue};

/// One stylable property: default, optional mapping, per-element bypasses.
///
/// The default is always within the property's value domain; every edit goes
/// through [`VisualStyle`], which enforces that.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualProperty {
    pub(crate) name: VisualPropertyName,
    pub(crate) default_value: VisualValue,
    pub(crate) mapping: Option<MappingFunction>,
    pub(crate) bypass_map: HashMap<ElementId, VisualValue>,
}

impl VisualProperty {
    fn new(name: VisualPropertyName) -> Self {
        Self {
            name,
            default_value: name.default_value(),
            mapping: None,
            bypass_map: HashMap::new(),
        }
    }

    pub fn name(&self) -> VisualPropertyName {
        self.name
    }

    pub fn group(&self) -> VisualPropertyGroup {
        self.name.group()
    }

    pub fn default_value(&self) -> &VisualValue {
        &self.default_value
    }

    pub fn mapping(&self) -> Option<&MappingFunction> {
        self.mapping.as_ref()
    }

    pub fn bypass_map(&self) -> &HashMap<ElementId, VisualValue> {
        &self.bypass_map
    }

    pub fn bypass(&self, id: &ElementId) -> Option<&VisualValue> {
        self.bypass_map.get(id)
    }
}

fn check_domain(property: VisualPropertyName, value: &VisualValue) -> Result<(), StyleError> {
    if value.domain() == property.domain() {
        Ok(())
    } else {
        Err(StyleError::DomainMismatch {
            property,
            expected: property.domain(),
            actual: value.domain(),
        })
    }
}

/// Declarative style of one network.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualStyle {
    /// Indexed by property discriminant, in registry order.
    properties: Vec<VisualProperty>,
}

impl Default for VisualStyle {
    fn default() -> Self {
        Self::new()
    }
}

impl VisualStyle {
    /// Every registered property at its built-in default, no mappings, no bypasses.
    pub fn new() -> Self {
        let properties = VisualPropertyName::ALL
            .iter()
            .map(|&name| VisualProperty::new(name))
            .collect();
        Self { properties }
    }

    pub fn property(&self, name: VisualPropertyName) -> &VisualProperty {
        &self.properties[name.index()]
    }

    fn property_mut(&mut self, name: VisualPropertyName) -> &mut VisualProperty {
        &mut self.properties[name.index()]
    }

    pub fn properties(&self, group: VisualPropertyGroup) -> impl Iterator<Item = &VisualProperty> {
        self.properties.iter().filter(move |p| p.group() == group)
    }

    pub fn all_properties(&self) -> impl Iterator<Item = &VisualProperty> {
        self.properties.iter()
    }

    pub fn set_default(
        &mut self,
        name: VisualPropertyName,
        value: VisualValue,
    ) -> Result<(), StyleError> {
        check_domain(name, &value)?;
        self.property_mut(name).default_value = value;
        Ok(())
    }

    /// Attach a mapping, replacing any existing one. Every visual value the
    /// mapping can produce must be within the property's domain.
    pub fn set_mapping(
        &mut self,
        name: VisualPropertyName,
        mapping: MappingFunction,
    ) -> Result<(), StyleError> {
        if mapping.attribute().is_empty() {
            return Err(StyleError::InvalidMapping {
                property: name,
                reason: "mapping attribute is empty".to_string(),
            });
        }
        if let MappingFunction::Passthrough(m) = &mapping
            && m.visual_property_type != name.domain()
        {
            return Err(StyleError::DomainMismatch {
                property: name,
                expected: name.domain(),
                actual: m.visual_property_type,
            });
        }
        for value in mapping.visual_values() {
            check_domain(name, value)?;
        }
        self.property_mut(name).mapping = Some(mapping);
        Ok(())
    }

    pub fn remove_mapping(&mut self, name: VisualPropertyName) -> Option<MappingFunction> {
        self.property_mut(name).mapping.take()
    }

    pub fn set_bypass<'a>(
        &mut self,
        name: VisualPropertyName,
        ids: impl IntoIterator<Item = &'a ElementId>,
        value: VisualValue,
    ) -> Result<(), StyleError> {
        check_domain(name, &value)?;
        let property = self.property_mut(name);
        for id in ids {
            property.bypass_map.insert(id.clone(), value.clone());
        }
        Ok(())
    }

    /// Returns the number of bypass entries removed.
    pub fn delete_bypass<'a>(
        &mut self,
        name: VisualPropertyName,
        ids: impl IntoIterator<Item = &'a ElementId>,
    ) -> usize {
        let property = self.property_mut(name);
        ids.into_iter()
            .filter(|id| property.bypass_map.remove(*id).is_some())
            .count()
    }

    /// Drop bypass entries of deleted elements from every property.
    pub fn prune_bypasses(&mut self, ids: &[ElementId]) -> usize {
        let mut removed = 0;
        for property in self.properties.iter_mut() {
            if property.bypass_map.is_empty() {
                continue;
            }
            for id in ids {
                if property.bypass_map.remove(id).is_some() {
                    removed += 1;
                }
            }
        }
        removed
    }

    pub fn bypass_count(&self) -> usize {
        self.properties.iter().map(|p| p.bypass_map.len()).sum()
    }
}

/// Owns exactly one visual style per network.
#[derive(Debug, Default)]
pub struct VisualStyleStore {
    styles: HashMap<NetworkId, VisualStyle>,
}

impl VisualStyleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a style for a network, returning the one it replaces.
    pub fn insert(&mut self, network: NetworkId, style: VisualStyle) -> Option<VisualStyle> {
        self.styles.insert(network, style)
    }

    pub fn get(&self, network: &NetworkId) -> Option<&VisualStyle> {
        self.styles.get(network)
    }

    pub fn get_mut(&mut self, network: &NetworkId) -> Option<&mut VisualStyle> {
        self.styles.get_mut(network)
    }

    pub fn remove(&mut self, network: &NetworkId) -> Option<VisualStyle> {
        self.styles.remove(network)
    }

    pub fn contains(&self, network: &NetworkId) -> bool {
        self.styles.contains_key(network)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}
