use netview_core::ElementId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bidirectional table between the synthetic ids of a secondary view and the
/// primary elements they stand for.
///
/// One primary element may be represented by several synthetic nodes; a
/// synthetic node represents at most one primary element. Synthetic nodes
/// with no entry (e.g. cluster containers) have no primary counterpart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdMap {
    to_original: HashMap<ElementId, ElementId>,
    to_synthetic: HashMap<ElementId, Vec<ElementId>>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, synthetic: ElementId, original: ElementId) {
        if let Some(previous) = self.to_original.insert(synthetic.clone(), original.clone()) {
            self.unlink(&previous, &synthetic);
        }
        self.to_synthetic.entry(original).or_default().push(synthetic);
    }

    fn unlink(&mut self, original: &ElementId, synthetic: &ElementId) {
        if let Some(list) = self.to_synthetic.get_mut(original) {
            list.retain(|s| s != synthetic);
            if list.is_empty() {
                self.to_synthetic.remove(original);
            }
        }
    }

    pub fn original_of(&self, synthetic: &ElementId) -> Option<&ElementId> {
        self.to_original.get(synthetic)
    }

    pub fn synthetics_of(&self, original: &ElementId) -> &[ElementId] {
        self.to_synthetic
            .get(original)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Forget a primary element; returns the synthetic ids that stood for it.
    pub fn remove_original(&mut self, original: &ElementId) -> Vec<ElementId> {
        let synthetics = self.to_synthetic.remove(original).unwrap_or_default();
        for synthetic in &synthetics {
            self.to_original.remove(synthetic);
        }
        synthetics
    }

    pub fn remove_synthetic(&mut self, synthetic: &ElementId) -> Option<ElementId> {
        let original = self.to_original.remove(synthetic)?;
        self.unlink(&original, synthetic);
        Some(original)
    }

    pub fn len(&self) -> usize {
        self.to_original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_original.is_empty()
    }
}
