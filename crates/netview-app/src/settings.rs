use anyhow::Context;
use netview_view::{
    CircleLayout, CirclePackingBuilder, ForceDirectedLayout, GridLayout, LayoutAlgorithm,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    Grid,
    Circle,
    #[default]
    ForceDirected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbenchSettings {
    pub log_level: String,
    pub default_layout: LayoutKind,
    pub layout: LayoutSettings,
    pub circle_packing: CirclePackingSettings,
}

impl Default for WorkbenchSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            default_layout: LayoutKind::default(),
            layout: LayoutSettings::default(),
            circle_packing: CirclePackingSettings::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub grid_spacing: f64,
    pub circle_radius: f64,
    pub force_iterations: usize,
    pub spring_length: f64,
    pub repulsion: f64,
    pub damping: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        let force = ForceDirectedLayout::default();
        Self {
            grid_spacing: GridLayout::default().spacing,
            circle_radius: CircleLayout::default().radius,
            force_iterations: force.iterations,
            spring_length: force.spring_length,
            repulsion: force.repulsion,
            damping: force.damping,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CirclePackingSettings {
    pub leaf_radius: f64,
    pub padding: f64,
}

impl Default for CirclePackingSettings {
    fn default() -> Self {
        let builder = CirclePackingBuilder::default();
        Self {
            leaf_radius: builder.leaf_radius,
            padding: builder.padding,
        }
    }
}

impl WorkbenchSettings {
    /// Read settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
        tracing::info!("Settings loaded from {}", path.display());
        Ok(settings)
    }

    /// Like [`load`](Self::load) but falls back to defaults, logging why.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!("Settings file not found, using defaults");
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::error!("{:#}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings file {}", path.display()))?;
        Ok(())
    }

    pub fn layout_algorithm(&self, kind: LayoutKind) -> Box<dyn LayoutAlgorithm> {
        match kind {
            LayoutKind::Grid => Box::new(GridLayout {
                spacing: self.layout.grid_spacing,
            }),
            LayoutKind::Circle => Box::new(CircleLayout {
                radius: self.layout.circle_radius,
            }),
            LayoutKind::ForceDirected => Box::new(ForceDirectedLayout {
                iterations: self.layout.force_iterations,
                spring_length: self.layout.spring_length,
                repulsion: self.layout.repulsion,
                damping: self.layout.damping,
            }),
        }
    }

    pub fn circle_packing_builder(&self) -> CirclePackingBuilder {
        CirclePackingBuilder::new(self.circle_packing.leaf_radius, self.circle_packing.padding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: WorkbenchSettings =
            serde_json::from_str(r#"{"default_layout":"grid","layout":{"grid_spacing":5.0}}"#)
                .unwrap();
        assert_eq!(settings.default_layout, LayoutKind::Grid);
        assert_eq!(settings.layout.grid_spacing, 5.0);
        assert_eq!(settings.layout.circle_radius, CircleLayout::default().radius);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_layout_algorithm_names() {
        let settings = WorkbenchSettings::default();
        assert_eq!(settings.layout_algorithm(LayoutKind::Grid).name(), "grid");
        assert_eq!(
            settings.layout_algorithm(LayoutKind::ForceDirected).name(),
            "force-directed"
        );
    }
}
