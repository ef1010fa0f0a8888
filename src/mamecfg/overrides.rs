//! Per-ROM control overrides from `cfg/<rom>.cfg`

use super::error::CfgError;
use super::{port_nodes, read_cfg};
use crate::mapping::ControlId;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One rebinding from a ROM's cfg file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomMapping {
    pub control_id: String,
    /// Binding in MAME's raw naming scheme, possibly a compound sequence
    pub physical_binding: String,
}

/// All overrides of one ROM, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomOverrides {
    mappings: Vec<CustomMapping>,
}

impl CustomOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the binding of a control
    pub fn insert(&mut self, control_id: impl Into<String>, binding: impl Into<String>) {
        let control_id = control_id.into();
        let physical_binding = binding.into();
        match self.mappings.iter_mut().find(|m| m.control_id == control_id) {
            Some(existing) => existing.physical_binding = physical_binding,
            None => self.mappings.push(CustomMapping {
                control_id,
                physical_binding,
            }),
        }
    }

    pub fn get(&self, control_id: &str) -> Option<&str> {
        self.mappings
            .iter()
            .find(|m| m.control_id == control_id)
            .map(|m| m.physical_binding.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CustomMapping> {
        self.mappings.iter()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CustomOverrides {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut overrides = CustomOverrides::new();
        for (control_id, binding) in iter {
            overrides.insert(control_id, binding);
        }
        overrides
    }
}

/// Parses the overrides out of a ROM cfg document
///
/// Only ports whose `type` is a player button or joystick direction are kept.
/// The `standard` sequence is preferred when a port lists several.
pub fn parse_custom_overrides(xml: &str) -> Result<CustomOverrides, CfgError> {
    let doc = roxmltree::Document::parse(xml)?;
    let mut overrides = CustomOverrides::new();

    for port in port_nodes(&doc) {
        let Some(control_id) = port.attribute("type") else {
            continue;
        };
        if !ControlId::is_recognized(control_id) {
            continue;
        }

        let sequences: Vec<_> = port
            .children()
            .filter(|n| n.has_tag_name("newseq"))
            .collect();
        let chosen = sequences
            .iter()
            .find(|n| n.attribute("type") == Some("standard"))
            .or_else(|| sequences.first());

        let binding = chosen
            .and_then(|n| n.text())
            .map(str::trim)
            .filter(|text| !text.is_empty());

        if let Some(binding) = binding {
            overrides.insert(control_id, binding);
        }
    }

    Ok(overrides)
}

pub fn rom_cfg_path(cfg_dir: &Path, rom_id: &str) -> PathBuf {
    cfg_dir.join(format!("{rom_id}.cfg"))
}

/// Loads a ROM's overrides, treating every failure as "no overrides"
///
/// A missing file is the normal case for ROMs the user never rebound. A file
/// that fails to parse is logged and ignored so the defaults still show.
pub async fn load_custom_overrides(cfg_dir: &Path, rom_id: &str) -> CustomOverrides {
    let path = rom_cfg_path(cfg_dir, rom_id);
    let text = match read_cfg(&path).await {
        Ok(text) => text,
        Err(e) if e.is_missing_file() => {
            debug!("No cfg file for {}", rom_id);
            return CustomOverrides::new();
        }
        Err(e) => {
            warn!("{}", e);
            return CustomOverrides::new();
        }
    };

    match parse_custom_overrides(&text) {
        Ok(overrides) => {
            debug!("Loaded {} overrides for {}", overrides.len(), rom_id);
            overrides
        }
        Err(e) => {
            warn!("Ignoring cfg file {}: {}", path.display(), e);
            CustomOverrides::new()
        }
    }
}
