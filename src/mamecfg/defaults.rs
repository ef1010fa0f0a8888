//! Global default bindings from `cfg/default.cfg`

use super::error::CfgError;
use super::{port_nodes, read_cfg};
use crate::mapping::translator::RAW_PREFIX;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Control id → raw joystick code, independent of any game
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultMappings {
    mappings: HashMap<String, String>,
}

impl DefaultMappings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, control_id: impl Into<String>, raw_code: impl Into<String>) {
        self.mappings.insert(control_id.into(), raw_code.into());
    }

    pub fn get(&self, control_id: &str) -> Option<&str> {
        self.mappings.get(control_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DefaultMappings {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut defaults = DefaultMappings::new();
        for (control_id, raw_code) in iter {
            defaults.insert(control_id, raw_code);
        }
        defaults
    }
}

/// First `JOYCODE_<n>_<input>` token of a possibly compound sequence
pub fn extract_raw_code(sequence: &str) -> Option<&str> {
    sequence.split_whitespace().find(|token| {
        token
            .strip_prefix(RAW_PREFIX)
            .and_then(|rest| rest.strip_prefix('_'))
            .and_then(|rest| rest.split_once('_'))
            .is_some_and(|(player, input)| {
                !player.is_empty() && player.bytes().all(|b| b.is_ascii_digit()) && !input.is_empty()
            })
    })
}

/// Parses the global defaults document
///
/// Only `newseq` elements of type `standard` are consulted, and only their
/// joystick code is kept; keyboard alternatives are dropped.
pub fn parse_default_mappings(xml: &str) -> Result<DefaultMappings, CfgError> {
    let doc = roxmltree::Document::parse(xml)?;
    let mut defaults = DefaultMappings::new();

    for port in port_nodes(&doc) {
        let Some(control_id) = port.attribute("type") else {
            continue;
        };
        let raw_code = port
            .children()
            .filter(|n| n.has_tag_name("newseq") && n.attribute("type") == Some("standard"))
            .filter_map(|n| n.text())
            .find_map(extract_raw_code);

        match raw_code {
            Some(code) => defaults.insert(control_id, code),
            None => debug!("default.cfg: no joystick code for {}", control_id),
        }
    }

    Ok(defaults)
}

/// Reads and parses `default.cfg`
pub async fn load_default_mappings(path: &Path) -> Result<DefaultMappings, CfgError> {
    let text = read_cfg(path).await?;
    let defaults = parse_default_mappings(&text)?;
    debug!(
        "Loaded {} default mappings from {}",
        defaults.len(),
        path.display()
    );
    Ok(defaults)
}
