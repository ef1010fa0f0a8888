//! Merging of game defaults, cfg overrides and global defaults into display rows

use crate::gamedata::Controls;
use crate::mamecfg::{CustomOverrides, DefaultMappings};
use crate::mapping::{generic_label, translate_sequence, Translation};
use serde::Serialize;

/// Mapping text for a control nobody bound
pub const NOT_MAPPED: &str = "Not mapped";

/// One line of a game's control listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlRow {
    pub control_id: String,
    pub default_label: String,
    pub current_mapping: String,
    /// The mapping comes from the ROM's own cfg file
    pub is_customized: bool,
}

fn default_label(control_id: &str, label: Option<&str>) -> String {
    label
        .map(str::to_string)
        .or_else(|| generic_label(control_id))
        .unwrap_or_else(|| control_id.to_string())
}

/// Produces one row per default control, in the controls' source order
///
/// Precedence for the current mapping: ROM override, then global default,
/// then [`NOT_MAPPED`]. Empty `defaults` yields an empty list.
pub fn compare(
    defaults: &Controls,
    overrides: &CustomOverrides,
    global: &DefaultMappings,
    translate_to_standard: bool,
) -> Vec<ControlRow> {
    let convert = |binding: &str| {
        if translate_to_standard {
            translate_sequence(binding, Translation::ToStandard)
        } else {
            binding.to_string()
        }
    };

    defaults
        .iter()
        .map(|(control_id, def)| {
            let (current_mapping, is_customized) = match overrides.get(control_id) {
                Some(binding) => (convert(binding), true),
                None => match global.get(control_id) {
                    Some(binding) => (convert(binding), false),
                    None => (NOT_MAPPED.to_string(), false),
                },
            };

            ControlRow {
                control_id: control_id.to_string(),
                default_label: default_label(control_id, def.label.as_deref()),
                current_mapping,
                is_customized,
            }
        })
        .collect()
}
