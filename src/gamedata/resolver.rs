//! Parent/clone control resolution

use super::database::GameDatabase;
use super::error::ResolveError;
use super::types::Controls;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How far up the clone chain a ROM without controls may look
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolvePolicy {
    /// The ROM itself, then its immediate parent only
    ParentOnly,
    /// The ROM, then each ancestor in turn until one has controls
    #[default]
    AncestorChain,
}

/// Controls that apply to a ROM, and where they came from
#[derive(Debug, Clone, Copy)]
pub struct ResolvedControls<'a> {
    pub rom_id: &'a str,
    /// Entry that actually defines the controls
    pub source_id: &'a str,
    pub controls: &'a Controls,
}

impl ResolvedControls<'_> {
    pub fn is_inherited(&self) -> bool {
        self.rom_id != self.source_id
    }
}

/// Returns the effective controls for `rom_id`
///
/// A ROM's own non-empty controls always win. Clone controls replace the
/// parent's wholesale; the two sets are never merged.
pub fn resolve<'a>(
    db: &'a GameDatabase,
    rom_id: &str,
    policy: ResolvePolicy,
) -> Result<ResolvedControls<'a>, ResolveError> {
    let entry = db
        .get(rom_id)
        .ok_or_else(|| ResolveError::UnknownRom(rom_id.to_string()))?;

    let max_hops = match policy {
        ResolvePolicy::ParentOnly => 1,
        // Each hop visits a distinct entry, so the chain can't be longer than the db
        ResolvePolicy::AncestorChain => db.len(),
    };

    let mut current = entry;
    let mut hops = 0;
    loop {
        if current.has_controls() {
            if hops > 0 {
                debug!("{} inherits controls from {}", entry.id, current.id);
            }
            return Ok(ResolvedControls {
                rom_id: &entry.id,
                source_id: &current.id,
                controls: &current.controls,
            });
        }

        if hops >= max_hops {
            break;
        }
        match db.parent_of(&current.id).and_then(|parent| db.get(parent)) {
            Some(parent) => current = parent,
            None => break,
        }
        hops += 1;
    }

    Err(ResolveError::NoControls(rom_id.to_string()))
}
