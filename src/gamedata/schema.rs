//! Versioned gamedata schema and the one-shot migration run at load time
//!
//! Two document shapes are accepted:
//!
//! ```text
//! v1 (legacy):  { "<rom>": { ... }, ... }
//! v2:           { "schema_version": 2, "games": { "<rom>": { ... } } }
//! ```
//!
//! Legacy documents use a few alternative spellings that older editors wrote.
//! They are rewritten here, once, so that the database builder only ever sees
//! the current field names.

use super::error::GameDataError;
use serde_json::{Map, Value};
use tracing::{debug, info};

pub const CURRENT_SCHEMA_VERSION: u64 = 2;
const LEGACY_SCHEMA_VERSION: u64 = 1;

const VERSION_KEY: &str = "schema_version";
const GAMES_KEY: &str = "games";

/// Legacy key → current key
const FIELD_ALIASES: [(&str, &str); 2] = [("name", "description"), ("players", "playercount")];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: u64,
    pub rewritten_fields: usize,
}

/// Normalizes a gamedata document to the current schema
///
/// Returns the ROM map (ids → entry objects) in source order.
pub fn migrate(document: Value) -> Result<(Map<String, Value>, MigrationReport), GameDataError> {
    let Value::Object(mut root) = document else {
        return Err(GameDataError::NotAnObject);
    };

    let version = root
        .get(VERSION_KEY)
        .and_then(Value::as_u64)
        .unwrap_or(LEGACY_SCHEMA_VERSION);

    if version > CURRENT_SCHEMA_VERSION {
        return Err(GameDataError::UnsupportedVersion(version));
    }

    let mut games = if root.contains_key(VERSION_KEY) {
        match root.remove(GAMES_KEY) {
            Some(Value::Object(games)) => games,
            _ => return Err(GameDataError::MissingGames),
        }
    } else {
        root
    };

    let mut report = MigrationReport {
        from_version: version,
        rewritten_fields: 0,
    };

    if version < CURRENT_SCHEMA_VERSION {
        for (_, entry) in games.iter_mut() {
            report.rewritten_fields += upgrade_entry(entry);
        }
        if report.rewritten_fields > 0 {
            info!(
                "Migrated gamedata from schema v{} ({} fields rewritten)",
                version, report.rewritten_fields
            );
        } else {
            debug!("Legacy gamedata needed no field rewrites");
        }
    }

    Ok((games, report))
}

fn upgrade_entry(entry: &mut Value) -> usize {
    let Value::Object(fields) = entry else {
        // Left for the builder to reject and count
        return 0;
    };
    let mut rewritten = 0;

    for (legacy, current) in FIELD_ALIASES {
        if fields.contains_key(legacy) && !fields.contains_key(current) {
            if let Some(value) = fields.remove(legacy) {
                fields.insert(current.to_string(), value);
                rewritten += 1;
            }
        }
    }

    if let Some(Value::Object(controls)) = fields.get_mut("controls") {
        for (_, control) in controls.iter_mut() {
            if let Value::String(label) = control {
                let mut def = Map::new();
                def.insert("name".to_string(), Value::String(std::mem::take(label)));
                *control = Value::Object(def);
                rewritten += 1;
            }
        }
    }

    if let Some(Value::Object(clones)) = fields.get_mut("clones") {
        for (_, clone) in clones.iter_mut() {
            rewritten += upgrade_entry(clone);
        }
    }

    rewritten
}
