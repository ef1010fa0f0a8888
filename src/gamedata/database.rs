//! Construction of the in-memory game database
//!
//! The gamedata document is a tree: top-level ROMs with nested clones. The
//! database flattens it into an id index plus a clone → parent index so that
//! every ROM, clone or not, is addressable by id.

use super::error::GameDataError;
use super::schema::{self, MigrationReport};
use super::types::{ControlDef, Controls, GameEntry};
use crate::mapping::generic_label;
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Counters collected while building a database
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Top-level entries registered
    pub games: usize,
    /// Clone entries registered
    pub clones: usize,
    /// Entries (or clone blocks) dropped for having the wrong shape
    pub skipped_entries: usize,
    /// Controls dropped for having the wrong shape or no usable label
    pub skipped_controls: usize,
    /// Ids seen a second time anywhere in the tree
    pub duplicate_ids: usize,
    pub schema_version: u64,
    pub migrated_fields: usize,
}

/// Immutable snapshot of the gamedata document
#[derive(Debug, Clone)]
pub struct GameDatabase {
    by_id: HashMap<String, GameEntry>,
    parent_of: HashMap<String, String>,
    order: Vec<String>,
    report: BuildReport,
    built_at: DateTime<Local>,
}

/// Metadata a clone falls back to when its own entry omits it
#[derive(Clone)]
struct Inherited {
    display_name: String,
    player_count: u32,
    alternating: bool,
    button_count: u32,
    stick_count: u32,
}

impl From<&GameEntry> for Inherited {
    fn from(entry: &GameEntry) -> Self {
        Self {
            display_name: entry.display_name.clone(),
            player_count: entry.player_count,
            alternating: entry.alternating,
            button_count: entry.button_count,
            stick_count: entry.stick_count,
        }
    }
}

#[derive(Default)]
struct Builder {
    by_id: HashMap<String, GameEntry>,
    parent_of: HashMap<String, String>,
    order: Vec<String>,
    report: BuildReport,
}

fn parse_count(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_flag(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_u64().map(|n| n != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

impl Builder {
    fn parse_controls(&mut self, rom_id: &str, raw: &Map<String, Value>) -> Controls {
        let mut controls = Controls::new();
        for (control_id, value) in raw {
            let Value::Object(def) = value else {
                debug!("{}: control {} is not an object, skipped", rom_id, control_id);
                self.report.skipped_controls += 1;
                continue;
            };

            let label = def
                .get("name")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string);

            if label.is_none() && generic_label(control_id).is_none() {
                debug!("{}: control {} has no usable label, omitted", rom_id, control_id);
                self.report.skipped_controls += 1;
                continue;
            }

            controls.insert(control_id.as_str(), ControlDef { label });
        }
        controls
    }

    /// Registers one entry and, recursively, its clones. Returns false if the
    /// entry was skipped.
    fn add_entry(&mut self, id: &str, value: &Value, parent: Option<(&str, &Inherited)>) -> bool {
        let Value::Object(fields) = value else {
            warn!("Skipping malformed gamedata entry {}: not an object", id);
            self.report.skipped_entries += 1;
            return false;
        };

        if self.by_id.contains_key(id) {
            warn!("Skipping duplicate gamedata entry {}", id);
            self.report.duplicate_ids += 1;
            return false;
        }

        let controls = match fields.get("controls") {
            None | Some(Value::Null) => Controls::new(),
            Some(Value::Object(raw)) => self.parse_controls(id, raw),
            Some(_) => {
                // The entry and its clones stay addressable
                warn!("Ignoring malformed controls block of {}", id);
                self.report.skipped_controls += 1;
                Controls::new()
            }
        };

        let inherited = parent.map(|(_, inherited)| inherited);
        let mut entry = GameEntry::new(id);
        entry.display_name = fields
            .get("description")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .or_else(|| inherited.map(|i| i.display_name.clone()))
            .unwrap_or_else(|| id.to_string());
        entry.player_count = parse_count(fields.get("playercount"))
            .or(inherited.map(|i| i.player_count))
            .unwrap_or(1)
            .max(1);
        entry.button_count = parse_count(fields.get("buttons"))
            .or(inherited.map(|i| i.button_count))
            .unwrap_or(0);
        entry.stick_count = parse_count(fields.get("sticks"))
            .or(inherited.map(|i| i.stick_count))
            .unwrap_or(0);
        entry.alternating = parse_flag(fields.get("alternating"))
            .or(inherited.map(|i| i.alternating))
            .unwrap_or(false);
        entry.controls = controls;
        entry.parent_id = parent.map(|(parent_id, _)| parent_id.to_string());

        if let Some(parent_id) = &entry.parent_id {
            self.parent_of.insert(id.to_string(), parent_id.clone());
            self.report.clones += 1;
        } else {
            self.report.games += 1;
        }

        let for_clones = Inherited::from(&entry);
        self.by_id.insert(id.to_string(), entry);
        self.order.push(id.to_string());

        let clones = match fields.get("clones") {
            None | Some(Value::Null) => return true,
            Some(Value::Object(clones)) => clones,
            Some(_) => {
                warn!("Ignoring malformed clones block of {}", id);
                self.report.skipped_entries += 1;
                return true;
            }
        };

        let mut accepted = Vec::with_capacity(clones.len());
        for (clone_id, clone_value) in clones {
            if self.add_entry(clone_id, clone_value, Some((id, &for_clones))) {
                accepted.push(clone_id.clone());
            }
        }
        if let Some(entry) = self.by_id.get_mut(id) {
            entry.clones = accepted;
        }
        true
    }

    fn finish(self, migration: MigrationReport) -> GameDatabase {
        let mut report = self.report;
        report.schema_version = migration.from_version;
        report.migrated_fields = migration.rewritten_fields;

        info!(
            "Game database built: {} games, {} clones, {} entries skipped, {} controls skipped, {} duplicates",
            report.games,
            report.clones,
            report.skipped_entries,
            report.skipped_controls,
            report.duplicate_ids
        );

        GameDatabase {
            by_id: self.by_id,
            parent_of: self.parent_of,
            order: self.order,
            report,
            built_at: Local::now(),
        }
    }
}

impl GameDatabase {
    /// Builds the database from a parsed gamedata document
    ///
    /// Only a document whose shape cannot be interpreted at all is an error.
    /// Malformed entries are skipped and counted in [`BuildReport`].
    pub fn build(document: Value) -> Result<Self, GameDataError> {
        let (games, migration) = schema::migrate(document)?;

        let mut builder = Builder::default();
        for (id, value) in &games {
            builder.add_entry(id, value, None);
        }
        Ok(builder.finish(migration))
    }

    pub fn from_json_str(text: &str) -> Result<Self, GameDataError> {
        let document: Value = serde_json::from_str(text)?;
        Self::build(document)
    }

    /// Reads and builds the database from a gamedata file
    pub async fn load(path: &Path) -> Result<Self, GameDataError> {
        debug!("Loading gamedata from {}", path.display());
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| GameDataError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json_str(&text)
    }

    pub fn empty() -> Self {
        Builder::default().finish(MigrationReport {
            from_version: schema::CURRENT_SCHEMA_VERSION,
            rewritten_fields: 0,
        })
    }

    pub fn get(&self, rom_id: &str) -> Option<&GameEntry> {
        self.by_id.get(rom_id)
    }

    pub fn contains(&self, rom_id: &str) -> bool {
        self.by_id.contains_key(rom_id)
    }

    pub fn parent_of(&self, rom_id: &str) -> Option<&str> {
        self.parent_of.get(rom_id).map(String::as_str)
    }

    pub fn clones_of(&self, rom_id: &str) -> &[String] {
        self.by_id
            .get(rom_id)
            .map(|entry| entry.clones.as_slice())
            .unwrap_or_default()
    }

    /// All ids in source order, each parent followed by its clones
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = &GameEntry> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn built_at(&self) -> DateTime<Local> {
        self.built_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> GameDatabase {
        GameDatabase::build(json!({
            "sf2": {
                "description": "Street Fighter II",
                "playercount": "2",
                "buttons": 6,
                "sticks": "1",
                "alternating": false,
                "controls": {
                    "P1_BUTTON1": {"name": "Jab Punch"},
                    "P1_BUTTON2": {"name": "Strong Punch"},
                    "P1_JOYSTICK_UP": {}
                },
                "clones": {
                    "sf2ua": {"description": "Street Fighter II (US rev A)"},
                    "sf2j": {"controls": {"P1_BUTTON1": {"name": "Weak Punch"}}}
                }
            },
            "pacman": {
                "description": "Pac-Man",
                "alternating": true,
                "controls": {"P1_JOYSTICK_LEFT": {"name": "Left"}}
            }
        }))
        .unwrap()
    }

    #[test]
    fn flattens_clones_into_index() {
        let db = sample();
        assert_eq!(db.len(), 4);
        for id in ["sf2", "sf2ua", "sf2j", "pacman"] {
            assert!(db.contains(id), "{id} missing");
        }
        assert_eq!(db.parent_of("sf2ua"), Some("sf2"));
        assert_eq!(db.parent_of("sf2"), None);
        assert_eq!(db.clones_of("sf2"), ["sf2ua", "sf2j"]);
        assert_eq!(db.report().games, 2);
        assert_eq!(db.report().clones, 2);
    }

    #[test]
    fn preserves_source_order() {
        let db = sample();
        let ids: Vec<_> = db.ids().collect();
        assert_eq!(ids, ["sf2", "sf2ua", "sf2j", "pacman"]);

        let controls: Vec<_> = db.get("sf2").unwrap().controls.ids().collect();
        assert_eq!(controls, ["P1_BUTTON1", "P1_BUTTON2", "P1_JOYSTICK_UP"]);
    }

    #[test]
    fn parses_metadata_leniently() {
        let db = sample();
        let sf2 = db.get("sf2").unwrap();
        assert_eq!(sf2.display_name, "Street Fighter II");
        assert_eq!(sf2.player_count, 2);
        assert_eq!(sf2.button_count, 6);
        assert_eq!(sf2.stick_count, 1);
        assert!(!sf2.alternating);
        assert!(db.get("pacman").unwrap().alternating);
    }

    #[test]
    fn clones_inherit_metadata_but_not_controls() {
        let db = sample();
        let clone = db.get("sf2ua").unwrap();
        assert_eq!(clone.display_name, "Street Fighter II (US rev A)");
        assert_eq!(clone.player_count, 2);
        assert_eq!(clone.button_count, 6);
        assert!(clone.controls.is_empty());
        assert_eq!(clone.parent_id.as_deref(), Some("sf2"));

        let sf2j = db.get("sf2j").unwrap();
        assert_eq!(sf2j.display_name, "Street Fighter II");
        assert_eq!(sf2j.controls.len(), 1);
    }

    #[test]
    fn unlabeled_controls_need_a_generic_name() {
        let db = GameDatabase::build(json!({
            "tron": {"controls": {
                "P1_BUTTON1": {},
                "P1_DIAL": {},
                "P1_DIAL_V": {"name": "Aim"},
                "P1_BUTTON2": 7
            }}
        }))
        .unwrap();

        let controls: Vec<_> = db.get("tron").unwrap().controls.ids().collect();
        assert_eq!(controls, ["P1_BUTTON1", "P1_DIAL_V"]);
        assert_eq!(db.report().skipped_controls, 2);
    }

    #[test]
    fn malformed_entries_are_skipped_and_counted() {
        let db = GameDatabase::build(json!({
            "good": {"controls": {"P1_BUTTON1": {"name": "Fire"}}},
            "number": 42,
            "badcontrols": {"controls": ["P1_BUTTON1"]},
            "badclones": {"clones": "nope"},
            "parent": {"clones": {"good": {}, "broken": null, "fine": {}}}
        }))
        .unwrap();

        assert!(db.contains("good"));
        assert!(db.contains("badclones"));
        assert!(db.contains("fine"));
        assert!(!db.contains("number"));
        assert!(!db.contains("broken"));
        assert_eq!(db.clones_of("parent"), ["fine"]);
        // number, badclones' block, broken
        assert_eq!(db.report().skipped_entries, 3);
        assert_eq!(db.report().duplicate_ids, 1);

        let badcontrols = db.get("badcontrols").unwrap();
        assert!(!badcontrols.has_controls());
        assert_eq!(db.report().skipped_controls, 1);
    }

    #[test]
    fn malformed_controls_keep_entry_and_clones() {
        let db = GameDatabase::build(json!({
            "parent": {
                "description": "Parent",
                "controls": ["oops"],
                "clones": {
                    "kid": {"controls": {"P1_BUTTON1": {"name": "Fire"}}},
                    "bare": {}
                }
            }
        }))
        .unwrap();

        assert_eq!(db.len(), 3);
        assert!(db.get("parent").unwrap().controls.is_empty());
        assert_eq!(db.clones_of("parent"), ["kid", "bare"]);
        assert_eq!(db.parent_of("kid"), Some("parent"));
        assert_eq!(db.get("kid").unwrap().controls.len(), 1);
        assert_eq!(db.get("bare").unwrap().display_name, "Parent");
        assert_eq!(db.report().skipped_entries, 0);
        assert_eq!(db.report().skipped_controls, 1);
        assert_eq!(db.report().clones, 2);
    }

    #[test]
    fn player_count_is_at_least_one() {
        let db = GameDatabase::build(json!({"zero": {"playercount": 0}})).unwrap();
        assert_eq!(db.get("zero").unwrap().player_count, 1);
    }

    #[test]
    fn non_object_root_is_an_error() {
        assert!(matches!(
            GameDatabase::from_json_str("[]"),
            Err(GameDataError::NotAnObject)
        ));
        assert!(matches!(
            GameDatabase::from_json_str("{not json"),
            Err(GameDataError::Json(_))
        ));
    }

    #[tokio::test]
    async fn load_reports_missing_file() {
        let path = std::env::temp_dir().join("mamecontrols-does-not-exist.json");
        let err = GameDatabase::load(&path).await.unwrap_err();
        assert!(matches!(err, GameDataError::Io { .. }));
    }
}
