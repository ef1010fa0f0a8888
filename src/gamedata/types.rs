//! Entity model of the game database

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Semantic meaning of one physical input for a given game
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ControlDef {
    /// Action name such as "Jump"; `None` means "use the generic label"
    pub label: Option<String>,
}

impl ControlDef {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }
}

/// Control definitions of one game in source order
///
/// Insertion order is the order the gamedata document lists the controls in,
/// which is also the order rows are displayed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Controls {
    entries: Vec<(String, ControlDef)>,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a control. A replaced control keeps its position.
    pub fn insert(&mut self, control_id: impl Into<String>, def: ControlDef) {
        let control_id = control_id.into();
        match self.entries.iter_mut().find(|(id, _)| *id == control_id) {
            Some((_, existing)) => *existing = def,
            None => self.entries.push((control_id, def)),
        }
    }

    pub fn get(&self, control_id: &str) -> Option<&ControlDef> {
        self.entries
            .iter()
            .find(|(id, _)| id == control_id)
            .map(|(_, def)| def)
    }

    pub fn contains(&self, control_id: &str) -> bool {
        self.get(control_id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ControlDef)> {
        self.entries.iter().map(|(id, def)| (id.as_str(), def))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, ControlDef)> for Controls {
    fn from_iter<T: IntoIterator<Item = (K, ControlDef)>>(iter: T) -> Self {
        let mut controls = Controls::new();
        for (id, def) in iter {
            controls.insert(id, def);
        }
        controls
    }
}

impl Serialize for Controls {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, def) in &self.entries {
            map.serialize_entry(id, def)?;
        }
        map.end()
    }
}

/// One arcade title, top-level or clone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameEntry {
    /// ROM name
    pub id: String,
    pub display_name: String,
    pub player_count: u32,
    /// Players take turns instead of playing simultaneously
    pub alternating: bool,
    pub button_count: u32,
    pub stick_count: u32,
    /// The entry's own controls; empty when the source omits them
    pub controls: Controls,
    /// Ids of direct clones in source order
    pub clones: Vec<String>,
    /// Set when this entry was discovered as a clone of another
    pub parent_id: Option<String>,
}

impl GameEntry {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            player_count: 1,
            alternating: false,
            button_count: 0,
            stick_count: 0,
            controls: Controls::new(),
            clones: Vec::new(),
            parent_id: None,
        }
    }

    pub fn is_clone(&self) -> bool {
        self.parent_id.is_some()
    }

    pub fn has_controls(&self) -> bool {
        !self.controls.is_empty()
    }
}
