//! Control engine with statum state machine for loading and lookups
//!
//! The engine owns everything a lookup needs: the database store, the global
//! default mappings and the paths of the MAME directory. It has to be loaded
//! before it can answer queries, which the type state enforces.

use super::comparator::{compare, ControlRow};
use crate::gamedata::{
    resolve, DatabaseStore, GameDataError, GameDatabase, ResolvePolicy, ResolveError,
};
use crate::mamecfg::{
    load_custom_overrides, load_default_mappings, CustomOverrides, DefaultMappings,
    DEFAULT_CFG_FILE,
};
use serde::Serialize;
use statum::{machine, state};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Game data error: {0}")]
    GameData(#[from] GameDataError),
}

/// Paths and switches the engine runs with
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub gamedata_path: PathBuf,
    /// MAME's `cfg` directory holding `<rom>.cfg` and `default.cfg`
    pub cfg_dir: PathBuf,
    /// Show XInput names instead of raw joystick codes
    pub translate_to_standard: bool,
    pub resolve_policy: ResolvePolicy,
    pub reload_interval: Duration,
}

impl EngineSettings {
    pub fn new(gamedata_path: impl Into<PathBuf>, cfg_dir: impl Into<PathBuf>) -> Self {
        Self {
            gamedata_path: gamedata_path.into(),
            cfg_dir: cfg_dir.into(),
            translate_to_standard: false,
            resolve_policy: ResolvePolicy::default(),
            reload_interval: Duration::from_secs(5),
        }
    }

    pub fn default_cfg_path(&self) -> PathBuf {
        self.cfg_dir.join(DEFAULT_CFG_FILE)
    }
}

/// Summary of a ROM whose controls could be resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedGame {
    pub rom_id: String,
    pub display_name: String,
    pub player_count: u32,
    pub alternating: bool,
    /// Entry the controls were taken from; differs from `rom_id` for inheriting clones
    pub source_id: String,
    pub inherited: bool,
    pub translated: bool,
    pub rows: Vec<ControlRow>,
}

/// Answer to "what are the controls of this ROM"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum GameControls {
    /// Nothing to show; the caller displays a "no control data" state
    #[serde(rename_all = "camelCase")]
    NotFound { rom_id: String, reason: String },
    Resolved(ResolvedGame),
}

impl GameControls {
    pub fn rows(&self) -> &[ControlRow] {
        match self {
            GameControls::NotFound { .. } => &[],
            GameControls::Resolved(game) => &game.rows,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, GameControls::Resolved(_))
    }
}

impl From<ResolveError> for GameControls {
    fn from(err: ResolveError) -> Self {
        GameControls::NotFound {
            rom_id: err.rom_id().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Resolves, merges and (optionally) translates the controls of one ROM
///
/// Pure: everything it needs is passed in.
pub fn game_controls_from(
    db: &GameDatabase,
    rom_id: &str,
    overrides: &CustomOverrides,
    defaults: &DefaultMappings,
    translate_to_standard: bool,
    policy: ResolvePolicy,
) -> GameControls {
    let resolved = match resolve(db, rom_id, policy) {
        Ok(resolved) => resolved,
        Err(e) => {
            debug!("{}", e);
            return e.into();
        }
    };

    // resolve() only succeeds for ids present in the database
    let Some(entry) = db.get(rom_id) else {
        return ResolveError::UnknownRom(rom_id.to_string()).into();
    };

    let rows = compare(resolved.controls, overrides, defaults, translate_to_standard);
    GameControls::Resolved(ResolvedGame {
        rom_id: entry.id.clone(),
        display_name: entry.display_name.clone(),
        player_count: entry.player_count,
        alternating: entry.alternating,
        source_id: resolved.source_id.to_string(),
        inherited: resolved.is_inherited(),
        translated: translate_to_standard,
        rows,
    })
}

/// Lifecycle states of the engine
#[state]
#[derive(Debug, Clone)]
pub enum EngineState {
    Configured, // Paths known, nothing loaded
    Ready,      // Database and default mappings loaded
}

#[machine]
#[derive(Debug)]
pub struct ControlEngine<S: EngineState> {
    settings: EngineSettings,
    store: DatabaseStore,
    defaults: DefaultMappings,
}

impl<S: EngineState> ControlEngine<S> {
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}

impl ControlEngine<Configured> {
    pub fn create(settings: EngineSettings) -> Self {
        info!(
            "Creating control engine for {}",
            settings.gamedata_path.display()
        );
        Self::new(settings, DatabaseStore::empty(), DefaultMappings::new())
    }

    /// Loads the database and global defaults, then transitions to Ready
    ///
    /// An unreadable gamedata file is fatal. A missing or broken `default.cfg`
    /// only means there are no global defaults.
    pub async fn load(mut self) -> Result<ControlEngine<Ready>, EngineError> {
        let database = GameDatabase::load(&self.settings.gamedata_path).await?;
        self.store.replace(database);

        let default_cfg = self.settings.default_cfg_path();
        self.defaults = match load_default_mappings(&default_cfg).await {
            Ok(defaults) => defaults,
            Err(e) if e.is_missing_file() => {
                info!("No {} found, continuing without global defaults", DEFAULT_CFG_FILE);
                DefaultMappings::new()
            }
            Err(e) => {
                warn!("Ignoring {}: {}", default_cfg.display(), e);
                DefaultMappings::new()
            }
        };

        info!(
            "Control engine ready: {} ROMs, {} global default mappings",
            self.store.snapshot().len(),
            self.defaults.len()
        );
        Ok(self.transition())
    }
}

impl ControlEngine<Ready> {
    pub fn store(&self) -> &DatabaseStore {
        &self.store
    }

    pub fn snapshot(&self) -> Arc<GameDatabase> {
        self.store.snapshot()
    }

    pub fn defaults(&self) -> &DefaultMappings {
        &self.defaults
    }

    pub fn cfg_dir(&self) -> &Path {
        &self.settings.cfg_dir
    }

    /// Controls of `rom_id` using the given overrides instead of its cfg file
    pub fn game_controls_with(&self, rom_id: &str, overrides: &CustomOverrides) -> GameControls {
        game_controls_from(
            &self.snapshot(),
            rom_id,
            overrides,
            &self.defaults,
            self.settings.translate_to_standard,
            self.settings.resolve_policy,
        )
    }

    /// Controls of `rom_id`, reading its cfg file for overrides
    pub async fn game_controls(&self, rom_id: &str) -> GameControls {
        let db = self.snapshot();
        if let Err(e) = resolve(&db, rom_id, self.settings.resolve_policy) {
            debug!("{}", e);
            return e.into();
        }

        let overrides = load_custom_overrides(&self.settings.cfg_dir, rom_id).await;
        game_controls_from(
            &db,
            rom_id,
            &overrides,
            &self.defaults,
            self.settings.translate_to_standard,
            self.settings.resolve_policy,
        )
    }

    /// Rebuilds the database from disk; the old snapshot stays on failure
    pub async fn reload(&self) -> Result<Arc<GameDatabase>, EngineError> {
        Ok(self
            .store
            .rebuild_from(&self.settings.gamedata_path)
            .await?)
    }

    pub fn spawn_reload_task(&self, token: CancellationToken) -> JoinHandle<()> {
        self.store.spawn_reload_task(
            self.settings.gamedata_path.clone(),
            self.settings.reload_interval,
            token,
        )
    }
}
