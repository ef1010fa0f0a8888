//! # Application Configuration
//!
//! Where the MAME installation lives and how listings should be presented.
//! Stored as TOML under `~/.config/mamecontrols/config.toml`.
//!
//! Missing configuration degrades to defaults instead of preventing start-up,
//! so the tool works out of the box when run from inside a MAME directory.
//!
//! File locations are settled once, in [`AppConfig::engine_settings`]. After
//! that every component receives concrete paths and never probes the
//! filesystem for alternatives.

use crate::controls::EngineSettings;
use crate::gamedata::ResolvePolicy;
use color_eyre::eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const CONFIG_DIR: &str = ".config/mamecontrols";
const CONFIG_FILE: &str = "config.toml";

/// Gamedata locations inside a MAME directory, in lookup order
const GAMEDATA_CANDIDATES: [&str; 2] = ["preview/gamedata.json", "gamedata.json"];
const CFG_SUBDIR: &str = "cfg";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Root of the MAME installation
    pub mame_dir: PathBuf,
    /// Explicit gamedata file; searched for inside `mame_dir` when unset
    pub gamedata_path: Option<PathBuf>,
    /// Show XInput names instead of raw joystick codes
    pub translate_to_standard: bool,
    pub clone_resolution: ResolvePolicy,
    /// Poll interval of `watch`
    pub reload_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mame_dir: PathBuf::from("."),
            gamedata_path: None,
            translate_to_standard: false,
            clone_resolution: ResolvePolicy::default(),
            reload_interval_secs: 5,
        }
    }
}

fn get_home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        warn!("Could not determine home directory, using current directory");
        PathBuf::from(".")
    })
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        let mut path = get_home_dir();
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        path
    }

    /// Loads the config from `path` (or the default location)
    ///
    /// A missing file yields the defaults. A file that exists but does not
    /// parse is an error, so typos don't silently fall back.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);

        if !tokio::fs::try_exists(&path)
            .await
            .map_err(|e| eyre!("Failed to check config file {}: {}", path.display(), e))?
        {
            warn!("Config file {} does not exist, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

        debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| eyre!("Failed to create config directory: {}", e))?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| eyre!("Failed to serialize config: {}", e))?;
        tokio::fs::write(path, content)
            .await
            .map_err(|e| eyre!("Failed to write config file {}: {}", path.display(), e))?;
        Ok(())
    }

    /// Writes a default config file if none exists yet. Returns its path.
    pub async fn ensure_default_config(path: Option<&Path>) -> Result<PathBuf> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            info!("Config file {} already exists", path.display());
        } else {
            info!("Creating default configuration at {}", path.display());
            Self::default().save(&path).await?;
        }
        Ok(path)
    }

    /// Finds the gamedata file: the explicit path, else the first candidate
    /// inside `mame_dir` that exists
    pub async fn locate_gamedata(&self) -> Result<PathBuf> {
        if let Some(path) = &self.gamedata_path {
            return Ok(path.clone());
        }

        for candidate in GAMEDATA_CANDIDATES {
            let path = self.mame_dir.join(candidate);
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                debug!("Using gamedata at {}", path.display());
                return Ok(path);
            }
        }

        Err(eyre!(
            "No gamedata.json found in {} (looked for {})",
            self.mame_dir.display(),
            GAMEDATA_CANDIDATES.join(", ")
        ))
    }

    /// Applies command line values on top of the loaded file
    ///
    /// `None` keeps what the file says, in either direction.
    pub fn apply_overrides(&mut self, mame_dir: Option<PathBuf>, translate: Option<bool>) {
        if let Some(mame_dir) = mame_dir {
            self.mame_dir = mame_dir;
        }
        if let Some(translate) = translate {
            self.translate_to_standard = translate;
        }
    }

    pub fn cfg_dir(&self) -> PathBuf {
        self.mame_dir.join(CFG_SUBDIR)
    }

    pub async fn engine_settings(&self) -> Result<EngineSettings> {
        let mut settings = EngineSettings::new(self.locate_gamedata().await?, self.cfg_dir());
        settings.translate_to_standard = self.translate_to_standard;
        settings.resolve_policy = self.clone_resolution;
        settings.reload_interval = Duration::from_secs(self.reload_interval_secs.max(1));
        Ok(settings)
    }
}
