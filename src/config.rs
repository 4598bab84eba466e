use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::error::{Result, RomError};
use crate::variant::RomVariant;

pub const APP_DIR: &str = "rom-inspector";
pub const DEFAULT_EMULATOR: &str = "mgba";

/// Contents of `config.toml`.
///
/// ```toml
/// emulator = "/usr/bin/mgba-qt"
///
/// [emulators]
/// nes = "/usr/bin/fceux"
/// snes = "/usr/bin/snes9x"
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub emulator: Option<PathBuf>,
    pub emulators: BTreeMap<RomVariant, PathBuf>,
}

impl Config {
    /// `<config dir>/rom-inspector/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    pub fn parse(text: &str, origin: &Path) -> Result<Config> {
        toml::from_str(text).map_err(|e| RomError::Config {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Loads `explicit`, which must exist, or else the default file if there is one.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        match explicit {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|e| RomError::open(path, e))?;
                Config::parse(&text, path)
            }
            None => {
                let Some(path) = Config::default_path() else {
                    return Ok(Config::default());
                };
                match fs::read_to_string(&path) {
                    Ok(text) => Config::parse(&text, &path),
                    Err(e) if e.kind() == ErrorKind::NotFound => {
                        debug!("no config at {}, using defaults", path.display());
                        Ok(Config::default())
                    }
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    pub fn emulator_for(&self, variant: RomVariant) -> PathBuf {
        self.emulators
            .get(&variant)
            .or(self.emulator.as_ref())
            .cloned()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EMULATOR))
    }
}
