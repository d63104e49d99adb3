use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use narabe_layout_goban::{DEFAULT_ROWS, MAX_ROWS, MIN_ROWS};
use serde::Deserialize;

const CONFIG_ENV: &str = "NARABE_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Rows in the grid.
    pub rows: u32,
    /// Use the whole display instead of the work area.
    pub ignore_taskbar: bool,
    /// Raise each window after it has been placed.
    pub focus_windows: bool,
    /// Include panels, docks and untitled windows when listing.
    pub show_system_windows: bool,
    /// Reserved height at the bottom of the display, overriding the window
    /// system's own work area.
    pub taskbar_height: Option<u32>,
    /// External layout engine, spawned as `narabe-layout-<engine>`.
    pub engine: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            ignore_taskbar: false,
            focus_windows: true,
            show_system_windows: false,
            taskbar_height: None,
            engine: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) => Self::load_from(path),
            None => {
                tracing::debug!("No config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: PathBuf) -> Result<Self> {
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(anyhow::Error::new(e).context(format!("Failed to read {}", path.display())))
            }
        };

        let config = Self::parse(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(contents)?;
        validate_rows(config.rows)?;
        Ok(config)
    }
}

pub fn validate_rows(rows: u32) -> Result<u32> {
    if !(MIN_ROWS..=MAX_ROWS).contains(&rows) {
        anyhow::bail!("rows must be between {} and {}, got {}", MIN_ROWS, MAX_ROWS, rows);
    }
    Ok(rows)
}

fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("narabe").join("config.json"))
}
