//! Configuration loading and parsing.
//!
//! Parses `kiosk.toml` (or an override path supplied by the binary),
//! extracting `[grid]`, `[tick]`, and `[net]` tables. Every field has a
//! default mirroring the fixed layout the console has always shipped with,
//! so a missing or partially-filled file still produces a fully usable
//! `Config`. Unknown fields are ignored (TOML deserialization tolerance) to
//! allow forward evolution without immediate warnings.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

/// Row layout the console has shipped with since its tkinter days: 11 rows,
/// rows 3 and 7 (0-indexed) dedicated to bar gauges, the rest free-form text.
const DEFAULT_COLS_PER_ROW: [usize; 11] = [4, 4, 4, 8, 4, 4, 4, 8, 4, 8, 8];
const DEFAULT_BAR_ROWS: [usize; 2] = [3, 7];
const DEFAULT_TICK_PERIOD_MS: u64 = 33;
const DEFAULT_MAX_APPLIES_PER_TICK: usize = 50;
const DEFAULT_BIND: &str = "0.0.0.0:9001";
const DEFAULT_RECV_BUFFER: usize = 1 << 20;

#[derive(Debug, Deserialize, Clone)]
pub struct GridConfig {
    #[serde(default = "GridConfig::default_cols_per_row")]
    pub cols_per_row: Vec<usize>,
    #[serde(default = "GridConfig::default_bar_rows")]
    pub bar_rows: Vec<usize>,
}

impl GridConfig {
    fn default_cols_per_row() -> Vec<usize> {
        DEFAULT_COLS_PER_ROW.to_vec()
    }

    fn default_bar_rows() -> Vec<usize> {
        DEFAULT_BAR_ROWS.to_vec()
    }

    pub fn rows(&self) -> usize {
        self.cols_per_row.len()
    }

    pub fn is_bar_row(&self, row: usize) -> bool {
        self.bar_rows.contains(&row)
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cols_per_row: Self::default_cols_per_row(),
            bar_rows: Self::default_bar_rows(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct TickConfig {
    #[serde(default = "TickConfig::default_period_ms")]
    pub period_ms: u64,
    #[serde(default = "TickConfig::default_max_applies")]
    pub max_applies: usize,
}

impl TickConfig {
    const fn default_period_ms() -> u64 {
        DEFAULT_TICK_PERIOD_MS
    }

    const fn default_max_applies() -> usize {
        DEFAULT_MAX_APPLIES_PER_TICK
    }
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            period_ms: Self::default_period_ms(),
            max_applies: Self::default_max_applies(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NetConfig {
    #[serde(default = "NetConfig::default_bind")]
    pub bind: String,
    #[serde(default = "NetConfig::default_recv_buffer")]
    pub recv_buffer: usize,
}

impl NetConfig {
    fn default_bind() -> String {
        DEFAULT_BIND.to_string()
    }

    const fn default_recv_buffer() -> usize {
        DEFAULT_RECV_BUFFER
    }
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            bind: Self::default_bind(),
            recv_buffer: Self::default_recv_buffer(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub tick: TickConfig,
    #[serde(default)]
    pub net: NetConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub file: ConfigFile,
}

impl Config {
    pub fn grid(&self) -> &GridConfig {
        &self.file.grid
    }

    pub fn tick(&self) -> TickConfig {
        self.file.tick
    }

    pub fn net(&self) -> &NetConfig {
        &self.file.net
    }
}

/// Best-effort config path following platform conventions (XDG / AppData
/// Roaming), preferring a `kiosk.toml` in the working directory first.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("kiosk.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("kiosk").join("kiosk.toml");
    }
    PathBuf::from("kiosk.toml")
}

/// Load configuration from `path`, or from [`discover`] if `None`. A missing
/// file is not an error — it yields an all-default `Config`. A present but
/// unparseable file IS an error, since that almost always means a typo the
/// operator wants to know about rather than silently ignore.
pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    match fs::read_to_string(&path) {
        Ok(content) => {
            let file: ConfigFile = toml::from_str(&content)
                .with_context(|| format!("parsing config at {}", path.display()))?;
            info!(path = %path.display(), "loaded config file");
            validate(&file)?;
            Ok(Config { file })
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "config file not found, using defaults");
            Ok(Config::default())
        }
    }
}

fn validate(file: &ConfigFile) -> Result<()> {
    if file.grid.cols_per_row.is_empty() {
        anyhow::bail!("grid.cols_per_row must not be empty");
    }
    for &row in &file.grid.bar_rows {
        if row >= file.grid.cols_per_row.len() {
            anyhow::bail!(
                "grid.bar_rows contains row {row} but grid has only {} rows",
                file.grid.cols_per_row.len()
            );
        }
    }
    if file.tick.period_ms == 0 {
        anyhow::bail!("tick.period_ms must be nonzero");
    }
    Ok(())
}
