use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::simulate::SimulationResult;

const CACHE_DIR: &str = "madness_terminal";
const CACHE_FILE: &str = "settings.json";
const CACHE_VERSION: u32 = 1;

/// Everything the UI wants back after a restart: the run configuration,
/// the last active tab, and the last generated bracket. The engine never
/// reads this; it is caller-side state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheFile {
    version: u32,
    pub config: SimConfig,
    #[serde(default)]
    pub last_tab: Option<String>,
    #[serde(default)]
    pub bracket: Option<SimulationResult>,
}

impl CacheFile {
    pub fn new(
        config: SimConfig,
        last_tab: Option<String>,
        bracket: Option<SimulationResult>,
    ) -> Self {
        Self {
            version: CACHE_VERSION,
            config,
            last_tab,
            bracket,
        }
    }
}

impl Default for CacheFile {
    fn default() -> Self {
        Self::new(SimConfig::default(), None, None)
    }
}

/// Load the cached settings, or `None` when nothing usable exists. A
/// version mismatch discards the whole file rather than guessing at a
/// migration.
pub fn load() -> Option<CacheFile> {
    let path = cache_path()?;
    let raw = fs::read_to_string(path).ok()?;
    let cache: CacheFile = serde_json::from_str(&raw).ok()?;
    if cache.version != CACHE_VERSION {
        return None;
    }
    Some(cache)
}

pub fn save(cache: &CacheFile) -> Result<()> {
    let path = cache_path().context("no cache directory available")?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create cache dir {}", dir.display()))?;
    }
    let raw = serde_json::to_string(cache).context("serialize settings cache")?;
    fs::write(&path, raw).with_context(|| format!("write settings cache {}", path.display()))?;
    Ok(())
}

fn cache_path() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
        }
    }
    // Fallback to ~/.cache on linux-like systems.
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(CACHE_DIR)
            .join(CACHE_FILE),
    )
}
