use crate::clock::Millis;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Timing knobs stored in config.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cadence of the used/wasted session tick
    pub session_tick_ms: Millis,
    /// Cadence of the stall watchdog (foreground only)
    pub watchdog_period_ms: Millis,
    /// Unchanged samples after the baseline before a task is force-stopped
    pub stall_samples: u32,
    /// How long the stop control must be held to force-stop
    pub force_stop_hold_ms: Millis,
    /// Undo window for deleted tasks
    pub delete_countdown_secs: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session_tick_ms: 1_000,
            watchdog_period_ms: 2_000,
            stall_samples: 2,
            force_stop_hold_ms: 600,
            delete_countdown_secs: 5,
        }
    }
}

/// Load config from a JSON file; a missing file yields the defaults
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Ok(EngineConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config: EngineConfig = serde_json::from_str(&content)
        .with_context(|| format!("Malformed config: {}", path.display()))?;
    Ok(config)
}

/// Save config as pretty JSON
pub fn save_config<P: AsRef<Path>>(path: P, config: &EngineConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    crate::persistence::atomic_write(path, &json)?;
    Ok(())
}
