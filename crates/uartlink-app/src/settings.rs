use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use uartlink_core::ChannelConfig;

/// Persisted front-end settings, stored as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub port_name: String,
    pub baud_rate: u32,
    pub encoding: String,
    pub rx_capacity: usize,
    pub tx_capacity: usize,
    pub char_pacing_us: u64,
    pub tx_timeout_ms: u64,
    pub ready_poll_ms: u64,
    /// No limit when absent.
    pub peer_timeout_ms: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        let channel = ChannelConfig::default();
        Self {
            port_name: String::new(),
            baud_rate: 115_200,
            encoding: "auto".into(),
            rx_capacity: channel.rx_capacity,
            tx_capacity: channel.tx_capacity,
            char_pacing_us: channel.char_pacing.as_micros() as u64,
            tx_timeout_ms: channel.tx_timeout.as_millis() as u64,
            ready_poll_ms: channel.ready_poll.as_millis() as u64,
            peer_timeout_ms: None,
        }
    }
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("uartlink").join("settings.json"))
    }

    /// Missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    pub fn channel_config(&self) -> ChannelConfig {
        ChannelConfig {
            rx_capacity: self.rx_capacity,
            tx_capacity: self.tx_capacity,
            char_pacing: Duration::from_micros(self.char_pacing_us),
            tx_timeout: Duration::from_millis(self.tx_timeout_ms),
            ready_poll: Duration::from_millis(self.ready_poll_ms),
        }
    }

    pub fn peer_timeout(&self) -> Option<Duration> {
        self.peer_timeout_ms.map(Duration::from_millis)
    }
}
