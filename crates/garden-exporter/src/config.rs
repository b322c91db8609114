//! garden-exporter.toml configuration.
//!
//! Every section is optional. Durations are strings such as `"500ms"`,
//! `"5s"`, `"2m"` or a bare number of seconds.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use garden_metrics::ShootCustomizationConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ExporterConfig {
    pub server: ServerConfig,
    pub snapshot: SnapshotConfig,
    pub probe: ProbeConfig,
    pub customization: CustomizationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 2718)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotConfig {
    pub path: PathBuf,
    pub refresh_interval: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/var/lib/garden/snapshot.json"),
            refresh_interval: "30s".to_string(),
        }
    }
}

impl SnapshotConfig {
    pub fn refresh_interval(&self) -> anyhow::Result<Duration> {
        parse_duration(&self.refresh_interval)
            .with_context(|| format!("snapshot.refresh_interval: {:?}", self.refresh_interval))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    pub enabled: bool,
    pub interval: String,
    pub timeout: String,
    pub endpoint: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: "60s".to_string(),
            timeout: "5s".to_string(),
            endpoint: "/healthz".to_string(),
        }
    }
}

impl ProbeConfig {
    pub fn interval(&self) -> anyhow::Result<Duration> {
        parse_duration(&self.interval).with_context(|| format!("probe.interval: {:?}", self.interval))
    }

    pub fn timeout(&self) -> anyhow::Result<Duration> {
        parse_duration(&self.timeout).with_context(|| format!("probe.timeout: {:?}", self.timeout))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CustomizationConfig {
    pub shoot: Vec<ShootCustomizationConfig>,
}

impl ExporterConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Parse and validate a config document.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: ExporterConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every duration up front so a typo fails at startup.
    pub fn validate(&self) -> anyhow::Result<()> {
        let refresh = self.snapshot.refresh_interval()?;
        anyhow::ensure!(!refresh.is_zero(), "snapshot.refresh_interval must be positive");
        let interval = self.probe.interval()?;
        anyhow::ensure!(!interval.is_zero(), "probe.interval must be positive");
        self.probe.timeout()?;
        Ok(())
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Parse a duration string like "5s", "500ms", "2m" or "10".
pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
    let s = s.trim();
    let parsed = if let Some(ms) = s.strip_suffix("ms") {
        ms.parse::<u64>().map(Duration::from_millis)
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>().map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>().map(|m| Duration::from_secs(m * 60))
    } else {
        s.parse::<u64>().map(Duration::from_secs)
    };
    parsed.map_err(|_| anyhow::anyhow!("invalid duration {s:?}"))
}
