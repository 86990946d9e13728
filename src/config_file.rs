//! Configuration file support
//!
//! Loads plugin configuration from TOML files where every section except
//! `[plugin]` is optional.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{BitrateConfig, ClosedCaptionType, FetchConfig, PluginConfig};
use crate::error::Result;
use crate::style::CaptionPreferences;

/// Configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Plugin settings
    pub plugin: PluginSettings,
    /// Bitrate settings
    pub bitrate: Option<BitrateSettings>,
    /// Download settings
    pub fetch: Option<FetchSettings>,
    /// Caption appearance
    pub captions: Option<CaptionPreferences>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginSettings {
    /// Caption source (none, cc608-instream, web-vtt-sidecar)
    pub caption_type: ClosedCaptionType,
    /// Capacity of the player event channel
    pub event_capacity: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitrateSettings {
    /// Startup bitrate in bps
    pub startup: Option<u32>,
    /// Minimum bitrate in bps
    pub min: Option<u32>,
    /// Maximum bitrate in bps
    pub max: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSettings {
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
    /// User-Agent header
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ConfigFile = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Generate default configuration file
    pub fn default_config() -> Self {
        Self {
            plugin: PluginSettings {
                caption_type: ClosedCaptionType::WebVttSidecar,
                event_capacity: Some(128),
            },
            bitrate: Some(BitrateSettings {
                startup: None,
                min: None,
                max: None,
            }),
            fetch: Some(FetchSettings {
                timeout_secs: Some(10),
                user_agent: None,
            }),
            captions: Some(CaptionPreferences::default()),
            logging: Some(LoggingSettings {
                level: "info".to_string(),
                format: Some("pretty".to_string()),
            }),
        }
    }

    /// Convert to PluginConfig
    pub fn into_plugin_config(self) -> PluginConfig {
        let defaults = PluginConfig::default();
        let fetch_defaults = FetchConfig::default();

        PluginConfig {
            caption_type: self.plugin.caption_type,
            bitrate: self
                .bitrate
                .map(|b| BitrateConfig {
                    startup: b.startup,
                    min: b.min,
                    max: b.max,
                })
                .unwrap_or_default(),
            fetch: match self.fetch {
                Some(f) => FetchConfig {
                    timeout_secs: f.timeout_secs.unwrap_or(fetch_defaults.timeout_secs),
                    user_agent: f.user_agent.unwrap_or(fetch_defaults.user_agent),
                },
                None => fetch_defaults,
            },
            captions: self.captions.unwrap_or_default(),
            event_capacity: self.plugin.event_capacity.unwrap_or(defaults.event_capacity),
            log_level: self
                .logging
                .as_ref()
                .map(|l| l.level.clone())
                .unwrap_or(defaults.log_level),
            log_format: self
                .logging
                .and_then(|l| l.format)
                .unwrap_or(defaults.log_format),
        }
    }
}

/// Generate default configuration file at the specified path
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let config = ConfigFile::default_config();
    config.to_file(path)?;
    Ok(())
}
