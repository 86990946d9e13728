//! Plugin configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::style::CaptionPreferences;

/// Which caption source the plugin feeds the player from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClosedCaptionType {
    #[default]
    None,
    /// CEA-608 data carried in the video segments
    Cc608Instream,
    /// WebVTT subtitle renditions downloaded alongside the stream
    WebVttSidecar,
}

/// Bitrate limits handed to the HLS engine (bits per second)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitrateConfig {
    /// Bitrate to start playback at
    pub startup: Option<u32>,

    /// Lowest bitrate the engine may switch to
    pub min: Option<u32>,

    /// Highest bitrate the engine may switch to
    pub max: Option<u32>,
}

/// Subtitle segment download configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// User-Agent header sent with segment requests
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: format!("hls-captions/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Plugin configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Caption source
    pub caption_type: ClosedCaptionType,

    /// Bitrate limits
    pub bitrate: BitrateConfig,

    /// Segment download settings
    pub fetch: FetchConfig,

    /// Caption appearance preferences
    pub captions: CaptionPreferences,

    /// Capacity of the player event channel
    pub event_capacity: usize,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log output format (pretty, json)
    pub log_format: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            caption_type: ClosedCaptionType::None,
            bitrate: BitrateConfig::default(),
            fetch: FetchConfig::default(),
            captions: CaptionPreferences::default(),
            event_capacity: 128,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl PluginConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: PluginConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}
