//! Seam to the HLS client engine
//!
//! Playlist parsing, bitrate selection and segment scheduling live in the
//! engine. The plugin only reads snapshots of the active variant and pushes
//! a handful of settings back, through [`HlsController`].

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Video resolution of a variant stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// An alternate rendition (audio or subtitles) of a variant stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendition {
    pub name: String,
    pub language: Option<String>,
    pub is_active: bool,
}

impl Rendition {
    pub fn new(name: impl Into<String>, language: Option<&str>) -> Self {
        Self {
            name: name.into(),
            language: language.map(str::to_string),
            is_active: false,
        }
    }

    /// Identifier used for audio stream selection: `name+language`
    pub fn audio_stream_id(&self) -> String {
        audio_stream_id(&self.name, self.language.as_deref())
    }
}

/// Build the `name+language` identifier of an audio stream
pub fn audio_stream_id(name: &str, language: Option<&str>) -> String {
    format!("{}+{}", name, language.unwrap_or(""))
}

/// Snapshot of the variant stream the engine is currently playing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantStream {
    /// Declared bandwidth in bits per second
    pub bitrate: u32,
    pub resolution: Option<Resolution>,
    pub audio_renditions: Vec<Rendition>,
    pub subtitle_renditions: Vec<Rendition>,
}

/// Location of one WebVTT segment of a subtitle rendition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleLocator {
    /// Media sequence index of the segment
    pub index: u32,
    /// Segment URL
    pub location: String,
}

impl SubtitleLocator {
    pub fn new(index: u32, location: impl Into<String>) -> Self {
        Self {
            index,
            location: location.into(),
        }
    }
}

/// Locators are the same segment when the index matches and the URL matches
/// ignoring case.
impl PartialEq for SubtitleLocator {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.location.eq_ignore_ascii_case(&other.location)
    }
}

impl Eq for SubtitleLocator {}

/// Controller handed out by the HLS engine once a playlist is open
pub trait HlsController: Send + Sync + 'static {
    /// Whether the controller still refers to a live playback session
    fn is_valid(&self) -> bool;

    /// Whether the open playlist is a master playlist
    fn is_master(&self) -> bool;

    /// Whether the open playlist is a live (sliding window) playlist
    fn is_live(&self) -> bool;

    /// The active variant; may be briefly absent while switching bitrates
    fn active_variant(&self) -> Option<VariantStream>;

    fn maximum_allowed_bitrate(&self) -> u32;

    fn set_start_bitrate(&self, bitrate: u32) -> Result<()>;

    fn set_minimum_allowed_bitrate(&self, bitrate: u32) -> Result<()>;

    fn set_maximum_allowed_bitrate(&self, bitrate: u32) -> Result<()>;

    /// Make an audio rendition of the active variant the active one
    fn activate_audio_rendition(&self, rendition: &Rendition) -> Result<()>;

    /// Reload the rendition's media playlist and list its segments
    fn refresh_subtitle_locators(
        &self,
        rendition: &Rendition,
    ) -> impl Future<Output = Result<Vec<SubtitleLocator>>> + Send;
}
