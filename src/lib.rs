//! HLS caption plumbing
//!
//! Player-side caption support for HLS streams: WebVTT sidecar renditions
//! aligned through `X-TIMESTAMP-MAP`, in-band CEA-608 payload routing, and
//! mapping of user caption preferences onto the caption renderers. The HLS
//! engine itself sits behind [`controller::HlsController`].

pub mod config;
pub mod config_file;
pub mod controller;
pub mod error;
pub mod events;
pub mod fetch;
pub mod plugin;
pub mod style;
pub mod subtitle;

#[cfg(test)]
mod integration;

pub use config::{ClosedCaptionType, PluginConfig};
pub use controller::HlsController;
pub use error::{CaptionError, Result};
pub use events::{EventEmitter, PlayerEvent, PlaylistEvent};
pub use fetch::{HttpFetcher, SegmentFetcher};
pub use plugin::{HlsPlugin, MediaPlayer};
pub use subtitle::{timestamp_offset, CaptionTrack, TimestampMap};
