//! Subtitle handling
//!
//! This module handles HLS WebVTT caption delivery:
//! - X-TIMESTAMP-MAP parsing and cue-time offset computation
//! - WebVTT timecode and cue parsing
//! - Caption tracks with merged cues and CEA-608 payload queues
//! - Sequential sidecar segment downloads

pub mod cue;
pub mod sidecar;
pub mod timecode;
pub mod timestamp_map;
pub mod track;

pub use cue::{parse_cues, Cue};
pub use sidecar::{CaptionSink, WebVttSidecar};
pub use timestamp_map::{mpegts_to_duration, timestamp_offset, TimestampMap};
pub use track::{Caption, CaptionTrack, Cc608Payload};
