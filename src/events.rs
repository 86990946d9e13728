//! Engine notifications and player events

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::subtitle::{Caption, Cc608Payload};

/// A bitrate switch between two variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitrateSwitch {
    pub from_bitrate: u32,
    pub to_bitrate: u32,
}

/// Media carried by a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackType {
    Audio,
    Video,
    Both,
}

/// Which elementary streams the engine is playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamSelection {
    AudioOnly,
    VideoOnly,
    AudioVideo,
}

/// A unit of in-band CEA-608 data found in a segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InbandCaptionUnit {
    /// Presentation time in 100 ns units
    pub timestamp: u64,
    pub payload: Option<Vec<u8>>,
}

/// Segment the engine switched to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentInfo {
    pub sequence: u32,
    pub media_type: TrackType,
    /// In-band caption units; `None` when the segment carries none
    pub inband_captions: Option<Vec<InbandCaptionUnit>>,
}

/// Notifications raised by the HLS engine's playlist
#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistEvent {
    BitrateSwitchSuggested(BitrateSwitch),
    BitrateSwitchCompleted(BitrateSwitch),
    BitrateSwitchCancelled(BitrateSwitch),
    StreamSelectionChanged {
        from: StreamSelection,
        to: StreamSelection,
    },
    SegmentSwitched {
        from: Option<SegmentInfo>,
        to: SegmentInfo,
    },
}

/// Quality badge shown by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaQuality {
    StandardDefinition,
    HighDefinition,
}

/// Events raised by the plugin towards the application
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    ControllerReady,
    BitrateSwitchSuggested {
        switch: BitrateSwitch,
        cancelled: bool,
    },
    BitrateSwitchCompleted(BitrateSwitch),
    BitrateSwitchCancelled(BitrateSwitch),
    StreamSelectionChanged {
        from: StreamSelection,
        to: StreamSelection,
    },
    AvailableCaptionsPopulated {
        captions: Vec<Caption>,
    },
    /// 608 data was found in the stream; the app may enable caption controls
    Instream608CaptionsAvailable,
    StateRefreshed {
        signal_strength: f64,
        media_quality: Option<MediaQuality>,
    },
    CaptionsAugmented {
        caption_id: String,
        cues_added: usize,
    },
    /// New 608 data was queued on the selected caption track
    Cc608PayloadAugmented {
        caption_id: String,
        payload: Cc608Payload,
    },
}

#[derive(Clone)]
pub struct EventEmitter {
    tx: broadcast::Sender<PlayerEvent>,
}

impl EventEmitter {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    /// Send to current subscribers; having none is not an error
    pub fn emit(&self, event: PlayerEvent) {
        tracing::trace!("player event: {:?}", event);
        let _ = self.tx.send(event);
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new(128)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe() {
        let emitter = EventEmitter::default();
        let mut rx = emitter.subscribe();
        emitter.emit(PlayerEvent::Instream608CaptionsAvailable);

        let event = rx.try_recv().ok();
        assert!(matches!(event, Some(PlayerEvent::Instream608CaptionsAvailable)));
    }

    #[test]
    fn test_emit_without_subscribers() {
        let emitter = EventEmitter::new(0);
        emitter.emit(PlayerEvent::ControllerReady);
    }
}
