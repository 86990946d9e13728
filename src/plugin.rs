//! HLS player plugin
//!
//! Binds an HLS engine controller to a media player: pushes bitrate limits
//! to the engine, forwards its bitrate and stream notifications as player
//! events, keeps the signal-strength / quality indicators current, and feeds
//! caption tracks from either in-band CEA-608 data or WebVTT sidecar
//! renditions.
//!
//! Engine calls that fail are logged and reported to the caller; the plugin
//! state stays usable.

use std::sync::Arc;

use chrono::TimeDelta;
use parking_lot::Mutex;

use crate::config::{BitrateConfig, ClosedCaptionType, PluginConfig};
use crate::controller::HlsController;
use crate::error::{CaptionError, Result};
use crate::events::{
    BitrateSwitch, EventEmitter, InbandCaptionUnit, MediaQuality, PlayerEvent, PlaylistEvent,
    SegmentInfo, StreamSelection, TrackType,
};
use crate::fetch::SegmentFetcher;
use crate::style::{CaptionOptions, CaptionPreferences};
use crate::subtitle::{Caption, CaptionSink, CaptionTrack, Cc608Payload, WebVttSidecar};

/// Vertical resolution from which a variant counts as high definition
pub const HD_MIN_VERTICAL_RESOLUTION: u32 = 720;

/// Decides whether a suggested bitrate switch is cancelled (`true`)
pub type SwitchVeto = Arc<dyn Fn(&BitrateSwitch) -> bool + Send + Sync>;

#[derive(Debug, Default)]
struct PlayerState {
    tracks: Vec<CaptionTrack>,
    selected_caption: Option<String>,
    signal_strength: f64,
    media_quality: Option<MediaQuality>,
}

/// Player-side state the plugin drives
pub struct MediaPlayer {
    state: Mutex<PlayerState>,
    events: EventEmitter,
}

impl MediaPlayer {
    fn new(events: EventEmitter) -> Self {
        Self {
            state: Mutex::new(PlayerState::default()),
            events,
        }
    }

    pub fn available_captions(&self) -> Vec<Caption> {
        self.state
            .lock()
            .tracks
            .iter()
            .map(|t| t.caption.clone())
            .collect()
    }

    pub fn selected_caption(&self) -> Option<String> {
        self.state.lock().selected_caption.clone()
    }

    /// Snapshot of a caption track
    pub fn track(&self, id: &str) -> Option<CaptionTrack> {
        self.state.lock().tracks.iter().find(|t| t.id() == id).cloned()
    }

    /// Value between 0 and 1: active bitrate relative to the allowed maximum
    pub fn signal_strength(&self) -> f64 {
        self.state.lock().signal_strength
    }

    pub fn media_quality(&self) -> Option<MediaQuality> {
        self.state.lock().media_quality
    }

    /// The engine cannot keep up with seeks issued while scrubbing
    pub fn seek_while_scrubbing(&self) -> bool {
        false
    }

    /// Select a caption track by id, or turn captions off with `None`.
    /// Returns false when no track has that id.
    pub fn select_caption(&self, id: Option<&str>) -> bool {
        let mut state = self.state.lock();
        match id {
            Some(id) if !state.tracks.iter().any(|t| t.id() == id) => false,
            _ => {
                state.selected_caption = id.map(str::to_string);
                true
            }
        }
    }

    fn replace_captions(&self, captions: Vec<Caption>) {
        let mut state = self.state.lock();
        state.tracks = captions.into_iter().map(CaptionTrack::new).collect();
        state.selected_caption = None;
    }

    /// Queue on every track; returns the selected track's id if there is one
    fn push_cc608(&self, payload: &Cc608Payload) -> Option<String> {
        let mut state = self.state.lock();
        for track in state.tracks.iter_mut() {
            track.push_cc608(payload.clone());
        }
        state.selected_caption.clone()
    }

    fn set_indicators(&self, signal_strength: f64, media_quality: Option<MediaQuality>) {
        let mut state = self.state.lock();
        state.signal_strength = signal_strength;
        if media_quality.is_some() {
            state.media_quality = media_quality;
        }
    }
}

impl CaptionSink for MediaPlayer {
    fn augment_payload(&self, payload: &str, start: TimeDelta, end: TimeDelta) {
        let augmented = {
            let mut state = self.state.lock();
            let PlayerState {
                tracks,
                selected_caption,
                ..
            } = &mut *state;
            selected_caption.as_deref().and_then(|id| {
                tracks
                    .iter_mut()
                    .find(|t| t.id() == id)
                    .map(|t| (id.to_string(), t.augment_payload(payload, start, end)))
            })
        };

        match augmented {
            Some((caption_id, cues_added)) => self.events.emit(PlayerEvent::CaptionsAugmented {
                caption_id,
                cues_added,
            }),
            None => tracing::trace!("caption payload dropped: no caption selected"),
        }
    }
}

struct PluginState<C, F> {
    caption_type: ClosedCaptionType,
    bitrate: BitrateConfig,
    controller: Option<Arc<C>>,
    sidecar: Option<Arc<WebVttSidecar<F>>>,
    veto: Option<SwitchVeto>,
}

/// HLS plugin for a media player
pub struct HlsPlugin<C, F> {
    state: Mutex<PluginState<C, F>>,
    player: Arc<MediaPlayer>,
    fetcher: Arc<F>,
    events: EventEmitter,
    caption_preferences: CaptionPreferences,
}

impl<C: HlsController, F: SegmentFetcher> HlsPlugin<C, F> {
    pub fn new(config: &PluginConfig, fetcher: F) -> Self {
        let events = EventEmitter::new(config.event_capacity);
        Self {
            state: Mutex::new(PluginState {
                caption_type: config.caption_type,
                bitrate: config.bitrate.clone(),
                controller: None,
                sidecar: None,
                veto: None,
            }),
            player: Arc::new(MediaPlayer::new(events.clone())),
            fetcher: Arc::new(fetcher),
            events,
            caption_preferences: config.captions,
        }
    }

    pub fn player(&self) -> &Arc<MediaPlayer> {
        &self.player
    }

    pub fn events(&self) -> &EventEmitter {
        &self.events
    }

    /// Options for the native 608 renderer with the user's preferences applied
    pub fn caption_options(&self) -> CaptionOptions {
        CaptionOptions::from_preferences(&self.caption_preferences)
    }

    pub fn caption_preferences(&self) -> &CaptionPreferences {
        &self.caption_preferences
    }

    pub fn controller(&self) -> Option<Arc<C>> {
        self.state.lock().controller.clone()
    }

    pub fn caption_type(&self) -> ClosedCaptionType {
        self.state.lock().caption_type
    }

    /// Change the caption source; repopulates the caption tracks on change
    pub fn set_caption_type(&self, caption_type: ClosedCaptionType) {
        {
            let mut state = self.state.lock();
            if state.caption_type == caption_type {
                return;
            }
            state.caption_type = caption_type;
        }
        self.update_caption_tracks();
    }

    pub fn bitrate(&self) -> BitrateConfig {
        self.state.lock().bitrate.clone()
    }

    /// Applied the next time a controller becomes ready
    pub fn set_startup_bitrate(&self, bitrate: Option<u32>) {
        self.state.lock().bitrate.startup = bitrate;
    }

    pub fn set_min_bitrate(&self, bitrate: Option<u32>) -> Result<()> {
        self.state.lock().bitrate.min = bitrate;
        match (bitrate, self.valid_controller()) {
            (Some(bps), Some(controller)) => {
                logged(controller.set_minimum_allowed_bitrate(bps), "set minimum bitrate")
            }
            _ => Ok(()),
        }
    }

    pub fn set_max_bitrate(&self, bitrate: Option<u32>) -> Result<()> {
        self.state.lock().bitrate.max = bitrate;
        match (bitrate, self.valid_controller()) {
            (Some(bps), Some(controller)) => {
                logged(controller.set_maximum_allowed_bitrate(bps), "set maximum bitrate")
            }
            _ => Ok(()),
        }
    }

    /// Install a hook deciding whether suggested bitrate switches are cancelled
    pub fn set_switch_veto(&self, veto: Option<SwitchVeto>) {
        self.state.lock().veto = veto;
    }

    /// The engine has opened a playlist and handed out its controller
    pub fn controller_ready(&self, controller: Arc<C>) -> Result<()> {
        let bitrate = {
            let mut state = self.state.lock();
            state.controller = Some(controller.clone());
            state.bitrate.clone()
        };
        tracing::info!("HLS controller ready");

        let result = if controller.is_valid() {
            apply_bitrates(controller.as_ref(), &bitrate)
        } else {
            Ok(())
        };
        self.events.emit(PlayerEvent::ControllerReady);
        logged(result, "apply bitrate limits")
    }

    /// Dispatch an engine notification.
    ///
    /// Returns true when a suggested bitrate switch should be cancelled.
    pub async fn handle_playlist_event(&self, event: PlaylistEvent) -> bool {
        match event {
            PlaylistEvent::BitrateSwitchSuggested(switch) => {
                return self.on_bitrate_switch_suggested(switch);
            }
            PlaylistEvent::BitrateSwitchCompleted(switch) => {
                self.on_bitrate_switch_completed(switch)
            }
            PlaylistEvent::BitrateSwitchCancelled(switch) => {
                self.on_bitrate_switch_cancelled(switch)
            }
            PlaylistEvent::StreamSelectionChanged { from, to } => {
                self.on_stream_selection_changed(from, to)
            }
            PlaylistEvent::SegmentSwitched { to, .. } => {
                if let Err(e) = self.on_segment_switched(&to).await {
                    tracing::warn!("segment switch handling failed: {}", e);
                }
            }
        }
        false
    }

    pub fn on_bitrate_switch_suggested(&self, switch: BitrateSwitch) -> bool {
        let veto = self.state.lock().veto.clone();
        let cancelled = veto.map(|v| v(&switch)).unwrap_or(false);
        tracing::debug!(
            "bitrate switch suggested {} -> {} (cancelled: {})",
            switch.from_bitrate,
            switch.to_bitrate,
            cancelled
        );
        self.events
            .emit(PlayerEvent::BitrateSwitchSuggested { switch, cancelled });
        cancelled
    }

    pub fn on_bitrate_switch_completed(&self, switch: BitrateSwitch) {
        tracing::info!(
            "bitrate switch completed {} -> {}",
            switch.from_bitrate,
            switch.to_bitrate
        );
        self.refresh_state();
        self.events.emit(PlayerEvent::BitrateSwitchCompleted(switch));
    }

    pub fn on_bitrate_switch_cancelled(&self, switch: BitrateSwitch) {
        self.events.emit(PlayerEvent::BitrateSwitchCancelled(switch));
    }

    pub fn on_stream_selection_changed(&self, from: StreamSelection, to: StreamSelection) {
        self.events
            .emit(PlayerEvent::StreamSelectionChanged { from, to });
    }

    /// Playback moved to a new segment: route its 608 data, or pick up new
    /// WebVTT segments on live streams.
    pub async fn on_segment_switched(&self, segment: &SegmentInfo) -> Result<()> {
        self.refresh_state();

        match self.caption_type() {
            ClosedCaptionType::Cc608Instream => {
                if segment.media_type == TrackType::Audio {
                    return Ok(());
                }
                let Some(units) = &segment.inband_captions else {
                    return Ok(());
                };

                self.events.emit(PlayerEvent::Instream608CaptionsAvailable);

                let payload = collect_cc608(units);
                tracing::trace!(
                    "segment {}: {} 608 payload(s)",
                    segment.sequence,
                    payload.len()
                );
                if let Some(caption_id) = self.player.push_cc608(&payload) {
                    self.events
                        .emit(PlayerEvent::Cc608PayloadAugmented { caption_id, payload });
                }
                Ok(())
            }
            ClosedCaptionType::WebVttSidecar => {
                let (controller, sidecar) = {
                    let state = self.state.lock();
                    (state.controller.clone(), state.sidecar.clone())
                };
                let (Some(controller), Some(sidecar)) = (controller, sidecar) else {
                    return Ok(());
                };
                let Some(id) = sidecar.current_subtitle_id() else {
                    return Ok(());
                };
                sidecar
                    .download_all_segments(controller.as_ref(), &id, self.player.as_ref())
                    .await
                    .map(|_| ())
            }
            ClosedCaptionType::None => Ok(()),
        }
    }

    /// New media is about to load: stop caption downloads for the old one
    pub fn media_loading(&self) {
        if let Some(sidecar) = self.state.lock().sidecar.take() {
            sidecar.cancel();
        }
    }

    /// Media opened: populate caption tracks and indicators
    pub fn media_opened(&self) {
        self.update_caption_tracks();
        self.refresh_state();
    }

    /// The user picked a caption track (`None` turns captions off).
    ///
    /// For WebVTT sidecar captions this restarts the segment download for the
    /// new selection. Returns the number of segments delivered.
    pub async fn selected_caption_changed(&self, id: Option<&str>) -> Result<usize> {
        if !self.player.select_caption(id) {
            return Err(CaptionError::RenditionNotFound(
                id.unwrap_or_default().to_string(),
            ));
        }

        let (controller, sidecar) = {
            let mut state = self.state.lock();
            if state.caption_type != ClosedCaptionType::WebVttSidecar {
                return Ok(0);
            }
            if let Some(old) = state.sidecar.take() {
                old.cancel();
            }

            let Some(controller) = state.controller.clone().filter(|c| c.is_valid()) else {
                return Ok(0);
            };
            let Some(id) = id else {
                return Ok(0);
            };
            let sidecar = Arc::new(WebVttSidecar::new(self.fetcher.clone()));
            state.sidecar = Some(sidecar.clone());
            tracing::info!("downloading WebVTT captions for {:?}", id);
            (controller, sidecar)
        };

        let id = id.unwrap_or_default();
        let result = sidecar
            .download_all_segments(controller.as_ref(), id, self.player.as_ref())
            .await;
        logged(result, "download WebVTT captions")
    }

    /// The user picked an audio stream by its `name+language` id.
    ///
    /// Returns true when an inactive rendition matched and was activated.
    pub fn selected_audio_changed(&self, audio_stream_id: &str) -> Result<bool> {
        let Some(controller) = self.valid_controller() else {
            return Ok(false);
        };
        let Some(variant) = controller.active_variant() else {
            return Ok(false);
        };
        if !controller.is_master() {
            return Ok(false);
        }

        let found = variant
            .audio_renditions
            .iter()
            .filter(|r| !r.is_active)
            .find(|r| r.audio_stream_id() == audio_stream_id);

        match found {
            Some(rendition) => {
                logged(
                    controller.activate_audio_rendition(rendition),
                    "activate audio rendition",
                )?;
                tracing::info!("activated audio rendition {}", audio_stream_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Rebuild the caption track list for the current caption type
    pub fn update_caption_tracks(&self) {
        let captions = match self.caption_type() {
            ClosedCaptionType::Cc608Instream => (1..=4)
                .map(|n| Caption::new(n.to_string(), format!("CC{}", n)))
                .collect(),
            ClosedCaptionType::WebVttSidecar => {
                let Some(controller) = self.valid_controller().filter(|c| c.is_master()) else {
                    return;
                };
                let sidecar = Arc::new(WebVttSidecar::new(self.fetcher.clone()));
                let captions = sidecar.available_captions(controller.as_ref());
                if let Some(old) = self.state.lock().sidecar.replace(sidecar) {
                    old.cancel();
                }
                captions
            }
            ClosedCaptionType::None => return,
        };

        tracing::debug!("populated {} caption track(s)", captions.len());
        self.player.replace_captions(captions.clone());
        self.events
            .emit(PlayerEvent::AvailableCaptionsPopulated { captions });
    }

    /// Update the signal-strength and media-quality indicators
    pub fn refresh_state(&self) {
        let Some(controller) = self.valid_controller() else {
            return;
        };
        // Briefly absent while the engine switches bitrates
        let Some(variant) = controller.active_variant() else {
            return;
        };
        if !controller.is_master() {
            return;
        }

        let max = controller.maximum_allowed_bitrate();
        let signal_strength = if max == 0 {
            0.0
        } else {
            f64::from(variant.bitrate) / f64::from(max)
        };
        let media_quality = variant.resolution.map(|r| {
            if r.height >= HD_MIN_VERTICAL_RESOLUTION {
                MediaQuality::HighDefinition
            } else {
                MediaQuality::StandardDefinition
            }
        });

        self.player.set_indicators(signal_strength, media_quality);
        self.events.emit(PlayerEvent::StateRefreshed {
            signal_strength,
            media_quality: self.player.media_quality(),
        });
    }

    fn valid_controller(&self) -> Option<Arc<C>> {
        self.controller().filter(|c| c.is_valid())
    }
}

fn apply_bitrates<C: HlsController>(controller: &C, bitrate: &BitrateConfig) -> Result<()> {
    if let Some(bps) = bitrate.startup {
        controller.set_start_bitrate(bps)?;
    }
    if let Some(bps) = bitrate.min {
        controller.set_minimum_allowed_bitrate(bps)?;
    }
    if let Some(bps) = bitrate.max {
        controller.set_maximum_allowed_bitrate(bps)?;
    }
    Ok(())
}

fn logged<T>(result: Result<T>, what: &str) -> Result<T> {
    if let Err(e) = &result {
        tracing::warn!("failed to {}: {}", what, e);
    }
    result
}

/// Group 608 payloads by timestamp; later units replace earlier ones
pub fn collect_cc608(units: &[InbandCaptionUnit]) -> Cc608Payload {
    units
        .iter()
        .filter_map(|u| u.payload.as_ref().map(|p| (u.timestamp, p.clone())))
        .collect()
}
