//! Test fixtures for integration tests
//!
//! Provides an in-memory HLS controller, segment fetcher and caption sink so
//! the sidecar and plugin can be exercised without an engine or network.

use std::collections::HashMap;

use chrono::TimeDelta;
use parking_lot::Mutex;
use url::Url;

use crate::controller::{HlsController, Rendition, SubtitleLocator, VariantStream};
use crate::error::{CaptionError, Result};
use crate::fetch::SegmentFetcher;
use crate::subtitle::CaptionSink;

/// WebVTT segment with a timestamp map and a single two second cue
pub fn segment_payload(mpegts: i64, local: &str, text: &str) -> String {
    format!(
        "WEBVTT\nX-TIMESTAMP-MAP=MPEGTS:{},LOCAL:{}\n\n00:00:00.000 --> 00:00:02.000\n{}\n",
        mpegts, local, text
    )
}

#[derive(Debug, Default)]
struct ControllerState {
    valid: bool,
    master: bool,
    live: bool,
    variant: Option<VariantStream>,
    locators: Vec<SubtitleLocator>,
    start_bitrate: Option<u32>,
    min_bitrate: Option<u32>,
    max_bitrate: Option<u32>,
    activated: Vec<String>,
    fail_setters: bool,
}

/// In-memory HLS controller
#[derive(Debug, Default)]
pub struct MockController {
    state: Mutex<ControllerState>,
}

impl MockController {
    /// Valid master playlist whose active variant carries the given
    /// `(name, language)` subtitle renditions
    pub fn master_with_subtitles(subtitles: &[(&str, &str)]) -> Self {
        let variant = VariantStream {
            bitrate: 1_000_000,
            subtitle_renditions: subtitles
                .iter()
                .map(|(name, lang)| Rendition::new(*name, Some(*lang)))
                .collect(),
            ..Default::default()
        };
        Self {
            state: Mutex::new(ControllerState {
                valid: true,
                master: true,
                variant: Some(variant),
                ..Default::default()
            }),
        }
    }

    pub fn set_valid(&self, valid: bool) {
        self.state.lock().valid = valid;
    }

    pub fn set_master(&self, master: bool) {
        self.state.lock().master = master;
    }

    pub fn set_live(&self, live: bool) {
        self.state.lock().live = live;
    }

    pub fn set_variant(&self, variant: Option<VariantStream>) {
        self.state.lock().variant = variant;
    }

    pub fn set_locators(&self, locators: Vec<SubtitleLocator>) {
        self.state.lock().locators = locators;
    }

    /// Make the bitrate setters fail
    pub fn fail_setters(&self, fail: bool) {
        self.state.lock().fail_setters = fail;
    }

    pub fn start_bitrate(&self) -> Option<u32> {
        self.state.lock().start_bitrate
    }

    pub fn min_bitrate(&self) -> Option<u32> {
        self.state.lock().min_bitrate
    }

    pub fn max_bitrate(&self) -> Option<u32> {
        self.state.lock().max_bitrate
    }

    /// Audio stream ids of the renditions activated so far
    pub fn activated(&self) -> Vec<String> {
        self.state.lock().activated.clone()
    }

    fn set_bitrate(&self, apply: impl FnOnce(&mut ControllerState)) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_setters {
            return Err(CaptionError::Controller("setting rejected".to_string()));
        }
        apply(&mut state);
        Ok(())
    }
}

impl HlsController for MockController {
    fn is_valid(&self) -> bool {
        self.state.lock().valid
    }

    fn is_master(&self) -> bool {
        self.state.lock().master
    }

    fn is_live(&self) -> bool {
        self.state.lock().live
    }

    fn active_variant(&self) -> Option<VariantStream> {
        self.state.lock().variant.clone()
    }

    fn maximum_allowed_bitrate(&self) -> u32 {
        self.state.lock().max_bitrate.unwrap_or(0)
    }

    fn set_start_bitrate(&self, bitrate: u32) -> Result<()> {
        self.set_bitrate(|s| s.start_bitrate = Some(bitrate))
    }

    fn set_minimum_allowed_bitrate(&self, bitrate: u32) -> Result<()> {
        self.set_bitrate(|s| s.min_bitrate = Some(bitrate))
    }

    fn set_maximum_allowed_bitrate(&self, bitrate: u32) -> Result<()> {
        self.set_bitrate(|s| s.max_bitrate = Some(bitrate))
    }

    fn activate_audio_rendition(&self, rendition: &Rendition) -> Result<()> {
        let mut state = self.state.lock();
        let id = rendition.audio_stream_id();
        if let Some(variant) = state.variant.as_mut() {
            for r in variant.audio_renditions.iter_mut() {
                r.is_active = r.audio_stream_id() == id;
            }
        }
        state.activated.push(id);
        Ok(())
    }

    async fn refresh_subtitle_locators(
        &self,
        _rendition: &Rendition,
    ) -> Result<Vec<SubtitleLocator>> {
        Ok(self.state.lock().locators.clone())
    }
}

/// Serves canned segment bodies and records every request
#[derive(Debug, Default)]
pub struct MockFetcher {
    bodies: Mutex<HashMap<String, String>>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn insert(&self, url: &str, body: &str) {
        self.bodies.lock().insert(url.to_string(), body.to_string());
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

impl SegmentFetcher for MockFetcher {
    async fn fetch_text(&self, url: &Url) -> Result<String> {
        self.requests.lock().push(url.to_string());
        self.bodies
            .lock()
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| CaptionError::Http(format!("404 Not Found: {}", url)))
    }
}

/// Caption sink recording every payload it receives
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<(String, TimeDelta, TimeDelta)>>,
}

impl RecordingSink {
    pub fn calls(&self) -> Vec<(String, TimeDelta, TimeDelta)> {
        self.calls.lock().clone()
    }
}

impl CaptionSink for RecordingSink {
    fn augment_payload(&self, payload: &str, start: TimeDelta, end: TimeDelta) {
        self.calls.lock().push((payload.to_string(), start, end));
    }
}
