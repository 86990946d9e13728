//! WebVTT sidecar captions
//!
//! Lists the subtitle renditions of the active variant and downloads the
//! WebVTT segments of the selected one. Segments are fetched one at a time
//! to keep the load on the player low; on live playlists only segments not
//! seen on the previous pass are fetched. Each downloaded body is merged
//! into the caption sink with its `X-TIMESTAMP-MAP` offset.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::TimeDelta;
use parking_lot::Mutex;
use url::Url;

use super::timestamp_map::timestamp_offset;
use super::track::Caption;
use crate::controller::{HlsController, Rendition, SubtitleLocator};
use crate::error::Result;
use crate::fetch::SegmentFetcher;

/// Receives downloaded caption payloads
pub trait CaptionSink: Send + Sync {
    /// Merge a WebVTT payload, moving its cues by `start`
    fn augment_payload(&self, payload: &str, start: TimeDelta, end: TimeDelta);
}

/// Downloader for the segments of one subtitle selection
pub struct WebVttSidecar<F> {
    fetcher: Arc<F>,
    cancelled: AtomicBool,
    current_subtitle_id: Mutex<Option<String>>,
    /// Locators seen on the previous pass
    locators: Mutex<Vec<SubtitleLocator>>,
}

impl<F: SegmentFetcher> WebVttSidecar<F> {
    pub fn new(fetcher: Arc<F>) -> Self {
        Self {
            fetcher,
            cancelled: AtomicBool::new(false),
            current_subtitle_id: Mutex::new(None),
            locators: Mutex::new(Vec::new()),
        }
    }

    /// Stop downloading. In-flight passes stop before their next segment.
    pub fn cancel(&self) {
        *self.current_subtitle_id.lock() = None;
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn current_subtitle_id(&self) -> Option<String> {
        self.current_subtitle_id.lock().clone()
    }

    /// Captions for the subtitle renditions of the active variant
    pub fn available_captions<C: HlsController>(&self, controller: &C) -> Vec<Caption> {
        self.subtitle_renditions(controller)
            .into_iter()
            .map(|r| Caption::new(r.name.clone(), r.name).with_language(r.language))
            .collect()
    }

    /// Download the segments of the subtitle rendition named `id`.
    ///
    /// Returns the number of segments handed to the sink.
    pub async fn download_all_segments<C: HlsController>(
        &self,
        controller: &C,
        id: &str,
        sink: &dyn CaptionSink,
    ) -> Result<usize> {
        let Some(rendition) = self.find_rendition(controller, id) else {
            tracing::debug!("no subtitle rendition named {:?}", id);
            return Ok(0);
        };
        *self.current_subtitle_id.lock() = Some(id.to_string());

        if !controller.is_valid() {
            return Ok(0);
        }

        let locators = controller.refresh_subtitle_locators(&rendition).await?;
        if locators.is_empty() {
            return Ok(0);
        }

        let to_fetch = {
            let mut known = self.locators.lock();
            let to_fetch: Vec<SubtitleLocator> = if controller.is_live() && !known.is_empty() {
                locators
                    .iter()
                    .filter(|l| !known.contains(l))
                    .cloned()
                    .collect()
            } else {
                locators.clone()
            };
            *known = locators;
            to_fetch
        };
        tracing::debug!(
            "subtitle {:?}: {} segment(s) to fetch",
            id,
            to_fetch.len()
        );

        let mut delivered = 0;
        for locator in &to_fetch {
            if self.is_cancelled() {
                break;
            }
            match Url::parse(&locator.location) {
                Ok(url) => {
                    if self.download_segment(locator.index, &url, sink).await {
                        delivered += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!("skipping subtitle segment {:?}: {}", locator.location, e);
                }
            }
        }

        Ok(delivered)
    }

    async fn download_segment(&self, index: u32, url: &Url, sink: &dyn CaptionSink) -> bool {
        match self.fetcher.fetch_text(url).await {
            Ok(body) if !body.is_empty() && !self.is_cancelled() => {
                let offset = timestamp_offset(&body);
                tracing::trace!("subtitle segment {} offset {}", index, offset);
                sink.augment_payload(&body, offset, TimeDelta::zero());
                true
            }
            Ok(_) => false,
            Err(e) => {
                tracing::warn!("failed to download subtitle segment {} ({}): {}", index, url, e);
                false
            }
        }
    }

    fn find_rendition<C: HlsController>(&self, controller: &C, id: &str) -> Option<Rendition> {
        self.subtitle_renditions(controller)
            .into_iter()
            .find(|r| r.name == id)
    }

    fn subtitle_renditions<C: HlsController>(&self, controller: &C) -> Vec<Rendition> {
        if self.is_cancelled() || !controller.is_valid() || !controller.is_master() {
            return Vec::new();
        }
        controller
            .active_variant()
            .map(|v| v.subtitle_renditions)
            .unwrap_or_default()
    }
}
