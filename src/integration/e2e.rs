//! End-to-end plugin flows

use std::sync::Arc;

use chrono::TimeDelta;
use tokio::sync::broadcast;

use crate::config::{ClosedCaptionType, PluginConfig};
use crate::controller::{Resolution, SubtitleLocator, VariantStream};
use crate::error::CaptionError;
use crate::events::{
    BitrateSwitch, MediaQuality, PlayerEvent, PlaylistEvent, SegmentInfo, TrackType,
};
use crate::integration::fixtures::{segment_payload, MockController, MockFetcher};
use crate::plugin::HlsPlugin;

fn drain(rx: &mut broadcast::Receiver<PlayerEvent>) -> Vec<PlayerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn video_segment(sequence: u32) -> PlaylistEvent {
    PlaylistEvent::SegmentSwitched {
        from: None,
        to: SegmentInfo {
            sequence,
            media_type: TrackType::Video,
            inband_captions: None,
        },
    }
}

fn sidecar_plugin() -> (HlsPlugin<MockController, MockFetcher>, Arc<MockController>) {
    let fetcher = MockFetcher::default();
    fetcher.insert(
        "http://cdn/en/0.vtt",
        &segment_payload(900_000, "00:00:00.000", "Hello"),
    );
    fetcher.insert(
        "http://cdn/en/1.vtt",
        &segment_payload(1_260_000, "00:00:00.000", "World"),
    );
    fetcher.insert(
        "http://cdn/en/2.vtt",
        &segment_payload(1_440_000, "00:00:00.000", "Again"),
    );

    let config = PluginConfig {
        caption_type: ClosedCaptionType::WebVttSidecar,
        ..Default::default()
    };
    let plugin = HlsPlugin::new(&config, fetcher);

    let controller = Arc::new(MockController::master_with_subtitles(&[
        ("English", "en"),
        ("Deutsch", "de"),
    ]));
    controller.set_locators(vec![
        SubtitleLocator::new(0, "http://cdn/en/0.vtt"),
        SubtitleLocator::new(1, "http://cdn/en/1.vtt"),
    ]);
    (plugin, controller)
}

#[tokio::test]
async fn test_webvtt_sidecar_flow() {
    let (plugin, controller) = sidecar_plugin();
    let mut rx = plugin.events().subscribe();

    plugin.controller_ready(controller.clone()).unwrap();
    plugin.media_opened();

    let names: Vec<String> = plugin
        .player()
        .available_captions()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(names, vec!["English".to_string(), "Deutsch".to_string()]);

    let delivered = plugin.selected_caption_changed(Some("English")).await.unwrap();
    assert_eq!(delivered, 2);
    assert_eq!(plugin.player().selected_caption().as_deref(), Some("English"));

    let track = plugin.player().track("English").unwrap();
    let starts: Vec<TimeDelta> = track.cues().iter().map(|c| c.start).collect();
    assert_eq!(starts, vec![TimeDelta::seconds(10), TimeDelta::seconds(14)]);
    assert_eq!(track.cues()[1].text, "World");

    let events = drain(&mut rx);
    assert_eq!(events[0], PlayerEvent::ControllerReady);
    assert!(events
        .iter()
        .any(|e| matches!(e, PlayerEvent::AvailableCaptionsPopulated { captions } if captions.len() == 2)));
    let augmented = events
        .iter()
        .filter(|e| matches!(e, PlayerEvent::CaptionsAugmented { cues_added: 1, .. }))
        .count();
    assert_eq!(augmented, 2);
}

#[tokio::test]
async fn test_live_sidecar_picks_up_new_segments() {
    let (plugin, controller) = sidecar_plugin();
    controller.set_live(true);
    plugin.controller_ready(controller.clone()).unwrap();
    plugin.media_opened();
    plugin.selected_caption_changed(Some("English")).await.unwrap();

    controller.set_locators(vec![
        SubtitleLocator::new(1, "http://cdn/en/1.vtt"),
        SubtitleLocator::new(2, "http://cdn/en/2.vtt"),
    ]);
    assert!(!plugin.handle_playlist_event(video_segment(3)).await);

    let track = plugin.player().track("English").unwrap();
    assert_eq!(track.cues().len(), 3);
    assert_eq!(track.cues()[2].start, TimeDelta::seconds(16));

    // Nothing is downloaded for the old media once new media starts loading
    plugin.media_loading();
    controller.set_locators(vec![SubtitleLocator::new(3, "http://cdn/en/3.vtt")]);
    plugin.handle_playlist_event(video_segment(4)).await;
    assert_eq!(plugin.player().track("English").unwrap().cues().len(), 3);
}

#[tokio::test]
async fn test_caption_selection_edge_cases() {
    let (plugin, controller) = sidecar_plugin();
    plugin.controller_ready(controller).unwrap();
    plugin.media_opened();

    let err = plugin.selected_caption_changed(Some("Klingon")).await;
    assert!(matches!(err, Err(CaptionError::RenditionNotFound(_))));

    plugin.selected_caption_changed(Some("English")).await.unwrap();
    assert_eq!(plugin.selected_caption_changed(None).await.unwrap(), 0);
    assert_eq!(plugin.player().selected_caption(), None);
}

#[tokio::test]
async fn test_bitrate_switch_flow() {
    let config = PluginConfig::default();
    let plugin: HlsPlugin<MockController, MockFetcher> =
        HlsPlugin::new(&config, MockFetcher::default());
    plugin.set_max_bitrate(Some(4_000_000)).unwrap();
    plugin.set_switch_veto(Some(Arc::new(|s: &BitrateSwitch| {
        s.to_bitrate > 3_000_000
    })));

    let controller = Arc::new(MockController::master_with_subtitles(&[]));
    plugin.controller_ready(controller.clone()).unwrap();
    assert_eq!(controller.max_bitrate(), Some(4_000_000));

    let mut rx = plugin.events().subscribe();
    let up = BitrateSwitch {
        from_bitrate: 1_000_000,
        to_bitrate: 3_500_000,
    };
    assert!(
        plugin
            .handle_playlist_event(PlaylistEvent::BitrateSwitchSuggested(up))
            .await
    );

    let down = BitrateSwitch {
        from_bitrate: 1_000_000,
        to_bitrate: 2_000_000,
    };
    controller.set_variant(Some(VariantStream {
        bitrate: 2_000_000,
        resolution: Some(Resolution {
            width: 1920,
            height: 1080,
        }),
        ..Default::default()
    }));
    assert!(
        !plugin
            .handle_playlist_event(PlaylistEvent::BitrateSwitchSuggested(down))
            .await
    );
    plugin
        .handle_playlist_event(PlaylistEvent::BitrateSwitchCompleted(down))
        .await;

    assert_eq!(plugin.player().signal_strength(), 0.5);
    assert_eq!(
        plugin.player().media_quality(),
        Some(MediaQuality::HighDefinition)
    );

    let events = drain(&mut rx);
    assert_eq!(
        events,
        vec![
            PlayerEvent::BitrateSwitchSuggested {
                switch: up,
                cancelled: true
            },
            PlayerEvent::BitrateSwitchSuggested {
                switch: down,
                cancelled: false
            },
            PlayerEvent::StateRefreshed {
                signal_strength: 0.5,
                media_quality: Some(MediaQuality::HighDefinition)
            },
            PlayerEvent::BitrateSwitchCompleted(down),
        ]
    );
}

#[tokio::test]
async fn test_invalid_controller_is_left_alone() {
    let (plugin, controller) = sidecar_plugin();
    controller.set_valid(false);
    plugin.set_startup_bitrate(Some(500_000));
    plugin.controller_ready(controller.clone()).unwrap();
    plugin.media_opened();

    assert_eq!(controller.start_bitrate(), None);
    assert!(plugin.player().available_captions().is_empty());
    assert!(!plugin.selected_audio_changed("Main+en").unwrap());
}
