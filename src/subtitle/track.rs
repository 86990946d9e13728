//! Caption tracks exposed to the player

use std::collections::{BTreeMap, VecDeque};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use super::cue::{parse_cues, Cue};

/// In-band CEA-608 byte pairs keyed by presentation time in 100 ns units
pub type Cc608Payload = BTreeMap<u64, Vec<u8>>;

/// Number of 608 payload sets kept per track (playback can run ~30 s ahead)
pub const CC608_QUEUE_DEPTH: usize = 3;

/// Caption metadata as listed in the player's caption picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caption {
    pub id: String,
    pub description: String,
    pub language: Option<String>,
}

impl Caption {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            language: None,
        }
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }
}

/// A caption track and the data accumulated for it
#[derive(Debug, Clone)]
pub struct CaptionTrack {
    pub caption: Caption,
    cues: Vec<Cue>,
    cc608: VecDeque<Cc608Payload>,
}

impl CaptionTrack {
    pub fn new(caption: Caption) -> Self {
        Self {
            caption,
            cues: Vec::new(),
            cc608: VecDeque::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.caption.id
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// Merge the cues of a WebVTT payload into the track.
    ///
    /// Cue times are moved by `start`. When `end` is non-zero, cues whose
    /// moved start is at or past it are dropped. Cues already present are
    /// not added twice. Returns the number of cues added.
    pub fn augment_payload(&mut self, payload: &str, start: TimeDelta, end: TimeDelta) -> usize {
        let mut added = 0;
        for cue in parse_cues(payload) {
            let cue = cue.shifted(start);
            if end > TimeDelta::zero() && cue.start >= end {
                continue;
            }
            // Sorted by start: duplicates can only sit among equal starts
            let first = self.cues.partition_point(|c| c.start < cue.start);
            let at = first + self.cues[first..].partition_point(|c| c.start <= cue.start);
            if self.cues[first..at].contains(&cue) {
                continue;
            }
            self.cues.insert(at, cue);
            added += 1;
        }
        added
    }

    /// Cues showing at `at`
    pub fn active_cues(&self, at: TimeDelta) -> Vec<&Cue> {
        self.cues.iter().filter(|c| c.is_active_at(at)).collect()
    }

    /// Render the merged cues as a WebVTT document
    pub fn to_webvtt(&self) -> String {
        let mut output = String::from("WEBVTT\n");
        for cue in &self.cues {
            output.push('\n');
            output.push_str(&cue.to_webvtt());
        }
        output
    }

    /// Queue a 608 payload set, keeping only the most recent ones
    pub fn push_cc608(&mut self, payload: Cc608Payload) {
        self.cc608.push_back(payload);
        while self.cc608.len() > CC608_QUEUE_DEPTH {
            self.cc608.pop_front();
        }
    }

    pub fn cc608_payloads(&self) -> impl Iterator<Item = &Cc608Payload> {
        self.cc608.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> CaptionTrack {
        CaptionTrack::new(Caption::new("English", "English").with_language(Some("en".into())))
    }

    #[test]
    fn test_augment_payload_shifts_and_sorts() {
        let mut track = track();
        let later = "WEBVTT\n\n00:00:04.000 --> 00:00:06.000\nLater\n";
        let earlier = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nEarlier\n";

        assert_eq!(track.augment_payload(later, TimeDelta::seconds(10), TimeDelta::zero()), 1);
        assert_eq!(track.augment_payload(earlier, TimeDelta::seconds(10), TimeDelta::zero()), 1);

        let starts: Vec<_> = track.cues().iter().map(|c| c.start).collect();
        assert_eq!(starts, vec![TimeDelta::seconds(11), TimeDelta::seconds(14)]);
        assert_eq!(track.active_cues(TimeDelta::seconds(15))[0].text, "Later");
    }

    #[test]
    fn test_augment_payload_skips_duplicates() {
        let mut track = track();
        let payload = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nOnce\n";
        track.augment_payload(payload, TimeDelta::zero(), TimeDelta::zero());
        assert_eq!(track.augment_payload(payload, TimeDelta::zero(), TimeDelta::zero()), 0);
        assert_eq!(track.cues().len(), 1);
    }

    #[test]
    fn test_augment_payload_same_start_cues() {
        let mut track = track();
        let first = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nLeft\n\n00:00:03.000 --> 00:00:04.000\nNext\n";
        let second = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nRight\n\n00:00:01.000 --> 00:00:02.000\nLeft\n";
        assert_eq!(track.augment_payload(first, TimeDelta::zero(), TimeDelta::zero()), 2);
        assert_eq!(track.augment_payload(second, TimeDelta::zero(), TimeDelta::zero()), 1);

        let texts: Vec<&str> = track.cues().iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["Left", "Right", "Next"]);
    }

    #[test]
    fn test_augment_payload_end_cutoff() {
        let mut track = track();
        let payload = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nIn\n\n00:00:05.000 --> 00:00:06.000\nOut\n";
        assert_eq!(track.augment_payload(payload, TimeDelta::zero(), TimeDelta::seconds(5)), 1);
        assert_eq!(track.cues()[0].text, "In");
    }

    #[test]
    fn test_to_webvtt() {
        let mut track = track();
        track.augment_payload(
            "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nHi\n",
            TimeDelta::seconds(1),
            TimeDelta::zero(),
        );
        assert_eq!(track.to_webvtt(), "WEBVTT\n\n00:00:02.000 --> 00:00:03.000\nHi\n");
    }

    #[test]
    fn test_cc608_queue_keeps_three() {
        let mut track = track();
        for ts in 0..5u64 {
            let mut payload = Cc608Payload::new();
            payload.insert(ts, vec![0x14, 0x2c]);
            track.push_cc608(payload);
        }
        let kept: Vec<u64> = track
            .cc608_payloads()
            .map(|p| *p.keys().next().unwrap())
            .collect();
        assert_eq!(kept, vec![2, 3, 4]);
    }
}
