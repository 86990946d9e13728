//! WebVTT cue parsing

use chrono::TimeDelta;

use super::timecode::{format_timecode, parse_timecode};

/// A single WebVTT cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// Optional cue identifier line
    pub id: Option<String>,
    /// Start time on the cue clock
    pub start: TimeDelta,
    /// End time on the cue clock
    pub end: TimeDelta,
    /// Cue settings following the end timestamp (`align:start line:90%`)
    pub settings: Option<String>,
    /// Payload text, lines joined with `\n`
    pub text: String,
}

impl Cue {
    /// Create a new cue without id or settings
    pub fn new(start: TimeDelta, end: TimeDelta, text: impl Into<String>) -> Self {
        Self {
            id: None,
            start,
            end,
            settings: None,
            text: text.into(),
        }
    }

    /// Copy of this cue moved by `offset`
    pub fn shifted(&self, offset: TimeDelta) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
            ..self.clone()
        }
    }

    /// Whether the cue is showing at `at`
    pub fn is_active_at(&self, at: TimeDelta) -> bool {
        self.start <= at && at < self.end
    }

    /// Render the cue block
    pub fn to_webvtt(&self) -> String {
        let mut output = String::new();
        if let Some(id) = &self.id {
            output.push_str(id);
            output.push('\n');
        }
        output.push_str(&format_timecode(self.start));
        output.push_str(" --> ");
        output.push_str(&format_timecode(self.end));
        if let Some(settings) = &self.settings {
            output.push(' ');
            output.push_str(settings);
        }
        output.push('\n');
        output.push_str(&self.text);
        output.push('\n');
        output
    }
}

/// Parse the cues of a WebVTT payload.
///
/// The header block, `NOTE`, `STYLE` and `REGION` blocks are skipped. A
/// block whose timing line does not parse is dropped on its own.
pub fn parse_cues(payload: &str) -> Vec<Cue> {
    let normalized = payload.replace("\r\n", "\n").replace('\r', "\n");
    let mut cues = Vec::new();

    for (n, block) in split_blocks(&normalized).into_iter().enumerate() {
        let first = block[0];
        if n == 0 && first.starts_with("WEBVTT") {
            continue;
        }
        if first.starts_with("NOTE") || first.starts_with("STYLE") || first.starts_with("REGION")
        {
            continue;
        }

        let (id, timing_at) = if first.contains("-->") {
            (None, 0)
        } else if block.len() > 1 && block[1].contains("-->") {
            (Some(first.to_string()), 1)
        } else {
            tracing::trace!("skipping WebVTT block without timing: {:?}", first);
            continue;
        };

        match parse_timing(block[timing_at]) {
            Some((start, end, settings)) => cues.push(Cue {
                id,
                start,
                end,
                settings,
                text: block[timing_at + 1..].join("\n"),
            }),
            None => {
                tracing::debug!("dropping cue with malformed timing: {:?}", block[timing_at]);
            }
        }
    }

    cues
}

/// Split into blank-line separated blocks of non-empty lines
fn split_blocks(payload: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in payload.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn parse_timing(line: &str) -> Option<(TimeDelta, TimeDelta, Option<String>)> {
    let (start, rest) = line.split_once("-->")?;
    let rest = rest.trim_start();
    let (end, settings) = match rest.split_once(char::is_whitespace) {
        Some((end, settings)) => (end, Some(settings.trim())),
        None => (rest, None),
    };

    let start = parse_timecode(start)?;
    let end = parse_timecode(end)?;
    let settings = settings.filter(|s| !s.is_empty()).map(str::to_string);
    Some((start, end, settings))
}
