//! WebVTT `X-TIMESTAMP-MAP` handling
//!
//! HLS WebVTT segments carry cue times relative to a local zero. The
//! `X-TIMESTAMP-MAP=MPEGTS:<ticks>,LOCAL:<timecode>` header ties that local
//! clock to the 90 kHz presentation clock of the transport stream, so the
//! offset to add to every cue is `mpegts - local`.
//!
//! Anything missing or unparseable yields a zero offset: the cue times are
//! then taken as already absolute.

use chrono::TimeDelta;

use super::timecode::parse_timecode;

const HEADER: &str = "X-TIMESTAMP-MAP";
const LOCAL: &str = "LOCAL:";
const MPEGTS: &str = "MPEGTS:";

/// 100 ns units per second
const HUNDRED_NS_PER_SECOND: i64 = 10_000_000;

/// MPEG-TS clock rate
pub const MPEGTS_CLOCK_HZ: i64 = 90_000;

/// Parsed `X-TIMESTAMP-MAP` header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampMap {
    /// Presentation time in 90 kHz ticks
    pub mpegts: i64,
    /// Cue-local time that maps onto `mpegts`
    pub local: TimeDelta,
}

impl TimestampMap {
    /// Find and parse the header in a WebVTT payload
    pub fn parse(payload: &str) -> Option<Self> {
        let upper = payload.to_ascii_uppercase();

        let header_at = upper.find(HEADER)?;
        let local_at = header_at + upper[header_at..].find(LOCAL)?;
        let mpegts_at = header_at + upper[header_at..].find(MPEGTS)?;

        let local_start = local_at + LOCAL.len();
        let local_text = if mpegts_at > local_at {
            // LOCAL:<timecode>,MPEGTS:<ticks>
            let comma_at = local_at + upper[local_at..].find(',')?;
            &upper[local_start..comma_at]
        } else {
            // MPEGTS:<ticks>,LOCAL:<timecode>
            let rest = &upper[local_start..];
            let end = rest.find(['\n', '\r']).unwrap_or(rest.len());
            &rest[..end]
        };

        let digits = leading_digits(&upper[mpegts_at + MPEGTS.len()..]);
        if local_text.trim().is_empty() || digits.is_empty() {
            return None;
        }

        let local = parse_timecode(local_text)?;
        let mpegts = digits.parse::<i64>().ok()?;

        Some(Self { mpegts, local })
    }

    /// Offset to add to cue-local times to land on the presentation clock
    pub fn offset(&self) -> Option<TimeDelta> {
        mpegts_to_duration(self.mpegts)?.checked_sub(&self.local)
    }
}

/// Compute the cue-time offset for a WebVTT payload.
///
/// Returns zero when the header is absent or malformed.
pub fn timestamp_offset(payload: &str) -> TimeDelta {
    match TimestampMap::parse(payload).and_then(|map| map.offset()) {
        Some(offset) => {
            tracing::debug!("WebVTT X-TIMESTAMP-MAP offset = {}", offset);
            offset
        }
        None => TimeDelta::zero(),
    }
}

/// Convert 90 kHz ticks to a duration at 100 ns resolution
pub fn mpegts_to_duration(ticks: i64) -> Option<TimeDelta> {
    let hundred_ns = ticks.checked_mul(HUNDRED_NS_PER_SECOND)? / MPEGTS_CLOCK_HZ;
    Some(TimeDelta::nanoseconds(hundred_ns.checked_mul(100)?))
}

fn leading_digits(s: &str) -> &str {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    &s[..end]
}
