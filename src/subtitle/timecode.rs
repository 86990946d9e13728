//! WebVTT timecode parsing and formatting
//!
//! Timecodes are carried as `chrono::TimeDelta` at 100 ns resolution, the
//! unit the player timeline uses.

use chrono::TimeDelta;

/// 100 ns units per second
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Parse a timecode of the form `[hh:]mm:ss[.fraction]`.
///
/// Hours may have any number of digits, minutes and seconds are two digits
/// below 60 and the fraction carries up to seven digits. A leading `-`
/// negates the value. Returns `None` for anything else.
pub fn parse_timecode(input: &str) -> Option<TimeDelta> {
    let input = input.trim();
    let (negative, input) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let (clock, fraction) = match input.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (input, None),
    };

    let fields: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, seconds) = match fields.as_slice() {
        [h, m, s] => (parse_digits(h)?, parse_sexagesimal(m)?, parse_sexagesimal(s)?),
        [m, s] => (0, parse_sexagesimal(m)?, parse_sexagesimal(s)?),
        _ => return None,
    };

    let fraction_ticks = match fraction {
        None => 0,
        Some(f) => {
            if f.is_empty() || f.len() > 7 {
                return None;
            }
            parse_digits(f)? * 10i64.pow(7 - f.len() as u32)
        }
    };

    let total_seconds = hours
        .checked_mul(3600)?
        .checked_add(minutes * 60 + seconds)?;
    let ticks = total_seconds
        .checked_mul(TICKS_PER_SECOND)?
        .checked_add(fraction_ticks)?;

    let delta = TimeDelta::nanoseconds(ticks.checked_mul(100)?);
    Some(if negative { -delta } else { delta })
}

/// Format a timecode as `hh:mm:ss.mmm`
pub fn format_timecode(value: TimeDelta) -> String {
    let total_ms = value.num_milliseconds();
    let sign = if total_ms < 0 { "-" } else { "" };
    let ms = total_ms.unsigned_abs();

    let hours = ms / 3_600_000;
    let minutes = (ms / 60_000) % 60;
    let seconds = (ms / 1000) % 60;
    let millis = ms % 1000;

    format!(
        "{}{:02}:{:02}:{:02}.{:03}",
        sign, hours, minutes, seconds, millis
    )
}

fn parse_digits(s: &str) -> Option<i64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_sexagesimal(s: &str) -> Option<i64> {
    if s.len() != 2 {
        return None;
    }
    parse_digits(s).filter(|v| *v < 60)
}
