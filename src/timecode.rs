//! Millisecond-precision play positions and durations.
//!
//! A [`TimeCode`] is always a normalized, non-negative duration. The numeric
//! edit controls in the UI operate on one field at a time (minutes, seconds
//! or milliseconds); [`TimeCode::with_field`] implements the borrow/carry
//! behavior those controls rely on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const MILLIS_PER_SECOND: u64 = 1_000;
const MILLIS_PER_MINUTE: u64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: u64 = 60 * MILLIS_PER_MINUTE;

/// A non-negative position or duration with millisecond precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeCode {
    millis: u64,
}

/// One editable field of a [`TimeCode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeField {
    /// Whole minutes, `0..=99` in the edit controls.
    Minutes,
    /// Seconds within the minute, `0..=59`.
    Seconds,
    /// Milliseconds within the second, `0..=999`.
    Millis,
}

impl TimeField {
    fn range(self) -> (i64, i64) {
        match self {
            TimeField::Minutes => (0, 99),
            TimeField::Seconds => (0, 59),
            TimeField::Millis => (0, 999),
        }
    }

    fn unit_millis(self) -> u64 {
        match self {
            TimeField::Minutes => MILLIS_PER_MINUTE,
            TimeField::Seconds => MILLIS_PER_SECOND,
            TimeField::Millis => 1,
        }
    }
}

impl TimeCode {
    /// The zero position.
    pub const ZERO: TimeCode = TimeCode { millis: 0 };

    /// Build from a total millisecond count.
    pub fn from_millis(millis: u64) -> Self {
        Self { millis }
    }

    /// Build from whole seconds.
    pub fn from_seconds(seconds: u64) -> Self {
        Self {
            millis: seconds * MILLIS_PER_SECOND,
        }
    }

    /// Build from a minutes/seconds/milliseconds triplet, normalizing carry.
    pub fn from_parts(minutes: u64, seconds: u64, millis: u64) -> Self {
        Self {
            millis: minutes * MILLIS_PER_MINUTE + seconds * MILLIS_PER_SECOND + millis,
        }
    }

    /// Total milliseconds.
    pub fn total_millis(self) -> u64 {
        self.millis
    }

    /// Total seconds as a float, for engine interop.
    pub fn total_seconds(self) -> f64 {
        self.millis as f64 / MILLIS_PER_SECOND as f64
    }

    /// Whole minutes, folding hours in (the minute edit control spans 0–99).
    pub fn minutes(self) -> u64 {
        self.millis / MILLIS_PER_MINUTE
    }

    /// Seconds within the minute.
    pub fn seconds(self) -> u64 {
        (self.millis / MILLIS_PER_SECOND) % 60
    }

    /// Milliseconds within the second.
    pub fn subsec_millis(self) -> u64 {
        self.millis % MILLIS_PER_SECOND
    }

    /// Add a duration, saturating on overflow.
    pub fn saturating_add(self, other: TimeCode) -> Self {
        Self {
            millis: self.millis.saturating_add(other.millis),
        }
    }

    /// Subtract a duration, saturating at zero.
    pub fn saturating_sub(self, other: TimeCode) -> Self {
        Self {
            millis: self.millis.saturating_sub(other.millis),
        }
    }

    /// Replace one field with a raw control value.
    ///
    /// A value below the field minimum borrows one base unit from the whole
    /// timecode; a value above the maximum carries one base unit into it.
    /// In-range values replace just that field. This keeps an increment of a
    /// seconds field sitting at 59 rolling into the minutes field instead of
    /// clamping, while the edit stays anchored to the field the user touched.
    pub fn with_field(self, field: TimeField, raw: i64) -> Self {
        let (min, max) = field.range();
        let unit = TimeCode::from_millis(field.unit_millis());
        if raw < min {
            self.saturating_sub(unit)
        } else if raw > max {
            self.saturating_add(unit)
        } else {
            let raw = raw as u64;
            match field {
                TimeField::Minutes => TimeCode::from_parts(raw, self.seconds(), self.subsec_millis()),
                TimeField::Seconds => TimeCode::from_parts(self.minutes(), raw, self.subsec_millis()),
                TimeField::Millis => TimeCode::from_parts(self.minutes(), self.seconds(), raw),
            }
        }
    }

    /// Clamp into `[lo, hi]`.
    pub fn clamp(self, lo: TimeCode, hi: TimeCode) -> Self {
        Self {
            millis: self.millis.clamp(lo.millis, hi.millis),
        }
    }

    /// Fraction of `duration` this position covers, clamped to `0.0..=1.0`.
    ///
    /// A zero duration maps everything to `0.0`.
    pub fn fraction_of(self, duration: TimeCode) -> f32 {
        if duration.millis == 0 {
            return 0.0;
        }
        (self.millis as f64 / duration.millis as f64).clamp(0.0, 1.0) as f32
    }

    /// Position at `fraction` (clamped to `0.0..=1.0`) of `duration`.
    pub fn at_fraction(duration: TimeCode, fraction: f32) -> Self {
        let fraction = f64::from(fraction).clamp(0.0, 1.0);
        Self {
            millis: (duration.millis as f64 * fraction).round() as u64,
        }
    }
}

/// Error parsing the canonical `h:mm:ss.fff` text form.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid timecode {input:?}: {reason}")]
pub struct ParseTimeCodeError {
    /// The rejected input text.
    pub input: String,
    /// What made it unparseable.
    pub reason: &'static str,
}

impl fmt::Display for TimeCode {
    /// Canonical text form: `h:mm:ss.fff`, hours unpadded.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.millis / MILLIS_PER_HOUR;
        let minutes = (self.millis / MILLIS_PER_MINUTE) % 60;
        write!(
            f,
            "{hours}:{minutes:02}:{:02}.{:03}",
            self.seconds(),
            self.subsec_millis()
        )
    }
}

impl FromStr for TimeCode {
    type Err = ParseTimeCodeError;

    /// Parse `h:mm:ss.fff`; the hours part and fractional part are optional.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let fail = |reason| ParseTimeCodeError {
            input: input.to_string(),
            reason,
        };
        let (clock, frac) = match input.split_once('.') {
            Some((clock, frac)) => (clock, Some(frac)),
            None => (input, None),
        };
        let parts: Vec<&str> = clock.split(':').collect();
        let (hours, minutes, seconds) = match parts.as_slice() {
            [m, s] => ("0", *m, *s),
            [h, m, s] => (*h, *m, *s),
            _ => return Err(fail("expected mm:ss or h:mm:ss")),
        };
        let hours: u64 = hours.parse().map_err(|_| fail("bad hours"))?;
        let minutes: u64 = minutes.parse().map_err(|_| fail("bad minutes"))?;
        let seconds: u64 = seconds.parse().map_err(|_| fail("bad seconds"))?;
        if minutes > 59 || seconds > 59 {
            return Err(fail("minutes and seconds must be below 60"));
        }
        let millis = match frac {
            None => 0,
            Some(frac) if frac.is_empty() => return Err(fail("empty fraction")),
            Some(frac) => {
                if frac.chars().any(|c| !c.is_ascii_digit()) {
                    return Err(fail("bad fraction"));
                }
                // Interpret the first three digits as milliseconds.
                let digits: String = frac.chars().take(3).collect();
                let value: u64 = digits.parse().map_err(|_| fail("bad fraction"))?;
                value * 10u64.pow(3 - digits.len() as u32)
            }
        };
        Ok(TimeCode::from_millis(
            hours * MILLIS_PER_HOUR + minutes * MILLIS_PER_MINUTE + seconds * MILLIS_PER_SECOND
                + millis,
        ))
    }
}

impl Serialize for TimeCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_field_carries_into_minutes() {
        let tc = TimeCode::from_parts(2, 59, 0);
        let bumped = tc.with_field(TimeField::Seconds, 60);
        assert_eq!(bumped, TimeCode::from_parts(3, 0, 0));
    }

    #[test]
    fn seconds_field_borrows_from_minutes() {
        let tc = TimeCode::from_parts(3, 0, 250);
        let dropped = tc.with_field(TimeField::Seconds, -1);
        assert_eq!(dropped, TimeCode::from_parts(2, 59, 250));
    }

    #[test]
    fn millis_field_rolls_over_at_both_edges() {
        let tc = TimeCode::from_parts(0, 5, 999);
        assert_eq!(tc.with_field(TimeField::Millis, 1_000), TimeCode::from_parts(0, 6, 0));
        let tc = TimeCode::from_parts(0, 5, 0);
        assert_eq!(tc.with_field(TimeField::Millis, -1), TimeCode::from_parts(0, 4, 999));
    }

    #[test]
    fn in_range_value_replaces_only_that_field() {
        let tc = TimeCode::from_parts(4, 30, 125);
        assert_eq!(tc.with_field(TimeField::Seconds, 10), TimeCode::from_parts(4, 10, 125));
        assert_eq!(tc.with_field(TimeField::Minutes, 7), TimeCode::from_parts(7, 30, 125));
    }

    #[test]
    fn edits_never_go_negative() {
        let borrowed = TimeCode::ZERO.with_field(TimeField::Seconds, -1);
        assert_eq!(borrowed, TimeCode::ZERO);
        assert_eq!(TimeCode::ZERO.with_field(TimeField::Millis, -1), TimeCode::ZERO);
    }

    #[test]
    fn display_zero_pads_and_round_trips() {
        let tc = TimeCode::from_parts(65, 7, 42);
        assert_eq!(tc.to_string(), "1:05:07.042");
        assert_eq!("1:05:07.042".parse::<TimeCode>().unwrap(), tc);
        assert_eq!(TimeCode::ZERO.to_string(), "0:00:00.000");
    }

    #[test]
    fn parse_accepts_short_forms() {
        assert_eq!("00:05:30".parse::<TimeCode>().unwrap(), TimeCode::from_parts(5, 30, 0));
        assert_eq!("05:30".parse::<TimeCode>().unwrap(), TimeCode::from_parts(5, 30, 0));
        assert_eq!(
            "0:00:01.5".parse::<TimeCode>().unwrap(),
            TimeCode::from_millis(1_500)
        );
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!("".parse::<TimeCode>().is_err());
        assert!("1:2:3:4".parse::<TimeCode>().is_err());
        assert!("0:61:00".parse::<TimeCode>().is_err());
        assert!("0:00:00.".parse::<TimeCode>().is_err());
        assert!("abc".parse::<TimeCode>().is_err());
    }

    #[test]
    fn fractions_clamp_and_handle_zero_duration() {
        let duration = TimeCode::from_seconds(10);
        assert_eq!(TimeCode::from_seconds(5).fraction_of(duration), 0.5);
        assert_eq!(TimeCode::from_seconds(20).fraction_of(duration), 1.0);
        assert_eq!(TimeCode::from_seconds(5).fraction_of(TimeCode::ZERO), 0.0);
        assert_eq!(TimeCode::at_fraction(duration, 0.25), TimeCode::from_millis(2_500));
        assert_eq!(TimeCode::at_fraction(duration, 1.5), duration);
    }
}
