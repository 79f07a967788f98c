use std::{fmt, ops::Add, str::FromStr};

use crate::foundation::error::{EditError, EditResult};

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// Non-negative timeline position or duration with millisecond resolution.
///
/// The textual form is `HH:MM:SS,mmm`, zero-padded. Ordering on the value is the same as
/// ordering on the zero-padded text, so comparing two parsed timecodes matches comparing the
/// attribute strings field by field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timecode(u64);

impl Timecode {
    /// `00:00:00,000`.
    pub const ZERO: Timecode = Timecode(0);

    /// Build a timecode from a millisecond count.
    pub fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Build a timecode from whole seconds.
    pub fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(MS_PER_SECOND))
    }

    /// Total milliseconds.
    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Parse `HH:MM:SS,mmm` (a `.` millisecond separator is accepted too).
    pub fn parse(s: &str) -> EditResult<Self> {
        let s = s.trim();
        let bad = || EditError::validation(format!("malformed timecode '{s}'"));

        let (hms, frac) = s.split_once([',', '.']).ok_or_else(bad)?;
        let mut fields = hms.split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(bad());
        };

        let num = |f: &str| -> EditResult<u64> {
            if f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit()) {
                return Err(bad());
            }
            f.parse::<u64>().map_err(|_| bad())
        };
        let (h, m, sec, ms) = (num(h)?, num(m)?, num(sec)?, num(frac)?);
        if m >= 60 || sec >= 60 || frac.len() != 3 {
            return Err(bad());
        }

        h.checked_mul(MS_PER_HOUR)
            .and_then(|v| v.checked_add(m * MS_PER_MINUTE + sec * MS_PER_SECOND + ms))
            .map(Self)
            .ok_or_else(bad)
    }

    /// `self - rhs`, or `None` when the result would be negative.
    pub fn checked_sub(self, rhs: Timecode) -> Option<Timecode> {
        self.0.checked_sub(rhs.0).map(Self)
    }
}

impl Add for Timecode {
    type Output = Timecode;

    fn add(self, rhs: Timecode) -> Timecode {
        Timecode(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = self.0 / MS_PER_HOUR;
        let m = (self.0 % MS_PER_HOUR) / MS_PER_MINUTE;
        let s = (self.0 % MS_PER_MINUTE) / MS_PER_SECOND;
        let ms = self.0 % MS_PER_SECOND;
        write!(f, "{h:02}:{m:02}:{s:02},{ms:03}")
    }
}

impl FromStr for Timecode {
    type Err = EditError;

    fn from_str(s: &str) -> EditResult<Self> {
        Self::parse(s)
    }
}

impl serde::Serialize for Timecode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Timecode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/timecode.rs"]
mod tests;
