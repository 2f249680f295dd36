//! Capture length value object

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// How long a capture may run before it is stopped automatically.
/// Whole seconds, always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CaptureDuration {
    seconds: u64,
}

impl CaptureDuration {
    /// Create from whole seconds; `None` for zero
    pub const fn from_secs(seconds: u64) -> Option<Self> {
        if seconds == 0 {
            None
        } else {
            Some(Self { seconds })
        }
    }

    pub const fn as_secs(&self) -> u64 {
        self.seconds
    }

    /// Convert to std::time::Duration
    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_secs(self.seconds)
    }
}

impl FromStr for CaptureDuration {
    type Err = DurationParseError;

    /// Accepts unit-suffixed parts in descending order: `45s`, `2m`, `1m30s`, `1h5m`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || DurationParseError {
            input: s.to_string(),
        };
        let input = s.trim().to_ascii_lowercase();

        let mut total: u64 = 0;
        let mut rest = input.as_str();
        // Units must appear at most once each, largest first
        let mut allowed: &[(char, u64)] = &[('h', 3600), ('m', 60), ('s', 1)];

        while !rest.is_empty() {
            let digits = rest.find(|c: char| !c.is_ascii_digit()).ok_or_else(err)?;
            if digits == 0 {
                return Err(err());
            }
            let value: u64 = rest[..digits].parse().map_err(|_| err())?;
            let unit = rest[digits..].chars().next().ok_or_else(err)?;

            let pos = allowed.iter().position(|(u, _)| *u == unit).ok_or_else(err)?;
            let scale = allowed[pos].1;
            allowed = &allowed[pos + 1..];

            total = value
                .checked_mul(scale)
                .and_then(|secs| total.checked_add(secs))
                .ok_or_else(err)?;
            rest = &rest[digits + unit.len_utf8()..];
        }

        Self::from_secs(total).ok_or_else(err)
    }
}

impl fmt::Display for CaptureDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.seconds / 3600;
        let minutes = self.seconds % 3600 / 60;
        let seconds = self.seconds % 60;

        if hours > 0 {
            write!(f, "{}h", hours)?;
        }
        if minutes > 0 {
            write!(f, "{}m", minutes)?;
        }
        if seconds > 0 {
            write!(f, "{}s", seconds)?;
        }
        Ok(())
    }
}
