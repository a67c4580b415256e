//! Expiration Policy Module
//!
//! Calendar-aware expiry offsets and the staleness check applied on read.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::CacheEntry;

// == Expires After ==
/// Offset from an entry's creation time after which it is stale.
///
/// Years and months are applied as calendar months, so "+1 month" from
/// January 31st lands on the last day of February. The remaining components
/// are exact durations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiresAfter {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub years: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub months: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub days: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub hours: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub minutes: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub seconds: u32,
}

fn is_zero(v: &u32) -> bool {
    *v == 0
}

impl ExpiresAfter {
    pub fn seconds(seconds: u32) -> Self {
        Self {
            seconds,
            ..Self::default()
        }
    }

    pub fn minutes(minutes: u32) -> Self {
        Self {
            minutes,
            ..Self::default()
        }
    }

    pub fn hours(hours: u32) -> Self {
        Self {
            hours,
            ..Self::default()
        }
    }

    pub fn days(days: u32) -> Self {
        Self {
            days,
            ..Self::default()
        }
    }

    pub fn months(months: u32) -> Self {
        Self {
            months,
            ..Self::default()
        }
    }

    pub fn years(years: u32) -> Self {
        Self {
            years,
            ..Self::default()
        }
    }

    // == Apply ==
    /// Adds this offset to `start`.
    ///
    /// Returns `None` when the result is outside the representable range.
    pub fn apply(&self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let total_months = u64::from(self.years) * 12 + u64::from(self.months);
        let shifted = start.checked_add_months(Months::new(u32::try_from(total_months).ok()?))?;

        let exact = Duration::try_days(i64::from(self.days))?
            + Duration::try_hours(i64::from(self.hours))?
            + Duration::try_minutes(i64::from(self.minutes))?
            + Duration::try_seconds(i64::from(self.seconds))?;

        shifted.checked_add_signed(exact)
    }
}

impl fmt::Display for ExpiresAfter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [
            (self.years, "y"),
            (self.months, "mo"),
            (self.days, "d"),
            (self.hours, "h"),
            (self.minutes, "m"),
            (self.seconds, "s"),
        ];

        let mut wrote = false;
        for (value, unit) in parts {
            if value > 0 {
                write!(f, "{}{}", value, unit)?;
                wrote = true;
            }
        }

        if !wrote {
            f.write_str("0s")?;
        }
        Ok(())
    }
}

// == Parsing ==
/// Error returned when an expiry string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid expiry '{input}': {reason}")]
pub struct ParseExpiresError {
    input: String,
    reason: &'static str,
}

impl FromStr for ExpiresAfter {
    type Err = ParseExpiresError;

    /// Parses compact forms such as `30s`, `5m`, `1w`, `3mo` or `1d12h`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |reason| ParseExpiresError {
            input: s.to_string(),
            reason,
        };

        let input = s.trim();
        if input.is_empty() {
            return Err(fail("empty"));
        }

        let mut out = Self::default();
        let mut rest = input;
        while !rest.is_empty() {
            let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
            if digits == 0 {
                return Err(fail("expected a number"));
            }
            let value: u32 = rest[..digits].parse().map_err(|_| fail("number too large"))?;
            rest = &rest[digits..];

            let unit_len = rest.chars().take_while(|c| c.is_ascii_alphabetic()).count();
            let unit = &rest[..unit_len];
            rest = &rest[unit_len..];

            let slot = match unit {
                "s" => &mut out.seconds,
                "m" => &mut out.minutes,
                "h" => &mut out.hours,
                "d" => &mut out.days,
                "w" => {
                    let days = value.checked_mul(7).ok_or_else(|| fail("number too large"))?;
                    out.days = out
                        .days
                        .checked_add(days)
                        .ok_or_else(|| fail("number too large"))?;
                    continue;
                }
                "mo" => &mut out.months,
                "y" => &mut out.years,
                "" => return Err(fail("missing unit")),
                _ => return Err(fail("unknown unit")),
            };
            *slot = slot
                .checked_add(value)
                .ok_or_else(|| fail("number too large"))?;
        }

        Ok(out)
    }
}

// == Is Expired ==
/// Checks whether `entry` is stale at `now`.
///
/// Entries without an offset never expire. An entry whose expiry instant
/// cannot be computed is treated as fresh. At the boundary the entry is
/// already expired.
pub fn is_expired<V>(entry: &CacheEntry<V>, now: DateTime<Utc>) -> bool {
    match entry.expires_after.and_then(|offset| offset.apply(entry.created_at)) {
        Some(expiry) => expiry <= now,
        None => false,
    }
}
