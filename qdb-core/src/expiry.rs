//! ExpiryTime - When a remote entry disappears
//!
//! TigerStyle: Instants are stored at millisecond precision, so a value
//! survives a round trip through the store unchanged.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Point in time after which the store removes an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "at")]
pub enum ExpiryTime {
    /// The entry never expires.
    Never,
    /// The entry expires at this instant.
    At(DateTime<Utc>),
}

impl ExpiryTime {
    /// An expiry that never fires.
    #[must_use]
    pub fn never() -> Self {
        Self::Never
    }

    /// Expire at an absolute instant (truncated to milliseconds).
    #[must_use]
    pub fn at(instant: DateTime<Utc>) -> Self {
        let truncated = DateTime::from_timestamp_millis(instant.timestamp_millis());
        Self::At(truncated.unwrap_or(instant))
    }

    /// Expire at a millisecond Unix timestamp.
    ///
    /// Returns `None` if the timestamp is outside the representable range.
    #[must_use]
    pub fn at_unix_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self::At)
    }

    /// Expire `offset` after `base`.
    ///
    /// Returns `None` if the result is outside the representable range.
    #[must_use]
    pub fn after(base: DateTime<Utc>, offset: Duration) -> Option<Self> {
        base.checked_add_signed(offset).map(Self::at)
    }

    /// Expire `offset` from now.
    #[must_use]
    pub fn from_now(offset: Duration) -> Option<Self> {
        Self::after(Utc::now(), offset)
    }

    /// Expire `secs` seconds from now, or `None` on overflow.
    #[must_use]
    pub fn seconds_from_now(secs: i64) -> Option<Self> {
        Duration::try_seconds(secs).and_then(Self::from_now)
    }

    /// Expire `mins` minutes from now, or `None` on overflow.
    #[must_use]
    pub fn minutes_from_now(mins: i64) -> Option<Self> {
        Duration::try_minutes(mins).and_then(Self::from_now)
    }

    /// The instant, if any.
    #[must_use]
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Never => None,
            Self::At(at) => Some(*at),
        }
    }

    /// Whether the expiry has passed at `now`.
    #[must_use]
    pub fn has_passed(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::Never => false,
            Self::At(at) => *at <= now,
        }
    }
}

impl Default for ExpiryTime {
    fn default() -> Self {
        Self::Never
    }
}

impl std::fmt::Display for ExpiryTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Never => write!(f, "never"),
            Self::At(at) => write!(f, "{}", at.to_rfc3339()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_is_by_instant() {
        let base = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let a = ExpiryTime::after(base, Duration::seconds(60)).unwrap();
        let b = ExpiryTime::after(base, Duration::minutes(1)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, ExpiryTime::after(base, Duration::seconds(61)).unwrap());
    }

    #[test]
    fn test_sub_millisecond_precision_is_dropped() {
        let base = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let fine = base + Duration::microseconds(456);
        assert_eq!(ExpiryTime::at(fine), ExpiryTime::at(base));
        assert_eq!(
            ExpiryTime::at(fine).instant().unwrap().timestamp_millis(),
            1_700_000_000_123
        );
    }

    #[test]
    fn test_relative_constructors_are_in_the_future() {
        let now = Utc::now();
        let in_a_minute = ExpiryTime::minutes_from_now(1).unwrap();
        let in_ten_seconds = ExpiryTime::seconds_from_now(10).unwrap();
        assert!(!in_a_minute.has_passed(now));
        assert!(!in_ten_seconds.has_passed(now));
        assert!(in_ten_seconds < in_a_minute);
    }

    #[test]
    fn test_out_of_range_is_none() {
        assert_eq!(ExpiryTime::seconds_from_now(10_000_000_000_000_000), None);
        assert_eq!(ExpiryTime::seconds_from_now(i64::MIN), None);
        assert_eq!(ExpiryTime::minutes_from_now(i64::MAX), None);
        assert_eq!(ExpiryTime::at_unix_millis(i64::MAX), None);

        // far past stays an error, never turns into Never
        let far_past = Duration::milliseconds(-i64::MAX);
        assert_eq!(ExpiryTime::after(Utc::now(), far_past), None);
        assert_eq!(ExpiryTime::from_now(far_past), None);
    }

    #[test]
    fn test_never_does_not_pass() {
        assert!(!ExpiryTime::never().has_passed(Utc::now()));
        assert_eq!(ExpiryTime::default(), ExpiryTime::Never);
        assert_eq!(ExpiryTime::Never.instant(), None);
    }

    #[test]
    fn test_has_passed_boundary() {
        let at = DateTime::from_timestamp_millis(10_000).unwrap();
        let expiry = ExpiryTime::at(at);
        assert!(!expiry.has_passed(at - Duration::milliseconds(1)));
        assert!(expiry.has_passed(at));
    }

    #[test]
    fn test_serde_shape() {
        let never = serde_json::to_string(&ExpiryTime::Never).unwrap();
        assert_eq!(never, r#"{"type":"never"}"#);

        let expiry = ExpiryTime::at_unix_millis(1_700_000_000_250).unwrap();
        let json = serde_json::to_value(expiry).unwrap();
        assert_eq!(json["type"], "at");
        let back: ExpiryTime = serde_json::from_value(json).unwrap();
        assert_eq!(back, expiry);
    }
}
