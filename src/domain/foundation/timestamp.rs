//! UTC instants attached to recorded turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// When something happened. Serialized as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Minute-precision label used in transcripts, e.g. `2024-01-15 10:30`.
    pub fn display_minute(&self) -> String {
        self.0.format("%Y-%m-%d %H:%M").to_string()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn now_lies_between_surrounding_reads() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(*ts.as_datetime() >= before && *ts.as_datetime() <= after);
    }

    #[test]
    fn minute_label_drops_seconds() {
        let ts = Timestamp::from(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 59).unwrap());
        assert_eq!(ts.display_minute(), "2024-01-15 10:30");
    }

    #[test]
    fn stored_form_is_rfc3339() {
        let ts: Timestamp = serde_json::from_str("\"2024-01-15T10:30:00Z\"").unwrap();

        assert_eq!(ts.display_minute(), "2024-01-15 10:30");
        assert_eq!(serde_json::to_string(&ts).unwrap(), "\"2024-01-15T10:30:00Z\"");
    }
}
