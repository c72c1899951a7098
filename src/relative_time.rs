//! Human-relative rendering of `<time>` markers ("3 days ago").

use chrono::{DateTime, Utc};

/// Renders a timestamp relative to some reference instant.
pub trait RelativeTime {
    /// `None` when `datetime` cannot be parsed; the marker is left untouched.
    fn render(&self, datetime: &str) -> Option<String>;
}

/// timeago-style buckets: (seconds in unit, unit name).
const UNITS: [(i64, &str); 6] = [
    (60 * 60 * 24 * 365, "year"),
    (60 * 60 * 24 * 365 / 12, "month"),
    (60 * 60 * 24 * 7, "week"),
    (60 * 60 * 24, "day"),
    (60 * 60, "hour"),
    (60, "minute"),
];

/// Below this many seconds a time is "just now" / "right now".
const JUST_NOW_SECS: i64 = 10;

#[derive(Debug, Clone, Copy)]
pub struct TimeAgo {
    reference: DateTime<Utc>,
}

impl TimeAgo {
    pub fn new(reference: DateTime<Utc>) -> Self {
        Self { reference }
    }

    /// Relative to the current wall clock.
    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    pub fn humanize(&self, then: DateTime<Utc>) -> String {
        let delta = self.reference.signed_duration_since(then).num_seconds();
        let future = delta < 0;
        let secs = delta.abs();

        if secs < JUST_NOW_SECS {
            return if future { "right now" } else { "just now" }.to_string();
        }

        let (count, unit) = UNITS
            .iter()
            .find(|(size, _)| secs >= *size)
            .map(|(size, unit)| (secs / size, *unit))
            .unwrap_or((secs, "second"));
        let plural = if count == 1 { "" } else { "s" };

        if future {
            format!("in {count} {unit}{plural}")
        } else {
            format!("{count} {unit}{plural} ago")
        }
    }
}

impl RelativeTime for TimeAgo {
    fn render(&self, datetime: &str) -> Option<String> {
        let then = DateTime::parse_from_rfc3339(datetime.trim()).ok()?;
        Some(self.humanize(then.with_timezone(&Utc)))
    }
}
