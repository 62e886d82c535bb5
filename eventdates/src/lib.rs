//! eventdates: recurring event date generation.
//!
//! Expands a recurrence rule from an anchor occurrence into concrete local
//! date-times, converts them to UTC in the event's timezone, and reconciles
//! them against dates already in storage.
//!
//! # Examples
//!
//! ```
//! use eventdates::{RecurrenceRule, SeriesManager, Weekday};
//! use jiff::civil::date;
//!
//! let rule = RecurrenceRule::weekly(Weekday::Saturday, 1).unwrap();
//! let start = date(2021, 5, 15).at(13, 30, 0, 0);
//! let end = date(2021, 5, 15).at(15, 30, 0, 0);
//!
//! let dates = SeriesManager::default()
//!     .create_series(Some(&rule), start, end, "UTC")
//!     .unwrap();
//! assert_eq!(dates.len(), 10);
//! println!("{rule}"); // "every saturday"
//! ```

pub mod config;
pub mod convert;
pub mod display;
pub mod error;
pub mod expand;
pub mod resolve;
pub mod rule;
pub mod series;

pub use config::SeriesConfig;
pub use error::RecurrenceError;
pub use expand::{expand, Occurrence, Occurrences};
pub use resolve::{FixedTimezone, Location, NearestTimezone, TimezoneResolver};
pub use rule::{Frequency, Month, Pattern, RecurrenceRule, StoredRule, WeekOfMonth, Weekday};
pub use series::{DateId, EventDate, SeriesChange, SeriesManager, StoredDate};

use jiff::civil::DateTime;

// --- RecurrenceRule convenience methods ---

impl RecurrenceRule {
    /// Occurrences of this rule from `(start, end)` up to `horizon`, lazily.
    pub fn occurrences(&self, start: DateTime, end: DateTime, horizon: DateTime) -> Occurrences {
        Occurrences::new(self, start, end, horizon)
    }

    /// The first `n` occurrences, bounded by the default horizon for this rule.
    pub fn first_n(
        &self,
        start: DateTime,
        end: DateTime,
        n: usize,
    ) -> Result<Vec<Occurrence>, RecurrenceError> {
        let horizon = SeriesConfig::default().horizon_for(Some(self), start)?;
        expand(Some(self), start, end, horizon, n, false)
    }
}

#[cfg(feature = "serde")]
impl std::str::FromStr for StoredRule {
    type Err = RecurrenceError;

    /// Parse the JSON form of a stored rule, e.g.
    /// `{"recurringType": 1, "separationCount": 1, "dayOfWeek": 5}`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
            .map_err(|e| RecurrenceError::invalid(format!("malformed rule JSON: {e}")))
    }
}
