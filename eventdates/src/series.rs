//! Reconciling generated occurrences with what is already stored.
//!
//! Nothing here touches storage. Each operation returns the rows to create
//! and the ids to delete; the caller applies one [`SeriesChange`] in a single
//! transaction or not at all.

use jiff::civil::DateTime;
use jiff::Timestamp;
use tracing::{debug, warn};

use crate::config::SeriesConfig;
use crate::convert::{resolve_tz, to_utc_in};
use crate::error::RecurrenceError;
use crate::expand::{expand, Occurrence};
use crate::resolve::{Location, TimezoneResolver};
use crate::rule::RecurrenceRule;

/// Storage id of a persisted event date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DateId(pub i64);

/// An event date that already exists in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoredDate {
    pub id: DateId,
    pub start_local: DateTime,
    pub end_local: DateTime,
    pub start_utc: Timestamp,
}

impl StoredDate {
    pub fn is_upcoming(&self, now: Timestamp) -> bool {
        self.start_utc > now
    }
}

/// A generated event date, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventDate {
    pub start_local: DateTime,
    pub end_local: DateTime,
    pub start_utc: Timestamp,
    pub end_utc: Timestamp,
    pub tz: String,
}

/// Rows to delete and rows to create, applied together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SeriesChange {
    pub delete: Vec<DateId>,
    pub create: Vec<EventDate>,
}

impl SeriesChange {
    pub fn is_empty(&self) -> bool {
        self.delete.is_empty() && self.create.is_empty()
    }
}

/// The stored date starting soonest after `now`.
pub fn next_upcoming(dates: &[StoredDate], now: Timestamp) -> Option<&StoredDate> {
    dates
        .iter()
        .filter(|d| d.is_upcoming(now))
        .min_by_key(|d| d.start_utc)
}

/// The stored date starting latest after `now`.
pub fn last_upcoming(dates: &[StoredDate], now: Timestamp) -> Option<&StoredDate> {
    dates
        .iter()
        .filter(|d| d.is_upcoming(now))
        .max_by_key(|d| d.start_utc)
}

/// Generates, extends, and regenerates the dates of one recurring event.
#[derive(Debug, Clone, Default)]
pub struct SeriesManager {
    config: SeriesConfig,
}

impl SeriesManager {
    pub fn new(config: SeriesConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SeriesConfig {
        &self.config
    }

    /// Resolve and validate the timezone of an event's location.
    pub fn timezone_for(
        &self,
        resolver: &impl TimezoneResolver,
        location: Location,
    ) -> Result<String, RecurrenceError> {
        let tz = resolver.timezone_at(location)?;
        resolve_tz(&tz)?;
        Ok(tz)
    }

    /// All dates for a newly created event, anchor included.
    ///
    /// Returns [`RecurrenceError::NoOccurrences`] when the rule never lands
    /// inside the horizon.
    pub fn create_series(
        &self,
        rule: Option<&RecurrenceRule>,
        start: DateTime,
        end: DateTime,
        tz_id: &str,
    ) -> Result<Vec<EventDate>, RecurrenceError> {
        let tz = resolve_tz(tz_id)?;
        let horizon = self.config.horizon_for(rule, start)?;
        let occurrences = expand(rule, start, end, horizon, self.config.max_live_dates, false)?;
        if occurrences.is_empty() {
            warn!(%start, %horizon, "recurrence has no dates inside the horizon");
            return Err(RecurrenceError::NoOccurrences { horizon });
        }
        materialize_in(&occurrences, tz_id, &tz)
    }

    /// Top the series back up to the live-date cap without touching what exists.
    ///
    /// Expansion restarts from the latest existing date, which is already
    /// stored and so is not emitted again.
    pub fn extend_series(
        &self,
        existing_future: &[StoredDate],
        rule: &RecurrenceRule,
        tz_id: &str,
    ) -> Result<Vec<EventDate>, RecurrenceError> {
        let tz = resolve_tz(tz_id)?;
        let remaining = self
            .config
            .max_live_dates
            .saturating_sub(existing_future.len());
        if remaining == 0 {
            debug!(existing = existing_future.len(), "series already full");
            return Ok(Vec::new());
        }

        let last = existing_future
            .iter()
            .max_by_key(|d| d.start_local)
            .ok_or_else(|| RecurrenceError::invalid("no existing date to extend the series from"))?;

        let horizon = self.config.horizon_for(Some(rule), last.start_local)?;
        let occurrences = expand(
            Some(rule),
            last.start_local,
            last.end_local,
            horizon,
            remaining,
            true,
        )?;
        debug!(
            existing = existing_future.len(),
            added = occurrences.len(),
            "extended series"
        );
        materialize_in(&occurrences, tz_id, &tz)
    }

    /// Replace every upcoming date after the rule, anchor, or timezone changed.
    ///
    /// Past dates are history and are left alone. Inputs are validated before
    /// anything is decided, so an error means no change at all.
    pub fn regenerate_series(
        &self,
        existing: &[StoredDate],
        rule: Option<&RecurrenceRule>,
        start: DateTime,
        end: DateTime,
        tz_id: &str,
        now: Timestamp,
    ) -> Result<SeriesChange, RecurrenceError> {
        let create = self.create_series(rule, start, end, tz_id)?;
        let delete: Vec<DateId> = existing
            .iter()
            .filter(|d| d.is_upcoming(now))
            .map(|d| d.id)
            .collect();
        debug!(
            deleted = delete.len(),
            created = create.len(),
            "regenerated series"
        );
        Ok(SeriesChange { delete, create })
    }

    /// Drop the upcoming dates of an event whose rule was cleared.
    ///
    /// With `keep_next`, the next upcoming date survives as a one-off.
    pub fn remove_rrule(
        &self,
        existing: &[StoredDate],
        now: Timestamp,
        keep_next: bool,
    ) -> SeriesChange {
        let keep = if keep_next {
            next_upcoming(existing, now).map(|d| d.id)
        } else {
            None
        };
        let delete = existing
            .iter()
            .filter(|d| d.is_upcoming(now) && Some(d.id) != keep)
            .map(|d| d.id)
            .collect();
        SeriesChange {
            delete,
            create: Vec::new(),
        }
    }
}

/// Attach UTC instants to local occurrences.
pub fn materialize(
    occurrences: &[Occurrence],
    tz_id: &str,
) -> Result<Vec<EventDate>, RecurrenceError> {
    let tz = resolve_tz(tz_id)?;
    materialize_in(occurrences, tz_id, &tz)
}

fn materialize_in(
    occurrences: &[Occurrence],
    tz_id: &str,
    tz: &jiff::tz::TimeZone,
) -> Result<Vec<EventDate>, RecurrenceError> {
    occurrences
        .iter()
        .map(|occ| {
            Ok(EventDate {
                start_local: occ.start,
                end_local: occ.end,
                start_utc: to_utc_in(occ.start, tz)?,
                end_utc: to_utc_in(occ.end, tz)?,
                tz: tz_id.to_string(),
            })
        })
        .collect()
}
