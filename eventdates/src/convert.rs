//! Wall-clock ↔ UTC conversion.
//!
//! Naive local date-times are `jiff::civil::DateTime` values read as wall
//! clock time in an IANA zone. Ambiguous wall-clock times resolve with
//! jiff's "compatible" strategy:
//!
//! - in a fold (clocks go back) the earlier instant wins;
//! - in a gap (clocks go forward) the time is pushed forward by the length
//!   of the gap, so 02:30 in a 02:00→03:00 gap becomes 03:30.

use jiff::civil::DateTime;
use jiff::tz::TimeZone;
use jiff::Timestamp;

use crate::error::RecurrenceError;

/// Look up an IANA timezone by name.
pub fn resolve_tz(name: &str) -> Result<TimeZone, RecurrenceError> {
    TimeZone::get(name).map_err(|e| RecurrenceError::unknown_timezone(name, e))
}

/// Convert a wall-clock time in `tz_id` to the UTC instant it denotes.
pub fn to_utc(local: DateTime, tz_id: &str) -> Result<Timestamp, RecurrenceError> {
    let tz = resolve_tz(tz_id)?;
    to_utc_in(local, &tz)
}

/// Convert a UTC instant to the wall-clock time it shows in `tz_id`.
pub fn to_local(instant: Timestamp, tz_id: &str) -> Result<DateTime, RecurrenceError> {
    let tz = resolve_tz(tz_id)?;
    Ok(to_local_in(instant, &tz))
}

/// Like [`to_utc`] with an already-resolved zone.
pub fn to_utc_in(local: DateTime, tz: &TimeZone) -> Result<Timestamp, RecurrenceError> {
    let zoned = tz.to_ambiguous_zoned(local).compatible()?;
    Ok(zoned.timestamp())
}

pub fn to_local_in(instant: Timestamp, tz: &TimeZone) -> DateTime {
    tz.to_datetime(instant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn auckland_winter_is_plus_twelve() {
        let local = date(2021, 5, 15).at(13, 30, 0, 0);
        let utc = to_utc(local, "Pacific/Auckland").unwrap();
        assert_eq!(utc.to_string(), "2021-05-15T01:30:00Z");
        assert_eq!(to_local(utc, "Pacific/Auckland").unwrap(), local);
    }

    #[test]
    fn fold_picks_earlier_instant() {
        // 2021-11-07 01:30 happens twice in New York (EDT then EST).
        let local = date(2021, 11, 7).at(1, 30, 0, 0);
        let utc = to_utc(local, "America/New_York").unwrap();
        assert_eq!(utc.to_string(), "2021-11-07T05:30:00Z");
    }

    #[test]
    fn gap_shifts_forward() {
        // 2021-03-14 02:30 does not exist in New York.
        let local = date(2021, 3, 14).at(2, 30, 0, 0);
        let utc = to_utc(local, "America/New_York").unwrap();
        assert_eq!(utc.to_string(), "2021-03-14T07:30:00Z");
        assert_eq!(
            to_local(utc, "America/New_York").unwrap(),
            date(2021, 3, 14).at(3, 30, 0, 0)
        );
    }

    #[test]
    fn round_trip_across_dst_boundary() {
        for local in [
            date(2021, 3, 13).at(23, 0, 0, 0),
            date(2021, 3, 14).at(4, 0, 0, 0),
            date(2021, 11, 6).at(12, 0, 0, 0),
            date(2021, 11, 7).at(3, 0, 0, 0),
        ] {
            let utc = to_utc(local, "America/New_York").unwrap();
            assert_eq!(to_local(utc, "America/New_York").unwrap(), local);
        }
    }

    #[test]
    fn unknown_timezone_is_reported() {
        let local = date(2021, 5, 15).at(13, 30, 0, 0);
        let err = to_utc(local, "Atlantis/Lost_City").unwrap_err();
        assert!(matches!(err, RecurrenceError::UnknownTimezone { ref name, .. } if name == "Atlantis/Lost_City"));
    }
}
