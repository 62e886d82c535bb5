use crate::error::RecurrenceError;

/// A point on the map, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Result<Self, RecurrenceError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(RecurrenceError::invalid(format!(
                "coordinates ({lat}, {lng}) out of range"
            )));
        }
        Ok(Self { lat, lng })
    }
}

/// Coordinates → IANA timezone id.
///
/// Real deployments back this with a timezone-boundary database; the engine
/// only relies on the contract.
pub trait TimezoneResolver {
    fn timezone_at(&self, location: Location) -> Result<String, RecurrenceError>;
}

/// Resolves every location to the same zone.
#[derive(Debug, Clone)]
pub struct FixedTimezone(pub String);

impl TimezoneResolver for FixedTimezone {
    fn timezone_at(&self, _location: Location) -> Result<String, RecurrenceError> {
        Ok(self.0.clone())
    }
}

/// Resolves to the zone of the nearest reference point in a table.
#[derive(Debug, Clone, Default)]
pub struct NearestTimezone {
    points: Vec<(Location, String)>,
}

impl NearestTimezone {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_point(mut self, location: Location, tz: impl Into<String>) -> Self {
        self.points.push((location, tz.into()));
        self
    }
}

impl TimezoneResolver for NearestTimezone {
    fn timezone_at(&self, location: Location) -> Result<String, RecurrenceError> {
        self.points
            .iter()
            .min_by(|(a, _), (b, _)| {
                great_circle_km(location, *a).total_cmp(&great_circle_km(location, *b))
            })
            .map(|(_, tz)| tz.clone())
            .ok_or_else(|| {
                RecurrenceError::unknown_timezone(
                    format!("({}, {})", location.lat, location.lng),
                    "no reference points configured",
                )
            })
    }
}

/// Haversine distance.
fn great_circle_km(a: Location, b: Location) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlng = (b.lng - a.lng).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> NearestTimezone {
        NearestTimezone::new()
            .with_point(Location::new(-36.85, 174.76).unwrap(), "Pacific/Auckland")
            .with_point(Location::new(51.51, -0.13).unwrap(), "Europe/London")
            .with_point(Location::new(40.71, -74.01).unwrap(), "America/New_York")
    }

    #[test]
    fn nearest_point_wins() {
        let wellington = Location::new(-41.29, 174.78).unwrap();
        assert_eq!(table().timezone_at(wellington).unwrap(), "Pacific/Auckland");

        let boston = Location::new(42.36, -71.06).unwrap();
        assert_eq!(table().timezone_at(boston).unwrap(), "America/New_York");
    }

    #[test]
    fn empty_table_is_unknown_timezone() {
        let err = NearestTimezone::new()
            .timezone_at(Location::new(0.0, 0.0).unwrap())
            .unwrap_err();
        assert!(matches!(err, RecurrenceError::UnknownTimezone { .. }));
    }

    #[test]
    fn fixed_ignores_location() {
        let resolver = FixedTimezone("Europe/Berlin".to_string());
        let anywhere = Location::new(10.0, 10.0).unwrap();
        assert_eq!(resolver.timezone_at(anywhere).unwrap(), "Europe/Berlin");
    }

    #[test]
    fn out_of_range_coordinates() {
        assert!(Location::new(91.0, 0.0).is_err());
        assert!(Location::new(0.0, -181.0).is_err());
    }
}
