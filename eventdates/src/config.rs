use jiff::civil::DateTime;
use jiff::Span;

use crate::error::RecurrenceError;
use crate::rule::RecurrenceRule;

/// Tunables for series generation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct SeriesConfig {
    /// Cap on live future dates per event.
    pub max_live_dates: usize,
    /// Horizon for weekly rules.
    pub weekly_horizon_years: i16,
    /// Horizon for monthly and yearly rules, which produce far fewer dates per year.
    pub long_horizon_years: i16,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            max_live_dates: 10,
            weekly_horizon_years: 2,
            long_horizon_years: 10,
        }
    }
}

impl SeriesConfig {
    /// Latest local start a series anchored at `start` may reach.
    ///
    /// Year arithmetic clamps to the end of the month, so a Feb 29 anchor
    /// gets a Feb 28 horizon in a common year.
    pub fn horizon_for(
        &self,
        rule: Option<&RecurrenceRule>,
        start: DateTime,
    ) -> Result<DateTime, RecurrenceError> {
        let years = match rule {
            Some(r) if !r.frequency().is_weekly() => self.long_horizon_years,
            _ => self.weekly_horizon_years,
        };
        Ok(start.checked_add(Span::new().try_years(years)?)?)
    }
}

#[cfg(feature = "serde")]
impl SeriesConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, RecurrenceError> {
        let config: SeriesConfig =
            toml::from_str(s).map_err(|e| RecurrenceError::config(e.to_string()))?;
        config.validate()
    }

    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, RecurrenceError> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .map_err(|e| RecurrenceError::config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&s)
    }

    fn validate(self) -> Result<Self, RecurrenceError> {
        if self.weekly_horizon_years < 1 || self.long_horizon_years < 1 {
            return Err(RecurrenceError::config("horizons must be at least one year"));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Weekday, WeekOfMonth};
    use jiff::civil::date;

    #[test]
    fn weekly_gets_short_horizon() {
        let config = SeriesConfig::default();
        let start = date(2021, 5, 15).at(13, 30, 0, 0);
        let weekly = RecurrenceRule::weekly(Weekday::Saturday, 1).unwrap();
        assert_eq!(
            config.horizon_for(Some(&weekly), start).unwrap(),
            date(2023, 5, 15).at(13, 30, 0, 0)
        );
    }

    #[test]
    fn monthly_gets_long_horizon() {
        let config = SeriesConfig::default();
        let start = date(2021, 5, 13).at(20, 0, 0, 0);
        let monthly =
            RecurrenceRule::monthly_by_weekday(WeekOfMonth::Second, Weekday::Thursday, 1).unwrap();
        assert_eq!(
            config.horizon_for(Some(&monthly), start).unwrap(),
            date(2031, 5, 13).at(20, 0, 0, 0)
        );
    }

    #[test]
    fn leap_day_horizon_clamps_to_feb_28() {
        let config = SeriesConfig::default();
        let start = date(2024, 2, 29).at(9, 0, 0, 0);
        assert_eq!(
            config.horizon_for(None, start).unwrap(),
            date(2026, 2, 28).at(9, 0, 0, 0)
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn toml_overrides_and_defaults() {
        let config = SeriesConfig::from_toml_str("max_live_dates = 4\n").unwrap();
        assert_eq!(config.max_live_dates, 4);
        assert_eq!(config.weekly_horizon_years, 2);
        assert_eq!(config.long_horizon_years, 10);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn toml_rejects_unknown_keys_and_zero_horizon() {
        assert!(SeriesConfig::from_toml_str("max_dates = 4\n").is_err());
        assert!(SeriesConfig::from_toml_str("weekly_horizon_years = 0\n").is_err());
    }
}
