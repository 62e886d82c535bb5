#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RecurrenceError;

/// The five effective recurrence shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Frequency {
    Weekly,
    MonthlyByWeekday,
    MonthlyByDayOfMonth,
    YearlyByWeekday,
    YearlyByDayOfMonth,
}

impl Frequency {
    pub fn is_weekly(self) -> bool {
        matches!(self, Self::Weekly)
    }
}

/// What repeats, with exactly the selectors its frequency needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case", tag = "frequency"))]
pub enum Pattern {
    /// `every saturday`
    Weekly { weekday: Weekday },
    /// `second thursday of every month`
    MonthlyByWeekday { week: WeekOfMonth, weekday: Weekday },
    /// `every month on the 31st`
    MonthlyByDayOfMonth { day: u8 },
    /// `last friday of march every year`
    YearlyByWeekday {
        month: Month,
        week: WeekOfMonth,
        weekday: Weekday,
    },
    /// `every year on mar 15`
    YearlyByDayOfMonth { month: Month, day: u8 },
}

/// An immutable, validated recurrence rule.
///
/// A one-off event has no rule at all: use `Option<RecurrenceRule>` and `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RecurrenceRule {
    interval: u32,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pattern: Pattern,
}

impl RecurrenceRule {
    /// Build a rule repeating every `interval` periods (1 = every period).
    pub fn new(pattern: Pattern, interval: u32) -> Result<Self, RecurrenceError> {
        if interval == 0 {
            return Err(RecurrenceError::invalid(
                "interval must be at least 1; a one-off event has no rule",
            ));
        }
        match pattern {
            Pattern::MonthlyByDayOfMonth { day } | Pattern::YearlyByDayOfMonth { day, .. } => {
                if !(1..=31).contains(&day) {
                    return Err(RecurrenceError::invalid(format!(
                        "day of month {day} out of range 1..=31"
                    )));
                }
            }
            Pattern::Weekly { .. }
            | Pattern::MonthlyByWeekday { .. }
            | Pattern::YearlyByWeekday { .. } => {}
        }
        Ok(Self { interval, pattern })
    }

    pub fn weekly(weekday: Weekday, interval: u32) -> Result<Self, RecurrenceError> {
        Self::new(Pattern::Weekly { weekday }, interval)
    }

    pub fn monthly_by_weekday(
        week: WeekOfMonth,
        weekday: Weekday,
        interval: u32,
    ) -> Result<Self, RecurrenceError> {
        Self::new(Pattern::MonthlyByWeekday { week, weekday }, interval)
    }

    pub fn monthly_by_day(day: u8, interval: u32) -> Result<Self, RecurrenceError> {
        Self::new(Pattern::MonthlyByDayOfMonth { day }, interval)
    }

    pub fn yearly_by_weekday(
        month: Month,
        week: WeekOfMonth,
        weekday: Weekday,
        interval: u32,
    ) -> Result<Self, RecurrenceError> {
        Self::new(
            Pattern::YearlyByWeekday {
                month,
                week,
                weekday,
            },
            interval,
        )
    }

    pub fn yearly_by_day(month: Month, day: u8, interval: u32) -> Result<Self, RecurrenceError> {
        Self::new(Pattern::YearlyByDayOfMonth { month, day }, interval)
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    pub fn frequency(&self) -> Frequency {
        match self.pattern {
            Pattern::Weekly { .. } => Frequency::Weekly,
            Pattern::MonthlyByWeekday { .. } => Frequency::MonthlyByWeekday,
            Pattern::MonthlyByDayOfMonth { .. } => Frequency::MonthlyByDayOfMonth,
            Pattern::YearlyByWeekday { .. } => Frequency::YearlyByWeekday,
            Pattern::YearlyByDayOfMonth { .. } => Frequency::YearlyByDayOfMonth,
        }
    }

    pub fn weekday(&self) -> Option<Weekday> {
        match self.pattern {
            Pattern::Weekly { weekday }
            | Pattern::MonthlyByWeekday { weekday, .. }
            | Pattern::YearlyByWeekday { weekday, .. } => Some(weekday),
            _ => None,
        }
    }

    pub fn week_of_month(&self) -> Option<WeekOfMonth> {
        match self.pattern {
            Pattern::MonthlyByWeekday { week, .. } | Pattern::YearlyByWeekday { week, .. } => {
                Some(week)
            }
            _ => None,
        }
    }

    pub fn day_of_month(&self) -> Option<u8> {
        match self.pattern {
            Pattern::MonthlyByDayOfMonth { day } | Pattern::YearlyByDayOfMonth { day, .. } => {
                Some(day)
            }
            _ => None,
        }
    }

    pub fn month_of_year(&self) -> Option<Month> {
        match self.pattern {
            Pattern::YearlyByWeekday { month, .. } | Pattern::YearlyByDayOfMonth { month, .. } => {
                Some(month)
            }
            _ => None,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for RecurrenceRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Unchecked {
            interval: u32,
            #[serde(flatten)]
            pattern: Pattern,
        }
        // Route through `new` so a deserialized rule is as valid as a built one.
        let raw = Unchecked::deserialize(deserializer)?;
        RecurrenceRule::new(raw.pattern, raw.interval).map_err(serde::de::Error::custom)
    }
}

/// Which occurrence of a weekday inside a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WeekOfMonth {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl WeekOfMonth {
    /// Storage code: 1..=4, and 10 for "last".
    pub const LAST_CODE: i64 = 10;

    pub fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Second => "second",
            Self::Third => "third",
            Self::Fourth => "fourth",
            Self::Last => "last",
        }
    }

    /// Argument for `Date::nth_weekday_of_month` (negative counts from the end).
    pub fn nth(self) -> i8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
            Self::Fourth => 4,
            Self::Last => -1,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Last => Self::LAST_CODE,
            other => other.nth() as i64,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::First),
            2 => Some(Self::Second),
            3 => Some(Self::Third),
            4 => Some(Self::Fourth),
            Self::LAST_CODE => Some(Self::Last),
            _ => None,
        }
    }
}

pub fn parse_week_of_month(s: &str) -> Option<WeekOfMonth> {
    match s.to_lowercase().as_str() {
        "1" | "1st" | "first" => Some(WeekOfMonth::First),
        "2" | "2nd" | "second" => Some(WeekOfMonth::Second),
        "3" | "3rd" | "third" => Some(WeekOfMonth::Third),
        "4" | "4th" | "fourth" => Some(WeekOfMonth::Fourth),
        "last" | "10" => Some(WeekOfMonth::Last),
        _ => None,
    }
}

/// Weekday with custom serde (lowercase string).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }

    pub fn to_jiff(self) -> jiff::civil::Weekday {
        match self {
            Self::Monday => jiff::civil::Weekday::Monday,
            Self::Tuesday => jiff::civil::Weekday::Tuesday,
            Self::Wednesday => jiff::civil::Weekday::Wednesday,
            Self::Thursday => jiff::civil::Weekday::Thursday,
            Self::Friday => jiff::civil::Weekday::Friday,
            Self::Saturday => jiff::civil::Weekday::Saturday,
            Self::Sunday => jiff::civil::Weekday::Sunday,
        }
    }

    pub fn from_jiff(wd: jiff::civil::Weekday) -> Self {
        match wd {
            jiff::civil::Weekday::Monday => Self::Monday,
            jiff::civil::Weekday::Tuesday => Self::Tuesday,
            jiff::civil::Weekday::Wednesday => Self::Wednesday,
            jiff::civil::Weekday::Thursday => Self::Thursday,
            jiff::civil::Weekday::Friday => Self::Friday,
            jiff::civil::Weekday::Saturday => Self::Saturday,
            jiff::civil::Weekday::Sunday => Self::Sunday,
        }
    }

    /// Storage number: Monday=0, Sunday=6.
    pub fn number(self) -> u8 {
        match self {
            Self::Monday => 0,
            Self::Tuesday => 1,
            Self::Wednesday => 2,
            Self::Thursday => 3,
            Self::Friday => 4,
            Self::Saturday => 5,
            Self::Sunday => 6,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            0 => Some(Self::Monday),
            1 => Some(Self::Tuesday),
            2 => Some(Self::Wednesday),
            3 => Some(Self::Thursday),
            4 => Some(Self::Friday),
            5 => Some(Self::Saturday),
            6 => Some(Self::Sunday),
            _ => None,
        }
    }
}

#[cfg(feature = "serde")]
impl Serialize for Weekday {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Weekday {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_weekday(&s).ok_or_else(|| serde::de::Error::custom(format!("unknown weekday: {s}")))
    }
}

pub fn parse_weekday(s: &str) -> Option<Weekday> {
    match s.to_lowercase().as_str() {
        "monday" | "mon" => Some(Weekday::Monday),
        "tuesday" | "tue" => Some(Weekday::Tuesday),
        "wednesday" | "wed" => Some(Weekday::Wednesday),
        "thursday" | "thu" => Some(Weekday::Thursday),
        "friday" | "fri" => Some(Weekday::Friday),
        "saturday" | "sat" => Some(Weekday::Saturday),
        "sunday" | "sun" => Some(Weekday::Sunday),
        _ => None,
    }
}

/// Month of the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::January => "jan",
            Self::February => "feb",
            Self::March => "mar",
            Self::April => "apr",
            Self::May => "may",
            Self::June => "jun",
            Self::July => "jul",
            Self::August => "aug",
            Self::September => "sep",
            Self::October => "oct",
            Self::November => "nov",
            Self::December => "dec",
        }
    }

    pub fn full_name(self) -> &'static str {
        match self {
            Self::January => "january",
            Self::February => "february",
            Self::March => "march",
            Self::April => "april",
            Self::May => "may",
            Self::June => "june",
            Self::July => "july",
            Self::August => "august",
            Self::September => "september",
            Self::October => "october",
            Self::November => "november",
            Self::December => "december",
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Self::January => 1,
            Self::February => 2,
            Self::March => 3,
            Self::April => 4,
            Self::May => 5,
            Self::June => 6,
            Self::July => 7,
            Self::August => 8,
            Self::September => 9,
            Self::October => 10,
            Self::November => 11,
            Self::December => 12,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::January),
            2 => Some(Self::February),
            3 => Some(Self::March),
            4 => Some(Self::April),
            5 => Some(Self::May),
            6 => Some(Self::June),
            7 => Some(Self::July),
            8 => Some(Self::August),
            9 => Some(Self::September),
            10 => Some(Self::October),
            11 => Some(Self::November),
            12 => Some(Self::December),
            _ => None,
        }
    }
}

pub fn parse_month(s: &str) -> Option<Month> {
    let s = s.to_lowercase();
    if let Ok(n) = s.parse::<u8>() {
        return Month::from_number(n);
    }
    match s.as_str() {
        "january" | "jan" => Some(Month::January),
        "february" | "feb" => Some(Month::February),
        "march" | "mar" => Some(Month::March),
        "april" | "apr" => Some(Month::April),
        "may" => Some(Month::May),
        "june" | "jun" => Some(Month::June),
        "july" | "jul" => Some(Month::July),
        "august" | "aug" => Some(Month::August),
        "september" | "sep" => Some(Month::September),
        "october" | "oct" => Some(Month::October),
        "november" | "nov" => Some(Month::November),
        "december" | "dec" => Some(Month::December),
        _ => None,
    }
}

/// Recurrence rule as persisted by the storage layer (one row per event).
///
/// Field names and codes follow the stored representation:
/// `recurring_type` 1=weekly, 2=monthly, 3=yearly; `separation_count` 0
/// marks a one-off; `day_of_week` 0=Monday..6=Sunday; `week_of_month`
/// 1..=4 or 10 for "last".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct StoredRule {
    pub recurring_type: i64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub separation_count: Option<i64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub day_of_week: Option<i64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub week_of_month: Option<i64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub day_of_month: Option<i64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub month_of_year: Option<i64>,
}

impl StoredRule {
    pub const WEEKLY: i64 = 1;
    pub const MONTHLY: i64 = 2;
    pub const YEARLY: i64 = 3;

    /// Convert to a rule; `Ok(None)` means the event does not recur.
    pub fn to_rule(&self) -> Result<Option<RecurrenceRule>, RecurrenceError> {
        let interval = match self.separation_count {
            None | Some(0) => return Ok(None),
            Some(n) if n < 0 => {
                return Err(RecurrenceError::invalid(format!(
                    "separation count {n} is negative"
                )))
            }
            Some(n) => u32::try_from(n).map_err(|_| {
                RecurrenceError::invalid(format!("separation count {n} is too large"))
            })?,
        };

        let pattern = match self.recurring_type {
            Self::WEEKLY => Pattern::Weekly {
                weekday: self.weekday()?,
            },
            Self::MONTHLY => match self.week_of_month {
                Some(code) => Pattern::MonthlyByWeekday {
                    week: week_from_code(code)?,
                    weekday: self.weekday()?,
                },
                None => Pattern::MonthlyByDayOfMonth {
                    day: self.day()?,
                },
            },
            Self::YEARLY => {
                let month = self.month()?;
                match self.week_of_month {
                    Some(code) => Pattern::YearlyByWeekday {
                        month,
                        week: week_from_code(code)?,
                        weekday: self.weekday()?,
                    },
                    None => Pattern::YearlyByDayOfMonth {
                        month,
                        day: self.day()?,
                    },
                }
            }
            other => {
                return Err(RecurrenceError::invalid(format!(
                    "unknown recurring type {other}; expected 1 (weekly), 2 (monthly) or 3 (yearly)"
                )))
            }
        };

        RecurrenceRule::new(pattern, interval).map(Some)
    }

    fn weekday(&self) -> Result<Weekday, RecurrenceError> {
        let n = self
            .day_of_week
            .ok_or_else(|| RecurrenceError::invalid("rule requires a day of week"))?;
        u8::try_from(n)
            .ok()
            .and_then(Weekday::from_number)
            .ok_or_else(|| RecurrenceError::invalid(format!("day of week {n} out of range 0..=6")))
    }

    fn day(&self) -> Result<u8, RecurrenceError> {
        let n = self
            .day_of_month
            .ok_or_else(|| RecurrenceError::invalid("rule requires a day of month"))?;
        u8::try_from(n)
            .ok()
            .filter(|d| (1..=31).contains(d))
            .ok_or_else(|| {
                RecurrenceError::invalid(format!("day of month {n} out of range 1..=31"))
            })
    }

    fn month(&self) -> Result<Month, RecurrenceError> {
        let n = self
            .month_of_year
            .ok_or_else(|| RecurrenceError::invalid("yearly rule requires a month of year"))?;
        u8::try_from(n)
            .ok()
            .and_then(Month::from_number)
            .ok_or_else(|| {
                RecurrenceError::invalid(format!("month of year {n} out of range 1..=12"))
            })
    }
}

fn week_from_code(code: i64) -> Result<WeekOfMonth, RecurrenceError> {
    WeekOfMonth::from_code(code).ok_or_else(|| {
        RecurrenceError::invalid(format!(
            "week of month {code} invalid; expected 1..=4 or 10 (last)"
        ))
    })
}

impl From<&RecurrenceRule> for StoredRule {
    fn from(rule: &RecurrenceRule) -> Self {
        let recurring_type = match rule.frequency() {
            Frequency::Weekly => Self::WEEKLY,
            Frequency::MonthlyByWeekday | Frequency::MonthlyByDayOfMonth => Self::MONTHLY,
            Frequency::YearlyByWeekday | Frequency::YearlyByDayOfMonth => Self::YEARLY,
        };
        StoredRule {
            recurring_type,
            separation_count: Some(rule.interval() as i64),
            day_of_week: rule.weekday().map(|w| w.number() as i64),
            week_of_month: rule.week_of_month().map(WeekOfMonth::code),
            day_of_month: rule.day_of_month().map(|d| d as i64),
            month_of_year: rule.month_of_year().map(|m| m.number() as i64),
        }
    }
}
