use std::fmt;

use crate::rule::*;

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interval = self.interval();
        match self.pattern() {
            Pattern::Weekly { weekday } => {
                if interval > 1 {
                    write!(f, "every {interval} weeks on {}", weekday.as_str())
                } else {
                    write!(f, "every {}", weekday.as_str())
                }
            }
            Pattern::MonthlyByWeekday { week, weekday } => {
                write!(f, "{} {} of every ", week.as_str(), weekday.as_str())?;
                if interval > 1 {
                    write!(f, "{interval} months")
                } else {
                    write!(f, "month")
                }
            }
            Pattern::MonthlyByDayOfMonth { day } => {
                if interval > 1 {
                    write!(f, "every {interval} months")?;
                } else {
                    write!(f, "every month")?;
                }
                write!(f, " on the {}", ordinal_day(day))
            }
            Pattern::YearlyByWeekday {
                month,
                week,
                weekday,
            } => {
                write!(
                    f,
                    "{} {} of {} every ",
                    week.as_str(),
                    weekday.as_str(),
                    month.full_name()
                )?;
                if interval > 1 {
                    write!(f, "{interval} years")
                } else {
                    write!(f, "year")
                }
            }
            Pattern::YearlyByDayOfMonth { month, day } => {
                if interval > 1 {
                    write!(f, "every {interval} years")?;
                } else {
                    write!(f, "every year")?;
                }
                write!(f, " on {} {day}", month.as_str())
            }
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for WeekOfMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `1st`, `2nd`, `3rd`, `4th`, ..., `21st`, `31st`.
fn ordinal_day(day: u8) -> String {
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{day}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekly() {
        let rule = RecurrenceRule::weekly(Weekday::Saturday, 1).unwrap();
        assert_eq!(rule.to_string(), "every saturday");
        let rule = RecurrenceRule::weekly(Weekday::Saturday, 2).unwrap();
        assert_eq!(rule.to_string(), "every 2 weeks on saturday");
    }

    #[test]
    fn monthly() {
        let rule =
            RecurrenceRule::monthly_by_weekday(WeekOfMonth::Second, Weekday::Thursday, 1).unwrap();
        assert_eq!(rule.to_string(), "second thursday of every month");
        let rule = RecurrenceRule::monthly_by_day(31, 1).unwrap();
        assert_eq!(rule.to_string(), "every month on the 31st");
        let rule = RecurrenceRule::monthly_by_day(12, 3).unwrap();
        assert_eq!(rule.to_string(), "every 3 months on the 12th");
    }

    #[test]
    fn yearly() {
        let rule =
            RecurrenceRule::yearly_by_weekday(Month::March, WeekOfMonth::Last, Weekday::Friday, 1)
                .unwrap();
        assert_eq!(rule.to_string(), "last friday of march every year");
        let rule = RecurrenceRule::yearly_by_day(Month::March, 15, 2).unwrap();
        assert_eq!(rule.to_string(), "every 2 years on mar 15");
    }

    #[test]
    fn ordinal_suffixes() {
        let got: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 23, 31]
            .into_iter()
            .map(ordinal_day)
            .collect();
        assert_eq!(
            got,
            ["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "23rd", "31st"]
        );
    }
}
