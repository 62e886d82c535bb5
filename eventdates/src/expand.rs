use jiff::civil::{Date, DateTime, Time};
use jiff::{SignedDuration, Span};
use tracing::debug;

use crate::error::RecurrenceError;
use crate::rule::{Month, Pattern, RecurrenceRule, WeekOfMonth, Weekday};

/// Upper bound on periods visited by one expansion. The horizon stops every
/// realistic rule long before this.
const MAX_PERIODS: i64 = 100_000;

/// One generated occurrence, in local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Occurrence {
    pub start: DateTime,
    pub end: DateTime,
}

impl Occurrence {
    pub fn duration(&self) -> SignedDuration {
        self.start.duration_until(self.end)
    }
}

/// Expand `rule` from the anchor `(start, end)` into concrete occurrences.
///
/// - `None` is a one-off: exactly `[(start, end)]` comes back, whatever
///   `horizon`, `max_count` and `skip_first` say.
/// - Every occurrence starts at or after `start` and no later than `horizon`
///   and lasts exactly `end - start`.
/// - At most `max_count` occurrences are returned, in increasing start order.
/// - With `skip_first`, the anchor itself is not re-emitted; the cap then
///   counts only new occurrences.
///
/// The anchor need not match the rule: a weekly rule for saturday anchored on
/// a wednesday starts on the following saturday.
pub fn expand(
    rule: Option<&RecurrenceRule>,
    start: DateTime,
    end: DateTime,
    horizon: DateTime,
    max_count: usize,
    skip_first: bool,
) -> Result<Vec<Occurrence>, RecurrenceError> {
    if end < start {
        return Err(RecurrenceError::invalid(format!(
            "anchor end {end} is before start {start}"
        )));
    }

    let rule = match rule {
        Some(rule) => rule,
        None => return Ok(vec![Occurrence { start, end }]),
    };

    let occurrences = Occurrences::new(rule, start, end, horizon)
        .skip_anchor(skip_first)
        .take(max_count)
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        frequency = ?rule.frequency(),
        interval = rule.interval(),
        %start,
        %horizon,
        count = occurrences.len(),
        "expanded recurrence"
    );
    Ok(occurrences)
}

/// Lazy iterator over a rule's occurrences from an anchor up to a horizon.
pub struct Occurrences {
    rule: RecurrenceRule,
    anchor: DateTime,
    duration: SignedDuration,
    horizon: DateTime,
    skip_anchor: bool,
    period: i64,
    done: bool,
}

impl Occurrences {
    pub fn new(rule: &RecurrenceRule, start: DateTime, end: DateTime, horizon: DateTime) -> Self {
        Self {
            rule: *rule,
            anchor: start,
            duration: start.duration_until(end),
            horizon,
            skip_anchor: false,
            period: 0,
            done: false,
        }
    }

    /// Do not yield an occurrence starting exactly at the anchor.
    pub fn skip_anchor(mut self, skip: bool) -> Self {
        self.skip_anchor = skip;
        self
    }

    fn finish(&mut self) -> Option<Result<Occurrence, RecurrenceError>> {
        self.done = true;
        None
    }
}

impl Iterator for Occurrences {
    type Item = Result<Occurrence, RecurrenceError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done && self.period < MAX_PERIODS {
            let k = self.period;
            self.period += 1;

            // Arithmetic can only fail past year 9999, which is past any horizon.
            let (period_start, candidate) = match period_candidate(&self.rule, self.anchor.date(), k)
            {
                Ok(found) => found,
                Err(_) => return self.finish(),
            };
            if period_start.to_datetime(Time::midnight()) > self.horizon {
                return self.finish();
            }

            let Some(date) = candidate else {
                continue;
            };
            let start = date.to_datetime(self.anchor.time());
            if start > self.horizon {
                return self.finish();
            }
            if start < self.anchor || (self.skip_anchor && start == self.anchor) {
                continue;
            }

            return match start.checked_add(self.duration) {
                Ok(end) => Some(Ok(Occurrence { start, end })),
                Err(e) => {
                    self.done = true;
                    Some(Err(e.into()))
                }
            };
        }
        self.finish()
    }
}

/// The first day of period `k` and the date the rule selects inside it, if any.
///
/// Periods are weeks, months or years counted from the anchor's period in
/// steps of the rule's interval.
fn period_candidate(
    rule: &RecurrenceRule,
    anchor: Date,
    k: i64,
) -> Result<(Date, Option<Date>), RecurrenceError> {
    let step = k * rule.interval() as i64;
    match rule.pattern() {
        Pattern::Weekly { weekday } => {
            let weeks = Span::new().try_days(step * 7)?;
            let date = first_on_or_after(anchor, weekday)?.checked_add(weeks)?;
            Ok((date, Some(date)))
        }
        Pattern::MonthlyByWeekday { week, weekday } => {
            let first = anchor
                .first_of_month()
                .checked_add(Span::new().try_months(step)?)?;
            Ok((first, Some(nth_weekday_in_month(first, week, weekday)?)))
        }
        Pattern::MonthlyByDayOfMonth { day } => {
            let first = anchor
                .first_of_month()
                .checked_add(Span::new().try_months(step)?)?;
            Ok((first, day_in_month(first, day)))
        }
        Pattern::YearlyByWeekday {
            month,
            week,
            weekday,
        } => {
            let first =
                first_of(anchor.year(), month)?.checked_add(Span::new().try_years(step)?)?;
            Ok((first, Some(nth_weekday_in_month(first, week, weekday)?)))
        }
        Pattern::YearlyByDayOfMonth { month, day } => {
            let first =
                first_of(anchor.year(), month)?.checked_add(Span::new().try_years(step)?)?;
            Ok((first, day_in_month(first, day)))
        }
    }
}

/// The first `weekday` on or after `date`.
fn first_on_or_after(date: Date, weekday: Weekday) -> Result<Date, RecurrenceError> {
    let offset = (weekday.to_jiff().to_monday_zero_offset()
        - date.weekday().to_monday_zero_offset())
    .rem_euclid(7);
    Ok(date.checked_add(Span::new().try_days(offset)?)?)
}

fn first_of(year: i16, month: Month) -> Result<Date, RecurrenceError> {
    Ok(Date::new(year, month.number() as i8, 1)?)
}

/// `day` of the month starting at `first`, or `None` when the month is too
/// short. Never clamps or rolls over into the next month.
fn day_in_month(first: Date, day: u8) -> Option<Date> {
    if (day as i8) > first.days_in_month() {
        return None;
    }
    Date::new(first.year(), first.month(), day as i8).ok()
}

/// The `week`-th `weekday` of the month starting at `first`; `Last` is the
/// final one whether the month holds four or five of them.
fn nth_weekday_in_month(
    first: Date,
    week: WeekOfMonth,
    weekday: Weekday,
) -> Result<Date, RecurrenceError> {
    Ok(first.nth_weekday_of_month(week.nth(), weekday.to_jiff())?)
}
