use clap::{Parser, ValueEnum};
use eventdates::rule::{parse_month, parse_week_of_month, parse_weekday};
use eventdates::{
    EventDate, Month, RecurrenceError, RecurrenceRule, SeriesConfig, SeriesManager, StoredRule,
    Weekday,
};
use jiff::civil::DateTime;
use std::process;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Every {
    Weekly,
    Monthly,
    Yearly,
}

#[derive(Parser)]
#[command(
    name = "eventdates",
    about = "Expand a recurring event into concrete dates",
    version
)]
struct Cli {
    /// Local start of the first occurrence (e.g. 2021-05-15T13:30)
    #[arg(long)]
    start: String,

    /// Local end of the first occurrence
    #[arg(long)]
    end: String,

    /// IANA timezone of the event
    #[arg(long, default_value = "UTC")]
    tz: String,

    /// Recurrence frequency. Omit for a one-off event.
    #[arg(long, value_enum, conflicts_with = "rule")]
    every: Option<Every>,

    /// Repeat every N weeks, months or years
    #[arg(long, requires = "every")]
    interval: Option<u32>,

    /// Weekday name (defaults to the weekday of --start)
    #[arg(long, requires = "every")]
    weekday: Option<String>,

    /// Week of the month: 1-4 or "last". Monthly and yearly rules only.
    #[arg(long, requires = "every")]
    week_of_month: Option<String>,

    /// Day of the month (defaults to the day of --start)
    #[arg(long, requires = "every", conflicts_with = "week_of_month")]
    day: Option<u8>,

    /// Month name or number for yearly rules (defaults to the month of --start)
    #[arg(long, requires = "every")]
    month: Option<String>,

    /// Stored rule as JSON, e.g. '{"recurringType":1,"separationCount":1,"dayOfWeek":5}'
    #[arg(long)]
    rule: Option<String>,

    /// Number of dates to generate (defaults to the configured live-date cap)
    #[arg(short, long)]
    n: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Validate the rule and timezone without generating dates
    #[arg(long)]
    check: bool,

    /// Print the rule in words
    #[arg(long)]
    describe: bool,

    /// TOML file with series settings
    #[arg(long)]
    config: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let mut config = match cli.config {
        Some(ref path) => match SeriesConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        },
        None => SeriesConfig::default(),
    };
    if let Some(n) = cli.n {
        config.max_live_dates = n;
    }

    let start = parse_datetime("--start", &cli.start);
    let end = parse_datetime("--end", &cli.end);

    let rule = match build_rule(&cli, start) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    if cli.describe {
        match rule {
            Some(ref r) => println!("{r}"),
            None => println!("once"),
        }
        process::exit(0);
    }

    if cli.check {
        if let Err(e) = eventdates::convert::resolve_tz(&cli.tz) {
            eprintln!("error: {e}");
            process::exit(1);
        }
        println!("\u{2713} valid");
        process::exit(0);
    }

    let manager = SeriesManager::new(config);
    let dates = match manager.create_series(rule.as_ref(), start, end, &cli.tz) {
        Ok(d) => d,
        Err(e) if e.is_empty_result() => {
            eprintln!("no upcoming dates");
            process::exit(0);
        }
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&dates) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: failed to serialize: {e}");
                process::exit(1);
            }
        }
    } else {
        for date in &dates {
            print_date(date);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn parse_datetime(flag: &str, value: &str) -> DateTime {
    match value.parse() {
        Ok(dt) => dt,
        Err(e) => {
            eprintln!("error: invalid {flag} datetime: {e}");
            process::exit(1);
        }
    }
}

fn print_date(date: &EventDate) {
    println!(
        "{} -> {}  ({} .. {})",
        date.start_local, date.end_local, date.start_utc, date.end_utc
    );
}

/// The rule from `--rule` JSON, or assembled from the selector flags.
/// `None` is a one-off.
fn build_rule(cli: &Cli, start: DateTime) -> Result<Option<RecurrenceRule>, RecurrenceError> {
    if let Some(ref json) = cli.rule {
        let stored: StoredRule = json.parse()?;
        return stored.to_rule();
    }

    let Some(every) = cli.every else {
        return Ok(None);
    };
    let interval = cli.interval.unwrap_or(1);

    let weekday = match cli.weekday {
        Some(ref s) => parse_weekday(s)
            .ok_or_else(|| RecurrenceError::invalid(format!("unknown weekday '{s}'")))?,
        None => Weekday::from_jiff(start.weekday()),
    };
    let week = match cli.week_of_month {
        Some(ref s) => Some(parse_week_of_month(s).ok_or_else(|| {
            RecurrenceError::invalid(format!("week of month '{s}' must be 1-4 or last"))
        })?),
        None => None,
    };
    let day = cli.day.unwrap_or(start.day() as u8);
    let month = match cli.month {
        Some(ref s) => {
            parse_month(s).ok_or_else(|| RecurrenceError::invalid(format!("unknown month '{s}'")))?
        }
        None => Month::from_number(start.month() as u8)
            .ok_or_else(|| RecurrenceError::invalid("start month out of range"))?,
    };

    let rule = match (every, week) {
        (Every::Weekly, None) => RecurrenceRule::weekly(weekday, interval)?,
        (Every::Weekly, Some(_)) => {
            return Err(RecurrenceError::invalid(
                "--week-of-month applies to monthly and yearly rules only",
            ))
        }
        (Every::Monthly, Some(w)) => RecurrenceRule::monthly_by_weekday(w, weekday, interval)?,
        (Every::Monthly, None) => RecurrenceRule::monthly_by_day(day, interval)?,
        (Every::Yearly, Some(w)) => {
            RecurrenceRule::yearly_by_weekday(month, w, weekday, interval)?
        }
        (Every::Yearly, None) => RecurrenceRule::yearly_by_day(month, day, interval)?,
    };
    Ok(Some(rule))
}
