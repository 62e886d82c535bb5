//! Basic eventdates walkthrough: build a rule, generate a series, extend it,
//! then move the event to another timezone.

use eventdates::{DateId, RecurrenceRule, SeriesManager, StoredDate, StoredRule};
use jiff::civil::date;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A rule as it comes out of storage: every Saturday.
    let stored: StoredRule = r#"{"recurringType": 1, "separationCount": 1, "dayOfWeek": 5}"#.parse()?;
    let rule: RecurrenceRule = stored.to_rule()?.ok_or("rule does not recur")?;
    println!("Rule: {rule}");

    // Generate the first series.
    let manager = SeriesManager::default();
    let start = date(2021, 5, 15).at(13, 30, 0, 0);
    let end = date(2021, 5, 15).at(15, 30, 0, 0);
    let dates = manager.create_series(Some(&rule), start, end, "Pacific/Auckland")?;
    println!("\nCreated {} dates:", dates.len());
    for d in &dates {
        println!("  {} (UTC {})", d.start_local, d.start_utc);
    }

    // Pretend storage assigned ids and two dates have since passed.
    let stored_dates: Vec<StoredDate> = dates
        .iter()
        .zip(1..)
        .map(|(d, id)| StoredDate {
            id: DateId(id),
            start_local: d.start_local,
            end_local: d.end_local,
            start_utc: d.start_utc,
        })
        .collect();
    let now = stored_dates[1].start_utc;
    let upcoming: Vec<StoredDate> = stored_dates
        .iter()
        .filter(|d| d.is_upcoming(now))
        .cloned()
        .collect();

    let added = manager.extend_series(&upcoming, &rule, "Pacific/Auckland")?;
    println!("\nExtended with {} dates:", added.len());
    for d in &added {
        println!("  {}", d.start_local);
    }

    // The event moves to New York: upcoming dates are replaced.
    let change = manager.regenerate_series(
        &stored_dates,
        Some(&rule),
        date(2021, 6, 5).at(13, 30, 0, 0),
        date(2021, 6, 5).at(15, 30, 0, 0),
        "America/New_York",
        now,
    )?;
    println!(
        "\nRegenerated: delete {} ids, create {} dates starting {}",
        change.delete.len(),
        change.create.len(),
        change.create[0].start_utc
    );

    Ok(())
}
