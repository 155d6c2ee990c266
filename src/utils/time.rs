use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// Shortest sleep the scheduler will take between runs
pub const MIN_WAIT_SECONDS: u64 = 60;

/// Parse time string in HH:MM format
pub fn parse_time(time_str: &str) -> Option<(u32, u32)> {
    let parts: Vec<&str> = time_str.split(':').collect();
    if parts.len() != 2 {
        return None;
    }
    let hour = parts[0].parse::<u32>().ok()?;
    let minute = parts[1].parse::<u32>().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

/// Resolve a wall-clock time on a given date, skipping forward over DST gaps
fn at_time_on<T: TimeZone>(tz: &T, date: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<T>> {
    let naive = date.and_hms_opt(hour, minute, 0)?;
    match tz.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) => Some(dt),
        chrono::LocalResult::Ambiguous(earliest, _) => Some(earliest),
        chrono::LocalResult::None => {
            let shifted = naive.checked_add_signed(Duration::hours(1))?;
            tz.from_local_datetime(&shifted).earliest()
        }
    }
}

/// Calculate the next occurrence of a daily HH:MM time strictly after `current_time`
pub fn next_daily_time<T: TimeZone>(current_time: &DateTime<T>, time_str: &str) -> Option<DateTime<T>> {
    let (hour, minute) = parse_time(time_str)?;
    let tz = current_time.timezone();
    let today = current_time.date_naive();

    let next = at_time_on(&tz, today, hour, minute)?;

    // If the time has already passed today, schedule for tomorrow
    if next <= *current_time {
        let tomorrow = today.succ_opt()?;
        return at_time_on(&tz, tomorrow, hour, minute);
    }

    Some(next)
}

/// Next daily trigger in the configured timezone, or local time when none is set
pub fn next_run_after(now: DateTime<Utc>, timezone: Option<Tz>, time_str: &str) -> Option<DateTime<Utc>> {
    match timezone {
        Some(tz) => next_daily_time(&now.with_timezone(&tz), time_str).map(|dt| dt.with_timezone(&Utc)),
        None => next_daily_time(&now.with_timezone(&Local), time_str).map(|dt| dt.with_timezone(&Utc)),
    }
}

/// Calculate how long to sleep until the next run
pub fn calculate_wait_duration(now: &DateTime<Utc>, next_time: &DateTime<Utc>) -> std::time::Duration {
    match next_time.signed_duration_since(*now).to_std() {
        Ok(wait) if !wait.is_zero() => wait,
        // Close to or past the target, wait a minimum amount instead
        _ => std::time::Duration::from_secs(MIN_WAIT_SECONDS),
    }
}

/// Query window covering the next 24 hours
pub fn next_24_hours(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (now, now + Duration::hours(24))
}
