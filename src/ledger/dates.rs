use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

/// Reduces a recorded instant to the calendar day used throughout the engine.
///
/// All balance, availability, and scheduling comparisons happen at day
/// granularity; reducing to [`NaiveDate`] first means no host timezone can
/// shift a transaction into a neighbouring day.
pub fn day_of(instant: DateTime<Utc>) -> NaiveDate {
    instant.date_naive()
}

/// Reconstructs a calendar day as a UTC start-of-day instant.
pub fn start_of_day_utc(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_opt(0, 0, 0).unwrap().and_utc()
}

/// First day of the calendar month containing `day`.
pub fn month_start(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap()
}

/// First day of the month after the one containing `day`.
///
/// Month windows are half-open `[month_start, month_end_exclusive)`, so a
/// transaction dated anywhere on the final day of the month is inside the
/// window.
pub fn month_end_exclusive(day: NaiveDate) -> NaiveDate {
    let (year, month) = if day.month() == 12 {
        (day.year() + 1, 1)
    } else {
        (day.year(), day.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

/// Returns whether `day` falls within the calendar month containing `reference`.
pub fn in_month(day: NaiveDate, reference: NaiveDate) -> bool {
    day.year() == reference.year() && day.month() == reference.month()
}

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    let last_current = first_next - Duration::days(1);
    last_current.day()
}

/// Last calendar day of the given month.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))
}

/// Zero-based month index counted from year 0, used for interval alignment.
pub fn month_index(day: NaiveDate) -> i64 {
    day.year() as i64 * 12 + day.month() as i64 - 1
}

/// Resolves a zero-based month index back to `(year, month)`.
pub fn month_from_index(index: i64) -> (i32, u32) {
    (index.div_euclid(12) as i32, (index.rem_euclid(12) + 1) as u32)
}

/// Monday of the week containing `day`, the anchor used for weekly cycles.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    let delta = day.weekday().num_days_from_monday() as i64;
    day - Duration::days(delta)
}
