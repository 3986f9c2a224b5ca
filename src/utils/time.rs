use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

/// Milliseconds in a day. Every day is treated as exactly this long when converting units.
pub const DAY_MS: i64 = 86_400_000;

/// First instant of `date` in timezone `tz`. Usually that's midnight, but when a DST jump skips
/// midnight the day starts once the clocks resume, looked up in 15 minute steps.
pub fn day_start<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=DAY_QUARTERS)
        .find_map(|quarter| {
            tz.from_local_datetime(&(midnight + Duration::minutes(15 * quarter)))
                .earliest()
        })
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}

const DAY_QUARTERS: i64 = 24 * 4;

/// Number of midnights between `earlier` and `now`, both read in the timezone of `now`. Two
/// moments of the same day are 0 days apart no matter how many hours separate them.
pub fn calendar_day_difference<Tz: TimeZone>(now: &DateTime<Tz>, earlier: &DateTime<Utc>) -> i64 {
    let earlier = earlier.with_timezone(&now.timezone());
    (now.date_naive() - earlier.date_naive()).num_days()
}

/// Whole days left until `end`, rounded up. Never negative.
pub fn days_until<Tz: TimeZone>(end: &DateTime<Tz>, now: &DateTime<Tz>) -> i64 {
    let left = (end.clone() - now.clone()).num_milliseconds();
    if left <= 0 {
        0
    } else {
        (left + DAY_MS - 1) / DAY_MS
    }
}
