use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

/// Wall-clock format the admin types and sees, e.g. "31.12.2025 15:30".
pub const USER_DATETIME_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Parses an admin-entered civil time (fixed offset) into UTC.
/// Impossible calendar dates such as "31.02.2025 10:00" fail here.
pub fn parse_user_datetime(input: &str, tz: FixedOffset) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(input.trim(), USER_DATETIME_FORMAT)
        .map_err(|_| anyhow!("Expected day.month.year hour:minute, e.g. 31.12.2025 15:30"))?;

    let local = naive
        .and_local_timezone(tz)
        .single()
        .ok_or_else(|| anyhow!("Could not resolve the entered time"))?;

    Ok(local.with_timezone(&Utc))
}

/// Renders a UTC instant as civil time in the configured offset.
pub fn format_datetime(dt: DateTime<Utc>, tz: FixedOffset) -> String {
    dt.with_timezone(&tz).format(USER_DATETIME_FORMAT).to_string()
}
