use std::ops::Index;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, SubsecRound, Utc};
use lazy_static::lazy_static;
use regex::Regex;

fn to_int<T: std::str::FromStr>(num_str: &str, date_str: &str) -> Result<T, String> {
    match num_str.parse::<T>() {
        Ok(x) => Ok(x),
        Err(_) => Err(format!("Error parsing {} from the date {}", num_str, date_str)),
    }
}

/// Parses the relaxed `2022-04-02 12:05:00.000` form (milliseconds optional).
pub fn parse_date_time(buf: &str) -> Result<NaiveDateTime, String> {
    lazy_static! {
        static ref DATE_TIME_REGEX: Regex = Regex::new(
            r#"^(\d{4})-(\d{1,2})-(\d{1,2})[ T](\d{1,2}):(\d{1,2}):(\d{1,2})(?:\.(\d{1,3}))?$"#
        ).unwrap();
    }

    let Some(caps) = DATE_TIME_REGEX.captures(buf.trim()) else {
        return Err(format!("Unable to parse date time {}", buf));
    };

    let to_i32 = |num_str: &str| to_int::<i32>(num_str, buf);
    let to_u32 = |num_str: &str| to_int::<u32>(num_str, buf);

    let y: i32 = to_i32(caps.index(1))?;
    let m: u32 = to_u32(caps.index(2))?;
    let d: u32 = to_u32(caps.index(3))?;
    let h: u32 = to_u32(caps.index(4))?;
    let mn: u32 = to_u32(caps.index(5))?;
    let s: u32 = to_u32(caps.index(6))?;
    let ms: u32 = match caps.get(7) {
        // ".5" means 500ms
        Some(frac) => to_u32(&format!("{:0<3}", frac.as_str()))?,
        None => 0,
    };

    let date = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| format!("Invalid date in {}", buf))?;
    let time = NaiveTime::from_hms_milli_opt(h, mn, s, ms)
        .ok_or_else(|| format!("Invalid time in {}", buf))?;

    Ok(NaiveDateTime::new(date, time))
}

/// Accepts RFC 3339 first, then the relaxed form read as UTC.
pub fn parse_timestamp(buf: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(buf.trim()) {
        return Ok(dt.with_timezone(&Utc));
    }
    parse_date_time(buf).map(|naive| naive.and_utc())
}

/// Storage representation of a timestamp: RFC 3339, millisecond precision, UTC.
pub fn format_timestamp(date_time: &DateTime<Utc>) -> String {
    date_time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time truncated to the precision `format_timestamp` keeps.
pub fn now_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

pub fn format_date(date_time: &DateTime<Utc>) -> String {
    date_time.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike};

    use super::*;

    #[test]
    fn test_parse_date_time() {
        let date_time = parse_date_time("2017-09-10 10:42:32.123").unwrap();
        assert_eq!(date_time.format("%Y-%m-%d %H:%M:%S").to_string(), "2017-09-10 10:42:32");
        assert_eq!(date_time.nanosecond(), 123_000_000);

        let date_time = parse_date_time("2017-09-10 10:42:32").unwrap();
        assert_eq!(date_time.format("%Y-%m-%d %H:%M:%S").to_string(), "2017-09-10 10:42:32");

        let date_time = parse_date_time("2017-09-10 10:42:32.5").unwrap();
        assert_eq!(date_time.nanosecond(), 500_000_000);

        assert!(parse_date_time("2017-13-10 10:42:32").is_err());
        assert!(parse_date_time("yesterday").is_err());
    }

    #[test]
    fn test_parse_timestamp() {
        let expected = Utc.with_ymd_and_hms(2024, 4, 2, 10, 5, 0).unwrap();
        assert_eq!(parse_timestamp("2024-04-02T10:05:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-04-02T12:05:00+02:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-04-02 10:05:00.000").unwrap(), expected);
        assert!(parse_timestamp("02/04/2024").is_err());
    }

    #[test]
    fn test_format_timestamp() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(&dt), "2024-01-02T03:04:05.000Z");
        assert_eq!(format_date(&dt), "2024-01-02");

        let now = now_timestamp();
        assert_eq!(parse_timestamp(&format_timestamp(&now)).unwrap(), now);
    }
}
