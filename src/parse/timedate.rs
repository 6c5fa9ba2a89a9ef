//! Time and date token parsing.
//!
//! The two card layouts genuinely use different time formats: single-meeting
//! cards put a space before the meridiem ("6:35 pm"), the meeting patterns
//! table does not ("6:30PM"). Single-meeting date ranges omit the year and are
//! stamped with the contextual term year; table date ranges carry it.

use chrono::{NaiveDate, NaiveTime};

/// Parse a single-meeting time token ("h:mm am/pm").
///
/// Returns `None` on any mismatch — the caller uses the failure itself to
/// detect the multi-meeting layout.
pub fn parse_time_single(token: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(token, "%I:%M %p").ok()
}

/// Parse a meeting-table time token ("h:mmAM/PM"); `"-"` means no time.
pub fn parse_time_table(token: &str) -> Result<Option<NaiveTime>, String> {
    if token == "-" {
        return Ok(None);
    }
    NaiveTime::parse_from_str(token, "%I:%M%p")
        .map(Some)
        .map_err(|e| format!("bad table time '{token}': {e}"))
}

/// Parse a yearless date range ("mm/dd - mm/dd") against the term year.
///
/// Month and day are resolved numerically against the real year, so a
/// `02/29` endpoint is valid whenever the term year is a leap year.
pub fn parse_date_range_in_year(
    token: &str,
    year: i32,
) -> Result<(NaiveDate, NaiveDate), String> {
    let (start, end) = token
        .split_once(" - ")
        .ok_or_else(|| format!("bad date range '{token}'"))?;
    Ok((month_day(start, year)?, month_day(end, year)?))
}

fn month_day(s: &str, year: i32) -> Result<NaiveDate, String> {
    let (month, day) = s
        .split_once('/')
        .ok_or_else(|| format!("bad date '{s}'"))?;
    let month: u32 = month.parse().map_err(|_| format!("bad month in '{s}'"))?;
    let day: u32 = day.parse().map_err(|_| format!("bad day in '{s}'"))?;
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("date '{s}' does not exist in {year}"))
}

/// Parse a meeting-table date range ("mm/dd/yyyy - mm/dd/yyyy").
pub fn parse_date_range_full(token: &str) -> Result<(NaiveDate, NaiveDate), String> {
    let (start, end) = token
        .split_once(" - ")
        .ok_or_else(|| format!("bad date range '{token}'"))?;
    let parse = |s: &str| {
        NaiveDate::parse_from_str(s, "%m/%d/%Y").map_err(|e| format!("bad date '{s}': {e}"))
    };
    Ok((parse(start)?, parse(end)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_time_with_space() {
        assert_eq!(
            parse_time_single("6:35 pm"),
            NaiveTime::from_hms_opt(18, 35, 0)
        );
        assert_eq!(
            parse_time_single("10:10 am"),
            NaiveTime::from_hms_opt(10, 10, 0)
        );
    }

    #[test]
    fn single_time_rejects_table_format() {
        assert_eq!(parse_time_single("6:30PM"), None);
        assert_eq!(parse_time_single("-"), None);
    }

    #[test]
    fn table_time_without_space() {
        assert_eq!(
            parse_time_table("6:30PM").unwrap(),
            NaiveTime::from_hms_opt(18, 30, 0)
        );
        assert_eq!(parse_time_table("-").unwrap(), None);
        assert!(parse_time_table("6:30 pm").is_err());
    }

    #[test]
    fn yearless_range_gets_term_year() {
        let (start, end) = parse_date_range_in_year("01/13 - 04/28", 2025).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 1, 13).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 4, 28).unwrap());
    }

    #[test]
    fn leap_day_resolves_in_leap_year() {
        let (start, _) = parse_date_range_in_year("02/29 - 05/01", 2024).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn leap_day_rejected_in_common_year() {
        assert!(parse_date_range_in_year("02/29 - 05/01", 2025).is_err());
    }

    #[test]
    fn full_range_carries_its_own_year() {
        let (start, end) = parse_date_range_full("01/15/2025 - 03/05/2025").unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
    }
}
