//! Date and time helpers shared by the date filters and the date sort.
//!
//! Row values carry dates as text (`2025-09-09 11:00:00 AM`). Calendar
//! comparisons only look at the leading date component; hour and minute
//! windows parse the full timestamp.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};

const DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %I:%M %p",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

pub const FISCAL_PERIODS_PER_YEAR: u32 = 4;
const MONTHS_PER_FISCAL_PERIOD: u32 = 12 / FISCAL_PERIODS_PER_YEAR;

/// Leading date component of a raw value: everything before the first space or `T`.
pub fn date_part(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.find([' ', 'T']) {
        Some(idx) => &trimmed[..idx],
        None => trimmed,
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_part(raw), DATE_FORMAT).ok()
}

/// Drops a trailing zone token (`UTC`, `America/New_York`, `+05:00`), keeping the wall-clock time.
fn strip_zone(value: &str) -> &str {
    let Some((head, last)) = value.rsplit_once(' ') else {
        return value;
    };
    let named = last.starts_with(|c: char| c.is_ascii_alphabetic())
        && last
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/_+-".contains(c))
        && !last.eq_ignore_ascii_case("am")
        && !last.eq_ignore_ascii_case("pm");
    let offset = last.starts_with(['+', '-'])
        && last.len() > 1
        && last[1..].chars().all(|c| c.is_ascii_digit() || c == ':');
    if named || offset {
        head.trim_end()
    } else {
        value
    }
}

/// Full timestamp of a raw value. Date-only values resolve to midnight.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = strip_zone(raw.trim());
    if trimmed.is_empty() {
        return None;
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }
    parse_date(trimmed).map(|d| d.and_time(NaiveTime::MIN))
}

/// Sunday that starts the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// Months since year 0, so adjacent calendar months differ by one.
pub fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

/// `date` moved by `months` calendar months, clamping the day to the target month's length.
pub fn shift_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(magnitude)
    } else {
        date.checked_sub_months(magnitude)
    }
}

/// Fiscal years start on `start_month` and are named by the calendar year they start in.
/// Each fiscal year has four three-month periods numbered 1 to 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiscalCalendar {
    start_month: u32,
}

impl Default for FiscalCalendar {
    fn default() -> Self {
        Self { start_month: 1 }
    }
}

impl FiscalCalendar {
    pub fn new(start_month: u32) -> Self {
        Self {
            start_month: start_month.clamp(1, 12),
        }
    }

    pub fn start_month(&self) -> u32 {
        self.start_month
    }

    fn months_into_year(&self, date: NaiveDate) -> u32 {
        (date.month() + 12 - self.start_month) % 12
    }

    pub fn fiscal_year(&self, date: NaiveDate) -> i32 {
        if date.month() >= self.start_month {
            date.year()
        } else {
            date.year() - 1
        }
    }

    pub fn fiscal_period(&self, date: NaiveDate) -> u32 {
        self.months_into_year(date) / MONTHS_PER_FISCAL_PERIOD + 1
    }

    /// Periods since fiscal year 0; adjacent periods differ by one, across year boundaries too.
    pub fn period_index(&self, date: NaiveDate) -> i64 {
        Self::index_of(self.fiscal_period(date), self.fiscal_year(date))
    }

    pub fn index_of(period: u32, year: i32) -> i64 {
        year as i64 * FISCAL_PERIODS_PER_YEAR as i64 + period.saturating_sub(1) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_part() {
        assert_eq!(date_part("2025-09-09 11:00:00 AM"), "2025-09-09");
        assert_eq!(date_part("2025-09-09T00:00:00"), "2025-09-09");
        assert_eq!(date_part("  2025-09-09  "), "2025-09-09");
        assert_eq!(date_part(""), "");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-09-09 11:00:00 AM"), Some(date(2025, 9, 9)));
        assert_eq!(parse_date("2025-02-30"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_parse_datetime_formats() {
        let expected = date(2025, 9, 9).and_hms_opt(23, 5, 0).unwrap();
        assert_eq!(parse_datetime("2025-09-09 11:05:00 PM"), Some(expected));
        assert_eq!(parse_datetime("2025-09-09 23:05:00"), Some(expected));
        assert_eq!(parse_datetime("2025-09-09T23:05:00"), Some(expected));
        assert_eq!(
            parse_datetime("2025-09-09"),
            Some(date(2025, 9, 9).and_time(NaiveTime::MIN))
        );
        assert_eq!(parse_datetime("not a date"), None);
        assert_eq!(parse_datetime("   "), None);
    }

    #[test]
    fn test_parse_datetime_drops_zone_suffix() {
        let expected = date(2025, 9, 9).and_hms_opt(11, 0, 0).unwrap();
        assert_eq!(parse_datetime("2025-09-09 11:00:00 UTC"), Some(expected));
        assert_eq!(
            parse_datetime("2025-09-09 11:00:00 America/New_York"),
            Some(expected)
        );
        assert_eq!(parse_datetime("2025-09-09 11:00:00 +05:00"), Some(expected));
        assert_eq!(
            parse_datetime("2025-09-09 11:00:00.250 UTC").map(|dt| dt.time().hour()),
            Some(11)
        );
        assert_eq!(parse_datetime("2025-09-09 11:00:00 AM"), Some(expected));
    }

    #[test]
    fn test_week_start_is_sunday() {
        // 2025-09-10 is a Wednesday
        assert_eq!(week_start(date(2025, 9, 10)), date(2025, 9, 7));
        assert_eq!(week_start(date(2025, 9, 7)), date(2025, 9, 7));
        assert_eq!(week_start(date(2025, 9, 13)), date(2025, 9, 7));
    }

    #[test]
    fn test_month_index_and_shift() {
        assert_eq!(
            month_index(date(2026, 1, 1)) - month_index(date(2025, 12, 31)),
            1
        );
        assert_eq!(shift_months(date(2025, 1, 31), 1), Some(date(2025, 2, 28)));
        assert_eq!(shift_months(date(2025, 3, 15), -3), Some(date(2024, 12, 15)));
    }

    #[test]
    fn test_fiscal_calendar_january_start() {
        let cal = FiscalCalendar::default();
        assert_eq!(cal.fiscal_year(date(2025, 2, 1)), 2025);
        assert_eq!(cal.fiscal_period(date(2025, 2, 1)), 1);
        assert_eq!(cal.fiscal_period(date(2025, 12, 31)), 4);
    }

    #[test]
    fn test_fiscal_calendar_july_start() {
        let cal = FiscalCalendar::new(7);
        assert_eq!(cal.fiscal_year(date(2025, 7, 1)), 2025);
        assert_eq!(cal.fiscal_year(date(2026, 3, 1)), 2025);
        assert_eq!(cal.fiscal_period(date(2025, 7, 1)), 1);
        assert_eq!(cal.fiscal_period(date(2026, 3, 1)), 3);
        assert_eq!(cal.fiscal_period(date(2026, 6, 30)), 4);
        assert_eq!(
            cal.period_index(date(2026, 7, 1)) - cal.period_index(date(2026, 6, 30)),
            1
        );
    }

    #[test]
    fn test_fiscal_calendar_clamps_start_month() {
        assert_eq!(FiscalCalendar::new(0).start_month(), 1);
        assert_eq!(FiscalCalendar::new(15).start_month(), 12);
    }
}
