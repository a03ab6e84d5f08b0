//! Date expression parsing and printing
//!
//! A parsed [`DateValue`] remembers the granularity it was anchored to and the
//! exact pattern (or phrase) that produced it, so printing can regenerate the
//! same phrasing: a value parsed from `"last month"` prints as
//! `"last month"` for as long as it still is last month.
//!
//! # Parser Priority
//!
//! ```text
//! day → month → year → week → time of day → ISO 8601 / RFC 2822 fallback
//! ```
//!
//! The first parser that accepts the input wins. Formats overlap, so the order
//! is part of the contract: a bare month name must never reach the year parser.
//!
//! Patterns are matched strictly: a pattern accepts an input only when
//! formatting the parsed value with that same pattern reproduces the input.

use super::error::{DateParseError, DateResult};
use super::granularity::{midnight, Granularity};
use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc,
};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

const ISO_8601: &str = "ISO_8601";
const RFC_2822: &str = "RFC_2822";
const WEEK_NUMBER: &str = "week N";

static WEEK_NUMBER_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^week (\d{1,2})$").ok());

const DAY_KEYWORDS: [(&str, i64); 3] = [("today", 0), ("yesterday", -1), ("tomorrow", 1)];
const RELATIVE_WORDS: [&str; 3] = ["this", "last", "next"];

/// A named date pattern and its chrono rendering
struct Pattern {
    name: &'static str,
    chrono: &'static str,
}

const fn pattern(name: &'static str, chrono: &'static str) -> Pattern {
    Pattern { name, chrono }
}

const WEEKDAY_PATTERNS: &[Pattern] = &[pattern("ddd", "%a"), pattern("dddd", "%A")];

const DAY_PATTERNS: &[Pattern] = &[
    pattern("D MMM YY", "%-d %b %y"),
    pattern("D MMM YYYY", "%-d %b %Y"),
    pattern("DD MMM YY", "%d %b %y"),
    pattern("DD MMM YYYY", "%d %b %Y"),
    pattern("D MMMM YY", "%-d %B %y"),
    pattern("D MMMM YYYY", "%-d %B %Y"),
    pattern("DD MMMM YY", "%d %B %y"),
    pattern("DD MMMM YYYY", "%d %B %Y"),
    pattern("YYYY-MM-DD", "%Y-%m-%d"),
];

const MONTH_NAME_PATTERNS: &[Pattern] = &[pattern("MMM", "%b"), pattern("MMMM", "%B")];

const MONTH_PATTERNS: &[Pattern] = &[
    pattern("MMM YY", "%b %y"),
    pattern("MMMM YY", "%B %y"),
    pattern("MMM YYYY", "%b %Y"),
    pattern("MMMM YYYY", "%B %Y"),
    pattern("YYYY MMM", "%Y %b"),
    pattern("YYYY MMMM", "%Y %B"),
    pattern("YYYY-MM", "%Y-%m"),
];

const YEAR_PATTERNS: &[Pattern] = &[pattern("YY", "%y"), pattern("YYYY", "%Y")];

const TIME_PATTERNS: &[Pattern] = &[
    pattern("HH:mm", "%H:%M"),
    pattern("H:mm", "%-H:%M"),
    pattern("h:mm a", "%-I:%M %P"),
    pattern("h:mm A", "%-I:%M %p"),
    pattern("hh:mm a", "%I:%M %P"),
    pattern("hh:mm A", "%I:%M %p"),
];

const DATETIME_PATTERNS: &[Pattern] = &[
    pattern("DD MMM YY HH:mm", "%d %b %y %H:%M"),
    pattern("DD MMM YY HH:mm:ss", "%d %b %y %H:%M:%S"),
    pattern("DD MMM YYYY HH:mm", "%d %b %Y %H:%M"),
    pattern("DD MMM YYYY HH:mm:ss", "%d %b %Y %H:%M:%S"),
    pattern("DD MMMM YYYY HH:mm", "%d %B %Y %H:%M"),
    pattern("DD MMMM YYYY HH:mm:ss", "%d %B %Y %H:%M:%S"),
];

const ISO_LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A calendar instant tagged with the granularity and format it was parsed from
#[derive(Debug, Clone, Serialize)]
pub struct DateValue {
    instant: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    granularity: Option<Granularity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
}

impl DateValue {
    /// An untagged value; prints as a plain ISO 8601 timestamp
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant,
            granularity: None,
            format: None,
        }
    }

    /// A value tagged with its granularity and source format
    pub fn tagged(
        instant: DateTime<Utc>,
        granularity: Option<Granularity>,
        format: impl Into<String>,
    ) -> Self {
        Self {
            instant,
            granularity,
            format: Some(format.into()),
        }
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    pub fn granularity(&self) -> Option<Granularity> {
        self.granularity
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// Half-open `[start, end)` window covered by this value
    ///
    /// Values without a granularity cover the day they fall on.
    pub fn range(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let granularity = self.granularity.unwrap_or(Granularity::Day);
        (
            granularity.start(self.instant),
            granularity.start_of_next(self.instant),
        )
    }
}

/// Two values are equal when they denote the same instant at the same granularity
impl PartialEq for DateValue {
    fn eq(&self, other: &Self) -> bool {
        self.instant == other.instant && self.granularity == other.granularity
    }
}

/// Parse a date expression relative to the current UTC time
pub fn parse(text: &str) -> DateResult<DateValue> {
    parse_at(text, Utc::now())
}

/// Parse a date expression relative to `now`
pub fn parse_at(text: &str, now: DateTime<Utc>) -> DateResult<DateValue> {
    let value = text.trim();

    parse_day(value, now)
        .or_else(|| parse_month(value, now))
        .or_else(|| parse_year(value, now))
        .or_else(|| parse_week(value, now))
        .or_else(|| parse_time(value, now))
        .or_else(|| parse_default(value))
        .ok_or_else(|| DateParseError::new(text))
}

/// Print a date value relative to the current UTC time
pub fn print(date: &DateValue, default_granularity: Option<Granularity>) -> String {
    print_at(date, default_granularity, Utc::now())
}

/// Print a date value relative to `now`
///
/// `default_granularity` applies when the value carries none.
pub fn print_at(
    date: &DateValue,
    default_granularity: Option<Granularity>,
    now: DateTime<Utc>,
) -> String {
    let Some(format) = date.format() else {
        return print_iso8601(date.instant);
    };

    match date.granularity.or(default_granularity) {
        Some(Granularity::Day) => print_day(now, date.instant, format),
        Some(granularity) => print_period(granularity, now, date.instant, format),
        None => format_with(format, date.instant, None),
    }
}

/// Plain UTC ISO 8601 rendering (`YYYY-MM-DDTHH:mm:ssZ`)
pub fn print_iso8601(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_day(value: &str, now: DateTime<Utc>) -> Option<DateValue> {
    let lower = value.to_lowercase();
    if let Some((keyword, offset)) = DAY_KEYWORDS.iter().find(|(k, _)| *k == lower) {
        let day = Granularity::Day.start(now + Duration::days(*offset));
        return Some(DateValue::tagged(day, Some(Granularity::Day), *keyword));
    }

    let week_start = Granularity::Week.start(now);
    let weekday = WEEKDAY_PATTERNS.iter().find_map(|pattern| {
        (0..7)
            .map(|offset| week_start + Duration::days(offset))
            .find(|day| same_text(&day.format(pattern.chrono).to_string(), value))
            .map(|day| DateValue::tagged(day, Some(Granularity::Day), pattern.name))
    });
    if weekday.is_some() {
        return weekday;
    }

    DAY_PATTERNS.iter().find_map(|pattern| {
        strict_date(value, pattern, "", "")
            .map(|day| DateValue::tagged(midnight(day), Some(Granularity::Day), pattern.name))
    })
}

fn parse_month(value: &str, now: DateTime<Utc>) -> Option<DateValue> {
    let month = Granularity::Month;
    let lower = value.to_lowercase();
    let relative = match lower.as_str() {
        "this month" => Some(now),
        "next month" => Some(month.start_of_next(now)),
        "last month" => Some(month.start(now) - Duration::days(2)),
        _ => None,
    };
    if let Some(date) = relative {
        return Some(DateValue::tagged(month.start(date), Some(month), lower));
    }

    let in_current_year = format!(" {} 1", now.year());
    MONTH_NAME_PATTERNS
        .iter()
        .find_map(|pattern| {
            strict_date(value, pattern, &in_current_year, " %Y %d").map(|day| (pattern, day))
        })
        .or_else(|| {
            MONTH_PATTERNS.iter().find_map(|pattern| {
                strict_date(value, pattern, " 1", " %d").map(|day| (pattern, day))
            })
        })
        .map(|(pattern, day)| DateValue::tagged(midnight(day), Some(month), pattern.name))
}

fn parse_year(value: &str, now: DateTime<Utc>) -> Option<DateValue> {
    let year = Granularity::Year;
    let lower = value.to_lowercase();
    let relative = match lower.as_str() {
        "this year" => Some(year.start(now)),
        "next year" => Some(year.start_of_next(now)),
        "last year" => Some(year.shift(year.start(now), -1)),
        _ => None,
    };
    if let Some(date) = relative {
        return Some(DateValue::tagged(date, Some(year), lower));
    }

    YEAR_PATTERNS.iter().find_map(|pattern| {
        strict_date(value, pattern, "-01-01", "-%m-%d")
            .map(|day| DateValue::tagged(midnight(day), Some(year), pattern.name))
    })
}

fn parse_week(value: &str, now: DateTime<Utc>) -> Option<DateValue> {
    let week = Granularity::Week;
    let lower = value.to_lowercase();
    let relative = match lower.as_str() {
        "this week" => Some(now),
        "last week" => Some(week.shift(now, -1)),
        "next week" => Some(week.shift(now, 1)),
        _ => None,
    };
    let (date, format) = match relative {
        Some(date) => (date, lower),
        None => {
            let re = WEEK_NUMBER_RE.as_ref()?;
            let number: i64 = re.captures(value)?.get(1)?.as_str().parse().ok()?;
            if !(1..=53).contains(&number) {
                return None;
            }
            let first_week = week.start(Granularity::Year.start(now));
            let date = first_week + Duration::weeks(number - 1);
            // Week 53 only exists when that week still belongs to this year
            if week_number(date) != number {
                return None;
            }
            (date, WEEK_NUMBER.to_string())
        }
    };
    Some(DateValue::tagged(week.start(date), Some(week), format))
}

fn parse_time(value: &str, now: DateTime<Utc>) -> Option<DateValue> {
    TIME_PATTERNS.iter().find_map(|pattern| {
        let time = NaiveTime::parse_from_str(value, &parse_format(pattern.chrono)).ok()?;
        if time.format(pattern.chrono).to_string() != value {
            return None;
        }
        let instant = now.date_naive().and_time(time).and_utc();
        Some(DateValue::tagged(instant, None, pattern.name))
    })
}

fn parse_default(value: &str) -> Option<DateValue> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(DateValue::tagged(date.with_timezone(&Utc), None, ISO_8601));
    }
    if let Some(date) = ISO_LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    {
        return Some(DateValue::tagged(date.and_utc(), None, ISO_8601));
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(DateValue::tagged(date.with_timezone(&Utc), None, RFC_2822));
    }

    DATETIME_PATTERNS.iter().find_map(|pattern| {
        let date = NaiveDateTime::parse_from_str(value, &parse_format(pattern.chrono)).ok()?;
        same_text(&date.format(pattern.chrono).to_string(), value)
            .then(|| DateValue::tagged(date.and_utc(), None, pattern.name))
    })
}

fn print_day(now: DateTime<Utc>, date: DateTime<Utc>, format: &str) -> String {
    let day = Granularity::Day;
    if DAY_KEYWORDS.iter().any(|(keyword, _)| same_text(keyword, format)) {
        if day.is_same(now, date) {
            return "today".to_string();
        }
        if day.is_same(now - Duration::days(1), date) {
            return "yesterday".to_string();
        }
        if day.is_same(now + Duration::days(1), date) {
            return "tomorrow".to_string();
        }
        if Granularity::Week.is_same(now, date) {
            return date.format("%A").to_string();
        }
    }
    format_with(format, date, Some(day))
}

fn print_period(
    granularity: Granularity,
    now: DateTime<Utc>,
    date: DateTime<Utc>,
    format: &str,
) -> String {
    let unit = granularity.name();
    let relative = RELATIVE_WORDS
        .iter()
        .any(|word| same_text(&format!("{word} {unit}"), format));

    if relative {
        // Years get two months of slack, everything else two days
        let slack = |date: DateTime<Utc>, amount: i32| match granularity {
            Granularity::Year => Granularity::Month.shift(date, amount),
            _ => Granularity::Day.shift(date, amount),
        };

        if granularity.is_same(now, date) {
            return format!("this {unit}");
        }
        if granularity.is_same(slack(granularity.start(now), -2), date) {
            return format!("last {unit}");
        }
        let end_of_period = granularity.start_of_next(now) - Duration::milliseconds(1);
        if granularity.is_same(slack(end_of_period, 2), date) {
            return format!("next {unit}");
        }
    }
    format_with(format, date, Some(granularity))
}

/// Render `date` with a stored format, falling back to the granularity's ISO form
fn format_with(format: &str, date: DateTime<Utc>, fallback: Option<Granularity>) -> String {
    match format {
        ISO_8601 => print_iso8601(date),
        RFC_2822 => date.to_rfc2822(),
        WEEK_NUMBER => format!("week {}", week_number(date)),
        name => match find_pattern(name) {
            Some(pattern) => date.format(pattern.chrono).to_string(),
            None => fallback
                .map(|granularity| granularity.iso8601(date))
                .unwrap_or_else(|| print_iso8601(date)),
        },
    }
}

fn find_pattern(name: &str) -> Option<&'static Pattern> {
    [
        WEEKDAY_PATTERNS,
        DAY_PATTERNS,
        MONTH_NAME_PATTERNS,
        MONTH_PATTERNS,
        YEAR_PATTERNS,
        TIME_PATTERNS,
        DATETIME_PATTERNS,
    ]
    .into_iter()
    .flatten()
    .find(|pattern| pattern.name == name)
}

/// Week of the year, week 1 being the Sunday-based week containing January 1st
fn week_number(date: DateTime<Utc>) -> i64 {
    let week = Granularity::Week;
    let start = week.start(date);
    // A week belongs to the year its Saturday falls in
    let owning_year = Granularity::Year.start(start + Duration::days(6));
    (start - week.start(owning_year)).num_weeks() + 1
}

/// Parse `value` with `pattern`, accepting it only if the pattern prints it back
///
/// `suffix`/`suffix_format` complete partial dates (month or year only) so that
/// chrono can build a full calendar day.
fn strict_date(
    value: &str,
    pattern: &Pattern,
    suffix: &str,
    suffix_format: &str,
) -> Option<NaiveDate> {
    let input = format!("{value}{suffix}");
    let format = format!("{}{suffix_format}", parse_format(pattern.chrono));
    let day = NaiveDate::parse_from_str(&input, &format).ok()?;
    same_text(&day.format(pattern.chrono).to_string(), value).then_some(day)
}

/// Padding and case modifiers only matter when printing
fn parse_format(chrono_format: &str) -> String {
    chrono_format.replace("%-", "%").replace("%P", "%p")
}

fn same_text(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Thursday, 2024-03-14 15:00 UTC
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 14, 15, 0, 0).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_round_trip_at_fixed_now() {
        for text in [
            "today",
            "yesterday",
            "tomorrow",
            "this week",
            "last month",
            "next year",
            "2024-03-15",
        ] {
            let value = parse_at(text, now()).unwrap();
            assert_eq!(print_at(&value, None, now()), text, "round trip of {text}");
        }
    }

    #[test]
    fn test_parse_day_keywords() {
        let today = parse_at("Today", now()).unwrap();
        assert_eq!(today.instant(), ymd(2024, 3, 14));
        assert_eq!(today.granularity(), Some(Granularity::Day));
        assert_eq!(today.format(), Some("today"));

        let yesterday = parse_at("yesterday", now()).unwrap();
        assert_eq!(yesterday.instant(), ymd(2024, 3, 13));
    }

    #[test]
    fn test_parse_weekday_in_current_week() {
        let monday = parse_at("monday", now()).unwrap();
        assert_eq!(monday.instant(), ymd(2024, 3, 11));
        assert_eq!(monday.format(), Some("dddd"));
        assert_eq!(print_at(&monday, None, now()), "Monday");

        let sat = parse_at("Sat", now()).unwrap();
        assert_eq!(sat.instant(), ymd(2024, 3, 16));
        assert_eq!(sat.format(), Some("ddd"));
    }

    #[test]
    fn test_parse_absolute_days() {
        let value = parse_at("15 Mar 2024", now()).unwrap();
        assert_eq!(value.instant(), ymd(2024, 3, 15));
        assert_eq!(value.format(), Some("D MMM YYYY"));

        let padded = parse_at("05 March 2024", now()).unwrap();
        assert_eq!(padded.instant(), ymd(2024, 3, 5));
        assert_eq!(padded.format(), Some("DD MMMM YYYY"));
        assert_eq!(print_at(&padded, None, now()), "05 March 2024");
    }

    #[test]
    fn test_parse_months() {
        let name = parse_at("Mar", now()).unwrap();
        assert_eq!(name.instant(), ymd(2024, 3, 1));
        assert_eq!(name.granularity(), Some(Granularity::Month));

        let full = parse_at("March 2023", now()).unwrap();
        assert_eq!(full.instant(), ymd(2023, 3, 1));
        assert_eq!(full.format(), Some("MMMM YYYY"));

        let iso = parse_at("2023-11", now()).unwrap();
        assert_eq!(iso.instant(), ymd(2023, 11, 1));
        assert_eq!(print_at(&iso, None, now()), "2023-11");

        let last = parse_at("last month", now()).unwrap();
        assert_eq!(last.instant(), ymd(2024, 2, 1));
    }

    #[test]
    fn test_month_name_is_not_a_year() {
        let value = parse_at("May", now()).unwrap();
        assert_eq!(value.granularity(), Some(Granularity::Month));
    }

    #[test]
    fn test_parse_years() {
        let full = parse_at("2021", now()).unwrap();
        assert_eq!(full.instant(), ymd(2021, 1, 1));
        assert_eq!(full.granularity(), Some(Granularity::Year));
        assert_eq!(full.format(), Some("YYYY"));

        let short = parse_at("21", now()).unwrap();
        assert_eq!(short.instant(), ymd(2021, 1, 1));
        assert_eq!(short.format(), Some("YY"));

        let last = parse_at("last year", now()).unwrap();
        assert_eq!(last.instant(), ymd(2023, 1, 1));
    }

    #[test]
    fn test_parse_weeks() {
        let this = parse_at("this week", now()).unwrap();
        assert_eq!(this.instant(), ymd(2024, 3, 10));

        let last = parse_at("last week", now()).unwrap();
        assert_eq!(last.instant(), ymd(2024, 3, 3));
        assert_eq!(print_at(&last, None, now()), "last week");

        let next = parse_at("next week", now()).unwrap();
        assert_eq!(print_at(&next, None, now()), "next week");

        // 2024-01-01 is a Monday, so week 1 starts on 2023-12-31
        let numbered = parse_at("week 3", now()).unwrap();
        assert_eq!(numbered.instant(), ymd(2024, 1, 14));
        assert_eq!(print_at(&numbered, None, now()), "week 3");

        assert!(parse_at("week 60", now()).is_err());
    }

    #[test]
    fn test_week_53_only_in_long_years() {
        // 2024 has 52 Sunday-based weeks: a 53rd would start 2024-12-29,
        // which is week 1 of 2025
        let mid_2024 = ymd(2024, 6, 1);
        let last = parse_at("week 52", mid_2024).unwrap();
        assert_eq!(last.instant(), ymd(2024, 12, 22));
        assert_eq!(print_at(&last, None, mid_2024), "week 52");
        assert!(parse_at("week 53", mid_2024).is_err());

        // 2022 ends on a Saturday, so its last week is week 53
        let mid_2022 = ymd(2022, 6, 1);
        let long = parse_at("week 53", mid_2022).unwrap();
        assert_eq!(long.instant(), ymd(2022, 12, 25));
        assert_eq!(print_at(&long, None, mid_2022), "week 53");
    }

    #[test]
    fn test_parse_time_of_day() {
        let value = parse_at("14:30", now()).unwrap();
        assert_eq!(
            value.instant(),
            Utc.with_ymd_and_hms(2024, 3, 14, 14, 30, 0).unwrap()
        );
        assert_eq!(value.granularity(), None);
        assert_eq!(print_at(&value, None, now()), "14:30");

        let short = parse_at("9:05", now()).unwrap();
        assert_eq!(short.format(), Some("H:mm"));
    }

    #[test]
    fn test_parse_iso_fallback() {
        let value = parse_at("2024-03-15T10:20:30Z", now()).unwrap();
        assert_eq!(
            value.instant(),
            Utc.with_ymd_and_hms(2024, 3, 15, 10, 20, 30).unwrap()
        );
        assert_eq!(value.granularity(), None);
        assert_eq!(print_at(&value, None, now()), "2024-03-15T10:20:30Z");
    }

    #[test]
    fn test_parse_rfc2822_fallback() {
        let value = parse_at("Fri, 15 Mar 2024 10:20:30 +0000", now()).unwrap();
        assert_eq!(value.format(), Some(RFC_2822));
        assert_eq!(
            value.instant(),
            Utc.with_ymd_and_hms(2024, 3, 15, 10, 20, 30).unwrap()
        );
    }

    #[test]
    fn test_parse_failure_carries_literal() {
        let err = parse_at("the day after", now()).unwrap_err();
        assert_eq!(err.literal, "the day after");
    }

    #[test]
    fn test_relative_day_outside_week_prints_iso() {
        let value = parse_at("today", now()).unwrap();
        let later = now() + Duration::days(10);
        assert_eq!(print_at(&value, None, later), "2024-03-14");

        let two_days_on = now() + Duration::days(2);
        assert_eq!(print_at(&value, None, two_days_on), "Thursday");
    }

    #[test]
    fn test_relative_month_moves_with_now() {
        let value = parse_at("this month", now()).unwrap();
        let next_month = ymd(2024, 4, 10);
        assert_eq!(print_at(&value, None, next_month), "last month");

        let much_later = ymd(2024, 8, 10);
        assert_eq!(print_at(&value, None, much_later), "2024-03");
    }

    #[test]
    fn test_print_untagged_value() {
        let value = DateValue::new(Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap());
        assert_eq!(print_at(&value, None, now()), "2024-03-15T08:00:00Z");
    }

    #[test]
    fn test_default_granularity_applies_to_untagged_granularity() {
        let value = DateValue::tagged(ymd(2024, 3, 14), None, "today");
        assert_eq!(print_at(&value, Some(Granularity::Day), now()), "today");
    }

    #[test]
    fn test_value_range() {
        let value = parse_at("March 2024", now()).unwrap();
        assert_eq!(value.range(), (ymd(2024, 3, 1), ymd(2024, 4, 1)));

        let untagged = DateValue::new(Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap());
        assert_eq!(untagged.range(), (ymd(2024, 3, 15), ymd(2024, 3, 16)));
    }
}
