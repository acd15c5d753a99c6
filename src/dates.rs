//! Chapter date parsing.
//!
//! Madara sites print either a relative age ("3 hours ago") or an absolute
//! date in a per-site pattern. Some patterns carry no year; those resolve to
//! the reference year, or the year before when that would land in the future.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceLocale {
    #[default]
    English,
}

/// Pattern plus the locale its month and weekday names are written in.
#[derive(Debug, Clone, Copy)]
pub struct DateFormat<'a> {
    pub pattern: &'a str,
    pub locale: SourceLocale,
}

impl<'a> DateFormat<'a> {
    pub fn new(pattern: &'a str, locale: SourceLocale) -> Self {
        Self { pattern, locale }
    }
}

fn relative_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^(\d+)\s*(seconds?|secs?|months?|m(?:ins?|inutes?)?|hours?|hrs?|h|days?|d|weeks?|w|years?|yrs?)\s+ago$",
        )
        .expect("relative date regex is valid")
    })
}

/// Parse a chapter date. `None` when absent or unrecognized.
pub fn parse_chapter_date(
    text: Option<&str>,
    format: DateFormat<'_>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let text = text?.trim();
    if text.is_empty() {
        return None;
    }

    let parsed = parse_relative(text, now).or_else(|| parse_absolute(text, format, now));
    if parsed.is_none() {
        debug!("[DATES] could not parse chapter date '{}' with '{}'", text, format.pattern);
    }
    parsed
}

fn start_of_day(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|n| n.and_utc())
        .unwrap_or(dt)
}

fn parse_relative(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let lower = text.to_lowercase();
    match lower.as_str() {
        "today" | "just now" => return Some(start_of_day(now)),
        "yesterday" => return now.checked_sub_signed(Duration::try_days(1)?).map(start_of_day),
        _ => {}
    }

    let caps = relative_regex().captures(&lower)?;
    let amount: i64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2)?.as_str();

    // Ages come from page text; anything out of chrono's range is unparseable.
    let delta = if unit.starts_with("sec") {
        Duration::try_seconds(amount)
    } else if unit.starts_with("mon") {
        Duration::try_days(amount.checked_mul(30)?)
    } else if unit.starts_with('m') {
        Duration::try_minutes(amount)
    } else if unit.starts_with('h') {
        Duration::try_hours(amount)
    } else if unit.starts_with('d') {
        Duration::try_days(amount)
    } else if unit.starts_with('w') {
        Duration::try_weeks(amount)
    } else {
        Duration::try_days(amount.checked_mul(365)?)
    }?;
    now.checked_sub_signed(delta)
}

fn parse_absolute(text: &str, format: DateFormat<'_>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match format.locale {
        SourceLocale::English => {}
    }

    if format.pattern.contains("%Y") || format.pattern.contains("%y") {
        return parse_naive(text, format.pattern).map(|n| Utc.from_utc_datetime(&n));
    }

    // No year in the pattern: pin it explicitly instead of letting it default.
    let pattern = format!("{} %Y", format.pattern);
    let latest = now.checked_add_signed(Duration::try_days(1)?)?;
    let mut fallback = None;
    for year in [now.year(), now.year() - 1] {
        let Some(naive) = parse_naive(&format!("{} {}", text, year), &pattern) else {
            continue;
        };
        let dt = Utc.from_utc_datetime(&naive);
        if dt <= latest {
            return Some(dt);
        }
        fallback.get_or_insert(dt);
    }
    fallback
}

fn parse_naive(text: &str, pattern: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, pattern).ok().or_else(|| {
        NaiveDate::parse_from_str(text, pattern)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
}
