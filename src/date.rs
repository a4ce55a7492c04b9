//! Date phrases: 昨天 / 昨日, 前天, 今天, "M月D日" and "D日".

use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

const YESTERDAY: &[&str] = &["昨天", "昨日"];
const DAY_BEFORE_YESTERDAY: &[&str] = &["前天"];
const TODAY: &[&str] = &["今天"];

// "3月12日", "3 月 12", "12月1日"
static RE_MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{1,2})\s*月\s*([0-9]{1,2})\s*日?").expect("month_day regex")
});

// "12日", day of the reference month
static RE_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{1,2})\s*日").expect("day regex"));

/// Which date phrase the text contained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum DatePhrase {
    /// 昨天 / 昨日
    Yesterday,
    /// 前天
    DayBeforeYesterday,
    /// 今天
    Today,
    /// M月D日, month 1-based, not range checked
    MonthDay { month: u32, day: u32 },
    /// D日 in the reference month
    Day { day: u32 },
    /// Nothing recognized
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateResolution {
    pub phrase: DatePhrase,
    /// `None` only for a month-day or day phrase that names no real day
    /// (e.g. "2月30日"). The assembler falls back to the reference date.
    pub date: Option<NaiveDate>,
    /// Input with the matched phrase removed, trimmed.
    pub remaining: String,
}

impl DateResolution {
    /// True when the speaker named a date, including "今天".
    pub fn explicit(&self) -> bool {
        self.phrase != DatePhrase::Absent
    }
}

/// Resolve the date phrase in `text` against `reference`.
///
/// First match wins, in order 昨天/昨日, 前天, 今天, M月D日, D日. A relative
/// phrase suppresses the month-day scan entirely. Every resolved date lands
/// in the reference year: 昨天 on Jan 1 keeps the month and day (Dec 31)
/// but not the previous year.
pub fn resolve_date(text: &str, reference: NaiveDateTime) -> DateResolution {
    let today = reference.date();

    let relative = if text.contains("昨天") || text.contains("昨日") {
        Some((DatePhrase::Yesterday, YESTERDAY, 1))
    } else if text.contains("前天") {
        Some((DatePhrase::DayBeforeYesterday, DAY_BEFORE_YESTERDAY, 2))
    } else if text.contains("今天") {
        Some((DatePhrase::Today, TODAY, 0))
    } else {
        None
    };

    if let Some((phrase, words, back)) = relative {
        let mut remaining = text.to_string();
        for w in words {
            remaining = remaining.replace(*w, "");
        }
        let date = today
            .checked_sub_days(Days::new(back))
            .and_then(|d| d.with_year(today.year()));
        debug!(?phrase, ?date, "relative date");
        return DateResolution {
            phrase,
            date,
            remaining: remaining.trim().to_string(),
        };
    }

    if let Some(caps) = RE_MONTH_DAY.captures(text) {
        let full = caps.get(0).map_or(0..0, |m| m.range());
        let month: u32 = caps[1].parse().unwrap_or(0);
        let day: u32 = caps[2].parse().unwrap_or(0);
        let date = NaiveDate::from_ymd_opt(today.year(), month, day);
        debug!(month, day, ?date, "month-day date");

        return DateResolution {
            phrase: DatePhrase::MonthDay { month, day },
            date,
            remaining: strip_range(text, full),
        };
    }

    if let Some(caps) = RE_DAY.captures(text) {
        let full = caps.get(0).map_or(0..0, |m| m.range());
        let day: u32 = caps[1].parse().unwrap_or(0);
        let date = NaiveDate::from_ymd_opt(today.year(), today.month(), day);
        debug!(day, ?date, "day-of-month date");
        return DateResolution {
            phrase: DatePhrase::Day { day },
            date,
            remaining: strip_range(text, full),
        };
    }

    DateResolution {
        phrase: DatePhrase::Absent,
        date: Some(today),
        remaining: text.trim().to_string(),
    }
}

fn strip_range(text: &str, range: std::ops::Range<usize>) -> String {
    let mut remaining = String::with_capacity(text.len());
    remaining.push_str(&text[..range.start]);
    remaining.push_str(&text[range.end..]);
    remaining.trim().to_string()
}

/// Number of days in `month` (0-based, 0 = January) of `year`.
/// Returns `None` for a month outside 0–11.
pub fn days_in_month(year: i32, month0: u32) -> Option<u32> {
    if month0 > 11 {
        return None;
    }
    let first = NaiveDate::from_ymd_opt(year, month0 + 1, 1)?;
    let next = if month0 == 11 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month0 + 2, 1)?
    };
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}
