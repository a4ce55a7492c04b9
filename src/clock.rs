//! Time-of-day, duration and start–end range resolution.

use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::{Captures, Regex};
use serde::Serialize;
use tracing::{debug, warn};

use crate::numeral::{MINUTE_CHARS, parse_cn_minutes};

// ── Regex patterns ─────────────────────────────────────────────────
//
// Real inputs:
//   下午3点半睡觉        → 15:30
//   晚上8点十分          → 20:10
//   上午9点              → 09:00
//   7点45喝奶            → 07:45
//   3点一刻              → 03:15
//   22点到2点睡觉        → range, 240 minutes
//   睡觉 14:00-16:00     → range, 120 minutes
//   玩了1小时30分钟      → 90 minutes

// Pattern 1: 下午/晚上 {H}点 [{minute}][分]
static RE_AFTERNOON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?:下午|晚上)([0-9]{{1,2}})点(?:([0-9]{{1,2}}|[{MINUTE_CHARS}]+)分?)?"
    ))
    .expect("afternoon regex")
});

// Pattern 2: 上午 {H}点 [{minute}][分]
static RE_MORNING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"上午([0-9]{{1,2}})点(?:([0-9]{{1,2}}|[{MINUTE_CHARS}]+)分?)?"
    ))
    .expect("morning regex")
});

// Pattern 3: [下午/晚上/上午] {H}:{MM}
static RE_COLON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(下午|晚上|上午)?\s*([0-9]{1,2})[:：]([0-9]{2})").expect("colon time regex")
});

// Pattern 4: {H}点{digits}
static RE_DIGIT_MINUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{1,2})点([0-9]+)").expect("digit minute regex"));

// Pattern 5: {H}点{Chinese numerals}
static RE_CN_MINUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"([0-9]{{1,2}})点([{MINUTE_CHARS}]+)")).expect("cn minute regex")
});

// Pattern 6: {H}点
static RE_HOUR_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{1,2})点").expect("hour only regex"));

static RE_HOURS_MINUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+)\s*小时\s*([0-9]+)\s*分钟").expect("hours+minutes regex")
});
static RE_HOURS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\s*小时").expect("hours regex"));
static RE_MINUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\s*分钟").expect("minutes regex"));

static RE_RANGE_SEP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"到|至|-|~|～").expect("range separator regex"));

const MINUTES_PER_DAY: u32 = 24 * 60;
const HALF_DAY: u32 = 12 * 60;

// ── Types ────────────────────────────────────────────────────────────

/// Which half of the day the speaker named, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DayPeriod {
    /// 上午
    Morning,
    /// 下午 / 晚上
    Afternoon,
    /// bare "X点"
    Unspecified,
}

/// A resolved time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
    pub period: DayPeriod,
}

impl ClockTime {
    pub fn to_naive_time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0)
    }

    fn minutes_of_day(&self) -> u32 {
        self.hour * 60 + self.minute
    }
}

/// A "start 到 end" span such as "22点到2点".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClockRange {
    pub start: ClockTime,
    pub end: ClockTime,
    pub minutes: u32,
}

// ── Time of day ──────────────────────────────────────────────────────

/// Resolve the first time-of-day phrase in `text`.
///
/// Patterns are tried in priority order (下午/晚上, 上午, "HH:MM", digit
/// minute, Chinese minute, bare hour); the first one that matches decides.
/// A match that names an impossible clock value ("25点", "3点二十一")
/// yields `None` rather than a clamped time.
pub fn resolve_time_of_day(text: &str) -> Option<ClockTime> {
    let (caps, period) = if let Some(c) = RE_AFTERNOON.captures(text) {
        (c, DayPeriod::Afternoon)
    } else if let Some(c) = RE_MORNING.captures(text) {
        (c, DayPeriod::Morning)
    } else if let Some(c) = RE_COLON.captures(text) {
        return colon_clock(&c);
    } else if let Some(c) = RE_DIGIT_MINUTE.captures(text) {
        (c, DayPeriod::Unspecified)
    } else if let Some(c) = RE_CN_MINUTE.captures(text) {
        (c, DayPeriod::Unspecified)
    } else {
        (RE_HOUR_ONLY.captures(text)?, DayPeriod::Unspecified)
    };

    let clock = clock_from_captures(&caps, period)?;
    checked_clock(&caps[0], clock)
}

/// "14:00", "下午3:30".
fn colon_clock(caps: &Captures<'_>) -> Option<ClockTime> {
    let period = match caps.get(1).map(|m| m.as_str()) {
        Some("上午") => DayPeriod::Morning,
        Some(_) => DayPeriod::Afternoon,
        None => DayPeriod::Unspecified,
    };
    let mut hour: u32 = caps[2].parse().ok()?;
    let minute: u32 = caps[3].parse().ok()?;
    if period == DayPeriod::Afternoon && hour < 12 {
        hour += 12;
    }
    checked_clock(
        &caps[0],
        ClockTime {
            hour,
            minute,
            period,
        },
    )
}

fn checked_clock(phrase: &str, clock: ClockTime) -> Option<ClockTime> {
    if clock.hour > 23 || clock.minute > 59 {
        warn!(
            phrase,
            hour = clock.hour,
            minute = clock.minute,
            "dropping out-of-range clock value"
        );
        return None;
    }
    debug!(phrase, hour = clock.hour, minute = clock.minute, "time of day");
    Some(clock)
}

fn clock_from_captures(caps: &Captures<'_>, period: DayPeriod) -> Option<ClockTime> {
    let mut hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute = caps
        .get(2)
        .and_then(|m| parse_cn_minutes(m.as_str()))
        .unwrap_or(0);
    if period == DayPeriod::Afternoon && hour < 12 {
        hour += 12;
    }
    Some(ClockTime {
        hour,
        minute,
        period,
    })
}

// ── Duration ─────────────────────────────────────────────────────────

/// Resolve a stated duration ("X小时Y分钟", "X小时", "Y分钟") → minutes.
///
/// Independent of the time of day: "下午3点玩了1小时" has both.
pub fn resolve_duration(text: &str) -> Option<u32> {
    let minutes = if let Some(c) = RE_HOURS_MINUTES.captures(text) {
        let h: u32 = c[1].parse().ok()?;
        let m: u32 = c[2].parse().ok()?;
        h.checked_mul(60)?.checked_add(m)
    } else if let Some(c) = RE_HOURS.captures(text) {
        c[1].parse::<u32>().ok()?.checked_mul(60)
    } else if let Some(c) = RE_MINUTES.captures(text) {
        c[1].parse().ok()
    } else {
        return None;
    };

    match minutes {
        Some(m) => debug!(minutes = m, "duration"),
        None => warn!(text, "duration digits did not fit, leaving duration empty"),
    }
    minutes
}

// ── Range ────────────────────────────────────────────────────────────

/// Resolve a "start 到/至/-/~ end" span.
///
/// Only the first two segments around the separator are read. Both ends
/// must resolve to a clock time, otherwise `None`.
pub fn resolve_range(text: &str) -> Option<ClockRange> {
    if !RE_RANGE_SEP.is_match(text) {
        return None;
    }
    let mut parts = RE_RANGE_SEP.split(text);
    let start = resolve_time_of_day(parts.next()?)?;
    let end = resolve_time_of_day(parts.next()?)?;
    let minutes = span_minutes(start, end);
    debug!(minutes, "clock range");
    Some(ClockRange {
        start,
        end,
        minutes,
    })
}

/// Minutes from `start` to `end`.
///
/// An end earlier than the start wraps past midnight (22点到2点 → 4 hours,
/// 20点到9点 → 13 hours). The one exception: after a 下午/晚上 start, a bare
/// end hour below 12 is first read in the same half-day (下午3点半到5点 →
/// 17:00), as long as that lands after the start.
pub fn span_minutes(start: ClockTime, end: ClockTime) -> u32 {
    let start_m = start.minutes_of_day();
    let mut end_m = end.minutes_of_day();

    if end_m < start_m
        && start.period == DayPeriod::Afternoon
        && end.period == DayPeriod::Unspecified
        && end.hour < 12
        && end_m + HALF_DAY > start_m
    {
        end_m += HALF_DAY;
    }
    if end_m < start_m {
        end_m += MINUTES_PER_DAY;
    }
    end_m - start_m
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(text: &str) -> Option<(u32, u32)> {
        resolve_time_of_day(text).map(|c| (c.hour, c.minute))
    }

    // ── resolve_time_of_day ──────────────────────────────────────────

    #[test]
    fn test_afternoon_adds_twelve() {
        assert_eq!(hm("下午3点"), Some((15, 0)));
        assert_eq!(hm("晚上8点十分"), Some((20, 10)));
        assert_eq!(hm("下午3点半睡觉"), Some((15, 30)));
        assert_eq!(hm("下午3点20分"), Some((15, 20)));
    }

    #[test]
    fn test_afternoon_twelve_stays() {
        assert_eq!(hm("晚上12点"), Some((12, 0)));
        assert_eq!(hm("下午13点"), Some((13, 0)));
    }

    #[test]
    fn test_morning_hour_as_is() {
        assert_eq!(hm("上午9点"), Some((9, 0)));
        assert_eq!(hm("上午10点一刻"), Some((10, 15)));
    }

    #[test]
    fn test_digit_minutes_exact() {
        for h in 0..24u32 {
            for m in [0u32, 5, 30, 59] {
                let text = format!("{h}点{m}");
                assert_eq!(hm(&text), Some((h, m)), "{text}");
            }
        }
    }

    #[test]
    fn test_cn_minutes() {
        assert_eq!(hm("3点半"), Some((3, 30)));
        assert_eq!(hm("3点一刻"), Some((3, 15)));
        assert_eq!(hm("7点二十"), Some((7, 20)));
    }

    #[test]
    fn test_colon_time() {
        assert_eq!(hm("睡觉 14:00"), Some((14, 0)));
        assert_eq!(hm("7：05喝奶"), Some((7, 5)));
        assert_eq!(hm("下午3:30"), Some((15, 30)));
        assert_eq!(hm("上午9:15"), Some((9, 15)));
        assert_eq!(hm("25:00"), None);
        assert_eq!(hm("8:75"), None);
    }

    #[test]
    fn test_hour_only() {
        assert_eq!(hm("9点喂奶"), Some((9, 0)));
        let c = resolve_time_of_day("9点").unwrap();
        assert_eq!(c.period, DayPeriod::Unspecified);
    }

    #[test]
    fn test_no_time_phrase() {
        assert_eq!(hm("吃奶90ml"), None);
        assert_eq!(hm("玩耍开心1小时"), None);
    }

    #[test]
    fn test_out_of_range_dropped() {
        assert_eq!(hm("25点"), None);
        assert_eq!(hm("3点75"), None);
        // positional numeral reads 二十一 as 201
        assert_eq!(hm("3点二十一"), None);
    }

    // ── resolve_duration ─────────────────────────────────────────────

    #[test]
    fn test_duration_forms() {
        assert_eq!(resolve_duration("2小时30分钟"), Some(150));
        assert_eq!(resolve_duration("睡了 1 小时 5 分钟"), Some(65));
        assert_eq!(resolve_duration("玩耍开心1小时"), Some(60));
        assert_eq!(resolve_duration("阅读30分钟"), Some(30));
        assert_eq!(resolve_duration("下午3点"), None);
    }

    #[test]
    fn test_duration_overflow_is_absent() {
        assert_eq!(resolve_duration("99999999999小时"), None);
    }

    // ── ranges ───────────────────────────────────────────────────────

    #[test]
    fn test_range_simple() {
        let r = resolve_range("18点到21点睡觉").unwrap();
        assert_eq!(r.minutes, 180);
        assert_eq!(r.start.hour, 18);
    }

    #[test]
    fn test_range_wraps_midnight() {
        assert_eq!(resolve_range("22点到2点").unwrap().minutes, 240);
        assert_eq!(resolve_range("晚上9点至1点").unwrap().minutes, 240);
        assert_eq!(resolve_range("20点到6点").unwrap().minutes, 600);
    }

    #[test]
    fn test_range_bare_hours_wrap_overnight() {
        // end falls within 12 hours before the start: still overnight
        assert_eq!(resolve_range("20点到9点睡觉").unwrap().minutes, 780);
        assert_eq!(resolve_range("21点到10点睡觉").unwrap().minutes, 780);
        assert_eq!(resolve_range("15点到5点").unwrap().minutes, 840);
    }

    #[test]
    fn test_range_afternoon_carry_only_when_after_start() {
        assert_eq!(resolve_range("晚上8点到9点").unwrap().minutes, 60);
        assert_eq!(resolve_range("晚上8点到7点").unwrap().minutes, 660);
    }

    #[test]
    fn test_range_colon_form() {
        let r = resolve_range("睡觉 14:00-16:00").unwrap();
        assert_eq!((r.start.hour, r.start.minute), (14, 0));
        assert_eq!(r.minutes, 120);
        assert_eq!(resolve_range("睡觉 21:30~6:45").unwrap().minutes, 555);
        assert_eq!(resolve_range("睡觉 13:05 至 13:50").unwrap().minutes, 45);
    }

    #[test]
    fn test_range_carries_afternoon() {
        let r = resolve_range("下午3点半睡觉到5点").unwrap();
        assert_eq!((r.start.hour, r.start.minute), (15, 30));
        assert_eq!(r.minutes, 90);
    }

    #[test]
    fn test_range_needs_both_ends() {
        assert!(resolve_range("睡觉到天亮").is_none());
        assert!(resolve_range("下午3点睡觉").is_none());
    }
}
