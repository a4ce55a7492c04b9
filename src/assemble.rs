//! Record assembly: per-category field rules on top of the resolvers.

use chrono::{NaiveDate, NaiveDateTime};
use record_types::{ActivityRecord, Category, EatKind};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::classify::{Classification, classify};
use crate::clock::{ClockRange, ClockTime, resolve_duration, resolve_range, resolve_time_of_day};
use crate::config::{ExtractorConfig, FallbackTime};
use crate::date::{DateResolution, resolve_date};
use crate::error::ConfigError;

/// Servings recorded for a solid-food meal; the text's amount is not read.
pub const FOOD_SERVINGS: u32 = 1;

/// What the individual stages found in one utterance, before any
/// category-specific rule is applied.
#[derive(Debug, Clone, Serialize)]
pub struct Findings {
    pub classification: Classification,
    pub date: DateResolution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock: Option<ClockTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<ClockRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

/// Which temporal facts the text stated outright.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Evidence {
    pub explicit_date: bool,
    pub time_of_day: bool,
    pub range: bool,
}

impl Findings {
    pub fn evidence(&self) -> Evidence {
        Evidence {
            explicit_date: self.date.explicit(),
            time_of_day: self.clock.is_some(),
            range: self.range.is_some(),
        }
    }
}

pub struct Assembler {
    re_amount: Regex,
}

impl Assembler {
    /// # Errors
    ///
    /// Returns [`ConfigError::AmountPattern`] if the unit list does not
    /// compile into a regex.
    pub fn new(config: &ExtractorConfig) -> Result<Self, ConfigError> {
        let pattern = format!("([0-9]+)\\s*{}", build_unit_regex(&config.amount_units));
        let re_amount = Regex::new(&pattern).map_err(ConfigError::AmountPattern)?;
        Ok(Assembler { re_amount })
    }

    /// Run every stage over `text`.
    pub fn gather(&self, text: &str, reference: NaiveDateTime) -> Findings {
        let date = resolve_date(text, reference);
        let clock = resolve_time_of_day(&date.remaining);
        let range = resolve_range(&date.remaining);
        Findings {
            classification: classify(text),
            clock,
            range,
            duration: resolve_duration(text),
            quantity: self.quantity(text),
            date,
        }
    }

    /// First "<digits><unit>" amount in `text`, e.g. "90ml" or "120 毫升".
    pub fn quantity(&self, text: &str) -> Option<u32> {
        let caps = self.re_amount.captures(text)?;
        match caps[1].parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(amount = &caps[0], "amount digits did not fit, leaving quantity empty");
                None
            }
        }
    }

    /// Apply the category rules and build the record.
    ///
    /// Never fails. `fallback` decides the time of day when a date was
    /// named without a clock time.
    pub fn assemble(
        &self,
        findings: &Findings,
        raw_text: &str,
        reference: NaiveDateTime,
        fallback: FallbackTime,
    ) -> ActivityRecord {
        let class = findings.classification;
        let mut duration = None;
        let mut quantity = None;

        let recorded_at = match class.category {
            Category::Sleep => match findings.range {
                Some(range) => {
                    duration = Some(range.minutes);
                    combine(findings, Some(range.start), reference, fallback)
                }
                None => {
                    duration = findings.duration;
                    combine(findings, findings.clock, reference, fallback)
                }
            },
            Category::Eat => {
                quantity = match class.eat_kind {
                    Some(EatKind::Food) => Some(FOOD_SERVINGS),
                    _ => findings.quantity,
                };
                combine(findings, findings.clock, reference, fallback)
            }
            Category::Play | Category::Study => {
                duration = findings.duration;
                combine(findings, findings.clock, reference, fallback)
            }
            Category::Supplement => combine(findings, findings.clock, reference, fallback),
            // Milestones are stamped "now" whatever the text says
            Category::Milestone | Category::General => reference,
        };

        debug!(
            category = class.category.as_code(),
            %recorded_at,
            ?duration,
            ?quantity,
            "assembled record"
        );

        ActivityRecord {
            category: class.category,
            eat_kind: class.eat_kind,
            category_label: class.category.label().to_string(),
            recorded_at,
            duration_minutes: duration,
            quantity,
            content: raw_text.trim().to_string(),
            raw_text: raw_text.to_string(),
            confidence: None,
            message: with_quantity_suffix(default_message(&class), ml_quantity(&class, quantity)),
        }
    }
}

/// Date + time of day for a timed category.
fn combine(
    findings: &Findings,
    clock: Option<ClockTime>,
    reference: NaiveDateTime,
    fallback: FallbackTime,
) -> NaiveDateTime {
    let date = resolved_date(&findings.date, reference);
    if let Some(time) = clock.and_then(|c| c.to_naive_time()) {
        return date.and_time(time);
    }
    if findings.date.explicit() {
        fallback.apply(date, reference)
    } else {
        reference
    }
}

fn resolved_date(date: &DateResolution, reference: NaiveDateTime) -> NaiveDate {
    match date.date {
        Some(d) => d,
        None => {
            warn!(phrase = ?date.phrase, "date phrase names no real day, using reference date");
            reference.date()
        }
    }
}

/// "睡觉数据已记录", "里程碑已记录", "数据已记录".
pub fn default_message(class: &Classification) -> String {
    match class.category {
        Category::Milestone => "里程碑已记录".to_string(),
        Category::General => "数据已记录".to_string(),
        _ => format!("{}数据已记录", class.message_label()),
    }
}

/// The quantity to show as millilitres: food servings are not.
pub fn ml_quantity(class: &Classification, quantity: Option<u32>) -> Option<u32> {
    match class.eat_kind {
        Some(EatKind::Food) => None,
        _ => quantity,
    }
}

/// Append " {v}ml" unless the message already carries it.
pub fn with_quantity_suffix(mut message: String, quantity: Option<u32>) -> String {
    if let Some(v) = quantity {
        let tag = format!("{v}ml");
        if !message.contains(&tag) {
            message.push(' ');
            message.push_str(&tag);
        }
    }
    message
}

/// Build a regex fragment matching any configured unit, longest first,
/// ASCII case-insensitive ("ML" reads as "ml").
pub fn build_unit_regex(units: &[String]) -> String {
    let mut all: Vec<&str> = units
        .iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .collect();
    all.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    all.dedup();
    let alts: Vec<String> = all.iter().map(|u| regex::escape(u)).collect();
    format!("(?i:{})", alts.join("|"))
}
