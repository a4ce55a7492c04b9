//! Sanity checks for annotator output.
//!
//! The annotator is consulted before local extraction and is usually right
//! about the category, but it guesses years and mixes up time zones. Each
//! field it returns is checked on its own and replaced by the local
//! resolvers' answer when it is missing or implausible.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime};
use record_types::{ActivityRecord, AiAnnotation, Category};
use tracing::{debug, warn};

use crate::assemble::{Assembler, default_message, ml_quantity, with_quantity_suffix};
use crate::classify::Classification;
use crate::config::{ExtractorConfig, FallbackTime};
use crate::date::days_in_month;
use crate::error::ConfigError;

/// Offset-free forms, tried in order.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

pub struct Validator {
    offset: FixedOffset,
    fallback: FallbackTime,
}

impl Validator {
    /// # Errors
    ///
    /// Returns an error if the configured offset cannot be parsed.
    pub fn new(config: &ExtractorConfig) -> Result<Self, ConfigError> {
        Ok(Validator {
            offset: config.offset()?,
            fallback: config.annotator_fallback_time,
        })
    }

    /// Merge an annotation with local extraction of `raw_text`.
    ///
    /// - category: the annotator's, if it is one of the six known codes,
    ///   otherwise `general`
    /// - recorded_at: the annotator's, if it parses and lies in the
    ///   reference year; otherwise local resolution with this validator's
    ///   fallback time
    /// - duration: the annotator's positive value, else the text's
    /// - quantity: the annotator's, only for `eat`
    /// - content, message, confidence: the annotator's when non-blank
    pub fn validate_and_complete(
        &self,
        assembler: &Assembler,
        annotation: &AiAnnotation,
        raw_text: &str,
        reference: NaiveDateTime,
    ) -> ActivityRecord {
        let mut findings = assembler.gather(raw_text, reference);
        let category = annotation_category(annotation);
        if category != findings.classification.category {
            findings.classification = Classification::for_category(category, raw_text);
        }
        let local = assembler.assemble(&findings, raw_text, reference, self.fallback);

        let recorded_at = match annotation.recorded_at.as_deref() {
            Some(ts) => match self.accept_timestamp(ts, reference) {
                Some(accepted) => accepted,
                None => {
                    warn!(
                        recorded_at = ts,
                        replacement = %local.recorded_at,
                        "annotator timestamp rejected"
                    );
                    local.recorded_at
                }
            },
            None => local.recorded_at,
        };

        let duration_minutes = annotation
            .duration_minutes()
            .or(local.duration_minutes)
            .or(findings.duration);

        let quantity = if category == Category::Eat {
            annotation.quantity().or(local.quantity)
        } else {
            local.quantity
        };

        let content = annotation
            .content_text()
            .map_or_else(|| local.content.clone(), str::to_string);

        let message = match annotation.message_text() {
            Some(m) => m.to_string(),
            None => default_message(&findings.classification),
        };

        debug!(
            category = category.as_code(),
            %recorded_at,
            ?duration_minutes,
            ?quantity,
            "annotation validated"
        );

        ActivityRecord {
            category,
            eat_kind: findings.classification.eat_kind,
            category_label: category.label().to_string(),
            recorded_at,
            duration_minutes,
            quantity,
            content,
            raw_text: raw_text.to_string(),
            confidence: annotation.confidence_score(),
            message: with_quantity_suffix(
                message,
                ml_quantity(&findings.classification, quantity),
            ),
        }
    }

    /// Parse `ts` and keep it only if it is plausible for `reference`.
    pub fn accept_timestamp(&self, ts: &str, reference: NaiveDateTime) -> Option<NaiveDateTime> {
        let parsed = parse_timestamp(ts, self.offset)?;
        is_plausible(parsed, reference).then_some(parsed)
    }
}

fn annotation_category(annotation: &AiAnnotation) -> Category {
    match annotation.kind.as_deref() {
        Some(code) => Category::from_known_code(code).unwrap_or_else(|| {
            debug!(code, "unknown annotator category, using general");
            Category::General
        }),
        None => Category::General,
    }
}

/// Parse an annotator timestamp into local civil time.
///
/// Offset-free forms are taken as already local. RFC 3339 values with an
/// offset ("2024-06-09T07:30:00Z") are shifted into `offset`.
pub fn parse_timestamp(ts: &str, offset: FixedOffset) -> Option<NaiveDateTime> {
    let ts = ts.trim();
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(ts, fmt) {
            return Some(dt);
        }
    }
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&offset).naive_local())
}

/// Year must equal the reference year, and month/day must name a real day.
pub fn is_plausible(ts: NaiveDateTime, reference: NaiveDateTime) -> bool {
    if ts.year() != reference.year() {
        return false;
    }
    match days_in_month(ts.year(), ts.month0()) {
        Some(days) => (1..=days).contains(&ts.day()),
        None => false,
    }
}
