//! The public entry point: one extractor for the chat handler, the
//! message-box handler and the annotator path.

use chrono::NaiveDateTime;
use record_types::{ActivityRecord, AiAnnotation, Category};
use serde::Serialize;
use tracing::debug;

use crate::assemble::{Assembler, Evidence, Findings};
use crate::config::ExtractorConfig;
use crate::error::{ConfigError, ExtractError};
use crate::validate::Validator;

/// Result of one extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    pub record: ActivityRecord,
    /// False when the text fell through to `general`
    pub matched: bool,
    pub evidence: Evidence,
}

pub struct Extractor {
    config: ExtractorConfig,
    assembler: Assembler,
    validator: Validator,
}

impl Extractor {
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(config: ExtractorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Extractor {
            assembler: Assembler::new(&config)?,
            validator: Validator::new(&config)?,
            config,
        })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Turn `text` into a record, stamped relative to `reference`.
    ///
    /// With an annotation, its fields are validated and backfilled; without
    /// one the local pipeline runs alone.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidInput`] for empty or whitespace text.
    /// Unrecognized text is not an error.
    pub fn extract(
        &self,
        text: &str,
        reference: NaiveDateTime,
        annotation: Option<&AiAnnotation>,
    ) -> Result<Extraction, ExtractError> {
        let findings = self.inspect(text, reference)?;
        let record = match annotation {
            Some(a) => self
                .validator
                .validate_and_complete(&self.assembler, a, text, reference),
            None => self.assembler.assemble(
                &findings,
                text,
                reference,
                self.config.local_fallback_time,
            ),
        };
        Ok(Extraction {
            matched: record.category != Category::General,
            evidence: findings.evidence(),
            record,
        })
    }

    /// Like [`Extractor::extract`], taking the annotator's raw reply.
    ///
    /// # Errors
    ///
    /// Also returns [`ExtractError::Annotation`] when the reply holds no
    /// JSON object.
    pub fn extract_with_reply(
        &self,
        text: &str,
        reference: NaiveDateTime,
        reply: &str,
    ) -> Result<Extraction, ExtractError> {
        let annotation = AiAnnotation::from_reply(reply)?;
        self.extract(text, reference, Some(&annotation))
    }

    /// Re-run extraction on edited text.
    ///
    /// The record keeps `original_recorded_at` unless the new text names a
    /// date, a time of day or a time range of its own.
    ///
    /// # Errors
    ///
    /// See [`Extractor::extract`].
    pub fn reextract(
        &self,
        text: &str,
        original_recorded_at: NaiveDateTime,
        reference: NaiveDateTime,
        annotation: Option<&AiAnnotation>,
    ) -> Result<Extraction, ExtractError> {
        let mut extraction = self.extract(text, reference, annotation)?;
        let ev = extraction.evidence;
        if !(ev.explicit_date || ev.time_of_day || ev.range) {
            debug!(%original_recorded_at, "edit names no new time, keeping original");
            extraction.record.recorded_at = original_recorded_at;
        }
        Ok(extraction)
    }

    /// Every stage's raw output, before category rules are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidInput`] for empty or whitespace text.
    pub fn inspect(&self, text: &str, reference: NaiveDateTime) -> Result<Findings, ExtractError> {
        if text.trim().is_empty() {
            return Err(ExtractError::InvalidInput);
        }
        Ok(self.assembler.gather(text, reference))
    }
}
