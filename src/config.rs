//! Extractor configuration.
//!
//! Every field has a default, so an empty file (or no file) is valid:
//!
//! ```toml
//! local_fallback_time = "reference"
//! annotator_fallback_time = "noon"
//! utc_offset = "+08:00"
//! amount_units = ["ml", "毫升"]
//! ```

use std::path::Path;
use std::sync::LazyLock;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

static RE_OFFSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-])([0-9]{2}):?([0-9]{2})$").expect("utc offset regex")
});

/// Time of day used when a date was named but no clock time was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackTime {
    /// The reference instant's own time of day
    Reference,
    /// 12:00:00
    Noon,
}

impl FallbackTime {
    /// Combine `date` with this policy's time of day.
    pub fn apply(&self, date: NaiveDate, reference: NaiveDateTime) -> NaiveDateTime {
        match self {
            Self::Reference => date.and_time(reference.time()),
            Self::Noon => date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Policy for the plain local path.
    #[serde(default = "default_local_fallback")]
    pub local_fallback_time: FallbackTime,

    /// Policy when an annotator timestamp was rejected.
    #[serde(default = "default_annotator_fallback")]
    pub annotator_fallback_time: FallbackTime,

    /// Offset of the family's civil time zone. Offset-bearing annotator
    /// timestamps are shifted into it before validation.
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,

    /// Unit spellings accepted after a milk amount.
    #[serde(default = "default_amount_units")]
    pub amount_units: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            local_fallback_time: default_local_fallback(),
            annotator_fallback_time: default_annotator_fallback(),
            utc_offset: default_utc_offset(),
            amount_units: default_amount_units(),
        }
    }
}

fn default_local_fallback() -> FallbackTime {
    FallbackTime::Reference
}
fn default_annotator_fallback() -> FallbackTime {
    FallbackTime::Noon
}
fn default_utc_offset() -> String {
    "+08:00".to_string()
}
fn default_amount_units() -> Vec<String> {
    vec!["ml".to_string(), "毫升".to_string()]
}

impl ExtractorConfig {
    /// Load a config from a TOML file and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// names an unusable offset or an empty unit list.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate a config from TOML text.
    ///
    /// # Errors
    ///
    /// See [`ExtractorConfig::load`].
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: ExtractorConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the fields serde cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparseable offset or an empty unit list.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.offset()?;
        if self.amount_units.iter().all(|u| u.trim().is_empty()) {
            return Err(ConfigError::NoAmountUnits);
        }
        Ok(())
    }

    /// Parse `utc_offset` ("+08:00", "-0530").
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOffset`] for anything else.
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        let invalid = || ConfigError::InvalidOffset(self.utc_offset.clone());
        let caps = RE_OFFSET.captures(self.utc_offset.trim()).ok_or_else(invalid)?;
        let hours: i32 = caps[2].parse().map_err(|_| invalid())?;
        let minutes: i32 = caps[3].parse().map_err(|_| invalid())?;
        let secs = (hours * 60 + minutes) * 60;
        let secs = if &caps[1] == "-" { -secs } else { secs };
        FixedOffset::east_opt(secs).ok_or_else(invalid)
    }
}
