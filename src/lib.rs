//! Turn short Chinese baby-activity notes ("昨天下午3点半睡觉到5点",
//! "吃奶90ml") into structured activity records.
//!
//! The pipeline is four stages, each usable on its own:
//! [`classify`](classify::classify) → [`resolve_date`](date::resolve_date) →
//! [`resolve_time_of_day`](clock::resolve_time_of_day) /
//! [`resolve_duration`](clock::resolve_duration) →
//! [`Assembler`](assemble::Assembler). [`Extractor`] wires them together and
//! validates annotator output against them.

pub mod assemble;
pub mod classify;
pub mod clock;
pub mod config;
pub mod date;
pub mod error;
pub mod extractor;
pub mod keywords;
pub mod logging;
pub mod numeral;
pub mod validate;

pub use config::{ExtractorConfig, FallbackTime};
pub use error::{ConfigError, ExtractError};
pub use extractor::{Extraction, Extractor};
pub use record_types::{ActivityRecord, AiAnnotation, Category, EatKind, RecordRow};
