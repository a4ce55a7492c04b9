use std::path::PathBuf;

/// Errors the extractor can surface to a caller.
///
/// Unrecognized text is not an error: it becomes a `general` record.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Empty or whitespace-only input. The message is shown to the user.
    #[error("消息内容不能为空")]
    InvalidInput,

    /// The annotator's reply contained no parseable JSON object.
    #[error("annotator reply is not a JSON object: {0}")]
    Annotation(#[from] serde_json::Error),
}

/// Errors produced while loading an [`ExtractorConfig`](crate::config::ExtractorConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid utc_offset {0:?}, expected something like \"+08:00\"")]
    InvalidOffset(String),

    #[error("amount_units must name at least one unit")]
    NoAmountUnits,

    #[error("amount_units do not form a usable pattern: {0}")]
    AmountPattern(#[source] regex::Error),
}
