//! Domain error types.

/// Top-level error type for tradelab.
#[derive(Debug, thiserror::Error)]
pub enum TradelabError {
    #[error("no strategy attached to the backtester")]
    NoStrategy,

    #[error("unknown strategy kind '{tag}'")]
    UnknownStrategy { tag: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("insufficient data: have {candles} candles, need {minimum}")]
    InsufficientData { candles: usize, minimum: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TradelabError> for std::process::ExitCode {
    fn from(err: &TradelabError) -> Self {
        let code: u8 = match err {
            TradelabError::Io(_) => 1,
            TradelabError::ConfigParse { .. }
            | TradelabError::ConfigMissing { .. }
            | TradelabError::ConfigInvalid { .. } => 2,
            TradelabError::NoStrategy | TradelabError::UnknownStrategy { .. } => 4,
            TradelabError::Data { .. } | TradelabError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
