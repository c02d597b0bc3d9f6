// Error kinds for the order pipeline, one per component boundary.
use std::fmt;

#[derive(Debug)]
pub enum BotError {
    /// Malformed or out-of-policy input. Rejected before any network call.
    Validation(String),

    /// Authentication or clock synchronization failed at startup. Fatal.
    Init {
        context: String,
        source: anyhow::Error,
    },

    /// The exchange failed or rejected an account/symbol/order operation.
    /// Carries the underlying cause, never retried.
    Dispatch {
        context: String,
        source: anyhow::Error,
    },
}

impl BotError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn init(context: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Init {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn dispatch(context: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Dispatch {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::Init { .. } => "INIT",
            Self::Dispatch { .. } => "DISPATCH",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl fmt::Display for BotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "Input validation error: {}", msg),
            Self::Init { context, source } => {
                write!(f, "Initialization error while {}: {}", context, source)
            }
            Self::Dispatch { context, source } => {
                write!(f, "Dispatch error while {}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for BotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(_) => None,
            Self::Init { source, .. } | Self::Dispatch { source, .. } => Some(source.as_ref()),
        }
    }
}

impl From<reqwest::Error> for BotError {
    fn from(err: reqwest::Error) -> Self {
        Self::Dispatch {
            context: "http transport".to_string(),
            source: err.into(),
        }
    }
}
