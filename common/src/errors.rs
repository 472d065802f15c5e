use thiserror::Error;

/// Failures talking to the weather provider
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Not found: {status} - {message}")]
    NotFound { status: u16, message: String },

    #[error("Unauthorized: {status} - {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Transport error: {message}")]
    Transport { status: Option<u16>, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}

/// Discriminant of [`ProviderError`], cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Timeout,
    NotFound,
    Unauthorized,
    Transport,
    MalformedResponse,
}

impl ProviderError {
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout(message.into())
    }

    pub fn not_found(status: u16, message: impl Into<String>) -> Self {
        Self::NotFound {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(status: u16, message: impl Into<String>) -> Self {
        Self::Unauthorized {
            status,
            message: message.into(),
        }
    }

    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            ProviderError::Timeout(_) => ProviderErrorKind::Timeout,
            ProviderError::NotFound { .. } => ProviderErrorKind::NotFound,
            ProviderError::Unauthorized { .. } => ProviderErrorKind::Unauthorized,
            ProviderError::Transport { .. } => ProviderErrorKind::Transport,
            ProviderError::MalformedResponse(_) => ProviderErrorKind::MalformedResponse,
        }
    }

    /// HTTP status of the failed response, if the provider answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::NotFound { status, .. } | ProviderError::Unauthorized { status, .. } => {
                Some(*status)
            }
            ProviderError::Transport { status, .. } => *status,
            ProviderError::Timeout(_) | ProviderError::MalformedResponse(_) => None,
        }
    }

    /// Timeouts, connection failures and 5xx answers are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Timeout(_) => true,
            ProviderError::Transport { status, .. } => status.is_none_or(|s| s >= 500),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout(err.to_string());
        }
        Self::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Persistent storage failures. Always recovered by the caller.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    #[error("Storage unavailable for key '{key}': {message}")]
    Unavailable { key: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CacheError {
    pub fn unavailable(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Failure to assemble the store from configuration
#[derive(Error, Debug)]
pub enum InitError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider client error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Persistent store error: {0}")]
    Storage(#[from] CacheError),
}
