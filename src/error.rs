/// Errors raised while building, sending or decoding a recommendation request
#[derive(thiserror::Error, Debug)]
pub enum RecommendError {
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Transport error: {message}")]
    Transport {
        /// HTTP status when the service answered, `None` for network failures
        status: Option<u16>,
        message: String,
    },

    #[error("Failed to decode `{field}`: {message}")]
    Decode { field: String, message: String },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Preference storage error: {0}")]
    Storage(String),
}

impl RecommendError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn decode(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Message shown to the user when a flow lands in the error state
    pub fn user_message(&self) -> String {
        match self {
            RecommendError::Transport { message, .. } => message.clone(),
            RecommendError::Validation { message, .. } => message.clone(),
            RecommendError::Decode { .. } => {
                "Received an unexpected response from the recommendation service".to_string()
            }
            RecommendError::Cancelled => "Request was cancelled".to_string(),
            RecommendError::Storage(msg) => msg.clone(),
        }
    }
}

impl From<reqwest::Error> for RecommendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return RecommendError::decode("$", err.to_string());
        }
        RecommendError::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: format!("Failed to reach recommendation service: {}", err),
        }
    }
}

pub type RecommendResult<T> = Result<T, RecommendError>;
