use thiserror::Error;

/// Result alias used by every fallible operation on the fetch path.
///
/// Expected failures (missing permission, no fix, transport trouble, bad
/// payloads, HTTP errors) travel through this alias as [`AppError`] values.
/// Nothing on the fetch path panics or rethrows for an expected condition.
pub type Result<T> = std::result::Result<T, AppError>;

/// Closed set of failure kinds shared by the location and weather stages.
#[derive(Debug, Error)]
pub enum AppError {
    /// Transport-level failure: DNS, connection refused, timeout.
    #[error("network unavailable")]
    Network,

    /// The weather endpoint answered with a non-2xx status.
    #[error("api error {code}: {message}")]
    Api { code: u16, message: String },

    /// The response body did not decode against the expected schema.
    #[error("parsing failure")]
    Parsing,

    /// Neither the fine nor the coarse location permission is granted.
    #[error("location permission denied")]
    Permission,

    /// No fresh fix and no cached fix available.
    #[error("location unavailable")]
    Location,

    /// Anything unanticipated, caught at the boundary where it surfaced.
    #[error("unknown error: {0}")]
    Unknown(#[from] anyhow::Error),
}

impl AppError {
    /// Fixed, exhaustive mapping to the user-facing message for each kind.
    ///
    /// The view layer displays these verbatim; it never inspects the
    /// underlying cause.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Permission => "Location permission required".to_string(),
            AppError::Location => "Unable to obtain location".to_string(),
            AppError::Network => "Network error".to_string(),
            AppError::Api { code, .. } => format!("Api error {code}"),
            AppError::Parsing => "Parsing error".to_string(),
            AppError::Unknown(_) => "Unknown error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_covers_every_kind() {
        assert_eq!(AppError::Permission.user_message(), "Location permission required");
        assert_eq!(AppError::Location.user_message(), "Unable to obtain location");
        assert_eq!(AppError::Network.user_message(), "Network error");
        assert_eq!(AppError::Parsing.user_message(), "Parsing error");
        assert_eq!(
            AppError::Unknown(anyhow::anyhow!("boom")).user_message(),
            "Unknown error"
        );
    }

    #[test]
    fn api_message_includes_status_code() {
        let err = AppError::Api {
            code: 500,
            message: "Internal Server Error".to_string(),
        };
        assert_eq!(err.user_message(), "Api error 500");
    }

    #[test]
    fn display_keeps_server_message() {
        let err = AppError::Api {
            code: 401,
            message: "Invalid API key".to_string(),
        };
        assert!(err.to_string().contains("Invalid API key"));
    }
}
