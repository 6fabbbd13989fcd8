//! Unified error type for the lineup engine.

use thiserror::Error;

pub const MSG_MIN_PICKS: &str = "select at least 2 picks";
pub const MSG_NO_DATA: &str = "no data available, try again";

#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("No opportunities available: {0}")]
    NoOpportunities(String),

    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Data source timed out after {0}ms")]
    Timeout(u64),

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Lineup needs more admissible legs.
    pub fn too_few_picks() -> Self {
        Error::Validation(MSG_MIN_PICKS.into())
    }

    /// Whether the caller can fix this by changing their request.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::NoOpportunities(_))
    }

    /// Short, actionable text for the presentation layer.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(msg) => msg.clone(),
            Error::NoOpportunities(_) | Error::DataSource(_) | Error::Timeout(_) => {
                MSG_NO_DATA.to_string()
            }
            Error::Config(msg) => format!("invalid settings: {msg}"),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_failures_map_to_no_data_message() {
        assert_eq!(Error::Timeout(1500).user_message(), MSG_NO_DATA);
        assert_eq!(Error::DataSource("down".into()).user_message(), MSG_NO_DATA);
        assert!(!Error::Timeout(1).is_user_facing());
    }

    #[test]
    fn test_too_few_picks_is_validation() {
        let err = Error::too_few_picks();
        assert!(err.is_user_facing());
        assert_eq!(err.user_message(), "select at least 2 picks");
    }
}
