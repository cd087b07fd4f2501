//! Error types for the climate forecasting core.

use thiserror::Error;

/// Result type for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Error kinds surfaced by model construction, training, forecasting and IO.
#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Model fit error: {0}")]
    ModelFit(String),

    #[error("Invalid state: {operation} requires a {required} model, but it is {actual}")]
    InvalidState {
        operation: &'static str,
        required: &'static str,
        actual: &'static str,
    },

    #[error("Exogenous mismatch: {0}")]
    ExogenousMismatch(String),

    #[error("Invalid data: {0}")]
    Data(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ForecastError {
    /// Stable numeric code, used by the CLI as its exit status.
    pub fn to_code(&self) -> i32 {
        match self {
            ForecastError::Configuration(_) => 2,
            ForecastError::ModelFit(_) => 3,
            ForecastError::InvalidState { .. } => 4,
            ForecastError::ExogenousMismatch(_) => 5,
            ForecastError::Data(_) => 6,
            ForecastError::Io(_) => 7,
            ForecastError::Serialization(_) => 8,
        }
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        match err.into_kind() {
            csv::ErrorKind::Io(io) => ForecastError::Io(io),
            other => ForecastError::Data(format!("{:?}", other)),
        }
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_conversion() {
        assert_eq!(ForecastError::Configuration("x".into()).to_code(), 2);
        assert_eq!(ForecastError::ModelFit("x".into()).to_code(), 3);
        assert_eq!(
            ForecastError::InvalidState {
                operation: "forecast",
                required: "trained",
                actual: "configured",
            }
            .to_code(),
            4
        );
        assert_eq!(ForecastError::ExogenousMismatch("x".into()).to_code(), 5);
        assert_eq!(ForecastError::Data("x".into()).to_code(), 6);
        assert_eq!(
            ForecastError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "x")).to_code(),
            7
        );
        assert_eq!(ForecastError::Serialization("x".into()).to_code(), 8);
    }

    #[test]
    fn test_error_display() {
        let err = ForecastError::InvalidState {
            operation: "forecast",
            required: "trained",
            actual: "configured",
        };
        assert_eq!(
            format!("{}", err),
            "Invalid state: forecast requires a trained model, but it is configured"
        );

        let err = ForecastError::ModelFit("optimizer did not converge".into());
        assert_eq!(
            format!("{}", err),
            "Model fit error: optimizer did not converge"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ForecastError::from(io);
        assert!(matches!(err, ForecastError::Io(_)));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = ForecastError::from(parse);
        assert!(matches!(err, ForecastError::Serialization(_)));
    }
}
