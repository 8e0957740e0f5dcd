use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::applications::{DecisioningServiceError, RepositoryError};
use crate::workflows::bureau::{BureauTablesError, ParseError};
use crate::workflows::eligibility::EligibilityConfigError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Top-level error for binaries and startup paths.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Json(serde_json::Error),
    Tables(BureauTablesError),
    Policy(EligibilityConfigError),
    Bureau(ParseError),
    Decisioning(DecisioningServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Json(err) => write!(f, "invalid json: {}", err),
            AppError::Tables(err) => write!(f, "bureau tables error: {}", err),
            AppError::Policy(err) => write!(f, "policy error: {}", err),
            AppError::Bureau(err) => write!(f, "bureau report error: {}", err),
            AppError::Decisioning(err) => write!(f, "decisioning error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Tables(err) => Some(err),
            AppError::Policy(err) => Some(err),
            AppError::Bureau(err) => Some(err),
            AppError::Decisioning(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Json(_)
            | AppError::Bureau(_)
            | AppError::Decisioning(DecisioningServiceError::Validation(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Decisioning(DecisioningServiceError::Repository(RepositoryError::NotFound)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Config(_) | AppError::Decisioning(DecisioningServiceError::Gateway(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Tables(_)
            | AppError::Policy(_)
            | AppError::Decisioning(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<BureauTablesError> for AppError {
    fn from(value: BureauTablesError) -> Self {
        Self::Tables(value)
    }
}

impl From<EligibilityConfigError> for AppError {
    fn from(value: EligibilityConfigError) -> Self {
        Self::Policy(value)
    }
}

impl From<ParseError> for AppError {
    fn from(value: ParseError) -> Self {
        Self::Bureau(value)
    }
}

impl From<DecisioningServiceError> for AppError {
    fn from(value: DecisioningServiceError) -> Self {
        Self::Decisioning(value)
    }
}
