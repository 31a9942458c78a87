//! Error handling for the purchase launch server
//!
//! Provides consistent error responses in English and Portuguese

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{IdentifierField, LaunchError, LaunchRow};
use thiserror::Error;

use crate::gateway::GatewayError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String, message_pt: String },

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_pt: String,
    },

    // Launch workflow errors
    #[error(transparent)]
    Launch(#[from] LaunchError),

    /// A batch that was refused; carries the rows with their markers
    #[error("Launch rejected: {error}")]
    LaunchRejected {
        error: LaunchError,
        rows: Vec<LaunchRow>,
    },

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_pt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<LaunchRow>>,
}

impl ErrorDetail {
    pub fn new(code: &str, message_en: impl Into<String>, message_pt: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message_en: message_en.into(),
            message_pt: message_pt.into(),
            field: None,
            rows: None,
        }
    }

    fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

fn launch_status(error: &LaunchError) -> StatusCode {
    match error {
        LaunchError::InvalidImei { .. }
        | LaunchError::DuplicateIdentifiers { .. }
        | LaunchError::MissingSalePrice { .. }
        | LaunchError::InvalidQuantity { .. }
        | LaunchError::NothingToLaunch
        | LaunchError::NothingToRevert
        | LaunchError::OrderCancelled => StatusCode::UNPROCESSABLE_ENTITY,
        LaunchError::Conflict { .. } | LaunchError::RevertRefused { .. } => StatusCode::CONFLICT,
        LaunchError::Transient(_) => StatusCode::BAD_GATEWAY,
        LaunchError::UnknownItem(_)
        | LaunchError::RowOutOfRange(_)
        | LaunchError::NotBulkEditable(_) => StatusCode::BAD_REQUEST,
    }
}

fn launch_detail(error: &LaunchError) -> ErrorDetail {
    let detail = ErrorDetail::new(error.code(), error.to_string(), error.message_pt());
    match error {
        LaunchError::InvalidImei { field, .. } => detail.with_field(field_name(*field)),
        LaunchError::MissingSalePrice { .. } => detail.with_field("salePrice"),
        LaunchError::InvalidQuantity { .. } => detail.with_field("quantity"),
        LaunchError::RowOutOfRange(_) => detail.with_field("index"),
        LaunchError::NotBulkEditable(field) => detail.with_field(*field),
        _ => detail,
    }
}

fn field_name(field: IdentifierField) -> &'static str {
    match field {
        IdentifierField::SerialNumber => "serialNumber",
        IdentifierField::Imei1 => "imei1",
        IdentifierField::Imei2 => "imei2",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("TOKEN_EXPIRED", "Token has expired", "Sessão expirada"),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("INVALID_TOKEN", "Invalid token", "Token inválido"),
            ),
            AppError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                ErrorDetail::new(
                    "INSUFFICIENT_PERMISSIONS",
                    "You do not have permission to perform this action",
                    "Você não tem permissão para executar esta ação",
                ),
            ),
            AppError::Unauthorized {
                message,
                message_pt,
            } => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("UNAUTHORIZED", message.clone(), message_pt.clone()),
            ),
            AppError::Validation {
                field,
                message,
                message_pt,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", message.clone(), message_pt.clone())
                    .with_field(field.clone()),
            ),
            AppError::Launch(error) => (launch_status(error), launch_detail(error)),
            AppError::LaunchRejected { error, rows } => {
                let mut detail = launch_detail(error);
                detail.rows = Some(rows.clone());
                (launch_status(error), detail)
            }
            AppError::Gateway(GatewayError::NotFound(id)) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new(
                    "NOT_FOUND",
                    format!("Purchase order {} not found", id),
                    format!("Compra {} não encontrada", id),
                ),
            ),
            AppError::Gateway(GatewayError::Duplicates(conflict)) => (
                StatusCode::CONFLICT,
                ErrorDetail::new(
                    &conflict.code,
                    "Identifiers already registered in stock",
                    conflict.message(),
                ),
            ),
            AppError::Gateway(GatewayError::Rejected(message)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new("REJECTED", message.clone(), message.clone()),
            ),
            AppError::Gateway(GatewayError::Database(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "DATABASE_ERROR",
                    "A database error occurred",
                    "Ocorreu um erro no banco de dados",
                ),
            ),
        };

        // Client errors are routine; log them quietly
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request refused: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|f| f.to_string())
            .unwrap_or_default();
        AppError::Validation {
            message: errors.to_string(),
            message_pt: format!("Dados inválidos no campo '{}'", field),
            field,
        }
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_unprocessable() {
        let error = LaunchError::MissingSalePrice { rows: vec![0] };
        assert_eq!(launch_status(&error), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(launch_detail(&error).field.as_deref(), Some("salePrice"));
    }

    #[test]
    fn test_quantity_error_points_at_quantity() {
        let error = LaunchError::InvalidQuantity { rows: vec![2] };
        assert_eq!(launch_status(&error), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(launch_detail(&error).field.as_deref(), Some("quantity"));
    }

    #[test]
    fn test_conflict_and_transient_status() {
        let conflict = LaunchError::Conflict {
            rows: vec![1],
            message: "IMEI já cadastrado".into(),
        };
        assert_eq!(launch_status(&conflict), StatusCode::CONFLICT);
        assert_eq!(
            launch_status(&LaunchError::Transient("timeout".into())),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_rejected_batch_carries_rows() {
        let response = AppError::LaunchRejected {
            error: LaunchError::NothingToLaunch,
            rows: vec![LaunchRow::default()],
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
