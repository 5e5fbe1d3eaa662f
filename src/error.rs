use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::StoreError;

/// Every failure a handler can surface. The mapping to a status code and JSON
/// body happens only in [`IntoResponse`] below.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        targets: BTreeMap<String, String>,
    },
    #[error("{0}")]
    NotFound(String),
    #[error("CSRF Token Mismatch")]
    Csrf,
    /// The request itself could not be read, e.g. a body over the size limit.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn not_found(entity: &str, id: i64) -> Self {
        Self::NotFound(format!("{entity}({id}) not found"))
    }

    /// A domain rule failed for one field; the message doubles as the target.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Validation {
            targets: BTreeMap::from([(field.to_string(), message.clone())]),
            message,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Csrf => StatusCode::FORBIDDEN,
            Self::Rejected { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation { message, targets } => json!({ "message": message, "targets": targets }),
            Self::NotFound(message) => json!({ "message": message }),
            Self::Csrf => json!({ "message": "CSRF Token Mismatch" }),
            Self::Rejected { message, .. } => {
                tracing::debug!(%status, %message, "request rejected");
                json!({ "message": message })
            }
            Self::Internal(err) => {
                tracing::error!(error = ?err, "request failed");
                json!({ "message": "Internal server error" })
            }
        };
        (status, Json(body)).into_response()
    }
}
