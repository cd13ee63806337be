use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tourbook_agent::AgentError;
use tourbook_core::CoreError;

/// Response bodies for 503s; driver and client details only reach the log.
const STORE_UNAVAILABLE: &str = "Store unavailable";
const AGENT_UNAVAILABLE: &str = "Chat agent unavailable";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    NotFoundError(String),
    #[error("{0}")]
    ServiceUnavailable(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ServiceUnavailable(msg) => {
                tracing::error!("Service unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg)
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(msg) => AppError::NotFoundError(msg),
            CoreError::InvalidRequest(msg) => AppError::ValidationError(msg),
            CoreError::StoreUnavailable(detail) => {
                tracing::error!(error = %detail, "store unavailable");
                AppError::ServiceUnavailable(STORE_UNAVAILABLE.to_string())
            }
        }
    }
}

impl From<AgentError> for AppError {
    fn from(err: AgentError) -> Self {
        tracing::error!(error = %err, "chat agent failed");
        AppError::ServiceUnavailable(AGENT_UNAVAILABLE.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_store_outage_hides_driver_detail() {
        let err = AppError::from(CoreError::StoreUnavailable(
            "error returned from database: value too long for type character varying(100)".into(),
        ));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({"error": "Store unavailable"}));
    }

    #[tokio::test]
    async fn test_agent_failure_hides_cause() {
        let err = AppError::from(AgentError::Session("connection refused (os error 111)".into()));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({"error": "Chat agent unavailable"}));
    }

    #[tokio::test]
    async fn test_core_errors_keep_client_messages() {
        let (status, body) = render(CoreError::NotFound("Tour with id 9 not found".into()).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Tour with id 9 not found");

        let (status, body) = render(CoreError::InvalidRequest("Only 2 slots left".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Only 2 slots left");
    }
}
