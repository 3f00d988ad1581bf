use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dairy_cms_core::active::ActiveError;
use dairy_cms_core::auth::AuthError;
use dairy_cms_core::form::SubmitError;
use dairy_cms_core::notify::Toast;
use dairy_cms_core::store::StoreError;
use dairy_cms_core::Row;
use serde_json::{json, Value};

pub const LOGIN_ROUTE: &str = "/admin/login";

/// API error type rendered as `{"error": {type, message, statusCode}}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A failed admin action. Carries the toasts it raised and the values
    /// the form held, so the client can keep the dialog populated.
    #[error("{source}")]
    Submit {
        source: SubmitError,
        toasts: Vec<Toast>,
        values: Option<Row>,
    },
}

impl ApiError {
    pub fn submit(source: SubmitError, toasts: Vec<Toast>, values: Option<Row>) -> Self {
        ApiError::Submit {
            source,
            toasts,
            values,
        }
    }
}

fn store_status(err: &StoreError) -> (StatusCode, &'static str) {
    match err {
        StoreError::NoRows => (StatusCode::NOT_FOUND, "notFound"),
        StoreError::UnknownTable(_) | StoreError::InvalidColumn(_) => {
            (StatusCode::BAD_REQUEST, "badRequest")
        }
        StoreError::Remote { code, .. } if code.starts_with("23") => {
            (StatusCode::CONFLICT, "conflict")
        }
        _ => (StatusCode::BAD_GATEWAY, "upstreamError"),
    }
}

fn submit_status(err: &SubmitError) -> (StatusCode, &'static str) {
    match err {
        SubmitError::Invalid(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validationError"),
        SubmitError::Cancelled => (StatusCode::BAD_REQUEST, "cancelled"),
        SubmitError::Closed => (StatusCode::CONFLICT, "conflict"),
        SubmitError::Upload(_) => (StatusCode::BAD_GATEWAY, "uploadFailed"),
        SubmitError::Store(err) | SubmitError::Active(ActiveError::Store(err)) => store_status(err),
        SubmitError::Active(ActiveError::Unsupported(_)) => (StatusCode::BAD_REQUEST, "badRequest"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "notFound", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "badRequest", msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internalError",
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Store(err) => {
                let (status, error_type) = store_status(err);
                if status.is_server_error() {
                    tracing::error!(code = err.code(), "Store error: {err}");
                }
                (status, error_type, err.to_string())
            }
            ApiError::Auth(AuthError::InvalidCredentials) => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                AuthError::InvalidCredentials.to_string(),
            ),
            ApiError::Auth(err) => {
                tracing::error!("Auth service error: {err}");
                (StatusCode::BAD_GATEWAY, "upstreamError", err.to_string())
            }
            ApiError::Submit { source, .. } => {
                let (status, error_type) = submit_status(source);
                (status, error_type, source.to_string())
            }
        };

        let mut error = json!({
            "type": error_type,
            "message": message,
            "statusCode": status.as_u16(),
        });
        if status == StatusCode::UNAUTHORIZED {
            error["redirect"] = Value::from(LOGIN_ROUTE);
        }

        let mut body = json!({ "error": error });
        if let ApiError::Submit {
            source,
            toasts,
            values,
        } = self
        {
            if let SubmitError::Invalid(fields) = &source {
                body["error"]["fields"] = json!(fields);
            }
            if let Some(values) = values {
                body["values"] = Value::Object(values);
            }
            body["toasts"] = json!(toasts);
        }

        (status, Json(body)).into_response()
    }
}

/// Convenience type alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;
