use crate::models::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::Error;
use tracing::{debug, warn};

/// Wraps the workspace error so handlers can use `?`.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Precondition(_) => StatusCode::BAD_REQUEST,
        Error::NotFound => StatusCode::NOT_FOUND,
        Error::Interrupted | Error::Unavailable(_) | Error::Lifecycle(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        Error::Binding { .. } | Error::Config(_) | Error::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        match &self.0 {
            Error::Interrupted => debug!("request interrupted"),
            e if status.is_server_error() => warn!("request failed: {}", e),
            _ => {}
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&Error::precondition("bad")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&Error::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&Error::Interrupted),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&Error::Timeout(Duration::from_millis(5))),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_for(&Error::Unavailable("down".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&Error::Lifecycle("terminated")),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
