use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use budget_summary::ContractError;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Contract(#[from] ContractError),
    #[error("{0}")]
    BadRequest(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<Value>,
}

impl Error {
    fn kind(&self) -> &'static str {
        match self {
            Error::Upstream(_) => "upstream_failure",
            Error::Contract(_) => "data_contract_violation",
            Error::BadRequest(_) => "bad_request",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Error::Upstream(_) => StatusCode::BAD_GATEWAY,
            Error::Contract(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let provider = match &self {
            Error::Upstream(UpstreamError::Provider { body, .. }) => Some(body.clone()),
            _ => None,
        };

        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
            provider,
        };

        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn maps_errors_to_status_codes() {
        let tests = vec![
            (
                Error::Upstream(UpstreamError::Provider {
                    endpoint: "/accounts/get",
                    status: 400,
                    body: json!({}),
                }),
                StatusCode::BAD_GATEWAY,
            ),
            (
                Error::BadRequest("start_date is after end_date".into()),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for t in tests {
            assert_eq!(t.0.into_response().status(), t.1);
        }
    }
}
