use crate::error::Error;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub(crate) struct APIError(anyhow::Error);

impl IntoResponse for APIError {
    fn into_response(self) -> Response {
        let any_err = self.0;
        let status = match any_err.downcast_ref::<Error>() {
            Some(Error::AuthForbidden(_)) => StatusCode::FORBIDDEN,
            Some(
                Error::Validation(_)
                | Error::ListFailed(_)
                | Error::CreateFailed(_, _)
                | Error::BulkCreateFailed
                | Error::DeleteFailed(_, _),
            ) => StatusCode::BAD_REQUEST,
            Some(Error::NotFound(_)) => StatusCode::NOT_FOUND,
            Some(Error::Unhealthy(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Some(Error::JsonExtractorRejection(err)) => rejection_status(err),
            Some(_) => StatusCode::INTERNAL_SERVER_ERROR,
            // Extractor rejections arrive through `WithRejection` without an `Error` wrapper.
            None => any_err
                .downcast_ref::<JsonRejection>()
                .map_or(StatusCode::INTERNAL_SERVER_ERROR, rejection_status),
        };
        let body = match any_err.downcast_ref::<Error>() {
            Some(Error::Validation(errors)) => Json(json!({
                "title": format!("{any_err}"),
                "status": status.as_u16(),
                "errors": errors,
            })),
            _ => Json(json!({
                "error": format!("{any_err}"),
            })),
        };
        (status, body).into_response()
    }
}

fn rejection_status(rejection: &JsonRejection) -> StatusCode {
    match rejection {
        JsonRejection::JsonDataError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        JsonRejection::JsonSyntaxError(_) => StatusCode::BAD_REQUEST,
        JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl<E> From<E> for APIError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
