use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::post::post_service::StoreError;
use crate::uploader::service::UploadError;

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    NotFoundError(String),

    #[error("{0}")]
    InternalServerError(String),
}

impl ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::ValidationError(..) => StatusCode::BAD_REQUEST,
            CustomError::NotFoundError(..) => StatusCode::NOT_FOUND,
            CustomError::InternalServerError(..) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(self.to_string())
    }
}

impl From<StoreError> for CustomError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => CustomError::NotFoundError("Post not found".into()),
            StoreError::Conflict(id) => {
                CustomError::ValidationError(format!("A post with id {} already exists", id))
            }
            StoreError::IdsExhausted(_) => CustomError::ValidationError(
                "No post id is available; supply an unused id".into(),
            ),
            StoreError::Io(_) | StoreError::Parse(_) => {
                log::error!("Post store failure: {}", err);
                CustomError::InternalServerError("Internal Server Error".into())
            }
        }
    }
}

impl From<UploadError> for CustomError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Invalid(message) => CustomError::ValidationError(message),
            UploadError::Io(e) => {
                log::error!("Upload storage failure: {}", e);
                CustomError::InternalServerError("Internal Server Error".into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_http_statuses() {
        let not_found: CustomError = StoreError::NotFound(3).into();
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_string(), "Post not found");

        let conflict: CustomError = StoreError::Conflict(3).into();
        assert_eq!(conflict.status_code(), StatusCode::BAD_REQUEST);

        let exhausted: CustomError = StoreError::IdsExhausted(u64::MAX).into();
        assert_eq!(exhausted.status_code(), StatusCode::BAD_REQUEST);

        let io: CustomError =
            StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk gone")).into();
        assert_eq!(io.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        // The underlying cause stays in the logs.
        assert_eq!(io.to_string(), "Internal Server Error");
    }

    #[test]
    fn upload_io_failures_are_server_errors() {
        let invalid: CustomError = UploadError::Invalid("File is empty".into()).into();
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.to_string(), "File is empty");

        let io: CustomError = UploadError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "Not a directory (os error 20)",
        ))
        .into();
        assert_eq!(io.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(io.to_string(), "Internal Server Error");
    }
}
