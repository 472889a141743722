use actix_web::http::{header::ContentType, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use domain_upload::exception::UploadException;

/// An [`UploadException`] on its way to becoming a response.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub UploadException);

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        if self.0.is_bad_request() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // Server side failures carry paths and OS errors, keep those in the log.
        let body = if status == StatusCode::BAD_REQUEST {
            self.0.to_string()
        } else {
            "Error writing chunk".to_string()
        };
        HttpResponse::build(status)
            .insert_header(ContentType::plaintext())
            .body(body)
    }
}
