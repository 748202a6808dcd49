use actix_web::http::StatusCode;
use actix_web::http::header::{self, ContentType};
use actix_web::{HttpRequest, HttpResponse, error, web};

use super::types::ErrorBody;
use crate::errors::SnaplinkError;

/// Largest accepted JSON body.
pub const JSON_PAYLOAD_LIMIT: usize = 16 * 1024;

/// JSON error response for `err`, with `Retry-After` on 429.
pub fn error_response(err: &SnaplinkError) -> HttpResponse {
    let mut builder = HttpResponse::build(err.http_status());
    if let Some(secs) = err.retry_after_secs() {
        builder.insert_header((header::RETRY_AFTER, secs.to_string()));
    }
    builder.json(ErrorBody {
        code: err.code().to_string(),
        error: err.error_type().to_string(),
        message: err.message().to_string(),
    })
}

/// Plain 404 used by the redirect route.
pub fn not_found_response() -> HttpResponse {
    HttpResponse::build(StatusCode::NOT_FOUND)
        .insert_header(ContentType::plaintext())
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .body("Not Found")
}

/// Malformed or oversized JSON bodies become 400 validation errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_PAYLOAD_LIMIT)
        .error_handler(|err, _req: &HttpRequest| {
            let mapped = SnaplinkError::validation(format!("Invalid request body: {}", err));
            error::InternalError::from_response(err, error_response(&mapped)).into()
        })
}
