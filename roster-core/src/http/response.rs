//! Response builders for route handlers.

use crate::error::{Error, ProblemDetails};
use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use hyper::Response;
use serde::Serialize;

pub type HttpResponse = Response<Full<Bytes>>;

/// JSON response with the given status code.
pub fn json<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> HttpResponse {
    match serde_json::to_vec(body) {
        Ok(bytes) => with_body(status, "application/json", bytes),
        Err(e) => {
            log::error!("Failed to serialize response body: {}", e);
            let fallback = br#"{"success":false}"#.to_vec();
            with_body(StatusCode::INTERNAL_SERVER_ERROR, "application/json", fallback)
        }
    }
}

/// Structured error payload for `error` raised while serving `path`.
pub fn problem(error: &Error, type_base: &str, path: &str) -> HttpResponse {
    let details = ProblemDetails::from_error(error, type_base, Some(path));
    let status = StatusCode::from_u16(details.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        log::error!("{} failed: {}", path, error);
    }
    json(status, &details)
}

pub fn empty(status: StatusCode) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

fn with_body(status: StatusCode, content_type: &'static str, body: Vec<u8>) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
