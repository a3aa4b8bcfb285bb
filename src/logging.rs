//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::Error;

/// Bodies longer than this many bytes are cut short in `info` logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

const REDACTED: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated
/// and the full body is logged at the `debug` level. The value of any JSON
/// field whose name contains "password" is replaced before logging, and a
/// body that is not valid JSON but mentions a password is not logged at all.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return Error::InvalidBody(error.to_string()).into_response();
        }
    };

    log_request(&parts, &body_for_log(&parts.headers, &body_bytes));

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return Error::IoError(error.to_string()).into_response();
        }
    };

    log_response(&parts, &body_for_log(&parts.headers, &body_bytes));

    Response::from_parts(parts, Body::from(body_bytes))
}

/// The text of a body as it should appear in the logs.
fn body_for_log(headers: &HeaderMap, body: &[u8]) -> String {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("multipart/") {
        return format!("<multipart body, {} bytes>", body.len());
    }

    // Any body that parses as JSON is redacted, whatever its content type.
    match serde_json::from_slice::<Value>(body) {
        Ok(mut json) => {
            redact_passwords(&mut json);
            json.to_string()
        }
        Err(_) => {
            let text = String::from_utf8_lossy(body);

            if text.to_lowercase().contains("password") {
                format!("<unparsed body mentioning a password, {} bytes>", body.len())
            } else {
                text.into_owned()
            }
        }
    }
}

/// Replace the value of every field, at any depth, whose name contains "password".
fn redact_passwords(json: &mut Value) {
    match json {
        Value::Object(fields) => {
            for (key, value) in fields.iter_mut() {
                if key.to_lowercase().contains("password") {
                    *value = Value::String(REDACTED.to_owned());
                } else {
                    redact_passwords(value);
                }
            }
        }
        Value::Array(values) => values.iter_mut().for_each(redact_passwords),
        _ => {}
    }
}

/// Cut `text` to at most `limit` bytes without splitting a character.
fn truncate(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }

    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

fn log_request(parts: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {} {}\nbody: {}...",
            parts.method,
            parts.uri,
            truncate(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!(
            "Received request: {} {}\nbody: {body:?}",
            parts.method,
            parts.uri
        );
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {}\nbody: {}...",
            parts.status,
            truncate(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {}\nbody: {body:?}", parts.status);
    }
}

#[cfg(test)]
mod logging_tests {
    use axum::{
        Json, Router,
        http::{HeaderMap, HeaderValue, header::CONTENT_TYPE},
        middleware,
        routing::post,
    };
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use super::{body_for_log, logging_middleware, redact_passwords, truncate};

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    #[test]
    fn redacts_nested_password_fields() {
        let mut body = json!({
            "name": "alice",
            "password": "hunter2",
            "change": {"current_password": "a", "new_password": "b"},
            "list": [{"Password": "c"}]
        });

        redact_passwords(&mut body);

        assert_eq!(
            body,
            json!({
                "name": "alice",
                "password": "********",
                "change": {"current_password": "********", "new_password": "********"},
                "list": [{"Password": "********"}]
            })
        );
    }

    #[test]
    fn logged_json_body_hides_password() {
        let text = body_for_log(
            &json_headers(),
            br#"{"name":"alice","password":"hunter2"}"#,
        );

        assert!(!text.contains("hunter2"), "password leaked into {text}");
        assert!(text.contains("alice"));
    }

    #[test]
    fn json_body_without_json_content_type_hides_password() {
        let body = br#"{"name":"alice","password":"hunter2-secret"}"#;
        let mut text_headers = HeaderMap::new();
        text_headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        for headers in [text_headers, HeaderMap::new()] {
            let text = body_for_log(&headers, body);

            assert!(!text.contains("hunter2-secret"), "password leaked into {text}");
            assert!(text.contains("alice"));
        }
    }

    #[test]
    fn malformed_json_with_password_is_withheld() {
        let body = br#"{"name":"alice","password":"hunter2-secret""#;

        let text = body_for_log(&json_headers(), body);

        assert!(!text.contains("hunter2-secret"), "password leaked into {text}");
        assert_eq!(
            text,
            format!("<unparsed body mentioning a password, {} bytes>", body.len())
        );
    }

    #[test]
    fn non_json_body_is_logged_as_text() {
        assert_eq!(body_for_log(&HeaderMap::new(), b"hello"), "hello");
    }

    #[test]
    fn multipart_body_is_summarized() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("multipart/form-data; boundary=x"),
        );

        assert_eq!(
            body_for_log(&headers, &[0xff, 0x00, 0x12]),
            "<multipart body, 3 bytes>"
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("≥≥", 4), "≥");
        assert_eq!(truncate("abc", 64), "abc");
    }

    #[tokio::test]
    async fn middleware_passes_bodies_through() {
        async fn echo(Json(body): Json<Value>) -> Json<Value> {
            Json(body)
        }

        let app = Router::new()
            .route("/echo", post(echo))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");
        let body = json!({"password": "hunter2", "note": "x".repeat(100)});

        let response = server.post("/echo").json(&body).await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), body);
    }
}
