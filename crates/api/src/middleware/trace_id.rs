//! Request tracing middleware.
//!
//! Every request gets an ID, taken from `X-Request-ID` when the caller sends
//! one. Handlers read it through the [`RequestId`] extractor and stamp it on
//! audit entries.

use std::convert::Infallible;

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{header::HeaderName, request::Parts, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for request ID.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Longest caller-supplied ID that is accepted as-is.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Request ID stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestId>()
            .cloned()
            .unwrap_or_else(|| RequestId("unknown".to_string())))
    }
}

fn request_id_from_header(value: Option<&HeaderValue>) -> String {
    value
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.len() <= MAX_REQUEST_ID_LEN)
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Middleware that extracts or generates a request ID.
///
/// The ID is stored in request extensions, echoed in the response headers
/// and attached to a tracing span wrapping the rest of the stack.
pub async fn trace_id(mut req: Request<Body>, next: Next) -> Response {
    let request_id = request_id_from_header(req.headers().get(REQUEST_ID_HEADER));

    req.extensions_mut().insert(RequestId(request_id.clone()));

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let start = std::time::Instant::now();
        let mut response = next.run(req).await;

        tracing::info!(
            status = response.status().as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );

        if let Ok(header_value) = HeaderValue::from_str(&request_id) {
            response
                .headers_mut()
                .insert(HeaderName::from_static("x-request-id"), header_value);
        }

        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_from_header_present() {
        let value = HeaderValue::from_static("req-123_abc.xyz");
        assert_eq!(request_id_from_header(Some(&value)), "req-123_abc.xyz");
    }

    #[test]
    fn test_request_id_generated_when_missing() {
        let id = request_id_from_header(None);
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_request_id_generated_when_blank_or_oversized() {
        let blank = HeaderValue::from_static("   ");
        assert!(Uuid::parse_str(&request_id_from_header(Some(&blank))).is_ok());

        let long = HeaderValue::from_str(&"a".repeat(MAX_REQUEST_ID_LEN + 1)).unwrap();
        assert!(Uuid::parse_str(&request_id_from_header(Some(&long))).is_ok());
    }

    #[tokio::test]
    async fn test_request_id_extractor() {
        let mut req = Request::builder().body(()).unwrap();
        req.extensions_mut()
            .insert(RequestId("my-request-id".to_string()));
        let (mut parts, _) = req.into_parts();

        let id = RequestId::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(id.as_str(), "my-request-id");
    }

    #[tokio::test]
    async fn test_request_id_extractor_missing() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let id = RequestId::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(id.as_str(), "unknown");
    }

    #[test]
    fn test_request_id_header_constant() {
        assert_eq!(REQUEST_ID_HEADER, "X-Request-ID");
    }
}
