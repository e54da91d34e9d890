//! Handler responses with the status codes of the REST pipeline
//!
//! ## Status Codes Produced
//!
//! - **200 OK** - representation retrieved, or an upsert replaced a resource
//! - **201 Created** - upsert created a resource, or a POST inserted one
//! - **204 No Content** - resource deleted
//! - **304 Not Modified** - request validators matched
//! - **406 Not Acceptable** - collection level delete
//!
//! Failures (404, 409, ...) are [`ApiError`](crate::handlers::ApiError)s.

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::caching::CacheHeaders;
use crate::representation::Representation;

/// Status, headers and optional body assembled by a handler
#[derive(Debug, Clone)]
pub struct RestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl RestResponse {
    /// A bodiless response with the given status
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// 200 with the serialised resource as body
    pub fn ok(representation: Representation) -> Self {
        Self::new(StatusCode::OK).with_representation(representation)
    }

    /// 304 with an empty body
    pub fn not_modified() -> Self {
        Self::new(StatusCode::NOT_MODIFIED)
    }

    /// 201 with a `Location` header pointing at the new resource
    pub fn created_at(location: HeaderValue) -> Self {
        Self::new(StatusCode::CREATED).with_header(header::LOCATION, location)
    }

    /// 204
    pub fn no_content() -> Self {
        Self::new(StatusCode::NO_CONTENT)
    }

    /// 406, used to reject bulk deletes
    pub fn not_acceptable() -> Self {
        Self::new(StatusCode::NOT_ACCEPTABLE)
    }

    /// Replace the body and its content type
    #[must_use]
    pub fn with_representation(mut self, representation: Representation) -> Self {
        let (content_type, body) = representation.into_parts();
        match content_type {
            Some(value) => {
                self.headers.insert(header::CONTENT_TYPE, value);
            }
            None => {
                self.headers.remove(header::CONTENT_TYPE);
            }
        }
        self.body = Some(body);
        self
    }

    /// Add `ETag` / `Last-Modified`
    #[must_use]
    pub fn with_cache_headers(mut self, cache_headers: &CacheHeaders) -> Self {
        cache_headers.apply(&mut self.headers);
        self
    }

    /// Set a single header, replacing any previous value
    #[must_use]
    pub fn with_header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Body as UTF-8, if there is one and it is valid
    pub fn body_text(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|body| std::str::from_utf8(body).ok())
    }

    /// The `ETag` header, if set
    pub fn etag(&self) -> Option<&str> {
        self.header_str(header::ETAG)
    }

    /// The `Last-Modified` header, if set
    pub fn last_modified(&self) -> Option<&str> {
        self.header_str(header::LAST_MODIFIED)
    }

    /// The `Location` header, if set
    pub fn location(&self) -> Option<&str> {
        self.header_str(header::LOCATION)
    }

    fn header_str(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

impl IntoResponse for RestResponse {
    fn into_response(self) -> Response {
        let body = self.body.map(Body::from).unwrap_or_else(Body::empty);
        (self.status, self.headers, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_copies_content_type() {
        let response = RestResponse::ok(Representation::text("Chart 876"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body_text(), Some("Chart 876"));
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn test_bodiless_statuses() {
        assert_eq!(RestResponse::not_modified().status(), StatusCode::NOT_MODIFIED);
        assert!(RestResponse::not_modified().body().is_none());
        assert_eq!(RestResponse::no_content().status(), StatusCode::NO_CONTENT);
        assert_eq!(RestResponse::not_acceptable().status(), StatusCode::NOT_ACCEPTABLE);
        assert!(RestResponse::not_acceptable().body().is_none());
    }

    #[test]
    fn test_created_at_sets_location() {
        let response = RestResponse::created_at(HeaderValue::from_static("/charts/42"));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.location(), Some("/charts/42"));
    }

    #[tokio::test]
    async fn test_into_response_keeps_status_headers_and_body() {
        let response = RestResponse::ok(Representation::text("2 charts"))
            .with_header(header::ETAG, HeaderValue::from_static("\"7\""))
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(header::ETAG).unwrap(), "\"7\"");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"2 charts");
    }
}
