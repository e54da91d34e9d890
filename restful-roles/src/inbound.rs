//! Inbound request context handed to handlers

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::HeaderMap,
};
use serde::de::DeserializeOwned;

use crate::conditional::CacheValidators;
use crate::handlers::ApiError;
use crate::store::{StoreError, StoreResult};

/// Headers and body of the request a handler call is bound to
///
/// Read-only for the duration of the call. Deserialisers read the body from
/// here; handlers read the cache validators.
#[derive(Debug, Clone, Default)]
pub struct Inbound {
    headers: HeaderMap,
    body: Bytes,
}

impl Inbound {
    pub fn new(headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            headers,
            body: body.into(),
        }
    }

    /// A request with a body and no headers
    pub fn with_body(body: impl Into<Bytes>) -> Self {
        Self::new(HeaderMap::new(), body)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Cache validators carried by the request headers
    pub fn validators(&self) -> CacheValidators {
        CacheValidators::from_headers(&self.headers)
    }

    /// Body as UTF-8 text
    pub fn text(&self) -> StoreResult<&str> {
        std::str::from_utf8(&self.body)
            .map_err(|e| StoreError::invalid_input(format!("Request body is not UTF-8: {}", e)))
    }

    /// Body decoded as JSON
    pub fn json<T: DeserializeOwned>(&self) -> StoreResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

impl<S> FromRequest<S> for Inbound
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let headers = req.headers().clone();
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read request body: {}", e)))?;
        Ok(Self { headers, body })
    }
}
