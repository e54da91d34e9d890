//! Serialised resource bodies

use axum::body::Bytes;
use axum::http::HeaderValue;
use serde::Serialize;

use crate::store::{StoreError, StoreOperation, StoreResult};

/// A resource rendered by a [`Serialiser`](crate::roles::Serialiser)
///
/// The format is entirely up to the serialiser; handlers only copy the
/// content type and bytes into the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Representation {
    content_type: Option<HeaderValue>,
    body: Bytes,
}

impl Representation {
    /// Raw bytes without a content type
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            content_type: None,
            body: body.into(),
        }
    }

    /// UTF-8 plain text
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            content_type: Some(HeaderValue::from_static("text/plain; charset=utf-8")),
            body: Bytes::from(body.into()),
        }
    }

    /// JSON encoding of `value`
    pub fn json<T>(value: &T) -> StoreResult<Self>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(value)
            .map_err(|e| StoreError::serialization(StoreOperation::Serialise, e.to_string()))?;
        Ok(Self {
            content_type: Some(HeaderValue::from_static("application/json")),
            body: Bytes::from(body),
        })
    }

    /// Override the content type
    #[must_use]
    pub fn with_content_type(mut self, content_type: HeaderValue) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn content_type(&self) -> Option<&HeaderValue> {
        self.content_type.as_ref()
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as UTF-8, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    pub fn into_parts(self) -> (Option<HeaderValue>, Bytes) {
        (self.content_type, self.body)
    }
}
