//! Conditional retrieval results and request validators

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use chrono::{DateTime, Utc};
use std::convert::Infallible;

/// Outcome of an operation that may short-circuit on cache validators
///
/// `NotModified` carries nothing; `Retrieved` always carries exactly one
/// value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionalResult<T> {
    /// The client's cached copy is still current
    NotModified,
    /// The full value was produced
    Retrieved(T),
}

impl<T> ConditionalResult<T> {
    /// Wrap a produced value
    pub fn retrieved(value: T) -> Self {
        Self::Retrieved(value)
    }

    /// Whether a value was produced
    pub fn is_retrieved(&self) -> bool {
        matches!(self, Self::Retrieved(_))
    }

    /// Whether the result short-circuited
    pub fn is_not_modified(&self) -> bool {
        matches!(self, Self::NotModified)
    }

    /// The produced value, if any
    pub fn into_retrieved(self) -> Option<T> {
        match self {
            Self::Retrieved(value) => Some(value),
            Self::NotModified => None,
        }
    }

    /// Borrow the produced value, if any
    pub fn as_ref(&self) -> ConditionalResult<&T> {
        match self {
            Self::Retrieved(value) => ConditionalResult::Retrieved(value),
            Self::NotModified => ConditionalResult::NotModified,
        }
    }

    /// Transform the produced value, keeping `NotModified` as is
    pub fn map<U, F>(self, f: F) -> ConditionalResult<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Retrieved(value) => ConditionalResult::Retrieved(f(value)),
            Self::NotModified => ConditionalResult::NotModified,
        }
    }
}

/// Request-supplied cache validators
///
/// Built once per request, either from the request headers or directly by a
/// caller that already holds the values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheValidators {
    if_modified_since: Option<DateTime<Utc>>,
    if_none_match: Option<String>,
}

impl CacheValidators {
    /// Validators with neither header present
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `If-None-Match` entity tag
    #[must_use]
    pub fn with_if_none_match(mut self, tag: impl Into<String>) -> Self {
        self.if_none_match = Some(tag.into());
        self
    }

    /// Set the `If-Modified-Since` timestamp
    #[must_use]
    pub fn with_if_modified_since(mut self, since: DateTime<Utc>) -> Self {
        self.if_modified_since = Some(since);
        self
    }

    /// Extract validators from request headers.
    ///
    /// Only the first `If-None-Match` entry is kept, whether the client sent
    /// the header several times or a comma-separated list. An
    /// `If-Modified-Since` value that is not a valid HTTP-date is ignored.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let if_none_match = headers
            .get_all(header::IF_NONE_MATCH)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(split_list)
            .map(str::trim)
            .find(|tag| !tag.is_empty())
            .map(String::from);

        let if_modified_since = headers
            .get(header::IF_MODIFIED_SINCE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| DateTime::parse_from_rfc2822(value.trim()).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Self {
            if_modified_since,
            if_none_match,
        }
    }

    /// The `If-None-Match` entity tag, verbatim
    pub fn if_none_match(&self) -> Option<&str> {
        self.if_none_match.as_deref()
    }

    /// The `If-Modified-Since` timestamp
    pub fn if_modified_since(&self) -> Option<DateTime<Utc>> {
        self.if_modified_since
    }

    /// Whether no validator was supplied
    pub fn is_empty(&self) -> bool {
        self.if_none_match.is_none() && self.if_modified_since.is_none()
    }
}

/// Split a header list on the commas that sit outside quoted strings
fn split_list(value: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut quoted = false;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => {
                items.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&value[start..]);
    items
}

impl<S> FromRequestParts<S> for CacheValidators
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
