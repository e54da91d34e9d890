//! Cache freshness decisions and response cache headers
//!
//! Everything here is facet based: the same functions serve single
//! instances and collection index objects.
//!
//! - [`is_not_modified`]: does a resource satisfy the request validators?
//! - [`retrieve_conditionally`]: wrap a resource in a [`ConditionalResult`]
//!   using that decision, for collaborators implementing `Retriever` or
//!   `Indexer`
//! - [`CacheHeaders`]: the `ETag` and `Last-Modified` headers of a response

use axum::http::{header, HeaderMap, HeaderValue};
use chrono::{DateTime, Utc};

use crate::conditional::{CacheValidators, ConditionalResult};
use crate::facets::CacheFacets;

/// Format of an HTTP-date (IMF-fixdate), always in GMT
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Render a timestamp as an HTTP-date
pub fn http_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format(HTTP_DATE_FORMAT).to_string()
}

/// Decide whether the client's cached copy of `resource` is still current.
///
/// The entity tag is checked first: equal raw strings mean not modified.
/// The last-modified timestamp is checked next: a timestamp at or before
/// `If-Modified-Since` means not modified. A facet the type does not declare,
/// or a value or validator that is absent, never short-circuits.
pub fn is_not_modified<T>(resource: &T, validators: &CacheValidators) -> bool
where
    T: CacheFacets + ?Sized,
{
    if T::FACETS.has_etag() {
        if let (Some(tag), Some(if_none_match)) = (resource.etag(), validators.if_none_match()) {
            if tag == if_none_match {
                return true;
            }
        }
    }

    if T::FACETS.has_last_modified() {
        if let (Some(modified), Some(since)) =
            (resource.last_modified(), validators.if_modified_since())
        {
            if modified <= since {
                return true;
            }
        }
    }

    false
}

/// Produce `NotModified` when the validators match, the resource otherwise
pub fn retrieve_conditionally<T>(resource: T, validators: &CacheValidators) -> ConditionalResult<T>
where
    T: CacheFacets,
{
    if is_not_modified(&resource, validators) {
        ConditionalResult::NotModified
    } else {
        ConditionalResult::Retrieved(resource)
    }
}

/// Cache headers attached to a successful response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheHeaders {
    etag: Option<String>,
    last_modified: Option<DateTime<Utc>>,
}

impl CacheHeaders {
    /// Collect the declared facets of `resource`.
    ///
    /// An empty entity tag is treated as absent.
    pub fn from_resource<T>(resource: &T) -> Self
    where
        T: CacheFacets + ?Sized,
    {
        let etag = if T::FACETS.has_etag() {
            resource
                .etag()
                .filter(|tag| !tag.is_empty())
                .map(String::from)
        } else {
            None
        };

        let last_modified = if T::FACETS.has_last_modified() {
            resource.last_modified()
        } else {
            None
        };

        Self { etag, last_modified }
    }

    /// The entity tag to emit
    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    /// The last-modified timestamp to emit
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    /// Whether there is nothing to emit
    pub fn is_empty(&self) -> bool {
        self.etag.is_none() && self.last_modified.is_none()
    }

    /// Write the headers into `headers`, replacing existing values
    pub fn apply(&self, headers: &mut HeaderMap) {
        if let Some(etag) = &self.etag {
            match HeaderValue::from_str(etag) {
                Ok(value) => {
                    headers.insert(header::ETAG, value);
                }
                Err(_) => tracing::warn!(etag = %etag, "entity tag is not a valid header value"),
            }
        }

        if let Some(last_modified) = self.last_modified {
            if let Ok(value) = HeaderValue::from_str(&http_date(last_modified)) {
                headers.insert(header::LAST_MODIFIED, value);
            }
        }
    }

    /// Convert to a standalone header map
    pub fn to_header_map(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        self.apply(&mut headers);
        headers
    }
}
