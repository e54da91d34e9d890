//! Generic REST handlers assembled from capability slots
//!
//! A handler holds one slot per capability it could use. Each handler method
//! carries its own trait bounds, so a handler is usable for exactly the verbs
//! whose capabilities were supplied. Slots that were never filled hold
//! [`Unset`], which implements no role.
//!
//! # Features
//!
//! - **Single resources**: [`InstanceHandler`] for GET / HEAD / PUT / DELETE
//!   on `/collection/{id}`
//! - **Collections**: [`CollectionHandler`] for GET / HEAD / POST / DELETE
//!   on `/collection`
//! - **Read-only variants**: [`ReadOnlyInstanceHandler`] and [`IndexHandler`]
//! - **Error Handling**: [`ApiError`] with automatic HTTP status code mapping
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use restful_roles::prelude::*;
//!
//! let store = Arc::new(MemoryStore::<Chart>::new("/charts"));
//!
//! // Every slot filled from the same store
//! let charts = InstanceHandler::<Chart>::over(Arc::clone(&store));
//!
//! // Only the roles GET needs
//! let read_only = InstanceHandler::<Chart>::builder()
//!     .retriever(Arc::clone(&store))
//!     .serialiser(Arc::clone(&store))
//!     .build();
//! ```
//!
//! # Integration with Axum
//!
//! Handler methods return `Result<RestResponse, ApiError>`, and both sides
//! implement `IntoResponse`:
//!
//! ```rust,ignore
//! use axum::{extract::{Path, State}, routing::get, Router};
//!
//! let app = Router::new().route(
//!     "/charts/{id}",
//!     get(|State(charts): State<Arc<ChartHandler>>, Path(id): Path<String>, validators: CacheValidators| async move {
//!         charts.get(&id, &validators).await
//!     }),
//! );
//! ```

mod collection;
mod error;
mod instance;

use axum::http::{header, HeaderValue};

pub use collection::{CollectionHandler, CollectionHandlerBuilder, IndexHandler};
pub use error::{ApiError, ApiErrorKind, ApiOperation};
pub use instance::{InstanceHandler, InstanceHandlerBuilder, ReadOnlyInstanceHandler};

use crate::caching::CacheHeaders;
use crate::config::CachingConfig;
use crate::facets::CacheFacets;
use crate::responses::RestResponse;
use crate::roles::Serialiser;

/// Placeholder for a capability slot that was never filled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unset;

/// Parse the configured `Cache-Control` value, dropping it if it is not a
/// valid header value
pub(crate) fn cache_control_from(config: &CachingConfig) -> Option<HeaderValue> {
    let value = config.cache_control.as_deref()?;
    match HeaderValue::from_str(value) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(cache_control = value, error = %e, "ignoring invalid Cache-Control value");
            None
        }
    }
}

/// 200 response for a retrieved instance or index
pub(crate) fn retrieved_response<V, S>(
    serialiser: &S,
    resource: &V,
    cache_control: Option<&HeaderValue>,
    operation: ApiOperation,
) -> Result<RestResponse, ApiError>
where
    V: CacheFacets,
    S: Serialiser<V>,
{
    let representation = serialiser
        .serialise(resource)
        .map_err(|e| ApiError::from_store(operation, e))?;

    let mut response = RestResponse::ok(representation)
        .with_cache_headers(&CacheHeaders::from_resource(resource));
    if let Some(value) = cache_control {
        response = response.with_header(header::CACHE_CONTROL, value.clone());
    }
    Ok(response)
}
