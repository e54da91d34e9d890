//! # restful-roles
//!
//! Generic REST resource handlers with HTTP conditional retrieval.
//! Handlers are assembled from small capability roles implemented by
//! resource-specific backing stores, and answer `If-None-Match` /
//! `If-Modified-Since` uniformly for any resource type.
//!
//! ## Features
//!
//! - **Conditional retrieval**: ETag and Last-Modified validation with 304 short circuits
//! - **Capability roles**: retrieve, index, insert, upsert, delete, serialise, deserialise, URL generation
//! - **Composable handlers**: single-resource and collection handlers usable with any subset of roles
//! - **axum integration**: extractors for request validators and bodies, `IntoResponse` for every outcome
//! - **In-memory store**: a concurrent reference store that versions every write
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use axum::{extract::Path, routing::get, Router};
//! use restful_roles::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let store = Arc::new(MemoryStore::<serde_json::Value>::new("/charts"));
//!     let charts = Arc::new(
//!         InstanceHandler::<Versioned<serde_json::Value>>::builder()
//!             .retriever(Arc::clone(&store))
//!             .serialiser(store)
//!             .caching(&config.caching)
//!             .build(),
//!     );
//!
//!     let app: Router = Router::new().route(
//!         "/charts/{id}",
//!         get(move |Path(id): Path<String>, validators: CacheValidators| async move {
//!             charts.get(&id, &validators).await
//!         }),
//!     );
//!
//!     let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.service.port)).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod caching;
pub mod conditional;
pub mod config;
pub mod error;
pub mod facets;
pub mod handlers;
pub mod inbound;
pub mod observability;
pub mod representation;
pub mod responses;
pub mod roles;
pub mod store;

#[cfg(test)]
mod fixtures;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::caching::{http_date, is_not_modified, retrieve_conditionally, CacheHeaders};
    pub use crate::conditional::{CacheValidators, ConditionalResult};
    pub use crate::config::{CachingConfig, Config, ServiceConfig};
    pub use crate::error::{Error, Result};
    pub use crate::facets::{CacheFacets, FacetSet};
    pub use crate::handlers::{
        ApiError, ApiErrorKind, ApiOperation, CollectionHandler, IndexHandler, InstanceHandler,
        ReadOnlyInstanceHandler, Unset,
    };
    pub use crate::inbound::Inbound;
    pub use crate::observability::init_tracing;
    pub use crate::representation::Representation;
    pub use crate::responses::RestResponse;
    pub use crate::roles::{
        Deleter, Deserialiser, Indexer, Inserter, Repository, Retriever, Serialiser,
        UpsertOutcome, Upserter, UrlGenerator,
    };
    pub use crate::store::{
        CollectionIndex, MemoryStore, StoreError, StoreErrorKind, StoreOperation, StoreResult,
        Versioned,
    };
}
