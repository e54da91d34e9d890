//! Capability interfaces implemented by backing collaborators
//!
//! Each role is independent. A collaborator implements whichever subset its
//! resources support, and a handler asks only for the roles its methods
//! use. Async roles use RPITIT (Return Position Impl Trait In Traits), so
//! implementations can simply write `async fn`.
//!
//! Every role is also implemented for `Arc<C>` and `&C`, which lets one
//! collaborator fill several handler slots.
//!
//! # Example
//!
//! ```rust
//! use restful_roles::prelude::*;
//!
//! struct Greetings;
//!
//! impl Retriever<String> for Greetings {
//!     async fn retrieve(
//!         &self,
//!         id: &str,
//!         validators: &CacheValidators,
//!     ) -> StoreResult<ConditionalResult<String>> {
//!         match id {
//!             "en" => Ok(retrieve_conditionally("hello".to_string(), validators)),
//!             _ => Err(StoreError::not_found("Greeting", id)),
//!         }
//!     }
//! }
//!
//! impl Serialiser<String> for Greetings {
//!     fn serialise(&self, greeting: &String) -> StoreResult<Representation> {
//!         Ok(Representation::text(greeting.clone()))
//!     }
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use axum::http::StatusCode;

use crate::conditional::{CacheValidators, ConditionalResult};
use crate::inbound::Inbound;
use crate::representation::Representation;
use crate::store::StoreResult;

/// Whether an upsert created a new resource or replaced an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UpsertOutcome {
    /// `true` when no resource existed at the identifier before the call
    pub was_create: bool,
}

impl UpsertOutcome {
    pub const fn created() -> Self {
        Self { was_create: true }
    }

    pub const fn updated() -> Self {
        Self { was_create: false }
    }

    /// 201 for a create, 200 for an update
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        if self.was_create {
            StatusCode::CREATED
        } else {
            StatusCode::OK
        }
    }
}

/// Retrieve one resource, honouring the request's cache validators
pub trait Retriever<T>: Send + Sync {
    /// Returns `NotModified` when the validators match, and a `NotFound`
    /// store error when no resource has this identifier.
    fn retrieve(
        &self,
        id: &str,
        validators: &CacheValidators,
    ) -> impl Future<Output = StoreResult<ConditionalResult<T>>> + Send;
}

/// Retrieve the index object representing a whole collection
pub trait Indexer<I>: Send + Sync {
    /// Same contract as [`Retriever::retrieve`], evaluated against the
    /// index object's own facets.
    fn index(
        &self,
        validators: &CacheValidators,
    ) -> impl Future<Output = StoreResult<ConditionalResult<I>>> + Send;
}

/// Store a new resource under a freshly assigned identifier
pub trait Inserter<T>: Send + Sync {
    /// Returns the new identifier.
    fn insert(&self, instance: T) -> impl Future<Output = StoreResult<String>> + Send;
}

/// Create or replace the resource at a known identifier
pub trait Upserter<T>: Send + Sync {
    /// Write contention is reported as a `Conflict` store error.
    fn upsert(
        &self,
        id: &str,
        instance: T,
    ) -> impl Future<Output = StoreResult<UpsertOutcome>> + Send;
}

/// Remove a resource
pub trait Deleter: Send + Sync {
    /// Deleting an identifier that does not exist is not an error.
    fn delete(&self, id: &str) -> impl Future<Output = StoreResult<()>> + Send;
}

/// Render a resource for the response body
pub trait Serialiser<T>: Send + Sync {
    fn serialise(&self, resource: &T) -> StoreResult<Representation>;
}

/// Build a resource from the request body
pub trait Deserialiser<T>: Send + Sync {
    fn deserialise(&self, request: &Inbound) -> StoreResult<T>;
}

/// Produce the URL at which a resource can be retrieved
pub trait UrlGenerator: Send + Sync {
    fn generate_url(&self, id: &str) -> String;
}

/// Everything a writable store provides
pub trait Repository<T>: Retriever<T> + Inserter<T> + Upserter<T> + Deleter {}

impl<T, C> Repository<T> for C where C: Retriever<T> + Inserter<T> + Upserter<T> + Deleter + ?Sized {}

macro_rules! forward_roles {
    ($($wrapper:ty),+ $(,)?) => {
        $(
            impl<T, C> Retriever<T> for $wrapper
            where
                C: Retriever<T> + ?Sized,
            {
                fn retrieve(
                    &self,
                    id: &str,
                    validators: &CacheValidators,
                ) -> impl Future<Output = StoreResult<ConditionalResult<T>>> + Send {
                    (**self).retrieve(id, validators)
                }
            }

            impl<I, C> Indexer<I> for $wrapper
            where
                C: Indexer<I> + ?Sized,
            {
                fn index(
                    &self,
                    validators: &CacheValidators,
                ) -> impl Future<Output = StoreResult<ConditionalResult<I>>> + Send {
                    (**self).index(validators)
                }
            }

            impl<T, C> Inserter<T> for $wrapper
            where
                C: Inserter<T> + ?Sized,
            {
                fn insert(&self, instance: T) -> impl Future<Output = StoreResult<String>> + Send {
                    (**self).insert(instance)
                }
            }

            impl<T, C> Upserter<T> for $wrapper
            where
                C: Upserter<T> + ?Sized,
            {
                fn upsert(
                    &self,
                    id: &str,
                    instance: T,
                ) -> impl Future<Output = StoreResult<UpsertOutcome>> + Send {
                    (**self).upsert(id, instance)
                }
            }

            impl<C> Deleter for $wrapper
            where
                C: Deleter + ?Sized,
            {
                fn delete(&self, id: &str) -> impl Future<Output = StoreResult<()>> + Send {
                    (**self).delete(id)
                }
            }

            impl<T, C> Serialiser<T> for $wrapper
            where
                C: Serialiser<T> + ?Sized,
            {
                fn serialise(&self, resource: &T) -> StoreResult<Representation> {
                    (**self).serialise(resource)
                }
            }

            impl<T, C> Deserialiser<T> for $wrapper
            where
                C: Deserialiser<T> + ?Sized,
            {
                fn deserialise(&self, request: &Inbound) -> StoreResult<T> {
                    (**self).deserialise(request)
                }
            }

            impl<C> UrlGenerator for $wrapper
            where
                C: UrlGenerator + ?Sized,
            {
                fn generate_url(&self, id: &str) -> String {
                    (**self).generate_url(id)
                }
            }
        )+
    };
}

forward_roles!(Arc<C>, &C);
