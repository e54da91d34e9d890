//! Handler for a single resource addressed by identifier

use std::marker::PhantomData;

use axum::http::HeaderValue;

use super::{cache_control_from, retrieved_response, ApiError, ApiOperation, Unset};
use crate::conditional::{CacheValidators, ConditionalResult};
use crate::config::CachingConfig;
use crate::facets::CacheFacets;
use crate::inbound::Inbound;
use crate::responses::RestResponse;
use crate::roles::{Deleter, Deserialiser, Retriever, Serialiser, Upserter};

/// GET / HEAD / PUT / DELETE on `/collection/{id}`
///
/// Type parameters are the resource type followed by one slot per
/// capability: retriever `R`, serialiser `S`, upserter `U`, deleter `D` and
/// deserialiser `Z`.
pub struct InstanceHandler<T, R = Unset, S = Unset, U = Unset, D = Unset, Z = Unset> {
    retriever: R,
    serialiser: S,
    upserter: U,
    deleter: D,
    deserialiser: Z,
    cache_control: Option<HeaderValue>,
    _resource: PhantomData<fn() -> T>,
}

/// Instance handler that can only answer GET and HEAD
pub type ReadOnlyInstanceHandler<T, R, S> = InstanceHandler<T, R, S>;

impl<T> InstanceHandler<T> {
    /// Start a handler with every slot unset
    pub fn builder() -> InstanceHandlerBuilder<T> {
        InstanceHandlerBuilder {
            retriever: Unset,
            serialiser: Unset,
            upserter: Unset,
            deleter: Unset,
            deserialiser: Unset,
            cache_control: None,
            _resource: PhantomData,
        }
    }

    /// Fill every slot from one collaborator
    pub fn over<C: Clone>(store: C) -> InstanceHandler<T, C, C, C, C, C> {
        Self::builder()
            .retriever(store.clone())
            .serialiser(store.clone())
            .upserter(store.clone())
            .deleter(store.clone())
            .deserialiser(store)
            .build()
    }
}

impl<T, R, S> InstanceHandler<T, R, S> {
    pub fn read_only(retriever: R, serialiser: S) -> Self {
        InstanceHandler::builder()
            .retriever(retriever)
            .serialiser(serialiser)
            .build()
    }
}

impl<T, R, S, U, D, Z> InstanceHandler<T, R, S, U, D, Z> {
    /// The `Cache-Control` value attached to 200 responses
    pub fn cache_control(&self) -> Option<&HeaderValue> {
        self.cache_control.as_ref()
    }

    /// Retrieve the resource, or 304 when the request validators match
    pub async fn get(&self, id: &str, validators: &CacheValidators) -> Result<RestResponse, ApiError>
    where
        T: CacheFacets + Send,
        R: Retriever<T>,
        S: Serialiser<T>,
    {
        let outcome = self
            .retriever
            .retrieve(id, validators)
            .await
            .map_err(|e| ApiError::from_store(ApiOperation::Get, e))?;

        match outcome {
            ConditionalResult::NotModified => {
                tracing::debug!(id = %id, "resource not modified");
                Ok(RestResponse::not_modified())
            }
            ConditionalResult::Retrieved(resource) => retrieved_response(
                &self.serialiser,
                &resource,
                self.cache_control.as_ref(),
                ApiOperation::Get,
            ),
        }
    }

    /// Same status and headers as [`get`](Self::get)
    pub async fn head(&self, id: &str, validators: &CacheValidators) -> Result<RestResponse, ApiError>
    where
        T: CacheFacets + Send,
        R: Retriever<T>,
        S: Serialiser<T>,
    {
        self.get(id, validators).await
    }

    /// Create or replace the resource from the request body
    ///
    /// Responds 201 when the store created the resource and 200 when it
    /// replaced one.
    pub async fn put(&self, id: &str, request: &Inbound) -> Result<RestResponse, ApiError>
    where
        T: Send,
        U: Upserter<T>,
        Z: Deserialiser<T>,
    {
        let resource = self
            .deserialiser
            .deserialise(request)
            .map_err(|e| ApiError::from_store(ApiOperation::Upsert, e))?;

        let outcome = self
            .upserter
            .upsert(id, resource)
            .await
            .map_err(|e| ApiError::from_store(ApiOperation::Upsert, e))?;

        tracing::info!(id = %id, created = outcome.was_create, "resource upserted");
        Ok(RestResponse::new(outcome.status_code()))
    }

    /// Delete the resource; always 204, including when it did not exist
    pub async fn delete(&self, id: &str) -> Result<RestResponse, ApiError>
    where
        D: Deleter,
    {
        match self.deleter.delete(id).await {
            Ok(()) => tracing::info!(id = %id, "resource deleted"),
            Err(e) if e.is_not_found() => tracing::debug!(id = %id, "resource already absent"),
            Err(e) => return Err(ApiError::from_store(ApiOperation::Delete, e)),
        }
        Ok(RestResponse::no_content())
    }
}

impl<T, R, S, U, D, Z> Clone for InstanceHandler<T, R, S, U, D, Z>
where
    R: Clone,
    S: Clone,
    U: Clone,
    D: Clone,
    Z: Clone,
{
    fn clone(&self) -> Self {
        Self {
            retriever: self.retriever.clone(),
            serialiser: self.serialiser.clone(),
            upserter: self.upserter.clone(),
            deleter: self.deleter.clone(),
            deserialiser: self.deserialiser.clone(),
            cache_control: self.cache_control.clone(),
            _resource: PhantomData,
        }
    }
}

/// Builder for [`InstanceHandler`], one setter per capability slot
pub struct InstanceHandlerBuilder<T, R = Unset, S = Unset, U = Unset, D = Unset, Z = Unset> {
    retriever: R,
    serialiser: S,
    upserter: U,
    deleter: D,
    deserialiser: Z,
    cache_control: Option<HeaderValue>,
    _resource: PhantomData<fn() -> T>,
}

impl<T, R, S, U, D, Z> InstanceHandlerBuilder<T, R, S, U, D, Z> {
    pub fn retriever<R2>(self, retriever: R2) -> InstanceHandlerBuilder<T, R2, S, U, D, Z> {
        InstanceHandlerBuilder {
            retriever,
            serialiser: self.serialiser,
            upserter: self.upserter,
            deleter: self.deleter,
            deserialiser: self.deserialiser,
            cache_control: self.cache_control,
            _resource: PhantomData,
        }
    }

    pub fn serialiser<S2>(self, serialiser: S2) -> InstanceHandlerBuilder<T, R, S2, U, D, Z> {
        InstanceHandlerBuilder {
            retriever: self.retriever,
            serialiser,
            upserter: self.upserter,
            deleter: self.deleter,
            deserialiser: self.deserialiser,
            cache_control: self.cache_control,
            _resource: PhantomData,
        }
    }

    pub fn upserter<U2>(self, upserter: U2) -> InstanceHandlerBuilder<T, R, S, U2, D, Z> {
        InstanceHandlerBuilder {
            retriever: self.retriever,
            serialiser: self.serialiser,
            upserter,
            deleter: self.deleter,
            deserialiser: self.deserialiser,
            cache_control: self.cache_control,
            _resource: PhantomData,
        }
    }

    pub fn deleter<D2>(self, deleter: D2) -> InstanceHandlerBuilder<T, R, S, U, D2, Z> {
        InstanceHandlerBuilder {
            retriever: self.retriever,
            serialiser: self.serialiser,
            upserter: self.upserter,
            deleter,
            deserialiser: self.deserialiser,
            cache_control: self.cache_control,
            _resource: PhantomData,
        }
    }

    pub fn deserialiser<Z2>(self, deserialiser: Z2) -> InstanceHandlerBuilder<T, R, S, U, D, Z2> {
        InstanceHandlerBuilder {
            retriever: self.retriever,
            serialiser: self.serialiser,
            upserter: self.upserter,
            deleter: self.deleter,
            deserialiser,
            cache_control: self.cache_control,
            _resource: PhantomData,
        }
    }

    /// Attach `value` as `Cache-Control` on 200 responses
    #[must_use]
    pub fn cache_control(mut self, value: HeaderValue) -> Self {
        self.cache_control = Some(value);
        self
    }

    /// Apply the caching section of the configuration
    #[must_use]
    pub fn caching(mut self, config: &CachingConfig) -> Self {
        self.cache_control = cache_control_from(config);
        self
    }

    pub fn build(self) -> InstanceHandler<T, R, S, U, D, Z> {
        InstanceHandler {
            retriever: self.retriever,
            serialiser: self.serialiser,
            upserter: self.upserter,
            deleter: self.deleter,
            deserialiser: self.deserialiser,
            cache_control: self.cache_control,
            _resource: PhantomData,
        }
    }
}
