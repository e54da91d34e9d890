//! Handler for a collection as a whole

use std::marker::PhantomData;

use axum::http::HeaderValue;

use super::{cache_control_from, retrieved_response, ApiError, ApiOperation, Unset};
use crate::conditional::{CacheValidators, ConditionalResult};
use crate::config::CachingConfig;
use crate::facets::CacheFacets;
use crate::inbound::Inbound;
use crate::responses::RestResponse;
use crate::roles::{Deserialiser, Indexer, Inserter, Serialiser, UrlGenerator};

/// GET / HEAD / POST / DELETE on `/collection`
///
/// `I` is the index type representing the whole collection and `T` the type
/// of the instances POST creates. The remaining parameters are capability
/// slots: indexer `X`, serialiser `S` (of `I`), deserialiser `Z` and
/// inserter `N` (of `T`), and URL generator `G`.
pub struct CollectionHandler<I, T = (), X = Unset, S = Unset, Z = Unset, N = Unset, G = Unset> {
    indexer: X,
    serialiser: S,
    deserialiser: Z,
    inserter: N,
    url_generator: G,
    cache_control: Option<HeaderValue>,
    _resources: PhantomData<fn() -> (I, T)>,
}

/// Collection handler that can only answer GET, HEAD and DELETE
pub type IndexHandler<I, X, S> = CollectionHandler<I, (), X, S>;

impl<I, T> CollectionHandler<I, T> {
    /// Start a handler with every slot unset
    pub fn builder() -> CollectionHandlerBuilder<I, T> {
        CollectionHandlerBuilder {
            indexer: Unset,
            serialiser: Unset,
            deserialiser: Unset,
            inserter: Unset,
            url_generator: Unset,
            cache_control: None,
            _resources: PhantomData,
        }
    }

    /// Fill every slot from one collaborator
    pub fn over<C: Clone>(store: C) -> CollectionHandler<I, T, C, C, C, C, C> {
        Self::builder()
            .indexer(store.clone())
            .serialiser(store.clone())
            .deserialiser(store.clone())
            .inserter(store.clone())
            .url_generator(store)
            .build()
    }
}

impl<I, X, S> CollectionHandler<I, (), X, S> {
    pub fn read_only(indexer: X, serialiser: S) -> Self {
        CollectionHandler::builder()
            .indexer(indexer)
            .serialiser(serialiser)
            .build()
    }
}

impl<I, T, X, S, Z, N, G> CollectionHandler<I, T, X, S, Z, N, G> {
    /// The `Cache-Control` value attached to 200 responses
    pub fn cache_control(&self) -> Option<&HeaderValue> {
        self.cache_control.as_ref()
    }

    /// Retrieve the index, or 304 when the request validators match it
    pub async fn get(&self, validators: &CacheValidators) -> Result<RestResponse, ApiError>
    where
        I: CacheFacets + Send,
        X: Indexer<I>,
        S: Serialiser<I>,
    {
        let outcome = self
            .indexer
            .index(validators)
            .await
            .map_err(|e| ApiError::from_store(ApiOperation::Index, e))?;

        match outcome {
            ConditionalResult::NotModified => {
                tracing::debug!("collection index not modified");
                Ok(RestResponse::not_modified())
            }
            ConditionalResult::Retrieved(index) => retrieved_response(
                &self.serialiser,
                &index,
                self.cache_control.as_ref(),
                ApiOperation::Index,
            ),
        }
    }

    /// Same status and headers as [`get`](Self::get)
    pub async fn head(&self, validators: &CacheValidators) -> Result<RestResponse, ApiError>
    where
        I: CacheFacets + Send,
        X: Indexer<I>,
        S: Serialiser<I>,
    {
        self.get(validators).await
    }

    /// Insert a new instance built from the request body
    ///
    /// Responds 201 with `Location` set to the generated URL. Every call
    /// creates a new resource.
    pub async fn post(&self, request: &Inbound) -> Result<RestResponse, ApiError>
    where
        T: Send,
        Z: Deserialiser<T>,
        N: Inserter<T>,
        G: UrlGenerator,
    {
        let resource = self
            .deserialiser
            .deserialise(request)
            .map_err(|e| ApiError::from_store(ApiOperation::Create, e))?;

        let id = self
            .inserter
            .insert(resource)
            .await
            .map_err(|e| ApiError::from_store(ApiOperation::Create, e))?;

        let url = self.url_generator.generate_url(&id);
        let location = HeaderValue::from_str(&url).map_err(|e| {
            ApiError::internal(format!("Generated URL is not a valid Location: {}", e))
                .with_operation(ApiOperation::Create)
        })?;

        tracing::info!(id = %id, location = %url, "resource created");
        Ok(RestResponse::created_at(location))
    }

    /// Deleting a whole collection is never allowed
    pub fn delete(&self) -> RestResponse {
        tracing::debug!("rejecting collection delete");
        RestResponse::not_acceptable()
    }
}

impl<I, T, X, S, Z, N, G> Clone for CollectionHandler<I, T, X, S, Z, N, G>
where
    X: Clone,
    S: Clone,
    Z: Clone,
    N: Clone,
    G: Clone,
{
    fn clone(&self) -> Self {
        Self {
            indexer: self.indexer.clone(),
            serialiser: self.serialiser.clone(),
            deserialiser: self.deserialiser.clone(),
            inserter: self.inserter.clone(),
            url_generator: self.url_generator.clone(),
            cache_control: self.cache_control.clone(),
            _resources: PhantomData,
        }
    }
}

/// Builder for [`CollectionHandler`], one setter per capability slot
pub struct CollectionHandlerBuilder<
    I,
    T = (),
    X = Unset,
    S = Unset,
    Z = Unset,
    N = Unset,
    G = Unset,
> {
    indexer: X,
    serialiser: S,
    deserialiser: Z,
    inserter: N,
    url_generator: G,
    cache_control: Option<HeaderValue>,
    _resources: PhantomData<fn() -> (I, T)>,
}

impl<I, T, X, S, Z, N, G> CollectionHandlerBuilder<I, T, X, S, Z, N, G> {
    pub fn indexer<X2>(self, indexer: X2) -> CollectionHandlerBuilder<I, T, X2, S, Z, N, G> {
        CollectionHandlerBuilder {
            indexer,
            serialiser: self.serialiser,
            deserialiser: self.deserialiser,
            inserter: self.inserter,
            url_generator: self.url_generator,
            cache_control: self.cache_control,
            _resources: PhantomData,
        }
    }

    pub fn serialiser<S2>(self, serialiser: S2) -> CollectionHandlerBuilder<I, T, X, S2, Z, N, G> {
        CollectionHandlerBuilder {
            indexer: self.indexer,
            serialiser,
            deserialiser: self.deserialiser,
            inserter: self.inserter,
            url_generator: self.url_generator,
            cache_control: self.cache_control,
            _resources: PhantomData,
        }
    }

    pub fn deserialiser<Z2>(
        self,
        deserialiser: Z2,
    ) -> CollectionHandlerBuilder<I, T, X, S, Z2, N, G> {
        CollectionHandlerBuilder {
            indexer: self.indexer,
            serialiser: self.serialiser,
            deserialiser,
            inserter: self.inserter,
            url_generator: self.url_generator,
            cache_control: self.cache_control,
            _resources: PhantomData,
        }
    }

    pub fn inserter<N2>(self, inserter: N2) -> CollectionHandlerBuilder<I, T, X, S, Z, N2, G> {
        CollectionHandlerBuilder {
            indexer: self.indexer,
            serialiser: self.serialiser,
            deserialiser: self.deserialiser,
            inserter,
            url_generator: self.url_generator,
            cache_control: self.cache_control,
            _resources: PhantomData,
        }
    }

    pub fn url_generator<G2>(
        self,
        url_generator: G2,
    ) -> CollectionHandlerBuilder<I, T, X, S, Z, N, G2> {
        CollectionHandlerBuilder {
            indexer: self.indexer,
            serialiser: self.serialiser,
            deserialiser: self.deserialiser,
            inserter: self.inserter,
            url_generator,
            cache_control: self.cache_control,
            _resources: PhantomData,
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

    pub fn build(self) -> CollectionHandler<I, T, X, S, Z, N, G> {
        CollectionHandler {
            indexer: self.indexer,
            serialiser: self.serialiser,
            deserialiser: self.deserialiser,
            inserter: self.inserter,
            url_generator: self.url_generator,
            cache_control: self.cache_control,
            _resources: PhantomData,
        }
    }
}
