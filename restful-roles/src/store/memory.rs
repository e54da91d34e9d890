//! In-memory store implementing every capability role

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use chrono::{DateTime, SubsecRound, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::caching::retrieve_conditionally;
use crate::conditional::{CacheValidators, ConditionalResult};
use crate::facets::{CacheFacets, FacetSet};
use crate::inbound::Inbound;
use crate::representation::Representation;
use crate::roles::{
    Deleter, Deserialiser, Indexer, Inserter, Retriever, Serialiser, UpsertOutcome, Upserter,
    UrlGenerator,
};
use crate::store::{StoreError, StoreResult};

/// A stored value stamped with the write that produced it
///
/// Values built by a deserialiser are unstamped; the store assigns the
/// version and timestamp when it writes them.
///
/// Timestamps are truncated to whole seconds. Two writes within the same
/// second share a `Last-Modified` value, so an `If-Modified-Since` taken
/// from the first write gets 304 for the second, even next to a stale
/// `If-None-Match`, since either validator matching is enough. The entity
/// tag changes with every write; clients that need per-write precision
/// should send only `If-None-Match`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    value: T,
    etag: Option<String>,
    last_modified: Option<DateTime<Utc>>,
}

impl<T> Versioned<T> {
    /// An unstamped value
    pub fn new(value: T) -> Self {
        Self {
            value,
            etag: None,
            last_modified: None,
        }
    }

    fn stamped(value: T, generation: u64, last_modified: DateTime<Utc>) -> Self {
        Self {
            value,
            etag: Some(quoted(generation)),
            last_modified: Some(last_modified),
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T> CacheFacets for Versioned<T> {
    const FACETS: FacetSet = FacetSet::BOTH;

    fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }
}

/// Snapshot of a whole [`MemoryStore`]
///
/// The entity tag is the store generation, so any write to any instance
/// changes it.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionIndex<T> {
    items: BTreeMap<String, T>,
    generation: u64,
    last_modified: DateTime<Utc>,
    #[serde(skip)]
    etag: String,
}

impl<T> CollectionIndex<T> {
    pub fn items(&self) -> &BTreeMap<String, T> {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.get(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl<T> CacheFacets for CollectionIndex<T> {
    const FACETS: FacetSet = FacetSet::BOTH;

    fn etag(&self) -> Option<&str> {
        Some(&self.etag)
    }

    fn last_modified(&self) -> Option<DateTime<Utc>> {
        Some(self.last_modified)
    }
}

/// Concurrent map of resources with a collection-wide generation counter
///
/// Every successful mutation increments the generation and moves the
/// collection timestamp forward. Timestamps have whole-second precision,
/// matching what survives an HTTP-date round trip. Values are serialised
/// and deserialised as JSON.
#[derive(Debug)]
pub struct MemoryStore<T> {
    entries: DashMap<String, Versioned<T>>,
    generation: AtomicU64,
    last_modified: AtomicI64,
    base_path: String,
    entity_type: String,
}

impl<T> MemoryStore<T> {
    /// Empty store whose resources live under `base_path`
    pub fn new(base_path: impl Into<String>) -> Self {
        let base_path = base_path.into().trim_end_matches('/').to_string();
        Self {
            entries: DashMap::new(),
            generation: AtomicU64::new(0),
            last_modified: AtomicI64::new(now().timestamp()),
            base_path,
            entity_type: "resource".to_string(),
        }
    }

    /// Name used in not-found messages
    #[must_use]
    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = entity_type.into();
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of mutations applied so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Time of the most recent mutation, or of creation if there was none
    pub fn last_modified(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.last_modified.load(Ordering::SeqCst), 0).unwrap_or_default()
    }

    fn touch(&self) -> (u64, DateTime<Utc>) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let timestamp = now();
        self.last_modified
            .fetch_max(timestamp.timestamp(), Ordering::SeqCst);
        (generation, timestamp)
    }

    // The generation moves only while the entry's shard is write-locked, so
    // a reader that observes the new generation also observes the write
    fn write(&self, id: &str, value: T) -> UpsertOutcome {
        match self.entries.entry(id.to_string()) {
            Entry::Occupied(mut entry) => {
                let (generation, timestamp) = self.touch();
                entry.insert(Versioned::stamped(value, generation, timestamp));
                UpsertOutcome::updated()
            }
            Entry::Vacant(entry) => {
                let (generation, timestamp) = self.touch();
                entry.insert(Versioned::stamped(value, generation, timestamp));
                UpsertOutcome::created()
            }
        }
    }

    fn remove(&self, id: &str) -> bool {
        match self.entries.entry(id.to_string()) {
            Entry::Occupied(entry) => {
                self.touch();
                entry.remove();
                true
            }
            Entry::Vacant(_) => false,
        }
    }
}

impl<T> Retriever<Versioned<T>> for MemoryStore<T>
where
    T: Clone + Send + Sync,
{
    async fn retrieve(
        &self,
        id: &str,
        validators: &CacheValidators,
    ) -> StoreResult<ConditionalResult<Versioned<T>>> {
        let entry = self
            .entries
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::not_found(self.entity_type.as_str(), id))?;
        Ok(retrieve_conditionally(entry, validators))
    }
}

impl<T> Indexer<CollectionIndex<T>> for MemoryStore<T>
where
    T: Clone + Send + Sync,
{
    async fn index(
        &self,
        validators: &CacheValidators,
    ) -> StoreResult<ConditionalResult<CollectionIndex<T>>> {
        // Read the generation first so a concurrent write can only make the
        // tag older than the items, never newer. Writers bump it under the
        // shard lock that iteration below has to wait for.
        let generation = self.generation();
        let last_modified = self.last_modified();
        let items = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().value.clone()))
            .collect();

        let index = CollectionIndex {
            items,
            generation,
            last_modified,
            etag: quoted(generation),
        };
        Ok(retrieve_conditionally(index, validators))
    }
}

impl<T> Upserter<Versioned<T>> for MemoryStore<T>
where
    T: Send + Sync,
{
    async fn upsert(&self, id: &str, instance: Versioned<T>) -> StoreResult<UpsertOutcome> {
        let outcome = self.write(id, instance.into_value());
        tracing::debug!(
            entity_type = %self.entity_type,
            id = %id,
            created = outcome.was_create,
            generation = self.generation(),
            "stored resource"
        );
        Ok(outcome)
    }
}

impl<T> Inserter<Versioned<T>> for MemoryStore<T>
where
    T: Send + Sync,
{
    async fn insert(&self, instance: Versioned<T>) -> StoreResult<String> {
        let id = uuid::Uuid::new_v4().to_string();
        self.write(&id, instance.into_value());
        Ok(id)
    }
}

impl<T> Deleter for MemoryStore<T>
where
    T: Send + Sync,
{
    async fn delete(&self, id: &str) -> StoreResult<()> {
        if self.remove(id) {
            tracing::debug!(entity_type = %self.entity_type, id = %id, "removed resource");
        }
        Ok(())
    }
}

impl<T> Serialiser<Versioned<T>> for MemoryStore<T>
where
    T: Serialize + Send + Sync,
{
    fn serialise(&self, resource: &Versioned<T>) -> StoreResult<Representation> {
        Representation::json(resource.value())
    }
}

impl<T> Serialiser<CollectionIndex<T>> for MemoryStore<T>
where
    T: Serialize + Send + Sync,
{
    fn serialise(&self, index: &CollectionIndex<T>) -> StoreResult<Representation> {
        Representation::json(index)
    }
}

impl<T> Deserialiser<Versioned<T>> for MemoryStore<T>
where
    T: DeserializeOwned + Send + Sync,
{
    fn deserialise(&self, request: &Inbound) -> StoreResult<Versioned<T>> {
        Ok(Versioned::new(request.json()?))
    }
}

impl<T> UrlGenerator for MemoryStore<T>
where
    T: Send + Sync,
{
    fn generate_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_path, id)
    }
}

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

fn quoted(generation: u64) -> String {
    format!("\"{}\"", generation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caching::http_date;
    use crate::handlers::{CollectionHandler, InstanceHandler};
    use crate::store::StoreErrorKind;
    use axum::{
        body::Body,
        extract::Path,
        http::{header, Request, StatusCode},
        routing::get,
        Router,
    };
    use chrono::Duration;
    use serde::Deserialize;
    use std::sync::Arc;
    use tower::ServiceExt;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    fn note(text: &str) -> Versioned<Note> {
        Versioned::new(Note {
            text: text.to_string(),
        })
    }

    fn store() -> MemoryStore<Note> {
        MemoryStore::new("/notes/").with_entity_type("note")
    }

    #[tokio::test]
    async fn test_upsert_reports_create_then_update() {
        let store = store();
        assert!(store.upsert("a", note("one")).await.unwrap().was_create);
        assert!(!store.upsert("a", note("two")).await.unwrap().was_create);
        assert_eq!(store.len(), 1);
        assert_eq!(store.generation(), 2);
    }

    #[tokio::test]
    async fn test_retrieve_stamps_version() {
        let store = store();
        store.upsert("a", note("one")).await.unwrap();

        let entry = store
            .retrieve("a", &CacheValidators::new())
            .await
            .unwrap()
            .into_retrieved()
            .unwrap();
        assert_eq!(entry.value().text, "one");
        assert_eq!(entry.etag(), Some("\"1\""));
        assert_eq!(entry.last_modified().unwrap().timestamp_subsec_nanos(), 0);
    }

    #[tokio::test]
    async fn test_retrieve_missing_is_not_found() {
        let err = store()
            .retrieve("nope", &CacheValidators::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::NotFound);
        assert_eq!(err.message, "There was no note with id=nope");
    }

    #[tokio::test]
    async fn test_retrieve_honours_validators() {
        let store = store();
        store.upsert("a", note("one")).await.unwrap();

        let same_tag = CacheValidators::new().with_if_none_match("\"1\"");
        assert!(store.retrieve("a", &same_tag).await.unwrap().is_not_modified());

        let since_write = CacheValidators::new().with_if_modified_since(store.last_modified());
        assert!(store.retrieve("a", &since_write).await.unwrap().is_not_modified());

        let before_write = CacheValidators::new()
            .with_if_modified_since(store.last_modified() - Duration::seconds(1));
        assert!(store.retrieve("a", &before_write).await.unwrap().is_retrieved());
    }

    #[tokio::test]
    async fn test_same_second_writes_are_told_apart_by_etag() {
        let store = store();
        store.upsert("a", note("one")).await.unwrap();
        store.upsert("a", note("two")).await.unwrap();

        let stale_tag = CacheValidators::new().with_if_none_match("\"1\"");
        let entry = store
            .retrieve("a", &stale_tag)
            .await
            .unwrap()
            .into_retrieved()
            .unwrap();
        assert_eq!(entry.value().text, "two");
        assert_eq!(entry.etag(), Some("\"2\""));
        assert_eq!(entry.last_modified(), Some(store.last_modified()));

        // Second precision: the latest write is never after its own timestamp
        let since_latest = stale_tag.with_if_modified_since(store.last_modified());
        assert!(store.retrieve("a", &since_latest).await.unwrap().is_not_modified());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_index_never_tags_writes_it_does_not_contain() {
        const WRITES: u64 = 5_000;
        let store = Arc::new(store());

        let writer = tokio::task::spawn_blocking({
            let store = Arc::clone(&store);
            move || {
                for n in 0..WRITES {
                    store.write(&n.to_string(), Note { text: n.to_string() });
                }
            }
        });

        loop {
            let done = writer.is_finished();
            let index = store
                .index(&CacheValidators::new())
                .await
                .unwrap()
                .into_retrieved()
                .unwrap();
            assert!(
                index.len() as u64 >= index.generation(),
                "index tagged {} holds only {} items",
                index.generation(),
                index.len()
            );
            if done {
                break;
            }
            tokio::task::yield_now().await;
        }

        writer.await.unwrap();
        assert_eq!(store.generation(), WRITES);
        assert_eq!(store.len() as u64, WRITES);
    }

    #[tokio::test]
    async fn test_index_tag_changes_with_every_write() {
        let store = store();
        let first = store
            .index(&CacheValidators::new())
            .await
            .unwrap()
            .into_retrieved()
            .unwrap();
        assert!(first.is_empty());
        assert_eq!(first.etag(), Some("\"0\""));

        let id = store.insert(note("hello")).await.unwrap();
        let stale = CacheValidators::new().with_if_none_match("\"0\"");
        let second = store.index(&stale).await.unwrap().into_retrieved().unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second.get(&id).unwrap().text, "hello");
        assert_eq!(second.generation(), 1);

        let current = CacheValidators::new().with_if_none_match("\"1\"");
        assert!(store.index(&current).await.unwrap().is_not_modified());
    }

    #[tokio::test]
    async fn test_delete_absent_is_ok_and_does_not_bump_generation() {
        let store = store();
        store.upsert("a", note("one")).await.unwrap();
        store.delete("a").await.unwrap();
        assert!(!store.contains("a"));
        assert_eq!(store.generation(), 2);

        store.delete("a").await.unwrap();
        assert_eq!(store.generation(), 2);
    }

    #[test]
    fn test_urls_use_base_path() {
        assert_eq!(store().generate_url("42"), "/notes/42");
    }

    #[test]
    fn test_deserialise_rejects_bad_json() {
        let err = store()
            .deserialise(&Inbound::with_body("not json"))
            .unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::InvalidInput);
    }

    fn app(store: Arc<MemoryStore<Note>>) -> Router {
        let instances = Arc::new(InstanceHandler::<Versioned<Note>>::over(Arc::clone(&store)));
        let collection = Arc::new(
            CollectionHandler::<CollectionIndex<Note>, Versioned<Note>>::over(store),
        );

        Router::new()
            .route(
                "/notes",
                get({
                    let collection = Arc::clone(&collection);
                    move |validators: CacheValidators| async move {
                        collection.get(&validators).await
                    }
                })
                .post({
                    let collection = Arc::clone(&collection);
                    move |inbound: Inbound| async move { collection.post(&inbound).await }
                }),
            )
            .route(
                "/notes/{id}",
                get({
                    let instances = Arc::clone(&instances);
                    move |Path(id): Path<String>, validators: CacheValidators| async move {
                        instances.get(&id, &validators).await
                    }
                })
                .head(move |Path(id): Path<String>, validators: CacheValidators| async move {
                    instances.head(&id, &validators).await
                }),
            )
    }

    #[tokio::test]
    async fn test_http_round_trip() {
        let store = Arc::new(store());
        let app = app(Arc::clone(&store));

        let response = app
            .clone()
            .oneshot(
                Request::post("/notes")
                    .body(Body::from(r#"{"text":"Selective Reflation"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let location = response.headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(location.starts_with("/notes/"));

        let response = app
            .clone()
            .oneshot(Request::get(location.as_str()).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ETAG], "\"1\"");
        assert_eq!(
            response.headers()[header::LAST_MODIFIED],
            http_date(store.last_modified()).as_str()
        );
        let last_modified = response.headers()[header::LAST_MODIFIED].clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let fetched: Note = serde_json::from_slice(&body).unwrap();
        assert_eq!(fetched.text, "Selective Reflation");

        let response = app
            .clone()
            .oneshot(
                Request::get(location.as_str())
                    .header(header::IF_MODIFIED_SINCE, last_modified)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);

        let response = app
            .oneshot(
                Request::get("/notes")
                    .header(header::IF_NONE_MATCH, "\"1\"")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_http_head_matches_get() {
        let store = Arc::new(store());
        store.upsert("a", note("one")).await.unwrap();
        let app = app(Arc::clone(&store));

        let get = app
            .clone()
            .oneshot(Request::get("/notes/a").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let head = app
            .clone()
            .oneshot(Request::head("/notes/a").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(head.status(), StatusCode::OK);
        assert_eq!(head.headers()[header::ETAG], "\"1\"");
        assert_eq!(head.headers()[header::ETAG], get.headers()[header::ETAG]);
        assert_eq!(
            head.headers()[header::LAST_MODIFIED],
            get.headers()[header::LAST_MODIFIED]
        );
        assert_eq!(
            head.headers()[header::CONTENT_TYPE],
            get.headers()[header::CONTENT_TYPE]
        );

        let head = app
            .oneshot(
                Request::head("/notes/a")
                    .header(header::IF_NONE_MATCH, "\"1\"")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(head.status(), StatusCode::NOT_MODIFIED);
        assert!(head.headers().get(header::ETAG).is_none());
    }

    #[tokio::test]
    async fn test_http_missing_resource_is_404() {
        let app = app(Arc::new(store()));
        let response = app
            .oneshot(Request::get("/notes/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
