//! Chart repository shared by the handler tests

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::caching::retrieve_conditionally;
use crate::conditional::{CacheValidators, ConditionalResult};
use crate::facets::{CacheFacets, FacetSet};
use crate::inbound::Inbound;
use crate::representation::Representation;
use crate::roles::{
    Deleter, Deserialiser, Indexer, Inserter, Retriever, Serialiser, UpsertOutcome, Upserter,
    UrlGenerator,
};
use crate::store::{StoreError, StoreOperation, StoreResult};

pub(crate) const ETAG: &str = "\"686897696a7c876b7e\"";
pub(crate) const INDEX_ETAG: &str = "\"684897696a7c876b7a\"";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Chart {
    pub id: String,
    pub title: String,
    pub etag: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl Chart {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            title: format!("Chart {}", id),
            ..Self::default()
        }
    }

    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub fn with_etag(mut self, etag: &str) -> Self {
        self.etag = Some(etag.to_string());
        self
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }
}

impl CacheFacets for Chart {
    const FACETS: FacetSet = FacetSet::BOTH;

    fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChartIndex {
    pub count: usize,
}

impl CacheFacets for ChartIndex {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChartIndexWithETag {
    pub count: usize,
    pub etag: Option<String>,
}

impl CacheFacets for ChartIndexWithETag {
    const FACETS: FacetSet = FacetSet::ETAG;

    fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChartIndexWithLastModified {
    pub count: usize,
    pub last_modified: Option<DateTime<Utc>>,
}

impl CacheFacets for ChartIndexWithLastModified {
    const FACETS: FacetSet = FacetSet::LAST_MODIFIED;

    fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }
}

#[derive(Debug, Default)]
pub(crate) struct ChartRepo {
    charts: Mutex<BTreeMap<String, Chart>>,
    pub index_etag: Option<String>,
    pub index_last_modified: Option<DateTime<Utc>>,
    pub enable_conflicts: bool,
}

impl ChartRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, id: &str, chart: Chart) {
        self.charts.lock().unwrap().insert(id.to_string(), chart);
    }

    /// Adds charts "0".."count" titled "Chart 0".."Chart count-1"
    pub fn add_charts(&self, count: usize) {
        for i in 0..count {
            let id = i.to_string();
            self.add(&id, Chart::new(&id));
        }
    }

    pub fn get(&self, id: &str) -> Option<Chart> {
        self.charts.lock().unwrap().get(id).cloned()
    }

    pub fn ids(&self) -> Vec<String> {
        self.charts.lock().unwrap().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.charts.lock().unwrap().len()
    }
}

impl Retriever<Chart> for ChartRepo {
    async fn retrieve(
        &self,
        id: &str,
        validators: &CacheValidators,
    ) -> StoreResult<ConditionalResult<Chart>> {
        let chart = self
            .get(id)
            .ok_or_else(|| StoreError::not_found("chart", id))?;
        Ok(retrieve_conditionally(chart, validators))
    }
}

impl Upserter<Chart> for ChartRepo {
    async fn upsert(&self, id: &str, chart: Chart) -> StoreResult<UpsertOutcome> {
        if self.enable_conflicts {
            return Err(StoreError::conflict(
                StoreOperation::Upsert,
                format!("There was a conflict upserting chart {}", id),
            )
            .with_entity("chart", id));
        }

        let previous = self.charts.lock().unwrap().insert(id.to_string(), chart);
        Ok(match previous {
            Some(_) => UpsertOutcome::updated(),
            None => UpsertOutcome::created(),
        })
    }
}

impl Inserter<Chart> for ChartRepo {
    async fn insert(&self, chart: Chart) -> StoreResult<String> {
        let id = uuid::Uuid::new_v4().to_string();
        self.upsert(&id, chart).await?;
        Ok(id)
    }
}

impl Deleter for ChartRepo {
    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.charts.lock().unwrap().remove(id);
        Ok(())
    }
}

impl Serialiser<Chart> for ChartRepo {
    fn serialise(&self, chart: &Chart) -> StoreResult<Representation> {
        Ok(Representation::text(format!("Chart {}", chart.id)))
    }
}

impl Deserialiser<Chart> for ChartRepo {
    fn deserialise(&self, request: &Inbound) -> StoreResult<Chart> {
        Ok(Chart::titled(request.text()?))
    }
}

impl UrlGenerator for ChartRepo {
    fn generate_url(&self, id: &str) -> String {
        format!("/charts/{}", id)
    }
}

impl Indexer<ChartIndex> for ChartRepo {
    async fn index(&self, validators: &CacheValidators) -> StoreResult<ConditionalResult<ChartIndex>> {
        Ok(retrieve_conditionally(ChartIndex { count: self.len() }, validators))
    }
}

impl Indexer<ChartIndexWithETag> for ChartRepo {
    async fn index(
        &self,
        validators: &CacheValidators,
    ) -> StoreResult<ConditionalResult<ChartIndexWithETag>> {
        let index = ChartIndexWithETag {
            count: self.len(),
            etag: self.index_etag.clone(),
        };
        Ok(retrieve_conditionally(index, validators))
    }
}

impl Indexer<ChartIndexWithLastModified> for ChartRepo {
    async fn index(
        &self,
        validators: &CacheValidators,
    ) -> StoreResult<ConditionalResult<ChartIndexWithLastModified>> {
        let index = ChartIndexWithLastModified {
            count: self.len(),
            last_modified: self.index_last_modified,
        };
        Ok(retrieve_conditionally(index, validators))
    }
}

impl Serialiser<ChartIndex> for ChartRepo {
    fn serialise(&self, index: &ChartIndex) -> StoreResult<Representation> {
        Ok(Representation::text(format!("{} charts", index.count)))
    }
}

impl Serialiser<ChartIndexWithETag> for ChartRepo {
    fn serialise(&self, index: &ChartIndexWithETag) -> StoreResult<Representation> {
        Ok(Representation::text(format!("{} charts", index.count)))
    }
}

impl Serialiser<ChartIndexWithLastModified> for ChartRepo {
    fn serialise(&self, index: &ChartIndexWithLastModified) -> StoreResult<Representation> {
        Ok(Representation::text(format!("{} charts", index.count)))
    }
}
