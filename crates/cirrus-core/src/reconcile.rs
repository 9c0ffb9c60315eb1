use cirrus_domain::api::{CatalogRecord, DataSource, MetadataFilter, CUSTOM_SOURCE};
use indexmap::IndexMap;
use serde::Serialize;

use crate::effects::{CatalogStore, Provider};
use crate::errors::CatalogError;

/// Outcome of persisting one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordResult {
    pub record: CatalogRecord,
    pub error: Option<CatalogError>,
}

impl RecordResult {
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// One entry per input record, in input order.
    pub results: Vec<RecordResult>,
    pub error: Option<CatalogError>,
}

impl Reconciliation {
    #[must_use]
    pub fn saved(&self) -> usize {
        self.results.iter().filter(|result| result.is_saved()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.len() - self.saved()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordSummary {
    pub key: String,
    pub artifact_id: String,
    pub saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&RecordResult> for RecordSummary {
    fn from(result: &RecordResult) -> Self {
        Self {
            key: result.record.identity().to_string(),
            artifact_id: result.record.artifact_id.clone(),
            saved: result.is_saved(),
            error: result.error.as_ref().map(ToString::to_string),
        }
    }
}

/// Applies defaults to each record and upserts it. A failed save never stops the rest
/// of the batch; every failure message ends up in the combined error.
pub fn reconcile(store: &dyn CatalogStore, records: Vec<CatalogRecord>) -> Reconciliation {
    let mut messages = Vec::new();
    let results = records
        .into_iter()
        .map(|record| {
            let record = record.with_defaults();
            let error = store.save_metadata(&record).err().map(|err| {
                let failure = CatalogError::RecordPersistFailure {
                    key: record.identity().to_string(),
                    reason: format!("{err:#}"),
                };
                tracing::warn!(artifact = %record.artifact_id, error = %failure, "record not saved");
                messages.push(failure.to_string());
                failure
            });
            RecordResult { record, error }
        })
        .collect();
    let error = (!messages.is_empty()).then_some(CatalogError::PartialReconcile { messages });
    Reconciliation { results, error }
}

/// Source keys in presentation order: custom first, then registered sources in
/// registration order, then the public ones.
#[must_use]
pub fn listing_order(sources: &[DataSource]) -> Vec<String> {
    let mut order = vec![CUSTOM_SOURCE.to_string()];
    let registered = sources.iter().filter(|source| !source.is_public());
    let public = sources.iter().filter(|source| source.is_public());
    for source in registered.chain(public) {
        if !order.contains(&source.id) {
            order.push(source.id.clone());
        }
    }
    order
}

/// Stored records matching `filter`, grouped by source in listing order. Sources the
/// environment no longer registers follow, alphabetically.
pub fn list_metadata(
    store: &dyn CatalogStore,
    provider: &dyn Provider,
    filter: &MetadataFilter,
) -> Result<IndexMap<String, Vec<CatalogRecord>>, CatalogError> {
    let mut found = store
        .find_metadata(filter)
        .map_err(|err| CatalogError::StoreRead {
            reason: format!("{err:#}"),
        })?;
    let sources = provider
        .registered_image_sources()
        .map_err(|err| CatalogError::Sources {
            reason: format!("{err:#}"),
        })?;

    let mut grouped = IndexMap::with_capacity(found.len());
    for key in listing_order(&sources) {
        if let Some(records) = found.shift_remove(&key) {
            grouped.insert(key, records);
        }
    }
    found.sort_keys();
    grouped.extend(found);
    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{source, FakeProvider, MemoryStore};

    fn record(source: &str, series: &str, id: &str) -> CatalogRecord {
        CatalogRecord {
            source: source.into(),
            region: "dummy_region".into(),
            series: series.into(),
            arch: "amd64".into(),
            virt_type: "pv".into(),
            root_storage_type: "ebs".into(),
            artifact_id: id.into(),
            ..CatalogRecord::default()
        }
    }

    #[test]
    fn reconciling_twice_keeps_the_latest_artifact() {
        let store = MemoryStore::default();
        let first = reconcile(&store, vec![record("", "trusty", "ami-1")]);
        assert!(first.error.is_none());
        let second = reconcile(&store, vec![record("", "trusty", "ami-2")]);
        assert!(second.error.is_none());

        let stored = store.records();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].artifact_id, "ami-2");
        assert_eq!(stored[0].source, "custom");
        assert_eq!(stored[0].stream, "released");
    }

    #[test]
    fn failures_are_combined_without_blocking_siblings() {
        let store = MemoryStore::default()
            .failing_on("ami-bad-1")
            .failing_on("ami-bad-2");
        let outcome = reconcile(
            &store,
            vec![
                record("custom", "trusty", "ami-bad-1"),
                record("custom", "precise", "ami-ok"),
                record("custom", "xenial", "ami-bad-2"),
            ],
        );

        assert_eq!(outcome.results.len(), 3);
        let saved: Vec<_> = outcome.results.iter().map(RecordResult::is_saved).collect();
        assert_eq!(saved, [false, true, false]);
        assert_eq!(store.artifact_ids(), ["ami-ok"]);
        assert_eq!((outcome.saved(), outcome.failed()), (1, 2));

        let err = outcome.error.expect("combined error");
        let CatalogError::PartialReconcile { messages } = &err else {
            panic!("unexpected error {err:?}");
        };
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("disk full writing ami-bad-1"), "{}", messages[0]);
        assert!(messages[1].contains("disk full writing ami-bad-2"), "{}", messages[1]);
        assert_eq!(
            err.to_string(),
            format!("[CR311] saving some catalog metadata:\n{}", messages.join("\n"))
        );
    }

    #[test]
    fn empty_batch_is_clean() {
        let outcome = reconcile(&MemoryStore::default(), Vec::new());
        assert!(outcome.results.is_empty());
        assert!(outcome.error.is_none());
    }

    #[test]
    fn listing_puts_custom_then_registered_then_public() {
        let store = MemoryStore::default();
        reconcile(
            &store,
            vec![
                record("default cloud images", "trusty", "ami-public"),
                record("zz leftover", "trusty", "ami-z"),
                record("second ds", "trusty", "ami-second"),
                record("aa leftover", "trusty", "ami-a"),
                record("", "trusty", "ami-custom"),
                record("", "precise", "ami-custom-2"),
            ],
        );
        let provider = FakeProvider::new().with_image_sources(vec![
            DataSource::public("default cloud images", None),
            source("second ds"),
        ]);

        let listed =
            list_metadata(&store, &provider, &MetadataFilter::default()).expect("listing");
        let keys: Vec<_> = listed.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
                "custom",
                "second ds",
                "default cloud images",
                "aa leftover",
                "zz leftover"
            ]
        );
        let custom: Vec<_> = listed["custom"].iter().map(|r| r.artifact_id.as_str()).collect();
        assert_eq!(custom, ["ami-custom", "ami-custom-2"]);
    }

    #[test]
    fn listing_applies_the_filter() {
        let store = MemoryStore::default();
        reconcile(
            &store,
            vec![record("", "trusty", "ami-1"), record("", "precise", "ami-2")],
        );
        let filter = MetadataFilter {
            series: vec!["precise".into()],
            ..MetadataFilter::default()
        };
        let listed = list_metadata(&store, &FakeProvider::new(), &filter).expect("listing");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed["custom"][0].artifact_id, "ami-2");
    }
}
