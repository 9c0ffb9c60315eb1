use cirrus_domain::api::{CatalogRecord, LookupConstraint, MetadataFilter};
use indexmap::IndexMap;

use crate::aggregate::{aggregate_images, Aggregated};
use crate::effects::Effects;
use crate::errors::CatalogError;
use crate::reconcile::{list_metadata, reconcile, Reconciliation};
use crate::scope::{resolve_scope, ScopeRequirement};

#[derive(Debug, Clone, Default)]
pub struct RefreshSummary {
    pub sources: usize,
    pub unavailable: Vec<CatalogError>,
    pub reconciliation: Reconciliation,
}

/// Fetches image metadata from every source the environment registers, narrowed to its
/// region, and upserts the merged records into the catalog.
///
/// Unreachable sources are skipped. Only a scope failure or the combined persist error
/// surfaces.
pub fn refresh_published_metadata(effects: &dyn Effects) -> Result<RefreshSummary, CatalogError> {
    let provider = effects.provider();
    let scope = resolve_scope(provider, ScopeRequirement::Required)?;
    let sources = provider
        .image_data_sources()
        .map_err(|err| CatalogError::Sources {
            reason: format!("{err:#}"),
        })?;
    let constraint =
        LookupConstraint::scoped(&scope).with_stream(provider.config().image_stream.clone());

    let Aggregated { records, errors } =
        aggregate_images(effects.transport(), &sources, &constraint);
    let fetched = records.len();
    let mut reconciliation = reconcile(effects.store(), records);
    tracing::info!(
        sources = sources.len(),
        unavailable = errors.len(),
        fetched,
        saved = reconciliation.saved(),
        "image metadata refreshed"
    );
    if let Some(err) = reconciliation.error.take() {
        return Err(err);
    }
    Ok(RefreshSummary {
        sources: sources.len(),
        unavailable: errors,
        reconciliation,
    })
}

/// What a refresh would see, without persisting anything. Lookups stay unconstrained
/// when the provider cannot report a region.
pub fn search_published_images(
    effects: &dyn Effects,
    filter: &MetadataFilter,
) -> Result<Aggregated<CatalogRecord>, CatalogError> {
    let provider = effects.provider();
    let scope = resolve_scope(provider, ScopeRequirement::Tolerant)?;
    let sources = provider
        .image_data_sources()
        .map_err(|err| CatalogError::Sources {
            reason: format!("{err:#}"),
        })?;
    let mut constraint = LookupConstraint::scoped(&scope).with_stream(filter.stream.clone());
    constraint.series.extend(filter.series.iter().cloned());
    constraint.arches.extend(filter.arches.iter().cloned());

    let mut aggregated = aggregate_images(effects.transport(), &sources, &constraint);
    aggregated
        .records
        .retain(|record| filter.matches(&record.clone().with_defaults()));
    Ok(aggregated)
}

/// Persists operator-supplied records through the reconciler.
pub fn save_metadata(effects: &dyn Effects, records: Vec<CatalogRecord>) -> Reconciliation {
    reconcile(effects.store(), records)
}

pub fn list(
    effects: &dyn Effects,
    filter: &MetadataFilter,
) -> Result<IndexMap<String, Vec<CatalogRecord>>, CatalogError> {
    list_metadata(effects.store(), effects.provider(), filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{image, source, FakeEffects, FakeProvider, FakeTransport, MemoryStore};
    use cirrus_domain::api::CloudSpec;

    fn three_sources() -> FakeProvider {
        FakeProvider::new().with_image_sources(vec![
            source("first"),
            source("second"),
            source("third"),
        ])
    }

    #[test]
    fn middle_source_failure_still_refreshes_the_rest() {
        let transport = FakeTransport::default()
            .with_images(
                "first",
                vec![
                    image("ami-1", "r1", "14.04", "amd64"),
                    image("ami-other-region", "r2", "14.04", "amd64"),
                ],
            )
            .unreachable("second")
            .with_images("third", vec![image("ami-3", "r1", "12.04", "amd64")]);
        let provider = three_sources().with_region(CloudSpec::new("r1", "https://r1"));
        let effects = FakeEffects::new(provider, transport);

        let summary = refresh_published_metadata(&effects).expect("refresh");

        assert_eq!(summary.sources, 3);
        assert_eq!(summary.unavailable.len(), 1);
        let stored: Vec<_> = effects
            .store
            .records()
            .into_iter()
            .map(|r| (r.source, r.region, r.artifact_id))
            .collect();
        assert_eq!(
            stored,
            [
                ("first".to_string(), "r1".to_string(), "ami-1".to_string()),
                ("third".to_string(), "r1".to_string(), "ami-3".to_string()),
            ]
        );
    }

    #[test]
    fn refresh_without_region_leaves_store_untouched() {
        let transport = FakeTransport::default()
            .with_images("first", vec![image("ami-1", "r1", "14.04", "amd64")]);
        let effects = FakeEffects::new(three_sources(), transport);

        let err = refresh_published_metadata(&effects).unwrap_err();

        assert!(matches!(err, CatalogError::ScopeUndeterminable { .. }));
        assert!(effects.transport.calls().is_empty());
        assert!(effects.store.records().is_empty());
    }

    #[test]
    fn refresh_reports_partial_persist_failure() {
        let transport = FakeTransport::default().with_images(
            "first",
            vec![
                image("ami-1", "r1", "14.04", "amd64"),
                image("ami-2", "r1", "12.04", "amd64"),
            ],
        );
        let provider = three_sources().with_region(CloudSpec::new("r1", "https://r1"));
        let mut effects = FakeEffects::new(provider, transport);
        effects.store = MemoryStore::default().failing_on("ami-1");

        let err = refresh_published_metadata(&effects).unwrap_err();

        assert_eq!(err.code(), "CR311");
        assert_eq!(effects.store.artifact_ids(), ["ami-2"]);
    }

    #[test]
    fn last_seen_record_wins_identity_collisions() {
        let transport = FakeTransport::default()
            .with_images("first", vec![image("ami-old", "r1", "14.04", "amd64")])
            .with_images(
                "second",
                vec![
                    image("ami-new", "r1", "14.04", "amd64"),
                    image("ami-newer", "r1", "14.04", "amd64"),
                ],
            );
        let provider = FakeProvider::new()
            .with_image_sources(vec![source("first"), source("second")])
            .with_region(CloudSpec::new("r1", "https://r1"));
        let effects = FakeEffects::new(provider, transport);

        let summary = refresh_published_metadata(&effects).expect("refresh");

        assert_eq!(summary.reconciliation.results.len(), 3);
        assert_eq!(effects.store.artifact_ids(), ["ami-old", "ami-newer"]);
    }

    #[test]
    fn search_tolerates_missing_region_and_persists_nothing() {
        let transport = FakeTransport::default()
            .with_images(
                "first",
                vec![
                    image("ami-1", "r1", "14.04", "amd64"),
                    image("ami-2", "r2", "14.04", "arm64"),
                ],
            )
            .unreachable("second")
            .with_images("third", vec![image("ami-3", "r1", "12.04", "amd64")]);
        let effects = FakeEffects::new(three_sources(), transport);

        let filter = MetadataFilter {
            arches: vec!["amd64".into()],
            ..MetadataFilter::default()
        };
        let found = search_published_images(&effects, &filter).expect("search");

        let ids: Vec<_> = found.records.iter().map(|r| r.artifact_id.as_str()).collect();
        assert_eq!(ids, ["ami-1", "ami-3"]);
        assert_eq!(found.errors.len(), 1);
        assert!(effects.store.records().is_empty());
    }

    #[test]
    fn saved_metadata_is_listed_custom_first() {
        let effects = FakeEffects::new(FakeProvider::new(), FakeTransport::default());
        let outcome = save_metadata(
            &effects,
            vec![CatalogRecord {
                region: "r1".into(),
                series: "trusty".into(),
                arch: "amd64".into(),
                artifact_id: "img-1".into(),
                ..CatalogRecord::default()
            }],
        );
        assert!(outcome.error.is_none());
        let listed = list(&effects, &MetadataFilter::default()).expect("list");
        assert_eq!(listed["custom"][0].artifact_id, "img-1");
        assert_eq!(listed["custom"][0].stream, "released");
    }
}
