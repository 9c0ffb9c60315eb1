use cirrus_domain::api::Scope;

use crate::effects::Provider;
use crate::errors::CatalogError;

/// Whether a flow may run without a region to scope its lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeRequirement {
    Required,
    Tolerant,
}

/// Resolves the region/endpoint that narrows lookups for `provider`.
pub fn resolve_scope(
    provider: &dyn Provider,
    requirement: ScopeRequirement,
) -> Result<Scope, CatalogError> {
    match provider.region_reporter() {
        Some(reporter) => {
            let spec = reporter
                .region()
                .map_err(|err| CatalogError::RegionLookup {
                    reason: format!("{err:#}"),
                })?;
            tracing::debug!(region = %spec.region, endpoint = %spec.endpoint, "lookups scoped");
            Ok(Scope::Constrained(spec))
        }
        None if requirement == ScopeRequirement::Required => {
            Err(CatalogError::ScopeUndeterminable {
                environment: provider.config().name.clone(),
            })
        }
        None => {
            tracing::debug!("provider reports no region; lookups unconstrained");
            Ok(Scope::Unconstrained)
        }
    }
}
