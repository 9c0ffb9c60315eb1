use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

/// A concrete cloud placement.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CloudSpec {
    pub region: String,
    pub endpoint: String,
}

impl CloudSpec {
    #[must_use]
    pub fn new(region: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            endpoint: endpoint.into(),
        }
    }
}

impl fmt::Display for CloudSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.endpoint.is_empty() {
            write!(f, "{}", self.region)
        } else {
            write!(f, "{} ({})", self.region, self.endpoint)
        }
    }
}

/// Outcome of narrowing a lookup to a cloud placement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    Constrained(CloudSpec),
    Unconstrained,
}

impl Scope {
    #[must_use]
    pub fn cloud_spec(&self) -> Option<&CloudSpec> {
        match self {
            Scope::Constrained(spec) => Some(spec),
            Scope::Unconstrained => None,
        }
    }
}

/// Narrows what a data source lookup returns. Empty sets and an empty stream match
/// everything; an absent cloud spec matches every region.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LookupConstraint {
    pub cloud_spec: Option<CloudSpec>,
    pub series: BTreeSet<String>,
    pub arches: BTreeSet<String>,
    pub stream: String,
}

impl LookupConstraint {
    #[must_use]
    pub fn scoped(scope: &Scope) -> Self {
        Self {
            cloud_spec: scope.cloud_spec().cloned(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_series(mut self, series: impl Into<String>) -> Self {
        self.series.insert(series.into());
        self
    }

    #[must_use]
    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arches.insert(arch.into());
        self
    }

    #[must_use]
    pub fn with_stream(mut self, stream: impl Into<String>) -> Self {
        self.stream = stream.into();
        self
    }

    #[must_use]
    pub fn matches_series(&self, series: &str) -> bool {
        self.series.is_empty() || self.series.contains(series)
    }

    #[must_use]
    pub fn matches_arch(&self, arch: &str) -> bool {
        self.arches.is_empty() || self.arches.contains(arch)
    }

    #[must_use]
    pub fn matches_stream(&self, stream: &str) -> bool {
        self.stream.is_empty() || self.stream == stream
    }

    /// Records without a concrete region only survive unconstrained lookups.
    #[must_use]
    pub fn matches_placement(&self, region: &str, endpoint: &str) -> bool {
        match &self.cloud_spec {
            None => true,
            Some(_) if region.is_empty() => false,
            Some(spec) => spec.region == region && spec.endpoint == endpoint,
        }
    }
}
