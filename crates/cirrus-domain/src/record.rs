use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_STREAM: &str = "released";
pub const CUSTOM_SOURCE: &str = "custom";

/// One catalog entry: an artifact id published for a placement/series/arch tuple.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub stream: String,
    #[serde(default)]
    pub region: String,
    pub series: String,
    pub arch: String,
    #[serde(default)]
    pub virt_type: String,
    #[serde(default)]
    pub root_storage_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_storage_size: Option<u64>,
    pub artifact_id: String,
}

impl CatalogRecord {
    /// Fills the stream and source a record may have been published without.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        if self.stream.is_empty() {
            self.stream = DEFAULT_STREAM.to_string();
        }
        if self.source.is_empty() {
            self.source = CUSTOM_SOURCE.to_string();
        }
        self
    }

    #[must_use]
    pub fn identity(&self) -> IdentityKey {
        IdentityKey {
            region: self.region.clone(),
            series: self.series.clone(),
            arch: self.arch.clone(),
            virt_type: self.virt_type.clone(),
            root_storage_type: self.root_storage_type.clone(),
            source: self.source.clone(),
            stream: self.stream.clone(),
        }
    }
}

/// The attributes that decide whether two records denote the same catalog entry.
/// `artifact_id` is deliberately absent: it is the value being upserted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityKey {
    pub region: String,
    pub series: String,
    pub arch: String,
    pub virt_type: String,
    pub root_storage_type: String,
    pub source: String,
    pub stream: String,
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}/{}/{}",
            self.source,
            self.stream,
            or_dash(&self.region),
            self.series,
            self.arch,
            or_dash(&self.virt_type),
            or_dash(&self.root_storage_type),
        )
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

/// Store query. Empty fields match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFilter {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub series: Vec<String>,
    #[serde(default)]
    pub arches: Vec<String>,
    #[serde(default)]
    pub stream: String,
    #[serde(default)]
    pub virt_type: String,
    #[serde(default)]
    pub root_storage_type: String,
}

impl MetadataFilter {
    #[must_use]
    pub fn matches(&self, record: &CatalogRecord) -> bool {
        field_matches(&self.region, &record.region)
            && (self.series.is_empty() || self.series.contains(&record.series))
            && (self.arches.is_empty() || self.arches.contains(&record.arch))
            && field_matches(&self.stream, &record.stream)
            && field_matches(&self.virt_type, &record.virt_type)
            && field_matches(&self.root_storage_type, &record.root_storage_type)
    }
}

fn field_matches(wanted: &str, actual: &str) -> bool {
    wanted.is_empty() || wanted == actual
}

/// An image as decoded from a published product document, before conversion.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedImage {
    pub id: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub endpoint: String,
    /// OS version, e.g. `14.04`.
    pub version: String,
    /// Release name when the product document carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    pub arch: String,
    #[serde(default)]
    pub virt_type: String,
    #[serde(default)]
    pub root_store: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_size: Option<u64>,
    #[serde(default)]
    pub stream: String,
}

impl PublishedImage {
    /// The stream this image belongs to, treating an unset stream as released.
    #[must_use]
    pub fn effective_stream(&self) -> &str {
        if self.stream.is_empty() {
            DEFAULT_STREAM
        } else {
            &self.stream
        }
    }
}
