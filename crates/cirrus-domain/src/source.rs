use serde::{Deserialize, Serialize};
use url::Url;

/// Priority of the environment's public catalog.
pub const DEFAULT_CLOUD_PRIORITY: i32 = 10;
/// Priority of catalogs published specifically for one cloud.
pub const SPECIFIC_CLOUD_PRIORITY: i32 = 20;
/// Priority of sources an operator registered explicitly.
pub const CUSTOM_CLOUD_PRIORITY: i32 = 50;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Registered explicitly for this environment.
    #[default]
    Custom,
    /// The environment's implicit default catalog.
    Public,
}

/// A named origin of published catalog documents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub id: String,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<Url>,
    #[serde(default)]
    pub kind: SourceKind,
}

fn default_priority() -> i32 {
    CUSTOM_CLOUD_PRIORITY
}

impl DataSource {
    #[must_use]
    pub fn custom(id: impl Into<String>, base_url: Option<Url>) -> Self {
        let id = id.into();
        Self {
            description: id.clone(),
            id,
            priority: CUSTOM_CLOUD_PRIORITY,
            base_url,
            kind: SourceKind::Custom,
        }
    }

    #[must_use]
    pub fn public(id: impl Into<String>, base_url: Option<Url>) -> Self {
        let id = id.into();
        Self {
            description: id.clone(),
            id,
            priority: DEFAULT_CLOUD_PRIORITY,
            base_url,
            kind: SourceKind::Public,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn is_public(&self) -> bool {
        self.kind == SourceKind::Public
    }

    /// Human label used in logs and error messages.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.description.is_empty() {
            &self.id
        } else {
            &self.description
        }
    }
}

/// Orders sources highest priority first, keeping registration order among equals.
pub fn sort_by_priority(sources: &mut [DataSource]) {
    sources.sort_by(|left, right| right.priority.cmp(&left.priority));
}
