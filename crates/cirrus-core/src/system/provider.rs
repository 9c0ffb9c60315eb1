use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use cirrus_domain::api::{sort_by_priority, CloudSpec, DataSource, EnvironConfig};
use cirrus_domain::arch;
use serde::Deserialize;
use url::Url;

use crate::config::Settings;
use crate::effects::{HasRegion, Provider};

const DEFAULT_IMAGES_SOURCE: &str = "default cloud images";
const DEFAULT_TOOLS_SOURCE: &str = "default tools";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Manifest {
    #[serde(flatten)]
    config: EnvironConfig,
    #[serde(default)]
    region: Option<CloudSpec>,
    #[serde(default)]
    supported_architectures: Vec<String>,
    #[serde(default)]
    image_sources: Vec<DataSource>,
    #[serde(default)]
    tools_sources: Vec<DataSource>,
}

/// Provider described by the environment manifest.
#[derive(Debug)]
pub struct ManifestProvider {
    config: EnvironConfig,
    region: Option<CloudSpec>,
    arches: Vec<String>,
    image_sources: Vec<DataSource>,
    registered_images: Vec<DataSource>,
    tools_sources: Vec<DataSource>,
}

impl ManifestProvider {
    /// Loads the manifest at `path` and applies the run's overrides from `settings`.
    ///
    /// # Errors
    /// Returns an error if the manifest is missing or malformed.
    pub fn load(path: &Path, settings: &Settings) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading environment manifest {}", path.display()))?;
        Self::from_json(&contents, settings)
            .with_context(|| format!("parsing environment manifest {}", path.display()))
    }

    pub(crate) fn from_json(contents: &str, settings: &Settings) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(contents)?;
        let mut config = manifest.config;
        config.development |= settings.force_development;
        if let Some(url) = &settings.image_metadata_url {
            config.image_metadata_url = Some(url.clone());
        }
        if let Some(url) = &settings.tools_metadata_url {
            config.tools_metadata_url = Some(url.clone());
        }
        let arches = if manifest.supported_architectures.is_empty() {
            arch::ALL.iter().map(|arch| (*arch).to_string()).collect()
        } else {
            manifest.supported_architectures
        };
        let registered_images = with_default(
            manifest.image_sources,
            DEFAULT_IMAGES_SOURCE,
            config.image_metadata_url.as_ref(),
        );
        let mut image_sources = registered_images.clone();
        sort_by_priority(&mut image_sources);
        let mut tools_sources = with_default(
            manifest.tools_sources,
            DEFAULT_TOOLS_SOURCE,
            config.tools_metadata_url.as_ref(),
        );
        sort_by_priority(&mut tools_sources);
        tracing::debug!(
            environment = %config.name,
            provider_type = %config.provider_type,
            image_sources = image_sources.len(),
            tools_sources = tools_sources.len(),
            "environment manifest loaded"
        );
        Ok(Self {
            config,
            region: manifest.region,
            arches,
            image_sources,
            registered_images,
            tools_sources,
        })
    }
}

fn with_default(
    mut sources: Vec<DataSource>,
    default_id: &str,
    url: Option<&Url>,
) -> Vec<DataSource> {
    if let Some(url) = url {
        sources.push(DataSource::public(default_id, Some(url.clone())));
    }
    sources
}

impl HasRegion for ManifestProvider {
    fn region(&self) -> Result<CloudSpec> {
        self.region
            .clone()
            .ok_or_else(|| anyhow!("environment {:?} declares no region", self.config.name))
    }
}

impl Provider for ManifestProvider {
    fn config(&self) -> &EnvironConfig {
        &self.config
    }

    fn region_reporter(&self) -> Option<&dyn HasRegion> {
        self.region.as_ref().map(|_| self as &dyn HasRegion)
    }

    fn supported_architectures(&self) -> Result<Vec<String>> {
        Ok(self.arches.clone())
    }

    fn image_data_sources(&self) -> Result<Vec<DataSource>> {
        Ok(self.image_sources.clone())
    }

    fn registered_image_sources(&self) -> Result<Vec<DataSource>> {
        Ok(self.registered_images.clone())
    }

    fn tools_data_sources(&self) -> Result<Vec<DataSource>> {
        Ok(self.tools_sources.clone())
    }
}
