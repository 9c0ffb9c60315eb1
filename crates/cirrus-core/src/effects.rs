use std::sync::Arc;

use anyhow::Result;
use cirrus_domain::api::{
    Binary, BuiltArtifact, CatalogRecord, CloudSpec, DataSource, EnvironConfig, LookupConstraint,
    MetadataFilter, Number, PublishedImage, ToolBinary,
};
use indexmap::IndexMap;

use crate::config::Settings;
use crate::system::{
    ArchiveToolsStorage, FileCatalogStore, LocalTransport, ManifestProvider, SystemHost,
    TarballBuilder,
};

/// Region capability. Only providers that can report a region expose one.
pub trait HasRegion: Send + Sync {
    fn region(&self) -> Result<CloudSpec>;
}

pub trait Provider: Send + Sync {
    fn config(&self) -> &EnvironConfig;

    fn region_reporter(&self) -> Option<&dyn HasRegion> {
        None
    }

    fn supported_architectures(&self) -> Result<Vec<String>>;

    /// Image sources in visiting order.
    fn image_data_sources(&self) -> Result<Vec<DataSource>>;

    /// Image sources in the order the environment registered them.
    fn registered_image_sources(&self) -> Result<Vec<DataSource>> {
        self.image_data_sources()
    }

    /// Tools sources in visiting order.
    fn tools_data_sources(&self) -> Result<Vec<DataSource>>;
}

/// Retrieves and decodes published documents. Filtering is left to the caller.
pub trait Transport: Send + Sync {
    fn images(
        &self,
        source: &DataSource,
        constraint: &LookupConstraint,
    ) -> Result<Vec<PublishedImage>>;
    fn tools(&self, source: &DataSource, constraint: &LookupConstraint) -> Result<Vec<ToolBinary>>;
}

pub trait CatalogStore: Send + Sync {
    fn find_metadata(&self, filter: &MetadataFilter)
        -> Result<IndexMap<String, Vec<CatalogRecord>>>;
    fn save_metadata(&self, record: &CatalogRecord) -> Result<()>;
}

pub trait BuildTool: Send + Sync {
    fn build_tarball(&self, force_version: Option<&Number>) -> Result<BuiltArtifact>;
}

pub trait ToolsStorage: Send + Sync {
    fn upload(&self, built: &BuiltArtifact, target: &Binary) -> Result<ToolBinary>;
}

pub trait Host: Send + Sync {
    fn host_arch(&self) -> Result<String>;
    fn cli_version(&self) -> Binary;
}

pub trait Effects: Send + Sync {
    fn provider(&self) -> &dyn Provider;
    fn transport(&self) -> &dyn Transport;
    fn store(&self) -> &dyn CatalogStore;
    fn builder(&self) -> &dyn BuildTool;
    fn storage(&self) -> &dyn ToolsStorage;
    fn host(&self) -> &dyn Host;
}

pub type SharedEffects = Arc<dyn Effects>;

pub struct SystemEffects {
    provider: Arc<ManifestProvider>,
    transport: Arc<LocalTransport>,
    store: Arc<FileCatalogStore>,
    builder: Arc<TarballBuilder>,
    storage: Arc<ArchiveToolsStorage>,
    host: Arc<SystemHost>,
}

impl SystemEffects {
    /// Wires the local collaborators described by `settings`.
    ///
    /// # Errors
    /// Returns an error when the environment manifest cannot be loaded.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let provider = ManifestProvider::load(&settings.environment, settings)?;
        let host = SystemHost::new(settings.cli_version.clone());
        let builder = TarballBuilder::new(
            settings.agent_binary.clone(),
            settings.cli_version.clone(),
            host.arch(),
        );
        Ok(Self {
            provider: Arc::new(provider),
            transport: Arc::new(LocalTransport),
            store: Arc::new(FileCatalogStore::open(&settings.catalog.path)),
            builder: Arc::new(builder),
            storage: Arc::new(ArchiveToolsStorage::open(&settings.catalog.path)),
            host: Arc::new(host),
        })
    }
}

impl Effects for SystemEffects {
    fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    fn store(&self) -> &dyn CatalogStore {
        self.store.as_ref()
    }

    fn builder(&self) -> &dyn BuildTool {
        self.builder.as_ref()
    }

    fn storage(&self) -> &dyn ToolsStorage {
        self.storage.as_ref()
    }

    fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }
}
