use std::path::Path;

use anyhow::{Context, Result};
use cirrus_domain::api::{
    storage_name, Binary, BuiltArtifact, CatalogRecord, MetadataFilter, ToolBinary,
};
use cirrus_store::{FileCatalog, ToolsArchive};
use indexmap::IndexMap;

use crate::effects::{CatalogStore, ToolsStorage};

pub struct FileCatalogStore {
    catalog: FileCatalog,
}

impl FileCatalogStore {
    #[must_use]
    pub fn open(root: &Path) -> Self {
        Self {
            catalog: FileCatalog::open(root),
        }
    }
}

impl CatalogStore for FileCatalogStore {
    fn find_metadata(
        &self,
        filter: &MetadataFilter,
    ) -> Result<IndexMap<String, Vec<CatalogRecord>>> {
        self.catalog.find(filter)
    }

    fn save_metadata(&self, record: &CatalogRecord) -> Result<()> {
        self.catalog.save(record).map(|_| ())
    }
}

/// Uploads built tarballs into the catalog's tools archive.
pub struct ArchiveToolsStorage {
    archive: ToolsArchive,
}

impl ArchiveToolsStorage {
    #[must_use]
    pub fn open(catalog_root: &Path) -> Self {
        Self {
            archive: ToolsArchive::open(catalog_root),
        }
    }
}

impl ToolsStorage for ArchiveToolsStorage {
    fn upload(&self, built: &BuiltArtifact, target: &Binary) -> Result<ToolBinary> {
        let name = storage_name(target);
        let stored = self
            .archive
            .put(built, &name)
            .with_context(|| format!("archiving {}", built.path().display()))?;
        Ok(ToolBinary {
            version: target.number,
            series: target.series.clone(),
            arch: target.arch.clone(),
            size: built.size,
            hash: built.sha256.clone(),
            storage_location: stored.display().to_string(),
        })
    }
}
