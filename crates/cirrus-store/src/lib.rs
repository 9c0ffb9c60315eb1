//! File-backed catalog storage: image metadata records and the agent tools archive.

use std::{
    env,
    fs::{self, File},
    io::{Read, Write},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use cirrus_domain::api::{BuiltArtifact, CatalogRecord, MetadataFilter};
use dirs_next::home_dir;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

pub const CATALOG_PATH_ENV: &str = "CIRRUS_CATALOG_PATH";
pub const XDG_DATA_HOME_ENV: &str = "XDG_DATA_HOME";
const METADATA_FILENAME: &str = "metadata.json";
const TOOLS_DIR: &str = "tools";
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone)]
pub struct CatalogLocation {
    pub path: PathBuf,
    pub source: &'static str,
}

/// Resolves where the catalog lives from the captured values of `CIRRUS_CATALOG_PATH`
/// and `XDG_DATA_HOME`, falling back to `~/.local/share`.
pub fn resolve_catalog_path(
    catalog_override: Option<&str>,
    xdg_data_home: Option<&str>,
) -> Result<CatalogLocation> {
    if let Some(override_path) = catalog_override {
        let path = absolutize(PathBuf::from(override_path))?;
        return Ok(CatalogLocation {
            path,
            source: CATALOG_PATH_ENV,
        });
    }

    let (base, source) = resolve_data_base(xdg_data_home)?;
    Ok(CatalogLocation {
        path: base.join("cirrus").join("catalog"),
        source,
    })
}

fn resolve_data_base(xdg_data_home: Option<&str>) -> Result<(PathBuf, &'static str)> {
    if let Some(xdg) = xdg_data_home {
        return Ok((PathBuf::from(xdg), XDG_DATA_HOME_ENV));
    }
    let home = home_dir().ok_or_else(|| anyhow!("unable to determine home directory"))?;
    Ok((home.join(".local").join("share"), "~/.local/share"))
}

fn absolutize(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    format_version: u32,
    #[serde(default)]
    records: Vec<CatalogRecord>,
}

/// What a save did to the stored entry with the same identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted,
    Updated,
    Unchanged,
}

/// Image metadata records persisted as one JSON document.
///
/// Every save rewrites the document through a temp file in the same directory, so a
/// failed save leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    root: PathBuf,
}

impl FileCatalog {
    #[must_use]
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn metadata_path(&self) -> PathBuf {
        self.root.join(METADATA_FILENAME)
    }

    fn load(&self) -> Result<CatalogDocument> {
        let path = self.metadata_path();
        if !path.exists() {
            return Ok(CatalogDocument {
                format_version: FORMAT_VERSION,
                records: Vec::new(),
            });
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("reading catalog metadata at {}", path.display()))?;
        let document: CatalogDocument = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse catalog metadata at {}", path.display()))?;
        if document.format_version > FORMAT_VERSION {
            bail!(
                "catalog metadata at {} has format {} (supported: {FORMAT_VERSION})",
                path.display(),
                document.format_version
            );
        }
        Ok(document)
    }

    fn write(&self, document: &CatalogDocument) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("creating catalog directory {}", self.root.display()))?;
        let path = self.metadata_path();
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        let mut json = serde_json::to_vec_pretty(document)?;
        json.push(b'\n');
        tmp.write_all(&json)?;
        tmp.persist(&path)
            .map_err(|err| anyhow!("unable to persist catalog metadata: {err}"))?;
        Ok(())
    }

    /// All stored records, in insertion order.
    pub fn records(&self) -> Result<Vec<CatalogRecord>> {
        Ok(self.load()?.records)
    }

    /// Records matching `filter`, grouped by source. Groups appear in the order their
    /// source was first stored; records keep insertion order within a group.
    pub fn find(&self, filter: &MetadataFilter) -> Result<IndexMap<String, Vec<CatalogRecord>>> {
        let mut grouped: IndexMap<String, Vec<CatalogRecord>> = IndexMap::new();
        for record in self.load()?.records {
            if filter.matches(&record) {
                grouped.entry(record.source.clone()).or_default().push(record);
            }
        }
        Ok(grouped)
    }

    /// Inserts `record`, or replaces the artifact of the stored record with the same
    /// identity key.
    pub fn save(&self, record: &CatalogRecord) -> Result<SaveOutcome> {
        let mut document = self.load()?;
        document.format_version = FORMAT_VERSION;
        let key = record.identity();
        let outcome = match document
            .records
            .iter_mut()
            .find(|stored| stored.identity() == key)
        {
            Some(stored) if stored == record => SaveOutcome::Unchanged,
            Some(stored) => {
                *stored = record.clone();
                SaveOutcome::Updated
            }
            None => {
                document.records.push(record.clone());
                SaveOutcome::Inserted
            }
        };
        if outcome != SaveOutcome::Unchanged {
            self.write(&document)?;
        }
        tracing::trace!(key = %key, ?outcome, "catalog record saved");
        Ok(outcome)
    }
}

/// Uploaded agent tools tarballs, kept beside the catalog metadata.
#[derive(Debug, Clone)]
pub struct ToolsArchive {
    root: PathBuf,
}

impl ToolsArchive {
    #[must_use]
    pub fn open(catalog_root: &Path) -> Self {
        Self {
            root: catalog_root.join(TOOLS_DIR),
        }
    }

    #[must_use]
    pub fn path_for(&self, storage_name: &str) -> PathBuf {
        self.root.join(storage_name)
    }

    /// Copies a built tarball into the archive under `storage_name`, verifying its
    /// digest on the way in. Returns the archived path.
    pub fn put(&self, built: &BuiltArtifact, storage_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("creating tools archive {}", self.root.display()))?;
        let source = built.path();
        let mut input = File::open(&source)
            .with_context(|| format!("opening built tools at {}", source.display()))?;
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        let mut hasher = Sha256::new();
        let mut buffer = [0u8; 64 * 1024];
        loop {
            let read = input.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
            tmp.write_all(&buffer[..read])?;
        }
        let actual = hex::encode(hasher.finalize());
        if actual != built.sha256 {
            bail!(
                "sha256 mismatch for {} (expected {}, got {actual})",
                built.storage_name,
                built.sha256
            );
        }
        let dest = self.path_for(storage_name);
        tmp.persist(&dest)
            .map_err(|err| anyhow!("unable to persist {storage_name}: {err}"))?;
        Ok(dest)
    }
}

/// Hex-encoded sha256 of a file.
pub fn compute_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 32 * 1024];
    loop {
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}
