use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use cirrus_domain::api::{DataSource, LookupConstraint, PublishedImage, ToolBinary};
use serde::de::DeserializeOwned;

use crate::effects::Transport;

const IMAGES_DOCUMENT: &str = "images.json";
const TOOLS_DOCUMENT: &str = "tools.json";

/// Serves sources whose base URL is a `file://` directory holding decoded documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalTransport;

impl LocalTransport {
    fn source_dir(source: &DataSource) -> Result<PathBuf> {
        let url = source
            .base_url
            .as_ref()
            .ok_or_else(|| anyhow!("data source has no base url"))?;
        if url.scheme() != "file" {
            bail!("unsupported url scheme {:?} ({url})", url.scheme());
        }
        url.to_file_path()
            .map_err(|()| anyhow!("invalid file url {url}"))
    }

    fn read_document<T: DeserializeOwned>(source: &DataSource, name: &str) -> Result<Vec<T>> {
        let path = Self::source_dir(source)?.join(name);
        let contents =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let records: Vec<T> = serde_json::from_str(&contents)
            .with_context(|| format!("decoding {}", path.display()))?;
        tracing::trace!(source = %source.id, path = %path.display(), count = records.len(), "read published document");
        Ok(records)
    }
}

impl Transport for LocalTransport {
    fn images(&self, source: &DataSource, _: &LookupConstraint) -> Result<Vec<PublishedImage>> {
        Self::read_document(source, IMAGES_DOCUMENT)
    }

    fn tools(&self, source: &DataSource, _: &LookupConstraint) -> Result<Vec<ToolBinary>> {
        Self::read_document(source, TOOLS_DOCUMENT)
    }
}
