//! In-memory collaborators for unit tests.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use cirrus_domain::api::{
    storage_name, Binary, BuiltArtifact, CatalogRecord, CloudSpec, DataSource, EnvironConfig,
    LookupConstraint, MetadataFilter, Number, PublishedImage, ToolBinary,
};
use indexmap::IndexMap;
use url::Url;

use crate::effects::{
    BuildTool, CatalogStore, Effects, HasRegion, Host, Provider, ToolsStorage, Transport,
};

pub(crate) fn source(id: &str) -> DataSource {
    let url = Url::parse(&format!("file:///srv/{}", id.replace(' ', "-"))).ok();
    DataSource::custom(id, url)
}

pub(crate) fn image(id: &str, region: &str, version: &str, arch: &str) -> PublishedImage {
    PublishedImage {
        id: id.into(),
        region: region.into(),
        endpoint: format!("https://{region}"),
        version: version.into(),
        arch: arch.into(),
        virt_type: "pv".into(),
        root_store: "ebs".into(),
        ..PublishedImage::default()
    }
}

pub(crate) fn tools(version: &str, series: &str, arch: &str) -> ToolBinary {
    ToolBinary {
        version: version.parse().expect("tools version"),
        series: series.into(),
        arch: arch.into(),
        size: 1024,
        hash: format!("hash-{version}-{arch}"),
        storage_location: format!("file:///srv/tools/cirrus-{version}-{series}-{arch}.tgz"),
    }
}

pub(crate) struct FakeProvider {
    config: EnvironConfig,
    region: Option<std::result::Result<CloudSpec, String>>,
    arches: Vec<String>,
    image_sources: Vec<DataSource>,
    tools_sources: Vec<DataSource>,
}

impl FakeProvider {
    pub(crate) fn new() -> Self {
        Self {
            config: EnvironConfig::new("dummy", "dummy"),
            region: None,
            arches: vec!["amd64".into(), "arm64".into(), "ppc64".into()],
            image_sources: Vec::new(),
            tools_sources: Vec::new(),
        }
    }

    pub(crate) fn with_region(mut self, spec: CloudSpec) -> Self {
        self.region = Some(Ok(spec));
        self
    }

    pub(crate) fn with_failing_region(mut self, reason: &str) -> Self {
        self.region = Some(Err(reason.into()));
        self
    }

    pub(crate) fn with_arches(mut self, arches: &[&str]) -> Self {
        self.arches = arches.iter().map(|arch| (*arch).to_string()).collect();
        self
    }

    pub(crate) fn with_image_sources(mut self, sources: Vec<DataSource>) -> Self {
        self.image_sources = sources;
        self
    }

    pub(crate) fn with_tools_sources(mut self, sources: Vec<DataSource>) -> Self {
        self.tools_sources = sources;
        self
    }

    pub(crate) fn configure(mut self, apply: impl FnOnce(&mut EnvironConfig)) -> Self {
        apply(&mut self.config);
        self
    }
}

impl HasRegion for FakeProvider {
    fn region(&self) -> Result<CloudSpec> {
        match &self.region {
            Some(Ok(spec)) => Ok(spec.clone()),
            Some(Err(reason)) => Err(anyhow!("{reason}")),
            None => bail!("no region"),
        }
    }
}

impl Provider for FakeProvider {
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

    fn tools_data_sources(&self) -> Result<Vec<DataSource>> {
        Ok(self.tools_sources.clone())
    }
}

#[derive(Default)]
pub(crate) struct FakeTransport {
    images: HashMap<String, Vec<PublishedImage>>,
    tools: HashMap<String, Vec<ToolBinary>>,
    unreachable: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub(crate) fn with_images(mut self, source: &str, images: Vec<PublishedImage>) -> Self {
        self.images.insert(source.into(), images);
        self
    }

    pub(crate) fn with_tools(mut self, source: &str, tools: Vec<ToolBinary>) -> Self {
        self.tools.insert(source.into(), tools);
        self
    }

    pub(crate) fn unreachable(mut self, source: &str) -> Self {
        self.unreachable.insert(source.into());
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls").clone()
    }

    fn visit(&self, source: &DataSource) -> Result<()> {
        self.calls.lock().expect("calls").push(source.id.clone());
        if self.unreachable.contains(&source.id) {
            bail!("connection refused");
        }
        Ok(())
    }
}

impl Transport for FakeTransport {
    fn images(&self, source: &DataSource, _: &LookupConstraint) -> Result<Vec<PublishedImage>> {
        self.visit(source)?;
        Ok(self.images.get(&source.id).cloned().unwrap_or_default())
    }

    fn tools(&self, source: &DataSource, _: &LookupConstraint) -> Result<Vec<ToolBinary>> {
        self.visit(source)?;
        Ok(self.tools.get(&source.id).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    records: Mutex<Vec<CatalogRecord>>,
    failing: HashSet<String>,
}

impl MemoryStore {
    /// Saves of records carrying `artifact_id` fail.
    pub(crate) fn failing_on(mut self, artifact_id: &str) -> Self {
        self.failing.insert(artifact_id.into());
        self
    }

    pub(crate) fn records(&self) -> Vec<CatalogRecord> {
        self.records.lock().expect("records").clone()
    }

    pub(crate) fn artifact_ids(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .map(|record| record.artifact_id)
            .collect()
    }
}

impl CatalogStore for MemoryStore {
    fn find_metadata(
        &self,
        filter: &MetadataFilter,
    ) -> Result<IndexMap<String, Vec<CatalogRecord>>> {
        let mut grouped: IndexMap<String, Vec<CatalogRecord>> = IndexMap::new();
        for record in self.records() {
            if filter.matches(&record) {
                grouped.entry(record.source.clone()).or_default().push(record);
            }
        }
        Ok(grouped)
    }

    fn save_metadata(&self, record: &CatalogRecord) -> Result<()> {
        if self.failing.contains(&record.artifact_id) {
            bail!("disk full writing {}", record.artifact_id);
        }
        let mut records = self.records.lock().expect("records");
        let key = record.identity();
        match records.iter_mut().find(|stored| stored.identity() == key) {
            Some(stored) => *stored = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(())
    }
}

pub(crate) struct FakeBuilder {
    failure: Option<String>,
    calls: Mutex<Vec<Option<Number>>>,
    dirs: Mutex<Vec<PathBuf>>,
}

impl FakeBuilder {
    pub(crate) fn new() -> Self {
        Self {
            failure: None,
            calls: Mutex::new(Vec::new()),
            dirs: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::new()
        }
    }

    pub(crate) fn calls(&self) -> Vec<Option<Number>> {
        self.calls.lock().expect("calls").clone()
    }

    /// Build directories handed out so far.
    pub(crate) fn dirs(&self) -> Vec<PathBuf> {
        self.dirs.lock().expect("dirs").clone()
    }
}

impl BuildTool for FakeBuilder {
    fn build_tarball(&self, force_version: Option<&Number>) -> Result<BuiltArtifact> {
        self.calls.lock().expect("calls").push(force_version.copied());
        if let Some(reason) = &self.failure {
            bail!("{reason}");
        }
        let version = Binary {
            number: force_version.copied().unwrap_or_default(),
            series: "trusty".into(),
            arch: "amd64".into(),
        };
        let dir = tempfile::Builder::new()
            .prefix("cirrus-fake-build-")
            .tempdir()?
            .keep();
        std::fs::write(dir.join(storage_name(&version)), b"tools")?;
        self.dirs.lock().expect("dirs").push(dir.clone());
        Ok(BuiltArtifact {
            dir,
            storage_name: storage_name(&version),
            version,
            size: 2048,
            sha256: "built-sha".into(),
        })
    }
}

#[derive(Default)]
pub(crate) struct FakeStorage {
    failure: Option<String>,
    uploads: Mutex<Vec<Binary>>,
}

impl FakeStorage {
    pub(crate) fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    pub(crate) fn uploads(&self) -> Vec<Binary> {
        self.uploads.lock().expect("uploads").clone()
    }
}

impl ToolsStorage for FakeStorage {
    fn upload(&self, built: &BuiltArtifact, target: &Binary) -> Result<ToolBinary> {
        if let Some(reason) = &self.failure {
            bail!("{reason}");
        }
        self.uploads.lock().expect("uploads").push(target.clone());
        Ok(ToolBinary {
            version: target.number,
            series: target.series.clone(),
            arch: target.arch.clone(),
            size: built.size,
            hash: built.sha256.clone(),
            storage_location: format!("/archive/{}", storage_name(target)),
        })
    }
}

pub(crate) struct FakeHost {
    pub(crate) arch: String,
    pub(crate) cli: Binary,
}

impl FakeHost {
    pub(crate) fn new(cli: &str) -> Self {
        let cli: Binary = cli.parse().expect("cli version");
        Self {
            arch: cli.arch.clone(),
            cli,
        }
    }
}

impl Host for FakeHost {
    fn host_arch(&self) -> Result<String> {
        Ok(self.arch.clone())
    }

    fn cli_version(&self) -> Binary {
        self.cli.clone()
    }
}

pub(crate) struct FakeEffects {
    pub(crate) provider: FakeProvider,
    pub(crate) transport: FakeTransport,
    pub(crate) store: MemoryStore,
    pub(crate) builder: FakeBuilder,
    pub(crate) storage: FakeStorage,
    pub(crate) host: FakeHost,
}

impl FakeEffects {
    pub(crate) fn new(provider: FakeProvider, transport: FakeTransport) -> Self {
        Self {
            provider,
            transport,
            store: MemoryStore::default(),
            builder: FakeBuilder::new(),
            storage: FakeStorage::default(),
            host: FakeHost::new("1.18.0-trusty-amd64"),
        }
    }
}

impl Effects for FakeEffects {
    fn provider(&self) -> &dyn Provider {
        &self.provider
    }

    fn transport(&self) -> &dyn Transport {
        &self.transport
    }

    fn store(&self) -> &dyn CatalogStore {
        &self.store
    }

    fn builder(&self) -> &dyn BuildTool {
        &self.builder
    }

    fn storage(&self) -> &dyn ToolsStorage {
        &self.storage
    }

    fn host(&self) -> &dyn Host {
        &self.host
    }
}

pub(crate) fn number(raw: &str) -> Number {
    raw.parse().expect("version number")
}
