use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use cirrus_domain::api::{storage_name, Binary, BuiltArtifact, Number};
use cirrus_store::compute_sha256;
use flate2::{Compression, GzBuilder};

use crate::effects::BuildTool;

const AGENT_NAME: &str = "cirrus-agent";
const FORCE_VERSION_FILE: &str = "FORCE-VERSION";

/// Packages the local agent binary as a tools tarball for the host.
pub struct TarballBuilder {
    agent_binary: Option<PathBuf>,
    cli: Binary,
    host_arch: String,
}

impl TarballBuilder {
    #[must_use]
    pub fn new(agent_binary: Option<PathBuf>, cli: Binary, host_arch: String) -> Self {
        Self {
            agent_binary,
            cli,
            host_arch,
        }
    }

    fn agent_binary(&self) -> Result<PathBuf> {
        let path = match &self.agent_binary {
            Some(path) => path.clone(),
            None => which::which(AGENT_NAME)
                .with_context(|| format!("locating {AGENT_NAME} on PATH"))?,
        };
        if !path.is_file() {
            bail!("agent binary {} does not exist", path.display());
        }
        Ok(path)
    }
}

impl BuildTool for TarballBuilder {
    fn build_tarball(&self, force_version: Option<&Number>) -> Result<BuiltArtifact> {
        let agent = self.agent_binary()?;
        let version = Binary {
            number: force_version.copied().unwrap_or(self.cli.number),
            series: self.cli.series.clone(),
            arch: self.host_arch.clone(),
        };
        let name = storage_name(&version);
        let dir = tempfile::Builder::new()
            .prefix("cirrus-tools-")
            .tempdir()
            .context("creating tools build directory")?
            .keep();
        let path = dir.join(&name);
        write_tarball(&agent, force_version, &path)
            .with_context(|| format!("packaging {}", agent.display()))?;
        let size = i64::try_from(fs::metadata(&path)?.len()).context("tarball too large")?;
        let sha256 = compute_sha256(&path)?;
        tracing::debug!(path = %path.display(), size, "tools tarball written");
        Ok(BuiltArtifact {
            dir,
            storage_name: name,
            version,
            size,
            sha256,
        })
    }
}

fn write_tarball(agent: &Path, force_version: Option<&Number>, dest: &Path) -> Result<()> {
    let encoder = GzBuilder::new()
        .mtime(0)
        .write(File::create(dest)?, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let metadata = fs::metadata(agent)?;
    let mut header = tar::Header::new_gnu();
    header.set_mtime(0);
    header.set_uid(0);
    header.set_gid(0);
    header.set_entry_type(tar::EntryType::Regular);
    header.set_mode(0o755);
    header.set_size(metadata.len());
    builder.append_data(&mut header, AGENT_NAME, File::open(agent)?)?;

    if let Some(version) = force_version {
        let contents = version.to_string();
        let mut header = tar::Header::new_gnu();
        header.set_mtime(0);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_mode(0o644);
        header.set_size(contents.len() as u64);
        builder.append_data(&mut header, FORCE_VERSION_FILE, contents.as_bytes())?;
    }

    builder.into_inner()?.finish()?;
    Ok(())
}
