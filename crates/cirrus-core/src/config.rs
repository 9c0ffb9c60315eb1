use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use cirrus_domain::api::{Binary, Number};
use cirrus_domain::{arch, environ::DEFAULT_SERIES};
use cirrus_store::{resolve_catalog_path, CatalogLocation, CATALOG_PATH_ENV, XDG_DATA_HOME_ENV};
use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use url::Url;

const ENVIRONMENT_ENV: &str = "CIRRUS_ENVIRONMENT";
const AGENT_BINARY_ENV: &str = "CIRRUS_AGENT_BINARY";
const DEVELOPMENT_ENV: &str = "CIRRUS_DEVELOPMENT";
const IMAGE_METADATA_URL_ENV: &str = "CIRRUS_IMAGE_METADATA_URL";
const TOOLS_METADATA_URL_ENV: &str = "CIRRUS_TOOLS_METADATA_URL";
const VERSION_ENV: &str = "CIRRUS_VERSION";

pub const CIRRUS_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalOptions {
    pub quiet: bool,
    pub verbose: u8,
    pub trace: bool,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    #[must_use]
    pub fn capture() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    pub(crate) fn flag_is_enabled(&self, key: &str) -> bool {
        matches!(self.vars.get(key).map(String::as_str), Some("1"))
    }

    pub(crate) fn var(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    #[cfg(test)]
    pub(crate) fn testing(pairs: &[(&str, &str)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { vars }
    }
}

/// Run-scoped settings derived from the process environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub environment: PathBuf,
    pub catalog: CatalogLocation,
    pub agent_binary: Option<PathBuf>,
    pub force_development: bool,
    pub image_metadata_url: Option<Url>,
    pub tools_metadata_url: Option<Url>,
    pub cli_version: Binary,
}

impl Settings {
    /// Builds settings from the current process environment.
    ///
    /// # Errors
    /// Returns an error if a path or URL override is malformed.
    pub fn from_env() -> Result<Self> {
        Self::from_snapshot(&EnvSnapshot::capture())
    }

    pub fn from_snapshot(snapshot: &EnvSnapshot) -> Result<Self> {
        let environment = match snapshot.var(ENVIRONMENT_ENV) {
            Some(path) => PathBuf::from(path),
            None => config_dir()
                .ok_or_else(|| anyhow!("unable to determine configuration directory"))?
                .join("cirrus")
                .join("environment.json"),
        };
        Ok(Self {
            environment,
            catalog: resolve_catalog_path(
                snapshot.var(CATALOG_PATH_ENV),
                snapshot.var(XDG_DATA_HOME_ENV),
            )?,
            agent_binary: snapshot.var(AGENT_BINARY_ENV).map(PathBuf::from),
            force_development: snapshot.flag_is_enabled(DEVELOPMENT_ENV),
            image_metadata_url: parse_url(snapshot, IMAGE_METADATA_URL_ENV)?,
            tools_metadata_url: parse_url(snapshot, TOOLS_METADATA_URL_ENV)?,
            cli_version: cli_version(snapshot)?,
        })
    }
}

fn parse_url(snapshot: &EnvSnapshot, key: &str) -> Result<Option<Url>> {
    snapshot
        .var(key)
        .map(|raw| Url::parse(raw).with_context(|| format!("{key} is not a valid URL: {raw}")))
        .transpose()
}

fn cli_version(snapshot: &EnvSnapshot) -> Result<Binary> {
    if let Some(raw) = snapshot.var(VERSION_ENV) {
        return raw
            .parse()
            .with_context(|| format!("{VERSION_ENV} must look like 1.18.0-trusty-amd64"));
    }
    let number: Number = CIRRUS_VERSION
        .parse()
        .context("crate version is not an agent version")?;
    Ok(Binary {
        number,
        series: DEFAULT_SERIES.to_string(),
        arch: arch::normalise(env::consts::ARCH),
    })
}
