use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::version::{Binary, Number};

/// One agent executable artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolBinary {
    pub version: Number,
    pub series: String,
    pub arch: String,
    pub size: i64,
    #[serde(alias = "sha256")]
    pub hash: String,
    #[serde(alias = "path")]
    pub storage_location: String,
}

impl ToolBinary {
    #[must_use]
    pub fn binary(&self) -> Binary {
        Binary {
            number: self.version,
            series: self.series.clone(),
            arch: self.arch.clone(),
        }
    }
}

/// Wildcard value for major/minor constraints.
pub const ANY_VERSION: i32 = -1;

/// Filters candidate binaries by version family, series and arch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionConstraint {
    pub major_version: i32,
    pub minor_version: i32,
    pub series: String,
    pub arch: Option<String>,
    /// Exact version required when the environment pins its agent version.
    pub number: Option<Number>,
}

impl VersionConstraint {
    #[must_use]
    pub fn any(series: impl Into<String>, arch: Option<String>) -> Self {
        Self {
            major_version: ANY_VERSION,
            minor_version: ANY_VERSION,
            series: series.into(),
            arch,
            number: None,
        }
    }

    /// Restricts candidates to the major.minor family of `number`.
    #[must_use]
    pub fn family_of(number: &Number, series: impl Into<String>, arch: Option<String>) -> Self {
        Self {
            major_version: i32::try_from(number.major).unwrap_or(i32::MAX),
            minor_version: i32::try_from(number.minor).unwrap_or(i32::MAX),
            ..Self::any(series, arch)
        }
    }

    #[must_use]
    pub fn pinned(mut self, number: Option<Number>) -> Self {
        self.number = number;
        self
    }

    #[must_use]
    pub fn matches(&self, tools: &ToolBinary) -> bool {
        component_matches(self.major_version, tools.version.major)
            && component_matches(self.minor_version, tools.version.minor)
            && (self.series.is_empty() || self.series == tools.series)
            && self.arch.as_ref().is_none_or(|arch| *arch == tools.arch)
            && self.number.is_none_or(|number| number == tools.version)
    }
}

fn component_matches(wanted: i32, actual: u32) -> bool {
    wanted == ANY_VERSION || u32::try_from(wanted).is_ok_and(|wanted| wanted == actual)
}

/// A freshly built tools tarball waiting to be uploaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltArtifact {
    pub dir: PathBuf,
    pub storage_name: String,
    pub version: Binary,
    pub size: i64,
    pub sha256: String,
}

impl BuiltArtifact {
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.storage_name)
    }
}

/// Canonical tarball name for a binary version.
#[must_use]
pub fn storage_name(version: &Binary) -> String {
    format!("cirrus-{version}.tgz")
}
