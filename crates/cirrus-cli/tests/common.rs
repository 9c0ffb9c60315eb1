#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use assert_cmd::{assert::Assert, cargo::cargo_bin_cmd, Command};
use serde_json::{json, Value};
use tempfile::TempDir;

pub const RELEASE_CLI: &str = "1.18.0-trusty-amd64";

/// A throwaway environment: manifest, catalog root and local source directories.
pub struct TestEnv {
    pub temp: TempDir,
    pub manifest: PathBuf,
    pub catalog: PathBuf,
}

impl TestEnv {
    pub fn new(manifest: &Value) -> Self {
        let temp = tempfile::Builder::new()
            .prefix("cirrus-cli-")
            .tempdir()
            .expect("tempdir");
        let manifest_path = temp.path().join("environment.json");
        fs::write(
            &manifest_path,
            serde_json::to_vec_pretty(manifest).expect("manifest json"),
        )
        .expect("write manifest");
        let catalog = temp.path().join("catalog");
        Self {
            temp,
            manifest: manifest_path,
            catalog,
        }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Creates a source directory holding `images.json` / `tools.json` documents.
    pub fn source_dir(&self, name: &str, images: &Value, tools: &Value) -> PathBuf {
        let dir = self.temp.path().join("sources").join(name);
        fs::create_dir_all(&dir).expect("source dir");
        fs::write(dir.join("images.json"), images.to_string()).expect("images");
        fs::write(dir.join("tools.json"), tools.to_string()).expect("tools");
        dir
    }

    pub fn cirrus(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("cirrus");
        cmd.env("CIRRUS_ENVIRONMENT", &self.manifest)
            .env("CIRRUS_CATALOG_PATH", &self.catalog)
            .env("CIRRUS_VERSION", RELEASE_CLI)
            .env("NO_COLOR", "1")
            .env_remove("CIRRUS_DEVELOPMENT")
            .env_remove("CIRRUS_AGENT_BINARY")
            .env_remove("CIRRUS_IMAGE_METADATA_URL")
            .env_remove("CIRRUS_TOOLS_METADATA_URL");
        cmd
    }
}

pub fn file_url(dir: &Path) -> String {
    format!("file://{}", dir.display())
}

pub fn manifest(extra: &Value) -> Value {
    let mut manifest = json!({ "name": "staging", "type": "openstack" });
    if let (Some(target), Some(extra)) = (manifest.as_object_mut(), extra.as_object()) {
        for (key, value) in extra {
            target.insert(key.clone(), value.clone());
        }
    }
    manifest
}

pub fn image(id: &str, region: &str, version: &str, arch: &str) -> Value {
    json!({
        "id": id,
        "region": region,
        "endpoint": format!("https://{region}"),
        "version": version,
        "arch": arch,
        "virt_type": "hvm",
        "root_store": "ebs",
    })
}

pub fn tools(version: &str, series: &str, arch: &str) -> Value {
    json!({
        "version": version,
        "series": series,
        "arch": arch,
        "size": 1024,
        "sha256": format!("sha-{version}-{arch}"),
        "path": format!("tools/cirrus-{version}-{series}-{arch}.tgz"),
    })
}

pub fn parse_json(assert: &Assert) -> Value {
    serde_json::from_slice(&assert.get_output().stdout).expect("valid json")
}

/// Catalog name of the machine running the tests, when it is one the tests cover.
pub fn host_arch() -> Option<&'static str> {
    match std::env::consts::ARCH {
        "x86_64" => Some("amd64"),
        "aarch64" => Some("arm64"),
        _ => None,
    }
}
