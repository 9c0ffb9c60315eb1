use serde::{Deserialize, Serialize};
use url::Url;

use crate::record::DEFAULT_STREAM;
use crate::version::Number;

pub const DEFAULT_SERIES: &str = "trusty";

/// Environment configuration relevant to artifact resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EnvironConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub provider_type: String,
    #[serde(default = "default_series")]
    pub default_series: String,
    #[serde(default)]
    pub development: bool,
    #[serde(default = "default_stream")]
    pub image_stream: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_version: Option<Number>,
    /// Base URL of the public image catalog for this run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_metadata_url: Option<Url>,
    /// Base URL of the public tools catalog for this run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools_metadata_url: Option<Url>,
}

fn default_series() -> String {
    DEFAULT_SERIES.to_string()
}

fn default_stream() -> String {
    DEFAULT_STREAM.to_string()
}

impl EnvironConfig {
    #[must_use]
    pub fn new(name: impl Into<String>, provider_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider_type: provider_type.into(),
            default_series: default_series(),
            development: false,
            image_stream: default_stream(),
            agent_version: None,
            image_metadata_url: None,
            tools_metadata_url: None,
        }
    }
}
