//! Data model shared by the cirrus catalog crates.

pub mod arch;
pub mod cloud;
pub mod environ;
pub mod record;
pub mod series;
pub mod source;
pub mod tools;
pub mod version;

pub mod api {
    pub use crate::cloud::{CloudSpec, LookupConstraint, Scope};
    pub use crate::environ::EnvironConfig;
    pub use crate::record::{
        CatalogRecord, IdentityKey, MetadataFilter, PublishedImage, CUSTOM_SOURCE,
        DEFAULT_STREAM,
    };
    pub use crate::source::{sort_by_priority, DataSource, SourceKind};
    pub use crate::tools::{storage_name, BuiltArtifact, ToolBinary, VersionConstraint};
    pub use crate::version::{Binary, Number, VersionError};
}

pub use api::*;
