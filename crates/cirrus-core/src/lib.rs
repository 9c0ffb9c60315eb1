//! Resolution of published cloud artifacts: image metadata refresh and reconciliation,
//! and agent tools selection with build on demand.

mod aggregate;
mod commands;
mod config;
mod context;
pub mod diagnostics;
mod effects;
mod errors;
mod fetch;
mod outcome;
mod reconcile;
mod refresh;
mod scope;
mod system;
#[cfg(test)]
mod testing;
pub mod tools;

pub use crate::aggregate::{aggregate, aggregate_images, aggregate_tools, Aggregated};
pub use crate::commands::{
    metadata_list, metadata_refresh, metadata_save, metadata_search, tools_ensure,
    MetadataListRequest, MetadataSaveRequest, ToolsEnsureRequest,
};
pub use crate::config::{EnvSnapshot, GlobalOptions, Settings, CIRRUS_VERSION};
pub use crate::context::CommandContext;
pub use crate::effects::{
    BuildTool, CatalogStore, Effects, HasRegion, Host, Provider, SharedEffects, SystemEffects,
    ToolsStorage, Transport,
};
pub use crate::errors::{CatalogError, ToolsError};
pub use crate::fetch::{fetch_images, fetch_tools};
pub use crate::outcome::{
    format_status_message, to_json_response, CommandGroup, CommandInfo, CommandStatus,
    ExecutionOutcome,
};
pub use crate::reconcile::{
    list_metadata, listing_order, reconcile, RecordResult, RecordSummary, Reconciliation,
};
pub use crate::refresh::{
    list, refresh_published_metadata, save_metadata, search_published_images, RefreshSummary,
};
pub use crate::scope::{resolve_scope, ScopeRequirement};
pub use crate::system::{
    ArchiveToolsStorage, FileCatalogStore, LocalTransport, ManifestProvider, SystemHost,
    TarballBuilder,
};
pub use crate::tools::ensure_tools_availability;
