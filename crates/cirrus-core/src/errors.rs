use cirrus_domain::api::Number;

use crate::diagnostics;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures of the image metadata path.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error(
        "[CR300] environment cloud specification cannot be determined (environment {environment:?})"
    )]
    ScopeUndeterminable { environment: String },
    #[error("[CR301] getting provider region information (cloud spec): {reason}")]
    RegionLookup { reason: String },
    #[error("[CR302] data source {description:?} unavailable: {reason}")]
    SourceUnavailable {
        source_id: String,
        description: String,
        reason: String,
    },
    #[error("[CR303] getting environment image metadata sources: {reason}")]
    Sources { reason: String },
    #[error("[CR310] saving catalog record {key}: {reason}")]
    RecordPersistFailure { key: String, reason: String },
    #[error("[CR311] saving some catalog metadata:\n{}", .messages.join("\n"))]
    PartialReconcile { messages: Vec<String> },
    #[error("[CR320] reading catalog metadata: {reason}")]
    StoreRead { reason: String },
}

impl CatalogError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ScopeUndeterminable { .. } => diagnostics::catalog::SCOPE_UNDETERMINABLE,
            Self::RegionLookup { .. } => diagnostics::catalog::REGION_LOOKUP,
            Self::SourceUnavailable { .. } => diagnostics::catalog::SOURCE_UNAVAILABLE,
            Self::Sources { .. } => diagnostics::catalog::SOURCES_UNAVAILABLE,
            Self::RecordPersistFailure { .. } => diagnostics::catalog::RECORD_PERSIST,
            Self::PartialReconcile { .. } => diagnostics::catalog::PARTIAL_RECONCILE,
            Self::StoreRead { .. } => diagnostics::catalog::STORE_READ,
        }
    }

    /// Whether the failing flow can continue past this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable { .. } | Self::RecordPersistFailure { .. }
        )
    }
}

/// Failures of the agent tools path. All of them are fatal to the bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum ToolsError {
    #[error(
        "[CR400] cannot bootstrap because no tools are available for your environment \
         (series {series:?}, arch {}, version {version})",
        .arch.as_deref().unwrap_or("any")
    )]
    NoMatchingTools {
        series: String,
        arch: Option<String>,
        version: Number,
    },
    #[error(
        "[CR401] environment {environment:?} of type {provider_type} does not support instances running on {arch:?}"
    )]
    ArchitectureUnsupported {
        environment: String,
        provider_type: String,
        arch: String,
    },
    #[error("[CR402] cannot build tools for {target:?} using a machine running on {host:?}")]
    HostArchitectureIncompatible { target: String, host: String },
    #[error("[CR403] building tools {version}: {source}")]
    Build {
        version: Number,
        #[source]
        source: BoxError,
    },
    #[error("[CR404] {context}: {reason}")]
    Environment { context: &'static str, reason: String },
    #[error("[CR405] uploading tools {storage_name}: {reason}")]
    Upload { storage_name: String, reason: String },
}

impl ToolsError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoMatchingTools { .. } => diagnostics::tools::NO_MATCHING_TOOLS,
            Self::ArchitectureUnsupported { .. } => diagnostics::tools::ARCH_UNSUPPORTED,
            Self::HostArchitectureIncompatible { .. } => {
                diagnostics::tools::HOST_ARCH_INCOMPATIBLE
            }
            Self::Build { .. } => diagnostics::tools::BUILD_FAILED,
            Self::Environment { .. } => diagnostics::tools::ENVIRONMENT,
            Self::Upload { .. } => diagnostics::tools::UPLOAD_FAILED,
        }
    }

    pub(crate) fn environment(context: &'static str, err: &anyhow::Error) -> Self {
        Self::Environment {
            context,
            reason: format!("{err:#}"),
        }
    }
}
