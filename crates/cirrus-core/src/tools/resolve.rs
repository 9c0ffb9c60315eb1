use cirrus_domain::api::{BuiltArtifact, LookupConstraint, ToolBinary};

use crate::aggregate::aggregate_tools;
use crate::effects::Effects;
use crate::errors::ToolsError;
use crate::tools::build::build_on_demand;
use crate::tools::select::{select_tools, SelectionPolicy};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolsRequest {
    pub series: String,
    pub arch: Option<String>,
}

impl ToolsRequest {
    #[must_use]
    pub fn new(series: impl Into<String>, arch: Option<String>) -> Self {
        Self {
            series: series.into(),
            arch,
        }
    }
}

/// Published binaries chosen for the bootstrap, plus anything built because an
/// architecture had nothing published.
#[derive(Clone, Debug, Default)]
pub struct ToolsSelection {
    pub binaries: Vec<ToolBinary>,
    pub built: Vec<BuiltArtifact>,
}

/// Picks the agent tools a bootstrap of `request.series` should use.
///
/// An explicit architecture must be supported by the environment; this is checked
/// before any source is consulted. Building is only attempted by dev CLIs when no
/// agent version is pinned, and only for the host's own architecture.
pub fn resolve_tools(
    effects: &dyn Effects,
    request: &ToolsRequest,
) -> Result<ToolsSelection, ToolsError> {
    let provider = effects.provider();
    let config = provider.config();
    let supported = provider
        .supported_architectures()
        .map_err(|err| ToolsError::environment("getting supported architectures", &err))?;
    let unsupported = |arch: &str| ToolsError::ArchitectureUnsupported {
        environment: config.name.clone(),
        provider_type: config.provider_type.clone(),
        arch: arch.to_string(),
    };
    if let Some(arch) = &request.arch {
        if !supported.contains(arch) {
            return Err(unsupported(arch));
        }
    }

    let cli = effects.host().cli_version();
    let policy = SelectionPolicy::for_cli(
        &cli.number,
        config.development,
        config.agent_version,
        &request.series,
        request.arch.clone(),
    );
    let sources = provider
        .tools_data_sources()
        .map_err(|err| ToolsError::environment("getting tools data sources", &err))?;
    let mut constraint = LookupConstraint::default().with_series(request.series.clone());
    if let Some(arch) = &request.arch {
        constraint = constraint.with_arch(arch.clone());
    }
    let available = aggregate_tools(effects.transport(), &sources, &constraint).records;
    let binaries = select_tools(&available, &policy);
    tracing::debug!(
        series = %request.series,
        available = available.len(),
        selected = binaries.len(),
        newest_wins = policy.newest_wins,
        "tools resolved"
    );

    let missing = match &request.arch {
        Some(arch) if !binaries.iter().any(|tools| &tools.arch == arch) => Some(arch.clone()),
        Some(_) => None,
        None if binaries.is_empty() => Some(
            effects
                .host()
                .host_arch()
                .map_err(|err| ToolsError::environment("detecting host architecture", &err))?,
        ),
        None => None,
    };
    let Some(target) = missing else {
        return Ok(ToolsSelection {
            binaries,
            built: Vec::new(),
        });
    };

    let build_permitted = cli.number.is_dev() && config.agent_version.is_none();
    if !build_permitted {
        return Err(ToolsError::NoMatchingTools {
            series: request.series.clone(),
            arch: request.arch.clone(),
            version: config.agent_version.unwrap_or(cli.number),
        });
    }
    if !supported.contains(&target) {
        return Err(unsupported(&target));
    }
    let host = effects
        .host()
        .host_arch()
        .map_err(|err| ToolsError::environment("detecting host architecture", &err))?;
    if host != target {
        return Err(ToolsError::HostArchitectureIncompatible { target, host });
    }
    let built = build_on_demand(effects.builder(), &cli, &request.series, &target)?;
    Ok(ToolsSelection {
        binaries,
        built: vec![built],
    })
}
