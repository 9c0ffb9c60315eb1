use cirrus_domain::api::{Binary, BuiltArtifact};

use crate::effects::BuildTool;
use crate::errors::ToolsError;

/// Builds tools one build number past the CLI version and labels them for the target
/// series and architecture. Uploading is left to the caller.
pub fn build_on_demand(
    builder: &dyn BuildTool,
    cli: &Binary,
    series: &str,
    arch: &str,
) -> Result<BuiltArtifact, ToolsError> {
    let version = cli.number.next_build().map_err(|err| ToolsError::Build {
        version: cli.number,
        source: err.into(),
    })?;
    tracing::info!(%version, series, arch, "building tools on demand");
    let mut built = builder
        .build_tarball(Some(&version))
        .map_err(|err| ToolsError::Build {
            version,
            source: err.into(),
        })?;
    built.version = Binary {
        number: version,
        series: series.to_string(),
        arch: arch.to_string(),
    };
    tracing::debug!(
        storage_name = %built.storage_name,
        size = built.size,
        sha256 = %built.sha256,
        "tools built"
    );
    Ok(built)
}
