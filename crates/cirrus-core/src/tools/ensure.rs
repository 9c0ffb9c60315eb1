use std::{fs, io};

use cirrus_domain::api::{storage_name, BuiltArtifact, ToolBinary};

use crate::effects::Effects;
use crate::errors::ToolsError;
use crate::tools::resolve::{resolve_tools, ToolsRequest};

/// Resolves the tools a bootstrap needs and uploads anything built along the way.
/// Build directories are removed once their upload has been attempted. The result is
/// ordered by architecture.
pub fn ensure_tools_availability(
    effects: &dyn Effects,
    series: &str,
    arch: Option<&str>,
) -> Result<Vec<ToolBinary>, ToolsError> {
    let request = ToolsRequest::new(series, arch.map(str::to_string));
    let selection = resolve_tools(effects, &request)?;
    let uploads: Vec<_> = selection
        .built
        .iter()
        .map(|built| {
            let uploaded = effects.storage().upload(built, &built.version);
            remove_build_dir(built);
            uploaded.map_err(|err| ToolsError::Upload {
                storage_name: storage_name(&built.version),
                reason: format!("{err:#}"),
            })
        })
        .collect();

    let mut binaries = selection.binaries;
    for uploaded in uploads {
        let uploaded = uploaded?;
        tracing::info!(
            version = %uploaded.binary(),
            location = %uploaded.storage_location,
            "uploaded tools"
        );
        binaries.push(uploaded);
    }
    binaries.sort_by(|left, right| left.arch.cmp(&right.arch));
    Ok(binaries)
}

fn remove_build_dir(built: &BuiltArtifact) {
    match fs::remove_dir_all(&built.dir) {
        Ok(()) => tracing::debug!(dir = %built.dir.display(), "removed tools build directory"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => tracing::warn!(
            dir = %built.dir.display(),
            error = %err,
            "failed to remove tools build directory"
        ),
    }
}
