use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use cirrus_domain::api::{CatalogRecord, MetadataFilter};
use serde_json::{json, Value};

use crate::context::CommandContext;
use crate::diagnostics::commands as diag;
use crate::errors::{CatalogError, ToolsError};
use crate::outcome::ExecutionOutcome;
use crate::reconcile::{RecordSummary, Reconciliation};
use crate::refresh::{list, refresh_published_metadata, save_metadata, search_published_images};
use crate::tools::ensure_tools_availability;

#[derive(Clone, Debug, Default)]
pub struct MetadataListRequest {
    pub filter: MetadataFilter,
}

#[derive(Clone, Debug)]
pub struct MetadataSaveRequest {
    pub path: PathBuf,
}

#[derive(Clone, Debug, Default)]
pub struct ToolsEnsureRequest {
    pub series: Option<String>,
    pub arch: Option<String>,
}

fn catalog_outcome(err: &CatalogError) -> ExecutionOutcome {
    let mut details = json!({ "code": err.code(), "reason": "catalog" });
    match err {
        CatalogError::ScopeUndeterminable { .. } => {
            details["hint"] = json!(
                "Declare a region in the environment manifest, or run `cirrus metadata search` for an unscoped view."
            );
            ExecutionOutcome::user_error(err.to_string(), details)
        }
        CatalogError::PartialReconcile { messages } => {
            details["failures"] = json!(messages);
            ExecutionOutcome::failure(err.to_string(), details)
        }
        _ => ExecutionOutcome::failure(err.to_string(), details),
    }
}

fn tools_outcome(err: &ToolsError) -> ExecutionOutcome {
    let mut details = json!({ "code": err.code(), "reason": "tools" });
    let hint = match err {
        ToolsError::NoMatchingTools { .. } => Some(
            "Publish matching tools to a tools source, or bootstrap with a development CLI so tools can be built.",
        ),
        ToolsError::ArchitectureUnsupported { .. } => {
            Some("Pick an architecture listed in the manifest's supported-architectures.")
        }
        ToolsError::HostArchitectureIncompatible { .. } => {
            Some("Publish tools for the target architecture, or bootstrap from a machine of that architecture.")
        }
        ToolsError::Build { .. } | ToolsError::Environment { .. } | ToolsError::Upload { .. } => {
            None
        }
    };
    match hint {
        Some(hint) => {
            details["hint"] = json!(hint);
            ExecutionOutcome::user_error(err.to_string(), details)
        }
        None => ExecutionOutcome::failure(err.to_string(), details),
    }
}

fn record_summaries(reconciliation: &Reconciliation) -> Vec<RecordSummary> {
    reconciliation.results.iter().map(RecordSummary::from).collect()
}

/// Refreshes the catalog from the environment's image sources.
///
/// # Errors
/// Returns an error only if the outcome cannot be serialized.
pub fn metadata_refresh(ctx: &CommandContext) -> Result<ExecutionOutcome> {
    let summary = match refresh_published_metadata(ctx.effects()) {
        Ok(summary) => summary,
        Err(err) => return Ok(catalog_outcome(&err)),
    };
    let unavailable: Vec<String> = summary.unavailable.iter().map(ToString::to_string).collect();
    let saved = summary.reconciliation.saved();
    Ok(ExecutionOutcome::success(
        format!(
            "saved {saved} image record(s) from {} source(s)",
            summary.sources - unavailable.len()
        ),
        json!({
            "code": diag::METADATA_REFRESH,
            "sources": summary.sources,
            "unavailable": unavailable,
            "saved": saved,
            "records": serde_json::to_value(record_summaries(&summary.reconciliation))?,
        }),
    ))
}

/// Lists stored image records grouped by source.
///
/// # Errors
/// Returns an error only if the outcome cannot be serialized.
pub fn metadata_list(
    ctx: &CommandContext,
    request: &MetadataListRequest,
) -> Result<ExecutionOutcome> {
    let grouped = match list(ctx.effects(), &request.filter) {
        Ok(grouped) => grouped,
        Err(err) => return Ok(catalog_outcome(&err)),
    };
    let total: usize = grouped.values().map(Vec::len).sum();
    let groups: Vec<Value> = grouped
        .iter()
        .map(|(source, records)| json!({ "source": source, "records": records }))
        .collect();
    Ok(ExecutionOutcome::success(
        format!("{total} image record(s) in {} source(s)", groups.len()),
        json!({
            "code": diag::METADATA_LIST,
            "catalog": ctx.settings().catalog.path.display().to_string(),
            "groups": groups,
        }),
    ))
}

/// Shows what a refresh would fetch, without saving.
///
/// # Errors
/// Returns an error only if the outcome cannot be serialized.
pub fn metadata_search(
    ctx: &CommandContext,
    request: &MetadataListRequest,
) -> Result<ExecutionOutcome> {
    let found = match search_published_images(ctx.effects(), &request.filter) {
        Ok(found) => found,
        Err(err) => return Ok(catalog_outcome(&err)),
    };
    let unavailable: Vec<String> = found.errors.iter().map(ToString::to_string).collect();
    Ok(ExecutionOutcome::success(
        format!("{} published image record(s)", found.records.len()),
        json!({
            "code": diag::METADATA_SEARCH,
            "records": found.records,
            "unavailable": unavailable,
        }),
    ))
}

/// Saves operator-supplied image records from a JSON file.
///
/// # Errors
/// Returns an error only if the outcome cannot be serialized.
pub fn metadata_save(
    ctx: &CommandContext,
    request: &MetadataSaveRequest,
) -> Result<ExecutionOutcome> {
    let records: Vec<CatalogRecord> = match fs::read_to_string(&request.path)
        .map_err(anyhow::Error::from)
        .and_then(|contents| serde_json::from_str(&contents).map_err(anyhow::Error::from))
    {
        Ok(records) => records,
        Err(err) => {
            return Ok(ExecutionOutcome::user_error(
                format!("cannot read records from {}", request.path.display()),
                json!({
                    "code": diag::METADATA_SAVE,
                    "reason": "invalid_records",
                    "error": format!("{err:#}"),
                    "hint": "Provide a JSON array of image records with series, arch and artifact_id.",
                }),
            ));
        }
    };
    let reconciliation = save_metadata(ctx.effects(), records);
    let records = serde_json::to_value(record_summaries(&reconciliation))?;
    if let Some(err) = &reconciliation.error {
        let mut outcome = catalog_outcome(err);
        outcome.details["records"] = records;
        return Ok(outcome);
    }
    Ok(ExecutionOutcome::success(
        format!("saved {} image record(s)", reconciliation.saved()),
        json!({
            "code": diag::METADATA_SAVE,
            "saved": reconciliation.saved(),
            "records": records,
        }),
    ))
}

/// Makes sure agent tools exist for the requested series and architecture.
///
/// # Errors
/// Returns an error only if the outcome cannot be serialized.
pub fn tools_ensure(ctx: &CommandContext, request: &ToolsEnsureRequest) -> Result<ExecutionOutcome> {
    let series = request
        .series
        .clone()
        .unwrap_or_else(|| ctx.effects().provider().config().default_series.clone());
    let binaries =
        match ensure_tools_availability(ctx.effects(), &series, request.arch.as_deref()) {
            Ok(binaries) => binaries,
            Err(err) => return Ok(tools_outcome(&err)),
        };
    let versions: Vec<String> = binaries
        .iter()
        .map(|tools| tools.binary().to_string())
        .collect();
    Ok(ExecutionOutcome::success(
        format!("tools available: {}", versions.join(", ")),
        json!({
            "code": diag::TOOLS_ENSURE,
            "series": series,
            "tools": serde_json::to_value(&binaries)?,
        }),
    ))
}
