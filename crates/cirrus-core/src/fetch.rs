use cirrus_domain::api::{CatalogRecord, DataSource, LookupConstraint, PublishedImage, ToolBinary};
use cirrus_domain::series;

use crate::effects::Transport;
use crate::errors::CatalogError;

fn unavailable(source: &DataSource, err: &anyhow::Error) -> CatalogError {
    CatalogError::SourceUnavailable {
        source_id: source.id.clone(),
        description: source.label().to_string(),
        reason: format!("{err:#}"),
    }
}

/// Image records visible from `source` under `constraint`.
///
/// Placement is matched on the published image because the endpoint is not carried
/// into the catalog record. The returned records carry no source tag; the aggregator
/// stamps it.
pub fn fetch_images(
    transport: &dyn Transport,
    source: &DataSource,
    constraint: &LookupConstraint,
) -> Result<Vec<CatalogRecord>, CatalogError> {
    let published = transport
        .images(source, constraint)
        .map_err(|err| unavailable(source, &err))?;
    let total = published.len();
    let records: Vec<CatalogRecord> = published
        .iter()
        .filter(|image| constraint.matches_placement(&image.region, &image.endpoint))
        .filter_map(|image| to_record(source, image))
        .filter(|record| {
            constraint.matches_series(&record.series)
                && constraint.matches_arch(&record.arch)
                && constraint.matches_stream(&record.stream)
        })
        .collect();
    tracing::debug!(
        source = %source.id,
        published = total,
        retained = records.len(),
        "fetched published images"
    );
    Ok(records)
}

fn to_record(source: &DataSource, image: &PublishedImage) -> Option<CatalogRecord> {
    let Some(series) = image_series(image) else {
        tracing::warn!(
            source = %source.id,
            image = %image.id,
            version = %image.version,
            "skipping published image with unknown series"
        );
        return None;
    };
    Some(CatalogRecord {
        source: String::new(),
        stream: image.effective_stream().to_string(),
        region: image.region.clone(),
        series: series.to_string(),
        arch: image.arch.clone(),
        virt_type: image.virt_type.clone(),
        root_storage_type: image.root_store.clone(),
        root_storage_size: image.root_size,
        artifact_id: image.id.clone(),
    })
}

fn image_series(image: &PublishedImage) -> Option<&str> {
    if let Some(series) = series::version_series(&image.version) {
        return Some(series);
    }
    image
        .release
        .as_deref()
        .filter(|release| series::series_version(release).is_some())
}

/// Tool binaries visible from `source`, narrowed to the constraint's series and arches.
pub fn fetch_tools(
    transport: &dyn Transport,
    source: &DataSource,
    constraint: &LookupConstraint,
) -> Result<Vec<ToolBinary>, CatalogError> {
    let published = transport
        .tools(source, constraint)
        .map_err(|err| unavailable(source, &err))?;
    let total = published.len();
    let binaries: Vec<ToolBinary> = published
        .into_iter()
        .filter(|tools| constraint.matches_series(&tools.series))
        .filter(|tools| constraint.matches_arch(&tools.arch))
        .collect();
    tracing::debug!(
        source = %source.id,
        published = total,
        retained = binaries.len(),
        "fetched published tools"
    );
    Ok(binaries)
}
