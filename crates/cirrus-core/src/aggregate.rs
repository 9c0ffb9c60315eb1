use cirrus_domain::api::{CatalogRecord, DataSource, LookupConstraint, ToolBinary};

use crate::effects::Transport;
use crate::errors::CatalogError;
use crate::fetch::{fetch_images, fetch_tools};

/// Union of the records every reachable source returned, in source order, plus one
/// error per source that failed.
#[derive(Debug)]
pub struct Aggregated<T> {
    pub records: Vec<T>,
    pub errors: Vec<CatalogError>,
}

impl<T> Default for Aggregated<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Folds `fetch` over `sources`, strictly in order. A failing source is logged and
/// skipped; it never stops the sources after it.
pub fn aggregate<T, F>(sources: &[DataSource], mut fetch: F) -> Aggregated<T>
where
    F: FnMut(&DataSource) -> Result<Vec<T>, CatalogError>,
{
    sources
        .iter()
        .fold(Aggregated::default(), |mut acc, source| {
            match fetch(source) {
                Ok(records) => {
                    tracing::debug!(source = %source.id, count = records.len(), "source aggregated");
                    acc.records.extend(records);
                }
                Err(err) => {
                    tracing::warn!(source = %source.id, error = %err, "skipping data source");
                    acc.errors.push(err);
                }
            }
            acc
        })
}

/// Image records from every source, each tagged with the id of the source it came from.
pub fn aggregate_images(
    transport: &dyn Transport,
    sources: &[DataSource],
    constraint: &LookupConstraint,
) -> Aggregated<CatalogRecord> {
    aggregate(sources, |source| {
        let records = fetch_images(transport, source, constraint)?;
        Ok(records
            .into_iter()
            .map(|mut record| {
                record.source.clone_from(&source.id);
                record
            })
            .collect())
    })
}

pub fn aggregate_tools(
    transport: &dyn Transport,
    sources: &[DataSource],
    constraint: &LookupConstraint,
) -> Aggregated<ToolBinary> {
    aggregate(sources, |source| fetch_tools(transport, source, constraint))
}
