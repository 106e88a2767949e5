use super::error::DuplicateKeyError;
use super::filter::filter;
use super::model::{Dataset, FilterCriteria, PublicationRecord, SeriesTable};
use super::reshape::reshape;
use super::scale::{transform, ScaleMode};

/// Everything one interaction needs to render and export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineView {
    /// Records passing the filter, in source order.
    pub records: Vec<PublicationRecord>,
    /// Raw counts per series.
    pub counts: SeriesTable,
    /// `counts` under the selected scale.
    pub display: SeriesTable,
}

impl PipelineView {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Recompute the view for one selection: filter → reshape → transform.
pub fn run(
    dataset: &Dataset,
    criteria: &FilterCriteria,
    scale: ScaleMode,
) -> Result<PipelineView, DuplicateKeyError> {
    let records = filter(&dataset.records, criteria);
    let counts = reshape(&records)?;
    let display = transform(&counts, scale);

    log::debug!(
        "Pipeline: {} of {} records, {} series, {} points ({scale})",
        records.len(),
        dataset.len(),
        counts.len(),
        display.point_count()
    );

    Ok(PipelineView {
        records,
        counts,
        display,
    })
}
