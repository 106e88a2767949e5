use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use ionic_trends::config::DashboardConfig;
use ionic_trends::data::export::{export_csv, export_file_name};
use ionic_trends::data::loader::DatasetCache;
use ionic_trends::data::model::{Dataset, FilterCriteria, YearRange};
use ionic_trends::data::pipeline::{self, PipelineView};
use ionic_trends::data::reshape::reshape;
use ionic_trends::data::scale::ScaleMode;

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (shared with the cache).
    pub dataset: Option<Arc<Dataset>>,

    /// Where `dataset` came from.
    pub data_path: Option<PathBuf>,

    /// Current selection. Replaced, never edited, on every change.
    pub criteria: FilterCriteria,

    pub scale: ScaleMode,

    /// Pipeline output for `criteria` and `scale` (cached).
    pub view: PipelineView,

    /// Topic colours.
    pub colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    cache: DatasetCache,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            criteria: config.initial_criteria(),
            scale: config.scale,
            colors: ColorMap::from_config(&config),
            config,
            dataset: None,
            data_path: None,
            view: PipelineView::default(),
            status_message: None,
            cache: DatasetCache::new(),
        }
    }

    /// Load (or reuse) the dataset at `path` and make it current.
    ///
    /// The whole table is reshaped once so a duplicate key is reported on
    /// open rather than only when a selection happens to include it.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let dataset = self
            .cache
            .get_or_load(path)
            .with_context(|| format!("loading {}", path.display()))?;
        if let Err(err) = reshape(&dataset.records) {
            self.cache.evict(path);
            return Err(err).with_context(|| format!("checking {}", path.display()));
        }

        self.data_path = Some(path.to_path_buf());
        self.set_dataset(dataset);
        Ok(())
    }

    /// Ingest a dataset, fit the year range to it and recompute.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        let bounds = dataset.year_bounds();
        let year_range = self.criteria.year_range.intersect(bounds).unwrap_or(bounds);
        self.criteria = self.criteria.with_year_range(year_range);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.recompute();
    }

    /// Replace the selection; recomputes only if it changed.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        if criteria != self.criteria {
            self.criteria = criteria;
            self.recompute();
        }
    }

    pub fn set_scale(&mut self, scale: ScaleMode) {
        if scale != self.scale {
            self.scale = scale;
            self.recompute();
        }
    }

    /// Year span the period sliders may cover.
    pub fn year_bounds(&self) -> YearRange {
        self.dataset
            .as_ref()
            .map(|ds| ds.year_bounds())
            .unwrap_or(YearRange::FULL)
    }

    /// Re-run the pipeline for the current selection.
    pub fn recompute(&mut self) {
        let Some(dataset) = &self.dataset else {
            self.view = PipelineView::default();
            return;
        };
        match pipeline::run(dataset, &self.criteria, self.scale) {
            Ok(view) => self.view = view,
            Err(e) => {
                log::error!("Failed to build series: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.view = PipelineView::default();
            }
        }
    }

    /// Message to show instead of the chart, if any.
    pub fn empty_hint(&self) -> Option<&'static str> {
        if self.criteria.topics.is_empty() {
            Some("Please select at least one research topic from the controls panel.")
        } else if self.criteria.strategies.is_empty() {
            Some("Please select at least one search strategy from the controls panel.")
        } else if self.view.is_empty() {
            Some("No data available for this selection. Try adjusting the filters.")
        } else {
            None
        }
    }

    /// CSV bytes of the visible records.
    pub fn export_bytes(&self) -> Result<Vec<u8>> {
        let dataset = self.dataset.as_ref().context("no dataset loaded")?;
        export_csv(&self.view.records, &dataset.topic_names).context("serializing CSV")
    }

    pub fn export_file_name(&self) -> String {
        export_file_name(self.criteria.year_range)
    }

    pub fn export_to(&self, path: &Path) -> Result<()> {
        let bytes = self.export_bytes()?;
        std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
        log::info!(
            "Exported {} records to {}",
            self.view.records.len(),
            path.display()
        );
        Ok(())
    }
}
