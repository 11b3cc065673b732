use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::{Config, ControlsConfig};
use crate::data::filter::{compute, FilterCriteria, FilteredDataset};
use crate::data::model::{Dataset, NumericAttribute, Species};
use crate::reactive::{Memo, Revision};
use crate::sinks::histogram::{HistogramArtifact, HistogramSink};
use crate::sinks::scatter::{ScatterArtifact, ScatterSink};
use crate::sinks::table::{TableArtifact, TableSink, TableSource};
use crate::sinks::{Dependencies, Field, Sink, SinkCell, SinkKey, SinkOutput};

// ---------------------------------------------------------------------------
// Filter state
// ---------------------------------------------------------------------------

/// Current criteria plus a revision per input, bumped on every change.
#[derive(Debug, Clone)]
pub struct FilterState {
    criteria: FilterCriteria,
    controls: ControlsConfig,
    /// Species or island changed.
    rows_revision: Revision,
    attribute_revision: Revision,
    bin_count_revision: Revision,
}

impl FilterState {
    pub fn new(criteria: FilterCriteria, controls: ControlsConfig) -> Self {
        let mut criteria = criteria;
        criteria.bin_count = controls.clamp_bin_count(criteria.bin_count);
        Self {
            criteria,
            controls,
            rows_revision: 0,
            attribute_revision: 0,
            bin_count_revision: 0,
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn controls(&self) -> &ControlsConfig {
        &self.controls
    }

    pub fn rows_revision(&self) -> Revision {
        self.rows_revision
    }

    /// Returns the changed field, `None` when the value was already set.
    pub fn set_species(&mut self, species: BTreeSet<Species>) -> Option<Field> {
        if self.criteria.selected_species == species {
            return None;
        }
        self.criteria.selected_species = species;
        self.rows_revision += 1;
        Some(Field::Species)
    }

    pub fn set_island(&mut self, island: &str) -> Option<Field> {
        if self.criteria.selected_island == island {
            return None;
        }
        self.criteria.selected_island = island.to_string();
        self.rows_revision += 1;
        Some(Field::Island)
    }

    pub fn set_attribute(&mut self, attribute: NumericAttribute) -> Option<Field> {
        if self.criteria.selected_attribute == attribute {
            return None;
        }
        self.criteria.selected_attribute = attribute;
        self.attribute_revision += 1;
        Some(Field::Attribute)
    }

    /// Clamped into the configured slider range.
    pub fn set_bin_count(&mut self, n: usize) -> Option<Field> {
        let n = self.controls.clamp_bin_count(n);
        if self.criteria.bin_count == n {
            return None;
        }
        self.criteria.bin_count = n;
        self.bin_count_revision += 1;
        Some(Field::BinCount)
    }

    /// Cache key covering exactly the fields in `deps`.
    pub fn key_for(&self, deps: Dependencies) -> SinkKey {
        SinkKey {
            rows: deps.rows.then_some(self.rows_revision),
            attribute: deps.attribute.then_some(self.attribute_revision),
            bin_count: deps.bin_count.then_some(self.bin_count_revision),
        }
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Memoized [`compute`] result, keyed on the species/island revision.
#[derive(Debug, Default)]
pub struct FilteredView {
    memo: Memo<Revision, Arc<FilteredDataset>>,
}

impl FilteredView {
    pub fn get(&mut self, dataset: &Arc<Dataset>, filters: &FilterState) -> Arc<FilteredDataset> {
        self.memo.get_or_compute(filters.rows_revision(), || {
            let view = compute(dataset, filters.criteria());
            log::debug!(
                "Recomputed filtered view: {} of {} rows",
                view.len(),
                dataset.len()
            );
            Arc::new(view)
        })
    }

    pub fn invalidate(&mut self) {
        self.memo.invalidate();
    }

    pub fn recomputations(&self) -> u64 {
        self.memo.computations()
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One user's independent filters, view and sink caches over the shared
/// dataset.
pub struct Session {
    dataset: Arc<Dataset>,
    filters: FilterState,
    view: FilteredView,
    pub table_a: SinkCell<TableSink>,
    pub table_b: SinkCell<TableSink>,
    pub primary_histogram: SinkCell<HistogramSink>,
    pub secondary_histogram: SinkCell<HistogramSink>,
    pub scatter: SinkCell<ScatterSink>,
}

impl Session {
    pub fn new(dataset: Arc<Dataset>, config: &Config) -> Self {
        let criteria = FilterCriteria::defaults_for(&dataset, config.controls.bin_count_default);
        Self {
            filters: FilterState::new(criteria, config.controls),
            view: FilteredView::default(),
            table_a: SinkCell::new(TableSink::new("Filtered data", TableSource::Filtered)),
            table_b: SinkCell::new(TableSink::new("Penguins grid", config.tables.grid_source)),
            primary_histogram: SinkCell::new(HistogramSink::fixed(config.charts.primary_bins)),
            secondary_histogram: SinkCell::new(HistogramSink::adjustable(
                config.charts.kde_points,
            )),
            scatter: SinkCell::new(ScatterSink::new(config.charts.scatter_size_max)),
            dataset,
        }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn criteria(&self) -> &FilterCriteria {
        self.filters.criteria()
    }

    pub fn controls(&self) -> &ControlsConfig {
        self.filters.controls()
    }

    // -- criteria updates, one per control --

    pub fn set_species(&mut self, species: BTreeSet<Species>) {
        let changed = self.filters.set_species(species);
        self.invalidate(changed);
    }

    /// Toggle a single species in the checkbox group.
    pub fn toggle_species(&mut self, species: Species) {
        let mut selected = self.criteria().selected_species.clone();
        if !selected.remove(&species) {
            selected.insert(species);
        }
        self.set_species(selected);
    }

    pub fn set_island(&mut self, island: &str) {
        let changed = self.filters.set_island(island);
        self.invalidate(changed);
    }

    pub fn set_attribute(&mut self, attribute: NumericAttribute) {
        let changed = self.filters.set_attribute(attribute);
        self.invalidate(changed);
    }

    pub fn set_bin_count(&mut self, n: usize) {
        let changed = self.filters.set_bin_count(n);
        self.invalidate(changed);
    }

    /// Mark every dependent of `field` stale.
    fn invalidate(&mut self, field: Option<Field>) {
        let Some(field) = field else {
            return;
        };
        log::debug!("Criteria changed: {field:?}");
        if matches!(field, Field::Species | Field::Island) {
            self.view.invalidate();
        }
        invalidate_if_reads(&mut self.table_a, field);
        invalidate_if_reads(&mut self.table_b, field);
        invalidate_if_reads(&mut self.primary_histogram, field);
        invalidate_if_reads(&mut self.secondary_histogram, field);
        invalidate_if_reads(&mut self.scatter, field);
    }

    // -- reads --

    /// The filtered view for the current criteria, computed at most once
    /// per species/island change.
    pub fn filtered_view(&mut self) -> Arc<FilteredDataset> {
        self.view.get(&self.dataset, &self.filters)
    }

    /// How many times the filtered view has been computed.
    pub fn view_recomputations(&self) -> u64 {
        self.view.recomputations()
    }

    pub fn table_a(&mut self) -> SinkOutput<TableArtifact> {
        observe(&mut self.table_a, &mut self.view, &self.dataset, &self.filters)
    }

    pub fn table_b(&mut self) -> SinkOutput<TableArtifact> {
        observe(&mut self.table_b, &mut self.view, &self.dataset, &self.filters)
    }

    pub fn primary_histogram(&mut self) -> SinkOutput<HistogramArtifact> {
        observe(
            &mut self.primary_histogram,
            &mut self.view,
            &self.dataset,
            &self.filters,
        )
    }

    pub fn secondary_histogram(&mut self) -> SinkOutput<HistogramArtifact> {
        observe(
            &mut self.secondary_histogram,
            &mut self.view,
            &self.dataset,
            &self.filters,
        )
    }

    pub fn scatter(&mut self) -> SinkOutput<ScatterArtifact> {
        observe(&mut self.scatter, &mut self.view, &self.dataset, &self.filters)
    }
}

fn invalidate_if_reads<S: Sink>(cell: &mut SinkCell<S>, field: Field) {
    if cell.sink.dependencies().reads(field) {
        cell.invalidate();
    }
}

/// Pull a sink's artifact, fetching the filtered view only if the sink is
/// stale and reads it. Sinks independent of the filters see every row.
fn observe<S: Sink>(
    cell: &mut SinkCell<S>,
    view: &mut FilteredView,
    dataset: &Arc<Dataset>,
    filters: &FilterState,
) -> SinkOutput<S::Artifact> {
    let deps = cell.sink.dependencies();
    let key = filters.key_for(deps);
    cell.observe(key, || {
        let rows = if deps.rows {
            view.get(dataset, filters)
        } else {
            Arc::new(FilteredDataset::full(Arc::clone(dataset)))
        };
        (rows, filters.criteria().clone())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures;

    fn session() -> Session {
        Session::new(Arc::new(fixtures::mixed()), &Config::default())
    }

    #[test]
    fn defaults_select_everything_on_first_island() {
        let s = session();
        let c = s.criteria();
        assert_eq!(c.selected_species, Species::all());
        assert_eq!(c.selected_island, "Torgersen");
        assert_eq!(c.selected_attribute, NumericAttribute::BillLengthMm);
        assert_eq!(c.bin_count, 20);
    }

    #[test]
    fn all_sinks_share_one_view_computation() {
        let mut s = session();
        s.table_a().unwrap();
        s.table_b().unwrap();
        s.primary_histogram().unwrap();
        s.secondary_histogram().unwrap();
        s.scatter().unwrap();
        assert_eq!(s.view_recomputations(), 1);

        s.set_island("Biscoe");
        s.table_a().unwrap();
        s.scatter().unwrap();
        s.primary_histogram().unwrap();
        assert_eq!(s.view_recomputations(), 2);
    }

    #[test]
    fn consecutive_reads_reuse_cached_artifacts() {
        let mut s = session();
        let first = s.primary_histogram().unwrap();
        let second = s.primary_histogram().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(s.primary_histogram.renders(), 1);
        assert_eq!(s.view_recomputations(), 1);
    }

    #[test]
    fn nothing_recomputes_until_observed() {
        let mut s = session();
        s.set_island("Dream");
        s.set_island("Biscoe");
        s.toggle_species(Species::Gentoo);
        assert_eq!(s.view_recomputations(), 0);

        let view = s.filtered_view();
        assert_eq!(view.indices(), &[1]);
        assert_eq!(s.view_recomputations(), 1);
    }

    #[test]
    fn attribute_change_rerenders_charts_but_not_view_or_tables() {
        let mut s = session();
        s.table_a().unwrap();
        s.scatter().unwrap();
        s.secondary_histogram().unwrap();

        s.set_attribute(NumericAttribute::BodyMassG);
        let table = s.table_a().unwrap();
        let scatter = s.scatter().unwrap();
        let hist = s.secondary_histogram().unwrap();

        assert_eq!(s.view_recomputations(), 1);
        assert_eq!(s.table_a.renders(), 1);
        assert_eq!(s.scatter.renders(), 2);
        assert_eq!(s.secondary_histogram.renders(), 2);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(scatter.x_label, "body_mass_g");
        assert_eq!(hist.x_label, "body_mass_g");
    }

    #[test]
    fn bin_count_only_touches_adjustable_histogram() {
        let mut s = session();
        s.primary_histogram().unwrap();
        s.secondary_histogram().unwrap();

        s.set_bin_count(40);
        s.primary_histogram().unwrap();
        let hist = s.secondary_histogram().unwrap();

        assert_eq!(s.primary_histogram.renders(), 1);
        assert_eq!(s.secondary_histogram.renders(), 2);
        assert_eq!(hist.edges.len(), 41);
    }

    #[test]
    fn bin_count_is_clamped_to_slider_range() {
        let mut s = session();
        s.set_bin_count(1000);
        assert_eq!(s.criteria().bin_count, 100);
        s.set_bin_count(0);
        assert_eq!(s.criteria().bin_count, 5);
    }

    #[test]
    fn unchanged_value_is_not_a_change() {
        let mut s = session();
        s.filtered_view();
        s.set_island("Torgersen");
        s.set_species(Species::all());
        s.filtered_view();
        assert_eq!(s.view_recomputations(), 1);
    }

    #[test]
    fn empty_species_selection_renders_empty_artifacts() {
        let mut s = session();
        s.set_species(BTreeSet::new());
        assert!(s.filtered_view().is_empty());
        assert!(s.table_a().unwrap().rows.is_empty());
        assert!(s.primary_histogram().unwrap().is_empty());
        assert!(s.scatter().unwrap().series.is_empty());
    }

    #[test]
    fn full_grid_ignores_filters() {
        let mut config = Config::default();
        config.tables.grid_source = TableSource::Full;
        let mut s = Session::new(Arc::new(fixtures::mixed()), &config);

        assert_eq!(s.table_b().unwrap().rows.len(), 8);
        s.set_island("Dream");
        assert_eq!(s.table_b().unwrap().rows.len(), 8);
        assert_eq!(s.table_b.renders(), 1);
        // the unfiltered grid never pulls the filtered view
        assert_eq!(s.view_recomputations(), 0);
    }

    #[test]
    fn sink_failure_stays_local() {
        let mut config = Config::default();
        config.charts.primary_bins = 0;
        let mut s = Session::new(Arc::new(fixtures::mixed()), &config);

        assert!(s.primary_histogram().is_err());
        assert!(s.secondary_histogram().is_ok());
        assert!(s.scatter().is_ok());
        assert_eq!(s.table_a().unwrap().rows.len(), 2);
    }

    #[test]
    fn sessions_are_independent_over_shared_dataset() {
        let dataset = Arc::new(fixtures::mixed());
        let mut a = Session::new(Arc::clone(&dataset), &Config::default());
        let mut b = Session::new(Arc::clone(&dataset), &Config::default());

        a.set_island("Dream");
        assert_eq!(a.filtered_view().len(), 3);
        assert_eq!(b.filtered_view().len(), 2);
        assert!(Arc::ptr_eq(a.dataset(), b.dataset()));
    }

    #[test]
    fn two_row_scenarios() {
        let mut s = Session::new(Arc::new(fixtures::two_rows()), &Config::default());
        s.set_species([Species::Adelie, Species::Gentoo].into_iter().collect());
        s.set_island("Torgersen");
        let rows: Vec<f64> = s.filtered_view().rows().map(|r| r.body_mass_g).collect();
        assert_eq!(rows, vec![3750.0]);

        s.set_island("Biscoe");
        let rows: Vec<f64> = s.filtered_view().rows().map(|r| r.body_mass_g).collect();
        assert_eq!(rows, vec![5000.0]);
    }
}
