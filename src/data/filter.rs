use std::collections::BTreeSet;
use std::sync::Arc;

use super::model::{Dataset, NumericAttribute, Row, Species};

// ---------------------------------------------------------------------------
// Filter criteria: what the user currently has selected
// ---------------------------------------------------------------------------

/// Snapshot of every user-controlled input.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    /// Species to keep. Empty is valid and matches nothing.
    pub selected_species: BTreeSet<Species>,
    /// Island to keep. A value absent from the dataset matches nothing.
    pub selected_island: String,
    /// Measurement driving the histograms and the scatter x axis.
    pub selected_attribute: NumericAttribute,
    /// Bin count for the adjustable histogram.
    pub bin_count: usize,
}

impl FilterCriteria {
    /// Session defaults: every species, the first observed island.
    pub fn defaults_for(dataset: &Dataset, bin_count: usize) -> Self {
        Self {
            selected_species: Species::all(),
            selected_island: dataset.default_island().unwrap_or_default().to_string(),
            selected_attribute: NumericAttribute::default(),
            bin_count,
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.selected_species.contains(&row.species) && row.island == self.selected_island
    }
}

// ---------------------------------------------------------------------------
// Filtered dataset: rows passing the current criteria
// ---------------------------------------------------------------------------

/// The subset of a [`Dataset`] matching a [`FilterCriteria`], in source
/// order. Shares the dataset instead of copying rows.
#[derive(Debug, Clone)]
pub struct FilteredDataset {
    dataset: Arc<Dataset>,
    indices: Vec<usize>,
}

impl FilteredDataset {
    /// A view over every row, used by the unfiltered grid.
    pub fn full(dataset: Arc<Dataset>) -> Self {
        let indices = (0..dataset.len()).collect();
        Self { dataset, indices }
    }

    /// Positions of the matching rows within the dataset.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> + '_ {
        self.indices.iter().map(|&i| &self.dataset.rows[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Select the rows of `dataset` matching `criteria`.
///
/// A single pass over the dataset; never fails. An empty species set or an
/// island not present in the data both give an empty result.
pub fn compute(dataset: &Arc<Dataset>, criteria: &FilterCriteria) -> FilteredDataset {
    let indices = dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| criteria.matches(row))
        .map(|(i, _)| i)
        .collect();

    FilteredDataset {
        dataset: Arc::clone(dataset),
        indices,
    }
}
