use super::kde::density_curve;
use super::{finite_values, Dependencies, Sink, SinkError, SinkInput};
use crate::data::model::Species;

// ---------------------------------------------------------------------------
// Artifact
// ---------------------------------------------------------------------------

/// Per-species counts over bins shared by every group.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramArtifact {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Bin edges, `bins + 1` long. Empty when the view has no rows.
    pub edges: Vec<f64>,
    /// One entry per species present in the view, in legend order.
    pub groups: Vec<HistogramGroup>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramGroup {
    pub species: Species,
    pub counts: Vec<usize>,
    /// Density curve scaled to the count axis, if requested and estimable.
    pub density: Option<Vec<[f64; 2]>>,
}

impl HistogramArtifact {
    pub fn bin_width(&self) -> f64 {
        match self.edges.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        }
    }

    /// Midpoint of every bin.
    pub fn centers(&self) -> impl Iterator<Item = f64> + '_ {
        self.edges.windows(2).map(|w| 0.5 * (w[0] + w[1]))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// Where the bin count comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinRule {
    Fixed(usize),
    /// The user-controlled `bin_count`.
    FromCriteria,
}

pub struct HistogramSink {
    name: &'static str,
    bins: BinRule,
    /// Sample points for a density overlay, `None` for bars only.
    density_points: Option<usize>,
}

impl HistogramSink {
    /// Stacked counts in a fixed number of bins.
    pub fn fixed(bins: usize) -> Self {
        Self {
            name: "primary histogram",
            bins: BinRule::Fixed(bins),
            density_points: None,
        }
    }

    /// User-sized bins with a per-species density overlay.
    pub fn adjustable(density_points: usize) -> Self {
        Self {
            name: "secondary histogram",
            bins: BinRule::FromCriteria,
            density_points: Some(density_points),
        }
    }
}

impl Sink for HistogramSink {
    type Artifact = HistogramArtifact;

    fn name(&self) -> &str {
        self.name
    }

    fn dependencies(&self) -> Dependencies {
        Dependencies {
            rows: true,
            attribute: true,
            bin_count: self.bins == BinRule::FromCriteria,
        }
    }

    fn render(&self, input: &SinkInput<'_>) -> Result<HistogramArtifact, SinkError> {
        let attr = input.criteria.selected_attribute;
        let bins = match self.bins {
            BinRule::Fixed(n) => n,
            BinRule::FromCriteria => input.criteria.bin_count,
        };
        if bins == 0 {
            return Err(SinkError::InvalidBinCount(bins));
        }

        let title = match self.bins {
            BinRule::Fixed(_) => format!("{attr} Histogram by Species"),
            BinRule::FromCriteria => format!("{attr} Histogram ({bins} bins)"),
        };

        let all = finite_values(input.view.rows(), attr.column(), |r| attr.value(r))?;
        let edges = bin_edges(&all, bins);
        let width = match edges.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        };

        let mut groups = Vec::new();
        for species in Species::ALL {
            let values: Vec<f64> = input
                .view
                .rows()
                .filter(|r| r.species == species)
                .map(|r| attr.value(r))
                .collect();
            if values.is_empty() {
                continue;
            }

            let counts = bin_counts(&values, &edges);
            let density = self.density_points.and_then(|points| {
                let (lo, hi) = (edges[0], edges[edges.len() - 1]);
                density_curve(&values, lo, hi, points, values.len() as f64 * width)
            });
            groups.push(HistogramGroup {
                species,
                counts,
                density,
            });
        }

        Ok(HistogramArtifact {
            title,
            x_label: attr.column().to_string(),
            y_label: "Count".to_string(),
            edges,
            groups,
        })
    }
}

// ---------------------------------------------------------------------------
// Binning
// ---------------------------------------------------------------------------

/// `bins` equal-width bins spanning the data. A constant sample gets a unit
/// wide range centred on the value.
fn bin_edges(values: &[f64], bins: usize) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if hi - lo < f64::EPSILON {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;
    (0..=bins)
        .map(|i| if i == bins { hi } else { lo + i as f64 * width })
        .collect()
}

/// Count values per bin; the last bin is closed on the right.
fn bin_counts(values: &[f64], edges: &[f64]) -> Vec<usize> {
    let bins = edges.len().saturating_sub(1);
    let mut counts = vec![0usize; bins];
    if bins == 0 {
        return counts;
    }
    let lo = edges[0];
    let width = (edges[bins] - lo) / bins as f64;
    for &v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
}
