/// Presentation sinks: pure renderers from the filtered view to chart and
/// table artifacts. Drawing the artifacts is the UI layer's job.
///
/// ```text
///   FilterState ──► FilteredView (memo) ──┬──► TableSink        ×2
///        │                                ├──► HistogramSink    ×2
///        └── attribute / bin_count ───────┴──► ScatterSink
/// ```
///
/// Every sink lives in a [`SinkCell`] that caches its last artifact keyed
/// on the revisions of the inputs that sink reads.
pub mod histogram;
pub mod kde;
pub mod scatter;
pub mod table;

use std::sync::Arc;

use thiserror::Error;

use crate::data::filter::{FilterCriteria, FilteredDataset};
use crate::data::model::Row;
use crate::reactive::{Memo, Revision};

/// A sink-local rendering failure. Never escapes the sink's own card.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SinkError {
    #[error("bin count must be positive, got {0}")]
    InvalidBinCount(usize),

    #[error("non-finite value in column '{column}'")]
    NonFiniteValue { column: &'static str },
}

pub type SinkOutput<A> = Result<Arc<A>, SinkError>;

/// Which criteria fields a sink reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependencies {
    /// Species / island, i.e. the filtered rows.
    pub rows: bool,
    pub attribute: bool,
    pub bin_count: bool,
}

/// A criteria field, as named in change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Species,
    Island,
    Attribute,
    BinCount,
}

impl Dependencies {
    pub fn reads(&self, field: Field) -> bool {
        match field {
            Field::Species | Field::Island => self.rows,
            Field::Attribute => self.attribute,
            Field::BinCount => self.bin_count,
        }
    }
}

/// Revisions of the inputs a sink read when it last rendered. Fields the
/// sink does not read stay `None` so changes to them keep the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SinkKey {
    pub rows: Option<Revision>,
    pub attribute: Option<Revision>,
    pub bin_count: Option<Revision>,
}

pub struct SinkInput<'a> {
    pub view: &'a FilteredDataset,
    pub criteria: &'a FilterCriteria,
}

pub trait Sink {
    type Artifact;

    /// Short label used in logs.
    fn name(&self) -> &str;

    fn dependencies(&self) -> Dependencies;

    fn render(&self, input: &SinkInput<'_>) -> Result<Self::Artifact, SinkError>;
}

/// A sink and its cached artifact.
pub struct SinkCell<S: Sink> {
    pub sink: S,
    memo: Memo<SinkKey, SinkOutput<S::Artifact>>,
}

impl<S: Sink> SinkCell<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            memo: Memo::default(),
        }
    }

    /// Return the cached artifact for `key`, rendering with the input from
    /// `input` when stale. `input` is not called on a cache hit.
    pub fn observe(
        &mut self,
        key: SinkKey,
        input: impl FnOnce() -> (Arc<FilteredDataset>, FilterCriteria),
    ) -> SinkOutput<S::Artifact> {
        let sink = &self.sink;
        self.memo.get_or_compute(key, || {
            let (view, criteria) = input();
            log::debug!("Rendering {} from {} rows", sink.name(), view.len());
            sink.render(&SinkInput {
                view: &view,
                criteria: &criteria,
            })
            .map(Arc::new)
            .inspect_err(|e| log::warn!("{} failed: {e}", sink.name()))
        })
    }

    pub fn invalidate(&mut self) {
        self.memo.invalidate();
    }

    pub fn renders(&self) -> u64 {
        self.memo.computations()
    }
}

/// Collect `value` over `rows`, rejecting NaN and infinities.
pub(crate) fn finite_values<'a>(
    rows: impl Iterator<Item = &'a Row>,
    column: &'static str,
    value: impl Fn(&Row) -> f64,
) -> Result<Vec<f64>, SinkError> {
    rows.map(|row| {
        let v = value(row);
        if v.is_finite() {
            Ok(v)
        } else {
            Err(SinkError::NonFiniteValue { column })
        }
    })
    .collect()
}
