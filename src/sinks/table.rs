use serde::Deserialize;

use super::{Dependencies, Sink, SinkError, SinkInput};
use crate::data::model::Row;

/// Rows a table renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableSource {
    /// The current filtered view.
    #[default]
    Filtered,
    /// Every row of the dataset, regardless of filters.
    Full,
}

/// Formatted cells ready for a grid widget.
#[derive(Debug, Clone, PartialEq)]
pub struct TableArtifact {
    pub title: String,
    pub columns: &'static [&'static str],
    pub rows: Vec<Vec<String>>,
}

pub struct TableSink {
    title: String,
    source: TableSource,
}

impl TableSink {
    pub fn new(title: impl Into<String>, source: TableSource) -> Self {
        Self {
            title: title.into(),
            source,
        }
    }
}

impl Sink for TableSink {
    type Artifact = TableArtifact;

    fn name(&self) -> &str {
        &self.title
    }

    fn dependencies(&self) -> Dependencies {
        Dependencies {
            rows: self.source == TableSource::Filtered,
            attribute: false,
            bin_count: false,
        }
    }

    fn render(&self, input: &SinkInput<'_>) -> Result<TableArtifact, SinkError> {
        Ok(TableArtifact {
            title: self.title.clone(),
            columns: &Row::COLUMNS,
            rows: input.view.rows().map(Row::cells).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::data::filter::{compute, FilterCriteria};
    use crate::data::model::fixtures;

    #[test]
    fn renders_one_line_per_view_row() {
        let ds = Arc::new(fixtures::mixed());
        let mut criteria = FilterCriteria::defaults_for(&ds, 20);
        criteria.selected_island = "Dream".to_string();
        let view = compute(&ds, &criteria);

        let sink = TableSink::new("Filtered data", TableSource::Filtered);
        let table = sink
            .render(&SinkInput {
                view: &view,
                criteria: &criteria,
            })
            .unwrap();

        assert_eq!(table.columns.len(), 8);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0][0], "Chinstrap");
        assert_eq!(table.rows[1][0], "Adelie");
    }

    #[test]
    fn full_source_ignores_filters() {
        let sink = TableSink::new("Penguins grid", TableSource::Full);
        assert!(!sink.dependencies().rows);
        assert!(TableSink::new("a", TableSource::Filtered).dependencies().rows);
    }
}
