use super::{finite_values, Dependencies, Sink, SinkError, SinkInput};
use crate::data::model::{NumericAttribute, Species};

/// Marker symbol per species, so series stay distinguishable without colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Circle,
    Diamond,
    Square,
}

impl MarkerKind {
    pub fn for_species(species: Species) -> Self {
        match species {
            Species::Adelie => MarkerKind::Circle,
            Species::Gentoo => MarkerKind::Diamond,
            Species::Chinstrap => MarkerKind::Square,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    /// Marker radius, proportional in area to `bill_length_mm`.
    pub radius: f32,
    pub bill_length_mm: f64,
    pub flipper_length_mm: f64,
    pub bill_depth_mm: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub species: Species,
    pub marker: MarkerKind,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterArtifact {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub legend_title: String,
    pub series: Vec<ScatterSeries>,
}

impl ScatterArtifact {
    /// Closest point of the series named `species` to `(x, y)`, with both
    /// axes normalised by the plotted span.
    pub fn nearest(&self, species: &str, x: f64, y: f64) -> Option<&ScatterPoint> {
        let series = self.series.iter().find(|s| s.species.as_str() == species)?;
        let (x_span, y_span) = self.spans();
        series.points.iter().min_by(|a, b| {
            let da = ((a.x - x) / x_span).powi(2) + ((a.y - y) / y_span).powi(2);
            let db = ((b.x - x) / x_span).powi(2) + ((b.y - y) / y_span).powi(2);
            da.total_cmp(&db)
        })
    }

    /// Hover label listing the point's coordinates and attached measurements.
    pub fn hover_text(&self, species: &str, point: &ScatterPoint) -> String {
        format!(
            "{species}\n{}: {:.1}\n{}: {:.0}\nbill_length_mm: {:.1}\nflipper_length_mm: {:.0}\nbill_depth_mm: {:.1}",
            self.x_label,
            point.x,
            self.y_label,
            point.y,
            point.bill_length_mm,
            point.flipper_length_mm,
            point.bill_depth_mm,
        )
    }

    fn spans(&self) -> (f64, f64) {
        let mut x = (f64::INFINITY, f64::NEG_INFINITY);
        let mut y = (f64::INFINITY, f64::NEG_INFINITY);
        for p in self.series.iter().flat_map(|s| s.points.iter()) {
            x = (x.0.min(p.x), x.1.max(p.x));
            y = (y.0.min(p.y), y.1.max(p.y));
        }
        let span = |(lo, hi): (f64, f64)| if hi > lo { hi - lo } else { 1.0 };
        (span(x), span(y))
    }
}

pub struct ScatterSink {
    size_max: f32,
}

impl ScatterSink {
    pub fn new(size_max: f32) -> Self {
        Self { size_max }
    }

    /// Area-proportional radius, `size_max` for the largest value.
    fn radius(&self, value: f64, size_ref: f64) -> f32 {
        if size_ref <= 0.0 {
            return self.size_max;
        }
        let r = self.size_max * ((value / size_ref).sqrt() as f32);
        r.min(self.size_max)
    }
}

impl Sink for ScatterSink {
    type Artifact = ScatterArtifact;

    fn name(&self) -> &str {
        "scatterplot"
    }

    fn dependencies(&self) -> Dependencies {
        Dependencies {
            rows: true,
            attribute: true,
            bin_count: false,
        }
    }

    fn render(&self, input: &SinkInput<'_>) -> Result<ScatterArtifact, SinkError> {
        let attr = input.criteria.selected_attribute;
        let sizes = finite_values(input.view.rows(), "bill_length_mm", |r| r.bill_length_mm)?;
        let size_ref = sizes.iter().copied().fold(0.0, f64::max);

        let mut series = Vec::new();
        for species in Species::ALL {
            let points: Vec<ScatterPoint> = input
                .view
                .rows()
                .filter(|r| r.species == species)
                .map(|r| ScatterPoint {
                    x: attr.value(r),
                    y: NumericAttribute::BodyMassG.value(r),
                    radius: self.radius(r.bill_length_mm, size_ref),
                    bill_length_mm: r.bill_length_mm,
                    flipper_length_mm: r.flipper_length_mm,
                    bill_depth_mm: r.bill_depth_mm,
                })
                .collect();
            if points.is_empty() {
                continue;
            }
            series.push(ScatterSeries {
                species,
                marker: MarkerKind::for_species(species),
                points,
            });
        }

        Ok(ScatterArtifact {
            title: format!("{attr} vs Body Mass"),
            x_label: attr.column().to_string(),
            y_label: "Body Mass (g)".to_string(),
            legend_title: "Species".to_string(),
            series,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::data::filter::{compute, FilterCriteria};
    use crate::data::model::fixtures;

    fn biscoe() -> ScatterArtifact {
        let ds = Arc::new(fixtures::mixed());
        let mut criteria = FilterCriteria::defaults_for(&ds, 20);
        criteria.selected_island = "Biscoe".to_string();
        criteria.selected_attribute = NumericAttribute::FlipperLengthMm;
        let view = compute(&ds, &criteria);
        ScatterSink::new(6.0)
            .render(&SinkInput {
                view: &view,
                criteria: &criteria,
            })
            .unwrap()
    }

    #[test]
    fn labels_follow_selected_attribute() {
        let plot = biscoe();
        assert_eq!(plot.title, "flipper_length_mm vs Body Mass");
        assert_eq!(plot.x_label, "flipper_length_mm");
        assert_eq!(plot.y_label, "Body Mass (g)");
        assert_eq!(plot.legend_title, "Species");
    }

    #[test]
    fn one_series_per_species_with_distinct_markers() {
        let plot = biscoe();
        let species: Vec<Species> = plot.series.iter().map(|s| s.species).collect();
        assert_eq!(species, vec![Species::Adelie, Species::Gentoo]);
        assert_eq!(plot.series[0].marker, MarkerKind::Circle);
        assert_eq!(plot.series[1].marker, MarkerKind::Diamond);
        assert_eq!(plot.series[1].points.len(), 2);
        assert_eq!(plot.series[1].points[0].y, 5000.0);
    }

    #[test]
    fn marker_size_is_capped() {
        let plot = biscoe();
        let radii: Vec<f32> = plot
            .series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.radius))
            .collect();
        assert!(radii.iter().all(|&r| r > 0.0 && r <= 6.0));
        // longest bill (50.0) gets the full size
        assert_eq!(plot.series[1].points[1].radius, 6.0);
    }

    #[test]
    fn hover_metadata_is_attached() {
        let plot = biscoe();
        let p = plot.nearest("Gentoo", 190.0, 5010.0).unwrap();
        assert_eq!(p.bill_length_mm, 46.1);
        assert_eq!(p.bill_depth_mm, 18.0);
        assert_eq!(p.flipper_length_mm, 190.0);

        let text = plot.hover_text("Gentoo", p);
        assert!(text.contains("flipper_length_mm: 190"));
        assert!(text.contains("bill_depth_mm: 18.0"));
        assert!(plot.nearest("Emperor", 0.0, 0.0).is_none());
    }
}
