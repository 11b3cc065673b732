use std::sync::Arc;

use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Line, MarkerShape, Plot, PlotPoints, Points};

use crate::color::SpeciesColors;
use crate::sinks::histogram::HistogramArtifact;
use crate::sinks::scatter::{MarkerKind, ScatterArtifact};

const PLOT_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Histograms
// ---------------------------------------------------------------------------

/// How per-species bars are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarLayout {
    /// Each species on top of the previous ones.
    Stacked,
    /// Translucent bars drawn over each other.
    Layered,
}

pub fn histogram(
    ui: &mut Ui,
    id: &str,
    hist: &HistogramArtifact,
    layout: BarLayout,
    colors: &SpeciesColors,
) {
    ui.strong(&hist.title);
    if hist.is_empty() {
        ui.label("No rows match the current filters.");
    }

    let width = hist.bin_width();
    Plot::new(id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(hist.x_label.as_str())
        .y_axis_label(hist.y_label.as_str())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            let mut charts: Vec<BarChart> = Vec::with_capacity(hist.groups.len());
            for group in &hist.groups {
                let color = colors.color_for(group.species);
                let bars: Vec<Bar> = hist
                    .centers()
                    .zip(&group.counts)
                    .map(|(x, &count)| Bar::new(x, count as f64).width(width))
                    .collect();

                let chart = BarChart::new(bars).name(group.species.as_str());
                let chart = match layout {
                    BarLayout::Stacked => {
                        let below: Vec<&BarChart> = charts.iter().collect();
                        chart.color(color).stack_on(&below)
                    }
                    BarLayout::Layered => chart.color(color.gamma_multiply(0.5)),
                };
                charts.push(chart);

                if let Some(curve) = &group.density {
                    let line = Line::new(PlotPoints::from(curve.clone()))
                        .name(group.species.as_str())
                        .color(color)
                        .width(2.0);
                    plot_ui.line(line);
                }
            }
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Scatterplot
// ---------------------------------------------------------------------------

fn marker_shape(kind: MarkerKind) -> MarkerShape {
    match kind {
        MarkerKind::Circle => MarkerShape::Circle,
        MarkerKind::Diamond => MarkerShape::Diamond,
        MarkerKind::Square => MarkerShape::Square,
    }
}

/// Hovering a point shows its attached measurements.
pub fn scatterplot(ui: &mut Ui, plot: &Arc<ScatterArtifact>, colors: &SpeciesColors) {
    ui.strong(&plot.title);
    ui.label(format!("{}: colour and symbol, size by bill_length_mm", plot.legend_title));

    let hover = Arc::clone(plot);
    Plot::new("scatterplot")
        .height(PLOT_HEIGHT + 80.0)
        .legend(Legend::default())
        .x_axis_label(plot.x_label.as_str())
        .y_axis_label(plot.y_label.as_str())
        .allow_boxed_zoom(true)
        .label_formatter(move |name, value| {
            hover
                .nearest(name, value.x, value.y)
                .map(|p| hover.hover_text(name, p))
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for series in &plot.series {
                let color = colors.color_for(series.species);
                let shape = marker_shape(series.marker);
                // One item per point so every marker keeps its own size;
                // the shared name merges them into one legend entry.
                for p in &series.points {
                    plot_ui.points(
                        Points::new(PlotPoints::from(vec![[p.x, p.y]]))
                            .name(series.species.as_str())
                            .shape(shape)
                            .radius(p.radius)
                            .filled(true)
                            .color(color),
                    );
                }
            }
        });
}
