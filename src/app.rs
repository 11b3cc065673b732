use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::SpeciesColors;
use crate::sinks::SinkOutput;
use crate::state::Session;
use crate::ui::plot::BarLayout;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct PenguinLensApp {
    pub session: Session,
    colors: SpeciesColors,
}

impl PenguinLensApp {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            colors: SpeciesColors::default(),
        }
    }
}

impl eframe::App for PenguinLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: title and counts ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.session);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.session, &self.colors);
            });

        // ---- Central panel: tables and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| self.dashboard(ui));
        });
    }
}

impl PenguinLensApp {
    /// Each card pulls its sink only while expanded; collapsed cards are
    /// never observed and so never re-rendered.
    fn dashboard(&mut self, ui: &mut Ui) {
        let session = &mut self.session;
        let colors = &self.colors;

        ui.columns(2, |cols| {
            card(&mut cols[0], "Data table", |ui| {
                show(ui, session.table_a(), |ui, t| table::data_grid(ui, "table_a", t));
            });
            card(&mut cols[1], "Penguins grid", |ui| {
                show(ui, session.table_b(), |ui, t| table::data_grid(ui, "table_b", t));
            });
        });

        ui.columns(2, |cols| {
            card(&mut cols[0], "Stacked histogram", |ui| {
                show(ui, session.primary_histogram(), |ui, h| {
                    plot::histogram(ui, "primary_histogram", h, BarLayout::Stacked, colors)
                });
            });
            card(&mut cols[1], "Density histogram", |ui| {
                show(ui, session.secondary_histogram(), |ui, h| {
                    plot::histogram(ui, "secondary_histogram", h, BarLayout::Layered, colors)
                });
            });
        });

        card(ui, "Scatterplot", |ui| {
            show(ui, session.scatter(), |ui, s| plot::scatterplot(ui, s, colors));
        });
    }
}

fn card(ui: &mut Ui, title: &str, body: impl FnOnce(&mut Ui)) {
    egui::CollapsingHeader::new(RichText::new(title).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, body);
    ui.add_space(8.0);
}

/// Draw an artifact, or the sink's error in place of it.
fn show<A>(ui: &mut Ui, output: SinkOutput<A>, draw: impl FnOnce(&mut Ui, &std::sync::Arc<A>)) {
    match output {
        Ok(artifact) => draw(ui, &artifact),
        Err(e) => {
            ui.label(RichText::new(format!("Error: {e}")).color(Color32::RED));
        }
    }
}
