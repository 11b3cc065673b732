use eframe::egui::{self, RichText, Ui};

use crate::color::SpeciesColors;
use crate::data::model::{NumericAttribute, Species};
use crate::state::Session;

// ---------------------------------------------------------------------------
// Left side panel – filter controls
// ---------------------------------------------------------------------------

/// Render the four filter controls. Each edit is forwarded to the matching
/// session update.
pub fn side_panel(ui: &mut Ui, session: &mut Session, colors: &SpeciesColors) {
    ui.heading("Filters");
    ui.separator();

    // ---- Attribute ----
    ui.strong("Choose attribute");
    let current = session.criteria().selected_attribute;
    let mut selected = current;
    egui::ComboBox::from_id_salt("selected_attribute")
        .selected_text(current.column())
        .show_ui(ui, |ui: &mut Ui| {
            for attr in NumericAttribute::ALL {
                ui.selectable_value(&mut selected, attr, attr.column());
            }
        });
    if selected != current {
        session.set_attribute(selected);
    }
    ui.add_space(6.0);

    // ---- Bin count ----
    ui.strong("Number of histogram bins");
    let controls = *session.controls();
    let mut bins = session.criteria().bin_count;
    if ui
        .add(egui::Slider::new(
            &mut bins,
            controls.bin_count_min..=controls.bin_count_max,
        ))
        .changed()
    {
        session.set_bin_count(bins);
    }
    ui.add_space(6.0);

    // ---- Island ----
    ui.strong("Choose island");
    let islands = session.dataset().islands.clone();
    let current_island = session.criteria().selected_island.clone();
    let mut island = current_island.clone();
    egui::ComboBox::from_id_salt("selected_island")
        .selected_text(&current_island)
        .show_ui(ui, |ui: &mut Ui| {
            for value in &islands {
                ui.selectable_value(&mut island, value.clone(), value.as_str());
            }
        });
    if island != current_island {
        session.set_island(&island);
    }
    ui.add_space(6.0);

    // ---- Species ----
    ui.strong("Filter species");
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for species in Species::ALL {
            let mut checked = session.criteria().selected_species.contains(&species);
            let text = RichText::new(species.as_str()).color(colors.color_for(species));
            if ui.checkbox(&mut checked, text).changed() {
                session.toggle_species(species);
            }
        }
    });
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            session.set_species(Species::all());
        }
        if ui.small_button("None").clicked() {
            session.set_species(Default::default());
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Title and row counts. Reading the visible count observes the filtered
/// view, which is cheap and memoized.
pub fn top_bar(ui: &mut Ui, session: &mut Session) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.heading("Palmer Penguin Analysis");
        ui.separator();

        let total = session.dataset().len();
        let visible = session.filtered_view().len();
        ui.label(format!("{total} rows loaded, {visible} visible"));

        ui.separator();
        ui.label(
            RichText::new(format!(
                "view recomputed {}×",
                session.view_recomputations()
            ))
            .weak(),
        );
    });
}
