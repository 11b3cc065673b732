use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::sinks::table::TableArtifact;

const ROW_HEIGHT: f32 = 18.0;
const TABLE_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Data grid
// ---------------------------------------------------------------------------

/// Render a table artifact as a scrollable, virtualised grid.
pub fn data_grid(ui: &mut Ui, id: &str, table: &TableArtifact) {
    ui.strong(format!("{}  ({} rows)", table.title, table.rows.len()));

    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(TABLE_HEIGHT)
            .columns(Column::auto().at_least(48.0), table.columns.len())
            .header(ROW_HEIGHT + 2.0, |mut header| {
                for name in table.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(*name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, table.rows.len(), |mut row| {
                    let cells = &table.rows[row.index()];
                    for cell in cells {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell.as_str());
                        });
                    }
                });
            });
    });
}
