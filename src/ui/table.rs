use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use rusty_grid::data::model::{CellValue, MISSING_PLACEHOLDER};
use rusty_grid::data::pager::page_offset;
use rusty_grid::data::view::ViewController;

use crate::state::{AppState, ViewAction};

// ---------------------------------------------------------------------------
// Data grid
// ---------------------------------------------------------------------------

const ROW_HEIGHT: f32 = 20.0;
const HEADER_HEIGHT: f32 = 52.0;
const MIN_COLUMN_WIDTH: f32 = 40.0;

/// Render the current page as a table, with a sort button and a filter
/// widget in every column header.
pub fn data_grid(ui: &mut Ui, state: &AppState, actions: &mut Vec<ViewAction>) {
    let view = &state.view;
    let columns = view.columns();
    if columns.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("Open a file or fetch remote data to begin.");
        });
        return;
    }

    let rows = view.page_rows();
    let offset = page_offset(view.page_state());

    let mut table = TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::auto().at_least(MIN_COLUMN_WIDTH));
    for width in view.widths() {
        table = table.column(Column::initial(*width).at_least(MIN_COLUMN_WIDTH).clip(true));
    }

    table
        .header(HEADER_HEIGHT, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("#");
            });
            for (idx, name) in columns.iter().enumerate() {
                header.col(|ui: &mut Ui| {
                    ui.vertical(|ui: &mut Ui| {
                        sort_button(ui, view, name, actions);
                        filter_widget(ui, state, idx, name, actions);
                    });
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                let i = row.index();
                let Some(&data_index) = rows.get(i) else {
                    return;
                };
                let cells = view.dataset().row(data_index).unwrap_or(&[]);

                row.col(|ui: &mut Ui| {
                    ui.weak((offset + i + 1).to_string());
                });
                for col in 0..columns.len() {
                    let text = cells.get(col).map_or_else(
                        || MISSING_PLACEHOLDER.to_string(),
                        CellValue::display_or_placeholder,
                    );
                    row.col(|ui: &mut Ui| {
                        ui.label(text);
                    });
                }
            });
        });
}

fn sort_button(ui: &mut Ui, view: &ViewController, name: &str, actions: &mut Vec<ViewAction>) {
    let label = match view.sort().direction_for(name) {
        Some(direction) => format!("{name} {}", direction.arrow()),
        None => name.to_string(),
    };
    let button = egui::Button::new(RichText::new(label).strong()).frame(false);
    if ui.add(button).on_hover_text("Click to sort").clicked() {
        actions.push(ViewAction::ToggleSort(name.to_string()));
    }
}

/// Drop-down of distinct values for low-cardinality columns, free text otherwise.
fn filter_widget(
    ui: &mut Ui,
    state: &AppState,
    idx: usize,
    name: &str,
    actions: &mut Vec<ViewAction>,
) {
    let current = state.view.filters().get(name);
    let distinct = state.view.distinct_values(idx);
    let set = |value: &str| ViewAction::SetFilter {
        column: name.to_string(),
        value: value.to_string(),
    };

    if !distinct.is_empty() && distinct.len() <= state.config.view.dropdown_threshold {
        let selected = if current.is_empty() { "All" } else { current };
        egui::ComboBox::from_id_salt(("filter", idx))
            .selected_text(selected)
            .width(ui.available_width())
            .show_ui(ui, |ui: &mut Ui| {
                if ui.selectable_label(current.is_empty(), "All").clicked() {
                    actions.push(set(""));
                }
                for value in distinct {
                    if ui
                        .selectable_label(current == value.as_str(), value.as_str())
                        .clicked()
                    {
                        actions.push(set(value));
                    }
                }
            });
    } else {
        let mut text = current.to_string();
        let edit = egui::TextEdit::singleline(&mut text)
            .id_salt(("filter", idx))
            .hint_text("Filter…")
            .desired_width(f32::INFINITY);
        if ui.add(edit).changed() {
            actions.push(set(&text));
        }
    }
}
