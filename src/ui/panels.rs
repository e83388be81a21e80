use eframe::egui::{self, Color32, RichText, Ui};
use rusty_grid::data::decode::SourceFormat;
use rusty_grid::data::pager::ALL_ROWS;
use rusty_grid::data::view::Notice;

use crate::state::{AppState, ViewAction};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, actions: &mut Vec<ViewAction>) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(ui.ctx(), state);
                ui.close_menu();
            }
            if ui.button("Fetch remote").clicked() {
                actions.push(ViewAction::FetchRemote);
                ui.close_menu();
            }
            ui.separator();
            let has_rows = !state.view.visible_rows().is_empty();
            if ui.add_enabled(has_rows, egui::Button::new("Export…")).clicked() {
                save_export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(summary) = state.summary() {
            ui.label(summary);
            ui.separator();
        }

        if ui
            .add_enabled(!state.view.filters().is_empty(), egui::Button::new("Clear filters"))
            .clicked()
        {
            actions.push(ViewAction::ClearFilters);
        }
        let sorted = state.view.sort().column.is_some();
        if ui.add_enabled(sorted, egui::Button::new("Clear sort")).clicked() {
            actions.push(ViewAction::ClearSort);
        }

        if state.view.is_loading() {
            ui.spinner();
        }

        match state.view.notice() {
            Some(Notice::Error(msg)) => {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            Some(Notice::Info(msg)) => {
                ui.label(RichText::new(msg).italics());
            }
            None => {}
        }
        if state.view.notice().is_some() && ui.small_button("✕").clicked() {
            actions.push(ViewAction::DismissNotice);
        }
    });
}

// ---------------------------------------------------------------------------
// Pager bar
// ---------------------------------------------------------------------------

/// Render page-size selector and Previous / Next controls.
pub fn pager_bar(ui: &mut Ui, state: &AppState, actions: &mut Vec<ViewAction>) {
    let page = state.view.page_state();
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Rows per page");
        egui::ComboBox::from_id_salt("page_size")
            .selected_text(page_size_label(page.page_size()))
            .show_ui(ui, |ui: &mut Ui| {
                let options = state
                    .config
                    .view
                    .page_size_options
                    .iter()
                    .copied()
                    .chain(std::iter::once(ALL_ROWS));
                for size in options {
                    if ui
                        .selectable_label(page.page_size() == size, page_size_label(size))
                        .clicked()
                    {
                        actions.push(ViewAction::SetPageSize(size));
                    }
                }
            });

        ui.separator();

        if ui
            .add_enabled(page.has_prev(), egui::Button::new("⏮"))
            .on_hover_text("First page")
            .clicked()
        {
            actions.push(ViewAction::SetPage(1));
        }
        if ui
            .add_enabled(page.has_prev(), egui::Button::new("Previous"))
            .clicked()
        {
            actions.push(ViewAction::PrevPage);
        }
        ui.label(format!(
            "Page {} of {}",
            page.current_page(),
            page.total_pages()
        ));
        if ui
            .add_enabled(page.has_next(), egui::Button::new("Next"))
            .clicked()
        {
            actions.push(ViewAction::NextPage);
        }
        if ui
            .add_enabled(page.has_next(), egui::Button::new("⏭"))
            .on_hover_text("Last page")
            .clicked()
        {
            actions.push(ViewAction::SetPage(page.total_pages()));
        }
    });
}

fn page_size_label(size: usize) -> String {
    if size == ALL_ROWS {
        "All".to_string()
    } else {
        size.to_string()
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(ctx: &egui::Context, state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open table")
        .add_filter("Supported files", SourceFormat::EXTENSIONS)
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Spreadsheet", &["xlsx", "xls", "xlsm", "xlsb", "ods"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(ctx, path);
    }
}

pub fn save_export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered rows")
        .add_filter("Excel workbook", &["xlsx"])
        .set_file_name(&state.config.export.file_name)
        .save_file();

    if let Some(path) = file {
        state.export_to(&path);
    }
}
