use eframe::egui;
use rusty_grid::config::ViewerConfig;

use crate::state::{AppState, ViewAction};
use crate::ui::{panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyGridApp {
    pub state: AppState,
}

impl RustyGridApp {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for RustyGridApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_loads();

        // Widgets only record what was clicked; the view changes afterwards.
        let mut actions: Vec<ViewAction> = Vec::new();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state, &mut actions);
        });

        // ---- Bottom panel: pager ----
        egui::TopBottomPanel::bottom("pager_bar").show(ctx, |ui| {
            panels::pager_bar(ui, &self.state, &mut actions);
        });

        // ---- Central panel: grid ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::horizontal().show(ui, |ui| {
                table::data_grid(ui, &self.state, &mut actions);
            });
        });

        for action in actions {
            self.state.apply(ctx, action);
        }
    }
}
