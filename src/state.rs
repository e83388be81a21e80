use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};

use eframe::egui;
use rusty_grid::config::ViewerConfig;
use rusty_grid::data::view::{LoadTicket, Loaded, Notice, PagingMode, ViewController};
use rusty_grid::error::LoadError;
use rusty_grid::remote::{HttpPageSupplier, PageRequest};
use rusty_grid::source;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

type LoadMessage = (LoadTicket, Result<Loaded, LoadError>);

/// Something the user did in the UI, applied after the frame's widgets ran.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewAction {
    SetFilter { column: String, value: String },
    ClearFilters,
    ToggleSort(String),
    ClearSort,
    SetPage(usize),
    NextPage,
    PrevPage,
    SetPageSize(usize),
    FetchRemote,
    DismissNotice,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub view: ViewController,
    pub config: ViewerConfig,
    supplier: HttpPageSupplier,
    tx: Sender<LoadMessage>,
    rx: Receiver<LoadMessage>,
}

impl AppState {
    pub fn new(config: ViewerConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            view: ViewController::new(&config),
            supplier: HttpPageSupplier::new(&config.remote),
            config,
            tx,
            rx,
        }
    }

    /// Read and decode `path` on a worker thread.
    pub fn open_path(&mut self, ctx: &egui::Context, path: PathBuf) {
        let ticket = self.view.begin_load();
        log::info!("opening {}", path.display());
        self.spawn(ctx, ticket, move || source::read_file(&path));
    }

    /// Fetch a remote page on a worker thread.
    pub fn fetch_remote(&mut self, ctx: &egui::Context, request: PageRequest, same_session: bool) {
        let ticket = self.view.begin_load();
        let supplier = self.supplier.clone();
        self.spawn(ctx, ticket, move || {
            source::fetch_page(&supplier, request, same_session)
        });
    }

    fn spawn<F>(&self, ctx: &egui::Context, ticket: LoadTicket, job: F)
    where
        F: FnOnce() -> Result<Loaded, LoadError> + Send + 'static,
    {
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            // The receiver only goes away with the app itself.
            let _ = tx.send((ticket, job()));
            ctx.request_repaint();
        });
    }

    /// Install any finished loads. Called once per frame.
    pub fn poll_loads(&mut self) {
        while let Ok((ticket, result)) = self.rx.try_recv() {
            self.view.finish_load(ticket, result);
        }
    }

    pub fn apply(&mut self, ctx: &egui::Context, action: ViewAction) {
        let remote = self.view.mode() == PagingMode::Remote;
        let request = match action {
            ViewAction::SetFilter { column, value } => self.view.set_filter(&column, &value),
            ViewAction::ClearFilters => self.view.clear_filters(),
            ViewAction::ToggleSort(column) => self.view.toggle_sort(&column),
            ViewAction::ClearSort => self.view.clear_sort(),
            ViewAction::SetPage(page) => self.view.set_page(page),
            ViewAction::NextPage => self.view.next_page(),
            ViewAction::PrevPage => self.view.prev_page(),
            ViewAction::SetPageSize(size) => self.view.set_page_size(size),
            ViewAction::FetchRemote => {
                let limit = self.view.page_state().page_size();
                self.fetch_remote(ctx, PageRequest { page: 1, limit }, false);
                None
            }
            ViewAction::DismissNotice => {
                self.view.dismiss_notice();
                None
            }
        };
        if let Some(request) = request {
            self.fetch_remote(ctx, request, remote);
        }
    }

    /// Serialize the visible rows and write them to `path`.
    pub fn export_to(&mut self, path: &std::path::Path) {
        let result = self
            .view
            .export()
            .and_then(|bytes| std::fs::write(path, bytes).map_err(Into::into));
        match result {
            Ok(()) => {
                log::info!("saved export to {}", path.display());
                self.view
                    .set_notice(Notice::Info(format!("Exported to {}", path.display())));
            }
            Err(e) => {
                log::error!("export failed: {e}");
                self.view.set_notice(Notice::Error(format!("Export failed: {e}")));
            }
        }
    }

    /// One-line summary for the top bar.
    pub fn summary(&self) -> Option<String> {
        let ds = self.view.dataset();
        if ds.columns().is_empty() {
            return None;
        }
        let label = self.view.source_label().unwrap_or("remote data");
        Some(format!(
            "{label}: {} rows loaded, {} visible",
            ds.len(),
            self.view.visible_rows().len()
        ))
    }
}
