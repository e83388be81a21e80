use super::export::export_view;
use super::filter::{distinct_values, filtered_indices, FilterSet};
use super::model::Dataset;
use super::pager::{paginate, PageState};
use super::sort::{sort_indices, SortSpec};
use super::width::{column_widths, WidthRule};
use crate::config::ViewerConfig;
use crate::error::{ExportError, LoadError};
use crate::remote::{PageRequest, RemotePage};

// ---------------------------------------------------------------------------
// Loads
// ---------------------------------------------------------------------------

/// Who slices pages: the engine, or the server that sent the rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingMode {
    Local,
    Remote,
}

/// Tag handed out per load; only the most recent one is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

/// A finished load, before it is installed.
#[derive(Debug, Clone)]
pub enum Loaded {
    File { label: String, dataset: Dataset },
    Remote {
        page: RemotePage,
        request: PageRequest,
        /// Keep filters and sort: this is another page of the current remote set.
        same_session: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// The result was superseded by a newer load and dropped.
    Stale,
    /// The load failed; the previous dataset is still shown.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

// ---------------------------------------------------------------------------
// ViewController
// ---------------------------------------------------------------------------

/// Owns one view session: Dataset → filter → sort → page.
///
/// Widths and distinct values are derived from the full dataset and only
/// recomputed when the dataset itself changes.
#[derive(Debug)]
pub struct ViewController {
    dataset: Dataset,
    mode: PagingMode,
    source_label: Option<String>,

    filters: FilterSet,
    sort: SortSpec,
    page: PageState,

    /// Filtered + sorted row indices into `dataset`.
    visible: Vec<usize>,

    widths: Vec<f32>,
    distinct: Vec<Vec<String>>,
    width_rule: WidthRule,

    latest_ticket: u64,
    pending: Option<LoadTicket>,
    notice: Option<Notice>,
}

impl ViewController {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            dataset: Dataset::empty(),
            mode: PagingMode::Local,
            source_label: None,
            filters: FilterSet::new(),
            sort: SortSpec::default(),
            page: PageState::new(config.view.default_page_size),
            visible: Vec::new(),
            widths: Vec::new(),
            distinct: Vec::new(),
            width_rule: config.columns,
            latest_ticket: 0,
            pending: None,
            notice: None,
        }
    }

    // -- Dataset replacement --------------------------------------------------

    /// Install a new dataset. Filters and sort start empty, page goes to 1.
    pub fn load_dataset(&mut self, dataset: Dataset, mode: PagingMode) {
        log::info!(
            "loaded {} rows with columns {:?} ({mode:?} paging)",
            dataset.len(),
            dataset.columns()
        );
        self.dataset = dataset;
        self.mode = mode;
        self.filters.clear_all();
        self.sort.clear();
        self.page.reset();
        self.rebuild_column_caches();
        self.refresh();
    }

    /// Swap in another server page of the current remote set, keeping the
    /// active filters and sort.
    pub fn replace_remote_page(&mut self, dataset: Dataset, total_pages: usize) {
        self.dataset = dataset;
        self.mode = PagingMode::Remote;
        self.page.set_reported_total(total_pages);
        self.rebuild_column_caches();
        self.refresh();
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_ticket += 1;
        let ticket = LoadTicket(self.latest_ticket);
        self.pending = Some(ticket);
        ticket
    }

    /// Apply a finished load unless a newer one was started since.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Loaded, LoadError>,
    ) -> LoadOutcome {
        if ticket.0 != self.latest_ticket {
            log::warn!(
                "dropping stale load {:?} (latest is {})",
                ticket,
                self.latest_ticket
            );
            return LoadOutcome::Stale;
        }
        self.pending = None;

        match result {
            Ok(Loaded::File { label, dataset }) => {
                self.notice = dataset
                    .is_empty()
                    .then(|| Notice::Info(format!("{label} has a header but no rows")));
                self.source_label = Some(label);
                self.load_dataset(dataset, PagingMode::Local);
                LoadOutcome::Applied
            }
            Ok(Loaded::Remote {
                page,
                request,
                same_session,
            }) => {
                let same_session = same_session && self.mode == PagingMode::Remote;
                let dataset = match Dataset::load(page.rows, None) {
                    Ok(dataset) => dataset,
                    // Keep the grid's columns so active filters stay editable.
                    Err(_) if same_session => Dataset::with_columns(self.dataset.columns()),
                    Err(_) => Dataset::empty(),
                };
                self.notice = dataset
                    .is_empty()
                    .then(|| Notice::Info(format!("page {} has no rows", request.page)));
                if same_session {
                    self.replace_remote_page(dataset, page.total_pages);
                } else {
                    self.load_dataset(dataset, PagingMode::Remote);
                }
                self.page.set_page_size(request.limit);
                self.page.set_reported_total(page.total_pages);
                self.page.set_page(request.page);
                LoadOutcome::Applied
            }
            Err(LoadError::Empty(e)) => {
                log::info!("{e}");
                self.source_label = None;
                self.load_dataset(Dataset::empty(), PagingMode::Local);
                self.notice = Some(Notice::Info(e.to_string()));
                LoadOutcome::Applied
            }
            Err(e) => {
                log::error!("load failed: {e}");
                self.notice = Some(Notice::Error(e.to_string()));
                LoadOutcome::Failed
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    // -- Filters --------------------------------------------------------------

    /// Set one column's filter text. Unknown columns are ignored.
    pub fn set_filter(&mut self, column: &str, value: &str) -> Option<PageRequest> {
        if !self.dataset.has_column(column) {
            log::warn!("filter on unknown column {column:?} ignored");
            return None;
        }
        if self.filters.get(column) == value {
            return None;
        }
        log::debug!("filter {column:?} = {value:?}");
        self.filters.set(column, value);
        self.after_order_change()
    }

    pub fn clear_filter(&mut self, column: &str) -> Option<PageRequest> {
        self.set_filter(column, "")
    }

    pub fn clear_filters(&mut self) -> Option<PageRequest> {
        if self.filters.is_empty() {
            return None;
        }
        log::debug!("clearing all filters");
        self.filters.clear_all();
        self.after_order_change()
    }

    // -- Sort -----------------------------------------------------------------

    /// Sort by `column`; clicking the active column again flips direction.
    pub fn toggle_sort(&mut self, column: &str) -> Option<PageRequest> {
        if !self.dataset.has_column(column) {
            log::warn!("sort on unknown column {column:?} ignored");
            return None;
        }
        self.sort.toggle(column);
        log::debug!("sort {:?} {:?}", self.sort.column, self.sort.direction);
        self.after_order_change()
    }

    pub fn clear_sort(&mut self) -> Option<PageRequest> {
        if self.sort.column.is_none() {
            return None;
        }
        self.sort.clear();
        self.after_order_change()
    }

    // -- Paging ---------------------------------------------------------------

    /// Go to `page` (clamped). In remote mode the returned request must be
    /// fetched; the page number updates when it arrives.
    pub fn set_page(&mut self, page: usize) -> Option<PageRequest> {
        match self.mode {
            PagingMode::Local => {
                self.page.set_page(page);
                log::debug!("page {}/{}", self.page.current_page(), self.page.total_pages());
                None
            }
            PagingMode::Remote => {
                let target = page.clamp(1, self.page.total_pages());
                (target != self.page.current_page()).then(|| PageRequest {
                    page: target,
                    limit: self.page.page_size(),
                })
            }
        }
    }

    pub fn next_page(&mut self) -> Option<PageRequest> {
        self.set_page(self.page.current_page().saturating_add(1))
    }

    pub fn prev_page(&mut self) -> Option<PageRequest> {
        self.set_page(self.page.current_page().saturating_sub(1))
    }

    /// Change the page size (`0` = all rows) and return to page 1.
    pub fn set_page_size(&mut self, page_size: usize) -> Option<PageRequest> {
        if page_size == self.page.page_size() {
            return None;
        }
        match self.mode {
            PagingMode::Local => {
                self.page.set_page_size(page_size);
                self.page.recompute(self.visible.len());
                None
            }
            PagingMode::Remote => Some(PageRequest {
                page: 1,
                limit: page_size,
            }),
        }
    }

    // -- Queries --------------------------------------------------------------

    /// Row indices for the current page.
    pub fn page_rows(&self) -> &[usize] {
        match self.mode {
            PagingMode::Local => paginate(&self.visible, &self.page),
            PagingMode::Remote => &self.visible,
        }
    }

    /// Every filtered + sorted row index, unpaged.
    pub fn visible_rows(&self) -> &[usize] {
        &self.visible
    }

    /// Serialize the filtered + sorted rows (all pages) to xlsx bytes.
    pub fn export(&self) -> Result<Vec<u8>, ExportError> {
        export_view(&self.dataset, &self.visible, Some(&self.widths))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn columns(&self) -> &[String] {
        self.dataset.columns()
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn page_state(&self) -> &PageState {
        &self.page
    }

    pub fn mode(&self) -> PagingMode {
        self.mode
    }

    /// Width per column, in column order.
    pub fn widths(&self) -> &[f32] {
        &self.widths
    }

    /// Distinct values of the column at `index`.
    pub fn distinct_values(&self, index: usize) -> &[String] {
        self.distinct.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn source_label(&self) -> Option<&str> {
        self.source_label.as_deref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    // -- Internals ------------------------------------------------------------

    fn rebuild_column_caches(&mut self) {
        self.widths = column_widths(&self.dataset, &self.width_rule);
        self.distinct = self
            .dataset
            .columns()
            .iter()
            .map(|c| distinct_values(&self.dataset, c))
            .collect();
    }

    /// Re-derive the visible rows from the unfiltered dataset.
    fn refresh(&mut self) {
        let kept = filtered_indices(&self.dataset, &self.filters);
        self.visible = sort_indices(&self.dataset, kept, &self.sort);
        if self.mode == PagingMode::Local {
            self.page.recompute(self.visible.len());
        }
    }

    /// Filters or sort changed: rebuild and go back to page 1.
    fn after_order_change(&mut self) -> Option<PageRequest> {
        self.refresh();
        match self.mode {
            PagingMode::Local => {
                self.page.reset();
                None
            }
            PagingMode::Remote => (self.page.current_page() != 1).then(|| PageRequest {
                page: 1,
                limit: self.page.page_size(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::decode::{decode, SourceFormat};
    use crate::data::model::CellValue;
    use crate::data::sort::SortDirection;
    use crate::error::{EmptyDatasetError, ParseError};

    fn controller() -> ViewController {
        ViewController::new(&ViewerConfig::default())
    }

    fn abc() -> Dataset {
        Dataset::from_decoded(decode(SourceFormat::Csv, b"a,b\n1,2\n3,4\n5,6").unwrap()).unwrap()
    }

    fn column(view: &ViewController, name: &str) -> Vec<String> {
        view.page_rows()
            .iter()
            .map(|&i| view.dataset().cell(i, name).unwrap().to_string())
            .collect()
    }

    fn numbered(n: usize) -> Dataset {
        let mut t = vec![vec![CellValue::from("n")]];
        t.extend((0..n).map(|i| vec![CellValue::Integer(i as i64)]));
        Dataset::from_table(t).unwrap()
    }

    #[test]
    fn csv_scenario() {
        let mut view = controller();
        view.load_dataset(abc(), PagingMode::Local);
        assert_eq!(view.columns(), ["a", "b"]);
        assert_eq!(view.visible_rows().len(), 3);

        view.set_filter("a", "3");
        assert_eq!(column(&view, "b"), ["4"]);

        view.toggle_sort("b");
        view.toggle_sort("b");
        assert_eq!(view.sort().direction, SortDirection::Descending);
        assert_eq!(column(&view, "b"), ["4"]);

        view.clear_filters();
        assert_eq!(column(&view, "a"), ["5", "3", "1"]);
    }

    #[test]
    fn relaxing_a_filter_restores_rows() {
        let mut view = controller();
        view.load_dataset(abc(), PagingMode::Local);
        view.set_filter("a", "3");
        view.set_filter("b", "4");
        assert_eq!(view.visible_rows(), [1]);

        view.set_filter("a", "");
        assert_eq!(view.visible_rows(), [1]);
        view.clear_filter("b");
        assert_eq!(view.visible_rows(), [0, 1, 2]);
    }

    #[test]
    fn refilter_keeps_active_sort() {
        let mut view = controller();
        view.load_dataset(abc(), PagingMode::Local);
        view.toggle_sort("a");
        view.toggle_sort("a");
        view.set_filter("a", "5");
        view.set_filter("a", "");
        assert_eq!(column(&view, "a"), ["5", "3", "1"]);
    }

    #[test]
    fn clearing_filters_without_sort_restores_load_order() {
        let mut view = controller();
        view.load_dataset(abc(), PagingMode::Local);
        view.set_filter("b", "6");
        view.clear_filters();
        assert_eq!(view.visible_rows(), [0, 1, 2]);
    }

    #[test]
    fn clearing_sort_restores_filtered_order() {
        let mut view = controller();
        view.load_dataset(numbered(25), PagingMode::Local);
        assert_eq!(view.clear_sort(), None);

        view.toggle_sort("n");
        view.toggle_sort("n");
        view.set_filter("n", "1");
        assert_eq!(view.visible_rows()[0], 21);

        view.set_page(2);
        view.clear_sort();
        assert_eq!(view.sort().column, None);
        assert_eq!(view.visible_rows()[..3], [1, 10, 11]);
        assert_eq!(view.page_state().current_page(), 1);
    }

    #[test]
    fn unknown_columns_are_no_ops() {
        let mut view = controller();
        view.load_dataset(abc(), PagingMode::Local);
        assert_eq!(view.set_filter("zzz", "1"), None);
        view.toggle_sort("zzz");
        assert!(view.filters().is_empty());
        assert_eq!(view.sort().column, None);
    }

    #[test]
    fn paging_clamps_and_resets() {
        let mut view = controller();
        view.load_dataset(numbered(25), PagingMode::Local);
        assert_eq!(view.page_state().total_pages(), 3);

        view.set_page(5);
        assert_eq!(view.page_state().current_page(), 3);
        assert_eq!(view.page_rows().len(), 5);

        view.toggle_sort("n");
        assert_eq!(view.page_state().current_page(), 1);

        view.set_page(2);
        view.set_page_size(0);
        assert_eq!(view.page_state().current_page(), 1);
        assert_eq!(view.page_rows().len(), 25);
        assert_eq!(view.page_state().total_pages(), 1);
    }

    #[test]
    fn filter_shrink_pulls_page_back() {
        let mut view = controller();
        view.load_dataset(numbered(25), PagingMode::Local);
        view.set_page(3);
        view.set_filter("n", "1");
        assert_eq!(view.page_state().current_page(), 1);
        assert_eq!(view.page_state().total_pages(), 2);
    }

    #[test]
    fn new_dataset_clears_filters_and_sort() {
        let mut view = controller();
        view.load_dataset(abc(), PagingMode::Local);
        view.set_filter("a", "1");
        view.toggle_sort("b");
        view.load_dataset(abc(), PagingMode::Local);
        assert!(view.filters().is_empty());
        assert_eq!(*view.sort(), SortSpec::default());
    }

    #[test]
    fn widths_ignore_filtering() {
        let mut view = controller();
        let ds = Dataset::from_table(vec![
            vec!["k".into()],
            vec!["short".into()],
            vec!["x".repeat(25).into()],
        ])
        .unwrap();
        view.load_dataset(ds, PagingMode::Local);
        let before = view.widths().to_vec();
        view.set_filter("k", "short");
        assert_eq!(view.widths(), before.as_slice());
        assert_eq!(before, [250.0]);
    }

    #[test]
    fn stale_loads_are_dropped() {
        let mut view = controller();
        let first = view.begin_load();
        let second = view.begin_load();

        let newer = Loaded::File {
            label: "new.csv".into(),
            dataset: abc(),
        };
        assert_eq!(view.finish_load(second, Ok(newer)), LoadOutcome::Applied);

        let older = Loaded::File {
            label: "old.csv".into(),
            dataset: numbered(3),
        };
        assert_eq!(view.finish_load(first, Ok(older)), LoadOutcome::Stale);
        assert_eq!(view.source_label(), Some("new.csv"));
        assert!(!view.is_loading());
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut view = controller();
        view.load_dataset(abc(), PagingMode::Local);
        let ticket = view.begin_load();
        let err = LoadError::Parse(ParseError::Empty(SourceFormat::Json));
        assert_eq!(view.finish_load(ticket, Err(err)), LoadOutcome::Failed);
        assert_eq!(view.dataset().len(), 3);
        assert!(matches!(view.notice(), Some(Notice::Error(_))));
    }

    #[test]
    fn empty_dataset_is_informational() {
        let mut view = controller();
        view.load_dataset(abc(), PagingMode::Local);
        let ticket = view.begin_load();
        let outcome = view.finish_load(ticket, Err(LoadError::Empty(EmptyDatasetError)));
        assert_eq!(outcome, LoadOutcome::Applied);
        assert!(view.dataset().is_empty());
        assert!(matches!(view.notice(), Some(Notice::Info(_))));
    }

    fn remote_page(names: &[&str], total_pages: usize) -> RemotePage {
        RemotePage {
            rows: names
                .iter()
                .map(|n| vec![("name".to_string(), CellValue::from(*n))])
                .collect(),
            total_pages,
        }
    }

    #[test]
    fn remote_mode_trusts_server_paging() {
        let mut view = controller();
        let ticket = view.begin_load();
        let loaded = Loaded::Remote {
            page: remote_page(&["a", "b", "c"], 4),
            request: PageRequest { page: 1, limit: 2 },
            same_session: false,
        };
        view.finish_load(ticket, Ok(loaded));

        assert_eq!(view.mode(), PagingMode::Remote);
        assert_eq!(view.page_state().total_pages(), 4);
        // No local slicing, even though the server sent more than `limit` rows.
        assert_eq!(view.page_rows().len(), 3);

        assert_eq!(view.set_page(9), Some(PageRequest { page: 4, limit: 2 }));
        assert_eq!(view.page_state().current_page(), 1);
        assert_eq!(view.set_page(1), None);
    }

    #[test]
    fn remote_page_change_keeps_filters() {
        let mut view = controller();
        let t = view.begin_load();
        view.finish_load(
            t,
            Ok(Loaded::Remote {
                page: remote_page(&["ann", "bob"], 3),
                request: PageRequest { page: 1, limit: 10 },
                same_session: false,
            }),
        );
        view.set_filter("name", "o");
        assert_eq!(view.visible_rows(), [1]);

        let request = view.next_page().unwrap();
        let t = view.begin_load();
        view.finish_load(
            t,
            Ok(Loaded::Remote {
                page: remote_page(&["carol", "dave"], 3),
                request,
                same_session: true,
            }),
        );
        assert_eq!(view.page_state().current_page(), 2);
        assert_eq!(view.filters().get("name"), "o");
        assert_eq!(view.visible_rows(), [0]);

        // A filter change on page 2 asks for page 1 again.
        assert_eq!(
            view.set_filter("name", "a"),
            Some(PageRequest { page: 1, limit: 10 })
        );
    }

    #[test]
    fn empty_remote_page_keeps_columns_and_filters() {
        let mut view = controller();
        let t = view.begin_load();
        view.finish_load(
            t,
            Ok(Loaded::Remote {
                page: remote_page(&["ann", "bob"], 3),
                request: PageRequest { page: 1, limit: 10 },
                same_session: false,
            }),
        );
        view.set_filter("name", "o");

        let t = view.begin_load();
        let outcome = view.finish_load(
            t,
            Ok(Loaded::Remote {
                page: remote_page(&[], 3),
                request: PageRequest { page: 3, limit: 10 },
                same_session: true,
            }),
        );
        assert_eq!(outcome, LoadOutcome::Applied);
        assert_eq!(view.columns(), ["name"]);
        assert_eq!(view.filters().get("name"), "o");
        assert_eq!(view.page_state().current_page(), 3);
        assert!(view.page_rows().is_empty());
        assert!(matches!(view.notice(), Some(Notice::Info(_))));
    }

    #[test]
    fn export_uses_all_visible_rows() {
        let mut view = controller();
        view.load_dataset(numbered(25), PagingMode::Local);
        view.set_page(2);
        let bytes = view.export().unwrap();
        let sheet = decode(SourceFormat::Spreadsheet, &bytes).unwrap();
        let exported = Dataset::from_decoded(sheet).unwrap();
        assert_eq!(exported.len(), 25);
        assert_eq!(view.page_state().current_page(), 2);
    }
}
