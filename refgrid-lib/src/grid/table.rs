//! The grid controller.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use log::debug;
use log::error;
use log::info;
use log::warn;

use super::changes::CellStatus;
use super::changes::PendingChanges;
use super::changes::SaveResult;
use super::changes::SaveSummary;
use super::config::GridConfig;
use super::config::PAGE_SIZES;
use super::drag::DragState;
use super::events::EventHub;
use super::events::GridEvent;
use super::events::Modifiers;
use super::events::Shortcut;
use super::events::Subscription;
use super::export;
use super::export::Export;
use super::history::History;
use super::notice::Notice;
use super::notice::NoticeKind;
use super::persistence::CellUpdate;
use super::persistence::DeleteBatch;
use super::persistence::DeleteOutcome;
use super::persistence::DeleteReport;
use super::persistence::FetchOutcome;
use super::persistence::FetchRequest;
use super::persistence::SaveBatch;
use super::persistence::SaveOutcome;
use super::pipeline;
use super::pipeline::ViewQuery;
use super::selection::CellSelection;
use super::selection::RowSelection;
use super::virtualize;
use super::virtualize::Viewport;
use super::virtualize::VirtualWindow;
use crate::backend::CrudBackend;
use crate::error::ApiError;
use crate::error::Error;
use crate::model::ColumnDescriptor;
use crate::model::Entity;
use crate::model::Row;
use crate::model::Value;
use crate::settings::LayoutStore;
use crate::settings::RowColorScheme;
use crate::settings::TableSettings;

/// Whether a refresh may go ahead immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDecision {
    Proceed,
    /// Unsaved changes would be lost; ask the user first.
    Confirm,
}

/// A row being edited through the row form.
#[derive(Debug, Clone, PartialEq)]
pub struct RowEdit {
    pub row_id: String,
    pub form: Row,
}

/// A create request for one record.
pub struct AddRequest {
    backend: Arc<dyn CrudBackend>,
    endpoints: crate::model::Endpoints,
    record: serde_json::Value,
}

impl AddRequest {
    pub async fn run(self) -> Result<serde_json::Value, ApiError> {
        self.backend.create(&self.endpoints, self.record).await
    }
}

/// Headless data grid over one entity table.
///
/// The grid owns the live rows and every piece of interaction state around
/// them. Network calls come in two forms: `begin_*` returns a request that
/// can be awaited without borrowing the grid and `finish_*` applies its
/// result, so edits keep queuing while a call is in flight; the async
/// convenience methods (`refresh`, `save_all`, ...) do both in one go.
///
/// # Example
///
/// ```
/// use refgrid_lib::backend::MemoryBackend;
/// use refgrid_lib::entities::Hospitals;
/// use refgrid_lib::grid::Grid;
///
/// # tokio_test_block_on(async {
/// let mut grid = Grid::<Hospitals>::new(MemoryBackend::new().with_samples::<Hospitals>());
/// grid.refresh().await;
/// grid.set_global_filter("aub");
/// assert_eq!(grid.filtered_rows().len(), 1);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub struct Grid<E: Entity> {
    backend: Arc<dyn CrudBackend>,
    config: GridConfig,
    settings: TableSettings,
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Row>,
    /// Rows as last confirmed by the backend.
    baseline: Vec<Row>,
    history: History,
    pending: PendingChanges,
    row_selection: RowSelection,
    cell_selection: CellSelection,
    drag: DragState,
    query: ViewQuery,
    loading: bool,
    notice: Option<Notice>,
    save_results: Vec<SaveResult>,
    editing: Option<RowEdit>,
    subscription: Option<Subscription>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Grid<E> {
    /// Creates an empty grid with the default configuration.
    pub fn new(backend: impl CrudBackend + 'static) -> Self {
        Self::with_config(backend, GridConfig::default())
    }

    /// Creates an empty grid.
    pub fn with_config(backend: impl CrudBackend + 'static, config: GridConfig) -> Self {
        let query = ViewQuery {
            page_size: config.page_size,
            ..ViewQuery::default()
        };
        Self {
            backend: Arc::new(backend),
            config,
            settings: TableSettings::default(),
            columns: E::columns(),
            rows: Vec::new(),
            baseline: Vec::new(),
            history: History::default(),
            pending: PendingChanges::new(),
            row_selection: RowSelection::new(),
            cell_selection: CellSelection::new(),
            drag: DragState::Idle,
            query,
            loading: false,
            notice: None,
            save_results: Vec::new(),
            editing: None,
            subscription: None,
            _entity: PhantomData,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn title(&self) -> &'static str {
        E::TITLE
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Live rows in source order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, row_id: &str) -> Option<&Row> {
        self.row_index(row_id).map(|i| &self.rows[i])
    }

    pub fn pending_changes(&self) -> &PendingChanges {
        &self.pending
    }

    /// Results of the last save batch.
    pub fn save_results(&self) -> &[SaveResult] {
        &self.save_results
    }

    /// Closes the save results view.
    pub fn clear_save_results(&mut self) {
        self.save_results.clear();
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    /// The current notice, unless it has expired.
    pub fn notice(&self) -> Option<&Notice> {
        let now = std::time::Instant::now();
        self.notice.as_ref().filter(|n| !n.is_expired(now))
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// `true` when auto-save is on, changes are pending and nothing is in flight.
    pub fn wants_autosave(&self) -> bool {
        self.settings.auto_save && !self.pending.is_empty() && !self.loading
    }

    fn notify(&mut self, message: impl Into<String>, kind: NoticeKind) {
        self.notice = Some(Notice::new(message, kind, self.config.notice_lifetime));
    }

    fn row_index(&self, row_id: &str) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.id_key(E::ID_FIELD) == row_id)
    }

    // =========================================================================
    // Fetch
    // =========================================================================

    /// Whether a refresh needs the user's confirmation first.
    pub fn request_refresh(&self) -> RefreshDecision {
        if self.settings.confirm_before_refresh && !self.pending.is_empty() {
            RefreshDecision::Confirm
        } else {
            RefreshDecision::Proceed
        }
    }

    /// Starts a fetch. Returns `None` while another call is in flight.
    pub fn begin_fetch(&mut self) -> Option<FetchRequest> {
        if self.loading {
            return None;
        }
        self.loading = true;
        Some(FetchRequest {
            backend: self.backend.clone(),
            endpoints: E::endpoints(),
        })
    }

    /// Replaces the rows with a fetch result.
    ///
    /// A failed fetch leaves the grid empty with an error notice.
    pub fn finish_fetch(
        &mut self,
        result: Result<Vec<serde_json::Value>, ApiError>,
    ) -> FetchOutcome {
        self.loading = false;
        self.drag = DragState::Idle;
        self.editing = None;
        self.pending.clear();
        self.save_results.clear();
        self.row_selection.clear();
        self.cell_selection.clear();

        match result {
            Ok(records) => {
                let rows: Vec<Row> = records.iter().map(E::format).collect();
                let count = rows.len();
                info!("Loaded {} {} records", count, E::TABLE);

                self.history.reset(rows.clone());
                self.baseline = rows.clone();
                self.rows = rows;
                self.notify(format!("Loaded {} items successfully", count), NoticeKind::Success);
                FetchOutcome::Loaded(count)
            }
            Err(e) => {
                error!("Fetching {} failed: {}", E::TABLE, e);

                self.history.reset(Vec::new());
                self.baseline.clear();
                self.rows.clear();
                self.notify(format!("Failed to load data: {}", e), NoticeKind::Error);
                FetchOutcome::Failed
            }
        }
    }

    /// Fetches and applies in one step.
    pub async fn refresh(&mut self) -> Option<FetchOutcome> {
        let request = self.begin_fetch()?;
        let result = request.run().await;
        Some(self.finish_fetch(result))
    }

    // =========================================================================
    // View: filter, sort, paginate
    // =========================================================================

    pub fn set_global_filter(&mut self, text: impl Into<String>) {
        self.query.global_filter = text.into();
    }

    /// Restricts a column to the given values. An empty set removes the filter.
    pub fn set_column_filter<I, S>(&mut self, column: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: std::collections::BTreeSet<String> =
            values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.query.column_filters.remove(column);
        } else {
            self.query.column_filters.insert(column.to_string(), values);
        }
    }

    pub fn clear_column_filters(&mut self) {
        self.query.column_filters.clear();
    }

    pub fn active_filter_columns(&self) -> Vec<String> {
        self.query.active_filter_columns()
    }

    /// Cycles the sort on a column.
    pub fn sort_by(&mut self, column: &str) {
        self.query.toggle_sort(column);
        debug!("Sort is now {:?}", self.query.sort);
    }

    /// Filter choices for a column, drawn from every loaded row.
    pub fn filter_options(&self, column: &str) -> Vec<String> {
        pipeline::filter_options(&self.rows, column)
    }

    /// Rows passing the filters, in sorted order.
    pub fn filtered_rows(&self) -> Vec<&Row> {
        pipeline::filtered(&self.rows, &self.query)
    }

    /// Rows on the current page.
    pub fn page_rows(&self) -> Vec<&Row> {
        let filtered = self.filtered_rows();
        pipeline::paginate(&filtered, self.query.page, self.query.page_size).to_vec()
    }

    pub fn page_count(&self) -> usize {
        pipeline::page_count(self.filtered_rows().len(), self.query.page_size)
    }

    /// Current 1-based page, clamped to the available pages.
    pub fn page(&self) -> usize {
        pipeline::clamp_page(
            self.query.page,
            self.filtered_rows().len(),
            self.query.page_size,
        )
    }

    pub fn page_size(&self) -> usize {
        self.query.page_size
    }

    pub fn set_page(&mut self, page: usize) {
        self.query.page = pipeline::clamp_page(
            page,
            self.filtered_rows().len(),
            self.query.page_size,
        );
        debug!("Page {} of {}", self.query.page, self.page_count());
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page() + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page().saturating_sub(1));
    }

    pub fn first_page(&mut self) {
        self.set_page(1);
    }

    pub fn last_page(&mut self) {
        self.set_page(self.page_count());
    }

    pub fn can_next_page(&self) -> bool {
        self.page() < self.page_count()
    }

    pub fn can_prev_page(&self) -> bool {
        self.page() > 1
    }

    /// Changes the page size and returns to the first page.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), Error> {
        if !PAGE_SIZES.contains(&page_size) {
            return Err(Error::InvalidOperation(format!(
                "page size {} is not one of {:?}",
                page_size, PAGE_SIZES
            )));
        }
        self.query.page_size = page_size;
        self.query.page = 1;
        Ok(())
    }

    /// 1-based position of a page row within the whole filtered set.
    pub fn row_number(&self, index: usize) -> usize {
        (self.page() - 1) * self.query.page_size + index + 1
    }

    // =========================================================================
    // Selection
    // =========================================================================

    fn page_ids(&self) -> Vec<String> {
        self.page_rows()
            .iter()
            .map(|row| row.id_key(E::ID_FIELD))
            .collect()
    }

    /// Applies a click on a row's selector. Shift ranges follow page order.
    pub fn select_row(&mut self, row_id: &str, modifiers: Modifiers) {
        let order = self.page_ids();
        self.row_selection.click(row_id, modifiers, &order);
    }

    pub fn click_cell(&mut self, row_id: &str, column: &str, modifiers: Modifiers) {
        self.cell_selection.click(row_id, column, modifiers);
    }

    pub fn clear_selections(&mut self) {
        self.row_selection.clear();
        self.cell_selection.clear();
    }

    /// Selected row IDs, sorted.
    pub fn selected_rows(&self) -> Vec<String> {
        self.row_selection.selected()
    }

    pub fn is_row_selected(&self, row_id: &str) -> bool {
        self.row_selection.is_selected(row_id)
    }

    pub fn is_cell_selected(&self, row_id: &str, column: &str) -> bool {
        self.cell_selection.is_selected(row_id, column)
    }

    // =========================================================================
    // Drag-fill
    // =========================================================================

    /// Pointer pressed on a cell. Starts a drag if the cell holds a value.
    ///
    /// The identifier column never starts a drag.
    pub fn pointer_down(&mut self, row_id: &str, column: &str) -> bool {
        if column == E::ID_FIELD {
            return false;
        }
        let Some(value) = self.row(row_id).map(|row| row.value(column).clone()) else {
            return false;
        };
        let started = self.drag.begin(&value, column);
        if started {
            debug!("Drag started on {}/{} with {:?}", row_id, column, value);
        }
        started
    }

    /// Pointer entered a cell. Fills the dragged value if the cell is in the
    /// drag column and holds something different.
    pub fn pointer_enter(&mut self, row_id: &str, column: &str) -> bool {
        let Some(value) = self.drag.value_for(column).cloned() else {
            return false;
        };
        let Some(index) = self.row_index(row_id) else {
            return false;
        };

        let current = self.rows[index].value(column).clone();
        if current.to_string() == value.to_string() {
            return false;
        }

        self.pending.upsert(row_id, column, current, value.clone());
        self.rows[index].insert(column, value);
        self.drag.mark_touched();
        true
    }

    /// Pointer released anywhere. Ends the drag and records one history
    /// entry if the gesture changed anything.
    pub fn pointer_up(&mut self) {
        if let Some(touched) = self.drag.end() {
            debug!("Drag ended after changing {} cells", touched);
            if touched > 0 {
                self.history.record(&self.rows);
            }
        }
    }

    // =========================================================================
    // History
    // =========================================================================

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        self.pointer_up();
        match self.history.undo() {
            Some(snapshot) => {
                self.rows = snapshot.to_vec();
                self.resync_pending();
                self.notify("Undo successful", NoticeKind::Info);
                true
            }
            None => {
                self.notify("Nothing to undo", NoticeKind::Info);
                false
            }
        }
    }

    pub fn redo(&mut self) -> bool {
        self.pointer_up();
        match self.history.redo() {
            Some(snapshot) => {
                self.rows = snapshot.to_vec();
                self.resync_pending();
                self.notify("Redo successful", NoticeKind::Info);
                true
            }
            None => {
                self.notify("Nothing to redo", NoticeKind::Info);
                false
            }
        }
    }

    /// Rebuilds pending changes as the delta between the live rows and the
    /// rows last confirmed by the backend.
    fn resync_pending(&mut self) {
        self.pending = PendingChanges::diff(&self.baseline, &self.rows, E::ID_FIELD);
        debug!("{} pending changes after history move", self.pending.len());
    }

    // =========================================================================
    // Save
    // =========================================================================

    /// Starts saving every pending change.
    ///
    /// Returns `None` (with a notice) when there is nothing to save, or while
    /// another call is in flight.
    pub fn begin_save(&mut self) -> Option<SaveBatch> {
        if self.pending.is_empty() {
            self.notify("No changes to save", NoticeKind::Info);
            return None;
        }
        if self.loading {
            return None;
        }
        self.loading = true;
        self.save_results.clear();

        let updates = self
            .pending
            .iter()
            .map(|change| CellUpdate {
                row_id: change.row_id.clone(),
                column_id: change.column_id.clone(),
                value: change.new_value.clone(),
            })
            .collect();

        Some(SaveBatch {
            backend: self.backend.clone(),
            endpoints: E::endpoints(),
            id_field: E::ID_FIELD,
            updates,
        })
    }

    /// Applies the results of a save batch.
    ///
    /// A confirmed cell leaves the pending set only if it was not edited
    /// again while the request was in flight. Rejected cells stay pending.
    pub fn finish_save(&mut self, outcome: SaveOutcome) -> SaveSummary {
        self.loading = false;

        let mut results = Vec::with_capacity(outcome.entries.len());
        for (update, result) in outcome.entries {
            match result {
                Ok(()) => {
                    let unchanged = self
                        .pending
                        .get(&update.row_id, &update.column_id)
                        .is_some_and(|c| c.new_value == update.value);
                    if unchanged {
                        self.pending.remove(&update.row_id, &update.column_id);
                    }
                    if let Some(saved) = self
                        .baseline
                        .iter_mut()
                        .find(|row| row.id_key(E::ID_FIELD) == update.row_id)
                    {
                        saved.insert(update.column_id.clone(), update.value.clone());
                    }
                    results.push(SaveResult::succeeded(&update.row_id, &update.column_id));
                }
                Err(e) => {
                    warn!("Saving {}/{} failed: {}", update.row_id, update.column_id, e);
                    results.push(SaveResult::failed(&update.row_id, &update.column_id, &e));
                }
            }
        }

        let summary = SaveSummary::from_results(&results);
        info!(
            "Saved {} of {} changes to {}",
            summary.succeeded,
            summary.total(),
            E::TABLE
        );
        if summary.failed == 0 {
            self.notify(
                format!("Successfully saved all {} changes", summary.succeeded),
                NoticeKind::Success,
            );
        } else {
            self.notify(
                format!(
                    "Saved {} changes, but {} failed. See details.",
                    summary.succeeded, summary.failed
                ),
                NoticeKind::Info,
            );
        }
        self.save_results = results;
        summary
    }

    /// Saves every pending change in one batch.
    pub async fn save_all(&mut self) -> Option<SaveSummary> {
        let batch = self.begin_save()?;
        let outcome = batch.run().await;
        Some(self.finish_save(outcome))
    }

    // =========================================================================
    // Delete
    // =========================================================================

    fn begin_delete(&mut self, ids: Vec<String>) -> Option<DeleteBatch> {
        if ids.is_empty() || self.loading {
            return None;
        }
        self.loading = true;
        Some(DeleteBatch {
            backend: self.backend.clone(),
            endpoints: E::endpoints(),
            ids,
        })
    }

    /// Starts deleting the selected rows.
    pub fn begin_delete_selected(&mut self) -> Option<DeleteBatch> {
        let ids = self.row_selection.selected();
        self.begin_delete(ids)
    }

    /// Starts deleting one row.
    pub fn begin_delete_row(&mut self, row_id: &str) -> Option<DeleteBatch> {
        self.begin_delete(vec![row_id.to_string()])
    }

    /// Removes the rows the backend confirmed deleted. Rows whose delete
    /// failed stay in place.
    pub fn finish_delete(&mut self, outcome: DeleteOutcome) -> DeleteReport {
        self.loading = false;

        let mut report = DeleteReport::default();
        for (id, result) in outcome.entries {
            match result {
                Ok(()) => {
                    self.rows.retain(|row| row.id_key(E::ID_FIELD) != id);
                    self.baseline.retain(|row| row.id_key(E::ID_FIELD) != id);
                    self.pending.remove_row(&id);
                    self.row_selection.forget(&id);
                    if self.editing.as_ref().is_some_and(|e| e.row_id == id) {
                        self.editing = None;
                    }
                    report.deleted.push(id);
                }
                Err(e) => {
                    warn!("Deleting {} failed: {}", id, e);
                    report.failed.push((id, e.to_string()));
                }
            }
        }

        if !report.deleted.is_empty() {
            self.history.record(&self.rows);
        }
        info!(
            "Deleted {} {} records, {} failed",
            report.deleted.len(),
            E::TABLE,
            report.failed.len()
        );

        let total = report.deleted.len() + report.failed.len();
        match (total, report.failed.len()) {
            (1, 0) => self.notify("Item deleted successfully", NoticeKind::Success),
            (1, _) => self.notify("Failed to delete item", NoticeKind::Error),
            (n, 0) => self.notify(format!("Successfully deleted {} items", n), NoticeKind::Success),
            (_, failed) => self.notify(
                format!(
                    "Deleted {} items, but {} failed",
                    report.deleted.len(),
                    failed
                ),
                NoticeKind::Info,
            ),
        }
        report
    }

    /// Deletes one row.
    pub async fn delete_row(&mut self, row_id: &str) -> Option<DeleteReport> {
        let batch = self.begin_delete_row(row_id)?;
        let outcome = batch.run().await;
        Some(self.finish_delete(outcome))
    }

    /// Deletes every selected row and clears the selection.
    pub async fn delete_selected(&mut self) -> Option<DeleteReport> {
        let batch = self.begin_delete_selected()?;
        let outcome = batch.run().await;
        let report = self.finish_delete(outcome);
        self.clear_selections();
        Some(report)
    }

    // =========================================================================
    // Add
    // =========================================================================

    /// Starts creating a record from raw form values.
    pub fn begin_add(&self, record: serde_json::Value) -> AddRequest {
        AddRequest {
            backend: self.backend.clone(),
            endpoints: E::endpoints(),
            record,
        }
    }

    /// Appends the created record, or reports the failure.
    ///
    /// On failure nothing is appended and the error is returned so the
    /// caller can keep its form open for a retry.
    pub fn finish_add(&mut self, result: Result<serde_json::Value, ApiError>) -> Result<Row, Error> {
        let singular = E::TITLE.strip_suffix('s').unwrap_or(E::TITLE);
        match result {
            Ok(created) => {
                let row = E::format(&created);
                info!("Added {} {}", singular, row.id_key(E::ID_FIELD));
                self.rows.push(row.clone());
                self.baseline.push(row.clone());
                self.history.record(&self.rows);
                self.notify(format!("{} added successfully", singular), NoticeKind::Success);
                Ok(row)
            }
            Err(e) => {
                warn!("Adding {} failed: {}", singular, e);
                self.notify(format!("Failed to add {}: {}", singular, e), NoticeKind::Error);
                Err(e.into())
            }
        }
    }

    /// Creates a record and appends it.
    pub async fn add_record(&mut self, record: serde_json::Value) -> Result<Row, Error> {
        let result = self.begin_add(record).run().await;
        self.finish_add(result)
    }

    // =========================================================================
    // Row editing
    // =========================================================================

    /// Opens the row form on a copy of the row.
    pub fn start_editing(&mut self, row_id: &str) -> Result<(), Error> {
        let row = self
            .row(row_id)
            .cloned()
            .ok_or_else(|| Error::RowNotFound(row_id.to_string()))?;
        self.editing = Some(RowEdit {
            row_id: row_id.to_string(),
            form: row,
        });
        Ok(())
    }

    pub fn editing(&self) -> Option<&RowEdit> {
        self.editing.as_ref()
    }

    /// Changes one field in the row form. The identifier cannot be edited.
    pub fn edit_field(&mut self, field: &str, value: impl Into<Value>) -> Result<(), Error> {
        if field == E::ID_FIELD {
            return Err(Error::InvalidOperation(format!(
                "{} is the identifier and cannot be edited",
                field
            )));
        }
        let edit = self
            .editing
            .as_mut()
            .ok_or_else(|| Error::InvalidOperation("no row is being edited".to_string()))?;
        edit.form.insert(field, value);
        Ok(())
    }

    pub fn cancel_editing(&mut self) {
        self.editing = None;
    }

    /// Sends the whole edited row and applies it once the backend accepts it.
    ///
    /// On failure the form stays open.
    pub async fn save_edit(&mut self) -> Result<(), Error> {
        let edit = self
            .editing
            .clone()
            .ok_or_else(|| Error::InvalidOperation("no row is being edited".to_string()))?;

        let result = self
            .backend
            .update(&E::endpoints(), &edit.row_id, edit.form.to_json())
            .await;

        match result {
            Ok(_) => {
                for rows in [&mut self.rows, &mut self.baseline] {
                    if let Some(row) = rows
                        .iter_mut()
                        .find(|row| row.id_key(E::ID_FIELD) == edit.row_id)
                    {
                        *row = edit.form.clone();
                    }
                }
                self.pending.remove_row(&edit.row_id);
                self.history.record(&self.rows);
                self.editing = None;
                self.notify("Row updated successfully", NoticeKind::Success);
                Ok(())
            }
            Err(e) => {
                warn!("Updating row {} failed: {}", edit.row_id, e);
                self.notify("Failed to update row", NoticeKind::Error);
                Err(e.into())
            }
        }
    }

    // =========================================================================
    // Layout
    // =========================================================================

    pub fn settings(&self) -> &TableSettings {
        &self.settings
    }

    /// Every column, hidden ones included.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn visible_columns(&self) -> Vec<&ColumnDescriptor> {
        self.columns.iter().filter(|c| c.visible).collect()
    }

    /// Resizes a column, never below the configured minimum. Returns the
    /// width applied.
    pub fn resize_column(&mut self, column: &str, width: u32) -> Result<u32, Error> {
        let width = width.max(self.config.min_column_width);
        let descriptor = self
            .columns
            .iter_mut()
            .find(|c| c.accessor == column)
            .ok_or_else(|| Error::InvalidOperation(format!("unknown column {}", column)))?;
        descriptor.width = width;
        self.settings
            .column_widths
            .insert(column.to_string(), width);
        Ok(width)
    }

    /// Shows a hidden column or hides a visible one. Returns the new visibility.
    pub fn toggle_column_visibility(&mut self, column: &str) -> Result<bool, Error> {
        let descriptor = self
            .columns
            .iter_mut()
            .find(|c| c.accessor == column)
            .ok_or_else(|| Error::InvalidOperation(format!("unknown column {}", column)))?;
        descriptor.visible = !descriptor.visible;
        let visible = descriptor.visible;
        self.settings
            .visible_columns
            .insert(column.to_string(), visible);
        Ok(visible)
    }

    pub fn set_row_height(&mut self, height: u32) {
        self.settings.row_height = height.max(1);
    }

    pub fn set_virtualization(&mut self, enabled: bool) {
        self.settings.enable_virtualization = enabled;
    }

    pub fn set_row_color_scheme(&mut self, scheme: RowColorScheme) {
        self.settings.row_color_scheme = scheme;
    }

    pub fn set_auto_save(&mut self, enabled: bool) {
        self.settings.auto_save = enabled;
    }

    pub fn set_confirm_before_refresh(&mut self, enabled: bool) {
        self.settings.confirm_before_refresh = enabled;
    }

    /// Background colour of the page row at `index`.
    pub fn row_background(&self, index: usize, selected: bool) -> &'static str {
        if selected {
            self.settings.row_color_scheme.selected()
        } else {
            self.settings.row_color_scheme.stripe(index)
        }
    }

    /// Replaces the settings and applies column widths and visibility.
    pub fn apply_settings(&mut self, settings: TableSettings) {
        self.columns = E::columns();
        for column in &mut self.columns {
            column.visible = settings.is_visible(&column.accessor);
            if let Some(width) = settings.column_widths.get(&column.accessor) {
                column.width = (*width).max(self.config.min_column_width);
            }
        }
        self.settings = settings;
    }

    /// Loads this table's settings from a store.
    pub async fn load_settings(&mut self, store: &LayoutStore) -> Result<(), Error> {
        let settings = store.load(E::TABLE).await?;
        self.apply_settings(settings);
        Ok(())
    }

    /// Writes this table's settings to a store.
    pub async fn persist_settings(&self, store: &LayoutStore) -> Result<(), Error> {
        store.save(E::TABLE, &self.settings).await?;
        Ok(())
    }

    /// Drops the saved layout and goes back to the default columns and settings.
    pub async fn reset_layout(&mut self, store: &LayoutStore) -> Result<(), Error> {
        store.reset(E::TABLE).await?;
        self.apply_settings(TableSettings::default());
        Ok(())
    }

    // =========================================================================
    // Rendering support
    // =========================================================================

    /// Which page rows to render for a viewport.
    pub fn window(&self, viewport: Viewport) -> VirtualWindow {
        virtualize::window(
            self.page_rows().len(),
            self.settings.row_height,
            viewport,
            self.config.overscan,
            self.settings.enable_virtualization,
        )
    }

    pub fn cell_status(&self, row_id: &str, column: &str) -> CellStatus {
        self.pending.status(row_id, column)
    }

    /// Value to show in a cell. While a drag is active every cell of the
    /// drag column previews the dragged value.
    pub fn display_value(&self, row_id: &str, column: &str) -> Option<Value> {
        if let Some(value) = self.drag.value_for(column) {
            return Some(value.clone());
        }
        self.row(row_id).map(|row| row.value(column).clone())
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Visible columns of the filtered rows as CSV.
    pub fn export_csv(&mut self) -> Export {
        let contents = export::to_csv(&self.visible_columns(), &self.filtered_rows());
        self.notify("Data exported to CSV successfully", NoticeKind::Success);
        Export {
            filename: export::export_filename(E::TITLE, Utc::now().date_naive(), "csv"),
            mime_type: "text/csv;charset=utf-8",
            contents,
        }
    }

    /// Visible columns of the filtered rows as an Excel 2003 XML workbook.
    pub fn export_excel(&mut self) -> Export {
        let contents =
            export::to_spreadsheet_xml(E::TITLE, &self.visible_columns(), &self.filtered_rows());
        self.notify("Data exported to Excel successfully", NoticeKind::Success);
        Export {
            filename: export::export_filename(E::TITLE, Utc::now().date_naive(), "xls"),
            mime_type: "application/vnd.ms-excel",
            contents,
        }
    }

    // =========================================================================
    // Keyboard and global events
    // =========================================================================

    pub async fn handle_shortcut(&mut self, shortcut: Shortcut) {
        match shortcut {
            Shortcut::Undo => {
                self.undo();
            }
            Shortcut::Redo => {
                self.redo();
            }
            Shortcut::Save => {
                self.save_all().await;
            }
        }
    }

    /// Starts listening for window-level pointer and key events.
    pub fn mount(&mut self, hub: &EventHub) {
        self.subscription = Some(hub.subscribe());
    }

    /// Stops listening. A drag in progress is ended.
    pub fn unmount(&mut self) {
        self.subscription = None;
        self.pointer_up();
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Handles every event received since the last call. Returns how many
    /// were handled.
    pub async fn pump_events(&mut self) -> usize {
        let events = match self.subscription.as_mut() {
            Some(subscription) => subscription.drain(),
            None => return 0,
        };

        let count = events.len();
        for event in events {
            match event {
                GridEvent::PointerUp => self.pointer_up(),
                GridEvent::Key(chord) => {
                    if let Some(shortcut) = Shortcut::from_chord(chord) {
                        self.handle_shortcut(shortcut).await;
                    }
                }
            }
        }
        count
    }
}
