//! End-to-end grid behaviour against an in-memory backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use refgrid_lib::backend::CrudBackend;
use refgrid_lib::backend::FallbackBackend;
use refgrid_lib::backend::MemoryBackend;
use refgrid_lib::entities::Hospitals;
use refgrid_lib::entities::Notifications;
use refgrid_lib::error::ApiError;
use refgrid_lib::grid::CellStatus;
use refgrid_lib::grid::EventHub;
use refgrid_lib::grid::FetchOutcome;
use refgrid_lib::grid::Grid;
use refgrid_lib::grid::KeyChord;
use refgrid_lib::grid::Modifiers;
use refgrid_lib::grid::NoticeKind;
use refgrid_lib::grid::Viewport;
use refgrid_lib::model::ColumnDescriptor;
use refgrid_lib::model::Endpoints;
use refgrid_lib::model::Entity;
use refgrid_lib::model::Row;
use refgrid_lib::model::TableId;
use refgrid_lib::model::Value;
use serde_json::json;

/// Minimal two-column table.
struct Items;

impl Entity for Items {
    const TABLE: TableId = TableId::Hospitals;
    const TITLE: &'static str = "Items";
    const ID_FIELD: &'static str = "id";

    fn endpoints() -> Endpoints {
        Endpoints::uniform("items")
    }

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("id", "id", 80),
            ColumnDescriptor::new("name", "name", 120),
        ]
    }

    fn format(raw: &serde_json::Value) -> Row {
        Row::new()
            .set("id", Value::from_json(&raw["id"]))
            .set("name", Value::from_json(&raw["name"]))
    }
}

async fn item_grid(records: Vec<serde_json::Value>) -> (Arc<MemoryBackend>, Grid<Items>) {
    let backend = Arc::new(MemoryBackend::new().with_records(&Items::endpoints(), records));
    let mut grid = Grid::<Items>::new(backend.clone());
    grid.refresh().await;
    (backend, grid)
}

async fn hospital_grid(backend: MemoryBackend) -> (Arc<MemoryBackend>, Grid<Hospitals>) {
    let backend = Arc::new(backend.with_samples::<Hospitals>());
    let mut grid = Grid::<Hospitals>::new(backend.clone());
    grid.refresh().await;
    (backend, grid)
}

fn drag(grid: &mut Grid<Hospitals>, from: &str, column: &str, onto: &[&str]) {
    assert!(grid.pointer_down(from, column));
    for id in onto {
        grid.pointer_enter(id, column);
    }
    grid.pointer_up();
}

fn ids(rows: &[&Row]) -> Vec<String> {
    rows.iter().map(|r| r.id_key("id")).collect()
}

// =============================================================================
// Filter, sort, paginate
// =============================================================================

#[tokio::test]
async fn test_global_filter_case_insensitive() {
    let (_, mut grid) = hospital_grid(MemoryBackend::new()).await;

    grid.set_global_filter("aub");
    assert!(ids(&grid.filtered_rows()).contains(&"1".to_string()));

    grid.set_global_filter("no such hospital");
    assert!(grid.filtered_rows().is_empty());
}

#[tokio::test]
async fn test_column_filter_result_is_subset() {
    let (_, mut grid) = hospital_grid(MemoryBackend::new()).await;

    grid.set_column_filter("type", ["General Hospital", "Private Hospital"]);
    let rows = grid.filtered_rows();
    assert_eq!(ids(&rows), vec!["2", "3"]);
    for row in &rows {
        let t = row.get_display("type");
        assert!(t == "General Hospital" || t == "Private Hospital");
    }
    assert_eq!(grid.active_filter_columns(), vec!["type".to_string()]);

    grid.set_column_filter("type", Vec::<String>::new());
    assert_eq!(grid.filtered_rows().len(), 3);
}

#[tokio::test]
async fn test_sort_stable_and_idempotent() {
    let (_, mut grid) = item_grid(vec![
        json!({"id": 1, "name": "b"}),
        json!({"id": 2, "name": "a"}),
        json!({"id": 3, "name": "b"}),
        json!({"id": 4, "name": "a"}),
    ])
    .await;

    grid.sort_by("name");
    let once = ids(&grid.filtered_rows());
    assert_eq!(once, vec!["2", "4", "1", "3"]);
    assert_eq!(ids(&grid.filtered_rows()), once);
}

#[tokio::test]
async fn test_pagination_and_row_numbers() {
    let records = (1..=25).map(|i| json!({"id": i, "name": format!("item {}", i)})).collect();
    let (_, mut grid) = item_grid(records).await;

    grid.set_page_size(10).unwrap();
    assert_eq!(grid.page_count(), 3);

    grid.last_page();
    assert_eq!(grid.page(), 3);
    assert_eq!(grid.page_rows().len(), 5);
    assert_eq!(grid.row_number(0), 21);
    assert!(!grid.can_next_page());

    grid.next_page();
    assert_eq!(grid.page(), 3);

    grid.set_global_filter("item 1");
    assert_eq!(grid.page(), 2);
}

// =============================================================================
// Drag-fill, history
// =============================================================================

#[tokio::test]
async fn test_drag_fill_two_rows() {
    let (_, mut grid) = hospital_grid(MemoryBackend::new()).await;
    let before = grid.rows().to_vec();

    drag(&mut grid, "1", "type", &["2", "3"]);

    let pending = grid.pending_changes();
    assert_eq!(pending.len(), 2);
    for change in pending.iter() {
        assert_eq!(change.column_id, "type");
        assert_eq!(change.new_value, Value::from("University Hospital"));
    }
    for (old, new) in before.iter().zip(grid.rows()) {
        for (field, value) in old.fields() {
            if field != "type" {
                assert_eq!(new.value(field), value);
            }
        }
    }
    assert_eq!(grid.cell_status("1", "type"), CellStatus::Unset);
    assert_eq!(grid.cell_status("3", "type"), CellStatus::Modified);
}

#[tokio::test]
async fn test_undo_redo_restore_snapshots() {
    let (_, mut grid) = hospital_grid(MemoryBackend::new()).await;
    let loaded = grid.rows().to_vec();

    drag(&mut grid, "1", "type", &["2"]);
    let after_drag = grid.rows().to_vec();

    assert!(grid.undo());
    assert_eq!(grid.rows(), loaded.as_slice());
    assert!(grid.pending_changes().is_empty());

    assert!(grid.redo());
    assert_eq!(grid.rows(), after_drag.as_slice());
    assert_eq!(grid.pending_changes().len(), 1);
    assert_eq!(grid.cell_status("2", "type"), CellStatus::Modified);

    assert!(!grid.redo());
    assert_eq!(grid.notice().unwrap().message, "Nothing to redo");
}

#[tokio::test]
async fn test_new_edit_discards_redo() {
    let (_, mut grid) = hospital_grid(MemoryBackend::new()).await;

    drag(&mut grid, "1", "type", &["2"]);
    grid.undo();
    drag(&mut grid, "3", "type", &["1"]);

    assert!(!grid.can_redo());
    assert!(grid.can_undo());
}

// =============================================================================
// Save
// =============================================================================

#[tokio::test]
async fn test_save_with_partial_failure() {
    let (backend, mut grid) =
        hospital_grid(MemoryBackend::new().fail_updates_for("3", "type")).await;

    drag(&mut grid, "1", "type", &["2", "3"]);
    let summary = grid.save_all().await.unwrap();

    assert_eq!(summary.total(), 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(grid.save_results().len(), 2);
    assert_eq!(grid.pending_changes().len(), 1);
    assert!(grid.pending_changes().contains("3", "type"));
    assert_eq!(
        grid.notice().unwrap().message,
        "Saved 1 changes, but 1 failed. See details."
    );

    let stored = backend.record(&Hospitals::endpoints(), "2").await.unwrap();
    assert_eq!(stored["type"], json!("University Hospital"));
}

#[tokio::test]
async fn test_undo_after_save_keeps_saved_baseline() {
    let (_, mut grid) = hospital_grid(MemoryBackend::new()).await;

    drag(&mut grid, "1", "type", &["2"]);
    grid.save_all().await.unwrap();
    assert!(grid.pending_changes().is_empty());

    // Undoing a saved edit makes the old value a change against the backend.
    grid.undo();
    let change = grid.pending_changes().get("2", "type").unwrap();
    assert_eq!(change.old_value, Value::from("University Hospital"));
    assert_eq!(change.new_value, Value::from("General Hospital"));
}

#[tokio::test]
async fn test_save_shortcut_through_event_hub() {
    let (backend, mut grid) = hospital_grid(MemoryBackend::new()).await;
    let hub = EventHub::new();
    grid.mount(&hub);

    assert!(grid.pointer_down("1", "type"));
    grid.pointer_enter("2", "type");
    hub.pointer_up();
    hub.key(KeyChord::ctrl('s'));

    assert_eq!(grid.pump_events().await, 2);
    assert!(!grid.drag_state().is_dragging());
    assert!(grid.pending_changes().is_empty());
    assert_eq!(backend.update_calls(), 1);

    grid.unmount();
    assert_eq!(hub.listener_count(), 0);
    assert_eq!(grid.pump_events().await, 0);
}

// =============================================================================
// Add, delete
// =============================================================================

#[tokio::test]
async fn test_delete_selected_with_failure() {
    let (_, mut grid) = hospital_grid(MemoryBackend::new().fail_deletes_for("2")).await;

    grid.select_row("1", Modifiers::NONE);
    grid.select_row("3", Modifiers::SHIFT);
    assert_eq!(grid.selected_rows(), vec!["1", "2", "3"]);

    let report = grid.delete_selected().await.unwrap();
    assert_eq!(report.deleted, vec!["1", "3"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(ids(&grid.filtered_rows()), vec!["2"]);
    assert!(grid.selected_rows().is_empty());
    assert_eq!(grid.notice().unwrap().message, "Deleted 2 items, but 1 failed");
}

#[tokio::test]
async fn test_delete_row_drops_its_pending_changes() {
    let (_, mut grid) = hospital_grid(MemoryBackend::new()).await;

    drag(&mut grid, "1", "type", &["2"]);
    grid.delete_row("2").await.unwrap();

    assert!(grid.pending_changes().is_empty());
    assert_eq!(grid.notice().unwrap().message, "Item deleted successfully");
}

#[tokio::test]
async fn test_add_notification() {
    let backend = MemoryBackend::new().with_samples::<Notifications>();
    let mut grid = Grid::<Notifications>::new(backend);
    grid.refresh().await;

    let row = grid
        .add_record(json!({"Title": "Maintenance", "Message": "Down tonight", "RecipientId": 7}))
        .await
        .unwrap();

    assert_eq!(row.get_display("Title"), "Maintenance");
    assert_eq!(row.value("IsRead"), &Value::Bool(false));
    assert_eq!(grid.notice().unwrap().message, "Notification added successfully");
}

// =============================================================================
// Export, rendering
// =============================================================================

#[tokio::test]
async fn test_csv_export() {
    let (_, mut grid) = item_grid(vec![
        json!({"id": 1, "name": "A"}),
        json!({"id": 2, "name": "B,C"}),
    ])
    .await;

    let export = grid.export_csv();
    assert_eq!(export.contents, "\"id\",\"name\"\n\"1\",\"A\"\n\"2\",\"B,C\"");
    assert!(export.filename.starts_with("items-export-"));
    assert!(export.filename.ends_with(".csv"));
    assert_eq!(grid.notice().unwrap().kind, NoticeKind::Success);
}

#[tokio::test]
async fn test_excel_export_skips_hidden_columns() {
    let (_, mut grid) = item_grid(vec![json!({"id": 1, "name": "A & B"})]).await;
    grid.toggle_column_visibility("name").unwrap();

    let export = grid.export_excel();
    assert!(export.filename.ends_with(".xls"));
    assert!(export.contents.contains("<Data ss:Type=\"Number\">1</Data>"));
    assert!(!export.contents.contains("A &amp; B"));
}

#[tokio::test]
async fn test_virtual_window() {
    let records = (1..=200).map(|i| json!({"id": i, "name": "x"})).collect();
    let (_, mut grid) = item_grid(records).await;
    grid.set_page_size(200).unwrap();

    let full = grid.window(Viewport::new(0, 500));
    assert_eq!(full.len(), 200);

    grid.set_virtualization(true);
    let window = grid.window(Viewport::new(0, 500));
    assert!(window.len() < 200);
    assert_eq!(window.range.start, 0);
}

// =============================================================================
// Fallback
// =============================================================================

/// Primary that fails every call the way an unreachable host does.
struct Unreachable;

#[async_trait]
impl CrudBackend for Unreachable {
    async fn list(&self, _: &Endpoints) -> Result<Vec<serde_json::Value>, ApiError> {
        Err(ApiError::Timeout(Duration::from_secs(5)))
    }

    async fn create(
        &self,
        _: &Endpoints,
        _: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        Err(ApiError::Timeout(Duration::from_secs(10)))
    }

    async fn update(
        &self,
        _: &Endpoints,
        _: &str,
        _: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        Err(ApiError::Timeout(Duration::from_secs(10)))
    }

    async fn delete(&self, _: &Endpoints, _: &str) -> Result<(), ApiError> {
        Err(ApiError::Timeout(Duration::from_secs(10)))
    }
}

#[tokio::test]
async fn test_unreachable_backend_serves_samples() {
    let mut grid = Grid::<Hospitals>::new(FallbackBackend::for_entity::<Hospitals>(Unreachable));

    assert_eq!(grid.refresh().await, Some(FetchOutcome::Loaded(3)));

    drag(&mut grid, "1", "type", &["2"]);
    let summary = grid.save_all().await.unwrap();
    assert_eq!(summary.failed, 0);
    assert!(grid.pending_changes().is_empty());
}
