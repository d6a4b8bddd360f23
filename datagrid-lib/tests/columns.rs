use datagrid_lib::columns::{ColumnRegistry, DragController};
use datagrid_lib::error::ColumnError;
use datagrid_lib::events::{ListenerKind, ListenerRegistry};
use datagrid_lib::model::Column;

fn registry() -> ColumnRegistry {
    ColumnRegistry::new(vec![
        Column::new("id", "ID").width(80.0).sticky(true),
        Column::new("name", "Name").width(200.0).sticky(true),
        Column::new("email", "Email"),
        Column::new("age", "Age").width(60.0),
    ])
}

fn fields(registry: &ColumnRegistry) -> Vec<&str> {
    registry.ordered().map(|c| c.field.as_str()).collect()
}

#[test]
fn test_order_keys_then_registration_index() {
    let registry = ColumnRegistry::new(vec![
        Column::new("a", "A").order(2),
        Column::new("b", "B").order(1),
        Column::new("c", "C").order(1),
        Column::new("d", "D").order(0),
    ]);
    assert_eq!(fields(&registry), vec!["d", "b", "c", "a"]);
}

#[test]
fn test_duplicate_columns_are_dropped() {
    let registry = ColumnRegistry::new(vec![
        Column::new("a", "First"),
        Column::new("a", "Second"),
    ]);
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get("a").unwrap().header, "First");
}

#[test]
fn test_reorder_backward_shifts_columns_between() {
    let mut registry = registry();
    registry.reorder("age", "name").unwrap();
    assert_eq!(fields(&registry), vec!["id", "age", "name", "email"]);
}

#[test]
fn test_reorder_forward_shifts_columns_between() {
    let mut registry = registry();
    registry.reorder("id", "email").unwrap();
    assert_eq!(fields(&registry), vec!["name", "email", "id", "age"]);
}

#[test]
fn test_move_before_and_after() {
    let mut registry = registry();
    registry.move_before("age", "id").unwrap();
    assert_eq!(fields(&registry), vec!["age", "id", "name", "email"]);
    registry.move_after("age", "email").unwrap();
    assert_eq!(fields(&registry), vec!["id", "name", "email", "age"]);
}

#[test]
fn test_reorder_unknown_column_fails() {
    let mut registry = registry();
    let err = registry.reorder("missing", "id").unwrap_err();
    assert_eq!(err, ColumnError::unknown("missing"));
    assert_eq!(fields(&registry), vec!["id", "name", "email", "age"]);
}

#[test]
fn test_width_clamps_to_minimum() {
    let mut registry = registry();
    assert_eq!(registry.set_width("email", 10.0).unwrap(), 50.0);
    assert_eq!(registry.set_width("email", -300.0).unwrap(), 50.0);
    assert_eq!(registry.set_width("email", 320.0).unwrap(), 320.0);

    let seeded = ColumnRegistry::new(vec![Column::new("tiny", "Tiny").width(5.0)]);
    assert_eq!(seeded.get("tiny").unwrap().width, 50.0);
}

#[test]
fn test_visibility_keeps_entry_and_order() {
    let mut registry = registry();
    registry.set_visible("name", false).unwrap();
    registry.set_visible("name", false).unwrap();
    assert_eq!(registry.len(), 4);
    let visible: Vec<&str> = registry.visible().iter().map(|c| c.field.as_str()).collect();
    assert_eq!(visible, vec!["id", "email", "age"]);

    registry.set_visible("name", true).unwrap();
    assert_eq!(fields(&registry), vec!["id", "name", "email", "age"]);
}

#[test]
fn test_sticky_offset() {
    let registry = registry();
    assert_eq!(registry.sticky_offset("id"), Some(0.0));
    assert_eq!(registry.sticky_offset("name"), Some(80.0));
    assert_eq!(registry.sticky_offset("email"), None);
    assert_eq!(registry.sticky_offset("missing"), None);
}

#[test]
fn test_column_at_x() {
    let registry = registry();
    assert_eq!(registry.column_at_x(0.0).unwrap().field, "id");
    assert_eq!(registry.column_at_x(80.0).unwrap().field, "name");
    assert_eq!(registry.column_at_x(279.0).unwrap().field, "name");
    assert_eq!(registry.column_at_x(280.0).unwrap().field, "email");
    assert!(registry.column_at_x(10_000.0).is_none());
    assert!(registry.column_at_x(-1.0).is_none());
}

// =============================================================================
// Drag controller
// =============================================================================

#[test]
fn test_resize_clamps_to_minimum() {
    let mut registry = ColumnRegistry::new(vec![Column::new("name", "Name").width(150.0)]);
    let mut drag = DragController::new(ListenerRegistry::new());

    assert!(drag.begin_resize(&registry, "name", 400.0));
    assert_eq!(drag.resize_to(&mut registry, 200.0), Some(50.0));
    assert_eq!(registry.get("name").unwrap().width, 50.0);
    assert_eq!(drag.resize_to(&mut registry, 430.0), Some(180.0));
    assert_eq!(drag.end_resize().as_deref(), Some("name"));
}

#[test]
fn test_resize_listeners_released_on_end() {
    let listeners = ListenerRegistry::new();
    let registry = registry();
    let mut drag = DragController::new(listeners.clone());

    for _ in 0..3 {
        assert!(drag.begin_resize(&registry, "email", 0.0));
        assert!(listeners.is_attached(ListenerKind::PointerMove));
        assert!(listeners.is_attached(ListenerKind::PointerUp));
        drag.end_resize();
        assert_eq!(listeners.active_count(), 0);
    }
}

#[test]
fn test_second_pointer_down_is_ignored() {
    let listeners = ListenerRegistry::new();
    let registry = registry();
    let mut drag = DragController::new(listeners.clone());

    assert!(drag.begin_resize(&registry, "email", 0.0));
    assert!(!drag.begin_resize(&registry, "age", 0.0));
    assert!(!drag.begin_reorder(&registry, "age"));
    assert_eq!(drag.resizing(), Some("email"));
    assert_eq!(listeners.count(ListenerKind::PointerMove), 1);

    drag.cancel();
    assert!(!drag.is_active());
    assert_eq!(listeners.active_count(), 0);
}

#[test]
fn test_reorder_drag_and_drop() {
    let mut registry = registry();
    let mut drag = DragController::new(ListenerRegistry::new());

    assert!(drag.begin_reorder(&registry, "age"));
    drag.drag_over("age");
    assert_eq!(drag.reorder_target(), None);
    drag.drag_over("id");
    assert_eq!(drag.reorder_target(), Some("id"));

    assert!(drag.drop_reorder(&mut registry));
    assert_eq!(fields(&registry), vec!["age", "id", "name", "email"]);
    assert!(!drag.is_active());
}

#[test]
fn test_drop_without_target_clears_markers() {
    let mut registry = registry();
    let mut drag = DragController::new(ListenerRegistry::new());

    drag.begin_reorder(&registry, "age");
    assert!(!drag.drop_reorder(&mut registry));
    assert_eq!(drag.reorder_source(), None);
    assert_eq!(fields(&registry), vec!["id", "name", "email", "age"]);
}
