use datagrid_lib::viewport::{ViewportState, VisibleWindow};

fn viewport(scroll_offset: f64) -> ViewportState {
    ViewportState {
        scroll_offset,
        ..ViewportState::new(40.0, 400.0, 2)
    }
}

#[test]
fn test_window_mid_list() {
    let window = viewport(4000.0).window(1000);
    assert_eq!(window.first_visible, 100);
    assert_eq!(window.visible_count, 10);
    assert_eq!(window.start_index(), 98);
    assert_eq!(window.end_index(), Some(112));
    assert_eq!(window.top_spacer, 98.0 * 40.0);
    assert_eq!(window.bottom_spacer, (1000.0 - 112.0 - 1.0) * 40.0);
}

#[test]
fn test_window_at_top() {
    let window = viewport(0.0).window(1000);
    assert_eq!(window.start_index(), 0);
    assert_eq!(window.end_index(), Some(12));
    assert_eq!(window.top_spacer, 0.0);
}

#[test]
fn test_window_clamps_to_last_row() {
    let window = viewport(39_600.0).window(1000);
    assert_eq!(window.end_index(), Some(999));
    assert_eq!(window.bottom_spacer, 0.0);
    assert_eq!(window.start_index(), 988);
}

#[test]
fn test_window_with_fewer_rows_than_viewport() {
    let window = viewport(0.0).window(3);
    assert_eq!(window.rows, 0..3);
    assert_eq!(window.top_spacer + window.bottom_spacer, 0.0);
}

#[test]
fn test_window_scrolled_past_shrunken_content() {
    // Rows removed by a filter while scrolled far down.
    let window = viewport(40_000.0).window(5);
    assert!(window.start_index() <= window.end_index().unwrap());
    assert_eq!(window.end_index(), Some(4));
    let height = window.top_spacer + window.len() as f64 * 40.0 + window.bottom_spacer;
    assert_eq!(height, 5.0 * 40.0);
}

#[test]
fn test_empty_rows() {
    let window = viewport(0.0).window(0);
    assert!(window.is_empty());
    assert_eq!(window.end_index(), None);
}

#[test]
fn test_full_window() {
    let window = VisibleWindow::full(7);
    assert_eq!(window.rows, 0..7);
    assert_eq!(window.end_index(), Some(6));
}

#[test]
fn test_offset_to_reveal() {
    let viewport = viewport(400.0);
    // Already visible.
    assert_eq!(viewport.offset_to_reveal(12), 400.0);
    // Above the viewport.
    assert_eq!(viewport.offset_to_reveal(3), 120.0);
    // Below: align bottom edge.
    assert_eq!(viewport.offset_to_reveal(30), 31.0 * 40.0 - 400.0);
}

#[test]
fn test_clamped_offset_and_index_at() {
    let viewport = viewport(0.0);
    assert_eq!(viewport.clamped_offset(-50.0, 100), 0.0);
    assert_eq!(viewport.clamped_offset(1e9, 100), 100.0 * 40.0 - 400.0);
    assert_eq!(viewport.clamped_offset(f64::NAN, 100), 0.0);

    assert_eq!(viewport.index_at(85.0, 100), Some(2));
    assert_eq!(viewport.index_at(85.0, 2), None);
}
