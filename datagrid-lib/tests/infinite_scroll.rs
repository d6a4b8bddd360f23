use std::time::{Duration, Instant};

use datagrid_lib::viewport::{
    InfiniteScroll, LoadFlags, LoadState, MAX_LOAD_DEBOUNCE, ScrollDirection, ScrollMetrics,
};

const DEBOUNCE: Duration = Duration::from_millis(100);

fn metrics(scroll_offset: f64) -> ScrollMetrics {
    ScrollMetrics {
        scroll_offset,
        viewport_height: 400.0,
        content_height: 2000.0,
    }
}

fn ready() -> LoadFlags {
    LoadFlags {
        has_more: true,
        loading: false,
    }
}

#[test]
fn test_request_fires_after_debounce() {
    let start = Instant::now();
    let mut controller = InfiniteScroll::new(200.0, DEBOUNCE);

    assert_eq!(controller.on_scroll(metrics(1500.0), ready(), start), ScrollDirection::Down);
    assert_eq!(controller.next_deadline(), Some(start + DEBOUNCE));
    assert!(!controller.poll(ready(), start + Duration::from_millis(50)));
    assert!(controller.poll(ready(), start + DEBOUNCE));
    assert_eq!(controller.state(), LoadState::Requesting);
    assert_eq!(controller.next_deadline(), None);
}

#[test]
fn test_burst_coalesces_into_one_request() {
    let start = Instant::now();
    let mut controller = InfiniteScroll::new(200.0, DEBOUNCE);

    for step in 0..5u64 {
        let now = start + Duration::from_millis(step * 30);
        controller.on_scroll(metrics(1420.0 + step as f64 * 10.0), ready(), now);
    }
    let last = start + Duration::from_millis(120);
    assert!(!controller.poll(ready(), last + Duration::from_millis(99)));
    assert!(controller.poll(ready(), last + DEBOUNCE));
    assert!(!controller.poll(ready(), last + DEBOUNCE * 3));
}

#[test]
fn test_far_from_bottom_does_not_arm() {
    let mut controller = InfiniteScroll::new(200.0, DEBOUNCE);
    controller.on_scroll(metrics(500.0), ready(), Instant::now());
    assert_eq!(controller.next_deadline(), None);
}

#[test]
fn test_upward_scroll_does_not_arm() {
    let start = Instant::now();
    let mut controller = InfiniteScroll::new(200.0, DEBOUNCE);
    controller.on_scroll(metrics(1600.0), ready(), start);
    assert!(controller.poll(ready(), start + DEBOUNCE));
    controller.loading_changed(false);

    let direction = controller.on_scroll(metrics(1500.0), ready(), start + DEBOUNCE);
    assert_eq!(direction, ScrollDirection::Up);
    assert_eq!(controller.next_deadline(), None);
}

#[test]
fn test_no_request_without_more_rows_or_while_loading() {
    let start = Instant::now();
    let mut controller = InfiniteScroll::new(200.0, DEBOUNCE);

    let exhausted = LoadFlags { has_more: false, loading: false };
    controller.on_scroll(metrics(1500.0), exhausted, start);
    assert_eq!(controller.next_deadline(), None);

    let loading = LoadFlags { has_more: true, loading: true };
    controller.on_scroll(metrics(1550.0), loading, start);
    assert_eq!(controller.next_deadline(), None);
}

#[test]
fn test_conditions_rechecked_when_deadline_passes() {
    let start = Instant::now();
    let mut controller = InfiniteScroll::new(200.0, DEBOUNCE);
    controller.on_scroll(metrics(1500.0), ready(), start);

    let loading = LoadFlags { has_more: true, loading: true };
    assert!(!controller.poll(loading, start + DEBOUNCE));
    assert_eq!(controller.state(), LoadState::Idle);
}

#[test]
fn test_requesting_blocks_until_loading_clears() {
    let start = Instant::now();
    let mut controller = InfiniteScroll::new(200.0, DEBOUNCE);
    controller.on_scroll(metrics(1500.0), ready(), start);
    assert!(controller.poll(ready(), start + DEBOUNCE));

    controller.on_scroll(metrics(1550.0), ready(), start + DEBOUNCE);
    assert_eq!(controller.next_deadline(), None);

    controller.loading_changed(true);
    assert_eq!(controller.state(), LoadState::Requesting);
    controller.loading_changed(false);
    assert_eq!(controller.state(), LoadState::Idle);

    controller.on_scroll(metrics(1590.0), ready(), start + DEBOUNCE * 2);
    assert!(controller.poll(ready(), start + DEBOUNCE * 3));
}

#[test]
fn test_cancel_disarms() {
    let start = Instant::now();
    let mut controller = InfiniteScroll::new(200.0, DEBOUNCE);
    controller.on_scroll(metrics(1500.0), ready(), start);
    controller.cancel();
    assert!(!controller.poll(ready(), start + DEBOUNCE));
}

#[test]
fn test_debounce_is_clamped() {
    let start = Instant::now();
    let mut controller = InfiniteScroll::new(200.0, Duration::MAX);
    assert_eq!(controller.debounce(), MAX_LOAD_DEBOUNCE);

    controller.on_scroll(metrics(1500.0), ready(), start);
    assert_eq!(controller.next_deadline(), Some(start + MAX_LOAD_DEBOUNCE));
}

#[test]
fn test_rewind_forgets_last_offset() {
    let start = Instant::now();
    let mut controller = InfiniteScroll::new(200.0, DEBOUNCE);
    controller.on_scroll(metrics(1500.0), ready(), start);
    controller.rewind();
    assert_eq!(controller.next_deadline(), None);

    let direction = controller.on_scroll(metrics(1500.0), ready(), start);
    assert_eq!(direction, ScrollDirection::Down);
    assert!(controller.next_deadline().is_some());
}
