//! End-to-end scenarios for a playground instance on the headless host.
//!
//! Simulates what a browser host does:
//! - Construct with sources, split and a container
//! - Type into editors, advance the clock, read the published preview
//! - Drag the divider, resize the viewport, switch tabs
//! - Tear down and check every resource, listener and observer is gone
//!
//! Run with: cargo test --test playground_e2e

use std::time::Duration;

use spark_bin::host::headless::HeadlessHost;
use spark_bin::state::{MAX_SPLIT, MIN_SPLIT};
use spark_bin::{
    create_bin, BinConfig, BinHandle, PointerEvent, ResourceHandle, ResourceStore, RootBounds, Tab,
    Target,
};

const WINDOW: Duration = Duration::from_millis(1000);

// =============================================================================
// HELPERS
// =============================================================================

fn scenario() -> (HeadlessHost, BinHandle) {
    let host = HeadlessHost::new();
    let config = BinConfig::new()
        .with_container("#playground")
        .with_script("x")
        .with_style("y")
        .with_markup("z")
        .with_split(0.6);
    let bin = create_bin(config, host.services());
    (host, bin)
}

fn shown_document(host: &HeadlessHost) -> String {
    let handle = host.surface.preview_source().expect("a preview was published");
    host.store.resolve(&handle).expect("shown preview is live")
}

/// Locator following `marker` up to the closing quote.
fn attribute(doc: &str, marker: &str) -> String {
    let start = doc.find(marker).expect("marker present") + marker.len();
    let end = start + doc[start..].find('"').expect("closing quote");
    doc[start..end].to_owned()
}

// =============================================================================
// PREVIEW
// =============================================================================

#[test]
fn initial_document_embeds_sources() {
    let (host, _bin) = scenario();
    let doc = shown_document(&host);

    assert!(doc.contains("\nz\n"));
    let style = attribute(&doc, r#"<link rel="stylesheet" href=""#);
    let script = attribute(&doc, r#"<script type="module" src=""#);
    assert_eq!(host.store.resolve(&ResourceHandle::new(&style)).as_deref(), Some("y"));
    assert_eq!(host.store.resolve(&ResourceHandle::new(&script)).as_deref(), Some("x"));
}

#[test]
fn script_edit_publishes_after_quiet_window() {
    let (host, bin) = scenario();
    let before = host.surface.preview_source().unwrap();

    host.editors
        .editor(Tab::Script)
        .unwrap()
        .type_text("console.log('edited')");

    host.timers.advance(WINDOW - Duration::from_millis(1));
    assert_eq!(host.surface.preview_source().unwrap(), before);
    assert_eq!(bin.preview_handle().unwrap(), before);

    host.timers.advance(Duration::from_millis(1));
    let after = host.surface.preview_source().unwrap();
    assert_ne!(after, before);

    let doc = shown_document(&host);
    let script = attribute(&doc, r#"<script type="module" src=""#);
    assert_eq!(
        host.store.resolve(&ResourceHandle::new(&script)).as_deref(),
        Some("console.log('edited')")
    );
}

#[test]
fn typing_burst_publishes_once() {
    let (host, _bin) = scenario();
    let script = host.editors.editor(Tab::Script).unwrap();

    for text in ["a", "ab", "abc", "abcd"] {
        script.type_text(text);
        host.timers.advance(Duration::from_millis(300));
    }
    assert_eq!(host.surface.preview_history().len(), 1);

    host.timers.advance(WINDOW);
    assert_eq!(host.surface.preview_history().len(), 2);
    let doc = shown_document(&host);
    let src = attribute(&doc, r#"<script type="module" src=""#);
    assert_eq!(host.store.resolve(&ResourceHandle::new(&src)).as_deref(), Some("abcd"));
}

#[test]
fn one_live_handle_per_slot() {
    let (host, _bin) = scenario();
    let style = host.editors.editor(Tab::Style).unwrap();

    for i in 0..5 {
        style.type_text(&format!("p {{ order: {i} }}"));
        host.timers.advance(WINDOW);
    }

    // One style, one script, one preview document.
    assert_eq!(host.store.live(), 3);
}

// =============================================================================
// LAYOUT
// =============================================================================

#[test]
fn divider_drag_stays_in_range() {
    let (host, bin) = scenario();
    host.viewport.emit(1200.0);
    host.surface.set_bounds(RootBounds {
        left: 40.0,
        width: 1200.0,
        divider_width: 6.0,
    });

    assert!(bin.dispatch_pointer(Target::Divider, &PointerEvent::down(400.0)));
    for x in [-10_000.0, 0.0, 640.0, 1_000_000.0] {
        bin.dispatch_pointer(Target::Root, &PointerEvent::moved(x));
        let ratio = bin.layout().split_ratio().get();
        assert!((MIN_SPLIT..=MAX_SPLIT).contains(&ratio), "ratio {ratio} for {x}");
    }
    assert!(bin.presentation().is_resizing());

    bin.dispatch_pointer(Target::Document, &PointerEvent::leave(0.0));
    assert!(!bin.presentation().is_resizing());
    assert_eq!(bin.layout().split_ratio().get(), MAX_SPLIT);
}

#[test]
fn preview_tab_only_in_compact_layout() {
    let (host, bin) = scenario();
    host.viewport.emit(1200.0);
    bin.select_tab(Tab::Style);

    assert!(!bin.select_tab(Tab::Preview));
    assert_eq!(bin.active_tab().get(), Tab::Style);

    host.viewport.emit(480.0);
    assert!(bin.select_tab(Tab::Preview));

    host.viewport.emit(1200.0);
    assert_eq!(bin.active_tab().get(), Tab::Script);
}

#[test]
fn direct_tab_cell_write_is_corrected() {
    let (host, bin) = scenario();
    host.viewport.emit(1200.0);

    let applied = host.surface.presentation_history().len();

    bin.active_tab().set(Tab::Preview);
    assert_eq!(bin.active_tab().get(), Tab::Script);
    let rendered = host.surface.presentation_history();
    assert!(rendered[applied..].iter().all(|p| p.active_tab != Tab::Preview));
    assert_eq!(host.surface.presentation().unwrap().active_tab, Tab::Script);
}

// =============================================================================
// TEARDOWN
// =============================================================================

#[test]
fn teardown_releases_everything_once() {
    let (host, bin) = scenario();
    host.editors.editor(Tab::Markup).unwrap().type_text("<p>pending</p>");
    assert_eq!(host.timers.pending(), 1);

    bin.teardown();
    let revoked = host.store.revoked();
    assert_eq!(host.store.live(), 0);
    assert_eq!(host.timers.pending(), 0);
    assert_eq!(host.viewport.observer_count(), 0);
    assert!(!bin.dispatch_pointer(Target::Divider, &PointerEvent::down(10.0)));

    bin.teardown();
    assert_eq!(host.store.revoked(), revoked);
    assert!(bin.is_torn_down());
}

#[test]
fn no_updates_after_teardown() {
    let (host, bin) = scenario();
    let published = host.surface.preview_history().len();
    bin.teardown();

    host.editors.editor(Tab::Script).unwrap().type_text("late()");
    host.timers.run_all();
    host.viewport.emit(300.0);

    assert_eq!(host.surface.preview_history().len(), published);
    assert_eq!(host.store.live(), 0);
}
