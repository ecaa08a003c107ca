//! Widget - Construction and lifecycle of a playground instance.
//!
//! [`create_bin`] wires every part together:
//!
//! 1. Inject the process-wide stylesheet (first instance only)
//! 2. Build the layout cells and the preview pipeline
//! 3. Create the three editors, each writing its source cell
//! 4. Install the tab guard, then the presentation and preview effects
//! 5. Attach the pointer listeners
//! 6. Mount and start if a container was given
//!
//! Every step registers its release with the instance's [`Teardown`], which
//! is the only way anything created here goes away.
//!
//! # Example
//!
//! ```ignore
//! use spark_bin::{create_bin, BinConfig};
//! use spark_bin::host::headless::HeadlessHost;
//!
//! let host = HeadlessHost::new();
//! let bin = create_bin(
//!     BinConfig::new().with_container("#bin").with_script("console.log('hi')"),
//!     host.services(),
//! );
//!
//! host.viewport.emit(1280.0);
//! bin.teardown();
//! ```

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::config::BinConfig;
use crate::document::{PreviewMessage, ScriptError};
use crate::events::{ListenerRegistry, PointerEvent, PointerKind, Target};
use crate::host::{EditorRef, HostServices, Surface};
use crate::pipeline::PreviewPipeline;
use crate::reactive::{effect, signal_dedup, Derived, Signal};
use crate::resource::ResourceHandle;
use crate::state::{presentation, Expand, LayoutOptions, LayoutState, Presentation, Tab, SPLIT_PROPERTY};
use crate::styles;
use crate::teardown::Teardown;

/// Custom property for the configured width.
pub const WIDTH_PROPERTY: &str = "--bin-width";
/// Custom property for the configured height.
pub const HEIGHT_PROPERTY: &str = "--bin-height";

/// The editor instances, one per source tab.
pub struct Editors {
    pub markup: EditorRef,
    pub style: EditorRef,
    pub script: EditorRef,
}

impl Editors {
    pub fn get(&self, tab: Tab) -> Option<&EditorRef> {
        match tab {
            Tab::Markup => Some(&self.markup),
            Tab::Style => Some(&self.style),
            Tab::Script => Some(&self.script),
            Tab::Preview => None,
        }
    }
}

/// Handle to a constructed widget.
///
/// Dropping the handle tears the widget down.
pub struct BinHandle {
    teardown: Teardown,
    services: HostServices,
    layout: Rc<LayoutState>,
    pipeline: Rc<PreviewPipeline>,
    presentation: Derived<Presentation>,
    listeners: ListenerRegistry,
    editors: Editors,
    last_error: Signal<Option<ScriptError>>,
    started: Cell<bool>,
}

/// Build a widget from `config` on top of the host's collaborators.
///
/// Never fails: unusable configuration values fall back to defaults.
pub fn create_bin(config: BinConfig, services: HostServices) -> BinHandle {
    styles::ensure_stylesheet(&*services.surface);

    let teardown = Teardown::new();
    let layout = Rc::new(LayoutState::new(LayoutOptions {
        split: config.split_ratio(),
        initial_tab: config.initial_tab(),
        split_mode: config.split_mode,
    }));

    let pipeline = Rc::new(PreviewPipeline::new(
        &config.sources,
        services.store.clone(),
        services.scheduler.clone(),
        config.debounce(),
    ));
    {
        let pipeline = pipeline.clone();
        teardown.add("preview pipeline", move || pipeline.dispose());
    }

    let editors = create_editors(&config, &services, &pipeline);

    if let Some(width) = &config.width {
        services.surface.set_style_property(WIDTH_PROPERTY, width);
    }
    if let Some(height) = &config.height {
        services.surface.set_style_property(HEIGHT_PROPERTY, height);
    }

    // Subscribed to the tab cell ahead of the presentation, so an illegal
    // tab is corrected before anything renders it.
    teardown.add("tab guard", layout.tab_guard().into_cleanup());

    let presentation = presentation(&layout);
    let last_error = signal_dedup(None::<ScriptError>);

    // Presentation effect: classes, labels and the split property.
    {
        let surface = services.surface.clone();
        let presentation = presentation.clone();
        let fx = effect(move || {
            let p = presentation.get();
            surface.apply_presentation(&p);
            surface.set_style_property(SPLIT_PROPERTY, &p.split_value());
        });
        teardown.add("presentation effect", fx.into_cleanup());
    }

    // Preview effect: point the surface at each newly settled preview.
    {
        let surface = services.surface.clone();
        let pipeline = pipeline.clone();
        let last_error = last_error.clone();
        let fx = effect(move || {
            let handle = pipeline.preview_handle();
            surface.set_preview_source(&handle);
            last_error.set(None);
        });
        teardown.add("preview effect", fx.into_cleanup());
    }

    let listeners = ListenerRegistry::new();
    attach_pointer_listeners(&listeners, &layout, &services.surface, &teardown);

    let bin = BinHandle {
        teardown,
        services,
        layout,
        pipeline,
        presentation,
        listeners,
        editors,
        last_error,
        started: Cell::new(false),
    };

    debug!(
        split = bin.layout.split_ratio().get_untracked(),
        tab = %bin.layout.active_tab().get_untracked(),
        split_mode = config.split_mode,
        "widget created"
    );

    if let Some(container) = &config.container {
        bin.services.surface.mount(container);
        bin.start();
    }
    bin
}

fn create_editors(config: &BinConfig, services: &HostServices, pipeline: &PreviewPipeline) -> Editors {
    let create = |tab: Tab| {
        let initial = config.sources.for_tab(tab).unwrap_or_default();
        // Every editor tab has a source cell.
        let source = pipeline.source(tab).cloned();
        let on_change: Rc<dyn Fn(&str)> = Rc::new(move |text: &str| {
            if let Some(source) = &source {
                source.set(text.to_owned());
            }
        });
        services.editors.create_editor(tab, initial, on_change)
    };

    Editors {
        markup: create(Tab::Markup),
        style: create(Tab::Style),
        script: create(Tab::Script),
    }
}

fn attach_pointer_listeners(
    listeners: &ListenerRegistry,
    layout: &Rc<LayoutState>,
    surface: &Rc<dyn Surface>,
    teardown: &Teardown,
) {
    {
        let layout = layout.clone();
        let surface = surface.clone();
        let off = listeners.on(Target::Divider, PointerKind::Down, move |event| {
            layout.pointer_down(event.client_x, surface.root_bounds());
        });
        teardown.add("divider pointer-down", off);
    }

    for kind in [PointerKind::Up, PointerKind::Leave] {
        let layout = layout.clone();
        let off = listeners.on(Target::Document, kind, move |_| layout.pointer_up());
        teardown.add("document pointer release", off);
    }

    {
        let layout = layout.clone();
        let surface = surface.clone();
        let off = listeners.on(Target::Root, PointerKind::Move, move |event| {
            layout.pointer_move(event.client_x, surface.root_bounds());
        });
        teardown.add("root pointer-move", off);
    }
}

impl BinHandle {
    /// The host surface holding the widget root.
    pub fn root(&self) -> &Rc<dyn Surface> {
        &self.services.surface
    }

    pub fn editors(&self) -> &Editors {
        &self.editors
    }

    /// The active tab cell. Hosts may read, observe or write it; writes
    /// that break the tab invariant are corrected immediately.
    pub fn active_tab(&self) -> Signal<Tab> {
        self.layout.active_tab().clone()
    }

    pub fn layout(&self) -> &LayoutState {
        &self.layout
    }

    pub fn pipeline(&self) -> &PreviewPipeline {
        &self.pipeline
    }

    /// Current presentation snapshot.
    pub fn presentation(&self) -> Presentation {
        self.presentation.get_untracked()
    }

    /// Preview handle currently shown.
    pub fn preview_handle(&self) -> Option<ResourceHandle> {
        self.pipeline.live_preview()
    }

    /// Latest script error reported by the current preview.
    pub fn last_error(&self) -> Signal<Option<ScriptError>> {
        self.last_error.clone()
    }

    /// Begin observing the viewport. Idempotent; does nothing after
    /// teardown.
    pub fn start(&self) {
        if self.teardown.is_disposed() {
            debug!("start after teardown ignored");
            return;
        }
        if self.started.replace(true) {
            return;
        }

        let layout = self.layout.clone();
        let stop = self
            .services
            .viewport
            .observe(Rc::new(move |width| layout.resize_viewport(width)));
        self.teardown.add("viewport observer", stop);
        debug!("widget started");
    }

    pub fn is_started(&self) -> bool {
        self.started.get()
    }

    /// Forward a host pointer event. Returns `true` if a listener handled it.
    pub fn dispatch_pointer(&self, target: Target, event: &PointerEvent) -> bool {
        self.listeners.dispatch(target, event)
    }

    /// Select a tab from the tab strip. Returns `false` if rejected.
    pub fn select_tab(&self, tab: Tab) -> bool {
        self.layout.select_tab(tab)
    }

    /// Press an expand button.
    pub fn toggle_expand(&self, side: Expand) {
        self.layout.toggle_expand(side);
    }

    /// Press the reload button.
    pub fn reload_preview(&self) {
        if !self.teardown.is_disposed() {
            self.services.surface.reload_preview();
        }
    }

    /// Handle a message posted by the preview's error bridge. Malformed
    /// messages are logged and ignored.
    pub fn receive_message(&self, raw: &str) -> Option<ScriptError> {
        match PreviewMessage::from_json(raw) {
            Ok(PreviewMessage::Error(err)) => {
                debug!(message = %err.message, line = err.line, column = err.column, "script error");
                self.last_error.set(Some(err.clone()));
                Some(err)
            }
            Err(err) => {
                warn!(%err, "ignoring preview message");
                None
            }
        }
    }

    /// Release everything the widget created. Idempotent.
    pub fn teardown(&self) {
        let released = self.teardown.run();
        if released > 0 {
            debug!(released, "widget torn down");
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.teardown.is_disposed()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::headless::HeadlessHost;
    use crate::state::LayoutFlags;

    fn build(config: BinConfig) -> (HeadlessHost, BinHandle) {
        let host = HeadlessHost::new();
        let bin = create_bin(config, host.services());
        (host, bin)
    }

    #[test]
    fn test_container_mounts_and_starts() {
        let (host, bin) = build(BinConfig::new().with_container("#bin"));
        assert_eq!(host.surface.mounted_in().as_deref(), Some("#bin"));
        assert!(bin.is_started());
        assert_eq!(host.viewport.observer_count(), 1);
    }

    #[test]
    fn test_start_without_container_is_idempotent() {
        let (host, bin) = build(BinConfig::new());
        assert!(!bin.is_started());
        assert_eq!(host.viewport.observer_count(), 0);

        bin.start();
        bin.start();
        assert_eq!(host.viewport.observer_count(), 1);
    }

    #[test]
    fn test_size_properties_applied_verbatim() {
        let (host, _bin) = build(BinConfig::new().with_size("min(100%, 60rem)", "24em"));
        assert_eq!(
            host.surface.property(WIDTH_PROPERTY).as_deref(),
            Some("min(100%, 60rem)")
        );
        assert_eq!(host.surface.property(HEIGHT_PROPERTY).as_deref(), Some("24em"));
    }

    #[test]
    fn test_split_property_tracks_layout() {
        let (host, bin) = build(BinConfig::new().with_container("#bin").with_split(0.6));
        assert_eq!(host.surface.property(SPLIT_PROPERTY).as_deref(), Some("0.6"));

        bin.toggle_expand(Expand::Editors);
        assert_eq!(host.surface.property(SPLIT_PROPERTY).as_deref(), Some("1"));
        bin.toggle_expand(Expand::Editors);
        assert_eq!(host.surface.property(SPLIT_PROPERTY).as_deref(), Some("0.6"));
    }

    #[test]
    fn test_viewport_drives_compact_flag() {
        let (host, _bin) = build(BinConfig::new().with_container("#bin"));
        let flags = || host.surface.presentation().unwrap().flags;
        assert!(flags().contains(LayoutFlags::COMPACT));

        host.viewport.emit(1280.0);
        assert!(!flags().contains(LayoutFlags::COMPACT));
        assert!(!flags().contains(LayoutFlags::PREVIEW_TAB_ENABLED));
    }

    #[test]
    fn test_illegal_tab_never_reaches_surface() {
        let (host, bin) = build(BinConfig::new().with_container("#bin"));
        host.viewport.emit(1200.0);
        let applied = host.surface.presentation_history().len();

        bin.active_tab().set(Tab::Preview);

        assert_eq!(bin.active_tab().get(), Tab::Script);
        let history = host.surface.presentation_history();
        assert!(history.iter().all(|p| p.active_tab != Tab::Preview || p.is_compact()));
        assert!(history[applied..].iter().all(|p| p.active_tab != Tab::Preview));
    }

    #[test]
    fn test_editor_change_writes_source() {
        let (host, bin) = build(BinConfig::new());
        host.editors.editor(Tab::Markup).unwrap().type_text("<h1>hi</h1>");
        assert_eq!(bin.pipeline().markup().get(), "<h1>hi</h1>");
        assert!(bin.pipeline().is_pending());
    }

    #[test]
    fn test_script_error_then_new_preview_clears_it() {
        let (host, bin) = build(BinConfig::new().with_debounce_ms(10));
        let err = bin
            .receive_message(r#"{"type":"error","message":"boom","line":1,"column":5,"stack":[]}"#)
            .unwrap();
        assert_eq!(err.column, 5);
        assert_eq!(bin.last_error().get().map(|e| e.message), Some("boom".into()));

        host.editors.editor(Tab::Script).unwrap().type_text("fixed()");
        host.timers.advance(std::time::Duration::from_millis(10));
        assert_eq!(bin.last_error().get(), None);
    }

    #[test]
    fn test_malformed_message_is_ignored() {
        let (_host, bin) = build(BinConfig::new());
        assert!(bin.receive_message("not json").is_none());
        assert_eq!(bin.last_error().get(), None);
    }

    #[test]
    fn test_reload_button() {
        let (host, bin) = build(BinConfig::new());
        bin.reload_preview();
        assert_eq!(host.surface.reloads(), 1);
        bin.teardown();
        bin.reload_preview();
        assert_eq!(host.surface.reloads(), 1);
    }

    #[test]
    fn test_start_after_teardown_does_nothing() {
        let (host, bin) = build(BinConfig::new());
        bin.teardown();
        bin.start();
        assert!(!bin.is_started());
        assert_eq!(host.viewport.observer_count(), 0);
    }

    #[test]
    fn test_drop_tears_down() {
        let host = HeadlessHost::new();
        {
            let _bin = create_bin(BinConfig::new().with_container("#bin"), host.services());
            assert!(host.store.live() > 0);
        }
        assert_eq!(host.store.live(), 0);
        assert_eq!(host.viewport.observer_count(), 0);
    }
}
