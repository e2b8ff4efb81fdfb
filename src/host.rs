//! Connects a displayed view tree to the native backend.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, TryRecvError};

use crate::backend::{ControlEvent, HeadlessBackend, NativeId, SharedBackend};
use crate::diagnostics::{default_diagnostics, Diagnostics};
use crate::rect::Rect;
use crate::scheduler::MainScheduler;
use crate::view::{DisplayContext, HandlerMap, IntoViewNode, Retained};

/// Owns the displayed hierarchy, drains control events from the backend,
/// and drives the main scheduling context.
pub struct Host {
    backend: SharedBackend,
    events: Receiver<ControlEvent>,
    scheduler: MainScheduler,
    handlers: Rc<RefCell<HandlerMap>>,
    #[allow(dead_code)]
    retained: Rc<RefCell<Retained>>,
    diagnostics: Rc<dyn Diagnostics>,
    root: NativeId,
}

impl Host {
    /// Displays `root` through `backend` and wires the event receiver.
    pub fn new(
        root: impl IntoViewNode,
        backend: SharedBackend,
        events: Receiver<ControlEvent>,
    ) -> Host {
        Host::with_scheduler(
            root,
            backend,
            events,
            MainScheduler::new(),
            default_diagnostics(),
        )
    }

    /// Full-form constructor with an externally owned scheduler, so
    /// publishers and delayed actions can share the host's scheduling
    /// context.
    pub fn with_scheduler(
        root: impl IntoViewNode,
        backend: SharedBackend,
        events: Receiver<ControlEvent>,
        scheduler: MainScheduler,
        diagnostics: Rc<dyn Diagnostics>,
    ) -> Host {
        let handlers = Rc::new(RefCell::new(BTreeMap::new()));
        let retained = Rc::new(RefCell::new(Retained::default()));
        let mut ctx = DisplayContext::new(
            Rc::clone(&backend),
            Rc::clone(&handlers),
            Rc::clone(&retained),
            scheduler.clone(),
            Rc::clone(&diagnostics),
        );
        let root = root.into_node().display(&mut ctx);

        Host {
            backend,
            events,
            scheduler,
            handlers,
            retained,
            diagnostics,
            root,
        }
    }

    /// Convenience wiring over an in-process backend. Returns the concrete
    /// backend handle alongside the host for inspection and event
    /// injection.
    pub fn headless(root: impl IntoViewNode) -> (Host, Rc<RefCell<HeadlessBackend>>) {
        let (sender, receiver) = unbounded();
        let backend = Rc::new(RefCell::new(HeadlessBackend::new(Some(sender))));
        let shared: SharedBackend = backend.clone();
        (Host::new(root, shared, receiver), backend)
    }

    /// Receives all pending control events and dispatches them to their
    /// registered handlers.
    pub fn poll(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.dispatch(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.diagnostics
                        .warning("host", "event channel disconnected");
                    break;
                }
            }
        }
    }

    fn dispatch(&mut self, event: ControlEvent) {
        let handler = self.handlers.borrow().get(&event.target).cloned();
        match handler {
            Some(handler) => handler.invoke(&event.kind),
            None => self.diagnostics.debug(
                "host",
                &format!("event for unregistered view: {:?}", event.target),
            ),
        }
    }

    /// Advances the scheduling context by `dt`, firing due timers.
    pub fn tick(&mut self, dt: Duration) {
        self.scheduler.advance(dt);
    }

    /// Blocks up to `timeout` (bounded by the next timer deadline) for an
    /// event, then drains the queue and fires elapsed timers.
    pub fn run_once(&mut self, timeout: Duration) {
        let wait = match self.scheduler.next_deadline() {
            Some(deadline) => timeout.min(deadline),
            None => timeout,
        };
        let started = Instant::now();
        match self.events.recv_timeout(wait) {
            Ok(event) => self.dispatch(event),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                self.diagnostics
                    .warning("host", "event channel disconnected");
            }
        }
        self.poll();
        self.scheduler.advance(started.elapsed());
    }

    /// Positions the root view.
    pub fn layout_root(&mut self, frame: Rect) {
        if let Err(err) = self.backend.borrow_mut().set_frame(self.root, frame) {
            self.diagnostics.warning("host", &err.to_string());
        }
    }

    pub fn scheduler(&self) -> &MainScheduler {
        &self.scheduler
    }

    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    pub fn root(&self) -> NativeId {
        self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Point2, Vector2};
    use std::cell::Cell;

    use crate::backend::{
        CollectionOp, ControlEventKind, ListStyle, PropPatch, StackKind, ViewSpec,
    };
    use crate::binding::{Binding, Publisher};
    use crate::collection::IndexPath;
    use crate::controls::{Button, Slider, TextEditor, TextField, Toggle};
    use crate::identity::Eid;
    use crate::modifiers::ModifierExt;
    use crate::rect::EdgeInsets;
    use crate::views::{List, Stack, Text};
    use crate::color::Color;
    use crate::view::IntoViewNode;

    fn find(backend: &Rc<RefCell<HeadlessBackend>>, f: impl Fn(&ViewSpec) -> bool) -> NativeId {
        backend.borrow().find(f).expect("expected a matching view")
    }

    #[test]
    fn button_tap_runs_action() {
        let taps = Rc::new(Cell::new(0));
        let t = Rc::clone(&taps);
        let (mut host, backend) = Host::headless(Button::titled("Tap", move || t.set(t.get() + 1)));

        let button = find(&backend, |spec| *spec == ViewSpec::ButtonView);
        backend.borrow().emit(button, ControlEventKind::Tapped);
        backend.borrow().emit(button, ControlEventKind::Tapped);
        host.poll();

        assert_eq!(taps.get(), 2);
    }

    #[test]
    fn text_change_writes_back_into_binding() {
        let text = Binding::create(String::new());
        let (mut host, backend) = Host::headless(TextField::new("Name", text.clone()));

        let field = find(&backend, |spec| {
            matches!(spec, ViewSpec::TextFieldView { .. })
        });
        backend
            .borrow()
            .emit(field, ControlEventKind::TextChanged("hello".to_string()));
        host.poll();

        assert_eq!(text.value(), Some("hello".to_string()));
        // The write-back also re-synced the native control.
        assert_eq!(
            backend.borrow().node(field).unwrap().text,
            Some("hello".to_string())
        );
    }

    #[test]
    fn binding_update_syncs_native_text() {
        let text = Binding::create("before".to_string());
        let (_host, backend) = Host::headless(TextField::new("Name", text.clone()));

        let field = find(&backend, |spec| {
            matches!(spec, ViewSpec::TextFieldView { .. })
        });
        assert_eq!(
            backend.borrow().node(field).unwrap().text,
            Some("before".to_string())
        );

        text.update("after".to_string());
        assert_eq!(
            backend.borrow().node(field).unwrap().text,
            Some("after".to_string())
        );
    }

    #[test]
    fn toggle_event_updates_binding() {
        let is_on = Binding::create(false);
        let (mut host, backend) = Host::headless(Toggle::new("Notifications", is_on.clone()));

        let switch = find(&backend, |spec| *spec == ViewSpec::SwitchView);
        backend.borrow().emit(switch, ControlEventKind::Toggled(true));
        host.poll();

        assert_eq!(is_on.value(), Some(true));
        assert_eq!(backend.borrow().node(switch).unwrap().toggle, Some(true));
    }

    #[test]
    fn toggle_native_arrangement_is_label_plus_switch() {
        let (_host, backend) = Host::headless(Toggle::new("Dark mode", Binding::create(false)));
        let stack = find(&backend, |spec| {
            matches!(
                spec,
                ViewSpec::Stack {
                    kind: StackKind::Horizontal,
                    ..
                }
            )
        });
        assert_eq!(backend.borrow().node(stack).unwrap().subviews.len(), 2);
    }

    #[test]
    fn slider_event_updates_binding() {
        let value = Binding::create(0.5);
        let (mut host, backend) = Host::headless(Slider::new(value.clone(), 0., 1.));

        let slider = find(&backend, |spec| matches!(spec, ViewSpec::SliderView { .. }));
        backend
            .borrow()
            .emit(slider, ControlEventKind::ValueChanged(0.9));
        host.poll();

        assert_eq!(value.value(), Some(0.9));
    }

    #[test]
    fn debounced_editor_commits_once_per_quiet_period() {
        let (sender, receiver) = unbounded();
        let backend = Rc::new(RefCell::new(HeadlessBackend::new(Some(sender))));
        let shared: SharedBackend = backend.clone();

        let scheduler = MainScheduler::new();
        let text = Publisher::create(String::new())
            .debounce(Duration::from_millis(100), &scheduler);

        let commits = Rc::new(Cell::new(0));
        let c = Rc::clone(&commits);
        let _sub = text.bind(move |_| c.set(c.get() + 1));

        let mut host = Host::with_scheduler(
            TextEditor::new(text.clone()),
            shared,
            receiver,
            scheduler,
            Rc::new(crate::diagnostics::NullDiagnostics),
        );

        let editor = find(&backend, |spec| *spec == ViewSpec::TextEditorView);
        for input in &["h", "he", "hel", "hell", "hello"] {
            backend
                .borrow()
                .emit(editor, ControlEventKind::TextChanged(input.to_string()));
        }
        host.poll();
        assert_eq!(commits.get(), 0, "commit deferred while typing");

        host.tick(Duration::from_millis(100));
        assert_eq!(commits.get(), 1, "one commit with the settled value");
        assert_eq!(text.value(), Some("hello".to_string()));
    }

    #[test]
    fn list_selection_delivers_tapped_item() {
        let items = Binding::create(vec![Eid::new("a"), Eid::new("b")]);
        let selected = Rc::new(RefCell::new(None));
        let s = Rc::clone(&selected);

        let list = List::with_selection(
            items,
            move |item: &Eid| *s.borrow_mut() = Some(item.id.clone()),
            |item| Text::new(item.id.clone()).into_node(),
        );
        let (mut host, backend) = Host::headless(list);

        let view = find(&backend, |spec| {
            matches!(spec, ViewSpec::ListView { style: ListStyle::Plain })
        });
        backend
            .borrow()
            .emit(view, ControlEventKind::RowSelected(IndexPath::new(0, 1)));
        host.poll();

        assert_eq!(*selected.borrow(), Some("b".to_string()));
    }

    #[test]
    fn list_reconciles_item_update_through_backend() {
        let items = Binding::create(vec![Eid::new("A"), Eid::new("B"), Eid::new("C")]);
        let (_host, backend) = Host::headless(List::new(items.clone(), |item| {
            Text::new(item.id.clone()).into_node()
        }));

        let view = find(&backend, |spec| matches!(spec, ViewSpec::ListView { .. }));
        backend.borrow_mut().clear_collection_ops();

        items.update(vec![Eid::new("A"), Eid::new("C"), Eid::new("D")]);

        assert_eq!(
            backend.borrow().collection_ops(),
            &[CollectionOp::Rows {
                view,
                deleted: vec![IndexPath::new(0, 1)],
                inserted: vec![IndexPath::new(0, 2)],
            }]
        );
    }

    #[test]
    fn modifiers_apply_in_registration_order() {
        let (_host, backend) = Host::headless(
            Text::new("styled")
                .padding(EdgeInsets::all(4.))
                .background(Color::YELLOW),
        );

        let label = find(&backend, |spec| matches!(spec, ViewSpec::Label { .. }));
        assert_eq!(
            backend.borrow().node(label).unwrap().patches,
            vec![
                PropPatch::Padding(EdgeInsets::all(4.)),
                PropPatch::Background(Color::YELLOW),
            ]
        );
    }

    #[test]
    fn stack_children_attach_in_order() {
        let (_host, backend) = Host::headless(Stack::vertical(vec![
            Text::new("one").into_node(),
            Text::new("two").into_node(),
            Text::new("three").into_node(),
        ]));

        let stack = find(&backend, |spec| matches!(spec, ViewSpec::Stack { .. }));
        let subviews = backend.borrow().node(stack).unwrap().subviews.clone();
        assert_eq!(subviews.len(), 3);

        let texts: Vec<String> = subviews
            .iter()
            .map(|id| match &backend.borrow().node(*id).unwrap().spec {
                ViewSpec::Label { text } => text.clone(),
                other => panic!("unexpected child spec: {:?}", other),
            })
            .collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn layout_root_positions_the_root_view() {
        let (mut host, backend) = Host::headless(Text::new("root"));
        let frame = Rect::new(Point2::new(0., 0.), Vector2::new(320., 480.));
        host.layout_root(frame);

        assert_eq!(backend.borrow().node(host.root()).unwrap().frame, Some(frame));
    }

    #[test]
    fn run_once_dispatches_already_queued_event() {
        let taps = Rc::new(Cell::new(0));
        let t = Rc::clone(&taps);
        let (mut host, backend) = Host::headless(Button::titled("Go", move || t.set(t.get() + 1)));

        let button = find(&backend, |spec| *spec == ViewSpec::ButtonView);
        backend.borrow().emit(button, ControlEventKind::Tapped);
        host.run_once(Duration::from_millis(50));

        assert_eq!(taps.get(), 1);
    }
}
