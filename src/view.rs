//! View descriptors and the display traversal.
//!
//! User code builds a tree of value-typed descriptors; [`ViewNode::display`]
//! turns a descriptor into exactly one native instance through the backend,
//! applies its modifiers in registration order, then recurses into
//! children. Descriptors are cheap to create and carry no native state.

use core::fmt;
use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::{ControlEventKind, NativeId, PropPatch, SharedBackend, ViewSpec};
use crate::cancel::Cancellable;
use crate::diagnostics::Diagnostics;
use crate::rect::Rect;
use crate::scheduler::MainScheduler;

/// A mutable control callback registered for a native view, invoked by the
/// host when the backend reports a control event for that view.
pub struct ControlHandler(Arc<Mutex<dyn FnMut(&ControlEventKind)>>);

impl Clone for ControlHandler {
    fn clone(&self) -> ControlHandler {
        ControlHandler(Arc::clone(&self.0))
    }
}

impl ControlHandler {
    pub fn new<F: FnMut(&ControlEventKind) + 'static>(handler: F) -> ControlHandler {
        ControlHandler(Arc::new(Mutex::new(handler)))
    }

    pub fn invoke(&self, event: &ControlEventKind) {
        let mut handler = self.0.lock();
        (&mut *handler)(event);
    }
}

impl fmt::Debug for ControlHandler {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ControlHandler")
    }
}

pub(crate) type HandlerMap = BTreeMap<NativeId, ControlHandler>;

/// Artifacts the runtime must keep alive for as long as displayed views
/// exist: binding subscriptions made during display, and reconcilers.
#[derive(Default)]
pub(crate) struct Retained {
    pub(crate) subscriptions: crate::cancel::DisposeBag,
    pub(crate) objects: Vec<Rc<dyn Any>>,
}

/// Threaded through the display traversal; gives descriptors access to the
/// backend, the control-handler registry, and the scheduling context.
pub struct DisplayContext {
    backend: SharedBackend,
    handlers: Rc<RefCell<HandlerMap>>,
    retained: Rc<RefCell<Retained>>,
    scheduler: MainScheduler,
    diagnostics: Rc<dyn Diagnostics>,
}

impl DisplayContext {
    pub(crate) fn new(
        backend: SharedBackend,
        handlers: Rc<RefCell<HandlerMap>>,
        retained: Rc<RefCell<Retained>>,
        scheduler: MainScheduler,
        diagnostics: Rc<dyn Diagnostics>,
    ) -> DisplayContext {
        DisplayContext {
            backend,
            handlers,
            retained,
            scheduler,
            diagnostics,
        }
    }

    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    pub fn scheduler(&self) -> &MainScheduler {
        &self.scheduler
    }

    pub fn diagnostics(&self) -> Rc<dyn Diagnostics> {
        Rc::clone(&self.diagnostics)
    }

    /// Creates a native instance from a spec.
    pub fn create(&mut self, spec: &ViewSpec) -> NativeId {
        self.backend.borrow_mut().create_view(spec)
    }

    pub fn add_subview(&mut self, parent: NativeId, child: NativeId) {
        if let Err(err) = self.backend.borrow_mut().add_subview(parent, child) {
            self.diagnostics.warning("display", &err.to_string());
        }
    }

    pub fn set_frame(&mut self, view: NativeId, frame: Rect) {
        if let Err(err) = self.backend.borrow_mut().set_frame(view, frame) {
            self.diagnostics.warning("display", &err.to_string());
        }
    }

    pub fn apply(&mut self, view: NativeId, patch: &PropPatch) {
        if let Err(err) = self.backend.borrow_mut().apply(view, patch) {
            self.diagnostics.warning("display", &err.to_string());
        }
    }

    pub fn set_text(&mut self, view: NativeId, text: &str) {
        if let Err(err) = self.backend.borrow_mut().set_text(view, text) {
            self.diagnostics.warning("display", &err.to_string());
        }
    }

    pub fn set_toggle(&mut self, view: NativeId, on: bool) {
        if let Err(err) = self.backend.borrow_mut().set_toggle(view, on) {
            self.diagnostics.warning("display", &err.to_string());
        }
    }

    pub fn set_slider(&mut self, view: NativeId, value: f64) {
        if let Err(err) = self.backend.borrow_mut().set_slider(view, value) {
            self.diagnostics.warning("display", &err.to_string());
        }
    }

    /// Registers the control callback for a native view, replacing any
    /// previous one.
    pub fn register_handler(&mut self, view: NativeId, handler: ControlHandler) {
        self.handlers.borrow_mut().insert(view, handler);
    }

    /// Ties a subscription's lifetime to the displayed hierarchy.
    pub fn retain(&mut self, subscription: Cancellable) {
        self.retained
            .borrow_mut()
            .subscriptions
            .insert(subscription);
    }

    /// Keeps an object (e.g. a reconciler) alive with the displayed
    /// hierarchy.
    pub fn keep_alive(&mut self, object: Rc<dyn Any>) {
        self.retained.borrow_mut().objects.push(object);
    }
}

/// A native-instance factory for one kind of view.
pub trait Primitive: fmt::Debug {
    fn instantiate(&self, ctx: &mut DisplayContext) -> NativeId;
}

/// A pure transformation applied to a native view after creation, before
/// children are attached. May return a different view (e.g. a wrapper).
pub trait Modifier: fmt::Debug {
    fn modify(&self, view: NativeId, ctx: &mut DisplayContext) -> NativeId;
}

/// A value-typed view descriptor: a primitive, its children, and its
/// modifier chain.
#[derive(Debug, Clone)]
pub struct ViewNode {
    primitive: Rc<dyn Primitive>,
    children: Vec<ViewNode>,
    modifiers: Vec<Rc<dyn Modifier>>,
}

#[derive(Debug)]
struct EmptyPrimitive;

impl Primitive for EmptyPrimitive {
    fn instantiate(&self, ctx: &mut DisplayContext) -> NativeId {
        ctx.create(&ViewSpec::Container)
    }
}

impl ViewNode {
    pub fn new(primitive: impl Primitive + 'static) -> ViewNode {
        ViewNode {
            primitive: Rc::new(primitive),
            children: Vec::new(),
            modifiers: Vec::new(),
        }
    }

    pub fn with_children(primitive: impl Primitive + 'static, children: Vec<ViewNode>) -> ViewNode {
        ViewNode {
            primitive: Rc::new(primitive),
            children,
            modifiers: Vec::new(),
        }
    }

    /// A view that displays nothing.
    pub fn empty() -> ViewNode {
        ViewNode::new(EmptyPrimitive)
    }

    /// Appends a modifier; applied after any already registered.
    pub fn modifier(mut self, modifier: impl Modifier + 'static) -> ViewNode {
        self.modifiers.push(Rc::new(modifier));
        self
    }

    pub(crate) fn push_modifier(&mut self, modifier: Rc<dyn Modifier>) {
        self.modifiers.push(modifier);
    }

    pub fn children(&self) -> &[ViewNode] {
        &self.children
    }

    /// Builds the native view for this descriptor: instantiate, apply
    /// modifiers in order, then attach children to the *original* instance.
    /// Returns the (possibly wrapped) view produced by the modifier chain.
    pub fn display(&self, ctx: &mut DisplayContext) -> NativeId {
        let initial = self.primitive.instantiate(ctx);
        let view = self.apply_modifiers(initial, ctx);
        self.add_children(initial, ctx);
        view
    }

    fn apply_modifiers(&self, mut view: NativeId, ctx: &mut DisplayContext) -> NativeId {
        for modifier in &self.modifiers {
            view = modifier.modify(view, ctx);
        }
        view
    }

    fn add_children(&self, parent: NativeId, ctx: &mut DisplayContext) {
        for child in &self.children {
            let view = child.display(ctx);
            ctx.add_subview(parent, view);
        }
    }
}

/// Conversion of concrete view builders into tree nodes.
pub trait IntoViewNode {
    fn into_node(self) -> ViewNode;
}

impl IntoViewNode for ViewNode {
    fn into_node(self) -> ViewNode {
        self
    }
}
