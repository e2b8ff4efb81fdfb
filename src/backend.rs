//! The native toolkit boundary.
//!
//! The runtime never talks to a concrete UI toolkit; it drives a
//! [`NativeBackend`], which creates native instances from [`ViewSpec`]s,
//! applies property patches, positions views, and performs batched
//! list/grid update transactions. Control events flow the other way,
//! through a channel whose sender the backend owns.
//!
//! [`HeadlessBackend`] is an in-process implementation that maintains the
//! native tree as plain data. It backs tests and any host that renders
//! elsewhere.

use core::fmt;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crossbeam::channel::Sender;
use uuid::Uuid;

use crate::collection::{CollectionHost, IndexPath};
use crate::color::{Color, LinearGradient};
use crate::diagnostics::Diagnostics;
use crate::modifiers::{Font, RowAnimation, TextAlignment};
use crate::rect::{Alignment, Axis, EdgeInsets, Rect};

/// An opaque handle to one native view instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NativeId(Uuid);

impl NativeId {
    pub(crate) fn new() -> NativeId {
        NativeId(Uuid::new_v4())
    }
}

/// List presentation styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    Plain,
    Grouped,
}

/// Grid column policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridColumns {
    /// Let the layout derive column count from content size.
    Auto,
    Fixed(usize),
}

/// Shapes drawable by the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    Rectangle,
    RoundedRectangle { radius: f64 },
    Circle,
    Capsule,
}

/// Stack arrangements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    Horizontal,
    Vertical,
    /// Children stacked on the z axis.
    Overlay,
}

/// Describes the native instance to create for a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewSpec {
    Container,
    Label { text: String },
    Stack { kind: StackKind, spacing: f64, alignment: Alignment },
    Scroll { axis: Axis },
    ListView { style: ListStyle },
    GridView { columns: GridColumns },
    ButtonView,
    TextFieldView { placeholder: String },
    TextEditorView,
    SwitchView,
    SliderView { min: f64, max: f64 },
    ImageView { name: String },
    ShapeView { shape: ShapeKind },
    ColorView { color: Color },
    GradientView { gradient: LinearGradient },
    SpacerView,
    DividerView,
}

/// A property mutation applied to an existing native view.
#[derive(Debug, Clone, PartialEq)]
pub enum PropPatch {
    Padding(EdgeInsets),
    Frame { width: Option<f64>, height: Option<f64> },
    Background(Color),
    BackgroundGradient(LinearGradient),
    Foreground(Color),
    Font(Font),
    Opacity(f64),
    CornerRadius(f64),
    Enabled(bool),
    ScrollEnabled(bool),
    LineLimit(usize),
    TextAlignment(TextAlignment),
    RowAnimation(RowAnimation),
}

/// A control event reported by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlEvent {
    pub target: NativeId,
    pub kind: ControlEventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlEventKind {
    Tapped,
    TextChanged(String),
    EditingChanged(bool),
    Committed,
    Toggled(bool),
    ValueChanged(f64),
    RowSelected(IndexPath),
}

/// Errors that may occur when driving the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    NoSuchView(NativeId),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BackendError::NoSuchView(id) => write!(f, "no such native view: {:?}", id),
        }
    }
}

impl std::error::Error for BackendError {}

/// A native toolkit implementation.
pub trait NativeBackend {
    /// Creates exactly one native instance for a spec.
    fn create_view(&mut self, spec: &ViewSpec) -> NativeId;

    fn add_subview(&mut self, parent: NativeId, child: NativeId) -> Result<(), BackendError>;

    /// Positions a view; the "layout" operation of the display contract.
    fn set_frame(&mut self, view: NativeId, frame: Rect) -> Result<(), BackendError>;

    fn apply(&mut self, view: NativeId, patch: &PropPatch) -> Result<(), BackendError>;

    /// Write-down of control state, used to keep native controls in sync
    /// with their bindings.
    fn set_text(&mut self, view: NativeId, text: &str) -> Result<(), BackendError>;
    fn set_toggle(&mut self, view: NativeId, on: bool) -> Result<(), BackendError>;
    fn set_slider(&mut self, view: NativeId, value: f64) -> Result<(), BackendError>;

    /// Whether the view is in a window and safe to update incrementally.
    fn is_attached(&self, view: NativeId) -> bool;

    /// One batched section transaction: delete, insert, then reload.
    fn update_sections(
        &mut self,
        view: NativeId,
        deleted: &[usize],
        inserted: &[usize],
        reloaded: &[usize],
    ) -> Result<(), BackendError>;

    /// One batched row transaction: delete then insert.
    fn update_rows(
        &mut self,
        view: NativeId,
        deleted: &[IndexPath],
        inserted: &[IndexPath],
    ) -> Result<(), BackendError>;

    /// Full reload fallback.
    fn reload_all(&mut self, view: NativeId) -> Result<(), BackendError>;
}

/// The backend handle shared across the runtime.
pub type SharedBackend = Rc<RefCell<dyn NativeBackend>>;

/// Adapts a (backend, list view) pair to the reconciler's
/// [`CollectionHost`] contract. Backend failures on this path are degraded
/// operations, reported through diagnostics rather than propagated.
pub struct BackendHost {
    backend: SharedBackend,
    view: NativeId,
    diagnostics: Rc<dyn Diagnostics>,
}

impl BackendHost {
    pub fn new(backend: SharedBackend, view: NativeId, diagnostics: Rc<dyn Diagnostics>) -> BackendHost {
        BackendHost {
            backend,
            view,
            diagnostics,
        }
    }

    fn report(&self, result: Result<(), BackendError>) {
        if let Err(err) = result {
            self.diagnostics.warning("collection", &err.to_string());
        }
    }
}

impl CollectionHost for BackendHost {
    fn is_attached(&self) -> bool {
        self.backend.borrow().is_attached(self.view)
    }

    fn update_sections(&mut self, deleted: &[usize], inserted: &[usize], reloaded: &[usize]) {
        let result = self
            .backend
            .borrow_mut()
            .update_sections(self.view, deleted, inserted, reloaded);
        self.report(result);
    }

    fn update_rows(&mut self, deleted: &[IndexPath], inserted: &[IndexPath]) {
        let result = self
            .backend
            .borrow_mut()
            .update_rows(self.view, deleted, inserted);
        self.report(result);
    }

    fn reload_all(&mut self) {
        let result = self.backend.borrow_mut().reload_all(self.view);
        self.report(result);
    }
}

/// A recorded collection transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionOp {
    Sections {
        view: NativeId,
        deleted: Vec<usize>,
        inserted: Vec<usize>,
        reloaded: Vec<usize>,
    },
    Rows {
        view: NativeId,
        deleted: Vec<IndexPath>,
        inserted: Vec<IndexPath>,
    },
    ReloadAll {
        view: NativeId,
    },
}

/// One node of the headless native tree.
#[derive(Debug, Clone)]
pub struct NativeNode {
    pub spec: ViewSpec,
    pub subviews: Vec<NativeId>,
    pub frame: Option<Rect>,
    pub patches: Vec<PropPatch>,
    pub text: Option<String>,
    pub toggle: Option<bool>,
    pub slider: Option<f64>,
    pub attached: bool,
}

/// An in-process backend that keeps the native tree as plain data and
/// records collection transactions.
pub struct HeadlessBackend {
    nodes: HashMap<NativeId, NativeNode>,
    collection_ops: Vec<CollectionOp>,
    /// Whether newly created views count as in-window.
    pub default_attached: bool,
    events: Option<Sender<ControlEvent>>,
}

impl HeadlessBackend {
    pub fn new(events: Option<Sender<ControlEvent>>) -> HeadlessBackend {
        HeadlessBackend {
            nodes: HashMap::new(),
            collection_ops: Vec::new(),
            default_attached: true,
            events,
        }
    }

    pub fn node(&self, id: NativeId) -> Option<&NativeNode> {
        self.nodes.get(&id)
    }

    /// The first view whose spec matches the predicate.
    pub fn find<F: Fn(&ViewSpec) -> bool>(&self, f: F) -> Option<NativeId> {
        self.nodes
            .iter()
            .find(|(_, node)| f(&node.spec))
            .map(|(id, _)| *id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn collection_ops(&self) -> &[CollectionOp] {
        &self.collection_ops
    }

    pub fn clear_collection_ops(&mut self) {
        self.collection_ops.clear();
    }

    pub fn set_attached(&mut self, view: NativeId, attached: bool) -> Result<(), BackendError> {
        self.node_mut(view)?.attached = attached;
        Ok(())
    }

    /// Simulates a control event, as a platform shim would.
    pub fn emit(&self, target: NativeId, kind: ControlEventKind) {
        if let Some(events) = &self.events {
            // A send can only fail when the host is gone; there is nobody
            // left to deliver to.
            let _ = events.send(ControlEvent { target, kind });
        }
    }

    fn node_mut(&mut self, id: NativeId) -> Result<&mut NativeNode, BackendError> {
        self.nodes.get_mut(&id).ok_or(BackendError::NoSuchView(id))
    }
}

impl NativeBackend for HeadlessBackend {
    fn create_view(&mut self, spec: &ViewSpec) -> NativeId {
        let id = NativeId::new();
        self.nodes.insert(
            id,
            NativeNode {
                spec: spec.clone(),
                subviews: Vec::new(),
                frame: None,
                patches: Vec::new(),
                text: None,
                toggle: None,
                slider: None,
                attached: self.default_attached,
            },
        );
        id
    }

    fn add_subview(&mut self, parent: NativeId, child: NativeId) -> Result<(), BackendError> {
        if !self.nodes.contains_key(&child) {
            return Err(BackendError::NoSuchView(child));
        }
        self.node_mut(parent)?.subviews.push(child);
        Ok(())
    }

    fn set_frame(&mut self, view: NativeId, frame: Rect) -> Result<(), BackendError> {
        self.node_mut(view)?.frame = Some(frame);
        Ok(())
    }

    fn apply(&mut self, view: NativeId, patch: &PropPatch) -> Result<(), BackendError> {
        self.node_mut(view)?.patches.push(patch.clone());
        Ok(())
    }

    fn set_text(&mut self, view: NativeId, text: &str) -> Result<(), BackendError> {
        self.node_mut(view)?.text = Some(text.to_string());
        Ok(())
    }

    fn set_toggle(&mut self, view: NativeId, on: bool) -> Result<(), BackendError> {
        self.node_mut(view)?.toggle = Some(on);
        Ok(())
    }

    fn set_slider(&mut self, view: NativeId, value: f64) -> Result<(), BackendError> {
        self.node_mut(view)?.slider = Some(value);
        Ok(())
    }

    fn is_attached(&self, view: NativeId) -> bool {
        self.nodes.get(&view).map_or(false, |node| node.attached)
    }

    fn update_sections(
        &mut self,
        view: NativeId,
        deleted: &[usize],
        inserted: &[usize],
        reloaded: &[usize],
    ) -> Result<(), BackendError> {
        if !self.nodes.contains_key(&view) {
            return Err(BackendError::NoSuchView(view));
        }
        self.collection_ops.push(CollectionOp::Sections {
            view,
            deleted: deleted.to_vec(),
            inserted: inserted.to_vec(),
            reloaded: reloaded.to_vec(),
        });
        Ok(())
    }

    fn update_rows(
        &mut self,
        view: NativeId,
        deleted: &[IndexPath],
        inserted: &[IndexPath],
    ) -> Result<(), BackendError> {
        if !self.nodes.contains_key(&view) {
            return Err(BackendError::NoSuchView(view));
        }
        self.collection_ops.push(CollectionOp::Rows {
            view,
            deleted: deleted.to_vec(),
            inserted: inserted.to_vec(),
        });
        Ok(())
    }

    fn reload_all(&mut self, view: NativeId) -> Result<(), BackendError> {
        if !self.nodes.contains_key(&view) {
            return Err(BackendError::NoSuchView(view));
        }
        self.collection_ops.push(CollectionOp::ReloadAll { view });
        Ok(())
    }
}
