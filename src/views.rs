//! Container and leaf views.

use std::rc::Rc;

use crate::action::ActionWith;
use crate::backend::{
    BackendHost, ControlEventKind, GridColumns, ListStyle, NativeId, StackKind, ViewSpec,
};
use crate::binding::Binding;
use crate::collection::{IndexPath, Reconciler, Section};
use crate::identity::Identifiable;
use crate::modifiers::{RowAnimation, RowAnimationModifier};
use crate::rect::{Alignment, Axis};
use crate::view::{ControlHandler, DisplayContext, IntoViewNode, Primitive, ViewNode};

/// Default spacing between arranged subviews.
pub const DEFAULT_SPACING: f64 = 8.0;

// ---- Text ----

#[derive(Debug, Clone)]
pub struct Text {
    content: String,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Text {
        Text {
            content: content.into(),
        }
    }
}

#[derive(Debug)]
struct TextPrimitive {
    content: String,
}

impl Primitive for TextPrimitive {
    fn instantiate(&self, ctx: &mut DisplayContext) -> NativeId {
        ctx.create(&ViewSpec::Label {
            text: self.content.clone(),
        })
    }
}

impl IntoViewNode for Text {
    fn into_node(self) -> ViewNode {
        ViewNode::new(TextPrimitive {
            content: self.content,
        })
    }
}

// ---- Stacks ----

#[derive(Debug)]
pub struct Stack {
    kind: StackKind,
    spacing: f64,
    alignment: Alignment,
    children: Vec<ViewNode>,
}

impl Stack {
    pub fn horizontal(children: Vec<ViewNode>) -> Stack {
        Stack::new(StackKind::Horizontal, children)
    }

    pub fn vertical(children: Vec<ViewNode>) -> Stack {
        Stack::new(StackKind::Vertical, children)
    }

    /// Children stacked on the z axis, last on top.
    pub fn overlay(children: Vec<ViewNode>) -> Stack {
        Stack::new(StackKind::Overlay, children)
    }

    fn new(kind: StackKind, children: Vec<ViewNode>) -> Stack {
        Stack {
            kind,
            spacing: DEFAULT_SPACING,
            alignment: Alignment::Center,
            children,
        }
    }

    pub fn spacing(mut self, spacing: f64) -> Stack {
        self.spacing = spacing;
        self
    }

    pub fn alignment(mut self, alignment: Alignment) -> Stack {
        self.alignment = alignment;
        self
    }
}

#[derive(Debug)]
struct StackPrimitive {
    kind: StackKind,
    spacing: f64,
    alignment: Alignment,
}

impl Primitive for StackPrimitive {
    fn instantiate(&self, ctx: &mut DisplayContext) -> NativeId {
        ctx.create(&ViewSpec::Stack {
            kind: self.kind,
            spacing: self.spacing,
            alignment: self.alignment,
        })
    }
}

impl IntoViewNode for Stack {
    fn into_node(self) -> ViewNode {
        ViewNode::with_children(
            StackPrimitive {
                kind: self.kind,
                spacing: self.spacing,
                alignment: self.alignment,
            },
            self.children,
        )
    }
}

/// Shorthand for [`Stack::horizontal`].
pub fn hstack(children: Vec<ViewNode>) -> Stack {
    Stack::horizontal(children)
}

/// Shorthand for [`Stack::vertical`].
pub fn vstack(children: Vec<ViewNode>) -> Stack {
    Stack::vertical(children)
}

// ---- Spacer / Divider / Image ----

#[derive(Debug, Clone, Default)]
pub struct Spacer;

impl Spacer {
    pub fn new() -> Spacer {
        Spacer
    }
}

#[derive(Debug)]
struct SpacerPrimitive;

impl Primitive for SpacerPrimitive {
    fn instantiate(&self, ctx: &mut DisplayContext) -> NativeId {
        ctx.create(&ViewSpec::SpacerView)
    }
}

impl IntoViewNode for Spacer {
    fn into_node(self) -> ViewNode {
        ViewNode::new(SpacerPrimitive)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Divider;

impl Divider {
    pub fn new() -> Divider {
        Divider
    }
}

#[derive(Debug)]
struct DividerPrimitive;

impl Primitive for DividerPrimitive {
    fn instantiate(&self, ctx: &mut DisplayContext) -> NativeId {
        ctx.create(&ViewSpec::DividerView)
    }
}

impl IntoViewNode for Divider {
    fn into_node(self) -> ViewNode {
        ViewNode::new(DividerPrimitive)
    }
}

#[derive(Debug, Clone)]
pub struct Image {
    name: String,
}

impl Image {
    pub fn new(name: impl Into<String>) -> Image {
        Image { name: name.into() }
    }
}

#[derive(Debug)]
struct ImagePrimitive {
    name: String,
}

impl Primitive for ImagePrimitive {
    fn instantiate(&self, ctx: &mut DisplayContext) -> NativeId {
        ctx.create(&ViewSpec::ImageView {
            name: self.name.clone(),
        })
    }
}

impl IntoViewNode for Image {
    fn into_node(self) -> ViewNode {
        ViewNode::new(ImagePrimitive { name: self.name })
    }
}

// ---- ScrollView ----

#[derive(Debug)]
pub struct ScrollView {
    axis: Axis,
    content: ViewNode,
}

impl ScrollView {
    pub fn new(content: impl IntoViewNode) -> ScrollView {
        ScrollView {
            axis: Axis::Vertical,
            content: content.into_node(),
        }
    }

    pub fn axis(mut self, axis: Axis) -> ScrollView {
        self.axis = axis;
        self
    }
}

#[derive(Debug)]
struct ScrollPrimitive {
    axis: Axis,
}

impl Primitive for ScrollPrimitive {
    fn instantiate(&self, ctx: &mut DisplayContext) -> NativeId {
        ctx.create(&ViewSpec::Scroll { axis: self.axis })
    }
}

impl IntoViewNode for ScrollView {
    fn into_node(self) -> ViewNode {
        ViewNode::with_children(ScrollPrimitive { axis: self.axis }, vec![self.content])
    }
}

// ---- List ----

/// A sectioned list bound to reactive collections.
///
/// The displayed rows stay synchronized with the section binding and each
/// section's item binding through the diffable collection reconciler.
#[derive(Debug)]
pub struct List {
    sections: Binding<Vec<Section>>,
    selection: Option<ActionWith<IndexPath>>,
    style: ListStyle,
    row_animation: Option<Binding<RowAnimation>>,
}

impl List {
    /// A single implicit section over a bound item list.
    pub fn new<T, F>(data: Binding<Vec<T>>, row_content: F) -> List
    where
        T: Identifiable + Clone + 'static,
        F: Fn(&T) -> ViewNode + 'static,
    {
        let section = Section::new(data, row_content);
        List::from_sections(Binding::create(vec![section]))
    }

    /// As [`new`](List::new), invoking `selection` with the tapped item.
    pub fn with_selection<T, S, F>(data: Binding<Vec<T>>, selection: S, row_content: F) -> List
    where
        T: Identifiable + Clone + 'static,
        S: Fn(&T) + 'static,
        F: Fn(&T) -> ViewNode + 'static,
    {
        let items = data.clone();
        let action = ActionWith::new(move |path: IndexPath| {
            if let Some(items) = items.value() {
                if let Some(item) = items.get(path.row) {
                    selection(item);
                }
            }
        });
        let mut list = List::new(data, row_content);
        list.selection = Some(action);
        list
    }

    /// A static list of views, each auto-keyed.
    pub fn from_views(views: Vec<ViewNode>) -> List {
        List::from_section_list(vec![Section::from_views(views)])
    }

    pub fn from_sections(sections: Binding<Vec<Section>>) -> List {
        List {
            sections,
            selection: None,
            style: ListStyle::Plain,
            row_animation: None,
        }
    }

    pub fn from_section_list(sections: Vec<Section>) -> List {
        List::from_sections(Binding::create(sections))
    }

    /// Invokes `selection` with the tapped row's index path.
    pub fn on_select(mut self, selection: ActionWith<IndexPath>) -> List {
        self.selection = Some(selection);
        self
    }

    pub fn list_style(mut self, style: ListStyle) -> List {
        self.style = style;
        self
    }

    pub fn row_animation(mut self, animation: Binding<RowAnimation>) -> List {
        self.row_animation = Some(animation);
        self
    }
}

#[derive(Debug)]
struct ListPrimitive {
    sections: Binding<Vec<Section>>,
    selection: Option<ActionWith<IndexPath>>,
    style: ListStyle,
}

impl Primitive for ListPrimitive {
    fn instantiate(&self, ctx: &mut DisplayContext) -> NativeId {
        let id = ctx.create(&ViewSpec::ListView { style: self.style });
        attach_collection(ctx, id, &self.sections, &self.selection);
        id
    }
}

impl IntoViewNode for List {
    fn into_node(self) -> ViewNode {
        let mut node = ViewNode::new(ListPrimitive {
            sections: self.sections,
            selection: self.selection,
            style: self.style,
        });
        if let Some(animation) = self.row_animation {
            node.push_modifier(Rc::new(RowAnimationModifier::new(animation)));
        }
        node
    }
}

// ---- Grid ----

/// A lazy vertical grid; shares the list's reconciler, so item and section
/// updates apply as the same batched transactions.
#[derive(Debug)]
pub struct Grid {
    sections: Binding<Vec<Section>>,
    selection: Option<ActionWith<IndexPath>>,
    columns: GridColumns,
}

impl Grid {
    pub fn new<T, F>(data: Binding<Vec<T>>, content: F) -> Grid
    where
        T: Identifiable + Clone + 'static,
        F: Fn(&T) -> ViewNode + 'static,
    {
        let section = Section::new(data, content);
        Grid::from_sections(Binding::create(vec![section]))
    }

    pub fn from_sections(sections: Binding<Vec<Section>>) -> Grid {
        Grid {
            sections,
            selection: None,
            columns: GridColumns::Auto,
        }
    }

    pub fn columns(mut self, columns: GridColumns) -> Grid {
        self.columns = columns;
        self
    }

    pub fn on_select(mut self, selection: ActionWith<IndexPath>) -> Grid {
        self.selection = Some(selection);
        self
    }
}

#[derive(Debug)]
struct GridPrimitive {
    sections: Binding<Vec<Section>>,
    selection: Option<ActionWith<IndexPath>>,
    columns: GridColumns,
}

impl Primitive for GridPrimitive {
    fn instantiate(&self, ctx: &mut DisplayContext) -> NativeId {
        let id = ctx.create(&ViewSpec::GridView {
            columns: self.columns,
        });
        attach_collection(ctx, id, &self.sections, &self.selection);
        id
    }
}

impl IntoViewNode for Grid {
    fn into_node(self) -> ViewNode {
        ViewNode::new(GridPrimitive {
            sections: self.sections,
            selection: self.selection,
            columns: self.columns,
        })
    }
}

/// Wires a freshly created list/grid view to its reconciler and selection
/// handler. The reconciler is kept alive with the displayed hierarchy.
fn attach_collection(
    ctx: &mut DisplayContext,
    id: NativeId,
    sections: &Binding<Vec<Section>>,
    selection: &Option<ActionWith<IndexPath>>,
) {
    let host = BackendHost::new(ctx.backend().clone(), id, ctx.diagnostics());
    let reconciler = Reconciler::new(host, ctx.diagnostics());
    reconciler.attach(sections);
    ctx.keep_alive(Rc::new(reconciler));

    if let Some(selection) = selection {
        let selection = selection.clone();
        ctx.register_handler(
            id,
            ControlHandler::new(move |event| {
                if let ControlEventKind::RowSelected(path) = event {
                    selection.execute(*path);
                }
            }),
        );
    }
}
