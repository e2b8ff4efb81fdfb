//! Interactive controls.
//!
//! Each control wires two directions at display time: the binding's updates
//! are written down into the native view, and native control events are
//! written back into the originating binding, which re-triggers
//! propagation through the graph.

use crate::action::{Action, ActionWith};
use crate::backend::{ControlEventKind, NativeId, StackKind, ViewSpec};
use crate::binding::{Binding, Publisher};
use crate::rect::Alignment;
use crate::view::{ControlHandler, DisplayContext, IntoViewNode, Primitive, ViewNode};
use crate::views::{Text, DEFAULT_SPACING};

// ---- Button ----

#[derive(Debug)]
pub struct Button {
    label: ViewNode,
    action: Action,
}

impl Button {
    pub fn new<F: Fn() + 'static>(label: impl IntoViewNode, action: F) -> Button {
        Button {
            label: label.into_node(),
            action: Action::new(move |()| action()),
        }
    }

    pub fn titled<F: Fn() + 'static>(title: &str, action: F) -> Button {
        Button::new(Text::new(title), action)
    }
}

#[derive(Debug)]
struct ButtonPrimitive {
    action: Action,
}

impl Primitive for ButtonPrimitive {
    fn instantiate(&self, ctx: &mut DisplayContext) -> NativeId {
        let id = ctx.create(&ViewSpec::ButtonView);
        let action = self.action.clone();
        ctx.register_handler(
            id,
            ControlHandler::new(move |event| {
                if let ControlEventKind::Tapped = event {
                    action.run();
                }
            }),
        );
        id
    }
}

impl IntoViewNode for Button {
    fn into_node(self) -> ViewNode {
        ViewNode::with_children(ButtonPrimitive { action: self.action }, vec![self.label])
    }
}

// ---- TextField ----

#[derive(Debug)]
pub struct TextField {
    placeholder: String,
    text: Binding<String>,
    on_editing_changed: Option<ActionWith<bool>>,
    on_commit: Option<Action>,
}

impl TextField {
    pub fn new(placeholder: impl Into<String>, text: Binding<String>) -> TextField {
        TextField {
            placeholder: placeholder.into(),
            text,
            on_editing_changed: None,
            on_commit: None,
        }
    }

    /// Invoked with `true` when editing begins and `false` when it ends.
    pub fn on_editing_changed<F: Fn(bool) + 'static>(mut self, f: F) -> TextField {
        self.on_editing_changed = Some(ActionWith::new(f));
        self
    }

    /// Invoked when the user commits the field (return key).
    pub fn on_commit<F: Fn() + 'static>(mut self, f: F) -> TextField {
        self.on_commit = Some(Action::new(move |()| f()));
        self
    }
}

#[derive(Debug)]
struct TextFieldPrimitive {
    placeholder: String,
    text: Binding<String>,
    on_editing_changed: Option<ActionWith<bool>>,
    on_commit: Option<Action>,
}

impl Primitive for TextFieldPrimitive {
    fn instantiate(&self, ctx: &mut DisplayContext) -> NativeId {
        let id = ctx.create(&ViewSpec::TextFieldView {
            placeholder: self.placeholder.clone(),
        });

        if let Some(current) = self.text.value() {
            ctx.set_text(id, &current);
        }
        let backend = ctx.backend().clone();
        let diagnostics = ctx.diagnostics();
        let subscription = self.text.bind(move |text: &String| {
            if let Err(err) = backend.borrow_mut().set_text(id, text) {
                diagnostics.warning("control", &err.to_string());
            }
        });
        ctx.retain(subscription);

        let text = self.text.clone();
        let editing = self.on_editing_changed.clone();
        let commit = self.on_commit.clone();
        ctx.register_handler(
            id,
            ControlHandler::new(move |event| match event {
                ControlEventKind::TextChanged(value) => text.update(value.clone()),
                ControlEventKind::EditingChanged(flag) => {
                    if let Some(editing) = &editing {
                        editing.execute(*flag);
                    }
                }
                ControlEventKind::Committed => {
                    if let Some(commit) = &commit {
                        commit.run();
                    }
                }
                _ => {}
            }),
        );
        id
    }
}

impl IntoViewNode for TextField {
    fn into_node(self) -> ViewNode {
        ViewNode::new(TextFieldPrimitive {
            placeholder: self.placeholder,
            text: self.text,
            on_editing_changed: self.on_editing_changed,
            on_commit: self.on_commit,
        })
    }
}

// ---- TextEditor ----

/// A multi-line text control backed by a [`Publisher`], so rapid keystroke
/// updates can be debounced before they propagate.
#[derive(Debug)]
pub struct TextEditor {
    text: Publisher<String>,
}

impl TextEditor {
    pub fn new(text: Publisher<String>) -> TextEditor {
        TextEditor { text }
    }
}

#[derive(Debug)]
struct TextEditorPrimitive {
    text: Publisher<String>,
}

impl Primitive for TextEditorPrimitive {
    fn instantiate(&self, ctx: &mut DisplayContext) -> NativeId {
        let id = ctx.create(&ViewSpec::TextEditorView);

        if let Some(current) = self.text.value() {
            ctx.set_text(id, &current);
        }
        let backend = ctx.backend().clone();
        let diagnostics = ctx.diagnostics();
        let subscription = self.text.bind(move |text: &String| {
            if let Err(err) = backend.borrow_mut().set_text(id, text) {
                diagnostics.warning("control", &err.to_string());
            }
        });
        ctx.retain(subscription);

        let text = self.text.clone();
        ctx.register_handler(
            id,
            ControlHandler::new(move |event| {
                if let ControlEventKind::TextChanged(value) = event {
                    text.update(value.clone());
                }
            }),
        );
        id
    }
}

impl IntoViewNode for TextEditor {
    fn into_node(self) -> ViewNode {
        ViewNode::new(TextEditorPrimitive { text: self.text })
    }
}

// ---- Toggle ----

#[derive(Debug)]
pub struct Toggle {
    is_on: Binding<bool>,
    label: ViewNode,
}

impl Toggle {
    pub fn new(title: &str, is_on: Binding<bool>) -> Toggle {
        Toggle::with_label(is_on, Text::new(title).into_node())
    }

    pub fn with_label(is_on: Binding<bool>, label: ViewNode) -> Toggle {
        Toggle { is_on, label }
    }
}

#[derive(Debug)]
struct TogglePrimitive {
    is_on: Binding<bool>,
    label: ViewNode,
}

impl Primitive for TogglePrimitive {
    fn instantiate(&self, ctx: &mut DisplayContext) -> NativeId {
        // The native arrangement mirrors the label + switch row.
        let stack = ctx.create(&ViewSpec::Stack {
            kind: StackKind::Horizontal,
            spacing: DEFAULT_SPACING,
            alignment: Alignment::Center,
        });
        let label = self.label.display(ctx);
        ctx.add_subview(stack, label);

        let switch = ctx.create(&ViewSpec::SwitchView);
        ctx.set_toggle(switch, self.is_on.value().unwrap_or(false));

        let backend = ctx.backend().clone();
        let diagnostics = ctx.diagnostics();
        let subscription = self.is_on.bind(move |on: &bool| {
            if let Err(err) = backend.borrow_mut().set_toggle(switch, *on) {
                diagnostics.warning("control", &err.to_string());
            }
        });
        ctx.retain(subscription);

        let is_on = self.is_on.clone();
        ctx.register_handler(
            switch,
            ControlHandler::new(move |event| {
                if let ControlEventKind::Toggled(on) = event {
                    is_on.update(*on);
                }
            }),
        );

        ctx.add_subview(stack, switch);
        stack
    }
}

impl IntoViewNode for Toggle {
    fn into_node(self) -> ViewNode {
        ViewNode::new(TogglePrimitive {
            is_on: self.is_on,
            label: self.label,
        })
    }
}

// ---- Slider ----

#[derive(Debug)]
pub struct Slider {
    value: Binding<f64>,
    min: f64,
    max: f64,
}

impl Slider {
    pub fn new(value: Binding<f64>, min: f64, max: f64) -> Slider {
        Slider { value, min, max }
    }
}

#[derive(Debug)]
struct SliderPrimitive {
    value: Binding<f64>,
    min: f64,
    max: f64,
}

impl Primitive for SliderPrimitive {
    fn instantiate(&self, ctx: &mut DisplayContext) -> NativeId {
        let id = ctx.create(&ViewSpec::SliderView {
            min: self.min,
            max: self.max,
        });
        ctx.set_slider(id, self.value.value().unwrap_or(self.min));

        let backend = ctx.backend().clone();
        let diagnostics = ctx.diagnostics();
        let subscription = self.value.bind(move |value: &f64| {
            if let Err(err) = backend.borrow_mut().set_slider(id, *value) {
                diagnostics.warning("control", &err.to_string());
            }
        });
        ctx.retain(subscription);

        let value = self.value.clone();
        ctx.register_handler(
            id,
            ControlHandler::new(move |event| {
                if let ControlEventKind::ValueChanged(new_value) = event {
                    value.update(*new_value);
                }
            }),
        );
        id
    }
}

impl IntoViewNode for Slider {
    fn into_node(self) -> ViewNode {
        ViewNode::new(SliderPrimitive {
            value: self.value,
            min: self.min,
            max: self.max,
        })
    }
}
