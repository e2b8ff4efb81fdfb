//! Modifiers.
//!
//! A modifier is a pure function from a native view to a (possibly same)
//! native view, applied in registration order after the view is created and
//! before children are attached. Most are thin property patches; the
//! binding-driven ones also subscribe so later binding updates keep
//! reaching the native view.

use core::fmt;
use std::rc::Rc;

use crate::backend::{NativeId, PropPatch};
use crate::binding::Binding;
use crate::color::{Color, LinearGradient};
use crate::rect::EdgeInsets;
use crate::view::{DisplayContext, IntoViewNode, Modifier, ViewNode};

/// Font description forwarded to the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub size: f64,
    pub weight: FontWeight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Medium,
    Semibold,
    Bold,
}

impl Font {
    pub fn system(size: f64) -> Font {
        Font {
            size,
            weight: FontWeight::Regular,
        }
    }

    pub fn weight(mut self, weight: FontWeight) -> Font {
        self.weight = weight;
        self
    }

    pub fn title() -> Font {
        Font::system(28.).weight(FontWeight::Bold)
    }

    pub fn body() -> Font {
        Font::system(17.)
    }

    pub fn caption() -> Font {
        Font::system(12.)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlignment {
    Leading,
    Center,
    Trailing,
}

/// Row animation used by list/grid update transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAnimation {
    Automatic,
    Fade,
    None,
}

#[derive(Debug)]
pub struct Padding {
    insets: EdgeInsets,
}

impl Padding {
    pub fn new(insets: EdgeInsets) -> Padding {
        Padding { insets }
    }
}

impl Modifier for Padding {
    fn modify(&self, view: NativeId, ctx: &mut DisplayContext) -> NativeId {
        ctx.apply(view, &PropPatch::Padding(self.insets));
        view
    }
}

#[derive(Debug)]
pub struct Frame {
    width: Option<f64>,
    height: Option<f64>,
}

impl Frame {
    pub fn new(width: Option<f64>, height: Option<f64>) -> Frame {
        Frame { width, height }
    }
}

impl Modifier for Frame {
    fn modify(&self, view: NativeId, ctx: &mut DisplayContext) -> NativeId {
        ctx.apply(
            view,
            &PropPatch::Frame {
                width: self.width,
                height: self.height,
            },
        );
        view
    }
}

#[derive(Debug)]
pub struct Background {
    color: Color,
}

impl Background {
    pub fn new(color: Color) -> Background {
        Background { color }
    }
}

impl Modifier for Background {
    fn modify(&self, view: NativeId, ctx: &mut DisplayContext) -> NativeId {
        ctx.apply(view, &PropPatch::Background(self.color));
        view
    }
}

#[derive(Debug)]
pub struct BackgroundGradient {
    gradient: LinearGradient,
}

impl BackgroundGradient {
    pub fn new(gradient: LinearGradient) -> BackgroundGradient {
        BackgroundGradient { gradient }
    }
}

impl Modifier for BackgroundGradient {
    fn modify(&self, view: NativeId, ctx: &mut DisplayContext) -> NativeId {
        ctx.apply(view, &PropPatch::BackgroundGradient(self.gradient.clone()));
        view
    }
}

#[derive(Debug)]
pub struct ForegroundColor {
    color: Color,
}

impl ForegroundColor {
    pub fn new(color: Color) -> ForegroundColor {
        ForegroundColor { color }
    }
}

impl Modifier for ForegroundColor {
    fn modify(&self, view: NativeId, ctx: &mut DisplayContext) -> NativeId {
        ctx.apply(view, &PropPatch::Foreground(self.color));
        view
    }
}

#[derive(Debug)]
pub struct FontModifier {
    font: Font,
}

impl FontModifier {
    pub fn new(font: Font) -> FontModifier {
        FontModifier { font }
    }
}

impl Modifier for FontModifier {
    fn modify(&self, view: NativeId, ctx: &mut DisplayContext) -> NativeId {
        ctx.apply(view, &PropPatch::Font(self.font));
        view
    }
}

#[derive(Debug)]
pub struct Opacity {
    value: f64,
}

impl Opacity {
    pub fn new(value: f64) -> Opacity {
        Opacity { value }
    }
}

impl Modifier for Opacity {
    fn modify(&self, view: NativeId, ctx: &mut DisplayContext) -> NativeId {
        ctx.apply(view, &PropPatch::Opacity(self.value));
        view
    }
}

#[derive(Debug)]
pub struct CornerRadius {
    radius: f64,
}

impl CornerRadius {
    pub fn new(radius: f64) -> CornerRadius {
        CornerRadius { radius }
    }
}

impl Modifier for CornerRadius {
    fn modify(&self, view: NativeId, ctx: &mut DisplayContext) -> NativeId {
        ctx.apply(view, &PropPatch::CornerRadius(self.radius));
        view
    }
}

#[derive(Debug)]
pub struct LineLimit {
    limit: usize,
}

impl LineLimit {
    pub fn new(limit: usize) -> LineLimit {
        LineLimit { limit }
    }
}

impl Modifier for LineLimit {
    fn modify(&self, view: NativeId, ctx: &mut DisplayContext) -> NativeId {
        ctx.apply(view, &PropPatch::LineLimit(self.limit));
        view
    }
}

#[derive(Debug)]
pub struct MultilineTextAlignment {
    alignment: TextAlignment,
}

impl MultilineTextAlignment {
    pub fn new(alignment: TextAlignment) -> MultilineTextAlignment {
        MultilineTextAlignment { alignment }
    }
}

impl Modifier for MultilineTextAlignment {
    fn modify(&self, view: NativeId, ctx: &mut DisplayContext) -> NativeId {
        ctx.apply(view, &PropPatch::TextAlignment(self.alignment));
        view
    }
}

/// Enables/disables a control from a binding; stays live after display.
#[derive(Debug)]
pub struct Disabled {
    disabled: Binding<bool>,
}

impl Disabled {
    pub fn new(disabled: Binding<bool>) -> Disabled {
        Disabled { disabled }
    }
}

impl Modifier for Disabled {
    fn modify(&self, view: NativeId, ctx: &mut DisplayContext) -> NativeId {
        let current = self.disabled.value().unwrap_or(false);
        ctx.apply(view, &PropPatch::Enabled(!current));

        let backend = ctx.backend().clone();
        let diagnostics = ctx.diagnostics();
        let subscription = self.disabled.bind(move |disabled: &bool| {
            if let Err(err) = backend.borrow_mut().apply(view, &PropPatch::Enabled(!disabled)) {
                diagnostics.warning("modifier", &err.to_string());
            }
        });
        ctx.retain(subscription);
        view
    }
}

/// Toggles scrollability from a binding; stays live after display.
#[derive(Debug)]
pub struct ScrollEnabled {
    enabled: Binding<bool>,
}

impl ScrollEnabled {
    pub fn new(enabled: Binding<bool>) -> ScrollEnabled {
        ScrollEnabled { enabled }
    }
}

impl Modifier for ScrollEnabled {
    fn modify(&self, view: NativeId, ctx: &mut DisplayContext) -> NativeId {
        let current = self.enabled.value().unwrap_or(true);
        ctx.apply(view, &PropPatch::ScrollEnabled(current));

        let backend = ctx.backend().clone();
        let diagnostics = ctx.diagnostics();
        let subscription = self.enabled.bind(move |enabled: &bool| {
            if let Err(err) = backend
                .borrow_mut()
                .apply(view, &PropPatch::ScrollEnabled(*enabled))
            {
                diagnostics.warning("modifier", &err.to_string());
            }
        });
        ctx.retain(subscription);
        view
    }
}

/// Sets the list/grid row animation from a binding.
#[derive(Debug)]
pub struct RowAnimationModifier {
    animation: Binding<RowAnimation>,
}

impl RowAnimationModifier {
    pub fn new(animation: Binding<RowAnimation>) -> RowAnimationModifier {
        RowAnimationModifier { animation }
    }
}

impl Modifier for RowAnimationModifier {
    fn modify(&self, view: NativeId, ctx: &mut DisplayContext) -> NativeId {
        if let Some(current) = self.animation.value() {
            ctx.apply(view, &PropPatch::RowAnimation(current));
        }
        let backend = ctx.backend().clone();
        let diagnostics = ctx.diagnostics();
        let subscription = self.animation.bind(move |animation: &RowAnimation| {
            if let Err(err) = backend
                .borrow_mut()
                .apply(view, &PropPatch::RowAnimation(*animation))
            {
                diagnostics.warning("modifier", &err.to_string());
            }
        });
        ctx.retain(subscription);
        view
    }
}

/// An arbitrary user-supplied transformation.
pub struct CustomModifier {
    block: Rc<dyn Fn(NativeId, &mut DisplayContext) -> NativeId>,
}

impl CustomModifier {
    pub fn new<F: Fn(NativeId, &mut DisplayContext) -> NativeId + 'static>(
        block: F,
    ) -> CustomModifier {
        CustomModifier {
            block: Rc::new(block),
        }
    }
}

impl fmt::Debug for CustomModifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CustomModifier")
    }
}

impl Modifier for CustomModifier {
    fn modify(&self, view: NativeId, ctx: &mut DisplayContext) -> NativeId {
        (self.block)(view, ctx)
    }
}

/// Chained modifier sugar available on every view builder.
pub trait ModifierExt: IntoViewNode + Sized {
    fn padding(self, insets: EdgeInsets) -> ViewNode {
        self.into_node().modifier(Padding::new(insets))
    }

    fn padding_all(self, value: f64) -> ViewNode {
        self.padding(EdgeInsets::all(value))
    }

    fn frame(self, width: Option<f64>, height: Option<f64>) -> ViewNode {
        self.into_node().modifier(Frame::new(width, height))
    }

    fn background(self, color: Color) -> ViewNode {
        self.into_node().modifier(Background::new(color))
    }

    fn background_gradient(self, gradient: LinearGradient) -> ViewNode {
        self.into_node().modifier(BackgroundGradient::new(gradient))
    }

    fn foreground_color(self, color: Color) -> ViewNode {
        self.into_node().modifier(ForegroundColor::new(color))
    }

    fn font(self, font: Font) -> ViewNode {
        self.into_node().modifier(FontModifier::new(font))
    }

    fn opacity(self, value: f64) -> ViewNode {
        self.into_node().modifier(Opacity::new(value))
    }

    fn corner_radius(self, radius: f64) -> ViewNode {
        self.into_node().modifier(CornerRadius::new(radius))
    }

    fn line_limit(self, limit: usize) -> ViewNode {
        self.into_node().modifier(LineLimit::new(limit))
    }

    fn multiline_text_alignment(self, alignment: TextAlignment) -> ViewNode {
        self.into_node()
            .modifier(MultilineTextAlignment::new(alignment))
    }

    fn disabled(self, disabled: Binding<bool>) -> ViewNode {
        self.into_node().modifier(Disabled::new(disabled))
    }

    fn scroll_enabled(self, enabled: Binding<bool>) -> ViewNode {
        self.into_node().modifier(ScrollEnabled::new(enabled))
    }

    fn custom_modifier<F: Fn(NativeId, &mut DisplayContext) -> NativeId + 'static>(
        self,
        block: F,
    ) -> ViewNode {
        self.into_node().modifier(CustomModifier::new(block))
    }
}

impl<V: IntoViewNode + Sized> ModifierExt for V {}
