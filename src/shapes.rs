//! Shape views.

use crate::backend::{NativeId, PropPatch, ShapeKind, ViewSpec};
use crate::color::Color;
use crate::view::{DisplayContext, IntoViewNode, Primitive, ViewNode};

#[derive(Debug)]
struct ShapePrimitive {
    kind: ShapeKind,
    fill: Option<Color>,
}

impl Primitive for ShapePrimitive {
    fn instantiate(&self, ctx: &mut DisplayContext) -> NativeId {
        let id = ctx.create(&ViewSpec::ShapeView { shape: self.kind });
        if let Some(fill) = self.fill {
            ctx.apply(id, &PropPatch::Foreground(fill));
        }
        id
    }
}

macro_rules! shape {
    ($(#[$attr:meta])* $name:ident, $kind:expr) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            fill: Option<Color>,
        }

        impl $name {
            pub fn new() -> $name {
                $name { fill: None }
            }

            /// Fills the shape with a color.
            pub fn fill(mut self, color: Color) -> $name {
                self.fill = Some(color);
                self
            }
        }

        impl IntoViewNode for $name {
            fn into_node(self) -> ViewNode {
                ViewNode::new(ShapePrimitive {
                    kind: $kind,
                    fill: self.fill,
                })
            }
        }
    };
}

shape!(Rectangle, ShapeKind::Rectangle);
shape!(Circle, ShapeKind::Circle);
shape!(
    /// A rectangle whose corner radius is half its smaller dimension.
    Capsule,
    ShapeKind::Capsule
);

/// A rectangle with rounded corners.
#[derive(Debug, Clone)]
pub struct RoundedRectangle {
    radius: f64,
    fill: Option<Color>,
}

impl RoundedRectangle {
    pub fn new(radius: f64) -> RoundedRectangle {
        RoundedRectangle { radius, fill: None }
    }

    pub fn fill(mut self, color: Color) -> RoundedRectangle {
        self.fill = Some(color);
        self
    }
}

impl IntoViewNode for RoundedRectangle {
    fn into_node(self) -> ViewNode {
        ViewNode::new(ShapePrimitive {
            kind: ShapeKind::RoundedRectangle {
                radius: self.radius,
            },
            fill: self.fill,
        })
    }
}
