//! Geometry.

use cgmath::{Point2, Vector2, Zero};

/// A rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Rectangle origin.
    pub origin: Point2<f64>,

    /// Rectangle size.
    pub size: Vector2<f64>,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(origin: Point2<f64>, size: Vector2<f64>) -> Rect {
        Rect { origin, size }
    }

    /// Returns a zero-sized rectangle at the origin.
    pub fn zero() -> Rect {
        Rect {
            origin: Point2::new(0., 0.),
            size: Vector2::zero(),
        }
    }

    /// Returns the center point.
    pub fn center(&self) -> Point2<f64> {
        self.origin + self.size / 2.
    }

    /// Returns true if the point is inside the rectangle.
    pub fn contains(&self, point: Point2<f64>) -> bool {
        point.x >= self.origin.x
            && point.y >= self.origin.y
            && point.x < self.origin.x + self.size.x
            && point.y < self.origin.y + self.size.y
    }

    /// Returns a new rectangle shrunk by `insets` on each edge.
    pub fn inset_by(&self, insets: EdgeInsets) -> Rect {
        Rect {
            origin: (self.origin.x + insets.leading, self.origin.y + insets.top).into(),
            size: (
                self.size.x - insets.leading - insets.trailing,
                self.size.y - insets.top - insets.bottom,
            )
                .into(),
        }
    }

}

/// Per-edge insets.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeInsets {
    pub top: f64,
    pub leading: f64,
    pub bottom: f64,
    pub trailing: f64,
}

impl EdgeInsets {
    pub fn new(top: f64, leading: f64, bottom: f64, trailing: f64) -> EdgeInsets {
        EdgeInsets {
            top,
            leading,
            bottom,
            trailing,
        }
    }

    pub fn all(value: f64) -> EdgeInsets {
        EdgeInsets::new(value, value, value, value)
    }

    pub fn symmetric(horizontal: f64, vertical: f64) -> EdgeInsets {
        EdgeInsets::new(vertical, horizontal, vertical, horizontal)
    }

    pub fn zero() -> EdgeInsets {
        EdgeInsets::default()
    }
}

/// Placement of a view inside the space offered by its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Center,
    Leading,
    Trailing,
    Top,
    Bottom,
    Fill,
}

impl Default for Alignment {
    fn default() -> Alignment {
        Alignment::Center
    }
}

/// A layout axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let rect = Rect::new(Point2::new(0., 0.), Vector2::new(10., 10.));
        assert!(rect.contains(Point2::new(0., 0.)));
        assert!(rect.contains(Point2::new(9.9, 9.9)));
        assert!(!rect.contains(Point2::new(10., 10.)));
    }

    #[test]
    fn inset_by_edges() {
        let rect = Rect::new(Point2::new(0., 0.), Vector2::new(100., 50.));
        let inset = rect.inset_by(EdgeInsets::new(5., 10., 15., 20.));
        assert_eq!(inset.origin, Point2::new(10., 5.));
        assert_eq!(inset.size, Vector2::new(70., 30.));
    }

    #[test]
    fn center_of_offset_rect() {
        let rect = Rect::new(Point2::new(10., 20.), Vector2::new(30., 40.));
        assert_eq!(rect.center(), Point2::new(25., 40.));
    }
}
