//! Colors and gradients.

use cgmath::Point2;

/// An RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Color {
        Color { r, g, b, a }
    }

    pub const fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color::rgba(r, g, b, 1.)
    }

    pub const CLEAR: Color = Color::rgba(0., 0., 0., 0.);
    pub const BLACK: Color = Color::rgb(0., 0., 0.);
    pub const WHITE: Color = Color::rgb(1., 1., 1.);
    pub const GRAY: Color = Color::rgb(0.5, 0.5, 0.5);
    pub const LIGHT_GRAY: Color = Color::rgb(0.8, 0.8, 0.8);
    pub const RED: Color = Color::rgb(1., 0., 0.);
    pub const GREEN: Color = Color::rgb(0., 1., 0.);
    pub const BLUE: Color = Color::rgb(0., 0., 1.);
    pub const YELLOW: Color = Color::rgb(1., 1., 0.);
    pub const ORANGE: Color = Color::rgb(1., 0.5, 0.);

    /// Returns this color with the given opacity.
    pub fn opacity(self, a: f64) -> Color {
        Color { a, ..self }
    }
}

/// A linear gradient between unit-space points.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub colors: Vec<Color>,
    /// Start point in unit coordinates, (0, 0) = top leading.
    pub start: Point2<f64>,
    /// End point in unit coordinates.
    pub end: Point2<f64>,
}

impl LinearGradient {
    pub fn new(colors: Vec<Color>, start: Point2<f64>, end: Point2<f64>) -> LinearGradient {
        LinearGradient { colors, start, end }
    }

    /// A top-to-bottom gradient.
    pub fn vertical(colors: Vec<Color>) -> LinearGradient {
        LinearGradient::new(colors, Point2::new(0.5, 0.), Point2::new(0.5, 1.))
    }

    /// A leading-to-trailing gradient.
    pub fn horizontal(colors: Vec<Color>) -> LinearGradient {
        LinearGradient::new(colors, Point2::new(0., 0.5), Point2::new(1., 0.5))
    }
}
