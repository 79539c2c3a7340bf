//! Pure geometry used by the grid variants: rectangles, line clipping and
//! centered stepping along an axis.

use crate::error::GridError;

const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    fn approx_eq(&self, other: &Point) -> bool {
        (self.x - other.x).abs() < EPSILON && (self.y - other.y).abs() < EPSILON
    }
}

/// Axis-aligned rectangle in document units (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn diagonal(&self) -> f64 {
        (self.width.powi(2) + self.height.powi(2)).sqrt()
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Returns the points where the infinite line through `(x1, y1)` and
/// `(x2, y2)` crosses the border of `rect`.
///
/// Edges are checked in the order top, bottom, left, right; a candidate is
/// kept only when it lies within the rectangle (bounds inclusive). A line
/// through a corner hits two edges at the same spot, the duplicate is
/// dropped. Vertical lines have no slope and yield no points.
pub fn intersect(x1: f64, y1: f64, x2: f64, y2: f64, rect: &Rect) -> Vec<Point> {
    let slope = (y2 - y1) / (x2 - x1);
    if !slope.is_finite() {
        return Vec::new();
    }
    let y_intercept = y1 - slope * x1;

    let mut candidates = Vec::with_capacity(4);
    // a horizontal line never meets the top or bottom edge in a single point
    if slope != 0.0 {
        candidates.push(Point::new((rect.y - y_intercept) / slope, rect.y));
        candidates.push(Point::new((rect.bottom() - y_intercept) / slope, rect.bottom()));
    }
    candidates.push(Point::new(rect.x, slope * rect.x + y_intercept));
    candidates.push(Point::new(rect.right(), slope * rect.right() + y_intercept));

    let mut points: Vec<Point> = Vec::with_capacity(2);
    for candidate in candidates {
        if !candidate.x.is_finite() || !candidate.y.is_finite() {
            continue;
        }
        if !rect.contains(candidate.x, candidate.y) {
            continue;
        }
        if points.iter().any(|p| p.approx_eq(&candidate)) {
            continue;
        }
        points.push(candidate);
    }
    points
}

/// Positions along one axis of the grid box, spaced by `step` and centered
/// so the leftover slack is split evenly between both ends.
///
/// Yields `floor(length / step) + 1` positions starting at
/// `start + remainder / 2`.
pub fn stepped_positions(start: f64, length: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || !(length >= 0.0) {
        return Vec::new();
    }
    let reps = (length / step).floor();
    let remainder = length - reps * step;
    let first = start + remainder / 2.0;
    (0..=reps as usize)
        .map(|i| first + i as f64 * step)
        .collect()
}

/// Checks that a slant angle (degrees from horizontal) lies in `(0, 90)`.
pub fn validate_slant_angle(field: &'static str, angle: f64) -> Result<f64, GridError> {
    if !angle.is_finite() || angle <= 0.0 || angle >= 90.0 {
        return Err(GridError::invalid(
            field,
            format!("must be between 0 and 90 degrees (exclusive), got {angle}"),
        ));
    }
    Ok(angle)
}

/// Horizontal run of a slant stroke rising `height` at `angle` degrees.
pub fn slant_run(height: f64, angle: f64) -> Result<f64, GridError> {
    let angle = validate_slant_angle("slantAngle", angle)?;
    Ok(height / angle.to_radians().tan())
}

/// Top endpoint of a slant stroke starting at `(x, y)` and rising `height`.
pub fn slant_end(x: f64, y: f64, height: f64, angle: f64) -> Result<Point, GridError> {
    Ok(Point::new(x + slant_run(height, angle)?, y - height))
}
