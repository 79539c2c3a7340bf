use super::{GridVariant, name_number};
use crate::config::{CalligraphyAreaConfig, GridOptions, PageConfig};
use crate::error::{GridError, ensure_repetitions};
use crate::geometry::{Point, Rect, intersect, stepped_positions};
use crate::page::{GridNames, GridPage, RenderedPage};
use crate::svg::{AxisLine, Drawer, Line, Stroke};

/// Free practice area: horizontal rulings every x-height plus a family of
/// parallel slant guides clipped to the grid box.
#[derive(Debug, Clone, PartialEq)]
pub struct CalligraphyAreaGrid {
    page: GridPage,
    config: CalligraphyAreaConfig,
}

impl CalligraphyAreaGrid {
    pub fn new(options: &GridOptions) -> Result<Self, GridError> {
        let config = CalligraphyAreaConfig::resolve(options)?;
        let angle = name_number(config.slant_angle);
        let x_height = format!("{}mm", name_number(config.x_height));
        let names = GridNames::from_parts(
            &[format!("{angle}°"), x_height.clone()],
            &[format!("{angle}deg"), x_height],
        );
        let page = GridPage::new(PageConfig::resolve(options)?, names)?;
        let area = page.metrics().grid_box();
        ensure_repetitions("xHeight", area.height, config.x_height)?;
        ensure_repetitions("slantAngleGap", area.diagonal(), config.slant_angle_gap)?;
        Ok(Self { page, config })
    }

    pub fn config(&self) -> &CalligraphyAreaConfig {
        &self.config
    }

    /// Clipped segments of the slant family, center line first, then pairs
    /// offset to either side. Offset segments must be longer than the
    /// configured minimum; the center line is never filtered.
    pub fn slant_segments(&self, area: &Rect) -> Vec<(Point, Point)> {
        if self.config.slant_angle == 0.0 {
            return Vec::new();
        }
        let center = area.center();
        let diagonal = area.diagonal();
        let half = diagonal / 2.0;
        // measured from the positive x axis, so the guides lean right on a
        // y-down page
        let theta = (180.0 - self.config.slant_angle).to_radians();
        let (dx, dy) = (half * theta.cos(), half * theta.sin());
        let start = Point::new(center.x - dx, center.y - dy);
        let end = Point::new(center.x + dx, center.y + dy);

        let mut segments = Vec::new();
        if let Some(segment) = clip(start, end, 0.0, area) {
            segments.push(segment);
        }

        let spacing = self.config.slant_angle_gap;
        let reps = (diagonal / spacing).ceil() as usize;
        let min_length = self.config.slant_line_min_length;
        for k in 1..=reps {
            let offset = k as f64 * spacing;
            for shift in [offset, -offset] {
                if let Some(segment) = clip(start, end, shift, area) {
                    if segment.0.distance(&segment.1) > min_length {
                        segments.push(segment);
                    }
                }
            }
        }
        segments
    }
}

/// Shifts the line horizontally and trims it to `area`. Lines that touch
/// the box in fewer than two distinct points are dropped.
fn clip(start: Point, end: Point, shift: f64, area: &Rect) -> Option<(Point, Point)> {
    let points = intersect(start.x + shift, start.y, end.x + shift, end.y, area);
    match points.as_slice() {
        [a, b] => Some((*a, *b)),
        _ => None,
    }
}

impl GridVariant for CalligraphyAreaGrid {
    fn page(&self) -> &GridPage {
        &self.page
    }

    fn draw_pattern(&self, frame: &RenderedPage, drawer: &mut Drawer<'_>) -> Result<(), GridError> {
        let config = &self.config;
        let area = frame.grid_box();
        let stroke = Stroke::new(&config.line_color, config.grid_stroke_width);
        let rows = stepped_positions(area.y, area.height, config.x_height);

        frame.open_pattern_group(drawer);

        drawer.group(Some("horizontal-lines"), None, None);
        for (i, y) in rows.iter().enumerate() {
            drawer.solid_line(AxisLine::horizontal(*y, area.x, area.right()), stroke);
            if config.add_divider_lines && i + 1 < rows.len() {
                drawer.dashed_line(
                    AxisLine::horizontal(y + config.x_height / 2.0, area.x, area.right()),
                    config.grid_stroke_width,
                    &config.line_color,
                );
            }
        }
        drawer.close();

        let segments = self.slant_segments(&area);
        if !segments.is_empty() {
            drawer.group(Some("slant-lines"), None, None);
            for (a, b) in &segments {
                drawer.line(Line::new(a.x, a.y, b.x, b.y, stroke));
            }
            drawer.close();
        }
        log::debug!(
            "calligraphy area: {} rulings, {} slant guides",
            rows.len(),
            segments.len()
        );

        drawer.close();
        Ok(())
    }
}
