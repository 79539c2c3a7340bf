use super::{GridVariant, name_number};
use crate::config::{CalligraphyLineConfig, GridOptions, PageConfig};
use crate::error::{GridError, ensure_repetitions};
use crate::geometry::slant_run;
use crate::page::{GridNames, GridPage, RenderedPage};
use crate::svg::{AxisLine, Drawer, Stroke};

/// Per-zone values of one writing line, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineZones {
    pub ascender: f64,
    pub base: f64,
    pub descender: f64,
}

impl LineZones {
    pub fn total(&self) -> f64 {
        self.ascender + self.base + self.descender
    }
}

/// Vertical placement of the repeated writing lines inside the grid box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineLayout {
    pub reps: usize,
    /// Space between consecutive lines; 0 when fewer than two lines fit.
    pub gap: f64,
    /// Top of the first line.
    pub first_top: f64,
}

/// The three stacked zones of a writing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Ascender,
    Base,
    Descender,
}

impl Zone {
    pub fn as_class(self) -> &'static str {
        match self {
            Zone::Ascender => "ascender",
            Zone::Base => "base",
            Zone::Descender => "descender",
        }
    }
}

/// Repeating four-zone handwriting lines with optional slant guides.
#[derive(Debug, Clone, PartialEq)]
pub struct CalligraphyLineGrid {
    page: GridPage,
    config: CalligraphyLineConfig,
}

impl CalligraphyLineGrid {
    pub fn new(options: &GridOptions) -> Result<Self, GridError> {
        let config = CalligraphyLineConfig::resolve(options)?;
        let angle = name_number(config.slant_angle);
        let x_height = format!("{}mm", name_number(config.x_height));
        let ratio = [
            name_number(config.ratio_ascender),
            name_number(config.ratio_base),
            name_number(config.ratio_descender),
        ];
        let names = GridNames::from_parts(
            &[format!("{angle}°"), ratio.join(":"), x_height.clone()],
            &[format!("{angle}deg"), ratio.join("-"), x_height],
        );
        let page = GridPage::new(PageConfig::resolve(options)?, names)?;
        ensure_repetitions("xHeight", page.metrics().grid_height(), config.x_height)?;
        Ok(Self { page, config })
    }

    pub fn config(&self) -> &CalligraphyLineConfig {
        &self.config
    }

    /// Zone ratios scaled so the base zone is 1.
    pub fn normalized_ratio(&self) -> LineZones {
        let factor = 1.0 / self.config.ratio_base;
        LineZones {
            ascender: self.config.ratio_ascender * factor,
            base: 1.0,
            descender: self.config.ratio_descender * factor,
        }
    }

    pub fn zone_heights(&self) -> LineZones {
        let ratio = self.normalized_ratio();
        let x_height = self.config.x_height;
        LineZones {
            ascender: x_height * ratio.ascender,
            base: x_height * ratio.base,
            descender: x_height * ratio.descender,
        }
    }

    /// Height of one complete writing line.
    pub fn line_height(&self) -> f64 {
        self.zone_heights().total()
    }

    pub fn line_layout(&self, frame: &RenderedPage) -> LineLayout {
        let buffer = if self.page.config().add_area_box {
            self.config.area_block_buffer
        } else {
            0.0
        };
        let usable = frame.grid_height() - buffer * 2.0;
        let line_height = self.line_height();
        let reps = if usable > 0.0 {
            (usable / line_height).floor() as usize
        } else {
            0
        };
        let gap = if reps > 1 {
            (usable - reps as f64 * line_height) / (reps - 1) as f64
        } else {
            0.0
        };
        LineLayout {
            reps,
            gap,
            first_top: frame.margin_top() + buffer,
        }
    }

    fn draw_line(&self, drawer: &mut Drawer<'_>, top: f64, x_start: f64, x_end: f64) -> Result<(), GridError> {
        let ratio = self.normalized_ratio();
        let x_height = self.config.x_height;
        let x_height_line = top + x_height * ratio.ascender;
        let base_line = x_height_line + x_height * ratio.base;
        let descender_line = base_line + x_height * ratio.descender;

        drawer.group(Some("line"), None, None);
        self.draw_section(drawer, Zone::Ascender, top, x_start, x_end);
        self.draw_section(drawer, Zone::Base, base_line, x_start, x_end);
        self.draw_section(drawer, Zone::Descender, descender_line, x_start, x_end);
        if self.config.slant_angle > 0.0 {
            self.draw_slant_lines(drawer, descender_line, x_start)?;
        }
        drawer.close();
        Ok(())
    }

    /// One zone: its boundary line, the base zone's extra strokes, and the
    /// dashed dividers walking away from `line_pos`. The ascender is anchored
    /// at its top, the base and descender at their bottom lines.
    fn draw_section(&self, drawer: &mut Drawer<'_>, zone: Zone, line_pos: f64, x_start: f64, x_end: f64) {
        let config = &self.config;
        let color = config.line_color.as_str();
        let stroke = Stroke::new(color, config.grid_stroke_width);
        let x_height_line = line_pos - config.x_height;
        let spacing = config.x_height / config.ratio_base;
        let (ratio, step) = match zone {
            Zone::Ascender => (config.ratio_ascender, spacing),
            Zone::Base => (config.ratio_base, -spacing),
            Zone::Descender => (config.ratio_descender, -spacing),
        };

        drawer.group(Some(zone.as_class()), None, None);
        let boundary = if zone == Zone::Base { x_height_line } else { line_pos };
        drawer.solid_line(AxisLine::horizontal(boundary, x_start, x_end), stroke);

        if zone == Zone::Base {
            drawer.solid_line(
                AxisLine::horizontal(line_pos, x_start, x_end),
                Stroke::new(color, config.grid_base_line_stroke_width),
            );
            if config.show_x_height_indicator {
                let width = config.x_height_indicator_stroke_width;
                drawer.solid_line(
                    AxisLine::vertical(x_start + width * 0.5, x_height_line, line_pos),
                    Stroke::new(color, width),
                );
            }
        }

        if config.add_divider_lines {
            // every zone is split into `ratio` equal bands
            let mut i = 1.0;
            while i < ratio {
                drawer.dashed_line(
                    AxisLine::horizontal(line_pos + i * step, x_start, x_end),
                    config.grid_stroke_width,
                    color,
                );
                i += 1.0;
            }
        }
        drawer.close();
    }

    fn draw_slant_lines(&self, drawer: &mut Drawer<'_>, baseline: f64, x_start: f64) -> Result<(), GridError> {
        let config = &self.config;
        let reps = config.slant_lines_per_line as usize;
        let line_height = self.line_height();
        let grid_width = self.page.metrics().grid_width();
        // the last stroke's top endpoint lands on the right edge
        let span = grid_width - slant_run(line_height, config.slant_angle)?;
        if span < 0.0 {
            log::warn!(
                "slant lines at {}° are wider than the grid box; they will overhang",
                config.slant_angle
            );
        }
        let spacing = if reps > 1 { span / (reps - 1) as f64 } else { 0.0 };
        let stroke = Stroke::new(&config.line_color, config.grid_stroke_width);

        drawer.group(Some("slant-lines"), None, None);
        for i in 0..reps {
            drawer.slant_line(
                line_height,
                config.slant_angle,
                x_start + i as f64 * spacing,
                baseline,
                stroke,
            )?;
        }
        drawer.close();
        Ok(())
    }
}

impl GridVariant for CalligraphyLineGrid {
    fn page(&self) -> &GridPage {
        &self.page
    }

    fn draw_pattern(&self, frame: &RenderedPage, drawer: &mut Drawer<'_>) -> Result<(), GridError> {
        let layout = self.line_layout(frame);
        match layout.reps {
            0 => log::warn!(
                "grid box height {} is smaller than one writing line ({}); no lines drawn",
                frame.grid_height(),
                self.line_height()
            ),
            1 => log::warn!("only one writing line fits; no gap distributed"),
            _ => {}
        }
        log::debug!(
            "calligraphy lines: {} reps of {} with gap {}",
            layout.reps,
            self.line_height(),
            layout.gap
        );

        let x_start = frame.margin_left();
        let x_end = frame.width() - frame.margin_right();
        frame.open_pattern_group(drawer);
        for i in 0..layout.reps {
            let top = layout.first_top + i as f64 * (self.line_height() + layout.gap);
            self.draw_line(drawer, top, x_start, x_end)?;
        }
        drawer.close();
        Ok(())
    }
}
