//! The page frame shared by every grid variant: document size, margins,
//! the title/copyright reservation and the masked area box.

use crate::config::PageConfig;
use crate::error::GridError;
use crate::format::CoordinateFormatter;
use crate::geometry::Rect;
use crate::ids::IdGenerator;
use crate::svg::{Container, Drawer, Primitive, RectShape, Text, TextAnchor};

const TEXT_BUFFER: f64 = 2.0;
const COPYRIGHT_SIZE_FACTOR: f64 = 0.7;
const FONT_COLOR: &str = "#808080";
const FONT_FAMILY: &str = "Arial, sans-serif";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridNames {
    pub pretty: String,
    pub file: String,
}

impl GridNames {
    /// Joins name parts with a space (pretty) and an underscore (file).
    pub fn from_parts(pretty: &[String], file: &[String]) -> Self {
        Self {
            pretty: pretty.join(" "),
            file: file.join("_"),
        }
    }
}

impl Default for GridNames {
    fn default() -> Self {
        Self {
            pretty: "grid page".to_string(),
            file: "grid_page".to_string(),
        }
    }
}

/// Document size and margins, with the top and bottom margins grown by the
/// space reserved for the title and copyright lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentMetrics {
    pub width: f64,
    pub height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
}

impl DocumentMetrics {
    pub fn from_config(config: &PageConfig) -> Result<Self, GridError> {
        let text_height = reserved_text_height(config);
        let margin_top = if config.add_title {
            config.document_margin_top + text_height
        } else {
            config.document_margin_top
        };
        let margin_bottom = if config.add_copyright {
            config.document_margin_bottom + text_height * COPYRIGHT_SIZE_FACTOR
        } else {
            config.document_margin_bottom
        };
        let metrics = Self {
            width: config.document_width,
            height: config.document_height,
            margin_top,
            margin_bottom,
            margin_left: config.document_margin_left,
            margin_right: config.document_margin_right,
        };
        if !(metrics.grid_width() > 0.0) {
            return Err(GridError::invalid(
                "documentWidth",
                format!(
                    "leaves no drawable width after margins (width {}, left {}, right {})",
                    metrics.width, metrics.margin_left, metrics.margin_right
                ),
            ));
        }
        if !(metrics.grid_height() > 0.0) {
            return Err(GridError::invalid(
                "documentHeight",
                format!(
                    "leaves no drawable height after margins and text (height {}, top {}, bottom {})",
                    metrics.height, metrics.margin_top, metrics.margin_bottom
                ),
            ));
        }
        Ok(metrics)
    }

    pub fn grid_width(&self) -> f64 {
        self.width - self.margin_left - self.margin_right
    }

    pub fn grid_height(&self) -> f64 {
        self.height - self.margin_top - self.margin_bottom
    }

    pub fn grid_box(&self) -> Rect {
        Rect::new(
            self.margin_left,
            self.margin_top,
            self.grid_width(),
            self.grid_height(),
        )
    }
}

fn reserved_text_height(config: &PageConfig) -> f64 {
    config.text_font_size * config.text_line_height + TEXT_BUFFER
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridPage {
    config: PageConfig,
    metrics: DocumentMetrics,
    names: GridNames,
}

impl GridPage {
    pub fn new(config: PageConfig, names: GridNames) -> Result<Self, GridError> {
        let metrics = DocumentMetrics::from_config(&config)?;
        log::debug!(
            "page {}: {}x{} grid box {:?}",
            names.file,
            metrics.width,
            metrics.height,
            metrics.grid_box()
        );
        Ok(Self {
            config,
            metrics,
            names,
        })
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn metrics(&self) -> &DocumentMetrics {
        &self.metrics
    }

    pub fn names(&self) -> &GridNames {
        &self.names
    }

    pub fn formatter(&self) -> CoordinateFormatter {
        CoordinateFormatter::new(self.config.coordinate_decimal_place_max as usize)
    }

    /// Opens the document and draws the copyright line, title and area box.
    /// The document stays open for the variant's pattern.
    pub fn draw_frame(&self, drawer: &mut Drawer<'_>, ids: &mut dyn IdGenerator) -> RenderedPage {
        let config = &self.config;
        let metrics = self.metrics;
        drawer.open(Container::Document {
            width: metrics.width,
            height: metrics.height,
            id: ids.next_id("grid-page"),
        });

        if config.add_copyright {
            drawer.draw(Primitive::Text(self.text(
                &config.copyright_text,
                config.text_font_size * COPYRIGHT_SIZE_FACTOR,
                TextAnchor::Start,
                config.document_margin_left,
                metrics.height - config.document_margin_bottom,
            )));
        }

        if config.add_title {
            drawer.draw(Primitive::Text(self.text(
                &self.names.pretty,
                config.text_font_size,
                TextAnchor::End,
                metrics.width - config.document_margin_right,
                config.document_margin_top + config.text_font_size * config.text_line_height,
            )));
        }

        let mut mask_id = None;
        if config.add_area_box {
            let id = ids.next_id("mask");
            drawer.open(Container::Mask { id: id.clone() });
            drawer.draw(Primitive::Rect(self.area_rect("white", "black")));
            drawer.close();
            drawer.draw(Primitive::Rect(
                self.area_rect("transparent", &config.area_stroke_color),
            ));
            mask_id = Some(id);
        }

        RenderedPage {
            metrics,
            mask_id,
            pretty_name: self.names.pretty.clone(),
            file_name: self.names.file.clone(),
        }
    }

    fn text(&self, content: &str, font_size: f64, anchor: TextAnchor, x: f64, y: f64) -> Text {
        Text {
            x,
            y,
            anchor,
            font_size,
            font_family: FONT_FAMILY.to_string(),
            fill: FONT_COLOR.to_string(),
            content: content.to_string(),
        }
    }

    fn area_rect(&self, fill: &str, stroke: &str) -> RectShape {
        let area = self.metrics.grid_box();
        RectShape {
            x: area.x,
            y: area.y,
            width: area.width,
            height: area.height,
            rx: Some(self.config.area_border_radius),
            fill: fill.to_string(),
            stroke: Some((stroke.to_string(), self.config.area_stroke_width)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub metrics: DocumentMetrics,
    pub mask_id: Option<String>,
    pub pretty_name: String,
    pub file_name: String,
}

impl RenderedPage {
    pub fn width(&self) -> f64 {
        self.metrics.width
    }

    pub fn height(&self) -> f64 {
        self.metrics.height
    }

    pub fn margin_top(&self) -> f64 {
        self.metrics.margin_top
    }

    pub fn margin_bottom(&self) -> f64 {
        self.metrics.margin_bottom
    }

    pub fn margin_left(&self) -> f64 {
        self.metrics.margin_left
    }

    pub fn margin_right(&self) -> f64 {
        self.metrics.margin_right
    }

    pub fn grid_width(&self) -> f64 {
        self.metrics.grid_width()
    }

    pub fn grid_height(&self) -> f64 {
        self.metrics.grid_height()
    }

    pub fn grid_box(&self) -> Rect {
        self.metrics.grid_box()
    }

    /// Opens the group every pattern is drawn into, masked to the area box
    /// when there is one.
    pub fn open_pattern_group(&self, drawer: &mut Drawer<'_>) {
        drawer.group(Some("grid"), Some("calli-grid"), self.mask_id.as_deref());
    }
}
