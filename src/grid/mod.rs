mod calligraphy_area;
mod calligraphy_line;
mod dot;
mod graph;

pub use calligraphy_area::CalligraphyAreaGrid;
pub use calligraphy_line::{CalligraphyLineGrid, LineLayout, LineZones, Zone};
pub use dot::DotGrid;
pub use graph::GraphGrid;

use crate::config::GridOptions;
use crate::error::{GridError, ensure_repetitions};
use crate::ids::{IdGenerator, RandomIds};
use crate::page::{GridPage, RenderedPage};
use crate::svg::{Drawer, StringSurface, Surface, SvgNode, TreeSurface};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A page pattern drawn inside the frame of a [`GridPage`].
pub trait GridVariant {
    fn page(&self) -> &GridPage;

    /// Draws the pattern into the open document.
    fn draw_pattern(&self, frame: &RenderedPage, drawer: &mut Drawer<'_>) -> Result<(), GridError>;

    fn pretty_name(&self) -> &str {
        &self.page().names().pretty
    }

    fn file_name(&self) -> &str {
        &self.page().names().file
    }

    /// Renders the whole page onto `surface`.
    fn render(
        &self,
        surface: &mut dyn Surface,
        ids: &mut dyn IdGenerator,
    ) -> Result<RenderedPage, GridError> {
        let page = self.page();
        let mut drawer = Drawer::new(surface, page.formatter());
        let frame = page.draw_frame(&mut drawer, ids);
        self.draw_pattern(&frame, &mut drawer)?;
        drawer.close_all();
        log::debug!(
            "rendered {} with {} primitives",
            frame.file_name,
            drawer.primitive_count()
        );
        Ok(frame)
    }

    /// Renders into a live element tree.
    fn make_svg_with(&self, ids: &mut dyn IdGenerator) -> Result<(SvgNode, RenderedPage), GridError> {
        let mut surface = TreeSurface::new();
        let frame = self.render(&mut surface, ids)?;
        let root = surface.into_root().ok_or_else(|| {
            GridError::TargetUnavailable("document tree was left open".to_string())
        })?;
        Ok((root, frame))
    }

    fn make_svg(&self) -> Result<SvgNode, GridError> {
        Ok(self.make_svg_with(&mut RandomIds)?.0)
    }

    /// Renders into SVG markup.
    fn make_svg_string_with(
        &self,
        ids: &mut dyn IdGenerator,
    ) -> Result<(String, RenderedPage), GridError> {
        let mut surface = StringSurface::new();
        let frame = self.render(&mut surface, ids)?;
        Ok((surface.into_string(), frame))
    }

    fn make_svg_string(&self) -> Result<String, GridError> {
        Ok(self.make_svg_string_with(&mut RandomIds)?.0)
    }

    /// Renders and appends the page to a consumer-owned container node.
    fn render_into(
        &self,
        container: Option<&mut SvgNode>,
        ids: &mut dyn IdGenerator,
    ) -> Result<RenderedPage, GridError> {
        let Some(container) = container else {
            return Err(GridError::TargetUnavailable(
                "no container to render into".to_string(),
            ));
        };
        if !matches!(container.content, crate::svg::NodeContent::Children(_)) {
            return Err(GridError::TargetUnavailable(format!(
                "<{}> cannot hold child elements",
                container.tag
            )));
        }
        let (root, frame) = self.make_svg_with(ids)?;
        container.append(root);
        Ok(frame)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GridKind {
    Dot,
    Graph,
    CalligraphyLine,
    CalligraphyArea,
}

impl GridKind {
    pub const ALL: [GridKind; 4] = [
        GridKind::Dot,
        GridKind::Graph,
        GridKind::CalligraphyLine,
        GridKind::CalligraphyArea,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dot => "dot",
            Self::Graph => "graph",
            Self::CalligraphyLine => "calligraphy-line",
            Self::CalligraphyArea => "calligraphy-area",
        }
    }
}

impl fmt::Display for GridKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GridKind {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| GridError::invalid("kind", format!("unknown grid kind `{s}`")))
    }
}

/// Any of the four grid variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Grid {
    Dot(DotGrid),
    Graph(GraphGrid),
    CalligraphyLine(CalligraphyLineGrid),
    CalligraphyArea(CalligraphyAreaGrid),
}

impl Grid {
    pub fn new(kind: GridKind, options: &GridOptions) -> Result<Self, GridError> {
        Ok(match kind {
            GridKind::Dot => Self::Dot(DotGrid::new(options)?),
            GridKind::Graph => Self::Graph(GraphGrid::new(options)?),
            GridKind::CalligraphyLine => Self::CalligraphyLine(CalligraphyLineGrid::new(options)?),
            GridKind::CalligraphyArea => Self::CalligraphyArea(CalligraphyAreaGrid::new(options)?),
        })
    }

    pub fn kind(&self) -> GridKind {
        match self {
            Self::Dot(_) => GridKind::Dot,
            Self::Graph(_) => GridKind::Graph,
            Self::CalligraphyLine(_) => GridKind::CalligraphyLine,
            Self::CalligraphyArea(_) => GridKind::CalligraphyArea,
        }
    }

    fn variant(&self) -> &dyn GridVariant {
        match self {
            Self::Dot(grid) => grid,
            Self::Graph(grid) => grid,
            Self::CalligraphyLine(grid) => grid,
            Self::CalligraphyArea(grid) => grid,
        }
    }
}

impl GridVariant for Grid {
    fn page(&self) -> &GridPage {
        self.variant().page()
    }

    fn draw_pattern(&self, frame: &RenderedPage, drawer: &mut Drawer<'_>) -> Result<(), GridError> {
        self.variant().draw_pattern(frame, drawer)
    }
}

/// Checks a square cell step against both axes of the grid box.
pub(crate) fn ensure_cell_steps(page: &GridPage, field: &'static str, step: f64) -> Result<(), GridError> {
    let metrics = page.metrics();
    ensure_repetitions(field, metrics.grid_width(), step)?;
    ensure_repetitions(field, metrics.grid_height(), step)
}

/// Formats a number the way it appears in page names: `5`, `0.5`, `12.25`.
pub(crate) fn name_number(value: f64) -> String {
    format!("{value}")
}
