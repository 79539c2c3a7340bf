use super::{GridVariant, ensure_cell_steps, name_number};
use crate::config::{GraphGridConfig, GridOptions, PageConfig};
use crate::error::GridError;
use crate::geometry::stepped_positions;
use crate::page::{GridNames, GridPage, RenderedPage};
use crate::svg::{AxisLine, Drawer, Stroke};

/// Square graph paper: full-width and full-height solid rulings.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphGrid {
    page: GridPage,
    config: GraphGridConfig,
}

impl GraphGrid {
    pub fn new(options: &GridOptions) -> Result<Self, GridError> {
        let config = GraphGridConfig::resolve(options)?;
        let cell = format!("{}mm", name_number(config.cell_size));
        let names = GridNames::from_parts(
            &["graph".to_string(), cell.clone()],
            &["graph".to_string(), cell],
        );
        let page = GridPage::new(PageConfig::resolve(options)?, names)?;
        ensure_cell_steps(&page, "cellSize", config.cell_size)?;
        Ok(Self { page, config })
    }

    pub fn config(&self) -> &GraphGridConfig {
        &self.config
    }
}

impl GridVariant for GraphGrid {
    fn page(&self) -> &GridPage {
        &self.page
    }

    fn draw_pattern(&self, frame: &RenderedPage, drawer: &mut Drawer<'_>) -> Result<(), GridError> {
        let area = frame.grid_box();
        let cell = self.config.cell_size;
        let stroke = Stroke::new(&self.config.line_color, self.config.grid_stroke_width);

        frame.open_pattern_group(drawer);
        for y in stepped_positions(area.y, area.height, cell) {
            drawer.solid_line(AxisLine::horizontal(y, area.x, area.right()), stroke);
        }
        for x in stepped_positions(area.x, area.width, cell) {
            drawer.solid_line(AxisLine::vertical(x, area.y, area.bottom()), stroke);
        }
        drawer.close();
        Ok(())
    }
}
