use super::{GridVariant, ensure_cell_steps, name_number};
use crate::config::{DotGridConfig, GridOptions, PageConfig};
use crate::error::GridError;
use crate::geometry::stepped_positions;
use crate::page::{GridNames, GridPage, RenderedPage};
use crate::svg::{Circle, Drawer, Primitive};

/// Dots at every intersection of a square grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DotGrid {
    page: GridPage,
    config: DotGridConfig,
}

impl DotGrid {
    pub fn new(options: &GridOptions) -> Result<Self, GridError> {
        let config = DotGridConfig::resolve(options)?;
        let cell = format!("{}mm", name_number(config.cell_size));
        let names = GridNames::from_parts(
            &["dot".to_string(), "grid".to_string(), cell.clone()],
            &["dot".to_string(), "grid".to_string(), cell],
        );
        let page = GridPage::new(PageConfig::resolve(options)?, names)?;
        ensure_cell_steps(&page, "cellSize", config.cell_size)?;
        Ok(Self { page, config })
    }

    pub fn config(&self) -> &DotGridConfig {
        &self.config
    }
}

impl GridVariant for DotGrid {
    fn page(&self) -> &GridPage {
        &self.page
    }

    fn draw_pattern(&self, frame: &RenderedPage, drawer: &mut Drawer<'_>) -> Result<(), GridError> {
        let area = frame.grid_box();
        let cell = self.config.cell_size;
        let rows = stepped_positions(area.y, area.height, cell);
        let columns = stepped_positions(area.x, area.width, cell);

        frame.open_pattern_group(drawer);
        for y in &rows {
            for x in &columns {
                drawer.draw(Primitive::Circle(Circle {
                    cx: *x,
                    cy: *y,
                    r: self.config.dot_size / 2.0,
                    fill: self.config.line_color.clone(),
                }));
            }
        }
        drawer.close();
        log::debug!("dot grid: {} x {} dots", rows.len(), columns.len());
        Ok(())
    }
}
