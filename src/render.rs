use crate::config::RenderConfig;
use crate::error::GridError;
use crate::page::RenderedPage;
use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageOrientation {
    Portrait,
    Landscape,
}

/// What a paged-document exporter needs to place a rendered grid on a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpec {
    pub width_mm: f64,
    pub height_mm: f64,
    pub orientation: PageOrientation,
    pub file_name: String,
}

impl PageSpec {
    pub fn from_page(page: &RenderedPage) -> Self {
        let orientation = if page.width() > page.height() {
            PageOrientation::Landscape
        } else {
            PageOrientation::Portrait
        };
        Self {
            width_mm: page.width(),
            height_mm: page.height(),
            orientation,
            file_name: page.file_name.clone(),
        }
    }
}

/// Resolves where a page goes: a directory receives `{file_name}.{ext}`,
/// anything else is used as the file path.
pub fn output_path(output: &Path, file_name: &str, ext: &str) -> PathBuf {
    if output.is_dir() {
        output.join(format!("{file_name}.{ext}"))
    } else {
        output.to_path_buf()
    }
}

fn ensure_parent(path: &Path) -> Result<(), GridError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(GridError::TargetUnavailable(format!(
                "directory {} does not exist",
                parent.display()
            )))
        }
        _ => Ok(()),
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            ensure_parent(path)?;
            std::fs::write(path, svg)?;
            log::info!("wrote {}", path.display());
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    ensure_parent(output)?;
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    // usvg resolves the mm document size at 96 dpi
    let scale = render_cfg.dpi / 96.0;
    let size = tree.size().to_int_size().scale_by(scale).ok_or_else(|| {
        anyhow::anyhow!("cannot rasterize at {} dpi", render_cfg.dpi)
    })?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;
    if let Some((r, g, b)) = parse_hex_rgb(&render_cfg.background) {
        pixmap.fill(resvg::tiny_skia::Color::from_rgba8(r, g, b, 255));
    }

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap.save_png(output)?;
    log::info!(
        "wrote {} ({}x{} px at {} dpi)",
        output.display(),
        size.width(),
        size.height(),
        render_cfg.dpi
    );
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

/// `#rrggbb` to channels; anything else leaves the background transparent.
#[cfg_attr(not(feature = "png"), allow(dead_code))]
fn parse_hex_rgb(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}
