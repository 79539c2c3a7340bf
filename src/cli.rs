use crate::config::{
    GridOptions, RenderConfig, load_options_value, merge_overrides, parse_override,
};
use crate::grid::{Grid, GridKind, GridVariant};
use crate::ids::{IdGenerator, RandomIds, SequentialIds};
use crate::render::{PageSpec, output_path, write_output_png, write_output_svg};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gridgen", version, about = "Printable calligraphy, graph and dot guideline pages")]
pub struct Args {
    /// Grid variant to draw
    #[arg(short = 'k', long = "kind", value_enum, default_value = "dot")]
    pub kind: KindArg,

    /// Output file (svg/png) or directory. Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Option file (.json or .json5) with camelCase grid options
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Single option override, e.g. `--set cellSize=4`. Repeatable.
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Document width in mm
    #[arg(short = 'w', long = "width")]
    pub width: Option<f64>,

    /// Document height in mm
    #[arg(short = 'H', long = "height")]
    pub height: Option<f64>,

    /// Raster resolution for PNG output
    #[arg(long = "dpi", default_value_t = 300.0)]
    pub dpi: f32,

    /// Number element ids instead of randomizing them
    #[arg(long = "sequential-ids")]
    pub sequential_ids: bool,

    /// Print the page names and page spec instead of rendering
    #[arg(long = "info")]
    pub info: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum KindArg {
    Dot,
    Graph,
    CalligraphyLine,
    CalligraphyArea,
}

impl From<KindArg> for GridKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Dot => GridKind::Dot,
            KindArg::Graph => GridKind::Graph,
            KindArg::CalligraphyLine => GridKind::CalligraphyLine,
            KindArg::CalligraphyArea => GridKind::CalligraphyArea,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let options = resolve_options(&args)?;
    let grid = Grid::new(args.kind.into(), &options)?;
    log::info!("drawing {} ({})", grid.pretty_name(), grid.kind());

    let mut ids: Box<dyn IdGenerator> = if args.sequential_ids {
        Box::new(SequentialIds::new())
    } else {
        Box::new(RandomIds)
    };
    let (svg, frame) = grid.make_svg_string_with(ids.as_mut())?;

    if args.info {
        let info = serde_json::json!({
            "prettyName": frame.pretty_name,
            "fileName": frame.file_name,
            "page": PageSpec::from_page(&frame),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let ext = args.output_format.extension();
    let output = args
        .output
        .as_deref()
        .map(|path| output_path(path, &frame.file_name, ext));
    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = output.ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
            let render_cfg = RenderConfig {
                dpi: args.dpi,
                ..RenderConfig::default()
            };
            write_output_png(&svg, &output, &render_cfg)?;
        }
    }
    Ok(())
}

/// Config file, then `--set` pairs, then `--width`/`--height`.
fn resolve_options(args: &Args) -> Result<GridOptions> {
    let mut overrides = args
        .set
        .iter()
        .map(|raw| parse_override(raw))
        .collect::<Result<Vec<_>>>()?;
    if let Some(width) = args.width {
        overrides.push(("documentWidth".to_string(), Value::from(width)));
    }
    if let Some(height) = args.height {
        overrides.push(("documentHeight".to_string(), Value::from(height)));
    }
    let value = merge_overrides(load_options_value(args.config.as_deref())?, &overrides);
    GridOptions::from_value(value)
}
