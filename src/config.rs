//! Page options and their resolution into per-variant configurations.
//!
//! Options arrive as one flat camelCase object ([`GridOptions`]); every field
//! is optional and unknown keys are ignored. Each variant resolves the
//! options it cares about with the precedence documented on [`layered`].

use crate::error::{
    GridError, MAX_REPETITIONS, ensure_count, ensure_finite, ensure_non_negative, ensure_positive,
};
use crate::geometry::validate_slant_angle;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

pub const DEFAULT_STROKE_COLOR: &str = "#000000";
pub const DEFAULT_STROKE_WIDTH: f64 = 0.2;
pub const DEFAULT_COPYRIGHT_TEXT: &str = "© grid code.halfapx.com/guideline-generator/";
const MAX_DECIMALS: u32 = 12;

/// Resolves one option from its layers, highest precedence first:
/// the variant-specific key, then the generic key (`color` / `stroke`),
/// then the variant default.
pub fn layered<T>(specific: Option<T>, generic: Option<T>, default: T) -> T {
    specific.or(generic).unwrap_or(default)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridOptions {
    pub document_width: Option<f64>,
    pub document_height: Option<f64>,
    pub document_margin_top: Option<f64>,
    pub document_margin_bottom: Option<f64>,
    pub document_margin_left: Option<f64>,
    pub document_margin_right: Option<f64>,
    pub add_area_box: Option<bool>,
    pub color: Option<String>,
    pub stroke: Option<f64>,
    pub area_stroke_width: Option<f64>,
    pub area_stroke_color: Option<String>,
    pub area_border_radius: Option<f64>,
    pub add_title: Option<bool>,
    pub add_copyright: Option<bool>,
    pub copyright_text: Option<String>,
    pub coordinate_decimal_place_max: Option<f64>,
    pub text_font_size: Option<f64>,
    pub text_line_height: Option<f64>,

    pub line_color: Option<String>,
    pub cell_size: Option<f64>,
    pub dot_size: Option<f64>,
    pub grid_stroke_width: Option<f64>,
    pub grid_base_line_stroke_width: Option<f64>,
    pub x_height: Option<f64>,
    pub ratio_ascender: Option<f64>,
    pub ratio_base: Option<f64>,
    pub ratio_descender: Option<f64>,
    pub slant_angle: Option<f64>,
    pub show_x_height_indicator: Option<bool>,
    pub x_height_indicator_stroke_width: Option<f64>,
    pub slant_lines_per_line: Option<f64>,
    pub area_block_buffer: Option<f64>,
    pub add_divider_lines: Option<bool>,
    pub slant_angle_gap: Option<f64>,
    pub slant_line_min_length: Option<f64>,
}

impl GridOptions {
    pub fn from_value(value: Value) -> anyhow::Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    pub document_width: f64,
    pub document_height: f64,
    pub document_margin_top: f64,
    pub document_margin_bottom: f64,
    pub document_margin_left: f64,
    pub document_margin_right: f64,
    pub color: String,
    pub stroke: f64,
    pub add_area_box: bool,
    pub area_border_radius: f64,
    pub area_stroke_width: f64,
    pub area_stroke_color: String,
    pub add_title: bool,
    pub add_copyright: bool,
    pub copyright_text: String,
    pub coordinate_decimal_place_max: u32,
    pub text_font_size: f64,
    pub text_line_height: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            document_width: 210.0,
            document_height: 297.0,
            document_margin_top: 10.0,
            document_margin_bottom: 10.0,
            document_margin_left: 7.0,
            document_margin_right: 7.0,
            color: DEFAULT_STROKE_COLOR.to_string(),
            stroke: DEFAULT_STROKE_WIDTH,
            add_area_box: true,
            area_border_radius: 5.0,
            area_stroke_width: DEFAULT_STROKE_WIDTH,
            area_stroke_color: DEFAULT_STROKE_COLOR.to_string(),
            add_title: true,
            add_copyright: true,
            copyright_text: DEFAULT_COPYRIGHT_TEXT.to_string(),
            coordinate_decimal_place_max: 2,
            text_font_size: 4.0,
            text_line_height: 1.2,
        }
    }
}

impl PageConfig {
    pub fn resolve(options: &GridOptions) -> Result<Self, GridError> {
        let defaults = Self::default();
        let coordinate_decimal_place_max = match options.coordinate_decimal_place_max {
            Some(value) => ensure_count("coordinateDecimalPlaceMax", value)?,
            None => defaults.coordinate_decimal_place_max,
        };
        let config = Self {
            document_width: options.document_width.unwrap_or(defaults.document_width),
            document_height: options.document_height.unwrap_or(defaults.document_height),
            document_margin_top: options
                .document_margin_top
                .unwrap_or(defaults.document_margin_top),
            document_margin_bottom: options
                .document_margin_bottom
                .unwrap_or(defaults.document_margin_bottom),
            document_margin_left: options
                .document_margin_left
                .unwrap_or(defaults.document_margin_left),
            document_margin_right: options
                .document_margin_right
                .unwrap_or(defaults.document_margin_right),
            color: options.color.clone().unwrap_or(defaults.color),
            stroke: options.stroke.unwrap_or(defaults.stroke),
            add_area_box: options.add_area_box.unwrap_or(defaults.add_area_box),
            area_border_radius: options
                .area_border_radius
                .unwrap_or(defaults.area_border_radius),
            area_stroke_width: layered(
                options.area_stroke_width,
                options.stroke,
                defaults.area_stroke_width,
            ),
            area_stroke_color: layered(
                options.area_stroke_color.clone(),
                options.color.clone(),
                defaults.area_stroke_color,
            ),
            add_title: options.add_title.unwrap_or(defaults.add_title),
            add_copyright: options.add_copyright.unwrap_or(defaults.add_copyright),
            copyright_text: options
                .copyright_text
                .clone()
                .unwrap_or(defaults.copyright_text),
            coordinate_decimal_place_max,
            text_font_size: options.text_font_size.unwrap_or(defaults.text_font_size),
            text_line_height: options.text_line_height.unwrap_or(defaults.text_line_height),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), GridError> {
        ensure_positive("documentWidth", self.document_width)?;
        ensure_positive("documentHeight", self.document_height)?;
        ensure_non_negative("documentMarginTop", self.document_margin_top)?;
        ensure_non_negative("documentMarginBottom", self.document_margin_bottom)?;
        ensure_non_negative("documentMarginLeft", self.document_margin_left)?;
        ensure_non_negative("documentMarginRight", self.document_margin_right)?;
        ensure_non_negative("stroke", self.stroke)?;
        ensure_non_negative("areaBorderRadius", self.area_border_radius)?;
        ensure_non_negative("areaStrokeWidth", self.area_stroke_width)?;
        ensure_non_negative("textFontSize", self.text_font_size)?;
        ensure_non_negative("textLineHeight", self.text_line_height)?;
        if self.coordinate_decimal_place_max > MAX_DECIMALS {
            return Err(GridError::invalid(
                "coordinateDecimalPlaceMax",
                format!(
                    "must be at most {MAX_DECIMALS}, got {}",
                    self.coordinate_decimal_place_max
                ),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DotGridConfig {
    pub line_color: String,
    pub cell_size: f64,
    pub dot_size: f64,
}

impl DotGridConfig {
    pub fn resolve(options: &GridOptions) -> Result<Self, GridError> {
        let config = Self {
            line_color: layered(
                options.line_color.clone(),
                options.color.clone(),
                DEFAULT_STROKE_COLOR.to_string(),
            ),
            cell_size: options.cell_size.unwrap_or(5.0),
            dot_size: layered(options.dot_size, options.stroke, 0.4),
        };
        ensure_positive("cellSize", config.cell_size)?;
        ensure_non_negative("dotSize", config.dot_size)?;
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphGridConfig {
    pub line_color: String,
    pub cell_size: f64,
    pub grid_stroke_width: f64,
}

impl GraphGridConfig {
    pub fn resolve(options: &GridOptions) -> Result<Self, GridError> {
        let config = Self {
            line_color: layered(
                options.line_color.clone(),
                options.color.clone(),
                DEFAULT_STROKE_COLOR.to_string(),
            ),
            cell_size: options.cell_size.unwrap_or(5.0),
            grid_stroke_width: layered(
                options.grid_stroke_width,
                options.stroke,
                DEFAULT_STROKE_WIDTH,
            ),
        };
        ensure_positive("cellSize", config.cell_size)?;
        ensure_non_negative("gridStrokeWidth", config.grid_stroke_width)?;
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalligraphyLineConfig {
    pub line_color: String,
    pub grid_stroke_width: f64,
    pub grid_base_line_stroke_width: f64,
    pub x_height: f64,
    pub ratio_ascender: f64,
    pub ratio_base: f64,
    pub ratio_descender: f64,
    /// Degrees from horizontal; `0` disables slant lines.
    pub slant_angle: f64,
    pub show_x_height_indicator: bool,
    pub x_height_indicator_stroke_width: f64,
    pub slant_lines_per_line: u32,
    pub area_block_buffer: f64,
    pub add_divider_lines: bool,
}

impl CalligraphyLineConfig {
    pub fn resolve(options: &GridOptions) -> Result<Self, GridError> {
        let config = Self {
            line_color: layered(
                options.line_color.clone(),
                options.color.clone(),
                DEFAULT_STROKE_COLOR.to_string(),
            ),
            grid_stroke_width: layered(
                options.grid_stroke_width,
                options.stroke,
                DEFAULT_STROKE_WIDTH,
            ),
            grid_base_line_stroke_width: options.grid_base_line_stroke_width.unwrap_or(0.5),
            x_height: options.x_height.unwrap_or(7.0),
            ratio_ascender: options.ratio_ascender.unwrap_or(3.0),
            ratio_base: options.ratio_base.unwrap_or(2.0),
            ratio_descender: options.ratio_descender.unwrap_or(3.0),
            slant_angle: options.slant_angle.unwrap_or(55.0),
            show_x_height_indicator: options.show_x_height_indicator.unwrap_or(true),
            x_height_indicator_stroke_width: options
                .x_height_indicator_stroke_width
                .unwrap_or(2.0),
            slant_lines_per_line: match options.slant_lines_per_line {
                Some(value) => ensure_count("slantLinesPerLine", value)?,
                None => 10,
            },
            area_block_buffer: options.area_block_buffer.unwrap_or(7.0),
            add_divider_lines: options.add_divider_lines.unwrap_or(true),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), GridError> {
        ensure_non_negative("gridStrokeWidth", self.grid_stroke_width)?;
        ensure_non_negative("gridBaseLineStrokeWidth", self.grid_base_line_stroke_width)?;
        ensure_non_negative(
            "xHeightIndicatorStrokeWidth",
            self.x_height_indicator_stroke_width,
        )?;
        ensure_positive("xHeight", self.x_height)?;
        ensure_non_negative("ratioAscender", self.ratio_ascender)?;
        ensure_positive("ratioBase", self.ratio_base)?;
        ensure_non_negative("ratioDescender", self.ratio_descender)?;
        // each zone is split into `ratio` divider bands
        for (field, ratio) in [
            ("ratioAscender", self.ratio_ascender),
            ("ratioBase", self.ratio_base),
            ("ratioDescender", self.ratio_descender),
        ] {
            if ratio > MAX_REPETITIONS as f64 {
                return Err(GridError::invalid(
                    field,
                    format!("must be at most {MAX_REPETITIONS}, got {ratio}"),
                ));
            }
        }
        if self.slant_lines_per_line as usize > MAX_REPETITIONS {
            return Err(GridError::invalid(
                "slantLinesPerLine",
                format!("must be at most {MAX_REPETITIONS}, got {}", self.slant_lines_per_line),
            ));
        }
        ensure_non_negative("areaBlockBuffer", self.area_block_buffer)?;
        ensure_finite("slantAngle", self.slant_angle)?;
        if self.slant_angle != 0.0 {
            validate_slant_angle("slantAngle", self.slant_angle)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalligraphyAreaConfig {
    pub line_color: String,
    pub grid_stroke_width: f64,
    pub x_height: f64,
    pub slant_angle: f64,
    pub slant_angle_gap: f64,
    pub slant_line_min_length: f64,
    pub add_divider_lines: bool,
}

impl CalligraphyAreaConfig {
    pub fn resolve(options: &GridOptions) -> Result<Self, GridError> {
        let config = Self {
            line_color: layered(
                options.line_color.clone(),
                options.color.clone(),
                DEFAULT_STROKE_COLOR.to_string(),
            ),
            grid_stroke_width: layered(
                options.grid_stroke_width,
                options.stroke,
                DEFAULT_STROKE_WIDTH,
            ),
            x_height: options.x_height.unwrap_or(7.0),
            slant_angle: options.slant_angle.unwrap_or(55.0),
            slant_angle_gap: options.slant_angle_gap.unwrap_or(10.0),
            slant_line_min_length: options.slant_line_min_length.unwrap_or(10.0),
            add_divider_lines: options.add_divider_lines.unwrap_or(true),
        };
        ensure_non_negative("gridStrokeWidth", config.grid_stroke_width)?;
        ensure_positive("xHeight", config.x_height)?;
        ensure_positive("slantAngleGap", config.slant_angle_gap)?;
        ensure_non_negative("slantLineMinLength", config.slant_line_min_length)?;
        ensure_finite("slantAngle", config.slant_angle)?;
        if config.slant_angle != 0.0 {
            validate_slant_angle("slantAngle", config.slant_angle)?;
        }
        Ok(config)
    }
}

/// Raster export settings. The SVG itself is sized in millimetres.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub dpi: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dpi: 300.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

/// Reads an option file. `.json5` files may carry comments and trailing
/// commas; everything else is parsed as strict JSON.
pub fn load_options_value(path: Option<&Path>) -> anyhow::Result<Value> {
    let Some(path) = path else {
        return Ok(Value::Object(Default::default()));
    };

    let contents = std::fs::read_to_string(path)?;
    let is_json5 = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json5"))
        .unwrap_or(false);
    let parsed: Value = if is_json5 {
        json5::from_str(&contents)?
    } else {
        serde_json::from_str(&contents)?
    };
    if !parsed.is_object() {
        return Err(anyhow::anyhow!(
            "config file {} must contain a JSON object",
            path.display()
        ));
    }
    Ok(parsed)
}

pub fn load_options(path: Option<&Path>) -> anyhow::Result<GridOptions> {
    GridOptions::from_value(load_options_value(path)?)
}

/// Parses a `key=value` override. Values that read as JSON (numbers,
/// booleans, quoted strings) keep their type; anything else is a string.
pub fn parse_override(raw: &str) -> anyhow::Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("override `{raw}` must look like key=value"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow::anyhow!("override `{raw}` has an empty key"));
    }
    let value = value.trim();
    let parsed = serde_json::from_str::<Value>(value)
        .ok()
        .filter(|v| v.is_number() || v.is_boolean() || v.is_string())
        .unwrap_or_else(|| Value::String(value.to_string()));
    Ok((key.to_string(), parsed))
}

/// Applies overrides on top of a loaded option object, later entries win.
pub fn merge_overrides(mut base: Value, overrides: &[(String, Value)]) -> Value {
    if !base.is_object() {
        base = Value::Object(Default::default());
    }
    if let Value::Object(map) = &mut base {
        for (key, value) in overrides {
            map.insert(key.clone(), value.clone());
        }
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn options(value: Value) -> GridOptions {
        GridOptions::from_value(value).unwrap()
    }

    #[test]
    fn layered_precedence() {
        assert_eq!(layered(Some(1), Some(2), 3), 1);
        assert_eq!(layered(None, Some(2), 3), 2);
        assert_eq!(layered::<i32>(None, None, 3), 3);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let opts = options(json!({"cellSize": 4, "somethingElse": "x", "container": null}));
        assert_eq!(opts.cell_size, Some(4.0));
    }

    #[test]
    fn generic_color_overrides_variant_defaults() {
        let opts = options(json!({"color": "#ff0000", "stroke": 0.3}));
        let graph = GraphGridConfig::resolve(&opts).unwrap();
        assert_eq!(graph.line_color, "#ff0000");
        assert_eq!(graph.grid_stroke_width, 0.3);
        let page = PageConfig::resolve(&opts).unwrap();
        assert_eq!(page.area_stroke_color, "#ff0000");
        assert_eq!(page.area_stroke_width, 0.3);
    }

    #[test]
    fn specific_key_beats_generic_key() {
        let opts = options(json!({"color": "#ff0000", "lineColor": "#00ff00", "stroke": 1, "dotSize": 0.8}));
        let dot = DotGridConfig::resolve(&opts).unwrap();
        assert_eq!(dot.line_color, "#00ff00");
        assert_eq!(dot.dot_size, 0.8);
    }

    #[test]
    fn generic_stroke_maps_to_dot_size() {
        let dot = DotGridConfig::resolve(&options(json!({"stroke": 0.7}))).unwrap();
        assert_eq!(dot.dot_size, 0.7);
        let dot = DotGridConfig::resolve(&GridOptions::default()).unwrap();
        assert_eq!(dot.dot_size, 0.4);
    }

    #[test]
    fn page_defaults() {
        let page = PageConfig::resolve(&GridOptions::default()).unwrap();
        assert_eq!(page, PageConfig::default());
        assert_eq!(page.document_width, 210.0);
        assert_eq!(page.document_margin_left, 7.0);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(PageConfig::resolve(&options(json!({"documentWidth": 0}))).is_err());
        assert!(PageConfig::resolve(&options(json!({"documentMarginTop": -1}))).is_err());
        assert!(DotGridConfig::resolve(&options(json!({"cellSize": 0}))).is_err());
        assert!(CalligraphyLineConfig::resolve(&options(json!({"ratioBase": 0}))).is_err());
        assert!(CalligraphyLineConfig::resolve(&options(json!({"slantAngle": 90}))).is_err());
        assert!(CalligraphyAreaConfig::resolve(&options(json!({"slantAngle": 95}))).is_err());
        assert!(CalligraphyAreaConfig::resolve(&options(json!({"slantAngleGap": 0}))).is_err());
        assert!(CalligraphyLineConfig::resolve(&options(json!({"slantAngle": 0}))).is_ok());
    }

    fn invalid_field<T: std::fmt::Debug>(result: Result<T, GridError>) -> &'static str {
        match result {
            Err(GridError::InvalidConfig { field, .. }) => field,
            other => panic!("expected a config error, got {other:?}"),
        }
    }

    #[test]
    fn counts_are_validated_by_name() {
        let line = |value| CalligraphyLineConfig::resolve(&options(value));
        assert_eq!(invalid_field(line(json!({"slantLinesPerLine": -1}))), "slantLinesPerLine");
        assert_eq!(invalid_field(line(json!({"slantLinesPerLine": 2.5}))), "slantLinesPerLine");
        assert_eq!(invalid_field(line(json!({"slantLinesPerLine": 20000}))), "slantLinesPerLine");
        assert_eq!(line(json!({"slantLinesPerLine": 4})).unwrap().slant_lines_per_line, 4);

        let page = |value| PageConfig::resolve(&options(value));
        assert_eq!(
            invalid_field(page(json!({"coordinateDecimalPlaceMax": 1.5}))),
            "coordinateDecimalPlaceMax"
        );
        assert_eq!(page(json!({"coordinateDecimalPlaceMax": 3})).unwrap().coordinate_decimal_place_max, 3);
    }

    #[test]
    fn oversized_ratios_are_rejected() {
        let line = |value| CalligraphyLineConfig::resolve(&options(value));
        assert_eq!(invalid_field(line(json!({"ratioAscender": 1e9}))), "ratioAscender");
        assert_eq!(invalid_field(line(json!({"ratioDescender": 1e9}))), "ratioDescender");
    }

    #[test]
    fn parse_override_keeps_types() {
        assert_eq!(parse_override("cellSize=4").unwrap(), ("cellSize".to_string(), json!(4)));
        assert_eq!(parse_override("addTitle=false").unwrap().1, json!(false));
        assert_eq!(parse_override("color=#ff0000").unwrap().1, json!("#ff0000"));
        assert!(parse_override("novalue").is_err());
        assert!(parse_override("=3").is_err());
    }

    #[test]
    fn overrides_win_over_file_values() {
        let merged = merge_overrides(
            json!({"cellSize": 5, "color": "#000"}),
            &[("cellSize".to_string(), json!(8))],
        );
        let opts = options(merged);
        assert_eq!(opts.cell_size, Some(8.0));
        assert_eq!(opts.color.as_deref(), Some("#000"));
    }

    #[test]
    fn loads_json5_files() {
        let mut file = tempfile::Builder::new().suffix(".json5").tempfile().unwrap();
        writeln!(file, "{{\n  // comment\n  cellSize: 6,\n  addTitle: false,\n}}").unwrap();
        let opts = load_options(Some(file.path())).unwrap();
        assert_eq!(opts.cell_size, Some(6.0));
        assert_eq!(opts.add_title, Some(false));
    }

    #[test]
    fn missing_file_path_gives_defaults() {
        assert_eq!(load_options(None).unwrap(), GridOptions::default());
    }
}
