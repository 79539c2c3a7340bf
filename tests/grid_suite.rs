use guideline_grid::geometry::{Rect, intersect, slant_end};
use guideline_grid::grid::{CalligraphyLineGrid, DotGrid};
use guideline_grid::ids::{RandomIds, SequentialIds};
use guideline_grid::render::{PageOrientation, PageSpec, write_output_svg};
use guideline_grid::svg::SvgNode;
use guideline_grid::{Grid, GridError, GridKind, GridOptions, GridVariant};
use serde_json::{Value, json};

fn options(value: Value) -> GridOptions {
    GridOptions::from_value(value).expect("options parse")
}

fn small_page() -> Value {
    json!({
        "documentWidth": 40,
        "documentHeight": 40,
        "documentMarginTop": 2,
        "documentMarginBottom": 2,
        "documentMarginLeft": 2,
        "documentMarginRight": 2,
        "cellSize": 5,
        "addTitle": false,
        "addCopyright": false
    })
}

/// Replaces the random five-character id suffixes with a fixed marker.
fn normalize_ids(svg: &str) -> String {
    let mut out = svg.to_string();
    for prefix in ["grid-page-", "mask-"] {
        let mut result = String::with_capacity(out.len());
        let mut rest = out.as_str();
        while let Some(pos) = rest.find(prefix) {
            let end = pos + prefix.len();
            result.push_str(&rest[..end]);
            result.push_str("XXXXX");
            rest = rest.get(end + 5..).unwrap_or("");
        }
        result.push_str(rest);
        out = result;
    }
    out
}

#[test]
fn dot_grid_end_to_end() {
    let grid = Grid::new(GridKind::Dot, &options(small_page())).unwrap();
    let (root, frame) = grid.make_svg_with(&mut SequentialIds::new()).unwrap();
    assert_eq!(frame.grid_width(), 36.0);
    assert_eq!(frame.grid_height(), 36.0);
    assert_eq!(root.find_all("circle").len(), 64);
}

#[test]
fn stepped_axes_leave_equal_slack() {
    for cell in [3.0, 4.0, 5.5, 7.0] {
        let mut value = small_page();
        value["cellSize"] = json!(cell);
        value["documentWidth"] = json!(53);
        let grid = DotGrid::new(&options(value)).unwrap();
        let (root, frame) = grid.make_svg_with(&mut SequentialIds::new()).unwrap();
        let xs: Vec<f64> = root
            .find_all("circle")
            .iter()
            .map(|c| c.attr("cx").unwrap().parse().unwrap())
            .collect();
        let first = xs.iter().cloned().fold(f64::INFINITY, f64::min);
        let last = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let left_slack = first - frame.margin_left();
        let right_slack = frame.margin_left() + frame.grid_width() - last;
        // coordinates are rounded to two decimals
        assert!((left_slack - right_slack).abs() <= 0.011, "cell {cell}");
    }
}

#[test]
fn both_backends_produce_identical_markup() {
    for kind in GridKind::ALL {
        let grid = Grid::new(kind, &GridOptions::default()).unwrap();
        let (tree, _) = grid.make_svg_with(&mut SequentialIds::new()).unwrap();
        let (string, _) = grid.make_svg_string_with(&mut SequentialIds::new()).unwrap();
        assert_eq!(tree.to_markup(), string, "{kind}");
    }
}

#[test]
fn fresh_instances_render_identically() {
    for kind in GridKind::ALL {
        let first = Grid::new(kind, &GridOptions::default()).unwrap();
        let second = Grid::new(kind, &GridOptions::default()).unwrap();
        let a = first.make_svg_string_with(&mut SequentialIds::new()).unwrap().0;
        let b = second.make_svg_string_with(&mut SequentialIds::new()).unwrap().0;
        assert_eq!(a, b, "{kind}");

        let a = first.make_svg_string_with(&mut RandomIds).unwrap().0;
        let b = second.make_svg_string_with(&mut RandomIds).unwrap().0;
        assert_eq!(normalize_ids(&a), normalize_ids(&b), "{kind}");
    }
}

#[test]
fn calligraphy_line_height() {
    let grid = CalligraphyLineGrid::new(&options(json!({
        "xHeight": 7,
        "ratioAscender": 3,
        "ratioBase": 2,
        "ratioDescender": 3
    })))
    .unwrap();
    // each ratio unit of the 2-unit base zone is 3.5mm: 10.5 + 7 + 10.5
    assert!((grid.line_height() - 28.0).abs() < 1e-12);
}

#[test]
fn slant_line_offset() {
    let end = slant_end(0.0, 0.0, 10.0, 55.0).unwrap();
    assert!((end.x - 7.0021).abs() < 1e-4);
    assert_eq!(end.y, -10.0);
}

#[test]
fn intersect_outside_and_through_center() {
    let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    assert!(intersect(200.0, 0.0, 300.0, 10.0, &rect).is_empty());

    let points = intersect(50.0, 25.0, 60.0, 30.0, &rect);
    assert_eq!(points.len(), 2);
    for p in points {
        let on_edge = p.x == rect.x || p.x == rect.right() || p.y == rect.y || p.y == rect.bottom();
        assert!(on_edge, "{p:?}");
    }
}

#[test]
fn configuration_errors_are_named() {
    let cases = [
        (GridKind::CalligraphyLine, json!({"slantAngle": 90}), "slantAngle"),
        (GridKind::CalligraphyArea, json!({"slantAngle": -5}), "slantAngle"),
        (GridKind::CalligraphyLine, json!({"ratioBase": 0}), "ratioBase"),
        (GridKind::Graph, json!({"cellSize": 0}), "cellSize"),
        (GridKind::Dot, json!({"documentWidth": 10}), "documentWidth"),
        (GridKind::CalligraphyLine, json!({"slantLinesPerLine": -1}), "slantLinesPerLine"),
        (GridKind::CalligraphyLine, json!({"slantLinesPerLine": 2.5}), "slantLinesPerLine"),
        (GridKind::Graph, json!({"coordinateDecimalPlaceMax": 1.5}), "coordinateDecimalPlaceMax"),
    ];
    for (kind, value, expected) in cases {
        match Grid::new(kind, &options(value.clone())) {
            Err(GridError::InvalidConfig { field, .. }) => assert_eq!(field, expected, "{value}"),
            other => panic!("{value}: expected config error, got {other:?}"),
        }
    }
}

#[test]
fn runaway_repetition_counts_are_rejected() {
    let cases = [
        (GridKind::Dot, json!({"cellSize": 1e-12}), "cellSize"),
        (GridKind::Graph, json!({"cellSize": 0.001}), "cellSize"),
        (GridKind::CalligraphyLine, json!({"xHeight": 1e-6}), "xHeight"),
        (GridKind::CalligraphyLine, json!({"slantLinesPerLine": 1e9}), "slantLinesPerLine"),
        (GridKind::CalligraphyArea, json!({"xHeight": 1e-9}), "xHeight"),
        (GridKind::CalligraphyArea, json!({"slantAngleGap": 1e-9}), "slantAngleGap"),
    ];
    for (kind, value, expected) in cases {
        match Grid::new(kind, &options(value.clone())) {
            Err(GridError::InvalidConfig { field, .. }) => assert_eq!(field, expected, "{value}"),
            other => panic!("{value}: expected config error, got {other:?}"),
        }
    }

    // fine but bounded steps still render
    let grid = Grid::new(GridKind::Dot, &options(json!({"cellSize": 0.5}))).unwrap();
    assert!(grid.make_svg_string().is_ok());
}

#[test]
fn no_non_finite_numbers_reach_the_output() {
    let pages = [
        json!({"documentHeight": 45}),
        json!({"documentHeight": 80, "slantLinesPerLine": 1}),
        json!({"slantLinesPerLine": 0}),
        json!({"cellSize": 500}),
    ];
    for kind in GridKind::ALL {
        for page in &pages {
            let grid = Grid::new(kind, &options(page.clone())).unwrap();
            let svg = grid.make_svg_string_with(&mut SequentialIds::new()).unwrap().0;
            assert!(!svg.contains("NaN") && !svg.contains("inf"), "{kind} {page}");
        }
    }
}

#[test]
fn render_into_reports_missing_target() {
    let grid = Grid::new(GridKind::Graph, &GridOptions::default()).unwrap();
    let err = grid.render_into(None, &mut SequentialIds::new()).unwrap_err();
    assert!(matches!(err, GridError::TargetUnavailable(_)));

    let mut host = SvgNode::container("div");
    grid.render_into(Some(&mut host), &mut SequentialIds::new()).unwrap();
    assert_eq!(host.children()[0].attr("id"), Some("grid-page-1"));
}

#[test]
fn page_spec_for_exporters() {
    let grid = Grid::new(
        GridKind::CalligraphyArea,
        &options(json!({"documentWidth": 297, "documentHeight": 210})),
    )
    .unwrap();
    let (_, frame) = grid.make_svg_with(&mut SequentialIds::new()).unwrap();
    let spec = PageSpec::from_page(&frame);
    assert_eq!(spec.orientation, PageOrientation::Landscape);
    assert_eq!(spec.file_name, "55deg_7mm");
}

#[test]
fn writes_svg_file() {
    let dir = tempfile::tempdir().unwrap();
    let grid = Grid::new(GridKind::Dot, &GridOptions::default()).unwrap();
    let svg = grid.make_svg_string().unwrap();
    let path = dir.path().join(format!("{}.svg", grid.file_name()));
    write_output_svg(&svg, Some(&path)).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, svg);
    assert!(written.starts_with("<svg"));
}

#[cfg(feature = "png")]
#[test]
fn writes_png_file() {
    use guideline_grid::config::RenderConfig;
    use guideline_grid::render::write_output_png;

    let dir = tempfile::tempdir().unwrap();
    let grid = Grid::new(GridKind::Graph, &options(small_page())).unwrap();
    let svg = grid.make_svg_string().unwrap();
    let path = dir.path().join("graph.png");
    let render_cfg = RenderConfig {
        dpi: 96.0,
        ..RenderConfig::default()
    };
    write_output_png(&svg, &path, &render_cfg).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}
