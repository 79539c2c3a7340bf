//! Drawing primitives and the two surfaces they can be emitted to: an
//! in-memory element tree and a markup string. Both surfaces serialize
//! through [`SvgNode`], so they produce identical markup.

use crate::error::GridError;
use crate::format::CoordinateFormatter;
use crate::geometry::{Orientation, slant_end};

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

impl LineCap {
    fn as_str(self) -> &'static str {
        match self {
            Self::Butt => "butt",
            Self::Round => "round",
            Self::Square => "square",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    End,
}

impl TextAnchor {
    fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke<'a> {
    pub color: &'a str,
    pub width: f64,
}

impl<'a> Stroke<'a> {
    pub fn new(color: &'a str, width: f64) -> Self {
        Self { color, width }
    }
}

/// A straight run along one axis: `pos` is the shared y of a horizontal
/// line or the shared x of a vertical one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLine {
    pub orientation: Orientation,
    pub pos: f64,
    pub start: f64,
    pub end: f64,
}

impl AxisLine {
    pub fn horizontal(y: f64, x_start: f64, x_end: f64) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            pos: y,
            start: x_start,
            end: x_end,
        }
    }

    pub fn vertical(x: f64, y_start: f64, y_end: f64) -> Self {
        Self {
            orientation: Orientation::Vertical,
            pos: x,
            start: y_start,
            end: y_end,
        }
    }

    /// Point at `along` on this line's running axis.
    fn point_at(&self, along: f64) -> (f64, f64) {
        match self.orientation {
            Orientation::Horizontal => (along, self.pos),
            Orientation::Vertical => (self.pos, along),
        }
    }

    fn endpoints(&self) -> (f64, f64, f64, f64) {
        let (x1, y1) = self.point_at(self.start);
        let (x2, y2) = self.point_at(self.end);
        (x1, y1, x2, y2)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub color: String,
    pub stroke_width: f64,
    pub dash_array: Option<Vec<f64>>,
    pub line_cap: Option<LineCap>,
}

impl Line {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64, stroke: Stroke<'_>) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            color: stroke.color.to_string(),
            stroke_width: stroke.width,
            dash_array: None,
            line_cap: None,
        }
    }

    pub fn dashed(mut self, dash_array: Vec<f64>, line_cap: LineCap) -> Self {
        self.dash_array = Some(dash_array);
        self.line_cap = Some(line_cap);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
    pub fill: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RectShape {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rx: Option<f64>,
    pub fill: String,
    pub stroke: Option<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub x: f64,
    pub y: f64,
    pub anchor: TextAnchor,
    pub font_size: f64,
    pub font_family: String,
    pub fill: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Line(Line),
    Circle(Circle),
    Rect(RectShape),
    Text(Text),
}

impl Primitive {
    pub fn to_node(&self, fmt: &CoordinateFormatter) -> SvgNode {
        match self {
            Self::Line(line) => {
                let mut node = SvgNode::leaf("line")
                    .with_attr("x1", fmt.format(line.x1))
                    .with_attr("y1", fmt.format(line.y1))
                    .with_attr("x2", fmt.format(line.x2))
                    .with_attr("y2", fmt.format(line.y2))
                    .with_attr("stroke", &line.color)
                    .with_attr("stroke-width", fmt.format(line.stroke_width));
                if let Some(dashes) = &line.dash_array {
                    let value = dashes
                        .iter()
                        .map(|d| fmt.format(*d))
                        .collect::<Vec<_>>()
                        .join(",");
                    node = node.with_attr("stroke-dasharray", value);
                }
                if let Some(cap) = line.line_cap {
                    node = node.with_attr("stroke-linecap", cap.as_str());
                }
                node
            }
            Self::Circle(circle) => SvgNode::leaf("circle")
                .with_attr("cx", fmt.format(circle.cx))
                .with_attr("cy", fmt.format(circle.cy))
                .with_attr("r", fmt.format(circle.r))
                .with_attr("fill", &circle.fill),
            Self::Rect(rect) => {
                let mut node = SvgNode::leaf("rect")
                    .with_attr("x", fmt.format(rect.x))
                    .with_attr("y", fmt.format(rect.y))
                    .with_attr("width", fmt.format(rect.width))
                    .with_attr("height", fmt.format(rect.height));
                if let Some(rx) = rect.rx {
                    node = node.with_attr("rx", fmt.format(rx));
                }
                node = node.with_attr("fill", &rect.fill);
                if let Some((color, width)) = &rect.stroke {
                    node = node
                        .with_attr("stroke-width", fmt.format(*width))
                        .with_attr("stroke", color);
                }
                node
            }
            Self::Text(text) => SvgNode::text("text", &text.content)
                .with_attr("x", fmt.format(text.x))
                .with_attr("y", fmt.format(text.y))
                .with_attr("text-anchor", text.anchor.as_str())
                .with_attr("font-size", fmt.format(text.font_size))
                .with_attr("fill", &text.fill)
                .with_attr("font-family", &text.font_family),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Container {
    Document { width: f64, height: f64, id: String },
    Group(Group),
    Mask { id: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub class: Option<String>,
    pub id: Option<String>,
    pub mask: Option<String>,
}

impl Container {
    pub fn to_node(&self, fmt: &CoordinateFormatter) -> SvgNode {
        match self {
            Self::Document { width, height, id } => {
                let w = fmt.format(*width);
                let h = fmt.format(*height);
                SvgNode::container("svg")
                    .with_attr("xmlns", SVG_NAMESPACE)
                    .with_attr("width", format!("{w}mm"))
                    .with_attr("height", format!("{h}mm"))
                    .with_attr("viewBox", format!("0 0 {w} {h}"))
                    .with_attr("id", id)
            }
            Self::Group(group) => {
                let mut node = SvgNode::container("g");
                if let Some(class) = &group.class {
                    node = node.with_attr("class", class);
                }
                if let Some(id) = &group.id {
                    node = node.with_attr("id", id);
                }
                if let Some(mask) = &group.mask {
                    node = node.with_attr("mask", format!("url(#{mask})"));
                }
                node
            }
            Self::Mask { id } => SvgNode::container("mask").with_attr("id", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    Empty,
    Text(String),
    Children(Vec<SvgNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SvgNode {
    pub tag: &'static str,
    pub attrs: Vec<(&'static str, String)>,
    pub content: NodeContent,
}

impl SvgNode {
    pub fn leaf(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            content: NodeContent::Empty,
        }
    }

    pub fn container(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            content: NodeContent::Children(Vec::new()),
        }
    }

    pub fn text(tag: &'static str, content: &str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            content: NodeContent::Text(content.to_string()),
        }
    }

    pub fn with_attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn children(&self) -> &[SvgNode] {
        match &self.content {
            NodeContent::Children(children) => children.as_slice(),
            _ => &[],
        }
    }

    pub fn text_content(&self) -> Option<&str> {
        match &self.content {
            NodeContent::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Appends a child. Returns `false` if this node cannot hold children.
    pub fn append(&mut self, child: SvgNode) -> bool {
        match &mut self.content {
            NodeContent::Children(children) => {
                children.push(child);
                true
            }
            _ => false,
        }
    }

    /// Depth-first search for every descendant (and self) with `tag`.
    pub fn find_all(&self, tag: &str) -> Vec<&SvgNode> {
        let mut found = Vec::new();
        self.collect(tag, &mut found);
        found
    }

    fn collect<'a>(&'a self, tag: &str, found: &mut Vec<&'a SvgNode>) {
        if self.tag == tag {
            found.push(self);
        }
        for child in self.children() {
            child.collect(tag, found);
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<&SvgNode> {
        if self.attr("id") == Some(id) {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find_by_id(id))
    }

    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    pub fn write_markup(&self, out: &mut String) {
        match &self.content {
            NodeContent::Empty => {
                self.write_tag_start(out);
                out.push_str("/>");
            }
            NodeContent::Text(text) => {
                self.write_open_tag(out);
                out.push_str(&escape_xml(text));
                self.write_close_tag(out);
            }
            NodeContent::Children(children) => {
                self.write_open_tag(out);
                for child in children {
                    child.write_markup(out);
                }
                self.write_close_tag(out);
            }
        }
    }

    fn write_tag_start(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_xml(value));
            out.push('"');
        }
    }

    fn write_open_tag(&self, out: &mut String) {
        self.write_tag_start(out);
        out.push('>');
    }

    fn write_close_tag(&self, out: &mut String) {
        out.push_str("</");
        out.push_str(self.tag);
        out.push('>');
    }
}

pub trait Surface {
    /// Opens a container; following elements nest inside it until `close`.
    fn open(&mut self, node: SvgNode);
    fn close(&mut self);
    fn leaf(&mut self, node: SvgNode);
}

#[derive(Debug, Default)]
pub struct TreeSurface {
    stack: Vec<SvgNode>,
    roots: Vec<SvgNode>,
}

impl TreeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn attach(&mut self, node: SvgNode) {
        match self.stack.last_mut() {
            Some(parent) => {
                parent.append(node);
            }
            None => self.roots.push(node),
        }
    }

    /// The first completed top-level element, if every container was closed.
    pub fn into_root(self) -> Option<SvgNode> {
        if !self.stack.is_empty() {
            return None;
        }
        self.roots.into_iter().next()
    }
}

impl Surface for TreeSurface {
    fn open(&mut self, node: SvgNode) {
        self.stack.push(node);
    }

    fn close(&mut self) {
        if let Some(node) = self.stack.pop() {
            self.attach(node);
        }
    }

    fn leaf(&mut self, node: SvgNode) {
        self.attach(node);
    }
}

#[derive(Debug, Default)]
pub struct StringSurface {
    out: String,
    open_tags: Vec<&'static str>,
}

impl StringSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

impl Surface for StringSurface {
    fn open(&mut self, node: SvgNode) {
        node.write_open_tag(&mut self.out);
        self.open_tags.push(node.tag);
    }

    fn close(&mut self) {
        if let Some(tag) = self.open_tags.pop() {
            self.out.push_str("</");
            self.out.push_str(tag);
            self.out.push('>');
        }
    }

    fn leaf(&mut self, node: SvgNode) {
        node.write_markup(&mut self.out);
    }
}

/// Emits grid primitives to a [`Surface`], formatting every coordinate.
pub struct Drawer<'s> {
    surface: &'s mut dyn Surface,
    fmt: CoordinateFormatter,
    depth: usize,
    primitives: usize,
}

impl<'s> Drawer<'s> {
    pub fn new(surface: &'s mut dyn Surface, fmt: CoordinateFormatter) -> Self {
        Self {
            surface,
            fmt,
            depth: 0,
            primitives: 0,
        }
    }

    pub fn primitive_count(&self) -> usize {
        self.primitives
    }

    pub fn open(&mut self, container: Container) {
        self.surface.open(container.to_node(&self.fmt));
        self.depth += 1;
    }

    pub fn group(&mut self, class: Option<&str>, id: Option<&str>, mask: Option<&str>) {
        self.open(Container::Group(Group {
            class: class.map(str::to_string),
            id: id.map(str::to_string),
            mask: mask.map(str::to_string),
        }));
    }

    pub fn close(&mut self) {
        if self.depth > 0 {
            self.surface.close();
            self.depth -= 1;
        }
    }

    pub fn close_all(&mut self) {
        while self.depth > 0 {
            self.close();
        }
    }

    pub fn draw(&mut self, primitive: Primitive) {
        self.surface.leaf(primitive.to_node(&self.fmt));
        self.primitives += 1;
    }

    pub fn line(&mut self, line: Line) {
        self.draw(Primitive::Line(line));
    }

    pub fn solid_line(&mut self, axis: AxisLine, stroke: Stroke<'_>) {
        let (x1, y1, x2, y2) = axis.endpoints();
        self.line(Line::new(x1, y1, x2, y2, stroke));
    }

    /// A single round-capped path with zero-length dashes, which renders as
    /// a row of dots `4 * dot_radius` apart.
    pub fn dashed_line(&mut self, axis: AxisLine, dot_radius: f64, color: &str) {
        let (x1, y1, x2, y2) = axis.endpoints();
        let stroke = Stroke::new(color, dot_radius * 2.0);
        self.line(Line::new(x1, y1, x2, y2, stroke).dashed(vec![0.0, dot_radius * 4.0], LineCap::Round));
    }

    /// Discrete dots every `2 * dot_radius + gap`, starting at `axis.start`
    /// and including `axis.end` when it falls on a step. Horizontal lines
    /// use circles, vertical lines use squares. Returns the dot count.
    pub fn dotted_line(&mut self, axis: AxisLine, dot_radius: f64, gap: f64, color: &str) -> usize {
        let spacing = dot_radius * 2.0 + gap;
        if !(spacing > 0.0) || axis.end < axis.start {
            return 0;
        }
        let steps = ((axis.end - axis.start) / spacing + 1e-9).floor() as usize;
        self.group(Some("dotted-line"), None, None);
        for i in 0..=steps {
            let (x, y) = axis.point_at(axis.start + i as f64 * spacing);
            let shape = match axis.orientation {
                Orientation::Horizontal => Primitive::Circle(Circle {
                    cx: x,
                    cy: y,
                    r: dot_radius,
                    fill: color.to_string(),
                }),
                Orientation::Vertical => Primitive::Rect(RectShape {
                    x,
                    y,
                    width: dot_radius,
                    height: dot_radius,
                    rx: None,
                    fill: color.to_string(),
                    stroke: None,
                }),
            };
            self.draw(shape);
        }
        self.close();
        steps + 1
    }

    /// Stroke rising `height` from `(x_start, y_start)` at `angle` degrees
    /// from horizontal.
    pub fn slant_line(
        &mut self,
        height: f64,
        angle: f64,
        x_start: f64,
        y_start: f64,
        stroke: Stroke<'_>,
    ) -> Result<(), GridError> {
        let end = slant_end(x_start, y_start, height, angle)?;
        self.line(Line::new(x_start, y_start, end.x, end.y, stroke));
        Ok(())
    }
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw_sample(surface: &mut dyn Surface) {
        let mut drawer = Drawer::new(surface, CoordinateFormatter::default());
        drawer.open(Container::Document {
            width: 40.0,
            height: 30.0,
            id: "grid-page-1".to_string(),
        });
        drawer.group(Some("grid"), Some("calli-grid"), Some("mask-2"));
        drawer.solid_line(AxisLine::horizontal(5.123, 0.0, 40.0), Stroke::new("#000000", 0.2));
        drawer.dashed_line(AxisLine::vertical(3.0, 0.0, 30.0), 0.2, "#ff0000");
        drawer.dotted_line(AxisLine::horizontal(10.0, 0.0, 4.0), 0.5, 1.0, "#333");
        drawer.close_all();
    }

    #[test]
    fn tree_and_string_surfaces_agree() {
        let mut tree = TreeSurface::new();
        draw_sample(&mut tree);
        let root = tree.into_root().expect("document closed");

        let mut string = StringSurface::new();
        draw_sample(&mut string);

        assert_eq!(root.to_markup(), string.into_string());
    }

    #[test]
    fn solid_line_formats_coordinates() {
        let mut tree = TreeSurface::new();
        draw_sample(&mut tree);
        let root = tree.into_root().unwrap();
        let lines = root.find_all("line");
        assert_eq!(lines[0].attr("y1"), Some("5.12"));
        assert_eq!(lines[0].attr("x2"), Some("40"));
        assert_eq!(lines[0].attr("stroke-width"), Some("0.2"));
    }

    #[test]
    fn dashed_line_is_round_capped_zero_dash() {
        let mut tree = TreeSurface::new();
        draw_sample(&mut tree);
        let root = tree.into_root().unwrap();
        let dashed = root.find_all("line")[1];
        assert_eq!(dashed.attr("stroke-dasharray"), Some("0,0.8"));
        assert_eq!(dashed.attr("stroke-linecap"), Some("round"));
        assert_eq!(dashed.attr("stroke-width"), Some("0.4"));
        assert_eq!(dashed.attr("x1"), Some("3"));
        assert_eq!(dashed.attr("x2"), Some("3"));
    }

    #[test]
    fn dotted_line_includes_both_endpoints_on_step() {
        let mut tree = TreeSurface::new();
        draw_sample(&mut tree);
        let root = tree.into_root().unwrap();
        let dots = root.find_all("circle");
        // spacing 2 over a length of 4: dots at 0, 2, 4
        assert_eq!(dots.len(), 3);
        assert_eq!(dots[2].attr("cx"), Some("4"));
    }

    #[test]
    fn vertical_dotted_line_uses_squares() {
        let mut tree = TreeSurface::new();
        let mut drawer = Drawer::new(&mut tree, CoordinateFormatter::default());
        drawer.group(None, None, None);
        let count = drawer.dotted_line(AxisLine::vertical(1.0, 0.0, 5.0), 0.5, 1.0, "#000");
        drawer.close_all();
        assert_eq!(count, 3);
        let root = tree.into_root().unwrap();
        let squares = root.find_all("rect");
        assert_eq!(squares.len(), 3);
        assert_eq!(squares[0].attr("width"), Some("0.5"));
        assert_eq!(squares[1].attr("y"), Some("2"));
    }

    #[test]
    fn slant_line_rejects_flat_angle() {
        let mut surface = StringSurface::new();
        let mut drawer = Drawer::new(&mut surface, CoordinateFormatter::default());
        let stroke = Stroke::new("#000", 0.2);
        assert!(drawer.slant_line(10.0, 0.0, 0.0, 0.0, stroke).is_err());
        assert!(drawer.slant_line(10.0, 90.0, 0.0, 0.0, stroke).is_err());
        drawer.slant_line(10.0, 55.0, 0.0, 20.0, stroke).unwrap();
        assert_eq!(drawer.primitive_count(), 1);
        assert_eq!(
            surface.into_string(),
            "<line x1=\"0\" y1=\"20\" x2=\"7\" y2=\"10\" stroke=\"#000\" stroke-width=\"0.2\"/>"
        );
    }

    #[test]
    fn group_serializes_mask_reference() {
        let mut surface = StringSurface::new();
        let mut drawer = Drawer::new(&mut surface, CoordinateFormatter::default());
        drawer.group(Some("grid"), None, Some("mask-ab12c"));
        drawer.close();
        assert_eq!(
            surface.into_string(),
            "<g class=\"grid\" mask=\"url(#mask-ab12c)\"></g>"
        );
    }

    #[test]
    fn text_content_is_escaped() {
        let node = Primitive::Text(Text {
            x: 1.0,
            y: 2.0,
            anchor: TextAnchor::End,
            font_size: 4.0,
            font_family: "Arial, sans-serif".to_string(),
            fill: "#808080".to_string(),
            content: "a < b & c".to_string(),
        })
        .to_node(&CoordinateFormatter::default());
        assert!(node.to_markup().contains(">a &lt; b &amp; c</text>"));
    }
}
