use anyhow::Context;
use qrcode::QrCode;

use super::{ModuleGrid, RenderedSymbol, SymbolElement, SymbolRenderer};
use crate::svg::{Element, SVG_NS};
use crate::theme::{CornerStyle, DotStyle, ErrorCorrection, StyleOptions};

pub const DOTS_CLASS: &str = "qrbloom__dots";
pub const CORNERS_CLASS: &str = "qrbloom__corners";
pub const LOGO_CLASS: &str = "qrbloom__logo";

// Share of the symbol covered by a logo, and its inset from the hidden area.
const LOGO_SIZE: f64 = 0.4;
const LOGO_MARGIN: f64 = 8.0;

#[derive(Debug, Clone, PartialEq)]
pub struct VisualParams {
    pub size: u32,
    pub dot_style: DotStyle,
    pub corner_style: CornerStyle,
    pub dots_color: String,
    pub logo: Option<String>,
    pub error_correction: ErrorCorrection,
}

impl From<&StyleOptions> for VisualParams {
    fn from(options: &StyleOptions) -> Self {
        Self {
            size: options.preview_size,
            dot_style: options.dot_style,
            corner_style: options.corner_style,
            dots_color: String::from("#000"),
            logo: options.logo.clone().filter(|logo| !logo.is_empty()),
            error_correction: options.error_correction,
        }
    }
}

/// Draws a styled symbol as an SVG tree with separate layers for data
/// modules, finder patterns and the logo.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyledRenderer;

impl SymbolRenderer for StyledRenderer {
    type Params = VisualParams;

    fn render(&self, payload: &str, params: &VisualParams) -> anyhow::Result<RenderedSymbol> {
        let code = QrCode::with_error_correction_level(payload, params.error_correction.into())
            .context("Failed to encode QR symbol")?;

        let grid = ModuleGrid::new(&code);
        tracing::debug!(
            modules = grid.width(),
            size = params.size,
            "drawing styled symbol"
        );

        let svg = draw(&grid, params);
        Ok(RenderedSymbol::new(vec![SymbolElement::Svg(svg)]))
    }
}

fn draw(grid: &ModuleGrid, params: &VisualParams) -> Element {
    let size = f64::from(params.size);
    let count = grid.width();
    let dot = (size / count as f64).floor().max(1.0);
    let offset = ((size - count as f64 * dot) / 2.0).floor();

    let hidden = params.logo.as_ref().map(|_| logo_area(count));

    let mut dots = Element::new("g")
        .with_attr("class", DOTS_CLASS)
        .with_attr("fill", &params.dots_color);
    for y in 0..count {
        for x in 0..count {
            if !grid.is_dark(x, y) || grid.in_finder(x, y) || covers(hidden, x, y) {
                continue;
            }

            let px = offset + x as f64 * dot;
            let py = offset + y as f64 * dot;
            dots.push(dot_shape(params.dot_style, px, py, dot));
        }
    }

    let mut corners = Element::new("g")
        .with_attr("class", CORNERS_CLASS)
        .with_attr("fill", &params.dots_color);
    let style = params.corner_style;
    let far = count.saturating_sub(7) as f64;
    for (fx, fy) in [(0.0, 0.0), (far, 0.0), (0.0, far)] {
        let x = offset + fx * dot;
        let y = offset + fy * dot;
        corners.push(corner_square(style, x, y, dot, &params.dots_color));
        corners.push(corner_dot(style, x + 2.0 * dot, y + 2.0 * dot, dot));
    }

    let mut svg = Element::new("svg")
        .with_attr("xmlns", SVG_NS)
        .with_attr("width", params.size)
        .with_attr("height", params.size)
        .with_attr("viewBox", format!("0 0 {} {}", params.size, params.size))
        .with_child(dots)
        .with_child(corners);

    if let (Some(href), Some((start, end))) = (&params.logo, hidden) {
        let side = (end - start) as f64 * dot - 2.0 * LOGO_MARGIN;
        if side > 0.0 {
            let origin = offset + start as f64 * dot + LOGO_MARGIN;
            svg.push(
                Element::new("image")
                    .with_attr("class", LOGO_CLASS)
                    .with_attr("href", href)
                    .with_attr("x", origin)
                    .with_attr("y", origin)
                    .with_attr("width", side)
                    .with_attr("height", side)
                    .with_attr("preserveAspectRatio", "xMidYMid meet"),
            );
        }
    }

    svg
}

// Module range [start, end) on both axes left free for the logo. The
// range keeps the parity of the symbol so it stays centered.
fn logo_area(count: usize) -> (usize, usize) {
    let mut side = (count as f64 * LOGO_SIZE).ceil() as usize;
    if (count - side) % 2 != 0 {
        side += 1;
    }
    let start = (count - side) / 2;
    (start, start + side)
}

fn covers(area: Option<(usize, usize)>, x: usize, y: usize) -> bool {
    match area {
        Some((start, end)) => (start..end).contains(&x) && (start..end).contains(&y),
        None => false,
    }
}

fn dot_shape(style: DotStyle, x: f64, y: f64, s: f64) -> Element {
    match style {
        DotStyle::Square => square(x, y, s),
        DotStyle::Rounded => square(x, y, s).with_attr("rx", s * 0.25),
        DotStyle::ExtraRounded => square(x, y, s).with_attr("rx", s * 0.4),
        DotStyle::Dots => Element::new("circle")
            .with_attr("cx", x + s / 2.0)
            .with_attr("cy", y + s / 2.0)
            .with_attr("r", s / 2.0),
        DotStyle::Classy => {
            let h = s / 2.0;
            let d = format!(
                "M {x} {} A {h} {h} 0 0 1 {} {y} H {} V {} A {h} {h} 0 0 1 {} {} H {x} Z",
                y + h,
                x + h,
                x + s,
                y + h,
                x + h,
                y + s,
            );
            Element::new("path").with_attr("d", d)
        }
    }
}

fn square(x: f64, y: f64, s: f64) -> Element {
    Element::new("rect")
        .with_attr("x", x)
        .with_attr("y", y)
        .with_attr("width", s)
        .with_attr("height", s)
}

// The 7x7 outline of a finder pattern.
fn corner_square(style: CornerStyle, x: f64, y: f64, s: f64, color: &str) -> Element {
    match style {
        CornerStyle::Square => {
            let d = format!(
                "M {x} {y} H {} V {} H {x} Z M {} {} V {} H {} V {} Z",
                x + 7.0 * s,
                y + 7.0 * s,
                x + s,
                y + s,
                y + 6.0 * s,
                x + 6.0 * s,
                y + s,
            );
            Element::new("path")
                .with_attr("fill-rule", "evenodd")
                .with_attr("d", d)
        }
        CornerStyle::Dot => Element::new("circle")
            .with_attr("cx", x + 3.5 * s)
            .with_attr("cy", y + 3.5 * s)
            .with_attr("r", 3.0 * s)
            .with_attr("fill", "none")
            .with_attr("stroke", color)
            .with_attr("stroke-width", s),
        CornerStyle::ExtraRounded => Element::new("rect")
            .with_attr("x", x + s / 2.0)
            .with_attr("y", y + s / 2.0)
            .with_attr("width", 6.0 * s)
            .with_attr("height", 6.0 * s)
            .with_attr("rx", 2.0 * s)
            .with_attr("fill", "none")
            .with_attr("stroke", color)
            .with_attr("stroke-width", s),
    }
}

// The 3x3 center of a finder pattern.
fn corner_dot(style: CornerStyle, x: f64, y: f64, s: f64) -> Element {
    match style {
        CornerStyle::Square => square(x, y, 3.0 * s),
        CornerStyle::Dot => Element::new("circle")
            .with_attr("cx", x + 1.5 * s)
            .with_attr("cy", y + 1.5 * s)
            .with_attr("r", 1.5 * s),
        CornerStyle::ExtraRounded => square(x, y, 3.0 * s).with_attr("rx", s),
    }
}
