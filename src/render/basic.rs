use anyhow::Context;
use image::Rgba;
use qrcode::QrCode;

use super::{ModuleGrid, RenderedSymbol, SymbolElement, SymbolRenderer};
use crate::svg::{Element, SVG_NS};
use crate::theme::{ColorTheme, ErrorCorrection};

#[derive(Debug, Clone, PartialEq)]
pub struct BasicParams {
    pub size: u32,
    pub theme: ColorTheme,
    pub error_correction: ErrorCorrection,
}

/// Plain two-color symbols rendered both as a canvas and as an SVG twin.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicRenderer;

impl SymbolRenderer for BasicRenderer {
    type Params = BasicParams;

    fn render(&self, payload: &str, params: &BasicParams) -> anyhow::Result<RenderedSymbol> {
        let code = QrCode::with_error_correction_level(payload, params.error_correction.into())
            .context("Failed to encode QR symbol")?;

        let dark = parse_rgba(params.theme.fg)?;
        let light = parse_rgba(params.theme.bg)?;

        let canvas = code
            .render::<Rgba<u8>>()
            .quiet_zone(false)
            .max_dimensions(params.size, params.size)
            .dark_color(dark)
            .light_color(light)
            .build();

        let svg = draw(&ModuleGrid::new(&code), params);

        let elements = vec![SymbolElement::Canvas(canvas), SymbolElement::Svg(svg)];
        Ok(RenderedSymbol::new(elements))
    }
}

fn parse_rgba(value: &str) -> anyhow::Result<Rgba<u8>> {
    let color = value
        .parse::<csscolorparser::Color>()
        .with_context(|| format!("Failed to parse theme color {value:?}"))?;

    Ok(Rgba(color.to_rgba8()))
}

fn draw(grid: &ModuleGrid, params: &BasicParams) -> Element {
    let count = grid.width();
    let mut d = String::new();
    for y in 0..count {
        for x in 0..count {
            if grid.is_dark(x, y) {
                d.push_str(&format!("M{x} {y}h1v1h-1z"));
            }
        }
    }

    Element::new("svg")
        .with_attr("xmlns", SVG_NS)
        .with_attr("width", params.size)
        .with_attr("height", params.size)
        .with_attr("viewBox", format!("0 0 {count} {count}"))
        .with_attr("shape-rendering", "crispEdges")
        .with_child(
            Element::new("rect")
                .with_attr("width", count)
                .with_attr("height", count)
                .with_attr("fill", params.theme.bg),
        )
        .with_child(
            Element::new("path")
                .with_attr("fill", params.theme.fg)
                .with_attr("d", d),
        )
}
