//! Symbol rendering backends.
//!
//! Both pages talk to their backend through [`SymbolRenderer`] so the
//! post-processor and the exporter only depend on what a rendered symbol
//! contains, never on how a backend was configured.

pub mod basic;
pub mod raster;
pub mod styled;

use image::RgbaImage;

use crate::svg::Element;

pub use basic::{BasicParams, BasicRenderer};
pub use styled::{StyledRenderer, VisualParams};

pub trait SymbolRenderer {
    type Params;

    fn render(&self, payload: &str, params: &Self::Params) -> anyhow::Result<RenderedSymbol>;
}

/// One graphic inside a rendered symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolElement {
    Canvas(RgbaImage),
    Svg(Element),
}

/// Everything a backend produced for a single generation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderedSymbol {
    elements: Vec<SymbolElement>,
}

impl RenderedSymbol {
    pub fn new(elements: Vec<SymbolElement>) -> Self {
        Self { elements }
    }

    /// Stores the raster twin of the symbol, replacing an earlier one.
    pub fn set_canvas(&mut self, canvas: RgbaImage) {
        let canvas = SymbolElement::Canvas(canvas);
        match self.elements.iter().position(is_canvas) {
            Some(index) => self.elements[index] = canvas,
            None => self.elements.push(canvas),
        }
    }

    /// Drops the raster twin once the SVG it was drawn from has changed.
    pub fn clear_canvas(&mut self) {
        self.elements.retain(|e| !is_canvas(e));
    }

    pub fn canvas(&self) -> Option<&RgbaImage> {
        self.elements.iter().find_map(|e| match e {
            SymbolElement::Canvas(canvas) => Some(canvas),
            _ => None,
        })
    }

    pub fn svg(&self) -> Option<&Element> {
        self.elements.iter().find_map(|e| match e {
            SymbolElement::Svg(svg) => Some(svg),
            _ => None,
        })
    }

    pub fn svg_mut(&mut self) -> Option<&mut Element> {
        self.elements.iter_mut().find_map(|e| match e {
            SymbolElement::Svg(svg) => Some(svg),
            _ => None,
        })
    }
}

fn is_canvas(element: &SymbolElement) -> bool {
    matches!(element, SymbolElement::Canvas(_))
}

// Helpers shared by the backends for reading the module matrix.
pub(crate) struct ModuleGrid {
    width: usize,
    dark: Vec<bool>,
}

impl ModuleGrid {
    pub(crate) fn new(code: &qrcode::QrCode) -> Self {
        Self {
            width: code.width(),
            dark: code
                .to_colors()
                .into_iter()
                .map(|c| c == qrcode::Color::Dark)
                .collect(),
        }
    }

    pub(crate) fn width(&self) -> usize {
        self.width
    }

    pub(crate) fn is_dark(&self, x: usize, y: usize) -> bool {
        self.dark[y * self.width + x]
    }

    /// Whether a module belongs to one of the three 7x7 finder patterns.
    pub(crate) fn in_finder(&self, x: usize, y: usize) -> bool {
        let far = self.width.saturating_sub(7);
        (x < 7 && y < 7) || (x >= far && y < 7) || (x < 7 && y >= far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_lookup() {
        let mut symbol = RenderedSymbol::new(vec![SymbolElement::Svg(Element::new("svg"))]);
        assert!(symbol.svg().is_some());
        assert!(symbol.canvas().is_none());

        symbol.set_canvas(RgbaImage::new(2, 2));
        assert_eq!(symbol.canvas().map(|c| c.width()), Some(2));
        assert_eq!(symbol.elements.len(), 2);
    }

    #[test]
    fn test_set_canvas_replaces_previous() {
        let mut symbol = RenderedSymbol::new(vec![SymbolElement::Svg(Element::new("svg"))]);
        symbol.set_canvas(RgbaImage::new(2, 2));
        symbol.set_canvas(RgbaImage::new(4, 4));

        assert_eq!(symbol.elements.len(), 2);
        assert_eq!(symbol.canvas().map(|c| c.width()), Some(4));

        symbol.clear_canvas();
        assert!(symbol.canvas().is_none());
        assert!(symbol.svg().is_some());
    }

    #[test]
    fn test_finder_regions() {
        let code = qrcode::QrCode::new("finder").unwrap();
        let grid = ModuleGrid::new(&code);
        let last = grid.width() - 1;

        assert!(grid.in_finder(0, 0));
        assert!(grid.in_finder(last, 0));
        assert!(grid.in_finder(0, last));
        assert!(!grid.in_finder(last, last));
        assert!(!grid.in_finder(8, 8));

        // The finder outline is always dark, its separator always light.
        assert!(grid.is_dark(0, 0));
        assert!(!grid.is_dark(7, 0));
    }
}
