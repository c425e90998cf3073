use std::time::Duration;

use anyhow::Context;
use rand::rngs::StdRng;

use crate::export::{Download, ExportFormat, export};
use crate::postprocess::{PostProcessReport, post_process};
use crate::render::styled::DOTS_CLASS;
use crate::render::{SymbolRenderer, VisualParams, raster};
use crate::slot::{GenerationToken, SymbolSlot};
use crate::theme::{PASTEL, StyleControls, StyleOptions, find_preset};

/// Time given to the renderer to settle before post-processing starts.
pub const POST_PROCESS_DELAY: Duration = Duration::from_millis(80);

/// Value of the preset selector that leaves the controls alone.
pub const CUSTOM_PRESET: &str = "custom";

/// Deferred post-processing for one generation.
#[derive(Debug, Clone)]
pub struct PostProcessTicket {
    token: GenerationToken,
    options: StyleOptions,
}

/// Controller of the theming page.
pub struct StylePage<R> {
    renderer: R,
    controls: StyleControls,
    selected_preset: String,
    preset_label: String,
    preview_scale: f64,
    slot: SymbolSlot,
    rng: StdRng,
}

impl<R> StylePage<R>
where
    R: SymbolRenderer<Params = VisualParams>,
{
    /// A page with the `pastel` preset applied and nothing rendered yet.
    pub fn new(renderer: R, rng: StdRng) -> Self {
        Self {
            renderer,
            controls: StyleControls::default(),
            selected_preset: PASTEL.name.to_string(),
            preset_label: PASTEL.label(),
            preview_scale: 1.0,
            slot: SymbolSlot::new(),
            rng,
        }
    }

    pub fn controls(&self) -> &StyleControls {
        &self.controls
    }

    /// Direct edits only take effect on the next [`StylePage::generate`].
    pub fn controls_mut(&mut self) -> &mut StyleControls {
        &mut self.controls
    }

    pub fn selected_preset(&self) -> &str {
        &self.selected_preset
    }

    pub fn preset_label(&self) -> &str {
        &self.preset_label
    }

    /// Overwrites the controls a preset defines. Unknown names are ignored.
    pub fn apply_preset(&mut self, name: &str) -> bool {
        let Some(preset) = find_preset(name) else {
            tracing::debug!(name, "ignoring unknown preset");
            return false;
        };

        preset.apply_to(&mut self.controls);
        self.selected_preset = preset.name.to_string();
        self.preset_label = preset.label();
        tracing::info!(preset = preset.name, "applied preset");
        true
    }

    /// A preset button or tile: apply and regenerate right away.
    pub fn click_preset(&mut self, name: &str) -> anyhow::Result<Option<PostProcessTicket>> {
        if !self.apply_preset(name) {
            return Ok(None);
        }
        self.generate().map(Some)
    }

    /// The preset selector. `custom` keeps the current controls and does
    /// not regenerate.
    pub fn select_preset(&mut self, value: &str) -> anyhow::Result<Option<PostProcessTicket>> {
        if value == CUSTOM_PRESET {
            self.selected_preset = CUSTOM_PRESET.to_string();
            return Ok(None);
        }
        self.click_preset(value)
    }

    /// Renders a fresh symbol from the current controls, replacing the
    /// previous one. Post-processing is left to the returned ticket.
    pub fn generate(&mut self) -> anyhow::Result<PostProcessTicket> {
        let options = self.controls.gather();

        self.slot.clear();
        let symbol = self
            .renderer
            .render(&options.data, &VisualParams::from(&options))
            .context("Could not render symbol")?;
        let token = self.slot.replace(symbol);

        tracing::debug!(?token, bytes = options.data.len(), "generated symbol");
        Ok(PostProcessTicket { token, options })
    }

    /// Runs the post-processor for a ticket. Does nothing when the ticket's
    /// symbol has been replaced since or carries no SVG. A canvas drawn
    /// before is dropped as it no longer matches the SVG.
    pub fn post_process(&mut self, ticket: &PostProcessTicket) -> Option<PostProcessReport> {
        let Some(symbol) = self.slot.get_mut(ticket.token) else {
            tracing::debug!(token = ?ticket.token, "skipping stale post-processing");
            return None;
        };

        let svg = symbol.svg_mut()?;
        let report = post_process(svg, &ticket.options, &mut self.rng);
        symbol.clear_canvas();
        Some(report)
    }

    /// Waits out [`POST_PROCESS_DELAY`] and post-processes.
    pub async fn finish(&mut self, ticket: PostProcessTicket) -> Option<PostProcessReport> {
        tokio::time::sleep(POST_PROCESS_DELAY).await;
        self.post_process(&ticket)
    }

    pub async fn generate_and_finish(&mut self) -> anyhow::Result<Option<PostProcessReport>> {
        let ticket = self.generate()?;
        Ok(self.finish(ticket).await)
    }

    /// Draws a canvas twin of the current SVG so it can be exported as PNG,
    /// replacing an earlier one. Returns false when there is no SVG symbol
    /// to rasterize.
    pub fn rasterize(&mut self) -> anyhow::Result<bool> {
        let Some(symbol) = self.slot.current_mut() else {
            return Ok(false);
        };
        let Some(svg) = symbol.svg() else {
            return Ok(false);
        };

        let canvas = raster::rasterize(svg)?;
        symbol.set_canvas(canvas);
        Ok(true)
    }

    pub fn download(&self, format: ExportFormat) -> anyhow::Result<Option<Download>> {
        export(self.slot.current(), format)
    }

    /// Number of data modules in the current styled symbol.
    pub fn module_count(&self) -> Option<usize> {
        let svg = self.slot.current()?.svg()?;
        svg.find_class(DOTS_CLASS).map(|dots| dots.children().len())
    }

    /// Scales the preview only; the symbol is left untouched.
    pub fn set_preview_scale(&mut self, scale: f64) {
        self.preview_scale = scale;
    }

    /// CSS transform of the preview container.
    pub fn preview_transform(&self) -> String {
        format!("scale({})", self.preview_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RenderedSymbol, StyledRenderer, SymbolElement};
    use crate::svg::Element;
    use crate::theme::{CornerStyle, DotStyle};
    use rand::SeedableRng;

    fn page() -> StylePage<StyledRenderer> {
        StylePage::new(StyledRenderer, StdRng::seed_from_u64(42))
    }

    // Renders a canvas only, like a backend configured for raster output.
    struct CanvasRenderer;

    impl SymbolRenderer for CanvasRenderer {
        type Params = VisualParams;

        fn render(&self, _: &str, params: &VisualParams) -> anyhow::Result<RenderedSymbol> {
            Ok(RenderedSymbol::new(vec![SymbolElement::Canvas(image::RgbaImage::new(
                params.size,
                params.size,
            ))]))
        }
    }

    #[test]
    fn test_pastel_preset_controls() {
        let mut page = page();
        page.apply_preset("neon");
        assert!(page.apply_preset("pastel"));

        let controls = page.controls();
        assert_eq!(controls.g1, "#ff7cc7");
        assert_eq!(controls.g2, "#7c6bff");
        assert_eq!(controls.gradient_angle, 45.0);
        assert_eq!(controls.dot_style, DotStyle::Rounded);
        assert_eq!(controls.corner_style, CornerStyle::Dot);
        assert!(controls.petal);
        assert!(controls.frame);
        assert_eq!(page.preset_label(), "Pastel");
        assert_eq!(page.selected_preset(), "pastel");
    }

    #[test]
    fn test_unknown_preset_is_noop() {
        let mut page = page();
        let before = page.controls().clone();

        assert!(!page.apply_preset("vaporwave"));
        assert!(page.click_preset("vaporwave").unwrap().is_none());
        assert!(page.select_preset("vaporwave").unwrap().is_none());

        assert_eq!(page.controls(), &before);
        assert_eq!(page.preset_label(), "Pastel");
        assert!(page.slot.current().is_none());
    }

    #[test]
    fn test_custom_selection_does_not_regenerate() {
        let mut page = page();
        page.controls_mut().g1 = String::from("#123456");

        assert!(page.select_preset(CUSTOM_PRESET).unwrap().is_none());

        assert_eq!(page.controls().g1, "#123456");
        assert_eq!(page.selected_preset(), "custom");
        assert!(page.slot.current().is_none());
    }

    #[test]
    fn test_preset_selection_regenerates() {
        let mut page = page();
        let ticket = page.select_preset("retro").unwrap().unwrap();

        assert!(page.slot.is_current(ticket.token));
        assert_eq!(page.preset_label(), "Retro");
        assert_eq!(page.controls().dot_style, DotStyle::Square);
    }

    #[test]
    fn test_generation_replaces_symbol() {
        let mut page = page();
        page.controls_mut().data = String::from("first");
        page.generate().unwrap();
        page.controls_mut().data = String::from("second, a longer payload");
        page.generate().unwrap();

        assert!(page.slot.current().is_some());
    }

    #[test]
    fn test_stale_ticket_is_skipped() {
        let mut page = page();
        let first = page.generate().unwrap();
        let second = page.generate().unwrap();

        assert_eq!(page.post_process(&first), None);
        let report = page.post_process(&second).unwrap();

        let svg = page.slot.current().unwrap().svg().unwrap();
        let gradients = svg.children()[0].children().len();
        assert_eq!(gradients, 1);
        assert!(report.framed);
    }

    #[test]
    fn test_post_process_uses_options_at_generation() {
        let mut page = page();
        page.controls_mut().petal = false;
        let ticket = page.generate().unwrap();
        page.controls_mut().petal = true;

        let report = page.post_process(&ticket).unwrap();
        assert_eq!(report.morphed, 0);
    }

    #[test]
    fn test_canvas_only_symbol() {
        let mut page = StylePage::new(CanvasRenderer, StdRng::seed_from_u64(1));
        let ticket = page.generate().unwrap();

        assert_eq!(page.post_process(&ticket), None);
        assert!(!page.rasterize().unwrap());
        assert!(page.download(ExportFormat::Svg).unwrap().is_none());
        assert!(page.download(ExportFormat::Png).unwrap().is_some());
    }

    #[test]
    fn test_downloads() {
        let mut page = page();
        assert!(page.download(ExportFormat::Svg).unwrap().is_none());

        page.generate().unwrap();
        assert!(page.download(ExportFormat::Png).unwrap().is_none());
        assert!(page.download(ExportFormat::Svg).unwrap().is_some());

        assert!(page.rasterize().unwrap());
        let png = page.download(ExportFormat::Png).unwrap().unwrap();
        let decoded = image::load_from_memory(&png.bytes).unwrap();
        assert_eq!(decoded.width(), 360);
    }

    #[test]
    fn test_png_follows_post_processing() {
        let mut page = page();
        let ticket = page.generate().unwrap();
        assert!(page.rasterize().unwrap());
        let plain = page.download(ExportFormat::Png).unwrap().unwrap();

        page.post_process(&ticket).unwrap();
        assert!(page.download(ExportFormat::Png).unwrap().is_none());

        assert!(page.rasterize().unwrap());
        assert!(page.rasterize().unwrap());
        let styled = page.download(ExportFormat::Png).unwrap().unwrap();

        assert_ne!(plain.bytes, styled.bytes);
        let symbol = page.slot.current().unwrap();
        let expected = raster::rasterize(symbol.svg().unwrap()).unwrap();
        assert_eq!(symbol.canvas(), Some(&expected));
    }

    #[test]
    fn test_module_count() {
        let mut page = page();
        assert_eq!(page.module_count(), None);

        page.controls_mut().petal = false;
        let ticket = page.generate().unwrap();
        let before = page.module_count().unwrap();
        page.post_process(&ticket).unwrap();

        assert!(before > 0);
        assert_eq!(page.module_count(), Some(before));
    }

    #[test]
    fn test_preview_scale_leaves_symbol() {
        let mut page = page();
        page.generate().unwrap();
        let before = page.slot.current().cloned();

        page.set_preview_scale(1.25);

        assert_eq!(page.preview_transform(), "scale(1.25)");
        assert_eq!(page.slot.current().cloned(), before);
    }

    #[tokio::test]
    async fn test_generate_and_finish() {
        let mut page = page();
        page.controls_mut().data = String::from("https://example.com");

        let report = page.generate_and_finish().await.unwrap().unwrap();

        let svg = page.slot.current().unwrap().svg().unwrap();
        let dots = svg.find_class(DOTS_CLASS).unwrap().children();
        assert_eq!(report.morphed, dots.len());
        assert!(dots.iter().all(|d| d.attr("transform").is_some()));
        assert_eq!(svg.children().last().map(Element::name), Some("rect"));
    }

    #[tokio::test]
    async fn test_deferred_ticket_after_regeneration() {
        let mut page = page();
        let first = page.generate().unwrap();
        page.generate().unwrap();

        assert_eq!(page.finish(first).await, None);
    }
}
