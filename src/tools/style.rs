use std::path::PathBuf;

use anyhow::Context;
use clap::builder::PossibleValuesParser;
use clap::{Command, CommandFactory, Parser};
use serde_json::json;

use crate::args::{HexColor, StringInput};
use crate::export::ExportFormat;
use crate::pages::StylePage;
use crate::pages::style::CUSTOM_PRESET;
use crate::render::StyledRenderer;
use crate::theme::{CornerStyle, DotStyle, ErrorCorrection, PRESETS};
use crate::tool::{Output, Tool};
use crate::tools::{rng, save_downloads};

fn preset_parser() -> PossibleValuesParser {
    PossibleValuesParser::new(PRESETS.iter().map(|p| p.name).chain([CUSTOM_PRESET]))
}

#[derive(Parser, Debug)]
#[command(
    name = "style",
    about = "Generate a styled QR code with gradient fills, petal modules and a frame",
    long_about = "Generate a styled QR code with gradient fills, petal modules and a frame.\n\
                  The preset is applied first, individual style flags override it.\n\
                  Prints the SVG unless downloads are requested."
)]
pub struct StyleTool {
    /// Text or URL to encode, "-" reads from stdin
    data: Option<StringInput>,

    /// Style preset to start from
    #[arg(short, long, value_parser = preset_parser())]
    preset: Option<String>,

    /// First gradient color
    #[arg(long)]
    g1: Option<HexColor>,

    /// Second gradient color
    #[arg(long)]
    g2: Option<HexColor>,

    /// Gradient angle in degrees, 0 points right
    #[arg(short, long, allow_negative_numbers = true)]
    angle: Option<f64>,

    /// Shape of the data modules
    #[arg(long, value_enum)]
    dot_style: Option<DotStyle>,

    /// Shape of the finder patterns
    #[arg(long, value_enum)]
    corner_style: Option<CornerStyle>,

    /// Logo image URL or path placed in the center
    #[arg(long)]
    logo: Option<String>,

    /// Morph modules into petals
    #[arg(long, conflicts_with = "no_petal")]
    petal: bool,

    /// Keep the module shapes as drawn
    #[arg(long)]
    no_petal: bool,

    /// Draw a decorative frame
    #[arg(long, conflicts_with = "no_frame")]
    frame: bool,

    /// Do not draw the frame
    #[arg(long)]
    no_frame: bool,

    /// Error correction level
    #[arg(long, value_enum, ignore_case = true)]
    ec: Option<ErrorCorrection>,

    /// Symbol size in pixels
    #[arg(short, long)]
    size: Option<u32>,

    /// Preview scale, reported as a CSS transform
    #[arg(long, default_value = "1")]
    scale: f64,

    /// Save the symbol in these formats
    #[arg(short, long, value_enum)]
    download: Vec<ExportFormat>,

    /// Directory downloads are written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Seed for reproducible gradient ids
    #[arg(long)]
    seed: Option<u64>,
}

impl Tool for StyleTool {
    fn cli() -> Command {
        StyleTool::command()
    }

    fn execute(&self) -> anyhow::Result<Option<Output>> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Could not create tokio runtime")?
            .block_on(self.run())
    }
}

impl StyleTool {
    fn toggle(on: bool, off: bool) -> Option<bool> {
        match (on, off) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    fn configure(&self, page: &mut StylePage<StyledRenderer>) {
        if let Some(preset) = &self.preset {
            if preset == CUSTOM_PRESET {
                page.select_preset(CUSTOM_PRESET).ok();
            } else {
                page.apply_preset(preset);
            }
        }

        let controls = page.controls_mut();
        if let Some(data) = &self.data {
            controls.data = data.0.clone();
        }
        if let Some(g1) = &self.g1 {
            controls.g1 = g1.0.clone();
        }
        if let Some(g2) = &self.g2 {
            controls.g2 = g2.0.clone();
        }
        if let Some(angle) = self.angle {
            controls.gradient_angle = angle;
        }
        if let Some(dot_style) = self.dot_style {
            controls.dot_style = dot_style;
        }
        if let Some(corner_style) = self.corner_style {
            controls.corner_style = corner_style;
        }
        if let Some(logo) = &self.logo {
            controls.logo = Some(logo.clone());
        }
        if let Some(petal) = Self::toggle(self.petal, self.no_petal) {
            controls.petal = petal;
        }
        if let Some(frame) = Self::toggle(self.frame, self.no_frame) {
            controls.frame = frame;
        }
        if let Some(ec) = self.ec {
            controls.error_correction = ec;
        }
        if let Some(size) = self.size {
            controls.preview_size = size;
        }

        page.set_preview_scale(self.scale);
    }

    async fn run(&self) -> anyhow::Result<Option<Output>> {
        let mut page = StylePage::new(StyledRenderer, rng(self.seed));
        self.configure(&mut page);

        let report = page
            .generate_and_finish()
            .await
            .context("Could not generate QR code")?;

        if self.download.is_empty() {
            let svg = page
                .download(ExportFormat::Svg)?
                .context("No SVG symbol was rendered")?;
            return Ok(Some(Output::Text(
                String::from_utf8(svg.bytes).context("SVG is not valid UTF-8")?,
            )));
        }

        if self.download.contains(&ExportFormat::Png) {
            page.rasterize().context("Could not rasterize QR code")?;
        }

        let files = save_downloads(&self.download, &self.out_dir, |f| page.download(f))?;

        Ok(Some(Output::JsonValue(json!({
            "preset": page.selected_preset(),
            "label": page.preset_label(),
            "options": page.controls(),
            "preview_transform": page.preview_transform(),
            "modules": page.module_count(),
            "post_process": report,
            "files": files,
        }))))
    }
}
