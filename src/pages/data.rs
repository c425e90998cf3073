use anyhow::Context;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::content::{ContentForm, ContentType};
use crate::export::{Download, ExportFormat, export};
use crate::render::{BasicParams, SymbolRenderer};
use crate::slot::SymbolSlot;
use crate::theme::{ColorTheme, ErrorCorrection, PALETTE};

pub const DEFAULT_SIZE: u32 = 256;

/// What a successful submit produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generation {
    pub content_type: ContentType,
    pub payload: String,
    pub theme: ColorTheme,
}

/// Controller of the content-type page.
pub struct DataPage<R> {
    renderer: R,
    form: ContentForm,
    size: u32,
    error_correction: ErrorCorrection,
    palette: &'static [ColorTheme],
    slot: SymbolSlot,
    rng: StdRng,
}

impl<R> DataPage<R>
where
    R: SymbolRenderer<Params = BasicParams>,
{
    pub fn new(renderer: R, rng: StdRng) -> Self {
        Self {
            renderer,
            form: ContentForm::default(),
            size: DEFAULT_SIZE,
            error_correction: ErrorCorrection::H,
            palette: PALETTE,
            slot: SymbolSlot::new(),
            rng,
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn form(&self) -> &ContentForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ContentForm {
        &mut self.form
    }

    pub fn select_type(&mut self, kind: ContentType) {
        self.form.select(kind);
    }

    /// Assembles the payload and renders it with a random theme. When the
    /// form is invalid the previous symbol stays in place.
    pub async fn submit(&mut self) -> anyhow::Result<Generation> {
        let payload = self.form.assemble().await?.encode();
        let theme = *self
            .palette
            .choose(&mut self.rng)
            .context("Color palette is empty")?;

        self.slot.clear();
        let symbol = self
            .renderer
            .render(
                &payload,
                &BasicParams {
                    size: self.size,
                    theme,
                    error_correction: self.error_correction,
                },
            )
            .context("Could not render symbol")?;
        self.slot.replace(symbol);

        tracing::info!(
            kind = ?self.form.kind(),
            fg = theme.fg,
            bg = theme.bg,
            "generated symbol"
        );
        Ok(Generation {
            content_type: self.form.kind(),
            payload,
            theme,
        })
    }

    pub fn download(&self, format: ExportFormat) -> anyhow::Result<Option<Download>> {
        export(self.slot.current(), format)
    }
}
