use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ValueEnum;
use image::ImageFormat;
use serde::Serialize;

use crate::render::RenderedSymbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Svg,
}

impl ExportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Png => "qrcode.png",
            ExportFormat::Svg => "qrcode.svg",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Svg => "image/svg+xml",
        }
    }
}

/// A file ready to be handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: &'static str,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl Download {
    pub fn save(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        let path = dir.join(self.file_name);
        std::fs::write(&path, &self.bytes)
            .with_context(|| format!("Could not write {}", path.display()))?;

        tracing::info!(path = %path.display(), mime = self.mime, "saved download");
        Ok(path)
    }
}

/// Packages the current symbol for download. Returns `None` when nothing
/// has been rendered or the symbol has no element of the needed kind.
pub fn export(
    symbol: Option<&RenderedSymbol>,
    format: ExportFormat,
) -> anyhow::Result<Option<Download>> {
    let Some(symbol) = symbol else {
        tracing::debug!(?format, "nothing rendered yet");
        return Ok(None);
    };

    let bytes = match format {
        ExportFormat::Png => {
            let Some(canvas) = symbol.canvas() else {
                tracing::debug!("symbol has no canvas to export");
                return Ok(None);
            };

            let mut bytes = Vec::new();
            canvas
                .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
                .context("Could not encode PNG")?;
            bytes
        }
        ExportFormat::Svg => {
            let Some(svg) = symbol.svg() else {
                tracing::debug!("symbol has no SVG to export");
                return Ok(None);
            };

            svg.to_document().into_bytes()
        }
    };

    Ok(Some(Download {
        file_name: format.file_name(),
        mime: format.mime(),
        bytes,
    }))
}
