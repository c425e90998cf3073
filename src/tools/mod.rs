pub mod data;
pub mod presets;
pub mod style;

use std::path::Path;

use anyhow::Context;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::export::{Download, ExportFormat};

// Seeded when reproducible output is asked for, from entropy otherwise.
pub(crate) fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

// Writes every requested format that the current symbol can provide and
// returns the written paths.
pub(crate) fn save_downloads(
    formats: &[ExportFormat],
    dir: &Path,
    download: impl Fn(ExportFormat) -> anyhow::Result<Option<Download>>,
) -> anyhow::Result<Vec<String>> {
    if !formats.is_empty() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Could not create {}", dir.display()))?;
    }

    let mut files = Vec::new();
    for &format in formats {
        match download(format)? {
            Some(file) => files.push(file.save(dir)?.display().to_string()),
            None => tracing::warn!(?format, "nothing to download"),
        }
    }

    Ok(files)
}
