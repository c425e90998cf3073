use anyhow::Context;
use image::RgbaImage;
use resvg::{tiny_skia, usvg};

use crate::svg::Element;

/// Rasterizes an SVG tree into a canvas of the tree's own pixel size.
pub fn rasterize(svg: &Element) -> anyhow::Result<RgbaImage> {
    let markup = svg.to_string();
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(&markup, &options)
        .context("Failed to parse SVG for rasterization")?;

    let size = tree.size().to_int_size();
    let (width, height) = (size.width(), size.height());
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .with_context(|| format!("Could not allocate a {width}x{height} canvas"))?;

    let transform = tiny_skia::Transform::identity();
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    // tiny_skia stores premultiplied RGBA.
    let mut data = pixmap.take();
    for chunk in data.chunks_exact_mut(4) {
        let a = chunk[3] as f32 / 255.0;
        if a > 0.0 {
            chunk[0] = (chunk[0] as f32 / a).round().min(255.0) as u8;
            chunk[1] = (chunk[1] as f32 / a).round().min(255.0) as u8;
            chunk[2] = (chunk[2] as f32 / a).round().min(255.0) as u8;
        }
    }

    RgbaImage::from_raw(width, height, data).context("Canvas buffer has the wrong size")
}
