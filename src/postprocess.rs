//! Cosmetic post-processing of a styled symbol.
//!
//! Module positions and sizes are never changed: the gradient only swaps
//! fills, the petal morph keeps every module inside its own bounding box and
//! the frame is drawn outside the quiet area of the modules.

use rand::Rng;
use serde::Serialize;

use crate::render::styled::DOTS_CLASS;
use crate::svg::Element;
use crate::theme::StyleOptions;

const MODULE_SHAPES: &[&str] = &["path", "rect", "circle"];
const PETAL_ROTATION: f64 = 10.0;
const FALLBACK_WIDTH: f64 = 360.0;

const FRAME_INSET: f64 = 6.0;
const FRAME_RADIUS: f64 = 24.0;
const FRAME_STROKE_WIDTH: f64 = 8.0;
const FRAME_OPACITY: f64 = 0.12;

/// Direction of the gradient line through the unit square's center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientVector {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl GradientVector {
    /// 0 degrees points right, angles grow clockwise in SVG space.
    pub fn from_angle(degrees: f64) -> Self {
        let radians = degrees.to_radians();
        let x1 = (radians.cos() + 1.0) / 2.0;
        let y1 = (radians.sin() + 1.0) / 2.0;

        Self {
            x1,
            y1,
            x2: 1.0 - x1,
            y2: 1.0 - y1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostProcessReport {
    pub gradient_id: String,
    pub recolored: usize,
    pub morphed: usize,
    pub skipped: usize,
    pub framed: bool,
}

/// A fresh gradient id such as `grad-k3f9x0`.
pub fn gradient_id(rng: &mut impl Rng) -> String {
    let suffix: String = (0..6)
        .filter_map(|_| std::char::from_digit(rng.gen_range(0..36), 36))
        .collect();
    format!("grad-{suffix}")
}

/// Applies the gradient, the optional petal morph and the optional frame to
/// a rendered SVG, in that order. Modules that cannot be measured are left
/// as they are; nothing here aborts the pass.
pub fn post_process(
    svg: &mut Element,
    options: &StyleOptions,
    rng: &mut impl Rng,
) -> PostProcessReport {
    let width = svg
        .number_attr("width")
        .filter(|w| *w != 0.0)
        .unwrap_or(FALLBACK_WIDTH);
    let height = svg
        .number_attr("height")
        .filter(|h| *h != 0.0)
        .unwrap_or(width);

    let id = gradient_id(rng);
    let fill = format!("url(#{id})");

    if svg.find_child_mut("defs").is_none() {
        svg.prepend(Element::new("defs"));
    }
    if let Some(defs) = svg.find_child_mut("defs") {
        defs.push(linear_gradient(&id, options, width, height));
    }

    let mut report = PostProcessReport {
        gradient_id: id,
        recolored: 0,
        morphed: 0,
        skipped: 0,
        framed: false,
    };

    if let Some(dots) = svg.find_class_mut(DOTS_CLASS) {
        for_each_module(dots, &mut |module| {
            module.set_attr("fill", &fill);
            report.recolored += 1;
        });

        if options.petal {
            for_each_module(dots, &mut |module| match petal(module, &options.g1) {
                Ok(replacement) => {
                    *module = replacement;
                    report.morphed += 1;
                }
                Err(err) => {
                    tracing::debug!("skipping petal morph for <{}>: {err:#}", module.name());
                    report.skipped += 1;
                }
            });
        }
    } else {
        tracing::debug!("symbol has no dots layer");
    }

    if options.frame {
        svg.push(frame(width, &fill));
        report.framed = true;
    }

    tracing::debug!(
        gradient = %report.gradient_id,
        recolored = report.recolored,
        morphed = report.morphed,
        skipped = report.skipped,
        framed = report.framed,
        "post-processed symbol"
    );

    report
}

// The gradient spans the whole symbol in user space so all modules sample
// the same color field instead of each one running its own gradient.
fn linear_gradient(id: &str, options: &StyleOptions, width: f64, height: f64) -> Element {
    let vector = GradientVector::from_angle(options.gradient_angle);

    Element::new("linearGradient")
        .with_attr("id", id)
        .with_attr("gradientUnits", "userSpaceOnUse")
        .with_attr("x1", vector.x1 * width)
        .with_attr("y1", vector.y1 * height)
        .with_attr("x2", vector.x2 * width)
        .with_attr("y2", vector.y2 * height)
        .with_child(
            Element::new("stop")
                .with_attr("offset", "0%")
                .with_attr("stop-color", &options.g1),
        )
        .with_child(
            Element::new("stop")
                .with_attr("offset", "100%")
                .with_attr("stop-color", &options.g2),
        )
}

fn for_each_module(layer: &mut Element, f: &mut impl FnMut(&mut Element)) {
    for child in layer.children_mut() {
        if MODULE_SHAPES.contains(&child.name()) {
            f(child);
        } else {
            for_each_module(child, f);
        }
    }
}

fn petal(module: &Element, fallback_fill: &str) -> anyhow::Result<Element> {
    let bbox = module.bbox()?;
    let (cx, cy) = bbox.center();
    let rx = bbox.width.min(bbox.height) / 2.0;

    let d = format!(
        "M {cx} {} Q {} {} {} {cy} Q {} {} {cx} {} Q {} {} {} {cy} Q {} {} {cx} {} Z",
        cy - rx,
        cx + rx * 0.3,
        cy - rx * 0.45,
        cx + rx * 0.6,
        cx + rx * 0.3,
        cy + rx * 0.45,
        cy + rx,
        cx - rx * 0.3,
        cy + rx * 0.45,
        cx - rx * 0.6,
        cx - rx * 0.3,
        cy - rx * 0.45,
        cy - rx,
    );

    Ok(Element::new("path")
        .with_attr("d", d)
        .with_attr("fill", module.attr("fill").unwrap_or(fallback_fill))
        .with_attr("transform", format!("rotate({PETAL_ROTATION} {cx} {cy})")))
}

fn frame(width: f64, stroke: &str) -> Element {
    Element::new("rect")
        .with_attr("x", FRAME_INSET)
        .with_attr("y", FRAME_INSET)
        .with_attr("width", width - 2.0 * FRAME_INSET)
        .with_attr("height", width - 2.0 * FRAME_INSET)
        .with_attr("rx", FRAME_RADIUS)
        .with_attr("ry", FRAME_RADIUS)
        .with_attr("fill", "none")
        .with_attr("stroke", stroke)
        .with_attr("stroke-width", FRAME_STROKE_WIDTH)
        .with_attr("stroke-opacity", FRAME_OPACITY)
}
