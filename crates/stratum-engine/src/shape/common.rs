//! Style-driven painting shared by all built-in shapes.

use std::borrow::Cow;

use tiny_skia::{FillRule, LineCap, LineJoin, Paint, Stroke, StrokeDash, Transform};

use crate::paint::Color;
use crate::scene::{Drawable, Style};

use super::{BrushType, PaintCtx, Shape};

// ── style readers ─────────────────────────────────────────────────────────

#[inline]
pub fn line_width(style: &Style) -> f32 {
    style.number("lineWidth").map_or(1.0, |w| w.max(0.0) as f32)
}

fn color_of(style: &Style, key: &str) -> Option<Color> {
    style.text(key).and_then(Color::parse)
}

fn opacity_of(style: &Style) -> f32 {
    style.number("opacity").map_or(1.0, |o| o.clamp(0.0, 1.0) as f32)
}

fn solid(color: Color, opacity: f32) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.with_opacity(opacity).to_skia());
    paint.anti_alias = true;
    paint
}

/// Fill paint: `color`, default black.
pub(super) fn fill_paint(style: &Style) -> Paint<'static> {
    solid(color_of(style, "color").unwrap_or(Color::BLACK), opacity_of(style))
}

/// Stroke paint: `strokeColor`, falling back to `color`, then black.
pub(super) fn stroke_paint(style: &Style) -> Paint<'static> {
    let color = color_of(style, "strokeColor")
        .or_else(|| color_of(style, "color"))
        .unwrap_or(Color::BLACK);
    solid(color, opacity_of(style))
}

pub(super) fn stroke_of(style: &Style) -> Stroke {
    let width = line_width(style);
    let line_cap = match style.text("lineCap") {
        Some("round") => LineCap::Round,
        Some("square") => LineCap::Square,
        _ => LineCap::Butt,
    };
    let line_join = match style.text("lineJoin") {
        Some("round") => LineJoin::Round,
        Some("bevel") => LineJoin::Bevel,
        _ => LineJoin::Miter,
    };
    Stroke {
        width,
        miter_limit: style.number("miterLimit").map_or(10.0, |m| m as f32),
        line_cap,
        line_join,
        dash: dash_of(style.text("lineType"), width),
    }
}

/// `dashed` is `[6w, 4w]`, `dotted` is `[w, 4w]`, anything else is solid.
fn dash_of(line_type: Option<&str>, width: f32) -> Option<StrokeDash> {
    let w = if width > 0.0 { width } else { 1.0 };
    let on = match line_type {
        Some("dashed") => 6.0 * w,
        Some("dotted") => w,
        _ => return None,
    };
    StrokeDash::new(vec![on, 4.0 * w], 0.0)
}

// ── transforms ────────────────────────────────────────────────────────────

/// Local-to-logical transform of a record: translate, rotate about the rotation origin,
/// then scale about the scale origin.
pub fn record_transform(record: &Drawable) -> Transform {
    if !record.needs_transform() {
        return Transform::identity();
    }
    let [px, py] = record.position;
    let [angle, ox, oy] = record.rotation;
    let [sx, sy, cx, cy] = record.scale;

    Transform::from_translate(px as f32, py as f32)
        .pre_concat(Transform::from_rotate_at(angle.to_degrees() as f32, ox as f32, oy as f32))
        .pre_translate(cx as f32, cy as f32)
        .pre_scale(sx as f32, sy as f32)
        .pre_translate(-cx as f32, -cy as f32)
}

// ── painting ──────────────────────────────────────────────────────────────

/// Style used to paint `record`: on the overlay, its highlight style merged over the
/// regular one.
pub fn effective_style(record: &Drawable, is_overlay: bool) -> Cow<'_, Style> {
    match (&record.highlight_style, is_overlay) {
        (Some(highlight), true) => {
            let mut merged = record.style.clone();
            merged.merge(highlight.props().clone());
            Cow::Owned(merged)
        }
        _ => Cow::Borrowed(&record.style),
    }
}

/// Builds the shape's path from `style` and fills and/or strokes it.
pub fn paint_path<S: Shape + ?Sized>(
    shape: &S,
    ctx: &mut PaintCtx<'_>,
    record: &Drawable,
    style: &Style,
) -> anyhow::Result<()> {
    let Some(path) = shape.build_path(style) else {
        return Ok(());
    };
    let brush = shape
        .brush_type_only()
        .unwrap_or_else(|| BrushType::from_style(style));
    let transform = ctx.base_transform().pre_concat(record_transform(record));

    if brush.fills() {
        ctx.pixmap()
            .fill_path(&path, &fill_paint(style), FillRule::Winding, transform, None);
    }
    if brush.strokes() {
        ctx.pixmap()
            .stroke_path(&path, &stroke_paint(style), &stroke_of(style), transform, None);
    }
    Ok(())
}
