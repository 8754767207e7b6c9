use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2, vec2};

/// World-space radius of a node disc.
pub(super) const NODE_RADIUS: f32 = 22.0;

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

pub(super) fn screen_radius(zoom: f32) -> f32 {
    (NODE_RADIUS * zoom).clamp(3.0, 60.0)
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * amount) as u8;
    Color32::from_rgba_unmultiplied(
        mix(base.r(), overlay.r()),
        mix(base.g(), overlay.g()),
        mix(base.b(), overlay.b()),
        mix(base.a(), overlay.a()),
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    let scale = |channel: u8| (channel as f32 * factor) as u8;
    Color32::from_rgba_unmultiplied(
        scale(color.r()),
        scale(color.g()),
        scale(color.b()),
        (color.a() as f32 * (0.45 + factor * 0.55)) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (80.0 * zoom).clamp(24.0, 160.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, center: Pos2, radius: f32) -> bool {
    rect.expand(radius).contains(center)
}

/// Cheap cull: keeps a segment whenever its bounding box touches `rect`.
pub(super) fn segment_may_be_visible(rect: Rect, start: Pos2, end: Pos2) -> bool {
    Rect::from_two_pos(start, end).expand(2.0).intersects(rect)
}

/// Line width for a relation; heavier relations draw thicker.
pub(super) fn edge_width(weight: Option<f64>, zoom: f32) -> f32 {
    let weight = weight.unwrap_or(0.5).clamp(0.0, 1.0) as f32;
    ((0.8 + weight * 1.8) * zoom.sqrt()).clamp(0.5, 5.0)
}

/// Pan and zoom that fit all `points` into a viewport of `size`, or `None`
/// when there is nothing to fit.
pub(super) fn fit_transform(points: &[Vec2], size: Vec2, padding: f32) -> Option<(Vec2, f32)> {
    let first = *points.first()?;
    let (min, max) = points
        .iter()
        .fold((first, first), |(min, max), point| (min.min(*point), max.max(*point)));

    let margin = vec2(NODE_RADIUS, NODE_RADIUS);
    let extent = ((max + margin) - (min - margin)).max(vec2(1.0, 1.0));
    let available = (size - vec2(padding, padding) * 2.0).max(vec2(1.0, 1.0));
    let zoom = (available.x / extent.x).min(available.y / extent.y).clamp(0.05, 6.0);
    let center = (min + max) * 0.5;

    Some((-center * zoom, zoom))
}
