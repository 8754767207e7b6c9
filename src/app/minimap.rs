use eframe::egui::{Color32, Pos2, Rect, Sense, Stroke, StrokeKind, Ui, Vec2, vec2};

use super::ViewModel;
use super::render_utils::screen_to_world;

const MINIMAP_SIZE: Vec2 = vec2(200.0, 140.0);
const MINIMAP_MARGIN: f32 = 12.0;

/// Maps world coordinates into the minimap frame, preserving aspect ratio.
#[derive(Clone, Copy, Debug)]
pub(super) struct MinimapTransform {
    frame: Rect,
    world_center: Vec2,
    scale: f32,
}

impl MinimapTransform {
    pub(super) fn new(frame: Rect, points: &[Vec2]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), point| (min.min(*point), max.max(*point)));

        let extent = (max - min).max(vec2(1.0, 1.0)) * 1.2 + vec2(80.0, 80.0);
        let scale = (frame.width() / extent.x).min(frame.height() / extent.y);

        Some(Self {
            frame,
            world_center: (min + max) * 0.5,
            scale,
        })
    }

    pub(super) fn to_frame(self, world: Vec2) -> Pos2 {
        self.frame.center() + (world - self.world_center) * self.scale
    }

    pub(super) fn to_world(self, point: Pos2) -> Vec2 {
        self.world_center + (point - self.frame.center()) / self.scale
    }
}

impl ViewModel {
    /// Overview in the bottom-right corner of `canvas`; clicking or dragging
    /// inside it recenters the main view on that spot.
    pub(super) fn draw_minimap(&mut self, ui: &mut Ui, canvas: Rect) {
        let frame = Rect::from_min_size(
            canvas.right_bottom() - MINIMAP_SIZE - vec2(MINIMAP_MARGIN, MINIMAP_MARGIN),
            MINIMAP_SIZE,
        );
        if !canvas.contains_rect(frame) {
            return;
        }

        let points = self.nodes.iter().map(|node| node.position).collect::<Vec<_>>();
        let Some(transform) = MinimapTransform::new(frame.shrink(6.0), &points) else {
            return;
        };

        let response = ui.interact(frame, ui.id().with("minimap"), Sense::click_and_drag());
        if (response.clicked() || response.dragged())
            && let Some(pointer) = response.interact_pointer_pos()
        {
            self.pan = -transform.to_world(pointer) * self.zoom;
        }

        let painter = ui.painter_at(frame);
        painter.rect_filled(frame, 4.0, Color32::from_rgba_unmultiplied(12, 14, 18, 220));
        painter.rect_stroke(
            frame,
            4.0,
            Stroke::new(1.0, Color32::from_gray(80)),
            StrokeKind::Inside,
        );

        if self.show_edges {
            for edge in &self.edges {
                let start = transform.to_frame(self.nodes[edge.source_index].position);
                let end = transform.to_frame(self.nodes[edge.target_index].position);
                painter.line_segment(
                    [start, end],
                    Stroke::new(0.6, Color32::from_rgba_unmultiplied(120, 120, 120, 90)),
                );
            }
        }

        for node in &self.nodes {
            let color = if self.selected.contains(&node.id) {
                Color32::from_rgb(245, 206, 93)
            } else {
                Color32::from_rgb(110, 170, 215)
            };
            painter.circle_filled(transform.to_frame(node.position), 2.2, color);
        }

        let top_left = screen_to_world(canvas, self.pan, self.zoom, canvas.left_top());
        let bottom_right = screen_to_world(canvas, self.pan, self.zoom, canvas.right_bottom());
        let viewport = Rect::from_two_pos(
            transform.to_frame(top_left),
            transform.to_frame(bottom_right),
        )
        .intersect(frame);
        if viewport.is_positive() {
            painter.rect_stroke(
                viewport,
                1.0,
                Stroke::new(1.2, Color32::from_rgb(246, 206, 104)),
                StrokeKind::Inside,
            );
        }
    }
}
