use eframe::egui::{self, Color32, Painter, PointerButton, Pos2, Rect, Response, Stroke, Ui};

use super::ViewModel;
use super::render_utils::screen_to_world;

/// Indices of the points that fall inside `rect`.
pub(super) fn points_in_rect(points: &[Pos2], rect: Rect) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, point)| rect.contains(**point))
        .map(|(index, _)| index)
        .collect()
}

/// The closest point within `radius` of `pointer`.
pub(super) fn nearest_within(points: &[Pos2], pointer: Pos2, radius: f32) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .map(|(index, point)| (index, point.distance(pointer)))
        .filter(|(_, distance)| *distance <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

impl ViewModel {
    pub(super) fn handle_zoom(&mut self, ui: &Ui, rect: Rect, response: &Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let anchor = screen_to_world(rect, self.pan, self.zoom, pointer);

        let factor = (1.0 + scroll * 0.0018).clamp(0.85, 1.15);
        self.zoom = (self.zoom * factor).clamp(0.05, 6.0);
        self.pan = pointer - rect.center() - anchor * self.zoom;
    }

    pub(super) fn handle_pan(&mut self, response: &Response) {
        if response.dragged_by(PointerButton::Secondary) || response.dragged_by(PointerButton::Middle) {
            self.pan += response.drag_delta();
        }
    }

    /// Primary drag draws a selection box; releasing it selects what it covers.
    pub(super) fn handle_box_select(&mut self, ui: &Ui, response: &Response, painter: &Painter) {
        if response.drag_started_by(PointerButton::Primary) {
            self.box_select_origin = response.interact_pointer_pos();
        }

        let Some(origin) = self.box_select_origin else {
            return;
        };
        let current = ui
            .input(|input| input.pointer.interact_pos())
            .unwrap_or(origin);
        let selection = Rect::from_two_pos(origin, current);

        if response.dragged_by(PointerButton::Primary) {
            painter.rect_filled(selection, 2.0, Color32::from_rgba_unmultiplied(103, 196, 255, 28));
            painter.rect_stroke(
                selection,
                2.0,
                Stroke::new(1.0, Color32::from_rgb(103, 196, 255)),
                egui::StrokeKind::Inside,
            );
        }

        if response.drag_stopped() {
            self.box_select_origin = None;
            let additive = ui.input(|input| input.modifiers.shift);
            if !additive {
                self.selected.clear();
            }
            for index in points_in_rect(&self.screen_positions, selection) {
                self.selected.insert(self.nodes[index].id.clone());
            }
        }
    }

    /// Click selects the node under the pointer and toggles its detail table;
    /// clicking empty canvas clears the selection.
    pub(super) fn handle_click(&mut self, ui: &Ui, response: &Response, hovered: Option<usize>) {
        if !response.clicked_by(PointerButton::Primary) {
            return;
        }

        let additive = ui.input(|input| input.modifiers.shift);
        let Some(index) = hovered else {
            if !additive {
                self.selected.clear();
            }
            return;
        };

        let id = self.nodes[index].id.clone();
        if additive {
            if !self.selected.remove(&id) {
                self.selected.insert(id.clone());
            }
        } else {
            self.selected.clear();
            self.selected.insert(id.clone());
        }

        if !self.nodes[index].columns.is_empty() {
            self.toggle_details(&id);
        }
    }
}
