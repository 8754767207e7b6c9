use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use tether_graph::graph::Node;
use tether_graph::layout::ResolvedEdge;

use super::interaction::nearest_within;
use super::render_utils::{
    blend_color, circle_visible, dim_color, draw_background, edge_width, fit_transform,
    screen_radius, segment_may_be_visible, world_to_screen,
};
use super::{SearchCache, ViewModel};

const FIT_PADDING: f32 = 60.0;

/// Edges the canvas should draw. Hiding edges never touches node positions.
pub(super) fn visible_edges(edges: &[ResolvedEdge], show: bool) -> &[ResolvedEdge] {
    if show { edges } else { &[] }
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

/// Indices of nodes whose label fuzzy-matches `query`.
pub(super) fn search_matches(nodes: &[Node], query: &str) -> HashSet<usize> {
    let matcher = SkimMatcherV2::default();
    nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| fuzzy_match_score(&matcher, &node.label, query).is_some())
        .map(|(index, _)| index)
        .collect()
}

impl ViewModel {
    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_cache
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matches = Arc::new(search_matches(&self.nodes, query));
        self.search_cache = Some(SearchCache {
            query: query.to_owned(),
            matches: Arc::clone(&matches),
        });
        Some(matches)
    }

    pub(super) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        if self.fit_pending {
            let points = self.nodes.iter().map(|node| node.position).collect::<Vec<_>>();
            if let Some((pan, zoom)) = fit_transform(&points, rect.size(), FIT_PADDING) {
                self.pan = pan;
                self.zoom = zoom;
            }
            self.fit_pending = false;
        }

        draw_background(&painter, rect, self.pan, self.zoom);

        if self.nodes.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "The API returned no domains.",
                FontId::proportional(15.0),
                Color32::from_gray(200),
            );
            return;
        }

        self.handle_zoom(ui, rect, &response);
        self.handle_pan(&response);

        self.screen_positions.clear();
        self.screen_positions.extend(
            self.nodes
                .iter()
                .map(|node| world_to_screen(rect, self.pan, self.zoom, node.position)),
        );
        let radius = screen_radius(self.zoom);

        for edge in visible_edges(&self.edges, self.show_edges) {
            let start = self.screen_positions[edge.source_index];
            let end = self.screen_positions[edge.target_index];
            if !segment_may_be_visible(rect, start, end) {
                continue;
            }
            let touches_selection =
                self.selected.contains(&edge.source) || self.selected.contains(&edge.target);
            let color = if touches_selection {
                Color32::from_rgb(241, 146, 94)
            } else {
                Color32::from_rgba_unmultiplied(150, 150, 150, 150)
            };
            painter.line_segment([start, end], Stroke::new(edge_width(edge.weight, self.zoom), color));
        }

        let search_matches = self.cached_search_matches();
        let search_active = search_matches.is_some();
        let hovered = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| response.hovered() && rect.contains(*pointer))
            .and_then(|pointer| nearest_within(&self.screen_positions, pointer, radius));

        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        for (index, node) in self.nodes.iter().enumerate() {
            let position = self.screen_positions[index];
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let is_selected = self.selected.contains(&node.id);
            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));

            let base = if node.columns.is_empty() {
                Color32::from_rgb(120, 130, 145)
            } else {
                Color32::from_rgb(110, 170, 215)
            };
            let color = if is_selected {
                Color32::from_rgb(245, 206, 93)
            } else if hovered == Some(index) {
                Color32::from_rgb(255, 164, 101)
            } else if is_match {
                blend_color(base, Color32::from_rgb(103, 196, 255), 0.68)
            } else if search_active {
                dim_color(base, 0.38)
            } else {
                base
            };

            painter.circle_filled(position, radius, color);
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(
                    if is_selected || is_match { 2.0 } else { 1.0 },
                    Color32::from_rgba_unmultiplied(15, 15, 15, 190),
                ),
            );
            painter.text(
                position + vec2(0.0, radius + 4.0),
                Align2::CENTER_TOP,
                &node.label,
                FontId::proportional(12.0),
                Color32::from_gray(if search_active && !is_match { 130 } else { 238 }),
            );
        }

        self.handle_box_select(ui, &response, &painter);

        if let Some(index) = hovered {
            let node = &self.nodes[index];
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!("{}  |  columns {}", node.label, node.columns.len()),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        self.handle_click(ui, &response, hovered);
        if response.dragged() {
            ui.ctx().request_repaint();
        }

        self.draw_detail_panels(ui, rect);
        self.draw_minimap(ui, rect);
    }
}
