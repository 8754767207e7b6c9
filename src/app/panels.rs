use std::collections::HashSet;

use eframe::egui::{self, Align, Context, DragValue, Layout, RichText, SliderClamping, Ui, Vec2};

use tether_graph::graph::Edge;
use tether_graph::layout::ResolvedEdge;

use super::worker::LoadedGraph;
use super::{ViewModel, ViewRequest};

impl ViewModel {
    pub(super) fn new(loaded: LoadedGraph) -> Self {
        let mut model = Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            dropped_edge_count: 0,
            last_error: None,
            layout_config: loaded.config,
            show_edges: false,
            pan: Vec2::ZERO,
            zoom: 1.0,
            fit_pending: true,
            selected: HashSet::new(),
            open_details: Default::default(),
            search: String::new(),
            search_cache: None,
            box_select_origin: None,
            screen_positions: Vec::new(),
        };
        model.replace_graph(loaded);
        model
    }

    /// Swaps in a freshly laid-out graph. View settings survive; per-node
    /// state is kept only for ids that still exist.
    pub(super) fn replace_graph(&mut self, loaded: LoadedGraph) {
        let LoadedGraph {
            nodes,
            layout,
            config,
        } = loaded;

        let ids = nodes.iter().map(|node| node.id.as_str()).collect::<HashSet<_>>();
        self.selected.retain(|id| ids.contains(id.as_str()));
        self.open_details.retain(|id, _| ids.contains(id.as_str()));

        self.dropped_edge_count = layout.dropped_edges.len();
        self.last_error = None;
        self.edges = layout.edges;
        self.nodes = nodes;
        self.layout_config = config;
        self.search_cache = None;
        self.box_select_origin = None;
        self.fit_pending = true;
    }

    /// Edges re-projected to node ids, as a layout run expects them.
    pub(super) fn source_edges(&self) -> Vec<Edge> {
        self.edges
            .iter()
            .map(|edge: &ResolvedEdge| Edge {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                weight: edge.weight,
            })
            .collect()
    }

    pub(super) fn show(&mut self, ctx: &Context, api_url: &str, busy: bool) -> Option<ViewRequest> {
        let mut request = None;

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("tether");
                    ui.separator();
                    ui.label(format!("api: {api_url}"));
                    ui.label(format!("nodes: {}", self.nodes.len()));
                    ui.label(format!("edges: {}", self.edges.len()));
                    if self.dropped_edge_count > 0 {
                        ui.label(
                            RichText::new(format!("dropped: {}", self.dropped_edge_count))
                                .color(egui::Color32::from_rgb(241, 146, 94)),
                        )
                        .on_hover_text("Edges naming a node that is not in the payload.");
                    }
                    if let Some(error) = &self.last_error {
                        ui.label(
                            RichText::new("reload failed")
                                .color(egui::Color32::from_rgb(235, 96, 96)),
                        )
                        .on_hover_text(error.as_str());
                    }
                    ui.checkbox(&mut self.show_edges, "Show edges")
                        .on_hover_text("Draw relations between domains. Layout is unaffected.");
                    if ui.add_enabled(!busy, egui::Button::new("Reload")).clicked() {
                        request = Some(ViewRequest::Reload);
                    }
                    if ui.add_enabled(!busy, egui::Button::new("Re-run layout")).clicked() {
                        request = Some(ViewRequest::Relayout(self.layout_config));
                    }
                    if ui.button("Fit view").clicked() {
                        self.fit_pending = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if busy {
                            ui.spinner();
                            ui.label("working...");
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                if let Some(next) = self.draw_controls(ui) {
                    request = Some(next);
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));

        request
    }

    fn draw_controls(&mut self, ui: &mut Ui) -> Option<ViewRequest> {
        let mut request = None;

        ui.heading("Graph Controls");
        ui.separator();

        ui.label("Search domains")
            .on_hover_text("Fuzzy-highlight nodes whose label matches.");
        ui.text_edit_singleline(&mut self.search);

        ui.separator();
        ui.label(RichText::new("Layout").strong());

        let config = &mut self.layout_config;
        ui.add(
            egui::Slider::new(&mut config.charge_strength, -2000.0..=0.0)
                .text("Charge strength")
                .clamping(SliderClamping::Never),
        )
        .on_hover_text("Many-body force per node. Negative values push nodes apart.");
        ui.add(
            egui::Slider::new(&mut config.collide_radius, 0.0..=200.0)
                .text("Collision radius")
                .clamping(SliderClamping::Never),
        );
        ui.add(
            egui::Slider::new(&mut config.link_distance, 10.0..=400.0)
                .text("Link distance")
                .clamping(SliderClamping::Never),
        );
        ui.add(
            egui::Slider::new(&mut config.iterations, 10..=1000)
                .text("Iterations")
                .clamping(SliderClamping::Never),
        );
        ui.horizontal(|ui| {
            ui.label("Center");
            ui.add(DragValue::new(&mut config.center.x).speed(5.0).prefix("x "));
            ui.add(DragValue::new(&mut config.center.y).speed(5.0).prefix("y "));
        });

        if ui
            .button("Re-run layout")
            .on_hover_text("Lay out the current graph again; a running layout is cancelled.")
            .clicked()
        {
            request = Some(ViewRequest::Relayout(self.layout_config));
        }

        ui.separator();
        ui.label(RichText::new("Selection").strong());
        if self.selected.is_empty() {
            ui.label("Click a node or drag a box to select.");
        } else {
            let mut selected = self
                .nodes
                .iter()
                .filter(|node| self.selected.contains(&node.id))
                .map(|node| (node.label.as_str(), node.columns.len()))
                .collect::<Vec<_>>();
            selected.sort_unstable();

            egui::ScrollArea::vertical()
                .id_salt("selection_scroll")
                .max_height(280.0)
                .show(ui, |ui| {
                    for (label, columns) in selected {
                        ui.label(format!("{label}  ({columns} columns)"));
                    }
                });
            if ui.button("Clear selection").clicked() {
                self.selected.clear();
            }
        }

        request
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::RawInput;
    use pretty_assertions::assert_eq;
    use tether_graph::graph::Node;
    use tether_graph::layout::{LayoutConfig, layout};

    use super::*;

    fn loaded(config: LayoutConfig) -> LoadedGraph {
        let mut nodes = ["a", "b", "c"]
            .map(|id| Node {
                id: id.to_owned(),
                label: id.to_owned(),
                columns: Vec::new(),
                position: Vec2::ZERO,
            })
            .to_vec();
        let edges = vec![
            Edge {
                id: "a-b".to_owned(),
                source: "a".to_owned(),
                target: "b".to_owned(),
                weight: Some(0.7),
            },
            Edge {
                id: "b-c".to_owned(),
                source: "b".to_owned(),
                target: "c".to_owned(),
                weight: None,
            },
        ];
        let layout = layout(&nodes, &edges, &config);
        layout.apply(&mut nodes);
        LoadedGraph {
            nodes,
            layout,
            config,
        }
    }

    fn model(config: LayoutConfig) -> ViewModel {
        ViewModel::new(loaded(config))
    }

    fn frame(ctx: &Context, model: &mut ViewModel) -> Option<ViewRequest> {
        let mut request = None;
        let _ = ctx.run(RawInput::default(), |ctx| {
            request = model.show(ctx, "http://api.test", false);
        });
        request
    }

    fn positions(model: &ViewModel) -> Vec<Vec2> {
        model.nodes.iter().map(|node| node.position).collect()
    }

    #[test]
    fn toggling_edges_keeps_positions_and_requests_nothing() {
        let ctx = Context::default();
        let mut model = model(LayoutConfig::default());
        let before = positions(&model);
        let edge_count = model.edges.len();

        assert!(!model.show_edges);
        assert!(frame(&ctx, &mut model).is_none());

        model.show_edges = true;
        assert!(frame(&ctx, &mut model).is_none());

        model.show_edges = false;
        assert!(frame(&ctx, &mut model).is_none());

        assert_eq!(positions(&model), before);
        assert_eq!(model.edges.len(), edge_count);
    }

    #[test]
    fn tuning_values_outside_slider_ranges_survive_a_frame() {
        let config = LayoutConfig {
            charge_strength: 100.0,
            collide_radius: 320.0,
            link_distance: 900.0,
            iterations: 2000,
            ..LayoutConfig::default()
        };
        let ctx = Context::default();
        let mut model = model(config);

        frame(&ctx, &mut model);
        frame(&ctx, &mut model);

        assert_eq!(model.layout_config, config);
    }

    #[test]
    fn successful_replace_clears_last_error() {
        let mut model = model(LayoutConfig::default());
        model.last_error = Some("refused".to_owned());
        model.selected.insert("a".to_owned());

        model.replace_graph(loaded(LayoutConfig::default()));

        assert!(model.last_error.is_none());
        assert!(model.selected.contains("a"));
    }
}
