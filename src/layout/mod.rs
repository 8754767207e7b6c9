//! Force-directed layout.
//!
//! Every run starts from a phyllotaxis spiral and advances a fixed number of
//! ticks. Each tick applies, in order, many-body charge (Barnes-Hut), a
//! centering translation, collision separation and link springs, then
//! integrates velocities with decay. Alpha cools geometrically from 1 to
//! `alpha_min` over the configured tick count; there is no convergence check.

mod forces;
mod quadtree;

use std::collections::HashMap;
use std::f32::consts::PI;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use eframe::egui::{Vec2, vec2};
use tracing::{debug, warn};

use crate::graph::{Edge, Node};
use forces::{Charge, Spring, accumulate_charge, accumulate_collisions, apply_springs, recenter};
use quadtree::Cell;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Many-body strength per node; negative repels.
    pub charge_strength: f32,
    pub center: Vec2,
    /// Per-node radius; two nodes settle at least `2 * collide_radius` apart.
    pub collide_radius: f32,
    pub link_distance: f32,
    pub iterations: usize,
    pub theta: f32,
    pub velocity_decay: f32,
    pub alpha_min: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            charge_strength: -350.0,
            center: vec2(400.0, 300.0),
            collide_radius: 70.0,
            link_distance: 100.0,
            iterations: 300,
            theta: 0.9,
            velocity_decay: 0.4,
            alpha_min: 0.001,
        }
    }
}

/// Shared flag a running layout polls between ticks.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// An edge whose endpoints were found among the laid-out nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_index: usize,
    pub target_index: usize,
    pub weight: Option<f64>,
}

#[derive(Clone, Debug, Default)]
pub struct Layout {
    pub positions: HashMap<String, Vec2>,
    pub edges: Vec<ResolvedEdge>,
    /// Edges naming a node id that does not exist.
    pub dropped_edges: Vec<Edge>,
}

impl Layout {
    /// Writes settled positions back into the nodes they were computed for.
    pub fn apply(&self, nodes: &mut [Node]) {
        for node in nodes {
            if let Some(position) = self.positions.get(&node.id) {
                node.position = *position;
            }
        }
    }
}

/// Runs the full simulation on the calling thread.
pub fn layout(nodes: &[Node], edges: &[Edge], config: &LayoutConfig) -> Layout {
    let mut simulation = Simulation::new(nodes, edges, config);
    for _ in 0..config.iterations {
        simulation.tick();
    }
    simulation.finish(nodes)
}

/// Like [`layout`], but gives up between ticks once `cancel` is set.
pub fn layout_until(
    nodes: &[Node],
    edges: &[Edge],
    config: &LayoutConfig,
    cancel: &CancelToken,
) -> Option<Layout> {
    let mut simulation = Simulation::new(nodes, edges, config);
    for tick in 0..config.iterations {
        if cancel.is_cancelled() {
            debug!(tick, "layout cancelled");
            return None;
        }
        simulation.tick();
    }
    (!cancel.is_cancelled()).then(|| simulation.finish(nodes))
}

struct Simulation {
    config: LayoutConfig,
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    predicted: Vec<Vec2>,
    springs: Vec<Spring>,
    resolved: Vec<ResolvedEdge>,
    dropped: Vec<Edge>,
    alpha: f32,
    alpha_decay: f32,
}

impl Simulation {
    fn new(nodes: &[Node], edges: &[Edge], config: &LayoutConfig) -> Self {
        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.as_str(), index))
            .collect::<HashMap<_, _>>();

        let mut resolved = Vec::with_capacity(edges.len());
        let mut dropped = Vec::new();
        for edge in edges {
            let source = index_by_id.get(edge.source.as_str()).copied();
            let target = index_by_id.get(edge.target.as_str()).copied();
            let (Some(source_index), Some(target_index)) = (source, target) else {
                warn!(edge = %edge.id, source = %edge.source, target = %edge.target,
                    "dropping edge with unknown endpoint");
                dropped.push(edge.clone());
                continue;
            };

            resolved.push(ResolvedEdge {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                source_index,
                target_index,
                weight: edge.weight,
            });
        }

        Self {
            config: *config,
            positions: (0..nodes.len()).map(spiral_position).collect(),
            velocities: vec![Vec2::ZERO; nodes.len()],
            predicted: Vec::with_capacity(nodes.len()),
            springs: springs_for(&resolved, nodes.len()),
            resolved,
            dropped,
            alpha: 1.0,
            alpha_decay: alpha_decay(config),
        }
    }

    fn tick(&mut self) {
        if self.positions.is_empty() {
            return;
        }

        self.alpha -= self.alpha * self.alpha_decay;

        self.apply_charge();
        recenter(&mut self.positions, self.config.center);
        self.apply_collisions();
        apply_springs(
            &self.springs,
            &self.positions,
            &mut self.velocities,
            self.config.link_distance,
            self.alpha,
        );

        let keep = 1.0 - self.config.velocity_decay;
        for (position, velocity) in self.positions.iter_mut().zip(&mut self.velocities) {
            *velocity *= keep;
            *position += *velocity;
        }
    }

    fn apply_charge(&mut self) {
        if self.config.charge_strength == 0.0 {
            return;
        }
        let Some(tree) = Cell::build(&self.positions) else {
            return;
        };

        let charge = Charge {
            strength: self.config.charge_strength,
            alpha: self.alpha,
            theta_sq: self.config.theta * self.config.theta,
        };
        for (index, velocity) in self.velocities.iter_mut().enumerate() {
            accumulate_charge(&tree, index, &self.positions, charge, velocity);
        }
    }

    fn apply_collisions(&mut self) {
        if self.config.collide_radius <= 0.0 {
            return;
        }

        self.predicted.clear();
        self.predicted.extend(
            self.positions
                .iter()
                .zip(&self.velocities)
                .map(|(position, velocity)| *position + *velocity),
        );
        let Some(tree) = Cell::build(&self.predicted) else {
            return;
        };

        accumulate_collisions(
            &tree,
            &tree,
            true,
            &self.predicted,
            self.config.collide_radius,
            &mut self.velocities,
        );
    }

    fn finish(self, nodes: &[Node]) -> Layout {
        debug!(
            nodes = nodes.len(),
            edges = self.resolved.len(),
            dropped = self.dropped.len(),
            alpha = self.alpha,
            "layout settled"
        );

        Layout {
            positions: nodes
                .iter()
                .zip(self.positions)
                .map(|(node, position)| (node.id.clone(), position))
                .collect(),
            edges: self.resolved,
            dropped_edges: self.dropped,
        }
    }
}

fn spiral_position(index: usize) -> Vec2 {
    let radius = 10.0 * (0.5 + index as f32).sqrt();
    let angle = index as f32 * PI * (3.0 - 5.0_f32.sqrt());
    vec2(angle.cos(), angle.sin()) * radius
}

fn alpha_decay(config: &LayoutConfig) -> f32 {
    if config.iterations == 0 {
        return 0.0;
    }
    1.0 - config.alpha_min.clamp(f32::EPSILON, 1.0).powf(1.0 / config.iterations as f32)
}

/// Springs are weaker on well-connected nodes and push the lighter end more.
fn springs_for(edges: &[ResolvedEdge], node_count: usize) -> Vec<Spring> {
    let mut degree = vec![0usize; node_count];
    for edge in edges {
        if edge.source_index != edge.target_index {
            degree[edge.source_index] += 1;
            degree[edge.target_index] += 1;
        }
    }

    edges
        .iter()
        .filter(|edge| edge.source_index != edge.target_index)
        .map(|edge| {
            let source_degree = degree[edge.source_index] as f32;
            let target_degree = degree[edge.target_index] as f32;
            Spring {
                source: edge.source_index,
                target: edge.target_index,
                strength: 1.0 / source_degree.min(target_degree),
                bias: source_degree / (source_degree + target_degree),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::graph::edge_id;

    fn node(id: &str) -> Node {
        Node {
            id: id.to_owned(),
            label: id.to_owned(),
            columns: Vec::new(),
            position: Vec2::ZERO,
        }
    }

    fn edge(source: &str, target: &str) -> Edge {
        Edge {
            id: edge_id(source, target),
            source: source.to_owned(),
            target: target.to_owned(),
            weight: None,
        }
    }

    fn distance(layout: &Layout, a: &str, b: &str) -> f32 {
        (layout.positions[a] - layout.positions[b]).length()
    }

    fn centroid(layout: &Layout) -> Vec2 {
        layout.positions.values().fold(Vec2::ZERO, |sum, p| sum + *p)
            / layout.positions.len() as f32
    }

    #[test]
    fn empty_graph_yields_empty_layout() {
        let result = layout(&[], &[], &LayoutConfig::default());

        assert!(result.positions.is_empty());
        assert!(result.edges.is_empty());
    }

    #[test]
    fn isolated_node_settles_on_focal_point() {
        let config = LayoutConfig::default();

        let result = layout(&[node("solo")], &[], &config);

        assert!((result.positions["solo"] - config.center).length() < 1e-3);
    }

    #[test]
    fn linked_pair_sits_near_link_distance_around_center() {
        let nodes = [node("1"), node("2")];
        let edges = [edge("1", "2")];
        let config = LayoutConfig::default();

        let result = layout(&nodes, &edges, &config);

        let separation = distance(&result, "1", "2");
        assert!(
            (90.0..=200.0).contains(&separation),
            "separation {separation}"
        );
        assert!((centroid(&result) - config.center).length() < 1.0);
        assert_eq!(
            result.edges,
            vec![ResolvedEdge {
                id: "1-2".to_owned(),
                source: "1".to_owned(),
                target: "2".to_owned(),
                source_index: 0,
                target_index: 1,
                weight: None,
            }]
        );
    }

    #[test]
    fn linked_nodes_end_closer_than_unlinked_ones() {
        let nodes = ["a", "b", "c", "d"].map(node);
        let edges = [edge("a", "b"), edge("c", "d")];

        let result = layout(&nodes, &edges, &LayoutConfig::default());

        let linked = (distance(&result, "a", "b") + distance(&result, "c", "d")) / 2.0;
        let unlinked = [("a", "c"), ("a", "d"), ("b", "c"), ("b", "d")]
            .iter()
            .map(|(x, y)| distance(&result, x, y))
            .sum::<f32>()
            / 4.0;
        assert!(linked < unlinked, "linked {linked} vs unlinked {unlinked}");
    }

    #[test]
    fn larger_graph_has_no_overlapping_nodes() {
        let ids = (0..40).map(|index| format!("n{index}")).collect::<Vec<_>>();
        let nodes = ids.iter().map(|id| node(id)).collect::<Vec<_>>();
        let edges = ids
            .iter()
            .zip(ids.iter().cycle().skip(1))
            .map(|(a, b)| edge(a, b))
            .collect::<Vec<_>>();
        let config = LayoutConfig::default();

        let result = layout(&nodes, &edges, &config);

        let points = ids.iter().map(|id| result.positions[id]).collect::<Vec<_>>();
        assert!(points.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
        for (offset, a) in points.iter().enumerate() {
            for b in &points[offset + 1..] {
                assert!((*a - *b).length() >= config.collide_radius);
            }
        }
    }

    #[test]
    fn dangling_edges_are_reported_not_simulated() {
        let nodes = [node("1"), node("2")];
        let edges = [edge("1", "2"), edge("2", "404")];

        let result = layout(&nodes, &edges, &LayoutConfig::default());

        assert_eq!(result.edges.len(), 1);
        assert_eq!(result.dropped_edges, vec![edge("2", "404")]);
        assert_eq!(result.positions.len(), 2);
    }

    #[test]
    fn self_loop_is_resolved_but_inert() {
        let config = LayoutConfig::default();

        let result = layout(&[node("x")], &[edge("x", "x")], &config);

        assert_eq!(result.edges.len(), 1);
        assert!((result.positions["x"] - config.center).length() < 1e-3);
    }

    #[test]
    fn layout_is_deterministic() {
        let nodes = ["a", "b", "c"].map(node);
        let edges = [edge("a", "b"), edge("b", "c")];

        let first = layout(&nodes, &edges, &LayoutConfig::default());
        let second = layout(&nodes, &edges, &LayoutConfig::default());

        assert_eq!(first.positions, second.positions);
    }

    #[test]
    fn cancelled_layout_returns_nothing() {
        let cancel = CancelToken::new();
        cancel.clone().cancel();

        let result = layout_until(&[node("a")], &[], &LayoutConfig::default(), &cancel);

        assert!(result.is_none());
    }

    #[test]
    fn uncancelled_layout_matches_plain_run() {
        let nodes = [node("a"), node("b")];
        let edges = [edge("a", "b")];
        let config = LayoutConfig::default();

        let plain = layout(&nodes, &edges, &config);
        let guarded = layout_until(&nodes, &edges, &config, &CancelToken::new()).unwrap();

        assert_eq!(plain.positions, guarded.positions);
    }

    #[test]
    fn apply_writes_positions_into_nodes() {
        let mut nodes = vec![node("a")];
        let result = layout(&nodes, &[], &LayoutConfig::default());

        result.apply(&mut nodes);

        assert_eq!(nodes[0].position, result.positions["a"]);
    }

    #[test]
    fn alpha_reaches_minimum_after_configured_ticks() {
        let config = LayoutConfig::default();
        let decay = alpha_decay(&config);

        let alpha = (0..config.iterations).fold(1.0_f32, |alpha, _| alpha - alpha * decay);

        assert!((alpha - config.alpha_min).abs() < 1e-4);
    }
}
