use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use super::quadtree::Cell;

/// Tiny deterministic nudge used when two points coincide exactly.
pub(super) fn jiggle(a: usize, b: usize) -> Vec2 {
    let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214 + 0.37) * TAU;
    vec2(angle.cos(), angle.sin()) * 1e-6
}

/// Distances below one unit are softened so close pairs do not explode.
fn softened(distance_sq: f32) -> f32 {
    if distance_sq < 1.0 {
        distance_sq.sqrt()
    } else {
        distance_sq
    }
}

#[derive(Clone, Copy)]
pub(super) struct Charge {
    pub(super) strength: f32,
    pub(super) alpha: f32,
    pub(super) theta_sq: f32,
}

/// Adds the many-body contribution of `cell` to the velocity of `index`.
pub(super) fn accumulate_charge(
    cell: &Cell,
    index: usize,
    positions: &[Vec2],
    charge: Charge,
    velocity: &mut Vec2,
) {
    if cell.count <= 0.0 {
        return;
    }

    let point = positions[index];

    if cell.is_leaf() {
        for &other in &cell.members {
            if other == index {
                continue;
            }
            let mut delta = positions[other] - point;
            if delta == Vec2::ZERO {
                delta = jiggle(index, other);
            }
            *velocity += delta * (charge.strength * charge.alpha / softened(delta.length_sq()));
        }
        return;
    }

    let delta = cell.centroid - point;
    let distance_sq = delta.length_sq();
    let side = cell.square.side();
    if !cell.square.contains(point) && side * side / charge.theta_sq < distance_sq {
        *velocity +=
            delta * (charge.strength * cell.count * charge.alpha / softened(distance_sq));
        return;
    }

    for child in cell.children() {
        accumulate_charge(child, index, positions, charge, velocity);
    }
}

/// Resolves overlaps between every pair of predicted positions closer than
/// `2 * radius`. Equal radii split the correction evenly.
pub(super) fn accumulate_collisions(
    a: &Cell,
    b: &Cell,
    same: bool,
    predicted: &[Vec2],
    radius: f32,
    velocities: &mut [Vec2],
) {
    let reach = radius * 2.0;
    if a.square.gap_sq(b.square) > reach * reach {
        return;
    }

    if a.is_leaf() && b.is_leaf() {
        if same {
            for (offset, &i) in a.members.iter().enumerate() {
                for &j in &a.members[offset + 1..] {
                    separate(i, j, predicted, reach, velocities);
                }
            }
        } else {
            for &i in &a.members {
                for &j in &b.members {
                    separate(i, j, predicted, reach, velocities);
                }
            }
        }
        return;
    }

    if same {
        let children = a.children().collect::<Vec<_>>();
        for (offset, first) in children.iter().enumerate() {
            accumulate_collisions(first, first, true, predicted, radius, velocities);
            for second in &children[offset + 1..] {
                accumulate_collisions(first, second, false, predicted, radius, velocities);
            }
        }
        return;
    }

    let split_a = !a.is_leaf() && (b.is_leaf() || a.square.half >= b.square.half);
    if split_a {
        for child in a.children() {
            accumulate_collisions(child, b, false, predicted, radius, velocities);
        }
    } else {
        for child in b.children() {
            accumulate_collisions(a, child, false, predicted, radius, velocities);
        }
    }
}

fn separate(i: usize, j: usize, predicted: &[Vec2], reach: f32, velocities: &mut [Vec2]) {
    let mut delta = predicted[i] - predicted[j];
    let distance_sq = delta.length_sq();
    if distance_sq >= reach * reach {
        return;
    }

    if delta.x == 0.0 || delta.y == 0.0 {
        let nudge = jiggle(i, j);
        if delta.x == 0.0 {
            delta.x = nudge.x;
        }
        if delta.y == 0.0 {
            delta.y = nudge.y;
        }
    }

    let distance = delta.length();
    let push = delta * ((reach - distance) / distance) * 0.5;
    velocities[i] += push;
    velocities[j] -= push;
}

pub(super) struct Spring {
    pub(super) source: usize,
    pub(super) target: usize,
    pub(super) strength: f32,
    /// Share of the correction applied to the target.
    pub(super) bias: f32,
}

pub(super) fn apply_springs(
    springs: &[Spring],
    positions: &[Vec2],
    velocities: &mut [Vec2],
    rest_length: f32,
    alpha: f32,
) {
    for spring in springs {
        let (s, t) = (spring.source, spring.target);
        let mut delta = (positions[t] + velocities[t]) - (positions[s] + velocities[s]);
        if delta == Vec2::ZERO {
            delta = jiggle(s, t);
        }

        let length = delta.length();
        let correction = delta * ((length - rest_length) / length * alpha * spring.strength);
        velocities[t] -= correction * spring.bias;
        velocities[s] += correction * (1.0 - spring.bias);
    }
}

/// Translates every point so their mean lands on `center`.
pub(super) fn recenter(positions: &mut [Vec2], center: Vec2) {
    if positions.is_empty() {
        return;
    }

    let mean = positions.iter().fold(Vec2::ZERO, |sum, point| sum + *point) / positions.len() as f32;
    let shift = mean - center;
    for point in positions {
        *point -= shift;
    }
}
