use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

/// Axis-aligned square region of the plane.
#[derive(Clone, Copy, Debug)]
pub(super) struct Square {
    pub(super) center: Vec2,
    pub(super) half: f32,
}

impl Square {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for point in points {
            min = min.min(*point);
            max = max.max(*point);
        }

        if !(min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite()) {
            return None;
        }

        let extent = (max - min).max_elem().max(1.0);
        Some(Self {
            center: (min + max) * 0.5,
            half: extent * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half && (point.y - self.center.y).abs() <= self.half
    }

    pub(super) fn side(self) -> f32 {
        self.half * 2.0
    }

    /// Squared gap between two squares, zero when they touch or overlap.
    pub(super) fn gap_sq(self, other: Self) -> f32 {
        let reach = self.half + other.half;
        let dx = ((self.center.x - other.center.x).abs() - reach).max(0.0);
        let dy = ((self.center.y - other.center.y).abs() - reach).max(0.0);
        dx * dx + dy * dy
    }

    fn quadrant(self, index: usize) -> Self {
        let half = self.half * 0.5;
        let sx = if index & 1 == 0 { -half } else { half };
        let sy = if index & 2 == 0 { -half } else { half };
        Self {
            center: self.center + vec2(sx, sy),
            half,
        }
    }

    fn quadrant_of(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }
}

/// Barnes-Hut cell. Leaves keep their member indices; inner cells only keep
/// the aggregate used for far-field approximation.
pub(super) struct Cell {
    pub(super) square: Square,
    pub(super) centroid: Vec2,
    pub(super) count: f32,
    pub(super) members: Vec<usize>,
    pub(super) children: [Option<Box<Cell>>; 4],
}

impl Cell {
    pub(super) fn build(points: &[Vec2]) -> Option<Self> {
        let square = Square::enclosing(points)?;
        Some(Self::subdivide(square, (0..points.len()).collect(), points, 0))
    }

    fn subdivide(square: Square, members: Vec<usize>, points: &[Vec2], depth: usize) -> Self {
        let count = members.len() as f32;
        let centroid = if members.is_empty() {
            square.center
        } else {
            members.iter().fold(Vec2::ZERO, |sum, &index| sum + points[index]) / count
        };

        let mut cell = Self {
            square,
            centroid,
            count,
            members,
            children: std::array::from_fn(|_| None),
        };

        if depth >= MAX_DEPTH || cell.members.len() <= LEAF_CAPACITY {
            return cell;
        }

        let mut buckets: [Vec<usize>; 4] = std::array::from_fn(|_| Vec::new());
        for &index in &cell.members {
            buckets[square.quadrant_of(points[index])].push(index);
        }

        // Everything landed in one quadrant: the points are (nearly) coincident.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return cell;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if !bucket.is_empty() {
                cell.children[quadrant] = Some(Box::new(Self::subdivide(
                    square.quadrant(quadrant),
                    bucket,
                    points,
                    depth + 1,
                )));
            }
        }
        cell.members.clear();
        cell
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn children(&self) -> impl Iterator<Item = &Cell> {
        self.children.iter().filter_map(|child| child.as_deref())
    }
}
