#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Stateless geometric queries against the visible light set.
//!
//! Every function reads light centres and radii by value; nothing here keeps
//! state between calls except [`SuitabilityGrid`], which caches its window
//! offsets and the outcome of its most recent recomputation.

use firefly_maze_core::LightSnapshot;
use glam::Vec2;

/// Shape tested when checking whether a straight move crosses a light.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntersectionMode {
    /// The infinite line through both points. Flinches from lights behind the mover.
    Line,
    /// Only the bounded segment between both points.
    #[default]
    Segment,
}

/// Reports whether any light centre lies strictly within `radius` of `point`.
#[must_use]
pub fn is_point_lit(point: Vec2, sources: &[Vec2], radius: f32) -> bool {
    sources.iter().any(|source| source.distance(point) < radius)
}

/// Reports whether the infinite line through `p1` and `p2` meets the circle.
///
/// Solves the line–circle quadratic in `f64`. Equal x-coordinates take the
/// vertical branch; identical points degenerate to that vertical line.
#[must_use]
pub fn line_intersects_circle(p1: Vec2, p2: Vec2, centre: Vec2, radius: f32) -> bool {
    let (x1, y1) = (f64::from(p1.x), f64::from(p1.y));
    let (x2, y2) = (f64::from(p2.x), f64::from(p2.y));
    let (cx, cy) = (f64::from(centre.x), f64::from(centre.y));
    let r2 = f64::from(radius) * f64::from(radius);

    if x1 == x2 {
        let b = -2.0 * cy;
        let c = cx * cx + cy * cy - r2 + x1 * x1 - 2.0 * cx * x1;
        return b * b - 4.0 * c >= 0.0;
    }

    let slope = (y2 - y1) / (x2 - x1);
    let intercept = y2 - slope * x2;
    let a = slope * slope + 1.0;
    let b = 2.0 * (slope * intercept - slope * cy - cx);
    let c = cx * cx + cy * cy - r2 + intercept * intercept - 2.0 * intercept * cy;
    b * b - 4.0 * a * c >= 0.0
}

/// Reports whether the segment from `p1` to `p2` touches the circle.
#[must_use]
pub fn segment_intersects_circle(p1: Vec2, p2: Vec2, centre: Vec2, radius: f32) -> bool {
    let direction = (p2 - p1).as_dvec2();
    let offset = (p1 - centre).as_dvec2();
    let r2 = f64::from(radius) * f64::from(radius);

    let a = direction.length_squared();
    let c = offset.length_squared() - r2;
    if a == 0.0 {
        return c <= 0.0;
    }
    let b = 2.0 * offset.dot(direction);
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return false;
    }
    let root = discriminant.sqrt();
    let entry = (-b - root) / (2.0 * a);
    let exit = (-b + root) / (2.0 * a);
    entry <= 1.0 && exit >= 0.0
}

/// Reports whether moving from `p1` to `p2` crosses any light's range.
#[must_use]
pub fn segment_intersects_any_light(
    p1: Vec2,
    p2: Vec2,
    sources: &[Vec2],
    radius: f32,
    mode: IntersectionMode,
) -> bool {
    sources.iter().any(|centre| match mode {
        IntersectionMode::Line => line_intersects_circle(p1, p2, *centre, radius),
        IntersectionMode::Segment => segment_intersects_circle(p1, p2, *centre, radius),
    })
}

/// World positions among `reference + offsets` that lie in the dark ring.
///
/// A position qualifies when no light lies closer than `inner_radius` and at
/// least one lies closer than `outer_radius`. An inner radius larger than the
/// outer one can never qualify.
#[must_use]
pub fn suitable_cells(
    reference: Vec2,
    offsets: &[Vec2],
    sources: &[Vec2],
    inner_radius: f32,
    outer_radius: f32,
) -> Vec<Vec2> {
    offsets
        .iter()
        .map(|offset| reference + *offset)
        .filter(|position| in_dark_ring(*position, sources, inner_radius, outer_radius))
        .collect()
}

/// Player step gate.
///
/// A step is allowed while the player stands in light, or when the point one
/// unit along `direction` does.
#[must_use]
pub fn can_step(snapshot: &LightSnapshot, position: Vec2, direction: Vec2) -> bool {
    let sources = snapshot.sources();
    let radius = snapshot.radius();
    is_point_lit(position, sources, radius) || is_point_lit(position + direction, sources, radius)
}

fn in_dark_ring(position: Vec2, sources: &[Vec2], inner_radius: f32, outer_radius: f32) -> bool {
    !is_point_lit(position, sources, inner_radius) && is_point_lit(position, sources, outer_radius)
}

/// Square window of candidate positions centred on a moving reference point.
#[derive(Clone, Debug)]
pub struct SuitabilityGrid {
    side: usize,
    offsets: Vec<Vec2>,
    suitable: Vec<bool>,
    positions: Vec<Vec2>,
}

impl SuitabilityGrid {
    /// Creates a window `side` cells wide. Even sides grow by one so the
    /// reference point always sits on the centre cell.
    #[must_use]
    pub fn new(side: usize, cell_size: f32) -> Self {
        let side = if side % 2 == 0 { side + 1 } else { side };
        let half = (side / 2) as f32;
        let mut offsets = Vec::with_capacity(side * side);
        for i in 0..side {
            for j in 0..side {
                offsets.push(Vec2::new(i as f32 - half, j as f32 - half) * cell_size);
            }
        }
        Self {
            side,
            suitable: vec![false; offsets.len()],
            offsets,
            positions: Vec::new(),
        }
    }

    /// Number of cells along each edge of the window.
    #[must_use]
    pub const fn side(&self) -> usize {
        self.side
    }

    /// Offsets of every cell relative to the reference point.
    #[must_use]
    pub fn offsets(&self) -> &[Vec2] {
        &self.offsets
    }

    /// Recomputes the grid around `reference` and returns the suitable world positions.
    pub fn recompute(
        &mut self,
        reference: Vec2,
        sources: &[Vec2],
        inner_radius: f32,
        outer_radius: f32,
    ) -> &[Vec2] {
        self.positions.clear();
        for (offset, flag) in self.offsets.iter().zip(self.suitable.iter_mut()) {
            let position = reference + *offset;
            *flag = in_dark_ring(position, sources, inner_radius, outer_radius);
            if *flag {
                self.positions.push(position);
            }
        }
        &self.positions
    }

    /// Reports whether the cell at column `i`, row `j` was suitable.
    #[must_use]
    pub fn is_suitable(&self, i: usize, j: usize) -> bool {
        if i >= self.side || j >= self.side {
            return false;
        }
        self.suitable.get(i * self.side + j).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RADII: [f32; 5] = [0.01, 0.5, 1.2, 3.0, 10.0];

    #[test]
    fn midpoint_on_centre_always_intersects() {
        let segments = [
            (Vec2::new(1.0, 2.0), Vec2::new(5.0, 4.0)),
            (Vec2::new(-3.0, 1.0), Vec2::new(-3.0, 7.0)),
            (Vec2::new(0.0, -2.0), Vec2::new(8.0, -2.0)),
        ];
        for (p1, p2) in segments {
            let centre = (p1 + p2) * 0.5;
            for radius in RADII {
                for mode in [IntersectionMode::Line, IntersectionMode::Segment] {
                    assert!(
                        segment_intersects_any_light(p1, p2, &[centre], radius, mode),
                        "{p1} -> {p2} radius {radius} mode {mode:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn line_test_sees_lights_behind_the_mover() {
        let p1 = Vec2::new(0.0, 0.0);
        let p2 = Vec2::new(1.0, 0.0);
        let behind = Vec2::new(-5.0, 0.2);

        assert!(line_intersects_circle(p1, p2, behind, 0.5));
        assert!(!segment_intersects_circle(p1, p2, behind, 0.5));
    }

    #[test]
    fn vertical_line_uses_horizontal_offset() {
        let p1 = Vec2::new(2.0, 0.0);
        let p2 = Vec2::new(2.0, 3.0);

        assert!(line_intersects_circle(p1, p2, Vec2::new(2.9, 100.0), 1.0));
        assert!(!line_intersects_circle(p1, p2, Vec2::new(3.1, 1.0), 1.0));
    }

    #[test]
    fn degenerate_segment_is_a_point_test() {
        let point = Vec2::new(1.0, 1.0);

        assert!(segment_intersects_circle(point, point, Vec2::new(1.5, 1.0), 0.5));
        assert!(!segment_intersects_circle(point, point, Vec2::new(2.0, 2.0), 0.5));
    }

    #[test]
    fn inverted_ring_is_empty() {
        let mut grid = SuitabilityGrid::new(11, 0.4);
        let sources = [Vec2::new(0.3, -0.2), Vec2::new(1.0, 1.0)];

        assert!(grid.recompute(Vec2::ZERO, &sources, 3.0, 2.0).is_empty());
        assert!(suitable_cells(Vec2::ZERO, grid.offsets(), &sources, 8.0, 1.0).is_empty());
    }

    #[test]
    fn ring_keeps_cells_between_radii() {
        let mut grid = SuitabilityGrid::new(5, 0.5);
        let reference = Vec2::new(10.0, 10.0);
        let sources = [reference];

        let suitable = grid.recompute(reference, &sources, 1.0, 1.5).to_vec();

        assert_eq!(suitable.len(), 16);
        assert!(suitable.iter().all(|position| {
            let offset = *position - reference;
            offset.x.abs().max(offset.y.abs()) == 1.0
        }));
        assert!(grid.is_suitable(0, 0));
        assert!(!grid.is_suitable(2, 2));
        assert!(!grid.is_suitable(9, 0));
    }

    #[test]
    fn no_lights_means_nothing_is_reachable() {
        let offsets = SuitabilityGrid::new(3, 1.0).offsets().to_vec();

        assert!(suitable_cells(Vec2::ZERO, &offsets, &[], 0.0, 100.0).is_empty());
    }

    #[test]
    fn even_window_grows_to_odd() {
        let grid = SuitabilityGrid::new(10, 0.4);

        assert_eq!(grid.side(), 11);
        assert_eq!(grid.offsets().len(), 121);
        assert_eq!(grid.offsets()[60], Vec2::ZERO);
    }

    #[test]
    fn step_gate_allows_leaving_or_entering_light() {
        let snapshot = LightSnapshot::new(vec![Vec2::new(0.0, 0.0)], 1.2, 1);

        assert!(can_step(&snapshot, Vec2::new(1.0, 0.0), Vec2::new(1.0, 0.0)));
        assert!(can_step(&snapshot, Vec2::new(2.0, 0.0), Vec2::new(-1.0, 0.0)));
        assert!(!can_step(&snapshot, Vec2::new(2.0, 0.0), Vec2::new(1.0, 0.0)));
    }
}
