//! Adaptive cell subdivision over a distance field.
//!
//! A cell whose center distance exceeds its half-diagonal lies entirely on
//! one side of the surface and is classified without recursing. Only cells
//! straddling the surface are split, down to a minimum cell size.

use crate::bbox::Aabb3;
use crate::math::{Point3, Vec3};

/// Maximum subdivision depth below the root cell.
pub const MAX_DEPTH: u8 = 10;

/// A cubic cell.
#[derive(Debug, Clone, Copy)]
struct Cell {
    center: Point3,
    half: f64,
}

impl Cell {
    /// Smallest cube centered on `region` that covers it.
    fn covering(region: &Aabb3) -> Self {
        let size = region.size();
        Self {
            center: region.center(),
            half: size.x.max(size.y).max(size.z) / 2.0,
        }
    }

    fn half_diagonal(&self) -> f64 {
        self.half * 3f64.sqrt()
    }

    fn volume(&self) -> f64 {
        (2.0 * self.half).powi(3)
    }

    /// Children in Morton order: bit 0 = +x, bit 1 = +y, bit 2 = +z.
    fn children(&self) -> [Cell; 8] {
        let q = self.half / 2.0;
        std::array::from_fn(|i| Cell {
            center: self.center
                + Vec3::new(
                    if i & 1 == 0 { -q } else { q },
                    if i & 2 == 0 { -q } else { q },
                    if i & 4 == 0 { -q } else { q },
                ),
            half: q,
        })
    }
}

/// Depth at which the cell edge drops to `resolution` or below.
fn depth_for(cell: &Cell, resolution: f64) -> u8 {
    let ratio = (2.0 * cell.half / resolution).max(1.0);
    (ratio.log2().ceil() as u8).min(MAX_DEPTH)
}

/// Volume of `{p in region : sdf(p) < 0}`.
///
/// Leaf cells are sampled on a 2x2x2 grid.
pub fn integrate<F>(sdf: &F, region: &Aabb3, resolution: f64) -> f64
where
    F: Fn(&Point3) -> f64,
{
    if region.is_empty() {
        return 0.0;
    }
    let root = Cell::covering(region);
    if root.half <= 0.0 {
        return 0.0;
    }
    let max_depth = depth_for(&root, resolution);
    integrate_cell(sdf, region, &root, 0, max_depth)
}

fn integrate_cell<F>(sdf: &F, region: &Aabb3, cell: &Cell, depth: u8, max_depth: u8) -> f64
where
    F: Fn(&Point3) -> f64,
{
    let d = sdf(&cell.center);
    let reach = cell.half_diagonal();
    if d > reach {
        return 0.0;
    }
    if d < -reach {
        return cell.volume();
    }
    if depth >= max_depth {
        let inside = cell
            .children()
            .iter()
            .filter(|c| sdf(&c.center) < 0.0)
            .count();
        return cell.volume() * inside as f64 / 8.0;
    }
    cell.children()
        .iter()
        .filter(|c| cell_touches(c, region))
        .map(|c| integrate_cell(sdf, region, c, depth + 1, max_depth))
        .sum()
}

fn cell_touches(cell: &Cell, region: &Aabb3) -> bool {
    let h = Vec3::new(cell.half, cell.half, cell.half);
    Aabb3::new(cell.center - h, cell.center + h).overlaps(region)
}

/// Find a point where both fields are below `-penetration`.
///
/// Returns the first witness found, or `None` if the fields only touch or
/// are disjoint within `region` at the given resolution.
pub fn find_overlap<A, B>(
    a: &A,
    b: &B,
    region: &Aabb3,
    penetration: f64,
    resolution: f64,
) -> Option<Point3>
where
    A: Fn(&Point3) -> f64,
    B: Fn(&Point3) -> f64,
{
    if region.is_empty() {
        return None;
    }
    let root = Cell::covering(region);
    let max_depth = depth_for(&root, resolution);
    overlap_cell(a, b, region, &root, penetration, 0, max_depth)
}

fn overlap_cell<A, B>(
    a: &A,
    b: &B,
    region: &Aabb3,
    cell: &Cell,
    penetration: f64,
    depth: u8,
    max_depth: u8,
) -> Option<Point3>
where
    A: Fn(&Point3) -> f64,
    B: Fn(&Point3) -> f64,
{
    let da = a(&cell.center);
    let db = b(&cell.center);
    let both = da.max(db);
    if both < -penetration {
        return Some(cell.center);
    }
    if both > cell.half_diagonal() - penetration || depth >= max_depth {
        return None;
    }
    cell.children()
        .iter()
        .filter(|c| cell_touches(c, region))
        .find_map(|c| overlap_cell(a, b, region, c, penetration, depth + 1, max_depth))
}
