//! Cell anchor positions and the nearest-anchor search used for pointer hits.

use std::f32::consts::{FRAC_PI_2, TAU};
use std::ops::Sub;

use serde::{Deserialize, Serialize};

use crate::shared::{CellId, COLS, NUM_CELLS};

/// 3D point in scene space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

/// Rotation of a cell about the vertical axis, in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orientation {
    pub heading: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Anchor {
    pub position: Vec3,
    pub orientation: Orientation,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorLayout {
    /// Flat lattice, slot along x and row along z.
    #[default]
    Lanes,
    /// One ring per row, slots evenly spaced around it.
    Rings,
}

/// Fixed anchor for every cell, in row-major order.
#[derive(Debug, Clone)]
pub struct Anchors {
    cells: [Anchor; NUM_CELLS],
}

impl Anchors {
    pub fn new(layout: AnchorLayout, spacing: f32) -> Self {
        let cells = std::array::from_fn(|i| {
            let cell = CellId::from_index(i);
            match layout {
                AnchorLayout::Lanes => lane_anchor(cell, spacing),
                AnchorLayout::Rings => ring_anchor(cell, spacing),
            }
        });
        Self { cells }
    }

    pub fn get(&self, cell: CellId) -> Anchor {
        self.cells[cell.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellId, &Anchor)> {
        self.cells.iter().enumerate().map(|(i, a)| (CellId::from_index(i), a))
    }

    /// Cell whose anchor is closest to `pos`. Only a strictly smaller distance
    /// replaces the current best, so ties resolve to the first cell in
    /// row-major order. A NaN position matches nothing and yields (0, 0).
    pub fn nearest(&self, pos: Vec3) -> CellId {
        let mut nearest = CellId::new(0, 0);
        let mut closest = f32::INFINITY;
        for (cell, anchor) in self.iter() {
            let d = (anchor.position - pos).length_squared();
            if d < closest {
                closest = d;
                nearest = cell;
            }
        }
        nearest
    }

    /// (min_x, min_z, max_x, max_z) over all anchors, for top-down projection.
    pub fn bounds_xz(&self) -> (f32, f32, f32, f32) {
        self.cells.iter().fold(
            (f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
            |(x0, z0, x1, z1), a| {
                (
                    x0.min(a.position.x),
                    z0.min(a.position.z),
                    x1.max(a.position.x),
                    z1.max(a.position.z),
                )
            },
        )
    }
}

impl Default for Anchors {
    fn default() -> Self {
        Self::new(AnchorLayout::Lanes, 1.0)
    }
}

fn lane_anchor(cell: CellId, spacing: f32) -> Anchor {
    Anchor {
        position: Vec3::new(cell.col as f32 * spacing, 0.0, cell.row as f32 * spacing),
        orientation: Orientation::default(),
    }
}

fn ring_anchor(cell: CellId, spacing: f32) -> Anchor {
    let radius = (cell.row + 1) as f32 * spacing;
    let angle = TAU * cell.col as f32 / COLS as f32;
    Anchor {
        position: Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin()),
        // face along the ring
        orientation: Orientation { heading: angle + FRAC_PI_2 },
    }
}
