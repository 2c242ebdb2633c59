use std::collections::HashMap;

use glam::{IVec2, Vec2};
use smallvec::SmallVec;

use crate::{bounds::Bounds2D, error::positive, pool::{ParticleId, ParticlePool}, ConfigError};

/// Neighbors of one particle for one tick.
pub type NeighborList = SmallVec<[ParticleId; 16]>;

/// Uniform grid over the simulation bounds whose cell size equals the support radius, so the
/// 3×3 block around a particle's cell covers its whole interaction disk.
#[derive(Debug, Clone)]
pub struct SpatialHash {
    bounds: Bounds2D,
    cell_size: f32,
    inv_cell_size: f32,
    squared_support_radius: f32,
    /// Grid cell counts. Valid cell indices run over `0..=cells` on each axis.
    cells: IVec2,
    buckets: HashMap<i32, Vec<ParticleId>>,
}

impl SpatialHash {
    pub fn new(bounds: Bounds2D, cell_size: f32) -> Result<Self, ConfigError> {
        bounds.validate()?;
        positive("cell size", cell_size)?;

        let size = bounds.size();
        let cells = (size / cell_size).round().as_ivec2();
        if cells.x < 1 || cells.y < 1 {
            return Err(ConfigError::EmptyGrid { size: size.into(), cell_size });
        }

        Ok(Self {
            bounds,
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            squared_support_radius: cell_size * cell_size,
            cells,
            buckets: HashMap::new(),
        })
    }

    #[inline(always)]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline(always)]
    pub fn cells(&self) -> IVec2 {
        self.cells
    }

    #[inline]
    pub fn cell_index(&self, p: Vec2) -> IVec2 {
        ((p - self.bounds.min) * self.inv_cell_size).floor().as_ivec2()
    }

    /// Rows are `cells.x + 1` wide since the last index on each axis is inclusive; a narrower
    /// stride would alias the last column of one row with the first column of the next.
    #[inline]
    pub fn cell_key(&self, cell: IVec2) -> i32 {
        cell.x + cell.y * (self.cells.x + 1)
    }

    /// Rebuilds the index from scratch over `particles`. Buckets are emptied but keep their
    /// allocations across ticks.
    pub fn rebuild(&mut self, particles: &[ParticleId], pool: &ParticlePool) {
        self.buckets.values_mut().for_each(Vec::clear);

        for &id in particles {
            let key = self.cell_key(self.cell_index(pool[id].position));
            self.buckets.entry(key).or_default().push(id);
        }
    }

    /// Fills `out` with every indexed particle strictly within the support radius of `position`,
    /// excluding any at distance zero (the querying particle itself and exact duplicates).
    pub fn neighbors_of(&self, position: Vec2, pool: &ParticlePool, out: &mut NeighborList) {
        out.clear();

        let center = self.cell_index(position);

        for i in center.x - 1..=center.x + 1 {
            for j in center.y - 1..=center.y + 1 {
                if i < 0 || j < 0 || i > self.cells.x || j > self.cells.y {
                    continue;
                }

                let Some(bucket) = self.buckets.get(&self.cell_key(IVec2::new(i, j))) else {
                    continue;
                };

                for &id in bucket {
                    let d2 = position.distance_squared(pool[id].position);
                    if d2 > 0.0 && d2 < self.squared_support_radius {
                        out.push(id);
                    }
                }
            }
        }
    }
}
