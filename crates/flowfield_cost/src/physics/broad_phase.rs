//! Broad-phase для CollisionWorld: uniform grid по XZ
//!
//! Каждый collider регистрируется во всех ячейках, которые накрывает его AABB.
//! Огромные (или бесконечные) AABB уходят в отдельный список и проверяются всегда.

use bevy::math::bounding::Aabb3d;
use bevy::prelude::*;
use std::collections::HashMap;

/// Размер ячейки broad-phase (world units)
pub const BROAD_PHASE_CELL_SIZE: f32 = 4.0;

/// Больше ячеек — collider считается oversized
const MAX_CELLS_PER_ENTRY: f32 = 256.0;

#[derive(Debug, Clone)]
pub struct GroundGrid {
    cell_size: f32,
    cells: HashMap<IVec2, Vec<usize>>,
    oversized: Vec<usize>,
}

impl Default for GroundGrid {
    fn default() -> Self {
        Self::new(BROAD_PHASE_CELL_SIZE)
    }
}

impl GroundGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            oversized: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.oversized.clear();
    }

    /// Диапазон ячеек (включительно) под AABB; None — не влезает в сетку
    fn cell_range(&self, aabb: &Aabb3d) -> Option<(IVec2, IVec2)> {
        let min_x = (aabb.min.x / self.cell_size).floor();
        let min_z = (aabb.min.z / self.cell_size).floor();
        let max_x = (aabb.max.x / self.cell_size).floor();
        let max_z = (aabb.max.z / self.cell_size).floor();

        let finite = [min_x, min_z, max_x, max_z].iter().all(|v| v.is_finite());
        if !finite || (max_x - min_x + 1.0) * (max_z - min_z + 1.0) > MAX_CELLS_PER_ENTRY {
            return None;
        }

        Some((
            IVec2::new(min_x as i32, min_z as i32),
            IVec2::new(max_x as i32, max_z as i32),
        ))
    }

    pub fn insert(&mut self, index: usize, aabb: &Aabb3d) {
        let Some((min, max)) = self.cell_range(aabb) else {
            self.oversized.push(index);
            return;
        };

        for x in min.x..=max.x {
            for z in min.y..=max.y {
                self.cells.entry(IVec2::new(x, z)).or_default().push(index);
            }
        }
    }

    /// Есть ли кандидат, для которого `hit` вернул true
    ///
    /// Один collider может прийти несколько раз (если накрывает несколько ячеек).
    pub fn any_candidate(&self, aabb: &Aabb3d, mut hit: impl FnMut(usize) -> bool) -> bool {
        if self.oversized.iter().any(|&index| hit(index)) {
            return true;
        }

        let Some((min, max)) = self.cell_range(aabb) else {
            // Запрос больше сетки — проверяем всё
            return self
                .cells
                .values()
                .flatten()
                .any(|&index| hit(index));
        };

        for x in min.x..=max.x {
            for z in min.y..=max.y {
                if let Some(bucket) = self.cells.get(&IVec2::new(x, z)) {
                    if bucket.iter().any(|&index| hit(index)) {
                        return true;
                    }
                }
            }
        }

        false
    }
}
