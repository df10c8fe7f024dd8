//! Cell cost kernel: один сегмент → dimension² байт cost
//!
//! Row-major обход от top-left клетки: внешний цикл по -Z, внутренний по +X.
//! Этот порядок — контракт для flow-field consumer.

use bevy::prelude::*;

use crate::components::{Cell, CellCostBuffer};
use crate::physics::{Probe, SpatialIndex};

/// Пересчитать cost буфер одного сегмента
///
/// Буфер очищается и заполняется целиком. Пишет только в свой буфер,
/// probe и index только читаются — безопасно гонять параллельно по сегментам.
pub fn fill_cell_costs<S: SpatialIndex + ?Sized>(
    top_left: Vec3,
    buffer: &mut CellCostBuffer,
    probe: &Probe,
    index: &S,
    dimension: usize,
) {
    buffer.clear();
    buffer.reserve(dimension * dimension);

    let half_cell = Cell::WORLD_SIZE / 2.0;

    let mut center = top_left;
    center.z -= half_cell;
    let row_start_x = top_left.x + half_cell;

    for _row in 0..dimension {
        center.x = row_start_x;
        for _col in 0..dimension {
            let cost = if index.test(probe, center) {
                Cell::BLOCKED_CELL_COST
            } else {
                Cell::DEFAULT_CELL_COST
            };
            buffer.push(cost);

            center.x += Cell::WORLD_SIZE;
        }
        center.z -= Cell::WORLD_SIZE;
    }
}
