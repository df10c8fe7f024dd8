//! Клетка cost grid: константы и геометрия центров

use bevy::prelude::*;

/// Клетка — не entity, а позиция в буфере сегмента (row-major)
pub struct Cell;

impl Cell {
    /// Длина ребра клетки (world units)
    pub const WORLD_SIZE: f32 = 1.0;
    /// Проходимая клетка
    pub const DEFAULT_CELL_COST: u8 = 1;
    /// Заблокированная геометрией клетка
    pub const BLOCKED_CELL_COST: u8 = 255;

    /// Центр клетки (row, col) от top-left угла сегмента
    ///
    /// Row растёт по -Z, col по +X, Y берётся из anchor.
    pub fn center(top_left: Vec3, row: usize, col: usize) -> Vec3 {
        let half = Self::WORLD_SIZE / 2.0;
        Vec3::new(
            top_left.x + half + col as f32 * Self::WORLD_SIZE,
            top_left.y,
            top_left.z - half - row as f32 * Self::WORLD_SIZE,
        )
    }

    /// Индекс в row-major буфере
    pub fn index(row: usize, col: usize, dimension: usize) -> usize {
        row * dimension + col
    }
}
