//! Сегмент навигационной сетки: позиция, cost буфер, size class, dirty marker

use bevy::prelude::*;
use std::cmp::Ordering;

use crate::components::Cell;

/// Логический сегмент (одна координата сетки сегментов)
///
/// Для каждого size class спавнится отдельный entity с тем же `coord`.
/// Новый сегмент сразу dirty (UpdateCostTag через Required Components).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
#[require(CellCostBuffer, UpdateCostTag)]
pub struct NavSegment {
    pub coord: IVec2,
}

/// World-space anchor сетки сегмента (top-left угол, -Z = "вниз")
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct WorldTopLeftPosition(pub Vec3);

/// Dirty marker: cost буфер устарел для текущего size class
///
/// Снимается только scheduler'ом через Commands после завершения батча.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct UpdateCostTag;

/// Размер агента, для которого считается этот вариант сегмента
///
/// Хранимое значение делится пополам перед построением probe
/// (диаметр это или радиус — не уточняется, преобразование сохраняем буквально).
/// 0 = не агент, такие сегменты не пересчитываются.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct UnitSize(pub f32);

impl UnitSize {
    pub fn size_class(&self) -> SizeClass {
        SizeClass(self.0)
    }
}

/// Ключ группировки сегментов по размеру агента
///
/// Total order через `f32::total_cmp` — можно класть в BTreeMap/BTreeSet.
#[derive(Debug, Clone, Copy, Reflect)]
pub struct SizeClass(pub f32);

impl SizeClass {
    pub fn value(&self) -> f32 {
        self.0
    }

    /// 0 — sentinel "нет footprint", не реальный агент
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl PartialEq for SizeClass {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SizeClass {}

impl PartialOrd for SizeClass {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SizeClass {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Cost буфер сегмента: один байт на клетку, row-major
///
/// После пересчёта: len == dimension², значения ∈ {DEFAULT, BLOCKED}.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct CellCostBuffer(pub Vec<u8>);

impl CellCostBuffer {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn push(&mut self, cost: u8) {
        self.0.push(cost);
    }

    pub fn reserve(&mut self, additional: usize) {
        self.0.reserve(additional);
    }

    /// Cost клетки (row, col); None если буфер ещё не посчитан под эту размерность
    pub fn cost(&self, row: usize, col: usize, dimension: usize) -> Option<u8> {
        if row >= dimension || col >= dimension {
            return None;
        }
        self.0.get(Cell::index(row, col, dimension)).copied()
    }

    pub fn is_blocked(&self, row: usize, col: usize, dimension: usize) -> bool {
        self.cost(row, col, dimension) == Some(Cell::BLOCKED_CELL_COST)
    }

    pub fn blocked_count(&self) -> usize {
        self.0.iter().filter(|&&cost| cost == Cell::BLOCKED_CELL_COST).count()
    }

    /// Буфер полностью посчитан под `dimension`
    pub fn is_complete(&self, dimension: usize) -> bool {
        self.0.len() == dimension * dimension
            && self
                .0
                .iter()
                .all(|&cost| cost == Cell::DEFAULT_CELL_COST || cost == Cell::BLOCKED_CELL_COST)
    }
}

/// Количество клеток на сторону сегмента (singleton, владеет хост)
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Resource)]
pub struct SegmentDimension(pub usize);

impl SegmentDimension {
    pub fn cell_count(&self) -> usize {
        self.0 * self.0
    }

    /// Сторона сегмента в world units
    pub fn world_extent(&self) -> f32 {
        self.0 as f32 * Cell::WORLD_SIZE
    }
}

/// XZ footprint сегмента (Rect: x → x, y → z)
pub fn segment_footprint(top_left: Vec3, dimension: SegmentDimension) -> Rect {
    let extent = dimension.world_extent();
    Rect::new(top_left.x, top_left.z - extent, top_left.x + extent, top_left.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_size_class_dedup_and_order() {
        let classes: BTreeSet<SizeClass> = [2.0, 1.0, 2.0, 0.0, 1.0]
            .into_iter()
            .map(SizeClass)
            .collect();

        let values: Vec<f32> = classes.iter().map(SizeClass::value).collect();
        assert_eq!(values, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_size_class_zero() {
        assert!(SizeClass(0.0).is_zero());
        assert!(!SizeClass(0.5).is_zero());
    }

    #[test]
    fn test_cost_buffer_accessors() {
        let mut buffer = CellCostBuffer::default();
        for i in 0..4 {
            buffer.push(if i == 3 { Cell::BLOCKED_CELL_COST } else { Cell::DEFAULT_CELL_COST });
        }

        assert!(buffer.is_complete(2));
        assert!(!buffer.is_complete(3));
        assert_eq!(buffer.blocked_count(), 1);
        assert!(buffer.is_blocked(1, 1, 2));
        assert_eq!(buffer.cost(0, 1, 2), Some(Cell::DEFAULT_CELL_COST));
        assert_eq!(buffer.cost(2, 0, 2), None);
    }

    #[test]
    fn test_incomplete_buffer_with_foreign_value() {
        let buffer = CellCostBuffer(vec![Cell::DEFAULT_CELL_COST, 7, 1, 1]);
        assert!(!buffer.is_complete(2));
    }

    #[test]
    fn test_segment_footprint() {
        let rect = segment_footprint(Vec3::new(4.0, 0.0, 8.0), SegmentDimension(4));

        assert_eq!(rect.min, Vec2::new(4.0, 4.0));
        assert_eq!(rect.max, Vec2::new(8.0, 8.0));
    }
}
