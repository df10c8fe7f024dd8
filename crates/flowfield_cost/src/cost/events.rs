//! Cost grid events и статистика

use bevy::prelude::*;

/// Событие: cost буфер сегмента пересчитан и dirty marker снимается
///
/// Пишется после завершения батча — consumer может читать буфер
/// после применения Commands (со следующего кадра или позже в этом).
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct SegmentCostsUpdated {
    pub segment: Entity,
    pub size_class: f32,
}

/// Счётчики scheduler'а (накопительные)
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Resource)]
pub struct CostGridStats {
    /// Кадры, где scheduler дошёл до группировки сегментов
    pub frames_processed: u64,
    /// Кадры, пропущенные из-за отсутствия SegmentDimension / collision world
    pub frames_skipped: u64,
    pub batches_dispatched: u64,
    pub segments_recomputed: u64,
    /// Size classes, для которых probe не построилась
    pub batches_rejected: u64,
    /// Сегменты, помеченные dirty из-за изменений геометрии
    pub segments_marked_dirty: u64,
}
