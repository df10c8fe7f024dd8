//! Cost grid scheduler: per-frame пайплайн пересчёта
//!
//! Порядок внутри кадра:
//! 1. Synchronize — collision world уже собран (chain CostSet), проверяем generation
//! 2. Read configuration — SegmentDimension singleton, иначе кадр пропускается
//! 3. Enumerate size classes — уникальные UnitSize среди dirty сегментов, 0 пропускаем
//! 4. Per size class — probe + параллельный батч kernel'а по сегментам этого класса
//! 5. Deferred mutation — UpdateCostTag снимается через Commands после батча

use bevy::ecs::batching::BatchingStrategy;
use bevy::prelude::*;
use std::collections::BTreeMap;

use crate::components::{CellCostBuffer, SegmentDimension, SizeClass, UnitSize, UpdateCostTag, WorldTopLeftPosition};
use crate::config::CostGridConfig;
use crate::cost::events::{CostGridStats, SegmentCostsUpdated};
use crate::cost::kernel::fill_cell_costs;
use crate::error::CostGridError;
use crate::physics::{CollisionWorld, Probe, ProbeBuilder, SpatialIndex};

/// Dirty сегменты (все size classes сразу, фильтр по классу — внутри батча)
pub type DirtySegments<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static WorldTopLeftPosition,
        &'static UnitSize,
        &'static mut CellCostBuffer,
    ),
    With<UpdateCostTag>,
>;

/// Сгруппировать сегменты по size class
///
/// Size class 0 — не агент, в результат не попадает (tag остаётся).
/// BTreeMap → детерминированный порядок батчей.
pub fn group_by_size_class(
    segments: impl IntoIterator<Item = (Entity, SizeClass)>,
) -> BTreeMap<SizeClass, Vec<Entity>> {
    let mut batches: BTreeMap<SizeClass, Vec<Entity>> = BTreeMap::new();

    for (entity, size_class) in segments {
        if size_class.is_zero() {
            continue;
        }
        batches.entry(size_class).or_default().push(entity);
    }

    batches
}

/// Параллельный батч kernel'а для одного size class
///
/// Один task на сегмент; каждый worker пишет только в свой CellCostBuffer.
/// Возвращается после завершения всех workers.
pub fn dispatch_batch<S: SpatialIndex>(
    segments: &mut DirtySegments,
    size_class: SizeClass,
    probe: &Probe,
    index: &S,
    dimension: usize,
) {
    segments
        .par_iter_mut()
        .batching_strategy(BatchingStrategy::fixed(1))
        .for_each(|(_, top_left, unit_size, mut buffer)| {
            if unit_size.size_class() != size_class {
                return;
            }
            fill_cell_costs(top_left.0, &mut buffer, probe, index, dimension);
        });
}

/// Система: пересчёт cost буферов dirty сегментов
///
/// Нет dirty сегментов — нормальный no-op.
/// Нет SegmentDimension / collision world — кадр пропускается целиком, повтор на следующем.
pub fn update_cell_costs(
    mut commands: Commands,
    dimension: Option<Res<SegmentDimension>>,
    config: Res<CostGridConfig>,
    collision_world: Res<CollisionWorld>,
    mut segments: DirtySegments,
    mut updated_events: EventWriter<SegmentCostsUpdated>,
    mut stats: ResMut<CostGridStats>,
    mut dimension_missing_reported: Local<bool>,
) {
    if segments.is_empty() {
        return;
    }

    let Some(dimension) = dimension else {
        // Логируем один раз на "серию" кадров без конфигурации
        if !*dimension_missing_reported {
            crate::log_warning("Cost grid: SegmentDimension resource missing, skipping frame");
            *dimension_missing_reported = true;
        }
        stats.frames_skipped += 1;
        return;
    };
    *dimension_missing_reported = false;

    if dimension.0 == 0 {
        crate::log_error(&format!("Cost grid: {}", CostGridError::InvalidSegmentDimension(0)));
        stats.frames_skipped += 1;
        return;
    }

    if !collision_world.is_ready() {
        crate::log_warning("Cost grid: collision world has no completed build, skipping frame");
        stats.frames_skipped += 1;
        return;
    }

    if let Err(err) = config.validate() {
        crate::log_error(&format!("Cost grid: {}", err));
        stats.frames_skipped += 1;
        return;
    }

    stats.frames_processed += 1;

    let batches = group_by_size_class(
        segments
            .iter()
            .map(|(entity, _, unit_size, _)| (entity, unit_size.size_class())),
    );
    let builder = ProbeBuilder::new(config.tolerance, config.collision_groups());

    for (size_class, batch) in batches {
        let probe = match builder.for_unit_size(size_class.value()) {
            Ok(probe) => probe,
            Err(err) => {
                crate::log_error(&format!(
                    "Cost grid: size class {} rejected ({} segments stay dirty): {}",
                    size_class.value(),
                    batch.len(),
                    err
                ));
                stats.batches_rejected += 1;
                continue;
            }
        };

        dispatch_batch(&mut segments, size_class, &probe, &*collision_world, dimension.0);

        // Батч завершён → снимаем dirty marker (применится на sync point)
        for &segment in &batch {
            commands.entity(segment).remove::<UpdateCostTag>();
            updated_events.write(SegmentCostsUpdated {
                segment,
                size_class: size_class.value(),
            });
        }

        stats.batches_dispatched += 1;
        stats.segments_recomputed += batch.len() as u64;

        crate::log(&format!(
            "Cost grid: size class {} → {} segments recomputed (probe radius {:.3}, world gen {})",
            size_class.value(),
            batch.len(),
            probe.radius,
            collision_world.generation()
        ));
    }
}
