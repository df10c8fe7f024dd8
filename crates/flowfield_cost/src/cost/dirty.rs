//! Dirty tracking: геометрия изменилась → сегменты вокруг неё пересчитать
//!
//! Старый footprint collider'а берём из прошлого snapshot CollisionWorld
//! (система идёт ДО build), новый — из текущего Collider + GlobalTransform.
//! Проверка только по XZ: cost grid плоский.

use bevy::math::bounding::Aabb3d;
use bevy::prelude::*;
use bevy_rapier3d::prelude::{Collider, CollisionGroups, Sensor};

use crate::components::{segment_footprint, SegmentDimension, UnitSize, UpdateCostTag, WorldTopLeftPosition};
use crate::config::CostGridConfig;
use crate::cost::events::CostGridStats;
use crate::physics::{world_footprint, CollisionWorld};

/// XZ проекция AABB (Rect: x → x, y → z)
pub fn ground_rect(aabb: &Aabb3d) -> Rect {
    Rect::new(aabb.min.x, aabb.min.z, aabb.max.x, aabb.max.z)
}

/// Пересечение с касанием (касание тоже влияет на граничные клетки)
pub fn rects_touch(a: &Rect, b: &Rect) -> bool {
    a.min.x <= b.max.x && a.max.x >= b.min.x && a.min.y <= b.max.y && a.max.y >= b.min.y
}

/// Сегмент затронут, если probe из любой его клетки может достать footprint
pub fn segment_affected(
    top_left: Vec3,
    unit_size: f32,
    dimension: SegmentDimension,
    changed: &[Rect],
) -> bool {
    let reach = (unit_size / 2.0).max(0.0);
    let footprint = segment_footprint(top_left, dimension).inflate(reach);
    changed.iter().any(|rect| rects_touch(&footprint, rect))
}

/// Colliders, чей вклад в snapshot мог измениться
///
/// Sensor и CollisionGroups тоже решают, попадёт ли collider в тест.
pub type TouchedColliders<'w, 's> = Query<
    'w,
    's,
    Entity,
    (
        With<Collider>,
        Or<(
            Changed<Collider>,
            Changed<GlobalTransform>,
            Changed<CollisionGroups>,
            Added<Sensor>,
        )>,
    ),
>;

/// Система: пометить сегменты dirty при изменении colliders
///
/// Для каждого затронутого collider'а: старый footprint (если был в snapshot)
/// + новый (если collider сейчас участвует в build).
pub fn mark_dirty_on_geometry_change(
    mut commands: Commands,
    config: Res<CostGridConfig>,
    dimension: Option<Res<SegmentDimension>>,
    collision_world: Res<CollisionWorld>,
    touched_colliders: TouchedColliders,
    colliders: Query<(&Collider, &GlobalTransform), Without<Sensor>>,
    mut removed_colliders: RemovedComponents<Collider>,
    mut removed_sensors: RemovedComponents<Sensor>,
    mut removed_groups: RemovedComponents<CollisionGroups>,
    clean_segments: Query<(Entity, &WorldTopLeftPosition, &UnitSize), Without<UpdateCostTag>>,
    mut stats: ResMut<CostGridStats>,
) {
    // Читаем removed всегда, иначе события потеряются/накопятся
    let mut touched: Vec<Entity> = removed_colliders
        .read()
        .chain(removed_sensors.read())
        .chain(removed_groups.read())
        .collect();

    if !config.track_geometry_changes {
        return;
    }
    let Some(dimension) = dimension else {
        return;
    };

    touched.extend(touched_colliders.iter());
    touched.sort();
    touched.dedup();

    let mut changed: Vec<Rect> = Vec::new();

    for entity in touched {
        if let Some(old) = collision_world.footprint(entity) {
            changed.push(ground_rect(&old));
        }
        if let Ok((collider, transform)) = colliders.get(entity) {
            changed.push(ground_rect(&world_footprint(collider, transform)));
        }
    }

    if changed.is_empty() {
        return;
    }

    let mut marked = 0u64;
    for (segment, top_left, unit_size) in clean_segments.iter() {
        if segment_affected(top_left.0, unit_size.0, *dimension, &changed) {
            commands.entity(segment).insert(UpdateCostTag);
            marked += 1;
        }
    }

    if marked > 0 {
        stats.segments_marked_dirty += marked;
        crate::log(&format!(
            "Cost grid: {} geometry changes → {} segments marked dirty",
            changed.len(),
            marked
        ));
    }
}
