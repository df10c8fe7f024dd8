//! Collision world snapshot для occupancy тестов
//!
//! Архитектура:
//! - `build_collision_world` собирает все не-sensor `Collider` + `GlobalTransform` раз в кадр
//! - Snapshot immutable до следующего build — workers читают его параллельно
//! - `generation` = токен "build завершён": scheduler не стартует батчи при generation == 0
//!
//! - Scale из `GlobalTransform` запекается в копию shape (Rapier plugin здесь не крутится)
//!
//! Запрос: grid broad-phase → AABB → точный parry `intersection_test` (static overlap, без sweep).

use bevy::math::bounding::{Aabb3d, IntersectsVolume};
use bevy::math::Vec3A;
use bevy::prelude::*;
use bevy_rapier3d::na::{Isometry3, Quaternion, Translation3, UnitQuaternion};
use bevy_rapier3d::parry::query;
use bevy_rapier3d::prelude::{Collider, CollisionGroups, Sensor};
use std::collections::HashMap;

use crate::physics::broad_phase::GroundGrid;
use crate::physics::Probe;

/// Subdivisions для non-uniform scale (как `scaled_shape_subdivision` в bevy_rapier)
pub const SCALED_SHAPE_SUBDIVISIONS: u32 = 10;

/// Read-only spatial index: "пересекает ли shape в точке что-то из геометрии?"
///
/// Implementations обязаны быть Sync — один handle шарится всеми workers батча.
pub trait SpatialIndex: Send + Sync {
    fn test(&self, probe: &Probe, point: Vec3) -> bool;
}

/// Rapier semantics: взаимодействуют, если каждый состоит в фильтре другого
pub fn groups_interact(a: CollisionGroups, b: CollisionGroups) -> bool {
    a.memberships.intersects(b.filters) && b.memberships.intersects(a.filters)
}

/// Один collider в snapshot
#[derive(Clone)]
pub struct ColliderEntry {
    pub entity: Entity,
    pub shape: Collider,
    pub isometry: Isometry3<f32>,
    pub aabb: Aabb3d,
    pub groups: CollisionGroups,
}

/// Snapshot геометрии мира на текущий кадр
#[derive(Resource, Default)]
pub struct CollisionWorld {
    entries: Vec<ColliderEntry>,
    by_entity: HashMap<Entity, usize>,
    broad_phase: GroundGrid,
    generation: u64,
}

impl CollisionWorld {
    /// Хотя бы один build завершён
    pub fn is_ready(&self) -> bool {
        self.generation > 0
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ColliderEntry] {
        &self.entries
    }

    /// World AABB collider'а из последнего build
    pub fn footprint(&self, entity: Entity) -> Option<Aabb3d> {
        self.by_entity.get(&entity).map(|&index| self.entries[index].aabb)
    }

    /// Начать новый build (старые данные отбрасываются)
    pub fn begin_build(&mut self) {
        self.entries.clear();
        self.by_entity.clear();
        self.broad_phase.clear();
    }

    pub fn insert(
        &mut self,
        entity: Entity,
        shape: &Collider,
        transform: &GlobalTransform,
        groups: CollisionGroups,
    ) {
        let shape = scaled_collider(shape, transform);
        let isometry = to_isometry(transform);
        let aabb = collider_aabb(&shape, &isometry);
        let index = self.entries.len();

        self.by_entity.insert(entity, index);
        self.broad_phase.insert(index, &aabb);
        self.entries.push(ColliderEntry {
            entity,
            shape,
            isometry,
            aabb,
            groups,
        });
    }

    /// Build завершён — snapshot можно читать
    pub fn finish_build(&mut self) {
        self.generation += 1;
    }
}

impl SpatialIndex for CollisionWorld {
    fn test(&self, probe: &Probe, point: Vec3) -> bool {
        let probe_aabb = probe.aabb_at(point);
        let probe_isometry = Isometry3::translation(point.x, point.y, point.z);

        self.broad_phase.any_candidate(&probe_aabb, |index| {
            let entry = &self.entries[index];
            if !groups_interact(probe.groups, entry.groups) {
                return false;
            }
            if !entry.aabb.intersects(&probe_aabb) {
                return false;
            }
            // Неподдерживаемая пара shapes → AABB ответ (считаем заблокированной)
            query::intersection_test(
                &probe_isometry,
                &*probe.shape.raw,
                &entry.isometry,
                &*entry.shape.raw,
            )
            .unwrap_or(true)
        })
    }
}

/// GlobalTransform → parry isometry (scale сюда не входит, см. `scaled_collider`)
pub fn to_isometry(transform: &GlobalTransform) -> Isometry3<f32> {
    let (_, rotation, translation) = transform.to_scale_rotation_translation();
    Isometry3::from_parts(
        Translation3::new(translation.x, translation.y, translation.z),
        UnitQuaternion::new_normalize(Quaternion::new(rotation.w, rotation.x, rotation.y, rotation.z)),
    )
}

/// Копия collider'а с scale из `GlobalTransform`
///
/// `set_scale` считает от unscaled shape, так что повторный вызов с тем же scale безопасен.
pub fn scaled_collider(shape: &Collider, transform: &GlobalTransform) -> Collider {
    let (scale, _, _) = transform.to_scale_rotation_translation();
    let mut scaled = shape.clone();
    scaled.set_scale(scale, SCALED_SHAPE_SUBDIVISIONS);
    scaled
}

/// World AABB collider'а с учётом scale и позы
pub fn world_footprint(shape: &Collider, transform: &GlobalTransform) -> Aabb3d {
    collider_aabb(&scaled_collider(shape, transform), &to_isometry(transform))
}

/// World AABB collider'а в заданной позе
pub fn collider_aabb(shape: &Collider, isometry: &Isometry3<f32>) -> Aabb3d {
    let aabb = shape.raw.compute_aabb(isometry);
    Aabb3d {
        min: Vec3A::new(aabb.mins.x, aabb.mins.y, aabb.mins.z),
        max: Vec3A::new(aabb.maxs.x, aabb.maxs.y, aabb.maxs.z),
    }
}

/// Система: пересобрать snapshot из текущих colliders
///
/// Producer для `CostSet::ComputeCosts`: chain гарантирует, что scheduler
/// видит только завершённый build этого кадра.
pub fn build_collision_world(
    mut collision_world: ResMut<CollisionWorld>,
    colliders: Query<(Entity, &Collider, &GlobalTransform, Option<&CollisionGroups>), Without<Sensor>>,
) {
    collision_world.begin_build();

    for (entity, collider, transform, groups) in colliders.iter() {
        collision_world.insert(entity, collider, transform, groups.copied().unwrap_or_default());
    }

    collision_world.finish_build();
}
