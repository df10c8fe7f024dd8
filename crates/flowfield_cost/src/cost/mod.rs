//! Cost grid module (flow-field navigation, cost stage)
//!
//! ECS ответственность:
//! - Dirty tracking: изменения colliders → UpdateCostTag на сегментах
//! - Snapshot геометрии: CollisionWorld (read-only на кадр)
//! - Пересчёт CellCostBuffer per size class, параллельно по сегментам
//! - Events: SegmentCostsUpdated для flow-field consumer
//!
//! Не здесь: интеграция/flow field, пути, регистрация size classes.

use bevy::prelude::*;
use bevy::transform::TransformSystem;

pub mod dirty;
pub mod events;
pub mod kernel;
pub mod scheduler;

#[cfg(test)]
mod scheduler_tests;

// Re-export основных типов
pub use dirty::mark_dirty_on_geometry_change;
pub use events::{CostGridStats, SegmentCostsUpdated};
pub use kernel::fill_cell_costs;
pub use scheduler::{dispatch_batch, group_by_size_class, update_cell_costs, DirtySegments};

use crate::config::CostGridConfig;
use crate::physics::{build_collision_world, CollisionWorld};

/// Фазы cost grid внутри PostUpdate (выполняются по порядку)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CostSet {
    /// Изменения геометрии → dirty markers
    TrackGeometry,
    /// Producer: snapshot collision world
    BuildCollisionWorld,
    /// Consumer: батчи kernel'а + отложенное снятие dirty markers
    ComputeCosts,
}

/// Cost Grid Plugin
///
/// Регистрирует системы в PostUpdate, после transform propagation
/// (GlobalTransform colliders уже актуален в этом кадре).
///
/// Порядок выполнения:
/// 1. mark_dirty_on_geometry_change — dirty markers по изменениям colliders
/// 2. build_collision_world — snapshot геометрии, generation += 1
/// 3. update_cell_costs — пересчёт dirty сегментов
///
/// Commands между фазами применяются автоматически (chain → sync point),
/// снятие UpdateCostTag — в конце schedule, до чтения в следующем кадре.
pub struct CostGridPlugin;

impl Plugin for CostGridPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CostGridConfig>()
            .init_resource::<CollisionWorld>()
            .init_resource::<CostGridStats>()
            .add_event::<SegmentCostsUpdated>();

        app.configure_sets(
            PostUpdate,
            (
                CostSet::TrackGeometry,
                CostSet::BuildCollisionWorld,
                CostSet::ComputeCosts,
            )
                .chain()
                .after(TransformSystem::TransformPropagate),
        );

        app.add_systems(
            PostUpdate,
            (
                mark_dirty_on_geometry_change.in_set(CostSet::TrackGeometry),
                build_collision_world.in_set(CostSet::BuildCollisionWorld),
                update_cell_costs.in_set(CostSet::ComputeCosts),
            ),
        );
    }
}
