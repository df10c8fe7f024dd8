//! Flow-field cost grid
//!
//! ECS-слой на Bevy 0.16: для каждого dirty сегмента навигационной сетки и каждого
//! размера агента считает, какие клетки заблокированы геометрией мира.
//! Результат (CellCostBuffer) читает flow-field propagation.
//!
//! Разделение:
//! - components: данные сегмента + SegmentDimension singleton
//! - physics: probe + read-only snapshot colliders (Rapier shapes, parry queries)
//! - cost: dirty tracking, kernel, scheduler, CostGridPlugin

use bevy::prelude::*;
use bevy::transform::TransformPlugin;
use bevy_rapier3d::prelude::{Collider, CollisionGroups, Group};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod components;
pub mod config;
pub mod cost;
pub mod error;
pub mod logger;
pub mod physics;

// Re-export базовых типов для удобства
pub use components::*;
pub use config::{CostGridConfig, DEFAULT_TOLERANCE, NAVIGATION_COLLISION_LAYER};
pub use cost::{CostGridPlugin, CostGridStats, CostSet, SegmentCostsUpdated};
pub use error::CostGridError;
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter};
pub use physics::{CollisionWorld, Probe, ProbeBuilder, SpatialIndex};

/// Детерминистичный RNG resource (seeded) — раскладка demo-препятствий
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless расчёта
///
/// CostGridPlugin не добавляется — тесты/бинарь решают сами.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins((MinimalPlugins, TransformPlugin))
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Top-left anchor сегмента по координате в сетке сегментов
///
/// coord.x → +X, coord.y → -Z (как и строки внутри сегмента).
pub fn segment_top_left(coord: IVec2, dimension: SegmentDimension) -> Vec3 {
    let extent = dimension.world_extent();
    Vec3::new(coord.x as f32 * extent, 0.0, -(coord.y as f32) * extent)
}

/// Spawn одного варианта сегмента (dirty сразу)
pub fn spawn_segment(commands: &mut Commands, coord: IVec2, top_left: Vec3, unit_size: f32) -> Entity {
    commands
        .spawn((
            NavSegment { coord },
            WorldTopLeftPosition(top_left),
            UnitSize(unit_size),
            // CellCostBuffer + UpdateCostTag — через Required Components
        ))
        .id()
}

/// Spawn вариантов одного логического сегмента — по одному на size class
pub fn spawn_segment_variants(
    commands: &mut Commands,
    coord: IVec2,
    top_left: Vec3,
    unit_sizes: &[f32],
) -> Vec<Entity> {
    unit_sizes
        .iter()
        .map(|&unit_size| spawn_segment(commands, coord, top_left, unit_size))
        .collect()
}

/// Spawn статического препятствия на навигационном слое
pub fn spawn_nav_obstacle(commands: &mut Commands, collider: Collider, position: Vec3) -> Entity {
    let layer = Group::from_bits_truncate(NAVIGATION_COLLISION_LAYER);

    commands
        .spawn((
            Transform::from_translation(position),
            GlobalTransform::from_translation(position),
            collider,
            CollisionGroups::new(layer, Group::ALL),
        ))
        .id()
}

/// Snapshot всех cost буферов для сравнения детерминизма
///
/// Порядок: coord (x, y), затем size class — не зависит от Entity ID.
pub fn cost_grid_snapshot(world: &mut World) -> Vec<u8> {
    let mut query = world.query::<(&NavSegment, &UnitSize, &CellCostBuffer)>();
    let mut segments: Vec<_> = query.iter(world).collect();

    segments.sort_by(|(a, a_size, _), (b, b_size, _)| {
        (a.coord.x, a.coord.y)
            .cmp(&(b.coord.x, b.coord.y))
            .then(a_size.size_class().cmp(&b_size.size_class()))
    });

    let mut snapshot = Vec::new();
    for (segment, unit_size, buffer) in segments {
        snapshot.extend_from_slice(&segment.coord.x.to_le_bytes());
        snapshot.extend_from_slice(&segment.coord.y.to_le_bytes());
        snapshot.extend_from_slice(&unit_size.0.to_le_bytes());
        snapshot.extend_from_slice(&(buffer.len() as u32).to_le_bytes());
        snapshot.extend_from_slice(buffer.as_slice());
    }

    snapshot
}
