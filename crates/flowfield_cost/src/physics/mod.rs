//! Physics-сторона cost grid
//!
//! Probe (сфера агента) и read-only snapshot геометрии через Rapier colliders.
//! Сама физика (Rapier step) здесь не крутится — нужны только shapes + transforms.

pub mod broad_phase;
pub mod collision_world;
pub mod probe;

// Re-export основных типов
pub use collision_world::{
    build_collision_world,
    collider_aabb,
    groups_interact,
    scaled_collider,
    to_isometry,
    world_footprint,
    ColliderEntry,
    CollisionWorld,
    SpatialIndex,
};
pub use probe::{Probe, ProbeBuilder};
