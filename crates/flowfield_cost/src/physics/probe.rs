//! Probe: сфера размера агента для occupancy теста клетки
//!
//! Одна probe на size class, переиспользуется всеми workers батча (read-only).
//! Shape — обычный `Collider` (Arc внутри), без raw pointers.

use bevy::math::bounding::Aabb3d;
use bevy::prelude::*;
use bevy_rapier3d::prelude::{Collider, CollisionGroups};
use std::fmt;

use crate::error::{CostGridError, Result};

/// Геометрический probe + collision filter
#[derive(Clone)]
pub struct Probe {
    /// Сфера с центром в origin
    pub shape: Collider,
    /// Радиус после вычета tolerance
    pub radius: f32,
    pub groups: CollisionGroups,
}

impl fmt::Debug for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Probe")
            .field("radius", &self.radius)
            .field("groups", &self.groups)
            .finish()
    }
}

impl Probe {
    /// Bounding box probe, поставленной в `point`
    pub fn aabb_at(&self, point: Vec3) -> Aabb3d {
        Aabb3d::new(point, Vec3::splat(self.radius))
    }
}

/// Строит probe для size class (tolerance + общий фильтр)
#[derive(Debug, Clone, Copy)]
pub struct ProbeBuilder {
    pub tolerance: f32,
    pub groups: CollisionGroups,
}

impl ProbeBuilder {
    pub fn new(tolerance: f32, groups: CollisionGroups) -> Self {
        Self { tolerance, groups }
    }

    /// Сфера радиуса `radius - tolerance`
    ///
    /// Fail fast: вырожденная сфера дала бы всегда-false/true тест.
    pub fn build(&self, radius: f32) -> Result<Probe> {
        let effective_radius = radius - self.tolerance;

        if !effective_radius.is_finite() || effective_radius <= 0.0 {
            return Err(CostGridError::DegenerateProbe {
                radius,
                tolerance: self.tolerance,
                effective_radius,
            });
        }

        Ok(Probe {
            shape: Collider::ball(effective_radius),
            radius: effective_radius,
            groups: self.groups,
        })
    }

    /// Probe для хранимого UnitSize: берём половину значения
    pub fn for_unit_size(&self, unit_size: f32) -> Result<Probe> {
        self.build(unit_size / 2.0)
    }
}
