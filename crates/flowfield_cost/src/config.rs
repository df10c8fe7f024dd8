//! Конфигурация cost-grid расчёта

use bevy::prelude::*;
use bevy_rapier3d::prelude::{CollisionGroups, Group};
use serde::{Deserialize, Serialize};

use crate::error::{CostGridError, Result};

/// Tolerance по умолчанию (world units)
///
/// Probe сжимается на это значение, чтобы касание соседней геометрии
/// на границе клетки не давало ложный BLOCKED.
pub const DEFAULT_TOLERANCE: f32 = 0.05;

/// Навигационный collision layer (11-й бит)
pub const NAVIGATION_COLLISION_LAYER: u32 = 1 << 10;

/// Настройки cost-grid слоя
///
/// Хост может вставить свой resource до `CostGridPlugin` — plugin его не перезапишет.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostGridConfig {
    /// Сжатие радиуса probe (world units)
    pub tolerance: f32,
    /// Bit mask слоя: probe принадлежит ему и сталкивается только с ним
    pub collision_layer: u32,
    /// Помечать сегменты dirty при изменении геометрии
    pub track_geometry_changes: bool,
}

impl Default for CostGridConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            collision_layer: NAVIGATION_COLLISION_LAYER,
            track_geometry_changes: true,
        }
    }
}

impl CostGridConfig {
    /// Общий фильтр для всех probe (memberships == filters == layer)
    pub fn collision_groups(&self) -> CollisionGroups {
        let layer = Group::from_bits_truncate(self.collision_layer);
        CollisionGroups::new(layer, layer)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(CostGridError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}
