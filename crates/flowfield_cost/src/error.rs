//! Ошибки cost-grid слоя

use thiserror::Error;

/// Ошибки конфигурации / построения probe
///
/// Ни одна из них не паникует в системах: батч или кадр пропускается,
/// `UpdateCostTag` остаётся, повтор на следующем кадре.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CostGridError {
    /// Радиус probe после вычета tolerance ≤ 0 (или NaN)
    #[error("degenerate probe: radius {radius} - tolerance {tolerance} = {effective_radius}")]
    DegenerateProbe {
        radius: f32,
        tolerance: f32,
        effective_radius: f32,
    },

    #[error("invalid probe tolerance {0} (must be finite and >= 0)")]
    InvalidTolerance(f32),

    #[error("invalid segment dimension {0} (must be > 0)")]
    InvalidSegmentDimension(usize),
}

pub type Result<T> = std::result::Result<T, CostGridError>;
