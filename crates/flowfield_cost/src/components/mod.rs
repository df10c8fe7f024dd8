//! ECS Components cost-grid слоя
//!
//! Организация:
//! - segment: сегмент сетки (NavSegment, WorldTopLeftPosition, CellCostBuffer, UnitSize, UpdateCostTag)
//!   + singleton SegmentDimension
//! - cell: константы клетки и геометрия центров

pub mod cell;
pub mod segment;

pub use cell::*;
pub use segment::*;
