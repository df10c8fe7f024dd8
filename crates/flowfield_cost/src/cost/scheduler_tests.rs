//! Tests for cost grid scheduler.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;
    use bevy::transform::TransformPlugin;

    use crate::components::{CellCostBuffer, NavSegment, SegmentDimension, SizeClass, UnitSize, UpdateCostTag, WorldTopLeftPosition};
    use crate::config::CostGridConfig;
    use crate::cost::{update_cell_costs, CostGridPlugin, CostGridStats, SegmentCostsUpdated};
    use crate::cost::scheduler::group_by_size_class;
    use crate::physics::CollisionWorld;

    fn cost_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, TransformPlugin, CostGridPlugin));
        app
    }

    fn spawn_test_segment(app: &mut App, unit_size: f32) -> Entity {
        app.world_mut()
            .spawn((
                NavSegment { coord: IVec2::ZERO },
                WorldTopLeftPosition(Vec3::ZERO),
                UnitSize(unit_size),
            ))
            .id()
    }

    fn is_dirty(app: &App, entity: Entity) -> bool {
        app.world().get::<UpdateCostTag>(entity).is_some()
    }

    #[test]
    fn test_group_by_size_class_skips_zero() {
        let a = Entity::from_raw(1);
        let b = Entity::from_raw(2);
        let c = Entity::from_raw(3);
        let d = Entity::from_raw(4);

        let batches = group_by_size_class([
            (a, SizeClass(1.0)),
            (b, SizeClass(0.0)),
            (c, SizeClass(2.0)),
            (d, SizeClass(1.0)),
        ]);

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[&SizeClass(1.0)], vec![a, d]);
        assert_eq!(batches[&SizeClass(2.0)], vec![c]);
        assert!(!batches.contains_key(&SizeClass(0.0)));
    }

    #[test]
    fn test_new_segment_starts_dirty() {
        let mut app = cost_app();
        let segment = spawn_test_segment(&mut app, 1.0);

        assert!(is_dirty(&app, segment));
        assert!(app.world().get::<CellCostBuffer>(segment).unwrap().is_empty());
    }

    #[test]
    fn test_missing_dimension_skips_frame_and_retries() {
        let mut app = cost_app();
        let segment = spawn_test_segment(&mut app, 1.0);

        app.update();

        assert!(is_dirty(&app, segment), "Без SegmentDimension dirty marker должен остаться");
        assert!(app.world().get::<CellCostBuffer>(segment).unwrap().is_empty());
        assert_eq!(app.world().resource::<CostGridStats>().frames_skipped, 1);

        // Конфигурация появилась → следующий кадр считает
        app.insert_resource(SegmentDimension(3));
        app.update();

        assert!(!is_dirty(&app, segment));
        assert!(app.world().get::<CellCostBuffer>(segment).unwrap().is_complete(3));
    }

    #[test]
    fn test_zero_dimension_is_rejected() {
        let mut app = cost_app();
        app.insert_resource(SegmentDimension(0));
        let segment = spawn_test_segment(&mut app, 1.0);

        app.update();

        assert!(is_dirty(&app, segment));
        assert_eq!(app.world().resource::<CostGridStats>().batches_dispatched, 0);
    }

    #[test]
    fn test_degenerate_size_class_keeps_dirty() {
        let mut app = cost_app();
        app.insert_resource(SegmentDimension(2));
        // 0.1 / 2 - 0.05 = 0 → probe не строится
        let tiny = spawn_test_segment(&mut app, 0.1);
        let normal = spawn_test_segment(&mut app, 1.0);

        app.update();

        let stats = *app.world().resource::<CostGridStats>();
        assert_eq!(stats.batches_rejected, 1);
        assert_eq!(stats.batches_dispatched, 1);
        assert!(is_dirty(&app, tiny));
        assert!(!is_dirty(&app, normal));
    }

    #[test]
    fn test_invalid_tolerance_skips_frame() {
        let mut app = cost_app();
        app.insert_resource(SegmentDimension(2))
            .insert_resource(CostGridConfig { tolerance: -1.0, ..default() });
        let segment = spawn_test_segment(&mut app, 1.0);

        app.update();

        assert!(is_dirty(&app, segment));
        assert_eq!(app.world().resource::<CostGridStats>().frames_skipped, 1);
    }

    #[test]
    fn test_collision_world_not_ready_skips_frame() {
        // Только consumer, без build_collision_world
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<CostGridConfig>()
            .init_resource::<CollisionWorld>()
            .init_resource::<CostGridStats>()
            .insert_resource(SegmentDimension(2))
            .add_event::<SegmentCostsUpdated>()
            .add_systems(Update, update_cell_costs);
        let segment = spawn_test_segment(&mut app, 1.0);

        app.update();

        assert!(is_dirty(&app, segment));
        assert_eq!(app.world().resource::<CostGridStats>().frames_skipped, 1);
    }

    #[test]
    fn test_no_dirty_segments_is_noop() {
        let mut app = cost_app();
        app.insert_resource(SegmentDimension(2));

        app.update();

        let stats = *app.world().resource::<CostGridStats>();
        assert_eq!(stats, CostGridStats::default());
    }

    #[test]
    fn test_updated_events_written_per_segment() {
        let mut app = cost_app();
        app.insert_resource(SegmentDimension(2));
        let small = spawn_test_segment(&mut app, 1.0);
        let large = spawn_test_segment(&mut app, 2.0);
        let _not_agent = spawn_test_segment(&mut app, 0.0);

        app.update();

        let events = app.world().resource::<Events<SegmentCostsUpdated>>();
        let mut cursor = events.get_cursor();
        let mut written: Vec<SegmentCostsUpdated> = cursor.read(events).copied().collect();
        written.sort_by(|a, b| a.size_class.total_cmp(&b.size_class));

        assert_eq!(
            written,
            vec![
                SegmentCostsUpdated { segment: small, size_class: 1.0 },
                SegmentCostsUpdated { segment: large, size_class: 2.0 },
            ]
        );
    }
}
