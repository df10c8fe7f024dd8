//! Headless demo cost grid
//!
//! 3x3 сегмента, три size class (0 — не агент), случайные препятствия из seed.
//! Печатает статистику по кадрам, потом двигает одно препятствие.

use bevy::prelude::*;
use bevy_rapier3d::prelude::Collider;
use rand::Rng;
use flowfield_cost::{
    create_headless_app, segment_top_left, spawn_nav_obstacle, spawn_segment_variants, CellCostBuffer,
    CostGridPlugin, CostGridStats, DeterministicRng, SegmentDimension, UnitSize,
};

const GRID_SEGMENTS: i32 = 3;
const OBSTACLE_COUNT: usize = 12;
const UNIT_SIZES: [f32; 3] = [0.0, 1.0, 2.0];

fn main() {
    let seed = 42;
    println!("Starting cost grid headless demo (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins(CostGridPlugin)
        .insert_resource(SegmentDimension(8));

    let dimension = SegmentDimension(8);
    let world_extent = GRID_SEGMENTS as f32 * dimension.world_extent();

    {
        let world = app.world_mut();
        let mut commands = world.commands();

        for x in 0..GRID_SEGMENTS {
            for y in 0..GRID_SEGMENTS {
                let coord = IVec2::new(x, y);
                spawn_segment_variants(&mut commands, coord, segment_top_left(coord, dimension), &UNIT_SIZES);
            }
        }
    }

    let positions: Vec<Vec3> = {
        let mut rng = app.world_mut().resource_mut::<DeterministicRng>();
        (0..OBSTACLE_COUNT)
            .map(|_| {
                Vec3::new(
                    rng.rng.gen_range(0.0..world_extent),
                    0.0,
                    -rng.rng.gen_range(0.0..world_extent),
                )
            })
            .collect()
    };

    let mut obstacles = Vec::new();
    {
        let world = app.world_mut();
        let mut commands = world.commands();
        for position in positions {
            obstacles.push(spawn_nav_obstacle(&mut commands, Collider::cuboid(0.5, 1.0, 0.5), position));
        }
    }
    app.world_mut().flush();

    for tick in 0..3 {
        app.update();
        print_stats(&mut app, tick);
    }

    // Двигаем первое препятствие → соседние сегменты снова dirty
    if let Some(&moved) = obstacles.first() {
        let target = Vec3::new(world_extent / 2.0, 0.0, -world_extent / 2.0);
        if let Some(mut transform) = app.world_mut().get_mut::<Transform>(moved) {
            transform.translation = target;
        }
    }

    for tick in 3..6 {
        app.update();
        print_stats(&mut app, tick);
    }

    println!("Demo complete!");
}

fn print_stats(app: &mut App, tick: usize) {
    let stats = *app.world().resource::<CostGridStats>();

    let world = app.world_mut();
    let mut query = world.query::<(&UnitSize, &CellCostBuffer)>();
    let blocked: usize = query
        .iter(world)
        .filter(|(size, _)| size.0 > 0.0)
        .map(|(_, buffer)| buffer.blocked_count())
        .sum();

    println!(
        "Tick {}: batches {}, segments recomputed {}, marked dirty {}, blocked cells {}",
        tick, stats.batches_dispatched, stats.segments_recomputed, stats.segments_marked_dirty, blocked
    );
}
