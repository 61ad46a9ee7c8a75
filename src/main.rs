//! Headless demo: a walled arena, a circling target and a horde of mobs

use std::time::Duration;

use env_logger::{Builder, Env};
use horde::core::FrameClock;
use horde::prelude::*;

const TICKS: u32 = 60 * 30;
const MOBS: usize = 40;

fn arena(config: &SimConfig) -> Vec<Rect> {
    let tile = config.tile_size;
    let world = config.world_size();

    vec![
        // Outer walls
        Rect::new(0.0, 0.0, world.x, tile),
        Rect::new(0.0, world.y - tile, world.x, tile),
        Rect::new(0.0, 0.0, tile, world.y),
        Rect::new(world.x - tile, 0.0, tile, world.y),
        // Inner cover
        Rect::new(tile * 8.0, tile * 6.0, tile * 4.0, tile),
        Rect::new(tile * 20.0, tile * 4.0, tile, tile * 6.0),
        Rect::new(tile * 12.0, tile * 15.0, tile * 6.0, tile * 2.0),
    ]
}

fn main() {
    let _ = Builder::from_env(Env::default().default_filter_or("info")).try_init();

    let config = match std::env::args().nth(1) {
        Some(path) => match SimConfig::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {path}");
                config
            }
            Err(e) => {
                log::error!("Failed to load {path}: {e}");
                std::process::exit(1);
            }
        },
        None => SimConfig::default(),
    };

    let mut sim = match Simulation::new(config.clone()) {
        Ok(sim) => sim,
        Err(e) => {
            log::error!("Invalid config: {e}");
            std::process::exit(1);
        }
    };
    sim.load_obstacles(arena(&config));

    let world = config.world_size();
    let center = world / 2.0;
    for i in 0..MOBS {
        let angle = i as f32 / MOBS as f32 * std::f32::consts::TAU;
        let radius = world.min_element() * 0.4;
        sim.spawn_mob(center + Vec2::from_angle(angle) * radius);
    }

    let clock = FrameClock::new(config.max_frame_delta);
    let frame = Duration::from_secs_f32(1.0 / 60.0);
    let mut attacks = 0u32;
    let mut paths = 0u32;
    let mut kills = 0u32;

    for tick in 0..TICKS {
        let t = tick as f32 / 60.0;
        let position = center + Vec2::from_angle(t * 0.3) * 300.0;
        let velocity = Vec2::from_angle(t * 0.3).perp() * 90.0;
        sim.set_target(position, velocity);
        sim.tick(clock.delta(frame));

        let mut hits = Vec::new();
        for event in sim.events_mut().drain() {
            match event {
                SimEvent::TargetAttacked { mob, .. } => {
                    attacks += 1;
                    hits.push(mob);
                }
                SimEvent::PathFound { .. } => paths += 1,
                SimEvent::MobKilled { .. } => kills += 1,
                SimEvent::LootDropped { position, loot } => {
                    log::info!("{loot:?} dropped at {position}");
                }
                _ => {}
            }
        }

        // The target shoots back at whatever touched it
        for mob in hits {
            sim.damage_mob(mob, 120.0, Vec2::ZERO);
        }
    }

    log::info!(
        "{TICKS} ticks: {} mobs left, {kills} killed, {attacks} attacks, {paths} paths",
        sim.mob_count()
    );
}
