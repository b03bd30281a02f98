use std::time::Duration;

use anyhow::{Context, Result};
use gamelib::{
    Actor, CommandBuffer, Controls, FoodBehavior, InputMap, InputState, KeyCode, PlayerBehavior,
    PlayerInput, Simulation, SimplePhysics, SimulationConfig, SpriteGraphics, TileMap,
};

const LEVEL: &[&str] = &[
    "################",
    "#..............#",
    "#..............#",
    "#.......###....#",
    "#..............#",
    "#..............#",
    "#...####.......#",
    "#..............#",
    "#..............#",
    "################",
];

const FRAMES: u32 = 600;

fn load_config() -> Result<SimulationConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(SimulationConfig::default());
    };
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config from {path}"))?;
    let config = SimulationConfig::from_json_str(&json)
        .with_context(|| format!("parsing config from {path}"))?;
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();

    let config = load_config()?;
    let mut sim = Simulation::new(config, TileMap::from_rows(LEVEL)?)?;

    let player = sim.spawn_dynamic(
        Actor::new("player")
            .at(2.5, 8.5)
            .with_size(0.9, 0.9)
            .with_sprite(0, 1)
            .with_max_speed(20.0)
            .with_input(PlayerInput::default())
            .with_behavior(PlayerBehavior::default())
            .with_physics(SimplePhysics::default())
            .with_graphics(SpriteGraphics),
    )?;

    for (i, x) in [5.5_f32, 9.5, 13.5].into_iter().enumerate() {
        sim.spawn_trigger(
            Actor::new(format!("food{i}"))
                .at(x, 8.5)
                .with_sprite(0, 10 + i as u32)
                .with_behavior(FoodBehavior::new())
                .with_graphics(SpriteGraphics),
        )?;
    }

    let map = InputMap::with_default_bindings();
    let mut keys = InputState::new();
    keys.press_key(KeyCode::ArrowRight);

    let mut buf = CommandBuffer::new(sim.pixel_transform());
    let frame_time = Duration::from_secs_f64(1.0 / 60.0);
    for frame in 0..FRAMES {
        buf.drain();
        let ticks = sim.frame(frame_time, &Controls::new(&keys, &map), &mut buf);
        keys.begin_frame();

        let health = sim
            .actor(player)
            .and_then(|a| a.behavior())
            .and_then(|b| b.health())
            .unwrap_or(0.0);
        if health <= 0.0 {
            log::info!("player starved at t={:.2}s", sim.time());
            break;
        }
        if frame % 60 == 0 {
            log::info!(
                "t={:.2}s ticks={} health={:.1} sprites={}",
                sim.time(),
                ticks,
                health,
                buf.sprite_count()
            );
        }
    }

    sim.teardown();
    Ok(())
}
