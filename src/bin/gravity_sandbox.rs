//! Gravity Sandbox
//!
//! Run with: `cargo run --bin gravity-sandbox -- [scene.json] [ticks]`
//!
//! Headless demo: loads a scene (or the built-in test course), drives the
//! character with a scripted intent and logs every support transition,
//! zone event and a summary at the end.
//!
//! Script (seconds of simulated time):
//! - 0-2: walk forward
//! - 2: jump
//! - 2-4: walk right
//! - 4-6: walk back while holding climb
//! - after 6: stand still

use std::error::Error;
use std::path::PathBuf;

use gravity_locomotion_engine::{PlayerIntent, Sandbox, SceneConfig, Support, logging};

const DEFAULT_TICKS: u32 = 500;

fn scripted_intent(time: f32, previous: f32) -> PlayerIntent {
    let intent = PlayerIntent::new();
    match time {
        t if t < 2.0 => intent.with_axes(0.0, 1.0),
        t if t < 4.0 => {
            let intent = intent.with_axes(1.0, 0.0);
            if previous < 2.0 { intent.with_jump() } else { intent }
        }
        t if t < 6.0 => intent.with_axes(0.0, -1.0).with_climb(true),
        _ => intent,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let config = match args.next().map(PathBuf::from) {
        Some(path) => SceneConfig::load(&path)?,
        None => {
            tracing::info!("no scene given, using the built-in test course");
            SceneConfig::default()
        }
    };
    let ticks = match args.next() {
        Some(value) => value.parse::<u32>()?,
        None => DEFAULT_TICKS,
    };

    let mut sandbox = Sandbox::from_config(&config);
    let dt = sandbox.fixed_step();
    let mut support = Support::default();
    let mut swimming = false;

    for tick in 0..ticks {
        let time = tick as f32 * dt;
        let intent = scripted_intent(time, time - dt);
        let report = sandbox.tick(&intent);

        if report.step.support != support || report.step.swimming != swimming {
            tracing::info!(
                time,
                from = support.name(),
                to = report.step.support.name(),
                swimming = report.step.swimming,
                position = ?report.position,
                "support changed"
            );
            support = report.step.support;
            swimming = report.step.swimming;
        }
        if let Some(speed) = report.step.jump_speed {
            tracing::info!(time, speed, "jump");
        }
        if report.launched {
            tracing::debug!(time, "acceleration zone");
        }
        for (zone, event) in &report.events {
            tracing::info!(time, zone, ?event, "detection zone");
        }
    }

    let controller = sandbox.controller();
    tracing::info!(
        ticks,
        position = ?sandbox.character().position,
        velocity = ?controller.velocity(),
        up = ?controller.up_axis(),
        support = controller.support().name(),
        "simulation finished"
    );
    for floater in sandbox.floaters() {
        tracing::info!(
            body = %floater.body,
            position = ?floater.state.position,
            submergence = ?floater.floating.submergence(),
            "floating body"
        );
    }
    Ok(())
}
