//! Headless consumer of the demo fixture.
//!
//! Runs the default 20 000 particle box on a background thread and polls its snapshots the way a
//! renderer would, logging the mean particle height of every new frame for a few seconds.
//!
//! Run with: RUST_LOG=info cargo run --example headless --release --features parallel

use chunksim::prelude::*;
use std::time::{Duration, Instant};

const RUN_FOR: Duration = Duration::from_secs(5);
const POLL_EVERY: Duration = Duration::from_millis(4);

fn main() -> chunksim::Result<()> {
    env_logger::init();

    let config = Config::default();
    log::info!(
        "box {}, {} particles of radius {}",
        config.dim,
        config.num_particles,
        config.radius
    );

    let handle = Simulation::spawn(config)?;
    let reader = handle.reader().clone();

    let start = Instant::now();
    let mut drawn = None;
    while start.elapsed() < RUN_FOR && handle.is_running() {
        let newer = match drawn {
            Some(frame) => reader.try_newer_than(frame),
            None => reader.try_latest(),
        };

        if let Some(snapshot) = newer {
            let mean_height = snapshot
                .particles
                .iter()
                .map(|p| p.position[1])
                .sum::<f32>()
                / snapshot.len().max(1) as f32;
            log::info!("frame {}: mean height {mean_height:.3}", snapshot.frame);
            drawn = Some(snapshot.frame);
        }

        std::thread::sleep(POLL_EVERY);
    }

    handle.stop()
}
