use chunksim::{prelude::*, snapshot};
use glam::Vec3;
use std::time::{Duration, Instant};

fn config() -> Config {
    Config::default()
        .with_dim(Vec3::new(16.0, 8.0, 8.0))
        .with_particles(500, 0.5)
        .with_timing(0.05, 2, 200)
        .with_seed(23)
}

#[test]
fn consumer_follows_running_simulation() {
    let handle = Simulation::spawn(Config {
        target_chunk_count: 128,
        ..config()
    })
    .unwrap();
    let reader = handle.reader().clone();

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut frames = Vec::new();
    while frames.len() < 5 && Instant::now() < deadline {
        let newer = match frames.last() {
            Some(&frame) => reader.try_newer_than(frame),
            None => reader.try_latest(),
        };
        if let Some(snapshot) = newer {
            assert_eq!(snapshot.len(), 500);
            assert_eq!(snapshot.dim, Vec3::new(16.0, 8.0, 8.0));
            frames.push(snapshot.frame);
        }
        std::thread::sleep(Duration::from_millis(1));
    }

    handle.stop().unwrap();
    assert_eq!(frames.len(), 5);
    assert!(frames.windows(2).all(|w| w[0] < w[1]), "{frames:?}");
}

#[test]
fn snapshot_is_a_copy_of_the_domain() {
    let mut domain = Domain::new(Config {
        target_chunk_count: 128,
        ..config()
    })
    .unwrap();
    domain.tick().unwrap();

    let (mut publisher, reader) = snapshot::channel();
    publisher.publish(&domain);
    let snapshot = reader.try_latest().unwrap();

    for (view, particle) in snapshot.particles.iter().zip(domain.particles()) {
        assert_eq!(view.position, particle.position.to_array());
        assert_eq!(view.velocity, particle.velocity.to_array());
        assert_eq!(view.color, particle.color);
    }

    domain.tick().unwrap();
    assert_eq!(snapshot.frame, 1);
    assert!(snapshot
        .particles
        .iter()
        .zip(domain.particles())
        .any(|(view, particle)| view.position != particle.position.to_array()));
}

#[cfg(feature = "bytemuck")]
#[test]
fn particle_views_cast_to_bytes() {
    let domain = Domain::new(Config {
        target_chunk_count: 128,
        ..config()
    })
    .unwrap();
    let snapshot = Snapshot::capture(&domain);

    let bytes: &[u8] = bytemuck::cast_slice(&snapshot.particles);
    assert_eq!(bytes.len(), 32 * 500);
}
