use chunksim::{grid::Chunk, prelude::*};
use glam::Vec3;

fn quiet(dim: Vec3) -> Config {
    Config {
        dim,
        gravity: Vec3::ZERO,
        speed: 1.0,
        subsampling: 1,
        target_chunk_count: 64,
        repulsion_enabled: false,
        collision_enabled: false,
        pressure_enabled: false,
        ..Config::default()
    }
}

#[test]
fn overlapping_pair_separates() {
    let config = Config {
        repulsion: 1.0,
        radius: 0.6,
        repulsion_enabled: true,
        ..quiet(Vec3::splat(10.0))
    };
    let particles = vec![
        Particle::new(Vec3::new(4.5, 5.0, 5.0), 0.6),
        Particle::new(Vec3::new(5.5, 5.0, 5.0), 0.6),
    ];
    let mut domain = Domain::with_particles(config, particles).unwrap();
    domain.step().unwrap();

    let [a, b] = [domain.particles()[0], domain.particles()[1]];
    assert!(a.velocity.x < 0.0, "{a:?}");
    assert!(b.velocity.x > 0.0, "{b:?}");
    assert!((a.velocity.length() - 0.2).abs() < 1e-5);
    assert!((b.velocity.length() - 0.2).abs() < 1e-5);
    assert!(b.position.x - a.position.x > 1.0);
}

#[test]
fn resting_particle_falls() {
    let config = Config {
        gravity: Vec3::new(0.0, -0.01, 0.0),
        ..quiet(Vec3::splat(10.0))
    };
    let centre = Vec3::splat(5.0);
    let mut domain = Domain::with_particles(config, vec![Particle::new(centre, 0.5)]).unwrap();
    domain.tick().unwrap();

    let p = domain.particles()[0];
    assert!((p.velocity.y + 0.01).abs() < 1e-7);
    assert!((p.position - Vec3::new(5.0, 4.99, 5.0)).length() < 1e-6);
}

#[test]
fn particle_leaving_through_the_floor_bounces() {
    let radius = 0.5;
    let config = Config {
        friction: 0.5,
        ..quiet(Vec3::splat(10.0))
    };
    let particle = Particle::new(Vec3::new(radius - 1e-3, 5.0, 5.0), radius)
        .with_velocity(Vec3::new(-0.2, 0.0, 0.0));
    let mut domain = Domain::with_particles(config, vec![particle]).unwrap();
    domain.step().unwrap();

    let p = domain.particles()[0];
    assert!((p.velocity.x - 0.1).abs() < 1e-6);
    // Clamped against the wall, then moved by the reflected velocity.
    assert!((p.position.x - (radius + 0.1)).abs() < 1e-6);
}

#[test]
fn rebuild_twice_gives_the_same_chunks() {
    let config = Config {
        seed: Some(99),
        num_particles: 3_000,
        ..quiet(Vec3::new(12.0, 6.0, 6.0))
    };
    let domain = Domain::new(config.clone()).unwrap();

    let mut grid = SpatialGrid::from_config(&config).unwrap();
    grid.rebuild(domain.particles()).unwrap();
    let first: Vec<Chunk> = grid.chunks().to_vec();
    grid.rebuild(domain.particles()).unwrap();

    assert_eq!(grid.chunks(), first.as_slice());
    assert_eq!(grid.chunks().iter().map(Chunk::len).sum::<usize>(), 3_000);
}

#[test]
fn particles_stay_inside_the_box() {
    let config = Config {
        dim: Vec3::new(12.0, 8.0, 6.0),
        num_particles: 600,
        target_chunk_count: 72,
        speed: 0.5,
        subsampling: 2,
        gravity: Vec3::new(0.0, -0.2, 0.0),
        seed: Some(4),
        ..Config::default()
    };
    let mut domain = Domain::new(config).unwrap();

    for _ in 0..60 {
        domain.tick().unwrap();
        let dim = domain.config().dim;
        for p in domain.particles() {
            assert!(p.position.is_finite() && p.velocity.is_finite(), "{p:?}");
            assert!(p.position.cmpge(Vec3::ZERO).all(), "{p:?}");
            assert!(p.position.cmplt(dim).all(), "{p:?}");
        }
    }

    assert_eq!(domain.particles().len(), 600);
    assert_eq!(domain.frame(), 60);
}

#[test]
fn pair_forces_conserve_momentum_away_from_walls() {
    let config = Config {
        repulsion: 0.05,
        repulsion_enabled: true,
        collision_enabled: true,
        pressure_enabled: true,
        target_chunk_count: 1_000,
        ..quiet(Vec3::splat(40.0))
    };

    // A lattice with spacing 0.8 around the centre, so neighbours overlap.
    let particles: Vec<Particle> = (0..216)
        .map(|i| {
            let offset = Vec3::new((i / 36) as f32, (i / 6 % 6) as f32, (i % 6) as f32) * 0.8;
            let jitter = Vec3::new(0.01 * (i % 7) as f32, 0.0, 0.02 * (i % 3) as f32);
            Particle::new(Vec3::splat(18.0) + offset + jitter, 0.5)
                .with_velocity(Vec3::new(0.001 * (i % 5) as f32, 0.0, -0.001 * (i % 4) as f32))
        })
        .collect();
    let before: Vec3 = particles.iter().map(|p| p.velocity).sum();

    let mut domain = Domain::with_particles(config, particles).unwrap();
    domain.step().unwrap();
    let after: Vec3 = domain.particles().iter().map(|p| p.velocity).sum();

    assert!((after - before).length() < 1e-3, "{before} -> {after}");
    assert!(domain.particles().iter().any(|p| p.pressure > 0.0));
}

#[test]
fn faces_connectivity_runs() {
    let config = Config {
        dim: Vec3::splat(8.0),
        num_particles: 400,
        target_chunk_count: 64,
        connectivity: Connectivity::Faces,
        seed: Some(2),
        ..Config::default()
    };
    let mut domain = Domain::new(config).unwrap();
    for _ in 0..5 {
        domain.tick().unwrap();
    }
    assert_eq!(domain.grid().layout().connectivity(), Connectivity::Faces);
}
