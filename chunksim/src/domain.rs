use crate::{
    config::Config,
    error::Result,
    grid::SpatialGrid,
    particle::Particle,
    pipeline::{ForcePipeline, StepReport},
    store::ParticleStore,
};

/// One simulation instance: the configuration, the particles, the grid binning them and the force
/// pipeline advancing them.
///
/// # Example
///
/// ```
/// use chunksim::prelude::*;
/// use glam::Vec3;
///
/// let config = Config {
///     dim: Vec3::new(10.0, 10.0, 10.0),
///     num_particles: 200,
///     target_chunk_count: 64,
///     seed: Some(3),
///     ..Config::default()
/// };
///
/// let mut domain = Domain::new(config)?;
/// domain.tick()?;
///
/// assert_eq!(domain.frame(), 1);
/// assert!(domain.particles().iter().all(|p| p.position.cmplt(domain.config().dim).all()));
/// # Ok::<(), chunksim::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Domain {
    config: Config,
    store: ParticleStore,
    grid: SpatialGrid,
    pipeline: ForcePipeline,
    frame: u64,
}

impl Domain {
    /// Validates the configuration and spawns `config.num_particles` random particles.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let store = ParticleStore::spawn(&config)?;
        Self::with_store(config, store)
    }

    /// Validates the configuration and uses the given particles instead of spawning them.
    ///
    /// `config.num_particles` is replaced by the number of particles.
    pub fn with_particles(mut config: Config, particles: Vec<Particle>) -> Result<Self> {
        config.num_particles = particles.len();
        config.validate()?;
        Self::with_store(config, ParticleStore::new(particles))
    }

    fn with_store(config: Config, store: ParticleStore) -> Result<Self> {
        let grid = SpatialGrid::from_config(&config)?;
        let pipeline = ForcePipeline::new(&config);

        Ok(Self {
            config,
            store,
            grid,
            pipeline,
            frame: 0,
        })
    }

    /// Runs a single sub-step.
    #[inline]
    pub fn step(&mut self) -> Result<StepReport> {
        self.pipeline
            .step(self.store.particles_mut(), &mut self.grid)
    }

    /// Runs `config.subsampling` sub-steps and advances the frame counter.
    pub fn tick(&mut self) -> Result<StepReport> {
        let mut report = StepReport::default();
        for _ in 0..self.config.subsampling {
            report += self.step()?;
        }

        self.frame += 1;
        log::trace!("frame {} done: {report:?}", self.frame);

        Ok(report)
    }

    /// Returns the configuration of the run.
    #[inline]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the particles.
    #[inline]
    pub fn particles(&self) -> &[Particle] {
        self.store.particles()
    }

    /// Returns the particle store.
    #[inline]
    pub const fn store(&self) -> &ParticleStore {
        &self.store
    }

    /// Returns the grid as binned by the last sub-step.
    #[inline]
    pub const fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Returns the number of completed ticks.
    #[inline]
    pub const fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use glam::Vec3;

    #[test]
    fn gravity_on_resting_particle() {
        let config = Config {
            dim: Vec3::splat(10.0),
            gravity: Vec3::new(0.0, -0.01, 0.0),
            speed: 1.0,
            subsampling: 1,
            target_chunk_count: 27,
            ..Config::default()
        };
        let centre = Vec3::splat(5.0);
        let mut domain = Domain::with_particles(config, vec![Particle::new(centre, 0.5)]).unwrap();
        domain.tick().unwrap();

        let p = domain.particles()[0];
        assert!((p.velocity.y + 0.01).abs() < 1e-7);
        assert_eq!(p.velocity.x, 0.0);
        assert!((p.position.y - (centre.y - 0.01)).abs() < 1e-6);
        assert_eq!(domain.frame(), 1);
    }

    #[test]
    fn subsampling_divides_gravity() {
        let config = Config {
            dim: Vec3::splat(10.0),
            gravity: Vec3::new(0.0, -0.01, 0.0),
            speed: 1.0,
            subsampling: 4,
            target_chunk_count: 27,
            ..Config::default()
        };
        let mut domain =
            Domain::with_particles(config, vec![Particle::new(Vec3::splat(5.0), 0.5)]).unwrap();
        let report = domain.tick().unwrap();

        assert_eq!(report, StepReport::default());
        assert!((domain.particles()[0].velocity.y + 0.01).abs() < 1e-7);
    }

    #[test]
    fn resting_particle_on_floor_stays_inside() {
        let config = Config {
            dim: Vec3::splat(4.0),
            gravity: Vec3::new(0.0, -0.5, 0.0),
            speed: 1.0,
            target_chunk_count: 8,
            ..Config::default()
        };
        let mut domain =
            Domain::with_particles(config, vec![Particle::new(Vec3::new(2.0, 0.5, 2.0), 0.5)])
                .unwrap();

        for _ in 0..20 {
            domain.tick().unwrap();
            let p = domain.particles()[0];
            assert!(p.position.y >= 0.5 - 1e-6, "sank to {}", p.position.y);
            assert!(p.position.y < 4.0);
        }
    }

    #[test]
    fn empty_particle_list_is_rejected() {
        match Domain::with_particles(Config::default(), Vec::new()) {
            Err(Error::InvalidConfig { field, .. }) => assert_eq!(field, "num_particles"),
            other => panic!("expected invalid config, got {other:?}"),
        }
    }
}
