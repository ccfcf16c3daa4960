use crate::{
    config::Config,
    error::{Error, Result},
    particle::Particle,
};
use glam::Vec3;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Contiguous, exclusively owned storage of the simulated particles.
///
/// Grid chunks refer to particles by their index in this store.
#[derive(Clone, Debug, Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
}

impl ParticleStore {
    /// Creates a new [`ParticleStore`] holding the given particles.
    #[inline]
    pub fn new(particles: Vec<Particle>) -> Self {
        Self { particles }
    }

    /// Spawns `config.num_particles` particles at uniformly random positions with a small random
    /// initial velocity and a random display color.
    ///
    /// Uses `config.seed` when set, operating system entropy otherwise.
    pub fn spawn(config: &Config) -> Result<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::spawn_with(config, &mut rng)
    }

    /// Same as [`ParticleStore::spawn`] with a caller-provided generator.
    pub fn spawn_with<R: Rng>(config: &Config, rng: &mut R) -> Result<Self> {
        let count = config.num_particles;
        let mut particles = Vec::new();
        particles
            .try_reserve_exact(count)
            .map_err(|_| Error::Allocation {
                what: "particle store",
                requested: count,
            })?;

        let radius = config.radius;
        let max_velocity = 0.1 * config.timestep_factor();
        let (lo, hi) = (Vec3::splat(radius), config.dim - radius);

        particles.extend((0..count).map(|_| {
            let position = Vec3::new(
                rng.gen_range(lo.x..=hi.x),
                rng.gen_range(lo.y..=hi.y),
                rng.gen_range(lo.z..=hi.z),
            );
            let velocity = Vec3::new(
                rng.gen_range(0.0..max_velocity),
                rng.gen_range(0.0..max_velocity),
                rng.gen_range(0.0..max_velocity),
            );
            let color = [0; 3].map(|_| rng.gen_range(0..255));

            Particle::new(position, radius)
                .with_velocity(velocity)
                .with_color(color)
        }));

        log::debug!("spawned {count} particles in a {} box", config.dim);

        Ok(Self { particles })
    }

    /// Returns the number of stored particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Returns `true` if the store holds no particles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Returns a reference to the particles.
    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Returns a mutable reference to the particles.
    #[inline]
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Returns an iterator over the particle positions.
    #[inline]
    pub fn positions(&self) -> impl ExactSizeIterator<Item = Vec3> + '_ {
        self.particles.iter().map(|p| p.position)
    }
}

impl From<Vec<Particle>> for ParticleStore {
    #[inline]
    fn from(particles: Vec<Particle>) -> Self {
        Self::new(particles)
    }
}
