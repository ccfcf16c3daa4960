use crate::{
    error::{Error, Result},
    grid::Connectivity,
};
use glam::Vec3;
use std::time::Duration;

/// Parameters of the SPH density and pressure computation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Sph {
    /// Support radius `h` of the smoothing kernel. The kernel vanishes at `2h`.
    pub smoothing_length: f32,
    /// Scales the density excess into a pressure.
    pub stiffness: f32,
    /// Density at which the pressure is zero.
    pub reference_density: f32,
    /// Mass of every particle, used to weight kernel contributions.
    pub particle_mass: f32,
}

impl Default for Sph {
    #[inline]
    fn default() -> Self {
        Self {
            smoothing_length: 1.0,
            stiffness: 1e-3,
            reference_density: 1.0,
            particle_mass: 1.0,
        }
    }
}

/// Immutable parameter set of one simulation run.
///
/// [`Config::default`] is the fixture of the visual demo: a `75 x 25 x 15` box with 20 000
/// particles of radius `0.5`.
///
/// # Example
///
/// ```
/// use chunksim::prelude::*;
/// use glam::Vec3;
///
/// let config = Config {
///     dim: Vec3::new(20.0, 20.0, 20.0),
///     num_particles: 500,
///     ..Config::default()
/// };
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.timestep_factor(), config.speed);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Extents of the box. Particles live in `[0, dim)`.
    pub dim: Vec3,
    /// Velocity retained on a boundary bounce and scale of collision impulses, in `[0, 1]`.
    pub friction: f32,
    /// Gravitational acceleration.
    pub gravity: Vec3,
    /// Repulsion coefficient applied to overlapping particles.
    pub repulsion: f32,
    /// Global timestep scale.
    pub speed: f32,
    /// Physics sub-steps per published frame.
    pub subsampling: u32,
    /// Target publish rate in frames per second.
    pub fps: u32,
    /// Number of simulated particles.
    pub num_particles: usize,
    /// Uniform particle radius.
    pub radius: f32,
    /// Desired number of grid chunks, used to derive the chunk size.
    pub target_chunk_count: usize,
    /// Neighbourhood used when looking up adjacent chunks.
    pub connectivity: Connectivity,
    /// Enables overlap repulsion.
    pub repulsion_enabled: bool,
    /// Enables collision impulses between approaching particles.
    pub collision_enabled: bool,
    /// Enables the SPH density and pressure passes.
    pub pressure_enabled: bool,
    /// SPH parameters, used when `pressure_enabled` is set.
    pub sph: Sph,
    /// Seed of the spawn generator. `None` draws one from the operating system.
    pub seed: Option<u64>,
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Self {
            dim: Vec3::new(75.0, 25.0, 15.0),
            friction: 0.5,
            gravity: Vec3::new(0.0, -0.01, 0.0),
            repulsion: 0.025,
            speed: 0.01,
            subsampling: 1,
            fps: 60,
            num_particles: 20_000,
            radius: 0.5,
            target_chunk_count: 4usize.pow(9),
            connectivity: Connectivity::Full,
            repulsion_enabled: true,
            collision_enabled: true,
            pressure_enabled: true,
            sph: Sph::default(),
            seed: None,
        }
    }
}

impl Config {
    /// Returns this configuration with the given box extents.
    #[inline]
    pub fn with_dim(mut self, dim: Vec3) -> Self {
        self.dim = dim;
        self
    }

    /// Returns this configuration with the given particle count and radius.
    #[inline]
    pub fn with_particles(mut self, num_particles: usize, radius: f32) -> Self {
        self.num_particles = num_particles;
        self.radius = radius;
        self
    }

    /// Returns this configuration with the given timing parameters.
    #[inline]
    pub fn with_timing(mut self, speed: f32, subsampling: u32, fps: u32) -> Self {
        self.speed = speed;
        self.subsampling = subsampling;
        self.fps = fps;
        self
    }

    /// Returns this configuration with a fixed spawn seed.
    #[inline]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks every field against its valid range.
    pub fn validate(&self) -> Result<()> {
        let dim = self.dim.to_array();
        if !dim.iter().all(|d| d.is_finite() && *d > 0.0) {
            return Err(Error::invalid("dim", "components must be finite and > 0"));
        }
        if !(0.0..=1.0).contains(&self.friction) {
            return Err(Error::invalid("friction", "must lie in [0, 1]"));
        }
        if !self.gravity.is_finite() {
            return Err(Error::invalid("gravity", "must be finite"));
        }
        if !self.repulsion.is_finite() || self.repulsion < 0.0 {
            return Err(Error::invalid("repulsion", "must be finite and >= 0"));
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(Error::invalid("speed", "must be finite and > 0"));
        }
        if self.subsampling == 0 {
            return Err(Error::invalid("subsampling", "must be >= 1"));
        }
        if self.fps == 0 {
            return Err(Error::invalid("fps", "must be > 0"));
        }
        if self.num_particles == 0 {
            return Err(Error::invalid("num_particles", "must be >= 1"));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(Error::invalid("radius", "must be finite and > 0"));
        }
        if dim.iter().any(|d| *d < 2.0 * self.radius) {
            return Err(Error::invalid(
                "radius",
                format!("a particle of radius {} does not fit in {dim:?}", self.radius),
            ));
        }
        if self.target_chunk_count == 0 {
            return Err(Error::invalid("target_chunk_count", "must be >= 1"));
        }

        let sph = &self.sph;
        if !sph.smoothing_length.is_finite() || sph.smoothing_length <= 0.0 {
            return Err(Error::invalid("sph.smoothing_length", "must be finite and > 0"));
        }
        if !sph.particle_mass.is_finite() || sph.particle_mass <= 0.0 {
            return Err(Error::invalid("sph.particle_mass", "must be finite and > 0"));
        }
        if !sph.stiffness.is_finite() || !sph.reference_density.is_finite() {
            return Err(Error::invalid("sph", "stiffness and reference density must be finite"));
        }

        Ok(())
    }

    /// Scale applied to accelerations in one sub-step: `speed / subsampling`.
    #[inline]
    pub fn timestep_factor(&self) -> f32 {
        self.speed / self.subsampling as f32
    }

    /// Wall-clock budget of one published frame.
    #[inline]
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps))
    }

    /// Volume of the box.
    #[inline]
    pub fn volume(&self) -> f32 {
        self.dim.x * self.dim.y * self.dim.z
    }

    /// Largest distance at which two particles interact in the enabled passes.
    #[inline]
    pub fn interaction_radius(&self) -> f32 {
        let contact = 2.0 * self.radius;
        if self.pressure_enabled {
            contact.max(2.0 * self.sph.smoothing_length)
        } else {
            contact
        }
    }
}
