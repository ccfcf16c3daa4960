use crate::{
    config::Config,
    error::Result,
    forces::{Boundary, Collision, Contact, Density, Gravity, PressureForce, Repulsion},
    grid::SpatialGrid,
    integrator,
    particle::Particle,
    sequential::SequentialCompute,
    Between, Interaction,
};
use glam::Vec3;
use std::ops::{Add, AddAssign};

/// Counters gathered while running sub-steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Particles found outside the box before the grid rebuild and clamped back.
    pub escaped: usize,
    /// Particles bounced off a wall by the boundary containment.
    pub bounced: usize,
    /// Particles clamped back into the box after integration.
    pub clamped: usize,
}

impl AddAssign for StepReport {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.escaped += rhs.escaped;
        self.bounced += rhs.bounced;
        self.clamped += rhs.clamped;
    }
}

/// The per sub-step sequence of passes: confine, rebuild, density, pair forces, gravity and
/// boundary, integration, confine.
#[derive(Clone, Debug)]
pub struct ForcePipeline {
    sph: Option<(Density, PressureForce)>,
    contact: Contact,
    gravity: Gravity,
    boundary: Boundary,
}

impl ForcePipeline {
    /// Creates a new [`ForcePipeline`] running the passes enabled in the configuration.
    pub fn new(config: &Config) -> Self {
        let sph = config
            .pressure_enabled
            .then(|| (Density::new(&config.sph), PressureForce::new(&config.sph)));

        let contact = Contact {
            repulsion: config.repulsion_enabled.then_some(Repulsion {
                coefficient: config.repulsion,
            }),
            collision: config.collision_enabled.then_some(Collision {
                friction: config.friction,
            }),
        };

        Self {
            sph,
            contact,
            gravity: Gravity {
                acceleration: config.gravity,
                factor: config.timestep_factor(),
            },
            boundary: Boundary::new(config.dim, config.friction),
        }
    }

    /// Returns the boundary containment used by the pipeline.
    #[inline]
    pub const fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// Advances the particles by one sub-step.
    ///
    /// Fails only if the grid cannot be rebuilt, in which case the particles may have been
    /// confined but are otherwise unchanged.
    pub fn step(&mut self, particles: &mut [Particle], grid: &mut SpatialGrid) -> Result<StepReport> {
        let escaped = integrator::confine(particles, &self.boundary);
        if escaped > 0 {
            log::warn!("{escaped} particles found outside the box before rebuild, clamped back");
        }

        grid.rebuild(particles)?;

        if let Some((density, _)) = self.sph {
            density_pass(density, particles, grid);
        }
        self.pair_pass(particles, grid);
        let bounced = self.global_pass(particles);

        integrator::integrate(particles);

        let clamped = integrator::confine(particles, &self.boundary);
        if clamped > 0 {
            log::warn!("{clamped} particles left the box during integration, clamped back");
        }

        Ok(StepReport {
            escaped,
            bounced,
            clamped,
        })
    }

    fn pair_pass(&mut self, particles: &mut [Particle], grid: &SpatialGrid) {
        if !self.contact.is_noop() {
            let deltas = Between(&*particles, grid).grid_pairs(self.contact);
            for (particle, delta) in particles.iter_mut().zip(deltas) {
                particle.velocity += delta;
            }
        }

        if let Some((_, pressure)) = self.sph {
            let forces: Vec<Vec3> = neighbour_sums(pressure, particles, grid);
            for (particle, force) in particles.iter_mut().zip(forces) {
                particle.velocity += force;
            }
        }
    }

    fn global_pass(&self, particles: &mut [Particle]) -> usize {
        let mut bounced = 0;
        for particle in particles {
            self.gravity.apply(particle);
            bounced += usize::from(self.boundary.reflect(particle));
        }
        bounced
    }
}

fn density_pass(density: Density, particles: &mut [Particle], grid: &SpatialGrid) {
    let sums: Vec<f32> = neighbour_sums(density, particles, grid);
    for (particle, sum) in particles.iter_mut().zip(sums) {
        particle.density = density.own() + sum;
        particle.pressure = density.pressure(particle.density);
    }
}

#[cfg(not(feature = "parallel"))]
fn neighbour_sums<T, U>(interaction: T, particles: &[Particle], grid: &SpatialGrid) -> Vec<U>
where
    U: Add<Output = U> + Default + Send,
    T: for<'a> Interaction<Between<&'a Particle, &'a Particle>, Output = U> + Clone + Send + Sync,
{
    Between(particles, grid).grid_sum(interaction).collect()
}

#[cfg(feature = "parallel")]
fn neighbour_sums<T, U>(interaction: T, particles: &[Particle], grid: &SpatialGrid) -> Vec<U>
where
    U: Add<Output = U> + Default + Send,
    T: for<'a> Interaction<Between<&'a Particle, &'a Particle>, Output = U> + Clone + Send + Sync,
{
    use crate::parallel::ParallelCompute;

    Between(particles, grid).par_grid_sum(interaction)
}
