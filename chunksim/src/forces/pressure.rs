use super::{separation, SmoothingKernel};
use crate::{
    config::Sph,
    particle::{Particle, Position},
    Between, Interaction,
};
use glam::Vec3;

/// SPH density contribution of one particle to another, and the equation of state turning the
/// summed density into a pressure.
///
/// Coincident particles contribute nothing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Density {
    /// Smoothing kernel weighting the contributions.
    pub kernel: SmoothingKernel,
    /// Mass of every particle.
    pub mass: f32,
    /// Scales the density excess into a pressure.
    pub stiffness: f32,
    /// Density at which the pressure is zero.
    pub reference_density: f32,
}

impl Density {
    /// Creates a new [`Density`] interaction from the SPH parameters.
    #[inline]
    pub const fn new(sph: &Sph) -> Self {
        Self {
            kernel: SmoothingKernel::new(sph.smoothing_length),
            mass: sph.particle_mass,
            stiffness: sph.stiffness,
            reference_density: sph.reference_density,
        }
    }

    /// Contribution of a particle to its own density, `mass * W(0)`.
    #[inline]
    pub fn own(&self) -> f32 {
        self.mass * SmoothingKernel::at_ratio(0.0)
    }

    /// Returns the pressure of a particle with the given density.
    #[inline]
    pub fn pressure(&self, density: f32) -> f32 {
        self.stiffness * (density - self.reference_density)
    }
}

impl<P> Interaction<Between<&P, &P>> for Density
where
    P: Position<Vector = Vec3>,
{
    type Output = f32;

    #[inline]
    fn compute(&mut self, Between(affected, affecting): Between<&P, &P>) -> f32 {
        match separation(affected.position(), affecting.position()) {
            Some((_, distance)) => self.mass * self.kernel.value(distance),
            None => 0.0,
        }
    }
}

/// Pressure force exerted on a particle by a neighbour closer than the smoothing length.
///
/// For positive pressures the force pushes the particles apart. It is added to the velocity as
/// is, without a timestep factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PressureForce {
    /// Smoothing kernel weighting the force.
    pub kernel: SmoothingKernel,
}

impl PressureForce {
    /// Creates a new [`PressureForce`] interaction from the SPH parameters.
    #[inline]
    pub const fn new(sph: &Sph) -> Self {
        Self {
            kernel: SmoothingKernel::new(sph.smoothing_length),
        }
    }
}

impl Interaction<Between<&Particle, &Particle>> for PressureForce {
    type Output = Vec3;

    #[inline]
    fn compute(&mut self, Between(affected, affecting): Between<&Particle, &Particle>) -> Vec3 {
        let Some((normal, distance)) = separation(affected.position, affecting.position) else {
            return Vec3::ZERO;
        };

        let q = self.kernel.ratio(distance);
        if q >= 1.0 {
            return Vec3::ZERO;
        }

        // `normal` points away from the neighbour, the kernel direction toward it.
        let pressure = 0.5 * (affected.pressure + affecting.pressure) * (1.0 - q);
        normal * (pressure * SmoothingKernel::at_ratio(q))
    }
}
