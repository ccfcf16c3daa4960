//! Interactions and per-particle forces of the simulation.
//!
//! Pairwise models implement [`Interaction`](crate::Interaction) or
//! [`InteractionPair`](crate::sequential::InteractionPair) so they can be evaluated over the grid
//! by the algorithms of [`sequential`](crate::sequential) and, with the `parallel` feature,
//! `parallel`.

mod boundary;
mod contact;
mod kernel;
mod pressure;

pub use boundary::Boundary;
pub use contact::{Collision, Contact, Repulsion};
pub use kernel::SmoothingKernel;
pub use pressure::{Density, PressureForce};

use crate::particle::Particle;
use glam::Vec3;

/// Constant acceleration applied to every particle each sub-step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gravity {
    /// Acceleration vector.
    pub acceleration: Vec3,
    /// Timestep scale of one sub-step.
    pub factor: f32,
}

impl Gravity {
    /// Adds `acceleration * factor` to the velocity of the particle.
    #[inline]
    pub fn apply(&self, particle: &mut Particle) {
        particle.velocity += self.acceleration * self.factor;
    }
}

/// Returns the unit vector pointing from `b` to `a` and the distance between them, or `None` if
/// they coincide.
#[inline]
pub(crate) fn separation(a: Vec3, b: Vec3) -> Option<(Vec3, f32)> {
    let offset = a - b;
    let normal = offset.try_normalize()?;
    Some((normal, offset.length()))
}
