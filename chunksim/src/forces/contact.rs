use super::separation;
use crate::{particle::Particle, sequential::InteractionPair, Between};
use glam::Vec3;

/// Pushes overlapping particles apart along their separation, proportionally to the overlap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Repulsion {
    /// Velocity change per unit of overlap.
    pub coefficient: f32,
}

impl Repulsion {
    /// Returns the velocity change of the particle `normal` points to.
    #[inline]
    fn impulse(&self, normal: Vec3, overlap: f32) -> Vec3 {
        normal * (overlap * self.coefficient)
    }
}

impl InteractionPair<&Particle> for Repulsion {
    type Output = Vec3;

    #[inline]
    fn compute_pair(&mut self, Between(a, b): Between<&Particle, &Particle>) -> (Vec3, Vec3) {
        let Some((normal, distance)) = separation(a.position, b.position) else {
            return (Vec3::ZERO, Vec3::ZERO);
        };

        let overlap = a.radius + b.radius - distance;
        if overlap <= 0.0 {
            return (Vec3::ZERO, Vec3::ZERO);
        }

        let impulse = self.impulse(normal, overlap);
        (impulse, -impulse)
    }
}

/// Damps the approach of overlapping particles moving toward each other.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collision {
    /// Fraction of the approach speed removed along the normal.
    pub friction: f32,
}

impl Collision {
    /// Returns the velocity change of the particle `normal` points to, or zero if the particles
    /// move apart.
    #[inline]
    fn impulse(&self, normal: Vec3, relative_velocity: Vec3) -> Vec3 {
        let approach = relative_velocity.dot(normal);
        if approach > 0.0 {
            return Vec3::ZERO;
        }
        -normal * (approach * self.friction)
    }
}

impl InteractionPair<&Particle> for Collision {
    type Output = Vec3;

    #[inline]
    fn compute_pair(&mut self, Between(a, b): Between<&Particle, &Particle>) -> (Vec3, Vec3) {
        let Some((normal, distance)) = separation(a.position, b.position) else {
            return (Vec3::ZERO, Vec3::ZERO);
        };

        if distance >= a.radius + b.radius {
            return (Vec3::ZERO, Vec3::ZERO);
        }

        let impulse = self.impulse(normal, a.velocity - b.velocity);
        (impulse, -impulse)
    }
}

/// Repulsion followed by collision response for one pair of particles.
///
/// The collision sees the velocities already changed by the repulsion of the same pair.
/// A disabled half contributes nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Contact {
    /// Overlap repulsion, if enabled.
    pub repulsion: Option<Repulsion>,
    /// Collision response, if enabled.
    pub collision: Option<Collision>,
}

impl Contact {
    /// Returns `true` if neither half is enabled.
    #[inline]
    pub const fn is_noop(&self) -> bool {
        self.repulsion.is_none() && self.collision.is_none()
    }
}

impl InteractionPair<&Particle> for Contact {
    type Output = Vec3;

    fn compute_pair(&mut self, Between(a, b): Between<&Particle, &Particle>) -> (Vec3, Vec3) {
        let Some((normal, distance)) = separation(a.position, b.position) else {
            return (Vec3::ZERO, Vec3::ZERO);
        };

        let overlap = a.radius + b.radius - distance;
        if overlap <= 0.0 {
            return (Vec3::ZERO, Vec3::ZERO);
        }

        let mut delta = Vec3::ZERO;
        if let Some(repulsion) = &self.repulsion {
            delta += repulsion.impulse(normal, overlap);
        }
        if let Some(collision) = &self.collision {
            // The repulsion delta is equal and opposite, so the relative velocity gains twice it.
            let relative_velocity = a.velocity - b.velocity + 2.0 * delta;
            delta += collision.impulse(normal, relative_velocity);
        }

        (delta, -delta)
    }
}
