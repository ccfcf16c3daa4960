use crate::particle::Particle;
use glam::Vec3;

/// Keeps particles inside the box `[0, dim)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Boundary {
    /// Extents of the box.
    pub dim: Vec3,
    /// Fraction of the velocity kept, reversed, on a bounce.
    pub friction: f32,
}

impl Boundary {
    /// Creates a new [`Boundary`].
    #[inline]
    pub const fn new(dim: Vec3, friction: f32) -> Self {
        Self { dim, friction }
    }

    /// Bounces the particle off the walls it would cross in the next integration.
    ///
    /// For every axis where `position + velocity` would bring the particle closer than its radius
    /// to a wall, the velocity component is reversed and scaled by the friction, and the position
    /// is placed against the wall. Returns `true` if any axis bounced.
    pub fn reflect(&self, particle: &mut Particle) -> bool {
        let radius = particle.radius;
        let predicted = particle.position + particle.velocity;
        let mut bounced = false;

        for d in 0..3 {
            let wall = if predicted[d] - radius < 0.0 {
                radius
            } else if predicted[d] + radius >= self.dim[d] {
                self.dim[d] - radius
            } else {
                continue;
            };

            particle.velocity[d] *= -self.friction;
            particle.position[d] = wall;
            bounced = true;
        }

        bounced
    }

    /// Returns `true` if the particle lies inside `[0, dim)` with finite state.
    #[inline]
    pub fn contains(&self, particle: &Particle) -> bool {
        particle.velocity.is_finite()
            && particle.position.is_finite()
            && particle.position.cmpge(Vec3::ZERO).all()
            && particle.position.cmplt(self.dim).all()
    }

    /// Moves a particle that left the box back into `[radius, dim - radius]`.
    ///
    /// Non-finite position components are reset to the middle of the box and non-finite velocity
    /// components to zero. Returns `true` if the particle was changed.
    pub fn confine(&self, particle: &mut Particle) -> bool {
        if self.contains(particle) {
            return false;
        }

        for d in 0..3 {
            if !particle.velocity[d].is_finite() {
                particle.velocity[d] = 0.0;
            }

            let dim = self.dim[d];
            // Strictly below `dim` even when the radius is zero.
            let hi = (dim - particle.radius).min(dim - dim * f32::EPSILON).max(0.0);
            let lo = particle.radius.clamp(0.0, hi);

            let p = particle.position[d];
            particle.position[d] = if p.is_finite() {
                p.clamp(lo, hi)
            } else {
                0.5 * (lo + hi)
            };
        }

        true
    }
}
