use crate::{forces::Boundary, particle::Particle};

/// Moves every particle by its velocity.
#[inline]
pub fn integrate(particles: &mut [Particle]) {
    for particle in particles {
        particle.position += particle.velocity;
    }
}

/// Brings every particle that left the box back inside it and returns how many were moved.
///
/// See [`Boundary::confine`].
pub fn confine(particles: &mut [Particle], boundary: &Boundary) -> usize {
    particles
        .iter_mut()
        .map(|particle| boundary.confine(particle))
        .filter(|&confined| confined)
        .count()
}
