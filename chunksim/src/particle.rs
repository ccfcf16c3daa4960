use glam::Vec3;

pub use chunksim_derive::Position;

/// Trait for types that can be located in space.
///
/// The [`SpatialGrid`](crate::grid::SpatialGrid) bins anything implementing this trait with a
/// [`Vec3`] position. You can derive it if your type has a field named `position`, or mark the
/// field to use with `#[position]`.
///
/// ```
/// use chunksim::prelude::*;
/// use glam::Vec3;
///
/// #[derive(Position)]
/// struct Marker {
///     #[position]
///     at: Vec3,
///     label: &'static str,
/// }
///
/// let marker = Marker { at: Vec3::ONE, label: "one" };
/// assert_eq!(marker.position(), Vec3::ONE);
/// ```
pub trait Position {
    /// The type used to represent the position.
    type Vector;

    /// Returns the position of a particle.
    fn position(&self) -> Self::Vector;
}

impl Position for Vec3 {
    type Vector = Vec3;

    #[inline]
    fn position(&self) -> Self::Vector {
        *self
    }
}

impl<V: Clone, S> Position for (V, S) {
    type Vector = V;

    #[inline]
    fn position(&self) -> Self::Vector {
        self.0.clone()
    }
}

/// A simulated particle.
///
/// `density` and `pressure` are recomputed every sub-step when the SPH passes are enabled. The
/// display `color` is assigned once at spawn and never touched by the simulation.
#[derive(Position, Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    /// Position, within `[0, dim)` after every sub-step.
    pub position: Vec3,
    /// Displacement applied to the position at the end of each sub-step.
    pub velocity: Vec3,
    /// Contact radius.
    pub radius: f32,
    /// SPH density estimate.
    pub density: f32,
    /// SPH pressure derived from the density.
    pub pressure: f32,
    /// Display color.
    pub color: [u8; 3],
}

impl Particle {
    /// Creates a new [`Particle`] at rest with no density or pressure.
    #[inline]
    pub const fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            radius,
            density: 0.0,
            pressure: 0.0,
            color: [255; 3],
        }
    }

    /// Returns this particle with the given velocity.
    #[inline]
    pub const fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Returns this particle with the given display color.
    #[inline]
    pub const fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = color;
        self
    }
}
