/// Cubic spline smoothing kernel with compact support `[0, 2h)`.
///
/// The kernel is normalised so that `W(0) = 1`; it is not a unit-integral SPH kernel and the
/// [`Sph`](crate::config::Sph) stiffness and reference density are expressed in the same units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmoothingKernel {
    /// Smoothing length `h`.
    pub h: f32,
}

impl SmoothingKernel {
    /// Creates a new [`SmoothingKernel`] with the given smoothing length.
    #[inline]
    pub const fn new(h: f32) -> Self {
        Self { h }
    }

    /// Returns the kernel value at the normalised distance `q = distance / h`.
    #[inline]
    pub fn at_ratio(q: f32) -> f32 {
        if (0.0..1.0).contains(&q) {
            1.0 - 1.5 * q * q + 0.75 * q * q * q
        } else if (1.0..2.0).contains(&q) {
            let t = 2.0 - q;
            0.25 * t * t * t
        } else {
            0.0
        }
    }

    /// Returns the normalised distance `q` of the given distance.
    #[inline]
    pub fn ratio(&self, distance: f32) -> f32 {
        distance / self.h
    }

    /// Returns the kernel value at the given distance.
    #[inline]
    pub fn value(&self, distance: f32) -> f32 {
        Self::at_ratio(self.ratio(distance))
    }

    /// Distance beyond which the kernel vanishes.
    #[inline]
    pub fn support(&self) -> f32 {
        2.0 * self.h
    }
}
