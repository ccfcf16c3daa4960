use crate::{grid::SpatialGrid, Between, Interaction};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::ops::Add;

/// Trait to compute interactions between binned particles using the parallel grid algorithms.
pub trait ParallelCompute<T>: Sized {
    /// Returns, for every particle, the sum of the interaction with its neighbour candidates,
    /// using a parallel algorithm.
    ///
    /// Refer to [`GridSum`] for more information.
    #[inline]
    fn par_grid_sum(self, interaction: T) -> <GridSum<T> as Interaction<Self>>::Output
    where
        GridSum<T>: Interaction<Self>,
    {
        GridSum(interaction).compute(self)
    }
}

impl<T, S1, S2> ParallelCompute<T> for Between<S1, S2> {}

/// Neighbour-sum algorithm using multiple CPU threads.
///
/// Every particle only reads the others, so particles are distributed over the rayon thread pool
/// with one clone of the interaction per worker. The result is the same as the sequential
/// [`GridSum`](crate::sequential::GridSum).
#[derive(Clone, Copy, Default, Debug)]
pub struct GridSum<T>(pub T);

impl<P, U, T> Interaction<Between<&[P], &SpatialGrid>> for GridSum<T>
where
    P: Sync,
    U: Add<Output = U> + Default + Send,
    T: for<'a> Interaction<Between<&'a P, &'a P>, Output = U> + Clone + Send + Sync,
{
    type Output = Vec<U>;

    fn compute(&mut self, Between(particles, grid): Between<&[P], &SpatialGrid>) -> Self::Output {
        debug_assert_eq!(particles.len(), grid.len(), "grid is stale");

        (0..particles.len())
            .into_par_iter()
            .map_init(
                || self.0.clone(),
                |interaction, i| {
                    grid.candidates(i).fold(U::default(), |sum, j| {
                        sum + interaction.compute(Between(&particles[i], &particles[j]))
                    })
                },
            )
            .collect()
    }
}
