use crate::{grid::SpatialGrid, Between, Interaction};
use std::ops::{Add, AddAssign, Range};

/// Trait to compute interactions between binned particles using the sequential grid algorithms.
pub trait SequentialCompute<T>: Sized {
    /// Returns, for every particle, the sum of the interaction with its neighbour candidates.
    ///
    /// Refer to [`GridSum`] for more information.
    #[inline]
    fn grid_sum(self, interaction: T) -> <GridSum<T> as Interaction<Self>>::Output
    where
        GridSum<T>: Interaction<Self>,
    {
        GridSum(interaction).compute(self)
    }

    /// Returns, for every particle, the accumulated pair interaction with its neighbour
    /// candidates, computing every unordered pair once.
    ///
    /// Refer to [`GridPairs`] for more information.
    #[inline]
    fn grid_pairs(self, interaction: T) -> <GridPairs<T> as Interaction<Self>>::Output
    where
        GridPairs<T>: Interaction<Self>,
    {
        GridPairs(interaction).compute(self)
    }
}

impl<T, S1, S2> SequentialCompute<T> for Between<S1, S2> {}

/// An iterator that computes, for each particle in turn, the interaction summed over its
/// neighbour candidates in the grid.
#[must_use = "iterators are lazy and do nothing unless consumed"]
#[derive(Clone, Debug)]
pub struct Interactions<'a, A, P> {
    algorithm: A,
    affected: Range<usize>,
    particles: &'a [P],
    grid: &'a SpatialGrid,
}

impl<'a, A, P> Interactions<'a, A, P> {
    #[inline]
    const fn new(algorithm: A, particles: &'a [P], grid: &'a SpatialGrid) -> Self {
        Self {
            algorithm,
            affected: 0..particles.len(),
            particles,
            grid,
        }
    }
}

impl<P, U, T> Iterator for Interactions<'_, GridSum<T>, P>
where
    U: Add<Output = U> + Default,
    T: for<'a> Interaction<Between<&'a P, &'a P>, Output = U>,
{
    type Item = U;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let i = self.affected.next()?;
        let (particles, grid) = (self.particles, self.grid);
        let interaction = &mut self.algorithm.0;

        Some(grid.candidates(i).fold(U::default(), |sum, j| {
            sum + interaction.compute(Between(&particles[i], &particles[j]))
        }))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.affected.size_hint()
    }
}

impl<P, U, T> ExactSizeIterator for Interactions<'_, GridSum<T>, P>
where
    U: Add<Output = U> + Default,
    T: for<'a> Interaction<Between<&'a P, &'a P>, Output = U>,
{
    #[inline]
    fn len(&self) -> usize {
        self.affected.len()
    }
}

/// Neighbour-sum algorithm using one CPU thread.
///
/// The particles must have been binned into the grid by the last
/// [`SpatialGrid::rebuild`](crate::grid::SpatialGrid::rebuild). To use particles `P` with this
/// algorithm, the interaction `T` should implement [`Interaction<Between<&P, &P>>`].
#[derive(Clone, Copy, Default, Debug)]
pub struct GridSum<T>(pub T);

impl<'a, P, T> Interaction<Between<&'a [P], &'a SpatialGrid>> for GridSum<T>
where
    T: Clone,
{
    type Output = Interactions<'a, Self, P>;

    #[inline]
    fn compute(
        &mut self,
        Between(particles, grid): Between<&'a [P], &'a SpatialGrid>,
    ) -> Self::Output {
        debug_assert_eq!(particles.len(), grid.len(), "grid is stale");
        Interactions::new(self.clone(), particles, grid)
    }
}

/// Trait to implement the symmetric computation of an interaction between two particles. Such
/// implementations are used by the [`GridPairs`] algorithm.
pub trait InteractionPair<P> {
    /// The computed interaction.
    type Output;

    /// Returns the computed interactions on both particles of a distinct pair.
    fn compute_pair(&mut self, pair: Between<P, P>) -> (Self::Output, Self::Output);
}

/// Neighbour-pairs algorithm using one CPU thread.
///
/// Every unordered pair of neighbour candidates is computed once, from the lower index, and the
/// outputs are accumulated into one value per particle. The outputs only depend on the state
/// before the pass, whatever the visiting order.
///
/// To use particles `P` with this algorithm, the interaction `T` should implement
/// [`InteractionPair<&P>`].
#[derive(Clone, Copy, Default, Debug)]
pub struct GridPairs<T>(pub T);

impl<P, U, T> Interaction<Between<&[P], &SpatialGrid>> for GridPairs<T>
where
    U: AddAssign + Default,
    T: for<'a> InteractionPair<&'a P, Output = U>,
{
    type Output = Vec<U>;

    fn compute(&mut self, Between(particles, grid): Between<&[P], &SpatialGrid>) -> Self::Output {
        debug_assert_eq!(particles.len(), grid.len(), "grid is stale");

        let len = particles.len();
        let mut output: Vec<_> = std::iter::repeat_with(Default::default).take(len).collect();

        for i in 0..len {
            let mut output_i = U::default();

            for j in grid.candidates(i).filter(|&j| j > i) {
                let computed = self.0.compute_pair(Between(&particles[i], &particles[j]));

                output_i += computed.0;
                output[j] += computed.1;
            }

            output[i] += output_i;
        }

        output
    }
}
