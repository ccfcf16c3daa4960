//! Uniform chunk grid used to find nearby particles.
//!
//! The box is divided into cubic chunks sized from the configured target count. Every sub-step the
//! grid is rebuilt from the particle positions, after which the neighbour candidates of a particle
//! are the members of its own chunk and of the adjacent chunks.

mod chunk;
mod layout;

pub use chunk::Chunk;
pub use layout::{ChunkCoord, Connectivity, GridLayout};

use crate::{
    config::Config,
    error::{Error, Result},
    particle::Position,
};
use glam::Vec3;

/// Chunk grid binning particles by position.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    layout: GridLayout,
    chunks: Vec<Chunk>,
    assignments: Vec<usize>,
}

impl SpatialGrid {
    /// Creates a new empty [`SpatialGrid`] with the given layout, giving every chunk room for
    /// `expected_particles / chunk count + 1` particles.
    pub fn new(layout: GridLayout, expected_particles: usize) -> Result<Self> {
        let count = layout.len();
        let capacity = expected_particles / count + 1;

        let mut chunks = Vec::new();
        chunks
            .try_reserve_exact(count)
            .map_err(|_| Error::Allocation {
                what: "chunk grid",
                requested: count,
            })?;
        for _ in 0..count {
            chunks.push(Chunk::with_capacity(capacity)?);
        }

        Ok(Self {
            layout,
            chunks,
            assignments: Vec::new(),
        })
    }

    /// Creates a new empty [`SpatialGrid`] covering the configured box.
    pub fn from_config(config: &Config) -> Result<Self> {
        let layout = GridLayout::new(config.dim, config.target_chunk_count, config.connectivity)?;
        log::info!(
            "chunk size {:.4}, {:?} chunks ({} total)",
            layout.chunk_size(),
            layout.counts(),
            layout.len()
        );

        let reach = config.interaction_radius();
        if reach > layout.chunk_size() {
            log::warn!(
                "interaction radius {reach} exceeds the chunk size {}, \
                 pairs further than one chunk apart are missed",
                layout.chunk_size()
            );
        }

        Self::new(layout, config.num_particles)
    }

    /// Returns the grid geometry.
    #[inline]
    pub const fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Returns the chunks, indexed by [`GridLayout::index`].
    #[inline]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Returns the chunk at the given coordinates, or `None` if they lie outside the grid.
    #[inline]
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.layout
            .contains(coord)
            .then(|| &self.chunks[self.layout.index(coord)])
    }

    /// Returns the number of particles binned by the last rebuild.
    #[inline]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Returns `true` if no particle is binned.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Clears every chunk and bins the given particles again.
    ///
    /// Fails with [`Error::OutOfBounds`] if a position maps outside the grid, leaving the grid
    /// empty. Callers keep positions inside `[0, dim)`.
    pub fn rebuild<P>(&mut self, particles: &[P]) -> Result<()>
    where
        P: Position<Vector = Vec3>,
    {
        self.clear();

        if let Err(e) = self.bin(particles) {
            self.clear();
            return Err(e);
        }

        Ok(())
    }

    fn bin<P>(&mut self, particles: &[P]) -> Result<()>
    where
        P: Position<Vector = Vec3>,
    {
        self.assignments
            .try_reserve(particles.len())
            .map_err(|_| Error::Allocation {
                what: "chunk assignments",
                requested: particles.len(),
            })?;

        for (index, particle) in particles.iter().enumerate() {
            let position = particle.position();
            let coord = self
                .layout
                .locate(position)
                .map_err(|chunk| Error::OutOfBounds {
                    index,
                    position: position.to_array(),
                    chunk,
                    counts: self.layout.counts(),
                })?;

            let chunk = self.layout.index(coord);
            self.chunks[chunk].push(index)?;
            self.assignments.push(chunk);
        }

        Ok(())
    }

    fn clear(&mut self) {
        self.chunks.iter_mut().for_each(Chunk::clear);
        self.assignments.clear();
    }

    /// Returns the index of the chunk the particle was binned into.
    #[inline]
    pub fn chunk_of(&self, particle: usize) -> usize {
        self.assignments[particle]
    }

    /// Returns the indices of the chunk and of its adjacent chunks.
    #[inline]
    pub fn neighbourhood(&self, chunk: usize) -> impl Iterator<Item = usize> + '_ {
        let coord = self.layout.coord(chunk);
        std::iter::once(chunk).chain(
            self.layout
                .adjacent(coord)
                .map(move |c| self.layout.index(c)),
        )
    }

    /// Returns the particles binned in the chunk and in its adjacent chunks.
    #[inline]
    pub fn neighbours(&self, chunk: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbourhood(chunk)
            .flat_map(move |c| self.chunks[c].particles().iter().copied())
    }

    /// Returns the neighbour candidates of a particle, which are the particles of its chunk and
    /// of the adjacent chunks, excluding itself.
    #[inline]
    pub fn candidates(&self, particle: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbours(self.chunk_of(particle))
            .filter(move |&other| other != particle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_grid(dim: Vec3, connectivity: Connectivity) -> SpatialGrid {
        let layout = GridLayout::with_chunk_size(dim, 1.0, connectivity).unwrap();
        SpatialGrid::new(layout, 0).unwrap()
    }

    #[test]
    fn rebuild_bins_every_particle_once() {
        let mut grid = unit_grid(Vec3::splat(4.0), Connectivity::Full);
        let positions = [
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(0.6, 0.5, 0.5),
            Vec3::new(3.5, 3.5, 3.5),
            Vec3::new(1.0, 2.0, 3.0),
        ];
        grid.rebuild(&positions).unwrap();

        let total: usize = grid.chunks().iter().map(Chunk::len).sum();
        assert_eq!(total, positions.len());
        assert_eq!(grid.chunk([0, 0, 0]).unwrap().particles(), &[0, 1]);
        assert_eq!(grid.chunk([3, 3, 3]).unwrap().particles(), &[2]);
        assert_eq!(grid.chunk([1, 2, 3]).unwrap().particles(), &[3]);
        assert_eq!(grid.chunk_of(3), grid.layout().index([1, 2, 3]));
    }

    #[test]
    fn rebuild_is_idempotent() {
        let mut grid = unit_grid(Vec3::splat(3.0), Connectivity::Full);
        let positions: Vec<Vec3> = (0..27)
            .map(|i| Vec3::new((i / 9) as f32, (i / 3 % 3) as f32, (i % 3) as f32) + 0.5)
            .collect();

        grid.rebuild(&positions).unwrap();
        let first = grid.chunks().to_vec();
        grid.rebuild(&positions).unwrap();
        assert_eq!(grid.chunks(), first.as_slice());
        assert!(grid.chunks().iter().all(|c| c.len() == 1));
    }

    #[test]
    fn chunk_storage_grows_past_initial_capacity() {
        let mut grid = unit_grid(Vec3::splat(2.0), Connectivity::Full);
        let positions = vec![Vec3::splat(0.25); 100];
        grid.rebuild(&positions).unwrap();
        assert_eq!(grid.chunk([0, 0, 0]).unwrap().len(), 100);
    }

    #[test]
    fn chunk_lookup_outside_the_grid_is_none() {
        let mut grid = unit_grid(Vec3::splat(3.0), Connectivity::Full);
        grid.rebuild(&[Vec3::new(1.5, 0.5, 0.5)]).unwrap();

        assert_eq!(grid.chunk([1, 0, 0]).unwrap().particles(), &[0]);
        assert!(grid.chunk([0, 3, 0]).is_none());
        assert!(grid.chunk([3, 0, 0]).is_none());
        assert!(grid.chunk([0, 0, usize::MAX]).is_none());
    }

    #[test]
    fn out_of_bounds_particle_is_an_error() {
        let mut grid = unit_grid(Vec3::splat(2.0), Connectivity::Full);
        let positions = [Vec3::splat(0.5), Vec3::new(0.5, 2.5, 0.5)];

        match grid.rebuild(&positions) {
            Err(Error::OutOfBounds { index, chunk, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(chunk, [0, 2, 0]);
            }
            other => panic!("expected out of bounds, got {other:?}"),
        }
        assert!(grid.is_empty());
        assert!(grid.chunks().iter().all(Chunk::is_empty));
    }

    #[test]
    fn candidates_include_particles_across_chunk_faces() {
        let mut grid = unit_grid(Vec3::new(4.0, 1.0, 1.0), Connectivity::Faces);
        // Particles 0 and 1 sit on either side of the x = 1 chunk boundary.
        let positions = [
            Vec3::new(0.99, 0.5, 0.5),
            Vec3::new(1.01, 0.5, 0.5),
            Vec3::new(3.5, 0.5, 0.5),
        ];
        grid.rebuild(&positions).unwrap();

        let of_0: Vec<usize> = grid.candidates(0).collect();
        let of_1: Vec<usize> = grid.candidates(1).collect();
        let of_2: Vec<usize> = grid.candidates(2).collect();
        assert_eq!(of_0, vec![1]);
        assert_eq!(of_1, vec![0]);
        assert!(of_2.is_empty());
    }

    #[test]
    fn candidates_include_particles_exactly_on_a_boundary() {
        let mut grid = unit_grid(Vec3::new(4.0, 2.0, 2.0), Connectivity::Full);
        // Largest float below 1.
        let below = f32::from_bits(1.0f32.to_bits() - 1);
        let positions = [
            Vec3::new(1.0, 0.5, 0.5),
            Vec3::new(below, 0.5, 0.5),
            Vec3::new(2.0, 1.0, 1.0),
            Vec3::new(2.0, below, below),
        ];
        grid.rebuild(&positions).unwrap();

        // A position on a boundary belongs to the upper chunk.
        assert_eq!(grid.chunk_of(0), grid.layout().index([1, 0, 0]));
        assert_eq!(grid.chunk_of(1), grid.layout().index([0, 0, 0]));
        assert_eq!(grid.chunk_of(2), grid.layout().index([2, 1, 1]));
        assert_eq!(grid.chunk_of(3), grid.layout().index([2, 0, 0]));

        let candidates = |i| grid.candidates(i).collect::<Vec<usize>>();
        assert!(candidates(0).contains(&1));
        assert!(candidates(1).contains(&0));
        assert!(candidates(2).contains(&3));
        assert!(candidates(3).contains(&2));
    }

    #[test]
    fn full_connectivity_reaches_corner_neighbours() {
        let positions = [Vec3::splat(0.9), Vec3::splat(1.1)];

        let mut full = unit_grid(Vec3::splat(2.0), Connectivity::Full);
        full.rebuild(&positions).unwrap();
        assert_eq!(full.candidates(0).collect::<Vec<_>>(), vec![1]);

        let mut faces = unit_grid(Vec3::splat(2.0), Connectivity::Faces);
        faces.rebuild(&positions).unwrap();
        assert_eq!(faces.candidates(0).count(), 0);
    }

    #[test]
    fn candidates_are_symmetric() {
        let mut grid = unit_grid(Vec3::new(5.0, 4.0, 3.0), Connectivity::Full);
        let positions: Vec<Vec3> = (0..60)
            .map(|i| {
                let t = i as f32;
                Vec3::new((t * 0.37) % 5.0, (t * 0.61) % 4.0, (t * 0.83) % 3.0)
            })
            .collect();
        grid.rebuild(&positions).unwrap();

        for a in 0..positions.len() {
            for b in grid.candidates(a) {
                assert!(grid.candidates(b).any(|c| c == a));
            }
        }
    }

    #[test]
    fn from_config_sizes_initial_storage() {
        let config = Config {
            dim: Vec3::splat(8.0),
            num_particles: 800,
            target_chunk_count: 8,
            ..Config::default()
        };
        let grid = SpatialGrid::from_config(&config).unwrap();
        let count = grid.layout().len();
        assert!(count >= 8);
        assert_eq!(grid.chunks().len(), count);
        assert!(grid.chunks().iter().all(|c| c.capacity() >= 800 / count + 1));
    }
}
