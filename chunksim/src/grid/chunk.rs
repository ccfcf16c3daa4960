use crate::error::{Error, Result};

/// One cell of the [`SpatialGrid`](super::SpatialGrid), holding the indices of the particles
/// currently inside it.
///
/// The storage doubles when full and is never shrunk, so a rebuild after the first few sub-steps
/// does not allocate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Chunk {
    particles: Vec<usize>,
}

impl Chunk {
    /// Creates a new empty [`Chunk`] able to hold `capacity` particles before growing.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut particles = Vec::new();
        particles
            .try_reserve_exact(capacity)
            .map_err(|_| Error::Allocation {
                what: "chunk particle storage",
                requested: capacity,
            })?;
        Ok(Self { particles })
    }

    /// Appends a particle index, doubling the storage first if it is full.
    #[inline]
    pub fn push(&mut self, index: usize) -> Result<()> {
        if self.particles.len() == self.particles.capacity() {
            self.grow()?;
        }
        self.particles.push(index);
        Ok(())
    }

    #[cold]
    fn grow(&mut self) -> Result<()> {
        let additional = self.particles.capacity().max(1);
        self.particles
            .try_reserve_exact(additional)
            .map_err(|_| Error::Allocation {
                what: "chunk particle storage",
                requested: self.particles.capacity().saturating_add(additional),
            })
    }

    /// Removes every particle while keeping the storage.
    #[inline]
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Returns the number of particles in the chunk.
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Returns `true` if the chunk holds no particles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Returns the number of particles the chunk can hold before growing.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.particles.capacity()
    }

    /// Returns the indices of the particles in the chunk.
    #[inline]
    pub fn particles(&self) -> &[usize] {
        &self.particles
    }
}
