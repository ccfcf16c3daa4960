use crate::error::{Error, Result};
use glam::Vec3;

/// Integer coordinates of a chunk in the grid.
pub type ChunkCoord = [usize; 3];

/// Which surrounding chunks count as adjacent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Connectivity {
    /// The 26 chunks sharing a face, an edge or a corner.
    #[default]
    Full,
    /// The 6 chunks sharing a face.
    Faces,
}

const FULL: [[i8; 3]; 26] = {
    let mut offsets = [[0; 3]; 26];
    let mut n = 0;
    let mut i = 0;
    while i < 27 {
        let offset = [(i / 9) as i8 - 1, (i / 3 % 3) as i8 - 1, (i % 3) as i8 - 1];
        if i != 13 {
            offsets[n] = offset;
            n += 1;
        }
        i += 1;
    }
    offsets
};

const FACES: [[i8; 3]; 6] = [
    [-1, 0, 0],
    [1, 0, 0],
    [0, -1, 0],
    [0, 1, 0],
    [0, 0, -1],
    [0, 0, 1],
];

impl Connectivity {
    /// Returns the coordinate offsets of the adjacent chunks, excluding the chunk itself.
    #[inline]
    pub const fn offsets(self) -> &'static [[i8; 3]] {
        match self {
            Self::Full => &FULL,
            Self::Faces => &FACES,
        }
    }
}

/// Geometry of a uniform chunk grid covering `[0, dim)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    dim: Vec3,
    chunk_size: f32,
    counts: [usize; 3],
    connectivity: Connectivity,
}

impl GridLayout {
    /// Creates a new [`GridLayout`] whose cubic chunks have a volume of `volume / target_count`.
    ///
    /// The number of chunks along each axis is rounded up, so the grid covers the whole box and
    /// holds at least `target_count` chunks.
    pub fn new(dim: Vec3, target_count: usize, connectivity: Connectivity) -> Result<Self> {
        if !dim.is_finite() || dim.min_element() <= 0.0 {
            return Err(Error::invalid("dim", "components must be finite and > 0"));
        }
        if target_count == 0 {
            return Err(Error::invalid("target_chunk_count", "must be >= 1"));
        }

        let volume = dim.x * dim.y * dim.z;
        let chunk_size = (volume / target_count as f32).cbrt();
        Self::with_chunk_size(dim, chunk_size, connectivity)
    }

    /// Creates a new [`GridLayout`] with the given chunk edge length.
    pub fn with_chunk_size(dim: Vec3, chunk_size: f32, connectivity: Connectivity) -> Result<Self> {
        if !chunk_size.is_finite() || chunk_size <= 0.0 {
            return Err(Error::invalid("chunk_size", "must be finite and > 0"));
        }

        let counts = (dim / chunk_size)
            .ceil()
            .max(Vec3::ONE)
            .to_array()
            .map(|c| c as usize);

        let total = counts
            .iter()
            .try_fold(1usize, |total, &c| total.checked_mul(c))
            .ok_or(Error::Allocation {
                what: "chunk grid",
                requested: usize::MAX,
            })?;
        log::trace!("{total} chunks in layout {counts:?}");

        Ok(Self {
            dim,
            chunk_size,
            counts,
            connectivity,
        })
    }

    /// Returns the extents of the covered box.
    #[inline]
    pub const fn dim(&self) -> Vec3 {
        self.dim
    }

    /// Returns the edge length of a chunk.
    #[inline]
    pub const fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    /// Returns the number of chunks along each axis.
    #[inline]
    pub const fn counts(&self) -> [usize; 3] {
        self.counts
    }

    /// Returns the neighbourhood used by [`GridLayout::adjacent`].
    #[inline]
    pub const fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Returns the total number of chunks.
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.iter().product()
    }

    /// Returns `true` if the layout has no chunks. This never happens for a constructed layout.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `coord` lies inside the grid on every axis.
    #[inline]
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        coord.iter().zip(self.counts).all(|(&c, count)| c < count)
    }

    /// Returns the linear index of the chunk at `coord`, which must be [contained](Self::contains).
    #[inline]
    pub fn index(&self, [x, y, z]: ChunkCoord) -> usize {
        let [_, cy, cz] = self.counts;
        (x * cy + y) * cz + z
    }

    /// Returns the coordinates of the chunk with the given linear index.
    #[inline]
    pub fn coord(&self, index: usize) -> ChunkCoord {
        let [_, cy, cz] = self.counts;
        [index / (cy * cz), index / cz % cy, index % cz]
    }

    /// Returns the coordinates of the chunk containing `position`, or the signed coordinates it
    /// would have if it falls outside the grid.
    pub fn locate(&self, position: Vec3) -> std::result::Result<ChunkCoord, [i64; 3]> {
        let mut signed = [0i64; 3];
        let mut coord = [0usize; 3];
        let mut inside = true;

        for d in 0..3 {
            let p = position[d];
            // Saturating float-to-int conversion, NaN maps to 0 so it must be rejected here.
            signed[d] = if p.is_nan() {
                i64::MIN
            } else {
                (p / self.chunk_size).floor() as i64
            };

            let count = self.counts[d] as i64;
            coord[d] = match signed[d] {
                // `p < dim` can still divide to exactly `count` after rounding.
                c if c == count && p >= 0.0 && p < self.dim[d] => self.counts[d] - 1,
                c if (0..count).contains(&c) => c as usize,
                _ => {
                    inside = false;
                    0
                }
            };
        }

        if inside {
            Ok(coord)
        } else {
            Err(signed)
        }
    }

    /// Returns an iterator over the coordinates of the chunks adjacent to `coord`, skipping
    /// those outside the grid.
    #[inline]
    pub fn adjacent(&self, coord: ChunkCoord) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.connectivity.offsets().iter().filter_map(move |offset| {
            let mut neighbour = [0; 3];
            for d in 0..3 {
                neighbour[d] = coord[d].checked_add_signed(offset[d] as isize)?;
            }
            self.contains(neighbour).then_some(neighbour)
        })
    }
}
