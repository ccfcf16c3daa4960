use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while setting up or running a simulation.
///
/// Per-particle geometric problems are not errors: the force pipeline clamps and logs them. What
/// remains here either stops a run (allocation, invalid configuration) or reports misuse of a
/// lower-level primitive such as [`SpatialGrid::rebuild`](crate::grid::SpatialGrid::rebuild).
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration field is outside its valid range.
    #[error("invalid configuration: `{field}` {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Growing or allocating a buffer failed.
    #[error("allocation of {what} failed ({requested} elements requested)")]
    Allocation {
        /// The buffer being allocated.
        what: &'static str,
        /// Number of elements that could not be reserved.
        requested: usize,
    },

    /// A particle maps to a chunk outside of the grid.
    #[error("particle {index} at {position:?} falls outside the grid (chunk {chunk:?}, counts {counts:?})")]
    OutOfBounds {
        /// Index of the particle in its store.
        index: usize,
        /// Offending position.
        position: [f32; 3],
        /// Computed (signed) chunk coordinates.
        chunk: [i64; 3],
        /// Number of chunks along each axis.
        counts: [usize; 3],
    },

    /// The other end of a channel went away.
    #[error("simulation channel disconnected")]
    Disconnected,

    /// The simulation thread panicked.
    #[error("simulation thread panicked")]
    ThreadPanicked,

    /// Spawning the simulation thread failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
