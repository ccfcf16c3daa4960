#![warn(missing_docs)]
//! # Chunksim
//!
//! Chunksim is a crate simulating particles in a closed 3D box with short-range interactions:
//! gravity, wall bounces, overlap repulsion, collision response and an SPH-style pressure force.
//!
//! ## Goals
//!
//! The simulation runs on its own schedule and hands complete copies of its state to any number of
//! consumers, such as a renderer drawing at a higher rate. Consumers never block the simulation and
//! never observe a frame that is still being written.
//!
//! Finding neighbours is what makes short-range interactions tractable. Particles are binned into
//! a uniform grid of cubic chunks every sub-step, and each particle only interacts with the
//! particles of its own chunk and of the adjacent ones.
//!
//! Chunksim uses [rayon](https://github.com/rayon-rs/rayon) for parallelization. Enable the
//! `parallel` feature to run the density and pressure passes on multiple threads.
//!
//! ## Using Chunksim
//!
//! ### Getting started
//!
//! A [`Config`](config::Config) describes a run. Its default is a `75 x 25 x 15` box with
//! 20 000 particles. [`Domain`](domain::Domain) owns the particles and advances them one frame
//! per [`tick`](domain::Domain::tick).
//!
//! ```
//! use chunksim::prelude::*;
//! use glam::Vec3;
//!
//! let config = Config {
//!     dim: Vec3::new(20.0, 10.0, 10.0),
//!     num_particles: 1_000,
//!     target_chunk_count: 500,
//!     seed: Some(42),
//!     ..Config::default()
//! };
//!
//! let mut domain = Domain::new(config)?;
//! for _ in 0..10 {
//!     domain.tick()?;
//! }
//!
//! let mean_height = domain.particles().iter().map(|p| p.position.y).sum::<f32>() / 1_000.0;
//! assert!(mean_height < 10.0);
//! # Ok::<(), chunksim::Error>(())
//! ```
//!
//! ### Running in the background
//!
//! [`Simulation::spawn`](runner::Simulation::spawn) runs the frame loop at `fps` frames per second
//! on a dedicated thread. The returned handle gives access to a
//! [`SnapshotReader`](snapshot::SnapshotReader) that consumers poll for the latest complete
//! [`Snapshot`](snapshot::Snapshot).
//!
//! ```
//! use chunksim::prelude::*;
//! use glam::Vec3;
//!
//! let handle = Simulation::spawn(Config {
//!     dim: Vec3::splat(10.0),
//!     num_particles: 200,
//!     target_chunk_count: 125,
//!     ..Config::default()
//! })?;
//!
//! let mut drawn = None;
//! while drawn.map_or(true, |frame| frame < 3) {
//!     if let Some(snapshot) = handle.reader().try_newer_than(drawn.unwrap_or(0)) {
//!         // Draw `snapshot.particles` here.
//!         drawn = Some(snapshot.frame);
//!     }
//!     std::thread::sleep(std::time::Duration::from_millis(1));
//! }
//!
//! handle.stop()?;
//! # Ok::<(), chunksim::Error>(())
//! ```
//!
//! <details>
//! <summary><h4>Advanced usage</h4></summary>
//!
//! #### Custom interactions
//!
//! The passes of the simulation are built on the same traits as the rest of the crate.
//! [`Between`] is a tuple struct of two objects where the first one is conventionally the affected
//! object and the second one is the affecting object. Implementing
//! [`Interaction<Between<&YourParticle, &YourParticle>>`] for `YourInteraction` allows it to be
//! summed over grid neighbours with [`GridSum`](sequential::GridSum), and implementing
//! [`InteractionPair<&YourParticle>`](sequential::InteractionPair) allows the symmetric
//! [`GridPairs`](sequential::GridPairs) algorithm, which computes every unordered pair once.
//!
//! The grid bins any type implementing [`Position`](particle::Position) with a `Vec3` position.
//!
//! ##### Example
//!
//! ```
//! use chunksim::prelude::*;
//! use chunksim::grid::{Connectivity, GridLayout};
//! use glam::Vec3;
//!
//! #[derive(Position)]
//! struct Body {
//!     position: Vec3,
//!     charge: f32,
//! }
//!
//! #[derive(Clone)]
//! struct NeighbourCharge;
//!
//! impl Interaction<Between<&Body, &Body>> for NeighbourCharge {
//!     type Output = f32;
//!
//!     fn compute(&mut self, Between(_, affecting): Between<&Body, &Body>) -> f32 {
//!         affecting.charge
//!     }
//! }
//!
//! let bodies = [
//!     Body { position: Vec3::new(0.5, 0.5, 0.5), charge: 1.0 },
//!     Body { position: Vec3::new(1.5, 0.5, 0.5), charge: 2.0 },
//!     Body { position: Vec3::new(3.5, 3.5, 3.5), charge: 4.0 },
//! ];
//!
//! let layout = GridLayout::with_chunk_size(Vec3::splat(4.0), 1.0, Connectivity::Full)?;
//! let mut grid = SpatialGrid::new(layout, bodies.len())?;
//! grid.rebuild(&bodies)?;
//!
//! let charges: Vec<f32> = Between(&bodies[..], &grid).grid_sum(NeighbourCharge).collect();
//! assert_eq!(charges, vec![2.0, 1.0, 0.0]);
//! # Ok::<(), chunksim::Error>(())
//! ```
//! </details>
//!
//! [`Interaction<Between<&YourParticle, &YourParticle>>`]: Interaction

/// Run parameters.
pub mod config;
/// One simulation instance.
pub mod domain;
/// Interactions and per-particle forces.
pub mod forces;
/// Spatial partitioning of the box into chunks.
pub mod grid;
/// Position update and containment of the particles.
pub mod integrator;
/// Algorithms that use multiple CPU threads.
#[cfg(feature = "parallel")]
pub mod parallel;
/// Particle type and the [`Position`](particle::Position) trait.
pub mod particle;
/// Ordered passes advancing the particles by one sub-step.
pub mod pipeline;
/// Frame loop, background thread and frame statistics.
pub mod runner;
/// Algorithms that use one CPU thread.
pub mod sequential;
/// Publishing state copies to consumers.
pub mod snapshot;
/// Storage of the simulated particles.
pub mod store;

mod error;

pub use error::{Error, Result};
pub use glam;

/// Represents a pair of objects, which can be particles or storages of particles, between which an
/// interaction is computed.
///
/// The first object is the one being affected by the second object.
#[derive(Clone, Copy, Debug)]
pub struct Between<S1, S2>(pub S1, pub S2);

/// Trait to compute an interaction between particles contained in a storage.
///
/// This is the main trait used throughout `chunksim` to implement the grid algorithms, and is also
/// how interactions between particles are defined. For example, the SPH
/// [`Density`](forces::Density) implements [`Interaction<Between<&P, &P>>`] for any `P` with a
/// `Vec3` position.
///
/// # Example
///
/// ```
/// # use chunksim::prelude::*;
/// use chunksim::forces::Density;
/// use glam::Vec3;
///
/// let mut density = Density::new(&Sph::default());
///
/// let near = density.compute(Between(&Vec3::ZERO, &Vec3::new(0.5, 0.0, 0.0)));
/// let far = density.compute(Between(&Vec3::ZERO, &Vec3::new(3.0, 0.0, 0.0)));
///
/// assert!(near > 0.0);
/// assert_eq!(far, 0.0);
/// ```
///
/// [`Interaction<Between<&P, &P>>`]: Interaction
pub trait Interaction<Storage> {
    /// The computed interaction. This can be one or multiple values depending on the storage used.
    type Output;

    /// Returns the interaction between the particles in the storage.
    fn compute(&mut self, storage: Storage) -> Self::Output;
}

/// Commonly used types, re-exported.
pub mod prelude {
    // Common traits and their derive macros.
    pub use crate::{
        particle::{Particle, Position},
        sequential::InteractionPair,
        Between, Interaction,
    };

    pub use crate::{
        config::{Config, Sph},
        domain::Domain,
        grid::{Connectivity, SpatialGrid},
        runner::{Simulation, SimulationHandle},
        snapshot::{Snapshot, SnapshotReader},
        store::ParticleStore,
        Error, Result,
    };

    pub use crate::sequential::SequentialCompute;
    #[cfg(feature = "parallel")]
    pub use crate::parallel::ParallelCompute;
}
