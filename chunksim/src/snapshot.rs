//! Publishing complete copies of the simulation state to consumers on other threads.
//!
//! The simulation side owns a [`SnapshotPublisher`] and readers hold clones of a
//! [`SnapshotReader`]. A snapshot is filled completely before it is swapped in under a lock that
//! only guards the swap, so readers never observe a partially written frame and the simulation
//! never waits on a reader that is still drawing an older one.

use crate::{domain::Domain, particle::Particle};
use glam::Vec3;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};

/// Read-only copy of one particle, laid out for direct upload to a GPU buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "bytemuck", derive(bytemuck::Pod, bytemuck::Zeroable))]
pub struct ParticleView {
    /// Position in the box.
    pub position: [f32; 3],
    /// Velocity.
    pub velocity: [f32; 3],
    /// Contact radius.
    pub radius: f32,
    /// Display color.
    pub color: [u8; 3],
    _padding: u8,
}

impl From<&Particle> for ParticleView {
    #[inline]
    fn from(particle: &Particle) -> Self {
        Self {
            position: particle.position.to_array(),
            velocity: particle.velocity.to_array(),
            radius: particle.radius,
            color: particle.color,
            _padding: 0,
        }
    }
}

/// Complete copy of the domain state at the end of a frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    /// Extents of the box.
    pub dim: Vec3,
    /// Number of ticks completed when the snapshot was taken.
    pub frame: u64,
    /// Particle records, in store order.
    pub particles: Vec<ParticleView>,
}

impl Snapshot {
    /// Creates a new [`Snapshot`] of the domain.
    pub fn capture(domain: &Domain) -> Self {
        let mut snapshot = Self::default();
        snapshot.copy_from(domain);
        snapshot
    }

    /// Overwrites this snapshot with the state of the domain, reusing the particle buffer.
    pub fn copy_from(&mut self, domain: &Domain) {
        self.dim = domain.config().dim;
        self.frame = domain.frame();
        self.particles.clear();
        self.particles
            .extend(domain.particles().iter().map(ParticleView::from));
    }

    /// Returns the number of particles in the snapshot.
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Returns `true` if the snapshot holds no particles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[derive(Debug, Default)]
struct Shared {
    latest: Mutex<Option<Arc<Snapshot>>>,
    // Frame of the latest snapshot plus one, zero while nothing is published.
    published: AtomicU64,
}

impl Shared {
    // The slot only ever holds complete snapshots, so a poisoned lock is still usable.
    #[inline]
    fn lock(&self) -> MutexGuard<'_, Option<Arc<Snapshot>>> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Creates a connected publisher and reader.
pub fn channel() -> (SnapshotPublisher, SnapshotReader) {
    let shared = Arc::new(Shared::default());
    (
        SnapshotPublisher {
            shared: shared.clone(),
            spare: None,
        },
        SnapshotReader { shared },
    )
}

/// Simulation side of a snapshot channel.
#[derive(Debug)]
pub struct SnapshotPublisher {
    shared: Arc<Shared>,
    spare: Option<Arc<Snapshot>>,
}

impl SnapshotPublisher {
    /// Copies the domain into a fresh snapshot and makes it the latest one.
    ///
    /// The buffer of the replaced snapshot is reused by the next publication once no reader holds
    /// it anymore.
    pub fn publish(&mut self, domain: &Domain) {
        let mut snapshot = self
            .spare
            .take()
            .and_then(|spare| Arc::try_unwrap(spare).ok())
            .unwrap_or_default();
        snapshot.copy_from(domain);

        let frame = snapshot.frame;
        let snapshot = Arc::new(snapshot);

        let previous = self.shared.lock().replace(snapshot);
        self.shared
            .published
            .store(frame.saturating_add(1), Ordering::Release);

        self.spare = previous;
    }

    /// Returns a new reader connected to this publisher.
    #[inline]
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            shared: self.shared.clone(),
        }
    }
}

/// Consumer side of a snapshot channel. Cloning it is cheap.
#[derive(Clone, Debug)]
pub struct SnapshotReader {
    shared: Arc<Shared>,
}

impl SnapshotReader {
    /// Returns `true` once a snapshot has been published.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.shared.published.load(Ordering::Acquire) != 0
    }

    /// Returns the frame of the latest published snapshot.
    #[inline]
    pub fn latest_frame(&self) -> Option<u64> {
        self.shared.published.load(Ordering::Acquire).checked_sub(1)
    }

    /// Returns the latest complete snapshot, or `None` if nothing has been published yet.
    #[inline]
    pub fn try_latest(&self) -> Option<Arc<Snapshot>> {
        self.shared.lock().clone()
    }

    /// Returns the latest snapshot if it is newer than `frame`.
    pub fn try_newer_than(&self, frame: u64) -> Option<Arc<Snapshot>> {
        match self.latest_frame() {
            Some(latest) if latest > frame => self
                .try_latest()
                .filter(|snapshot| snapshot.frame > frame),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn domain() -> Domain {
        let config = Config {
            dim: Vec3::splat(6.0),
            num_particles: 50,
            target_chunk_count: 27,
            seed: Some(11),
            ..Config::default()
        };
        Domain::new(config).unwrap()
    }

    #[test]
    fn particle_view_layout() {
        assert_eq!(std::mem::size_of::<ParticleView>(), 32);
        let p = Particle::new(Vec3::new(1.0, 2.0, 3.0), 0.5).with_color([1, 2, 3]);
        let view = ParticleView::from(&p);
        assert_eq!(view.position, [1.0, 2.0, 3.0]);
        assert_eq!(view.color, [1, 2, 3]);
    }

    #[test]
    fn nothing_before_first_publish() {
        let (_, reader) = channel();
        assert!(!reader.is_ready());
        assert!(reader.try_latest().is_none());
        assert_eq!(reader.latest_frame(), None);
    }

    #[test]
    fn readers_see_complete_copies() {
        let mut domain = domain();
        let (mut publisher, reader) = channel();

        publisher.publish(&domain);
        let first = reader.try_latest().unwrap();
        assert!(reader.is_ready());
        assert_eq!(first.frame, 0);
        assert_eq!(first.len(), 50);
        assert_eq!(first.particles[7], ParticleView::from(&domain.particles()[7]));

        domain.tick().unwrap();
        publisher.publish(&domain);

        // The held snapshot is a copy and is not overwritten by the next publication.
        assert_eq!(first.frame, 0);
        assert_eq!(reader.latest_frame(), Some(1));
        assert_eq!(reader.try_latest().unwrap().frame, 1);
    }

    #[test]
    fn newer_than_skips_seen_frames() {
        let mut domain = domain();
        let (mut publisher, reader) = channel();
        publisher.publish(&domain);

        let seen = reader.try_newer_than(0);
        assert!(seen.is_none());

        domain.tick().unwrap();
        publisher.publish(&domain);
        let next = reader.try_newer_than(0).unwrap();
        assert_eq!(next.frame, 1);
        assert!(reader.try_newer_than(1).is_none());
    }

    #[test]
    fn spare_buffer_is_recycled_when_unused() {
        let mut domain = domain();
        let (mut publisher, reader) = channel();

        publisher.publish(&domain);
        domain.tick().unwrap();
        publisher.publish(&domain);
        assert!(publisher.spare.is_some());

        domain.tick().unwrap();
        publisher.publish(&domain);
        let latest = reader.try_latest().unwrap();
        assert_eq!(latest.frame, 2);
        assert_eq!(latest.len(), 50);
    }

    #[test]
    fn concurrent_readers_only_see_whole_frames() {
        let mut domain = domain();
        let (mut publisher, reader) = channel();
        publisher.publish(&domain);

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let reader = reader.clone();
                std::thread::spawn(move || {
                    let mut last = 0;
                    for _ in 0..200 {
                        if let Some(snapshot) = reader.try_latest() {
                            assert_eq!(snapshot.len(), 50);
                            assert!(snapshot.frame >= last);
                            last = snapshot.frame;
                        }
                    }
                })
            })
            .collect();

        for _ in 0..20 {
            domain.tick().unwrap();
            publisher.publish(&domain);
        }

        for handle in readers {
            handle.join().unwrap();
        }
        assert_eq!(reader.latest_frame(), Some(20));
    }
}
