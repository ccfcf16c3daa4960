use crate::{
    config::Config,
    domain::Domain,
    error::{Error, Result},
    snapshot::{self, SnapshotPublisher, SnapshotReader},
};
use flume::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::{
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

/// Average frame time over one reporting window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameReport {
    /// Number of frames in the window.
    pub frames: u32,
    /// Mean wall-clock time of a frame.
    pub average: Duration,
    /// Wall-clock time of the slowest frame.
    pub slowest: Duration,
    /// Wall-clock budget of a frame.
    pub budget: Duration,
}

impl FrameReport {
    /// Returns `true` if any frame of the window took longer than the budget.
    #[inline]
    pub fn running_slow(&self) -> bool {
        self.slowest > self.budget
    }

    /// Logs the average frame time, and a warning when running slow.
    pub fn log(&self) {
        log::info!(
            "average time per frame: {:.6} s over {} frames",
            self.average.as_secs_f64(),
            self.frames
        );
        if self.running_slow() {
            log::warn!(
                "running slow: slowest frame took {:.6} s for a budget of {:.6} s",
                self.slowest.as_secs_f64(),
                self.budget.as_secs_f64()
            );
        }
    }
}

/// Accumulates frame times and reports their average every `window` frames.
#[derive(Clone, Debug)]
pub struct FrameStats {
    window: u32,
    budget: Duration,
    frames: u32,
    elapsed: Duration,
    slowest: Duration,
}

impl FrameStats {
    /// Creates a new [`FrameStats`] reporting every `window` frames.
    #[inline]
    pub fn new(window: u32, budget: Duration) -> Self {
        Self {
            window: window.max(1),
            budget,
            frames: 0,
            elapsed: Duration::ZERO,
            slowest: Duration::ZERO,
        }
    }

    /// Creates a new [`FrameStats`] reporting once per second of simulated frames.
    #[inline]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.fps, config.frame_duration())
    }

    /// Records the duration of a frame, returning a report when the window is complete.
    pub fn record(&mut self, elapsed: Duration) -> Option<FrameReport> {
        self.frames += 1;
        self.elapsed += elapsed;
        self.slowest = self.slowest.max(elapsed);

        if self.frames < self.window {
            return None;
        }

        let report = FrameReport {
            frames: self.frames,
            average: self.elapsed / self.frames,
            slowest: self.slowest,
            budget: self.budget,
        };
        self.frames = 0;
        self.elapsed = Duration::ZERO;
        self.slowest = Duration::ZERO;

        Some(report)
    }
}

/// A [`Domain`] driven frame by frame, publishing a snapshot after every tick.
#[derive(Debug)]
pub struct Simulation {
    domain: Domain,
    publisher: SnapshotPublisher,
    stats: FrameStats,
}

impl Simulation {
    /// Creates a new [`Simulation`] of the domain and a reader of its snapshots.
    pub fn new(domain: Domain) -> (Self, SnapshotReader) {
        let (publisher, reader) = snapshot::channel();
        let stats = FrameStats::from_config(domain.config());
        (
            Self {
                domain,
                publisher,
                stats,
            },
            reader,
        )
    }

    /// Builds a domain from the configuration and runs it on a dedicated thread.
    ///
    /// Configuration and allocation errors are returned here, before the thread starts.
    pub fn spawn(config: Config) -> Result<SimulationHandle> {
        Self::spawn_domain(Domain::new(config)?)
    }

    /// Runs the domain on a dedicated thread.
    pub fn spawn_domain(domain: Domain) -> Result<SimulationHandle> {
        let (simulation, reader) = Self::new(domain);
        let (stop, stopped) = flume::bounded(1);

        let thread = thread::Builder::new()
            .name("chunksim".into())
            .spawn(move || simulation.run(stopped))?;

        Ok(SimulationHandle {
            reader,
            stop,
            thread: Some(thread),
        })
    }

    /// Returns the simulated domain.
    #[inline]
    pub const fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Ticks the domain once, publishes the result and returns the time it took.
    pub fn frame(&mut self) -> Result<Duration> {
        let start = Instant::now();

        if let Err(e) = self.domain.tick() {
            log::error!("frame {} failed: {e}", self.domain.frame() + 1);
            return Err(e);
        }
        self.publisher.publish(&self.domain);

        let elapsed = start.elapsed();
        if let Some(report) = self.stats.record(elapsed) {
            report.log();
        }

        Ok(elapsed)
    }

    /// Runs frames at the configured rate until a stop signal arrives or the sender is dropped.
    ///
    /// The initial state is published before the first tick. The signal is checked between
    /// frames, and a frame that fails ends the run with its error.
    pub fn run(mut self, stop: Receiver<()>) -> Result<()> {
        let budget = self.domain.config().frame_duration();
        log::info!(
            "simulation started: {} particles, {} sub-steps per frame at {} fps",
            self.domain.particles().len(),
            self.domain.config().subsampling,
            self.domain.config().fps
        );

        self.publisher.publish(&self.domain);

        loop {
            if !matches!(stop.try_recv(), Err(TryRecvError::Empty)) {
                break;
            }

            let elapsed = self.frame()?;

            match stop.recv_timeout(budget.saturating_sub(elapsed)) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        log::info!("simulation stopped after {} frames", self.domain.frame());
        Ok(())
    }
}

/// Handle to a simulation running on its own thread.
///
/// Dropping the handle stops the simulation and waits for its thread.
#[derive(Debug)]
pub struct SimulationHandle {
    reader: SnapshotReader,
    stop: Sender<()>,
    thread: Option<JoinHandle<Result<()>>>,
}

impl SimulationHandle {
    /// Returns the reader of the published snapshots.
    #[inline]
    pub fn reader(&self) -> &SnapshotReader {
        &self.reader
    }

    /// Returns `true` while the simulation thread is running.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    /// Asks the simulation to stop after the current frame without waiting for it.
    ///
    /// Fails with [`Error::Disconnected`] if the simulation already ended.
    pub fn request_stop(&self) -> Result<()> {
        match self.stop.try_send(()) {
            Ok(()) | Err(flume::TrySendError::Full(())) => Ok(()),
            Err(flume::TrySendError::Disconnected(())) => Err(Error::Disconnected),
        }
    }

    /// Stops the simulation and waits for its thread, returning the error that ended it, if any.
    pub fn stop(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };

        // A disconnected channel means the loop already returned.
        let _ = self.stop.try_send(());
        thread.join().map_err(|_| Error::ThreadPanicked)?
    }
}

impl Drop for SimulationHandle {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::error!("simulation ended with an error: {e}");
        }
    }
}
