use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use super::NotifierSignal;

/// Periodic work on a dedicated thread
///
/// Each iteration sleeps one interval, checks the running flag, bumps the
/// counter and signals the notifier. Stopping is not preemptive: the flag is
/// only observed after the current sleep.
pub struct WorkerTask {
  interval: Duration,
  running: Arc<AtomicBool>,
  counter: Arc<AtomicU64>,
  signal: NotifierSignal,
}

impl WorkerTask {
  pub fn new(
    interval: Duration,
    running: Arc<AtomicBool>,
    counter: Arc<AtomicU64>,
    signal: NotifierSignal,
  ) -> Self {
    Self {
      interval,
      running,
      counter,
      signal,
    }
  }

  /// Start the loop on a named thread. The thread returns the last counter
  /// value it reached.
  pub fn spawn(
    self,
    name: &str,
  ) -> crate::Result<JoinHandle<u64>> {
    thread::Builder::new()
      .name(name.to_string())
      .spawn(move || self.run())
      .map_err(|error| crate::Error::Resource(format!("cannot spawn worker thread: {}", error)))
  }

  fn run(self) -> u64 {
    tracing::debug!(interval_ms = self.interval.as_millis() as u64, "worker thread started");

    loop {
      thread::sleep(self.interval);
      if !self.running.load(Ordering::Acquire) {
        break;
      }

      let value = self.counter.fetch_add(1, Ordering::AcqRel) + 1;
      tracing::trace!(value, "tick");

      if let Err(error) = self.signal.signal() {
        tracing::debug!(error = %error, "notifier gone, worker exiting");
        break;
      }
    }

    let last = self.counter.load(Ordering::Acquire);
    tracing::debug!(last, "worker thread ended");
    last
  }
}
