use std::cell::RefCell;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::JoinHandle;

use super::Dispatcher;
use super::Listener;
use super::Notifier;
use super::WorkerTask;
use crate::napi::WeakEnv;
use crate::Env;
use crate::TickerOptions;

const WORKER_THREAD_NAME: &str = "example-addon-ticker";

enum BridgeState {
  Idle,
  Running(ActiveRun),
}

struct ActiveRun {
  running: Arc<AtomicBool>,
  counter: Arc<AtomicU64>,
  notifier: Notifier,
  worker: JoinHandle<u64>,
}

/// Lifecycle of the background-worker notification bridge
///
/// `Idle -> Running -> Idle`. Each run gets a fresh counter, running flag,
/// notifier and worker thread; none of them outlive the matching `stop`.
/// Must be used on the loop thread of the [`Env`] it was created for.
pub struct TickBridge {
  env: WeakEnv,
  options: TickerOptions,
  state: RefCell<BridgeState>,
}

impl TickBridge {
  pub fn new(
    env: &Env,
    options: TickerOptions,
  ) -> crate::Result<Self> {
    options.validate()?;
    Ok(Self {
      env: env.downgrade(),
      options,
      state: RefCell::new(BridgeState::Idle),
    })
  }

  pub fn options(&self) -> &TickerOptions {
    &self.options
  }

  /// Arm the notifier and spawn the worker. `listener` receives every
  /// delivered tick of this run.
  pub fn start<L: 'static + Listener>(
    &self,
    listener: L,
  ) -> crate::Result<()> {
    if self.is_running() {
      return Err(crate::Error::AlreadyRunning);
    }
    let env = self
      .env
      .upgrade()
      .ok_or_else(|| crate::Error::Resource("the event loop is gone".to_string()))?;

    let counter = Arc::new(AtomicU64::new(0));
    let running = Arc::new(AtomicBool::new(true));

    let dispatcher = Dispatcher::new(self.options.event_name.clone(), counter.clone(), listener);
    let mut notifier = Notifier::arm(&env, move |env| {
      dispatcher.dispatch(env);
    })?;

    let worker = notifier.signaller().and_then(|signal| {
      WorkerTask::new(
        self.options.interval,
        running.clone(),
        counter.clone(),
        signal,
      )
      .spawn(WORKER_THREAD_NAME)
    });
    let worker = match worker {
      Ok(worker) => worker,
      Err(error) => {
        notifier.disarm();
        return Err(error);
      }
    };

    tracing::debug!(
      event = %self.options.event_name,
      interval_ms = self.options.interval.as_millis() as u64,
      "bridge started"
    );
    *self.state.borrow_mut() = BridgeState::Running(ActiveRun {
      running,
      counter,
      notifier,
      worker,
    });
    Ok(())
  }

  /// Clear the running flag, join the worker, then disarm the notifier.
  /// Blocks for at most one interval.
  pub fn stop(&self) -> crate::Result<()> {
    let previous = std::mem::replace(&mut *self.state.borrow_mut(), BridgeState::Idle);
    let ActiveRun {
      running,
      mut notifier,
      worker,
      ..
    } = match previous {
      BridgeState::Idle => return Err(crate::Error::NotRunning),
      BridgeState::Running(run) => run,
    };

    running.store(false, Ordering::Release);
    let joined = worker.join();
    notifier.disarm();

    match joined {
      Ok(last) => {
        tracing::debug!(ticks = last, "bridge stopped");
        Ok(())
      }
      Err(_) => {
        tracing::error!("worker thread panicked");
        Err(crate::Error::WorkerPanicked)
      }
    }
  }

  pub fn is_running(&self) -> bool {
    matches!(*self.state.borrow(), BridgeState::Running(_))
  }

  /// Counter of the current run, `None` when idle
  pub fn current_value(&self) -> Option<u64> {
    match &*self.state.borrow() {
      BridgeState::Running(run) => Some(run.counter.load(Ordering::Acquire)),
      BridgeState::Idle => None,
    }
  }
}

impl Drop for TickBridge {
  fn drop(&mut self) {
    if self.is_running() {
      if let Err(error) = self.stop() {
        tracing::warn!(error = %error, "failed to stop bridge on drop");
      }
    }
  }
}
