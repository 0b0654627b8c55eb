use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::mpsc::channel;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::ThreadId;

use super::LoopEvent;
use crate::napi;
use crate::napi::Status;
use crate::Env;

/// Reach an [`EventLoop`](crate::EventLoop) from other threads
#[derive(Clone)]
pub struct LoopHandle {
  tx: Sender<LoopEvent>,
  closed: Arc<AtomicBool>,
  thread: ThreadId,
}

fn closing() -> crate::Error {
  crate::Error::Napi(napi::Error::new(
    Status::Closing,
    "The event loop is closed",
  ))
}

impl LoopHandle {
  pub(crate) fn new(
    tx: Sender<LoopEvent>,
    closed: Arc<AtomicBool>,
    thread: ThreadId,
  ) -> Self {
    Self { tx, closed, thread }
  }

  pub fn is_closed(&self) -> bool {
    self.closed.load(Ordering::Acquire)
  }

  /// Queue `callback` on the loop thread without waiting for it
  pub fn exec_detached<F: 'static + Send + FnOnce(&Env) -> crate::Result<()>>(
    &self,
    callback: F,
  ) -> crate::Result<()> {
    if self.is_closed() {
      return Err(closing());
    }
    self
      .tx
      .send(LoopEvent::Exec {
        callback: Box::new(callback),
      })
      .map_err(|_| closing())
  }

  /// Run `callback` on the loop thread and wait for its result
  ///
  /// Fails instead of deadlocking when called from the loop thread itself.
  pub fn exec<R, F>(
    &self,
    callback: F,
  ) -> crate::Result<R>
  where
    R: 'static + Send,
    F: 'static + Send + FnOnce(&Env) -> crate::Result<R>,
  {
    if std::thread::current().id() == self.thread {
      return Err(crate::Error::Napi(napi::Error::new(
        Status::GenericFailure,
        "LoopHandle::exec cannot block the loop thread, use exec_detached",
      )));
    }

    let (tx, rx) = channel();
    self.exec_detached(move |env| {
      tx.send(callback(env)).ok();
      Ok(())
    })?;
    rx.recv().map_err(|_| closing())?
  }
}
