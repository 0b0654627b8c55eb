use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use super::event_loop::report_uncaught;
use super::LoopEvent;
use crate::napi;
use crate::napi::Status;
use crate::napi::WeakEnv;
use crate::Env;

type AsyncCallback = Box<dyn FnMut(&Env) -> napi::Result<()>>;

struct AsyncShared {
  id: u64,
  /// Set by the first `send` after a dispatch, cleared by the loop right
  /// before it runs the callback
  pending: AtomicBool,
  closed: AtomicBool,
}

pub(crate) struct AsyncEntry {
  shared: Arc<AsyncShared>,
  /// Taken out while the callback runs
  callback: Option<AsyncCallback>,
}

impl AsyncEntry {
  pub(crate) fn close(&self) {
    self.shared.closed.store(true, Ordering::Release);
  }
}

/// Wakes the loop from any thread, the way `uv_async_t` does
///
/// Sends that land before the loop gets around to the handle collapse into
/// a single callback run. The handle keeps the loop alive until it is
/// closed or dropped.
pub struct AsyncHandle {
  env: WeakEnv,
  sender: AsyncSender,
}

/// The `Send` half of an [`AsyncHandle`]
#[derive(Clone)]
pub struct AsyncSender {
  shared: Arc<AsyncShared>,
  tx: Sender<LoopEvent>,
  loop_closed: Arc<AtomicBool>,
}

impl AsyncSender {
  pub fn send(&self) -> napi::Result<()> {
    if self.is_closed() {
      return Err(napi::Error::new(Status::Closing, "Async handle is closed"));
    }
    if self.shared.pending.swap(true, Ordering::AcqRel) {
      return Ok(());
    }
    self
      .tx
      .send(LoopEvent::Async(self.shared.id))
      .map_err(|_| napi::Error::new(Status::Closing, "The event loop is gone"))
  }

  pub fn is_closed(&self) -> bool {
    self.shared.closed.load(Ordering::Acquire) || self.loop_closed.load(Ordering::Acquire)
  }
}

impl AsyncHandle {
  pub fn sender(&self) -> AsyncSender {
    self.sender.clone()
  }

  pub fn send(&self) -> napi::Result<()> {
    self.sender.send()
  }

  pub fn is_closed(&self) -> bool {
    self.sender.is_closed()
  }

  /// Stop accepting sends and forget the callback. Idempotent.
  pub fn close(&self) {
    let shared = &self.sender.shared;
    if shared.closed.swap(true, Ordering::AcqRel) {
      return;
    }
    if let Some(env) = self.env.upgrade() {
      let entry = env.0.async_handles.borrow_mut().remove(&shared.id);
      drop(entry);
    }
  }
}

impl Drop for AsyncHandle {
  fn drop(&mut self) {
    self.close();
  }
}

pub(crate) fn dispatch(
  env: &Env,
  id: u64,
) {
  let taken = {
    let mut handles = env.0.async_handles.borrow_mut();
    match handles.get_mut(&id) {
      Some(entry) if !entry.shared.closed.load(Ordering::Acquire) => {
        entry.shared.pending.swap(false, Ordering::AcqRel);
        entry.callback.take()
      }
      _ => None,
    }
  };
  let Some(mut callback) = taken else {
    return;
  };

  if let Err(error) = callback(env) {
    report_uncaught("async handle", &error);
  }

  let unwanted = {
    let mut handles = env.0.async_handles.borrow_mut();
    match handles.get_mut(&id) {
      Some(entry) if !entry.shared.closed.load(Ordering::Acquire) => {
        entry.callback = Some(callback);
        None
      }
      _ => Some(callback),
    }
  };
  drop(unwanted);
}

impl Env {
  /// `uv_async_init`
  pub fn create_async_handle<F>(
    &self,
    callback: F,
  ) -> napi::Result<AsyncHandle>
  where
    F: 'static + FnMut(&Env) -> napi::Result<()>,
  {
    self.ensure_open()?;
    let shared = Arc::new(AsyncShared {
      id: self.0.next_id(),
      pending: AtomicBool::new(false),
      closed: AtomicBool::new(false),
    });
    self.0.async_handles.borrow_mut().insert(
      shared.id,
      AsyncEntry {
        shared: shared.clone(),
        callback: Some(Box::new(callback)),
      },
    );
    Ok(AsyncHandle {
      env: self.downgrade(),
      sender: AsyncSender {
        shared,
        tx: self.0.tx.clone(),
        loop_closed: self.0.closed.clone(),
      },
    })
  }
}
