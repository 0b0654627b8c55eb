use std::cell::Cell;
use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::mpsc::channel;
use std::sync::mpsc::Receiver;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::ThreadId;
use std::time::Duration;
use std::time::Instant;

use futures::future::LocalBoxFuture;

use super::async_handle;
use super::async_handle::AsyncEntry;
use super::task;
use super::timer;
use super::timer::TimerQueue;
use super::Console;
use super::LoopEvent;
use super::LoopHandle;
use super::StdoutConsole;
use crate::napi;
use crate::napi::JsObject;
use crate::napi::Status;
use crate::Env;

type Microtask = Box<dyn FnOnce(&Env)>;

pub(crate) struct LoopState {
  pub(crate) tx: Sender<LoopEvent>,
  rx: Receiver<LoopEvent>,
  pub(crate) closed: Arc<AtomicBool>,
  pub(crate) thread: ThreadId,
  running: Cell<bool>,
  next_id: Cell<u64>,
  pub(crate) timers: RefCell<TimerQueue>,
  pub(crate) async_handles: RefCell<HashMap<u64, AsyncEntry>>,
  pub(crate) tasks: RefCell<HashMap<u64, LocalBoxFuture<'static, ()>>>,
  microtasks: RefCell<VecDeque<Microtask>>,
  pub(crate) modules: RefCell<HashMap<String, JsObject>>,
  pub(crate) global: RefCell<Option<JsObject>>,
  pub(crate) console: Rc<dyn Console>,
}

impl LoopState {
  pub(crate) fn next_id(&self) -> u64 {
    let id = self.next_id.get();
    self.next_id.set(id + 1);
    id
  }

  /// Anything left that could still produce work
  fn is_alive(&self) -> bool {
    !self.microtasks.borrow().is_empty()
      || !self.timers.borrow().is_empty()
      || !self.async_handles.borrow().is_empty()
      || !self.tasks.borrow().is_empty()
  }
}

pub(crate) fn report_uncaught(
  source: &str,
  error: &napi::Error,
) {
  tracing::error!(source, error = %error, "uncaught error");
}

impl Env {
  /// Queue a closure to run after the current macrotask, before any other
  /// timer or event is processed
  pub fn queue_microtask<F>(
    &self,
    task: F,
  ) where
    F: 'static + FnOnce(&Env),
  {
    self.0.microtasks.borrow_mut().push_back(Box::new(task));
  }

  pub(crate) fn drain_microtasks(&self) {
    loop {
      let task = self.0.microtasks.borrow_mut().pop_front();
      match task {
        Some(task) => task(self),
        None => break,
      }
    }
  }

  pub fn loop_handle(&self) -> LoopHandle {
    LoopHandle::new(self.0.tx.clone(), self.0.closed.clone(), self.0.thread)
  }

  pub(crate) fn ensure_open(&self) -> napi::Result<()> {
    if self.0.closed.load(Ordering::Acquire) {
      return Err(napi::Error::new(Status::Closing, "The event loop is closed"));
    }
    Ok(())
  }
}

/// The controller thread
///
/// `EventLoop` is not `Send`: create it on the thread that will drive it and
/// use [`LoopHandle`] to reach it from elsewhere.
pub struct EventLoop {
  env: Env,
}

struct RunGuard<'a>(&'a Cell<bool>);

impl Drop for RunGuard<'_> {
  fn drop(&mut self) {
    self.0.set(false);
  }
}

impl Default for EventLoop {
  fn default() -> Self {
    Self::new()
  }
}

impl EventLoop {
  pub fn new() -> Self {
    Self::with_console(StdoutConsole)
  }

  pub fn with_console<C: 'static + Console>(console: C) -> Self {
    let (tx, rx) = channel();
    let state = LoopState {
      tx,
      rx,
      closed: Arc::new(AtomicBool::new(false)),
      thread: std::thread::current().id(),
      running: Cell::new(false),
      next_id: Cell::new(1),
      timers: Default::default(),
      async_handles: Default::default(),
      tasks: Default::default(),
      microtasks: Default::default(),
      modules: Default::default(),
      global: Default::default(),
      console: Rc::new(console),
    };
    Self {
      env: Env(Rc::new(state)),
    }
  }

  pub fn env(&self) -> Env {
    self.env.clone()
  }

  pub fn handle(&self) -> LoopHandle {
    self.env.loop_handle()
  }

  /// Run until nothing keeps the loop alive: no timers, no open async
  /// handles, no pending local tasks and no queued microtasks
  pub fn run(&self) -> crate::Result<()> {
    let _guard = self.enter()?;
    loop {
      self.run_ready();
      if !self.env.0.is_alive() {
        return Ok(());
      }
      let deadline = self.env.0.timers.borrow_mut().next_deadline();
      self.wait(deadline);
    }
  }

  /// Run until `duration` has elapsed, whether or not there is work left
  pub fn run_for(
    &self,
    duration: Duration,
  ) -> crate::Result<()> {
    let _guard = self.enter()?;
    let until = Instant::now() + duration;
    loop {
      self.run_ready();
      if Instant::now() >= until {
        return Ok(());
      }
      let deadline = match self.env.0.timers.borrow_mut().next_deadline() {
        Some(deadline) => deadline.min(until),
        None => until,
      };
      self.wait(Some(deadline));
    }
  }

  /// Process what is ready right now without blocking
  pub fn run_pending(&self) -> crate::Result<()> {
    let _guard = self.enter()?;
    self.run_ready();
    Ok(())
  }

  fn enter(&self) -> crate::Result<RunGuard<'_>> {
    if self.env.0.running.replace(true) {
      return Err(crate::Error::Napi(napi::Error::new(
        Status::GenericFailure,
        "The event loop is already running",
      )));
    }
    Ok(RunGuard(&self.env.0.running))
  }

  fn run_ready(&self) {
    self.env.drain_microtasks();
    timer::run_due_timers(&self.env);
    while let Ok(event) = self.env.0.rx.try_recv() {
      self.dispatch(event);
    }
  }

  fn wait(
    &self,
    deadline: Option<Instant>,
  ) {
    let event = match deadline {
      Some(deadline) => {
        let timeout = deadline.saturating_duration_since(Instant::now());
        self.env.0.rx.recv_timeout(timeout).ok()
      }
      None => self.env.0.rx.recv().ok(),
    };
    if let Some(event) = event {
      self.dispatch(event);
    }
  }

  fn dispatch(
    &self,
    event: LoopEvent,
  ) {
    match event {
      LoopEvent::Async(id) => async_handle::dispatch(&self.env, id),
      LoopEvent::Wake(id) => task::poll_task(&self.env, id),
      LoopEvent::Exec { callback } => {
        if let Err(error) = callback(&self.env) {
          report_uncaught("exec", &error.into());
        }
      }
    }
    self.env.drain_microtasks();
  }
}

impl Drop for EventLoop {
  fn drop(&mut self) {
    let state = &self.env.0;
    state.closed.store(true, Ordering::Release);

    let handles = std::mem::take(&mut *state.async_handles.borrow_mut());
    for entry in handles.values() {
      entry.close();
    }
    drop(handles);

    let timers = std::mem::take(&mut *state.timers.borrow_mut());
    drop(timers);
    let tasks = std::mem::take(&mut *state.tasks.borrow_mut());
    drop(tasks);
    let microtasks = std::mem::take(&mut *state.microtasks.borrow_mut());
    drop(microtasks);
    let modules = std::mem::take(&mut *state.modules.borrow_mut());
    drop(modules);
    let global = state.global.borrow_mut().take();
    drop(global);

    tracing::trace!("event loop closed");
  }
}
