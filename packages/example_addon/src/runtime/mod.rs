//! Single threaded host runtime
//!
//! An [`EventLoop`] owns one [`Env`](crate::Env) and runs everything that
//! touches scripting values: timers, async handle callbacks, local futures,
//! closures sent from other threads through a [`LoopHandle`], and the
//! microtask queue drained after each of them.
mod async_handle;
mod console;
mod event_loop;
mod handle;
mod task;
mod timer;

pub use self::async_handle::AsyncHandle;
pub use self::async_handle::AsyncSender;
pub use self::console::*;
pub use self::event_loop::EventLoop;
pub(crate) use self::event_loop::LoopState;
pub use self::handle::LoopHandle;
pub use self::timer::TimerId;

use crate::Env;

pub(crate) enum LoopEvent {
  /// An async handle was signalled
  Async(u64),
  /// A local task's waker fired
  Wake(u64),
  Exec {
    callback: Box<dyn Send + FnOnce(&Env) -> crate::Result<()>>,
  },
}
