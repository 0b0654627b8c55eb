use std::any::Any;
use std::cell::Cell;
use std::panic::catch_unwind;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::napi;
use crate::Env;

/// Payload handed to a [`Listener`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickEvent {
  pub name: String,
  pub value: u64,
}

/// Receives tick events on the loop thread
pub trait Listener {
  fn on_tick(
    &self,
    env: &Env,
    event: &TickEvent,
  ) -> napi::Result<()>;
}

impl<F> Listener for F
where
  F: Fn(&Env, &TickEvent) -> napi::Result<()>,
{
  fn on_tick(
    &self,
    env: &Env,
    event: &TickEvent,
  ) -> napi::Result<()> {
    self(env, event)
  }
}

/// Loop side of one bridge run
///
/// Runs only in response to a signal. Never blocks, and never lets a
/// listener failure escape into the loop.
pub struct Dispatcher {
  event_name: String,
  counter: Arc<AtomicU64>,
  last_delivered: Cell<u64>,
  listener: Box<dyn Listener>,
}

impl Dispatcher {
  pub fn new<L: 'static + Listener>(
    event_name: String,
    counter: Arc<AtomicU64>,
    listener: L,
  ) -> Self {
    Self {
      event_name,
      counter,
      last_delivered: Cell::new(0),
      listener: Box::new(listener),
    }
  }

  /// Deliver the current counter value if it moved since the last delivery.
  /// Returns the delivered value.
  pub fn dispatch(
    &self,
    env: &Env,
  ) -> Option<u64> {
    let value = self.counter.load(Ordering::Acquire);
    if value <= self.last_delivered.get() {
      return None;
    }
    self.last_delivered.set(value);

    let event = TickEvent {
      name: self.event_name.clone(),
      value,
    };
    match catch_unwind(AssertUnwindSafe(|| self.listener.on_tick(env, &event))) {
      Ok(Ok(())) => {}
      Ok(Err(error)) => {
        tracing::warn!(event = %event.name, value, error = %error, "listener failed");
      }
      Err(panic) => {
        tracing::error!(
          event = %event.name,
          value,
          panic = panic_message(panic.as_ref()),
          "listener panicked"
        );
      }
    }
    Some(value)
  }

  pub fn last_delivered(&self) -> u64 {
    self.last_delivered.get()
  }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
  if let Some(message) = panic.downcast_ref::<&str>() {
    message
  } else if let Some(message) = panic.downcast_ref::<String>() {
    message
  } else {
    "unknown panic"
  }
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;
  use std::rc::Rc;

  use super::*;
  use crate::EventLoop;

  #[test]
  fn delivers_only_values_that_advanced() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();
    let counter = Arc::new(AtomicU64::new(0));
    let seen = Rc::new(RefCell::new(Vec::new()));

    let dispatcher = Dispatcher::new("counterTick".to_string(), counter.clone(), {
      let seen = seen.clone();
      move |_env: &Env, event: &TickEvent| -> napi::Result<()> {
        seen.borrow_mut().push(event.clone());
        Ok(())
      }
    });

    assert_eq!(dispatcher.dispatch(&env), None);
    counter.store(3, Ordering::Release);
    assert_eq!(dispatcher.dispatch(&env), Some(3));
    assert_eq!(dispatcher.dispatch(&env), None);

    assert_eq!(
      *seen.borrow(),
      vec![TickEvent {
        name: "counterTick".to_string(),
        value: 3
      }]
    );
  }

  #[test]
  fn listener_failures_stay_inside_the_dispatcher() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();
    let counter = Arc::new(AtomicU64::new(0));

    let failing = Dispatcher::new("tick".to_string(), counter.clone(), |_env: &Env, _event: &TickEvent| -> napi::Result<()> {
      Err(napi::Error::from_reason("listener error"))
    });
    let panicking = Dispatcher::new("tick".to_string(), counter.clone(), |_env: &Env, _event: &TickEvent| -> napi::Result<()> {
      panic!("listener panic")
    });

    counter.store(1, Ordering::Release);
    assert_eq!(failing.dispatch(&env), Some(1));
    assert_eq!(panicking.dispatch(&env), Some(1));

    counter.store(2, Ordering::Release);
    assert_eq!(panicking.dispatch(&env), Some(2));
    assert_eq!(panicking.last_delivered(), 2);
  }
}
