use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::collections::HashMap;
use std::time::Duration;
use std::time::Instant;

use super::event_loop::report_uncaught;
use crate::napi;
use crate::Env;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

pub(crate) enum TimerCallback {
  Once(Box<dyn FnOnce(&Env) -> napi::Result<()>>),
  Repeat(Box<dyn FnMut(&Env) -> napi::Result<()>>),
}

struct TimerEntry {
  deadline: Instant,
  period: Option<Duration>,
  /// Empty while a repeating callback is running
  callback: Option<TimerCallback>,
}

#[derive(Default)]
pub(crate) struct TimerQueue {
  entries: HashMap<u64, TimerEntry>,
  queue: BinaryHeap<Reverse<(Instant, u64)>>,
}

impl TimerQueue {
  fn insert(
    &mut self,
    id: u64,
    deadline: Instant,
    period: Option<Duration>,
    callback: TimerCallback,
  ) {
    self.entries.insert(
      id,
      TimerEntry {
        deadline,
        period,
        callback: Some(callback),
      },
    );
    self.queue.push(Reverse((deadline, id)));
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Earliest deadline of a live timer
  pub(crate) fn next_deadline(&mut self) -> Option<Instant> {
    while let Some(Reverse((deadline, id))) = self.queue.peek().copied() {
      match self.entries.get(&id) {
        Some(entry) if entry.deadline == deadline && entry.callback.is_some() => {
          return Some(deadline)
        }
        _ => {
          self.queue.pop();
        }
      }
    }
    None
  }

  fn pop_due(
    &mut self,
    now: Instant,
  ) -> Option<(u64, TimerCallback)> {
    while let Some(Reverse((deadline, id))) = self.queue.peek().copied() {
      if deadline > now {
        return None;
      }
      self.queue.pop();

      let Some(entry) = self.entries.get_mut(&id) else {
        continue;
      };
      if entry.deadline != deadline {
        continue;
      }
      let Some(callback) = entry.callback.take() else {
        continue;
      };
      if entry.period.is_none() {
        self.entries.remove(&id);
      }
      return Some((id, callback));
    }
    None
  }

  /// Put a repeating callback back unless the timer was cleared while it ran.
  /// Returns the callback when it is no longer wanted.
  fn restore(
    &mut self,
    id: u64,
    callback: Box<dyn FnMut(&Env) -> napi::Result<()>>,
  ) -> Option<Box<dyn FnMut(&Env) -> napi::Result<()>>> {
    let Some(entry) = self.entries.get_mut(&id) else {
      return Some(callback);
    };
    let period = entry.period.unwrap_or(MIN_INTERVAL);
    entry.deadline = Instant::now() + period;
    entry.callback = Some(TimerCallback::Repeat(callback));
    self.queue.push(Reverse((entry.deadline, id)));
    None
  }

  fn remove(
    &mut self,
    id: u64,
  ) -> Option<TimerCallback> {
    self.entries.remove(&id).and_then(|entry| entry.callback)
  }
}

/// Fire every timer due at the time of the call. Timers scheduled by the
/// callbacks wait for the next round.
pub(crate) fn run_due_timers(env: &Env) -> bool {
  let now = Instant::now();
  let mut fired = false;
  loop {
    let due = env.0.timers.borrow_mut().pop_due(now);
    let Some((id, callback)) = due else {
      break;
    };
    fired = true;

    let result = match callback {
      TimerCallback::Once(callback) => callback(env),
      TimerCallback::Repeat(mut callback) => {
        let result = callback(env);
        let unwanted = env.0.timers.borrow_mut().restore(id, callback);
        drop(unwanted);
        result
      }
    };
    if let Err(error) = result {
      report_uncaught("timer", &error);
    }
    env.drain_microtasks();
  }
  fired
}

impl Env {
  /// `setTimeout`
  pub fn set_timeout<F>(
    &self,
    callback: F,
    delay: Duration,
  ) -> napi::Result<TimerId>
  where
    F: 'static + FnOnce(&Env) -> napi::Result<()>,
  {
    self.ensure_open()?;
    let id = self.0.next_id();
    self.0.timers.borrow_mut().insert(
      id,
      Instant::now() + delay,
      None,
      TimerCallback::Once(Box::new(callback)),
    );
    Ok(TimerId(id))
  }

  /// `setInterval`. Periods under a millisecond are raised to one.
  pub fn set_interval<F>(
    &self,
    callback: F,
    period: Duration,
  ) -> napi::Result<TimerId>
  where
    F: 'static + FnMut(&Env) -> napi::Result<()>,
  {
    self.ensure_open()?;
    let period = period.max(MIN_INTERVAL);
    let id = self.0.next_id();
    self.0.timers.borrow_mut().insert(
      id,
      Instant::now() + period,
      Some(period),
      TimerCallback::Repeat(Box::new(callback)),
    );
    Ok(TimerId(id))
  }

  /// Cancel a timeout or an interval. Returns `false` if it already fired or
  /// was cleared.
  pub fn clear_timeout(
    &self,
    id: TimerId,
  ) -> bool {
    let removed = self.0.timers.borrow_mut().entries.contains_key(&id.0);
    let callback = self.0.timers.borrow_mut().remove(id.0);
    drop(callback);
    removed
  }

  pub fn clear_interval(
    &self,
    id: TimerId,
  ) -> bool {
    self.clear_timeout(id)
  }
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;
  use std::rc::Rc;

  use super::*;
  use crate::EventLoop;

  #[test]
  fn cleared_timeouts_never_fire() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();
    let fired = Rc::new(Cell::new(false));

    let id = env
      .set_timeout(
        {
          let fired = fired.clone();
          move |_| {
            fired.set(true);
            Ok(())
          }
        },
        Duration::from_millis(5),
      )
      .unwrap();
    assert!(env.clear_timeout(id));
    assert!(!env.clear_timeout(id));

    event_loop.run().unwrap();
    assert!(!fired.get());
  }

  #[test]
  fn intervals_repeat_until_cleared_from_inside() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();
    let count = Rc::new(Cell::new(0));
    let id_cell = Rc::new(Cell::new(None));

    let id = env
      .set_interval(
        {
          let count = count.clone();
          let id_cell = id_cell.clone();
          move |env| {
            count.set(count.get() + 1);
            if count.get() == 3 {
              if let Some(id) = id_cell.get() {
                env.clear_interval(id);
              }
            }
            Ok(())
          }
        },
        Duration::from_millis(2),
      )
      .unwrap();
    id_cell.set(Some(id));

    event_loop.run().unwrap();
    assert_eq!(count.get(), 3);
  }

  #[test]
  fn timeouts_fire_in_deadline_order() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();
    let order = Rc::new(std::cell::RefCell::new(Vec::new()));

    for (label, delay) in [("late", 20), ("early", 5)] {
      let order = order.clone();
      env
        .set_timeout(
          move |_| {
            order.borrow_mut().push(label);
            Ok(())
          },
          Duration::from_millis(delay),
        )
        .unwrap();
    }

    event_loop.run().unwrap();
    assert_eq!(*order.borrow(), vec!["early", "late"]);
  }
}
