use std::future::Future;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::task::Context;
use std::task::Poll;

use futures::task::waker;
use futures::task::ArcWake;
use futures::FutureExt;

use super::event_loop::report_uncaught;
use super::LoopEvent;
use crate::napi;
use crate::napi::JsPromise;
use crate::napi::NapiValue;
use crate::Env;

struct TaskWaker {
  id: u64,
  tx: Mutex<Sender<LoopEvent>>,
  loop_closed: Arc<AtomicBool>,
}

impl ArcWake for TaskWaker {
  fn wake_by_ref(arc_self: &Arc<Self>) {
    if arc_self.loop_closed.load(Ordering::Acquire) {
      return;
    }
    let tx = arc_self.tx.lock().unwrap_or_else(PoisonError::into_inner);
    tx.send(LoopEvent::Wake(arc_self.id)).ok();
  }
}

pub(crate) fn poll_task(
  env: &Env,
  id: u64,
) {
  let Some(mut future) = env.0.tasks.borrow_mut().remove(&id) else {
    return;
  };

  let waker = waker(Arc::new(TaskWaker {
    id,
    tx: Mutex::new(env.0.tx.clone()),
    loop_closed: env.0.closed.clone(),
  }));
  let mut cx = Context::from_waker(&waker);

  match future.as_mut().poll(&mut cx) {
    Poll::Ready(()) => {}
    Poll::Pending => {
      env.0.tasks.borrow_mut().insert(id, future);
    }
  }
}

impl Env {
  /// Run a future on the loop thread. Errors it returns are logged.
  pub fn spawn_local<Fut>(
    &self,
    future: Fut,
  ) -> napi::Result<()>
  where
    Fut: 'static + Future<Output = napi::Result<()>>,
  {
    self.ensure_open()?;
    let id = self.0.next_id();
    let future = async move {
      if let Err(error) = future.await {
        report_uncaught("local task", &error);
      };
    };
    self.0.tasks.borrow_mut().insert(id, future.boxed_local());
    poll_task(self, id);
    Ok(())
  }

  /// Run a future on the loop thread and settle a promise with its output
  pub fn spawn_local_promise<R, Fut>(
    &self,
    future: Fut,
  ) -> napi::Result<JsPromise>
  where
    R: 'static + NapiValue,
    Fut: 'static + Future<Output = napi::Result<R>>,
  {
    let (deferred, promise) = self.create_promise()?;
    self.spawn_local(async move {
      match future.await {
        Ok(result) => deferred.resolve(result),
        Err(error) => deferred.reject(error),
      };
      Ok(())
    })?;
    Ok(promise)
  }
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;
  use std::rc::Rc;
  use std::time::Duration;

  use futures::channel::oneshot;

  use super::*;
  use crate::napi::JsUnknown;
  use crate::napi::Settled;
  use crate::EventLoop;

  #[test]
  fn tasks_resume_when_woken_from_another_thread() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();
    let result = Rc::new(Cell::new(0));

    let (tx, rx) = oneshot::channel::<u32>();
    env
      .spawn_local({
        let result = result.clone();
        async move {
          let value = rx.await.map_err(|_| napi::Error::from_reason("canceled"))?;
          result.set(value);
          Ok(())
        }
      })
      .unwrap();

    std::thread::spawn(move || {
      std::thread::sleep(Duration::from_millis(10));
      tx.send(41).ok();
    });

    event_loop.run().unwrap();
    assert_eq!(result.get(), 41);
  }

  #[test]
  fn promises_settle_from_task_output() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();

    let resolved = env.spawn_local_promise(async { Ok(2.5) }).unwrap();
    let rejected = env
      .spawn_local_promise(async { Err::<JsUnknown, _>(napi::Error::from_reason("no")) })
      .unwrap();
    event_loop.run().unwrap();

    match resolved.settled() {
      Some(Settled::Fulfilled(JsUnknown::Number(value))) => assert_eq!(value, 2.5),
      other => panic!("unexpected {:?}", other),
    }
    assert!(!rejected.settled().unwrap().is_fulfilled());
  }
}
