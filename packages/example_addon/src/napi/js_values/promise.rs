use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use futures::FutureExt;

use super::unexpected_type;
use super::JsObject;
use super::JsUnknown;
use super::NapiValue;
use super::ObjectKind;
use crate::napi::Env;
use crate::napi::Error;
use crate::napi::Result;
use crate::napi::Status;
use crate::napi::WeakEnv;

pub(crate) type Reaction = Box<dyn FnOnce(&Env, Settled)>;

pub(crate) enum PromiseState {
  Pending(Vec<Reaction>),
  Settled(Settled),
}

/// Final state of a promise
#[derive(Clone, Debug)]
pub enum Settled {
  Fulfilled(JsUnknown),
  Rejected(JsUnknown),
}

impl Settled {
  pub fn is_fulfilled(&self) -> bool {
    matches!(self, Settled::Fulfilled(_))
  }

  /// Rejections become [`Error`]s, reading `message` and `code` from
  /// rejected `Error` objects
  pub fn into_result(self) -> Result<JsUnknown> {
    match self {
      Settled::Fulfilled(value) => Ok(value),
      Settled::Rejected(reason) => Err(error_from_value(&reason)),
    }
  }
}

pub(crate) fn error_from_value(value: &JsUnknown) -> Error {
  match value {
    JsUnknown::Object(object) if object.is_error() => {
      let message = object
        .get_named_property::<String>("message")
        .unwrap_or_default();
      let status = object
        .get_named_property::<String>("code")
        .ok()
        .and_then(|code| Status::from_name(&code))
        .unwrap_or(Status::GenericFailure);
      Error::new(status, message)
    }
    other => Error::new(Status::GenericFailure, other.to_string()),
  }
}

#[derive(Clone, Debug)]
pub struct JsPromise(pub(crate) JsObject);

impl JsPromise {
  pub fn is_pending(&self) -> bool {
    matches!(
      self.0 .0.borrow().kind,
      ObjectKind::Promise(PromiseState::Pending(_))
    )
  }

  pub fn settled(&self) -> Option<Settled> {
    match &self.0 .0.borrow().kind {
      ObjectKind::Promise(PromiseState::Settled(outcome)) => Some(outcome.clone()),
      _ => None,
    }
  }

  /// Register a reaction. It runs as a microtask once the promise settles,
  /// never synchronously.
  pub fn then<F>(
    &self,
    reaction: F,
  ) -> Result<()>
  where
    F: 'static + FnOnce(&Env, Settled),
  {
    let env = self.0.env()?;
    let outcome = {
      let mut data = self.0 .0.borrow_mut();
      match &mut data.kind {
        ObjectKind::Promise(PromiseState::Pending(reactions)) => {
          reactions.push(Box::new(reaction));
          return Ok(());
        }
        ObjectKind::Promise(PromiseState::Settled(outcome)) => outcome.clone(),
        _ => return Err(Error::from_status(Status::ObjectExpected)),
      }
    };
    env.queue_microtask(move |env| reaction(env, outcome));
    Ok(())
  }

  /// Await the promise from a local task
  pub fn into_future(self) -> LocalBoxFuture<'static, Result<JsUnknown>> {
    let (tx, rx) = oneshot::channel();
    let registered = self.then(move |_env, outcome| {
      let _ = tx.send(outcome.into_result());
    });
    async move {
      registered?;
      rx.await.map_err(|_| {
        Error::new(
          Status::Closing,
          "The promise was dropped before it settled",
        )
      })?
    }
    .boxed_local()
  }

  pub(crate) fn settle(
    &self,
    env: &Env,
    outcome: Settled,
  ) {
    let reactions = {
      let mut data = self.0 .0.borrow_mut();
      match &mut data.kind {
        ObjectKind::Promise(state) => match state {
          PromiseState::Pending(reactions) => {
            let reactions = std::mem::take(reactions);
            *state = PromiseState::Settled(outcome.clone());
            reactions
          }
          PromiseState::Settled(_) => return,
        },
        _ => return,
      }
    };

    if reactions.is_empty() {
      if let Settled::Rejected(reason) = &outcome {
        tracing::debug!(reason = %reason, "promise rejected with no reaction registered yet");
      }
    }

    for reaction in reactions {
      let outcome = outcome.clone();
      env.queue_microtask(move |env| reaction(env, outcome));
    }
  }

  pub fn as_object(&self) -> &JsObject {
    &self.0
  }

  pub fn into_object(self) -> JsObject {
    self.0
  }
}

impl NapiValue for JsPromise {
  fn type_name() -> &'static str {
    "Promise"
  }

  fn into_unknown(self) -> JsUnknown {
    JsUnknown::Object(self.0)
  }

  fn from_unknown(value: JsUnknown) -> Result<Self> {
    match value {
      JsUnknown::Object(object) if object.is_promise() => Ok(JsPromise(object)),
      other => Err(unexpected_type(Status::ObjectExpected, "Promise", &other)),
    }
  }
}

/// The settling half of a promise created by [`Env::create_promise`]
pub struct Deferred {
  env: WeakEnv,
  promise: JsPromise,
}

impl Deferred {
  pub fn promise(&self) -> JsPromise {
    self.promise.clone()
  }

  /// Fulfill the promise. Resolving with another promise adopts its state.
  pub fn resolve<V: NapiValue>(
    self,
    value: V,
  ) {
    let Some(env) = self.env.upgrade() else {
      return;
    };
    let value = value.into_unknown();

    let inner = match &value {
      JsUnknown::Object(object) if object.is_promise() => Some(JsPromise(object.clone())),
      _ => None,
    };

    match inner {
      Some(inner) if inner.0.ptr_eq(&self.promise.0) => {
        let error = Error::new(
          Status::GenericFailure,
          "Chaining cycle detected for promise",
        );
        self.reject(error);
      }
      Some(inner) => {
        let promise = self.promise;
        let adopted = inner.then(move |env, outcome| promise.settle(env, outcome));
        if let Err(error) = adopted {
          tracing::error!(error = %error, "failed to adopt promise state");
        }
      }
      None => self.promise.settle(&env, Settled::Fulfilled(value)),
    }
  }

  pub fn reject(
    self,
    error: Error,
  ) {
    let Some(env) = self.env.upgrade() else {
      return;
    };
    match env.create_error(error) {
      Ok(reason) => self.promise.settle(&env, Settled::Rejected(reason.into_unknown())),
      Err(error) => tracing::error!(error = %error, "failed to create rejection reason"),
    }
  }

  pub fn reject_with_value<V: NapiValue>(
    self,
    value: V,
  ) {
    let Some(env) = self.env.upgrade() else {
      return;
    };
    self.promise.settle(&env, Settled::Rejected(value.into_unknown()));
  }
}

impl Env {
  pub fn create_promise(&self) -> Result<(Deferred, JsPromise)> {
    let promise = JsPromise(self.new_object(
      ObjectKind::Promise(PromiseState::Pending(Vec::new())),
      None,
    ));
    let deferred = Deferred {
      env: self.downgrade(),
      promise: promise.clone(),
    };
    Ok((deferred, promise))
  }
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;
  use std::rc::Rc;

  use super::*;
  use crate::EventLoop;

  fn record(promise: &JsPromise) -> Rc<RefCell<Vec<String>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    promise
      .then({
        let seen = seen.clone();
        move |_env, outcome| {
          let line = match outcome {
            Settled::Fulfilled(value) => format!("fulfilled {}", value),
            Settled::Rejected(reason) => format!("rejected {}", reason),
          };
          seen.borrow_mut().push(line);
        }
      })
      .unwrap();
    seen
  }

  #[test]
  fn reactions_run_as_microtasks() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();

    let (deferred, promise) = env.create_promise().unwrap();
    let seen = record(&promise);
    deferred.resolve("done");

    assert!(!promise.is_pending());
    assert!(seen.borrow().is_empty());
    event_loop.run_pending().unwrap();
    assert_eq!(*seen.borrow(), vec!["fulfilled done"]);
  }

  #[test]
  fn reacting_to_a_settled_promise_still_defers() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();

    let (deferred, promise) = env.create_promise().unwrap();
    deferred.reject(Error::from_reason("nope"));

    let seen = record(&promise);
    assert!(seen.borrow().is_empty());
    event_loop.run().unwrap();
    assert_eq!(*seen.borrow(), vec!["rejected Error: nope"]);
  }

  #[test]
  fn resolving_with_a_promise_adopts_its_state() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();

    let (outer_deferred, outer) = env.create_promise().unwrap();
    let (inner_deferred, inner) = env.create_promise().unwrap();
    let seen = record(&outer);

    outer_deferred.resolve(inner);
    event_loop.run_pending().unwrap();
    assert!(outer.is_pending());

    inner_deferred.reject_with_value(7.0);
    event_loop.run().unwrap();
    assert_eq!(*seen.borrow(), vec!["rejected 7"]);
  }

  #[test]
  fn rejections_convert_back_into_errors() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();

    let (deferred, promise) = env.create_promise().unwrap();
    deferred.reject(Error::new(Status::NumberExpected, "not a number"));

    let err = promise.settled().unwrap().into_result().unwrap_err();
    assert_eq!(err.status, Status::NumberExpected);
    assert_eq!(err.reason, "not a number");
  }
}
