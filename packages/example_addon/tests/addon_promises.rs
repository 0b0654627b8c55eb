use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use std::time::Instant;

use example_addon::napi;
use example_addon::napi::JsFunction;
use example_addon::napi::JsObject;
use example_addon::napi::JsPromise;
use example_addon::napi::JsUnknown;
use example_addon::napi::NapiValue;
use example_addon::napi::Settled;
use example_addon::runtime::CaptureConsole;
use example_addon::EventLoop;

fn load() -> (EventLoop, CaptureConsole, JsObject) {
  example_addon::addon::register().unwrap();
  let console = CaptureConsole::new();
  let event_loop = EventLoop::with_console(console.clone());
  let addon = event_loop.env().import_native("exampleAddon").unwrap();
  (event_loop, console, addon)
}

fn call_promise(
  addon: &JsObject,
  name: &str,
  args: &[JsUnknown],
) -> napi::Result<JsPromise> {
  let result = addon.get_named_property::<JsFunction>(name)?.call(None, args)?;
  JsPromise::from_unknown(result)
}

fn fulfilled_string(settled: Option<Settled>) -> String {
  match settled {
    Some(Settled::Fulfilled(value)) => String::from_unknown(value).unwrap(),
    other => panic!("expected a fulfilled promise, got {:?}", other),
  }
}

#[test]
fn hello_world_promise_is_already_resolved() {
  let (_event_loop, _console, addon) = load();

  let promise = call_promise(&addon, "helloWorldPromise", &[]).unwrap();

  assert_eq!(fulfilled_string(promise.settled()), "Hello from native code");
}

#[test]
fn reactions_run_once_the_loop_turns() {
  let (event_loop, console, addon) = load();

  let promise = call_promise(&addon, "helloWorldPromise", &[]).unwrap();
  promise.then(|env, settled| {
    let value = settled.into_result().unwrap();
    env.console_log(format!("Promise Resolved:{}", value));
  })
  .unwrap();
  assert!(console.lines().is_empty());

  event_loop.run().unwrap();
  assert_eq!(console.lines(), vec!["Promise Resolved:Hello from native code"]);
}

#[test]
fn return_promise_to_js_resolves_on_request() {
  let (_event_loop, _console, addon) = load();

  let promise = call_promise(&addon, "returnPromiseToJS", &[JsUnknown::Boolean(true)]).unwrap();

  assert_eq!(fulfilled_string(promise.settled()), "Resolved from native code");
}

#[test]
fn return_promise_to_js_rejects_with_an_error() {
  let (_event_loop, _console, addon) = load();

  let promise = call_promise(&addon, "returnPromiseToJS", &[JsUnknown::Boolean(false)]).unwrap();

  let reason = match promise.settled() {
    Some(Settled::Rejected(reason)) => reason,
    other => panic!("expected a rejection, got {:?}", other),
  };
  assert_eq!(reason.to_string(), "Error: Rejected from native code");
  assert_eq!(
    Settled::Rejected(reason).into_result().unwrap_err().reason,
    "Rejected from native code"
  );
}

#[test]
fn return_promise_to_js_picks_an_outcome_without_arguments() {
  let (_event_loop, _console, addon) = load();

  for _ in 0..16 {
    let promise = call_promise(&addon, "returnPromiseToJS", &[]).unwrap();
    let outcome = promise.settled().unwrap().into_result();
    match outcome {
      Ok(value) => assert_eq!(value.to_string(), "Resolved from native code"),
      Err(error) => assert_eq!(error.reason, "Rejected from native code"),
    }
  }
}

#[test]
fn wait_resolves_after_the_delay() {
  let (event_loop, _console, addon) = load();
  let started = Instant::now();

  let promise = call_promise(&addon, "wait", &[JsUnknown::Number(50.0)]).unwrap();
  assert!(promise.is_pending());

  event_loop.run().unwrap();
  assert!(started.elapsed() >= Duration::from_millis(50));
  assert_eq!(fulfilled_string(promise.settled()), "Native resolved string value");
}

#[test]
fn wait_requires_a_number() {
  let (_event_loop, _console, addon) = load();

  let error = call_promise(&addon, "wait", &["soon".into()]).unwrap_err();
  assert_eq!(error.status, napi::Status::NumberExpected);
}

#[test]
fn add_one_async_settles_from_a_worker_thread() {
  let (event_loop, _console, addon) = load();
  let results = Rc::new(RefCell::new(Vec::new()));

  for value in [1.0, 41.0] {
    let promise = call_promise(&addon, "addOneAsync", &[JsUnknown::Number(value)]).unwrap();
    let results = results.clone();
    promise.then(move |_env, settled| {
      let value = f64::from_unknown(settled.into_result().unwrap()).unwrap();
      results.borrow_mut().push(value);
    })
    .unwrap();
  }

  event_loop.run().unwrap();
  let mut results = results.borrow().clone();
  results.sort_by(f64::total_cmp);
  assert_eq!(results, vec![2.0, 42.0]);
}
