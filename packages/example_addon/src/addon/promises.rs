use std::thread;
use std::time::Duration;

use futures::channel::oneshot;

use crate::napi;
use crate::napi::CallContext;
use crate::napi::JsObject;
use crate::napi::JsPromise;
use crate::Env;

pub(crate) fn register(
  env: &Env,
  exports: &mut JsObject,
) -> napi::Result<()> {
  exports.set_named_property(
    "helloWorldPromise",
    env.create_function_from_closure("helloWorldPromise", hello_world_promise)?,
  )?;
  exports.set_named_property(
    "returnPromiseToJS",
    env.create_function_from_closure("returnPromiseToJS", return_promise_to_js)?,
  )?;
  exports.set_named_property(
    "wait",
    env.create_function_from_closure("wait", wait)?,
  )?;
  exports.set_named_property(
    "addOneAsync",
    env.create_function_from_closure("addOneAsync", add_one_async)?,
  )?;
  Ok(())
}

fn hello_world_promise(ctx: CallContext<'_>) -> napi::Result<JsPromise> {
  let (deferred, promise) = ctx.env.create_promise()?;
  deferred.resolve("Hello from native code");
  Ok(promise)
}

/// Settles with a coin flip unless the caller passes the outcome
fn return_promise_to_js(ctx: CallContext<'_>) -> napi::Result<JsPromise> {
  let resolve = match ctx.try_get::<bool>(0)? {
    Some(resolve) => resolve,
    None => rand::random::<bool>(),
  };

  let (deferred, promise) = ctx.env.create_promise()?;
  if resolve {
    deferred.resolve("Resolved from native code");
  } else {
    deferred.reject(napi::Error::from_reason("Rejected from native code"));
  }
  Ok(promise)
}

fn wait(ctx: CallContext<'_>) -> napi::Result<JsPromise> {
  let millis = ctx.get::<u32>(0)?;
  let (deferred, promise) = ctx.env.create_promise()?;
  ctx.env.set_timeout(
    move |_env| {
      deferred.resolve("Native resolved string value");
      Ok(())
    },
    Duration::from_millis(millis as u64),
  )?;
  Ok(promise)
}

fn add_one_async(ctx: CallContext<'_>) -> napi::Result<JsPromise> {
  let value = ctx.get::<f64>(0)?;
  let (tx, rx) = oneshot::channel::<f64>();

  thread::Builder::new()
    .name("example-addon-compute".to_string())
    .spawn(move || {
      let _ = tx.send(value + 1.0);
    })
    .map_err(|error| napi::Error::from_reason(format!("failed to spawn worker: {error}")))?;

  ctx.env.spawn_local_promise(async move {
    rx.await
      .map_err(|_| napi::Error::from_reason("The worker dropped its result"))
  })
}
