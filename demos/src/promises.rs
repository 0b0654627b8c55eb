use example_addon::napi::JsFunction;
use example_addon::napi::JsObject;
use example_addon::napi::JsPromise;
use example_addon::napi::JsUnknown;
use example_addon::napi::NapiValue;
use example_addon::napi::Settled;
use example_addon::Env;
use example_addon::EventLoop;

fn call_promise(
  addon: &JsObject,
  name: &str,
  args: &[JsUnknown],
) -> anyhow::Result<JsPromise> {
  let result = addon.get_named_property::<JsFunction>(name)?.call(None, args)?;
  Ok(JsPromise::from_unknown(result)?)
}

fn report(
  env: &Env,
  settled: Settled,
) {
  match settled {
    Settled::Fulfilled(value) => env.console_log(format!("Promise Resolved:{}", value)),
    Settled::Rejected(reason) => env.console_log(format!("Promise Rejected:{}", reason)),
  }
}

pub fn main() -> anyhow::Result<()> {
  example_addon::addon::register()?;

  let event_loop = EventLoop::new();
  let env = event_loop.env();
  let addon = env.import_native("exampleAddon")?;

  call_promise(&addon, "helloWorldPromise", &[])?.then(report)?;
  call_promise(&addon, "returnPromiseToJS", &[])?.then(report)?;
  call_promise(&addon, "wait", &[JsUnknown::Number(500.0)])?.then(report)?;
  call_promise(&addon, "addOneAsync", &[JsUnknown::Number(41.0)])?.then(report)?;

  // Also awaitable from native code
  env.spawn_local({
    let promise = call_promise(&addon, "wait", &[JsUnknown::Number(250.0)])?;
    let env = env.clone();
    async move {
      let value = promise.into_future().await?;
      env.console_log(format!("Awaited:{}", value));
      Ok(())
    }
  })?;

  event_loop.run()?;
  Ok(())
}
