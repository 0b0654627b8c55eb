use std::cell::Cell;
use std::rc::Rc;

use example_addon::napi::JsFunction;
use example_addon::napi::JsObject;
use example_addon::napi::NapiValue;
use example_addon::EventLoop;

const TICKS: u32 = 5;

/// const obj = new MyObject()
/// obj.on("counterTick", (value) => { ... after 5 ticks obj.stop() })
/// obj.start()
pub fn main() -> anyhow::Result<()> {
  example_addon::addon::register()?;

  let event_loop = EventLoop::new();
  let env = event_loop.env();
  let addon = env.import_native("exampleAddon")?;
  let event_name = example_addon::TickerOptions::from_env()?.event_name;

  let object = addon
    .get_named_property::<JsFunction>("MyObject")?
    .new_instance(&[])?;

  let received = Rc::new(Cell::new(0));
  let listener = env.create_function_from_closure("onTick", move |ctx| {
    let value = ctx.get::<f64>(0)?;
    ctx.env.console_log(format!("counterTick {}", value));

    received.set(received.get() + 1);
    if received.get() == TICKS {
      let this = ctx.this::<JsObject>()?;
      this
        .get_named_property::<JsFunction>("stop")?
        .call(Some(&this), &[])?;
      ctx.env.console_log("Stopped the worker");
    }
    Ok(())
  })?;

  object
    .get_named_property::<JsFunction>("on")?
    .call(
      Some(&object),
      &[env.create_string(&event_name)?.into_unknown(), listener.into_unknown()],
    )?;
  object
    .get_named_property::<JsFunction>("start")?
    .call(Some(&object), &[])?;

  tracing::info!(ticks = TICKS, "waiting for ticks");
  event_loop.run()?;
  Ok(())
}
