use std::rc::Rc;
use std::time::Duration;

use once_cell::unsync::OnceCell;

use super::emitter::EmitterListener;
use crate::bridge::TickBridge;
use crate::napi;
use crate::napi::CallContext;
use crate::napi::JsFunction;
use crate::napi::JsObject;
use crate::napi::JsUnknown;
use crate::napi::NapiValue;
use crate::napi::Property;
use crate::napi::Status;
use crate::napi::WeakObject;
use crate::Env;
use crate::TickerOptions;

struct MyObject {
  bridge: TickBridge,
}

/// `class MyObject extends EventEmitter`
///
/// `start()` spins up the background ticker, every tick is emitted on the
/// instance under the configured event name. `stop()` joins the worker.
pub(crate) fn define(
  env: &Env,
  parent: &JsFunction,
  options: TickerOptions,
) -> napi::Result<JsFunction> {
  let constructor = Rc::new(OnceCell::<WeakObject>::new());

  let class = env.define_class_extends(
    "MyObject",
    parent,
    {
      let constructor = constructor.clone();
      move |ctx| construct(ctx, &constructor, &options)
    },
    &[
      Property::new("start")?.with_method(start),
      Property::new("stop")?.with_method(stop),
      Property::new("foo")?.with_method(foo),
      Property::new("running")?.with_getter_closure(|env, this| {
        let native = env.unwrap::<MyObject>(&this)?;
        Ok(native.bridge.is_running())
      }),
    ],
  )?;

  let _ = constructor.set(class.as_object().downgrade());
  Ok(class)
}

fn construct(
  ctx: CallContext<'_>,
  constructor: &OnceCell<WeakObject>,
  options: &TickerOptions,
) -> napi::Result<JsUnknown> {
  if !ctx.is_construct_call() {
    let constructor = constructor
      .get()
      .and_then(WeakObject::upgrade)
      .map(JsFunction)
      .ok_or_else(|| napi::Error::from_reason("MyObject constructor is gone"))?;
    let args = ctx.args().get(..1).unwrap_or_default();
    return Ok(constructor.new_instance(args)?.into_unknown());
  }

  let mut options = options.clone();
  if let Some(interval_ms) = ctx.try_get::<f64>(0)? {
    if !interval_ms.is_finite() || interval_ms < 1.0 {
      return Err(napi::Error::new(
        Status::InvalidArg,
        "intervalMs must be a positive number",
      ));
    }
    options = options.with_interval(Duration::from_millis(interval_ms as u64));
  }

  let mut this = ctx.this::<JsObject>()?;
  let bridge = TickBridge::new(ctx.env, options)?;
  ctx.env.wrap(&mut this, MyObject { bridge })?;
  Ok(JsUnknown::Undefined)
}

fn start(ctx: CallContext<'_>) -> napi::Result<()> {
  let this = ctx.this::<JsObject>()?;
  let native = ctx.env.unwrap::<MyObject>(&this)?;
  native.bridge.start(EmitterListener::new(this))?;
  Ok(())
}

fn stop(ctx: CallContext<'_>) -> napi::Result<()> {
  let this = ctx.this::<JsObject>()?;
  let native = ctx.env.unwrap::<MyObject>(&this)?;
  native.bridge.stop()?;
  Ok(())
}

/// `MyObject(<last tick>)` while running, `MyObject(idle)` otherwise
fn foo(ctx: CallContext<'_>) -> napi::Result<String> {
  let this = ctx.this::<JsObject>()?;
  let native = ctx.env.unwrap::<MyObject>(&this)?;
  Ok(match native.bridge.current_value() {
    Some(value) => format!("MyObject({})", value),
    None => "MyObject(idle)".to_string(),
  })
}
