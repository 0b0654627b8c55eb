use crate::bridge::Listener;
use crate::bridge::TickEvent;
use crate::napi;
use crate::napi::CallContext;
use crate::napi::JsArray;
use crate::napi::JsFunction;
use crate::napi::JsObject;
use crate::napi::JsUnknown;
use crate::napi::NapiValue;
use crate::napi::Property;
use crate::napi::PropertyAttributes;
use crate::Env;

const EVENTS: &str = "_events";

/// Minimal `EventEmitter` with `on`, `off`, `emit` and `listenerCount`
pub(crate) fn define(env: &Env) -> napi::Result<JsFunction> {
  env.define_class(
    "EventEmitter",
    |ctx| {
      let mut this = ctx.this::<JsObject>()?;
      events_of(ctx.env, &mut this)?;
      Ok(())
    },
    &[
      Property::new("on")?.with_method(on),
      Property::new("off")?.with_method(off),
      Property::new("emit")?.with_method(emit),
      Property::new("listenerCount")?.with_method(listener_count),
    ],
  )
}

/// Listener table, created on first use
fn events_of(
  env: &Env,
  this: &mut JsObject,
) -> napi::Result<JsObject> {
  if this.has_own_property(EVENTS)? {
    return this.get_named_property::<JsObject>(EVENTS);
  }
  let events = env.create_object()?;
  this.define_properties(&[Property::new(EVENTS)?
    .with_value(events.clone())
    .with_property_attributes(PropertyAttributes::Writable | PropertyAttributes::Configurable)])?;
  Ok(events)
}

fn listeners(
  env: &Env,
  this: &mut JsObject,
  name: &str,
) -> napi::Result<Option<JsArray>> {
  events_of(env, this)?.get_named_property::<Option<JsArray>>(name)
}

fn on(ctx: CallContext<'_>) -> napi::Result<JsObject> {
  let mut this = ctx.this::<JsObject>()?;
  let name = ctx.get::<String>(0)?;
  let listener = ctx.get::<JsFunction>(1)?;

  match listeners(ctx.env, &mut this, &name)? {
    Some(mut list) => list.push(listener)?,
    None => {
      let list = ctx
        .env
        .create_array_with_values(vec![listener.into_unknown()])?;
      events_of(ctx.env, &mut this)?.set_named_property(&name, list)?;
    }
  }
  Ok(this)
}

fn off(ctx: CallContext<'_>) -> napi::Result<JsObject> {
  let mut this = ctx.this::<JsObject>()?;
  let name = ctx.get::<String>(0)?;
  let listener = ctx.get::<JsFunction>(1)?;

  if let Some(mut list) = listeners(ctx.env, &mut this, &name)? {
    list.remove(listener)?;
  }
  Ok(this)
}

fn emit(ctx: CallContext<'_>) -> napi::Result<bool> {
  let mut this = ctx.this::<JsObject>()?;
  let name = ctx.get::<String>(0)?;
  let args = ctx.args().get(1..).unwrap_or_default().to_vec();

  // Listeners added or removed during the emit apply from the next one
  let snapshot = match listeners(ctx.env, &mut this, &name)? {
    Some(list) => list.to_vec()?,
    None => return Ok(false),
  };
  for listener in &snapshot {
    if let JsUnknown::Function(listener) = listener {
      listener.call(Some(&this), &args)?;
    }
  }
  Ok(!snapshot.is_empty())
}

fn listener_count(ctx: CallContext<'_>) -> napi::Result<u32> {
  let mut this = ctx.this::<JsObject>()?;
  let name = ctx.get::<String>(0)?;
  Ok(match listeners(ctx.env, &mut this, &name)? {
    Some(list) => list.len()?,
    None => 0,
  })
}

/// Forwards bridge ticks to `target.emit(name, value)`
pub struct EmitterListener {
  target: JsObject,
}

impl EmitterListener {
  pub fn new(target: JsObject) -> Self {
    Self { target }
  }
}

impl Listener for EmitterListener {
  fn on_tick(
    &self,
    env: &Env,
    event: &TickEvent,
  ) -> napi::Result<()> {
    let emit = self.target.get_named_property::<JsFunction>("emit")?;
    emit.call(
      Some(&self.target),
      &[
        env.create_string(&event.name)?.into_unknown(),
        env.create_int64(event.value as i64)?.into_unknown(),
      ],
    )?;
    Ok(())
  }
}
