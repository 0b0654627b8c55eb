use std::cell::Cell;
use std::rc::Rc;

use crate::napi;
use crate::napi::JsFunction;
use crate::napi::JsObject;
use crate::napi::JsUnknown;
use crate::napi::Property;
use crate::Env;

struct WrappedValue {
  value: Cell<f64>,
}

fn native(
  env: &Env,
  this: &JsObject,
) -> napi::Result<Rc<WrappedValue>> {
  env.unwrap::<WrappedValue>(this)
}

pub(crate) fn define(env: &Env) -> napi::Result<JsFunction> {
  env.define_class(
    "WrappedValue",
    |ctx| {
      let initial = ctx.try_get::<f64>(0)?.unwrap_or(0.0);
      let mut this = ctx.this::<JsObject>()?;
      ctx.env.wrap(
        &mut this,
        WrappedValue {
          value: Cell::new(initial),
        },
      )
    },
    &[
      Property::new("value")?
        .with_getter_closure(|env, this| Ok(native(&env, &this)?.value.get()))
        .with_setter_closure(|env, this, value: f64| {
          native(&env, &this)?.value.set(value);
          Ok(())
        }),
      Property::new("foo")?.with_method(|ctx| {
        let this = ctx.this::<JsObject>()?;
        let value = native(ctx.env, &this)?.value.get();
        Ok(format!("WrappedValue({})", JsUnknown::Number(value)))
      }),
      Property::new("increment")?.with_method(|ctx| {
        let this = ctx.this::<JsObject>()?;
        let native = native(ctx.env, &this)?;
        native.value.set(native.value.get() + 1.0);
        Ok(native.value.get())
      }),
    ],
  )
}
