use crate::napi;
use crate::napi::CallContext;
use crate::napi::JsObject;
use crate::Env;

pub(crate) fn register(
  env: &Env,
  exports: &mut JsObject,
) -> napi::Result<()> {
  exports.set_named_property(
    "helloWorld",
    env.create_function_from_closure("helloWorld", hello_world)?,
  )?;
  exports.set_named_property(
    "returnValueToJS",
    env.create_function_from_closure("returnValueToJS", return_value_to_js)?,
  )?;
  exports.set_named_property(
    "returnObjectToJS",
    env.create_function_from_closure("returnObjectToJS", return_object_to_js)?,
  )?;
  Ok(())
}

fn hello_world(ctx: CallContext<'_>) -> napi::Result<()> {
  ctx
    .env
    .console_log("Old fashion way to say hello from native code");
  Ok(())
}

fn return_value_to_js(ctx: CallContext<'_>) -> napi::Result<napi::JsString> {
  ctx.env.create_string("Hello from native code")
}

fn return_object_to_js(ctx: CallContext<'_>) -> napi::Result<JsObject> {
  ctx.env.create_object()
}
