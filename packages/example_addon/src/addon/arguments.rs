use crate::napi;
use crate::napi::CallContext;
use crate::napi::JsArray;
use crate::napi::JsFunction;
use crate::napi::JsObject;
use crate::napi::JsUnknown;
use crate::napi::NapiValue;
use crate::Env;

pub(crate) fn register(
  env: &Env,
  exports: &mut JsObject,
) -> napi::Result<()> {
  exports.set_named_property(
    "getArgFromJS",
    env.create_function_from_closure("getArgFromJS", get_arg_from_js)?,
  )?;
  exports.set_named_property(
    "consumeArrayFromJS",
    env.create_function_from_closure("consumeArrayFromJS", consume_array_from_js)?,
  )?;
  exports.set_named_property(
    "extractMemberInObject",
    env.create_function_from_closure("extractMemberInObject", extract_member_in_object)?,
  )?;
  exports.set_named_property(
    "invokeJSFunc",
    env.create_function_from_closure("invokeJSFunc", invoke_js_func)?,
  )?;
  Ok(())
}

fn get_arg_from_js(ctx: CallContext<'_>) -> napi::Result<()> {
  if ctx.length != 1 {
    ctx
      .env
      .console_log("Usage: getArgFromJS(1 string argument)");
    return Ok(());
  }
  ctx.env.console_log(format!(
    "We've got {} arguments from the scripting layer",
    ctx.length
  ));
  if let JsUnknown::String(value) = ctx.get_unknown(0)? {
    ctx.env.console_log(format!(
      "String came from the scripting layer: {}",
      value.as_str()
    ));
  }
  Ok(())
}

fn consume_array_from_js(ctx: CallContext<'_>) -> napi::Result<f64> {
  let array = ctx.get::<JsArray>(0)?;
  let elements = array.to_vec()?;
  ctx
    .env
    .console_log(format!("Array has {} elements", elements.len()));
  for (index, element) in elements.iter().enumerate() {
    ctx.env.console_log(format!("[{index}] {element}"));
  }
  Ok(elements.len() as f64)
}

fn extract_member_in_object(ctx: CallContext<'_>) -> napi::Result<f64> {
  let object = ctx.get::<JsObject>(0)?;
  let pi_value = object.get_named_property::<f64>("piValue")?;
  ctx.env.console_log(format!(
    "piValue = {}",
    ctx.env.create_double(pi_value)?
  ));

  let say_something = object.get_named_property::<JsFunction>("saySomething")?;
  say_something.call(Some(&object), &[])?;
  Ok(pi_value)
}

fn invoke_js_func(ctx: CallContext<'_>) -> napi::Result<JsUnknown> {
  let callback = ctx.get::<JsFunction>(0)?;
  callback.call(
    None,
    &[
      ctx.env.create_string("Hello from native code")?.into_unknown(),
      ctx.env.create_int32(42)?.into_unknown(),
    ],
  )
}
