use example_addon::napi::JsFunction;
use example_addon::napi::JsUnknown;
use example_addon::napi::NapiValue;
use example_addon::EventLoop;

pub fn main() -> anyhow::Result<()> {
  example_addon::addon::register()?;

  let event_loop = EventLoop::new();
  let env = event_loop.env();
  let addon = env.import_native("exampleAddon")?;
  let function = |name: &str| addon.get_named_property::<JsFunction>(name);

  function("getArgFromJS")?.call(None, &["Hello from the demo".into()])?;
  function("getArgFromJS")?.call(None, &[])?;

  let fruits = env.create_array_with_values(vec![
    "Apple".into(),
    "Banana".into(),
    JsUnknown::Number(3.0),
  ])?;
  function("consumeArrayFromJS")?.call(None, &[fruits.into_unknown()])?;

  // { piValue: 3.14159, saySomething() { console.log("Hi from the object") } }
  let mut object = env.create_object()?;
  object.set_named_property("piValue", 3.14159)?;
  object.set_named_property(
    "saySomething",
    env.create_function_from_closure("saySomething", |ctx| {
      ctx.env.console_log("Hi from the object");
      Ok(())
    })?,
  )?;
  let pi = function("extractMemberInObject")?.call(None, &[object.into_unknown()])?;
  env.console_log(format!("extractMemberInObject returned {}", pi));

  let callback = env.create_function_from_closure("callback", |ctx| {
    let message = ctx.get::<String>(0)?;
    let number = ctx.get::<f64>(1)?;
    ctx.env.console_log(format!("callback({}, {})", message, number));
    Ok(number * 2.0)
  })?;
  let doubled = function("invokeJSFunc")?.call(None, &[callback.into_unknown()])?;
  env.console_log(format!("invokeJSFunc returned {}", doubled));

  event_loop.run()?;
  Ok(())
}
