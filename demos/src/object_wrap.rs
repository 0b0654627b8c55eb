use example_addon::napi::JsFunction;
use example_addon::napi::JsUnknown;
use example_addon::EventLoop;

pub fn main() -> anyhow::Result<()> {
  example_addon::addon::register()?;

  let event_loop = EventLoop::new();
  let env = event_loop.env();
  let addon = env.import_native("exampleAddon")?;

  // const wrapped = new WrappedValue(41)
  let mut wrapped = addon
    .get_named_property::<JsFunction>("WrappedValue")?
    .new_instance(&[JsUnknown::Number(41.0)])?;

  wrapped
    .get_named_property::<JsFunction>("increment")?
    .call(Some(&wrapped), &[])?;
  let description = wrapped
    .get_named_property::<JsFunction>("foo")?
    .call(Some(&wrapped), &[])?;
  env.console_log(description.to_string());

  wrapped.set_named_property("value", 0.5)?;
  env.console_log(format!(
    "value = {}",
    wrapped.get_property("value")?
  ));

  event_loop.run()?;
  Ok(())
}
