use example_addon::napi::JsFunction;
use example_addon::EventLoop;

pub fn main() -> anyhow::Result<()> {
  example_addon::addon::register()?;

  let event_loop = EventLoop::new();
  let env = event_loop.env();
  let addon = env.import_native("exampleAddon")?;

  // exampleAddon.helloWorld()
  addon
    .get_named_property::<JsFunction>("helloWorld")?
    .call(None, &[])?;

  // console.log(exampleAddon.returnValueToJS())
  let value = addon
    .get_named_property::<JsFunction>("returnValueToJS")?
    .call(None, &[])?;
  env.console_log(value.to_string());

  // console.log(exampleAddon.returnObjectToJS())
  let object = addon
    .get_named_property::<JsFunction>("returnObjectToJS")?
    .call(None, &[])?;
  env.console_log(object.to_string());

  event_loop.run()?;
  Ok(())
}
