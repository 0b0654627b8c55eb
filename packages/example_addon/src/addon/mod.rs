//! The `exampleAddon` native module
//!
//! | export                  | kind                                     |
//! |-------------------------|------------------------------------------|
//! | `helloWorld`            | logs a greeting                          |
//! | `returnValueToJS`       | returns a string                         |
//! | `returnObjectToJS`      | returns an empty object                  |
//! | `getArgFromJS`          | logs its single string argument          |
//! | `consumeArrayFromJS`    | logs each element, returns the length    |
//! | `extractMemberInObject` | reads `piValue`, calls `saySomething`    |
//! | `invokeJSFunc`          | calls back into a function               |
//! | `helloWorldPromise`     | resolved promise                         |
//! | `returnPromiseToJS`     | randomly resolved or rejected promise    |
//! | `wait`                  | promise settled by a timer               |
//! | `addOneAsync`           | promise settled by a worker thread       |
//! | `EventEmitter`          | class                                    |
//! | `MyObject`              | `EventEmitter` fed by a background tick  |
//! | `WrappedValue`          | class wrapping a native number           |
mod arguments;
mod emitter;
mod my_object;
mod promises;
mod values;
mod wrapped;

pub use self::emitter::EmitterListener;
use crate::napi::napi_module_register;
use crate::napi::JsObject;
use crate::Env;
use crate::TickerOptions;

pub const MODULE_NAME: &str = "exampleAddon";

/// Populate `exports`, the ticker options are read from the environment
pub fn init_module(
  env: Env,
  exports: JsObject,
) -> crate::Result<JsObject> {
  init_module_with_options(env, exports, TickerOptions::from_env()?)
}

pub fn init_module_with_options(
  env: Env,
  mut exports: JsObject,
  options: TickerOptions,
) -> crate::Result<JsObject> {
  options.validate()?;

  values::register(&env, &mut exports)?;
  arguments::register(&env, &mut exports)?;
  promises::register(&env, &mut exports)?;

  let event_emitter = emitter::define(&env)?;
  let my_object = my_object::define(&env, &event_emitter, options)?;
  exports.set_named_property("EventEmitter", event_emitter)?;
  exports.set_named_property("MyObject", my_object)?;
  exports.set_named_property("WrappedValue", wrapped::define(&env)?)?;

  tracing::debug!(module = MODULE_NAME, "initialized");
  Ok(exports)
}

/// Make `exampleAddon` importable with [`Env::import_native`]
///
/// Safe to call more than once.
pub fn register() -> crate::Result<()> {
  match napi_module_register(MODULE_NAME, init_module) {
    Ok(()) | Err(crate::Error::ModuleAlreadyRegistered(_)) => Ok(()),
    Err(error) => Err(error),
  }
}

#[ctor::ctor]
fn register_example_addon() {
  if let Err(error) = register() {
    tracing::error!(%error, "failed to register {}", MODULE_NAME);
  }
}
