use std::collections::HashMap;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use once_cell::sync::Lazy;

use super::Env;
use super::Error;
use super::JsObject;
use super::Status;

type ModuleInit = dyn Fn(Env, JsObject) -> crate::Result<JsObject> + Send + Sync;

static NAPI_MODULES: Lazy<RwLock<HashMap<String, Arc<ModuleInit>>>> =
  Lazy::new(Default::default);

/// Register a native module for every [`EventLoop`](crate::EventLoop) of the
/// process. The initializer runs once per loop, on first import.
pub fn napi_module_register<
  S: AsRef<str>,
  F: 'static + Send + Sync + Fn(Env, JsObject) -> crate::Result<JsObject>,
>(
  module_name: S,
  register_function: F,
) -> crate::Result<()> {
  let mut modules = NAPI_MODULES
    .write()
    .unwrap_or_else(PoisonError::into_inner);
  let name = module_name.as_ref().to_string();
  if modules.contains_key(&name) {
    return Err(crate::Error::ModuleAlreadyRegistered(name));
  }
  tracing::debug!(module = %name, "registered native module");
  modules.insert(name, Arc::new(register_function));
  Ok(())
}

pub fn is_module_registered<S: AsRef<str>>(module_name: S) -> bool {
  NAPI_MODULES
    .read()
    .unwrap_or_else(PoisonError::into_inner)
    .contains_key(module_name.as_ref())
}

impl Env {
  /// `require()` for native modules
  pub fn import_native<S: AsRef<str>>(
    &self,
    module_name: S,
  ) -> crate::Result<JsObject> {
    let name = module_name.as_ref();
    if let Some(exports) = self.0.modules.borrow().get(name) {
      return Ok(exports.clone());
    }

    let init = NAPI_MODULES
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .get(name)
      .cloned()
      .ok_or_else(|| {
        Error::new(
          Status::InvalidArg,
          format!("No such native module \"{}\"", name),
        )
      })?;

    let exports = init(self.clone(), self.create_object()?)?;
    self
      .0
      .modules
      .borrow_mut()
      .insert(name.to_string(), exports.clone());
    Ok(exports)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::AtomicUsize;
  use std::sync::atomic::Ordering;

  use super::*;
  use crate::EventLoop;

  #[test]
  fn modules_initialize_once_per_loop() {
    static INITIALIZED: AtomicUsize = AtomicUsize::new(0);

    napi_module_register("test:counted", |_env, mut exports| {
      INITIALIZED.fetch_add(1, Ordering::SeqCst);
      exports.set_named_property("ready", true)?;
      Ok(exports)
    })
    .unwrap();
    assert!(is_module_registered("test:counted"));

    let first = EventLoop::new();
    let a = first.env().import_native("test:counted").unwrap();
    let b = first.env().import_native("test:counted").unwrap();
    assert!(a.ptr_eq(&b));
    assert_eq!(INITIALIZED.load(Ordering::SeqCst), 1);

    let second = EventLoop::new();
    second.env().import_native("test:counted").unwrap();
    assert_eq!(INITIALIZED.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn duplicate_names_are_rejected() {
    napi_module_register("test:duplicate", |_env, exports| Ok(exports)).unwrap();
    let err = napi_module_register("test:duplicate", |_env, exports| Ok(exports)).unwrap_err();
    assert_eq!(
      err,
      crate::Error::ModuleAlreadyRegistered("test:duplicate".to_string())
    );
  }

  #[test]
  fn unknown_modules_fail_to_import() {
    let event_loop = EventLoop::new();
    let err = event_loop.env().import_native("test:missing").unwrap_err();
    match err {
      crate::Error::Napi(err) => assert_eq!(err.status, Status::InvalidArg),
      other => panic!("unexpected error {other}"),
    }
  }
}
