use std::any::Any;
use std::rc::Rc;
use std::rc::Weak;

use super::js_values::into_callback;
use super::js_values::Callback;
use super::js_values::FunctionData;
use super::js_values::ObjectData;
use super::js_values::ObjectKind;
use super::js_values::Slot;
use super::CallContext;
use super::Error;
use super::JsArray;
use super::JsBoolean;
use super::JsFunction;
use super::JsNull;
use super::JsNumber;
use super::JsObject;
use super::JsString;
use super::JsUndefined;
use super::JsUnknown;
use super::NapiValue;
use super::Property;
use super::PropertyAttributes;
use super::Result;
use super::Status;
use crate::runtime::LoopState;

/// Handle to the scripting environment of one [`EventLoop`](crate::EventLoop)
///
/// `Env` is cheap to clone and only usable on the loop thread.
#[derive(Clone)]
pub struct Env(pub(crate) Rc<LoopState>);

/// Non owning reference to an [`Env`]
///
/// Values that outlive a call (objects, bridges, handles) hold one of these
/// so the loop can be dropped while they are still around.
#[derive(Clone, Default)]
pub struct WeakEnv(Weak<LoopState>);

impl WeakEnv {
  pub fn upgrade(&self) -> Option<Env> {
    self.0.upgrade().map(Env)
  }
}

impl Env {
  pub fn downgrade(&self) -> WeakEnv {
    WeakEnv(Rc::downgrade(&self.0))
  }

  pub fn get_undefined(&self) -> Result<JsUndefined> {
    Ok(JsUndefined)
  }

  pub fn get_null(&self) -> Result<JsNull> {
    Ok(JsNull)
  }

  pub fn get_boolean(
    &self,
    value: bool,
  ) -> Result<JsBoolean> {
    Ok(JsBoolean(value))
  }

  pub fn create_string(
    &self,
    value: &str,
  ) -> Result<JsString> {
    Ok(JsString::from(value))
  }

  pub fn create_string_from_std(
    &self,
    value: String,
  ) -> Result<JsString> {
    Ok(JsString::from(value))
  }

  pub fn create_double(
    &self,
    value: f64,
  ) -> Result<JsNumber> {
    Ok(JsNumber(value))
  }

  pub fn create_int32(
    &self,
    value: i32,
  ) -> Result<JsNumber> {
    Ok(JsNumber(value as f64))
  }

  pub fn create_uint32(
    &self,
    value: u32,
  ) -> Result<JsNumber> {
    Ok(JsNumber(value as f64))
  }

  pub fn create_int64(
    &self,
    value: i64,
  ) -> Result<JsNumber> {
    Ok(JsNumber(value as f64))
  }

  pub(crate) fn new_object(
    &self,
    kind: ObjectKind,
    prototype: Option<JsObject>,
  ) -> JsObject {
    JsObject::from_data(ObjectData::new(self.downgrade(), kind, prototype))
  }

  pub fn create_object(&self) -> Result<JsObject> {
    Ok(self.new_object(ObjectKind::Ordinary, None))
  }

  pub(crate) fn create_object_with_prototype(
    &self,
    prototype: Option<JsObject>,
  ) -> JsObject {
    self.new_object(ObjectKind::Ordinary, prototype)
  }

  pub fn create_array(&self) -> Result<JsArray> {
    self.create_array_with_values(Vec::new())
  }

  pub fn create_array_with_length(
    &self,
    length: usize,
  ) -> Result<JsArray> {
    self.create_array_with_values(vec![JsUnknown::Undefined; length])
  }

  pub fn create_array_with_values(
    &self,
    values: Vec<JsUnknown>,
  ) -> Result<JsArray> {
    Ok(JsArray(self.new_object(ObjectKind::Array(values), None)))
  }

  /// Build an `Error` object carrying `reason` as message and `status` as code
  pub fn create_error(
    &self,
    error: Error,
  ) -> Result<JsObject> {
    let object = self.new_object(ObjectKind::Error, None);
    let hidden = PropertyAttributes::Writable | PropertyAttributes::Configurable;
    object.define_slot(
      "name",
      Slot::Data {
        value: JsUnknown::from("Error"),
        attributes: hidden,
      },
    );
    object.define_slot(
      "message",
      Slot::Data {
        value: JsUnknown::String(error.reason.into()),
        attributes: hidden,
      },
    );
    object.define_slot(
      "code",
      Slot::Data {
        value: JsUnknown::from(error.status.as_ref()),
        attributes: PropertyAttributes::default(),
      },
    );
    Ok(object)
  }

  pub fn create_function_from_closure<R, F>(
    &self,
    name: &str,
    callback: F,
  ) -> Result<JsFunction>
  where
    F: 'static + Fn(CallContext<'_>) -> Result<R>,
    R: NapiValue,
  {
    Ok(self.create_function_raw(name, into_callback(callback), None))
  }

  pub(crate) fn create_function_raw(
    &self,
    name: &str,
    callback: Callback,
    parent: Option<JsFunction>,
  ) -> JsFunction {
    let data = FunctionData {
      name: name.to_string(),
      callback,
      parent: parent.clone(),
    };
    JsFunction(self.new_object(
      ObjectKind::Function(data),
      parent.map(JsFunction::into_object),
    ))
  }

  /// Define a class whose instances inherit the non static `properties`
  ///
  /// Static properties land on the constructor itself.
  pub fn define_class<R, F>(
    &self,
    name: &str,
    constructor_cb: F,
    properties: &[Property],
  ) -> Result<JsFunction>
  where
    F: 'static + Fn(CallContext<'_>) -> Result<R>,
    R: NapiValue,
  {
    self.build_class(name, into_callback(constructor_cb), None, properties)
  }

  /// Like [`Env::define_class`], with `parent` as super class
  pub fn define_class_extends<R, F>(
    &self,
    name: &str,
    parent: &JsFunction,
    constructor_cb: F,
    properties: &[Property],
  ) -> Result<JsFunction>
  where
    F: 'static + Fn(CallContext<'_>) -> Result<R>,
    R: NapiValue,
  {
    self.build_class(
      name,
      into_callback(constructor_cb),
      Some(parent),
      properties,
    )
  }

  fn build_class(
    &self,
    name: &str,
    callback: Callback,
    parent: Option<&JsFunction>,
    properties: &[Property],
  ) -> Result<JsFunction> {
    let parent_prototype = match parent {
      Some(parent) => Some(parent.as_object().get_named_property::<JsObject>("prototype")?),
      None => None,
    };
    let prototype = self.create_object_with_prototype(parent_prototype);
    let constructor = self.create_function_raw(name, callback, parent.cloned());

    constructor.as_object().define_slot(
      "prototype",
      Slot::Data {
        value: JsUnknown::Object(prototype.clone()),
        attributes: PropertyAttributes::Writable,
      },
    );

    for property in properties {
      let slot = property.to_slot(self)?;
      if property.is_static() {
        constructor.as_object().define_slot(&property.name, slot);
      } else {
        prototype.define_slot(&property.name, slot);
      }
    }

    Ok(constructor)
  }

  /// Attach a native value to `js_object`, `napi_wrap` style
  pub fn wrap<T: 'static>(
    &self,
    js_object: &mut JsObject,
    native_object: T,
  ) -> Result<()> {
    let mut data = js_object.0.borrow_mut();
    if data.native.is_some() {
      return Err(Error::new(
        Status::InvalidArg,
        "Object is already wrapped",
      ));
    }
    data.native = Some(Rc::new(native_object));
    Ok(())
  }

  pub fn unwrap<T: 'static>(
    &self,
    js_object: &JsObject,
  ) -> Result<Rc<T>> {
    let native = js_object
      .0
      .borrow()
      .native
      .clone()
      .ok_or_else(|| Error::new(Status::InvalidArg, "Object is not wrapped"))?;
    Rc::<dyn Any>::downcast::<T>(native).map_err(|_| {
      Error::new(
        Status::InvalidArg,
        format!(
          "Wrapped value is not a {}",
          std::any::type_name::<T>()
        ),
      )
    })
  }

  /// Detach the native value, returning it
  pub fn drop_wrapped<T: 'static>(
    &self,
    js_object: &mut JsObject,
  ) -> Result<Rc<T>> {
    let native = self.unwrap::<T>(js_object)?;
    let previous = js_object.0.borrow_mut().native.take();
    drop(previous);
    Ok(native)
  }

  pub fn get_global(&self) -> Result<JsObject> {
    if let Some(global) = self.0.global.borrow().as_ref() {
      return Ok(global.clone());
    }
    let global = self.create_object()?;
    *self.0.global.borrow_mut() = Some(global.clone());
    Ok(global)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::EventLoop;

  struct Counter {
    count: std::cell::Cell<u32>,
  }

  #[test]
  fn wrapped_values_come_back_typed() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();

    let mut object = env.create_object().unwrap();
    env
      .wrap(
        &mut object,
        Counter {
          count: std::cell::Cell::new(1),
        },
      )
      .unwrap();

    let counter = env.unwrap::<Counter>(&object).unwrap();
    counter.count.set(counter.count.get() + 1);
    assert_eq!(env.unwrap::<Counter>(&object).unwrap().count.get(), 2);

    assert_eq!(
      env.unwrap::<String>(&object).unwrap_err().status,
      Status::InvalidArg
    );
    assert!(env.wrap(&mut object, 5u8).is_err());

    env.drop_wrapped::<Counter>(&mut object).unwrap();
    assert!(env.unwrap::<Counter>(&object).is_err());
  }

  #[test]
  fn classes_chain_constructors_and_prototypes() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();

    let base = env
      .define_class(
        "Base",
        |ctx| {
          let mut this = ctx.this::<JsObject>()?;
          this.set_named_property("order", "base")
        },
        &[Property::new("describe")
          .unwrap()
          .with_method(|ctx| {
            let this = ctx.this::<JsObject>()?;
            this.get_named_property::<String>("order")
          })],
      )
      .unwrap();

    let derived = env
      .define_class_extends(
        "Derived",
        &base,
        |ctx| {
          let mut this = ctx.this::<JsObject>()?;
          let order = this.get_named_property::<String>("order")?;
          this.set_named_property("order", format!("{},derived", order))
        },
        &[Property::new("kind")
          .unwrap()
          .with_value("derived")
          .with_property_attributes(PropertyAttributes::Static)],
      )
      .unwrap();

    let instance = derived.new_instance(&[]).unwrap();
    let describe = instance.get_named_property::<JsFunction>("describe").unwrap();
    let described = describe.call(Some(&instance), &[]).unwrap();
    assert_eq!(described.to_string(), "base,derived");

    assert_eq!(
      derived.as_object().get_named_property::<String>("kind").unwrap(),
      "derived"
    );
    assert!(!instance.has_named_property("kind").unwrap());
  }

  #[test]
  fn constructors_returning_objects_replace_the_instance() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();

    let factory = env
      .define_class(
        "Factory",
        |ctx| {
          let mut replacement = ctx.env.create_object()?;
          replacement.set_named_property("replaced", true)?;
          Ok(replacement)
        },
        &[],
      )
      .unwrap();

    let instance = factory.new_instance(&[]).unwrap();
    assert!(instance.get_named_property::<bool>("replaced").unwrap());
  }

  #[test]
  fn global_object_is_shared() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();

    let mut global = env.get_global().unwrap();
    global.set_named_property("answer", 42).unwrap();
    assert_eq!(
      env.get_global().unwrap().get_named_property::<u32>("answer").unwrap(),
      42
    );
  }
}
