use std::any::Any;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::rc::Weak;

use super::FunctionData;
use super::JsArray;
use super::JsFunction;
use super::JsUnknown;
use super::NapiValue;
use super::PromiseState;
use super::Property;
use super::PropertyAttributes;
use crate::napi::Env;
use crate::napi::Error;
use crate::napi::Result;
use crate::napi::Status;
use crate::napi::WeakEnv;

pub(crate) enum Slot {
  Data {
    value: JsUnknown,
    attributes: PropertyAttributes,
  },
  Accessor {
    getter: Option<JsFunction>,
    setter: Option<JsFunction>,
    attributes: PropertyAttributes,
  },
}

impl Slot {
  fn attributes(&self) -> PropertyAttributes {
    match self {
      Slot::Data { attributes, .. } => *attributes,
      Slot::Accessor { attributes, .. } => *attributes,
    }
  }
}

pub(crate) enum ObjectKind {
  Ordinary,
  Array(Vec<JsUnknown>),
  Error,
  Promise(PromiseState),
  Function(FunctionData),
}

pub(crate) struct ObjectData {
  pub(crate) env: WeakEnv,
  pub(crate) kind: ObjectKind,
  pub(crate) prototype: Option<JsObject>,
  pub(crate) properties: Vec<(String, Slot)>,
  pub(crate) native: Option<Rc<dyn Any>>,
}

impl ObjectData {
  pub(crate) fn new(
    env: WeakEnv,
    kind: ObjectKind,
    prototype: Option<JsObject>,
  ) -> Self {
    Self {
      env,
      kind,
      prototype,
      properties: Vec::new(),
      native: None,
    }
  }

  fn find(
    &self,
    key: &str,
    own: bool,
  ) -> Option<Found> {
    if let ObjectKind::Array(elements) = &self.kind {
      if key == "length" {
        return Some(Found::Data {
          value: JsUnknown::Number(elements.len() as f64),
          writable: false,
          own,
        });
      }
      if let Some(value) = array_index(key).and_then(|index| elements.get(index)) {
        return Some(Found::Data {
          value: value.clone(),
          writable: true,
          own,
        });
      }
    }

    self
      .properties
      .iter()
      .find(|(name, _)| name == key)
      .map(|(_, slot)| match slot {
        Slot::Data { value, attributes } => Found::Data {
          value: value.clone(),
          writable: attributes.contains(PropertyAttributes::Writable),
          own,
        },
        Slot::Accessor { getter, setter, .. } => Found::Accessor {
          getter: getter.clone(),
          setter: setter.clone(),
        },
      })
  }

  fn own_string(
    &self,
    key: &str,
  ) -> Option<String> {
    match self.find(key, true) {
      Some(Found::Data {
        value: JsUnknown::String(value),
        ..
      }) => Some(value.into_string()),
      _ => None,
    }
  }
}

enum Found {
  Data {
    value: JsUnknown,
    writable: bool,
    own: bool,
  },
  Accessor {
    getter: Option<JsFunction>,
    setter: Option<JsFunction>,
  },
}

/// Largest valid array index, `2^32 - 2`
const MAX_ARRAY_INDEX: u64 = u32::MAX as u64 - 1;

/// Holes an index write may open past the end of the dense elements.
/// Indices further out are kept as ordinary properties.
const MAX_DENSE_GAP: usize = 1024;

pub(crate) fn array_index(key: &str) -> Option<usize> {
  key
    .parse::<u64>()
    .ok()
    .filter(|index| *index <= MAX_ARRAY_INDEX && index.to_string() == key)
    .and_then(|index| usize::try_from(index).ok())
}

/// Reference to an object that does not keep it alive
#[derive(Clone, Default)]
pub(crate) struct WeakObject(Weak<RefCell<ObjectData>>);

impl WeakObject {
  pub(crate) fn upgrade(&self) -> Option<JsObject> {
    self.0.upgrade().map(JsObject)
  }
}

/// A shared, single threaded property bag
///
/// Cloning a `JsObject` clones the reference, not the properties.
#[derive(Clone)]
pub struct JsObject(pub(crate) Rc<RefCell<ObjectData>>);

impl JsObject {
  pub(crate) fn from_data(data: ObjectData) -> Self {
    JsObject(Rc::new(RefCell::new(data)))
  }

  pub(crate) fn downgrade(&self) -> WeakObject {
    WeakObject(Rc::downgrade(&self.0))
  }

  pub(crate) fn env(&self) -> Result<Env> {
    self.0.borrow().env.upgrade().ok_or_else(|| {
      Error::new(
        Status::Closing,
        "The event loop owning this object has been dropped",
      )
    })
  }

  pub fn ptr_eq(
    &self,
    other: &JsObject,
  ) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }

  pub fn is_array(&self) -> bool {
    matches!(self.0.borrow().kind, ObjectKind::Array(_))
  }

  pub fn is_error(&self) -> bool {
    matches!(self.0.borrow().kind, ObjectKind::Error)
  }

  pub fn is_promise(&self) -> bool {
    matches!(self.0.borrow().kind, ObjectKind::Promise(_))
  }

  pub fn is_function(&self) -> bool {
    matches!(self.0.borrow().kind, ObjectKind::Function(_))
  }

  pub fn get_prototype(&self) -> Option<JsObject> {
    self.0.borrow().prototype.clone()
  }

  fn lookup(
    &self,
    key: &str,
  ) -> Option<Found> {
    let mut current = Some(self.clone());
    let mut own = true;
    while let Some(object) = current {
      let data = object.0.borrow();
      if let Some(found) = data.find(key, own) {
        return Some(found);
      }
      current = data.prototype.clone();
      own = false;
    }
    None
  }

  /// Read a property through the prototype chain. Getters run with this
  /// object as receiver.
  pub fn get_property(
    &self,
    key: &str,
  ) -> Result<JsUnknown> {
    match self.lookup(key) {
      None => Ok(JsUnknown::Undefined),
      Some(Found::Data { value, .. }) => Ok(value),
      Some(Found::Accessor {
        getter: Some(getter),
        ..
      }) => getter.call(Some(self), &[]),
      Some(Found::Accessor { getter: None, .. }) => Ok(JsUnknown::Undefined),
    }
  }

  pub fn get_named_property<T: NapiValue>(
    &self,
    name: &str,
  ) -> Result<T> {
    T::from_unknown(self.get_property(name)?)
  }

  pub fn set_named_property<V: NapiValue>(
    &mut self,
    name: &str,
    value: V,
  ) -> Result<()> {
    self.set_property(name, value.into_unknown())
  }

  pub(crate) fn set_property(
    &self,
    key: &str,
    value: JsUnknown,
  ) -> Result<()> {
    match self.lookup(key) {
      Some(Found::Accessor {
        setter: Some(setter),
        ..
      }) => {
        setter.call(Some(self), &[value])?;
        Ok(())
      }
      Some(Found::Accessor { setter: None, .. }) => Err(Error::new(
        Status::GenericFailure,
        format!(
          "Cannot set property {} of {} which has only a getter",
          key, self
        ),
      )),
      Some(Found::Data {
        writable: false, ..
      }) => Err(Error::new(
        Status::GenericFailure,
        format!(
          "Cannot assign to read only property '{}' of object '{}'",
          key, self
        ),
      )),
      _ => {
        let previous = self.write_own(key, value);
        drop(previous);
        Ok(())
      }
    }
  }

  fn write_own(
    &self,
    key: &str,
    value: JsUnknown,
  ) -> Option<JsUnknown> {
    let mut data = self.0.borrow_mut();

    if let ObjectKind::Array(elements) = &mut data.kind {
      let dense = array_index(key).filter(|index| *index <= elements.len() + MAX_DENSE_GAP);
      if let Some(index) = dense {
        if index >= elements.len() {
          elements.resize(index + 1, JsUnknown::Undefined);
        }
        return Some(std::mem::replace(&mut elements[index], value));
      }
    }

    let existing = data.properties.iter_mut().find(|(name, _)| name == key);
    if let Some((_, Slot::Data { value: current, .. })) = existing {
      return Some(std::mem::replace(current, value));
    }

    data.properties.push((
      key.to_string(),
      Slot::Data {
        value,
        attributes: PropertyAttributes::default(),
      },
    ));
    None
  }

  pub(crate) fn define_slot(
    &self,
    key: &str,
    slot: Slot,
  ) {
    let previous = {
      let mut data = self.0.borrow_mut();
      match data.properties.iter_mut().find(|(name, _)| name == key) {
        Some((_, current)) => Some(std::mem::replace(current, slot)),
        None => {
          data.properties.push((key.to_string(), slot));
          None
        }
      }
    };
    drop(previous);
  }

  pub fn has_named_property(
    &self,
    name: &str,
  ) -> Result<bool> {
    Ok(self.lookup(name).is_some())
  }

  pub fn has_own_property(
    &self,
    key: &str,
  ) -> Result<bool> {
    Ok(self.0.borrow().find(key, true).is_some())
  }

  /// Returns `false` when the property exists but is not configurable
  pub fn delete_named_property(
    &mut self,
    name: &str,
  ) -> Result<bool> {
    let removed = {
      let mut data = self.0.borrow_mut();

      if let ObjectKind::Array(elements) = &mut data.kind {
        if let Some(element) = array_index(name).and_then(|index| elements.get_mut(index)) {
          let removed = std::mem::replace(element, JsUnknown::Undefined);
          drop(data);
          drop(removed);
          return Ok(true);
        }
      }

      let position = data.properties.iter().position(|(key, _)| key == name);
      match position {
        None => None,
        Some(position) => {
          if !data.properties[position]
            .1
            .attributes()
            .contains(PropertyAttributes::Configurable)
          {
            return Ok(false);
          }
          Some(data.properties.remove(position))
        }
      }
    };
    drop(removed);
    Ok(true)
  }

  pub(crate) fn own_enumerable_keys(&self) -> Vec<String> {
    let data = self.0.borrow();
    let mut keys = Vec::new();
    if let ObjectKind::Array(elements) = &data.kind {
      keys.extend((0..elements.len()).map(|index| index.to_string()));
    }
    keys.extend(
      data
        .properties
        .iter()
        .filter(|(_, slot)| slot.attributes().contains(PropertyAttributes::Enumerable))
        .map(|(key, _)| key.clone()),
    );
    keys
  }

  /// Own enumerable property names, in insertion order
  pub fn get_property_names(&self) -> Result<JsArray> {
    let env = self.env()?;
    let names = self
      .own_enumerable_keys()
      .into_iter()
      .map(|key| JsUnknown::String(key.into()))
      .collect();
    env.create_array_with_values(names)
  }

  pub fn define_properties(
    &mut self,
    properties: &[Property],
  ) -> Result<()> {
    let env = self.env()?;
    for property in properties {
      let slot = property.to_slot(&env)?;
      self.define_slot(&property.name, slot);
    }
    Ok(())
  }
}

impl NapiValue for JsObject {
  fn type_name() -> &'static str {
    "Object"
  }

  fn into_unknown(self) -> JsUnknown {
    if self.is_function() {
      JsUnknown::Function(JsFunction(self))
    } else {
      JsUnknown::Object(self)
    }
  }

  fn from_unknown(value: JsUnknown) -> Result<Self> {
    match value {
      JsUnknown::Object(object) => Ok(object),
      JsUnknown::Function(function) => Ok(function.0),
      other => Err(super::unexpected_type(
        Status::ObjectExpected,
        "Object",
        &other,
      )),
    }
  }
}

thread_local! {
  static JOINING: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());
}

/// Marks an array as being joined on this thread until dropped
struct JoinGuard(usize);

impl JoinGuard {
  fn enter(array: &JsObject) -> Option<Self> {
    let key = Rc::as_ptr(&array.0) as usize;
    JOINING
      .with(|joining| joining.borrow_mut().insert(key))
      .then(|| JoinGuard(key))
  }
}

impl Drop for JoinGuard {
  fn drop(&mut self) {
    JOINING.with(|joining| {
      joining.borrow_mut().remove(&self.0);
    });
  }
}

impl fmt::Display for JsObject {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    let elements = match &self.0.borrow().kind {
      ObjectKind::Array(elements) => Some(elements.clone()),
      _ => None,
    };
    if let Some(elements) = elements {
      // An array already being joined further up prints as empty
      let Some(_joining) = JoinGuard::enter(self) else {
        return Ok(());
      };
      for (index, element) in elements.iter().enumerate() {
        if index > 0 {
          write!(f, ",")?;
        }
        if !element.is_nullish() {
          write!(f, "{}", element)?;
        }
      }
      return Ok(());
    }

    let data = self.0.borrow();
    match &data.kind {
      ObjectKind::Array(_) => Ok(()),
      ObjectKind::Error => {
        let name = data.own_string("name").unwrap_or_else(|| "Error".to_string());
        match data.own_string("message") {
          Some(message) if !message.is_empty() => write!(f, "{}: {}", name, message),
          _ => write!(f, "{}", name),
        }
      }
      ObjectKind::Promise(_) => write!(f, "[object Promise]"),
      ObjectKind::Function(function) => {
        write!(f, "function {}() {{ [native code] }}", function.name)
      }
      ObjectKind::Ordinary => write!(f, "[object Object]"),
    }
  }
}

impl fmt::Debug for JsObject {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_tuple("JsObject")
      .field(&format_args!("{}", self))
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::napi::JsFunction;
  use crate::napi::JsNumber;
  use crate::EventLoop;

  #[test]
  fn properties_keep_insertion_order() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();

    let mut object = env.create_object().unwrap();
    object.set_named_property("b", 1.0).unwrap();
    object.set_named_property("a", 2.0).unwrap();
    object.set_named_property("b", 3.0).unwrap();

    let names = object.get_property_names().unwrap().to_vec().unwrap();
    let names = names.iter().map(|name| name.to_string()).collect::<Vec<_>>();
    assert_eq!(names, vec!["b", "a"]);
    assert_eq!(object.get_named_property::<f64>("b").unwrap(), 3.0);
    assert!(object.get_property("missing").unwrap().is_undefined());
  }

  #[test]
  fn lookup_walks_the_prototype_chain() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();

    let mut parent = env.create_object().unwrap();
    parent.set_named_property("greeting", "hi").unwrap();
    let mut child = env.create_object_with_prototype(Some(parent.clone()));

    assert_eq!(child.get_named_property::<String>("greeting").unwrap(), "hi");
    assert!(child.has_named_property("greeting").unwrap());
    assert!(!child.has_own_property("greeting").unwrap());

    // Writes shadow the inherited value
    child.set_named_property("greeting", "hello").unwrap();
    assert_eq!(child.get_named_property::<String>("greeting").unwrap(), "hello");
    assert_eq!(parent.get_named_property::<String>("greeting").unwrap(), "hi");
  }

  #[test]
  fn read_only_properties_reject_writes() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();

    let mut object = env.create_object().unwrap();
    object
      .define_properties(&[Property::new("fixed")
        .unwrap()
        .with_value(env.create_double(1.0).unwrap())
        .with_property_attributes(PropertyAttributes::Enumerable)])
      .unwrap();

    let err = object.set_named_property("fixed", 2.0).unwrap_err();
    assert_eq!(err.status, Status::GenericFailure);
    assert!(!object.delete_named_property("fixed").unwrap());
    assert_eq!(object.get_named_property::<JsNumber>("fixed").unwrap().get_double().unwrap(), 1.0);
  }

  #[test]
  fn accessors_receive_the_receiver() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();

    let mut prototype = env.create_object().unwrap();
    prototype
      .define_properties(&[Property::new("double")
        .unwrap()
        .with_getter_closure(|_env, this| {
          let base = this.get_named_property::<f64>("base")?;
          Ok(base * 2.0)
        })
        .with_setter_closure(|_env, mut this, value: f64| {
          this.set_named_property("base", value / 2.0)
        })])
      .unwrap();

    let mut instance = env.create_object_with_prototype(Some(prototype));
    instance.set_named_property("base", 4.0).unwrap();
    assert_eq!(instance.get_named_property::<f64>("double").unwrap(), 8.0);

    instance.set_named_property("double", 10.0).unwrap();
    assert_eq!(instance.get_named_property::<f64>("base").unwrap(), 5.0);
    assert!(!instance.has_own_property("double").unwrap());
  }

  #[test]
  fn hidden_properties_are_not_listed() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();

    let mut object = env.create_object().unwrap();
    object.set_named_property("visible", true).unwrap();
    object
      .define_properties(&[Property::new("hidden")
        .unwrap()
        .with_value(env.get_boolean(true).unwrap())
        .with_property_attributes(PropertyAttributes::Writable)])
      .unwrap();

    let names = object.get_property_names().unwrap();
    assert_eq!(names.len().unwrap(), 1);
    assert!(object.has_own_property("hidden").unwrap());
  }

  #[test]
  fn errors_and_functions_print_like_scripts() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();

    let error = env
      .create_error(Error::new(Status::InvalidArg, "bad input"))
      .unwrap();
    assert_eq!(error.to_string(), "Error: bad input");
    assert_eq!(error.get_named_property::<String>("code").unwrap(), "InvalidArg");

    let function: JsFunction = env
      .create_function_from_closure("noop", |_ctx| Ok(()))
      .unwrap();
    assert_eq!(
      function.into_unknown().to_string(),
      "function noop() { [native code] }"
    );
    assert_eq!(env.create_object().unwrap().to_string(), "[object Object]");
  }

  #[test]
  fn far_array_indices_are_kept_sparse() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();

    let mut array = env.create_array().unwrap().into_object();
    array.set_named_property("1000000000000000", 1.0).unwrap();
    array.set_named_property("4000000000", 2.0).unwrap();

    let array = JsArray::from_unknown(array.into_unknown()).unwrap();
    assert_eq!(array.len().unwrap(), 0);
    let object = array.as_object();
    assert_eq!(object.get_named_property::<f64>("1000000000000000").unwrap(), 1.0);
    assert_eq!(object.get_named_property::<f64>("4000000000").unwrap(), 2.0);

    let names = object.get_property_names().unwrap().to_vec().unwrap();
    let names = names.iter().map(|name| name.to_string()).collect::<Vec<_>>();
    assert_eq!(names, vec!["1000000000000000", "4000000000"]);
  }

  #[test]
  fn near_array_indices_fill_holes() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();

    let mut array = env.create_array().unwrap();
    array.set_element(3, "d").unwrap();

    assert_eq!(array.len().unwrap(), 4);
    assert!(array.get_element::<JsUnknown>(1).unwrap().is_undefined());
    assert_eq!(array.as_object().to_string(), ",,,d");
  }

  #[test]
  fn self_containing_arrays_print_the_cycle_as_empty() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();

    let mut array = env.create_array().unwrap();
    array.push(1.0).unwrap();
    array.push(array.clone()).unwrap();
    array.push(2.0).unwrap();

    assert_eq!(array.clone().into_unknown().to_string(), "1,,2");

    let mut outer = env.create_array().unwrap();
    outer.push(array.clone()).unwrap();
    outer.push(array).unwrap();
    assert_eq!(outer.into_unknown().to_string(), "1,,2,1,,2");
  }
}
