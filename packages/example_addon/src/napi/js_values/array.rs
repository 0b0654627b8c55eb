use super::unexpected_type;
use super::JsObject;
use super::JsUnknown;
use super::NapiValue;
use super::ObjectKind;
use crate::napi::Error;
use crate::napi::Result;
use crate::napi::Status;

/// An object whose indexed elements live in a dense vector
#[derive(Clone, Debug)]
pub struct JsArray(pub(crate) JsObject);

impl JsArray {
  pub fn len(&self) -> Result<u32> {
    self.with_elements(|elements| elements.len() as u32)
  }

  pub fn is_empty(&self) -> Result<bool> {
    self.with_elements(|elements| elements.is_empty())
  }

  pub fn get_element<T: NapiValue>(
    &self,
    index: u32,
  ) -> Result<T> {
    let element = self.with_elements(|elements| {
      elements
        .get(index as usize)
        .cloned()
        .unwrap_or(JsUnknown::Undefined)
    })?;
    T::from_unknown(element)
  }

  pub fn set_element<V: NapiValue>(
    &mut self,
    index: u32,
    value: V,
  ) -> Result<()> {
    self.0.set_property(&index.to_string(), value.into_unknown())
  }

  pub fn push<V: NapiValue>(
    &mut self,
    value: V,
  ) -> Result<()> {
    let value = value.into_unknown();
    let mut data = self.0 .0.borrow_mut();
    match &mut data.kind {
      ObjectKind::Array(elements) => {
        elements.push(value);
        Ok(())
      }
      _ => Err(Error::from_status(Status::ArrayExpected)),
    }
  }

  /// Remove the first element strictly equal to `value`
  pub fn remove<V: NapiValue>(
    &mut self,
    value: V,
  ) -> Result<bool> {
    let value = value.into_unknown();
    let removed = {
      let mut data = self.0 .0.borrow_mut();
      match &mut data.kind {
        ObjectKind::Array(elements) => elements
          .iter()
          .position(|element| element.strict_equals(&value))
          .map(|position| elements.remove(position)),
        _ => return Err(Error::from_status(Status::ArrayExpected)),
      }
    };
    Ok(removed.is_some())
  }

  pub fn to_vec(&self) -> Result<Vec<JsUnknown>> {
    self.with_elements(|elements| elements.clone())
  }

  pub fn as_object(&self) -> &JsObject {
    &self.0
  }

  pub fn into_object(self) -> JsObject {
    self.0
  }

  fn with_elements<R>(
    &self,
    f: impl FnOnce(&Vec<JsUnknown>) -> R,
  ) -> Result<R> {
    match &self.0 .0.borrow().kind {
      ObjectKind::Array(elements) => Ok(f(elements)),
      _ => Err(Error::from_status(Status::ArrayExpected)),
    }
  }
}

impl NapiValue for JsArray {
  fn type_name() -> &'static str {
    "Array"
  }

  fn into_unknown(self) -> JsUnknown {
    JsUnknown::Object(self.0)
  }

  fn from_unknown(value: JsUnknown) -> Result<Self> {
    match value {
      JsUnknown::Object(object) if object.is_array() => Ok(JsArray(object)),
      other => Err(unexpected_type(Status::ArrayExpected, "Array", &other)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::EventLoop;

  #[test]
  fn elements_are_reachable_as_indexed_properties() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();

    let mut array = env.create_array().unwrap();
    array.push("Apple").unwrap();
    array.push(2.0).unwrap();
    array.set_element(3, true).unwrap();

    assert_eq!(array.len().unwrap(), 4);
    assert!(array.get_element::<JsUnknown>(2).unwrap().is_undefined());
    assert_eq!(array.as_object().get_named_property::<String>("0").unwrap(), "Apple");
    assert_eq!(array.as_object().get_named_property::<u32>("length").unwrap(), 4);
    assert_eq!(array.clone().into_unknown().to_string(), "Apple,2,,true");
  }

  #[test]
  fn plain_objects_are_not_arrays() {
    let event_loop = EventLoop::new();
    let env = event_loop.env();

    let object = env.create_object().unwrap();
    let err = JsArray::from_unknown(object.into_unknown()).unwrap_err();
    assert_eq!(err.status, Status::ArrayExpected);
  }
}
