use std::convert::From;

use bitflags::bitflags;

use super::into_callback;
use super::Callback;
use super::JsObject;
use super::JsUnknown;
use super::NapiValue;
use super::Slot;
use crate::napi::Env;
use crate::napi::Result;

#[derive(Clone)]
pub struct Property {
  pub name: String,
  getter: Option<Callback>,
  setter: Option<Callback>,
  method: Option<Callback>,
  attrs: PropertyAttributes,
  value: Option<JsUnknown>,
}

bitflags! {
  #[derive(Debug, Copy, Clone, PartialEq, Eq)]
  pub struct PropertyAttributes: i32 {
    const Default = 0;
    const Writable = 1 << 0;
    const Enumerable = 1 << 1;
    const Configurable = 1 << 2;
    const Static = 1 << 10;
  }
}

impl Default for PropertyAttributes {
  fn default() -> Self {
    PropertyAttributes::Configurable | PropertyAttributes::Enumerable | PropertyAttributes::Writable
  }
}

impl From<PropertyAttributes> for i32 {
  fn from(value: PropertyAttributes) -> Self {
    value.bits()
  }
}

impl Property {
  pub fn new(name: &str) -> Result<Self> {
    Ok(Property {
      name: name.to_string(),
      getter: None,
      setter: None,
      method: None,
      attrs: Default::default(),
      value: None,
    })
  }

  pub fn with_name(
    mut self,
    name: &str,
  ) -> Self {
    self.name = name.to_string();
    self
  }

  pub fn with_method<R, F>(
    mut self,
    callback: F,
  ) -> Self
  where
    F: 'static + Fn(crate::napi::CallContext<'_>) -> Result<R>,
    R: NapiValue,
  {
    self.method = Some(into_callback(callback));
    self
  }

  pub fn with_getter_closure<R, F>(
    mut self,
    callback: F,
  ) -> Self
  where
    F: 'static + Fn(Env, JsObject) -> Result<R>,
    R: NapiValue,
  {
    self.getter = Some(into_callback(move |ctx| {
      let this = ctx.this::<JsObject>()?;
      callback(ctx.env.clone(), this)
    }));
    self
  }

  pub fn with_setter_closure<V, F>(
    mut self,
    callback: F,
  ) -> Self
  where
    F: 'static + Fn(Env, JsObject, V) -> Result<()>,
    V: NapiValue,
  {
    self.setter = Some(into_callback(move |ctx| {
      let this = ctx.this::<JsObject>()?;
      let value = ctx.get::<V>(0)?;
      callback(ctx.env.clone(), this, value)
    }));
    self
  }

  pub fn with_property_attributes(
    mut self,
    attributes: PropertyAttributes,
  ) -> Self {
    self.attrs = attributes;
    self
  }

  pub fn with_value<V: NapiValue>(
    mut self,
    value: V,
  ) -> Self {
    self.value = Some(value.into_unknown());
    self
  }

  pub(crate) fn is_static(&self) -> bool {
    self.attrs.contains(PropertyAttributes::Static)
  }

  pub(crate) fn to_slot(
    &self,
    env: &Env,
  ) -> Result<Slot> {
    let attributes = self.attrs - PropertyAttributes::Static;

    if let Some(method) = &self.method {
      let function = env.create_function_raw(&self.name, method.clone(), None);
      return Ok(Slot::Data {
        value: JsUnknown::Function(function),
        attributes,
      });
    }

    if self.getter.is_some() || self.setter.is_some() {
      let getter = self
        .getter
        .as_ref()
        .map(|getter| env.create_function_raw(&format!("get {}", self.name), getter.clone(), None));
      let setter = self
        .setter
        .as_ref()
        .map(|setter| env.create_function_raw(&format!("set {}", self.name), setter.clone(), None));
      return Ok(Slot::Accessor {
        getter,
        setter,
        attributes: attributes - PropertyAttributes::Writable,
      });
    }

    Ok(Slot::Data {
      value: self.value.clone().unwrap_or(JsUnknown::Undefined),
      attributes,
    })
  }
}
