use std::convert::TryFrom;
use std::fmt;
use std::rc::Rc;

use super::unexpected_type;
use super::JsUnknown;
use super::NapiValue;
use crate::napi::Error;
use crate::napi::Result;
use crate::napi::Status;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JsUndefined;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JsNull;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JsBoolean(pub(crate) bool);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JsNumber(pub(crate) f64);

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct JsString(pub(crate) Rc<str>);

impl JsBoolean {
  pub fn get_value(&self) -> Result<bool> {
    Ok(self.0)
  }
}

impl TryFrom<JsBoolean> for bool {
  type Error = Error;

  fn try_from(value: JsBoolean) -> Result<bool> {
    value.get_value()
  }
}

impl JsNumber {
  pub fn get_double(&self) -> Result<f64> {
    Ok(self.0)
  }

  pub fn get_int32(&self) -> Result<i32> {
    Ok(self.to_integer() as i32)
  }

  pub fn get_uint32(&self) -> Result<u32> {
    Ok(self.to_integer() as u32)
  }

  pub fn get_int64(&self) -> Result<i64> {
    Ok(self.to_integer() as i64)
  }

  fn to_integer(self) -> f64 {
    if self.0.is_finite() {
      self.0.trunc()
    } else {
      0.0
    }
  }
}

impl TryFrom<JsNumber> for f64 {
  type Error = Error;

  fn try_from(value: JsNumber) -> Result<f64> {
    value.get_double()
  }
}

impl fmt::Display for JsNumber {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    let value = self.0;
    if value.is_nan() {
      write!(f, "NaN")
    } else if value.is_infinite() {
      write!(f, "{}Infinity", if value < 0.0 { "-" } else { "" })
    } else if value == 0.0 {
      write!(f, "0")
    } else if value == value.trunc() && value.abs() < 1e21 {
      write!(f, "{:.0}", value)
    } else {
      write!(f, "{}", value)
    }
  }
}

impl JsString {
  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn into_string(self) -> String {
    self.0.to_string()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl From<&str> for JsString {
  fn from(value: &str) -> Self {
    JsString(Rc::from(value))
  }
}

impl From<String> for JsString {
  fn from(value: String) -> Self {
    JsString(Rc::from(value))
  }
}

impl From<&str> for JsUnknown {
  fn from(value: &str) -> Self {
    JsUnknown::String(JsString::from(value))
  }
}

impl fmt::Debug for JsString {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "{:?}", self.as_str())
  }
}

impl NapiValue for JsUndefined {
  fn type_name() -> &'static str {
    "undefined"
  }

  fn into_unknown(self) -> JsUnknown {
    JsUnknown::Undefined
  }

  fn from_unknown(value: JsUnknown) -> Result<Self> {
    match value {
      JsUnknown::Undefined => Ok(JsUndefined),
      other => Err(unexpected_type(Status::InvalidArg, "Undefined", &other)),
    }
  }
}

impl NapiValue for JsNull {
  fn type_name() -> &'static str {
    "null"
  }

  fn into_unknown(self) -> JsUnknown {
    JsUnknown::Null
  }

  fn from_unknown(value: JsUnknown) -> Result<Self> {
    match value {
      JsUnknown::Null => Ok(JsNull),
      other => Err(unexpected_type(Status::InvalidArg, "Null", &other)),
    }
  }
}

impl NapiValue for JsBoolean {
  fn type_name() -> &'static str {
    "bool"
  }

  fn into_unknown(self) -> JsUnknown {
    JsUnknown::Boolean(self.0)
  }

  fn from_unknown(value: JsUnknown) -> Result<Self> {
    bool::from_unknown(value).map(JsBoolean)
  }
}

impl NapiValue for JsNumber {
  fn type_name() -> &'static str {
    "f64"
  }

  fn into_unknown(self) -> JsUnknown {
    JsUnknown::Number(self.0)
  }

  fn from_unknown(value: JsUnknown) -> Result<Self> {
    f64::from_unknown(value).map(JsNumber)
  }
}

impl NapiValue for JsString {
  fn type_name() -> &'static str {
    "String"
  }

  fn into_unknown(self) -> JsUnknown {
    JsUnknown::String(self)
  }

  fn from_unknown(value: JsUnknown) -> Result<Self> {
    match value {
      JsUnknown::String(value) => Ok(value),
      other => Err(unexpected_type(Status::StringExpected, "String", &other)),
    }
  }
}
