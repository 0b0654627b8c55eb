use std::fmt;

use crate::napi::Error;
use crate::napi::Result;
use crate::napi::Status;
use crate::napi::ValueType;

mod array;
mod function;
mod object;
mod object_property;
mod primitives;
mod promise;

pub use self::array::*;
pub use self::function::*;
pub use self::object::*;
pub use self::object_property::*;
pub use self::primitives::*;
pub use self::promise::*;

/// Any value a script can hold
#[derive(Clone)]
pub enum JsUnknown {
  Undefined,
  Null,
  Boolean(bool),
  Number(f64),
  String(JsString),
  Object(JsObject),
  Function(JsFunction),
}

impl JsUnknown {
  pub fn get_type(&self) -> ValueType {
    match self {
      JsUnknown::Undefined => ValueType::Undefined,
      JsUnknown::Null => ValueType::Null,
      JsUnknown::Boolean(_) => ValueType::Boolean,
      JsUnknown::Number(_) => ValueType::Number,
      JsUnknown::String(_) => ValueType::String,
      JsUnknown::Object(_) => ValueType::Object,
      JsUnknown::Function(_) => ValueType::Function,
    }
  }

  pub fn is_undefined(&self) -> bool {
    matches!(self, JsUnknown::Undefined)
  }

  pub fn is_nullish(&self) -> bool {
    matches!(self, JsUnknown::Undefined | JsUnknown::Null)
  }

  /// `===`
  pub fn strict_equals(
    &self,
    other: &JsUnknown,
  ) -> bool {
    match (self, other) {
      (JsUnknown::Undefined, JsUnknown::Undefined) => true,
      (JsUnknown::Null, JsUnknown::Null) => true,
      (JsUnknown::Boolean(a), JsUnknown::Boolean(b)) => a == b,
      (JsUnknown::Number(a), JsUnknown::Number(b)) => a == b,
      (JsUnknown::String(a), JsUnknown::String(b)) => a.as_str() == b.as_str(),
      (JsUnknown::Object(a), JsUnknown::Object(b)) => a.ptr_eq(b),
      (JsUnknown::Function(a), JsUnknown::Function(b)) => a.as_object().ptr_eq(b.as_object()),
      _ => false,
    }
  }

  pub fn coerce_to_bool(&self) -> bool {
    match self {
      JsUnknown::Undefined | JsUnknown::Null => false,
      JsUnknown::Boolean(value) => *value,
      JsUnknown::Number(value) => *value != 0.0 && !value.is_nan(),
      JsUnknown::String(value) => !value.as_str().is_empty(),
      JsUnknown::Object(_) | JsUnknown::Function(_) => true,
    }
  }

  /// View an object or a function as a plain object
  pub fn as_object(&self) -> Option<JsObject> {
    match self {
      JsUnknown::Object(object) => Some(object.clone()),
      JsUnknown::Function(function) => Some(function.as_object().clone()),
      _ => None,
    }
  }
}

impl fmt::Display for JsUnknown {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      JsUnknown::Undefined => write!(f, "undefined"),
      JsUnknown::Null => write!(f, "null"),
      JsUnknown::Boolean(value) => write!(f, "{}", value),
      JsUnknown::Number(value) => write!(f, "{}", JsNumber(*value)),
      JsUnknown::String(value) => write!(f, "{}", value.as_str()),
      JsUnknown::Object(object) => write!(f, "{}", object),
      JsUnknown::Function(function) => {
        write!(f, "function {}() {{ [native code] }}", function.name())
      }
    }
  }
}

impl fmt::Debug for JsUnknown {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      JsUnknown::String(value) => write!(f, "{:?}", value.as_str()),
      other => write!(f, "{}", other),
    }
  }
}

/// Conversion between typed views and [`JsUnknown`]
pub trait NapiValue: Sized {
  fn type_name() -> &'static str;

  fn into_unknown(self) -> JsUnknown;

  fn from_unknown(value: JsUnknown) -> Result<Self>;
}

pub(crate) fn unexpected_type(
  status: Status,
  expected: &str,
  received: &JsUnknown,
) -> Error {
  Error::new(
    status,
    format!(
      "Expect value to be {}, but received {}",
      expected,
      received.get_type()
    ),
  )
}

impl NapiValue for JsUnknown {
  fn type_name() -> &'static str {
    "unknown"
  }

  fn into_unknown(self) -> JsUnknown {
    self
  }

  fn from_unknown(value: JsUnknown) -> Result<Self> {
    Ok(value)
  }
}

impl NapiValue for () {
  fn type_name() -> &'static str {
    "undefined"
  }

  fn into_unknown(self) -> JsUnknown {
    JsUnknown::Undefined
  }

  fn from_unknown(value: JsUnknown) -> Result<Self> {
    match value {
      JsUnknown::Undefined => Ok(()),
      other => Err(unexpected_type(Status::InvalidArg, "Undefined", &other)),
    }
  }
}

impl NapiValue for bool {
  fn type_name() -> &'static str {
    "bool"
  }

  fn into_unknown(self) -> JsUnknown {
    JsUnknown::Boolean(self)
  }

  fn from_unknown(value: JsUnknown) -> Result<Self> {
    match value {
      JsUnknown::Boolean(value) => Ok(value),
      other => Err(unexpected_type(Status::BooleanExpected, "Boolean", &other)),
    }
  }
}

impl NapiValue for String {
  fn type_name() -> &'static str {
    "String"
  }

  fn into_unknown(self) -> JsUnknown {
    JsUnknown::String(JsString::from(self))
  }

  fn from_unknown(value: JsUnknown) -> Result<Self> {
    JsString::from_unknown(value).map(|value| value.into_string())
  }
}

impl NapiValue for &'static str {
  fn type_name() -> &'static str {
    "String"
  }

  fn into_unknown(self) -> JsUnknown {
    JsUnknown::String(JsString::from(self))
  }

  fn from_unknown(value: JsUnknown) -> Result<Self> {
    Err(Error::new(
      Status::InvalidArg,
      format!(
        "Cannot borrow a {} as a static string, use String instead",
        value.get_type()
      ),
    ))
  }
}

macro_rules! impl_number_value {
  ($($ty:ty),*) => {
    $(
      impl NapiValue for $ty {
        fn type_name() -> &'static str {
          "f64"
        }

        fn into_unknown(self) -> JsUnknown {
          JsUnknown::Number(self as f64)
        }

        fn from_unknown(value: JsUnknown) -> Result<Self> {
          match value {
            JsUnknown::Number(value) => Ok(value as $ty),
            other => Err(unexpected_type(Status::NumberExpected, "Number", &other)),
          }
        }
      }
    )*
  };
}

impl_number_value!(f64, i32, u32, i64, u64);

impl<T: NapiValue> NapiValue for Option<T> {
  fn type_name() -> &'static str {
    T::type_name()
  }

  fn into_unknown(self) -> JsUnknown {
    match self {
      Some(value) => value.into_unknown(),
      None => JsUnknown::Null,
    }
  }

  fn from_unknown(value: JsUnknown) -> Result<Self> {
    match value {
      JsUnknown::Undefined | JsUnknown::Null => Ok(None),
      value => T::from_unknown(value).map(Some),
    }
  }
}
