use ::serde::de::DeserializeOwned;
use ::serde::Serialize;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;

use super::Env;
use super::Error;
use super::JsObject;
use super::JsUnknown;
use super::Result;
use super::Status;

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl Env {
  /// Build a script value from plain JSON data
  pub fn to_js_value(
    &self,
    value: &Value,
  ) -> Result<JsUnknown> {
    Ok(match value {
      Value::Null => JsUnknown::Null,
      Value::Bool(value) => JsUnknown::Boolean(*value),
      Value::Number(value) => JsUnknown::Number(value.as_f64().unwrap_or(f64::NAN)),
      Value::String(value) => JsUnknown::String(value.as_str().into()),
      Value::Array(values) => {
        let values = values
          .iter()
          .map(|value| self.to_js_value(value))
          .collect::<Result<Vec<_>>>()?;
        JsUnknown::Object(self.create_array_with_values(values)?.into_object())
      }
      Value::Object(entries) => {
        let object = self.create_object()?;
        for (key, value) in entries {
          object.set_property(key, self.to_js_value(value)?)?;
        }
        JsUnknown::Object(object)
      }
    })
  }

  /// Read a script value as JSON, the way `JSON.stringify` sees it
  pub fn from_js_value(
    &self,
    value: &JsUnknown,
  ) -> Result<Value> {
    let mut seen = Vec::new();
    from_js_value(value, &mut seen)
  }

  pub fn to_js<T: Serialize>(
    &self,
    value: &T,
  ) -> Result<JsUnknown> {
    self.to_js_value(&serde_json::to_value(value)?)
  }

  pub fn from_js<T: DeserializeOwned>(
    &self,
    value: &JsUnknown,
  ) -> Result<T> {
    Ok(serde_json::from_value(self.from_js_value(value)?)?)
  }
}

fn number_to_json(value: f64) -> Value {
  if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
    return Value::from(value as i64);
  }
  Number::from_f64(value)
    .map(Value::Number)
    .unwrap_or(Value::Null)
}

fn from_js_value(
  value: &JsUnknown,
  seen: &mut Vec<JsObject>,
) -> Result<Value> {
  let object = match value {
    JsUnknown::Undefined | JsUnknown::Null | JsUnknown::Function(_) => return Ok(Value::Null),
    JsUnknown::Boolean(value) => return Ok(Value::Bool(*value)),
    JsUnknown::Number(value) => return Ok(number_to_json(*value)),
    JsUnknown::String(value) => return Ok(Value::String(value.as_str().to_string())),
    JsUnknown::Object(object) => object,
  };

  if seen.iter().any(|parent| parent.ptr_eq(object)) {
    return Err(Error::new(
      Status::InvalidArg,
      "Converting circular structure to JSON",
    ));
  }
  seen.push(object.clone());

  let result = if object.is_array() {
    let length = object.get_named_property::<u32>("length")?;
    let mut values = Vec::with_capacity(length as usize);
    for index in 0..length {
      let element = object.get_property(&index.to_string())?;
      values.push(from_js_value(&element, seen)?);
    }
    Value::Array(values)
  } else {
    let mut entries = Map::new();
    for key in object.own_enumerable_keys() {
      let property = object.get_property(&key)?;
      if matches!(property, JsUnknown::Undefined | JsUnknown::Function(_)) {
        continue;
      }
      entries.insert(key, from_js_value(&property, seen)?);
    }
    Value::Object(entries)
  };

  seen.pop();
  Ok(result)
}
