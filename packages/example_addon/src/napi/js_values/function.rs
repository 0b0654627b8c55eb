use std::rc::Rc;

use super::unexpected_type;
use super::JsObject;
use super::JsUnknown;
use super::NapiValue;
use super::ObjectKind;
use crate::napi::CallContext;
use crate::napi::Env;
use crate::napi::Error;
use crate::napi::Result;
use crate::napi::Status;

pub(crate) type Callback = Rc<dyn Fn(CallContext<'_>) -> Result<JsUnknown>>;

pub(crate) struct FunctionData {
  pub(crate) name: String,
  pub(crate) callback: Callback,
  /// Constructor of the parent class, run on new instances before this one
  pub(crate) parent: Option<JsFunction>,
}

pub(crate) fn into_callback<R, F>(callback: F) -> Callback
where
  F: 'static + Fn(CallContext<'_>) -> Result<R>,
  R: NapiValue,
{
  Rc::new(move |ctx: CallContext<'_>| {
    callback(ctx).map(NapiValue::into_unknown)
  })
}

#[derive(Clone, Debug)]
pub struct JsFunction(pub(crate) JsObject);

impl JsFunction {
  pub fn name(&self) -> String {
    match &self.0 .0.borrow().kind {
      ObjectKind::Function(data) => data.name.clone(),
      _ => String::new(),
    }
  }

  fn parts(&self) -> Result<(Callback, Option<JsFunction>)> {
    match &self.0 .0.borrow().kind {
      ObjectKind::Function(data) => Ok((data.callback.clone(), data.parent.clone())),
      _ => Err(Error::from_status(Status::FunctionExpected)),
    }
  }

  /// Call the function with `this` bound to the given object, or `undefined`
  pub fn call(
    &self,
    this: Option<&JsObject>,
    args: &[JsUnknown],
  ) -> Result<JsUnknown> {
    let env = self.0.env()?;
    let this = match this {
      Some(this) => this.clone().into_unknown(),
      None => JsUnknown::Undefined,
    };
    self.invoke(&env, this, args, false)
  }

  pub fn call_without_args(
    &self,
    this: Option<&JsObject>,
  ) -> Result<JsUnknown> {
    self.call(this, &[])
  }

  /// `new F(...args)`
  ///
  /// The instance inherits from `F.prototype`. Parent constructors run first,
  /// then this one. A constructor returning an object replaces the instance.
  pub fn new_instance(
    &self,
    args: &[JsUnknown],
  ) -> Result<JsObject> {
    let env = self.0.env()?;
    let prototype = match self.0.get_property("prototype")? {
      JsUnknown::Object(prototype) => Some(prototype),
      _ => None,
    };
    let instance = env.create_object_with_prototype(prototype);
    match self.construct(&env, &instance, args)? {
      JsUnknown::Object(replacement) => Ok(replacement),
      _ => Ok(instance),
    }
  }

  fn construct(
    &self,
    env: &Env,
    instance: &JsObject,
    args: &[JsUnknown],
  ) -> Result<JsUnknown> {
    let (_, parent) = self.parts()?;
    if let Some(parent) = parent {
      parent.construct(env, instance, args)?;
    }
    self.invoke(env, JsUnknown::Object(instance.clone()), args, true)
  }

  fn invoke(
    &self,
    env: &Env,
    this: JsUnknown,
    args: &[JsUnknown],
    construct_call: bool,
  ) -> Result<JsUnknown> {
    let (callback, _) = self.parts()?;
    callback(CallContext::new(env, this, args.to_vec(), construct_call))
  }

  pub fn as_object(&self) -> &JsObject {
    &self.0
  }

  pub fn into_object(self) -> JsObject {
    self.0
  }
}

impl NapiValue for JsFunction {
  fn type_name() -> &'static str {
    "Function"
  }

  fn into_unknown(self) -> JsUnknown {
    JsUnknown::Function(self)
  }

  fn from_unknown(value: JsUnknown) -> Result<Self> {
    match value {
      JsUnknown::Function(function) => Ok(function),
      other => Err(unexpected_type(Status::FunctionExpected, "Function", &other)),
    }
  }
}
