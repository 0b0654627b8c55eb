use super::Env;
use super::Error;
use super::JsUnknown;
use super::NapiValue;
use super::Result;
use super::Status;

/// Arguments and receiver of a native function call
pub struct CallContext<'env> {
  pub env: &'env Env,
  this: JsUnknown,
  args: Vec<JsUnknown>,
  pub length: usize,
  construct_call: bool,
}

impl<'env> CallContext<'env> {
  pub(crate) fn new(
    env: &'env Env,
    this: JsUnknown,
    args: Vec<JsUnknown>,
    construct_call: bool,
  ) -> Self {
    Self {
      env,
      this,
      length: args.len(),
      args,
      construct_call,
    }
  }

  pub fn get<ArgType: NapiValue>(
    &self,
    index: usize,
  ) -> Result<ArgType> {
    if index >= self.length {
      Err(Error::new(
        Status::InvalidArg,
        "Arguments index out of range",
      ))
    } else {
      ArgType::from_unknown(self.args[index].clone())
    }
  }

  pub fn get_unknown(
    &self,
    index: usize,
  ) -> Result<JsUnknown> {
    self.get::<JsUnknown>(index)
  }

  /// `None` when the argument is missing, `undefined` or `null`
  pub fn try_get<ArgType: NapiValue>(
    &self,
    index: usize,
  ) -> Result<Option<ArgType>> {
    match self.args.get(index) {
      None => Ok(None),
      Some(value) if value.is_nullish() => Ok(None),
      Some(value) => ArgType::from_unknown(value.clone()).map(Some),
    }
  }

  pub fn this<T: NapiValue>(&self) -> Result<T> {
    T::from_unknown(self.this.clone())
  }

  pub fn this_unknown(&self) -> JsUnknown {
    self.this.clone()
  }

  pub fn is_construct_call(&self) -> bool {
    self.construct_call
  }

  pub fn args(&self) -> &[JsUnknown] {
    &self.args
  }
}
