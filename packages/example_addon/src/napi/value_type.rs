use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub enum ValueType {
  Undefined,
  Null,
  Boolean,
  Number,
  String,
  Object,
  Function,
}

impl Display for ValueType {
  fn fmt(
    &self,
    f: &mut Formatter<'_>,
  ) -> Result {
    let status_string = format!("{self:?}");
    write!(f, "{status_string}")
  }
}
