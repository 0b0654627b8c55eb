use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Status {
  InvalidArg,
  ObjectExpected,
  StringExpected,
  FunctionExpected,
  NumberExpected,
  BooleanExpected,
  ArrayExpected,
  GenericFailure,
  /// Async handle or event loop closed
  Closing,
}

impl Status {
  pub fn from_name(name: &str) -> Option<Status> {
    let status = match name {
      "InvalidArg" => Status::InvalidArg,
      "ObjectExpected" => Status::ObjectExpected,
      "StringExpected" => Status::StringExpected,
      "FunctionExpected" => Status::FunctionExpected,
      "NumberExpected" => Status::NumberExpected,
      "BooleanExpected" => Status::BooleanExpected,
      "ArrayExpected" => Status::ArrayExpected,
      "GenericFailure" => Status::GenericFailure,
      "Closing" => Status::Closing,
      _ => return None,
    };
    Some(status)
  }
}

impl Display for Status {
  fn fmt(
    &self,
    f: &mut Formatter<'_>,
  ) -> Result {
    let status_string = format!("{self:?}");
    write!(f, "{status_string}")
  }
}

impl AsRef<str> for Status {
  fn as_ref(&self) -> &str {
    match self {
      Status::InvalidArg => "InvalidArg",
      Status::ObjectExpected => "ObjectExpected",
      Status::StringExpected => "StringExpected",
      Status::FunctionExpected => "FunctionExpected",
      Status::NumberExpected => "NumberExpected",
      Status::BooleanExpected => "BooleanExpected",
      Status::ArrayExpected => "ArrayExpected",
      Status::GenericFailure => "GenericFailure",
      Status::Closing => "Closing",
    }
  }
}
