use std::fmt;

use super::Status;

pub type Result<T> = std::result::Result<T, Error>;

/// Represent a thrown value as a native error
///
/// `status` says which kind of failure happened, `reason` carries the
/// message a script would see on the thrown `Error`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Error {
  pub status: Status,
  pub reason: String,
}

impl Error {
  pub fn new<R: ToString>(
    status: Status,
    reason: R,
  ) -> Self {
    Error {
      status,
      reason: reason.to_string(),
    }
  }

  pub fn from_status(status: Status) -> Self {
    Error {
      status,
      reason: "".to_owned(),
    }
  }

  pub fn from_reason<T: Into<String>>(reason: T) -> Self {
    Error {
      status: Status::GenericFailure,
      reason: reason.into(),
    }
  }
}

impl fmt::Debug for Error {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("Error")
      .field("status", &self.status)
      .field("reason", &self.reason)
      .finish()
  }
}

impl fmt::Display for Error {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    if !self.reason.is_empty() {
      write!(f, "{:?}, {}", self.status, self.reason)
    } else {
      write!(f, "{:?}", self.status)
    }
  }
}

impl std::error::Error for Error {}

impl From<std::fmt::Error> for Error {
  fn from(value: std::fmt::Error) -> Self {
    Error::new(Status::GenericFailure, value)
  }
}

#[cfg(feature = "error-anyhow")]
impl From<anyhow::Error> for Error {
  fn from(value: anyhow::Error) -> Self {
    Error::new(Status::GenericFailure, format!("{:?}", value))
  }
}

#[cfg(feature = "serde-json")]
impl From<serde_json::Error> for Error {
  fn from(value: serde_json::Error) -> Self {
    Error::new(Status::InvalidArg, format!("{}", value))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_includes_reason_when_present() {
    let err = Error::new(Status::StringExpected, "Expected a string");
    assert_eq!(err.to_string(), "StringExpected, Expected a string");
    assert_eq!(Error::from_status(Status::Closing).to_string(), "Closing");
  }

  #[test]
  fn status_names_parse_back() {
    assert_eq!(Status::from_name(Status::ArrayExpected.as_ref()), Some(Status::ArrayExpected));
    assert_eq!(Status::from_name("Whatever"), None);
  }
}
