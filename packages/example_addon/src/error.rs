use crate::napi;
use crate::napi::Status;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, PartialEq, Eq)]
pub enum Error {
  AlreadyRunning,
  NotRunning,
  Resource(String),
  WorkerPanicked,
  NotifierClosed,
  ModuleAlreadyRegistered(String),
  InvalidOption(String),
  Napi(napi::Error),
}

impl std::fmt::Debug for Error {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    match self {
      Self::AlreadyRunning => write!(f, "AlreadyRunning"),
      Self::NotRunning => write!(f, "NotRunning"),
      Self::Resource(arg0) => f.debug_tuple("Resource").field(arg0).finish(),
      Self::WorkerPanicked => write!(f, "WorkerPanicked"),
      Self::NotifierClosed => write!(f, "NotifierClosed"),
      Self::ModuleAlreadyRegistered(arg0) => f
        .debug_tuple("ModuleAlreadyRegistered")
        .field(arg0)
        .finish(),
      Self::InvalidOption(arg0) => f.debug_tuple("InvalidOption").field(arg0).finish(),
      Self::Napi(arg0) => f.debug_tuple("Napi").field(arg0).finish(),
    }
  }
}

impl std::fmt::Display for Error {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    match self {
      Error::AlreadyRunning => write!(f, "AlreadyRunning: the worker is already running"),
      Error::NotRunning => write!(f, "NotRunning: the worker is not running"),
      Error::Resource(reason) => write!(f, "Resource: {}", reason),
      Error::WorkerPanicked => write!(f, "WorkerPanicked: the worker thread panicked"),
      Error::NotifierClosed => write!(f, "NotifierClosed: the notifier has been disarmed"),
      Error::ModuleAlreadyRegistered(name) => {
        write!(f, "ModuleAlreadyRegistered: \"{}\"", name)
      }
      Error::InvalidOption(reason) => write!(f, "InvalidOption: {}", reason),
      Error::Napi(err) => write!(f, "{}", err),
    }
  }
}

impl std::error::Error for Error {}

impl From<napi::Error> for Error {
  fn from(value: napi::Error) -> Self {
    Self::Napi(value)
  }
}

impl From<Error> for napi::Error {
  fn from(value: Error) -> Self {
    match value {
      Error::Napi(err) => err,
      other => napi::Error::new(Status::GenericFailure, other.to_string()),
    }
  }
}
