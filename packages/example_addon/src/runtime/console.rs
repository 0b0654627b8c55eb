use std::cell::RefCell;
use std::rc::Rc;

use crate::Env;

/// Where script visible output goes
pub trait Console {
  fn log(
    &self,
    line: &str,
  );

  fn error(
    &self,
    line: &str,
  );
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
  fn log(
    &self,
    line: &str,
  ) {
    println!("{}", line);
  }

  fn error(
    &self,
    line: &str,
  ) {
    eprintln!("{}", line);
  }
}

/// Keeps every line in memory, for assertions
#[derive(Debug, Default, Clone)]
pub struct CaptureConsole {
  lines: Rc<RefCell<Vec<String>>>,
  errors: Rc<RefCell<Vec<String>>>,
}

impl CaptureConsole {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn lines(&self) -> Vec<String> {
    self.lines.borrow().clone()
  }

  pub fn errors(&self) -> Vec<String> {
    self.errors.borrow().clone()
  }

  pub fn contains(
    &self,
    line: &str,
  ) -> bool {
    self.lines.borrow().iter().any(|logged| logged == line)
  }

  pub fn clear(&self) {
    self.lines.borrow_mut().clear();
    self.errors.borrow_mut().clear();
  }
}

impl Console for CaptureConsole {
  fn log(
    &self,
    line: &str,
  ) {
    self.lines.borrow_mut().push(line.to_string());
  }

  fn error(
    &self,
    line: &str,
  ) {
    self.errors.borrow_mut().push(line.to_string());
  }
}

impl Env {
  /// `console.log`
  pub fn console_log<S: AsRef<str>>(
    &self,
    line: S,
  ) {
    self.0.console.log(line.as_ref());
  }

  /// `console.error`
  pub fn console_error<S: AsRef<str>>(
    &self,
    line: S,
  ) {
    self.0.console.error(line.as_ref());
  }
}
