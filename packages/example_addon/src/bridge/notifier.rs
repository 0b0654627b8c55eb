use crate::runtime::AsyncHandle;
use crate::runtime::AsyncSender;
use crate::Env;

/// Loop side of the cross-thread notification primitive
pub struct Notifier {
  handle: Option<AsyncHandle>,
}

/// Worker side of a [`Notifier`]
#[derive(Clone)]
pub struct NotifierSignal {
  sender: AsyncSender,
}

impl Notifier {
  /// Allocate the wake primitive and register `on_signal` to run on the loop
  /// thread after each (possibly coalesced) signal
  pub fn arm<F>(
    env: &Env,
    mut on_signal: F,
  ) -> crate::Result<Self>
  where
    F: 'static + FnMut(&Env),
  {
    let handle = env
      .create_async_handle(move |env| {
        on_signal(env);
        Ok(())
      })
      .map_err(|error| crate::Error::Resource(format!("cannot arm notifier: {}", error.reason)))?;
    Ok(Self {
      handle: Some(handle),
    })
  }

  pub fn signaller(&self) -> crate::Result<NotifierSignal> {
    match &self.handle {
      Some(handle) if !handle.is_closed() => Ok(NotifierSignal {
        sender: handle.sender(),
      }),
      _ => Err(crate::Error::NotifierClosed),
    }
  }

  pub fn is_armed(&self) -> bool {
    matches!(&self.handle, Some(handle) if !handle.is_closed())
  }

  /// Release the wake primitive. Signals sent afterwards fail with
  /// [`Error::NotifierClosed`](crate::Error::NotifierClosed) and pending ones
  /// are dropped.
  pub fn disarm(&mut self) {
    if let Some(handle) = self.handle.take() {
      handle.close();
    }
  }
}

impl Drop for Notifier {
  fn drop(&mut self) {
    self.disarm();
  }
}

impl NotifierSignal {
  pub fn signal(&self) -> crate::Result<()> {
    self
      .sender
      .send()
      .map_err(|_| crate::Error::NotifierClosed)
  }

  pub fn is_closed(&self) -> bool {
    self.sender.is_closed()
  }
}
