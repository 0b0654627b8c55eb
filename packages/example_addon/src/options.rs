use std::time::Duration;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_TICK_EVENT: &str = "counterTick";

pub const ENV_TICK_INTERVAL_MS: &str = "EXAMPLE_ADDON_TICK_INTERVAL_MS";
pub const ENV_TICK_EVENT: &str = "EXAMPLE_ADDON_TICK_EVENT";

/// Options for a [`TickBridge`](crate::bridge::TickBridge)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerOptions {
  /// Time the worker sleeps between two ticks. The worker does not correct
  /// for drift: each tick happens one full interval after the previous one
  /// finished signalling.
  pub interval: Duration,
  /// Name of the event handed to the listener on each delivery
  pub event_name: String,
}

impl Default for TickerOptions {
  fn default() -> Self {
    Self {
      interval: DEFAULT_TICK_INTERVAL,
      event_name: DEFAULT_TICK_EVENT.to_string(),
    }
  }
}

impl TickerOptions {
  /// Read options from the process environment
  ///
  /// * $EXAMPLE_ADDON_TICK_INTERVAL_MS
  /// * $EXAMPLE_ADDON_TICK_EVENT
  ///
  /// Variables that are not set keep their default.
  pub fn from_env() -> crate::Result<Self> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let mut options = Self::default();

    if let Some(value) = lookup(ENV_TICK_INTERVAL_MS) {
      let millis = value.trim().parse::<u64>().map_err(|_| {
        crate::Error::InvalidOption(format!(
          "{} must be a positive integer, got \"{}\"",
          ENV_TICK_INTERVAL_MS, value
        ))
      })?;
      options.interval = Duration::from_millis(millis);
    }

    if let Some(value) = lookup(ENV_TICK_EVENT) {
      options.event_name = value;
    }

    options.validate()?;
    Ok(options)
  }

  pub fn with_interval(
    mut self,
    interval: Duration,
  ) -> Self {
    self.interval = interval;
    self
  }

  pub fn with_event_name<S: Into<String>>(
    mut self,
    event_name: S,
  ) -> Self {
    self.event_name = event_name.into();
    self
  }

  pub fn validate(&self) -> crate::Result<()> {
    if self.interval.is_zero() {
      return Err(crate::Error::InvalidOption(
        "tick interval must be greater than zero".to_string(),
      ));
    }
    if self.event_name.is_empty() {
      return Err(crate::Error::InvalidOption(
        "event name must not be empty".to_string(),
      ));
    }
    Ok(())
  }
}
