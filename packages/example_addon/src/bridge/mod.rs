//! Background-worker notification bridge
//!
//! A worker thread ticks a counter once per interval and signals the loop
//! through a [`Notifier`]. On the loop thread a [`Dispatcher`] reads the
//! latest counter value and hands it to a [`Listener`]. [`TickBridge`] ties
//! the pieces together with `start`/`stop`.
//!
//! Signals that arrive before the loop services the previous one coalesce,
//! so listeners may see values skip ahead. They never see a value twice or
//! out of order within one run.
mod controller;
mod dispatcher;
mod notifier;
mod worker;

pub use self::controller::TickBridge;
pub use self::dispatcher::Dispatcher;
pub use self::dispatcher::Listener;
pub use self::dispatcher::TickEvent;
pub use self::notifier::Notifier;
pub use self::notifier::NotifierSignal;
pub use self::worker::WorkerTask;
