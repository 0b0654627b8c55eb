//! A tour of native addon patterns.
//!
//! The crate carries a small single-threaded host runtime ([`EventLoop`] and
//! [`Env`]) shaped like the N-API surface, a native module (`exampleAddon`)
//! registered into it, and the [`bridge`] that lets a background thread emit
//! events back onto the loop thread.
//!
//! ```no_run
//! use example_addon::napi::JsFunction;
//! use example_addon::EventLoop;
//!
//! example_addon::addon::register()?;
//!
//! let event_loop = EventLoop::new();
//! let env = event_loop.env();
//!
//! let addon = env.import_native("exampleAddon")?;
//! let hello = addon.get_named_property::<JsFunction>("helloWorld")?;
//! hello.call(None, &[])?;
//!
//! event_loop.run()?;
//! # Ok::<(), example_addon::Error>(())
//! ```
pub mod addon;
pub mod bridge;
mod error;
pub mod napi;
mod options;
pub mod runtime;

pub use self::error::*;
pub use self::napi::Env;
pub use self::options::*;
pub use self::runtime::EventLoop;
pub use self::runtime::LoopHandle;
