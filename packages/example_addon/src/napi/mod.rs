mod call_context;
mod env;
mod error;
pub mod js_values;
mod module_register;
#[cfg(feature = "serde-json")]
mod serde_value;
mod status;
mod value_type;

pub use self::call_context::CallContext;
pub use self::env::*;
pub use self::error::*;
pub use self::js_values::*;
pub use self::module_register::*;
pub use self::status::Status;
pub use self::value_type::*;

#[cfg(feature = "error-anyhow")]
pub extern crate anyhow;
