//! Domain layer: types, errors, and ports. No dependency on any concrete
//! storage, parser, or transport — everything here is an interface or a
//! plain value type that the `application` and `adapters` layers build on.

pub mod chunking;
pub mod constants;
pub mod error;
pub mod ports;
pub mod types;

pub use error::{Error, Result};
