//! JSON request/response contract for the HTTP demo host.

pub mod types;

pub use types::*;
