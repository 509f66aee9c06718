//! Workout plan generation boundary
//!
//! The plan itself is produced by an external text-generation gateway. This
//! module builds the request the gateway is called with and treats its reply
//! as untrusted: the JSON is extracted, parsed and shape-checked before
//! anything may persist it.

mod request;
mod response;

pub use request::*;
pub use response::*;
