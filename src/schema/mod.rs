//! Activity log schema
//!
//! Row shapes of the two activity tables as the data store returns them,
//! and the adapter that turns them into engine events. Malformed rows are
//! rejected here so the engine only ever sees valid instants.

mod activity_log;
mod adapter;

pub use activity_log::*;
pub use adapter::*;
