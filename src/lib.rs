//! liftstreak - Activity streak engine for strength and cardio training logs
//!
//! The engine turns a user's logged strength sets and cardio sessions into a
//! qualification calendar and a current consecutive-day streak through a
//! deterministic pipeline: event normalization → day qualification → streak walk.
//!
//! ## Modules
//!
//! - **Engine**: `normalizer`, `qualifier`, `walker`, orchestrated by `pipeline`
//! - **Activity logs**: store row shapes and their conversion to events (`schema`)
//! - **Plan generation**: prompt building and validation of generated plans (`plan`)

pub mod calendar;
pub mod config;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod plan;
pub mod qualifier;
pub mod schema;
pub mod types;
pub mod walker;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use calendar::ReferenceCalendar;
pub use config::{EngineConfig, DEFAULT_HORIZON_DAYS};
pub use error::ComputeError;
pub use pipeline::{activity_log_to_report, compute_streak, EventSource, StreakEngine};
pub use qualifier::QualificationPolicy;
pub use types::{ActivityEvent, ActivityKind, DayBucket, StreakReport, StreakResult};

// Schema exports
pub use schema::{ActivityLog, ActivityLogAdapter};

/// Library version
pub const LIFTSTREAK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name used in CLI reports
pub const PRODUCER_NAME: &str = "liftstreak";
