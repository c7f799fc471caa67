//! Miss instrumentation
//!
//! A miss is a resolution that produced no candidates. The resolver hands
//! each one to [`MissRecorder`], which forwards it to a [`MissSink`] on a
//! background task so recording never adds latency or errors to a lookup.

pub mod error;
pub mod memory;
pub mod model;
pub mod recorder;
pub mod sink;
pub mod stats;

pub use error::{MissError, MissResult};
pub use memory::InMemoryMissSink;
pub use model::MissRecord;
pub use recorder::MissRecorder;
pub use sink::{MissSink, MissStatsSource};
pub use stats::{LanguageCount, MissStats, QueryCount};
