//! Fieldline - telemetry normalization and dispatch for industrial data
//!
//! This crate turns raw pub/sub telemetry into platform writes: it
//! classifies each message, normalizes it into datapoint batches or
//! event upserts, and dispatches the result through a session that
//! recovers itself once per failed call.
//!
//! ## Message Kinds
//!
//! | Kind | Encoding | Result |
//! |------|----------|--------|
//! | Readings | JSON object or array | Datapoints, grouped per series |
//! | Point batch | Binary protobuf | Datapoints, pre-grouped |
//! | Anomaly event | JSON envelope | Event upsert (+ embedded datapoints) |
//! | Image message | JSON envelope with payload | Event upsert + file + annotations |

mod batch;
mod cache;
mod error;
mod events;
mod files;
mod session;
mod time;

pub mod decode;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::BatchAssembler;
pub use cache::ExistenceCache;
pub use decode::{AnomalyMessage, Detection, ImageMessage, Payload, RawReading};
pub use error::{DecodeError, PipelineError, PipelineResult};
pub use events::upsert_event;
pub use files::{ANNOTATION_LABELS, handle_image};
pub use pipeline::Pipeline;
pub use session::{ResilientPlatform, SessionManager};
pub use time::parse_source_timestamp;
