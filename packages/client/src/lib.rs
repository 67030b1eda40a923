//! Client for the downstream industrial data platform.
//!
//! Covers environment-driven configuration, client-credentials
//! authentication, and an authenticated session implementing the
//! [`Platform`] operations consumed by the ingestion pipeline.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod traits;
pub mod types;

pub use config::PlatformConfig;
pub use error::{PlatformError, PlatformResult};
pub use session::{PlatformConnector, PlatformSession};
pub use traits::{Connect, Platform};
pub use types::{
    AnnotationSuggestion, Asset, BoundingBox, Dataset, EventWrite, FileMeta, FileUpload,
    PlatformEvent, Relationship, RunStatus, TimeSeries, TimeSeriesSpec,
};
