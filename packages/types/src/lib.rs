//! Fieldline Types - shared primitives for the Fieldline publisher
//!
//! This crate is the common ground for the pipeline and the platform client:
//! the datapoint/batch model, the binary point-batch wire schema and a small
//! set of re-exports so downstream crates pull their ambient dependencies
//! from one place (`fieldline_types::tokio`, `fieldline_types::Result`, ...).

pub use anyhow::{Context, Error, Result, anyhow, bail};
pub use async_trait::async_trait;
pub use base64;
pub use bytes::Bytes;
pub use prost::Message;
pub use serde_json as json;
pub use serde_json::Value;
pub use tokio;

mod datapoints;
pub mod proto;

pub use datapoints::{Batch, Datapoint, PointValue};

/// Concurrency primitives used across the workspace
pub mod sync {
    pub use dashmap::{DashMap, DashSet};
    pub use tokio::sync::{Mutex, OnceCell, RwLock};
}
