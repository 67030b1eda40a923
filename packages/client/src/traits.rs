//! Platform trait definitions

use crate::error::PlatformResult;
use crate::types::{
    AnnotationSuggestion, Asset, Dataset, EventWrite, FileMeta, FileUpload, PlatformEvent,
    Relationship, RunStatus, TimeSeries, TimeSeriesSpec,
};
use fieldline_types::{Batch, Bytes, async_trait};
use std::sync::Arc;

/// Operations the ingestion pipeline performs against the platform.
///
/// Retrievals tolerate misses and return `None`; writes succeed or
/// fail as a whole.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Look up a time series by external id.
    async fn retrieve_time_series(&self, external_id: &str) -> PlatformResult<Option<TimeSeries>>;

    /// Create a time series.
    async fn create_time_series(&self, spec: &TimeSeriesSpec) -> PlatformResult<()>;

    /// Insert datapoints into one or more time series.
    async fn insert_datapoints(&self, batches: &[Batch]) -> PlatformResult<()>;

    /// Look up an event by external id.
    async fn retrieve_event(&self, external_id: &str) -> PlatformResult<Option<PlatformEvent>>;

    /// Create an event.
    async fn create_event(&self, event: &EventWrite) -> PlatformResult<()>;

    /// Replace the mutable fields of an existing event.
    async fn update_event(&self, event: &EventWrite) -> PlatformResult<()>;

    /// Look up an asset by external id.
    async fn retrieve_asset(&self, external_id: &str) -> PlatformResult<Option<Asset>>;

    /// Look up file metadata by external id.
    async fn retrieve_file(&self, external_id: &str) -> PlatformResult<Option<FileMeta>>;

    /// Create a file entry and upload its content.
    async fn upload_file(&self, upload: &FileUpload, content: Bytes) -> PlatformResult<FileMeta>;

    /// Create a relationship between two resources.
    async fn create_relationship(&self, relationship: &Relationship) -> PlatformResult<()>;

    /// Look up a dataset by external id.
    async fn retrieve_dataset(&self, external_id: &str) -> PlatformResult<Option<Dataset>>;

    /// Submit annotation suggestions for review.
    async fn suggest_annotations(
        &self,
        suggestions: &[AnnotationSuggestion],
    ) -> PlatformResult<()>;

    /// Report a liveness run for the ingestion pipeline.
    async fn report_run(&self, status: RunStatus) -> PlatformResult<()>;
}

/// Factory for authenticated platform sessions.
#[async_trait]
pub trait Connect: Send + Sync {
    /// Build a fresh session: authenticate, report liveness, resolve
    /// the configured dataset.
    async fn connect(&self) -> PlatformResult<Arc<dyn Platform>>;
}
