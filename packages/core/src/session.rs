//! Session lifecycle and one-retry dispatch.
//!
//! The session moves through `Uninitialized -> Live -> Recreating ->
//! Live`: it is connected lazily on first use, reused across
//! invocations, and replaced (never refreshed) after a failed call.

use fieldline_client::{
    AnnotationSuggestion, Asset, Connect, Dataset, EventWrite, FileMeta, FileUpload, Platform,
    PlatformEvent, PlatformResult, Relationship, RunStatus, TimeSeries, TimeSeriesSpec,
};
use fieldline_types::sync::RwLock;
use fieldline_types::{Batch, Bytes, async_trait};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A live session paired with the generation that installed it.
#[derive(Clone)]
pub struct Session {
    platform: Arc<dyn Platform>,
    generation: u64,
}

/// Lazily connects and caches one live session per process.
///
/// Generation numbers keep a caller that is holding an already
/// replaced session from discarding its successor.
pub struct SessionManager {
    connector: Arc<dyn Connect>,
    live: RwLock<Option<Session>>,
    generation: AtomicU64,
}

impl SessionManager {
    pub fn new(connector: Arc<dyn Connect>) -> Self {
        Self {
            connector,
            live: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// The live session, connecting first if there is none.
    pub async fn acquire(&self) -> PlatformResult<Session> {
        if let Some(session) = self.live.read().await.as_ref() {
            return Ok(session.clone());
        }

        let mut slot = self.live.write().await;
        // Another caller may have connected while we waited.
        if let Some(session) = slot.as_ref() {
            return Ok(session.clone());
        }

        let platform = self.connector.connect().await?;
        let session = Session {
            platform,
            generation: self.generation.fetch_add(1, Ordering::Relaxed) + 1,
        };
        *slot = Some(session.clone());
        Ok(session)
    }

    /// Drop the live session, unless it was already replaced.
    pub async fn invalidate(&self, stale: &Session) {
        let mut slot = self.live.write().await;
        if slot
            .as_ref()
            .is_some_and(|live| live.generation == stale.generation)
        {
            *slot = None;
        }
    }
}

/// Platform wrapper that recovers from one failed call by replacing
/// the session and retrying once. A second failure, or a permanent
/// one, propagates to the caller.
pub struct ResilientPlatform {
    manager: SessionManager,
}

impl ResilientPlatform {
    pub fn new(connector: Arc<dyn Connect>) -> Self {
        Self {
            manager: SessionManager::new(connector),
        }
    }

    async fn dispatch<T, F, Fut>(&self, call: F) -> PlatformResult<T>
    where
        F: Fn(Arc<dyn Platform>) -> Fut + Send + Sync,
        Fut: Future<Output = PlatformResult<T>> + Send,
        T: Send,
    {
        let session = self.manager.acquire().await?;
        match call(session.platform.clone()).await {
            Ok(value) => Ok(value),
            Err(error) if error.is_transient() => {
                tracing::warn!(error = %error, "Platform call failed, recreating session");
                self.manager.invalidate(&session).await;
                let fresh = self.manager.acquire().await?;
                call(fresh.platform).await
            }
            Err(error) => Err(error),
        }
    }
}

#[async_trait]
impl Platform for ResilientPlatform {
    async fn retrieve_time_series(&self, external_id: &str) -> PlatformResult<Option<TimeSeries>> {
        self.dispatch(|platform| async move { platform.retrieve_time_series(external_id).await })
            .await
    }

    async fn create_time_series(&self, spec: &TimeSeriesSpec) -> PlatformResult<()> {
        self.dispatch(|platform| async move { platform.create_time_series(spec).await })
            .await
    }

    async fn insert_datapoints(&self, batches: &[Batch]) -> PlatformResult<()> {
        self.dispatch(|platform| async move { platform.insert_datapoints(batches).await })
            .await
    }

    async fn retrieve_event(&self, external_id: &str) -> PlatformResult<Option<PlatformEvent>> {
        self.dispatch(|platform| async move { platform.retrieve_event(external_id).await })
            .await
    }

    async fn create_event(&self, event: &EventWrite) -> PlatformResult<()> {
        self.dispatch(|platform| async move { platform.create_event(event).await })
            .await
    }

    async fn update_event(&self, event: &EventWrite) -> PlatformResult<()> {
        self.dispatch(|platform| async move { platform.update_event(event).await })
            .await
    }

    async fn retrieve_asset(&self, external_id: &str) -> PlatformResult<Option<Asset>> {
        self.dispatch(|platform| async move { platform.retrieve_asset(external_id).await })
            .await
    }

    async fn retrieve_file(&self, external_id: &str) -> PlatformResult<Option<FileMeta>> {
        self.dispatch(|platform| async move { platform.retrieve_file(external_id).await })
            .await
    }

    async fn upload_file(&self, upload: &FileUpload, content: Bytes) -> PlatformResult<FileMeta> {
        self.dispatch(|platform| {
            let content = content.clone();
            async move { platform.upload_file(upload, content).await }
        })
        .await
    }

    async fn create_relationship(&self, relationship: &Relationship) -> PlatformResult<()> {
        self.dispatch(|platform| async move { platform.create_relationship(relationship).await })
            .await
    }

    async fn retrieve_dataset(&self, external_id: &str) -> PlatformResult<Option<Dataset>> {
        self.dispatch(|platform| async move { platform.retrieve_dataset(external_id).await })
            .await
    }

    async fn suggest_annotations(
        &self,
        suggestions: &[AnnotationSuggestion],
    ) -> PlatformResult<()> {
        self.dispatch(|platform| async move { platform.suggest_annotations(suggestions).await })
            .await
    }

    async fn report_run(&self, status: RunStatus) -> PlatformResult<()> {
        self.dispatch(|platform| async move { platform.report_run(status).await })
            .await
    }
}
