//! Shared test doubles for pipeline and session tests.

use fieldline_client::{
    AnnotationSuggestion, Asset, Connect, Dataset, EventWrite, FileMeta, FileUpload, Platform,
    PlatformError, PlatformEvent, PlatformResult, Relationship, RunStatus, TimeSeries,
    TimeSeriesSpec,
};
use fieldline_types::{Batch, Bytes, async_trait};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory platform double. Lookups answer from canned maps, writes
/// are recorded, and each call can be made to fail on demand.
#[derive(Default)]
pub struct MockPlatform {
    time_series: Mutex<HashMap<String, TimeSeries>>,
    assets: HashMap<String, i64>,
    events: Mutex<HashMap<String, PlatformEvent>>,
    files: Mutex<HashMap<String, FileMeta>>,
    datasets: HashMap<String, i64>,

    fail_transient_remaining: AtomicUsize,
    fail_permanent_remaining: AtomicUsize,

    pub calls: AtomicUsize,
    pub log: Mutex<Vec<&'static str>>,
    pub created_time_series: Mutex<Vec<TimeSeriesSpec>>,
    pub inserted: Mutex<Vec<Vec<Batch>>>,
    pub created_events: Mutex<Vec<EventWrite>>,
    pub updated_events: Mutex<Vec<EventWrite>>,
    pub uploads: Mutex<Vec<(FileUpload, Bytes)>>,
    pub relationships: Mutex<Vec<Relationship>>,
    pub suggestions: Mutex<Vec<AnnotationSuggestion>>,
    pub runs: Mutex<Vec<RunStatus>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_time_series(self, external_id: &str) -> Self {
        self.time_series.lock().unwrap().insert(
            external_id.to_string(),
            TimeSeries {
                id: 100,
                external_id: external_id.to_string(),
                name: None,
                is_string: false,
            },
        );
        self
    }

    pub fn with_asset(mut self, external_id: &str, id: i64) -> Self {
        self.assets.insert(external_id.to_string(), id);
        self
    }

    pub fn with_event(self, external_id: &str, id: i64) -> Self {
        self.events.lock().unwrap().insert(
            external_id.to_string(),
            PlatformEvent {
                id,
                external_id: external_id.to_string(),
            },
        );
        self
    }

    pub fn with_file(self, external_id: &str, id: i64) -> Self {
        self.files.lock().unwrap().insert(
            external_id.to_string(),
            FileMeta {
                id,
                external_id: external_id.to_string(),
                name: external_id.to_string(),
                mime_type: Some("image/jpeg".to_string()),
            },
        );
        self
    }

    pub fn with_dataset(mut self, external_id: &str, id: i64) -> Self {
        self.datasets.insert(external_id.to_string(), id);
        self
    }

    /// Make the next `n` calls fail with a transient network error.
    pub fn fail_next_transient(&self, n: usize) {
        self.fail_transient_remaining.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` calls fail with a permanent client error.
    pub fn fail_next_permanent(&self, n: usize) {
        self.fail_permanent_remaining.store(n, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The operations seen so far, in call order.
    pub fn ops(&self) -> Vec<&'static str> {
        self.log.lock().unwrap().clone()
    }

    fn gate(&self, op: &'static str) -> PlatformResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(op);

        if self
            .fail_permanent_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(PlatformError::Api {
                status: 400,
                message: "bad request".to_string(),
            });
        }

        if self
            .fail_transient_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(PlatformError::Network("connection reset".to_string()));
        }

        Ok(())
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn retrieve_time_series(&self, external_id: &str) -> PlatformResult<Option<TimeSeries>> {
        self.gate("retrieve_time_series")?;
        Ok(self.time_series.lock().unwrap().get(external_id).cloned())
    }

    async fn create_time_series(&self, spec: &TimeSeriesSpec) -> PlatformResult<()> {
        self.gate("create_time_series")?;
        self.time_series.lock().unwrap().insert(
            spec.external_id.clone(),
            TimeSeries {
                id: 100,
                external_id: spec.external_id.clone(),
                name: Some(spec.name.clone()),
                is_string: spec.is_string,
            },
        );
        self.created_time_series.lock().unwrap().push(spec.clone());
        Ok(())
    }

    async fn insert_datapoints(&self, batches: &[Batch]) -> PlatformResult<()> {
        self.gate("insert_datapoints")?;
        self.inserted.lock().unwrap().push(batches.to_vec());
        Ok(())
    }

    async fn retrieve_event(&self, external_id: &str) -> PlatformResult<Option<PlatformEvent>> {
        self.gate("retrieve_event")?;
        Ok(self.events.lock().unwrap().get(external_id).cloned())
    }

    async fn create_event(&self, event: &EventWrite) -> PlatformResult<()> {
        self.gate("create_event")?;
        self.events.lock().unwrap().insert(
            event.external_id.clone(),
            PlatformEvent {
                id: 500,
                external_id: event.external_id.clone(),
            },
        );
        self.created_events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn update_event(&self, event: &EventWrite) -> PlatformResult<()> {
        self.gate("update_event")?;
        self.updated_events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn retrieve_asset(&self, external_id: &str) -> PlatformResult<Option<Asset>> {
        self.gate("retrieve_asset")?;
        Ok(self.assets.get(external_id).map(|id| Asset {
            id: *id,
            external_id: external_id.to_string(),
        }))
    }

    async fn retrieve_file(&self, external_id: &str) -> PlatformResult<Option<FileMeta>> {
        self.gate("retrieve_file")?;
        Ok(self.files.lock().unwrap().get(external_id).cloned())
    }

    async fn upload_file(&self, upload: &FileUpload, content: Bytes) -> PlatformResult<FileMeta> {
        self.gate("upload_file")?;
        let id = 7000 + self.uploads.lock().unwrap().len() as i64;
        let meta = FileMeta {
            id,
            external_id: upload.external_id.clone(),
            name: upload.name.clone(),
            mime_type: Some(upload.mime_type.clone()),
        };
        self.files
            .lock()
            .unwrap()
            .insert(meta.external_id.clone(), meta.clone());
        self.uploads.lock().unwrap().push((upload.clone(), content));
        Ok(meta)
    }

    async fn create_relationship(&self, relationship: &Relationship) -> PlatformResult<()> {
        self.gate("create_relationship")?;
        self.relationships.lock().unwrap().push(relationship.clone());
        Ok(())
    }

    async fn retrieve_dataset(&self, external_id: &str) -> PlatformResult<Option<Dataset>> {
        self.gate("retrieve_dataset")?;
        Ok(self.datasets.get(external_id).map(|id| Dataset {
            id: *id,
            external_id: external_id.to_string(),
        }))
    }

    async fn suggest_annotations(
        &self,
        suggestions: &[AnnotationSuggestion],
    ) -> PlatformResult<()> {
        self.gate("suggest_annotations")?;
        self.suggestions
            .lock()
            .unwrap()
            .extend(suggestions.iter().cloned());
        Ok(())
    }

    async fn report_run(&self, status: RunStatus) -> PlatformResult<()> {
        self.gate("report_run")?;
        self.runs.lock().unwrap().push(status);
        Ok(())
    }
}

/// Hands out prepared sessions in order, repeating the last one once
/// the list is exhausted.
pub struct MockConnector {
    sessions: Vec<Arc<MockPlatform>>,
    connects: AtomicUsize,
    connect_failures: AtomicUsize,
}

impl MockConnector {
    pub fn new(sessions: Vec<Arc<MockPlatform>>) -> Self {
        Self {
            sessions,
            connects: AtomicUsize::new(0),
            connect_failures: AtomicUsize::new(0),
        }
    }

    pub fn single(session: Arc<MockPlatform>) -> Self {
        Self::new(vec![session])
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Make the next `n` connection attempts fail.
    pub fn fail_next_connects(&self, n: usize) {
        self.connect_failures.store(n, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connect for MockConnector {
    async fn connect(&self) -> PlatformResult<Arc<dyn Platform>> {
        if self
            .connect_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(PlatformError::Auth("token endpoint unavailable".to_string()));
        }

        let index = self.connects.fetch_add(1, Ordering::SeqCst);
        let session = self
            .sessions
            .get(index)
            .or_else(|| self.sessions.last())
            .cloned()
            .ok_or_else(|| PlatformError::Auth("no session configured".to_string()))?;

        Ok(session)
    }
}
