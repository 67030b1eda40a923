//! Authenticated platform session and its factory.

use crate::auth;
use crate::config::PlatformConfig;
use crate::error::PlatformResult;
use crate::http::{ApiClient, Items};
use crate::traits::{Connect, Platform};
use crate::types::{
    AnnotationSuggestion, Asset, Dataset, EventWrite, FileMeta, FileUpload, PlatformEvent,
    Relationship, RunStatus, TimeSeries, TimeSeriesSpec,
};
use fieldline_types::{Batch, Bytes, async_trait};
use serde::{Deserialize, Serialize};
use std::slice;
use std::sync::Arc;

/// One authenticated connection to the platform.
///
/// Sessions are immutable once built. Recovery from a failed call is
/// a new session, never a refresh of this one.
pub struct PlatformSession {
    api: ApiClient,
    pipeline_external_id: String,
    dataset_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    #[serde(flatten)]
    meta: FileMeta,
    upload_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PipelineRun<'a> {
    external_id: &'a str,
    status: RunStatus,
}

impl PlatformSession {
    fn new(api: ApiClient, pipeline_external_id: String) -> Self {
        Self {
            api,
            pipeline_external_id,
            dataset_id: None,
        }
    }

    fn with_dataset(mut self, dataset_id: i64) -> Self {
        self.dataset_id = Some(dataset_id);
        self
    }
}

#[async_trait]
impl Platform for PlatformSession {
    async fn retrieve_time_series(&self, external_id: &str) -> PlatformResult<Option<TimeSeries>> {
        self.api.retrieve_one("/timeseries/byids", external_id).await
    }

    async fn create_time_series(&self, spec: &TimeSeriesSpec) -> PlatformResult<()> {
        self.api
            .post_unit("/timeseries", &Items { items: slice::from_ref(spec) })
            .await
    }

    async fn insert_datapoints(&self, batches: &[Batch]) -> PlatformResult<()> {
        self.api
            .post_unit("/timeseries/data", &Items { items: batches })
            .await
    }

    async fn retrieve_event(&self, external_id: &str) -> PlatformResult<Option<PlatformEvent>> {
        self.api.retrieve_one("/events/byids", external_id).await
    }

    async fn create_event(&self, event: &EventWrite) -> PlatformResult<()> {
        self.api
            .post_unit("/events", &Items { items: slice::from_ref(event) })
            .await
    }

    async fn update_event(&self, event: &EventWrite) -> PlatformResult<()> {
        self.api
            .post_unit("/events/update", &Items { items: slice::from_ref(event) })
            .await
    }

    async fn retrieve_asset(&self, external_id: &str) -> PlatformResult<Option<Asset>> {
        self.api.retrieve_one("/assets/byids", external_id).await
    }

    async fn retrieve_file(&self, external_id: &str) -> PlatformResult<Option<FileMeta>> {
        self.api.retrieve_one("/files/byids", external_id).await
    }

    async fn upload_file(&self, upload: &FileUpload, content: Bytes) -> PlatformResult<FileMeta> {
        let mut upload = upload.clone();
        if upload.data_set_id.is_none() {
            upload.data_set_id = self.dataset_id;
        }

        let response: UploadResponse = self.api.post("/files", &upload).await?;
        self.api
            .put_bytes(&response.upload_url, &upload.mime_type, content)
            .await?;

        Ok(response.meta)
    }

    async fn create_relationship(&self, relationship: &Relationship) -> PlatformResult<()> {
        self.api
            .post_unit(
                "/relationships",
                &Items { items: slice::from_ref(relationship) },
            )
            .await
    }

    async fn retrieve_dataset(&self, external_id: &str) -> PlatformResult<Option<Dataset>> {
        self.api.retrieve_one("/datasets/byids", external_id).await
    }

    async fn suggest_annotations(
        &self,
        suggestions: &[AnnotationSuggestion],
    ) -> PlatformResult<()> {
        self.api
            .post_unit("/annotations/suggest", &Items { items: suggestions })
            .await
    }

    async fn report_run(&self, status: RunStatus) -> PlatformResult<()> {
        let run = PipelineRun {
            external_id: &self.pipeline_external_id,
            status,
        };
        self.api
            .post_unit("/pipelines/runs", &Items { items: slice::from_ref(&run) })
            .await
    }
}

/// Builds authenticated sessions from configuration.
pub struct PlatformConnector {
    config: PlatformConfig,
    http: reqwest::Client,
}

impl PlatformConnector {
    pub fn new(config: PlatformConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Connect for PlatformConnector {
    async fn connect(&self) -> PlatformResult<Arc<dyn Platform>> {
        let token = auth::fetch_token(&self.http, &self.config).await?;
        let api = ApiClient::new(self.http.clone(), self.config.api_root(), token);
        let session =
            PlatformSession::new(api, self.config.pipeline_external_id.clone());

        session.report_run(RunStatus::Success).await?;
        tracing::info!(
            pipeline = %self.config.pipeline_external_id,
            "Connected to platform"
        );

        let session = match &self.config.dataset_external_id {
            Some(external_id) => match session.retrieve_dataset(external_id).await? {
                Some(dataset) => session.with_dataset(dataset.id),
                None => {
                    tracing::warn!(external_id = %external_id, "Configured dataset not found");
                    session
                }
            },
            None => session,
        };

        Ok(Arc::new(session))
    }
}
