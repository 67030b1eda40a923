//! Invocation-level orchestration.
//!
//! A [`Pipeline`] is the process-scoped context shared across
//! invocations: the resilient platform handle and the existence
//! cache. Each invocation feeds one transport envelope through
//! `handle_envelope` and closes with `finish_invocation`.

use crate::batch::BatchAssembler;
use crate::cache::ExistenceCache;
use crate::decode::{self, Payload, RawReading};
use crate::error::PipelineResult;
use crate::session::ResilientPlatform;
use crate::{events, files, time};
use fieldline_client::{Connect, Platform, RunStatus, TimeSeriesSpec};
use fieldline_types::{Batch, Datapoint};
use std::sync::Arc;

pub struct Pipeline {
    platform: ResilientPlatform,
    cache: ExistenceCache,
}

impl Pipeline {
    pub fn new(connector: Arc<dyn Connect>) -> Self {
        Self {
            platform: ResilientPlatform::new(connector),
            cache: ExistenceCache::new(),
        }
    }

    /// Process one transport envelope body (base64-encoded payload).
    pub async fn handle_envelope(&self, body: &str) -> PipelineResult<()> {
        let bytes = decode::decode_envelope(body)?;
        self.handle_message(&bytes).await
    }

    /// Classify and dispatch one decoded message.
    pub async fn handle_message(&self, bytes: &[u8]) -> PipelineResult<()> {
        match decode::decode_message(bytes)? {
            Payload::Readings(readings) => self.ingest_readings(readings).await,
            Payload::PointBatch(batches) => self.submit_batches(batches).await,
            Payload::AnomalyEvent(message) => {
                events::upsert_event(&self.platform, &message).await?;
                self.submit_batches(message.datapoints).await
            }
            Payload::ImageMessage(mut message) => {
                events::upsert_event(&self.platform, &message.event).await?;
                files::handle_image(&self.platform, &message).await?;
                let batches = std::mem::take(&mut message.event.datapoints);
                self.submit_batches(batches).await
            }
        }
    }

    /// Report the end-of-invocation heartbeat.
    pub async fn finish_invocation(&self) -> PipelineResult<()> {
        self.platform.report_run(RunStatus::Seen).await?;
        Ok(())
    }

    async fn ingest_readings(&self, readings: Vec<RawReading>) -> PipelineResult<()> {
        let mut assembler = BatchAssembler::new();

        for reading in readings {
            let timestamp = time::parse_source_timestamp(&reading.value.source_timestamp)?;
            if !assembler.contains(&reading.node_id) {
                self.ensure_time_series(&reading).await?;
            }
            assembler.push(
                &reading.node_id,
                Datapoint {
                    timestamp,
                    value: reading.value.value,
                },
            );
        }

        self.submit_batches(assembler.into_batches()).await
    }

    /// Make sure a time series exists downstream before its first
    /// datapoint of this invocation, consulting the cache first.
    async fn ensure_time_series(&self, reading: &RawReading) -> PipelineResult<()> {
        let external_id = &reading.node_id;
        if self.cache.contains(external_id) {
            return Ok(());
        }

        if self
            .platform
            .retrieve_time_series(external_id)
            .await?
            .is_none()
        {
            let spec = TimeSeriesSpec {
                external_id: external_id.clone(),
                name: reading
                    .display_name
                    .clone()
                    .unwrap_or_else(|| external_id.clone()),
                is_string: !reading.value.value.is_numeric(),
            };
            self.platform.create_time_series(&spec).await?;
            tracing::info!(external_id = %external_id, "Created time series");
        }

        self.cache.record(external_id.clone());
        Ok(())
    }

    async fn submit_batches(&self, batches: Vec<Batch>) -> PipelineResult<()> {
        if batches.is_empty() {
            return Ok(());
        }

        let datapoints: usize = batches.iter().map(Batch::len).sum();
        self.platform.insert_datapoints(&batches).await?;
        tracing::info!(
            batches = batches.len(),
            datapoints = datapoints,
            "Inserted datapoints"
        );
        Ok(())
    }
}
