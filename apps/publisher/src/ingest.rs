//! Telemetry notification handler
//!
//! One invocation carries one pub/sub notification whose detail wraps
//! the base64 payload envelope. The pipeline and its platform session
//! are process-scoped, so warm invocations reuse both.

use aws_lambda_events::cloudwatch_events::CloudWatchEvent;
use fieldline::Pipeline;
use fieldline_client::{PlatformConfig, PlatformConnector};
use lambda_runtime::{Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

static PIPELINE: OnceLock<Pipeline> = OnceLock::new();

fn pipeline() -> fieldline_types::Result<&'static Pipeline> {
    if let Some(value) = PIPELINE.get() {
        return Ok(value);
    }

    let config = PlatformConfig::from_env()?;
    let connector = PlatformConnector::new(config);
    let _ = PIPELINE.set(Pipeline::new(Arc::new(connector)));
    Ok(PIPELINE
        .get()
        .expect("Pipeline value must be initialized"))
}

/// Notification detail forwarded by the event bus.
#[derive(Debug, Deserialize, Serialize)]
pub struct TelemetryDetail {
    /// Base64 transport envelope around the payload bytes.
    pub body: String,
}

pub async fn telemetry_handler(
    event: LambdaEvent<CloudWatchEvent<TelemetryDetail>>,
) -> Result<(), Error> {
    let pipeline = pipeline()?;

    let detail = event
        .payload
        .detail
        .ok_or_else(|| Error::from("Missing event detail"))?;

    let outcome = pipeline.handle_envelope(&detail.body).await;
    if let Err(error) = &outcome {
        tracing::error!(error = %error, "Failed to process message");
    }

    // The liveness heartbeat goes out even when the message failed.
    let heartbeat = pipeline.finish_invocation().await;
    if let Err(error) = &heartbeat {
        tracing::error!(error = %error, "Failed to report liveness run");
    }

    outcome?;
    heartbeat?;
    Ok(())
}
