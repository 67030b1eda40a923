//! Message classification and payload decoding.
//!
//! Payload bytes are tried as a binary point batch first; anything
//! that is not a structurally valid batch falls back to JSON. JSON
//! payloads are classified by shape: reading arrays and single
//! readings from the gateway, or structured envelopes carrying an
//! event, an image, or an embedded pre-built batch.

use crate::error::DecodeError;
use fieldline_types::base64::Engine;
use fieldline_types::base64::engine::general_purpose::STANDARD;
use fieldline_types::{Batch, Bytes, Message, PointValue, Value, json, proto};
use serde::Deserialize;

/// Wire contract version accepted by this build. Structured envelopes
/// may state their version explicitly; older revisions are rejected
/// rather than guessed at.
pub const CONTRACT_VERSION: u32 = 2;

/// Event kind recognized on structured envelopes.
pub const ANOMALY_KIND: &str = "anomaly";

const DEFAULT_IMAGE_EXTENSION: &str = "jpg";

/// One raw reading as published by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct RawReading {
    #[serde(rename = "NodeId")]
    pub node_id: String,
    #[serde(rename = "Value")]
    pub value: RawValue,
    #[serde(rename = "DisplayName", default)]
    pub display_name: Option<String>,
}

/// The value envelope inside a raw reading.
#[derive(Debug, Clone, Deserialize)]
pub struct RawValue {
    #[serde(rename = "Value")]
    pub value: PointValue,
    #[serde(rename = "SourceTimestamp")]
    pub source_timestamp: String,
}

/// Wire shape of a structured envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructuredMessage {
    #[serde(rename = "type")]
    kind: String,
    external_id: String,
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default)]
    description: String,
    start_time: i64,
    #[serde(default)]
    end_time: Option<i64>,
    #[serde(default)]
    asset_ids: Vec<String>,
    /// Base64 of a binary point batch shipped alongside the event.
    #[serde(default)]
    datapoints: Option<String>,
    /// Base64 JPEG content.
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    file_name: Option<String>,
    /// One entry per detection: normalized x_min, y_min, x_max,
    /// y_max, then confidence and class id.
    #[serde(default)]
    coordinates: Vec<[f64; 6]>,
    #[serde(default)]
    version: Option<u32>,
}

/// A classified message, ready for dispatch.
#[derive(Debug)]
pub enum Payload {
    /// Raw gateway readings, timestamps still textual.
    Readings(Vec<RawReading>),
    /// Pre-grouped datapoint batches.
    PointBatch(Vec<Batch>),
    /// An anomaly event to upsert.
    AnomalyEvent(AnomalyMessage),
    /// An anomaly event with image evidence attached.
    ImageMessage(ImageMessage),
}

/// Event fields shared by anomaly and image messages.
#[derive(Debug, Clone)]
pub struct AnomalyMessage {
    pub external_id: String,
    pub kind: String,
    pub subtype: Option<String>,
    pub description: String,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub asset_external_ids: Vec<String>,
    /// Pre-built batches embedded alongside the event, possibly empty.
    pub datapoints: Vec<Batch>,
}

/// An anomaly event with decoded image evidence.
#[derive(Debug, Clone)]
pub struct ImageMessage {
    pub event: AnomalyMessage,
    pub content: Bytes,
    pub file_name: String,
    pub detections: Vec<Detection>,
}

/// One object detection reported by the edge model.
#[derive(Debug, Clone, Copy)]
pub struct Detection {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
    pub confidence: f64,
    pub class_id: i64,
}

impl From<[f64; 6]> for Detection {
    fn from(raw: [f64; 6]) -> Self {
        Self {
            x_min: raw[0],
            y_min: raw[1],
            x_max: raw[2],
            y_max: raw[3],
            confidence: raw[4],
            class_id: raw[5] as i64,
        }
    }
}

/// Decode the base64 transport envelope into payload bytes.
pub fn decode_envelope(body: &str) -> Result<Vec<u8>, DecodeError> {
    STANDARD
        .decode(body.trim())
        .map_err(|_| DecodeError::UndecodableMessage)
}

/// Classify payload bytes, binary first, JSON as the fallback.
pub fn decode_message(bytes: &[u8]) -> Result<Payload, DecodeError> {
    // prost will decode some non-batch inputs into an empty or partial
    // message, so a successful decode still has to pass the shape check
    // before it counts as binary.
    if let Ok(batch) = proto::PointBatch::decode(bytes) {
        if batch.is_well_formed() {
            return Ok(Payload::PointBatch(batch.into()));
        }
    }

    let value: Value = json::from_slice(bytes).map_err(|_| DecodeError::UndecodableMessage)?;
    classify_json(value)
}

fn classify_json(value: Value) -> Result<Payload, DecodeError> {
    if value.is_array() {
        let readings: Vec<RawReading> =
            json::from_value(value).map_err(|_| DecodeError::UndecodableMessage)?;
        return Ok(Payload::Readings(readings));
    }

    let Value::Object(map) = value else {
        return Err(DecodeError::UndecodableMessage);
    };

    if map.contains_key("type") || map.contains_key("image") {
        return structured(Value::Object(map));
    }

    if map.contains_key("NodeId") && map.contains_key("Value") {
        let reading: RawReading = json::from_value(Value::Object(map))
            .map_err(|_| DecodeError::UndecodableMessage)?;
        return Ok(Payload::Readings(vec![reading]));
    }

    if let Some(encoded) = map.get("datapoints").and_then(Value::as_str) {
        return Ok(Payload::PointBatch(decode_embedded_batch(encoded)?));
    }

    Err(DecodeError::UndecodableMessage)
}

fn structured(value: Value) -> Result<Payload, DecodeError> {
    let msg: StructuredMessage =
        json::from_value(value).map_err(|_| DecodeError::UndecodableMessage)?;

    if let Some(version) = msg.version {
        if version != CONTRACT_VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }
    }
    if msg.kind != ANOMALY_KIND {
        return Err(DecodeError::UndecodableMessage);
    }

    let datapoints = match msg.datapoints.as_deref() {
        Some(encoded) => decode_embedded_batch(encoded)?,
        None => Vec::new(),
    };

    let event = AnomalyMessage {
        external_id: msg.external_id,
        kind: msg.kind,
        subtype: msg.subtype,
        description: msg.description,
        start_time: msg.start_time,
        end_time: msg.end_time,
        asset_external_ids: msg.asset_ids,
        datapoints,
    };

    let Some(image) = msg.image else {
        return Ok(Payload::AnomalyEvent(event));
    };

    let content = STANDARD
        .decode(image)
        .map(Bytes::from)
        .map_err(|_| DecodeError::UndecodableMessage)?;
    let file_name = msg
        .file_name
        .unwrap_or_else(|| format!("{}.{}", event.external_id, DEFAULT_IMAGE_EXTENSION));
    let detections = msg.coordinates.into_iter().map(Detection::from).collect();

    Ok(Payload::ImageMessage(ImageMessage {
        event,
        content,
        file_name,
        detections,
    }))
}

fn decode_embedded_batch(encoded: &str) -> Result<Vec<Batch>, DecodeError> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|_| DecodeError::UndecodableMessage)?;
    let batch = proto::PointBatch::decode(bytes.as_slice())
        .map_err(|_| DecodeError::UndecodableMessage)?;
    if !batch.is_well_formed() {
        return Err(DecodeError::UndecodableMessage);
    }
    Ok(batch.into())
}
