//! Wire types for the platform REST API.

use serde::{Deserialize, Serialize};

/// A time series as returned by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    pub id: i64,
    pub external_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_string: bool,
}

/// Creation payload for a time series.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesSpec {
    pub external_id: String,
    pub name: String,
    pub is_string: bool,
}

/// An event as returned by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformEvent {
    pub id: i64,
    pub external_id: String,
}

/// Write payload for creating or replacing an event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventWrite {
    pub external_id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    pub description: String,
    pub start_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub asset_ids: Vec<i64>,
}

/// An asset as returned by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: i64,
    pub external_id: String,
}

/// A dataset as returned by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: i64,
    pub external_id: String,
}

/// File metadata as returned by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    pub id: i64,
    pub external_id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Creation payload for a file upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUpload {
    pub external_id: String,
    pub name: String,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub asset_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_set_id: Option<i64>,
}

/// A typed link between two platform resources.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub external_id: String,
    pub source_external_id: String,
    pub source_type: String,
    pub target_external_id: String,
    pub target_type: String,
}

impl Relationship {
    /// Link an event to the file that documents it.
    pub fn event_to_file(event_external_id: &str, file_external_id: &str) -> Self {
        Self {
            external_id: format!("{}:{}", event_external_id, file_external_id),
            source_external_id: event_external_id.to_string(),
            source_type: "event".to_string(),
            target_external_id: file_external_id.to_string(),
            target_type: "file".to_string(),
        }
    }
}

/// Normalized [0, 1] box for a detection on an uploaded image.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

/// An annotation suggestion attached to an uploaded file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationSuggestion {
    pub annotated_resource_type: String,
    pub annotated_resource_id: i64,
    pub label: String,
    pub confidence: f64,
    pub bounding_box: BoundingBox,
}

impl AnnotationSuggestion {
    /// Suggest a labeled detection on a file.
    pub fn for_file(
        file_id: i64,
        label: impl Into<String>,
        confidence: f64,
        bounding_box: BoundingBox,
    ) -> Self {
        Self {
            annotated_resource_type: "file".to_string(),
            annotated_resource_id: file_id,
            label: label.into(),
            confidence,
            bounding_box,
        }
    }
}

/// Liveness status reported for the ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Seen,
}
