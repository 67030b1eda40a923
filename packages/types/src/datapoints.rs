//! Datapoint and batch model
//!
//! A `Batch` is the unit of a datapoint write: all readings for one time
//! series external identifier, in arrival order. The platform accepts a list
//! of batches in a single insertion call.

use crate::proto;
use serde::{Deserialize, Serialize};

/// A reading value; the platform stores either numeric or string series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointValue {
    Numeric(f64),
    Text(String),
}

impl PointValue {
    pub fn is_numeric(&self) -> bool {
        matches!(self, PointValue::Numeric(_))
    }
}

impl From<f64> for PointValue {
    fn from(value: f64) -> Self {
        PointValue::Numeric(value)
    }
}

impl From<&str> for PointValue {
    fn from(value: &str) -> Self {
        PointValue::Text(value.to_string())
    }
}

/// One timestamped reading. Timestamps are epoch milliseconds UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datapoint {
    pub timestamp: i64,
    pub value: PointValue,
}

impl Datapoint {
    pub fn new(timestamp: i64, value: impl Into<PointValue>) -> Self {
        Self {
            timestamp,
            value: value.into(),
        }
    }
}

/// Ordered datapoints for a single time series, keyed by external identifier.
///
/// Insertion order is preserved; it only matters for downstream storage
/// ordering, not for correctness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub external_id: String,
    pub datapoints: Vec<Datapoint>,
}

impl Batch {
    pub fn new(external_id: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            datapoints: Vec::new(),
        }
    }

    pub fn push(&mut self, datapoint: Datapoint) {
        self.datapoints.push(datapoint);
    }

    pub fn len(&self) -> usize {
        self.datapoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datapoints.is_empty()
    }
}

impl From<proto::PointBatchItem> for Batch {
    fn from(item: proto::PointBatchItem) -> Self {
        let datapoints = match item.points {
            Some(proto::point_batch_item::Points::Numeric(list)) => list
                .points
                .into_iter()
                .map(|p| Datapoint::new(p.timestamp, p.value))
                .collect(),
            Some(proto::point_batch_item::Points::Text(list)) => list
                .points
                .into_iter()
                .map(|p| Datapoint {
                    timestamp: p.timestamp,
                    value: PointValue::Text(p.value),
                })
                .collect(),
            None => Vec::new(),
        };

        Batch {
            external_id: item.external_id,
            datapoints,
        }
    }
}

impl From<proto::PointBatch> for Vec<Batch> {
    fn from(batch: proto::PointBatch) -> Self {
        batch.items.into_iter().map(Batch::from).collect()
    }
}
