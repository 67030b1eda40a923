//! Binary point-batch wire schema
//!
//! Gateways that pre-assemble datapoints ship them as a protobuf-encoded
//! `PointBatch` instead of per-reading JSON. The messages are written out by
//! hand with prost derives; the schema is small and fixed, so there is no
//! codegen step.
//!
//! ```text
//! PointBatch
//!   └── items: [PointBatchItem]
//!         ├── external_id: string        (tag 1, required by contract)
//!         └── points: oneof              (tags 2-3)
//!               ├── Numeric(NumericPoints)
//!               └── Text(TextPoints)
//! ```

/// A single numeric reading with an epoch-millisecond timestamp.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NumericPoint {
    #[prost(int64, tag = "1")]
    pub timestamp: i64,
    #[prost(double, tag = "2")]
    pub value: f64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NumericPoints {
    #[prost(message, repeated, tag = "1")]
    pub points: Vec<NumericPoint>,
}

/// A single string reading with an epoch-millisecond timestamp.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TextPoint {
    #[prost(int64, tag = "1")]
    pub timestamp: i64,
    #[prost(string, tag = "2")]
    pub value: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TextPoints {
    #[prost(message, repeated, tag = "1")]
    pub points: Vec<TextPoint>,
}

/// Datapoints for one time series, keyed by its external identifier.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PointBatchItem {
    #[prost(string, tag = "1")]
    pub external_id: String,
    #[prost(oneof = "point_batch_item::Points", tags = "2, 3")]
    pub points: Option<point_batch_item::Points>,
}

pub mod point_batch_item {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Points {
        #[prost(message, tag = "2")]
        Numeric(super::NumericPoints),
        #[prost(message, tag = "3")]
        Text(super::TextPoints),
    }
}

/// Top-level insertion request: one item per time series.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PointBatch {
    #[prost(message, repeated, tag = "1")]
    pub items: Vec<PointBatchItem>,
}

impl PointBatch {
    /// Whether the decoded message satisfies the wire contract: at least one
    /// item, every item carrying an external identifier and a points list.
    /// Protobuf decoding is lenient enough that arbitrary bytes can decode
    /// into an empty or partial message, so callers classifying payloads must
    /// check this in addition to a successful decode.
    pub fn is_well_formed(&self) -> bool {
        !self.items.is_empty()
            && self
                .items
                .iter()
                .all(|item| !item.external_id.is_empty() && item.points.is_some())
    }
}
