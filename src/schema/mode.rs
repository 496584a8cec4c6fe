//! Per-target output mode hints.
use serde::{Deserialize, Serialize};

/// `goMode`: how ambiguous values are spelled in Go output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoMode {
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "int64")]
    Int64,
    #[serde(rename = "time.Time")]
    Time,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "timestamp")]
    Timestamp,
}

/// `tsMode`: how ambiguous values are spelled in TypeScript output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TsMode {
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "bigint")]
    BigInt,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "date")]
    Date,
}
