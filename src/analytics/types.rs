//! Types for the analytics rollup module
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyMetrics {
    #[serde(default)]
    pub total_calls: i64,
    #[serde(default)]
    pub connected_calls: i64,
    #[serde(default)]
    pub appointments: i64,
    #[serde(default)]
    pub listings: i64,
    #[serde(default)]
    pub prospects: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentPerformance {
    pub segment: String,
    #[serde(default)]
    pub contacts: i64,
    #[serde(default)]
    pub responses: i64,
    #[serde(default)]
    pub appointments: i64,
    #[serde(default)]
    pub conversions: i64,
}

/// One rollup per calendar day, written by the end-of-day batch upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub id: Uuid,
    pub date: NaiveDate,
    pub metrics: DailyMetrics,
    pub segment_performance: Vec<SegmentPerformance>,
    pub properties_updated: i32,
    pub new_properties: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertAnalyticsRequest {
    #[serde(default)]
    pub metrics: DailyMetrics,
    #[serde(default)]
    pub segment_performance: Vec<SegmentPerformance>,
    #[serde(default)]
    pub properties_updated: i32,
    #[serde(default)]
    pub new_properties: i32,
}
