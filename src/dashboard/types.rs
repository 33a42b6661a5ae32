//! Wire shape of the dashboard snapshot.
//!
//! Field names match what the dashboard front end consumes; everything
//! serializes camelCase.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::owners::types::{EmailContact, PhoneContact, ProspectSegment};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub today_actions: Vec<DashboardAction>,
    pub metrics: SummaryMetrics,
    pub segments: Vec<SegmentSlice>,
    pub recent_activity: Vec<ActivityEvent>,
    pub last_updated: DateTime<Utc>,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAction {
    pub id: Uuid,
    pub title: String,
    pub priority: i32,
    pub action_type: String,
    pub property_owner: OwnerCard,
    pub property: PropertyCard,
    pub call_script: Option<String>,
    pub estimated_duration: Option<i32>,
    pub scheduled_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerCard {
    pub full_name: String,
    pub email: Option<EmailContact>,
    pub phone: Option<PhoneContact>,
    pub prospect_segment: Option<ProspectSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyCard {
    pub address: AddressCard,
    pub current_valuation: Option<ValuationCard>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressCard {
    pub full_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationCard {
    pub estimate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    pub total_properties: i64,
    pub total_owners: i64,
    pub today_tasks: i64,
    pub weekly_goal: i64,
    pub weekly_progress: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSlice {
    pub name: String,
    pub count: i64,
    pub percentage: f64,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}
