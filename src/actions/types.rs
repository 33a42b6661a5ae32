//! Types for the action-items module
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::shared::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    #[serde(rename = "First Contact")]
    FirstContact,
    #[serde(rename = "Follow-up Call")]
    FollowUpCall,
    #[serde(rename = "Email Campaign")]
    EmailCampaign,
    #[serde(rename = "Property Valuation")]
    PropertyValuation,
    #[serde(rename = "Market Update")]
    MarketUpdate,
    #[serde(rename = "Service Offer")]
    ServiceOffer,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstContact => "First Contact",
            Self::FollowUpCall => "Follow-up Call",
            Self::EmailCampaign => "Email Campaign",
            Self::PropertyValuation => "Property Valuation",
            Self::MarketUpdate => "Market Update",
            Self::ServiceOffer => "Service Offer",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "First Contact" => Some(Self::FirstContact),
            "Follow-up Call" => Some(Self::FollowUpCall),
            "Email Campaign" => Some(Self::EmailCampaign),
            "Property Valuation" => Some(Self::PropertyValuation),
            "Market Update" => Some(Self::MarketUpdate),
            "Service Offer" => Some(Self::ServiceOffer),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Skipped,
    Rescheduled,
}

impl ActionStatus {
    /// Statuses a completion or skip may start from.
    pub const OPEN: [ActionStatus; 2] = [Self::Pending, Self::InProgress];
    /// Statuses a reschedule may start from.
    pub const RESCHEDULABLE: [ActionStatus; 3] =
        [Self::Pending, Self::InProgress, Self::Rescheduled];
    /// Statuses only an explicit reopen leaves.
    pub const TERMINAL: [ActionStatus; 2] = [Self::Completed, Self::Skipped];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Skipped => "Skipped",
            Self::Rescheduled => "Rescheduled",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Pending" => Some(Self::Pending),
            "In Progress" => Some(Self::InProgress),
            "Completed" => Some(Self::Completed),
            "Skipped" => Some(Self::Skipped),
            "Rescheduled" => Some(Self::Rescheduled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Skipped)
    }

    /// One-directional transition matrix; Rescheduled alone re-queues.
    pub fn can_transition_to(&self, next: ActionStatus) -> bool {
        match self {
            Self::Pending => matches!(
                next,
                Self::InProgress | Self::Completed | Self::Skipped | Self::Rescheduled
            ),
            Self::InProgress => {
                matches!(next, Self::Completed | Self::Skipped | Self::Rescheduled)
            }
            Self::Rescheduled => matches!(next, Self::Pending),
            Self::Completed | Self::Skipped => false,
        }
    }
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub outcome: Option<String>,
    pub notes: Option<String>,
    pub next_action: Option<crate::owners::types::NextAction>,
}

/// A scheduled outbound-contact task tying one owner to one property.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub id: Uuid,
    pub property_owner: Uuid,
    pub property: Uuid,
    pub action_type: ActionType,
    pub priority: i32,
    pub scheduled_date: DateTime<Utc>,
    pub estimated_duration: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub call_script: Option<String>,
    pub email_template: Option<String>,
    pub status: ActionStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<ActionResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ActionItem {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::validation("title is required"));
        }
        if !(1..=10).contains(&self.priority) {
            return Err(ApiError::validation("priority must be between 1 and 10"));
        }
        if self.estimated_duration.is_some_and(|d| d <= 0) {
            return Err(ApiError::validation("estimatedDuration must be positive"));
        }
        if (self.status == ActionStatus::Completed) != self.completed_at.is_some() {
            return Err(ApiError::validation(
                "completedAt must be set exactly when status is Completed",
            ));
        }
        Ok(())
    }
}

fn default_priority() -> i32 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActionRequest {
    pub property_owner: Uuid,
    pub property: Uuid,
    pub action_type: ActionType,
    #[serde(default = "default_priority")]
    pub priority: i32,
    pub scheduled_date: DateTime<Utc>,
    pub estimated_duration: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub call_script: Option<String>,
    pub email_template: Option<String>,
    pub status: Option<ActionStatus>,
}

impl CreateActionRequest {
    pub fn into_action(self, now: DateTime<Utc>) -> Result<ActionItem, ApiError> {
        let status = self.status.unwrap_or(ActionStatus::Pending);
        if status.is_terminal() {
            return Err(ApiError::validation(
                "action items must be created in an open state",
            ));
        }
        let action = ActionItem {
            id: Uuid::new_v4(),
            property_owner: self.property_owner,
            property: self.property,
            action_type: self.action_type,
            priority: self.priority,
            scheduled_date: self.scheduled_date,
            estimated_duration: self.estimated_duration,
            title: self.title,
            description: self.description,
            call_script: self.call_script,
            email_template: self.email_template,
            status,
            completed_at: None,
            result: None,
            created_at: now,
            updated_at: now,
        };
        action.validate()?;
        Ok(action)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteActionRequest {
    pub result: Option<ActionResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleActionRequest {
    pub scheduled_date: DateTime<Utc>,
}
