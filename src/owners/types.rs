//! Types for the property-owners module
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::shared::error::ApiError;

/// AI-assessed lead classification for an owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentCategory {
    #[serde(rename = "Hot Prospect")]
    HotProspect,
    #[serde(rename = "Market Mover")]
    MarketMover,
    #[serde(rename = "Investment Opportunity")]
    InvestmentOpportunity,
    #[serde(rename = "Service Needs")]
    ServiceNeeds,
    #[serde(rename = "Lifecycle Trigger")]
    LifecycleTrigger,
}

impl SegmentCategory {
    pub const ALL: [SegmentCategory; 5] = [
        Self::HotProspect,
        Self::MarketMover,
        Self::InvestmentOpportunity,
        Self::ServiceNeeds,
        Self::LifecycleTrigger,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HotProspect => "Hot Prospect",
            Self::MarketMover => "Market Mover",
            Self::InvestmentOpportunity => "Investment Opportunity",
            Self::ServiceNeeds => "Service Needs",
            Self::LifecycleTrigger => "Lifecycle Trigger",
        }
    }

    /// Plural label used by the dashboard breakdown widget.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::HotProspect => "Hot Prospects",
            Self::MarketMover => "Market Movers",
            Self::InvestmentOpportunity => "Investment Opportunities",
            Self::ServiceNeeds => "Service Needs",
            Self::LifecycleTrigger => "Lifecycle Triggers",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::HotProspect => "#dc2626",
            Self::MarketMover => "#ea580c",
            Self::InvestmentOpportunity => "#0284c7",
            Self::ServiceNeeds => "#10b981",
            Self::LifecycleTrigger => "#8b5cf6",
        }
    }
}

impl std::fmt::Display for SegmentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HouseholdIncome {
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnershipType {
    #[serde(rename = "Owner-Occupier")]
    OwnerOccupier,
    Investor,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionType {
    Call,
    Email,
    #[serde(rename = "SMS")]
    Sms,
    Letter,
    Visit,
    Meeting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionOutcome {
    Connected,
    #[serde(rename = "No Answer")]
    NoAnswer,
    Voicemail,
    Interested,
    #[serde(rename = "Not Interested")]
    NotInterested,
    #[serde(rename = "Follow-up Scheduled")]
    FollowUpScheduled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreferredContact {
    Phone,
    Email,
    #[serde(rename = "SMS")]
    Sms,
    Letter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailContact {
    pub address: Option<String>,
    #[serde(default)]
    pub verified: bool,
    pub verification_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneContact {
    pub mobile: Option<String>,
    pub home: Option<String>,
    #[serde(default)]
    pub verified: bool,
    pub verification_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProspectSegment {
    pub category: SegmentCategory,
    pub score: i32,
    #[serde(default)]
    pub reasons: Vec<String>,
    pub last_assessed: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextAction {
    pub date: Option<DateTime<Utc>>,
    pub action: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub interaction_type: InteractionType,
    pub outcome: Option<InteractionOutcome>,
    pub notes: Option<String>,
    pub next_action: Option<NextAction>,
}

/// A natural person owning zero or more tracked properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyOwner {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: Option<EmailContact>,
    pub phone: Option<PhoneContact>,
    pub estimated_age: Option<i32>,
    pub occupation: Option<String>,
    pub household_income: Option<HouseholdIncome>,
    /// Derived from the ownership join table, never stored on the row.
    pub properties: Vec<Uuid>,
    pub ownership_type: Option<OwnershipType>,
    pub prospect_segment: Option<ProspectSegment>,
    pub interactions: Vec<Interaction>,
    pub preferred_contact: Option<PreferredContact>,
    pub do_not_contact: bool,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn derive_full_name(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}")
}

impl PropertyOwner {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.first_name.trim().is_empty() {
            return Err(ApiError::validation("firstName is required"));
        }
        if self.last_name.trim().is_empty() {
            return Err(ApiError::validation("lastName is required"));
        }
        if self.full_name != derive_full_name(&self.first_name, &self.last_name) {
            return Err(ApiError::validation(
                "fullName does not match firstName and lastName",
            ));
        }
        if let Some(segment) = &self.prospect_segment {
            if !(0..=100).contains(&segment.score) {
                return Err(ApiError::validation(
                    "prospectSegment.score must be between 0 and 100",
                ));
            }
        }
        if self.estimated_age.is_some_and(|age| age < 0) {
            return Err(ApiError::validation("estimatedAge must be non-negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOwnerRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<EmailContact>,
    pub phone: Option<PhoneContact>,
    pub estimated_age: Option<i32>,
    pub occupation: Option<String>,
    pub household_income: Option<HouseholdIncome>,
    pub ownership_type: Option<OwnershipType>,
    pub prospect_segment: Option<ProspectSegment>,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
    pub preferred_contact: Option<PreferredContact>,
    #[serde(default)]
    pub do_not_contact: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    pub notes: Option<String>,
}

impl CreateOwnerRequest {
    pub fn into_owner(self, now: DateTime<Utc>) -> PropertyOwner {
        let full_name = derive_full_name(&self.first_name, &self.last_name);
        PropertyOwner {
            id: Uuid::new_v4(),
            first_name: self.first_name,
            last_name: self.last_name,
            full_name,
            email: self.email,
            phone: self.phone,
            estimated_age: self.estimated_age,
            occupation: self.occupation,
            household_income: self.household_income,
            properties: vec![],
            ownership_type: self.ownership_type,
            prospect_segment: self.prospect_segment,
            interactions: self.interactions,
            preferred_contact: self.preferred_contact,
            do_not_contact: self.do_not_contact,
            tags: self.tags,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOwnerRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<EmailContact>,
    pub phone: Option<PhoneContact>,
    pub estimated_age: Option<i32>,
    pub occupation: Option<String>,
    pub household_income: Option<HouseholdIncome>,
    pub ownership_type: Option<OwnershipType>,
    pub prospect_segment: Option<ProspectSegment>,
    pub interactions: Option<Vec<Interaction>>,
    pub preferred_contact: Option<PreferredContact>,
    pub do_not_contact: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
}

impl UpdateOwnerRequest {
    /// Merge into an existing owner; the full name is re-derived whenever a
    /// name component changes.
    pub fn apply(self, owner: &mut PropertyOwner, now: DateTime<Utc>) {
        if let Some(first_name) = self.first_name {
            owner.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            owner.last_name = last_name;
        }
        owner.full_name = derive_full_name(&owner.first_name, &owner.last_name);
        if let Some(email) = self.email {
            owner.email = Some(email);
        }
        if let Some(phone) = self.phone {
            owner.phone = Some(phone);
        }
        if let Some(estimated_age) = self.estimated_age {
            owner.estimated_age = Some(estimated_age);
        }
        if let Some(occupation) = self.occupation {
            owner.occupation = Some(occupation);
        }
        if let Some(income) = self.household_income {
            owner.household_income = Some(income);
        }
        if let Some(ownership_type) = self.ownership_type {
            owner.ownership_type = Some(ownership_type);
        }
        if let Some(segment) = self.prospect_segment {
            owner.prospect_segment = Some(segment);
        }
        if let Some(interactions) = self.interactions {
            owner.interactions = interactions;
        }
        if let Some(preferred) = self.preferred_contact {
            owner.preferred_contact = Some(preferred);
        }
        if let Some(do_not_contact) = self.do_not_contact {
            owner.do_not_contact = do_not_contact;
        }
        if let Some(tags) = self.tags {
            owner.tags = tags;
        }
        if let Some(notes) = self.notes {
            owner.notes = Some(notes);
        }
        owner.updated_at = now;
    }
}
