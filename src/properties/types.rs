//! Types for the properties module
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::shared::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    House,
    Unit,
    Townhouse,
    Villa,
    Duplex,
    Land,
    Other,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::House => "House",
            Self::Unit => "Unit",
            Self::Townhouse => "Townhouse",
            Self::Villa => "Villa",
            Self::Duplex => "Duplex",
            Self::Land => "Land",
            Self::Other => "Other",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "House" => Some(Self::House),
            "Unit" => Some(Self::Unit),
            "Townhouse" => Some(Self::Townhouse),
            "Villa" => Some(Self::Villa),
            "Duplex" => Some(Self::Duplex),
            "Land" => Some(Self::Land),
            "Other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValuationConfidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketEventType {
    Sale,
    Lease,
    Listed,
    Withdrawn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub suburb: String,
    pub state: String,
    pub postcode: String,
    pub full_address: String,
}

impl Address {
    /// Deterministic concatenation of the structured components.
    pub fn derive_full(street: &str, suburb: &str, state: &str, postcode: &str) -> String {
        format!("{street}, {suburb} {state} {postcode}")
    }

    pub fn is_consistent(&self) -> bool {
        self.full_address
            == Self::derive_full(&self.street, &self.suburb, &self.state, &self.postcode)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    pub estimate: Option<f64>,
    pub confidence: Option<ValuationConfidence>,
    pub source: Option<String>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketEvent {
    #[serde(rename = "type")]
    pub event_type: MarketEventType,
    pub date: Option<DateTime<Utc>>,
    pub price: Option<f64>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceRef {
    pub source: String,
    pub external_id: Option<String>,
    pub last_synced: DateTime<Utc>,
}

/// A tracked physical real-estate asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: Uuid,
    pub address: Address,
    pub property_type: PropertyType,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub car_spaces: i32,
    pub land_size: Option<f64>,
    pub building_area: Option<f64>,
    pub year_built: Option<i32>,
    pub coordinates: Coordinates,
    pub current_valuation: Option<Valuation>,
    pub market_history: Vec<MarketEvent>,
    /// Derived from the ownership join table, never stored on the row.
    pub owners: Vec<Uuid>,
    pub data_sources: Vec<DataSourceRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.address.street.trim().is_empty() {
            return Err(ApiError::validation("address.street is required"));
        }
        if self.address.suburb.trim().is_empty()
            || self.address.state.trim().is_empty()
            || self.address.postcode.trim().is_empty()
        {
            return Err(ApiError::validation(
                "address suburb, state and postcode are required",
            ));
        }
        if !self.address.is_consistent() {
            return Err(ApiError::validation(
                "fullAddress does not match the structured address components",
            ));
        }
        if self.bedrooms.is_some_and(|n| n < 0) {
            return Err(ApiError::validation("bedrooms must be non-negative"));
        }
        if self.bathrooms.is_some_and(|n| n < 0) {
            return Err(ApiError::validation("bathrooms must be non-negative"));
        }
        if self.car_spaces < 0 {
            return Err(ApiError::validation("carSpaces must be non-negative"));
        }
        if self.land_size.is_some_and(|v| v <= 0.0) {
            return Err(ApiError::validation("landSize must be positive"));
        }
        if self.building_area.is_some_and(|v| v <= 0.0) {
            return Err(ApiError::validation("buildingArea must be positive"));
        }
        if !(-90.0..=90.0).contains(&self.coordinates.lat) {
            return Err(ApiError::validation("coordinates.lat is out of range"));
        }
        if !(-180.0..=180.0).contains(&self.coordinates.lng) {
            return Err(ApiError::validation("coordinates.lng is out of range"));
        }
        Ok(())
    }
}

fn default_suburb() -> String {
    "Merrimac".to_string()
}

fn default_state() -> String {
    "QLD".to_string()
}

fn default_postcode() -> String {
    "4226".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    pub street: String,
    #[serde(default = "default_suburb")]
    pub suburb: String,
    #[serde(default = "default_state")]
    pub state: String,
    #[serde(default = "default_postcode")]
    pub postcode: String,
}

impl AddressInput {
    pub fn into_address(self) -> Address {
        let full_address =
            Address::derive_full(&self.street, &self.suburb, &self.state, &self.postcode);
        Address {
            street: self.street,
            suburb: self.suburb,
            state: self.state,
            postcode: self.postcode,
            full_address,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRequest {
    pub address: AddressInput,
    pub property_type: PropertyType,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    #[serde(default)]
    pub car_spaces: i32,
    pub land_size: Option<f64>,
    pub building_area: Option<f64>,
    pub year_built: Option<i32>,
    pub coordinates: Coordinates,
    pub current_valuation: Option<Valuation>,
    #[serde(default)]
    pub market_history: Vec<MarketEvent>,
    #[serde(default)]
    pub data_sources: Vec<DataSourceRef>,
}

impl CreatePropertyRequest {
    pub fn into_property(self, now: DateTime<Utc>) -> Property {
        Property {
            id: Uuid::new_v4(),
            address: self.address.into_address(),
            property_type: self.property_type,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            car_spaces: self.car_spaces,
            land_size: self.land_size,
            building_area: self.building_area,
            year_built: self.year_built,
            coordinates: self.coordinates,
            current_valuation: self.current_valuation,
            market_history: self.market_history,
            owners: vec![],
            data_sources: self.data_sources,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyRequest {
    pub address: Option<AddressInput>,
    pub property_type: Option<PropertyType>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub car_spaces: Option<i32>,
    pub land_size: Option<f64>,
    pub building_area: Option<f64>,
    pub year_built: Option<i32>,
    pub coordinates: Option<Coordinates>,
    pub current_valuation: Option<Valuation>,
    pub market_history: Option<Vec<MarketEvent>>,
    pub data_sources: Option<Vec<DataSourceRef>>,
}

impl UpdatePropertyRequest {
    /// Merge into an existing property; the full address is re-derived
    /// whenever address components change.
    pub fn apply(self, property: &mut Property, now: DateTime<Utc>) {
        if let Some(address) = self.address {
            property.address = address.into_address();
        }
        if let Some(property_type) = self.property_type {
            property.property_type = property_type;
        }
        if let Some(bedrooms) = self.bedrooms {
            property.bedrooms = Some(bedrooms);
        }
        if let Some(bathrooms) = self.bathrooms {
            property.bathrooms = Some(bathrooms);
        }
        if let Some(car_spaces) = self.car_spaces {
            property.car_spaces = car_spaces;
        }
        if let Some(land_size) = self.land_size {
            property.land_size = Some(land_size);
        }
        if let Some(building_area) = self.building_area {
            property.building_area = Some(building_area);
        }
        if let Some(year_built) = self.year_built {
            property.year_built = Some(year_built);
        }
        if let Some(coordinates) = self.coordinates {
            property.coordinates = coordinates;
        }
        if let Some(valuation) = self.current_valuation {
            property.current_valuation = Some(valuation);
        }
        if let Some(history) = self.market_history {
            property.market_history = history;
        }
        if let Some(sources) = self.data_sources {
            property.data_sources = sources;
        }
        property.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_property() -> Property {
        CreatePropertyRequest {
            address: AddressInput {
                street: "15 Woodland Drive".to_string(),
                suburb: "Merrimac".to_string(),
                state: "QLD".to_string(),
                postcode: "4226".to_string(),
            },
            property_type: PropertyType::House,
            bedrooms: Some(4),
            bathrooms: Some(2),
            car_spaces: 2,
            land_size: Some(620.0),
            building_area: Some(210.0),
            year_built: Some(1998),
            coordinates: Coordinates {
                lat: -28.06,
                lng: 153.37,
            },
            current_valuation: None,
            market_history: vec![],
            data_sources: vec![],
        }
        .into_property(Utc::now())
    }

    #[test]
    fn full_address_is_derived_from_components() {
        let property = sample_property();
        assert_eq!(
            property.address.full_address,
            "15 Woodland Drive, Merrimac QLD 4226"
        );
        assert!(property.validate().is_ok());
    }

    #[test]
    fn address_input_defaults_to_the_farm_area() {
        let input: AddressInput =
            serde_json::from_value(serde_json::json!({ "street": "8 Riverside Court" }))
                .expect("deserialize");
        let address = input.into_address();
        assert_eq!(address.full_address, "8 Riverside Court, Merrimac QLD 4226");
    }

    #[test]
    fn update_recomputes_full_address() {
        let mut property = sample_property();
        UpdatePropertyRequest {
            address: Some(AddressInput {
                street: "22 Pacific View Street".to_string(),
                suburb: "Merrimac".to_string(),
                state: "QLD".to_string(),
                postcode: "4226".to_string(),
            }),
            ..Default::default()
        }
        .apply(&mut property, Utc::now());
        assert_eq!(
            property.address.full_address,
            "22 Pacific View Street, Merrimac QLD 4226"
        );
        assert!(property.address.is_consistent());
    }

    #[test]
    fn negative_bedrooms_fail_validation() {
        let mut property = sample_property();
        property.bedrooms = Some(-1);
        let err = property.validate().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn zero_land_size_fails_validation() {
        let mut property = sample_property();
        property.land_size = Some(0.0);
        assert!(property.validate().is_err());
    }

    #[test]
    fn stale_full_address_fails_validation() {
        let mut property = sample_property();
        property.address.street = "1 Somewhere Else".to_string();
        assert!(property.validate().is_err());
    }

    #[test]
    fn property_type_labels_round_trip() {
        for label in ["House", "Unit", "Townhouse", "Villa", "Duplex", "Land", "Other"] {
            let parsed = PropertyType::from_label(label).expect("known label");
            assert_eq!(parsed.as_str(), label);
        }
        assert!(PropertyType::from_label("Castle").is_none());
    }

    #[test]
    fn unknown_enum_labels_are_rejected_on_the_wire() {
        let result: Result<PropertyType, _> = serde_json::from_value(serde_json::json!("Castle"));
        assert!(result.is_err());
    }
}
