use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::shared::error::ApiError;
use crate::core::shared::schema::{properties, property_owners, property_ownerships};
use crate::core::shared::utils::{with_conn, DbPool};

use super::types::{
    CreatePropertyRequest, Coordinates, Property, PropertyType, UpdatePropertyRequest,
};

#[derive(Debug, Clone, Queryable, Insertable, AsChangeset, Serialize, Deserialize)]
#[diesel(table_name = properties)]
#[diesel(treat_none_as_null = true)]
pub struct DbProperty {
    pub id: Uuid,
    pub street: String,
    pub suburb: String,
    pub state: String,
    pub postcode: String,
    pub full_address: String,
    pub property_type: String,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub car_spaces: i32,
    pub land_size: Option<f64>,
    pub building_area: Option<f64>,
    pub year_built: Option<i32>,
    pub latitude: f64,
    pub longitude: f64,
    pub valuation: Option<serde_json::Value>,
    pub market_history: serde_json::Value,
    pub data_sources: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn property_to_row(property: &Property) -> Result<DbProperty, ApiError> {
    Ok(DbProperty {
        id: property.id,
        street: property.address.street.clone(),
        suburb: property.address.suburb.clone(),
        state: property.address.state.clone(),
        postcode: property.address.postcode.clone(),
        full_address: property.address.full_address.clone(),
        property_type: property.property_type.to_string(),
        bedrooms: property.bedrooms,
        bathrooms: property.bathrooms,
        car_spaces: property.car_spaces,
        land_size: property.land_size,
        building_area: property.building_area,
        year_built: property.year_built,
        latitude: property.coordinates.lat,
        longitude: property.coordinates.lng,
        valuation: property
            .current_valuation
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?,
        market_history: serde_json::to_value(&property.market_history)?,
        data_sources: serde_json::to_value(&property.data_sources)?,
        created_at: property.created_at,
        updated_at: property.updated_at,
    })
}

pub fn row_to_property(row: DbProperty, owners: Vec<Uuid>) -> Result<Property, ApiError> {
    let property_type = PropertyType::from_label(&row.property_type).ok_or_else(|| {
        ApiError::internal(format!(
            "stored property {} has unknown type {:?}",
            row.id, row.property_type
        ))
    })?;
    Ok(Property {
        id: row.id,
        address: super::types::Address {
            street: row.street,
            suburb: row.suburb,
            state: row.state,
            postcode: row.postcode,
            full_address: row.full_address,
        },
        property_type,
        bedrooms: row.bedrooms,
        bathrooms: row.bathrooms,
        car_spaces: row.car_spaces,
        land_size: row.land_size,
        building_area: row.building_area,
        year_built: row.year_built,
        coordinates: Coordinates {
            lat: row.latitude,
            lng: row.longitude,
        },
        current_valuation: row.valuation.map(serde_json::from_value).transpose()?,
        market_history: serde_json::from_value(row.market_history)?,
        data_sources: serde_json::from_value(row.data_sources)?,
        owners,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyListQuery {
    pub search: Option<String>,
    pub suburb: Option<String>,
    /// `valuation` orders by estimate descending instead of recency.
    pub sort: Option<String>,
    pub min_lat: Option<f64>,
    pub max_lat: Option<f64>,
    pub min_lng: Option<f64>,
    pub max_lng: Option<f64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Clone)]
pub struct PropertyStore {
    pool: DbPool,
}

impl PropertyStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreatePropertyRequest) -> Result<Property, ApiError> {
        let property = request.into_property(Utc::now());
        property.validate()?;
        let row = property_to_row(&property)?;
        with_conn(&self.pool, move |conn| {
            diesel::insert_into(properties::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await?;
        Ok(property)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Property, ApiError> {
        with_conn(&self.pool, move |conn| {
            let row: DbProperty = properties::table
                .find(id)
                .first(conn)
                .optional()?
                .ok_or_else(|| ApiError::not_found(format!("property {id} does not exist")))?;
            let owners = owners_of(conn, id)?;
            row_to_property(row, owners)
        })
        .await
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdatePropertyRequest,
    ) -> Result<Property, ApiError> {
        with_conn(&self.pool, move |conn| {
            let row: DbProperty = properties::table
                .find(id)
                .first(conn)
                .optional()?
                .ok_or_else(|| ApiError::not_found(format!("property {id} does not exist")))?;
            let owners = owners_of(conn, id)?;
            let mut property = row_to_property(row, owners)?;
            request.apply(&mut property, Utc::now());
            property.validate()?;
            let updated = property_to_row(&property)?;
            diesel::update(properties::table.find(id))
                .set(&updated)
                .execute(conn)?;
            Ok(property)
        })
        .await
    }

    pub async fn list(&self, query: PropertyListQuery) -> Result<Vec<Property>, ApiError> {
        with_conn(&self.pool, move |conn| {
            let limit = query.limit.unwrap_or(50).clamp(1, 200);
            let offset = query.offset.unwrap_or(0).max(0);

            let mut q = properties::table.into_boxed();
            if let Some(search) = query.search {
                let pattern = format!("%{search}%");
                q = q.filter(properties::full_address.ilike(pattern));
            }
            if let Some(suburb) = query.suburb {
                q = q.filter(properties::suburb.eq(suburb));
            }
            if let Some(min_lat) = query.min_lat {
                q = q.filter(properties::latitude.ge(min_lat));
            }
            if let Some(max_lat) = query.max_lat {
                q = q.filter(properties::latitude.le(max_lat));
            }
            if let Some(min_lng) = query.min_lng {
                q = q.filter(properties::longitude.ge(min_lng));
            }
            if let Some(max_lng) = query.max_lng {
                q = q.filter(properties::longitude.le(max_lng));
            }
            q = match query.sort.as_deref() {
                Some("valuation") => q.order(diesel::dsl::sql::<diesel::sql_types::Text>(
                    "(valuation ->> 'estimate')::numeric DESC NULLS LAST",
                )),
                _ => q.order(properties::created_at.desc()),
            };

            let rows: Vec<DbProperty> = q.limit(limit).offset(offset).load(conn)?;

            let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
            let links: Vec<(Uuid, Uuid)> = property_ownerships::table
                .filter(property_ownerships::property_id.eq_any(&ids))
                .select((
                    property_ownerships::property_id,
                    property_ownerships::owner_id,
                ))
                .load(conn)?;
            let mut by_property: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
            for (property_id, owner_id) in links {
                by_property.entry(property_id).or_default().push(owner_id);
            }

            rows.into_iter()
                .map(|row| {
                    let owners = by_property.remove(&row.id).unwrap_or_default();
                    row_to_property(row, owners)
                })
                .collect()
        })
        .await
    }

    pub async fn count(&self) -> Result<i64, ApiError> {
        with_conn(&self.pool, move |conn| {
            Ok(properties::table.count().get_result(conn)?)
        })
        .await
    }

    /// Newest properties first, for the activity feed.
    pub async fn recently_added(
        &self,
        limit: i64,
    ) -> Result<Vec<(String, DateTime<Utc>)>, ApiError> {
        with_conn(&self.pool, move |conn| {
            Ok(properties::table
                .select((properties::full_address, properties::created_at))
                .order(properties::created_at.desc())
                .limit(limit)
                .load(conn)?)
        })
        .await
    }

    pub async fn link_owner(&self, property_id: Uuid, owner_id: Uuid) -> Result<(), ApiError> {
        with_conn(&self.pool, move |conn| {
            ensure_property_exists(conn, property_id)?;
            ensure_owner_exists(conn, owner_id)?;
            diesel::insert_into(property_ownerships::table)
                .values((
                    property_ownerships::property_id.eq(property_id),
                    property_ownerships::owner_id.eq(owner_id),
                    property_ownerships::created_at.eq(Utc::now()),
                ))
                .on_conflict_do_nothing()
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    pub async fn unlink_owner(&self, property_id: Uuid, owner_id: Uuid) -> Result<(), ApiError> {
        with_conn(&self.pool, move |conn| {
            let deleted = diesel::delete(
                property_ownerships::table
                    .filter(property_ownerships::property_id.eq(property_id))
                    .filter(property_ownerships::owner_id.eq(owner_id)),
            )
            .execute(conn)?;
            if deleted == 0 {
                return Err(ApiError::not_found(format!(
                    "owner {owner_id} is not linked to property {property_id}"
                )));
            }
            Ok(())
        })
        .await
    }
}

pub(crate) fn owners_of(conn: &mut PgConnection, property_id: Uuid) -> Result<Vec<Uuid>, ApiError> {
    Ok(property_ownerships::table
        .filter(property_ownerships::property_id.eq(property_id))
        .select(property_ownerships::owner_id)
        .order(property_ownerships::created_at.asc())
        .load(conn)?)
}

pub(crate) fn ensure_property_exists(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<(), ApiError> {
    let found: Option<Uuid> = properties::table
        .find(id)
        .select(properties::id)
        .first(conn)
        .optional()?;
    found
        .map(|_| ())
        .ok_or_else(|| ApiError::not_found(format!("property {id} does not exist")))
}

pub(crate) fn ensure_owner_exists(conn: &mut PgConnection, id: Uuid) -> Result<(), ApiError> {
    let found: Option<Uuid> = property_owners::table
        .find(id)
        .select(property_owners::id)
        .first(conn)
        .optional()?;
    found
        .map(|_| ())
        .ok_or_else(|| ApiError::not_found(format!("owner {id} does not exist")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::types::{AddressInput, Valuation, ValuationConfidence};

    #[test]
    fn row_round_trip_preserves_every_field() {
        let property = CreatePropertyRequest {
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
            building_area: None,
            year_built: Some(1998),
            coordinates: Coordinates {
                lat: -28.06,
                lng: 153.37,
            },
            current_valuation: Some(Valuation {
                estimate: Some(750000.0),
                confidence: Some(ValuationConfidence::High),
                source: Some("Domain".to_string()),
                last_updated: Utc::now(),
            }),
            market_history: vec![],
            data_sources: vec![],
        }
        .into_property(Utc::now());

        let row = property_to_row(&property).expect("to row");
        assert_eq!(row.property_type, "House");
        let back = row_to_property(row, vec![]).expect("from row");
        assert_eq!(back.address, property.address);
        assert_eq!(back.current_valuation, property.current_valuation);
        assert_eq!(back.coordinates, property.coordinates);
    }

    #[test]
    fn corrupt_property_type_is_an_internal_error() {
        let property = CreatePropertyRequest {
            address: AddressInput {
                street: "1 Test St".to_string(),
                suburb: "Merrimac".to_string(),
                state: "QLD".to_string(),
                postcode: "4226".to_string(),
            },
            property_type: PropertyType::Unit,
            bedrooms: None,
            bathrooms: None,
            car_spaces: 0,
            land_size: None,
            building_area: None,
            year_built: None,
            coordinates: Coordinates { lat: 0.0, lng: 0.0 },
            current_valuation: None,
            market_history: vec![],
            data_sources: vec![],
        }
        .into_property(Utc::now());
        let mut row = property_to_row(&property).expect("to row");
        row.property_type = "Castle".to_string();
        let err = row_to_property(row, vec![]).unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
