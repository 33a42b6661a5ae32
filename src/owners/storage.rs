use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::shared::error::ApiError;
use crate::core::shared::schema::{property_owners, property_ownerships};
use crate::core::shared::utils::{with_conn, DbPool};

use super::types::{
    CreateOwnerRequest, PropertyOwner, ProspectSegment, SegmentCategory, UpdateOwnerRequest,
};

#[derive(Debug, Clone, Queryable, Insertable, AsChangeset, Serialize, Deserialize)]
#[diesel(table_name = property_owners)]
#[diesel(treat_none_as_null = true)]
pub struct DbPropertyOwner {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: Option<serde_json::Value>,
    pub phone: Option<serde_json::Value>,
    pub estimated_age: Option<i32>,
    pub occupation: Option<String>,
    pub household_income: Option<String>,
    pub ownership_type: Option<String>,
    pub prospect_segment: Option<serde_json::Value>,
    pub interactions: serde_json::Value,
    pub preferred_contact: Option<String>,
    pub do_not_contact: bool,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn label_to_value(label: &str) -> serde_json::Value {
    serde_json::Value::String(label.to_string())
}

pub fn owner_to_row(owner: &PropertyOwner) -> Result<DbPropertyOwner, ApiError> {
    Ok(DbPropertyOwner {
        id: owner.id,
        first_name: owner.first_name.clone(),
        last_name: owner.last_name.clone(),
        full_name: owner.full_name.clone(),
        email: owner.email.as_ref().map(serde_json::to_value).transpose()?,
        phone: owner.phone.as_ref().map(serde_json::to_value).transpose()?,
        estimated_age: owner.estimated_age,
        occupation: owner.occupation.clone(),
        household_income: owner
            .household_income
            .map(|v| serde_json::to_value(v))
            .transpose()?
            .and_then(|v| v.as_str().map(str::to_string)),
        ownership_type: owner
            .ownership_type
            .map(|v| serde_json::to_value(v))
            .transpose()?
            .and_then(|v| v.as_str().map(str::to_string)),
        prospect_segment: owner
            .prospect_segment
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?,
        interactions: serde_json::to_value(&owner.interactions)?,
        preferred_contact: owner
            .preferred_contact
            .map(|v| serde_json::to_value(v))
            .transpose()?
            .and_then(|v| v.as_str().map(str::to_string)),
        do_not_contact: owner.do_not_contact,
        tags: owner.tags.clone(),
        notes: owner.notes.clone(),
        created_at: owner.created_at,
        updated_at: owner.updated_at,
    })
}

pub fn row_to_owner(row: DbPropertyOwner, properties: Vec<Uuid>) -> Result<PropertyOwner, ApiError> {
    Ok(PropertyOwner {
        id: row.id,
        first_name: row.first_name,
        last_name: row.last_name,
        full_name: row.full_name,
        email: row.email.map(serde_json::from_value).transpose()?,
        phone: row.phone.map(serde_json::from_value).transpose()?,
        estimated_age: row.estimated_age,
        occupation: row.occupation,
        household_income: row
            .household_income
            .map(|s| serde_json::from_value(label_to_value(&s)))
            .transpose()?,
        properties,
        ownership_type: row
            .ownership_type
            .map(|s| serde_json::from_value(label_to_value(&s)))
            .transpose()?,
        prospect_segment: row.prospect_segment.map(serde_json::from_value).transpose()?,
        interactions: serde_json::from_value(row.interactions)?,
        preferred_contact: row
            .preferred_contact
            .map(|s| serde_json::from_value(label_to_value(&s)))
            .transpose()?,
        do_not_contact: row.do_not_contact,
        tags: row.tags,
        notes: row.notes,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwnerListQuery {
    pub search: Option<String>,
    pub segment: Option<SegmentCategory>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Clone)]
pub struct OwnerStore {
    pool: DbPool,
}

impl OwnerStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateOwnerRequest) -> Result<PropertyOwner, ApiError> {
        let owner = request.into_owner(Utc::now());
        owner.validate()?;
        let row = owner_to_row(&owner)?;
        with_conn(&self.pool, move |conn| {
            diesel::insert_into(property_owners::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await?;
        Ok(owner)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<PropertyOwner, ApiError> {
        with_conn(&self.pool, move |conn| {
            let row: DbPropertyOwner = property_owners::table
                .find(id)
                .first(conn)
                .optional()?
                .ok_or_else(|| ApiError::not_found(format!("owner {id} does not exist")))?;
            let properties = properties_of(conn, id)?;
            row_to_owner(row, properties)
        })
        .await
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateOwnerRequest,
    ) -> Result<PropertyOwner, ApiError> {
        with_conn(&self.pool, move |conn| {
            let row: DbPropertyOwner = property_owners::table
                .find(id)
                .first(conn)
                .optional()?
                .ok_or_else(|| ApiError::not_found(format!("owner {id} does not exist")))?;
            let properties = properties_of(conn, id)?;
            let mut owner = row_to_owner(row, properties)?;
            request.apply(&mut owner, Utc::now());
            owner.validate()?;
            let updated = owner_to_row(&owner)?;
            diesel::update(property_owners::table.find(id))
                .set(&updated)
                .execute(conn)?;
            Ok(owner)
        })
        .await
    }

    pub async fn list(&self, query: OwnerListQuery) -> Result<Vec<PropertyOwner>, ApiError> {
        with_conn(&self.pool, move |conn| {
            let limit = query.limit.unwrap_or(50).clamp(1, 200);
            let offset = query.offset.unwrap_or(0).max(0);

            let mut q = property_owners::table.into_boxed();
            if let Some(search) = query.search {
                let pattern = format!("%{search}%");
                q = q.filter(property_owners::full_name.ilike(pattern));
            }
            if let Some(email) = query.email {
                q = q.filter(
                    diesel::dsl::sql::<diesel::sql_types::Bool>("email ->> 'address' = ")
                        .bind::<diesel::sql_types::Text, _>(email),
                );
            }
            if let Some(mobile) = query.mobile {
                q = q.filter(
                    diesel::dsl::sql::<diesel::sql_types::Bool>("phone ->> 'mobile' = ")
                        .bind::<diesel::sql_types::Text, _>(mobile),
                );
            }

            let mut rows: Vec<DbPropertyOwner> = q
                .order(property_owners::full_name.asc())
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            // Segment lives inside the jsonb document; filter after load.
            if let Some(segment) = query.segment {
                rows.retain(|row| {
                    row.prospect_segment
                        .as_ref()
                        .and_then(|v| v.get("category"))
                        .and_then(|v| v.as_str())
                        == Some(segment.as_str())
                });
            }

            let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
            let links: Vec<(Uuid, Uuid)> = property_ownerships::table
                .filter(property_ownerships::owner_id.eq_any(&ids))
                .select((
                    property_ownerships::owner_id,
                    property_ownerships::property_id,
                ))
                .load(conn)?;
            let mut by_owner: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
            for (owner_id, property_id) in links {
                by_owner.entry(owner_id).or_default().push(property_id);
            }

            rows.into_iter()
                .map(|row| {
                    let properties = by_owner.remove(&row.id).unwrap_or_default();
                    row_to_owner(row, properties)
                })
                .collect()
        })
        .await
    }

    pub async fn count(&self) -> Result<i64, ApiError> {
        with_conn(&self.pool, move |conn| {
            Ok(property_owners::table.count().get_result(conn)?)
        })
        .await
    }

    /// Segment classifications of every classified owner, for the
    /// dashboard breakdown.
    pub async fn segment_classifications(&self) -> Result<Vec<ProspectSegment>, ApiError> {
        with_conn(&self.pool, move |conn| {
            let raw: Vec<Option<serde_json::Value>> = property_owners::table
                .filter(property_owners::prospect_segment.is_not_null())
                .select(property_owners::prospect_segment)
                .load(conn)?;
            raw.into_iter()
                .flatten()
                .map(|value| Ok(serde_json::from_value(value)?))
                .collect()
        })
        .await
    }

    /// Owners whose record changed after creation, newest change first,
    /// for the activity feed.
    pub async fn recently_updated(
        &self,
        limit: i64,
    ) -> Result<Vec<(String, DateTime<Utc>)>, ApiError> {
        with_conn(&self.pool, move |conn| {
            Ok(property_owners::table
                .filter(property_owners::updated_at.gt(property_owners::created_at))
                .select((property_owners::full_name, property_owners::updated_at))
                .order(property_owners::updated_at.desc())
                .limit(limit)
                .load(conn)?)
        })
        .await
    }
}

fn properties_of(conn: &mut PgConnection, owner_id: Uuid) -> Result<Vec<Uuid>, ApiError> {
    Ok(property_ownerships::table
        .filter(property_ownerships::owner_id.eq(owner_id))
        .select(property_ownerships::property_id)
        .order(property_ownerships::created_at.asc())
        .load(conn)?)
}
