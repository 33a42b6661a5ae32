use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::shared::error::ApiError;
use crate::core::shared::schema::{action_items, properties, property_owners};
use crate::core::shared::utils::{with_conn, DbPool};
use crate::owners::storage::{row_to_owner, DbPropertyOwner};
use crate::owners::types::PropertyOwner;
use crate::properties::storage::{
    ensure_owner_exists, ensure_property_exists, row_to_property, DbProperty,
};
use crate::properties::types::Property;

use super::types::{ActionItem, ActionResult, ActionStatus, ActionType, CreateActionRequest};

#[derive(Debug, Clone, Queryable, Insertable, AsChangeset, Serialize, Deserialize)]
#[diesel(table_name = action_items)]
#[diesel(treat_none_as_null = true)]
pub struct DbActionItem {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub property_id: Uuid,
    pub action_type: String,
    pub priority: i32,
    pub scheduled_date: DateTime<Utc>,
    pub estimated_duration: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub call_script: Option<String>,
    pub email_template: Option<String>,
    pub status: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn action_to_row(action: &ActionItem) -> Result<DbActionItem, ApiError> {
    Ok(DbActionItem {
        id: action.id,
        owner_id: action.property_owner,
        property_id: action.property,
        action_type: action.action_type.to_string(),
        priority: action.priority,
        scheduled_date: action.scheduled_date,
        estimated_duration: action.estimated_duration,
        title: action.title.clone(),
        description: action.description.clone(),
        call_script: action.call_script.clone(),
        email_template: action.email_template.clone(),
        status: action.status.to_string(),
        completed_at: action.completed_at,
        result: action.result.as_ref().map(serde_json::to_value).transpose()?,
        created_at: action.created_at,
        updated_at: action.updated_at,
    })
}

pub fn row_to_action(row: DbActionItem) -> Result<ActionItem, ApiError> {
    let action_type = ActionType::from_label(&row.action_type).ok_or_else(|| {
        ApiError::internal(format!(
            "stored action item {} has unknown type {:?}",
            row.id, row.action_type
        ))
    })?;
    let status = ActionStatus::from_label(&row.status).ok_or_else(|| {
        ApiError::internal(format!(
            "stored action item {} has unknown status {:?}",
            row.id, row.status
        ))
    })?;
    Ok(ActionItem {
        id: row.id,
        property_owner: row.owner_id,
        property: row.property_id,
        action_type,
        priority: row.priority,
        scheduled_date: row.scheduled_date,
        estimated_duration: row.estimated_duration,
        title: row.title,
        description: row.description,
        call_script: row.call_script,
        email_template: row.email_template,
        status,
        completed_at: row.completed_at,
        result: row.result.map(serde_json::from_value).transpose()?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionListQuery {
    pub status: Option<ActionStatus>,
    pub owner: Option<Uuid>,
    pub property: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Clone)]
pub struct ActionStore {
    pool: DbPool,
}

impl ActionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateActionRequest) -> Result<ActionItem, ApiError> {
        let action = request.into_action(Utc::now())?;
        let row = action_to_row(&action)?;
        with_conn(&self.pool, move |conn| {
            ensure_owner_exists(conn, row.owner_id)?;
            ensure_property_exists(conn, row.property_id)?;
            diesel::insert_into(action_items::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await?;
        Ok(action)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<ActionItem, ApiError> {
        with_conn(&self.pool, move |conn| {
            let row: DbActionItem = action_items::table
                .find(id)
                .first(conn)
                .optional()?
                .ok_or_else(|| ApiError::not_found(format!("action item {id} does not exist")))?;
            row_to_action(row)
        })
        .await
    }

    pub async fn list(&self, query: ActionListQuery) -> Result<Vec<ActionItem>, ApiError> {
        with_conn(&self.pool, move |conn| {
            let limit = query.limit.unwrap_or(50).clamp(1, 200);
            let offset = query.offset.unwrap_or(0).max(0);

            let mut q = action_items::table.into_boxed();
            if let Some(status) = query.status {
                q = q.filter(action_items::status.eq(status.as_str()));
            }
            if let Some(owner) = query.owner {
                q = q.filter(action_items::owner_id.eq(owner));
            }
            if let Some(property) = query.property {
                q = q.filter(action_items::property_id.eq(property));
            }
            if let Some(from) = query.from {
                q = q.filter(action_items::scheduled_date.ge(from));
            }
            if let Some(to) = query.to {
                q = q.filter(action_items::scheduled_date.lt(to));
            }

            let rows: Vec<DbActionItem> = q
                .order((
                    action_items::scheduled_date.asc(),
                    action_items::priority.desc(),
                ))
                .limit(limit)
                .offset(offset)
                .load(conn)?;
            rows.into_iter().map(row_to_action).collect()
        })
        .await
    }

    /// Transition to Completed. A single guarded UPDATE so two concurrent
    /// completions cannot both succeed; the loser observes Conflict.
    pub async fn complete(
        &self,
        id: Uuid,
        result: Option<ActionResult>,
    ) -> Result<ActionItem, ApiError> {
        let now = Utc::now();
        let result_value = result.as_ref().map(serde_json::to_value).transpose()?;
        with_conn(&self.pool, move |conn| {
            let updated: Option<DbActionItem> = diesel::update(
                action_items::table
                    .filter(action_items::id.eq(id))
                    .filter(action_items::status.eq_any(open_labels())),
            )
            .set((
                action_items::status.eq(ActionStatus::Completed.as_str()),
                action_items::completed_at.eq(Some(now)),
                action_items::result.eq(result_value),
                action_items::updated_at.eq(now),
            ))
            .get_result(conn)
            .optional()?;
            match updated {
                Some(row) => row_to_action(row),
                None => Err(transition_refused(conn, id)),
            }
        })
        .await
    }

    pub async fn skip(
        &self,
        id: Uuid,
        result: Option<ActionResult>,
    ) -> Result<ActionItem, ApiError> {
        let now = Utc::now();
        let result_value = result.as_ref().map(serde_json::to_value).transpose()?;
        with_conn(&self.pool, move |conn| {
            let updated: Option<DbActionItem> = diesel::update(
                action_items::table
                    .filter(action_items::id.eq(id))
                    .filter(action_items::status.eq_any(open_labels())),
            )
            .set((
                action_items::status.eq(ActionStatus::Skipped.as_str()),
                action_items::result.eq(result_value),
                action_items::updated_at.eq(now),
            ))
            .get_result(conn)
            .optional()?;
            match updated {
                Some(row) => row_to_action(row),
                None => Err(transition_refused(conn, id)),
            }
        })
        .await
    }

    /// Re-queue a non-terminal item onto a new date (Rescheduled collapses
    /// back to Pending in the same statement).
    pub async fn reschedule(
        &self,
        id: Uuid,
        scheduled_date: DateTime<Utc>,
    ) -> Result<ActionItem, ApiError> {
        let now = Utc::now();
        with_conn(&self.pool, move |conn| {
            let reschedulable: Vec<&str> = ActionStatus::RESCHEDULABLE
                .iter()
                .map(ActionStatus::as_str)
                .collect();
            let updated: Option<DbActionItem> = diesel::update(
                action_items::table
                    .filter(action_items::id.eq(id))
                    .filter(action_items::status.eq_any(reschedulable)),
            )
            .set((
                action_items::status.eq(ActionStatus::Pending.as_str()),
                action_items::scheduled_date.eq(scheduled_date),
                action_items::completed_at.eq(None::<DateTime<Utc>>),
                action_items::updated_at.eq(now),
            ))
            .get_result(conn)
            .optional()?;
            match updated {
                Some(row) => row_to_action(row),
                None => Err(transition_refused(conn, id)),
            }
        })
        .await
    }

    /// Explicit reopen of a terminal item back to Pending.
    pub async fn reopen(&self, id: Uuid) -> Result<ActionItem, ApiError> {
        let now = Utc::now();
        with_conn(&self.pool, move |conn| {
            let terminal: Vec<&str> = ActionStatus::TERMINAL
                .iter()
                .map(ActionStatus::as_str)
                .collect();
            let updated: Option<DbActionItem> = diesel::update(
                action_items::table
                    .filter(action_items::id.eq(id))
                    .filter(action_items::status.eq_any(terminal)),
            )
            .set((
                action_items::status.eq(ActionStatus::Pending.as_str()),
                action_items::completed_at.eq(None::<DateTime<Utc>>),
                action_items::updated_at.eq(now),
            ))
            .get_result(conn)
            .optional()?;
            match updated {
                Some(row) => row_to_action(row),
                None => Err(transition_refused(conn, id)),
            }
        })
        .await
    }

    /// Open items in the window, with their owner and property, ordered
    /// priority descending then scheduled time ascending.
    pub async fn scheduled_with_context(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<(ActionItem, PropertyOwner, Property)>, ApiError> {
        with_conn(&self.pool, move |conn| {
            let rows: Vec<(DbActionItem, DbPropertyOwner, DbProperty)> = action_items::table
                .inner_join(property_owners::table)
                .inner_join(properties::table)
                .filter(action_items::scheduled_date.ge(start))
                .filter(action_items::scheduled_date.lt(end))
                .filter(action_items::status.eq_any(open_labels()))
                .order((
                    action_items::priority.desc(),
                    action_items::scheduled_date.asc(),
                ))
                .load(conn)?;
            rows.into_iter()
                .map(|(action, owner, property)| {
                    Ok((
                        row_to_action(action)?,
                        row_to_owner(owner, vec![])?,
                        row_to_property(property, vec![])?,
                    ))
                })
                .collect()
        })
        .await
    }

    pub async fn count_open_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, ApiError> {
        with_conn(&self.pool, move |conn| {
            Ok(action_items::table
                .filter(action_items::scheduled_date.ge(start))
                .filter(action_items::scheduled_date.lt(end))
                .filter(action_items::status.eq_any(open_labels()))
                .count()
                .get_result(conn)?)
        })
        .await
    }

    pub async fn count_completed_since(&self, start: DateTime<Utc>) -> Result<i64, ApiError> {
        with_conn(&self.pool, move |conn| {
            Ok(action_items::table
                .filter(action_items::status.eq(ActionStatus::Completed.as_str()))
                .filter(action_items::completed_at.ge(start))
                .count()
                .get_result(conn)?)
        })
        .await
    }

    /// Latest completions joined with the owner name, for the activity feed.
    pub async fn recently_completed(
        &self,
        limit: i64,
    ) -> Result<Vec<(String, String, DateTime<Utc>)>, ApiError> {
        with_conn(&self.pool, move |conn| {
            let rows: Vec<(String, String, Option<DateTime<Utc>>)> = action_items::table
                .inner_join(property_owners::table)
                .filter(action_items::status.eq(ActionStatus::Completed.as_str()))
                .filter(action_items::completed_at.is_not_null())
                .select((
                    action_items::action_type,
                    property_owners::full_name,
                    action_items::completed_at,
                ))
                .order(action_items::completed_at.desc())
                .limit(limit)
                .load(conn)?;
            Ok(rows
                .into_iter()
                .filter_map(|(action_type, full_name, completed_at)| {
                    completed_at.map(|at| (action_type, full_name, at))
                })
                .collect())
        })
        .await
    }
}

fn open_labels() -> Vec<&'static str> {
    ActionStatus::OPEN.iter().map(ActionStatus::as_str).collect()
}

/// Zero rows from a guarded transition: either the item is gone, or it sits
/// in a state the transition may not leave.
fn transition_refused(conn: &mut PgConnection, id: Uuid) -> ApiError {
    match action_items::table
        .find(id)
        .select(action_items::status)
        .first::<String>(conn)
        .optional()
    {
        Ok(Some(current)) => {
            ApiError::conflict(format!("action item {id} is already {current}"))
        }
        Ok(None) => ApiError::not_found(format!("action item {id} does not exist")),
        Err(e) => e.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_round_trip_preserves_schedule_and_content() {
        let action = CreateActionRequest {
            property_owner: Uuid::new_v4(),
            property: Uuid::new_v4(),
            action_type: ActionType::MarketUpdate,
            priority: 6,
            scheduled_date: Utc::now(),
            estimated_duration: Some(12),
            title: "Market Update - Investment Property".to_string(),
            description: None,
            call_script: Some("Hi Jennifer, there is news about rental yields...".to_string()),
            email_template: None,
            status: None,
        }
        .into_action(Utc::now())
        .expect("create");

        let row = action_to_row(&action).expect("to row");
        assert_eq!(row.action_type, "Market Update");
        assert_eq!(row.status, "Pending");
        let back = row_to_action(row).expect("from row");
        assert_eq!(back.title, action.title);
        assert_eq!(back.action_type, action.action_type);
        assert_eq!(back.call_script, action.call_script);
        assert_eq!(back.completed_at, None);
    }

    #[test]
    fn corrupt_status_is_an_internal_error() {
        let action = CreateActionRequest {
            property_owner: Uuid::new_v4(),
            property: Uuid::new_v4(),
            action_type: ActionType::ServiceOffer,
            priority: 5,
            scheduled_date: Utc::now(),
            estimated_duration: None,
            title: "Offer".to_string(),
            description: None,
            call_script: None,
            email_template: None,
            status: None,
        }
        .into_action(Utc::now())
        .expect("create");
        let mut row = action_to_row(&action).expect("to row");
        row.status = "Paused".to_string();
        assert!(matches!(row_to_action(row), Err(ApiError::Internal(_))));
    }
}
