use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::shared::error::ApiError;
use crate::core::shared::schema::analytics_snapshots;
use crate::core::shared::utils::{with_conn, DbPool};

use super::types::{AnalyticsSnapshot, UpsertAnalyticsRequest};

#[derive(Debug, Clone, Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = analytics_snapshots)]
pub struct DbAnalyticsSnapshot {
    pub id: Uuid,
    pub date: NaiveDate,
    pub metrics: serde_json::Value,
    pub segment_performance: serde_json::Value,
    pub properties_updated: i32,
    pub new_properties: i32,
    pub created_at: chrono::DateTime<Utc>,
}

pub fn row_to_snapshot(row: DbAnalyticsSnapshot) -> Result<AnalyticsSnapshot, ApiError> {
    Ok(AnalyticsSnapshot {
        id: row.id,
        date: row.date,
        metrics: serde_json::from_value(row.metrics)?,
        segment_performance: serde_json::from_value(row.segment_performance)?,
        properties_updated: row.properties_updated,
        new_properties: row.new_properties,
        created_at: row.created_at,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsRangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<i64>,
}

#[derive(Clone)]
pub struct AnalyticsStore {
    pool: DbPool,
}

impl AnalyticsStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Write the rollup for a day. The unique index on `date` makes this the
    /// only way a day's record comes into existence, so at most one exists.
    pub async fn upsert(
        &self,
        date: NaiveDate,
        request: UpsertAnalyticsRequest,
    ) -> Result<AnalyticsSnapshot, ApiError> {
        let metrics = serde_json::to_value(&request.metrics)?;
        let segment_performance = serde_json::to_value(&request.segment_performance)?;
        let properties_updated = request.properties_updated;
        let new_properties = request.new_properties;
        with_conn(&self.pool, move |conn| {
            let row: DbAnalyticsSnapshot = diesel::insert_into(analytics_snapshots::table)
                .values((
                    analytics_snapshots::id.eq(Uuid::new_v4()),
                    analytics_snapshots::date.eq(date),
                    analytics_snapshots::metrics.eq(&metrics),
                    analytics_snapshots::segment_performance.eq(&segment_performance),
                    analytics_snapshots::properties_updated.eq(properties_updated),
                    analytics_snapshots::new_properties.eq(new_properties),
                    analytics_snapshots::created_at.eq(Utc::now()),
                ))
                .on_conflict(analytics_snapshots::date)
                .do_update()
                .set((
                    analytics_snapshots::metrics.eq(&metrics),
                    analytics_snapshots::segment_performance.eq(&segment_performance),
                    analytics_snapshots::properties_updated.eq(properties_updated),
                    analytics_snapshots::new_properties.eq(new_properties),
                ))
                .get_result(conn)?;
            row_to_snapshot(row)
        })
        .await
    }

    pub async fn find_by_date(&self, date: NaiveDate) -> Result<AnalyticsSnapshot, ApiError> {
        with_conn(&self.pool, move |conn| {
            let row: DbAnalyticsSnapshot = analytics_snapshots::table
                .filter(analytics_snapshots::date.eq(date))
                .first(conn)
                .optional()?
                .ok_or_else(|| {
                    ApiError::not_found(format!("no analytics snapshot for {date}"))
                })?;
            row_to_snapshot(row)
        })
        .await
    }

    pub async fn list(
        &self,
        query: AnalyticsRangeQuery,
    ) -> Result<Vec<AnalyticsSnapshot>, ApiError> {
        with_conn(&self.pool, move |conn| {
            let limit = query.limit.unwrap_or(30).clamp(1, 365);
            let mut q = analytics_snapshots::table.into_boxed();
            if let Some(from) = query.from {
                q = q.filter(analytics_snapshots::date.ge(from));
            }
            if let Some(to) = query.to {
                q = q.filter(analytics_snapshots::date.le(to));
            }
            let rows: Vec<DbAnalyticsSnapshot> = q
                .order(analytics_snapshots::date.desc())
                .limit(limit)
                .load(conn)?;
            rows.into_iter().map(row_to_snapshot).collect()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::types::{DailyMetrics, SegmentPerformance};

    #[test]
    fn snapshot_documents_round_trip() {
        let row = DbAnalyticsSnapshot {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2026, 8, 4).expect("valid date"),
            metrics: serde_json::to_value(DailyMetrics {
                total_calls: 14,
                connected_calls: 9,
                appointments: 2,
                listings: 1,
                prospects: 4,
            })
            .expect("metrics"),
            segment_performance: serde_json::to_value(vec![SegmentPerformance {
                segment: "Hot Prospect".to_string(),
                contacts: 6,
                responses: 4,
                appointments: 2,
                conversions: 1,
            }])
            .expect("performance"),
            properties_updated: 12,
            new_properties: 3,
            created_at: Utc::now(),
        };
        let snapshot = row_to_snapshot(row).expect("from row");
        assert_eq!(snapshot.metrics.total_calls, 14);
        assert_eq!(snapshot.segment_performance.len(), 1);
        assert_eq!(snapshot.segment_performance[0].segment, "Hot Prospect");
    }
}
