use axum::{extract::State, Json};
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc, Weekday};
use std::collections::HashMap;
use std::sync::Arc;

use crate::actions::types::ActionItem;
use crate::core::middleware::AuthenticatedUser;
use crate::core::shared::error::ApiError;
use crate::core::shared::state::AppState;
use crate::owners::types::{PropertyOwner, ProspectSegment, SegmentCategory};
use crate::properties::types::Property;

use super::types::{
    ActivityEvent, AddressCard, DashboardAction, DashboardSnapshot, OwnerCard, PropertyCard,
    SegmentSlice, SummaryMetrics, ValuationCard,
};

pub async fn handle_get_dashboard(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<Json<DashboardSnapshot>, ApiError> {
    let config = &state.config.dashboard;
    let now = Utc::now();
    let (day_start, day_end) = local_day_bounds(now, config.timezone_offset_minutes);
    let week_start = local_week_start(now, config.timezone_offset_minutes);
    let activity_limit = config.recent_activity_limit;

    // Independent reads, issued together and joined before responding.
    let (
        scheduled,
        total_properties,
        total_owners,
        today_tasks,
        completed_this_week,
        classifications,
        recent_properties,
        recent_owners,
        recent_completions,
    ) = tokio::try_join!(
        state.actions.scheduled_with_context(day_start, day_end),
        state.properties.count(),
        state.owners.count(),
        state.actions.count_open_between(day_start, day_end),
        state.actions.count_completed_since(week_start),
        state.owners.segment_classifications(),
        state.properties.recently_added(activity_limit),
        state.owners.recently_updated(activity_limit),
        state.actions.recently_completed(activity_limit),
    )?;

    let mut today_actions: Vec<DashboardAction> = scheduled
        .into_iter()
        .map(|(action, owner, property)| to_dashboard_action(action, owner, property))
        .collect();
    sort_today_actions(&mut today_actions);

    let mut events: Vec<ActivityEvent> = Vec::new();
    events.extend(recent_properties.into_iter().map(|(address, at)| {
        ActivityEvent {
            event_type: "Property Added".to_string(),
            description: format!("New listing detected at {address}"),
            timestamp: at,
        }
    }));
    events.extend(recent_owners.into_iter().map(|(name, at)| ActivityEvent {
        event_type: "Contact Updated".to_string(),
        description: format!("Contact details updated for {name}"),
        timestamp: at,
    }));
    events.extend(
        recent_completions
            .into_iter()
            .map(|(action_type, name, at)| ActivityEvent {
                event_type: "Action Completed".to_string(),
                description: format!("{action_type} completed with {name}"),
                timestamp: at,
            }),
    );

    let snapshot = DashboardSnapshot {
        today_actions,
        metrics: SummaryMetrics {
            total_properties,
            total_owners,
            today_tasks,
            weekly_goal: config.weekly_goal,
            weekly_progress: weekly_progress(completed_this_week, config.weekly_goal),
        },
        segments: segment_breakdown(&classifications),
        recent_activity: merge_recent_activity(events, activity_limit as usize),
        last_updated: now,
        user_id: user.user_id,
    };
    Ok(Json(snapshot))
}

fn to_dashboard_action(
    action: ActionItem,
    owner: PropertyOwner,
    property: Property,
) -> DashboardAction {
    DashboardAction {
        id: action.id,
        title: action.title,
        priority: action.priority,
        action_type: action.action_type.to_string(),
        property_owner: OwnerCard {
            full_name: owner.full_name,
            email: owner.email,
            phone: owner.phone,
            prospect_segment: owner.prospect_segment,
        },
        property: PropertyCard {
            address: AddressCard {
                full_address: property.address.full_address,
            },
            current_valuation: property.current_valuation.map(|v| ValuationCard {
                estimate: v.estimate,
            }),
        },
        call_script: action.call_script,
        estimated_duration: action.estimated_duration,
        scheduled_date: action.scheduled_date,
    }
}

/// Bounds of the agent-local calendar day containing `now`, in UTC.
pub fn local_day_bounds(now: DateTime<Utc>, offset_minutes: i32) -> (DateTime<Utc>, DateTime<Utc>) {
    let offset = Duration::minutes(offset_minutes as i64);
    let local_midnight = (now + offset).date_naive().and_time(NaiveTime::MIN);
    let start = Utc.from_utc_datetime(&local_midnight) - offset;
    (start, start + Duration::days(1))
}

/// Start of the agent-local ISO week containing `now`, in UTC.
pub fn local_week_start(now: DateTime<Utc>, offset_minutes: i32) -> DateTime<Utc> {
    let offset = Duration::minutes(offset_minutes as i64);
    let monday = (now + offset).date_naive().week(Weekday::Mon).first_day();
    Utc.from_utc_datetime(&monday.and_time(NaiveTime::MIN)) - offset
}

/// Deterministic ordering keeps the polled list visually stable:
/// priority descending, then scheduled time ascending.
pub fn sort_today_actions(actions: &mut [DashboardAction]) {
    actions.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(a.scheduled_date.cmp(&b.scheduled_date))
    });
}

pub fn weekly_progress(completed: i64, goal: i64) -> i32 {
    if goal <= 0 {
        return 0;
    }
    ((completed as f64 / goal as f64) * 100.0).round() as i32
}

/// Count and share per segment category over all classified owners.
pub fn segment_breakdown(classifications: &[ProspectSegment]) -> Vec<SegmentSlice> {
    let mut counts: HashMap<SegmentCategory, i64> = HashMap::new();
    for segment in classifications {
        *counts.entry(segment.category).or_insert(0) += 1;
    }
    let total = classifications.len() as i64;
    SegmentCategory::ALL
        .iter()
        .map(|category| {
            let count = counts.get(category).copied().unwrap_or(0);
            let percentage = if total > 0 {
                (count as f64 * 1000.0 / total as f64).round() / 10.0
            } else {
                0.0
            };
            SegmentSlice {
                name: category.display_name().to_string(),
                count,
                percentage,
                color: category.color().to_string(),
            }
        })
        .collect()
}

pub fn merge_recent_activity(mut events: Vec<ActivityEvent>, limit: usize) -> Vec<ActivityEvent> {
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    events.truncate(limit);
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn card(priority: i32, scheduled_date: DateTime<Utc>) -> DashboardAction {
        DashboardAction {
            id: Uuid::new_v4(),
            title: "call".to_string(),
            priority,
            action_type: "First Contact".to_string(),
            property_owner: OwnerCard {
                full_name: "Test Owner".to_string(),
                email: None,
                phone: None,
                prospect_segment: None,
            },
            property: PropertyCard {
                address: AddressCard {
                    full_address: "1 Test St, Merrimac QLD 4226".to_string(),
                },
                current_valuation: None,
            },
            call_script: None,
            estimated_duration: None,
            scheduled_date,
        }
    }

    #[test]
    fn orders_by_priority_then_time() {
        let t = Utc.with_ymd_and_hms(2026, 8, 5, 0, 0, 0).unwrap();
        let mut actions = vec![
            card(8, t),
            card(5, t + Duration::hours(1)),
            card(8, t - Duration::hours(1)),
        ];
        sort_today_actions(&mut actions);
        assert_eq!(actions[0].priority, 8);
        assert_eq!(actions[0].scheduled_date, t - Duration::hours(1));
        assert_eq!(actions[1].priority, 8);
        assert_eq!(actions[1].scheduled_date, t);
        assert_eq!(actions[2].priority, 5);
    }

    #[test]
    fn day_bounds_follow_the_configured_offset() {
        // 2026-08-05 01:30 UTC is 11:30 local at +10h.
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 1, 30, 0).unwrap();
        let (start, end) = local_day_bounds(now, 600);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 4, 14, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 8, 5, 14, 0, 0).unwrap());
        assert!(start <= now && now < end);
    }

    #[test]
    fn late_utc_evening_lands_on_the_next_local_day() {
        // 2026-08-04 20:00 UTC is already 2026-08-05 06:00 local at +10h.
        let now = Utc.with_ymd_and_hms(2026, 8, 4, 20, 0, 0).unwrap();
        let (start, _) = local_day_bounds(now, 600);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 4, 14, 0, 0).unwrap());
    }

    #[test]
    fn week_starts_on_local_monday() {
        // 2026-08-05 is a Wednesday.
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 1, 30, 0).unwrap();
        let week_start = local_week_start(now, 600);
        // Local Monday 2026-08-03 00:00 is Sunday 14:00 UTC.
        assert_eq!(
            week_start,
            Utc.with_ymd_and_hms(2026, 8, 2, 14, 0, 0).unwrap()
        );
    }

    #[test]
    fn segment_percentages_sum_to_about_one_hundred() {
        let now = Utc::now();
        let mut classifications = Vec::new();
        let spread = [
            (SegmentCategory::HotProspect, 23),
            (SegmentCategory::MarketMover, 45),
            (SegmentCategory::InvestmentOpportunity, 34),
            (SegmentCategory::ServiceNeeds, 28),
            (SegmentCategory::LifecycleTrigger, 16),
        ];
        for (category, count) in spread {
            for _ in 0..count {
                classifications.push(ProspectSegment {
                    category,
                    score: 50,
                    reasons: vec![],
                    last_assessed: now,
                });
            }
        }
        let slices = segment_breakdown(&classifications);
        assert_eq!(slices.len(), 5);
        let total: f64 = slices.iter().map(|s| s.percentage).sum();
        assert!((total - 100.0).abs() <= 0.5, "sum was {total}");
        let hot = slices.iter().find(|s| s.name == "Hot Prospects").unwrap();
        assert_eq!(hot.count, 23);
        assert_eq!(hot.color, "#dc2626");
    }

    #[test]
    fn empty_population_yields_zeroed_slices() {
        let slices = segment_breakdown(&[]);
        assert_eq!(slices.len(), 5);
        assert!(slices.iter().all(|s| s.count == 0 && s.percentage == 0.0));
    }

    #[test]
    fn activity_merges_newest_first_and_truncates() {
        let t = Utc.with_ymd_and_hms(2026, 8, 5, 0, 0, 0).unwrap();
        let events = (0..6)
            .map(|i| ActivityEvent {
                event_type: "Property Added".to_string(),
                description: format!("event {i}"),
                timestamp: t + Duration::minutes(i),
            })
            .collect();
        let merged = merge_recent_activity(events, 4);
        assert_eq!(merged.len(), 4);
        assert_eq!(merged[0].description, "event 5");
        assert_eq!(merged[3].description, "event 2");
    }

    #[test]
    fn weekly_progress_rounds_and_handles_zero_goal() {
        assert_eq!(weekly_progress(34, 50), 68);
        assert_eq!(weekly_progress(0, 50), 0);
        assert_eq!(weekly_progress(55, 50), 110);
        assert_eq!(weekly_progress(10, 0), 0);
    }
}
