use crate::actions::ActionStore;
use crate::analytics::AnalyticsStore;
use crate::core::config::AppConfig;
use crate::core::shared::utils::DbPool;
use crate::owners::OwnerStore;
use crate::properties::PropertyStore;

/// Shared per-process state: the pool, the resolved config, and one store
/// handle per entity collection.
#[derive(Clone)]
pub struct AppState {
    pub conn: DbPool,
    pub config: AppConfig,
    pub jwt_secret: String,
    pub properties: PropertyStore,
    pub owners: OwnerStore,
    pub actions: ActionStore,
    pub analytics: AnalyticsStore,
}

impl AppState {
    pub fn new(conn: DbPool, config: AppConfig) -> Self {
        let jwt_secret = config.auth.resolved_secret();
        Self {
            properties: PropertyStore::new(conn.clone()),
            owners: OwnerStore::new(conn.clone()),
            actions: ActionStore::new(conn.clone()),
            analytics: AnalyticsStore::new(conn.clone()),
            conn,
            config,
            jwt_secret,
        }
    }
}
