//! PostgreSQL cache backed by the `cache` table.
//!
//! Every call is one round trip. Writes are a single
//! `INSERT .. ON CONFLICT (key) DO UPDATE`, so readers observe either the old
//! row or the new one and concurrent writers resolve last-writer-wins.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DbConn, EntityTrait, QueryFilter};
use serde_json::Value;

use relief_core::CacheError;
use relief_core::domain::{CacheKey, Ttl, is_expired};
use relief_core::ports::{Clock, KeyValueCache, SystemClock};

use crate::database::entity::cache_entry::{self, Entity as CacheEntity};

pub struct PostgresCache {
    db: DbConn,
    clock: Arc<dyn Clock>,
}

impl PostgresCache {
    pub fn new(db: DbConn) -> Self {
        Self::with_clock(db, Arc::new(SystemClock))
    }

    pub fn with_clock(db: DbConn, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Best-effort eviction; a failure leaves a row later reads still ignore.
    ///
    /// The expiry predicate is repeated in the DELETE so a row refreshed by a
    /// concurrent `set` since the read survives.
    async fn evict(&self, key: &CacheKey, now: DateTime<Utc>) {
        let result = CacheEntity::delete_many()
            .filter(cache_entry::Column::Key.eq(key.as_str()))
            .filter(cache_entry::Column::ExpiresAt.lt(now.fixed_offset()))
            .exec(&self.db)
            .await;

        match result {
            Ok(res) if res.rows_affected == 0 => {
                tracing::debug!(key = %key, "Entry refreshed before eviction")
            }
            Ok(_) => tracing::debug!(key = %key, "Evicted expired entry"),
            Err(e) => tracing::warn!(key = %key, error = %e, "Failed to evict expired entry"),
        }
    }
}

#[async_trait]
impl KeyValueCache for PostgresCache {
    async fn get(&self, key: &CacheKey) -> Option<Value> {
        let row = match CacheEntity::find_by_id(key.as_str()).one(&self.db).await {
            Ok(row) => row?,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache lookup failed");
                return None;
            }
        };

        let now = self.clock.now();
        if is_expired(row.expires_at.with_timezone(&Utc), now) {
            self.evict(key, now).await;
            return None;
        }

        Some(row.value)
    }

    async fn set(&self, key: &CacheKey, value: &Value, ttl: Ttl) -> Result<(), CacheError> {
        let expires_at = ttl.expires_at(self.clock.now());
        let row = cache_entry::ActiveModel::for_upsert(key, value.clone(), expires_at.into());

        CacheEntity::insert(row)
            .on_conflict(
                OnConflict::column(cache_entry::Column::Key)
                    .update_columns([cache_entry::Column::Value, cache_entry::Column::ExpiresAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| {
                tracing::warn!(key = %key, error = %e, "Cache write failed");
                CacheError::Storage(e.to_string())
            })?;

        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<(), CacheError> {
        CacheEntity::delete_by_id(key.as_str())
            .exec(&self.db)
            .await
            .map_err(|e| {
                tracing::warn!(key = %key, error = %e, "Cache delete failed");
                CacheError::Storage(e.to_string())
            })?;

        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, CacheError> {
        let now = self.clock.now().fixed_offset();
        let result = CacheEntity::delete_many()
            .filter(cache_entry::Column::ExpiresAt.lt(now))
            .exec(&self.db)
            .await
            .map_err(|e| CacheError::Storage(e.to_string()))?;

        Ok(result.rows_affected)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use relief_core::ports::ManualClock;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};
    use serde_json::json;

    use super::*;

    fn key(s: &str) -> CacheKey {
        CacheKey::new(s).unwrap()
    }

    fn row(key: &str, value: Value, expires_at: DateTime<Utc>) -> cache_entry::Model {
        cache_entry::Model {
            key: key.to_owned(),
            value,
            expires_at: expires_at.into(),
        }
    }

    fn affected(rows: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: rows,
        }
    }

    fn cache_at(db: MockDatabase, clock: &Arc<ManualClock>) -> PostgresCache {
        PostgresCache::with_clock(db.into_connection(), clock.clone())
    }

    #[tokio::test]
    async fn test_get_live_entry() {
        let clock = Arc::new(ManualClock::default());
        let coords = json!({"lat": 40.78, "lng": -73.97});
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![row(
            "geocode_manhattan",
            coords.clone(),
            clock.now() + Duration::hours(24),
        )]]);
        let cache = cache_at(db, &clock);

        assert_eq!(cache.get(&key("geocode_manhattan")).await, Some(coords));
    }

    #[tokio::test]
    async fn test_get_missing_entry() {
        let clock = Arc::new(ManualClock::default());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<cache_entry::Model>::new()]);
        let cache = cache_at(db, &clock);

        assert_eq!(cache.get(&key("absent")).await, None);
    }

    #[tokio::test]
    async fn test_get_expired_entry_is_evicted() {
        let clock = Arc::new(ManualClock::default());
        let written_at = clock.now();
        clock.advance(Duration::seconds(61));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row("k", json!("v"), written_at + Duration::minutes(1))]])
            .append_exec_results([affected(1)]);
        let cache = cache_at(db, &clock);

        assert_eq!(cache.get(&key("k")).await, None);

        let PostgresCache { db, .. } = cache;
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 2, "expected a select followed by a delete");
        assert!(format!("{:?}", log[1]).contains("DELETE"));
    }

    #[tokio::test]
    async fn test_eviction_only_deletes_still_expired_row() {
        let clock = Arc::new(ManualClock::default());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row("k", json!("old"), clock.now() - Duration::seconds(1))]])
            // A concurrent set refreshed the row, so the guarded delete matches nothing.
            .append_exec_results([affected(0)]);
        let cache = cache_at(db, &clock);

        assert_eq!(cache.get(&key("k")).await, None);

        let PostgresCache { db, .. } = cache;
        let log = db.into_transaction_log();
        let sql = format!("{:?}", log[1]);
        assert!(sql.contains("DELETE"));
        assert!(sql.contains("expires_at"), "{sql}");
    }

    #[tokio::test]
    async fn test_entry_expiring_now_is_still_live() {
        let clock = Arc::new(ManualClock::default());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row("k", json!("v"), clock.now())]]);
        let cache = cache_at(db, &clock);

        assert_eq!(cache.get(&key("k")).await, Some(json!("v")));
    }

    #[tokio::test]
    async fn test_failed_eviction_still_reports_miss() {
        let clock = Arc::new(ManualClock::default());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row("k", json!("v"), clock.now() - Duration::seconds(1))]])
            .append_exec_errors([DbErr::Custom("connection reset".to_owned())]);
        let cache = cache_at(db, &clock);

        assert_eq!(cache.get(&key("k")).await, None);
    }

    #[tokio::test]
    async fn test_storage_failure_reads_as_miss() {
        let clock = Arc::new(ManualClock::default());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection refused".to_owned())]);
        let cache = cache_at(db, &clock);

        assert_eq!(cache.get(&key("k")).await, None);
    }

    #[tokio::test]
    async fn test_set_is_single_upsert() {
        let clock = Arc::new(ManualClock::default());
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([affected(1)]);
        let cache = cache_at(db, &clock);

        cache
            .set(&key("k"), &json!("v"), Ttl::minutes(60).unwrap())
            .await
            .unwrap();

        let PostgresCache { db, .. } = cache;
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains("INSERT"));
        assert!(sql.contains("ON CONFLICT"));
    }

    #[tokio::test]
    async fn test_set_failure_is_reported() {
        let clock = Arc::new(ManualClock::default());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_errors([DbErr::Custom("connection refused".to_owned())]);
        let cache = cache_at(db, &clock);

        let result = cache
            .set(&key("k"), &json!("v"), Ttl::minutes(60).unwrap())
            .await;

        assert!(matches!(result, Err(CacheError::Storage(_))));
    }

    #[tokio::test]
    async fn test_delete_absent_key_succeeds() {
        let clock = Arc::new(ManualClock::default());
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([affected(0)]);
        let cache = cache_at(db, &clock);

        assert!(cache.delete(&key("absent")).await.is_ok());
    }

    #[tokio::test]
    async fn test_purge_returns_removed_count() {
        let clock = Arc::new(ManualClock::default());
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([affected(3)]);
        let cache = cache_at(db, &clock);

        assert_eq!(cache.purge_expired().await.unwrap(), 3);
    }
}
