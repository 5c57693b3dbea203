//! Persistence contract for one-time codes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::Result;
use crate::otp::{OneTimeCode, OtpPurpose};

/// Store operations the code service consumes.
///
/// `mark_used` must be an atomic compare-and-set so concurrent duplicate
/// submissions of the same code see exactly one success; no broader locking
/// discipline is required.
#[async_trait]
pub trait OneTimeCodeStore: Send + Sync {
    /// Persist a new pending row, returning its id.
    async fn insert(
        &self,
        subject_id: i64,
        code: &str,
        purpose: OtpPurpose,
        expires_at: DateTime<Utc>,
    ) -> Result<i64>;

    /// Most recently issued unused row for the pair, unexpired at `now`.
    async fn find_latest_live(
        &self,
        subject_id: i64,
        purpose: OtpPurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<OneTimeCode>>;

    /// Flip `used` on one row only if it is still unused.
    /// Returns whether this call won the flip.
    async fn mark_used(&self, id: i64) -> Result<bool>;

    /// Mark every unused row for the pair as used.
    async fn mark_all_used(
        &self,
        subject_id: i64,
        purpose: OtpPurpose,
    ) -> Result<()>;
}

/// PostgreSQL store backed by the `one_time_codes` table.
#[derive(Clone)]
pub struct PgOneTimeCodeStore {
    pool: PgPool,
}

impl PgOneTimeCodeStore {
    /// Create a new [`PgOneTimeCodeStore`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OneTimeCodeStore for PgOneTimeCodeStore {
    async fn insert(
        &self,
        subject_id: i64,
        code: &str,
        purpose: OtpPurpose,
        expires_at: DateTime<Utc>,
    ) -> Result<i64> {
        let (id,): (i64,) = sqlx::query_as(
            r#"INSERT INTO one_time_codes (subject_id, code, purpose, expires_at, used)
                VALUES ($1, $2, $3, $4, FALSE)
                RETURNING id"#,
        )
        .bind(subject_id)
        .bind(code)
        .bind(purpose)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn find_latest_live(
        &self,
        subject_id: i64,
        purpose: OtpPurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<OneTimeCode>> {
        let row = sqlx::query_as::<_, OneTimeCode>(
            r#"SELECT id, subject_id, code, purpose, expires_at, used
                FROM one_time_codes
                WHERE subject_id = $1 AND purpose = $2
                    AND used = FALSE AND expires_at >= $3
                ORDER BY id DESC
                LIMIT 1"#,
        )
        .bind(subject_id)
        .bind(purpose)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn mark_used(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"UPDATE one_time_codes SET used = TRUE
                WHERE id = $1 AND used = FALSE"#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn mark_all_used(
        &self,
        subject_id: i64,
        purpose: OtpPurpose,
    ) -> Result<()> {
        sqlx::query(
            r#"UPDATE one_time_codes SET used = TRUE
                WHERE subject_id = $1 AND purpose = $2 AND used = FALSE"#,
        )
        .bind(subject_id)
        .bind(purpose)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI64, Ordering};

    use super::*;

    /// In-memory store mirroring the table semantics for unit tests.
    #[derive(Debug, Default)]
    pub(crate) struct MemoryStore {
        rows: Mutex<Vec<OneTimeCode>>,
        next_id: AtomicI64,
    }

    impl MemoryStore {
        pub(crate) fn row(&self, id: i64) -> Option<OneTimeCode> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|row| row.id == id)
                .cloned()
        }
    }

    #[async_trait]
    impl OneTimeCodeStore for MemoryStore {
        async fn insert(
            &self,
            subject_id: i64,
            code: &str,
            purpose: OtpPurpose,
            expires_at: DateTime<Utc>,
        ) -> Result<i64> {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            self.rows.lock().unwrap().push(OneTimeCode {
                id,
                subject_id,
                code: code.to_string(),
                purpose,
                expires_at,
                used: false,
            });
            Ok(id)
        }

        async fn find_latest_live(
            &self,
            subject_id: i64,
            purpose: OtpPurpose,
            now: DateTime<Utc>,
        ) -> Result<Option<OneTimeCode>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|row| {
                    row.subject_id == subject_id
                        && row.purpose == purpose
                        && row.is_live(now)
                })
                .max_by_key(|row| row.id)
                .cloned())
        }

        async fn mark_used(&self, id: i64) -> Result<bool> {
            let mut rows = self.rows.lock().unwrap();
            match rows.iter_mut().find(|row| row.id == id && !row.used) {
                Some(row) => {
                    row.used = true;
                    Ok(true)
                },
                None => Ok(false),
            }
        }

        async fn mark_all_used(
            &self,
            subject_id: i64,
            purpose: OtpPurpose,
        ) -> Result<()> {
            for row in self.rows.lock().unwrap().iter_mut() {
                if row.subject_id == subject_id && row.purpose == purpose {
                    row.used = true;
                }
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_mark_used_is_single_shot() {
        let store = MemoryStore::default();
        let expires = DateTime::from_timestamp(2_000_000_000, 0).unwrap();
        let id = store
            .insert(42, "030366", OtpPurpose::Login, expires)
            .await
            .unwrap();

        assert!(store.mark_used(id).await.unwrap());
        assert!(!store.mark_used(id).await.unwrap());
    }
}
