//! Cookie repository for database operations.
//!
//! The cookies table is the pool itself: one row per (site, username) key.
//! Every mutation here is a single statement, so each key is written or
//! removed atomically.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::Result;
use crate::database::models::CookieDbModel;

/// Cookie repository trait for pool data access operations.
#[async_trait]
pub trait CookieRepository: Send + Sync {
    /// List the pooled tokens for one site.
    async fn for_site(&self, site: &str) -> Result<Vec<CookieDbModel>>;

    /// Find a single pooled token by its composite key.
    async fn get(&self, site: &str, username: &str) -> Result<Option<CookieDbModel>>;

    /// Store a token, replacing any previous token under the same key.
    async fn set(&self, cookie: &CookieDbModel) -> Result<()>;

    /// Remove a token by its composite key.
    async fn delete(&self, site: &str, username: &str) -> Result<()>;

    /// Pick one pooled token for a site uniformly at random.
    async fn random_for_site(&self, site: &str) -> Result<Option<CookieDbModel>>;

    /// Count the pooled tokens for one site.
    async fn count_for_site(&self, site: &str) -> Result<i64>;
}

/// SQLx implementation of CookieRepository.
pub struct SqlxCookieRepository {
    pool: SqlitePool,
    write_pool: SqlitePool,
}

impl SqlxCookieRepository {
    /// Create a new SqlxCookieRepository with the given connection pools.
    pub fn new(pool: SqlitePool, write_pool: SqlitePool) -> Self {
        Self { pool, write_pool }
    }
}

#[async_trait]
impl CookieRepository for SqlxCookieRepository {
    async fn for_site(&self, site: &str) -> Result<Vec<CookieDbModel>> {
        let cookies = sqlx::query_as::<_, CookieDbModel>(
            "SELECT * FROM cookies WHERE site = ? ORDER BY username",
        )
        .bind(site)
        .fetch_all(&self.pool)
        .await?;
        Ok(cookies)
    }

    async fn get(&self, site: &str, username: &str) -> Result<Option<CookieDbModel>> {
        let cookie = sqlx::query_as::<_, CookieDbModel>(
            "SELECT * FROM cookies WHERE site = ? AND username = ?",
        )
        .bind(site)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cookie)
    }

    async fn set(&self, cookie: &CookieDbModel) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cookies (site, username, payload, captured_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(site, username) DO UPDATE SET
                payload = excluded.payload,
                captured_at = excluded.captured_at
            "#,
        )
        .bind(&cookie.site)
        .bind(&cookie.username)
        .bind(&cookie.payload)
        .bind(cookie.captured_at)
        .execute(&self.write_pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, site: &str, username: &str) -> Result<()> {
        sqlx::query("DELETE FROM cookies WHERE site = ? AND username = ?")
            .bind(site)
            .bind(username)
            .execute(&self.write_pool)
            .await?;
        Ok(())
    }

    async fn random_for_site(&self, site: &str) -> Result<Option<CookieDbModel>> {
        let cookie = sqlx::query_as::<_, CookieDbModel>(
            "SELECT * FROM cookies WHERE site = ? ORDER BY RANDOM() LIMIT 1",
        )
        .bind(site)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cookie)
    }

    async fn count_for_site(&self, site: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cookies WHERE site = ?")
            .bind(site)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
