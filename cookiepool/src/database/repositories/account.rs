//! Account repository for database operations.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::Result;
use crate::database::models::AccountDbModel;

/// Account repository trait for roster data access operations.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// List every account across all sites.
    async fn all(&self) -> Result<Vec<AccountDbModel>>;

    /// List the accounts registered for one site.
    async fn for_site(&self, site: &str) -> Result<Vec<AccountDbModel>>;

    /// Find a single account by its composite key.
    async fn get(&self, site: &str, username: &str) -> Result<Option<AccountDbModel>>;

    /// Insert a new account. Fails if the (site, username) key already exists.
    async fn create(&self, account: &AccountDbModel) -> Result<()>;

    /// Insert an account or replace the stored password for an existing one.
    async fn upsert(&self, account: &AccountDbModel) -> Result<()>;

    /// Delete an account by its composite key.
    async fn delete(&self, site: &str, username: &str) -> Result<()>;

    /// Count the accounts registered for one site.
    async fn count_for_site(&self, site: &str) -> Result<i64>;
}

/// SQLx implementation of AccountRepository.
pub struct SqlxAccountRepository {
    pool: SqlitePool,
    write_pool: SqlitePool,
}

impl SqlxAccountRepository {
    /// Create a new SqlxAccountRepository with the given connection pools.
    pub fn new(pool: SqlitePool, write_pool: SqlitePool) -> Self {
        Self { pool, write_pool }
    }
}

#[async_trait]
impl AccountRepository for SqlxAccountRepository {
    async fn all(&self) -> Result<Vec<AccountDbModel>> {
        let accounts = sqlx::query_as::<_, AccountDbModel>(
            "SELECT * FROM accounts ORDER BY site, username",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(accounts)
    }

    async fn for_site(&self, site: &str) -> Result<Vec<AccountDbModel>> {
        let accounts = sqlx::query_as::<_, AccountDbModel>(
            "SELECT * FROM accounts WHERE site = ? ORDER BY username",
        )
        .bind(site)
        .fetch_all(&self.pool)
        .await?;
        Ok(accounts)
    }

    async fn get(&self, site: &str, username: &str) -> Result<Option<AccountDbModel>> {
        let account = sqlx::query_as::<_, AccountDbModel>(
            "SELECT * FROM accounts WHERE site = ? AND username = ?",
        )
        .bind(site)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn create(&self, account: &AccountDbModel) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (site, username, password, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&account.site)
        .bind(&account.username)
        .bind(&account.password)
        .bind(account.created_at)
        .execute(&self.write_pool)
        .await?;
        Ok(())
    }

    async fn upsert(&self, account: &AccountDbModel) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (site, username, password, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(site, username) DO UPDATE SET
                password = excluded.password
            "#,
        )
        .bind(&account.site)
        .bind(&account.username)
        .bind(&account.password)
        .bind(account.created_at)
        .execute(&self.write_pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, site: &str, username: &str) -> Result<()> {
        sqlx::query("DELETE FROM accounts WHERE site = ? AND username = ?")
            .bind(site)
            .bind(username)
            .execute(&self.write_pool)
            .await?;
        Ok(())
    }

    async fn count_for_site(&self, site: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE site = ?")
            .bind(site)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
