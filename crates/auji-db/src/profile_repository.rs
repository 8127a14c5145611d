use sqlx::{PgPool, Pool, Postgres};

use auji_core::error::AppError;
use auji_core::models::SearchProfile;
use auji_core::traits::ProfileStore;

/// Read access to the user's search profiles, plus the writes the CLI
/// needs to seed them.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: Pool<Postgres>,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All profiles, oldest first.
    pub async fn list(&self) -> Result<Vec<SearchProfile>, AppError> {
        let rows: Vec<(String, bool)> =
            sqlx::query_as("SELECT name, is_active FROM search_profiles ORDER BY created_at, name")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(name, is_active)| SearchProfile { name, is_active })
            .collect())
    }

    /// Create a profile, or flip `is_active` on an existing one with the same name.
    pub async fn upsert(&self, name: &str, is_active: bool) -> Result<(), AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        let updated = sqlx::query(
            "UPDATE search_profiles SET is_active = $2, updated_at = NOW() WHERE name = $1",
        )
        .bind(name)
        .bind(is_active)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        if updated.rows_affected() == 0 {
            sqlx::query("INSERT INTO search_profiles (name, is_active) VALUES ($1, $2)")
                .bind(name)
                .bind(is_active)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }
}

impl ProfileStore for ProfileRepository {
    async fn active_profile_names(&self) -> Result<Vec<String>, AppError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM search_profiles WHERE is_active ORDER BY created_at, name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}
