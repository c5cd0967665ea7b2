use anyhow::Result;

use super::schema::Database;

impl Database {
    // ========================================================================
    // Settings Rows
    // ========================================================================

    /// Every stored `(key, value)` row, ordered by key.
    ///
    /// Rows are returned as stored; interpreting them is up to
    /// [`Settings`](crate::settings::Settings).
    pub async fn load_preferences(&self) -> Result<Vec<(String, String)>> {
        let rows = sqlx::query_as("SELECT key, value FROM user_preferences ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Store one setting, replacing any previous value.
    pub async fn set_preference(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_preferences (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Remove a setting so readers fall back to their defaults.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete_preference(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM user_preferences WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::Database;
    use pretty_assertions::assert_eq;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    fn row(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[tokio::test]
    async fn test_empty_store_loads_nothing() {
        let db = test_db().await;
        assert!(db.load_preferences().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_returns_every_row_sorted() {
        let db = test_db().await;
        db.set_preference("widgetCount", "1").await.unwrap();
        db.set_preference("colorRead", "-1").await.unwrap();
        db.set_preference("txtRead", "-16777216").await.unwrap();

        assert_eq!(
            db.load_preferences().await.unwrap(),
            [
                row("colorRead", "-1"),
                row("txtRead", "-16777216"),
                row("widgetCount", "1"),
            ]
        );
    }

    #[tokio::test]
    async fn test_set_overwrites_previous_value() {
        let db = test_db().await;
        db.set_preference("txtRead", "-16777216").await.unwrap();
        db.set_preference("txtRead", "-1").await.unwrap();

        assert_eq!(db.load_preferences().await.unwrap(), [row("txtRead", "-1")]);
    }

    #[tokio::test]
    async fn test_delete_reports_whether_row_existed() {
        let db = test_db().await;
        db.set_preference("widgetCount", "2").await.unwrap();

        assert!(db.delete_preference("widgetCount").await.unwrap());
        assert!(!db.delete_preference("widgetCount").await.unwrap());
        assert!(db.load_preferences().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_stamps_update_time() {
        let db = test_db().await;
        db.set_preference("colorRead", "1").await.unwrap();

        let (updated_at,): (String,) =
            sqlx::query_as("SELECT updated_at FROM user_preferences WHERE key = ?")
                .bind("colorRead")
                .fetch_one(&db.pool)
                .await
                .unwrap();
        assert!(!updated_at.is_empty());
    }
}
