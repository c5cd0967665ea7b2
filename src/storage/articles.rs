use anyhow::Result;
use chrono::Utc;

use super::schema::Database;
use super::types::ArticleDbRow;
use crate::article::Article;
use crate::store::ArticleArchive;

impl Database {
    // ========================================================================
    // Article Archive Operations
    // ========================================================================

    /// Replace the archived collection with `articles`, keeping their order.
    ///
    /// Delete and inserts run in one transaction so readers never observe a
    /// half-written list.
    pub async fn write_articles(&self, articles: &[Article]) -> Result<usize> {
        let saved_at = Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM articles")
            .execute(&mut *tx)
            .await?;

        for (position, article) in articles.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO articles (position, title, description, date, url, read, saved_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            )
            .bind(position as i64)
            .bind(&article.title)
            .bind(&article.description)
            .bind(&article.date)
            .bind(&article.url)
            .bind(article.read)
            .bind(saved_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(count = articles.len(), "Archived article collection");
        Ok(articles.len())
    }

    /// Load the archived collection in its saved order.
    pub async fn load_articles(&self) -> Result<Vec<Article>> {
        let rows: Vec<ArticleDbRow> = sqlx::query_as(
            "SELECT title, description, date, url, read FROM articles ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ArticleDbRow::into_article).collect())
    }
}

impl ArticleArchive for Database {
    async fn archive(&self, articles: &[Article]) -> Result<usize> {
        self.write_articles(articles).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    fn article(title: &str, read: bool) -> Article {
        let mut a = Article::new(
            title,
            format!("{} description", title),
            "2024-01-01",
            format!("https://example.com/{}", title),
        );
        a.read = read;
        a
    }

    #[tokio::test]
    async fn test_load_empty_archive() {
        let db = test_db().await;
        assert!(db.load_articles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_then_load_keeps_order_and_read_state() {
        let db = test_db().await;
        let articles = vec![article("zulu", true), article("alpha", false)];

        let written = db.write_articles(&articles).await.unwrap();
        assert_eq!(written, 2);
        assert_eq!(db.load_articles().await.unwrap(), articles);
    }

    #[tokio::test]
    async fn test_write_replaces_previous_collection() {
        let db = test_db().await;
        db.write_articles(&[article("old", false), article("older", true)])
            .await
            .unwrap();
        db.write_articles(&[article("new", false)]).await.unwrap();

        let loaded = db.load_articles().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "new");
    }

    #[tokio::test]
    async fn test_write_empty_clears_archive() {
        let db = test_db().await;
        db.write_articles(&[article("gone", false)]).await.unwrap();
        db.write_articles(&[]).await.unwrap();
        assert!(db.load_articles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_archive_trait_delegates() {
        let db = test_db().await;
        let n = db.archive(&[article("via trait", false)]).await.unwrap();
        assert_eq!(n, 1);
        assert_eq!(db.load_articles().await.unwrap()[0].title, "via trait");
    }
}
