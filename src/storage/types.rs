use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Database-specific errors with user-friendly messages
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Another instance of the application has locked the database
    #[error("Another instance of newsdesk appears to be running. Please close it and try again.")]
    InstanceLocked,

    /// Migration failed
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Check if a sqlx error indicates database locking
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        let error_string = err.to_string().to_lowercase();

        // SQLITE_BUSY (5), SQLITE_LOCKED (6), SQLITE_CANTOPEN (14)
        if error_string.contains("database is locked")
            || error_string.contains("database table is locked")
            || error_string.contains("sqlite_busy")
            || error_string.contains("sqlite_locked")
            || error_string.contains("unable to open database file")
        {
            return DatabaseError::InstanceLocked;
        }

        DatabaseError::Other(err)
    }
}

// ============================================================================
// Row Types
// ============================================================================

/// Row shape of the `articles` table (used by sqlx FromRow).
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ArticleDbRow {
    pub title: String,
    pub description: String,
    pub date: String,
    pub url: String,
    pub read: bool,
}

impl ArticleDbRow {
    pub(crate) fn into_article(self) -> crate::article::Article {
        crate::article::Article {
            title: self.title,
            description: self.description,
            date: self.date,
            url: self.url,
            read: self.read,
        }
    }
}
