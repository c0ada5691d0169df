pub mod test_helpers {
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use tempfile::NamedTempFile;

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Create a temporary file-based SQLite database for testing
    /// Useful when several connections must see the same data
    pub async fn create_test_db_file(
        max_connections: u32,
    ) -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;
        let database_url = format!("sqlite://{}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&database_url)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok((pool, temp_file))
    }

    /// Insert a user row directly, bypassing the resolver
    pub async fn insert_test_user(
        pool: &SqlitePool,
        provider: &str,
        uid: &str,
        email: &str,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO users (provider, uid, email, password_hash, email_verified) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(provider)
        .bind(uid)
        .bind(email)
        .bind("not-a-real-hash")
        .bind(true)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn count_users(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }
}

pub mod log_capture {
    use std::io;
    use std::sync::{Arc, Mutex};

    /// Collects formatted `tracing` output so tests can assert on log lines.
    ///
    /// ```rust,no_run
    /// # use oauth_identity::test_utils::log_capture::LogCapture;
    /// let logs = LogCapture::default();
    /// let _guard = tracing::subscriber::set_default(logs.subscriber());
    /// tracing::error!("boom");
    /// assert!(logs.contents().contains("boom"));
    /// ```
    #[derive(Clone, Default)]
    pub struct LogCapture {
        buffer: Arc<Mutex<Vec<u8>>>,
    }

    struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .map_err(|_| io::Error::other("log buffer poisoned"))?
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogCapture {
        pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + 'static {
            let buffer = self.buffer.clone();
            tracing_subscriber::fmt()
                .with_ansi(false)
                .with_max_level(tracing::Level::DEBUG)
                .with_writer(move || CaptureWriter(buffer.clone()))
                .finish()
        }

        pub fn contents(&self) -> String {
            match self.buffer.lock() {
                Ok(buffer) => String::from_utf8_lossy(&buffer).into_owned(),
                Err(_) => String::new(),
            }
        }
    }
}

// Re-export commonly used test functions at module level for convenience
// Note: This is test-only code. Panic on error is acceptable in tests.
#[cfg(test)]
pub async fn create_test_pool() -> sqlx::SqlitePool {
    match test_helpers::create_test_db().await {
        Ok(pool) => pool,
        Err(e) => panic!("Failed to create test pool: {}", e),
    }
}
