use super::{Error, User};

pub struct LoginManager<'a> {
    pool: &'a sqlx::SqlitePool,
}

impl<'a> LoginManager<'a> {
    pub fn new(pool: &'a sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

impl LoginManager<'_> {
    /// Returns the user with this name, creating it on first sight.
    ///
    /// Concurrent first logins with the same name collapse onto one row
    /// through the unique constraint on `username`.
    pub async fn login_or_register(&self, username: &str) -> Result<User, Error> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::InvalidInput("Username required"));
        }

        let inserted = sqlx::query(
            "INSERT INTO users (username, username_folded) VALUES (?, ?)
            ON CONFLICT (username) DO NOTHING",
        )
        .bind(username)
        .bind(username.to_lowercase())
        .execute(self.pool)
        .await?
        .rows_affected();

        let user = self.get_user(username).await?;
        if inserted > 0 {
            tracing::info!(user_id = user.id, username = %user.username, "registered new user");
        }
        Ok(user)
    }

    async fn get_user(&self, username: &str) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, username FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(self.pool)
            .await
    }
}
