use super::{Error, User};

pub const MIN_SEARCH_LEN: usize = 2;
pub const SEARCH_LIMIT: i64 = 20;

pub struct UserManager<'a> {
    pool: &'a sqlx::SqlitePool,
}

impl<'a> UserManager<'a> {
    pub fn new(pool: &'a sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

/// Wraps `term` for a substring `LIKE` with `\` as the escape character.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl UserManager<'_> {
    /// Case-insensitive substring search over usernames, for any script.
    pub async fn search_users(&self, term: &str) -> Result<Vec<User>, Error> {
        let term = term.trim();
        if term.chars().count() < MIN_SEARCH_LEN {
            return Err(Error::InvalidInput("Query must be at least 2 characters"));
        }

        Ok(sqlx::query_as::<_, User>(
            r"SELECT id, username FROM users
              WHERE username_folded LIKE ? ESCAPE '\'
              ORDER BY username_folded, username
              LIMIT ?",
        )
        .bind(like_pattern(&term.to_lowercase()))
        .bind(SEARCH_LIMIT)
        .fetch_all(self.pool)
        .await?)
    }
}
