use super::{require_id, Error, User, UserId};

pub struct ContactManager<'a> {
    pool: &'a sqlx::SqlitePool,
}

impl<'a> ContactManager<'a> {
    pub fn new(pool: &'a sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

impl ContactManager<'_> {
    /// Links two users as mutual contacts. Re-adding an existing pair is a no-op.
    pub async fn add_contact(
        &self,
        user_id: Option<UserId>,
        contact_user_id: Option<UserId>,
    ) -> Result<(), Error> {
        const MISSING: &str = "user_id and contact_user_id required";
        let user_id = require_id(user_id, MISSING)?;
        let contact_user_id = require_id(contact_user_id, MISSING)?;
        if user_id == contact_user_id {
            return Err(Error::InvalidOperation("Cannot add yourself as contact"));
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for (owner, contact) in [(user_id, contact_user_id), (contact_user_id, user_id)] {
            inserted += sqlx::query(
                "INSERT INTO contacts (user_id, contact_user_id) VALUES (?, ?)
                ON CONFLICT (user_id, contact_user_id) DO NOTHING",
            )
            .bind(owner)
            .bind(contact)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }
        tx.commit().await?;

        if inserted > 0 {
            tracing::info!(user_id, contact_user_id, "added contact");
        }
        Ok(())
    }

    pub async fn list_contacts(&self, user_id: Option<UserId>) -> Result<Vec<User>, Error> {
        let user_id = require_id(user_id, "User ID required")?;

        Ok(sqlx::query_as::<_, User>(
            "SELECT u.id, u.username
            FROM contacts c
            JOIN users u ON u.id = c.contact_user_id
            WHERE c.user_id = ?
            ORDER BY u.username_folded, u.username",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?)
    }
}
