use super::{
    require_id, ChatId, ChatListing, ChatMessage, Error, NewChat, SentMessage, UserId,
    DEFAULT_CHAT_TYPE, MESSAGE_READ, MESSAGE_SENT,
};

/// Shown as the last message of a chat nobody has written in yet.
pub const NEW_CHAT_PLACEHOLDER: &str = "Новый чат";

pub struct ChatManager<'a> {
    pool: &'a sqlx::SqlitePool,
}

impl<'a> ChatManager<'a> {
    pub fn new(pool: &'a sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ChatRow {
    id: ChatId,
    name: String,
    chat_type: String,
    last_message: Option<String>,
    last_message_time: Option<String>,
    unread_count: i64,
}

impl From<ChatRow> for ChatListing {
    fn from(row: ChatRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            chat_type: row.chat_type,
            last_message: row
                .last_message
                .unwrap_or_else(|| NEW_CHAT_PLACEHOLDER.to_owned()),
            time: row.last_message_time.unwrap_or_default(),
            unread: row.unread_count,
        }
    }
}

impl ChatManager<'_> {
    /// Chats `user_id` belongs to, newest chat first.
    ///
    /// Ordering is by chat id, not by latest activity.
    pub async fn list_chats(&self, user_id: Option<UserId>) -> Result<Vec<ChatListing>, Error> {
        let user_id = require_id(user_id, "User ID required")?;

        let rows = sqlx::query_as::<_, ChatRow>(
            "SELECT
                c.id,
                c.name,
                c.chat_type,
                (SELECT m.message_text FROM messages m WHERE m.chat_id = c.id
                 ORDER BY m.created_at DESC, m.id DESC LIMIT 1) AS last_message,
                (SELECT strftime('%H:%M', m.created_at) FROM messages m WHERE m.chat_id = c.id
                 ORDER BY m.created_at DESC, m.id DESC LIMIT 1) AS last_message_time,
                (SELECT COUNT(*) FROM messages m WHERE m.chat_id = c.id
                 AND m.user_id != ?1 AND m.status != ?2) AS unread_count
            FROM chats c
            JOIN chat_members cm ON cm.chat_id = c.id
            WHERE cm.user_id = ?1
            ORDER BY c.id DESC",
        )
        .bind(user_id)
        .bind(MESSAGE_READ)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ChatListing::from).collect())
    }

    /// Creates a chat and enrolls its creator as an online member.
    pub async fn create_chat(
        &self,
        name: &str,
        chat_type: Option<&str>,
        user_id: Option<UserId>,
    ) -> Result<NewChat, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("Name and user_id required"));
        }
        let user_id = require_id(user_id, "Name and user_id required")?;
        let chat_type = chat_type
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_CHAT_TYPE);

        let mut tx = self.pool.begin().await?;

        let (chat_id,): (ChatId,) = sqlx::query_as(
            "INSERT INTO chats (name, chat_type, created_by) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(name)
        .bind(chat_type)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO chat_members (chat_id, user_id, is_online) VALUES (?, ?, TRUE)")
            .bind(chat_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(chat_id, created_by = user_id, chat_type, "created chat");
        Ok(NewChat {
            id: chat_id,
            name: name.to_owned(),
            chat_type: chat_type.to_owned(),
        })
    }

    pub async fn list_messages(&self, chat_id: Option<ChatId>) -> Result<Vec<ChatMessage>, Error> {
        let chat_id = require_id(chat_id, "Chat ID required")?;

        Ok(sqlx::query_as::<_, ChatMessage>(
            "SELECT
                m.id,
                m.message_text AS text,
                strftime('%H:%M', m.created_at) AS time,
                m.user_id,
                m.status,
                u.username
            FROM messages m
            JOIN users u ON u.id = m.user_id
            WHERE m.chat_id = ?
            ORDER BY m.created_at ASC, m.id ASC",
        )
        .bind(chat_id)
        .fetch_all(self.pool)
        .await?)
    }

    pub async fn send_message(
        &self,
        chat_id: Option<ChatId>,
        user_id: Option<UserId>,
        text: &str,
    ) -> Result<SentMessage, Error> {
        const MISSING: &str = "chat_id, user_id and text required";
        let chat_id = require_id(chat_id, MISSING)?;
        let user_id = require_id(user_id, MISSING)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidInput(MISSING));
        }

        let message = sqlx::query_as::<_, SentMessage>(
            "INSERT INTO messages (chat_id, user_id, message_text, status)
            VALUES (?, ?, ?, ?)
            RETURNING id, message_text AS text, strftime('%H:%M', created_at) AS time, status",
        )
        .bind(chat_id)
        .bind(user_id)
        .bind(text)
        .bind(MESSAGE_SENT)
        .fetch_one(self.pool)
        .await?;

        tracing::debug!(message_id = message.id, chat_id, user_id, "stored message");
        Ok(message)
    }
}
