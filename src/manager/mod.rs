use serde::{Serialize, Serializer};

pub mod call_manager;
pub mod chat_manager;
pub mod contact_manager;
pub mod login_manager;
pub mod user_manager;

/// Identity of the acting user.
///
/// Callers assert who they are by passing this id; it is never
/// authenticated or checked against the target rows. Any caller may act
/// as any user. Everything downstream of the managers relies on that.
pub type UserId = i64;

pub type ChatId = i64;
pub type CallId = i64;

pub const MESSAGE_SENT: &str = "sent";
pub const MESSAGE_READ: &str = "read";

pub const CALL_CALLING: &str = "calling";
pub const CALL_ENDED: &str = "ended";
pub const DEFAULT_CALL_TYPE: &str = "audio";
pub const DEFAULT_CHAT_TYPE: &str = "personal";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("{0}")]
    InvalidOperation(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("storage failure: {0}")]
    StorageFailure(#[source] sqlx::Error),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("record"),
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                Error::NotFound("referenced record")
            }
            _ => Error::StorageFailure(err),
        }
    }
}

/// Unwraps a required id, treating `0` like an absent value.
pub(crate) fn require_id(id: Option<i64>, missing: &'static str) -> Result<i64, Error> {
    match id {
        Some(id) if id != 0 => Ok(id),
        _ => Err(Error::InvalidInput(missing)),
    }
}

fn id_as_string<S>(id: &i64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(id)
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

/// A chat as shown in a member's chat list.
#[derive(Serialize, Debug, Clone)]
pub struct ChatListing {
    #[serde(serialize_with = "id_as_string")]
    pub id: ChatId,
    pub name: String,
    #[serde(rename = "type")]
    pub chat_type: String,
    #[serde(rename = "lastMessage")]
    pub last_message: String,
    /// `HH:MM` in UTC.
    pub time: String,
    pub unread: i64,
}

#[derive(Serialize, Debug, Clone)]
pub struct NewChat {
    #[serde(serialize_with = "id_as_string")]
    pub id: ChatId,
    pub name: String,
    #[serde(rename = "type")]
    pub chat_type: String,
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
pub struct ChatMessage {
    #[serde(serialize_with = "id_as_string")]
    pub id: i64,
    pub text: String,
    /// `HH:MM` in UTC.
    pub time: String,
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub status: String,
    pub username: String,
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
pub struct SentMessage {
    #[serde(serialize_with = "id_as_string")]
    pub id: i64,
    pub text: String,
    /// `HH:MM` in UTC.
    pub time: String,
    pub status: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct StartedCall {
    pub call_id: CallId,
    pub status: String,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CallDirection {
    Outgoing,
    Incoming,
}

#[derive(Serialize, Debug, Clone)]
pub struct CallRecord {
    pub id: CallId,
    #[serde(rename = "type")]
    pub call_type: String,
    pub status: String,
    /// `HH:MM` in UTC.
    pub time: String,
    pub duration: i64,
    #[serde(rename = "contactName")]
    pub contact_name: String,
    pub direction: CallDirection,
}
