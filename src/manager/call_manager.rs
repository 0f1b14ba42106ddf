use sqlx::types::chrono::NaiveDateTime;

use super::{
    require_id, CallDirection, CallId, CallRecord, Error, StartedCall, UserId, CALL_CALLING,
    CALL_ENDED, DEFAULT_CALL_TYPE,
};

pub const HISTORY_LIMIT: i64 = 50;

pub struct CallManager<'a> {
    pool: &'a sqlx::SqlitePool,
}

impl<'a> CallManager<'a> {
    pub fn new(pool: &'a sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CallRow {
    id: CallId,
    caller_id: UserId,
    call_type: String,
    status: String,
    started_at: NaiveDateTime,
    duration: Option<i64>,
    contact_name: String,
}

impl CallRow {
    fn into_record(self, user_id: UserId) -> CallRecord {
        CallRecord {
            id: self.id,
            call_type: self.call_type,
            status: self.status,
            time: self.started_at.format("%H:%M").to_string(),
            duration: self.duration.unwrap_or(0),
            contact_name: self.contact_name,
            direction: if self.caller_id == user_id {
                CallDirection::Outgoing
            } else {
                CallDirection::Incoming
            },
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl CallManager<'_> {
    pub async fn start_call(
        &self,
        caller_id: Option<UserId>,
        receiver_id: Option<UserId>,
        call_type: Option<&str>,
    ) -> Result<StartedCall, Error> {
        const MISSING: &str = "caller_id and receiver_id required";
        let caller_id = require_id(caller_id, MISSING)?;
        let receiver_id = require_id(receiver_id, MISSING)?;
        let call_type = non_blank(call_type).unwrap_or(DEFAULT_CALL_TYPE);

        let (call_id,): (CallId,) = sqlx::query_as(
            "INSERT INTO calls (caller_id, receiver_id, call_type, status)
            VALUES (?, ?, ?, ?)
            RETURNING id",
        )
        .bind(caller_id)
        .bind(receiver_id)
        .bind(call_type)
        .bind(CALL_CALLING)
        .fetch_one(self.pool)
        .await?;

        tracing::info!(call_id, caller_id, receiver_id, call_type, "call started");
        Ok(StartedCall {
            call_id,
            status: CALL_CALLING.to_owned(),
        })
    }

    /// Closes a call and returns its length in whole seconds.
    ///
    /// An unknown `call_id` is `NotFound`; nothing is written in that case.
    pub async fn end_call(
        &self,
        call_id: Option<CallId>,
        status: Option<&str>,
    ) -> Result<i64, Error> {
        let call_id = require_id(call_id, "call_id required")?;
        let status = non_blank(status).unwrap_or(CALL_ENDED);

        let duration: Option<i64> = sqlx::query_scalar(
            "UPDATE calls
            SET status = ?,
                ended_at = strftime('%Y-%m-%d %H:%M:%f', 'now'),
                duration = MAX(0, CAST((julianday('now') - julianday(started_at)) * 86400 AS INTEGER))
            WHERE id = ?
            RETURNING duration",
        )
        .bind(status)
        .bind(call_id)
        .fetch_optional(self.pool)
        .await?;

        let duration = duration.ok_or(Error::NotFound("call"))?;
        tracing::info!(call_id, status, duration, "call ended");
        Ok(duration)
    }

    /// Latest calls `user_id` took part in, newest first.
    pub async fn list_call_history(
        &self,
        user_id: Option<UserId>,
    ) -> Result<Vec<CallRecord>, Error> {
        let user_id = require_id(user_id, "User ID required")?;

        let rows = sqlx::query_as::<_, CallRow>(
            "SELECT
                c.id,
                c.caller_id,
                c.call_type,
                c.status,
                c.started_at,
                c.duration,
                CASE WHEN c.caller_id = ?1 THEN receiver.username
                     ELSE caller.username
                END AS contact_name
            FROM calls c
            JOIN users caller ON caller.id = c.caller_id
            JOIN users receiver ON receiver.id = c.receiver_id
            WHERE c.caller_id = ?1 OR c.receiver_id = ?1
            ORDER BY c.started_at DESC, c.id DESC
            LIMIT ?2",
        )
        .bind(user_id)
        .bind(HISTORY_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.into_record(user_id)).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[sqlx::test(fixtures("users"))]
    async fn ok_start_call_defaults_to_audio(pool: sqlx::SqlitePool) {
        let call = CallManager::new(&pool)
            .start_call(Some(1), Some(2), None)
            .await
            .unwrap();
        assert_eq!(call.status, CALL_CALLING);

        let (call_type, status): (String, String) =
            sqlx::query_as("SELECT call_type, status FROM calls WHERE id = ?")
                .bind(call.call_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(call_type, DEFAULT_CALL_TYPE);
        assert_eq!(status, CALL_CALLING);
    }

    #[sqlx::test(fixtures("users"))]
    async fn err_start_call_missing_ids(pool: sqlx::SqlitePool) {
        let manager = CallManager::new(&pool);
        assert!(matches!(
            manager.start_call(None, Some(2), Some("video")).await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            manager.start_call(Some(1), None, None).await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[sqlx::test(fixtures("users"))]
    async fn end_call_measures_elapsed_time(pool: sqlx::SqlitePool) {
        let manager = CallManager::new(&pool);
        let call = manager
            .start_call(Some(1), Some(2), Some("video"))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(1200)).await;

        let duration = manager.end_call(Some(call.call_id), None).await.unwrap();
        assert!((1..=3).contains(&duration), "duration was {duration}");

        let (status, ended_at, stored): (String, Option<NaiveDateTime>, Option<i64>) =
            sqlx::query_as("SELECT status, ended_at, duration FROM calls WHERE id = ?")
                .bind(call.call_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(status, CALL_ENDED);
        assert!(ended_at.is_some());
        assert_eq!(stored, Some(duration));
    }

    #[sqlx::test(fixtures("users"))]
    async fn end_call_keeps_given_status(pool: sqlx::SqlitePool) {
        let manager = CallManager::new(&pool);
        let call = manager.start_call(Some(2), Some(3), None).await.unwrap();
        let duration = manager
            .end_call(Some(call.call_id), Some("declined"))
            .await
            .unwrap();
        assert!(duration >= 0);

        let history = manager.list_call_history(Some(3)).await.unwrap();
        assert_eq!(history[0].status, "declined");
    }

    #[sqlx::test(fixtures("users"))]
    async fn err_end_unknown_call(pool: sqlx::SqlitePool) {
        let manager = CallManager::new(&pool);
        assert!(matches!(
            manager.end_call(Some(4242), None).await,
            Err(Error::NotFound("call"))
        ));
        assert!(matches!(
            manager.end_call(None, None).await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[sqlx::test(fixtures("users", "calls"))]
    async fn ok_history_direction_and_order(pool: sqlx::SqlitePool) {
        let history = CallManager::new(&pool)
            .list_call_history(Some(1))
            .await
            .unwrap();
        let ids: Vec<CallId> = history.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![4, 2, 1]);

        assert_eq!(history[0].direction, CallDirection::Outgoing);
        assert_eq!(history[0].contact_name, "carol");
        assert_eq!(history[0].duration, 0);
        assert_eq!(history[0].time, "13:45");

        assert_eq!(history[1].direction, CallDirection::Incoming);
        assert_eq!(history[1].contact_name, "bob");
        assert_eq!(history[1].call_type, "video");

        assert_eq!(history[2].direction, CallDirection::Outgoing);
        assert_eq!(history[2].duration, 125);
    }

    #[sqlx::test(fixtures("users"))]
    async fn history_is_capped(pool: sqlx::SqlitePool) {
        for i in 0..60 {
            sqlx::query(
                "INSERT INTO calls (caller_id, receiver_id, started_at)
                VALUES (1, 2, datetime('2024-01-01', '+' || ? || ' minutes'))",
            )
            .bind(i)
            .execute(&pool)
            .await
            .unwrap();
        }

        let history = CallManager::new(&pool)
            .list_call_history(Some(2))
            .await
            .unwrap();
        assert_eq!(history.len(), HISTORY_LIMIT as usize);
        assert!(history
            .iter()
            .all(|c| c.direction == CallDirection::Incoming));
        assert_eq!(history[0].time, "00:59");
    }
}
