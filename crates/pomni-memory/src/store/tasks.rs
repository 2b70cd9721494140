//! Reminder and recurring task CRUD, due queries, and delivery marking.

use super::Store;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use pomni_core::error::PomniError;
use serde::Serialize;
use uuid::Uuid;

/// Storage format for timestamps (UTC). Sorts lexicographically.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SELECT_COLUMNS: &str = "SELECT id, channel, owner_id, reply_target, content, remind_at, \
     is_recurring, is_done, created_at, last_notified_on FROM tasks";

/// A persisted reminder or recurring task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: String,
    /// Channel the task was created on; notifications go back through it.
    pub channel: String,
    pub owner_id: String,
    pub reply_target: String,
    /// Original message text.
    pub content: String,
    /// Set for one-shot reminders only.
    pub remind_at: Option<DateTime<Utc>>,
    pub is_recurring: bool,
    pub is_done: bool,
    pub created_at: DateTime<Utc>,
    /// Local date of the last daily announcement.
    pub last_notified_on: Option<NaiveDate>,
}

/// Result of an operation addressed by task ID prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixMatch {
    /// Exactly one task matched and was changed.
    Applied,
    /// No task of this owner matched.
    NotFound,
    /// More than one task matched; nothing was changed.
    Ambiguous,
}

/// Who a new task belongs to and where its notifications are delivered.
#[derive(Debug, Clone, Copy)]
pub struct TaskOwner<'a> {
    pub channel: &'a str,
    pub owner_id: &'a str,
    pub reply_target: &'a str,
}

type TaskRow = (
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    bool,
    bool,
    String,
    Option<String>,
);

impl TryFrom<TaskRow> for Task {
    type Error = PomniError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let (
            id,
            channel,
            owner_id,
            reply_target,
            content,
            remind_at,
            is_recurring,
            is_done,
            created_at,
            last_notified_on,
        ) = row;
        let remind_at = remind_at.as_deref().map(parse_timestamp).transpose()?;
        let last_notified_on = last_notified_on
            .as_deref()
            .map(|d| {
                NaiveDate::parse_from_str(d, "%Y-%m-%d").map_err(|e| {
                    PomniError::Storage(format!("bad last_notified_on '{d}': {e}"))
                })
            })
            .transpose()?;
        Ok(Self {
            id,
            channel,
            owner_id,
            reply_target,
            content,
            remind_at,
            is_recurring,
            is_done,
            created_at: parse_timestamp(&created_at)?,
            last_notified_on,
        })
    }
}

impl Store {
    /// Insert a one-shot reminder due at `remind_at`.
    pub async fn create_reminder(
        &self,
        owner: TaskOwner<'_>,
        content: &str,
        remind_at: DateTime<Utc>,
    ) -> Result<Task, PomniError> {
        self.insert_task(owner, content, Some(remind_at), false).await
    }

    /// Insert a recurring task (no `remind_at`).
    pub async fn create_recurring_task(
        &self,
        owner: TaskOwner<'_>,
        content: &str,
    ) -> Result<Task, PomniError> {
        self.insert_task(owner, content, None, true).await
    }

    async fn insert_task(
        &self,
        owner: TaskOwner<'_>,
        content: &str,
        remind_at: Option<DateTime<Utc>>,
        is_recurring: bool,
    ) -> Result<Task, PomniError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO tasks (id, channel, owner_id, reply_target, content, remind_at, is_recurring) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(owner.channel)
        .bind(owner.owner_id)
        .bind(owner.reply_target)
        .bind(content)
        .bind(remind_at.map(format_timestamp))
        .bind(is_recurring)
        .execute(&self.pool)
        .await
        .map_err(|e| PomniError::Storage(format!("create task failed: {e}")))?;

        self.get_task(&id)
            .await?
            .ok_or_else(|| PomniError::Storage(format!("task {id} vanished after insert")))
    }

    /// Fetch a single task by full ID.
    pub async fn get_task(&self, id: &str) -> Result<Option<Task>, PomniError> {
        let row: Option<TaskRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PomniError::Storage(format!("get task failed: {e}")))?;
        row.map(Task::try_from).transpose()
    }

    /// All recurring tasks, regardless of `is_done`, in insertion order.
    pub async fn list_recurring_tasks(&self) -> Result<Vec<Task>, PomniError> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE is_recurring = 1 ORDER BY rowid ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PomniError::Storage(format!("list recurring tasks failed: {e}")))?;
        rows.into_iter().map(Task::try_from).collect()
    }

    /// Pending one-shot reminders whose `remind_at` is at or before `now`.
    pub async fn get_due_reminders(&self, now: DateTime<Utc>) -> Result<Vec<Task>, PomniError> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE is_recurring = 0 AND is_done = 0 \
             AND remind_at IS NOT NULL AND remind_at <= ? ORDER BY remind_at ASC"
        ))
        .bind(format_timestamp(now))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PomniError::Storage(format!("get due reminders failed: {e}")))?;
        rows.into_iter().map(Task::try_from).collect()
    }

    /// Pending tasks for an owner (for /tasks): recurring first, then reminders by due time.
    pub async fn get_tasks_for_owner(&self, owner_id: &str) -> Result<Vec<Task>, PomniError> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE owner_id = ? AND is_done = 0 \
             ORDER BY is_recurring DESC, remind_at ASC, rowid ASC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PomniError::Storage(format!("get tasks failed: {e}")))?;
        rows.into_iter().map(Task::try_from).collect()
    }

    /// Mark a task delivered/completed by full ID. Returns `true` if it changed.
    pub async fn mark_done(&self, id: &str) -> Result<bool, PomniError> {
        let result = sqlx::query("UPDATE tasks SET is_done = 1 WHERE id = ? AND is_done = 0")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| PomniError::Storage(format!("mark done failed: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark an owner's pending task done by ID prefix.
    pub async fn complete_task(
        &self,
        id_prefix: &str,
        owner_id: &str,
    ) -> Result<PrefixMatch, PomniError> {
        let id = match self.resolve_prefix(id_prefix, owner_id, true).await? {
            Ok(id) => id,
            Err(miss) => return Ok(miss),
        };
        let result = sqlx::query("UPDATE tasks SET is_done = 1 WHERE id = ? AND is_done = 0")
            .bind(&id)
            .execute(&self.pool)
            .await
            .map_err(|e| PomniError::Storage(format!("complete task failed: {e}")))?;
        Ok(if result.rows_affected() > 0 {
            PrefixMatch::Applied
        } else {
            PrefixMatch::NotFound
        })
    }

    /// Delete an owner's task by ID prefix.
    pub async fn delete_task(
        &self,
        id_prefix: &str,
        owner_id: &str,
    ) -> Result<PrefixMatch, PomniError> {
        let id = match self.resolve_prefix(id_prefix, owner_id, false).await? {
            Ok(id) => id,
            Err(miss) => return Ok(miss),
        };
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(&id)
            .execute(&self.pool)
            .await
            .map_err(|e| PomniError::Storage(format!("delete task failed: {e}")))?;
        Ok(if result.rows_affected() > 0 {
            PrefixMatch::Applied
        } else {
            PrefixMatch::NotFound
        })
    }

    /// Resolve a literal ID prefix to exactly one of the owner's task IDs.
    ///
    /// The prefix is compared with `substr`, so `%` and `_` match only themselves.
    async fn resolve_prefix(
        &self,
        id_prefix: &str,
        owner_id: &str,
        pending_only: bool,
    ) -> Result<Result<String, PrefixMatch>, PomniError> {
        if id_prefix.is_empty() {
            return Ok(Err(PrefixMatch::NotFound));
        }
        let sql = if pending_only {
            "SELECT id FROM tasks \
             WHERE substr(id, 1, length(?)) = ? AND owner_id = ? AND is_done = 0 LIMIT 2"
        } else {
            "SELECT id FROM tasks \
             WHERE substr(id, 1, length(?)) = ? AND owner_id = ? LIMIT 2"
        };
        let mut ids: Vec<(String,)> = sqlx::query_as(sql)
            .bind(id_prefix)
            .bind(id_prefix)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PomniError::Storage(format!("task lookup failed: {e}")))?;
        Ok(match ids.len() {
            0 => Err(PrefixMatch::NotFound),
            1 => Ok(ids.remove(0).0),
            _ => Err(PrefixMatch::Ambiguous),
        })
    }

    /// Atomically record that a recurring task was announced on `date`.
    ///
    /// Returns `false` if it was already announced that day.
    pub async fn claim_daily_notification(
        &self,
        id: &str,
        date: NaiveDate,
    ) -> Result<bool, PomniError> {
        let day = date.format("%Y-%m-%d").to_string();
        let result = sqlx::query(
            "UPDATE tasks SET last_notified_on = ? \
             WHERE id = ? AND (last_notified_on IS NULL OR last_notified_on <> ?)",
        )
        .bind(&day)
        .bind(id)
        .bind(&day)
        .execute(&self.pool)
        .await
        .map_err(|e| PomniError::Storage(format!("claim notification failed: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    /// Pending counts: (one-shot reminders, recurring tasks).
    pub async fn count_pending(&self) -> Result<(i64, i64), PomniError> {
        let row: (i64, i64) = sqlx::query_as(
            "SELECT \
                 COALESCE(SUM(CASE WHEN is_recurring = 0 THEN 1 ELSE 0 END), 0), \
                 COALESCE(SUM(CASE WHEN is_recurring = 1 THEN 1 ELSE 0 END), 0) \
             FROM tasks WHERE is_done = 0",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PomniError::Storage(format!("count tasks failed: {e}")))?;
        Ok(row)
    }
}

pub(super) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIME_FORMAT).to_string()
}

pub(super) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, PomniError> {
    NaiveDateTime::parse_from_str(s, TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| PomniError::Storage(format!("bad timestamp '{s}': {e}")))
}
