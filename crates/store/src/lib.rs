//! SQLite-backed transcript store for podbay conversations.
//!
//! The durable record of every conversation: a `conversations` table keyed
//! by owner, and a `messages` table holding the user/assistant/system rows
//! of each turn. Tool traffic is never persisted — it is orchestration
//! detail that lives only inside a request.
//!
//! All SQL lives in `sql/*.sql` files, loaded via `include_str!`. The
//! connection sits behind a `Mutex`, which also serializes writes per
//! process; concurrent turns in one conversation are last-write-wins.

use anyhow::Result;
use compact_str::CompactString;
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use std::{path::Path, str::FromStr, sync::Mutex};

const SQL_SCHEMA: &str = include_str!("../sql/schema.sql");
const SQL_INSERT_CONVERSATION: &str = include_str!("../sql/insert_conversation.sql");
const SQL_SELECT_CONVERSATION: &str = include_str!("../sql/select_conversation.sql");
const SQL_LIST_CONVERSATIONS: &str = include_str!("../sql/list_conversations.sql");
const SQL_DELETE_CONVERSATION: &str = include_str!("../sql/delete_conversation.sql");
const SQL_INSERT_MESSAGE: &str = include_str!("../sql/insert_message.sql");
const SQL_LAST_MESSAGE_AT: &str = include_str!("../sql/last_message_at.sql");
const SQL_TOUCH_CONVERSATION: &str = include_str!("../sql/touch_conversation.sql");
const SQL_HISTORY: &str = include_str!("../sql/history.sql");
const SQL_PAGE: &str = include_str!("../sql/page_messages.sql");
const SQL_PAGE_BEFORE: &str = include_str!("../sql/page_messages_before.sql");

/// Default page size for history pagination.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// The role of a persisted message.
///
/// Only the durable roles — tool messages are never written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "system")]
    System,
}

impl Role {
    /// The database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "system" => Ok(Self::System),
            other => anyhow::bail!("unknown message role: {other}"),
        }
    }
}

/// A persisted conversation record.
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    pub id: CompactString,
    #[serde(rename = "userId")]
    pub user_id: CompactString,
    pub title: String,
    pub model: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
}

/// A persisted message record.
#[derive(Debug, Clone, Serialize)]
pub struct MessageRecord {
    pub id: CompactString,
    #[serde(rename = "conversationId")]
    pub conversation_id: CompactString,
    pub role: Role,
    pub content: String,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
}

/// SQLite-backed transcript store.
pub struct TranscriptStore {
    conn: Mutex<Connection>,
}

impl TranscriptStore {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    /// Create an in-memory database (useful for testing).
    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SQL_SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a conversation owned by the given user.
    pub fn create_conversation(&self, user_id: &str, title: &str) -> Result<Conversation> {
        let conn = self.conn.lock().unwrap();
        let id = CompactString::new(uuid::Uuid::new_v4().to_string());
        let now = now_millis();

        conn.execute(
            SQL_INSERT_CONVERSATION,
            rusqlite::params![id.as_str(), user_id, title, Option::<String>::None, now],
        )?;

        Ok(Conversation {
            id,
            user_id: user_id.into(),
            title: title.to_owned(),
            model: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether the conversation exists and belongs to the user.
    pub fn owned(&self, user_id: &str, conversation_id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                SQL_SELECT_CONVERSATION,
                [user_id, conversation_id],
                conversation_from_row,
            )
            .optional()?;
        Ok(row.is_some())
    }

    /// All conversations owned by the user, most recently updated first.
    pub fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(SQL_LIST_CONVERSATIONS)?;
        let rows = stmt
            .query_map([user_id], conversation_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Delete a conversation owned by the user, returning the removed
    /// record. Messages cascade.
    pub fn delete_conversation(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<Option<Conversation>> {
        let conn = self.conn.lock().unwrap();
        let removed = conn
            .query_row(
                SQL_SELECT_CONVERSATION,
                [user_id, conversation_id],
                conversation_from_row,
            )
            .optional()?;

        if removed.is_some() {
            conn.execute(SQL_DELETE_CONVERSATION, [user_id, conversation_id])?;
        }

        Ok(removed)
    }

    /// Append a message to a conversation and bump its `updated_at`.
    ///
    /// `created_at` is strictly monotonic within a conversation, so a
    /// timestamp cursor over the messages is a total order even when two
    /// appends land in the same millisecond.
    pub fn append_message(
        &self,
        conversation_id: &str,
        role: Role,
        content: &str,
    ) -> Result<MessageRecord> {
        let conn = self.conn.lock().unwrap();
        let id = CompactString::new(uuid::Uuid::new_v4().to_string());

        let last: Option<i64> =
            conn.query_row(SQL_LAST_MESSAGE_AT, [conversation_id], |row| row.get(0))?;
        let now = now_millis().max(last.map_or(i64::MIN, |t| t + 1));

        conn.execute(
            SQL_INSERT_MESSAGE,
            rusqlite::params![id.as_str(), conversation_id, role.as_str(), content, now],
        )?;
        conn.execute(
            SQL_TOUCH_CONVERSATION,
            rusqlite::params![conversation_id, now],
        )?;

        Ok(MessageRecord {
            id,
            conversation_id: conversation_id.into(),
            role,
            content: content.to_owned(),
            created_at: now,
            updated_at: now,
        })
    }

    /// The full message history of a conversation, oldest first.
    pub fn history(&self, conversation_id: &str) -> Result<Vec<MessageRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(SQL_HISTORY)?;
        let rows = stmt
            .query_map([conversation_id], message_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// One page of messages, newest first.
    ///
    /// With `before`, only messages strictly older than the cursor are
    /// returned; paging past the earliest message yields an empty page.
    pub fn page(
        &self,
        conversation_id: &str,
        before: Option<i64>,
        limit: u32,
    ) -> Result<Vec<MessageRecord>> {
        let conn = self.conn.lock().unwrap();
        let rows = match before {
            Some(cursor) => {
                let mut stmt = conn.prepare(SQL_PAGE_BEFORE)?;
                stmt.query_map(
                    rusqlite::params![conversation_id, cursor, limit],
                    message_from_row,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let mut stmt = conn.prepare(SQL_PAGE)?;
                stmt.query_map(rusqlite::params![conversation_id, limit], message_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(rows)
    }
}

fn conversation_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: CompactString::new(row.get::<_, String>(0)?),
        user_id: CompactString::new(row.get::<_, String>(1)?),
        title: row.get(2)?,
        model: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn message_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageRecord> {
    let role: String = row.get(2)?;
    let role = role.parse().map_err(|e: anyhow::Error| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, e.into())
    })?;

    Ok(MessageRecord {
        id: CompactString::new(row.get::<_, String>(0)?),
        conversation_id: CompactString::new(row.get::<_, String>(1)?),
        role,
        content: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
