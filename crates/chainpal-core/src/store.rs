//! File-backed chat persistence keyed by wallet identity.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{ChainpalError, Result};

pub const DEFAULT_CHAT_NAME: &str = "New Chat";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub wallet_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: u64,
    pub uuid: String,
    pub name: String,
    pub wallet_id: String,
    pub created_at: DateTime<Utc>,
}

/// One question/answer exchange to append to a chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatExchange {
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub question: String,
    pub answer: String,
}

/// A question paired with the answer that followed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistoryEntry {
    message: String,
    timestamp: DateTime<Utc>,
}

/// Persistence for users, chats, and chat histories.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Register a wallet. Fails with `Conflict` when it already exists.
    async fn create_user(&self, wallet_id: &str) -> Result<User>;

    async fn get_user(&self, wallet_id: &str) -> Result<Option<User>>;

    async fn get_chat(&self, uuid: &str) -> Result<Option<Chat>>;

    /// Append a question and its answer, creating the chat on first use.
    async fn save_exchange(&self, wallet_id: &str, exchange: ChatExchange) -> Result<Chat>;

    async fn list_chats(&self, wallet_id: &str) -> Result<Vec<Chat>>;

    /// Question/answer pairs of a chat, oldest first.
    async fn chat_history(&self, uuid: &str) -> Result<Vec<QaPair>>;
}

/// JSON-file chat store.
///
/// Layout:
/// - `<base>/users.json`: array of `User`
/// - `<base>/chats.json`: array of `Chat`
/// - `<base>/history/<uuid>.jsonl`: one message per line, question then answer
pub struct JsonChatStore {
    base: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonChatStore {
    pub fn new(base: PathBuf) -> Self {
        Self {
            base,
            write_lock: Mutex::new(()),
        }
    }

    fn users_path(&self) -> PathBuf {
        self.base.join("users.json")
    }

    fn chats_path(&self) -> PathBuf {
        self.base.join("chats.json")
    }

    fn history_dir(&self) -> PathBuf {
        self.base.join("history")
    }

    fn history_path(&self, uuid: &str) -> Result<PathBuf> {
        if uuid.is_empty() || !uuid.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ChainpalError::InvalidInput(format!("invalid chat uuid: {uuid}")));
        }
        Ok(self.history_dir().join(format!("{uuid}.jsonl")))
    }

    async fn ensure_dirs(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.base).await?;
        tokio::fs::create_dir_all(self.history_dir()).await?;
        Ok(())
    }

    async fn load_list<T: serde::de::DeserializeOwned>(&self, path: PathBuf) -> Result<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = tokio::fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&data)?)
    }

    async fn save_list<T: Serialize>(&self, path: PathBuf, items: &[T]) -> Result<()> {
        self.ensure_dirs().await?;
        let data = serde_json::to_string_pretty(items)?;
        // Atomic write: write to temp then rename
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, data.as_bytes()).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn load_history(&self, uuid: &str) -> Result<Vec<HistoryEntry>> {
        let path = self.history_path(uuid)?;
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = tokio::fs::read_to_string(&path).await?;
        let mut entries = Vec::new();
        for line in data.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let entry: HistoryEntry = serde_json::from_str(line)
                .map_err(|e| ChainpalError::Store(format!("corrupt history line: {e}")))?;
            entries.push(entry);
        }
        Ok(entries)
    }
}

#[async_trait]
impl ChatStore for JsonChatStore {
    async fn create_user(&self, wallet_id: &str) -> Result<User> {
        let _guard = self.write_lock.lock().await;

        let mut users: Vec<User> = self.load_list(self.users_path()).await?;
        if users.iter().any(|u| u.wallet_id == wallet_id) {
            return Err(ChainpalError::Conflict(
                "User with this wallet_id already exists".into(),
            ));
        }

        let user = User {
            id: users.iter().map(|u| u.id).max().unwrap_or(0) + 1,
            wallet_id: wallet_id.to_string(),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        self.save_list(self.users_path(), &users).await?;

        debug!(wallet_id, id = user.id, "Created user");
        Ok(user)
    }

    async fn get_user(&self, wallet_id: &str) -> Result<Option<User>> {
        let users: Vec<User> = self.load_list(self.users_path()).await?;
        Ok(users.into_iter().find(|u| u.wallet_id == wallet_id))
    }

    async fn get_chat(&self, uuid: &str) -> Result<Option<Chat>> {
        let chats: Vec<Chat> = self.load_list(self.chats_path()).await?;
        Ok(chats.into_iter().find(|c| c.uuid == uuid))
    }

    async fn save_exchange(&self, wallet_id: &str, exchange: ChatExchange) -> Result<Chat> {
        let path = self.history_path(&exchange.uuid)?;
        let _guard = self.write_lock.lock().await;

        let mut chats: Vec<Chat> = self.load_list(self.chats_path()).await?;
        let chat = match chats.iter().find(|c| c.uuid == exchange.uuid) {
            Some(existing) => existing.clone(),
            None => {
                let users: Vec<User> = self.load_list(self.users_path()).await?;
                if !users.iter().any(|u| u.wallet_id == wallet_id) {
                    return Err(ChainpalError::NotFound("User not found".into()));
                }
                let chat = Chat {
                    id: chats.iter().map(|c| c.id).max().unwrap_or(0) + 1,
                    uuid: exchange.uuid.clone(),
                    name: exchange
                        .name
                        .clone()
                        .filter(|n| !n.trim().is_empty())
                        .unwrap_or_else(|| DEFAULT_CHAT_NAME.to_string()),
                    wallet_id: wallet_id.to_string(),
                    created_at: Utc::now(),
                };
                chats.push(chat.clone());
                self.save_list(self.chats_path(), &chats).await?;
                debug!(uuid = %chat.uuid, wallet_id, "Created chat");
                chat
            }
        };

        self.ensure_dirs().await?;
        let now = Utc::now();
        let mut data = String::new();
        for message in [exchange.question, exchange.answer] {
            data.push_str(&serde_json::to_string(&HistoryEntry {
                message,
                timestamp: now,
            })?);
            data.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(data.as_bytes()).await?;
        file.flush().await?;

        debug!(uuid = %chat.uuid, "Appended chat exchange");
        Ok(chat)
    }

    async fn list_chats(&self, wallet_id: &str) -> Result<Vec<Chat>> {
        let chats: Vec<Chat> = self.load_list(self.chats_path()).await?;
        Ok(chats
            .into_iter()
            .filter(|c| c.wallet_id == wallet_id)
            .collect())
    }

    async fn chat_history(&self, uuid: &str) -> Result<Vec<QaPair>> {
        if self.get_chat(uuid).await?.is_none() {
            return Err(ChainpalError::NotFound("Chat not found".into()));
        }

        let mut entries = self.load_history(uuid).await?;
        entries.sort_by_key(|e| e.timestamp);

        Ok(entries
            .chunks_exact(2)
            .map(|pair| QaPair {
                question: pair[0].message.clone(),
                answer: pair[1].message.clone(),
                timestamp: pair[1].timestamp,
            })
            .collect())
    }
}
