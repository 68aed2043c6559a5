//! Draft persistence keyed by room and thread.
//!
//! The file-backed store keeps every draft in a single JSON array
//! (`drafts.json` under the relay home) of `{room_id, thread_id, text}`
//! records. Saving an empty draft removes its record.

use std::collections::BTreeMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use tokio::fs;
use tokio::sync::Mutex;

use crate::Result;

/// Filename that stores drafts inside the relay home.
pub const DRAFTS_FILENAME: &str = "drafts.json";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DraftKey {
    pub room_id: String,
    pub thread_id: Option<String>,
}

impl DraftKey {
    pub fn new(room_id: impl Into<String>, thread_id: Option<String>) -> Self {
        Self {
            room_id: room_id.into(),
            thread_id,
        }
    }
}

/// For logs only; ids may contain `/`, so this is not a unique key.
impl fmt::Display for DraftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.thread_id {
            Some(thread_id) => write!(f, "{}/{thread_id}", self.room_id),
            None => f.write_str(&self.room_id),
        }
    }
}

#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn load(&self, key: &DraftKey) -> Result<Option<String>>;

    async fn save(&self, key: &DraftKey, text: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryDraftStore {
    drafts: Mutex<BTreeMap<DraftKey, String>>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftStore for InMemoryDraftStore {
    async fn load(&self, key: &DraftKey) -> Result<Option<String>> {
        Ok(self.drafts.lock().await.get(key).cloned())
    }

    async fn save(&self, key: &DraftKey, text: &str) -> Result<()> {
        let mut drafts = self.drafts.lock().await;
        if text.is_empty() {
            drafts.remove(key);
        } else {
            drafts.insert(key.clone(), text.to_string());
        }
        Ok(())
    }
}

/// One record of the drafts file.
#[derive(Debug, Serialize, Deserialize)]
struct StoredDraft {
    room_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thread_id: Option<String>,
    text: String,
}

#[derive(Debug)]
pub struct FileDraftStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file.
    lock: Mutex<()>,
}

impl FileDraftStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<BTreeMap<DraftKey, String>> {
        let records: Vec<StoredDraft> = match fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Vec::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(records
            .into_iter()
            .map(|record| (DraftKey::new(record.room_id, record.thread_id), record.text))
            .collect())
    }
}

#[async_trait]
impl DraftStore for FileDraftStore {
    async fn load(&self, key: &DraftKey) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        let mut drafts = self.read_all().await?;
        Ok(drafts.remove(key))
    }

    async fn save(&self, key: &DraftKey, text: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut drafts = self.read_all().await?;
        if text.is_empty() {
            if drafts.remove(key).is_none() {
                return Ok(());
            }
        } else {
            drafts.insert(key.clone(), text.to_string());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        // Write to a sibling file first so a crash never leaves half a JSON
        // object behind.
        let tmp_path = self.path.with_extension("json.tmp");
        let records: Vec<StoredDraft> = drafts
            .into_iter()
            .map(|(key, text)| StoredDraft {
                room_id: key.room_id,
                thread_id: key.thread_id,
                text,
            })
            .collect();
        fs::write(&tmp_path, serde_json::to_vec_pretty(&records)?).await?;
        fs::rename(&tmp_path, &self.path).await?;
        tracing::debug!(%key, "saved draft");
        Ok(())
    }
}
