use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lingodeck_core::{filter_by_language, repo::Repository, Card, CardId, CoreError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tokio::task;
use tracing::{debug, warn};

pub mod paths;

const FILE_VERSION: u32 = 1;

#[derive(Clone, Serialize, Deserialize)]
struct FileImage {
    version: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    cards: Vec<Card>,
}

#[derive(Clone)]
struct State {
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    cards: HashMap<CardId, Card>,
}

impl State {
    fn new_empty() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            cards: HashMap::new(),
        }
    }

    fn sorted_cards(&self) -> Vec<Card> {
        let mut cards: Vec<Card> = self.cards.values().cloned().collect();
        cards.sort_by_key(|c| (c.created_at, c.id));
        cards
    }

    fn to_image(&self) -> FileImage {
        FileImage {
            version: FILE_VERSION,
            created_at: self.created_at,
            updated_at: self.updated_at,
            cards: self.sorted_cards(),
        }
    }

    fn from_image(img: FileImage) -> Self {
        Self {
            created_at: img.created_at,
            updated_at: img.updated_at,
            cards: img.cards.into_iter().map(|c| (c.id, c)).collect(),
        }
    }
}

/// Card store backed by a single JSON file.
///
/// The whole image is rewritten after each mutation: first to a temp file that
/// is then renamed over the store, then as a timestamped copy in the backups
/// directory, which keeps at most `max_backups` files.
///
/// Mutations are applied to a copy of the state. The copy replaces the live
/// state only once it is on disk, so a failed write leaves readers and the
/// file agreeing on the previous contents.
pub struct JsonStore {
    path: PathBuf,
    backups_dir: PathBuf,
    max_backups: usize,
    state: RwLock<State>,
    writer: Mutex<()>,
}

impl JsonStore {
    pub async fn open_with(path: PathBuf, backups_dir: PathBuf, max_backups: usize) -> Result<Self, CoreError> {
        ensure_parent_dirs(&path)?;
        ensure_dir(&backups_dir)?;
        let state = load_or_init(&path).await?;
        debug!(path = %path.display(), cards = state.cards.len(), "json store opened");
        Ok(Self {
            path,
            backups_dir,
            max_backups: max_backups.max(1),
            state: RwLock::new(state),
            writer: Mutex::new(()),
        })
    }

    /// Runs `change` against a copy of the state, writes the result and only
    /// then publishes it.
    async fn mutate<F>(&self, change: F) -> Result<(), CoreError>
    where
        F: FnOnce(&mut State) -> Result<(), CoreError> + Send,
    {
        let _writing = self.writer.lock().await;
        let mut next = self.state.read().clone();
        change(&mut next)?;
        next.updated_at = Utc::now();
        self.save(&next).await?;
        *self.state.write() = next;
        Ok(())
    }

    async fn save(&self, state: &State) -> Result<(), CoreError> {
        let snapshot = state.to_image();
        let path = self.path.clone();
        let backups = self.backups_dir.clone();
        let keep = self.max_backups;

        task::spawn_blocking(move || write_with_backup(&path, &backups, keep, &snapshot))
            .await
            .map_err(|_| CoreError::Storage("io"))?
            .map_err(|e| {
                warn!(error = %e, "json store write failed");
                CoreError::Storage("io")
            })?;
        debug!(path = %self.path.display(), "json store saved");
        Ok(())
    }
}

fn ensure_parent_dirs(path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Ok(())
}

fn ensure_dir(path: &Path) -> Result<(), CoreError> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|_| CoreError::Storage("io"))
}

async fn load_or_init(path: &Path) -> Result<State, CoreError> {
    if path.exists() {
        let p = path.to_path_buf();
        let img: FileImage = task::spawn_blocking(move || {
            let buf = fs::read_to_string(&p)?;
            let v = serde_json::from_str::<FileImage>(&buf)?;
            Ok::<FileImage, io::Error>(v)
        })
        .await
        .map_err(|_| CoreError::Storage("io"))
        .and_then(|r| r.map_err(|_| CoreError::Storage("corrupt store file")))?;
        if img.version != FILE_VERSION {
            return Err(CoreError::Storage("unsupported store file version"));
        }
        Ok(State::from_image(img))
    } else {
        let st = State::new_empty();
        encode(&st.to_image())
            .and_then(|bytes| write_atomic(path, &bytes))
            .map_err(|_| CoreError::Storage("io"))?;
        Ok(st)
    }
}

fn encode(img: &FileImage) -> Result<Vec<u8>, io::Error> {
    serde_json::to_vec_pretty(img).map_err(io::Error::from)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), io::Error> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn write_with_backup(path: &Path, backups_dir: &Path, max_backups: usize, img: &FileImage) -> Result<(), io::Error> {
    fs::create_dir_all(backups_dir)?;

    let json = encode(img)?;
    write_atomic(path, &json)?;

    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let backup_path = backups_dir.join(format!("lingodeck-{ts}.json"));
    write_atomic(&backup_path, &json)?;

    rotate_backups(backups_dir, max_backups)
}

fn rotate_backups(dir: &Path, keep: usize) -> Result<(), io::Error> {
    let mut entries: Vec<_> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    // Names embed the timestamp, so lexical order is age order.
    entries.sort_by_key(|e| e.file_name());
    if entries.len() > keep {
        for e in &entries[0..entries.len() - keep] {
            if let Err(err) = fs::remove_file(e.path()) {
                warn!(file = %e.path().display(), error = %err, "could not remove old backup");
            }
        }
    }
    Ok(())
}

#[async_trait]
impl Repository for JsonStore {
    async fn insert_card(&self, card: &Card) -> Result<Card, CoreError> {
        self.mutate(|s| {
            s.cards.insert(card.id, card.clone());
            Ok(())
        })
        .await?;
        Ok(card.clone())
    }

    async fn get_card(&self, id: CardId) -> Result<Card, CoreError> {
        let s = self.state.read();
        s.cards.get(&id).cloned().ok_or(CoreError::NotFound("card"))
    }

    async fn list_cards(&self, language: Option<&str>) -> Result<Vec<Card>, CoreError> {
        let cards = self.state.read().sorted_cards();
        Ok(match language {
            Some(lang) => filter_by_language(&cards, lang),
            None => cards,
        })
    }

    async fn update_card(&self, card: &Card) -> Result<Card, CoreError> {
        self.mutate(|s| match s.cards.get_mut(&card.id) {
            Some(slot) => {
                *slot = card.clone();
                Ok(())
            }
            None => Err(CoreError::NotFound("card")),
        })
        .await?;
        Ok(card.clone())
    }

    async fn delete_card(&self, id: CardId) -> Result<(), CoreError> {
        self.mutate(|s| match s.cards.remove(&id) {
            Some(_) => Ok(()),
            None => Err(CoreError::NotFound("card")),
        })
        .await
    }
}
