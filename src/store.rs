//! In-memory todo store with durable flat-file snapshots.
//!
//! The store maps item ids to [`TodoItem`] values and knows nothing about
//! the network. Snapshots are newline-delimited `<id>\\<json>` records
//! framed by `{` and `}` lines; the framing carries no meaning and is
//! ignored on load. Saves go through a temp file and a rename so a crash
//! mid-write cannot corrupt the previous snapshot.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{TodoError, TodoResult};
use crate::models::TodoItem;

/// Literal two-backslash separator between the id and the record payload
const RECORD_SEPARATOR: &str = "\\\\";
const FRAME_OPEN: &str = "{";
const FRAME_CLOSE: &str = "}";

/// Encode one item as a single-line snapshot payload
pub fn serialize_item(item: &TodoItem) -> TodoResult<String> {
    Ok(serde_json::to_string(item)?)
}

/// Decode one snapshot payload, returning `None` on any missing or
/// malformed field instead of failing the caller.
pub fn parse_item(payload: &str) -> Option<TodoItem> {
    match serde_json::from_str::<TodoItem>(payload) {
        Ok(item) => Some(item),
        Err(err) => {
            tracing::warn!("skipping undecodable item record: {}", err);
            None
        }
    }
}

/// Keyed collection of todo items
#[derive(Debug, Default)]
pub struct TodoStore {
    items: HashMap<String, TodoItem>,
}

impl TodoStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from a list of items, deduplicating by id
    pub fn from_items(items: Vec<TodoItem>) -> Self {
        let mut store = Self::new();
        for item in items {
            let id = item.id.clone();
            if !store.add(item) {
                tracing::warn!(id = %id, "item id already exists, rewriting entry");
            }
        }
        store
    }

    /// Initialize the durable backend at `path` and load any prior snapshot.
    ///
    /// Failure here means the store cannot persist at all and is fatal to
    /// the caller.
    pub fn open(path: &Path) -> TodoResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| {
                    TodoError::storage(format!(
                        "cannot create snapshot directory {}: {}",
                        parent.display(),
                        err
                    ))
                })?;
            }
        }

        let mut store = Self::new();
        if path.exists() {
            store.load_snapshot(path).map_err(|err| {
                TodoError::storage(format!("cannot read snapshot {}: {}", path.display(), err))
            })?;
        }
        Ok(store)
    }

    /// Insert or overwrite an item.
    ///
    /// Returns `false` when the id already existed, signalling that this
    /// was an update rather than a create. Never an error.
    pub fn add(&mut self, item: TodoItem) -> bool {
        self.items.insert(item.id.clone(), item).is_none()
    }

    /// Remove an item, returning the prior value. A missing id is a normal
    /// `None` outcome.
    pub fn remove(&mut self, id: &str) -> Option<TodoItem> {
        self.items.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&TodoItem> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of completed items
    pub fn completed_count(&self) -> usize {
        self.items.values().filter(|item| item.done).count()
    }

    /// Clone of the current contents, in no particular order
    pub fn items(&self) -> Vec<TodoItem> {
        self.items.values().cloned().collect()
    }

    /// Replace the entire contents with `items`
    pub fn replace_all(&mut self, items: Vec<TodoItem>) {
        self.items.clear();
        for item in items {
            self.add(item);
        }
    }

    /// Merge the records in a snapshot file into the store.
    ///
    /// Malformed lines are skipped with a diagnostic and never abort the
    /// load. Returns the number of records loaded.
    pub fn load_snapshot(&mut self, path: &Path) -> TodoResult<usize> {
        let content = fs::read_to_string(path)?;
        let mut loaded = 0;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line == FRAME_OPEN || line == FRAME_CLOSE {
                continue;
            }
            let Some((id, payload)) = line.split_once(RECORD_SEPARATOR) else {
                tracing::warn!("skipping malformed snapshot line: {:?}", line);
                continue;
            };
            let Some(item) = parse_item(payload) else {
                continue;
            };
            if id != item.id {
                tracing::warn!(
                    line_id = id,
                    item_id = %item.id,
                    "snapshot line key disagrees with record id, keeping record id"
                );
            }
            self.add(item);
            loaded += 1;
        }
        Ok(loaded)
    }

    /// Write every entry to `path` atomically
    pub fn save_snapshot(&self, path: &Path) -> TodoResult<()> {
        let mut content = String::new();
        content.push_str(FRAME_OPEN);
        content.push('\n');
        for (id, item) in &self.items {
            content.push_str(id);
            content.push_str(RECORD_SEPARATOR);
            content.push_str(&serialize_item(item)?);
            content.push('\n');
        }
        content.push_str(FRAME_CLOSE);
        content.push('\n');

        let Some(name) = path.file_name() else {
            return Err(TodoError::storage(format!(
                "snapshot path {} has no file name",
                path.display()
            )));
        };
        let tmp = path.with_file_name(format!("{}.tmp", name.to_string_lossy()));
        fs::write(&tmp, &content)?;
        fs::rename(&tmp, path)?;
        tracing::debug!(records = self.items.len(), path = %path.display(), "snapshot saved");
        Ok(())
    }
}
