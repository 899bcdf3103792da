//! Client-side cache of the posts in view.
//!
//! Moves are applied optimistically: the item jumps to its new day as soon as
//! it is dropped and is tagged [`SyncState::Pending`] with a snapshot of its
//! previous state. The backend's answer either confirms the move or rolls the
//! item back to that snapshot. All changes go through [`ItemStore::dispatch`].

use std::collections::HashSet;

use chrono::{DateTime, Local};

use crate::models::scheduled_item::{PostStatus, ScheduledItem};

#[derive(Debug, Clone, PartialEq)]
pub enum SyncState {
    /// Update sent, not yet answered
    Pending { token: u64, previous: ScheduledItem },
    Confirmed,
    RolledBack { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredItem {
    pub item: ScheduledItem,
    pub sync: Option<SyncState>,
}

#[derive(Debug, Clone)]
pub enum StoreAction {
    Loaded(Vec<ScheduledItem>),
    RescheduleRequested {
        token: u64,
        item_id: String,
        scheduled_at: DateTime<Local>,
    },
    RescheduleConfirmed {
        token: u64,
        item_id: String,
        server_item: Option<ScheduledItem>,
    },
    RescheduleFailed {
        token: u64,
        item_id: String,
        reason: String,
    },
}

#[derive(Debug, Default, Clone)]
pub struct ItemStore {
    entries: Vec<StoredItem>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<ScheduledItem>) -> Self {
        let mut store = Self::new();
        store.dispatch(StoreAction::Loaded(items));
        store
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &ScheduledItem> {
        self.entries.iter().map(|entry| &entry.item)
    }

    pub fn get(&self, id: &str) -> Option<&ScheduledItem> {
        self.entry(id).map(|entry| &entry.item)
    }

    pub fn sync_state(&self, id: &str) -> Option<&SyncState> {
        self.entry(id).and_then(|entry| entry.sync.as_ref())
    }

    pub fn is_pending(&self, id: &str) -> bool {
        matches!(self.sync_state(id), Some(SyncState::Pending { .. }))
    }

    fn entry(&self, id: &str) -> Option<&StoredItem> {
        self.entries.iter().find(|entry| entry.item.id == id)
    }

    fn entry_mut(&mut self, id: &str) -> Option<&mut StoredItem> {
        self.entries.iter_mut().find(|entry| entry.item.id == id)
    }

    /// Apply an action. Returns whether anything changed.
    pub fn dispatch(&mut self, action: StoreAction) -> bool {
        match action {
            StoreAction::Loaded(items) => {
                self.load(items);
                true
            }
            StoreAction::RescheduleRequested {
                token,
                item_id,
                scheduled_at,
            } => {
                let Some(entry) = self.entry_mut(&item_id) else {
                    log::warn!("Cannot reschedule unknown post {}", item_id);
                    return false;
                };
                if matches!(entry.sync, Some(SyncState::Pending { .. })) {
                    log::warn!("Post {} already has a move in flight", item_id);
                    return false;
                }

                let previous = entry.item.clone();
                entry.item.scheduled_at = Some(scheduled_at);
                entry.item.status = PostStatus::Scheduled;
                entry.sync = Some(SyncState::Pending { token, previous });
                true
            }
            StoreAction::RescheduleConfirmed {
                token,
                item_id,
                server_item,
            } => {
                let Some(entry) = self.pending_entry(&item_id, token) else {
                    return false;
                };
                if let Some(server_item) = server_item {
                    if server_item.id == item_id {
                        entry.item = server_item;
                    } else {
                        log::warn!(
                            "Backend confirmed post {} with mismatched id {}",
                            item_id,
                            server_item.id
                        );
                    }
                }
                entry.sync = Some(SyncState::Confirmed);
                true
            }
            StoreAction::RescheduleFailed {
                token,
                item_id,
                reason,
            } => {
                let Some(entry) = self.pending_entry(&item_id, token) else {
                    return false;
                };
                if let Some(SyncState::Pending { previous, .. }) = entry.sync.take() {
                    entry.item = previous;
                }
                entry.sync = Some(SyncState::RolledBack { reason });
                true
            }
        }
    }

    fn pending_entry(&mut self, item_id: &str, token: u64) -> Option<&mut StoredItem> {
        let entry = self.entry_mut(item_id)?;
        match &entry.sync {
            Some(SyncState::Pending { token: pending, .. }) if *pending == token => Some(entry),
            _ => {
                log::debug!("Ignoring stale result {} for post {}", token, item_id);
                None
            }
        }
    }

    /// Replace the cache with a fresh listing, keeping in-flight moves
    fn load(&mut self, items: Vec<ScheduledItem>) {
        let pending: Vec<StoredItem> = self
            .entries
            .drain(..)
            .filter(|entry| matches!(entry.sync, Some(SyncState::Pending { .. })))
            .collect();

        let mut seen = HashSet::new();
        for item in items {
            if !seen.insert(item.id.clone()) {
                log::warn!("Duplicate post {} in listing, keeping the first", item.id);
                continue;
            }
            match pending.iter().find(|entry| entry.item.id == item.id) {
                Some(entry) => self.entries.push(entry.clone()),
                None => self.entries.push(StoredItem { item, sync: None }),
            }
        }

        for entry in pending {
            if !seen.contains(&entry.item.id) {
                self.entries.push(entry);
            }
        }
    }
}
