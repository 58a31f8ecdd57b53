//! Ordered, id-unique bookmark collection.
//!
//! Backing store for the sync engine's view. Order is arrival order with the
//! newest at the head; ids never repeat.

use std::collections::HashSet;

use crate::types::bookmark::Bookmark;

/// Ordered bookmark sequence keyed by `id`.
#[derive(Debug, Clone, Default)]
pub struct BookmarkList {
    entries: Vec<Bookmark>,
    ids: HashSet<String>,
}

impl BookmarkList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from `snapshot`, keeping the first occurrence of any repeated id.
    pub fn from_snapshot(snapshot: Vec<Bookmark>) -> Self {
        let mut list = Self::new();
        for bookmark in snapshot {
            if list.ids.insert(bookmark.id.clone()) {
                list.entries.push(bookmark);
            }
        }
        list
    }

    /// Replaces the contents with `snapshot`.
    pub fn reset(&mut self, snapshot: Vec<Bookmark>) {
        *self = Self::from_snapshot(snapshot);
    }

    /// Inserts at the head unless the id is already present. Returns whether it was inserted.
    pub fn insert_head(&mut self, bookmark: Bookmark) -> bool {
        self.insert_at(0, bookmark)
    }

    /// Inserts at `index` (clamped to the length) unless the id is already present.
    pub fn insert_at(&mut self, index: usize, bookmark: Bookmark) -> bool {
        if !self.ids.insert(bookmark.id.clone()) {
            return false;
        }
        let index = index.min(self.entries.len());
        self.entries.insert(index, bookmark);
        true
    }

    /// Removes the entry with `id`, returning it and its former index.
    pub fn remove(&mut self, id: &str) -> Option<(usize, Bookmark)> {
        if !self.ids.remove(id) {
            return None;
        }
        let index = self.entries.iter().position(|b| b.id == id)?;
        Some((index, self.entries.remove(index)))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[Bookmark] {
        &self.entries
    }

    pub fn to_vec(&self) -> Vec<Bookmark> {
        self.entries.clone()
    }
}
