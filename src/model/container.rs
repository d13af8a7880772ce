//! Row containers with alias-aware release
//!
//! A container owns its backing storage until released. Two containers may
//! alias the same storage (one built with `alias()` from the other); the
//! storage is freed exactly once, by whichever handle is released last.

use std::sync::Arc;

use super::row::Row;

/// Outcome of releasing a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Released {
    /// This handle was the last owner; the backing storage was freed
    Freed,
    /// Another alias still holds the backing storage
    Detached,
}

/// Owned, dynamically sized sequence of rows.
///
/// The row count is always the length of the backing storage.
#[derive(Debug, Clone, Default)]
pub struct RowContainer {
    storage: Arc<Vec<Row>>,
}

impl RowContainer {
    /// Create an empty container
    pub fn empty() -> Self {
        Self::default()
    }

    /// Bind a container to freshly produced rows
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self {
            storage: Arc::new(rows),
        }
    }

    /// Create a second handle over the same backing storage.
    pub fn alias(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }

    /// Whether both containers view the same backing storage
    pub fn shares_storage_with(&self, other: &RowContainer) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Whether the container holds no rows
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Borrow the rows
    pub fn rows(&self) -> &[Row] {
        &self.storage
    }

    /// Sort rows by date ascending, in place.
    ///
    /// If the storage is aliased, this container is detached onto a private
    /// copy first so the alias never observes the reorder.
    pub fn sort_by_date(&mut self) {
        Arc::make_mut(&mut self.storage).sort_by_key(|row| row.date);
    }

    /// Release this handle.
    pub fn release(self) -> Released {
        match Arc::try_unwrap(self.storage) {
            Ok(_) => Released::Freed,
            Err(_) => Released::Detached,
        }
    }
}
