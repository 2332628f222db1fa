//! Ordered, duplicate-rejecting key/value list used for header fields.
//!
//! Nodes live in a `Vec` and are chained by index. Slot 0 is a sentinel head
//! that never carries data; `tail` points at the last real node (or at the
//! head when the list is empty), which keeps appends O(1). Lookups walk the
//! chain from the first real node and compare keys byte for byte.

use std::cell::Cell;
use std::collections::TryReserveError;

use log::{debug, warn};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::ListError;

const HEAD: usize = 0;

/// Lifecycle of a [`HeaderList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ListState {
    /// Not initialized; `add` and `get` are rejected.
    #[default]
    Unset,
    /// Initialized and accepting `add`/`get`.
    Initialized,
    /// Reserved for a sealed, read-only list. No operation enters it yet.
    Ready,
    /// Reserved for a list that was sealed and then released. No operation
    /// enters it yet.
    Unavailable,
}

#[derive(Debug, Clone, Default)]
struct Node {
    key: String,
    value: String,
    next: Option<usize>,
}

/// Insertion-ordered header storage with unique, case-sensitive keys.
///
/// ```rust
/// use lhttp::{HeaderList, ListError};
///
/// let mut list = HeaderList::new();
/// list.init().unwrap();
/// list.add("Host", "localhost:8080").unwrap();
///
/// assert_eq!(list.get("Host"), Ok("localhost:8080"));
/// assert_eq!(list.add("Host", "other"), Err(ListError::KeyExists));
/// assert_eq!(list.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HeaderList {
    state: ListState,
    error: Cell<ListError>,
    nodes: Vec<Node>,
    tail: usize,
    size: usize,
}

impl HeaderList {
    /// Create an `Unset` list. Call [`init`](Self::init) before use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the sentinel head and move to `Initialized`.
    ///
    /// An already-initialized list is released first.
    ///
    /// # Errors
    ///
    /// [`ListError::MemoryAllocation`] if the sentinel cannot be allocated.
    pub fn init(&mut self) -> Result<(), ListError> {
        self.free();
        self.error.set(ListError::None);

        let mut nodes = Vec::new();
        if nodes.try_reserve(1).is_err() {
            return self.fail(ListError::MemoryAllocation);
        }
        nodes.push(Node::default());

        self.nodes = nodes;
        self.tail = HEAD;
        self.size = 0;
        self.state = ListState::Initialized;
        Ok(())
    }

    /// Append a copy of `key` and `value`.
    ///
    /// # Errors
    ///
    /// - [`ListError::NotInitialized`] unless the list is `Initialized`.
    /// - [`ListError::KeyExists`] if `key` is already present; the list is
    ///   left untouched.
    /// - [`ListError::MemoryAllocation`] if a copy cannot be allocated;
    ///   nothing is linked in.
    pub fn add(&mut self, key: &str, value: &str) -> Result<(), ListError> {
        if self.state != ListState::Initialized {
            return self.fail(ListError::NotInitialized);
        }
        if self.find(key).is_some() {
            warn!("header list: rejecting duplicate key {key:?}");
            return self.fail(ListError::KeyExists);
        }

        let node = match (try_copy(key), try_copy(value)) {
            (Ok(key), Ok(value)) => Node {
                key,
                value,
                next: None,
            },
            _ => return self.fail(ListError::MemoryAllocation),
        };
        if self.nodes.try_reserve(1).is_err() {
            return self.fail(ListError::MemoryAllocation);
        }

        let index = self.nodes.len();
        self.nodes.push(node);
        self.nodes[self.tail].next = Some(index);
        self.tail = index;
        self.size += 1;
        self.error.set(ListError::None);
        Ok(())
    }

    /// Look up the value stored for `key`.
    ///
    /// The returned slice borrows the list and cannot outlive it.
    ///
    /// # Errors
    ///
    /// - [`ListError::NotInitialized`] unless the list is `Initialized`.
    /// - [`ListError::KeyNotFound`] if no node has this key.
    pub fn get(&self, key: &str) -> Result<&str, ListError> {
        if self.state != ListState::Initialized {
            return self.fail(ListError::NotInitialized);
        }
        match self.find(key) {
            Some(node) => {
                self.error.set(ListError::None);
                Ok(&node.value)
            }
            None => self.fail(ListError::KeyNotFound),
        }
    }

    /// Existence check. A missing key is not an error: the recorded error is
    /// reset to [`ListError::None`] whatever the answer, unless the list is
    /// not initialized.
    pub fn contains(&self, key: &str) -> bool {
        if self.state != ListState::Initialized {
            self.error.set(ListError::NotInitialized);
            return false;
        }
        self.error.set(ListError::None);
        self.find(key).is_some()
    }

    /// Release every node and the sentinel, returning to `Unset`.
    ///
    /// Safe to call repeatedly or on a list that was never initialized.
    pub fn free(&mut self) {
        if self.state == ListState::Initialized {
            debug!("header list: releasing {} node(s)", self.size);
        }
        self.nodes = Vec::new();
        self.tail = HEAD;
        self.size = 0;
        self.state = ListState::Unset;
    }

    /// Number of stored fields (the sentinel is not counted).
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn state(&self) -> ListState {
        self.state
    }

    /// Error recorded by the most recent operation.
    pub fn error(&self) -> ListError {
        self.error.get()
    }

    /// Iterate `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> HeaderIter<'_> {
        HeaderIter {
            nodes: &self.nodes,
            next: self.nodes.get(HEAD).and_then(|head| head.next),
        }
    }

    fn find(&self, key: &str) -> Option<&Node> {
        let mut cursor = self.nodes.get(HEAD).and_then(|head| head.next);
        while let Some(index) = cursor {
            let node = &self.nodes[index];
            if node.key == key {
                return Some(node);
            }
            cursor = node.next;
        }
        None
    }

    fn fail<T>(&self, err: ListError) -> Result<T, ListError> {
        self.error.set(err);
        Err(err)
    }
}

/// Iterator over the fields of a [`HeaderList`], following the node chain.
pub struct HeaderIter<'a> {
    nodes: &'a [Node],
    next: Option<usize>,
}

impl<'a> Iterator for HeaderIter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.nodes[self.next?];
        self.next = node.next;
        Some((node.key.as_str(), node.value.as_str()))
    }
}

impl<'a> IntoIterator for &'a HeaderList {
    type Item = (&'a str, &'a str);
    type IntoIter = HeaderIter<'a>;

    fn into_iter(self) -> HeaderIter<'a> {
        self.iter()
    }
}

impl Serialize for HeaderList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.size))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

fn try_copy(s: &str) -> Result<String, TryReserveError> {
    let mut owned = String::new();
    owned.try_reserve_exact(s.len())?;
    owned.push_str(s);
    Ok(owned)
}
