use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use thiserror::Error;

// ---------------------------------------------------------------------------
// RequestError
// ---------------------------------------------------------------------------

/// Set of error categories recorded on a [`Request`](crate::Request).
///
/// Categories are additive: several causes can be OR'd into one value, and
/// [`RequestError::REQUEST_LINE`] is the union of the three request-line
/// field errors.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RequestError(u8);

impl RequestError {
    /// No error recorded.
    pub const NONE: Self = Self(0);
    /// The method token is missing or empty.
    pub const METHOD: Self = Self(1 << 0);
    /// The request target is missing or empty.
    pub const URI: Self = Self(1 << 1);
    /// The protocol version is missing or empty.
    pub const VERSION: Self = Self(1 << 2);
    /// Any structural request-line failure.
    pub const REQUEST_LINE: Self = Self(Self::METHOD.0 | Self::URI.0 | Self::VERSION.0);
    /// The header block is malformed.
    pub const HEADERS: Self = Self(1 << 3);
    /// The body could not be delimited.
    pub const BODY: Self = Self(1 << 4);
    /// The request buffer could not be allocated.
    pub const MEMORY_ALLOCATION: Self = Self(1 << 5);
    /// The input is larger than the request buffer.
    pub const CAPACITY: Self = Self(1 << 6);
    /// Unknown failure; every bit set.
    pub const UNKNOWN: Self = Self(u8::MAX);

    const NAMED: [(Self, &'static str); 7] = [
        (Self::METHOD, "method"),
        (Self::URI, "uri"),
        (Self::VERSION, "version"),
        (Self::HEADERS, "headers"),
        (Self::BODY, "body"),
        (Self::MEMORY_ALLOCATION, "memory-allocation"),
        (Self::CAPACITY, "capacity"),
    ];

    /// Raw bit representation.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// `true` when no category is recorded.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `true` when every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// `true` when `self` and `other` share at least one bit.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Names of the individual categories that are set.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }
}

impl BitOr for RequestError {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for RequestError {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestError({self})")
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        if *self == Self::UNKNOWN {
            return f.write_str("unknown");
        }
        let mut first = true;
        for name in self.names() {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for RequestError {}

impl Serialize for RequestError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(None)?;
        for name in self.names() {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}

// ---------------------------------------------------------------------------
// ListError
// ---------------------------------------------------------------------------

/// Error recorded by the most recent [`HeaderList`](crate::HeaderList)
/// operation. Exactly one cause at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Error)]
pub enum ListError {
    /// The last operation succeeded.
    #[default]
    #[error("no error")]
    None,
    #[error("list is not initialized")]
    NotInitialized,
    #[error("memory allocation failed")]
    MemoryAllocation,
    #[error("key not found")]
    KeyNotFound,
    #[error("value not found")]
    ValueNotFound,
    #[error("key already exists")]
    KeyExists,
    #[error("value already exists")]
    ValueExists,
    #[error("unknown list error")]
    Unknown,
}

// ---------------------------------------------------------------------------
// ValidateError
// ---------------------------------------------------------------------------

/// Internal validator failure. Protocol violations are reported as a status
/// code instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidateError {
    /// The request has not been through `parse` yet.
    #[error("request has not been parsed (status: {0})")]
    NotParsed(crate::RequestStatus),
}
