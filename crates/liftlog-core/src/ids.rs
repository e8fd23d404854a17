//! Core identifier types for liftlog.
//!
//! Every persisted record is addressed by a document ID. User IDs are issued by
//! the identity provider; block and workout-log IDs are generated client-side
//! before the first write so they can be referenced inside the same batch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a document ID in bytes.
pub const MAX_ID_LEN: usize = 1500;

/// Validate a raw document ID.
fn validate(value: &str) -> Result<(), IdError> {
    if value.is_empty() {
        return Err(IdError::Empty);
    }
    if value.len() > MAX_ID_LEN {
        return Err(IdError::TooLong {
            max: MAX_ID_LEN,
            got: value.len(),
        });
    }
    if value == "." || value == ".." {
        return Err(IdError::Reserved);
    }
    if let Some(c) = value.chars().find(|c| *c == '/' || c.is_control()) {
        return Err(IdError::InvalidCharacter(c));
    }
    Ok(())
}

macro_rules! document_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create an ID from a string, validating it as a document ID.
            ///
            /// # Errors
            ///
            /// Returns an error if the value is empty, too long, reserved,
            /// or contains `/` or control characters.
            pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
                let value = value.into();
                validate(&value)?;
                Ok(Self(value))
            }

            /// Return the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

document_id!(
    /// A user identifier, issued by the identity provider.
    ///
    /// Coaches and athletes share the same ID space; the role lives on the
    /// user document.
    UserId
);

document_id!(
    /// A training block (program) identifier.
    BlockId
);

document_id!(
    /// A workout log identifier.
    LogId
);

impl BlockId {
    /// Generate a new random `BlockId`.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl LogId {
    /// Generate a new random `LogId`.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The identifier is empty.
    #[error("identifier is empty")]
    Empty,

    /// The identifier exceeds the maximum document ID length.
    #[error("identifier too long: max {max} bytes, got {got}")]
    TooLong {
        /// The maximum number of bytes.
        max: usize,
        /// The actual number of bytes.
        got: usize,
    },

    /// The identifier is `.` or `..`.
    #[error("identifier is reserved")]
    Reserved,

    /// The identifier contains a character that cannot appear in a document ID.
    #[error("invalid character in identifier: {0:?}")]
    InvalidCharacter(char),
}
