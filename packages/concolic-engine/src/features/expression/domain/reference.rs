//! Symbolic object identity
//!
//! References are kept apart from values: the value behind a reference lives
//! in the symbolic heap keyed by `(class, field, ObjectId)`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Concrete object identity as reported by instrumentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reference {
    Null,
    NonNull { id: ObjectId, class: String },
}

impl Reference {
    pub fn non_null(id: ObjectId, class: impl Into<String>) -> Self {
        Self::NonNull {
            id,
            class: class.into(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn id(&self) -> Option<ObjectId> {
        match self {
            Self::Null => None,
            Self::NonNull { id, .. } => Some(*id),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::NonNull { id, class } => write!(f, "{}{}", class, id),
        }
    }
}
