use larder_types::EntityKind;

/// Errors from entity store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A create or rename would give two records of one kind the same name.
    #[error("{kind} named {name:?} already exists")]
    DuplicateName { kind: EntityKind, name: String },

    /// The targeted record does not exist (possibly deleted concurrently).
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// A line position lies outside a recipe's ingredient list.
    #[error("position {index} is out of range for a list of {len} lines")]
    PositionOutOfRange { index: usize, len: usize },

    /// An invariant of the data model does not hold. Indicates a bug in the
    /// store, never a user error.
    #[error("integrity violation: {0}")]
    IntegrityViolation(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The journal could not be parsed as a catalog history.
    #[error("corrupt journal at offset {offset}: {reason}")]
    CorruptJournal { offset: u64, reason: String },

    /// I/O error from the journal file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A journal lock was poisoned by a panicking writer.
    #[error("journal lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    pub(crate) fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn duplicate(kind: EntityKind, name: &str) -> Self {
        Self::DuplicateName {
            kind,
            name: name.to_string(),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
