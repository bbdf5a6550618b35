use larder_store::StoreError;
use larder_types::EntityKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Input failed a field rule before the store was touched.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("{kind} named {name:?} already exists")]
    DuplicateName { kind: EntityKind, name: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// A relational invariant broke. Always a bug in the catalog.
    #[error("integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("journal error: {0}")]
    Journal(StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("catalog lock poisoned")]
    LockPoisoned,
}

impl CatalogError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Whether the caller can fix the request and try again.
    ///
    /// Integrity, journal and lock failures are not recoverable: the catalog
    /// itself is in trouble.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::DuplicateName { .. } | Self::NotFound { .. } | Self::Config(_)
        )
    }
}

impl From<StoreError> for CatalogError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateName { kind, name } => Self::DuplicateName { kind, name },
            StoreError::NotFound { kind, id } => Self::NotFound { kind, id },
            StoreError::PositionOutOfRange { index, len } => Self::validation(
                "position",
                format!("{index} is out of range for a list of {len} lines"),
            ),
            StoreError::IntegrityViolation(msg) => Self::IntegrityViolation(msg),
            StoreError::LockPoisoned => Self::LockPoisoned,
            other => Self::Journal(other),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_catalog_kinds() {
        let e: CatalogError = StoreError::DuplicateName {
            kind: EntityKind::Category,
            name: "Italian".into(),
        }
        .into();
        assert!(matches!(e, CatalogError::DuplicateName { .. }));
        assert!(e.is_recoverable());

        let e: CatalogError = StoreError::PositionOutOfRange { index: 4, len: 2 }.into();
        assert!(matches!(e, CatalogError::Validation { field: "position", .. }));

        let e: CatalogError = StoreError::CorruptJournal {
            offset: 8,
            reason: "bad crc".into(),
        }
        .into();
        assert!(matches!(e, CatalogError::Journal(_)));
        assert!(!e.is_recoverable());
    }

    #[test]
    fn integrity_violation_is_fatal() {
        let e: CatalogError = StoreError::IntegrityViolation("dangling line".into()).into();
        assert!(!e.is_recoverable());
        assert_eq!(e.to_string(), "integrity violation: dangling line");
    }

    #[test]
    fn validation_message() {
        let e = CatalogError::validation("serving", "must be between 1 and 100");
        assert_eq!(e.to_string(), "invalid serving: must be between 1 and 100");
    }
}
