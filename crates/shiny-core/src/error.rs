use crate::entity::{DbId, EntityId, EntityKind};

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur when building or changing an area.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity with the same id already exists in its owner.
    #[error("duplicate {kind} {id} in area \"{area}\"")]
    DuplicateId {
        /// The area being built.
        area: String,
        /// The kind of the duplicated entity.
        kind: EntityKind,
        /// The duplicated id.
        id: EntityId,
    },

    /// A reference by id could not be resolved to an existing entity.
    #[error("invalid reference: {kind} {id} not found in area \"{area}\"")]
    InvalidReference {
        /// The area the reference was resolved against.
        area: String,
        /// The expected entity kind.
        kind: EntityKind,
        /// The unresolved id.
        id: EntityId,
    },

    /// No area with this name is registered.
    #[error("area not found: \"{0}\"")]
    AreaNotFound(String),

    /// An area with the same name is already registered.
    #[error("area already exists: \"{0}\"")]
    DuplicateArea(String),

    /// A generic validation error with a descriptive message.
    #[error("validation error: {0}")]
    Validation(String),

    /// An entity could not be turned into a storage row.
    #[error("cannot encode {kind} row")]
    Encode {
        /// The kind of the entity.
        kind: EntityKind,
        /// The underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// The storage layer rejected an operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors reported by a [`Store`](crate::store::Store).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A row could not be inserted.
    #[error("cannot insert into {table}: {reason}")]
    Rejected {
        /// The target table.
        table: &'static str,
        /// Why the insert was refused.
        reason: String,
    },

    /// A row could not be deleted.
    #[error("cannot delete {dbid} from {table}: {reason}")]
    DeleteFailed {
        /// The target table.
        table: &'static str,
        /// The row id.
        dbid: DbId,
        /// Why the delete failed.
        reason: String,
    },
}
