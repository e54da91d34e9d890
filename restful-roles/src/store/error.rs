//! Store error types
//!
//! Errors reported by backing collaborators through the capability traits.
//! Handlers inspect only the [`StoreErrorKind`]: `NotFound` and `Conflict`
//! have dedicated HTTP mappings, everything else is a generic failure.
//!
//! # Example
//!
//! ```rust
//! use restful_roles::store::{StoreError, StoreErrorKind};
//!
//! let error = StoreError::not_found("Chart", "234");
//! assert!(matches!(error.kind, StoreErrorKind::NotFound));
//! assert_eq!(error.entity_id.as_deref(), Some("234"));
//! ```

use std::fmt;

/// Capability call being made when the store error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// Retrieving a single instance
    Retrieve,
    /// Retrieving the collection index
    Index,
    /// Inserting a new instance under a fresh identifier
    Insert,
    /// Creating or replacing an instance at a known identifier
    Upsert,
    /// Deleting an instance
    Delete,
    /// Turning a resource into its wire representation
    Serialise,
    /// Turning a request body into a resource
    Deserialise,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retrieve => write!(f, "retrieve"),
            Self::Index => write!(f, "index"),
            Self::Insert => write!(f, "insert"),
            Self::Upsert => write!(f, "upsert"),
            Self::Delete => write!(f, "delete"),
            Self::Serialise => write!(f, "serialise"),
            Self::Deserialise => write!(f, "deserialise"),
        }
    }
}

/// Category of store error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    /// No resource exists with the requested identifier
    NotFound,
    /// Write contention, e.g. an optimistic-concurrency violation
    Conflict,
    /// The submitted representation could not be turned into a resource
    InvalidInput,
    /// Encoding or decoding failed inside the store
    Serialization,
    /// The store is temporarily unreachable
    Unavailable,
    /// Other unclassified error
    Other,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::InvalidInput => write!(f, "invalid_input"),
            Self::Serialization => write!(f, "serialization"),
            Self::Unavailable => write!(f, "unavailable"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structured store error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    /// The capability call that failed
    pub operation: StoreOperation,
    /// The category of error
    pub kind: StoreErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The type of resource involved (e.g., "Chart")
    pub entity_type: Option<String>,
    /// The identifier of the resource involved
    pub entity_id: Option<String>,
}

/// Result type for capability calls
pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Create a new store error
    pub fn new(operation: StoreOperation, kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    /// Create a "not found" error for a retrieval
    ///
    /// # Example
    ///
    /// ```rust
    /// use restful_roles::store::{StoreError, StoreOperation};
    ///
    /// let error = StoreError::not_found("Chart", "666");
    /// assert_eq!(error.operation, StoreOperation::Retrieve);
    /// assert_eq!(error.message, "There was no Chart with id=666");
    /// ```
    pub fn not_found(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        let entity_type = entity_type.into();
        let entity_id = entity_id.into();
        Self {
            operation: StoreOperation::Retrieve,
            kind: StoreErrorKind::NotFound,
            message: format!("There was no {} with id={}", entity_type, entity_id),
            entity_type: Some(entity_type),
            entity_id: Some(entity_id),
        }
    }

    /// Create a write-conflict error
    ///
    /// ```rust
    /// use restful_roles::store::{StoreError, StoreErrorKind, StoreOperation};
    ///
    /// let error = StoreError::conflict(StoreOperation::Upsert, "Version mismatch");
    /// assert_eq!(error.kind, StoreErrorKind::Conflict);
    /// ```
    pub fn conflict(operation: StoreOperation, message: impl Into<String>) -> Self {
        Self::new(operation, StoreErrorKind::Conflict, message)
    }

    /// Create an invalid input error, raised by deserialisers
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(StoreOperation::Deserialise, StoreErrorKind::InvalidInput, message)
    }

    /// Create a serialization error
    pub fn serialization(operation: StoreOperation, message: impl Into<String>) -> Self {
        Self::new(operation, StoreErrorKind::Serialization, message)
    }

    /// Create an unavailable error
    pub fn unavailable(operation: StoreOperation, message: impl Into<String>) -> Self {
        Self::new(operation, StoreErrorKind::Unavailable, message)
    }

    /// Create an unclassified error
    pub fn other(operation: StoreOperation, message: impl Into<String>) -> Self {
        Self::new(operation, StoreErrorKind::Other, message)
    }

    /// Add entity context to an existing error
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: StoreOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Whether the store reported that the resource does not exist
    pub fn is_not_found(&self) -> bool {
        self.kind == StoreErrorKind::NotFound
    }

    /// Whether the store reported write contention
    pub fn is_conflict(&self) -> bool {
        self.kind == StoreErrorKind::Conflict
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Store {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(entity_type), Some(entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for StoreError {}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_data() || err.is_eof() {
            Self::invalid_input(err.to_string())
        } else {
            Self::serialization(StoreOperation::Serialise, err.to_string())
        }
    }
}
