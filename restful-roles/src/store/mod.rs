//! Backing collaborators and their errors
//!
//! # Features
//!
//! - **Errors**: [`StoreError`] reported through every capability trait
//! - **In-memory store**: [`MemoryStore`] implements all roles over a
//!   concurrent map and versions each write
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use restful_roles::prelude::*;
//!
//! let store = Arc::new(MemoryStore::<String>::new("/notes").with_entity_type("note"));
//! let notes = InstanceHandler::<Versioned<String>>::over(Arc::clone(&store));
//! let collection = CollectionHandler::<CollectionIndex<String>, Versioned<String>>::over(store);
//! # let _ = (notes, collection);
//! ```

mod error;
mod memory;

pub use error::{StoreError, StoreErrorKind, StoreOperation, StoreResult};
pub use memory::{CollectionIndex, MemoryStore, Versioned};
