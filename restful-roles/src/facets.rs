//! Cache facets a resource type may carry
//!
//! A resource declares, once at its definition, which optional caching
//! facets it has by setting [`CacheFacets::FACETS`]. The caching decorator
//! only consults the accessors the declaration enables, so the branch for an
//! absent facet is resolved at compile time for every monomorphised handler.
//!
//! ```rust
//! use chrono::{DateTime, Utc};
//! use restful_roles::facets::{CacheFacets, FacetSet};
//!
//! struct Report {
//!     revision: String,
//!     updated_at: DateTime<Utc>,
//! }
//!
//! impl CacheFacets for Report {
//!     const FACETS: FacetSet = FacetSet::BOTH;
//!
//!     fn etag(&self) -> Option<&str> {
//!         Some(&self.revision)
//!     }
//!
//!     fn last_modified(&self) -> Option<DateTime<Utc>> {
//!         Some(self.updated_at)
//!     }
//! }
//!
//! assert!(Report::FACETS.has_etag());
//! assert!(Report::FACETS.has_last_modified());
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Static declaration of the facets a resource type exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FacetSet {
    etag: bool,
    last_modified: bool,
}

impl FacetSet {
    /// No caching facets; conditional requests never short-circuit
    pub const NONE: Self = Self {
        etag: false,
        last_modified: false,
    };

    /// Opaque entity tag only
    pub const ETAG: Self = Self {
        etag: true,
        last_modified: false,
    };

    /// Last-modified timestamp only
    pub const LAST_MODIFIED: Self = Self {
        etag: false,
        last_modified: true,
    };

    /// Both an entity tag and a last-modified timestamp
    pub const BOTH: Self = Self {
        etag: true,
        last_modified: true,
    };

    /// Whether the entity tag accessor is consulted
    #[must_use]
    pub const fn has_etag(&self) -> bool {
        self.etag
    }

    /// Whether the last-modified accessor is consulted
    #[must_use]
    pub const fn has_last_modified(&self) -> bool {
        self.last_modified
    }

    /// Whether any facet is declared
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.etag && !self.last_modified
    }
}

impl Default for FacetSet {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for FacetSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.etag, self.last_modified) {
            (false, false) => write!(f, "none"),
            (true, false) => write!(f, "etag"),
            (false, true) => write!(f, "last_modified"),
            (true, true) => write!(f, "etag+last_modified"),
        }
    }
}

/// Optional caching facets of a resource or index object
///
/// Every type served by a handler implements this trait. Types without
/// facets use an empty impl and inherit [`FacetSet::NONE`].
///
/// An accessor returning `None` for a declared facet means the value is
/// absent for this particular instance, which is never an error.
pub trait CacheFacets {
    /// Facets this type carries
    const FACETS: FacetSet = FacetSet::NONE;

    /// Opaque entity tag, compared verbatim against `If-None-Match`
    fn etag(&self) -> Option<&str> {
        None
    }

    /// Timestamp of the last modification
    fn last_modified(&self) -> Option<DateTime<Utc>> {
        None
    }
}

impl<T: CacheFacets + ?Sized> CacheFacets for &T {
    const FACETS: FacetSet = T::FACETS;

    fn etag(&self) -> Option<&str> {
        (**self).etag()
    }

    fn last_modified(&self) -> Option<DateTime<Utc>> {
        (**self).last_modified()
    }
}

impl<T: CacheFacets + ?Sized> CacheFacets for Box<T> {
    const FACETS: FacetSet = T::FACETS;

    fn etag(&self) -> Option<&str> {
        (**self).etag()
    }

    fn last_modified(&self) -> Option<DateTime<Utc>> {
        (**self).last_modified()
    }
}

impl<T: CacheFacets + ?Sized> CacheFacets for Arc<T> {
    const FACETS: FacetSet = T::FACETS;

    fn etag(&self) -> Option<&str> {
        (**self).etag()
    }

    fn last_modified(&self) -> Option<DateTime<Utc>> {
        (**self).last_modified()
    }
}

impl CacheFacets for String {}

impl CacheFacets for serde_json::Value {}
