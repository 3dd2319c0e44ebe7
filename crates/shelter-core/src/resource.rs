//! Resource identifiers
//!
//! Pets are addressed by content URIs:
//!
//! - `content://<authority>/pets` - the whole collection
//! - `content://<authority>/pets/<id>` - a single pet
//!
//! The [`Router`] classifies an identifier into a [`Resource`] and narrows
//! filters so that item operations only ever touch the addressed row.

use std::fmt;

use crate::error::{Operation, Result, ShelterError};
use crate::query::Filter;

/// Default content authority
pub const DEFAULT_AUTHORITY: &str = "com.example.android.pets";

/// Path segment of the pets table
pub const PATH_PETS: &str = "pets";

const SCHEME: &str = "content://";
const CURSOR_DIR_BASE_TYPE: &str = "vnd.android.cursor.dir";
const CURSOR_ITEM_BASE_TYPE: &str = "vnd.android.cursor.item";

/// Shape of a classified identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// All pets
    Collection,
    /// A single pet by id
    Item(i64),
}

impl Resource {
    /// Filter implied by the resource, if any
    pub fn implied_filter(self) -> Option<Filter> {
        match self {
            Resource::Collection => None,
            Resource::Item(id) => Some(Filter::by_id(id)),
        }
    }

    /// Scope a caller filter to this resource (conjunction)
    pub fn scope(self, filter: &Filter) -> Filter {
        match self.implied_filter() {
            Some(implied) => implied.and(filter),
            None => filter.clone(),
        }
    }

    /// Replace a caller filter with the one implied by this resource
    ///
    /// Collections keep the caller filter unchanged.
    pub fn narrow(self, filter: &Filter) -> Filter {
        self.implied_filter().unwrap_or_else(|| filter.clone())
    }

    /// Whether a change on `other` may affect data reachable through `self`
    pub fn overlaps(self, other: Resource) -> bool {
        match (self, other) {
            (Resource::Item(a), Resource::Item(b)) => a == b,
            _ => true,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Collection => f.write_str(PATH_PETS),
            Resource::Item(id) => write!(f, "{}/{}", PATH_PETS, id),
        }
    }
}

/// Maps content URIs under one authority to resources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Router {
    authority: String,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(DEFAULT_AUTHORITY)
    }
}

impl Router {
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
        }
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Classify an identifier for the given operation
    ///
    /// Anything outside `<authority>/pets[/<id>]` is an
    /// [`ShelterError::UnrecognizedResource`].
    pub fn classify(&self, uri: &str, operation: Operation) -> Result<Resource> {
        self.match_uri(uri)
            .ok_or_else(|| ShelterError::unrecognized(uri, operation))
    }

    fn match_uri(&self, uri: &str) -> Option<Resource> {
        let rest = uri.strip_prefix(SCHEME).unwrap_or(uri);
        // query and fragment never take part in matching
        let rest = rest.split(['?', '#']).next().unwrap_or("");
        let path = rest.strip_prefix(self.authority.as_str())?;
        let path = path.strip_prefix('/')?;
        let path = path.strip_suffix('/').unwrap_or(path);

        let mut segments = path.split('/');
        if segments.next()? != PATH_PETS {
            return None;
        }
        let resource = match segments.next() {
            None => Resource::Collection,
            Some(id) => Resource::Item(parse_id(id)?),
        };
        if segments.next().is_some() {
            return None;
        }
        Some(resource)
    }

    /// MIME type advertised for an identifier
    pub fn mime_type(&self, resource: Resource) -> String {
        let base = match resource {
            Resource::Collection => CURSOR_DIR_BASE_TYPE,
            Resource::Item(_) => CURSOR_ITEM_BASE_TYPE,
        };
        format!("{}/{}/{}", base, self.authority, PATH_PETS)
    }

    /// URI of the whole collection
    pub fn collection_uri(&self) -> String {
        self.uri(Resource::Collection)
    }

    /// URI of a single pet
    pub fn item_uri(&self, id: i64) -> String {
        self.uri(Resource::Item(id))
    }

    pub fn uri(&self, resource: Resource) -> String {
        format!("{}{}/{}", SCHEME, self.authority, resource)
    }
}

/// Digits only, like a `#` wildcard in a URI pattern
fn parse_id(segment: &str) -> Option<i64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn classify(uri: &str) -> Option<Resource> {
        Router::default().classify(uri, Operation::Query).ok()
    }

    #[test]
    fn test_classify_collection() {
        assert_eq!(
            classify("content://com.example.android.pets/pets"),
            Some(Resource::Collection)
        );
        assert_eq!(
            classify("content://com.example.android.pets/pets/"),
            Some(Resource::Collection)
        );
        assert_eq!(
            classify("com.example.android.pets/pets"),
            Some(Resource::Collection)
        );
    }

    #[test]
    fn test_classify_item() {
        assert_eq!(
            classify("content://com.example.android.pets/pets/42"),
            Some(Resource::Item(42))
        );
        assert_eq!(
            classify("content://com.example.android.pets/pets/0?x=1"),
            Some(Resource::Item(0))
        );
    }

    #[test]
    fn test_classify_rejects_unknown() {
        for uri in [
            "content://com.example.android.pets/cats",
            "content://com.example.android.pets/pets/abc",
            "content://com.example.android.pets/pets/-1",
            "content://com.example.android.pets/pets/1/2",
            "content://com.example.android.pets/pets/99999999999999999999",
            "content://com.example.android.pets",
            "content://com.example.android.petsx/pets",
            "content://other.authority/pets",
            "",
        ] {
            assert_eq!(classify(uri), None, "{} should not match", uri);
        }
    }

    #[test]
    fn test_classify_error_kind() {
        let err = Router::default()
            .classify("content://nope/pets", Operation::Delete)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnrecognizedResource);
        assert!(err.to_string().contains("delete"));
    }

    #[test]
    fn test_custom_authority() {
        let router = Router::new("org.shelter.test");
        assert_eq!(
            router.classify("content://org.shelter.test/pets/3", Operation::Query).unwrap(),
            Resource::Item(3)
        );
        assert!(router
            .classify("content://com.example.android.pets/pets", Operation::Query)
            .is_err());
    }

    #[test]
    fn test_mime_types() {
        let router = Router::default();
        assert_eq!(
            router.mime_type(Resource::Collection),
            "vnd.android.cursor.dir/com.example.android.pets/pets"
        );
        assert_eq!(
            router.mime_type(Resource::Item(1)),
            "vnd.android.cursor.item/com.example.android.pets/pets"
        );
    }

    #[test]
    fn test_uris_round_trip() {
        let router = Router::default();
        assert_eq!(
            router.collection_uri(),
            "content://com.example.android.pets/pets"
        );
        let uri = router.item_uri(17);
        assert_eq!(uri, "content://com.example.android.pets/pets/17");
        assert_eq!(
            router.classify(&uri, Operation::Query).unwrap(),
            Resource::Item(17)
        );
    }

    #[test]
    fn test_filter_scoping() {
        let caller = Filter::new().eq(crate::models::Column::Name, "Toto");

        assert_eq!(Resource::Collection.scope(&caller), caller);
        assert_eq!(Resource::Collection.narrow(&caller), caller);

        let scoped = Resource::Item(5).scope(&caller);
        assert_eq!(scoped, Filter::by_id(5).and(&caller));

        assert_eq!(Resource::Item(5).narrow(&caller), Filter::by_id(5));
    }

    #[test]
    fn test_overlaps() {
        assert!(Resource::Collection.overlaps(Resource::Item(1)));
        assert!(Resource::Item(1).overlaps(Resource::Collection));
        assert!(Resource::Item(1).overlaps(Resource::Item(1)));
        assert!(!Resource::Item(1).overlaps(Resource::Item(2)));
    }
}
