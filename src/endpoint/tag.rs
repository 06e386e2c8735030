//! Cache Tags
//!
//! Closed set of labels grouping cache entries by the resource they hold.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};

// == Tag ==
/// Label shared by every cache entry holding a given resource.
///
/// Matching is many-to-many: an entry may provide several tags and a tag
/// may be provided by any number of entries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    /// Any student data: lists, pages and single records
    Etudiants,
    /// One student record, by id
    Etudiant(String),
}

/// Set of tags provided or invalidated by an endpoint.
pub type TagSet = BTreeSet<Tag>;

impl Tag {
    /// Tag for a single student record.
    pub fn etudiant(id: impl Into<String>) -> Self {
        Tag::Etudiant(id.into())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Etudiants => f.write_str("etudiants"),
            Tag::Etudiant(id) => write!(f, "etudiant:{}", id),
        }
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Returns true if the two sets share at least one tag.
pub fn intersects(provided: &TagSet, wanted: &TagSet) -> bool {
    // iterate the smaller set
    let (small, large) = if provided.len() <= wanted.len() {
        (provided, wanted)
    } else {
        (wanted, provided)
    };
    small.iter().any(|tag| large.contains(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_display() {
        assert_eq!(Tag::Etudiants.to_string(), "etudiants");
        assert_eq!(Tag::etudiant("42").to_string(), "etudiant:42");
    }

    #[test]
    fn test_tag_serializes_as_string() {
        let json = serde_json::to_string(&Tag::etudiant("7")).unwrap();
        assert_eq!(json, r#""etudiant:7""#);
    }

    #[test]
    fn test_intersects() {
        let provided: TagSet = [Tag::Etudiants, Tag::etudiant("1")].into_iter().collect();
        let list_only: TagSet = [Tag::Etudiants].into_iter().collect();
        let other_record: TagSet = [Tag::etudiant("2")].into_iter().collect();

        assert!(intersects(&provided, &list_only));
        assert!(!intersects(&provided, &other_record));
        assert!(!intersects(&provided, &TagSet::new()));
    }
}
