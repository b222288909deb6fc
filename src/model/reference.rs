use serde::{Deserialize, Serialize};

use crate::model::{Document, FieldPath, ReferenceKind};

/// A single reference found inside a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceOccurrence {
    pub path: FieldPath,
    pub kind: ReferenceKind,
    pub target_id: String,
    pub is_weak: bool,
}

/// A scanned document together with the references that will be converted in it.
/// Groups are only built for documents with at least one occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawReferenceGroup")]
pub struct ReferenceGroup {
    pub document: Document,
    pub occurrences: Vec<ReferenceOccurrence>,
}

#[derive(Deserialize)]
struct RawReferenceGroup {
    document: Document,
    occurrences: Vec<ReferenceOccurrence>,
}

impl TryFrom<RawReferenceGroup> for ReferenceGroup {
    type Error = String;

    fn try_from(raw: RawReferenceGroup) -> Result<Self, Self::Error> {
        ReferenceGroup::new(raw.document, raw.occurrences)
            .ok_or_else(|| "a reference group needs at least one occurrence".to_string())
    }
}

impl ReferenceGroup {
    /// Returns `None` when there is nothing to convert
    pub fn new(document: Document, occurrences: Vec<ReferenceOccurrence>) -> Option<Self> {
        if occurrences.is_empty() {
            None
        } else {
            Some(Self {
                document,
                occurrences,
            })
        }
    }

    pub fn document_id(&self) -> &str {
        self.document.id().unwrap_or_default()
    }
}

/// Total number of occurrences across all groups
pub fn total_references(groups: &[ReferenceGroup]) -> usize {
    groups.iter().map(|group| group.occurrences.len()).sum()
}
