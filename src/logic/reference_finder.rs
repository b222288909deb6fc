use serde_json::Value;

use crate::model::{
    ConversionMode, FieldPath, Node, PathSegment, ReferenceDescriptor, ReferenceKind,
    ReferenceOccurrence,
};

/// Find every reference in `node` that the given mode would convert.
///
/// Occurrences come out in document field order, depth first. Reference descriptors are
/// leaves: their own fields are never searched.
pub fn find_references(node: &Value, mode: ConversionMode) -> Vec<ReferenceOccurrence> {
    find_references_at(node, mode, &FieldPath::root())
}

/// Same as [`find_references`] with every path prefixed by `prefix`
pub fn find_references_at(
    node: &Value,
    mode: ConversionMode,
    prefix: &FieldPath,
) -> Vec<ReferenceOccurrence> {
    let mut path = prefix.clone();
    let mut occurrences = Vec::new();
    collect(node, mode, &mut path, &mut occurrences);
    occurrences
}

fn collect(
    value: &Value,
    mode: ConversionMode,
    path: &mut FieldPath,
    occurrences: &mut Vec<ReferenceOccurrence>,
) {
    match Node::classify(value) {
        Node::Reference(descriptor) => {
            // The document itself is never a reference
            if path.is_root() {
                return;
            }
            if let Some(occurrence) = matching_occurrence(descriptor, mode, path) {
                occurrences.push(occurrence);
            }
        }
        Node::Object(map) => {
            for (key, child) in map {
                path.push(PathSegment::Key(key.clone()));
                collect(child, mode, path, occurrences);
                path.pop();
            }
        }
        Node::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                path.push(PathSegment::Index(index));
                collect(item, mode, path, occurrences);
                path.pop();
            }
        }
        Node::Scalar(_) | Node::Null => {}
    }
}

fn matching_occurrence(
    descriptor: ReferenceDescriptor<'_>,
    mode: ConversionMode,
    path: &FieldPath,
) -> Option<ReferenceOccurrence> {
    let kind = match (mode, descriptor.weak) {
        (ConversionMode::StrongToWeak, false) => ReferenceKind::Strong,
        (ConversionMode::WeakToStrong, true) => ReferenceKind::Weak,
        _ => return None,
    };

    Some(ReferenceOccurrence {
        path: path.clone(),
        kind,
        target_id: descriptor.target_id.to_string(),
        is_weak: descriptor.weak,
    })
}
