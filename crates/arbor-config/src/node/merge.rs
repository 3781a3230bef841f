use tracing::debug;

use super::{Node, join_path};
use crate::value::Value;

/// Result of [`Node::merge`].
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Copy of the base with the other tree's missing entries filled in.
    pub merged: Node,
    /// Paths copied over from the other tree (subtree roots, not every leaf).
    pub added: Vec<String>,
    /// Paths present in both trees that were left as in the base.
    pub skipped: Vec<String>,
}

impl Node {
    /// Fill in everything `other` has that `self` lacks.
    ///
    /// Works on a copy; neither input is modified.
    ///
    /// - Keys missing from the base are inserted and reported as added.
    /// - Keys holding nodes on both sides are merged recursively.
    /// - Any other key present on both sides keeps the base value and is
    ///   reported as skipped, including leaf/leaf and leaf/node clashes.
    #[must_use]
    pub fn merge(&self, other: &Node) -> MergeOutcome {
        let mut merged = self.clone();
        let mut added = Vec::new();
        let mut skipped = Vec::new();
        merge_into(&mut merged, other, "", &mut added, &mut skipped);

        debug!(
            added = added.len(),
            skipped = skipped.len(),
            "merged config trees"
        );

        MergeOutcome {
            merged,
            added,
            skipped,
        }
    }
}

fn merge_into(
    base: &mut Node,
    overlay: &Node,
    prefix: &str,
    added: &mut Vec<String>,
    skipped: &mut Vec<String>,
) {
    for (key, overlay_val) in overlay.iter() {
        let path = join_path(prefix, key);

        if let Some(base_val) = base.get_mut(key) {
            match (base_val, overlay_val) {
                (Value::Node(base_child), Value::Node(overlay_child)) => {
                    merge_into(base_child, overlay_child, &path, added, skipped);
                },
                _ => skipped.push(path),
            }
        } else {
            base.set(key, overlay_val.clone());
            added.push(path);
        }
    }
}
