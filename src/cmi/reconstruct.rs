//! Rebuild nested CMI arrays from flat element paths.

use serde::{Deserialize, Serialize};

use crate::logging::{trace, warn};

use super::path::{PathMatch, cmp_matches, match_path};
use super::schema::SchemaVersion;
use super::tree::{ElementLeaf, ElementObject, ElementTree};

/// Errors raised while reconstructing an element tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconstructError {
    #[error("element path '{path}' has no index below '{root}'")]
    MalformedElementPath { path: String, root: String },
}

/// Options controlling reconstruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructOptions {
    /// Index notation of the package's data model.
    pub schema: SchemaVersion,
    /// Reject paths below the root that carry no index instead of keeping
    /// them verbatim in [`ElementTree::unindexed`].
    pub strict: bool,
}

impl ReconstructOptions {
    pub fn new(schema: SchemaVersion) -> Self {
        Self {
            schema,
            strict: false,
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Rebuild the array structure below `root` from `(path, value)` entries.
///
/// Entries outside `root` are ignored. Each new top-level index pre-declares
/// `children` as empty objects with a `_children` descriptor.
///
/// # Example
///
/// ```
/// use scorm_track::cmi::{reconstruct, ReconstructOptions, SchemaVersion};
///
/// let entries = [
///     ("cmi.interactions.10.id", "q11"),
///     ("cmi.interactions.2.id", "q3"),
///     ("cmi.core.lesson_status", "completed"),
/// ];
/// let tree = reconstruct(
///     entries,
///     "cmi.interactions",
///     &["objectives", "correct_responses"],
///     ReconstructOptions::new(SchemaVersion::Scorm2004),
/// )?;
///
/// assert_eq!(tree.count(), 2);
/// assert_eq!(tree.items().first().map(|item| item.index), Some(2));
/// # Ok::<(), scorm_track::cmi::ReconstructError>(())
/// ```
pub fn reconstruct<'a, I>(
    entries: I,
    root: &str,
    children: &[&str],
    options: ReconstructOptions,
) -> Result<ElementTree, ReconstructError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut selected: Vec<(PathMatch, &str, &str)> = entries
        .into_iter()
        .filter_map(|(path, value)| match match_path(path, root, options.schema) {
            PathMatch::Outside => None,
            matched => Some((matched, path, value)),
        })
        .collect();

    // Stable, so equal keys keep their input order and later writes win.
    selected.sort_by(|a, b| cmp_matches(&a.0, &b.0));
    trace!(root = root, entries = selected.len(), "reconstructing element tree");

    let mut tree = ElementTree::new(root);
    let mut current: Option<u32> = None;
    let mut current_sub: Option<String> = None;
    let mut current_sub_index: Option<u32> = None;

    for (matched, path, value) in selected {
        let indexed = match matched {
            PathMatch::Indexed(indexed) => indexed,
            PathMatch::Unindexed if options.strict => {
                return Err(ReconstructError::MalformedElementPath {
                    path: path.to_string(),
                    root: root.to_string(),
                });
            }
            PathMatch::Unindexed => {
                warn!(path = path, root = root, "element path has no index, kept verbatim");
                tree.unindexed.insert(path.to_string(), value.to_string());
                continue;
            }
            PathMatch::Outside => continue,
        };

        if current != Some(indexed.index) {
            current = Some(indexed.index);
            current_sub = None;
            current_sub_index = None;
            tree.items.push(ElementObject::new(indexed.index, children));
        }
        let Some(object) = tree.items.last_mut() else {
            continue;
        };

        let Some(sub) = indexed.sub else {
            object.values.insert(indexed.key, value.to_string());
            continue;
        };

        if current_sub.as_deref() != Some(sub.name.as_str()) {
            current_sub = Some(sub.name.clone());
            current_sub_index = None;
        }
        let collection = object.collections.entry(sub.name).or_default();
        if current_sub_index != Some(sub.index) {
            current_sub_index = Some(sub.index);
            collection.items.push(ElementLeaf::new(sub.index));
        }
        if let Some(leaf) = collection.items.last_mut() {
            leaf.values.insert(indexed.key, value.to_string());
        }
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ROOT: &str = "cmi.interactions";
    const CHILDREN: &[&str] = &["objectives", "correct_responses"];

    fn options() -> ReconstructOptions {
        ReconstructOptions::new(SchemaVersion::Scorm2004)
    }

    #[test]
    fn test_empty_input() {
        let tree = reconstruct(
            [("cmi.core.lesson_status", "completed")],
            ROOT,
            CHILDREN,
            options(),
        )
        .unwrap();
        assert_eq!(tree.count(), 0);
        assert_eq!(tree.to_json(), json!({ "_count": 0 }));
    }

    #[test]
    fn test_single_flat_object() {
        let tree = reconstruct(
            [
                ("cmi.interactions.0.id", "q1"),
                ("cmi.interactions.0.result", "correct"),
            ],
            ROOT,
            &[],
            options(),
        )
        .unwrap();

        assert_eq!(tree.count(), 1);
        assert_eq!(
            tree.to_json(),
            json!({
                "0": { "id": "q1", "result": "correct" },
                "_count": 1
            })
        );
    }

    #[test]
    fn test_numeric_index_order() {
        let tree = reconstruct(
            [
                ("cmi.interactions.10.id", "q11"),
                ("cmi.interactions.2.id", "q3"),
                ("cmi.interactions.1.id", "q2"),
            ],
            ROOT,
            CHILDREN,
            options(),
        )
        .unwrap();

        let indices: Vec<u32> = tree.items().iter().map(|item| item.index).collect();
        assert_eq!(indices, vec![1, 2, 10]);
        assert_eq!(tree.count(), 3);
    }

    #[test]
    fn test_second_level_counts() {
        let tree = reconstruct(
            [
                ("cmi.interactions.0.correct_responses.1.pattern", "b"),
                ("cmi.interactions.0.id", "q1"),
                ("cmi.interactions.0.correct_responses.0.pattern", "a"),
                ("cmi.interactions.1.objectives.0.id", "obj"),
                ("cmi.interactions.0.objectives.0.id", "o1"),
            ],
            ROOT,
            CHILDREN,
            options(),
        )
        .unwrap();

        assert_eq!(tree.count(), 2);
        let first = tree.item(0).unwrap();
        assert_eq!(first.value("id"), Some("q1"));

        let responses = first.collection("correct_responses").unwrap();
        assert_eq!(responses.count(), 2);
        assert_eq!(responses.item(0).unwrap().value("pattern"), Some("a"));
        assert_eq!(responses.item(1).unwrap().value("pattern"), Some("b"));
        assert_eq!(
            responses.children_ref.as_deref(),
            Some("correct_responses_children")
        );
        assert_eq!(first.collection("objectives").unwrap().count(), 1);

        let second = tree.item(1).unwrap();
        assert_eq!(second.collection("correct_responses").unwrap().count(), 0);
        assert_eq!(second.collection("objectives").unwrap().count(), 1);
    }

    #[test]
    fn test_json_shape() {
        let tree = reconstruct(
            [
                ("cmi.interactions.0.id", "q1"),
                ("cmi.interactions.0.correct_responses.0.pattern", "a"),
            ],
            ROOT,
            CHILDREN,
            options(),
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!({
                "0": {
                    "id": "q1",
                    "objectives": { "_children": "objectives_children" },
                    "correct_responses": {
                        "_children": "correct_responses_children",
                        "0": { "pattern": "a" },
                        "_count": 1
                    }
                },
                "_count": 1
            })
        );
    }

    #[test]
    fn test_schema_notation_inputs() {
        let tree = reconstruct(
            [
                ("cmi.interactions_1.id", "q2"),
                ("cmi.interactions_0.correct_responses_0.pattern", "a"),
            ],
            ROOT,
            &[],
            ReconstructOptions::new(SchemaVersion::Scorm12),
        )
        .unwrap();
        assert_eq!(tree.count(), 2);
        assert_eq!(
            tree.item(0)
                .unwrap()
                .collection("correct_responses")
                .unwrap()
                .count(),
            1
        );
    }

    #[test]
    fn test_malformed_path_kept_verbatim() {
        let tree = reconstruct(
            [
                ("cmi.interactions._count", "3"),
                ("cmi.interactions.0.id", "q1"),
            ],
            ROOT,
            &[],
            options(),
        )
        .unwrap();

        assert_eq!(tree.count(), 1);
        assert_eq!(
            tree.unindexed().get("cmi.interactions._count").map(String::as_str),
            Some("3")
        );
    }

    #[test]
    fn test_malformed_paths_leave_indexed_json_intact() {
        let tree = reconstruct(
            [
                ("cmi.interactions.7", "loose"),
                ("cmi.interactions.7.id", "q7"),
                ("cmi.interactions._count", "3"),
            ],
            ROOT,
            &[],
            options(),
        )
        .unwrap();

        assert_eq!(
            tree.to_json(),
            json!({
                "7": { "id": "q7" },
                "_unindexed": { "7": "loose", "_count": "3" },
                "_count": 1
            })
        );
    }

    #[test]
    fn test_flat_value_does_not_replace_declared_child() {
        let tree = reconstruct(
            [
                ("cmi.interactions.0.objectives", "x"),
                ("cmi.interactions.0.objectives.0.id", "o"),
            ],
            ROOT,
            &["objectives"],
            options(),
        )
        .unwrap();

        assert_eq!(
            tree.to_json(),
            json!({
                "0": {
                    "objectives": {
                        "_children": "objectives_children",
                        "_value": "x",
                        "0": { "id": "o" },
                        "_count": 1
                    }
                },
                "_count": 1
            })
        );
    }

    #[test]
    fn test_malformed_path_rejected_when_strict() {
        let err = reconstruct(
            [("cmi.interactions.x.id", "q1")],
            ROOT,
            &[],
            options().strict(true),
        )
        .unwrap_err();

        assert_eq!(
            err,
            ReconstructError::MalformedElementPath {
                path: "cmi.interactions.x.id".to_string(),
                root: ROOT.to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_path_last_wins() {
        let tree = reconstruct(
            [
                ("cmi.interactions.0.result", "wrong"),
                ("cmi.interactions.0.result", "correct"),
            ],
            ROOT,
            &[],
            options(),
        )
        .unwrap();
        assert_eq!(tree.item(0).unwrap().value("result"), Some("correct"));
    }
}
