//! Reconstructed CMI element trees.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// JSON key holding paths below the root that carried no index.
pub const UNINDEXED_KEY: &str = "_unindexed";

/// JSON key holding a scalar written at the same path as an object.
pub const SCALAR_KEY: &str = "_value";

/// Nested structure rebuilt from flat indexed element paths below one root.
///
/// Serializes to a JSON object that mirrors the client data model: index keys
/// map to per-index objects and every array level carries a `_count` sibling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementTree {
    root: String,
    pub(crate) items: Vec<ElementObject>,
    pub(crate) unindexed: BTreeMap<String, String>,
}

/// One top-level array entry, e.g. `cmi.interactions.3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementObject {
    pub index: u32,
    /// Scalar values keyed by the dotted path after the index.
    pub values: BTreeMap<String, String>,
    /// Declared children and second-level arrays keyed by name.
    pub collections: BTreeMap<String, ElementCollection>,
}

/// A child of a top-level entry: either a declared child object, a
/// second-level array, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementCollection {
    /// Name of the `_children` descriptor for declared children.
    pub children_ref: Option<String>,
    pub items: Vec<ElementLeaf>,
}

/// One second-level array entry, e.g. `correct_responses.1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementLeaf {
    pub index: u32,
    pub values: BTreeMap<String, String>,
}

impl ElementTree {
    pub(crate) fn new(root: &str) -> Self {
        Self {
            root: root.to_string(),
            items: Vec::new(),
            unindexed: BTreeMap::new(),
        }
    }

    /// Root element name the tree was built for.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Top-level entries in index order.
    pub fn items(&self) -> &[ElementObject] {
        &self.items
    }

    /// Number of distinct top-level indices (the root's `_count`).
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.unindexed.is_empty()
    }

    /// Entry for a top-level index.
    pub fn item(&self, index: u32) -> Option<&ElementObject> {
        self.items.iter().find(|item| item.index == index)
    }

    /// Paths below the root that carried no usable index, with their values.
    pub fn unindexed(&self) -> &BTreeMap<String, String> {
        &self.unindexed
    }

    /// Render as a JSON object with `_count` siblings at every array level.
    ///
    /// Unindexed paths go under [`UNINDEXED_KEY`], keyed relative to the root,
    /// so they never replace an indexed entry or the `_count`.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for item in &self.items {
            map.insert(item.index.to_string(), item.to_json());
        }
        if !self.unindexed.is_empty() {
            let loose: Map<String, Value> = self
                .unindexed
                .iter()
                .map(|(path, value)| {
                    let key = path
                        .strip_prefix(self.root.as_str())
                        .and_then(|rest| rest.strip_prefix('.'))
                        .filter(|rest| !rest.is_empty())
                        .unwrap_or(path);
                    (key.to_string(), Value::String(value.clone()))
                })
                .collect();
            map.insert(UNINDEXED_KEY.to_string(), Value::Object(loose));
        }
        map.insert("_count".to_string(), Value::from(self.items.len()));
        Value::Object(map)
    }
}

impl Serialize for ElementTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl ElementObject {
    pub(crate) fn new(index: u32, children: &[&str]) -> Self {
        let collections = children
            .iter()
            .map(|child| {
                (
                    (*child).to_string(),
                    ElementCollection {
                        children_ref: Some(format!("{child}_children")),
                        items: Vec::new(),
                    },
                )
            })
            .collect();
        Self {
            index,
            values: BTreeMap::new(),
            collections,
        }
    }

    /// Scalar value at a dotted key, e.g. `id` or `score.raw`.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn collection(&self, name: &str) -> Option<&ElementCollection> {
        self.collections.get(name)
    }

    fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (name, collection) in &self.collections {
            map.insert(name.clone(), collection.to_json());
        }
        insert_values(&mut map, &self.values);
        Value::Object(map)
    }
}

impl ElementCollection {
    /// Number of distinct second-level indices (this level's `_count`).
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn item(&self, index: u32) -> Option<&ElementLeaf> {
        self.items.iter().find(|item| item.index == index)
    }

    fn to_json(&self) -> Value {
        let mut map = Map::new();
        if let Some(children) = &self.children_ref {
            map.insert("_children".to_string(), Value::String(children.clone()));
        }
        for leaf in &self.items {
            let mut leaf_map = Map::new();
            insert_values(&mut leaf_map, &leaf.values);
            map.insert(leaf.index.to_string(), Value::Object(leaf_map));
        }
        if !self.items.is_empty() {
            map.insert("_count".to_string(), Value::from(self.items.len()));
        }
        Value::Object(map)
    }
}

impl ElementLeaf {
    pub(crate) fn new(index: u32) -> Self {
        Self {
            index,
            values: BTreeMap::new(),
        }
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Insert dotted keys as nested objects, merging into objects already present.
///
/// A scalar and an object at the same key never replace each other: the
/// scalar is kept inside the object under [`SCALAR_KEY`].
fn insert_values(map: &mut Map<String, Value>, values: &BTreeMap<String, String>) {
    for (key, value) in values {
        let mut target = &mut *map;
        let mut parts = key.split('.').peekable();
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                if let Some(Value::Object(existing)) = target.get_mut(part) {
                    existing.insert(SCALAR_KEY.to_string(), Value::String(value.clone()));
                } else {
                    target.insert(part.to_string(), Value::String(value.clone()));
                }
                break;
            }
            let entry = target
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                let scalar = entry.take();
                let mut nested = Map::new();
                nested.insert(SCALAR_KEY.to_string(), scalar);
                *entry = Value::Object(nested);
            }
            let Value::Object(next) = entry else {
                break;
            };
            target = next;
        }
    }
}
