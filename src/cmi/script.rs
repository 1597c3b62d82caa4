//! JavaScript rendering of element trees for SCORM client runtimes.
//!
//! The runtime API expects the data model as object assignments, with array
//! indices written in the schema's notation:
//!
//! ```text
//! cmi.interactions.N0 = new Object();
//! cmi.interactions.N0.objectives = new Object();
//! cmi.interactions.N0.objectives._children = objectives_children;
//! cmi.interactions.N0.id = "q1";
//! cmi.interactions._count = 1;
//! ```

use std::fmt::Write as _;

use serde_json::Value;

use super::path::{Segment, segments};
use super::schema::SchemaVersion;
use super::tree::{ElementTree, SCALAR_KEY};

/// Renders an [`ElementTree`] as script statements.
#[derive(Debug, Clone, Copy)]
pub struct ScriptWriter {
    schema: SchemaVersion,
    indent: &'static str,
}

impl ScriptWriter {
    pub fn new(schema: SchemaVersion) -> Self {
        Self { schema, indent: "" }
    }

    /// Prefix every statement with `indent`.
    pub fn with_indent(mut self, indent: &'static str) -> Self {
        self.indent = indent;
        self
    }

    /// Render `tree`. An empty tree renders as an empty string.
    ///
    /// Unindexed paths are written first so rebuilt objects replace them,
    /// never the reverse. Objects are created before any scalar below them.
    pub fn render(&self, tree: &ElementTree) -> String {
        let mut out = String::new();
        let root = tree.root();

        for (path, value) in tree.unindexed() {
            self.line(&mut out, &self.rewrite(path), &quote(value));
        }

        for item in tree.items() {
            let base = self.schema.indexed(root, item.index);
            self.line(&mut out, &base, "new Object()");

            for (name, collection) in &item.collections {
                if collection.children_ref.is_none() && collection.items.is_empty() {
                    continue;
                }
                let child = format!("{base}.{name}");
                self.line(&mut out, &child, "new Object()");
                if let Some(children) = &collection.children_ref {
                    self.line(&mut out, &format!("{child}._children"), children);
                }
            }
            for (key, value) in &item.values {
                let target = if item.collections.contains_key(key) {
                    format!("{base}.{key}.{SCALAR_KEY}")
                } else {
                    format!("{base}.{key}")
                };
                self.line(&mut out, &target, &quote(value));
            }

            for (name, collection) in &item.collections {
                if collection.items.is_empty() {
                    continue;
                }
                let array = format!("{base}.{name}");
                for leaf in &collection.items {
                    let leaf_base = self.schema.indexed(&array, leaf.index);
                    self.line(&mut out, &leaf_base, "new Object()");
                    for (key, value) in &leaf.values {
                        self.line(&mut out, &format!("{leaf_base}.{key}"), &quote(value));
                    }
                }
                self.line(
                    &mut out,
                    &format!("{array}._count"),
                    &collection.items.len().to_string(),
                );
            }
        }

        if tree.count() > 0 {
            self.line(&mut out, &format!("{root}._count"), &tree.count().to_string());
        }
        out
    }

    /// Rewrite plain dotted indices into the schema's notation.
    pub fn rewrite(&self, path: &str) -> String {
        let mut out = String::new();
        for segment in segments(path, self.schema) {
            match segment {
                Segment::Name(name) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(name);
                }
                Segment::Index(index) => {
                    out = self.schema.indexed(&out, index);
                }
            }
        }
        out
    }

    fn line(&self, out: &mut String, target: &str, value: &str) {
        let _ = writeln!(out, "{}{} = {};", self.indent, target, value);
    }
}

fn quote(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

impl ElementTree {
    /// Render this tree as script statements in `schema` notation.
    pub fn to_script(&self, schema: SchemaVersion) -> String {
        ScriptWriter::new(schema).render(self)
    }
}
