//! CMI data-model reconstruction.
//!
//! Learner data is tracked as flat element paths (`cmi.interactions.3.id`).
//! This module rebuilds the nested array structure those paths imply, with a
//! `_count` at every array level, and renders it as JSON or as script
//! statements for a SCORM client runtime.

mod path;
mod reconstruct;
mod schema;
mod script;
mod tree;

pub use path::{IndexedPath, PathMatch, Segment, SubIndex, element_cmp, match_path, segments};
pub use reconstruct::{ReconstructError, ReconstructOptions, reconstruct};
pub use schema::{ParseSchemaError, SchemaVersion};
pub use script::ScriptWriter;
pub use tree::{
    ElementCollection, ElementLeaf, ElementObject, ElementTree, SCALAR_KEY, UNINDEXED_KEY,
};
