//! Element path segmentation and numeric-aware ordering.
//!
//! A CMI element path such as `cmi.interactions.10.correct_responses.2.pattern`
//! is split into name and index segments. Indices are compared as integers so
//! that `cmi.interactions.2.id` orders before `cmi.interactions.10.id`.

use std::cmp::Ordering;

use super::schema::SchemaVersion;

/// One component of an element path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Name(&'a str),
    Index(u32),
}

/// Split `path` into segments using the index notation of `schema`.
///
/// Plain digit segments are always indices. SCORM 2004 additionally accepts
/// `N<digits>` segments, SCORM 1.2 a `_<digits>` suffix fused onto a name.
pub fn segments(path: &str, schema: SchemaVersion) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    for part in path.split('.') {
        if let Some(index) = parse_index(part, schema) {
            out.push(Segment::Index(index));
            continue;
        }
        if schema == SchemaVersion::Scorm12
            && let Some((name, digits)) = part.rsplit_once('_')
            && !name.is_empty()
            && let Some(index) = parse_digits(digits)
        {
            out.push(Segment::Name(name));
            out.push(Segment::Index(index));
            continue;
        }
        out.push(Segment::Name(part));
    }
    out
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_index(part: &str, schema: SchemaVersion) -> Option<u32> {
    parse_digits(part).or_else(|| match schema {
        SchemaVersion::Scorm2004 => part.strip_prefix('N').and_then(parse_digits),
        SchemaVersion::Scorm12 => None,
    })
}

fn join(segments: &[Segment<'_>]) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Name(name) => (*name).to_string(),
            Segment::Index(index) => index.to_string(),
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Second-level array position inside a top-level object,
/// e.g. `correct_responses.2` in `cmi.interactions.0.correct_responses.2.pattern`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubIndex {
    pub name: String,
    pub index: u32,
}

/// A path below a root element that carries a top-level index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedPath {
    /// Index directly after the root (`0` in `cmi.interactions.0.id`).
    pub index: u32,
    /// Second-level array position, if the path has one.
    pub sub: Option<SubIndex>,
    /// Remaining dotted key the value is assigned to.
    pub key: String,
}

impl IndexedPath {
    fn sort_key(&self) -> (u32, Option<(&str, u32)>) {
        (
            self.index,
            self.sub.as_ref().map(|sub| (sub.name.as_str(), sub.index)),
        )
    }
}

/// How a path relates to a root element name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatch {
    /// The path is not below the root.
    Outside,
    /// The path is below the root and follows the indexed grammar.
    Indexed(IndexedPath),
    /// The path is below the root but carries no usable index.
    Unindexed,
}

/// Classify `path` relative to `root` (for example `cmi.interactions`).
pub fn match_path(path: &str, root: &str, schema: SchemaVersion) -> PathMatch {
    let root_segments = segments(root, schema);
    let path_segments = segments(path, schema);

    let Some(rest) = path_segments.strip_prefix(root_segments.as_slice()) else {
        return PathMatch::Outside;
    };

    let [Segment::Index(index), tail @ ..] = rest else {
        return PathMatch::Unindexed;
    };
    if tail.is_empty() {
        return PathMatch::Unindexed;
    }

    // A second level needs one or more names, an index, then a key.
    let names = tail
        .iter()
        .take_while(|segment| matches!(segment, Segment::Name(_)))
        .count();
    if names > 0
        && let Some((Segment::Index(sub_index), key)) = tail
            .get(names..)
            .and_then(|after| after.split_first())
        && !key.is_empty()
    {
        let name = tail.get(..names).map(join).unwrap_or_default();
        return PathMatch::Indexed(IndexedPath {
            index: *index,
            sub: Some(SubIndex {
                name,
                index: *sub_index,
            }),
            key: join(key),
        });
    }

    PathMatch::Indexed(IndexedPath {
        index: *index,
        sub: None,
        key: join(tail),
    })
}

/// Order two element paths below `root` by their embedded indices.
///
/// The top-level index decides first. On a tie the second-level group is
/// compared: paths without one come first, then by sub-element name, then by
/// sub-index. Paths that are not indexed sort before indexed ones and compare
/// equal among themselves.
pub fn element_cmp(a: &str, b: &str, root: &str, schema: SchemaVersion) -> Ordering {
    cmp_matches(&match_path(a, root, schema), &match_path(b, root, schema))
}

pub(crate) fn cmp_matches(a: &PathMatch, b: &PathMatch) -> Ordering {
    match (a, b) {
        (PathMatch::Indexed(l), PathMatch::Indexed(r)) => l.sort_key().cmp(&r.sort_key()),
        (_, PathMatch::Indexed(_)) => Ordering::Less,
        (PathMatch::Indexed(_), _) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
