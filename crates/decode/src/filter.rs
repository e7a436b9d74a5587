#![forbid(unsafe_code)]

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default)]
struct Node {
    terminal: bool,
    children: FxHashMap<String, Node>,
}

/// Set of dot-path prefixes whose parameters are skipped before decoding,
/// e.g. fields already bound from the URL path.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    root: Node,
    len: usize,
}

impl PathFilter {
    pub fn new() -> Self { Self::default() }

    /// Build from dotted paths such as `"parent.id"`. Empty paths are ignored.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut f = Self::new();
        for p in paths { f.add_path(p.as_ref()); }
        f
    }

    pub fn add_path(&mut self, dotted: &str) {
        if dotted.is_empty() { return; }
        let segments: Vec<&str> = dotted.split('.').collect();
        self.add(&segments);
    }

    pub fn add(&mut self, segments: &[&str]) {
        if segments.is_empty() { return; }
        let mut node = &mut self.root;
        for seg in segments {
            node = node.children.entry((*seg).to_string()).or_default();
        }
        if !node.terminal {
            node.terminal = true;
            self.len += 1;
        }
    }

    pub fn len(&self) -> usize { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// True when some registered sequence is a prefix of (or equal to) `path`.
    pub fn has_common_prefix<S: AsRef<str>>(&self, path: &[S]) -> bool {
        let mut node = &self.root;
        for seg in path {
            match node.children.get(seg.as_ref()) {
                Some(next) => {
                    if next.terminal { return true; }
                    node = next;
                }
                None => return false,
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_matches_whole_segments_only() {
        let f = PathFilter::from_paths(["parent", "book.name"]);
        assert_eq!(f.len(), 2);
        assert!(f.has_common_prefix(&["parent"]));
        assert!(f.has_common_prefix(&["parent", "id"]));
        assert!(f.has_common_prefix(&["book", "name"]));
        assert!(f.has_common_prefix(&["book", "name", "first"]));
        assert!(!f.has_common_prefix(&["book"]));
        assert!(!f.has_common_prefix(&["book", "title"]));
        assert!(!f.has_common_prefix(&["parents"]));
    }

    #[test]
    fn empty_filter_matches_nothing() {
        let f = PathFilter::from_paths([""]);
        assert!(f.is_empty());
        assert!(!f.has_common_prefix(&["anything"]));
        assert!(!f.has_common_prefix::<&str>(&[]));
    }
}
