//! In-memory representation of an exported project tree.

use std::collections::BTreeMap;

use formpack_util::hash::blake3_bytes;

/// Content of a single exported file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    Binary(Vec<u8>),
}

impl FileContent {
    /// Raw bytes of the content, regardless of variant.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(s) => s.as_bytes(),
            Self::Binary(b) => b,
        }
    }

    /// Text content, if this entry is textual.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Binary(_) => None,
        }
    }
}

impl From<String> for FileContent {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for FileContent {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<u8>> for FileContent {
    fn from(b: Vec<u8>) -> Self {
        Self::Binary(b)
    }
}

/// Map of output-relative paths to file contents.
///
/// This is the only artifact the pipeline mutates. Keys use forward slashes
/// and are kept sorted, so iteration order (and the fingerprint derived from
/// it) is deterministic.
#[derive(Debug, Clone, Default)]
pub struct FileMap {
    entries: BTreeMap<String, FileContent>,
}

impl FileMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, path: impl Into<String>, content: FileContent) {
        self.entries.insert(path.into(), content);
    }

    /// Insert an entry only if the path is not already present.
    ///
    /// Returns `false` (leaving the existing entry untouched) on conflict.
    /// Stages that are additive by contract, like patch assembly, go through
    /// this instead of [`FileMap::insert`].
    pub fn insert_new(&mut self, path: impl Into<String>, content: FileContent) -> bool {
        use std::collections::btree_map::Entry;
        match self.entries.entry(path.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(content);
                true
            }
        }
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&FileContent> {
        self.entries.get(path)
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FileContent)> {
        self.entries.iter()
    }

    /// Paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// BLAKE3 digest over every path and content byte, in path order.
    ///
    /// Two maps with identical entries always produce identical fingerprints.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut buf = Vec::new();
        for (path, content) in &self.entries {
            buf.extend_from_slice(path.as_bytes());
            buf.push(0);
            let bytes = content.as_bytes();
            buf.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
            buf.extend_from_slice(bytes);
        }
        blake3_bytes(&buf)
    }
}

impl IntoIterator for FileMap {
    type Item = (String, FileContent);
    type IntoIter = std::collections::btree_map::IntoIter<String, FileContent>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_new_refuses_overwrite() {
        let mut files = FileMap::new();
        files.insert("patches/a.patch", "original".into());

        assert!(!files.insert_new("patches/a.patch", "replacement".into()));
        assert_eq!(
            files.get("patches/a.patch").and_then(FileContent::as_text),
            Some("original")
        );

        assert!(files.insert_new("patches/b.patch", "new".into()));
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_iteration_is_sorted_regardless_of_insert_order() {
        let mut files = FileMap::new();
        files.insert("src/main.tsx", "c".into());
        files.insert("package.json", "a".into());
        files.insert("src/adapters/index.ts", "b".into());

        let paths: Vec<_> = files.paths().collect();
        assert_eq!(
            paths,
            vec!["package.json", "src/adapters/index.ts", "src/main.tsx"]
        );
    }

    #[test]
    fn test_fingerprint_stable_across_insert_order() {
        let mut a = FileMap::new();
        a.insert("x.ts", "one".into());
        a.insert("y.ts", "two".into());

        let mut b = FileMap::new();
        b.insert("y.ts", "two".into());
        b.insert("x.ts", "one".into());

        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let mut a = FileMap::new();
        a.insert("x.ts", "one".into());

        let mut b = FileMap::new();
        b.insert("x.ts", "two".into());

        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_binary_content_round_trips_bytes() {
        let mut files = FileMap::new();
        files.insert("public/favicon.ico", vec![0u8, 159, 146, 150].into());

        let entry = files.get("public/favicon.ico").unwrap();
        assert_eq!(entry.as_bytes(), &[0u8, 159, 146, 150]);
        assert!(entry.as_text().is_none());
    }
}
