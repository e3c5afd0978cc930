use compact_str::CompactString;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::ops::{BitOr, BitOrAssign};

/// Set of roles a suffix carries. A lookup returns the union of the flags of
/// every stored suffix the name falls under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SuffixFlags(u8);

impl SuffixFlags {
    pub const NONE: SuffixFlags = SuffixFlags(0);
    pub const LOCAL: SuffixFlags = SuffixFlags(1);
    pub const BANNED: SuffixFlags = SuffixFlags(1 << 1);
    pub const PRIMARY: SuffixFlags = SuffixFlags(1 << 2);
    pub const ALTERNATE: SuffixFlags = SuffixFlags(1 << 3);

    #[inline]
    pub fn contains(self, other: SuffixFlags) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for SuffixFlags {
    type Output = SuffixFlags;

    fn bitor(self, rhs: SuffixFlags) -> SuffixFlags {
        SuffixFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for SuffixFlags {
    fn bitor_assign(&mut self, rhs: SuffixFlags) {
        self.0 |= rhs.0;
    }
}

#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<CompactString, TrieNode, FxBuildHasher>,
    flags: SuffixFlags,
}

/// Reversed-label trie: `www.example.cn` is stored as `cn -> example -> www`.
///
/// Keys are expected to be normalized already (see [`super::normalize_domain`]).
#[derive(Debug, Default)]
pub struct SuffixTrie {
    root: TrieNode,
    len: usize,
}

impl SuffixTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `suffix` gained any of `flags`.
    pub fn insert(&mut self, suffix: &str, flags: SuffixFlags) -> bool {
        if suffix.is_empty() || flags.is_empty() {
            return false;
        }
        let mut node = &mut self.root;
        for label in suffix.split('.').rev() {
            node = node.children.entry(CompactString::new(label)).or_default();
        }
        if node.flags.is_empty() {
            self.len += 1;
        }
        let added = !node.flags.contains(flags);
        node.flags |= flags;
        added
    }

    /// Equal-or-subdomain match: every stored suffix `s` with `name == s` or
    /// `name` ending in `".s"` contributes its flags.
    #[inline]
    pub fn lookup(&self, name: &str) -> SuffixFlags {
        if name.is_empty() {
            return SuffixFlags::NONE;
        }
        let labels: SmallVec<[&str; 8]> = name.split('.').rev().collect();
        let mut node = &self.root;
        let mut result = SuffixFlags::NONE;

        for label in labels.iter() {
            match node.children.get(*label) {
                Some(child) => {
                    result |= child.flags;
                    node = child;
                }
                None => break,
            }
        }

        result
    }

    /// Number of distinct suffixes stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_subdomain_match() {
        let mut trie = SuffixTrie::new();
        trie.insert("example.cn", SuffixFlags::PRIMARY);

        assert!(trie.lookup("example.cn").contains(SuffixFlags::PRIMARY));
        assert!(trie.lookup("www.example.cn").contains(SuffixFlags::PRIMARY));
        assert!(trie.lookup("a.b.example.cn").contains(SuffixFlags::PRIMARY));
    }

    #[test]
    fn test_label_boundary_is_respected() {
        let mut trie = SuffixTrie::new();
        trie.insert("example.cn", SuffixFlags::PRIMARY);

        assert!(trie.lookup("badexample.cn").is_empty());
        assert!(trie.lookup("cn").is_empty());
        assert!(trie.lookup("example.cn.evil").is_empty());
    }

    #[test]
    fn test_flags_accumulate_along_path() {
        let mut trie = SuffixTrie::new();
        trie.insert("arpa", SuffixFlags::BANNED);
        trie.insert("in-addr.arpa", SuffixFlags::PRIMARY);

        let flags = trie.lookup("1.0.0.127.in-addr.arpa");
        assert!(flags.contains(SuffixFlags::BANNED));
        assert!(flags.contains(SuffixFlags::PRIMARY));
        assert!(!flags.contains(SuffixFlags::LOCAL));
    }

    #[test]
    fn test_len_counts_distinct_suffixes() {
        let mut trie = SuffixTrie::new();
        trie.insert("a.com", SuffixFlags::PRIMARY);
        trie.insert("a.com", SuffixFlags::BANNED);
        trie.insert("b.com", SuffixFlags::PRIMARY);
        trie.insert("", SuffixFlags::PRIMARY);

        assert_eq!(trie.len(), 2);
    }

    #[test]
    fn test_insert_reports_new_flags_only() {
        let mut trie = SuffixTrie::new();
        assert!(trie.insert("a.com", SuffixFlags::LOCAL));
        assert!(trie.insert("a.com", SuffixFlags::PRIMARY));
        assert!(!trie.insert("a.com", SuffixFlags::PRIMARY));
        assert!(!trie.insert("", SuffixFlags::PRIMARY));
    }

    #[test]
    fn test_empty_name_matches_nothing() {
        let mut trie = SuffixTrie::new();
        trie.insert("com", SuffixFlags::PRIMARY);
        assert!(trie.lookup("").is_empty());
    }
}
