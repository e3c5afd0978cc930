use super::name::normalize_domain;
use super::suffix_trie::{SuffixFlags, SuffixTrie};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reverse-lookup zones that bypass domestic/foreign geo-splitting.
pub const REVERSE_ZONE_SUFFIXES: [&str; 2] = ["in-addr.arpa", "ip6.arpa"];

/// Routing decision for a queried name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Answered NXDOMAIN directly, no upstream query.
    Local,
    /// Routed to the primary (domestic) upstream group.
    Primary,
    /// Routed to the alternate (clean) upstream group. Default when nothing matches.
    Alternate,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Local => "local",
            Classification::Primary => "primary",
            Classification::Alternate => "alternate",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where queries under `in-addr.arpa` / `ip6.arpa` go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReverseZonePolicy {
    #[default]
    Primary,
    Alternate,
    Local,
}

impl ReverseZonePolicy {
    fn flags(self) -> SuffixFlags {
        match self {
            ReverseZonePolicy::Primary => SuffixFlags::PRIMARY,
            ReverseZonePolicy::Alternate => SuffixFlags::ALTERNATE,
            ReverseZonePolicy::Local => SuffixFlags::LOCAL,
        }
    }
}

/// Read-only suffix policy shared by every in-flight query.
///
/// Built once at startup; holds no interior mutability, so `&DomainPolicySet`
/// can be read from any number of tasks at once.
#[derive(Debug)]
pub struct DomainPolicySet {
    trie: SuffixTrie,
    primary_count: usize,
    reverse_zones: ReverseZonePolicy,
}

impl DomainPolicySet {
    pub fn builder() -> DomainPolicySetBuilder {
        DomainPolicySetBuilder::default()
    }

    /// Classifies `name` (any case, with or without trailing dot).
    ///
    /// Precedence: local suffixes, then reverse zones routed to the alternate
    /// group, then primary suffixes; anything else is `Alternate`.
    pub fn classify(&self, name: &str) -> Classification {
        let name = normalize_domain(name);
        let flags = self.trie.lookup(&name);

        if flags.contains(SuffixFlags::LOCAL) {
            Classification::Local
        } else if flags.contains(SuffixFlags::ALTERNATE) {
            Classification::Alternate
        } else if flags.contains(SuffixFlags::PRIMARY) {
            Classification::Primary
        } else {
            Classification::Alternate
        }
    }

    pub fn is_banned(&self, name: &str) -> bool {
        let name = normalize_domain(name);
        self.trie.lookup(&name).contains(SuffixFlags::BANNED)
    }

    /// Number of primary suffixes loaded from the domain list and configuration.
    pub fn primary_len(&self) -> usize {
        self.primary_count
    }

    pub fn reverse_zone_policy(&self) -> ReverseZonePolicy {
        self.reverse_zones
    }
}

impl Default for DomainPolicySet {
    fn default() -> Self {
        DomainPolicySet::builder().build()
    }
}

#[derive(Debug, Default)]
pub struct DomainPolicySetBuilder {
    trie: SuffixTrie,
    primary_count: usize,
    reverse_zones: ReverseZonePolicy,
}

impl DomainPolicySetBuilder {
    pub fn local_suffix(mut self, suffix: &str) -> Self {
        self.insert(suffix, SuffixFlags::LOCAL);
        self
    }

    pub fn local_suffixes<'a, I>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        for suffix in suffixes {
            self.insert(suffix, SuffixFlags::LOCAL);
        }
        self
    }

    pub fn banned_suffixes<'a, I>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        for suffix in suffixes {
            self.insert(suffix, SuffixFlags::BANNED);
        }
        self
    }

    pub fn primary_suffix(mut self, suffix: &str) -> Self {
        if self.insert(suffix, SuffixFlags::PRIMARY) {
            self.primary_count += 1;
        }
        self
    }

    /// Adds every entry of a domain list: one domain per line, blank and
    /// whitespace-only lines skipped, no comment syntax.
    pub fn primary_list(mut self, text: &str) -> Self {
        for line in text.lines() {
            let line = line.trim_start_matches('\u{feff}');
            if self.insert(line, SuffixFlags::PRIMARY) {
                self.primary_count += 1;
            }
        }
        self
    }

    pub fn reverse_zones(mut self, policy: ReverseZonePolicy) -> Self {
        self.reverse_zones = policy;
        self
    }

    pub fn build(mut self) -> DomainPolicySet {
        let flags = self.reverse_zones.flags();
        for zone in REVERSE_ZONE_SUFFIXES {
            self.trie.insert(zone, flags);
        }
        DomainPolicySet {
            trie: self.trie,
            primary_count: self.primary_count,
            reverse_zones: self.reverse_zones,
        }
    }

    fn insert(&mut self, raw: &str, flags: SuffixFlags) -> bool {
        let suffix = normalize_domain(raw);
        if suffix.is_empty() {
            return false;
        }
        self.trie.insert(&suffix, flags)
    }
}
