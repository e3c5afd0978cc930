mod name;
mod policy_set;
mod suffix_trie;

pub use name::normalize_domain;
pub use policy_set::{
    Classification, DomainPolicySet, DomainPolicySetBuilder, ReverseZonePolicy,
    REVERSE_ZONE_SUFFIXES,
};
pub use suffix_trie::{SuffixFlags, SuffixTrie};
