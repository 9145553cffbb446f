//! Refresh topics and topic sets

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Class of cached chain readouts that may be stale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshTopic {
    /// Token balances of the connected account
    Balances,
    /// Token allowances granted to the AMM
    Allowances,
    /// Pool reserves and `k`
    Pool,
    /// LP share balance and total supply
    Lp,
    /// Wildcard: matches every subscriber
    All,
}

impl RefreshTopic {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshTopic::Balances => "balances",
            RefreshTopic::Allowances => "allowances",
            RefreshTopic::Pool => "pool",
            RefreshTopic::Lp => "lp",
            RefreshTopic::All => "all",
        }
    }
}

impl fmt::Display for RefreshTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deduplicated, non-empty set of topics carried by one publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSet(BTreeSet<RefreshTopic>);

impl TopicSet {
    /// Build from a publisher's topic list; an empty list means `{All}`
    pub fn from_topics(topics: &[RefreshTopic]) -> Self {
        if topics.is_empty() {
            return Self::all();
        }
        Self(topics.iter().copied().collect())
    }

    /// The wildcard set `{All}`
    pub fn all() -> Self {
        Self(BTreeSet::from([RefreshTopic::All]))
    }

    pub fn contains(&self, topic: RefreshTopic) -> bool {
        self.0.contains(&topic)
    }

    pub fn is_wildcard(&self) -> bool {
        self.contains(RefreshTopic::All)
    }

    /// True if a subscriber interested in `interests` should refresh
    pub fn matches(&self, interests: &[RefreshTopic]) -> bool {
        self.is_wildcard()
            || interests
                .iter()
                .any(|topic| *topic == RefreshTopic::All || self.contains(*topic))
    }

    pub fn iter(&self) -> impl Iterator<Item = RefreshTopic> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TopicSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(RefreshTopic::as_str).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RefreshTopic::*;

    #[test]
    fn test_empty_publish_is_wildcard() {
        let set = TopicSet::from_topics(&[]);
        assert!(set.is_wildcard());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_duplicates_collapse() {
        let set = TopicSet::from_topics(&[Pool, Lp, Pool]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_string(), "{pool, lp}");
    }

    #[test]
    fn test_matching_rules() {
        assert!(TopicSet::all().matches(&[Pool]));
        assert!(!TopicSet::from_topics(&[Balances]).matches(&[Lp]));
        assert!(TopicSet::from_topics(&[Balances]).matches(&[Lp, Balances]));
        assert!(TopicSet::from_topics(&[Pool]).matches(&[All]));
    }
}
