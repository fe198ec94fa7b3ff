//! Eviction Policy Module
//!
//! Strategies that pick which fast-tier entry to drop when capacity is
//! exceeded. Each policy is stateless and only looks at entry metadata.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

// == Candidate ==
/// Metadata of one resident entry, as seen by an eviction policy.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub key: &'a str,
    pub created_at: u64,
    pub access_count: u64,
    pub written_tick: u64,
    pub used_tick: u64,
}

// == Eviction Policy ==
/// Selects the eviction victim among resident entries.
pub trait EvictionPolicy: Send + Sync + fmt::Debug {
    /// Short policy name used in logs.
    fn name(&self) -> &'static str;

    /// Returns the key to evict, or `None` when there are no candidates.
    fn select_victim<'a>(
        &self,
        candidates: &mut dyn Iterator<Item = Candidate<'a>>,
    ) -> Option<&'a str>;
}

/// Least recently used: oldest write-or-touch wins.
#[derive(Debug, Default, Clone, Copy)]
pub struct Lru;

impl EvictionPolicy for Lru {
    fn name(&self) -> &'static str {
        "lru"
    }

    fn select_victim<'a>(
        &self,
        candidates: &mut dyn Iterator<Item = Candidate<'a>>,
    ) -> Option<&'a str> {
        candidates.min_by_key(|c| c.used_tick).map(|c| c.key)
    }
}

/// Least frequently used; ties go to the earliest write.
#[derive(Debug, Default, Clone, Copy)]
pub struct Lfu;

impl EvictionPolicy for Lfu {
    fn name(&self) -> &'static str {
        "lfu"
    }

    fn select_victim<'a>(
        &self,
        candidates: &mut dyn Iterator<Item = Candidate<'a>>,
    ) -> Option<&'a str> {
        candidates
            .min_by_key(|c| (c.access_count, c.written_tick))
            .map(|c| c.key)
    }
}

/// First in, first out. Reads never save an entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct Fifo;

impl EvictionPolicy for Fifo {
    fn name(&self) -> &'static str {
        "fifo"
    }

    fn select_victim<'a>(
        &self,
        candidates: &mut dyn Iterator<Item = Candidate<'a>>,
    ) -> Option<&'a str> {
        candidates
            .min_by_key(|c| (c.created_at, c.written_tick))
            .map(|c| c.key)
    }
}

// == Policy Kind ==
/// Configurable choice of eviction policy.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Lru,
    Lfu,
    Fifo,
}

impl PolicyKind {
    /// Instantiates the strategy object for this kind.
    pub fn build(self) -> Box<dyn EvictionPolicy> {
        match self {
            PolicyKind::Lru => Box::new(Lru),
            PolicyKind::Lfu => Box::new(Lfu),
            PolicyKind::Fifo => Box::new(Fifo),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(PolicyKind::Lru),
            "lfu" => Ok(PolicyKind::Lfu),
            "fifo" => Ok(PolicyKind::Fifo),
            other => Err(CacheError::InvalidRequest(format!(
                "Unknown eviction policy: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.build().name())
    }
}
