use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Dictates where to look first and whether a network response is stored.
///
/// - `CacheFirst`: serve the cached entry if there is one, otherwise fetch
///   and store the response.
/// - `CacheOnly`: serve the cached entry. The network is never called.
/// - `NetworkOnly`: always fetch and store the response.
/// - `NoCache`: always fetch, never store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CachePolicy {
    CacheFirst,
    CacheOnly,
    #[default]
    NetworkOnly,
    NoCache,
}

impl CachePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CachePolicy::CacheFirst => "cache-first",
            CachePolicy::CacheOnly => "cache-only",
            CachePolicy::NetworkOnly => "network-only",
            CachePolicy::NoCache => "no-cache",
        }
    }

    /// Whether the store is consulted before going to the network.
    pub fn reads_cache(&self) -> bool {
        matches!(self, CachePolicy::CacheFirst | CachePolicy::CacheOnly)
    }

    /// Whether a successful network response is saved into the store.
    pub fn stores_result(&self) -> bool {
        matches!(self, CachePolicy::CacheFirst | CachePolicy::NetworkOnly)
    }

    /// Decides if the network has to be called given whether the store
    /// holds an entry for the request.
    pub fn should_call_network(&self, cached: bool) -> bool {
        match self {
            CachePolicy::NetworkOnly | CachePolicy::NoCache => true,
            CachePolicy::CacheFirst => !cached,
            CachePolicy::CacheOnly => false,
        }
    }
}

impl Display for CachePolicy {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CachePolicy {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "cache-first" => Ok(CachePolicy::CacheFirst),
            "cache-only" => Ok(CachePolicy::CacheOnly),
            "network-only" => Ok(CachePolicy::NetworkOnly),
            "no-cache" => Ok(CachePolicy::NoCache),
            other => Err(FetchError::UnknownPolicy(other.to_string())),
        }
    }
}
