//! Cluster Mode
//!
//! Process-lifetime switch between local-only and cluster-wide invalidation.

use std::fmt;

// == Cluster Mode ==
/// Fixed at startup; there are no runtime transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterMode {
    /// No peers; invalidation evicts locally
    Standalone,
    /// Peers discovered from the named directory group
    Clustered { group: String },
}

impl ClusterMode {
    pub fn is_clustered(&self) -> bool {
        matches!(self, ClusterMode::Clustered { .. })
    }

    /// Directory group name, if clustered.
    pub fn group(&self) -> Option<&str> {
        match self {
            ClusterMode::Clustered { group } => Some(group),
            ClusterMode::Standalone => None,
        }
    }
}

impl fmt::Display for ClusterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterMode::Standalone => write!(f, "standalone"),
            ClusterMode::Clustered { group } => write!(f, "clustered ({})", group),
        }
    }
}
