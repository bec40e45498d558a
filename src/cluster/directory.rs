//! Directory Service
//!
//! Source of cluster membership. Nodes never learn about each other
//! directly; every refresh asks the directory which members belong to the
//! group and where they live.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::ClusterError;

// == Directory Service Trait ==
/// Enumerates group members and resolves them to network addresses.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Returns the member identifiers currently in `group`.
    async fn list_group_members(&self, group: &str) -> Result<Vec<String>, ClusterError>;

    /// Resolves a member identifier to a host or `host:port` address.
    async fn resolve_address(&self, member_id: &str) -> Result<String, ClusterError>;
}

// == Static Directory ==
/// Directory backed by a fixed member table, loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    groups: HashMap<String, Vec<String>>,
    addresses: HashMap<String, String>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a directory holding one group with the given `(id, address)` members.
    pub fn with_group<I>(group: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut directory = Self::new();
        let group = group.into();
        directory.groups.entry(group.clone()).or_default();
        for (id, addr) in members {
            directory.add_member(&group, id, addr);
        }
        directory
    }

    /// Adds a member to `group`, registering its address.
    pub fn add_member(&mut self, group: &str, id: impl Into<String>, addr: impl Into<String>) {
        let id = id.into();
        self.addresses.insert(id.clone(), addr.into());
        self.groups.entry(group.to_string()).or_default().push(id);
    }
}

#[async_trait]
impl DirectoryService for StaticDirectory {
    async fn list_group_members(&self, group: &str) -> Result<Vec<String>, ClusterError> {
        self.groups
            .get(group)
            .cloned()
            .ok_or_else(|| ClusterError::Directory(format!("unknown group '{}'", group)))
    }

    async fn resolve_address(&self, member_id: &str) -> Result<String, ClusterError> {
        self.addresses
            .get(member_id)
            .cloned()
            .ok_or_else(|| ClusterError::Directory(format!("no address for member '{}'", member_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> StaticDirectory {
        StaticDirectory::with_group(
            "cache-asg",
            vec![
                ("i-1".to_string(), "10.0.0.1".to_string()),
                ("i-2".to_string(), "10.0.0.2:8080".to_string()),
            ],
        )
    }

    #[tokio::test]
    async fn test_list_group_members() {
        let members = directory().list_group_members("cache-asg").await.unwrap();
        assert_eq!(members, vec!["i-1".to_string(), "i-2".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_group_is_error() {
        let result = directory().list_group_members("other").await;
        assert!(matches!(result, Err(ClusterError::Directory(_))));
    }

    #[tokio::test]
    async fn test_empty_group_lists_no_members() {
        let directory = StaticDirectory::with_group("cache-asg", Vec::new());
        let members = directory.list_group_members("cache-asg").await.unwrap();
        assert!(members.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_address() {
        let directory = directory();
        assert_eq!(directory.resolve_address("i-2").await.unwrap(), "10.0.0.2:8080");
        assert!(directory.resolve_address("i-9").await.is_err());
    }
}
