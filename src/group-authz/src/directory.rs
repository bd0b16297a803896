//! External collaborators: group directory, resource store and policy store
//!
//! The engine only reads from these. Each trait has an in-memory
//! implementation used by tests and embedded deployments.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{Group, PolicyId, Resource};

/// Read access to the realm's groups
///
/// Lookups are issued per evaluation and are never cached by the engine.
pub trait GroupDirectory: Send + Sync {
    /// Look up a group by its identifier
    fn find_by_id(&self, id: &str) -> Result<Option<Group>>;

    /// Search groups by name, using the directory's own search semantics
    fn search_by_name(&self, query: &str) -> Result<Vec<Group>>;

    /// Enumerate every group in the realm
    fn all_groups(&self) -> Result<Vec<Group>>;

    /// Group names or paths the identity is a member of in the realm
    fn realm_groups_of(&self, identity_id: &str) -> Result<Vec<String>>;
}

/// Read access to protected resources
pub trait ResourceStore: Send + Sync {
    /// Look up a resource by its identifier
    fn find_by_id(&self, id: &str) -> Result<Option<Resource>>;
}

/// Storage of persisted policy configuration maps
pub trait PolicyConfigStore: Send + Sync {
    /// Get a policy's configuration map
    fn get(&self, policy_id: &str) -> Result<Option<HashMap<String, String>>>;

    /// Store a policy's configuration map
    fn put(&self, policy_id: &str, config: HashMap<String, String>) -> Result<()>;

    /// Delete a policy
    fn delete(&self, policy_id: &str) -> Result<()>;

    /// List stored policy identifiers
    fn list_ids(&self) -> Result<Vec<PolicyId>>;
}

/// Name search semantics for [`InMemoryGroupDirectory`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameSearch {
    /// Name equals the query
    #[default]
    Exact,
    /// Name contains the query, ignoring case
    Substring,
}

impl NameSearch {
    fn matches(&self, name: &str, query: &str) -> bool {
        match self {
            Self::Exact => name == query,
            Self::Substring => name.to_lowercase().contains(&query.to_lowercase()),
        }
    }
}

/// In-memory group directory
///
/// Groups are enumerated in insertion order.
pub struct InMemoryGroupDirectory {
    groups: Arc<RwLock<Vec<Group>>>,
    memberships: Arc<RwLock<HashMap<String, Vec<String>>>>,
    name_search: NameSearch,
}

impl InMemoryGroupDirectory {
    /// Create an empty directory with exact name search
    pub fn new() -> Self {
        Self::with_name_search(NameSearch::Exact)
    }

    /// Create an empty directory with the given name search semantics
    pub fn with_name_search(name_search: NameSearch) -> Self {
        Self {
            groups: Arc::new(RwLock::new(Vec::new())),
            memberships: Arc::new(RwLock::new(HashMap::new())),
            name_search,
        }
    }

    /// Add a group, replacing any group with the same id in place
    pub fn add_group(&self, group: Group) {
        let mut groups = self.groups.write();
        match groups.iter_mut().find(|g| g.id == group.id) {
            Some(existing) => *existing = group,
            None => groups.push(group),
        }
    }

    /// Remove a group by id
    pub fn remove_group(&self, id: &str) {
        self.groups.write().retain(|g| g.id != id);
    }

    /// Record the realm groups an identity belongs to
    pub fn set_memberships<I, S>(&self, identity_id: impl Into<String>, groups: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.memberships.write().insert(
            identity_id.into(),
            groups.into_iter().map(Into::into).collect(),
        );
    }

    /// Number of groups in the directory
    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    /// Whether the directory has no groups
    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }
}

impl Default for InMemoryGroupDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupDirectory for InMemoryGroupDirectory {
    fn find_by_id(&self, id: &str) -> Result<Option<Group>> {
        Ok(self.groups.read().iter().find(|g| g.id == id).cloned())
    }

    fn search_by_name(&self, query: &str) -> Result<Vec<Group>> {
        Ok(self
            .groups
            .read()
            .iter()
            .filter(|g| self.name_search.matches(&g.name, query))
            .cloned()
            .collect())
    }

    fn all_groups(&self) -> Result<Vec<Group>> {
        Ok(self.groups.read().clone())
    }

    fn realm_groups_of(&self, identity_id: &str) -> Result<Vec<String>> {
        Ok(self
            .memberships
            .read()
            .get(identity_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// In-memory resource store
pub struct InMemoryResourceStore {
    resources: Arc<RwLock<HashMap<String, Resource>>>,
}

impl InMemoryResourceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            resources: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Store a resource under its id
    pub fn put(&self, resource: Resource) {
        self.resources.write().insert(resource.id.clone(), resource);
    }
}

impl Default for InMemoryResourceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceStore for InMemoryResourceStore {
    fn find_by_id(&self, id: &str) -> Result<Option<Resource>> {
        Ok(self.resources.read().get(id).cloned())
    }
}

/// In-memory policy configuration store
pub struct InMemoryPolicyConfigStore {
    policies: Arc<RwLock<HashMap<PolicyId, HashMap<String, String>>>>,
}

impl InMemoryPolicyConfigStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            policies: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryPolicyConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyConfigStore for InMemoryPolicyConfigStore {
    fn get(&self, policy_id: &str) -> Result<Option<HashMap<String, String>>> {
        Ok(self.policies.read().get(policy_id).cloned())
    }

    fn put(&self, policy_id: &str, config: HashMap<String, String>) -> Result<()> {
        self.policies.write().insert(policy_id.to_string(), config);
        Ok(())
    }

    fn delete(&self, policy_id: &str) -> Result<()> {
        self.policies.write().remove(policy_id);
        Ok(())
    }

    fn list_ids(&self) -> Result<Vec<PolicyId>> {
        let mut ids: Vec<PolicyId> = self.policies.read().keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> InMemoryGroupDirectory {
        let directory = InMemoryGroupDirectory::new();
        directory.add_group(Group::new("1", "/org/engineering"));
        directory.add_group(Group::new("2", "/org/engineering-ops"));
        directory.add_group(Group::new("3", "/org/Engineering"));
        directory
    }

    #[test]
    fn test_find_by_id() {
        let directory = directory();
        assert_eq!(directory.find_by_id("2").unwrap().unwrap().name, "engineering-ops");
        assert!(directory.find_by_id("42").unwrap().is_none());
    }

    #[test]
    fn test_exact_name_search() {
        let found = directory().search_by_name("engineering").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");
    }

    #[test]
    fn test_substring_name_search_preserves_order() {
        let directory = InMemoryGroupDirectory::with_name_search(NameSearch::Substring);
        for group in directory_groups() {
            directory.add_group(group);
        }

        let ids: Vec<String> = directory
            .search_by_name("engineering")
            .unwrap()
            .into_iter()
            .map(|g| g.id)
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    fn directory_groups() -> Vec<Group> {
        directory().all_groups().unwrap()
    }

    #[test]
    fn test_add_group_replaces_in_place() {
        let directory = directory();
        directory.add_group(Group::new("1", "/org/platform"));

        let all = directory.all_groups().unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name, "platform");

        directory.remove_group("1");
        assert_eq!(directory.len(), 2);
    }

    #[test]
    fn test_realm_memberships() {
        let directory = directory();
        directory.set_memberships("alice", ["/org/engineering"]);

        assert_eq!(
            directory.realm_groups_of("alice").unwrap(),
            vec!["/org/engineering".to_string()]
        );
        assert!(directory.realm_groups_of("bob").unwrap().is_empty());
    }

    #[test]
    fn test_policy_store() {
        let store = InMemoryPolicyConfigStore::new();
        let mut config = HashMap::new();
        config.insert("resourceMatchTarget".to_string(), "NAME".to_string());

        store.put("policy-b", config.clone()).unwrap();
        store.put("policy-a", config).unwrap();

        assert!(store.get("policy-a").unwrap().is_some());
        assert_eq!(store.list_ids().unwrap(), vec!["policy-a", "policy-b"]);

        store.delete("policy-a").unwrap();
        assert!(store.get("policy-a").unwrap().is_none());
    }

    #[test]
    fn test_resource_store() {
        let store = InMemoryResourceStore::new();
        store.put(Resource::new("engineering").with_id("res-1"));

        assert_eq!(store.find_by_id("res-1").unwrap().unwrap().name, "engineering");
        assert!(store.find_by_id("engineering").unwrap().is_none());
    }
}
