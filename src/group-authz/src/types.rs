//! Core group-membership types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique policy identifier
pub type PolicyId = String;

/// Unique group identifier
pub type GroupId = String;

/// Multi-valued attribute bag (attribute name -> ordered values)
pub type Attributes = HashMap<String, Vec<String>>;

/// Resource being accessed
///
/// Read-only view owned by the resource store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource identifier in the store
    pub id: String,

    /// Resource name (e.g., "engineering", "project-42")
    pub name: String,

    /// Optional resource classification (e.g., "urn:app:resources:project")
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    /// URIs in declaration order
    #[serde(default)]
    pub uris: Vec<String>,

    /// Multi-valued attributes
    #[serde(default)]
    pub attributes: Attributes,
}

impl Resource {
    /// Create a resource whose id and name are the same string
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            resource_type: None,
            uris: Vec::new(),
            attributes: HashMap::new(),
        }
    }

    /// Set the store identifier
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the resource type
    pub fn with_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    /// Append a URI
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uris.push(uri.into());
        self
    }

    /// Append a value to an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Values of an attribute, if the attribute is declared
    pub fn attribute(&self, name: &str) -> Option<&[String]> {
        self.attributes.get(name).map(Vec::as_slice)
    }
}

/// Group known to the group directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Stable identifier
    pub id: GroupId,

    /// Leaf name
    pub name: String,

    /// `/`-delimited ancestor chain ending in the name (e.g., "/org/eng/backend")
    pub path: String,

    /// Multi-valued attributes
    #[serde(default)]
    pub attributes: Attributes,
}

impl Group {
    /// Create a group from its id and full path; the name is the last path segment
    ///
    /// Trailing separators are ignored when deriving the name.
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();

        Self {
            id: id.into(),
            name,
            path,
            attributes: HashMap::new(),
        }
    }

    /// Append a value to an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.entry(key.into()).or_default().push(value.into());
        self
    }

    /// First value of an attribute
    pub fn first_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

/// Requesting identity and its claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Identity identifier (key for realm group memberships)
    pub id: String,

    /// Claims carried by the identity's token or attribute bag
    #[serde(default)]
    pub attributes: Attributes,
}

impl Identity {
    /// Create an identity without claims
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: HashMap::new(),
        }
    }

    /// Set a claim to the given values
    pub fn with_claim<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Values of a claim; `None` when the claim is absent, an empty slice when declared empty
    pub fn get_value(&self, claim: &str) -> Option<&[String]> {
        self.attributes.get(claim).map(Vec::as_slice)
    }
}

/// Authorization request handled by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthzRequest {
    /// Policy whose configuration drives the evaluation
    pub policy_id: PolicyId,

    /// Resource being accessed
    pub resource_id: String,

    /// Who is making the request
    pub identity: Identity,
}

impl AuthzRequest {
    /// Create a new request
    pub fn new(
        policy_id: impl Into<String>,
        resource_id: impl Into<String>,
        identity: Identity,
    ) -> Self {
        Self {
            policy_id: policy_id.into(),
            resource_id: resource_id.into(),
            identity,
        }
    }
}

/// Authorization decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    /// Unique decision identifier
    pub id: String,

    /// Whether the request is allowed
    pub allowed: bool,

    /// Policy that made the decision
    pub policy_id: PolicyId,

    /// Reason for the decision
    pub reason: String,

    /// Decision timestamp (milliseconds since epoch)
    pub timestamp: i64,
}

impl Decision {
    /// Create a new decision
    pub fn new(allowed: bool, policy_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            allowed,
            policy_id: policy_id.into(),
            reason: reason.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Allow decision
    pub fn allow(policy_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(true, policy_id, reason)
    }

    /// Deny decision
    pub fn deny(policy_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(false, policy_id, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_creation() {
        let resource = Resource::new("engineering")
            .with_id("res-1")
            .with_type("urn:app:resources:team")
            .with_uri("/teams/engineering")
            .with_attribute("owner", "alice")
            .with_attribute("owner", "bob");

        assert_eq!(resource.id, "res-1");
        assert_eq!(resource.name, "engineering");
        assert_eq!(resource.resource_type.as_deref(), Some("urn:app:resources:team"));
        assert_eq!(resource.uris, vec!["/teams/engineering".to_string()]);
        assert_eq!(
            resource.attribute("owner"),
            Some(&["alice".to_string(), "bob".to_string()][..])
        );
        assert!(resource.attribute("missing").is_none());
    }

    #[test]
    fn test_group_name_from_path() {
        let group = Group::new("g1", "/org/eng/backend");
        assert_eq!(group.name, "backend");
        assert_eq!(group.path, "/org/eng/backend");

        let top = Group::new("g2", "/org");
        assert_eq!(top.name, "org");

        let trailing = Group::new("g3", "/org/eng/");
        assert_eq!(trailing.name, "eng");
        assert_eq!(trailing.path, "/org/eng/");
    }

    #[test]
    fn test_group_first_attribute() {
        let group = Group::new("g1", "/org/eng")
            .with_attribute("code", "ENG")
            .with_attribute("code", "R&D");

        assert_eq!(group.first_attribute("code"), Some("ENG"));
        assert_eq!(group.first_attribute("other"), None);
    }

    #[test]
    fn test_identity_absent_vs_empty_claim() {
        let identity = Identity::new("user-1").with_claim("groups", Vec::<String>::new());

        assert_eq!(identity.get_value("groups"), Some(&[][..]));
        assert_eq!(identity.get_value("roles"), None);
    }

    #[test]
    fn test_decision_creation() {
        let decision = Decision::allow("policy-1", "member of /org/eng");
        assert!(decision.allowed);
        assert_eq!(decision.policy_id, "policy-1");
        assert!(!decision.id.is_empty());
        assert!(decision.timestamp > 0);

        let deny = Decision::deny("policy-2", "no matching group");
        assert!(!deny.allowed);
        assert_ne!(decision.id, deny.id);
    }
}
