//! Resource-group resolution
//!
//! Maps the resource under evaluation to the groups a policy allows for it.
//! Resolution has two stages, each a tagged dispatch on the policy's match
//! targets:
//!
//! 1. [`ResourceMatchTarget`](crate::config::ResourceMatchTarget) picks the
//!    candidate inputs from the resource (name, URIs, or attribute values),
//!    optionally narrowed by the policy pattern's first capturing group.
//! 2. [`GroupMatchTarget`](crate::config::GroupMatchTarget) turns one candidate
//!    input into groups (by id, by name search, or by group attribute).
//!
//! The first candidate input that yields a non-empty group list wins. `None`
//! means the policy does not apply to the resource.
//!
//! # Example
//!
//! ```rust
//! use cretoai_group_authz::config::{GroupMatchTarget, PolicyConfig, ResourceMatchTarget};
//! use cretoai_group_authz::directory::InMemoryGroupDirectory;
//! use cretoai_group_authz::pattern::PatternCache;
//! use cretoai_group_authz::resolver::ResourceGroupResolver;
//! use cretoai_group_authz::types::{Group, Resource};
//!
//! let directory = InMemoryGroupDirectory::new();
//! directory.add_group(Group::new("42", "/org/eng42"));
//!
//! let patterns = PatternCache::new();
//! let resolver = ResourceGroupResolver::new(&directory, &patterns);
//!
//! let config = PolicyConfig::new(ResourceMatchTarget::Uri, GroupMatchTarget::Id)
//!     .with_pattern("^/groups/(.+)$");
//! let resource = Resource::new("project").with_uri("/other").with_uri("/groups/42");
//!
//! let groups = resolver.resolve_allowed_groups(&resource, &config).unwrap().unwrap();
//! assert_eq!(groups[0].name, "eng42");
//! ```

mod group;
mod resource;


pub use resource::ResourceGroupResolver;

/// Groups allowed for a resource; `None` when the policy does not apply
pub type AllowedGroups = Option<Vec<crate::types::Group>>;
