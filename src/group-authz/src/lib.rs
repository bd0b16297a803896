//! # CretoAI Group-Membership Authorization
//!
//! Policy engine granting access when an identity belongs to a group
//! derived from the protected resource.
//!
//! ## Features
//!
//! - **Resource-group resolution** by resource name, URI, or attribute,
//!   against group id, name, or attribute
//! - **Pattern extraction** with full-match regexes and a capture group
//! - **Hierarchical membership** where a group path grants its descendants
//! - **Claim fallback** from a configured token claim to realm memberships
//! - **Metrics** with latency percentiles and Prometheus export
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use cretoai_group_authz::{
//!     AuthzRequest, EngineConfig, Group, GroupMatchTarget, GroupMembershipEngine, Identity,
//!     InMemoryGroupDirectory, InMemoryPolicyConfigStore, InMemoryResourceStore, PolicyConfig,
//!     PolicyConfigStore, Resource, ResourceMatchTarget,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let directory = InMemoryGroupDirectory::new();
//!     directory.add_group(Group::new("1", "/org/engineering"));
//!
//!     let resources = InMemoryResourceStore::new();
//!     resources.put(Resource::new("engineering"));
//!
//!     let policies = InMemoryPolicyConfigStore::new();
//!     let policy = PolicyConfig::new(ResourceMatchTarget::Name, GroupMatchTarget::Name)
//!         .with_groups_claim("groups");
//!     policies.put("team-access", policy.to_config_map())?;
//!
//!     let engine = GroupMembershipEngine::new(
//!         EngineConfig::default(),
//!         Arc::new(directory),
//!         Arc::new(resources),
//!         Arc::new(policies),
//!     );
//!
//!     let identity = Identity::new("alice").with_claim("groups", ["/org/engineering/backend"]);
//!     let decision = engine.authorize(&AuthzRequest::new("team-access", "engineering", identity))?;
//!
//!     if decision.allowed {
//!         println!("Access granted!");
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod types;
pub mod error;
pub mod config;
pub mod pattern;
pub mod directory;
pub mod evaluation;
pub mod resolver;
pub mod membership;
pub mod provider;
pub mod engine;

// Re-export commonly used types
pub use types::{AuthzRequest, Decision, Group, GroupId, Identity, PolicyId, Resource};
pub use config::{GroupMatchTarget, PolicyConfig, ResourceMatchTarget};
pub use directory::{
    GroupDirectory, InMemoryGroupDirectory, InMemoryPolicyConfigStore, InMemoryResourceStore,
    NameSearch, PolicyConfigStore, ResourceStore,
};
pub use evaluation::EvaluationContext;
pub use resolver::ResourceGroupResolver;
pub use membership::{ClaimResolver, ClaimSource, MatchKind, MembershipEvaluator, MembershipMatch, Outcome};
pub use provider::{GroupMembershipPolicyProvider, PolicyProvider};
pub use engine::{EngineConfig, EngineMetrics, GroupMembershipEngine};
pub use error::{AuthzError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
