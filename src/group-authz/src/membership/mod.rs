//! Membership evaluation module
//!
//! Decides grant/deny from the groups allowed for a resource and the
//! identity's group claims.
//!
//! # Features
//!
//! - **Path Matching**: Claims containing `/` match the group path or any
//!   descendant, on segment boundaries only
//! - **Name Matching**: Bare claims must equal the group's leaf name
//! - **Claim Fallback**: Ordered claim sources (configured claim, then realm
//!   memberships), extensible without touching the evaluator
//! - **Deny by Default**: The context is granted only on a match
//!
//! # Example
//!
//! ```rust
//! use cretoai_group_authz::membership::MembershipEvaluator;
//! use cretoai_group_authz::types::Group;
//!
//! let allowed = vec![Group::new("1", "/org/engineering")];
//!
//! let found = MembershipEvaluator::find_match(&allowed, &["/org/engineering/backend".to_string()]);
//! assert!(found.is_some());
//!
//! let found = MembershipEvaluator::find_match(&allowed, &["/org/engineeringx".to_string()]);
//! assert!(found.is_none());
//! ```

pub mod claims;
pub mod evaluator;
pub mod path;


pub use claims::{ClaimResolver, ClaimSource, ConfiguredClaim, RealmMemberships, ResolvedClaims};
pub use evaluator::{MatchKind, MembershipEvaluator, MembershipMatch, Outcome};
pub use path::GroupPath;
