//! Pluggable policy provider

use std::sync::Arc;
use tracing::{debug, warn};

use crate::directory::GroupDirectory;
use crate::error::Result;
use crate::evaluation::EvaluationContext;
use crate::membership::{ClaimResolver, MembershipEvaluator, Outcome};
use crate::pattern::PatternCache;

/// Provider identifier of the group-membership policy type
pub const PROVIDER_ID: &str = "group-membership";

/// Display name of the group-membership policy type
pub const PROVIDER_NAME: &str = "Group Membership";

/// A policy type the host can evaluate
pub trait PolicyProvider: Send + Sync {
    /// Stable provider identifier
    fn id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;

    /// Evaluate the context, granting it if the policy allows access
    fn evaluate(&self, ctx: &mut EvaluationContext) -> Result<()>;

    /// Release provider resources
    fn close(&self) {}
}

/// Group-membership policy provider
///
/// Holds no per-evaluation state; one instance serves concurrent evaluations.
pub struct GroupMembershipPolicyProvider {
    directory: Arc<dyn GroupDirectory>,
    patterns: PatternCache,
    claims: ClaimResolver,
}

impl GroupMembershipPolicyProvider {
    /// Create a provider over a group directory with the default claim chain
    pub fn new(directory: Arc<dyn GroupDirectory>) -> Self {
        Self::with_parts(directory, PatternCache::new(), ClaimResolver::new())
    }

    /// Create a provider from explicit parts
    pub fn with_parts(
        directory: Arc<dyn GroupDirectory>,
        patterns: PatternCache,
        claims: ClaimResolver,
    ) -> Self {
        Self {
            directory,
            patterns,
            claims,
        }
    }

    /// Evaluate and report how the decision was reached
    pub fn evaluate_with_outcome(&self, ctx: &mut EvaluationContext) -> Result<Outcome> {
        let evaluator = MembershipEvaluator::new(self.directory.as_ref(), &self.patterns, &self.claims);

        evaluator.evaluate(ctx).map_err(|e| {
            if e.is_configuration() {
                warn!("Group-membership policy misconfigured: {}", e);
            }
            e
        })
    }

    /// Compiled pattern cache
    pub fn patterns(&self) -> &PatternCache {
        &self.patterns
    }
}

impl PolicyProvider for GroupMembershipPolicyProvider {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn evaluate(&self, ctx: &mut EvaluationContext) -> Result<()> {
        self.evaluate_with_outcome(ctx).map(|_| ())
    }

    fn close(&self) {
        debug!("Closing {} provider", PROVIDER_ID);
    }
}
