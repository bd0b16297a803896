//! Group-membership policy engine
//!
//! Host-facing facade: loads the policy configuration and the resource,
//! runs the provider, and turns the outcome into a [`Decision`].

pub mod config;
pub mod metrics;

pub use config::EngineConfig;
pub use metrics::{DecisionKind, EngineMetrics, MetricsCollector};

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::PolicyConfig;
use crate::directory::{GroupDirectory, PolicyConfigStore, ResourceStore};
use crate::error::{AuthzError, Result};
use crate::evaluation::EvaluationContext;
use crate::membership::{ClaimResolver, Outcome};
use crate::pattern::PatternCache;
use crate::provider::{GroupMembershipPolicyProvider, PolicyProvider};
use crate::types::{AuthzRequest, Decision};

/// Group-membership engine
///
/// # Architecture
///
/// ```text
/// Request → PolicyConfigStore → ResourceStore → Provider → Decision
///                                                  ↓           ↓
///                                   ResourceGroupResolver   [Metrics]
///                                   MembershipEvaluator
/// ```
pub struct GroupMembershipEngine {
    /// Evaluates group-membership policies
    provider: Arc<GroupMembershipPolicyProvider>,

    /// Persisted policy configuration maps
    policy_store: Arc<dyn PolicyConfigStore>,

    /// Protected resources
    resource_store: Arc<dyn ResourceStore>,

    /// Evaluation metrics
    metrics: Option<Arc<MetricsCollector>>,

    /// Engine configuration
    config: EngineConfig,
}

impl GroupMembershipEngine {
    /// Create an engine with the default claim fallback chain
    pub fn new(
        config: EngineConfig,
        directory: Arc<dyn GroupDirectory>,
        resource_store: Arc<dyn ResourceStore>,
        policy_store: Arc<dyn PolicyConfigStore>,
    ) -> Self {
        Self::with_claim_resolver(config, directory, resource_store, policy_store, ClaimResolver::new())
    }

    /// Create an engine with a custom claim fallback chain
    pub fn with_claim_resolver(
        config: EngineConfig,
        directory: Arc<dyn GroupDirectory>,
        resource_store: Arc<dyn ResourceStore>,
        policy_store: Arc<dyn PolicyConfigStore>,
        claims: ClaimResolver,
    ) -> Self {
        let provider = Arc::new(GroupMembershipPolicyProvider::with_parts(
            directory,
            PatternCache::with_capacity(config.pattern_cache_capacity),
            claims,
        ));

        let metrics = if config.enable_metrics {
            Some(Arc::new(MetricsCollector::with_max_samples(config.max_latency_samples)))
        } else {
            None
        };

        info!(
            "GroupMembershipEngine initialized with metrics={}, pattern_cache_capacity={}",
            config.enable_metrics, config.pattern_cache_capacity
        );

        Self {
            provider,
            policy_store,
            resource_store,
            metrics,
            config,
        }
    }

    /// Authorize a request against a stored group-membership policy
    ///
    /// # Pipeline
    ///
    /// 1. Load and parse the policy configuration
    /// 2. Load the resource
    /// 3. Resolve allowed groups and match the identity's claims
    /// 4. Record metrics
    ///
    /// # Errors
    ///
    /// Returns `PolicyNotFound`/`ResourceNotFound` for unknown ids,
    /// `Configuration` for unusable policies, and propagates store and
    /// directory failures.
    pub fn authorize(&self, request: &AuthzRequest) -> Result<Decision> {
        let start = Instant::now();

        debug!(
            "Authorization request: policy={}, resource={}, identity={}",
            request.policy_id, request.resource_id, request.identity.id
        );

        let result = self.evaluate_request(request);
        self.finalize(request, result, start)
    }

    /// Evaluate a prepared context with the engine's provider
    pub fn evaluate(&self, ctx: &mut EvaluationContext) -> Result<Outcome> {
        self.provider.evaluate_with_outcome(ctx)
    }

    /// Engine metrics, if enabled
    pub fn get_metrics(&self) -> Option<EngineMetrics> {
        self.metrics.as_ref().map(|m| m.get_metrics())
    }

    /// Metrics in Prometheus text format, if enabled
    pub fn export_prometheus(&self) -> Option<String> {
        self.metrics.as_ref().map(|m| m.export_prometheus())
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The provider serving this engine
    pub fn provider(&self) -> Arc<GroupMembershipPolicyProvider> {
        Arc::clone(&self.provider)
    }

    /// Release provider resources
    pub fn close(&self) {
        self.provider.close();
    }

    // Private helper methods

    fn evaluate_request(&self, request: &AuthzRequest) -> Result<Outcome> {
        let config_map = self
            .policy_store
            .get(&request.policy_id)?
            .ok_or_else(|| AuthzError::PolicyNotFound(request.policy_id.clone()))?;
        let policy = PolicyConfig::from_config_map(&config_map)?;

        let resource = self
            .resource_store
            .find_by_id(&request.resource_id)?
            .ok_or_else(|| AuthzError::ResourceNotFound(request.resource_id.clone()))?;

        let mut ctx = EvaluationContext::new(resource, policy, request.identity.clone());
        self.provider.evaluate_with_outcome(&mut ctx)
    }

    fn finalize(
        &self,
        request: &AuthzRequest,
        result: Result<Outcome>,
        start: Instant,
    ) -> Result<Decision> {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Evaluation of policy {} failed: {}", request.policy_id, e);
                if let Some(metrics) = &self.metrics {
                    metrics.record_error();
                }
                return Err(e);
            }
        };

        let (decision, kind) = match outcome {
            Outcome::Granted(found) => {
                info!(
                    "Policy {} granted {} via {} ({:?})",
                    request.policy_id, request.identity.id, found.group_path, found.kind
                );
                (
                    Decision::allow(
                        &request.policy_id,
                        format!("Claim '{}' matches group {}", found.claim, found.group_path),
                    ),
                    DecisionKind::Granted,
                )
            }
            Outcome::Denied => (
                Decision::deny(&request.policy_id, "No group claim matches an allowed group"),
                DecisionKind::Denied,
            ),
            Outcome::NotApplicable => (
                Decision::deny(&request.policy_id, "Policy does not apply to resource"),
                DecisionKind::NotApplicable,
            ),
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_latency(start.elapsed());
            metrics.record_decision(kind);
        }

        Ok(decision)
    }
}
