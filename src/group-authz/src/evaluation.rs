//! Per-evaluation context

use crate::config::PolicyConfig;
use crate::types::{Identity, Resource};

/// Everything a single evaluation reads, plus its deny-by-default grant flag
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    /// Resource being accessed
    pub resource: Resource,

    /// Policy configuration snapshot
    pub config: PolicyConfig,

    /// Requesting identity and its claims
    pub identity: Identity,

    granted: bool,
}

impl EvaluationContext {
    /// Create a context that denies until granted
    pub fn new(resource: Resource, config: PolicyConfig, identity: Identity) -> Self {
        Self {
            resource,
            config,
            identity,
            granted: false,
        }
    }

    /// Grant access; further calls have no effect
    pub fn grant(&mut self) {
        self.granted = true;
    }

    /// Whether access was granted
    pub fn is_granted(&self) -> bool {
        self.granted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GroupMatchTarget, ResourceMatchTarget};

    #[test]
    fn test_deny_by_default() {
        let mut ctx = EvaluationContext::new(
            Resource::new("engineering"),
            PolicyConfig::new(ResourceMatchTarget::Name, GroupMatchTarget::Name),
            Identity::new("alice"),
        );
        assert!(!ctx.is_granted());

        ctx.grant();
        ctx.grant();
        assert!(ctx.is_granted());
    }
}
