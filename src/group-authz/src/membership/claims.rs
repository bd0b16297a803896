//! Identity group-claim resolution
//!
//! The identity's groups come from an ordered chain of sources. The first
//! source producing a non-empty list wins; the default chain reads the
//! configured claim and falls back to the identity's realm memberships.

use tracing::debug;

use crate::directory::GroupDirectory;
use crate::error::Result;
use crate::evaluation::EvaluationContext;

/// A source of group-claim values
pub trait ClaimSource: Send + Sync {
    /// Short name used in logs and match reports
    fn name(&self) -> &str;

    /// Claim values from this source, or `None` if it has nothing to offer
    fn resolve(
        &self,
        ctx: &EvaluationContext,
        directory: &dyn GroupDirectory,
    ) -> Result<Option<Vec<String>>>;
}

/// Values of the claim named by the policy's `groupsClaim`
pub struct ConfiguredClaim;

impl ClaimSource for ConfiguredClaim {
    fn name(&self) -> &str {
        "claim"
    }

    fn resolve(
        &self,
        ctx: &EvaluationContext,
        _directory: &dyn GroupDirectory,
    ) -> Result<Option<Vec<String>>> {
        let values = ctx
            .config
            .groups_claim()
            .and_then(|claim| ctx.identity.get_value(claim))
            .filter(|values| !values.is_empty())
            .map(<[String]>::to_vec);

        Ok(values)
    }
}

/// The identity's realm group memberships from the directory
pub struct RealmMemberships;

impl ClaimSource for RealmMemberships {
    fn name(&self) -> &str {
        "realm"
    }

    fn resolve(
        &self,
        ctx: &EvaluationContext,
        directory: &dyn GroupDirectory,
    ) -> Result<Option<Vec<String>>> {
        Ok(Some(directory.realm_groups_of(&ctx.identity.id)?))
    }
}

/// Claim values and the source that produced them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedClaims {
    /// Name of the winning source; `None` if every source came up empty
    pub source: Option<String>,

    /// Claim values in source order
    pub values: Vec<String>,
}

/// Ordered fallback chain of claim sources
pub struct ClaimResolver {
    sources: Vec<Box<dyn ClaimSource>>,
}

impl ClaimResolver {
    /// Configured claim, then realm memberships
    pub fn new() -> Self {
        Self::empty()
            .with_source(Box::new(ConfiguredClaim))
            .with_source(Box::new(RealmMemberships))
    }

    /// A chain without sources
    pub fn empty() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Append a source to the end of the chain
    pub fn with_source(mut self, source: Box<dyn ClaimSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Names of the sources, in order
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Resolve the identity's claim values
    ///
    /// # Errors
    /// Propagates the first source failure; later sources are not consulted
    pub fn resolve(
        &self,
        ctx: &EvaluationContext,
        directory: &dyn GroupDirectory,
    ) -> Result<ResolvedClaims> {
        for source in &self.sources {
            match source.resolve(ctx, directory)? {
                Some(values) if !values.is_empty() => {
                    debug!(
                        "Resolved {} group claim value(s) from {}",
                        values.len(),
                        source.name()
                    );
                    return Ok(ResolvedClaims {
                        source: Some(source.name().to_string()),
                        values,
                    });
                }
                _ => debug!("Claim source {} produced no values", source.name()),
            }
        }

        Ok(ResolvedClaims {
            source: None,
            values: Vec::new(),
        })
    }
}

impl Default for ClaimResolver {
    fn default() -> Self {
        Self::new()
    }
}
