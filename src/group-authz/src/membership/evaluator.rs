//! Membership evaluation: allowed groups against identity claims

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::claims::ClaimResolver;
use super::path::{is_path, GroupPath};
use crate::directory::GroupDirectory;
use crate::error::Result;
use crate::evaluation::EvaluationContext;
use crate::pattern::PatternCache;
use crate::resolver::ResourceGroupResolver;
use crate::types::Group;

/// How a claim value matched an allowed group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// The claim is the group's path or a descendant path
    Path,
    /// The claim equals the group's leaf name
    Name,
}

/// The allowed group and claim value that produced a grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipMatch {
    /// Matched group identifier
    pub group_id: String,

    /// Matched group path
    pub group_path: String,

    /// Claim value that matched
    pub claim: String,

    /// Path or name match
    pub kind: MatchKind,
}

/// Result of a membership evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The policy does not apply to the resource
    NotApplicable,
    /// No claim matched any allowed group
    Denied,
    /// A claim matched an allowed group
    Granted(MembershipMatch),
}

impl Outcome {
    /// Whether the outcome grants access
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }
}

/// Decides whether the identity belongs to a group allowed for the resource
pub struct MembershipEvaluator<'a> {
    directory: &'a dyn GroupDirectory,
    patterns: &'a PatternCache,
    claims: &'a ClaimResolver,
}

impl<'a> MembershipEvaluator<'a> {
    /// Create an evaluator over its collaborators
    pub fn new(
        directory: &'a dyn GroupDirectory,
        patterns: &'a PatternCache,
        claims: &'a ClaimResolver,
    ) -> Self {
        Self {
            directory,
            patterns,
            claims,
        }
    }

    /// Evaluate the context, granting it on a match
    ///
    /// Claims are only resolved once the policy is known to apply.
    ///
    /// # Errors
    /// Configuration errors and directory failures propagate; a policy that
    /// does not apply or a claim that does not match is a deny, not an error.
    pub fn evaluate(&self, ctx: &mut EvaluationContext) -> Result<Outcome> {
        let resolver = ResourceGroupResolver::new(self.directory, self.patterns);
        let Some(allowed) = resolver.resolve_allowed_groups(&ctx.resource, &ctx.config)? else {
            debug!("Policy does not apply to resource {:?}", ctx.resource.name);
            return Ok(Outcome::NotApplicable);
        };

        let claims = self.claims.resolve(ctx, self.directory)?;

        match Self::find_match(&allowed, &claims.values) {
            Some(found) => {
                debug!(
                    "Claim {:?} matched group {} by {:?}",
                    found.claim, found.group_path, found.kind
                );
                ctx.grant();
                Ok(Outcome::Granted(found))
            }
            None => {
                debug!(
                    "No claim matched {} allowed group(s) for identity {}",
                    allowed.len(),
                    ctx.identity.id
                );
                Ok(Outcome::Denied)
            }
        }
    }

    /// First (group, claim) pair that matches, groups outermost
    ///
    /// Claim values containing a separator are compared as paths; anything
    /// else must equal the group's name exactly. An empty claim never matches.
    pub fn find_match(allowed: &[Group], claims: &[String]) -> Option<MembershipMatch> {
        for group in allowed {
            let path = GroupPath::new(&group.path);

            for claim in claims {
                let kind = if is_path(claim) {
                    if !path.is_self_or_ancestor_of(claim) {
                        continue;
                    }
                    MatchKind::Path
                } else {
                    if claim.is_empty() || *claim != group.name {
                        continue;
                    }
                    MatchKind::Name
                };

                return Some(MembershipMatch {
                    group_id: group.id.clone(),
                    group_path: group.path.clone(),
                    claim: claim.clone(),
                    kind,
                });
            }
        }

        None
    }
}
