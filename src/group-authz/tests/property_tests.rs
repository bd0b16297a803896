//! Property-based tests for membership matching and group resolution

use cretoai_group_authz::membership::GroupPath;
use cretoai_group_authz::pattern::PatternCache;
use cretoai_group_authz::{
    EvaluationContext, Group, GroupMatchTarget, GroupMembershipPolicyProvider, Identity,
    InMemoryGroupDirectory, MembershipEvaluator, PolicyConfig, Resource, ResourceGroupResolver,
    ResourceMatchTarget,
};
use proptest::prelude::*;
use std::sync::Arc;

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,8}"
}

fn path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..4).prop_map(|segments| format!("/{}", segments.join("/")))
}

proptest! {
    #[test]
    fn test_descendant_paths_always_match(base in path(), tail in prop::collection::vec(segment(), 0..3)) {
        let allowed = vec![Group::new("g", base.clone())];
        let claim = if tail.is_empty() {
            base.clone()
        } else {
            format!("{}/{}", base, tail.join("/"))
        };

        let found = MembershipEvaluator::find_match(&allowed, &[claim]);
        prop_assert!(found.is_some());
    }

    #[test]
    fn test_suffixed_last_segment_never_matches(base in path(), suffix in "[a-z0-9]{1,5}") {
        let allowed = vec![Group::new("g", base.clone())];
        let claim = format!("{}{}", base, suffix);

        prop_assert!(MembershipEvaluator::find_match(&allowed, &[claim.clone()]).is_none());
        prop_assert!(!GroupPath::new(&base).is_self_or_ancestor_of(&claim));
    }

    #[test]
    fn test_bare_claims_match_only_exact_names(base in path(), claim in "[a-z][a-z0-9-]{0,8}") {
        let group = Group::new("g", base);
        let expected = claim == group.name;

        let found = MembershipEvaluator::find_match(&[group], &[claim]);
        prop_assert_eq!(found.is_some(), expected);
    }

    #[test]
    fn test_name_target_without_pattern_uses_resource_name(name in segment(), other in segment()) {
        let directory = InMemoryGroupDirectory::new();
        directory.add_group(Group::new("target", format!("/org/{}", name)));

        let patterns = PatternCache::new();
        let resolver = ResourceGroupResolver::new(&directory, &patterns);
        let config = PolicyConfig::new(ResourceMatchTarget::Name, GroupMatchTarget::Name);

        let groups = resolver.resolve_allowed_groups(&Resource::new(name.clone()), &config).unwrap();
        prop_assert_eq!(groups.map(|g| g.len()), Some(1));

        let groups = resolver.resolve_allowed_groups(&Resource::new(other.clone()), &config).unwrap();
        prop_assert_eq!(groups.is_some(), other == name);
    }

    #[test]
    fn test_evaluation_is_idempotent(
        name in segment(),
        claims in prop::collection::vec(prop_oneof![segment(), path()], 0..4)
    ) {
        let directory = InMemoryGroupDirectory::new();
        directory.add_group(Group::new("1", format!("/org/{}", name)));
        let provider = GroupMembershipPolicyProvider::new(Arc::new(directory));
        let config = PolicyConfig::new(ResourceMatchTarget::Name, GroupMatchTarget::Name)
            .with_groups_claim("groups");

        let mut first = EvaluationContext::new(
            Resource::new(name.clone()),
            config.clone(),
            Identity::new("alice").with_claim("groups", claims.clone()),
        );
        let mut second = EvaluationContext::new(
            Resource::new(name),
            config,
            Identity::new("alice").with_claim("groups", claims),
        );

        let a = provider.evaluate_with_outcome(&mut first).unwrap();
        let b = provider.evaluate_with_outcome(&mut second).unwrap();
        prop_assert_eq!(a, b);
        prop_assert_eq!(first.is_granted(), second.is_granted());
    }
}
